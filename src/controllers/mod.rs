pub mod extract;
pub mod venues;
pub mod events;
pub mod bookings;
pub mod analytics;

use axum::Router;
use std::sync::Arc;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(venues::routes())
        .merge(events::routes())
        .merge(bookings::routes())
        .merge(analytics::routes())
}

/// LIMIT/OFFSET для страницы, нумерация страниц с 1.
pub fn limit_offset(page: Option<u32>, page_size: Option<u32>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let limit = i64::from(page_size);
    (limit, i64::from(page - 1) * limit)
}
