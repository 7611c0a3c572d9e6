//! analytics.rs
//!
//! Сводная статистика для панели управления: события, площадки,
//! бронирования и подтверждённые билеты.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::FromRow;
use std::sync::Arc;

use crate::{error::AppResult, AppState};

/// Определяет маршруты, связанные с аналитикой.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analytics", get(get_summary))
}

#[derive(Debug, Serialize, FromRow)]
pub struct AnalyticsSummary {
    pub total_events: i64,
    pub approved_events: i64,
    pub total_venues: i64,
    pub total_bookings: i64,
    pub confirmed_bookings: i64,
    pub confirmed_tickets: i64,
}

/// GET /api/analytics
pub async fn get_summary(State(state): State<Arc<AppState>>) -> AppResult<Json<AnalyticsSummary>> {
    let summary = sqlx::query_as::<_, AnalyticsSummary>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM custom_events)::BIGINT AS total_events,
            (SELECT COUNT(*) FROM custom_events WHERE status = 'Approved')::BIGINT AS approved_events,
            (SELECT COUNT(*) FROM venues)::BIGINT AS total_venues,
            COUNT(b.id)::BIGINT AS total_bookings,
            COUNT(b.id) FILTER (WHERE b.status = 'Confirmed')::BIGINT AS confirmed_bookings,
            COALESCE(SUM(b.number_of_tickets) FILTER (WHERE b.status = 'Confirmed'), 0)::BIGINT AS confirmed_tickets
        FROM event_bookings b
        "#
    )
    .fetch_one(&state.db.pool)
    .await?;

    tracing::debug!(
        "Analytics: {} events ({} approved), {} bookings, {} confirmed tickets",
        summary.total_events, summary.approved_events, summary.total_bookings, summary.confirmed_tickets
    );

    Ok(Json(summary))
}
