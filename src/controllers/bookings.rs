use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::{
    controllers::{
        extract::{AppJson, AppPath, AppQuery},
        limit_offset,
    },
    error::{AppError, AppResult},
    models::{BookingStatus, EventBooking, NewEventBooking},
    validation::filled,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/{id}/status", patch(update_booking_status))
}

/* ---------- BOOKINGS ---------- */

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<NewEventBooking>,
) -> AppResult<(StatusCode, Json<EventBooking>)> {
    // поля проверяем до того, как брать соединение из пула
    req.check_fields()?;

    let mut tx = state.db.pool.begin().await?;
    req.validate_against_event(&mut *tx, None).await?;
    let booking = req.insert(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!(
        "Booking {} for event {}: {} ticket(s), {}",
        booking.id, booking.event_id, booking.number_of_tickets, booking.status
    );
    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings
#[derive(Debug, Deserialize, Validate)]
pub struct BookingsQuery {
    #[validate(range(min = 1))]
    pub event_id: Option<i64>,
    pub status: Option<String>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[serde(rename = "pageSize")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<u32>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<BookingsQuery>,
) -> AppResult<Json<Vec<EventBooking>>> {
    params.validate()?;
    let status = filled(&params.status)
        .map(str::parse::<BookingStatus>)
        .transpose()?;
    let (limit, offset) = limit_offset(params.page, params.page_size);

    let bookings =
        EventBooking::list(&state.db.pool, params.event_id, status, limit, offset).await?;
    Ok(Json(bookings))
}

// PATCH /api/bookings/{id}/status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<EventBooking>> {
    let mut tx = state.db.pool.begin().await?;

    let current = EventBooking::find(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event Booking {}", id)))?;

    // изменённая бронь проверяется заново, свои билеты в сумму не входят
    let mut draft = NewEventBooking::from(&current);
    draft.status = Some(req.status);
    draft.validate(&mut *tx, Some(id)).await?;
    let status = draft.status()?;

    let updated = EventBooking::update_status(&mut *tx, id, status).await?;
    tx.commit().await?;

    tracing::info!("Booking {} status: {} -> {}", id, current.status, updated.status);
    Ok(Json(updated))
}
