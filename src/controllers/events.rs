use axum::{
    extract::State,
    routing::{get, patch, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use validator::Validate;

use crate::{
    controllers::{
        extract::{AppJson, AppPath, AppQuery},
        limit_offset,
    },
    error::{AppError, AppResult},
    models::{CustomEvent, EventStatus, NewCustomEvent},
    validation::filled,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/method/add_event", post(add_event))
        .route("/events", get(list_events))
        .route("/events/{id}", put(update_event))
        .route("/events/{id}/status", patch(update_event_status))
}

/* ---------- CREATE ---------- */

// POST /api/method/add_event
#[derive(Debug, Deserialize)]
pub struct AddEventRequest {
    pub event_name: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub venue: Option<i64>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
}

impl From<AddEventRequest> for NewCustomEvent {
    fn from(req: AddEventRequest) -> Self {
        NewCustomEvent {
            custom_event_name: req.event_name,
            description: req.description,
            start_date: req.start_date,
            end_date: req.end_date,
            venue_id: req.venue,
            capacity: Some(req.capacity.unwrap_or(0)),
            status: Some(EventStatus::Draft.to_string()),
            organizer_email: None,
            organizer_phone: None,
        }
    }
}

pub async fn add_event(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<AddEventRequest>,
) -> AppResult<Json<Value>> {
    let event = NewCustomEvent::from(req);
    event.validate()?;

    let mut tx = state.db.pool.begin().await?;
    let created = event.insert(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!(
        "Custom Event {} created at venue {}: {}",
        created.id, created.venue_id, created.custom_event_name
    );
    Ok(Json(json!({ "message": created })))
}

/* ---------- UPDATE ---------- */

// PUT /api/events/{id}
// Отсутствующие в теле поля остаются как есть.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub custom_event_name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub venue: Option<i64>,
    pub capacity: Option<i32>,
    pub status: Option<String>,
    pub organizer_email: Option<String>,
    pub organizer_phone: Option<String>,
}

impl UpdateEventRequest {
    pub fn apply_to(self, event: &mut NewCustomEvent) {
        if let Some(name) = self.custom_event_name {
            event.custom_event_name = name;
        }
        if let Some(start_date) = self.start_date {
            event.start_date = start_date;
        }
        if self.description.is_some() {
            event.description = self.description;
        }
        if self.end_date.is_some() {
            event.end_date = self.end_date;
        }
        if self.venue.is_some() {
            event.venue_id = self.venue;
        }
        if self.capacity.is_some() {
            event.capacity = self.capacity;
        }
        if self.status.is_some() {
            event.status = self.status;
        }
        if self.organizer_email.is_some() {
            event.organizer_email = self.organizer_email;
        }
        if self.organizer_phone.is_some() {
            event.organizer_phone = self.organizer_phone;
        }
    }
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateEventRequest>,
) -> AppResult<Json<CustomEvent>> {
    let mut tx = state.db.pool.begin().await?;

    let current = CustomEvent::find(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Custom Event {}", id)))?;

    let mut draft = NewCustomEvent::from(&current);
    req.apply_to(&mut draft);
    draft.validate()?;

    let updated = CustomEvent::update(&mut *tx, id, &draft).await?;
    tx.commit().await?;

    tracing::info!("Custom Event {} updated: {}", id, updated.custom_event_name);
    Ok(Json(updated))
}

/* ---------- LIST ---------- */

// GET /api/events
#[derive(Debug, Deserialize, Validate)]
pub struct EventsQuery {
    pub status: Option<String>,
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[serde(rename = "pageSize")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<u32>,
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<EventsQuery>,
) -> AppResult<Json<Vec<CustomEvent>>> {
    params.validate()?;
    let status = filled(&params.status)
        .map(str::parse::<EventStatus>)
        .transpose()?;
    let (limit, offset) = limit_offset(params.page, params.page_size);

    let events = CustomEvent::list(&state.db.pool, status, limit, offset).await?;
    Ok(Json(events))
}

/* ---------- STATUS ---------- */

// PATCH /api/events/{id}/status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_event_status(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<CustomEvent>> {
    let mut tx = state.db.pool.begin().await?;

    let current = CustomEvent::find(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Custom Event {}", id)))?;

    // повторно прогоняем валидатор на изменённой записи
    let mut draft = NewCustomEvent::from(&current);
    draft.status = Some(req.status);
    draft.validate()?;
    let status = draft.status()?;

    let updated = CustomEvent::update_status(&mut *tx, id, status).await?;
    tx.commit().await?;

    tracing::info!("Custom Event {} status: {} -> {}", id, current.status, updated.status);
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn stored() -> NewCustomEvent {
        NewCustomEvent {
            custom_event_name: "Winter Meetup".into(),
            description: None,
            start_date: date("2024-01-10"),
            end_date: Some(date("2024-01-12")),
            venue_id: Some(4),
            capacity: Some(50),
            status: Some("Approved".into()),
            organizer_email: None,
            organizer_phone: None,
        }
    }

    #[test]
    fn update_keeps_fields_missing_from_request() {
        let mut event = stored();
        UpdateEventRequest { capacity: Some(80), ..Default::default() }.apply_to(&mut event);

        assert_eq!(event.capacity, Some(80));
        assert_eq!(event.venue_id, Some(4));
        assert_eq!(event.status(), Ok(EventStatus::Approved));
        assert_eq!(event.validate(), Ok(()));
    }

    #[test]
    fn moving_start_past_end_is_rejected() {
        let mut event = stored();
        UpdateEventRequest { start_date: Some(date("2024-01-20")), ..Default::default() }
            .apply_to(&mut event);
        assert_eq!(event.validate(), Err(ValidationError::EndBeforeStart));
    }

    #[test]
    fn updated_status_is_revalidated() {
        let mut event = stored();
        UpdateEventRequest { status: Some("Archived".into()), ..Default::default() }
            .apply_to(&mut event);
        assert_eq!(event.validate(), Err(ValidationError::InvalidEventStatus));
    }
}
