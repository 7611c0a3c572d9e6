use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
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
    models::{NewVenue, Venue},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/method/add_venue", post(add_venue))
        .route("/venues", get(list_venues))
        .route("/venues/{id}", put(update_venue))
}

/* ---------- CREATE ---------- */

// POST /api/method/add_venue
#[derive(Debug, Deserialize)]
pub struct AddVenueRequest {
    pub venue_name: String,
    pub address: Option<String>,
    pub capacity: Option<i32>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<AddVenueRequest> for NewVenue {
    fn from(req: AddVenueRequest) -> Self {
        NewVenue {
            venue_name: req.venue_name,
            address: req.address,
            // вместимость по умолчанию 0, валидатор её отклонит
            capacity: Some(req.capacity.unwrap_or(0)),
            email: req.email,
            phone: req.phone,
        }
    }
}

pub async fn add_venue(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<AddVenueRequest>,
) -> AppResult<Json<Value>> {
    let venue = NewVenue::from(req);
    venue.validate()?;

    let mut tx = state.db.pool.begin().await?;
    let created = venue.insert(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!("Venue {} created: {}", created.id, created.venue_name);
    Ok(Json(json!({ "message": created })))
}

/* ---------- UPDATE ---------- */

// PUT /api/venues/{id}
// Отсутствующие в теле поля остаются как есть.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateVenueRequest {
    pub venue_name: Option<String>,
    pub address: Option<String>,
    pub capacity: Option<i32>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UpdateVenueRequest {
    pub fn apply_to(self, venue: &mut NewVenue) {
        if let Some(venue_name) = self.venue_name {
            venue.venue_name = venue_name;
        }
        if self.address.is_some() {
            venue.address = self.address;
        }
        if self.capacity.is_some() {
            venue.capacity = self.capacity;
        }
        if self.email.is_some() {
            venue.email = self.email;
        }
        if self.phone.is_some() {
            venue.phone = self.phone;
        }
    }
}

pub async fn update_venue(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<UpdateVenueRequest>,
) -> AppResult<Json<Venue>> {
    let mut tx = state.db.pool.begin().await?;

    let current = Venue::find(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Venue {}", id)))?;

    let mut draft = NewVenue::from(&current);
    req.apply_to(&mut draft);
    draft.validate()?;

    let updated = Venue::update(&mut *tx, id, &draft).await?;
    tx.commit().await?;

    tracing::info!("Venue {} updated: {}", id, updated.venue_name);
    Ok(Json(updated))
}

/* ---------- LIST ---------- */

// GET /api/venues
#[derive(Debug, Deserialize, Validate)]
pub struct VenuesQuery {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[serde(rename = "pageSize")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: Option<u32>,
}

pub async fn list_venues(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<VenuesQuery>,
) -> AppResult<Json<Vec<Venue>>> {
    params.validate()?;
    let (limit, offset) = limit_offset(params.page, params.page_size);

    let venues = Venue::list(&state.db.pool, limit, offset).await?;
    Ok(Json(venues))
}
