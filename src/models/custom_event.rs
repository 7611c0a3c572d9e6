use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, AppResult, ValidationError};
use crate::validation::filled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Draft,
    Approved,
    Rejected,
}

impl EventStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            EventStatus::Draft => "Draft",
            EventStatus::Approved => "Approved",
            EventStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(EventStatus::Draft),
            "Approved" => Ok(EventStatus::Approved),
            "Rejected" => Ok(EventStatus::Rejected),
            _ => Err(ValidationError::InvalidEventStatus),
        }
    }
}

impl TryFrom<String> for EventStatus {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CustomEvent {
    pub id: i64,
    pub custom_event_name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "venue")]
    pub venue_id: i64,
    pub capacity: Option<i32>,
    #[sqlx(try_from = "String")]
    pub status: EventStatus,
    pub organizer_email: Option<String>,
    pub organizer_phone: Option<String>,
    pub created_at: NaiveDateTime,
}

// Событие до сохранения. Статус приходит строкой и проверяется валидатором.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCustomEvent {
    pub custom_event_name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "venue")]
    pub venue_id: Option<i64>,
    pub capacity: Option<i32>,
    pub status: Option<String>,
    pub organizer_email: Option<String>,
    pub organizer_phone: Option<String>,
}

impl NewCustomEvent {
    /// Проверяет событие перед вставкой или обновлением.
    ///
    /// Порядок проверок: вместимость, даты, статус, площадка.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if matches!(self.capacity, Some(capacity) if capacity <= 0) {
            return Err(ValidationError::CapacityNotPositive);
        }

        if let Some(end_date) = self.end_date {
            if end_date < self.start_date {
                return Err(ValidationError::EndBeforeStart);
            }
        }

        self.status()?;

        if self.venue_id.is_none() {
            return Err(ValidationError::VenueRequired);
        }

        Ok(())
    }

    /// Статус по умолчанию - Draft.
    pub fn status(&self) -> Result<EventStatus, ValidationError> {
        filled(&self.status).map_or(Ok(EventStatus::Draft), |s| s.parse())
    }

    pub async fn insert(&self, conn: &mut PgConnection) -> AppResult<CustomEvent> {
        let venue_id = self.venue_id.ok_or(ValidationError::VenueRequired)?;
        let status = self.status()?;

        sqlx::query_as::<_, CustomEvent>(
            "INSERT INTO custom_events
                (custom_event_name, description, start_date, end_date, venue_id,
                 capacity, status, organizer_email, organizer_phone)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *"
        )
        .bind(&self.custom_event_name)
        .bind(&self.description)
        .bind(self.start_date)
        .bind(self.end_date)
        .bind(venue_id)
        .bind(self.capacity)
        .bind(status.as_str())
        .bind(&self.organizer_email)
        .bind(&self.organizer_phone)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::from_insert(e, || format!("Venue {}", venue_id)))
    }
}

impl From<&CustomEvent> for NewCustomEvent {
    fn from(event: &CustomEvent) -> Self {
        NewCustomEvent {
            custom_event_name: event.custom_event_name.clone(),
            description: event.description.clone(),
            start_date: event.start_date,
            end_date: event.end_date,
            venue_id: Some(event.venue_id),
            capacity: event.capacity,
            status: Some(event.status.to_string()),
            organizer_email: event.organizer_email.clone(),
            organizer_phone: event.organizer_phone.clone(),
        }
    }
}

impl CustomEvent {
    pub async fn find(conn: &mut PgConnection, id: i64) -> Result<Option<CustomEvent>, sqlx::Error> {
        sqlx::query_as::<_, CustomEvent>("SELECT * FROM custom_events WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        status: Option<EventStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CustomEvent>, sqlx::Error> {
        sqlx::query_as::<_, CustomEvent>(
            "SELECT * FROM custom_events
             WHERE ($1::TEXT IS NULL OR status = $1)
             ORDER BY start_date DESC, id DESC
             LIMIT $2 OFFSET $3"
        )
        .bind(status.map(EventStatus::as_str))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Перезаписывает все редактируемые поля события.
    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        event: &NewCustomEvent,
    ) -> AppResult<CustomEvent> {
        let venue_id = event.venue_id.ok_or(ValidationError::VenueRequired)?;
        let status = event.status()?;

        sqlx::query_as::<_, CustomEvent>(
            "UPDATE custom_events
             SET custom_event_name = $2, description = $3, start_date = $4, end_date = $5,
                 venue_id = $6, capacity = $7, status = $8,
                 organizer_email = $9, organizer_phone = $10
             WHERE id = $1
             RETURNING *"
        )
        .bind(id)
        .bind(&event.custom_event_name)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(venue_id)
        .bind(event.capacity)
        .bind(status.as_str())
        .bind(&event.organizer_email)
        .bind(&event.organizer_phone)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::from_insert(e, || format!("Venue {}", venue_id)))
    }

    pub async fn update_status(
        conn: &mut PgConnection,
        id: i64,
        status: EventStatus,
    ) -> Result<CustomEvent, sqlx::Error> {
        sqlx::query_as::<_, CustomEvent>(
            "UPDATE custom_events SET status = $2 WHERE id = $1 RETURNING *"
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_one(conn)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn event() -> NewCustomEvent {
        NewCustomEvent {
            custom_event_name: "RustConf Almaty".into(),
            description: None,
            start_date: date("2024-01-10"),
            end_date: Some(date("2024-01-12")),
            venue_id: Some(1),
            capacity: Some(100),
            status: None,
            organizer_email: Some("org@example.com".into()),
            organizer_phone: None,
        }
    }

    #[test]
    fn accepts_valid_event_and_defaults_to_draft() {
        let e = event();
        assert_eq!(e.validate(), Ok(()));
        assert_eq!(e.status(), Ok(EventStatus::Draft));
    }

    #[test]
    fn end_before_start_rejected() {
        let e = NewCustomEvent { end_date: Some(date("2024-01-05")), ..event() };
        assert_eq!(e.validate(), Err(ValidationError::EndBeforeStart));
    }

    #[test]
    fn single_day_event_accepted() {
        let e = NewCustomEvent { end_date: Some(date("2024-01-10")), ..event() };
        assert_eq!(e.validate(), Ok(()));
    }

    #[test]
    fn open_ended_event_accepted() {
        let e = NewCustomEvent { end_date: None, ..event() };
        assert_eq!(e.validate(), Ok(()));
    }

    #[test]
    fn unknown_status_rejected() {
        let e = NewCustomEvent { status: Some("Archived".into()), ..event() };
        assert_eq!(e.validate(), Err(ValidationError::InvalidEventStatus));

        // статусы чувствительны к регистру
        let e = NewCustomEvent { status: Some("approved".into()), ..event() };
        assert_eq!(e.validate(), Err(ValidationError::InvalidEventStatus));
    }

    #[test]
    fn venue_is_mandatory() {
        let e = NewCustomEvent { venue_id: None, ..event() };
        assert_eq!(e.validate(), Err(ValidationError::VenueRequired));
    }

    #[test]
    fn capacity_is_reported_before_missing_venue() {
        let e = NewCustomEvent { venue_id: None, capacity: Some(0), ..event() };
        assert_eq!(e.validate(), Err(ValidationError::CapacityNotPositive));
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [EventStatus::Draft, EventStatus::Approved, EventStatus::Rejected] {
            assert_eq!(EventStatus::try_from(status.to_string()), Ok(status));
        }
    }

    #[test]
    fn stored_event_revalidates() {
        let stored = CustomEvent {
            id: 3,
            custom_event_name: "Meetup".into(),
            description: None,
            start_date: date("2024-03-01"),
            end_date: None,
            venue_id: 9,
            capacity: Some(30),
            status: EventStatus::Approved,
            organizer_email: None,
            organizer_phone: None,
            created_at: date("2024-02-01").and_hms_opt(10, 0, 0).unwrap(),
        };
        let draft = NewCustomEvent::from(&stored);
        assert_eq!(draft.validate(), Ok(()));
        assert_eq!(draft.status(), Ok(EventStatus::Approved));
        assert_eq!(draft.venue_id, Some(9));
    }

    proptest! {
        #[test]
        fn non_positive_capacity_always_rejected(capacity in i32::MIN..=0) {
            let e = NewCustomEvent { capacity: Some(capacity), ..event() };
            prop_assert_eq!(e.validate(), Err(ValidationError::CapacityNotPositive));
        }

        #[test]
        fn end_before_start_always_rejected(start in 0i64..20_000, back in 1i64..1_000) {
            let base = date("1990-01-01");
            let start_date = base + chrono::Duration::days(start);
            let end_date = start_date - chrono::Duration::days(back);
            let e = NewCustomEvent { start_date, end_date: Some(end_date), ..event() };
            prop_assert_eq!(e.validate(), Err(ValidationError::EndBeforeStart));
        }
    }
}
