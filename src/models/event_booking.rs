//! Бронирования билетов на события.
//!
//! Валидатор бронирования делает два запроса через переданное соединение:
//! читает событие и суммирует билеты подтверждённых бронирований. Проверка
//! вместимости не блокирует строки, поэтому параллельные бронирования могут
//! вместе превысить вместимость события.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, AppResult, ValidationError};
use crate::models::custom_event::{CustomEvent, EventStatus};
use crate::validation::{char_len, filled, is_valid_email};

const PHONE_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(ValidationError::InvalidBookingStatus),
        }
    }
}

impl TryFrom<String> for BookingStatus {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct EventBooking {
    pub id: i64,
    #[serde(rename = "event")]
    pub event_id: i64,
    pub attendee_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub number_of_tickets: i32,
    pub booking_date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEventBooking {
    #[serde(rename = "event")]
    pub event_id: i64,
    pub attendee_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub number_of_tickets: i32,
    pub booking_date: Option<NaiveDate>,
    pub status: Option<String>,
}

/// Состояние события, против которого проверяется бронирование.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingContext {
    pub event_status: EventStatus,
    /// `None` - вместимость не задана, ограничения нет.
    pub event_capacity: Option<i32>,
    /// Билеты подтверждённых бронирований события, без проверяемого.
    pub confirmed_tickets: i64,
}

impl BookingContext {
    pub async fn load(
        conn: &mut PgConnection,
        event_id: i64,
        exclude_booking: Option<i64>,
    ) -> AppResult<Self> {
        let event = CustomEvent::find(&mut *conn, event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Custom Event {}", event_id)))?;

        let confirmed_tickets =
            EventBooking::confirmed_tickets(&mut *conn, event_id, exclude_booking).await?;

        Ok(BookingContext {
            event_status: event.status,
            event_capacity: event.capacity,
            confirmed_tickets,
        })
    }
}

impl NewEventBooking {
    /// Полная проверка: поля, затем событие из базы, затем статус.
    ///
    /// `exclude_booking` - id уже сохранённого бронирования, которое
    /// проверяется повторно; его билеты не учитываются в сумме.
    pub async fn validate(
        &self,
        conn: &mut PgConnection,
        exclude_booking: Option<i64>,
    ) -> AppResult<()> {
        self.check_fields()?;
        self.validate_against_event(conn, exclude_booking).await
    }

    /// Вторая половина `validate`: событие из базы и статус. Вызывающий код
    /// должен сам выполнить `check_fields` до этого.
    pub async fn validate_against_event(
        &self,
        conn: &mut PgConnection,
        exclude_booking: Option<i64>,
    ) -> AppResult<()> {
        let ctx = BookingContext::load(conn, self.event_id, exclude_booking).await?;
        self.check_event(&ctx)?;
        self.status()?;
        Ok(())
    }

    /// Те же правила, что и `validate`, но без обращения к базе.
    pub fn check(&self, ctx: &BookingContext) -> Result<(), ValidationError> {
        self.check_fields()?;
        self.check_event(ctx)?;
        self.status()?;
        Ok(())
    }

    /// Правила, которым не нужно событие: билеты, email, телефон.
    pub fn check_fields(&self) -> Result<(), ValidationError> {
        if self.number_of_tickets <= 0 {
            return Err(ValidationError::TicketsNotPositive);
        }

        if let Some(email) = filled(&self.email) {
            if !is_valid_email(email) {
                return Err(ValidationError::InvalidEmail);
            }
        }

        if let Some(phone) = filled(&self.phone) {
            if char_len(phone) != PHONE_LEN {
                return Err(ValidationError::InvalidBookingPhone);
            }
        }

        Ok(())
    }

    pub fn check_event(&self, ctx: &BookingContext) -> Result<(), ValidationError> {
        if ctx.event_status != EventStatus::Approved {
            return Err(ValidationError::EventNotApproved);
        }

        if let Some(capacity) = ctx.event_capacity {
            let requested = ctx.confirmed_tickets + i64::from(self.number_of_tickets);
            if requested > i64::from(capacity) {
                return Err(ValidationError::CapacityExceeded);
            }
        }

        Ok(())
    }

    /// Статус по умолчанию - Pending.
    pub fn status(&self) -> Result<BookingStatus, ValidationError> {
        filled(&self.status).map_or(Ok(BookingStatus::Pending), |s| s.parse())
    }

    pub async fn insert(&self, conn: &mut PgConnection) -> AppResult<EventBooking> {
        let status = self.status()?;
        let booking_date = self
            .booking_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        sqlx::query_as::<_, EventBooking>(
            "INSERT INTO event_bookings
                (event_id, attendee_name, email, phone, number_of_tickets, booking_date, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *"
        )
        .bind(self.event_id)
        .bind(&self.attendee_name)
        .bind(&self.email)
        .bind(&self.phone)
        .bind(self.number_of_tickets)
        .bind(booking_date)
        .bind(status.as_str())
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::from_insert(e, || format!("Custom Event {}", self.event_id)))
    }
}

impl From<&EventBooking> for NewEventBooking {
    fn from(booking: &EventBooking) -> Self {
        NewEventBooking {
            event_id: booking.event_id,
            attendee_name: booking.attendee_name.clone(),
            email: booking.email.clone(),
            phone: booking.phone.clone(),
            number_of_tickets: booking.number_of_tickets,
            booking_date: Some(booking.booking_date),
            status: Some(booking.status.to_string()),
        }
    }
}

impl EventBooking {
    pub async fn find(conn: &mut PgConnection, id: i64) -> Result<Option<EventBooking>, sqlx::Error> {
        sqlx::query_as::<_, EventBooking>("SELECT * FROM event_bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Сумма билетов подтверждённых бронирований события.
    pub async fn confirmed_tickets(
        conn: &mut PgConnection,
        event_id: i64,
        exclude_booking: Option<i64>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(number_of_tickets), 0)::BIGINT
             FROM event_bookings
             WHERE event_id = $1
               AND status = 'Confirmed'
               AND ($2::BIGINT IS NULL OR id <> $2)"
        )
        .bind(event_id)
        .bind(exclude_booking)
        .fetch_one(conn)
        .await
    }

    pub async fn list(
        pool: &PgPool,
        event_id: Option<i64>,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EventBooking>, sqlx::Error> {
        sqlx::query_as::<_, EventBooking>(
            "SELECT * FROM event_bookings
             WHERE ($1::BIGINT IS NULL OR event_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        )
        .bind(event_id)
        .bind(status.map(BookingStatus::as_str))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn update_status(
        conn: &mut PgConnection,
        id: i64,
        status: BookingStatus,
    ) -> Result<EventBooking, sqlx::Error> {
        sqlx::query_as::<_, EventBooking>(
            "UPDATE event_bookings SET status = $2 WHERE id = $1 RETURNING *"
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_one(conn)
        .await
    }
}
