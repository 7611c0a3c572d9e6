use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::error::ValidationError;
use crate::validation::{char_len, filled, is_valid_email};

const PHONE_MIN_LEN: usize = 7;
const PHONE_MAX_LEN: usize = 15;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    pub venue_name: String,
    pub address: Option<String>,
    pub capacity: Option<i32>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: NaiveDateTime,
}

// Площадка до сохранения
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVenue {
    pub venue_name: String,
    pub address: Option<String>,
    pub capacity: Option<i32>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl NewVenue {
    /// Проверяет площадку перед вставкой; возвращает первое нарушенное правило.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if matches!(self.capacity, Some(capacity) if capacity <= 0) {
            return Err(ValidationError::CapacityNotPositive);
        }

        if let Some(email) = filled(&self.email) {
            if !is_valid_email(email) {
                return Err(ValidationError::InvalidEmail);
            }
        }

        if let Some(phone) = filled(&self.phone) {
            if !(PHONE_MIN_LEN..=PHONE_MAX_LEN).contains(&char_len(phone)) {
                return Err(ValidationError::InvalidPhone);
            }
        }

        Ok(())
    }

    pub async fn insert(&self, conn: &mut PgConnection) -> Result<Venue, sqlx::Error> {
        sqlx::query_as::<_, Venue>(
            "INSERT INTO venues (venue_name, address, capacity, email, phone)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *"
        )
        .bind(&self.venue_name)
        .bind(&self.address)
        .bind(self.capacity)
        .bind(&self.email)
        .bind(&self.phone)
        .fetch_one(conn)
        .await
    }
}

impl From<&Venue> for NewVenue {
    fn from(venue: &Venue) -> Self {
        NewVenue {
            venue_name: venue.venue_name.clone(),
            address: venue.address.clone(),
            capacity: venue.capacity,
            email: venue.email.clone(),
            phone: venue.phone.clone(),
        }
    }
}

impl Venue {
    pub async fn find(conn: &mut PgConnection, id: i64) -> Result<Option<Venue>, sqlx::Error> {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Перезаписывает все редактируемые поля площадки.
    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        venue: &NewVenue,
    ) -> Result<Venue, sqlx::Error> {
        sqlx::query_as::<_, Venue>(
            "UPDATE venues
             SET venue_name = $2, address = $3, capacity = $4, email = $5, phone = $6
             WHERE id = $1
             RETURNING *"
        )
        .bind(id)
        .bind(&venue.venue_name)
        .bind(&venue.address)
        .bind(venue.capacity)
        .bind(&venue.email)
        .bind(&venue.phone)
        .fetch_one(conn)
        .await
    }

    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Venue>, sqlx::Error> {
        sqlx::query_as::<_, Venue>(
            "SELECT * FROM venues ORDER BY venue_name, id LIMIT $1 OFFSET $2"
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn venue() -> NewVenue {
        NewVenue {
            venue_name: "Main Hall".into(),
            address: Some("1 Abay Ave".into()),
            capacity: Some(200),
            email: Some("hall@example.com".into()),
            phone: Some("7012345678".into()),
        }
    }

    #[test]
    fn accepts_complete_venue() {
        assert_eq!(venue().validate(), Ok(()));
    }

    #[test]
    fn optional_fields_may_be_empty() {
        let v = NewVenue {
            venue_name: "Garage".into(),
            email: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(v.validate(), Ok(()));
    }

    #[test]
    fn short_phone_rejected() {
        let v = NewVenue { capacity: Some(5), phone: Some("12345".into()), ..venue() };
        assert_eq!(v.validate(), Err(ValidationError::InvalidPhone));
    }

    #[test]
    fn phone_length_bounds_are_inclusive() {
        for (phone, ok) in [
            ("123456", false),
            ("1234567", true),
            ("123456789012345", true),
            ("1234567890123456", false),
        ] {
            let v = NewVenue { phone: Some(phone.into()), ..venue() };
            assert_eq!(v.validate().is_ok(), ok, "phone {phone}");
        }
    }

    #[test]
    fn bad_email_rejected() {
        let v = NewVenue { email: Some("hall.example.com".into()), ..venue() };
        assert_eq!(v.validate(), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn capacity_checked_first() {
        let v = NewVenue { capacity: Some(0), email: Some("bad".into()), ..venue() };
        assert_eq!(v.validate(), Err(ValidationError::CapacityNotPositive));
    }

    proptest! {
        #[test]
        fn non_positive_capacity_always_rejected(capacity in i32::MIN..=0) {
            let v = NewVenue { capacity: Some(capacity), ..venue() };
            prop_assert_eq!(v.validate(), Err(ValidationError::CapacityNotPositive));
        }

        #[test]
        fn positive_capacity_accepted(capacity in 1..=i32::MAX) {
            let v = NewVenue { capacity: Some(capacity), ..venue() };
            prop_assert_eq!(v.validate(), Ok(()));
        }
    }
}
