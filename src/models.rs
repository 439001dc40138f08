use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A scheduled class as stored. `date_time` is always UTC.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct FitnessClass {
    pub id: i64,
    pub name: String,
    pub instructor: String,
    pub date_time: DateTime<Utc>,
    pub capacity: i64,
    pub available_slots: i64,
}

impl FitnessClass {
    pub fn in_timezone(&self, tz: Tz) -> ClassView {
        ClassView {
            id: self.id,
            name: self.name.clone(),
            instructor: self.instructor.clone(),
            date_time: self.date_time.with_timezone(&tz).fixed_offset(),
            capacity: self.capacity,
            available_slots: self.available_slots,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewFitnessClass {
    pub name: String,
    pub instructor: String,
    pub date_time: DateTime<Utc>,
    pub capacity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ClassView {
    pub id: i64,
    #[schema(example = "Yoga")]
    pub name: String,
    pub instructor: String,
    #[schema(value_type = String, format = "date-time", example = "2025-11-24T11:30:00+05:30")]
    pub date_time: DateTime<FixedOffset>,
    pub capacity: i64,
    pub available_slots: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow, ToSchema)]
pub struct Booking {
    pub id: i64,
    pub fitness_class: i64,
    pub client_name: String,
    pub client_email: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /book`. Every field is optional so that missing ones are
/// reported per field instead of as a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    #[schema(example = 1)]
    pub fitness_class: Option<i64>,
    #[schema(example = "Jane Doe")]
    pub client_name: Option<String>,
    #[schema(example = "jane@example.com")]
    pub client_email: Option<String>,
}

/// A request that passed schema validation. The class reference is not yet
/// resolved against the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub fitness_class: i64,
    pub client_name: String,
    pub client_email: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ClientBookingRow {
    pub id: i64,
    pub fitness_class: i64,
    pub client_name: String,
    pub client_email: String,
    pub created_at: DateTime<Utc>,
    pub class_name: String,
    pub instructor: String,
    pub class_date_time: DateTime<Utc>,
}

impl ClientBookingRow {
    pub fn in_timezone(self, tz: Tz) -> ClientBooking {
        ClientBooking {
            id: self.id,
            fitness_class: self.fitness_class,
            client_name: self.client_name,
            client_email: self.client_email,
            created_at: self.created_at,
            class_name: self.class_name,
            instructor: self.instructor,
            class_date_time: self.class_date_time.with_timezone(&tz).fixed_offset(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ClientBooking {
    pub id: i64,
    pub fitness_class: i64,
    pub client_name: String,
    pub client_email: String,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    pub class_name: String,
    pub instructor: String,
    #[schema(value_type = String, format = "date-time")]
    pub class_date_time: DateTime<FixedOffset>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn yoga() -> FitnessClass {
        FitnessClass {
            id: 1,
            name: "Yoga".to_string(),
            instructor: "Asha".to_string(),
            date_time: Utc.with_ymd_and_hms(2030, 1, 15, 6, 0, 0).unwrap(),
            capacity: 10,
            available_slots: 4,
        }
    }

    #[test]
    fn test_in_timezone_utc_keeps_reference_time() {
        let view = yoga().in_timezone(chrono_tz::UTC);
        assert_eq!(view.date_time, yoga().date_time);
        assert_eq!(view.date_time.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_in_timezone_shifts_offset() {
        let view = yoga().in_timezone(chrono_tz::Asia::Kolkata);
        assert_eq!(view.date_time.to_rfc3339(), "2030-01-15T11:30:00+05:30");
        assert_eq!(view.date_time, yoga().date_time);
        assert_eq!(view.available_slots, 4);
    }

    #[test]
    fn test_create_booking_request_missing_fields() {
        let req: CreateBookingRequest = serde_json::from_str(r#"{"client_name": "Jane"}"#).unwrap();
        assert_eq!(req.fitness_class, None);
        assert_eq!(req.client_name.as_deref(), Some("Jane"));
        assert_eq!(req.client_email, None);
    }
}
