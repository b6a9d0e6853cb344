use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBookingDto {
    #[validate(length(min = 1, message = "Booking date is required"))]
    pub booking_date: String,

    #[validate(length(max = 500, message = "Notes must not exceed 500 characters"))]
    pub notes: Option<String>,
}

impl CreateBookingDto {
    /// Accepts RFC 3339 timestamps as well as the `YYYY-MM-DDTHH:MM` and
    /// `YYYY-MM-DD HH:MM` forms sent by date-time inputs (read as UTC).
    pub fn parsed_booking_date(&self) -> Option<DateTime<Utc>> {
        let raw = self.booking_date.trim();

        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date.with_timezone(&Utc));
        }

        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingStatusUpdateDto {
    pub status: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BookingListQueryDto {
    pub status: Option<String>,
    pub page: Option<String>,
}
