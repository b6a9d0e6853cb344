// service/booking_service.rs
use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    db::{bookingdb::BookingExt, propertydb::PropertyExt},
    dtos::{
        bookingdtos::{BookingListQueryDto, CreateBookingDto},
        pagination::{ExactFilter, PageRequest, Paginated, ADMIN_PAGE_SIZE},
    },
    models::bookingmodel::{Booking, BookingStatus},
    service::error::ServiceError,
};

/// Books a viewing. The date must be strictly after `now`; nothing is stored
/// otherwise.
pub async fn create_booking<S>(
    store: &S,
    property_id: i32,
    user_id: i32,
    body: &CreateBookingDto,
    now: DateTime<Utc>,
) -> Result<Booking, ServiceError>
where
    S: PropertyExt + BookingExt + Sync,
{
    body.validate()
        .map_err(|e| ServiceError::validation(e.to_string()))?;

    store
        .get_property_by_id(property_id)
        .await?
        .ok_or(ServiceError::PropertyNotFound)?;

    let booking_date = body
        .parsed_booking_date()
        .ok_or_else(|| ServiceError::validation("Booking date is invalid"))?;

    if booking_date <= now {
        return Err(ServiceError::validation("Booking date must be in the future"));
    }

    let notes = body
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|notes| !notes.is_empty())
        .map(str::to_string);

    let booking = store
        .save_booking(property_id, user_id, booking_date, notes)
        .await?;

    tracing::info!("Booking {} created for property {} by user {}", booking.id, property_id, user_id);

    Ok(booking)
}

/// Any recognised status may replace any other.
pub async fn update_booking_status<S>(
    store: &S,
    booking_id: i32,
    raw_status: &str,
) -> Result<Booking, ServiceError>
where
    S: BookingExt + Sync,
{
    let status = BookingStatus::parse(raw_status.trim())
        .ok_or_else(|| ServiceError::validation("Invalid booking status"))?;

    let booking = store
        .update_booking_status(booking_id, status)
        .await?
        .ok_or(ServiceError::BookingNotFound)?;

    tracing::info!("Booking {} set to {}", booking.id, booking.status.to_str());

    Ok(booking)
}

/// Admin booking list, newest first. An unknown status matches no booking.
pub async fn list_bookings<S>(
    store: &S,
    params: &BookingListQueryDto,
) -> Result<Paginated<Booking>, ServiceError>
where
    S: BookingExt + Sync,
{
    let page = PageRequest::from_query(params.page.as_deref(), ADMIN_PAGE_SIZE);

    let status = match ExactFilter::from_query(params.status.as_deref(), None, BookingStatus::parse) {
        ExactFilter::Any => None,
        ExactFilter::Only(status) => Some(status),
        ExactFilter::Unmatched => return Ok(Paginated::new(Vec::new(), 0, page)),
    };

    let (bookings, total) = store.get_bookings(status, page).await?;
    Ok(Paginated::new(bookings, total, page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::{sample_property, MemoryStore};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()
    }

    fn booking_for(date: &str) -> CreateBookingDto {
        CreateBookingDto {
            booking_date: date.to_string(),
            notes: Some("  Afternoon works best ".to_string()),
        }
    }

    fn store_with_property() -> (MemoryStore, i32) {
        let store = MemoryStore::new();
        let property = store.add_property(sample_property(1, 1, 500_000.0));
        (store, property.id)
    }

    #[tokio::test]
    async fn future_booking_is_pending() {
        let (store, property_id) = store_with_property();

        let booking = create_booking(&store, property_id, 7, &booking_for("2030-06-02T10:00"), now())
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.notes.as_deref(), Some("Afternoon works best"));
        assert_eq!(store.booking_count(), 1);
    }

    #[tokio::test]
    async fn past_booking_is_rejected_without_a_row() {
        let (store, property_id) = store_with_property();

        let result = create_booking(&store, property_id, 7, &booking_for("2030-05-31T10:00"), now()).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(store.booking_count(), 0);
    }

    #[tokio::test]
    async fn booking_exactly_now_is_rejected() {
        let (store, property_id) = store_with_property();
        let body = booking_for(&now().to_rfc3339());

        let result = create_booking(&store, property_id, 7, &body, now()).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(store.booking_count(), 0);
    }

    #[tokio::test]
    async fn booking_missing_property_is_not_found() {
        let store = MemoryStore::new();
        let result = create_booking(&store, 404, 7, &booking_for("2030-06-02T10:00"), now()).await;

        assert!(matches!(result, Err(ServiceError::PropertyNotFound)));
        assert_eq!(store.booking_count(), 0);
    }

    #[tokio::test]
    async fn completed_booking_can_go_back_to_pending() {
        let (store, property_id) = store_with_property();
        let booking = store
            .save_booking(property_id, 7, now() + Duration::days(1), None)
            .await
            .unwrap();

        let completed = update_booking_status(&store, booking.id, "completed").await.unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);

        let reopened = update_booking_status(&store, booking.id, "pending").await.unwrap();
        assert_eq!(reopened.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_status_is_a_validation_error() {
        let (store, property_id) = store_with_property();
        let booking = store
            .save_booking(property_id, 7, now() + Duration::days(1), None)
            .await
            .unwrap();

        let result = update_booking_status(&store, booking.id, "archived").await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        let missing = update_booking_status(&store, 9999, "confirmed").await;
        assert!(matches!(missing, Err(ServiceError::BookingNotFound)));
    }

    #[tokio::test]
    async fn booking_list_filters_by_exact_status() {
        let (store, property_id) = store_with_property();
        let first = store
            .save_booking(property_id, 7, now() + Duration::days(1), None)
            .await
            .unwrap();
        store
            .save_booking(property_id, 8, now() + Duration::days(2), None)
            .await
            .unwrap();
        update_booking_status(&store, first.id, "confirmed").await.unwrap();

        let list = |status: Option<&str>| BookingListQueryDto {
            status: status.map(str::to_string),
            page: None,
        };

        let all = list_bookings(&store, &list(None)).await.unwrap();
        assert_eq!(all.total, 2);

        let confirmed = list_bookings(&store, &list(Some("confirmed"))).await.unwrap();
        assert_eq!(confirmed.items.iter().map(|b| b.id).collect::<Vec<_>>(), vec![first.id]);

        let unknown = list_bookings(&store, &list(Some("archived"))).await.unwrap();
        assert_eq!(unknown.total, 0);
        assert!(unknown.items.is_empty());
    }
}
