// db/bookingdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    db::DBClient,
    dtos::pagination::PageRequest,
    models::bookingmodel::{Booking, BookingStatus},
};

#[async_trait]
pub trait BookingExt {
    /// Always inserted as `pending`.
    async fn save_booking(
        &self,
        property_id: i32,
        user_id: i32,
        booking_date: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Booking, sqlx::Error>;

    async fn get_bookings(
        &self,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Booking>, i64), sqlx::Error>;

    async fn get_bookings_by_user(&self, user_id: i32) -> Result<Vec<Booking>, sqlx::Error>;

    async fn get_latest_bookings(&self, limit: i64) -> Result<Vec<Booking>, sqlx::Error>;

    async fn count_bookings(&self, status: Option<BookingStatus>) -> Result<i64, sqlx::Error>;

    async fn update_booking_status(
        &self,
        booking_id: i32,
        status: BookingStatus,
    ) -> Result<Option<Booking>, sqlx::Error>;
}

#[async_trait]
impl BookingExt for DBClient {
    async fn save_booking(
        &self,
        property_id: i32,
        user_id: i32,
        booking_date: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (property_id, user_id, booking_date, notes, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, property_id, user_id, booking_date, notes, status, created_at
            "#,
        )
        .bind(property_id)
        .bind(user_id)
        .bind(booking_date)
        .bind(notes)
        .bind(BookingStatus::Pending)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_bookings(
        &self,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Booking>, i64), sqlx::Error> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, property_id, user_id, booking_date, notes, status, created_at
            FROM bookings
            WHERE ($1::booking_status IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = self.count_bookings(status).await?;

        Ok((bookings, total))
    }

    async fn get_bookings_by_user(&self, user_id: i32) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, property_id, user_id, booking_date, notes, status, created_at
            FROM bookings
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_latest_bookings(&self, limit: i64) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, property_id, user_id, booking_date, notes, status, created_at
            FROM bookings
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_bookings(&self, status: Option<BookingStatus>) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings WHERE ($1::booking_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_booking_status(
        &self,
        booking_id: i32,
        status: BookingStatus,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $1
            WHERE id = $2
            RETURNING id, property_id, user_id, booking_date, notes, status, created_at
            "#,
        )
        .bind(status)
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
    }
}
