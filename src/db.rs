// db.rs
use sqlx::{Pool, Postgres};

pub mod bookingdb;
pub mod catalogdb;
pub mod locationdb;
pub mod propertydb;
pub mod userdb;

#[cfg(test)]
pub mod memory;

#[derive(Debug, Clone)]
pub struct DBClient {
    pub pool: Pool<Postgres>,
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}
