use thiserror::Error;

use crate::error::HttpError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Property not found")]
    PropertyNotFound,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Region not found")]
    RegionNotFound,

    #[error("City not found")]
    CityNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Image host error: {0}")]
    ImageHost(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::PropertyNotFound
            | ServiceError::BookingNotFound
            | ServiceError::UserNotFound
            | ServiceError::RegionNotFound
            | ServiceError::CityNotFound => HttpError::not_found(error.to_string()),
            ServiceError::Validation(message) => HttpError::bad_request(message),
            ServiceError::ImageHost(message) => HttpError::write_failure("reach the image host", message),
            ServiceError::Database(err) => HttpError::write_failure("complete the request", err),
        }
    }
}
