pub mod booking_service;
pub mod error;
pub mod image_host;
pub mod listing_service;
pub mod location_service;
pub mod property_query;
pub mod property_service;
