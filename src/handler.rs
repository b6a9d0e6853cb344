pub mod admin;
pub mod auth;
pub mod locations;
pub mod properties;
pub mod users;
