use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{
    db::{bookingdb::BookingExt, propertydb::PropertyExt},
    dtos::{propertydtos::PropertyFilterDto, userdtos::FilterUserDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new().route("/me", get(get_me))
}

/// The current user with the listings they own and the viewings they booked.
pub async fn get_me(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let properties = app_state
        .db_client
        .get_properties_by_owner(user.user.id)
        .await
        .map_err(|e| HttpError::write_failure("load the profile", e))?;

    let bookings = app_state
        .db_client
        .get_bookings_by_user(user.user.id)
        .await
        .map_err(|e| HttpError::write_failure("load the profile", e))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "user": FilterUserDto::filter_user(&user.user),
            "properties": PropertyFilterDto::filter_properties(&properties),
            "bookings": bookings,
        }
    })))
}
