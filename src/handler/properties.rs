use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;

use crate::{
    db::{catalogdb::CatalogExt, locationdb::LocationExt, propertydb::PropertyExt},
    dtos::{bookingdtos::CreateBookingDto, propertydtos::{PropertyFilterDto, PropertySearchQueryDto}},
    error::HttpError,
    middleware::{auth, JWTAuthMiddeware},
    service::{booking_service, listing_service, property_service},
    AppState,
};

const HOME_LATEST_LIMIT: i64 = 8;
const HOME_FEATURED_LIMIT: i64 = 6;

pub fn property_handler() -> Router {
    Router::new()
        .route("/", get(list_properties))
        .route("/:property_id", get(get_property))
        .route(
            "/:property_id/book",
            post(book_property).layer(middleware::from_fn(auth)),
        )
}

pub async fn home(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let db = app_state.db_client.as_ref();
    let read_failure = |e: sqlx::Error| HttpError::write_failure("load the home page", e);

    let latest = db.get_latest_properties(HOME_LATEST_LIMIT, false).await.map_err(read_failure)?;
    let featured = db.get_latest_properties(HOME_FEATURED_LIMIT, true).await.map_err(read_failure)?;
    let property_count = db.count_properties(None).await.map_err(read_failure)?;
    let regions = db.get_regions().await.map_err(read_failure)?;
    let property_types = db.get_property_types().await.map_err(read_failure)?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "latest_properties": PropertyFilterDto::filter_properties(&latest),
            "featured_properties": PropertyFilterDto::filter_properties(&featured),
            "property_count": property_count,
            "regions": regions,
            "property_types": property_types,
        }
    })))
}

pub async fn list_properties(
    Query(query_params): Query<PropertySearchQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let page = listing_service::search_public_listing(app_state.db_client.as_ref(), &query_params).await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": page.map(|property| PropertyFilterDto::from_property(&property)),
    })))
}

pub async fn get_property(
    Path(property_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let detail = property_service::get_property_detail(
        app_state.db_client.as_ref(),
        app_state.image_host.as_ref(),
        property_id,
    )
    .await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": detail,
    })))
}

pub async fn book_property(
    Path(property_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateBookingDto>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = booking_service::create_booking(
        app_state.db_client.as_ref(),
        property_id,
        user.user.id,
        &body,
        Utc::now(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "status": "success",
            "message": "Viewing request submitted",
            "data": { "booking": booking },
        })),
    ))
}
