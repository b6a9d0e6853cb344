use std::sync::Arc;

use axum::{extract::Query, response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{
    dtos::locationdtos::{CitiesQueryDto, DistrictsQueryDto, LocationOptionDto},
    error::HttpError,
    service::location_service,
    AppState,
};

/// Option lists for the dependent region, city and district selects.
pub fn location_handler() -> Router {
    Router::new()
        .route("/cities", get(get_cities))
        .route("/districts", get(get_districts))
}

pub async fn get_cities(
    Query(query_params): Query<CitiesQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let cities = location_service::cities_for_region(
        app_state.db_client.as_ref(),
        query_params.region_id.as_deref(),
    )
    .await?;

    Ok(Json(LocationOptionDto::from_cities(&cities)))
}

pub async fn get_districts(
    Query(query_params): Query<DistrictsQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let districts = location_service::districts_for_city(
        app_state.db_client.as_ref(),
        query_params.city_id.as_deref(),
    )
    .await?;

    Ok(Json(LocationOptionDto::from_districts(&districts)))
}
