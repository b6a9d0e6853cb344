use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::{
        bookingdb::BookingExt, catalogdb::CatalogExt, locationdb::LocationExt,
        propertydb::PropertyExt, userdb::UserExt,
    },
    dtos::{
        bookingdtos::{BookingListQueryDto, BookingStatusUpdateDto},
        locationdtos::{
            CreateAmenityDto, CreateCityDto, CreateDistrictDto, CreatePropertyTypeDto,
            CreateRegionDto,
        },
        pagination::{ExactFilter, PageRequest, Paginated, ADMIN_PAGE_SIZE},
        propertydtos::{
            AdminPropertyQueryDto, CreatePropertyDto, PropertyFilterDto, PropertyImageDto,
            PropertyImageUploadDto, StatusUpdateDto,
        },
        userdtos::{ActiveUpdateDto, FilterUserDto, Response, RoleUpdateDto, UserListQueryDto},
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::{bookingmodel::BookingStatus, propertymodel::PropertyStatus, usermodel::UserRole},
    service::{
        booking_service, error::ServiceError, listing_service, location_service,
        property_service,
    },
    AppState,
};

const DASHBOARD_LATEST_LIMIT: i64 = 5;

pub fn admin_handler() -> Router {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/properties", get(list_properties).post(create_property))
        .route(
            "/properties/:property_id",
            get(get_property).put(update_property).delete(delete_property),
        )
        .route("/properties/:property_id/images", post(upload_image))
        .route("/properties/:property_id/featured", post(toggle_featured))
        .route("/properties/:property_id/status", put(update_property_status))
        .route("/users", get(list_users))
        .route("/users/:user_id/role", put(update_user_role))
        .route("/users/:user_id/active", put(update_user_active))
        .route("/bookings", get(list_bookings))
        .route("/bookings/:booking_id/status", put(update_booking_status))
        .route("/regions", get(get_location_tree).post(create_region))
        .route("/cities", post(create_city))
        .route("/districts", post(create_district))
        .route("/property-types", get(get_property_types).post(create_property_type))
        .route("/amenities", get(get_amenities).post(create_amenity))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            role_check(req, next, vec![UserRole::Admin])
        }))
}

fn success<T: serde::Serialize>(data: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "success",
        "data": data,
    }))
}

fn created<T: serde::Serialize>(data: T) -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::CREATED, success(data))
}

fn unique_or_failure(action: &'static str, what: &'static str) -> impl Fn(sqlx::Error) -> HttpError {
    move |e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            HttpError::unique_constraint_violation(format!("{} already exists", what))
        }
        _ => HttpError::write_failure(action, e),
    }
}

pub async fn dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let db = app_state.db_client.as_ref();
    let read_failure = |e: sqlx::Error| HttpError::write_failure("load the dashboard", e);

    let total_properties = db.count_properties(None).await.map_err(read_failure)?;
    let available_properties = db
        .count_properties(Some(PropertyStatus::Available))
        .await
        .map_err(read_failure)?;
    let total_users = db.get_user_count(None).await.map_err(read_failure)?;
    let pending_bookings = db
        .count_bookings(Some(BookingStatus::Pending))
        .await
        .map_err(read_failure)?;

    let latest_users = db.get_latest_users(DASHBOARD_LATEST_LIMIT).await.map_err(read_failure)?;
    let latest_properties = db
        .get_latest_properties(DASHBOARD_LATEST_LIMIT, false)
        .await
        .map_err(read_failure)?;
    let latest_bookings = db.get_latest_bookings(DASHBOARD_LATEST_LIMIT).await.map_err(read_failure)?;

    Ok(success(serde_json::json!({
        "total_properties": total_properties,
        "available_properties": available_properties,
        "total_users": total_users,
        "pending_bookings": pending_bookings,
        "latest_users": FilterUserDto::filter_users(&latest_users),
        "latest_properties": PropertyFilterDto::filter_properties(&latest_properties),
        "latest_bookings": latest_bookings,
    })))
}

pub async fn list_properties(
    Query(query_params): Query<AdminPropertyQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let page = listing_service::search_admin_listing(app_state.db_client.as_ref(), &query_params).await?;

    Ok(success(page.map(|property| PropertyFilterDto::from_property(&property))))
}

pub async fn create_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    let property =
        property_service::create_property(app_state.db_client.as_ref(), user.user.id, &body).await?;

    Ok(created(serde_json::json!({ "property": property })))
}

/// Everything the edit form needs: the row, its location path, amenities and images.
pub async fn get_property(
    Path(property_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let db = app_state.db_client.as_ref();
    let read_failure = |e: sqlx::Error| HttpError::write_failure("load the property", e);

    let property = db
        .get_property_by_id(property_id)
        .await
        .map_err(read_failure)?
        .ok_or(ServiceError::PropertyNotFound)?;

    let location = db.get_district_path(property.district_id).await.map_err(read_failure)?;
    let amenities = db.get_property_amenities(property_id).await.map_err(read_failure)?;
    let images: Vec<PropertyImageDto> = db
        .get_property_images(property_id)
        .await
        .map_err(read_failure)?
        .iter()
        .map(|image| {
            let url = image
                .remote_image_id
                .as_deref()
                .map(|id| app_state.image_host.image_url(id));
            PropertyImageDto::from_image(image, url)
        })
        .collect();

    Ok(success(serde_json::json!({
        "property": property,
        "location": location,
        "amenity_ids": amenities.iter().map(|a| a.id).collect::<Vec<_>>(),
        "images": images,
    })))
}

pub async fn update_property(
    Path(property_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    let property =
        property_service::update_property(app_state.db_client.as_ref(), property_id, &body).await?;

    Ok(success(serde_json::json!({ "property": property })))
}

pub async fn delete_property(
    Path(property_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    property_service::delete_property(
        app_state.db_client.as_ref(),
        app_state.image_host.as_ref(),
        property_id,
    )
    .await?;

    Ok(Json(Response {
        status: "success",
        message: "Property deleted".to_string(),
    }))
}

pub async fn upload_image(
    Path(property_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<PropertyImageUploadDto>,
) -> Result<impl IntoResponse, HttpError> {
    let image = property_service::upload_property_image(
        app_state.db_client.as_ref(),
        app_state.image_host.as_ref(),
        property_id,
        &body,
    )
    .await?;

    let url = image
        .remote_image_id
        .as_deref()
        .map(|id| app_state.image_host.image_url(id));

    Ok(created(serde_json::json!({ "image": PropertyImageDto::from_image(&image, url) })))
}

pub async fn toggle_featured(
    Path(property_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property = property_service::toggle_featured(app_state.db_client.as_ref(), property_id).await?;

    Ok(success(serde_json::json!({
        "id": property.id,
        "is_featured": property.is_featured,
    })))
}

pub async fn update_property_status(
    Path(property_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<StatusUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    let property =
        property_service::set_property_status(app_state.db_client.as_ref(), property_id, &body.status)
            .await?;

    Ok(success(serde_json::json!({
        "id": property.id,
        "status": property.status,
    })))
}

pub async fn list_users(
    Query(query_params): Query<UserListQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let page = PageRequest::from_query(query_params.page.as_deref(), ADMIN_PAGE_SIZE);
    let role = match ExactFilter::from_query(query_params.role.as_deref(), None, UserRole::parse) {
        ExactFilter::Any => None,
        ExactFilter::Only(role) => Some(role),
        ExactFilter::Unmatched => {
            return Ok(success(Paginated::new(Vec::<FilterUserDto>::new(), 0, page)));
        }
    };

    let (users, total) = app_state
        .db_client
        .get_users(role, page)
        .await
        .map_err(|e| HttpError::write_failure("load users", e))?;

    Ok(success(Paginated::new(FilterUserDto::filter_users(&users), total, page)))
}

pub async fn update_user_role(
    Path(user_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RoleUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    let role = UserRole::parse(body.role.trim())
        .ok_or_else(|| HttpError::bad_request("Invalid role"))?;

    let user = app_state
        .db_client
        .update_user_role(user_id, role)
        .await
        .map_err(|e| HttpError::write_failure("update the user role", e))?
        .ok_or(ServiceError::UserNotFound)?;

    tracing::info!("User {} is now {}", user.id, user.role.to_str());

    Ok(success(serde_json::json!({ "user": FilterUserDto::filter_user(&user) })))
}

pub async fn update_user_active(
    Path(user_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<ActiveUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    let user = app_state
        .db_client
        .update_user_active(user_id, body.is_active)
        .await
        .map_err(|e| HttpError::write_failure("update the user", e))?
        .ok_or(ServiceError::UserNotFound)?;

    Ok(success(serde_json::json!({ "user": FilterUserDto::filter_user(&user) })))
}

pub async fn list_bookings(
    Query(query_params): Query<BookingListQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let page = booking_service::list_bookings(app_state.db_client.as_ref(), &query_params).await?;

    Ok(success(page))
}

pub async fn update_booking_status(
    Path(booking_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<BookingStatusUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    let booking =
        booking_service::update_booking_status(app_state.db_client.as_ref(), booking_id, &body.status)
            .await?;

    Ok(success(serde_json::json!({ "booking": booking })))
}

pub async fn get_location_tree(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let tree = app_state
        .db_client
        .get_location_tree()
        .await
        .map_err(|e| HttpError::write_failure("load regions", e))?;

    Ok(success(tree))
}

pub async fn create_region(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateRegionDto>,
) -> Result<impl IntoResponse, HttpError> {
    let region = location_service::create_region(app_state.db_client.as_ref(), &body).await?;
    Ok(created(region))
}

pub async fn create_city(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateCityDto>,
) -> Result<impl IntoResponse, HttpError> {
    let city = location_service::create_city(app_state.db_client.as_ref(), &body).await?;
    Ok(created(city))
}

pub async fn create_district(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateDistrictDto>,
) -> Result<impl IntoResponse, HttpError> {
    let district = location_service::create_district(app_state.db_client.as_ref(), &body).await?;
    Ok(created(district))
}

pub async fn get_property_types(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property_types = app_state
        .db_client
        .get_property_types()
        .await
        .map_err(|e| HttpError::write_failure("load property types", e))?;

    Ok(success(property_types))
}

pub async fn create_property_type(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreatePropertyTypeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property_type = app_state
        .db_client
        .save_property_type(body.name.trim())
        .await
        .map_err(|e| HttpError::write_failure("create the property type", e))?;

    Ok(created(property_type))
}

pub async fn get_amenities(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let amenities = app_state
        .db_client
        .get_amenities()
        .await
        .map_err(|e| HttpError::write_failure("load amenities", e))?;

    Ok(success(amenities))
}

pub async fn create_amenity(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateAmenityDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let amenity = app_state
        .db_client
        .save_amenity(body.name.trim(), body.icon.as_deref())
        .await
        .map_err(unique_or_failure("create the amenity", "Amenity"))?;

    Ok(created(amenity))
}
