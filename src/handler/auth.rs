use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::Cookie;
use validator::Validate;

use crate::{
    db::userdb::UserExt,
    dtos::userdtos::{FilterUserDto, LoginUserDto, RegisterUserDto, Response, UserData, UserLoginResponseDto, UserResponseDto},
    error::{ErrorMessage, HttpError},
    utils::{password, token},
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

fn set_cookie(response: &mut axum::response::Response, cookie: Cookie<'_>) -> Result<(), HttpError> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| HttpError::write_failure("set the session cookie", e))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}

// Length problems are the caller's fault; anything else is hidden.
fn hash_password(raw: &str) -> Result<String, HttpError> {
    password::hash(raw).map_err(|e| match e {
        ErrorMessage::EmptyPassword | ErrorMessage::ExceededMaxPasswordLength(_) => {
            HttpError::bad_request(e.to_string())
        }
        _ => HttpError::write_failure("register the account", e.to_string()),
    })
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let existing_user = app_state
        .db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::write_failure("register the account", e))?;

    if existing_user.is_some() {
        return Err(HttpError::unique_constraint_violation(ErrorMessage::EmailExist.to_string()));
    }

    let hashed_password = hash_password(&body.password)?;

    let user = app_state
        .db_client
        .save_user(body.username, body.email, body.phone, hashed_password)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                HttpError::unique_constraint_violation("Username or email is already taken")
            }
            _ => HttpError::write_failure("register the account", e),
        })?;

    tracing::info!("User {} registered", user.id);

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user),
        },
    }))
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::write_failure("log in", e))?
        .ok_or_else(|| {
            tracing::warn!("Login attempt for unknown email");
            HttpError::bad_request(ErrorMessage::WrongCredentials.to_string())
        })?;

    let password_matched = password::compare(&body.password, &user.password_hash)
        .map_err(|_| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matched {
        tracing::warn!("Wrong password for user {}", user.id);
        return Err(HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()));
    }

    if !user.is_active {
        tracing::warn!("Disabled user {} tried to log in", user.id);
        return Err(HttpError::forbidden(ErrorMessage::AccountDisabled.to_string()));
    }

    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::write_failure("issue the session token", e))?;

    let cookie = Cookie::build(("token", token.clone()))
        .path("/")
        .max_age(time::Duration::minutes(app_state.env.jwt_maxage))
        .http_only(true)
        .build();

    let mut response = Json(UserLoginResponseDto {
        status: "success".to_string(),
        token,
    })
    .into_response();

    set_cookie(&mut response, cookie)?;

    Ok(response)
}

pub async fn logout() -> Result<impl IntoResponse, HttpError> {
    let cookie = Cookie::build(("token", ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .http_only(true)
        .build();

    let mut response = Json(Response {
        status: "success",
        message: "Logged out".to_string(),
    })
    .into_response();

    set_cookie(&mut response, cookie)?;

    Ok(response)
}
