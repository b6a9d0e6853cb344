use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::usermodel::User;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(length(min = 9, max = 20, message = "Phone number must be between 9 and 20 characters"))]
    pub phone: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 8, message = "Password must be at least 8 characters")
    )]
    pub password: String,

    #[validate(
        length(min = 1, message = "Confirm Password is required"),
        must_match(other = "password", message = "passwords do not match")
    )]
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(length(min = 1, message = "Email is required"), email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Query of the admin user list; values stay raw strings so a bad value
/// never rejects the request.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserListQueryDto {
    pub role: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpdateDto {
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveUpdateDto {
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterUserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id,
            username: user.username.to_owned(),
            email: user.email.to_owned(),
            phone: user.phone.to_owned(),
            role: user.role.to_str().to_string(),
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }

    pub fn filter_users(users: &[User]) -> Vec<FilterUserDto> {
        users.iter().map(FilterUserDto::filter_user).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserData {
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponseDto {
    pub status: String,
    pub data: UserData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    pub status: String,
    pub token: String,
}

#[derive(Serialize, Deserialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> RegisterUserDto {
        RegisterUserDto {
            username: "layla".to_string(),
            email: "layla@example.com".to_string(),
            phone: "0551234567".to_string(),
            password: "s3cret-pass".to_string(),
            password_confirm: "s3cret-pass".to_string(),
        }
    }

    #[test]
    fn registration_accepts_valid_input() {
        assert!(valid_registration().validate().is_ok());
    }

    #[test]
    fn registration_rejects_mismatched_passwords() {
        let mut dto = valid_registration();
        dto.password_confirm = "something-else".to_string();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("passwordConfirm"));
    }

    #[test]
    fn registration_rejects_short_phone_and_bad_email() {
        let mut dto = valid_registration();
        dto.phone = "123".to_string();
        dto.email = "not-an-email".to_string();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("phone"));
        assert!(fields.contains_key("email"));
    }
}
