use sqlx::types::chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "property_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Available,
    Sold,
    Rented,
}

impl PropertyStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Sold => "sold",
            PropertyStatus::Rented => "rented",
        }
    }

    pub fn parse(value: &str) -> Option<PropertyStatus> {
        match value {
            "available" => Some(PropertyStatus::Available),
            "sold" => Some(PropertyStatus::Sold),
            "rented" => Some(PropertyStatus::Rented),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Sale,
    Rent,
}

impl TransactionType {
    pub fn to_str(&self) -> &str {
        match self {
            TransactionType::Sale => "sale",
            TransactionType::Rent => "rent",
        }
    }

    pub fn parse(value: &str) -> Option<TransactionType> {
        match value {
            "sale" => Some(TransactionType::Sale),
            "rent" => Some(TransactionType::Rent),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct PropertyType {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Amenity {
    pub id: i32,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Property {
    pub id: i32,

    pub title: String,
    pub description: String,
    pub price: f64,
    pub area: f64,

    // Rooms and size
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub floors: i32,
    pub year_built: Option<i32>,

    // Location
    pub address: String,
    pub district_id: i32,
    pub latitude: f64,
    pub longitude: f64,

    pub property_type_id: i32,
    pub transaction_type: TransactionType,
    pub is_featured: bool,
    pub status: PropertyStatus,
    pub owner_id: i32,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct PropertyImage {
    pub id: i32,
    pub property_id: i32,
    /// Public id on the image host, `None` for images that were never uploaded there.
    pub remote_image_id: Option<String>,
    pub is_main: bool,
}
