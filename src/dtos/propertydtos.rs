use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};
use chrono::{DateTime, Utc};

use crate::models::{
    locationmodel::DistrictPath,
    propertymodel::{Amenity, Property, PropertyImage, TransactionType},
};

/// Public listing query. Every value is kept as a raw string and parsed
/// leniently later, so a malformed number drops that filter instead of
/// failing the request.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PropertySearchQueryDto {
    pub region_id: Option<String>,
    pub city_id: Option<String>,
    pub property_type_id: Option<String>,
    pub transaction_type: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    pub min_area: Option<String>,
    pub keyword: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AdminPropertyQueryDto {
    pub status: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePropertyDto {
    #[validate(length(min = 5, max = 150, message = "Title must be between 5 and 150 characters"))]
    pub title: String,

    #[validate(length(min = 20, max = 2000, message = "Description must be between 20 and 2000 characters"))]
    pub description: String,

    #[validate(range(min = 1.0, message = "Price must be greater than zero"))]
    pub price: f64,

    #[validate(range(min = 1.0, message = "Area must be greater than zero"))]
    pub area: f64,

    // Rooms and size
    #[validate(range(min = 0, message = "Bedrooms cannot be negative"))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, message = "Bathrooms cannot be negative"))]
    pub bathrooms: Option<i32>,
    #[validate(range(min = 1, message = "A property has at least one floor"))]
    pub floors: Option<i32>,
    #[validate(range(min = 1800, max = 2100, message = "Year built is out of range"))]
    pub year_built: Option<i32>,

    // Location
    pub district_id: i32,
    #[validate(length(min = 5, max = 200, message = "Address must be between 5 and 200 characters"))]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,

    // Classification
    pub property_type_id: i32,
    pub transaction_type: TransactionType,

    #[serde(default)]
    pub amenity_ids: Vec<i32>,
}

impl CreatePropertyDto {
    /// Field validation plus the coordinate ranges.
    pub fn validate_form(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if !(-90.0..=90.0).contains(&self.latitude) {
            errors.add("latitude", range_error("Latitude must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            errors.add("longitude", range_error("Longitude must be between -180 and 180"));
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn range_error(message: &'static str) -> ValidationError {
    let mut error = ValidationError::new("range");
    error.message = Some(Cow::from(message));
    error
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PropertyImageUploadDto {
    #[validate(length(min = 1, max = 255, message = "File name is required"))]
    pub file_name: String,

    /// Base64 image bytes, optionally as a `data:image/...;base64,` URL.
    #[validate(length(min = 1, message = "Image data is required"))]
    pub data: String,

    #[serde(default)]
    pub is_main: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateDto {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyImageDto {
    pub id: i32,
    pub remote_image_id: Option<String>,
    pub url: Option<String>,
    pub is_main: bool,
}

impl PropertyImageDto {
    pub fn from_image(image: &PropertyImage, url: Option<String>) -> Self {
        Self {
            id: image.id,
            remote_image_id: image.remote_image_id.clone(),
            url,
            is_main: image.is_main,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyFilterDto {
    pub id: i32,
    pub title: String,
    pub price: f64,
    pub area: f64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub address: String,
    pub district_id: i32,
    pub property_type_id: i32,
    pub transaction_type: String,
    pub status: String,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl PropertyFilterDto {
    pub fn from_property(property: &Property) -> Self {
        Self {
            id: property.id,
            title: property.title.clone(),
            price: property.price,
            area: property.area,
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            address: property.address.clone(),
            district_id: property.district_id,
            property_type_id: property.property_type_id,
            transaction_type: property.transaction_type.to_str().to_string(),
            status: property.status.to_str().to_string(),
            is_featured: property.is_featured,
            created_at: property.created_at,
        }
    }

    pub fn filter_properties(properties: &[Property]) -> Vec<PropertyFilterDto> {
        properties.iter().map(PropertyFilterDto::from_property).collect()
    }
}

#[derive(Debug, Serialize)]
pub struct PropertyDetailDto {
    pub property: Property,
    pub location: Option<DistrictPath>,
    pub images: Vec<PropertyImageDto>,
    pub amenities: Vec<Amenity>,
    pub similar: Vec<PropertyFilterDto>,
}
