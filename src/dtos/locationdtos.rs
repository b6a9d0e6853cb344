use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::locationmodel::{City, District};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CitiesQueryDto {
    pub region_id: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DistrictsQueryDto {
    pub city_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LocationOptionDto {
    pub id: i32,
    pub name: String,
}

impl LocationOptionDto {
    pub fn from_cities(cities: &[City]) -> Vec<LocationOptionDto> {
        cities
            .iter()
            .map(|city| LocationOptionDto { id: city.id, name: city.name.clone() })
            .collect()
    }

    pub fn from_districts(districts: &[District]) -> Vec<LocationOptionDto> {
        districts
            .iter()
            .map(|district| LocationOptionDto { id: district.id, name: district.name.clone() })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateRegionDto {
    #[validate(length(min = 1, max = 100, message = "Region name must be between 1 and 100 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCityDto {
    #[validate(length(min = 1, max = 100, message = "City name must be between 1 and 100 characters"))]
    pub name: String,
    pub region_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDistrictDto {
    #[validate(length(min = 1, max = 100, message = "District name must be between 1 and 100 characters"))]
    pub name: String,
    pub city_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePropertyTypeDto {
    #[validate(length(min = 1, max = 50, message = "Property type name must be between 1 and 50 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAmenityDto {
    #[validate(length(min = 1, max = 50, message = "Amenity name must be between 1 and 50 characters"))]
    pub name: String,
    #[validate(length(max = 50, message = "Icon must not exceed 50 characters"))]
    pub icon: Option<String>,
}
