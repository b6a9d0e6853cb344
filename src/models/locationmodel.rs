use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Region {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct City {
    pub id: i32,
    pub name: String,
    pub region_id: i32,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct District {
    pub id: i32,
    pub name: String,
    pub city_id: i32,
}

/// A district together with the city and region it belongs to.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct DistrictPath {
    pub region_id: i32,
    pub region_name: String,
    pub city_id: i32,
    pub city_name: String,
    pub district_id: i32,
    pub district_name: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct CityNode {
    #[serde(flatten)]
    pub city: City,
    pub districts: Vec<District>,
}

#[derive(Debug, Serialize, Clone)]
pub struct RegionNode {
    #[serde(flatten)]
    pub region: Region,
    pub cities: Vec<CityNode>,
}
