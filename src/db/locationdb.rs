// db/locationdb.rs
use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::{
    db::DBClient,
    models::locationmodel::{City, CityNode, District, DistrictPath, Region, RegionNode},
};

#[async_trait]
pub trait LocationExt {
    async fn get_regions(&self) -> Result<Vec<Region>, sqlx::Error>;

    async fn get_region(&self, region_id: i32) -> Result<Option<Region>, sqlx::Error>;

    async fn save_region(&self, name: &str) -> Result<Region, sqlx::Error>;

    async fn get_cities(&self) -> Result<Vec<City>, sqlx::Error>;

    async fn get_city(&self, city_id: i32) -> Result<Option<City>, sqlx::Error>;

    async fn get_cities_by_region(&self, region_id: i32) -> Result<Vec<City>, sqlx::Error>;

    async fn save_city(&self, name: &str, region_id: i32) -> Result<City, sqlx::Error>;

    async fn get_districts(&self) -> Result<Vec<District>, sqlx::Error>;

    async fn get_districts_by_city(&self, city_id: i32) -> Result<Vec<District>, sqlx::Error>;

    async fn save_district(&self, name: &str, city_id: i32) -> Result<District, sqlx::Error>;

    async fn get_district_path(&self, district_id: i32) -> Result<Option<DistrictPath>, sqlx::Error>;

    /// Every district under the region, through its cities. Empty when the
    /// region is unknown or has no districts yet.
    async fn resolve_districts_for_region(&self, region_id: i32) -> Result<BTreeSet<i32>, sqlx::Error>;

    async fn resolve_districts_for_city(&self, city_id: i32) -> Result<BTreeSet<i32>, sqlx::Error>;

    async fn get_location_tree(&self) -> Result<Vec<RegionNode>, sqlx::Error> {
        let regions = self.get_regions().await?;
        let cities = self.get_cities().await?;
        let districts = self.get_districts().await?;

        Ok(build_location_tree(regions, cities, districts))
    }
}

pub fn build_location_tree(
    regions: Vec<Region>,
    cities: Vec<City>,
    districts: Vec<District>,
) -> Vec<RegionNode> {
    regions
        .into_iter()
        .map(|region| {
            let cities = cities
                .iter()
                .filter(|city| city.region_id == region.id)
                .map(|city| CityNode {
                    city: city.clone(),
                    districts: districts
                        .iter()
                        .filter(|district| district.city_id == city.id)
                        .cloned()
                        .collect(),
                })
                .collect();

            RegionNode { region, cities }
        })
        .collect()
}

#[async_trait]
impl LocationExt for DBClient {
    async fn get_regions(&self) -> Result<Vec<Region>, sqlx::Error> {
        sqlx::query_as::<_, Region>("SELECT id, name FROM regions ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
    }

    async fn get_region(&self, region_id: i32) -> Result<Option<Region>, sqlx::Error> {
        sqlx::query_as::<_, Region>("SELECT id, name FROM regions WHERE id = $1")
            .bind(region_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn save_region(&self, name: &str) -> Result<Region, sqlx::Error> {
        sqlx::query_as::<_, Region>("INSERT INTO regions (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_cities(&self) -> Result<Vec<City>, sqlx::Error> {
        sqlx::query_as::<_, City>("SELECT id, name, region_id FROM cities ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
    }

    async fn get_city(&self, city_id: i32) -> Result<Option<City>, sqlx::Error> {
        sqlx::query_as::<_, City>("SELECT id, name, region_id FROM cities WHERE id = $1")
            .bind(city_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_cities_by_region(&self, region_id: i32) -> Result<Vec<City>, sqlx::Error> {
        sqlx::query_as::<_, City>(
            "SELECT id, name, region_id FROM cities WHERE region_id = $1 ORDER BY name, id",
        )
        .bind(region_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn save_city(&self, name: &str, region_id: i32) -> Result<City, sqlx::Error> {
        sqlx::query_as::<_, City>(
            "INSERT INTO cities (name, region_id) VALUES ($1, $2) RETURNING id, name, region_id",
        )
        .bind(name)
        .bind(region_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_districts(&self) -> Result<Vec<District>, sqlx::Error> {
        sqlx::query_as::<_, District>("SELECT id, name, city_id FROM districts ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
    }

    async fn get_districts_by_city(&self, city_id: i32) -> Result<Vec<District>, sqlx::Error> {
        sqlx::query_as::<_, District>(
            "SELECT id, name, city_id FROM districts WHERE city_id = $1 ORDER BY name, id",
        )
        .bind(city_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn save_district(&self, name: &str, city_id: i32) -> Result<District, sqlx::Error> {
        sqlx::query_as::<_, District>(
            "INSERT INTO districts (name, city_id) VALUES ($1, $2) RETURNING id, name, city_id",
        )
        .bind(name)
        .bind(city_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_district_path(&self, district_id: i32) -> Result<Option<DistrictPath>, sqlx::Error> {
        sqlx::query_as::<_, DistrictPath>(
            r#"
            SELECT
                r.id AS region_id, r.name AS region_name,
                c.id AS city_id, c.name AS city_name,
                d.id AS district_id, d.name AS district_name
            FROM districts d
            JOIN cities c ON c.id = d.city_id
            JOIN regions r ON r.id = c.region_id
            WHERE d.id = $1
            "#,
        )
        .bind(district_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn resolve_districts_for_region(&self, region_id: i32) -> Result<BTreeSet<i32>, sqlx::Error> {
        let ids: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT d.id
            FROM districts d
            JOIN cities c ON c.id = d.city_id
            WHERE c.region_id = $1
            "#,
        )
        .bind(region_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn resolve_districts_for_city(&self, city_id: i32) -> Result<BTreeSet<i32>, sqlx::Error> {
        let ids: Vec<i32> = sqlx::query_scalar("SELECT id FROM districts WHERE city_id = $1")
            .bind(city_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }
}
