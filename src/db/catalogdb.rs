// db/catalogdb.rs
use async_trait::async_trait;

use crate::{
    db::DBClient,
    models::propertymodel::{Amenity, PropertyType},
};

#[async_trait]
pub trait CatalogExt {
    async fn get_property_types(&self) -> Result<Vec<PropertyType>, sqlx::Error>;

    async fn get_property_type(&self, property_type_id: i32) -> Result<Option<PropertyType>, sqlx::Error>;

    async fn save_property_type(&self, name: &str) -> Result<PropertyType, sqlx::Error>;

    async fn get_amenities(&self) -> Result<Vec<Amenity>, sqlx::Error>;

    async fn save_amenity(&self, name: &str, icon: Option<&str>) -> Result<Amenity, sqlx::Error>;
}

#[async_trait]
impl CatalogExt for DBClient {
    async fn get_property_types(&self) -> Result<Vec<PropertyType>, sqlx::Error> {
        sqlx::query_as::<_, PropertyType>("SELECT id, name FROM property_types ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
    }

    async fn get_property_type(&self, property_type_id: i32) -> Result<Option<PropertyType>, sqlx::Error> {
        sqlx::query_as::<_, PropertyType>("SELECT id, name FROM property_types WHERE id = $1")
            .bind(property_type_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn save_property_type(&self, name: &str) -> Result<PropertyType, sqlx::Error> {
        sqlx::query_as::<_, PropertyType>(
            "INSERT INTO property_types (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_amenities(&self) -> Result<Vec<Amenity>, sqlx::Error> {
        sqlx::query_as::<_, Amenity>("SELECT id, name, icon FROM amenities ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
    }

    async fn save_amenity(&self, name: &str, icon: Option<&str>) -> Result<Amenity, sqlx::Error> {
        sqlx::query_as::<_, Amenity>(
            "INSERT INTO amenities (name, icon) VALUES ($1, $2) RETURNING id, name, icon",
        )
        .bind(name)
        .bind(icon)
        .fetch_one(&self.pool)
        .await
    }
}
