// db/propertydb.rs
use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder, Transaction};

use crate::{
    db::DBClient,
    dtos::propertydtos::CreatePropertyDto,
    models::propertymodel::{Amenity, Property, PropertyImage, PropertyStatus},
    service::property_query::PropertyQuery,
};

const PROPERTY_COLUMNS: &str = "id, title, description, price, area, bedrooms, bathrooms, floors, \
     year_built, address, district_id, latitude, longitude, property_type_id, transaction_type, \
     is_featured, status, owner_id, created_at";

#[async_trait]
pub trait PropertyExt {
    async fn create_property(
        &self,
        owner_id: i32,
        property_data: &CreatePropertyDto,
    ) -> Result<Property, sqlx::Error>;

    /// Rewrites every editable field and replaces the amenity links.
    async fn update_property(
        &self,
        property_id: i32,
        property_data: &CreatePropertyDto,
    ) -> Result<Option<Property>, sqlx::Error>;

    async fn get_property_by_id(
        &self,
        property_id: i32,
    ) -> Result<Option<Property>, sqlx::Error>;

    /// One page of matches together with the total match count.
    async fn search_properties(
        &self,
        query: &PropertyQuery,
    ) -> Result<(Vec<Property>, i64), sqlx::Error>;

    async fn get_similar_properties(
        &self,
        property: &Property,
        limit: i64,
    ) -> Result<Vec<Property>, sqlx::Error>;

    async fn get_latest_properties(
        &self,
        limit: i64,
        featured_only: bool,
    ) -> Result<Vec<Property>, sqlx::Error>;

    async fn get_properties_by_owner(
        &self,
        owner_id: i32,
    ) -> Result<Vec<Property>, sqlx::Error>;

    async fn count_properties(
        &self,
        status: Option<PropertyStatus>,
    ) -> Result<i64, sqlx::Error>;

    async fn update_property_status(
        &self,
        property_id: i32,
        status: PropertyStatus,
    ) -> Result<Option<Property>, sqlx::Error>;

    async fn toggle_featured(
        &self,
        property_id: i32,
    ) -> Result<Option<Property>, sqlx::Error>;

    async fn get_property_images(
        &self,
        property_id: i32,
    ) -> Result<Vec<PropertyImage>, sqlx::Error>;

    /// A new main image demotes the previous one.
    async fn save_property_image(
        &self,
        property_id: i32,
        remote_image_id: Option<String>,
        is_main: bool,
    ) -> Result<PropertyImage, sqlx::Error>;

    async fn get_property_amenities(
        &self,
        property_id: i32,
    ) -> Result<Vec<Amenity>, sqlx::Error>;

    /// Removes images, amenity links and the property row in one transaction.
    /// Returns false when the property did not exist.
    async fn delete_property(
        &self,
        property_id: i32,
    ) -> Result<bool, sqlx::Error>;
}

pub fn build_search_query(query: &PropertyQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM properties", PROPERTY_COLUMNS));
    query.push_where(&mut builder);
    builder.push(query.sort().order_by_clause());
    builder
        .push(" LIMIT ")
        .push_bind(query.page().limit())
        .push(" OFFSET ")
        .push_bind(query.page().offset());
    builder
}

pub fn build_count_query(query: &PropertyQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM properties");
    query.push_where(&mut builder);
    builder
}

// Unknown amenity ids are skipped.
async fn link_amenities(
    tx: &mut Transaction<'_, Postgres>,
    property_id: i32,
    amenity_ids: &[i32],
) -> Result<(), sqlx::Error> {
    if amenity_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO property_amenity (property_id, amenity_id)
        SELECT $1, id FROM amenities WHERE id = ANY($2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(property_id)
    .bind(amenity_ids.to_vec())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait]
impl PropertyExt for DBClient {
    async fn create_property(
        &self,
        owner_id: i32,
        property_data: &CreatePropertyDto,
    ) -> Result<Property, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO properties (
                title, description, price, area, bedrooms, bathrooms, floors, year_built,
                address, district_id, latitude, longitude, property_type_id, transaction_type,
                status, owner_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            PROPERTY_COLUMNS
        );

        let mut tx = self.pool.begin().await?;

        let property = sqlx::query_as::<_, Property>(&sql)
            .bind(&property_data.title)
            .bind(&property_data.description)
            .bind(property_data.price)
            .bind(property_data.area)
            .bind(property_data.bedrooms.unwrap_or(0))
            .bind(property_data.bathrooms.unwrap_or(0))
            .bind(property_data.floors.unwrap_or(1))
            .bind(property_data.year_built)
            .bind(&property_data.address)
            .bind(property_data.district_id)
            .bind(property_data.latitude)
            .bind(property_data.longitude)
            .bind(property_data.property_type_id)
            .bind(property_data.transaction_type)
            .bind(PropertyStatus::Available)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;

        link_amenities(&mut tx, property.id, &property_data.amenity_ids).await?;

        tx.commit().await?;

        Ok(property)
    }

    async fn update_property(
        &self,
        property_id: i32,
        property_data: &CreatePropertyDto,
    ) -> Result<Option<Property>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE properties
            SET title = $1, description = $2, price = $3, area = $4, bedrooms = $5,
                bathrooms = $6, floors = $7, year_built = $8, address = $9, district_id = $10,
                latitude = $11, longitude = $12, property_type_id = $13, transaction_type = $14
            WHERE id = $15
            RETURNING {}
            "#,
            PROPERTY_COLUMNS
        );

        let mut tx = self.pool.begin().await?;

        let property = sqlx::query_as::<_, Property>(&sql)
            .bind(&property_data.title)
            .bind(&property_data.description)
            .bind(property_data.price)
            .bind(property_data.area)
            .bind(property_data.bedrooms.unwrap_or(0))
            .bind(property_data.bathrooms.unwrap_or(0))
            .bind(property_data.floors.unwrap_or(1))
            .bind(property_data.year_built)
            .bind(&property_data.address)
            .bind(property_data.district_id)
            .bind(property_data.latitude)
            .bind(property_data.longitude)
            .bind(property_data.property_type_id)
            .bind(property_data.transaction_type)
            .bind(property_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(property) = property else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM property_amenity WHERE property_id = $1")
            .bind(property_id)
            .execute(&mut *tx)
            .await?;

        link_amenities(&mut tx, property_id, &property_data.amenity_ids).await?;

        tx.commit().await?;

        Ok(Some(property))
    }

    async fn get_property_by_id(
        &self,
        property_id: i32,
    ) -> Result<Option<Property>, sqlx::Error> {
        let sql = format!("SELECT {} FROM properties WHERE id = $1", PROPERTY_COLUMNS);

        let property = sqlx::query_as::<_, Property>(&sql)
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(property)
    }

    async fn search_properties(
        &self,
        query: &PropertyQuery,
    ) -> Result<(Vec<Property>, i64), sqlx::Error> {
        let total: i64 = build_count_query(query)
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let properties = build_search_query(query)
            .build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await?;

        Ok((properties, total))
    }

    async fn get_similar_properties(
        &self,
        property: &Property,
        limit: i64,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {}
            FROM properties
            WHERE property_type_id = $1
              AND transaction_type = $2
              AND status = $3
              AND id <> $4
            ORDER BY created_at DESC, id DESC
            LIMIT $5
            "#,
            PROPERTY_COLUMNS
        );

        let properties = sqlx::query_as::<_, Property>(&sql)
            .bind(property.property_type_id)
            .bind(property.transaction_type)
            .bind(PropertyStatus::Available)
            .bind(property.id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(properties)
    }

    async fn get_latest_properties(
        &self,
        limit: i64,
        featured_only: bool,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {}
            FROM properties
            WHERE ($1 = FALSE OR is_featured = TRUE)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
            PROPERTY_COLUMNS
        );

        let properties = sqlx::query_as::<_, Property>(&sql)
            .bind(featured_only)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(properties)
    }

    async fn get_properties_by_owner(
        &self,
        owner_id: i32,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM properties WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
            PROPERTY_COLUMNS
        );

        let properties = sqlx::query_as::<_, Property>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(properties)
    }

    async fn count_properties(
        &self,
        status: Option<PropertyStatus>,
    ) -> Result<i64, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM properties WHERE ($1::property_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn update_property_status(
        &self,
        property_id: i32,
        status: PropertyStatus,
    ) -> Result<Option<Property>, sqlx::Error> {
        let sql = format!(
            "UPDATE properties SET status = $1 WHERE id = $2 RETURNING {}",
            PROPERTY_COLUMNS
        );

        let property = sqlx::query_as::<_, Property>(&sql)
            .bind(status)
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(property)
    }

    async fn toggle_featured(
        &self,
        property_id: i32,
    ) -> Result<Option<Property>, sqlx::Error> {
        let sql = format!(
            "UPDATE properties SET is_featured = NOT is_featured WHERE id = $1 RETURNING {}",
            PROPERTY_COLUMNS
        );

        let property = sqlx::query_as::<_, Property>(&sql)
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(property)
    }

    async fn get_property_images(
        &self,
        property_id: i32,
    ) -> Result<Vec<PropertyImage>, sqlx::Error> {
        sqlx::query_as::<_, PropertyImage>(
            r#"
            SELECT id, property_id, remote_image_id, is_main
            FROM property_images
            WHERE property_id = $1
            ORDER BY is_main DESC, id
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn save_property_image(
        &self,
        property_id: i32,
        remote_image_id: Option<String>,
        is_main: bool,
    ) -> Result<PropertyImage, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if is_main {
            sqlx::query("UPDATE property_images SET is_main = FALSE WHERE property_id = $1")
                .bind(property_id)
                .execute(&mut *tx)
                .await?;
        }

        let image = sqlx::query_as::<_, PropertyImage>(
            r#"
            INSERT INTO property_images (property_id, remote_image_id, is_main)
            VALUES ($1, $2, $3)
            RETURNING id, property_id, remote_image_id, is_main
            "#,
        )
        .bind(property_id)
        .bind(remote_image_id)
        .bind(is_main)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(image)
    }

    async fn get_property_amenities(
        &self,
        property_id: i32,
    ) -> Result<Vec<Amenity>, sqlx::Error> {
        sqlx::query_as::<_, Amenity>(
            r#"
            SELECT a.id, a.name, a.icon
            FROM amenities a
            JOIN property_amenity pa ON pa.amenity_id = a.id
            WHERE pa.property_id = $1
            ORDER BY a.name
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn delete_property(
        &self,
        property_id: i32,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM property_images WHERE property_id = $1")
            .bind(property_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM property_amenity WHERE property_id = $1")
            .bind(property_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(property_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok(deleted > 0)
    }
}
