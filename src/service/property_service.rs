// service/property_service.rs
use base64::{engine::general_purpose::STANDARD, Engine as _};
use validator::Validate;

use crate::{
    db::{catalogdb::CatalogExt, locationdb::LocationExt, propertydb::PropertyExt},
    dtos::propertydtos::{
        CreatePropertyDto, PropertyDetailDto, PropertyFilterDto, PropertyImageDto,
        PropertyImageUploadDto,
    },
    models::propertymodel::{Property, PropertyImage, PropertyStatus},
    service::{
        error::ServiceError,
        image_host::{file_extension, ImageHost, ALLOWED_IMAGE_EXTENSIONS},
    },
};

pub const SIMILAR_PROPERTIES_LIMIT: i64 = 3;

fn validation_message(errors: validator::ValidationErrors) -> ServiceError {
    ServiceError::validation(errors.to_string())
}

async fn check_references<S>(store: &S, body: &CreatePropertyDto) -> Result<(), ServiceError>
where
    S: LocationExt + CatalogExt + Sync,
{
    if store.get_district_path(body.district_id).await?.is_none() {
        return Err(ServiceError::validation("Selected district does not exist"));
    }

    if store.get_property_type(body.property_type_id).await?.is_none() {
        return Err(ServiceError::validation("Selected property type does not exist"));
    }

    Ok(())
}

pub async fn create_property<S>(
    store: &S,
    owner_id: i32,
    body: &CreatePropertyDto,
) -> Result<Property, ServiceError>
where
    S: PropertyExt + LocationExt + CatalogExt + Sync,
{
    body.validate_form().map_err(validation_message)?;
    check_references(store, body).await?;

    let property = store.create_property(owner_id, body).await?;

    tracing::info!("Property {} created by user {}", property.id, owner_id);

    Ok(property)
}

pub async fn update_property<S>(
    store: &S,
    property_id: i32,
    body: &CreatePropertyDto,
) -> Result<Property, ServiceError>
where
    S: PropertyExt + LocationExt + CatalogExt + Sync,
{
    body.validate_form().map_err(validation_message)?;
    check_references(store, body).await?;

    let property = store
        .update_property(property_id, body)
        .await?
        .ok_or(ServiceError::PropertyNotFound)?;

    tracing::info!("Property {} updated", property.id);

    Ok(property)
}

pub async fn set_property_status<S>(
    store: &S,
    property_id: i32,
    raw_status: &str,
) -> Result<Property, ServiceError>
where
    S: PropertyExt + Sync,
{
    let status = PropertyStatus::parse(raw_status.trim())
        .ok_or_else(|| ServiceError::validation("Invalid property status"))?;

    store
        .update_property_status(property_id, status)
        .await?
        .ok_or(ServiceError::PropertyNotFound)
}

pub async fn toggle_featured<S>(store: &S, property_id: i32) -> Result<Property, ServiceError>
where
    S: PropertyExt + Sync,
{
    store
        .toggle_featured(property_id)
        .await?
        .ok_or(ServiceError::PropertyNotFound)
}

/// Accepts raw base64 or a `data:` URL.
fn decode_image_payload(data: &str) -> Result<Vec<u8>, ServiceError> {
    let encoded = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| ServiceError::validation("Image data is not valid base64"))?;

    if bytes.is_empty() {
        return Err(ServiceError::validation("Image data is empty"));
    }

    Ok(bytes)
}

pub async fn upload_property_image<S>(
    store: &S,
    host: &dyn ImageHost,
    property_id: i32,
    body: &PropertyImageUploadDto,
) -> Result<PropertyImage, ServiceError>
where
    S: PropertyExt + Sync,
{
    body.validate().map_err(validation_message)?;

    store
        .get_property_by_id(property_id)
        .await?
        .ok_or(ServiceError::PropertyNotFound)?;

    let allowed = file_extension(&body.file_name)
        .map(|ext| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);
    if !allowed {
        return Err(ServiceError::validation("Only jpg, jpeg, png and gif images are allowed"));
    }

    let bytes = decode_image_payload(&body.data)?;
    let remote_image_id = host.upload(&body.file_name, bytes).await?;

    match store
        .save_property_image(property_id, Some(remote_image_id.clone()), body.is_main)
        .await
    {
        Ok(image) => Ok(image),
        Err(err) => {
            // Do not leave an orphan on the host.
            if let Err(release_err) = host.release(&remote_image_id).await {
                tracing::warn!("Could not release orphaned image {}: {}", remote_image_id, release_err);
            }
            Err(err.into())
        }
    }
}

/// Releases every hosted image first; a release failure leaves all rows in place.
pub async fn delete_property<S>(
    store: &S,
    host: &dyn ImageHost,
    property_id: i32,
) -> Result<(), ServiceError>
where
    S: PropertyExt + Sync,
{
    store
        .get_property_by_id(property_id)
        .await?
        .ok_or(ServiceError::PropertyNotFound)?;

    let images = store.get_property_images(property_id).await?;

    for remote_image_id in images.iter().filter_map(|image| image.remote_image_id.as_deref()) {
        host.release(remote_image_id).await.map_err(|err| {
            tracing::warn!(
                "Aborting deletion of property {}: release of {} failed",
                property_id,
                remote_image_id
            );
            err
        })?;
    }

    if !store.delete_property(property_id).await? {
        return Err(ServiceError::PropertyNotFound);
    }

    tracing::info!("Property {} deleted with {} images", property_id, images.len());

    Ok(())
}

pub async fn get_property_detail<S>(
    store: &S,
    host: &dyn ImageHost,
    property_id: i32,
) -> Result<PropertyDetailDto, ServiceError>
where
    S: PropertyExt + LocationExt + Sync,
{
    let property = store
        .get_property_by_id(property_id)
        .await?
        .ok_or(ServiceError::PropertyNotFound)?;

    let images = store
        .get_property_images(property_id)
        .await?
        .iter()
        .map(|image| {
            let url = image.remote_image_id.as_deref().map(|id| host.image_url(id));
            PropertyImageDto::from_image(image, url)
        })
        .collect();

    let amenities = store.get_property_amenities(property_id).await?;
    let location = store.get_district_path(property.district_id).await?;
    let similar = store
        .get_similar_properties(&property, SIMILAR_PROPERTIES_LIMIT)
        .await?;

    Ok(PropertyDetailDto {
        property,
        location,
        images,
        amenities,
        similar: PropertyFilterDto::filter_properties(&similar),
    })
}
