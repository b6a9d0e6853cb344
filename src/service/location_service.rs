// service/location_service.rs
use validator::Validate;

use crate::{
    db::locationdb::LocationExt,
    dtos::locationdtos::{CreateCityDto, CreateDistrictDto, CreateRegionDto},
    models::locationmodel::{City, District, Region},
    service::{error::ServiceError, property_query::parse_positive},
};

/// Cities of a region for dependent selects. A missing or malformed id gives
/// an empty list.
pub async fn cities_for_region<S>(store: &S, raw_region_id: Option<&str>) -> Result<Vec<City>, ServiceError>
where
    S: LocationExt + Sync,
{
    match parse_positive(raw_region_id) {
        Some(region_id) => Ok(store.get_cities_by_region(region_id).await?),
        None => Ok(Vec::new()),
    }
}

pub async fn districts_for_city<S>(store: &S, raw_city_id: Option<&str>) -> Result<Vec<District>, ServiceError>
where
    S: LocationExt + Sync,
{
    match parse_positive(raw_city_id) {
        Some(city_id) => Ok(store.get_districts_by_city(city_id).await?),
        None => Ok(Vec::new()),
    }
}

pub async fn create_region<S>(store: &S, body: &CreateRegionDto) -> Result<Region, ServiceError>
where
    S: LocationExt + Sync,
{
    body.validate()
        .map_err(|e| ServiceError::validation(e.to_string()))?;

    Ok(store.save_region(body.name.trim()).await?)
}

pub async fn create_city<S>(store: &S, body: &CreateCityDto) -> Result<City, ServiceError>
where
    S: LocationExt + Sync,
{
    body.validate()
        .map_err(|e| ServiceError::validation(e.to_string()))?;

    store
        .get_region(body.region_id)
        .await?
        .ok_or(ServiceError::RegionNotFound)?;

    Ok(store.save_city(body.name.trim(), body.region_id).await?)
}

pub async fn create_district<S>(store: &S, body: &CreateDistrictDto) -> Result<District, ServiceError>
where
    S: LocationExt + Sync,
{
    body.validate()
        .map_err(|e| ServiceError::validation(e.to_string()))?;

    store
        .get_city(body.city_id)
        .await?
        .ok_or(ServiceError::CityNotFound)?;

    Ok(store.save_district(body.name.trim(), body.city_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    #[tokio::test]
    async fn malformed_ids_give_empty_lists() {
        let store = MemoryStore::new();
        let region = store.add_region("Riyadh");
        store.add_city("Riyadh", region.id);

        assert!(cities_for_region(&store, None).await.unwrap().is_empty());
        assert!(cities_for_region(&store, Some("abc")).await.unwrap().is_empty());
        assert!(districts_for_city(&store, Some("-1")).await.unwrap().is_empty());

        let cities = cities_for_region(&store, Some(&region.id.to_string())).await.unwrap();
        assert_eq!(cities.len(), 1);
    }

    #[tokio::test]
    async fn children_need_an_existing_parent() {
        let store = MemoryStore::new();

        let orphan_city = create_city(&store, &CreateCityDto { name: "Abha".to_string(), region_id: 77 }).await;
        assert!(matches!(orphan_city, Err(ServiceError::RegionNotFound)));

        let orphan_district =
            create_district(&store, &CreateDistrictDto { name: "Al Manhal".to_string(), city_id: 77 }).await;
        assert!(matches!(orphan_district, Err(ServiceError::CityNotFound)));

        let region = create_region(&store, &CreateRegionDto { name: "Asir".to_string() }).await.unwrap();
        let city = create_city(&store, &CreateCityDto { name: "Abha".to_string(), region_id: region.id })
            .await
            .unwrap();
        let district = create_district(&store, &CreateDistrictDto { name: "Al Manhal".to_string(), city_id: city.id })
            .await
            .unwrap();

        let resolved = store.resolve_districts_for_region(region.id).await.unwrap();
        assert!(resolved.contains(&district.id));
        assert_eq!(store.resolve_districts_for_city(city.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn location_tree_nests_created_entries() {
        let store = MemoryStore::new();
        let region = store.add_region("Eastern Province");
        let city = store.add_city("Dammam", region.id);
        store.add_district("Al Faisaliyah", city.id);

        let tree = store.get_location_tree().await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].cities[0].districts[0].name, "Al Faisaliyah");
    }
}
