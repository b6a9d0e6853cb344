// service/listing_service.rs
use crate::{
    db::{locationdb::LocationExt, propertydb::PropertyExt},
    dtos::{
        pagination::{ExactFilter, PageRequest, Paginated, ADMIN_PAGE_SIZE, PUBLIC_PAGE_SIZE},
        propertydtos::{AdminPropertyQueryDto, PropertySearchQueryDto},
    },
    models::propertymodel::{Property, PropertyStatus},
    service::{
        error::ServiceError,
        property_query::{PropertyPredicate, PropertyQuery, PropertySearchFilters, SortSpec},
    },
};

/// Public catalogue: available properties only, 9 per page.
pub async fn search_public_listing<S>(
    store: &S,
    params: &PropertySearchQueryDto,
) -> Result<Paginated<Property>, ServiceError>
where
    S: LocationExt + PropertyExt + Sync,
{
    let filters = PropertySearchFilters::from_query(params);
    let sort = SortSpec::parse(params.sort_by.as_deref(), params.sort_order.as_deref());
    let page = PageRequest::from_query(params.page.as_deref(), PUBLIC_PAGE_SIZE);

    let mut location_districts = Vec::new();
    if let Some(region_id) = filters.region_id {
        location_districts.push(store.resolve_districts_for_region(region_id).await?);
    }
    if let Some(city_id) = filters.city_id {
        location_districts.push(store.resolve_districts_for_city(city_id).await?);
    }

    let query = PropertyQuery::new(sort, page)
        .with(PropertyPredicate::Status(PropertyStatus::Available))
        .apply_filters(&filters, location_districts);

    run(store, &query).await
}

/// Admin listing: every status unless one is picked, newest first, 10 per page.
/// `all` means no status filter; an unknown status matches nothing.
pub async fn search_admin_listing<S>(
    store: &S,
    params: &AdminPropertyQueryDto,
) -> Result<Paginated<Property>, ServiceError>
where
    S: PropertyExt + Sync,
{
    let page = PageRequest::from_query(params.page.as_deref(), ADMIN_PAGE_SIZE);
    let mut query = PropertyQuery::new(SortSpec::default(), page);

    query.push_exact(
        ExactFilter::from_query(params.status.as_deref(), Some("all"), PropertyStatus::parse),
        PropertyPredicate::Status,
    );

    run(store, &query).await
}

async fn run<S>(store: &S, query: &PropertyQuery) -> Result<Paginated<Property>, ServiceError>
where
    S: PropertyExt + Sync,
{
    let (items, total) = store.search_properties(query).await?;
    Ok(Paginated::new(items, total, query.page()))
}
