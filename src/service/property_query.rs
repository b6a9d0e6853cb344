// src/service/property_query.rs
//! Composes the property search into a list of independent predicates.
//!
//! Every predicate renders itself into a `sqlx::QueryBuilder` and can also be
//! evaluated against an in-memory `Property`. Predicates are always joined
//! with `AND`, so the order they are pushed in never changes the result set.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use sqlx::{Postgres, QueryBuilder};

use crate::{
    dtos::{
        pagination::{ExactFilter, PageRequest},
        propertydtos::PropertySearchQueryDto,
    },
    models::propertymodel::{Property, PropertyStatus, TransactionType},
};

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyPredicate {
    Status(PropertyStatus),
    /// District ids pre-resolved from a region. An empty set matches nothing.
    DistrictIn(BTreeSet<i32>),
    PropertyType(i32),
    TransactionType(TransactionType),
    MinPrice(f64),
    MaxPrice(f64),
    MinBedrooms(i32),
    MinBathrooms(i32),
    MinArea(f64),
    /// Case-insensitive substring of title, description or address.
    Keyword(String),
    /// Stands in for a filter value that names nothing.
    Never,
}

impl PropertyPredicate {
    pub fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            PropertyPredicate::Status(status) => {
                builder.push("status = ").push_bind(*status);
            }
            PropertyPredicate::DistrictIn(district_ids) => {
                let ids: Vec<i32> = district_ids.iter().copied().collect();
                builder.push("district_id = ANY(").push_bind(ids).push(")");
            }
            PropertyPredicate::PropertyType(property_type_id) => {
                builder.push("property_type_id = ").push_bind(*property_type_id);
            }
            PropertyPredicate::TransactionType(transaction_type) => {
                builder.push("transaction_type = ").push_bind(*transaction_type);
            }
            PropertyPredicate::MinPrice(min_price) => {
                builder.push("price >= ").push_bind(*min_price);
            }
            PropertyPredicate::MaxPrice(max_price) => {
                builder.push("price <= ").push_bind(*max_price);
            }
            PropertyPredicate::MinBedrooms(bedrooms) => {
                builder.push("bedrooms >= ").push_bind(*bedrooms);
            }
            PropertyPredicate::MinBathrooms(bathrooms) => {
                builder.push("bathrooms >= ").push_bind(*bathrooms);
            }
            PropertyPredicate::MinArea(min_area) => {
                builder.push("area >= ").push_bind(*min_area);
            }
            PropertyPredicate::Keyword(keyword) => {
                let pattern = like_pattern(keyword);
                builder
                    .push("(title ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR description ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR address ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            PropertyPredicate::Never => {
                builder.push("FALSE");
            }
        }
    }

    pub fn matches(&self, property: &Property) -> bool {
        match self {
            PropertyPredicate::Status(status) => property.status == *status,
            PropertyPredicate::DistrictIn(district_ids) => district_ids.contains(&property.district_id),
            PropertyPredicate::PropertyType(property_type_id) => property.property_type_id == *property_type_id,
            PropertyPredicate::TransactionType(transaction_type) => property.transaction_type == *transaction_type,
            PropertyPredicate::MinPrice(min_price) => property.price >= *min_price,
            PropertyPredicate::MaxPrice(max_price) => property.price <= *max_price,
            PropertyPredicate::MinBedrooms(bedrooms) => property.bedrooms >= *bedrooms,
            PropertyPredicate::MinBathrooms(bathrooms) => property.bathrooms >= *bathrooms,
            PropertyPredicate::MinArea(min_area) => property.area >= *min_area,
            PropertyPredicate::Keyword(keyword) => {
                let needle = keyword.to_lowercase();
                property.title.to_lowercase().contains(&needle)
                    || property.description.to_lowercase().contains(&needle)
                    || property.address.to_lowercase().contains(&needle)
            }
            PropertyPredicate::Never => false,
        }
    }
}

/// Escapes LIKE wildcards so the keyword is matched literally.
fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    CreatedAt,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec {
            field: SortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

impl SortSpec {
    /// An unknown `sort_by` keeps the default `created_at desc`, whatever
    /// `sort_order` says. Any `sort_order` other than `asc` means `desc`.
    pub fn parse(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        let field = match sort_by.unwrap_or("created_at") {
            "price" => SortField::Price,
            "created_at" => SortField::CreatedAt,
            "area" => SortField::Area,
            _ => return SortSpec::default(),
        };

        let order = match sort_order {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };

        SortSpec { field, order }
    }

    pub fn order_by_clause(&self) -> &'static str {
        match (self.field, self.order) {
            (SortField::Price, SortOrder::Asc) => " ORDER BY price ASC, id ASC",
            (SortField::Price, SortOrder::Desc) => " ORDER BY price DESC, id DESC",
            (SortField::CreatedAt, SortOrder::Asc) => " ORDER BY created_at ASC, id ASC",
            (SortField::CreatedAt, SortOrder::Desc) => " ORDER BY created_at DESC, id DESC",
            (SortField::Area, SortOrder::Asc) => " ORDER BY area ASC, id ASC",
            (SortField::Area, SortOrder::Desc) => " ORDER BY area DESC, id DESC",
        }
    }

    /// Same ordering as `order_by_clause`, for rows already in memory.
    pub fn compare(&self, a: &Property, b: &Property) -> Ordering {
        let ordering = match self.field {
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Area => a.area.total_cmp(&b.area),
        }
        .then(a.id.cmp(&b.id));

        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Search parameters after lenient parsing. A number that fails to parse is
/// simply absent; an unknown `transaction_type` matches nothing.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PropertySearchFilters {
    pub region_id: Option<i32>,
    pub city_id: Option<i32>,
    pub property_type_id: Option<i32>,
    pub transaction_type: ExactFilter<TransactionType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub min_area: Option<f64>,
    pub keyword: Option<String>,
}

impl PropertySearchFilters {
    pub fn from_query(query: &PropertySearchQueryDto) -> Self {
        PropertySearchFilters {
            region_id: parse_positive(query.region_id.as_deref()),
            city_id: parse_positive(query.city_id.as_deref()),
            property_type_id: parse_positive(query.property_type_id.as_deref()),
            transaction_type: ExactFilter::from_query(
                query.transaction_type.as_deref(),
                None,
                TransactionType::parse,
            ),
            min_price: parse_bound(query.min_price.as_deref()),
            max_price: parse_bound(query.max_price.as_deref()),
            bedrooms: parse_positive(query.bedrooms.as_deref()),
            bathrooms: parse_positive(query.bathrooms.as_deref()),
            min_area: parse_bound(query.min_area.as_deref()),
            keyword: query
                .keyword
                .as_deref()
                .map(str::trim)
                .filter(|keyword| !keyword.is_empty())
                .map(str::to_string),
        }
    }
}

/// Ids and room counts only constrain when strictly positive.
pub fn parse_positive(raw: Option<&str>) -> Option<i32> {
    raw.and_then(|value| value.trim().parse::<i32>().ok())
        .filter(|value| *value > 0)
}

// Zero and non-finite bounds are ignored, like an empty form field.
fn parse_bound(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value != 0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyQuery {
    predicates: Vec<PropertyPredicate>,
    sort: SortSpec,
    page: PageRequest,
}

impl PropertyQuery {
    pub fn new(sort: SortSpec, page: PageRequest) -> Self {
        PropertyQuery {
            predicates: Vec::new(),
            sort,
            page,
        }
    }

    pub fn with(mut self, predicate: PropertyPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn push(&mut self, predicate: PropertyPredicate) {
        self.predicates.push(predicate);
    }

    /// Narrows the query with every filter that is present. `location_districts`
    /// holds one resolved district set per location filter given (region, city).
    pub fn apply_filters(
        mut self,
        filters: &PropertySearchFilters,
        location_districts: Vec<BTreeSet<i32>>,
    ) -> Self {
        for district_ids in location_districts {
            self.push(PropertyPredicate::DistrictIn(district_ids));
        }
        if let Some(property_type_id) = filters.property_type_id {
            self.push(PropertyPredicate::PropertyType(property_type_id));
        }
        self.push_exact(filters.transaction_type, PropertyPredicate::TransactionType);
        if let Some(min_price) = filters.min_price {
            self.push(PropertyPredicate::MinPrice(min_price));
        }
        if let Some(max_price) = filters.max_price {
            self.push(PropertyPredicate::MaxPrice(max_price));
        }
        if let Some(bedrooms) = filters.bedrooms {
            self.push(PropertyPredicate::MinBedrooms(bedrooms));
        }
        if let Some(bathrooms) = filters.bathrooms {
            self.push(PropertyPredicate::MinBathrooms(bathrooms));
        }
        if let Some(min_area) = filters.min_area {
            self.push(PropertyPredicate::MinArea(min_area));
        }
        if let Some(keyword) = &filters.keyword {
            self.push(PropertyPredicate::Keyword(keyword.clone()));
        }
        self
    }

    pub fn push_exact<T>(&mut self, filter: ExactFilter<T>, predicate: impl FnOnce(T) -> PropertyPredicate) {
        match filter {
            ExactFilter::Any => {}
            ExactFilter::Only(value) => self.push(predicate(value)),
            ExactFilter::Unmatched => self.push(PropertyPredicate::Never),
        }
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE TRUE");
        for predicate in &self.predicates {
            builder.push(" AND ");
            predicate.push_sql(builder);
        }
    }

    pub fn matches(&self, property: &Property) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(property))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::pagination::PUBLIC_PAGE_SIZE;
    use chrono::{TimeZone, Utc};

    fn property(id: i32, price: f64) -> Property {
        Property {
            id,
            title: format!("Listing {}", id),
            description: "Bright flat close to the metro line".to_string(),
            price,
            area: 100.0 + id as f64,
            bedrooms: 2,
            bathrooms: 1,
            floors: 1,
            year_built: None,
            address: "King Fahd Road".to_string(),
            district_id: 1,
            latitude: 24.7,
            longitude: 46.6,
            property_type_id: 1,
            transaction_type: TransactionType::Sale,
            is_featured: false,
            status: PropertyStatus::Available,
            owner_id: 1,
            created_at: Utc.with_ymd_and_hms(2024, 1, id as u32, 0, 0, 0).unwrap(),
        }
    }

    fn query_dto(pairs: &[(&str, &str)]) -> PropertySearchQueryDto {
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[test]
    fn malformed_numbers_are_ignored() {
        let filters = PropertySearchFilters::from_query(&query_dto(&[
            ("min_price", "cheap"),
            ("max_price", "250"),
            ("bedrooms", "-2"),
            ("bathrooms", "two"),
            ("region_id", "0"),
            ("keyword", "   "),
        ]));

        assert_eq!(
            filters,
            PropertySearchFilters {
                max_price: Some(250.0),
                ..Default::default()
            }
        );
    }

    #[test]
    fn unknown_transaction_type_matches_nothing() {
        let filters = PropertySearchFilters::from_query(&query_dto(&[("transaction_type", "lease")]));
        assert_eq!(filters.transaction_type, ExactFilter::Unmatched);

        let query = PropertyQuery::new(SortSpec::default(), PageRequest::new(1, PUBLIC_PAGE_SIZE))
            .apply_filters(&filters, Vec::new());
        assert!(!query.matches(&property(1, 100.0)));

        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM properties");
        query.push_where(&mut builder);
        assert_eq!(builder.sql(), "SELECT id FROM properties WHERE TRUE AND FALSE");
    }

    #[test]
    fn zero_and_non_finite_bounds_are_ignored() {
        let filters = PropertySearchFilters::from_query(&query_dto(&[
            ("min_price", "0"),
            ("max_price", "inf"),
            ("min_area", "NaN"),
        ]));
        assert_eq!(filters, PropertySearchFilters::default());
    }

    #[test]
    fn unknown_sort_falls_back_to_newest_first() {
        assert_eq!(SortSpec::parse(Some("bogus"), Some("asc")), SortSpec::default());
        assert_eq!(SortSpec::parse(None, None), SortSpec::default());
        assert_eq!(
            SortSpec::parse(Some("price"), Some("asc")),
            SortSpec { field: SortField::Price, order: SortOrder::Asc }
        );
        assert_eq!(
            SortSpec::parse(Some("area"), Some("sideways")),
            SortSpec { field: SortField::Area, order: SortOrder::Desc }
        );
    }

    #[test]
    fn renders_conjunction_with_placeholders() {
        let query = PropertyQuery::new(SortSpec::default(), PageRequest::new(1, PUBLIC_PAGE_SIZE))
            .with(PropertyPredicate::Status(PropertyStatus::Available))
            .with(PropertyPredicate::MinPrice(150.0))
            .with(PropertyPredicate::Keyword("villa".to_string()));

        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM properties");
        query.push_where(&mut builder);

        assert_eq!(
            builder.sql(),
            "SELECT id FROM properties WHERE TRUE AND status = $1 AND price >= $2 \
             AND (title ILIKE $3 OR description ILIKE $4 OR address ILIKE $5)"
        );
    }

    #[test]
    fn district_set_binds_as_array() {
        let districts: BTreeSet<i32> = [3, 1, 2].into_iter().collect();
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM properties");
        PropertyQuery::new(SortSpec::default(), PageRequest::new(1, PUBLIC_PAGE_SIZE))
            .with(PropertyPredicate::DistrictIn(districts))
            .push_where(&mut builder);

        assert_eq!(
            builder.sql(),
            "SELECT id FROM properties WHERE TRUE AND district_id = ANY($1)"
        );
    }

    #[test]
    fn keyword_wildcards_are_escaped() {
        assert_eq!(like_pattern("villa"), "%villa%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn keyword_matches_any_text_field_ignoring_case() {
        let mut villa = property(1, 100.0);
        villa.title = "Villa with garden".to_string();
        assert!(PropertyPredicate::Keyword("villa".to_string()).matches(&villa));

        let mut by_address = property(2, 100.0);
        by_address.address = "Al VILLA street".to_string();
        assert!(PropertyPredicate::Keyword("Villa".to_string()).matches(&by_address));

        let plain = property(3, 100.0);
        assert!(!PropertyPredicate::Keyword("villa".to_string()).matches(&plain));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let query = PropertyQuery::new(SortSpec::default(), PageRequest::new(1, PUBLIC_PAGE_SIZE))
            .with(PropertyPredicate::MinPrice(200.0))
            .with(PropertyPredicate::MaxPrice(200.0));
        assert!(query.matches(&property(1, 200.0)));
        assert!(!query.matches(&property(2, 200.5)));
    }

    #[test]
    fn empty_district_set_matches_nothing() {
        let predicate = PropertyPredicate::DistrictIn(BTreeSet::new());
        assert!(!predicate.matches(&property(1, 100.0)));
    }

    #[test]
    fn predicate_order_does_not_change_matches() {
        let predicates = vec![
            PropertyPredicate::MinPrice(150.0),
            PropertyPredicate::MaxPrice(350.0),
            PropertyPredicate::MinArea(102.0),
            PropertyPredicate::Keyword("listing".to_string()),
        ];
        let rows: Vec<Property> = (1..=5).map(|id| property(id, id as f64 * 100.0)).collect();

        let forward = predicates.iter().cloned().fold(
            PropertyQuery::new(SortSpec::default(), PageRequest::new(1, 9)),
            PropertyQuery::with,
        );
        let backward = predicates.iter().rev().cloned().fold(
            PropertyQuery::new(SortSpec::default(), PageRequest::new(1, 9)),
            PropertyQuery::with,
        );

        let forward_ids: Vec<i32> = rows.iter().filter(|p| forward.matches(p)).map(|p| p.id).collect();
        let backward_ids: Vec<i32> = rows.iter().filter(|p| backward.matches(p)).map(|p| p.id).collect();
        assert_eq!(forward_ids, vec![2, 3]);
        assert_eq!(forward_ids, backward_ids);
    }

    #[test]
    fn in_memory_ordering_matches_sort_spec() {
        let mut rows = vec![property(1, 300.0), property(2, 100.0), property(3, 200.0)];

        rows.sort_by(|a, b| SortSpec::parse(Some("price"), Some("asc")).compare(a, b));
        assert_eq!(rows.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 3, 1]);

        rows.sort_by(|a, b| SortSpec::default().compare(a, b));
        assert_eq!(rows.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }
}
