// db/memory.rs
//! In-memory store used by the service tests. Search goes through the same
//! `PropertyQuery` predicates as the SQL path.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{
    db::{bookingdb::BookingExt, catalogdb::CatalogExt, locationdb::LocationExt, propertydb::PropertyExt},
    dtos::{pagination::PageRequest, propertydtos::CreatePropertyDto},
    models::{
        bookingmodel::{Booking, BookingStatus},
        locationmodel::{City, District, DistrictPath, Region},
        propertymodel::{Amenity, Property, PropertyImage, PropertyStatus, PropertyType, TransactionType},
    },
    service::property_query::PropertyQuery,
};

/// Shared, ordered record of side effects across fakes.
pub type EventLog = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
struct Tables {
    regions: Vec<Region>,
    cities: Vec<City>,
    districts: Vec<District>,
    property_types: Vec<PropertyType>,
    amenities: Vec<Amenity>,
    properties: Vec<Property>,
    property_amenities: HashMap<i32, BTreeSet<i32>>,
    images: Vec<PropertyImage>,
    bookings: Vec<Booking>,
    next_id: i32,
    tick: i64,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    // Strictly increasing timestamps keep "newest first" deterministic.
    fn now(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(self.tick)
    }
}

#[derive(Default, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    pub events: EventLog,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: EventLog) -> Self {
        MemoryStore {
            tables: Arc::default(),
            events,
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }

    pub fn add_region(&self, name: &str) -> Region {
        let mut tables = self.tables();
        let region = Region { id: tables.next_id(), name: name.to_string() };
        tables.regions.push(region.clone());
        region
    }

    pub fn add_city(&self, name: &str, region_id: i32) -> City {
        let mut tables = self.tables();
        let city = City { id: tables.next_id(), name: name.to_string(), region_id };
        tables.cities.push(city.clone());
        city
    }

    pub fn add_district(&self, name: &str, city_id: i32) -> District {
        let mut tables = self.tables();
        let district = District { id: tables.next_id(), name: name.to_string(), city_id };
        tables.districts.push(district.clone());
        district
    }

    pub fn add_property_type(&self, name: &str) -> PropertyType {
        let mut tables = self.tables();
        let property_type = PropertyType { id: tables.next_id(), name: name.to_string() };
        tables.property_types.push(property_type.clone());
        property_type
    }

    /// Inserts a ready-made listing; `id` and `created_at` are assigned here.
    pub fn add_property(&self, mut property: Property) -> Property {
        let mut tables = self.tables();
        property.id = tables.next_id();
        property.created_at = tables.now();
        tables.properties.push(property.clone());
        property
    }

    pub fn add_image(&self, property_id: i32, remote_image_id: Option<&str>) -> PropertyImage {
        let mut tables = self.tables();
        let image = PropertyImage {
            id: tables.next_id(),
            property_id,
            remote_image_id: remote_image_id.map(str::to_string),
            is_main: false,
        };
        tables.images.push(image.clone());
        image
    }

    pub fn image_count(&self, property_id: i32) -> usize {
        self.tables().images.iter().filter(|image| image.property_id == property_id).count()
    }

    pub fn booking_count(&self) -> usize {
        self.tables().bookings.len()
    }

    pub fn has_property(&self, property_id: i32) -> bool {
        self.tables().properties.iter().any(|property| property.id == property_id)
    }
}

/// A listing template for tests; callers override what they care about.
pub fn sample_property(district_id: i32, property_type_id: i32, price: f64) -> Property {
    Property {
        id: 0,
        title: "Family apartment".to_string(),
        description: "Spacious apartment close to schools and shops".to_string(),
        price,
        area: 120.0,
        bedrooms: 3,
        bathrooms: 2,
        floors: 1,
        year_built: Some(2018),
        address: "15 Olaya Street".to_string(),
        district_id,
        latitude: 24.69,
        longitude: 46.68,
        property_type_id,
        transaction_type: TransactionType::Sale,
        is_featured: false,
        status: PropertyStatus::Available,
        owner_id: 1,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn page_of<T: Clone>(rows: &[T], page: PageRequest) -> Vec<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    rows.iter().skip(offset).take(limit).cloned().collect()
}

fn apply_form(property: &mut Property, data: &CreatePropertyDto) {
    property.title = data.title.clone();
    property.description = data.description.clone();
    property.price = data.price;
    property.area = data.area;
    property.bedrooms = data.bedrooms.unwrap_or(0);
    property.bathrooms = data.bathrooms.unwrap_or(0);
    property.floors = data.floors.unwrap_or(1);
    property.year_built = data.year_built;
    property.address = data.address.clone();
    property.district_id = data.district_id;
    property.latitude = data.latitude;
    property.longitude = data.longitude;
    property.property_type_id = data.property_type_id;
    property.transaction_type = data.transaction_type;
}

#[async_trait]
impl LocationExt for MemoryStore {
    async fn get_regions(&self) -> Result<Vec<Region>, sqlx::Error> {
        let mut regions = self.tables().regions.clone();
        regions.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(regions)
    }

    async fn get_region(&self, region_id: i32) -> Result<Option<Region>, sqlx::Error> {
        Ok(self.tables().regions.iter().find(|r| r.id == region_id).cloned())
    }

    async fn save_region(&self, name: &str) -> Result<Region, sqlx::Error> {
        Ok(self.add_region(name))
    }

    async fn get_cities(&self) -> Result<Vec<City>, sqlx::Error> {
        let mut cities = self.tables().cities.clone();
        cities.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(cities)
    }

    async fn get_city(&self, city_id: i32) -> Result<Option<City>, sqlx::Error> {
        Ok(self.tables().cities.iter().find(|c| c.id == city_id).cloned())
    }

    async fn get_cities_by_region(&self, region_id: i32) -> Result<Vec<City>, sqlx::Error> {
        let mut cities = self.get_cities().await?;
        cities.retain(|city| city.region_id == region_id);
        Ok(cities)
    }

    async fn save_city(&self, name: &str, region_id: i32) -> Result<City, sqlx::Error> {
        Ok(self.add_city(name, region_id))
    }

    async fn get_districts(&self) -> Result<Vec<District>, sqlx::Error> {
        let mut districts = self.tables().districts.clone();
        districts.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(districts)
    }

    async fn get_districts_by_city(&self, city_id: i32) -> Result<Vec<District>, sqlx::Error> {
        let mut districts = self.get_districts().await?;
        districts.retain(|district| district.city_id == city_id);
        Ok(districts)
    }

    async fn save_district(&self, name: &str, city_id: i32) -> Result<District, sqlx::Error> {
        Ok(self.add_district(name, city_id))
    }

    async fn get_district_path(&self, district_id: i32) -> Result<Option<DistrictPath>, sqlx::Error> {
        let tables = self.tables();
        let path = tables.districts.iter().find(|d| d.id == district_id).and_then(|district| {
            let city = tables.cities.iter().find(|c| c.id == district.city_id)?;
            let region = tables.regions.iter().find(|r| r.id == city.region_id)?;
            Some(DistrictPath {
                region_id: region.id,
                region_name: region.name.clone(),
                city_id: city.id,
                city_name: city.name.clone(),
                district_id: district.id,
                district_name: district.name.clone(),
            })
        });
        Ok(path)
    }

    async fn resolve_districts_for_region(&self, region_id: i32) -> Result<BTreeSet<i32>, sqlx::Error> {
        let tables = self.tables();
        let city_ids: BTreeSet<i32> = tables
            .cities
            .iter()
            .filter(|city| city.region_id == region_id)
            .map(|city| city.id)
            .collect();

        Ok(tables
            .districts
            .iter()
            .filter(|district| city_ids.contains(&district.city_id))
            .map(|district| district.id)
            .collect())
    }

    async fn resolve_districts_for_city(&self, city_id: i32) -> Result<BTreeSet<i32>, sqlx::Error> {
        Ok(self
            .tables()
            .districts
            .iter()
            .filter(|district| district.city_id == city_id)
            .map(|district| district.id)
            .collect())
    }
}

#[async_trait]
impl CatalogExt for MemoryStore {
    async fn get_property_types(&self) -> Result<Vec<PropertyType>, sqlx::Error> {
        Ok(self.tables().property_types.clone())
    }

    async fn get_property_type(&self, property_type_id: i32) -> Result<Option<PropertyType>, sqlx::Error> {
        Ok(self.tables().property_types.iter().find(|t| t.id == property_type_id).cloned())
    }

    async fn save_property_type(&self, name: &str) -> Result<PropertyType, sqlx::Error> {
        Ok(self.add_property_type(name))
    }

    async fn get_amenities(&self) -> Result<Vec<Amenity>, sqlx::Error> {
        Ok(self.tables().amenities.clone())
    }

    async fn save_amenity(&self, name: &str, icon: Option<&str>) -> Result<Amenity, sqlx::Error> {
        let mut tables = self.tables();
        let amenity = Amenity {
            id: tables.next_id(),
            name: name.to_string(),
            icon: icon.map(str::to_string),
        };
        tables.amenities.push(amenity.clone());
        Ok(amenity)
    }
}

#[async_trait]
impl PropertyExt for MemoryStore {
    async fn create_property(
        &self,
        owner_id: i32,
        property_data: &CreatePropertyDto,
    ) -> Result<Property, sqlx::Error> {
        let mut property = sample_property(property_data.district_id, property_data.property_type_id, property_data.price);
        apply_form(&mut property, property_data);
        property.owner_id = owner_id;
        let property = self.add_property(property);

        let mut tables = self.tables();
        let known: BTreeSet<i32> = tables.amenities.iter().map(|a| a.id).collect();
        let links = property_data.amenity_ids.iter().copied().filter(|id| known.contains(id)).collect();
        tables.property_amenities.insert(property.id, links);

        Ok(property)
    }

    async fn update_property(
        &self,
        property_id: i32,
        property_data: &CreatePropertyDto,
    ) -> Result<Option<Property>, sqlx::Error> {
        let mut tables = self.tables();
        let known: BTreeSet<i32> = tables.amenities.iter().map(|a| a.id).collect();

        let Some(property) = tables.properties.iter_mut().find(|p| p.id == property_id) else {
            return Ok(None);
        };
        apply_form(property, property_data);
        let updated = property.clone();

        let links = property_data.amenity_ids.iter().copied().filter(|id| known.contains(id)).collect();
        tables.property_amenities.insert(property_id, links);

        Ok(Some(updated))
    }

    async fn get_property_by_id(&self, property_id: i32) -> Result<Option<Property>, sqlx::Error> {
        Ok(self.tables().properties.iter().find(|p| p.id == property_id).cloned())
    }

    async fn search_properties(&self, query: &PropertyQuery) -> Result<(Vec<Property>, i64), sqlx::Error> {
        let mut matches: Vec<Property> = self
            .tables()
            .properties
            .iter()
            .filter(|property| query.matches(property))
            .cloned()
            .collect();

        let sort = query.sort();
        matches.sort_by(|a, b| sort.compare(a, b));

        let total = matches.len() as i64;
        Ok((page_of(&matches, query.page()), total))
    }

    async fn get_similar_properties(&self, property: &Property, limit: i64) -> Result<Vec<Property>, sqlx::Error> {
        let mut similar: Vec<Property> = self
            .tables()
            .properties
            .iter()
            .filter(|p| {
                p.id != property.id
                    && p.property_type_id == property.property_type_id
                    && p.transaction_type == property.transaction_type
                    && p.status == PropertyStatus::Available
            })
            .cloned()
            .collect();
        similar.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        similar.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(similar)
    }

    async fn get_latest_properties(&self, limit: i64, featured_only: bool) -> Result<Vec<Property>, sqlx::Error> {
        let mut latest: Vec<Property> = self
            .tables()
            .properties
            .iter()
            .filter(|p| !featured_only || p.is_featured)
            .cloned()
            .collect();
        latest.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        latest.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(latest)
    }

    async fn get_properties_by_owner(&self, owner_id: i32) -> Result<Vec<Property>, sqlx::Error> {
        Ok(self.tables().properties.iter().filter(|p| p.owner_id == owner_id).cloned().collect())
    }

    async fn count_properties(&self, status: Option<PropertyStatus>) -> Result<i64, sqlx::Error> {
        Ok(self
            .tables()
            .properties
            .iter()
            .filter(|p| status.map_or(true, |status| p.status == status))
            .count() as i64)
    }

    async fn update_property_status(
        &self,
        property_id: i32,
        status: PropertyStatus,
    ) -> Result<Option<Property>, sqlx::Error> {
        let mut tables = self.tables();
        Ok(tables.properties.iter_mut().find(|p| p.id == property_id).map(|property| {
            property.status = status;
            property.clone()
        }))
    }

    async fn toggle_featured(&self, property_id: i32) -> Result<Option<Property>, sqlx::Error> {
        let mut tables = self.tables();
        Ok(tables.properties.iter_mut().find(|p| p.id == property_id).map(|property| {
            property.is_featured = !property.is_featured;
            property.clone()
        }))
    }

    async fn get_property_images(&self, property_id: i32) -> Result<Vec<PropertyImage>, sqlx::Error> {
        Ok(self.tables().images.iter().filter(|i| i.property_id == property_id).cloned().collect())
    }

    async fn save_property_image(
        &self,
        property_id: i32,
        remote_image_id: Option<String>,
        is_main: bool,
    ) -> Result<PropertyImage, sqlx::Error> {
        let mut tables = self.tables();
        if is_main {
            for image in tables.images.iter_mut().filter(|i| i.property_id == property_id) {
                image.is_main = false;
            }
        }
        let image = PropertyImage {
            id: tables.next_id(),
            property_id,
            remote_image_id,
            is_main,
        };
        tables.images.push(image.clone());
        Ok(image)
    }

    async fn get_property_amenities(&self, property_id: i32) -> Result<Vec<Amenity>, sqlx::Error> {
        let tables = self.tables();
        let links = tables.property_amenities.get(&property_id).cloned().unwrap_or_default();
        Ok(tables.amenities.iter().filter(|a| links.contains(&a.id)).cloned().collect())
    }

    async fn delete_property(&self, property_id: i32) -> Result<bool, sqlx::Error> {
        let existed = {
            let mut tables = self.tables();
            tables.images.retain(|image| image.property_id != property_id);
            tables.property_amenities.remove(&property_id);
            let before = tables.properties.len();
            tables.properties.retain(|property| property.id != property_id);
            tables.properties.len() != before
        };
        self.record(format!("delete_rows:{}", property_id));
        Ok(existed)
    }
}

#[async_trait]
impl BookingExt for MemoryStore {
    async fn save_booking(
        &self,
        property_id: i32,
        user_id: i32,
        booking_date: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Booking, sqlx::Error> {
        let mut tables = self.tables();
        let booking = Booking {
            id: tables.next_id(),
            property_id,
            user_id,
            booking_date,
            notes,
            status: BookingStatus::Pending,
            created_at: tables.now(),
        };
        tables.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn get_bookings(
        &self,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> Result<(Vec<Booking>, i64), sqlx::Error> {
        let mut bookings: Vec<Booking> = self
            .tables()
            .bookings
            .iter()
            .filter(|b| status.map_or(true, |status| b.status == status))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = bookings.len() as i64;
        Ok((page_of(&bookings, page), total))
    }

    async fn get_bookings_by_user(&self, user_id: i32) -> Result<Vec<Booking>, sqlx::Error> {
        Ok(self.tables().bookings.iter().filter(|b| b.user_id == user_id).cloned().collect())
    }

    async fn get_latest_bookings(&self, limit: i64) -> Result<Vec<Booking>, sqlx::Error> {
        let (bookings, _) = self.get_bookings(None, PageRequest::new(1, limit)).await?;
        Ok(bookings)
    }

    async fn count_bookings(&self, status: Option<BookingStatus>) -> Result<i64, sqlx::Error> {
        Ok(self
            .tables()
            .bookings
            .iter()
            .filter(|b| status.map_or(true, |status| b.status == status))
            .count() as i64)
    }

    async fn update_booking_status(
        &self,
        booking_id: i32,
        status: BookingStatus,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let mut tables = self.tables();
        Ok(tables.bookings.iter_mut().find(|b| b.id == booking_id).map(|booking| {
            booking.status = status;
            booking.clone()
        }))
    }
}
