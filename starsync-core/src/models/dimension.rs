use chrono::NaiveDate;

use super::record::{ActorRecord, CategoryRecord, CustomerRecord, FilmRecord, StoreRecord};
use crate::error::SyncError;
use crate::keys;

/// Denormalized film snapshot, keyed by `film_key`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DimFilm {
    pub film_key: i64,
    pub film_id: i64,
    pub title: String,
    pub rating: Option<String>,
    pub length: Option<i64>,
    pub language: String,
    pub release_year: Option<i64>,
    pub last_update: NaiveDate,
}

impl DimFilm {
    pub fn from_record(record: FilmRecord) -> Result<Self, SyncError> {
        let language = record.language.ok_or(SyncError::MissingLookup {
            table: "film",
            id: record.film_id,
            lookup: "language",
        })?;

        Ok(Self {
            film_key: keys::film_key(record.film_id),
            film_id: record.film_id,
            title: record.title,
            rating: record.rating,
            length: record.length,
            language,
            release_year: record.release_year,
            last_update: record.last_update.date(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DimActor {
    pub actor_key: i64,
    pub actor_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub last_update: NaiveDate,
}

impl From<ActorRecord> for DimActor {
    fn from(record: ActorRecord) -> Self {
        Self {
            actor_key: keys::actor_key(record.actor_id),
            actor_id: record.actor_id,
            first_name: record.first_name,
            last_name: record.last_name,
            last_update: record.last_update.date(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DimCategory {
    pub category_key: i64,
    pub category_id: i64,
    pub name: String,
    pub last_update: NaiveDate,
}

impl From<CategoryRecord> for DimCategory {
    fn from(record: CategoryRecord) -> Self {
        Self {
            category_key: keys::category_key(record.category_id),
            category_id: record.category_id,
            name: record.name,
            last_update: record.last_update.date(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DimStore {
    pub store_key: i64,
    pub store_id: i64,
    pub city: String,
    pub country: String,
    pub last_update: NaiveDate,
}

impl DimStore {
    pub fn from_record(record: StoreRecord) -> Result<Self, SyncError> {
        let (city, country) = resolve_location("store", record.store_id, record.city, record.country)?;

        Ok(Self {
            store_key: keys::store_key(record.store_id),
            store_id: record.store_id,
            city,
            country,
            last_update: record.last_update.date(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DimCustomer {
    pub customer_key: i64,
    pub customer_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub active: i64,
    pub city: String,
    pub country: String,
    pub last_update: NaiveDate,
}

impl DimCustomer {
    pub fn from_record(record: CustomerRecord) -> Result<Self, SyncError> {
        let (city, country) = resolve_location(
            "customer",
            record.customer_id,
            record.city,
            record.country,
        )?;

        Ok(Self {
            customer_key: keys::customer_key(record.customer_id),
            customer_id: record.customer_id,
            first_name: record.first_name,
            last_name: record.last_name,
            active: record.active,
            city,
            country,
            last_update: record.last_update.date(),
        })
    }
}

/// Both halves of the address → city → country chain must be present.
fn resolve_location(
    table: &'static str,
    id: i64,
    city: Option<String>,
    country: Option<String>,
) -> Result<(String, String), SyncError> {
    let city = city.ok_or(SyncError::MissingLookup {
        table,
        id,
        lookup: "city",
    })?;
    let country = country.ok_or(SyncError::MissingLookup {
        table,
        id,
        lookup: "country",
    })?;
    Ok((city, country))
}
