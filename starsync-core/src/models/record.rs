//! Rows as read from the source store.
//!
//! Each record already carries the lookup columns joined in by the source
//! query. A lookup column is `None` when the join found no row; the syncers
//! treat that as a data error.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FilmRecord {
    pub film_id: i64,
    pub title: String,
    pub rating: Option<String>,
    pub length: Option<i64>,
    pub release_year: Option<i64>,
    pub last_update: NaiveDateTime,
    /// language.name
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ActorRecord {
    pub actor_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub last_update: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CategoryRecord {
    pub category_id: i64,
    pub name: String,
    pub last_update: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoreRecord {
    pub store_id: i64,
    pub last_update: NaiveDateTime,
    /// address → city
    pub city: Option<String>,
    /// address → city → country
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CustomerRecord {
    pub customer_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub active: i64,
    pub last_update: NaiveDateTime,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RentalRecord {
    pub rental_id: i64,
    pub rental_date: NaiveDateTime,
    pub return_date: Option<NaiveDateTime>,
    pub customer_id: i64,
    pub staff_id: i64,
    /// inventory.film_id
    pub film_id: Option<i64>,
    /// inventory.store_id
    pub store_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PaymentRecord {
    pub payment_id: i64,
    pub payment_date: NaiveDateTime,
    pub customer_id: i64,
    pub staff_id: i64,
    pub amount: f64,
    /// staff.store_id
    pub store_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct FilmActorRecord {
    pub film_id: i64,
    pub actor_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::FromRow)]
pub struct FilmCategoryRecord {
    pub film_id: i64,
    pub category_id: i64,
}
