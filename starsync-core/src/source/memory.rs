//! In-memory [`SourceStore`] used by the engine tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::{SourceStore, SourceTable, TimestampColumn};
use crate::error::Result;
use crate::models::{
    ActorRecord, CategoryRecord, CustomerRecord, FilmActorRecord, FilmCategoryRecord, FilmRecord,
    PaymentRecord, RentalRecord, StoreRecord,
};
use crate::sync::SyncWindow;

#[derive(Debug, Default, Clone)]
pub struct MemoryTables {
    pub films: Vec<FilmRecord>,
    pub actors: Vec<ActorRecord>,
    pub categories: Vec<CategoryRecord>,
    pub stores: Vec<StoreRecord>,
    pub customers: Vec<CustomerRecord>,
    pub rentals: Vec<RentalRecord>,
    pub payments: Vec<PaymentRecord>,
    pub film_actors: Vec<FilmActorRecord>,
    pub film_categories: Vec<FilmCategoryRecord>,
}

/// Tables behind a mutex so tests can add rows between sync runs.
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: Mutex<MemoryTables>,
}

impl MemorySource {
    pub fn new(tables: MemoryTables) -> Self {
        Self {
            tables: Mutex::new(tables),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut MemoryTables)) {
        f(&mut self.tables.lock().unwrap());
    }

    fn timestamps(&self, column: TimestampColumn) -> Vec<NaiveDateTime> {
        let tables = self.tables.lock().unwrap();
        match column {
            TimestampColumn::FilmLastUpdate => tables.films.iter().map(|r| r.last_update).collect(),
            TimestampColumn::ActorLastUpdate => {
                tables.actors.iter().map(|r| r.last_update).collect()
            }
            TimestampColumn::CategoryLastUpdate => {
                tables.categories.iter().map(|r| r.last_update).collect()
            }
            TimestampColumn::StoreLastUpdate => {
                tables.stores.iter().map(|r| r.last_update).collect()
            }
            TimestampColumn::CustomerLastUpdate => {
                tables.customers.iter().map(|r| r.last_update).collect()
            }
            TimestampColumn::RentalDate => tables.rentals.iter().map(|r| r.rental_date).collect(),
            TimestampColumn::ReturnDate => {
                tables.rentals.iter().filter_map(|r| r.return_date).collect()
            }
            TimestampColumn::PaymentDate => {
                tables.payments.iter().map(|r| r.payment_date).collect()
            }
        }
    }
}

fn select<T: Clone>(
    rows: &[T],
    window: &SyncWindow,
    timestamp: impl Fn(&T) -> NaiveDateTime,
) -> Vec<T> {
    rows.iter()
        .filter(|row| window.contains(timestamp(*row)))
        .cloned()
        .collect()
}

#[async_trait]
impl SourceStore for MemorySource {
    async fn films_changed(&self, window: &SyncWindow) -> Result<Vec<FilmRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(select(&tables.films, window, |r| r.last_update))
    }

    async fn actors_changed(&self, window: &SyncWindow) -> Result<Vec<ActorRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(select(&tables.actors, window, |r| r.last_update))
    }

    async fn categories_changed(&self, window: &SyncWindow) -> Result<Vec<CategoryRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(select(&tables.categories, window, |r| r.last_update))
    }

    async fn stores_changed(&self, window: &SyncWindow) -> Result<Vec<StoreRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(select(&tables.stores, window, |r| r.last_update))
    }

    async fn customers_changed(&self, window: &SyncWindow) -> Result<Vec<CustomerRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(select(&tables.customers, window, |r| r.last_update))
    }

    async fn rentals_changed(&self, window: &SyncWindow) -> Result<Vec<RentalRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(select(&tables.rentals, window, |r| r.rental_date))
    }

    async fn payments_changed(&self, window: &SyncWindow) -> Result<Vec<PaymentRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(select(&tables.payments, window, |r| r.payment_date))
    }

    async fn film_actors(&self) -> Result<Vec<FilmActorRecord>> {
        Ok(self.tables.lock().unwrap().film_actors.clone())
    }

    async fn film_categories(&self) -> Result<Vec<FilmCategoryRecord>> {
        Ok(self.tables.lock().unwrap().film_categories.clone())
    }

    async fn min_timestamp(&self, column: TimestampColumn) -> Result<Option<NaiveDateTime>> {
        Ok(self.timestamps(column).into_iter().min())
    }

    async fn max_timestamp(&self, column: TimestampColumn) -> Result<Option<NaiveDateTime>> {
        Ok(self.timestamps(column).into_iter().max())
    }

    async fn row_count(&self, table: SourceTable) -> Result<i64> {
        let tables = self.tables.lock().unwrap();
        let count = match table {
            SourceTable::Film => tables.films.len(),
            SourceTable::Actor => tables.actors.len(),
            SourceTable::Category => tables.categories.len(),
            SourceTable::Store => tables.stores.len(),
            SourceTable::Customer => tables.customers.len(),
            SourceTable::FilmActor => tables.film_actors.len(),
            SourceTable::FilmCategory => tables.film_categories.len(),
            SourceTable::Rental => tables.rentals.len(),
            SourceTable::Payment => tables.payments.len(),
        };
        Ok(count as i64)
    }

    async fn payment_total(&self) -> Result<Option<f64>> {
        let tables = self.tables.lock().unwrap();
        if tables.payments.is_empty() {
            return Ok(None);
        }
        Ok(Some(tables.payments.iter().map(|p| p.amount).sum()))
    }
}

/// Timestamp helper for fixtures: `"YYYY-MM-DD HH:MM:SS"`.
pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// A tiny Sakila: two films, three actors, two categories, one store, two
/// customers, three rentals (one unreturned) and two payments.
pub fn sakila_fixture() -> MemoryTables {
    MemoryTables {
        films: vec![
            FilmRecord {
                film_id: 1,
                title: "ACADEMY DINOSAUR".to_string(),
                rating: Some("PG".to_string()),
                length: Some(86),
                release_year: Some(2006),
                last_update: ts("2006-02-15 05:03:42"),
                language: Some("English".to_string()),
            },
            FilmRecord {
                film_id: 5,
                title: "AFRICAN EGG".to_string(),
                rating: Some("G".to_string()),
                length: Some(130),
                release_year: Some(2006),
                last_update: ts("2006-02-15 05:03:42"),
                language: Some("English".to_string()),
            },
        ],
        actors: (1..=3)
            .map(|id| ActorRecord {
                actor_id: id,
                first_name: format!("FIRST{}", id),
                last_name: format!("LAST{}", id),
                last_update: ts("2006-02-15 04:34:33"),
            })
            .collect(),
        categories: vec![
            CategoryRecord {
                category_id: 1,
                name: "Action".to_string(),
                last_update: ts("2006-02-15 04:46:27"),
            },
            CategoryRecord {
                category_id: 6,
                name: "Documentary".to_string(),
                last_update: ts("2006-02-15 04:46:27"),
            },
        ],
        stores: vec![StoreRecord {
            store_id: 1,
            last_update: ts("2006-02-15 04:57:12"),
            city: Some("Lethbridge".to_string()),
            country: Some("Canada".to_string()),
        }],
        customers: vec![
            CustomerRecord {
                customer_id: 1,
                first_name: "MARY".to_string(),
                last_name: "SMITH".to_string(),
                active: 1,
                last_update: ts("2006-02-15 04:57:20"),
                city: Some("Sasebo".to_string()),
                country: Some("Japan".to_string()),
            },
            CustomerRecord {
                customer_id: 2,
                first_name: "PATRICIA".to_string(),
                last_name: "JOHNSON".to_string(),
                active: 1,
                last_update: ts("2006-02-15 04:57:20"),
                city: Some("San Bernardino".to_string()),
                country: Some("United States".to_string()),
            },
        ],
        rentals: vec![
            RentalRecord {
                rental_id: 1,
                rental_date: ts("2005-05-24 22:53:30"),
                return_date: Some(ts("2005-05-26 22:04:30")),
                customer_id: 1,
                staff_id: 1,
                film_id: Some(1),
                store_id: Some(1),
            },
            RentalRecord {
                rental_id: 2,
                rental_date: ts("2005-05-24 22:54:33"),
                return_date: Some(ts("2005-05-28 19:40:33")),
                customer_id: 2,
                staff_id: 1,
                film_id: Some(5),
                store_id: Some(1),
            },
            RentalRecord {
                rental_id: 3,
                rental_date: ts("2005-05-25 10:00:00"),
                return_date: None,
                customer_id: 1,
                staff_id: 1,
                film_id: Some(5),
                store_id: Some(1),
            },
        ],
        payments: vec![
            PaymentRecord {
                payment_id: 1,
                payment_date: ts("2005-05-25 11:30:37"),
                customer_id: 1,
                staff_id: 1,
                amount: 2.99,
                store_id: Some(1),
            },
            PaymentRecord {
                payment_id: 2,
                payment_date: ts("2005-05-28 10:35:23"),
                customer_id: 2,
                staff_id: 1,
                amount: 0.99,
                store_id: Some(1),
            },
        ],
        film_actors: vec![
            FilmActorRecord {
                film_id: 1,
                actor_id: 1,
            },
            FilmActorRecord {
                film_id: 5,
                actor_id: 2,
            },
            FilmActorRecord {
                film_id: 5,
                actor_id: 3,
            },
        ],
        film_categories: vec![
            FilmCategoryRecord {
                film_id: 1,
                category_id: 6,
            },
            FilmCategoryRecord {
                film_id: 5,
                category_id: 1,
            },
        ],
    }
}
