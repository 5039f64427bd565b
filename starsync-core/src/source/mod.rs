//! Read-only access to the normalized source schema.
//!
//! The engine only talks to the source through [`SourceStore`], so the
//! syncers can run against the production MySQL database or against a fake
//! in tests.

mod mysql;

#[cfg(test)]
pub(crate) mod memory;

pub use mysql::{MySqlSource, MySqlSourceOptions};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::{
    ActorRecord, CategoryRecord, CustomerRecord, FilmActorRecord, FilmCategoryRecord, FilmRecord,
    PaymentRecord, RentalRecord, StoreRecord,
};
use crate::sync::SyncWindow;

/// A timestamp column the engine filters or aggregates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampColumn {
    FilmLastUpdate,
    ActorLastUpdate,
    CategoryLastUpdate,
    StoreLastUpdate,
    CustomerLastUpdate,
    RentalDate,
    ReturnDate,
    PaymentDate,
}

impl TimestampColumn {
    /// Every column that contributes to the date dimension's range.
    pub const ALL: [TimestampColumn; 8] = [
        TimestampColumn::FilmLastUpdate,
        TimestampColumn::ActorLastUpdate,
        TimestampColumn::CategoryLastUpdate,
        TimestampColumn::StoreLastUpdate,
        TimestampColumn::CustomerLastUpdate,
        TimestampColumn::RentalDate,
        TimestampColumn::ReturnDate,
        TimestampColumn::PaymentDate,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            TimestampColumn::FilmLastUpdate => "film",
            TimestampColumn::ActorLastUpdate => "actor",
            TimestampColumn::CategoryLastUpdate => "category",
            TimestampColumn::StoreLastUpdate => "store",
            TimestampColumn::CustomerLastUpdate => "customer",
            TimestampColumn::RentalDate | TimestampColumn::ReturnDate => "rental",
            TimestampColumn::PaymentDate => "payment",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            TimestampColumn::RentalDate => "rental_date",
            TimestampColumn::ReturnDate => "return_date",
            TimestampColumn::PaymentDate => "payment_date",
            _ => "last_update",
        }
    }
}

impl std::fmt::Display for TimestampColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table(), self.column())
    }
}

/// Source tables compared by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTable {
    Film,
    Actor,
    Category,
    Store,
    Customer,
    FilmActor,
    FilmCategory,
    Rental,
    Payment,
}

impl SourceTable {
    pub fn name(&self) -> &'static str {
        match self {
            SourceTable::Film => "film",
            SourceTable::Actor => "actor",
            SourceTable::Category => "category",
            SourceTable::Store => "store",
            SourceTable::Customer => "customer",
            SourceTable::FilmActor => "film_actor",
            SourceTable::FilmCategory => "film_category",
            SourceTable::Rental => "rental",
            SourceTable::Payment => "payment",
        }
    }
}

/// Queries the engine needs from the source store.
///
/// Windowed queries return rows whose driving timestamp lies in
/// `(window.after, window.through]`, ordered by natural id.
#[async_trait]
pub trait SourceStore: Send + Sync {
    async fn films_changed(&self, window: &SyncWindow) -> Result<Vec<FilmRecord>>;

    async fn actors_changed(&self, window: &SyncWindow) -> Result<Vec<ActorRecord>>;

    async fn categories_changed(&self, window: &SyncWindow) -> Result<Vec<CategoryRecord>>;

    async fn stores_changed(&self, window: &SyncWindow) -> Result<Vec<StoreRecord>>;

    async fn customers_changed(&self, window: &SyncWindow) -> Result<Vec<CustomerRecord>>;

    /// Filtered on `rental_date`.
    async fn rentals_changed(&self, window: &SyncWindow) -> Result<Vec<RentalRecord>>;

    /// Filtered on `payment_date`.
    async fn payments_changed(&self, window: &SyncWindow) -> Result<Vec<PaymentRecord>>;

    /// Every film/actor pair, unfiltered.
    async fn film_actors(&self) -> Result<Vec<FilmActorRecord>>;

    /// Every film/category pair, unfiltered.
    async fn film_categories(&self) -> Result<Vec<FilmCategoryRecord>>;

    async fn min_timestamp(&self, column: TimestampColumn) -> Result<Option<NaiveDateTime>>;

    async fn max_timestamp(&self, column: TimestampColumn) -> Result<Option<NaiveDateTime>>;

    async fn row_count(&self, table: SourceTable) -> Result<i64>;

    /// `SUM(payment.amount)`, `None` when there are no payments.
    async fn payment_total(&self) -> Result<Option<f64>>;
}
