//! MySQL implementation of [`SourceStore`] for the Sakila schema.
//!
//! Sakila stores ids as unsigned small integers, `release_year` as `YEAR`
//! and `amount` as `DECIMAL`; the queries cast them to signed integers and
//! doubles so they decode into plain `i64`/`f64` fields.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

use super::{SourceStore, SourceTable, TimestampColumn};
use crate::error::{Result, SyncError};
use crate::models::{
    ActorRecord, CategoryRecord, CustomerRecord, FilmActorRecord, FilmCategoryRecord, FilmRecord,
    PaymentRecord, RentalRecord, StoreRecord,
};
use crate::sync::SyncWindow;

const FILMS_CHANGED: &str = r#"
    SELECT CAST(f.film_id AS SIGNED) AS film_id,
           f.title,
           CAST(f.rating AS CHAR) AS rating,
           CAST(f.length AS SIGNED) AS length,
           CAST(f.release_year AS SIGNED) AS release_year,
           f.last_update,
           l.name AS language
    FROM film f
    LEFT JOIN language l ON l.language_id = f.language_id
    WHERE f.last_update > ? AND f.last_update <= ?
    ORDER BY f.film_id
"#;

const ACTORS_CHANGED: &str = r#"
    SELECT CAST(actor_id AS SIGNED) AS actor_id, first_name, last_name, last_update
    FROM actor
    WHERE last_update > ? AND last_update <= ?
    ORDER BY actor_id
"#;

const CATEGORIES_CHANGED: &str = r#"
    SELECT CAST(category_id AS SIGNED) AS category_id, name, last_update
    FROM category
    WHERE last_update > ? AND last_update <= ?
    ORDER BY category_id
"#;

const STORES_CHANGED: &str = r#"
    SELECT CAST(s.store_id AS SIGNED) AS store_id,
           s.last_update,
           ci.city,
           co.country
    FROM store s
    LEFT JOIN address a ON a.address_id = s.address_id
    LEFT JOIN city ci ON ci.city_id = a.city_id
    LEFT JOIN country co ON co.country_id = ci.country_id
    WHERE s.last_update > ? AND s.last_update <= ?
    ORDER BY s.store_id
"#;

const CUSTOMERS_CHANGED: &str = r#"
    SELECT CAST(c.customer_id AS SIGNED) AS customer_id,
           c.first_name,
           c.last_name,
           CAST(c.active AS SIGNED) AS active,
           c.last_update,
           ci.city,
           co.country
    FROM customer c
    LEFT JOIN address a ON a.address_id = c.address_id
    LEFT JOIN city ci ON ci.city_id = a.city_id
    LEFT JOIN country co ON co.country_id = ci.country_id
    WHERE c.last_update > ? AND c.last_update <= ?
    ORDER BY c.customer_id
"#;

const RENTALS_CHANGED: &str = r#"
    SELECT CAST(r.rental_id AS SIGNED) AS rental_id,
           r.rental_date,
           r.return_date,
           CAST(r.customer_id AS SIGNED) AS customer_id,
           CAST(r.staff_id AS SIGNED) AS staff_id,
           CAST(i.film_id AS SIGNED) AS film_id,
           CAST(i.store_id AS SIGNED) AS store_id
    FROM rental r
    LEFT JOIN inventory i ON i.inventory_id = r.inventory_id
    WHERE r.rental_date > ? AND r.rental_date <= ?
    ORDER BY r.rental_id
"#;

const PAYMENTS_CHANGED: &str = r#"
    SELECT CAST(p.payment_id AS SIGNED) AS payment_id,
           p.payment_date,
           CAST(p.customer_id AS SIGNED) AS customer_id,
           CAST(p.staff_id AS SIGNED) AS staff_id,
           CAST(p.amount AS DOUBLE) AS amount,
           CAST(st.store_id AS SIGNED) AS store_id
    FROM payment p
    LEFT JOIN staff st ON st.staff_id = p.staff_id
    WHERE p.payment_date > ? AND p.payment_date <= ?
    ORDER BY p.payment_id
"#;

const FILM_ACTORS: &str = r#"
    SELECT CAST(film_id AS SIGNED) AS film_id, CAST(actor_id AS SIGNED) AS actor_id
    FROM film_actor
    ORDER BY film_id, actor_id
"#;

const FILM_CATEGORIES: &str = r#"
    SELECT CAST(film_id AS SIGNED) AS film_id, CAST(category_id AS SIGNED) AS category_id
    FROM film_category
    ORDER BY film_id, category_id
"#;

/// Connection settings for the Sakila database.
#[derive(Debug, Clone)]
pub struct MySqlSourceOptions {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

/// Sakila on MySQL, reached through a small connection pool.
pub struct MySqlSource {
    pool: MySqlPool,
}

impl MySqlSource {
    pub async fn connect(options: &MySqlSourceOptions) -> Result<Self> {
        let connect_options = MySqlConnectOptions::new()
            .host(&options.host)
            .port(options.port)
            .database(&options.database)
            .username(&options.username)
            .password(&options.password);

        let pool = MySqlPoolOptions::new()
            .max_connections(2)
            .connect_with(connect_options)
            .await
            .map_err(SyncError::Source)?;

        tracing::info!(
            "Connected to source database {} on {}:{}",
            options.database,
            options.host,
            options.port
        );

        Ok(Self::new(pool))
    }

    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_window<T>(&self, sql: &str, window: &SyncWindow) -> Result<Vec<T>>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::mysql::MySqlRow> + Send + Unpin,
    {
        sqlx::query_as::<_, T>(sql)
            .bind(window.after)
            .bind(window.through)
            .fetch_all(&self.pool)
            .await
            .map_err(SyncError::Source)
    }

    async fn aggregate_timestamp(
        &self,
        function: &str,
        column: TimestampColumn,
    ) -> Result<Option<NaiveDateTime>> {
        // Identifiers come from the closed TimestampColumn set.
        let sql = format!(
            "SELECT {}({}) FROM {}",
            function,
            column.column(),
            column.table()
        );
        sqlx::query_scalar::<_, Option<NaiveDateTime>>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(SyncError::Source)
    }
}

#[async_trait]
impl SourceStore for MySqlSource {
    async fn films_changed(&self, window: &SyncWindow) -> Result<Vec<FilmRecord>> {
        self.fetch_window(FILMS_CHANGED, window).await
    }

    async fn actors_changed(&self, window: &SyncWindow) -> Result<Vec<ActorRecord>> {
        self.fetch_window(ACTORS_CHANGED, window).await
    }

    async fn categories_changed(&self, window: &SyncWindow) -> Result<Vec<CategoryRecord>> {
        self.fetch_window(CATEGORIES_CHANGED, window).await
    }

    async fn stores_changed(&self, window: &SyncWindow) -> Result<Vec<StoreRecord>> {
        self.fetch_window(STORES_CHANGED, window).await
    }

    async fn customers_changed(&self, window: &SyncWindow) -> Result<Vec<CustomerRecord>> {
        self.fetch_window(CUSTOMERS_CHANGED, window).await
    }

    async fn rentals_changed(&self, window: &SyncWindow) -> Result<Vec<RentalRecord>> {
        self.fetch_window(RENTALS_CHANGED, window).await
    }

    async fn payments_changed(&self, window: &SyncWindow) -> Result<Vec<PaymentRecord>> {
        self.fetch_window(PAYMENTS_CHANGED, window).await
    }

    async fn film_actors(&self) -> Result<Vec<FilmActorRecord>> {
        sqlx::query_as(FILM_ACTORS)
            .fetch_all(&self.pool)
            .await
            .map_err(SyncError::Source)
    }

    async fn film_categories(&self) -> Result<Vec<FilmCategoryRecord>> {
        sqlx::query_as(FILM_CATEGORIES)
            .fetch_all(&self.pool)
            .await
            .map_err(SyncError::Source)
    }

    async fn min_timestamp(&self, column: TimestampColumn) -> Result<Option<NaiveDateTime>> {
        self.aggregate_timestamp("MIN", column).await
    }

    async fn max_timestamp(&self, column: TimestampColumn) -> Result<Option<NaiveDateTime>> {
        self.aggregate_timestamp("MAX", column).await
    }

    async fn row_count(&self, table: SourceTable) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(SyncError::Source)
    }

    async fn payment_total(&self) -> Result<Option<f64>> {
        sqlx::query_scalar::<_, Option<f64>>("SELECT CAST(SUM(amount) AS DOUBLE) FROM payment")
            .fetch_one(&self.pool)
            .await
            .map_err(SyncError::Source)
    }
}
