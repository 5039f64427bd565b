//! Insert-or-replace statements for every warehouse row type.

use async_trait::async_trait;
use sqlx::SqliteConnection;

use crate::models::{
    BridgeFilmActor, BridgeFilmCategory, DimActor, DimCategory, DimCustomer, DimDate, DimFilm,
    DimStore, FactPayment, FactRental,
};

/// A row that can be written by primary key, replacing any existing row.
#[async_trait]
pub trait Upsert: Send + Sync {
    async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl Upsert for DimFilm {
    async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO dim_film (film_key, film_id, title, rating, length, language, release_year, last_update)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(self.film_key)
        .bind(self.film_id)
        .bind(&self.title)
        .bind(&self.rating)
        .bind(self.length)
        .bind(&self.language)
        .bind(self.release_year)
        .bind(self.last_update)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Upsert for DimActor {
    async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO dim_actor (actor_key, actor_id, first_name, last_name, last_update)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(self.actor_key)
        .bind(self.actor_id)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(self.last_update)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Upsert for DimCategory {
    async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT OR REPLACE INTO dim_category (category_key, category_id, name, last_update) VALUES (?, ?, ?, ?)",
        )
        .bind(self.category_key)
        .bind(self.category_id)
        .bind(&self.name)
        .bind(self.last_update)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Upsert for DimStore {
    async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO dim_store (store_key, store_id, city, country, last_update)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(self.store_key)
        .bind(self.store_id)
        .bind(&self.city)
        .bind(&self.country)
        .bind(self.last_update)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Upsert for DimCustomer {
    async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO dim_customer (customer_key, customer_id, first_name, last_name, active, city, country, last_update)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(self.customer_key)
        .bind(self.customer_id)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(self.active)
        .bind(&self.city)
        .bind(&self.country)
        .bind(self.last_update)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Upsert for DimDate {
    async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO dim_date (date_key, date, year, quarter, month, day_of_month, day_of_week, is_weekend)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&self.date_key)
        .bind(&self.date)
        .bind(self.year)
        .bind(self.quarter)
        .bind(self.month)
        .bind(self.day_of_month)
        .bind(self.day_of_week)
        .bind(self.is_weekend)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Upsert for BridgeFilmActor {
    async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT OR REPLACE INTO bridge_film_actor (film_key, actor_key) VALUES (?, ?)")
            .bind(self.film_key)
            .bind(self.actor_key)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Upsert for BridgeFilmCategory {
    async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT OR REPLACE INTO bridge_film_category (film_key, category_key) VALUES (?, ?)",
        )
        .bind(self.film_key)
        .bind(self.category_key)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Upsert for FactRental {
    async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO fact_rental (fact_rental_key, rental_id, date_key_rented, date_key_returned, film_key, store_key, customer_key, staff_id, rental_duration_days)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(self.fact_rental_key)
        .bind(self.rental_id)
        .bind(&self.date_key_rented)
        .bind(&self.date_key_returned)
        .bind(self.film_key)
        .bind(self.store_key)
        .bind(self.customer_key)
        .bind(self.staff_id)
        .bind(self.rental_duration_days)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl Upsert for FactPayment {
    async fn upsert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO fact_payment (fact_payment_key, payment_id, date_key_paid, customer_key, store_key, staff_id, amount)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(self.fact_payment_key)
        .bind(self.payment_id)
        .bind(&self.date_key_paid)
        .bind(self.customer_key)
        .bind(self.store_key)
        .bind(self.staff_id)
        .bind(self.amount)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
