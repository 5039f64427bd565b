use super::record::{PaymentRecord, RentalRecord};
use crate::error::SyncError;
use crate::keys;

const SECONDS_PER_DAY: i64 = 86_400;

/// One row per source rental. The return-side columns stay `None` until the
/// rental comes back.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FactRental {
    pub fact_rental_key: i64,
    pub rental_id: i64,
    pub date_key_rented: String,
    pub date_key_returned: Option<String>,
    pub film_key: i64,
    pub store_key: i64,
    pub customer_key: i64,
    pub staff_id: i64,
    pub rental_duration_days: Option<i64>,
}

impl FactRental {
    pub fn from_record(record: RentalRecord, fact_rental_key: i64) -> Result<Self, SyncError> {
        let missing_inventory = || SyncError::MissingLookup {
            table: "rental",
            id: record.rental_id,
            lookup: "inventory",
        };
        let film_id = record.film_id.ok_or_else(missing_inventory)?;
        let store_id = record.store_id.ok_or_else(missing_inventory)?;

        // Whole elapsed days, rounded down.
        let rental_duration_days = record.return_date.map(|returned| {
            (returned - record.rental_date)
                .num_seconds()
                .div_euclid(SECONDS_PER_DAY)
        });

        Ok(Self {
            fact_rental_key,
            rental_id: record.rental_id,
            date_key_rented: keys::date_key(record.rental_date.date()),
            date_key_returned: record.return_date.map(|d| keys::date_key(d.date())),
            film_key: keys::film_key(film_id),
            store_key: keys::store_key(store_id),
            customer_key: keys::customer_key(record.customer_id),
            staff_id: record.staff_id,
            rental_duration_days,
        })
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FactPayment {
    pub fact_payment_key: i64,
    pub payment_id: i64,
    pub date_key_paid: String,
    pub customer_key: i64,
    pub store_key: i64,
    pub staff_id: i64,
    pub amount: f64,
}

impl FactPayment {
    pub fn from_record(record: PaymentRecord, fact_payment_key: i64) -> Result<Self, SyncError> {
        let store_id = record.store_id.ok_or(SyncError::MissingLookup {
            table: "payment",
            id: record.payment_id,
            lookup: "staff",
        })?;

        Ok(Self {
            fact_payment_key,
            payment_id: record.payment_id,
            date_key_paid: keys::date_key(record.payment_date.date()),
            customer_key: keys::customer_key(record.customer_id),
            store_key: keys::store_key(store_id),
            staff_id: record.staff_id,
            amount: record.amount,
        })
    }
}
