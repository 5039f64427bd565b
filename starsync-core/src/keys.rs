//! Surrogate key derivation.
//!
//! Every path that writes a warehouse row (full load, incremental, bridges,
//! facts) goes through these functions, so a natural id always maps to the
//! same surrogate key.

use chrono::NaiveDate;

/// Fact rental keys are allocated above this value.
pub const RENTAL_KEY_BASELINE: i64 = 50_000;

/// Fact payment keys are allocated above this value.
pub const PAYMENT_KEY_BASELINE: i64 = 80_000;

/// `film_id * 100 + 1`; 99 slots per film stay reserved.
pub fn film_key(film_id: i64) -> i64 {
    film_id * 100 + 1
}

pub fn actor_key(actor_id: i64) -> i64 {
    50_000 + actor_id
}

/// `30000 + category_id * 10 + 1`; 9 slots per category stay reserved.
pub fn category_key(category_id: i64) -> i64 {
    30_000 + category_id * 10 + 1
}

pub fn store_key(store_id: i64) -> i64 {
    1_000 + store_id
}

pub fn customer_key(customer_id: i64) -> i64 {
    customer_id * 100 + 1
}

/// Zero-padded `YYYYMMDD`.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Hands out fact keys above the current maximum, one per new row.
#[derive(Debug, Clone)]
pub struct KeyAllocator {
    current: i64,
}

impl KeyAllocator {
    /// Starts after `current_max`, or after `baseline` when the table is empty.
    pub fn new(current_max: Option<i64>, baseline: i64) -> Self {
        Self {
            current: current_max.unwrap_or(baseline),
        }
    }

    pub fn next_key(&mut self) -> i64 {
        self.current += 1;
        self.current
    }
}
