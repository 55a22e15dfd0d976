//! PostgreSQL-backed `RegistrationSequence` implementation using Diesel ORM.
//!
//! Each counter is one row in `registration_sequences`. The first swap
//! inserts the row with `ON CONFLICT DO NOTHING`; later swaps are conditional
//! updates on the previous value. Either statement affecting zero rows means
//! another writer got there first.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RegistrationSequence, RegistrationSequenceError};

use super::diesel_error_mapping::{map_basic_pool_error, map_diesel_error};
use super::models::NewSequenceRow;
use super::pool::{DbPool, PoolError};
use super::schema::registration_sequences;

/// Name of the counter used for payer registration numbers.
pub const PAYER_SEQUENCE_NAME: &str = "payer_registration";

/// Diesel-backed implementation of the `RegistrationSequence` port.
#[derive(Clone)]
pub struct DieselRegistrationSequence {
    pool: DbPool,
    name: String,
}

impl DieselRegistrationSequence {
    /// Create a sequence adapter for the payer registration counter.
    pub fn new(pool: DbPool) -> Self {
        Self::named(pool, PAYER_SEQUENCE_NAME)
    }

    /// Create a sequence adapter for the counter called `name`.
    pub fn named(pool: DbPool, name: impl Into<String>) -> Self {
        Self {
            pool,
            name: name.into(),
        }
    }
}

fn map_pool_error(error: PoolError) -> RegistrationSequenceError {
    map_basic_pool_error(error, |message| {
        RegistrationSequenceError::connection(message)
    })
}

fn map_sequence_diesel_error(error: diesel::result::Error) -> RegistrationSequenceError {
    map_diesel_error(
        error,
        RegistrationSequenceError::query,
        RegistrationSequenceError::connection,
        || RegistrationSequenceError::query("unexpected unique violation"),
    )
}

fn to_stored(value: u64) -> Result<i64, RegistrationSequenceError> {
    i64::try_from(value).map_err(|_| {
        RegistrationSequenceError::query(format!("sequence value {value} exceeds BIGINT"))
    })
}

fn from_stored(value: i64) -> Result<u64, RegistrationSequenceError> {
    u64::try_from(value).map_err(|_| {
        RegistrationSequenceError::query(format!("negative sequence value {value} in database"))
    })
}

#[async_trait]
impl RegistrationSequence for DieselRegistrationSequence {
    async fn current(&self) -> Result<Option<u64>, RegistrationSequenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let stored: Option<i64> = registration_sequences::table
            .filter(registration_sequences::name.eq(&self.name))
            .select(registration_sequences::last_value)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_sequence_diesel_error)?;

        stored.map(from_stored).transpose()
    }

    async fn compare_and_swap(
        &self,
        expected: Option<u64>,
        next: u64,
    ) -> Result<bool, RegistrationSequenceError> {
        let next = to_stored(next)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = match expected {
            None => {
                let row = NewSequenceRow {
                    name: &self.name,
                    last_value: next,
                };
                diesel::insert_into(registration_sequences::table)
                    .values(&row)
                    .on_conflict_do_nothing()
                    .execute(&mut conn)
                    .await
            }
            Some(previous) => {
                let previous = to_stored(previous)?;
                diesel::update(
                    registration_sequences::table
                        .filter(registration_sequences::name.eq(&self.name))
                        .filter(registration_sequences::last_value.eq(previous)),
                )
                .set(registration_sequences::last_value.eq(next))
                .execute(&mut conn)
                .await
            }
        }
        .map_err(map_sequence_diesel_error)?;

        Ok(affected == 1)
    }
}
