//! PostgreSQL-backed `PayerRepository` implementation using Diesel ORM.
//!
//! Registration numbers are stored as fixed-width text, so descending text
//! order is numeric order as long as every row has the configured width. The
//! primary key on `registration_number` provides the uniqueness check the
//! commit coordinator depends on.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use registration_number::NumberWidth;

use crate::domain::ports::{PayerRepository, PayerRepositoryError};
use crate::domain::{LocalityId, PayerDetails, PayerName, PayerRecord, RegistrationNumber};

use super::diesel_error_mapping::{map_basic_pool_error, map_diesel_error};
use super::models::{NewPayerRow, PayerRow, PayerUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::payers;

/// Diesel-backed implementation of the `PayerRepository` port.
#[derive(Clone)]
pub struct DieselPayerRepository {
    pool: DbPool,
    width: NumberWidth,
}

impl DieselPayerRepository {
    /// Create a new repository reading numbers of `width` digits.
    pub fn new(pool: DbPool, width: NumberWidth) -> Self {
        Self { pool, width }
    }
}

/// Map pool errors to domain repository errors.
fn map_pool_error(error: PoolError) -> PayerRepositoryError {
    map_basic_pool_error(error, |message| PayerRepositoryError::connection(message))
}

/// Map Diesel errors from reads, where a unique violation cannot occur.
fn map_read_error(error: diesel::result::Error) -> PayerRepositoryError {
    map_diesel_error(
        error,
        PayerRepositoryError::query,
        PayerRepositoryError::connection,
        || PayerRepositoryError::query("unexpected unique violation"),
    )
}

/// Map Diesel errors from writes targeting `registration_number`.
fn map_write_error(
    error: diesel::result::Error,
    registration_number: &RegistrationNumber,
) -> PayerRepositoryError {
    map_diesel_error(
        error,
        PayerRepositoryError::query,
        PayerRepositoryError::connection,
        || PayerRepositoryError::duplicate_key(registration_number.as_str()),
    )
}

fn parse_stored_number(
    text: &str,
    width: NumberWidth,
) -> Result<RegistrationNumber, PayerRepositoryError> {
    registration_number::validate(text, width).map_err(|err| {
        PayerRepositoryError::query(format!("corrupted registration number in database: {err}"))
    })
}

/// Convert a database row to a domain `PayerRecord`.
fn row_to_record(row: PayerRow, width: NumberWidth) -> Result<PayerRecord, PayerRepositoryError> {
    let registration_number = parse_stored_number(&row.registration_number, width)?;
    let name = PayerName::new(row.display_name).map_err(|err| {
        PayerRepositoryError::query(format!("invalid payer name in database: {err}"))
    })?;
    let details = PayerDetails {
        name,
        locality_id: LocalityId::from_uuid(row.locality_id),
    };
    Ok(PayerRecord::new(registration_number, details, row.created_at))
}

#[async_trait]
impl PayerRepository for DieselPayerRepository {
    async fn max_registration_number(
        &self,
    ) -> Result<Option<RegistrationNumber>, PayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let max: Option<String> = payers::table
            .select(payers::registration_number)
            .order(payers::registration_number.desc())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;

        max.map(|text| parse_stored_number(&text, self.width))
            .transpose()
    }

    async fn exists(
        &self,
        registration_number: &RegistrationNumber,
    ) -> Result<bool, PayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(diesel::dsl::exists(
            payers::table.filter(payers::registration_number.eq(registration_number.as_str())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_read_error)
    }

    async fn insert(&self, payer: &PayerRecord) -> Result<(), PayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewPayerRow {
            registration_number: payer.registration_number().as_str(),
            display_name: payer.name().as_ref(),
            locality_id: *payer.locality_id().as_uuid(),
            created_at: payer.registered_at(),
        };

        diesel::insert_into(payers::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, payer.registration_number()))
    }

    async fn find(
        &self,
        registration_number: &RegistrationNumber,
    ) -> Result<Option<PayerRecord>, PayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<PayerRow> = payers::table
            .filter(payers::registration_number.eq(registration_number.as_str()))
            .select(PayerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_read_error)?;

        row.map(|row| row_to_record(row, self.width)).transpose()
    }

    async fn update(
        &self,
        current: &RegistrationNumber,
        payer: &PayerRecord,
    ) -> Result<bool, PayerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = PayerUpdate {
            registration_number: payer.registration_number().as_str(),
            display_name: payer.name().as_ref(),
            locality_id: *payer.locality_id().as_uuid(),
        };

        let updated = diesel::update(
            payers::table.filter(payers::registration_number.eq(current.as_str())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(|err| map_write_error(err, payer.registration_number()))?;

        Ok(updated > 0)
    }
}
