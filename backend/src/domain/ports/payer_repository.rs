//! Port abstraction for payer persistence.
//!
//! The [`PayerRepository`] trait is the only window the registration services
//! have onto the shared store. It offers exactly what the allocation protocol
//! needs: an ordered-maximum query over registration numbers, point reads, and
//! inserts guarded by the store's uniqueness constraint on the registration
//! number column.

use async_trait::async_trait;

use crate::domain::{PayerRecord, RegistrationNumber};

use super::define_port_error;

define_port_error! {
    /// Errors raised by payer repository adapters.
    pub enum PayerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "payer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "payer repository query failed: {message}",
        /// Another payer already holds the registration number.
        DuplicateKey { registration_number: String } =>
            "registration number already taken: {registration_number}",
    }
}

/// Port for payer record storage.
///
/// Adapters must enforce uniqueness of the registration number atomically at
/// write time and report violations as [`PayerRepositoryError::DuplicateKey`].
/// That constraint is the only correctness mechanism against concurrent
/// writers; [`PayerRepository::exists`] is advisory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayerRepository: Send + Sync {
    /// Return the highest registration number currently stored, or `None` when
    /// no payer exists.
    async fn max_registration_number(
        &self,
    ) -> Result<Option<RegistrationNumber>, PayerRepositoryError>;

    /// Return `true` when a payer holds `registration_number`.
    async fn exists(
        &self,
        registration_number: &RegistrationNumber,
    ) -> Result<bool, PayerRepositoryError>;

    /// Insert a new payer under its registration number.
    async fn insert(&self, payer: &PayerRecord) -> Result<(), PayerRepositoryError>;

    /// Fetch a payer by registration number.
    async fn find(
        &self,
        registration_number: &RegistrationNumber,
    ) -> Result<Option<PayerRecord>, PayerRepositoryError>;

    /// Replace the payer currently stored under `current` with `payer`.
    ///
    /// `payer` may carry a different registration number, in which case the
    /// record moves to the new number subject to the uniqueness constraint.
    /// Returns `false` when no payer is stored under `current`.
    async fn update(
        &self,
        current: &RegistrationNumber,
        payer: &PayerRecord,
    ) -> Result<bool, PayerRepositoryError>;
}
