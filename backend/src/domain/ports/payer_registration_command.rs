//! Driving port for payer registration.
//!
//! The [`PayerRegistrationCommand`] trait is the contract the data-entry layer
//! calls to obtain a candidate registration number, submit a new payer under
//! it, and later edit the payer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{
    PayerChanges, PayerDetails, PayerRecord, RegistrationError, RegistrationNumber,
};

/// Request to register a new payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayerRequest {
    /// Registration number shown to the operator, possibly edited by hand.
    ///
    /// Validated against the configured width before any store access.
    pub candidate: String,
    /// Name and locality of the payer being registered.
    pub payer: PayerDetails,
}

/// Response from registering a payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayerResponse {
    /// The committed record, carrying the registration number actually used.
    pub payer: PayerRecord,
    /// Whether the submitted candidate collided and a fresh number was used.
    pub regenerated: bool,
}

/// Request to edit an existing payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayerRequest {
    /// Registration number the payer is currently stored under.
    pub registration_number: String,
    /// Fields to change.
    pub changes: PayerChanges,
}

/// Driving port for payer registration.
///
/// # Collisions
///
/// Candidates are not reserved when offered, so two operators may be shown the
/// same number. [`PayerRegistrationCommand::submit`] detects the collision and
/// commits under a freshly allocated number, reporting `regenerated: true`.
/// It gives up with [`RegistrationError::Conflict`] once the configured number
/// of commit attempts is exhausted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayerRegistrationCommand: Send + Sync {
    /// Compute the next candidate registration number from current store
    /// state.
    async fn request_candidate(&self) -> Result<RegistrationNumber, RegistrationError>;

    /// Register a payer under the submitted candidate.
    async fn submit(
        &self,
        request: RegisterPayerRequest,
    ) -> Result<RegisterPayerResponse, RegistrationError>;

    /// Edit an existing payer.
    async fn update(&self, request: UpdatePayerRequest) -> Result<PayerRecord, RegistrationError>;
}
