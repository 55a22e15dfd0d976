//! Driving port for payer lookups.

use async_trait::async_trait;

use crate::domain::{PayerRecord, RegistrationError};

/// Domain use-case port for reading registered payers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayerRegistrationQuery: Send + Sync {
    /// Fetch the payer registered under `registration_number`.
    ///
    /// The number is validated first, so malformed input fails with
    /// [`RegistrationError::Format`] rather than reading as "not found".
    async fn find_payer(
        &self,
        registration_number: &str,
    ) -> Result<Option<PayerRecord>, RegistrationError>;
}
