//! Registration error taxonomy.
//!
//! Every failure a caller can observe maps onto one of these variants, each
//! calling for a different response: fix the input ([`RegistrationError::Format`]),
//! request a new number ([`RegistrationError::Conflict`]), escalate to an
//! operator ([`RegistrationError::Overflow`]), or try again later
//! ([`RegistrationError::Store`]).

use registration_number::RegistrationNumberError;
use thiserror::Error;

use super::ports::{PayerRepositoryError, RegistrationSequenceError};

/// Errors surfaced by the registration services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A submitted or edited registration number is malformed.
    #[error("invalid registration number: {source}")]
    Format {
        /// Validation failure.
        #[source]
        source: RegistrationNumberError,
    },

    /// The number stayed taken after every permitted commit attempt.
    #[error("registration number {registration_number} is taken after {attempts} attempt(s)")]
    Conflict {
        /// Last number that collided.
        registration_number: String,
        /// Commit attempts made before giving up.
        attempts: u32,
    },

    /// Every number of the configured width has been issued.
    #[error("registration numbers of {width} digits are exhausted")]
    Overflow {
        /// Configured width.
        width: u8,
    },

    /// The store could not be reached or failed to execute a request.
    #[error("registration store unavailable: {message}")]
    Store {
        /// Adapter failure description.
        message: String,
    },

    /// No payer is registered under the number.
    #[error("no payer registered under {registration_number}")]
    NotFound {
        /// Number that was looked up.
        registration_number: String,
    },
}

impl RegistrationError {
    /// Convenience constructor for [`RegistrationError::Conflict`].
    pub fn conflict(registration_number: impl Into<String>, attempts: u32) -> Self {
        Self::Conflict {
            registration_number: registration_number.into(),
            attempts,
        }
    }

    /// Convenience constructor for [`RegistrationError::Store`].
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`RegistrationError::NotFound`].
    pub fn not_found(registration_number: impl Into<String>) -> Self {
        Self::NotFound {
            registration_number: registration_number.into(),
        }
    }
}

impl From<RegistrationNumberError> for RegistrationError {
    fn from(error: RegistrationNumberError) -> Self {
        match error {
            RegistrationNumberError::Overflow { width, .. } => Self::Overflow { width },
            source => Self::Format { source },
        }
    }
}

/// Map payer repository errors onto the registration taxonomy.
///
/// Duplicate keys are only surfaced here when the caller has no recovery of
/// its own; the commit coordinator intercepts them first.
pub(crate) fn map_payer_repository_error(error: PayerRepositoryError) -> RegistrationError {
    match error {
        PayerRepositoryError::Connection { message } => {
            RegistrationError::store(format!("payer repository unavailable: {message}"))
        }
        PayerRepositoryError::Query { message } => {
            RegistrationError::store(format!("payer repository error: {message}"))
        }
        PayerRepositoryError::DuplicateKey {
            registration_number,
        } => RegistrationError::conflict(registration_number, 1),
    }
}

/// Map registration sequence errors onto the registration taxonomy.
pub(crate) fn map_sequence_error(error: RegistrationSequenceError) -> RegistrationError {
    match error {
        RegistrationSequenceError::Connection { message } => {
            RegistrationError::store(format!("registration sequence unavailable: {message}"))
        }
        RegistrationSequenceError::Query { message } => {
            RegistrationError::store(format!("registration sequence error: {message}"))
        }
    }
}
