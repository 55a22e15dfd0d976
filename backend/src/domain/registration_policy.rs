//! Validated settings shared by the allocator, validator and commit
//! coordinator.

use registration_number::{NumberWidth, RegistrationNumber, RegistrationNumberError};
use thiserror::Error;

/// Default number of commit attempts: the original candidate plus one retry.
pub const DEFAULT_MAX_COMMIT_ATTEMPTS: u32 = 2;

/// Errors raised when building a [`RegistrationPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationPolicyError {
    /// The commit coordinator must be allowed at least one attempt.
    #[error("max commit attempts must be at least 1")]
    NoCommitAttempts,
}

/// Registration settings threaded through every component.
///
/// The width is carried explicitly rather than hard-coded so that overflow is
/// a configured, testable boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationPolicy {
    width: NumberWidth,
    max_commit_attempts: u32,
}

impl RegistrationPolicy {
    /// Build a policy.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationPolicyError::NoCommitAttempts`] when
    /// `max_commit_attempts` is zero.
    pub fn new(
        width: NumberWidth,
        max_commit_attempts: u32,
    ) -> Result<Self, RegistrationPolicyError> {
        if max_commit_attempts == 0 {
            return Err(RegistrationPolicyError::NoCommitAttempts);
        }
        Ok(Self {
            width,
            max_commit_attempts,
        })
    }

    /// Configured registration number width.
    pub fn width(&self) -> NumberWidth {
        self.width
    }

    /// Total commit attempts allowed per submission, including the first.
    pub fn max_commit_attempts(&self) -> u32 {
        self.max_commit_attempts
    }

    /// Validate raw text against the configured width.
    pub fn validate(&self, text: &str) -> Result<RegistrationNumber, RegistrationNumberError> {
        registration_number::validate(text, self.width)
    }
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            width: NumberWidth::DEFAULT,
            max_commit_attempts: DEFAULT_MAX_COMMIT_ATTEMPTS,
        }
    }
}
