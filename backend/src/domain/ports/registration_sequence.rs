//! Port abstraction for an atomic registration counter.
//!
//! Stores that can perform a conditional write on a single row implement
//! [`RegistrationSequence`]. The sequence allocator builds a
//! fetch-and-increment on top of [`RegistrationSequence::compare_and_swap`],
//! so two sessions never receive the same candidate.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by registration sequence adapters.
    pub enum RegistrationSequenceError {
        /// Sequence store connection could not be established.
        Connection { message: String } => "registration sequence connection failed: {message}",
        /// Read or conditional write failed during execution.
        Query { message: String } => "registration sequence query failed: {message}",
    }
}

/// Port for a single compare-and-swap counter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationSequence: Send + Sync {
    /// Return the last value handed out, or `None` when the sequence has never
    /// been written.
    async fn current(&self) -> Result<Option<u64>, RegistrationSequenceError>;

    /// Replace the stored value with `next` if it still equals `expected`.
    ///
    /// `expected == None` means "the sequence has never been written" and
    /// creates it. Returns `false` when another writer moved the sequence
    /// first.
    async fn compare_and_swap(
        &self,
        expected: Option<u64>,
        next: u64,
    ) -> Result<bool, RegistrationSequenceError>;
}
