//! Candidate registration number allocation.
//!
//! Two strategies are available:
//!
//! - [`MaxScanAllocator`] reads the highest stored number and offers the next
//!   one. Nothing is reserved, so concurrent sessions may be offered the same
//!   candidate; the commit coordinator resolves that at insert time.
//! - [`SequenceAllocator`] advances a dedicated counter with compare-and-swap,
//!   so every call hands out a distinct candidate. Abandoned candidates leave
//!   gaps.
//!
//! Neither strategy caches store state between calls.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use registration_number::NumberWidth;
use tracing::{debug, warn};

use super::error::{map_payer_repository_error, map_sequence_error};
use super::ports::{PayerRepository, RegistrationSequence};
use super::{RegistrationError, RegistrationNumber};

/// Upper bound on compare-and-swap rounds per sequence allocation.
pub const MAX_SEQUENCE_SWAPS: u32 = 8;

/// Source of candidate registration numbers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateAllocator: Send + Sync {
    /// Produce the next candidate from current store state.
    async fn allocate(&self) -> Result<RegistrationNumber, RegistrationError>;
}

/// Number following `value`, or [`RegistrationError::Overflow`] when it does
/// not fit the width.
fn next_after(value: u64, width: NumberWidth) -> Result<RegistrationNumber, RegistrationError> {
    let next = value
        .checked_add(1)
        .ok_or(RegistrationError::Overflow { width: width.get() })?;
    RegistrationNumber::from_value(next, width).map_err(|error| {
        warn!(value, width = width.get(), "registration number space exhausted");
        RegistrationError::from(error)
    })
}

/// Allocator deriving candidates from the highest stored registration number.
#[derive(Clone)]
pub struct MaxScanAllocator<R> {
    repository: Arc<R>,
    width: NumberWidth,
}

impl<R> MaxScanAllocator<R> {
    /// Create an allocator reading from `repository`.
    pub fn new(repository: Arc<R>, width: NumberWidth) -> Self {
        Self { repository, width }
    }
}

#[async_trait]
impl<R> CandidateAllocator for MaxScanAllocator<R>
where
    R: PayerRepository,
{
    async fn allocate(&self) -> Result<RegistrationNumber, RegistrationError> {
        let current = self
            .repository
            .max_registration_number()
            .await
            .map_err(map_payer_repository_error)?;

        let candidate = match current {
            None => RegistrationNumber::first(self.width),
            Some(max) => next_after(max.value(), self.width)?,
        };
        debug!(candidate = %candidate, "allocated registration candidate");
        Ok(candidate)
    }
}

/// Allocator advancing an atomic counter.
///
/// The counter is never allowed to fall behind the highest stored number, so
/// numbers entered by hand or issued by the max-scan strategy are skipped
/// rather than handed out again.
#[derive(Clone)]
pub struct SequenceAllocator<S, R> {
    sequence: Arc<S>,
    repository: Arc<R>,
    width: NumberWidth,
}

impl<S, R> SequenceAllocator<S, R> {
    /// Create an allocator advancing `sequence` and consulting `repository`
    /// for its floor.
    pub fn new(sequence: Arc<S>, repository: Arc<R>, width: NumberWidth) -> Self {
        Self {
            sequence,
            repository,
            width,
        }
    }
}

impl<S, R> SequenceAllocator<S, R>
where
    S: RegistrationSequence,
    R: PayerRepository,
{
    async fn stored_floor(&self) -> Result<u64, RegistrationError> {
        let max = self
            .repository
            .max_registration_number()
            .await
            .map_err(map_payer_repository_error)?;
        Ok(max.map_or(0, |number| number.value()))
    }
}

#[async_trait]
impl<S, R> CandidateAllocator for SequenceAllocator<S, R>
where
    S: RegistrationSequence,
    R: PayerRepository,
{
    async fn allocate(&self) -> Result<RegistrationNumber, RegistrationError> {
        let mut last_candidate = None;
        for attempt in 1..=MAX_SEQUENCE_SWAPS {
            let current = self.sequence.current().await.map_err(map_sequence_error)?;
            let floor = current.unwrap_or(0).max(self.stored_floor().await?);
            let candidate = next_after(floor, self.width)?;

            let swapped = self
                .sequence
                .compare_and_swap(current, candidate.value())
                .await
                .map_err(map_sequence_error)?;
            if swapped {
                debug!(candidate = %candidate, attempt, "reserved registration candidate");
                return Ok(candidate);
            }
            debug!(attempt, "registration sequence moved concurrently");
            last_candidate = Some(candidate);
        }

        warn!(
            attempts = MAX_SEQUENCE_SWAPS,
            "registration sequence contention exhausted swap attempts"
        );
        Err(RegistrationError::conflict(
            last_candidate.map(String::from).unwrap_or_default(),
            MAX_SEQUENCE_SWAPS,
        ))
    }
}

/// Allocation strategy selected by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrationStrategy {
    /// Read the maximum, offer the next number, detect collisions at commit.
    #[default]
    Optimistic,
    /// Reserve numbers through a compare-and-swap counter.
    Sequence,
}

impl RegistrationStrategy {
    /// Stable configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Optimistic => "optimistic",
            Self::Sequence => "sequence",
        }
    }
}

impl fmt::Display for RegistrationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown registration strategy '{0}', expected 'optimistic' or 'sequence'")]
pub struct ParseRegistrationStrategyError(String);

impl FromStr for RegistrationStrategy {
    type Err = ParseRegistrationStrategyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "optimistic" => Ok(Self::Optimistic),
            "sequence" => Ok(Self::Sequence),
            _ => Err(ParseRegistrationStrategyError(value.to_owned())),
        }
    }
}

/// Allocator chosen at start-up from a [`RegistrationStrategy`].
#[derive(Clone)]
pub enum ConfiguredAllocator<R, S> {
    /// Max-scan allocation.
    MaxScan(MaxScanAllocator<R>),
    /// Compare-and-swap sequence allocation.
    Sequence(SequenceAllocator<S, R>),
}

impl<R, S> ConfiguredAllocator<R, S> {
    /// Build the allocator for `strategy`.
    pub fn for_strategy(
        strategy: RegistrationStrategy,
        repository: Arc<R>,
        sequence: Arc<S>,
        width: NumberWidth,
    ) -> Self {
        match strategy {
            RegistrationStrategy::Optimistic => {
                Self::MaxScan(MaxScanAllocator::new(repository, width))
            }
            RegistrationStrategy::Sequence => {
                Self::Sequence(SequenceAllocator::new(sequence, repository, width))
            }
        }
    }
}

#[async_trait]
impl<R, S> CandidateAllocator for ConfiguredAllocator<R, S>
where
    R: PayerRepository,
    S: RegistrationSequence,
{
    async fn allocate(&self) -> Result<RegistrationNumber, RegistrationError> {
        match self {
            Self::MaxScan(allocator) => allocator.allocate().await,
            Self::Sequence(allocator) => allocator.allocate().await,
        }
    }
}
