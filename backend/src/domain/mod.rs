//! Domain primitives, services and ports for payer registration.
//!
//! Purpose: allocate, validate and commit fixed-width registration numbers
//! for payer records held in a shared store. Keep types immutable and
//! document invariants in each type's Rustdoc.
//!
//! Public surface:
//! - [`RegistrationNumber`], [`NumberWidth`]: fixed-width identifier values.
//! - [`PayerRecord`], [`PayerDetails`], [`PayerChanges`]: payer data model.
//! - [`RegistrationError`]: the error taxonomy callers react to.
//! - [`CandidateAllocator`] and its strategies, [`CommitCoordinator`],
//!   [`PayerRegistrationService`] and [`AllocationSession`].

pub mod allocation_session;
pub mod allocator;
pub mod commit_coordinator;
pub mod error;
pub mod payer;
pub mod ports;
pub mod registration_policy;
pub mod registration_service;

pub use registration_number::{
    NumberWidth, NumberWidthError, RegistrationNumber, RegistrationNumberError,
};

pub use self::allocation_session::{
    AllocationSession, AllocationState, SessionError, SessionTransitionError,
};
pub use self::allocator::{
    CandidateAllocator, ConfiguredAllocator, MAX_SEQUENCE_SWAPS, MaxScanAllocator,
    ParseRegistrationStrategyError, RegistrationStrategy, SequenceAllocator,
};
pub use self::commit_coordinator::{CommitCoordinator, CommittedPayer};
pub use self::error::RegistrationError;
pub use self::payer::{
    LocalityId, PAYER_NAME_MAX, PayerChanges, PayerDetails, PayerName, PayerRecord,
    PayerValidationError,
};
pub use self::registration_policy::{
    DEFAULT_MAX_COMMIT_ATTEMPTS, RegistrationPolicy, RegistrationPolicyError,
};
pub use self::registration_service::PayerRegistrationService;
