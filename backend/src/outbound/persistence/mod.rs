//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the payer and sequence ports backed by
//! PostgreSQL through `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Diesel and pool failures map onto the port
//!   error enums; a unique violation on the registration number becomes
//!   `DuplicateKey`.
//!
//! # Example
//!
//! ```ignore
//! use ledger_backend::outbound::persistence::{DbPool, DieselPayerRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/ledger")).await?;
//! let repo = DieselPayerRepository::new(pool, NumberWidth::DEFAULT);
//! ```

mod diesel_error_mapping;
mod diesel_payer_repository;
mod diesel_registration_sequence;
mod models;
mod pool;
mod schema;

pub use diesel_payer_repository::DieselPayerRepository;
pub use diesel_registration_sequence::{DieselRegistrationSequence, PAYER_SEQUENCE_NAME};
pub use pool::{DbPool, PoolConfig, PoolError};
