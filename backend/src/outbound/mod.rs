//! Outbound adapters implementing the registration store ports.
//!
//! - **memory**: process-local store for tests and single-process use.
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM.
//!
//! Adapters translate between domain types and store representations. They
//! contain no allocation or retry logic.

pub mod memory;
pub mod persistence;
