//! Payer registration back end.
//!
//! Allocates fixed-width registration numbers, validates manually edited
//! ones, and commits payer records under a store-enforced uniqueness
//! constraint, regenerating the number when a concurrent session took it.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod registration;
