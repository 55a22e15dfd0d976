//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports ([`PayerRepository`], [`RegistrationSequence`]) are
//! implemented by outbound adapters. Driving ports
//! ([`PayerRegistrationCommand`], [`PayerRegistrationQuery`]) are implemented
//! by the domain services and consumed by inbound layers.

mod macros;
pub(crate) use macros::define_port_error;

mod payer_registration_command;
mod payer_registration_query;
mod payer_repository;
mod registration_sequence;

#[cfg(test)]
pub use payer_registration_command::MockPayerRegistrationCommand;
pub use payer_registration_command::{
    PayerRegistrationCommand, RegisterPayerRequest, RegisterPayerResponse, UpdatePayerRequest,
};
#[cfg(test)]
pub use payer_registration_query::MockPayerRegistrationQuery;
pub use payer_registration_query::PayerRegistrationQuery;
#[cfg(test)]
pub use payer_repository::MockPayerRepository;
pub use payer_repository::{PayerRepository, PayerRepositoryError};
#[cfg(test)]
pub use registration_sequence::MockRegistrationSequence;
pub use registration_sequence::{RegistrationSequence, RegistrationSequenceError};
