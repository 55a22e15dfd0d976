//! Error types for registration number construction and validation.

use thiserror::Error;

/// Errors raised when configuring a [`crate::NumberWidth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumberWidthError {
    /// The requested width is zero or too wide for a `u64` value.
    #[error("registration number width must be between 1 and {max} digits, got {requested}")]
    OutOfRange {
        /// Width that was requested.
        requested: u8,
        /// Largest supported width.
        max: u8,
    },
}

/// Errors raised when parsing or producing a [`crate::RegistrationNumber`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationNumberError {
    /// The input does not have exactly the configured number of characters.
    #[error("registration number must be exactly {expected} digits, got {actual} characters")]
    WrongLength {
        /// Configured width.
        expected: u8,
        /// Number of characters supplied.
        actual: usize,
    },

    /// The input contains something other than an ASCII decimal digit.
    #[error("registration number may only contain digits, found {character:?} at position {index}")]
    InvalidCharacter {
        /// Zero-based character position of the offending character.
        index: usize,
        /// The rejected character.
        character: char,
    },

    /// The value needs more digits than the configured width provides.
    #[error("registration number {value} does not fit in {width} digits")]
    Overflow {
        /// Value that could not be formatted.
        value: u64,
        /// Configured width.
        width: u8,
    },
}

impl RegistrationNumberError {
    /// Returns `true` when the identifier space is exhausted rather than the
    /// input being malformed.
    #[must_use]
    pub const fn is_overflow(&self) -> bool {
        matches!(self, Self::Overflow { .. })
    }
}
