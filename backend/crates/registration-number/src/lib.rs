//! Fixed-width payer registration numbers.
//!
//! Registration numbers are non-negative integers rendered as zero-padded
//! decimal strings of a single, system-wide width (`"00001"`, `"00002"`, ...).
//! Because every stored number has the same width, lexicographic order over
//! the strings equals numeric order, which lets stores answer "what is the
//! highest issued number?" with a plain descending sort.
//!
//! The crate provides:
//!
//! - [`NumberWidth`]: the configured digit count, bounded so every value fits
//!   in a `u64`.
//! - [`RegistrationNumber`]: a validated number carrying both its integer
//!   value and its canonical text.
//! - [`validate`]: the validator applied to generated candidates and to
//!   manually edited input alike.
//!
//! # Example
//!
//! ```
//! use registration_number::{NumberWidth, RegistrationNumber, validate};
//!
//! let width = NumberWidth::DEFAULT;
//! let current = validate("00042", width).expect("valid number");
//! let next = current.successor().expect("space left");
//!
//! assert_eq!(next.as_str(), "00043");
//! assert_eq!(RegistrationNumber::first(width).as_str(), "00001");
//! ```

mod error;
mod number;
mod width;

pub use error::{NumberWidthError, RegistrationNumberError};
pub use number::{RegistrationNumber, validate};
pub use width::NumberWidth;
