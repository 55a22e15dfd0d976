//! Validated registration number values.

use std::fmt;

use serde::Serialize;

use crate::error::RegistrationNumberError;
use crate::width::NumberWidth;

/// A fixed-width, zero-padded decimal registration number.
///
/// ## Invariants
/// - `text` consists of exactly `width` ASCII digits.
/// - `value` is the integer `text` encodes, so `value < 10^width`.
///
/// Ordering compares values first; numbers of equal width therefore order
/// identically by value and by text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct RegistrationNumber {
    value: u64,
    width: NumberWidth,
    text: String,
}

impl RegistrationNumber {
    /// Parse `input` as a registration number of the given width.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationNumberError::WrongLength`] when the input is not
    /// exactly `width` characters long, or
    /// [`RegistrationNumberError::InvalidCharacter`] for the first character
    /// that is not an ASCII decimal digit.
    ///
    /// # Example
    ///
    /// ```
    /// use registration_number::{NumberWidth, RegistrationNumber};
    ///
    /// let number = RegistrationNumber::parse("01234", NumberWidth::DEFAULT)
    ///     .expect("valid number");
    /// assert_eq!(number.value(), 1234);
    /// assert!(RegistrationNumber::parse("1234", NumberWidth::DEFAULT).is_err());
    /// ```
    pub fn parse(input: &str, width: NumberWidth) -> Result<Self, RegistrationNumberError> {
        let actual = input.chars().count();
        if actual != width.as_usize() {
            return Err(RegistrationNumberError::WrongLength {
                expected: width.get(),
                actual,
            });
        }

        let mut value: u64 = 0;
        for (index, character) in input.chars().enumerate() {
            let Some(digit) = character.to_digit(10) else {
                return Err(RegistrationNumberError::InvalidCharacter { index, character });
            };
            value = value * 10 + u64::from(digit);
        }

        Ok(Self {
            value,
            width,
            text: input.to_owned(),
        })
    }

    /// Format `value` at the given width.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationNumberError::Overflow`] when `value` needs more
    /// than `width` digits. The width is never silently extended.
    pub fn from_value(value: u64, width: NumberWidth) -> Result<Self, RegistrationNumberError> {
        if value > width.max_value() {
            return Err(RegistrationNumberError::Overflow {
                value,
                width: width.get(),
            });
        }
        Ok(Self::format_unchecked(value, width))
    }

    /// The number issued to the first record of an empty store.
    #[must_use]
    pub fn first(width: NumberWidth) -> Self {
        // Every width holds at least one digit, so 1 always fits.
        Self::format_unchecked(1, width)
    }

    /// The number following this one at the same width.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationNumberError::Overflow`] when this number is the
    /// largest value the width can express.
    pub fn successor(&self) -> Result<Self, RegistrationNumberError> {
        let next = self
            .value
            .checked_add(1)
            .ok_or(RegistrationNumberError::Overflow {
                value: self.value,
                width: self.width.get(),
            })?;
        Self::from_value(next, self.width)
    }

    fn format_unchecked(value: u64, width: NumberWidth) -> Self {
        let text = format!("{value:0>digits$}", digits = width.as_usize());
        Self { value, width, text }
    }

    /// Integer value encoded by the number.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Width the number was validated against.
    #[must_use]
    pub const fn width(&self) -> NumberWidth {
        self.width
    }

    /// Canonical zero-padded text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }
}

/// Validate raw text as a registration number.
///
/// Used for freshly generated candidates and for manually edited values;
/// anything that is not exactly `width` decimal digits is rejected before it
/// reaches allocation or persistence.
///
/// # Errors
///
/// See [`RegistrationNumber::parse`].
pub fn validate(text: &str, width: NumberWidth) -> Result<RegistrationNumber, RegistrationNumberError> {
    RegistrationNumber::parse(text, width)
}

impl AsRef<str> for RegistrationNumber {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RegistrationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RegistrationNumber> for String {
    fn from(value: RegistrationNumber) -> Self {
        value.text
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn width(digits: u8) -> NumberWidth {
        NumberWidth::new(digits).expect("width in range")
    }

    #[rstest]
    #[case("00001", 1)]
    #[case("00042", 42)]
    #[case("01234", 1234)]
    #[case("99999", 99_999)]
    #[case("00000", 0)]
    fn parses_fixed_width_digits(#[case] input: &str, #[case] expected: u64) {
        let number = validate(input, NumberWidth::DEFAULT).expect("valid number");
        assert_eq!(number.value(), expected);
        assert_eq!(number.as_str(), input);
    }

    #[rstest]
    #[case("1A2B3", 1, 'A')]
    #[case("-1234", 0, '-')]
    #[case("+1234", 0, '+')]
    #[case("12 34", 2, ' ')]
    #[case("1,234", 1, ',')]
    #[case("0١234", 1, '١')]
    fn rejects_non_digit_characters(
        #[case] input: &str,
        #[case] index: usize,
        #[case] character: char,
    ) {
        let err = validate(input, NumberWidth::DEFAULT).expect_err("invalid input");
        assert_eq!(
            err,
            RegistrationNumberError::InvalidCharacter { index, character }
        );
    }

    #[rstest]
    #[case("", 0)]
    #[case("1234", 4)]
    #[case("000001", 6)]
    #[case(" 00001", 6)]
    fn rejects_wrong_length(#[case] input: &str, #[case] actual: usize) {
        let err = validate(input, NumberWidth::DEFAULT).expect_err("invalid length");
        assert_eq!(
            err,
            RegistrationNumberError::WrongLength {
                expected: 5,
                actual,
            }
        );
    }

    #[test]
    fn padded_and_unpadded_inputs_share_a_value() {
        let padded = validate("01234", NumberWidth::DEFAULT).expect("valid number");
        let unpadded: u64 = "1234".parse().expect("plain integer");

        assert_eq!(padded.value(), unpadded);
        let reformatted =
            RegistrationNumber::from_value(unpadded, NumberWidth::DEFAULT).expect("fits");
        assert_eq!(reformatted.as_str(), "01234");
        assert_eq!(reformatted, padded);
    }

    #[test]
    fn first_number_is_one() {
        assert_eq!(RegistrationNumber::first(NumberWidth::DEFAULT).as_str(), "00001");
        assert_eq!(RegistrationNumber::first(width(1)).as_str(), "1");
    }

    #[test]
    fn successor_increments_and_pads() {
        let number = validate("00099", NumberWidth::DEFAULT).expect("valid number");
        let next = number.successor().expect("space left");
        assert_eq!(next.as_str(), "00100");
        assert_eq!(next.width(), NumberWidth::DEFAULT);
    }

    #[test]
    fn successor_of_maximum_overflows() {
        let number = validate("99999", NumberWidth::DEFAULT).expect("valid number");
        let err = number.successor().expect_err("space exhausted");
        assert_eq!(
            err,
            RegistrationNumberError::Overflow {
                value: 100_000,
                width: 5,
            }
        );
    }

    #[test]
    fn successor_at_widest_width_overflows_without_wrapping() {
        let widest = width(NumberWidth::MAX);
        let number =
            RegistrationNumber::from_value(widest.max_value(), widest).expect("largest value");
        assert!(number.successor().expect_err("space exhausted").is_overflow());
    }

    #[test]
    fn from_value_rejects_values_beyond_width() {
        let err = RegistrationNumber::from_value(1_000, width(3)).expect_err("too wide");
        assert!(err.is_overflow());
    }

    #[test]
    fn ordering_matches_text_ordering() {
        let lower = validate("00009", NumberWidth::DEFAULT).expect("valid number");
        let higher = validate("00010", NumberWidth::DEFAULT).expect("valid number");
        assert!(lower < higher);
        assert!(lower.as_str() < higher.as_str());
    }

    #[test]
    fn serializes_as_plain_string() {
        let number = validate("00042", NumberWidth::DEFAULT).expect("valid number");
        let json = serde_json::to_string(&number).expect("serialize");
        assert_eq!(json, "\"00042\"");
    }
}
