//! Configured digit count for registration numbers.

use crate::error::NumberWidthError;

/// Number of decimal digits every registration number is padded to.
///
/// The width is a system-wide setting rather than a per-record property.
/// Widths above [`NumberWidth::MAX`] are rejected so that the full identifier
/// space `0..10^width` fits in a `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NumberWidth(u8);

impl NumberWidth {
    /// Five digits: `"00001"` through `"99999"`.
    pub const DEFAULT: Self = Self(5);

    /// Largest supported width.
    pub const MAX: u8 = 18;

    /// Validate and construct a width.
    ///
    /// # Errors
    ///
    /// Returns [`NumberWidthError::OutOfRange`] when `digits` is zero or
    /// exceeds [`NumberWidth::MAX`].
    pub const fn new(digits: u8) -> Result<Self, NumberWidthError> {
        if digits == 0 || digits > Self::MAX {
            return Err(NumberWidthError::OutOfRange {
                requested: digits,
                max: Self::MAX,
            });
        }
        Ok(Self(digits))
    }

    /// Digit count as configured.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Digit count as a `usize`, for string formatting and length checks.
    #[must_use]
    pub fn as_usize(self) -> usize {
        usize::from(self.0)
    }

    /// Number of distinct values representable at this width (`10^width`).
    #[must_use]
    pub fn capacity(self) -> u64 {
        10_u64.pow(u32::from(self.0))
    }

    /// Largest value representable at this width.
    #[must_use]
    pub fn max_value(self) -> u64 {
        self.capacity().saturating_sub(1)
    }
}

impl Default for NumberWidth {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for NumberWidth {
    type Error = NumberWidthError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
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

    #[rstest]
    #[case(1, 10)]
    #[case(5, 100_000)]
    #[case(18, 1_000_000_000_000_000_000)]
    fn capacity_is_power_of_ten(#[case] digits: u8, #[case] expected: u64) {
        let width = NumberWidth::new(digits).expect("width in range");
        assert_eq!(width.capacity(), expected);
        assert_eq!(width.max_value(), expected - 1);
    }

    #[rstest]
    #[case(0)]
    #[case(19)]
    #[case(u8::MAX)]
    fn rejects_out_of_range_widths(#[case] digits: u8) {
        let err = NumberWidth::new(digits).expect_err("width out of range");
        assert_eq!(
            err,
            NumberWidthError::OutOfRange {
                requested: digits,
                max: NumberWidth::MAX,
            }
        );
    }

    #[test]
    fn default_is_five_digits() {
        assert_eq!(NumberWidth::default().get(), 5);
        assert_eq!(NumberWidth::try_from(5), Ok(NumberWidth::DEFAULT));
    }
}
