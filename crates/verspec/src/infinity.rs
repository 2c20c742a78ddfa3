//! Ordering extremes used to build version comparison keys.
//!
//! PEP 440 orders a version without a dev segment after all of its dev releases, and a version
//! without a post segment before all of its post releases. Rather than special casing each field,
//! the comparison key maps a missing segment to one of the two extremes below.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// A value that is greater (or less) than every other value it is compared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Infinity {
    /// Less than everything but itself.
    Negative,
    /// Greater than everything but itself.
    Positive,
}

impl Neg for Infinity {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Self::Negative => Self::Positive,
            Self::Positive => Self::Negative,
        }
    }
}

impl Display for Infinity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Negative => f.write_str("-Infinity"),
            Self::Positive => f.write_str("Infinity"),
        }
    }
}

/// A value of `T` extended with the two [`Infinity`] extremes.
///
/// `Finite` values compare by `T`, `Extreme(Negative)` sorts before all of them and
/// `Extreme(Positive)` after all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extended<T> {
    /// An ordinary value.
    Finite(T),
    /// One of the two extremes.
    Extreme(Infinity),
}

impl<T> Extended<T> {
    /// Sorts before every other value.
    pub const NEGATIVE_INFINITY: Self = Self::Extreme(Infinity::Negative);
    /// Sorts after every other value.
    pub const INFINITY: Self = Self::Extreme(Infinity::Positive);

    /// Map an optional value, using `missing` where there is none.
    pub fn or_extreme(value: Option<T>, missing: Infinity) -> Self {
        value.map_or(Self::Extreme(missing), Self::Finite)
    }
}

impl<T> From<Infinity> for Extended<T> {
    fn from(infinity: Infinity) -> Self {
        Self::Extreme(infinity)
    }
}

impl<T: Ord> PartialOrd for Extended<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> Ord for Extended<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Finite(this), Self::Finite(other)) => this.cmp(other),
            (Self::Extreme(this), Self::Extreme(other)) => this.cmp(other),
            (Self::Extreme(Infinity::Negative), Self::Finite(_))
            | (Self::Finite(_), Self::Extreme(Infinity::Positive)) => Ordering::Less,
            (Self::Extreme(Infinity::Positive), Self::Finite(_))
            | (Self::Finite(_), Self::Extreme(Infinity::Negative)) => Ordering::Greater,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_bracket_finite_values() {
        let values = [
            Extended::Finite(0u64),
            Extended::Finite(u64::MAX),
            Extended::Finite(42),
        ];
        for value in values {
            assert!(Extended::NEGATIVE_INFINITY < value);
            assert!(Extended::INFINITY > value);
            assert_ne!(Extended::INFINITY, value);
        }
        assert!(Extended::<u64>::NEGATIVE_INFINITY < Extended::INFINITY);
        assert_eq!(Extended::<u64>::INFINITY, Extended::INFINITY);
        assert_eq!(
            Extended::<u64>::NEGATIVE_INFINITY.cmp(&Extended::NEGATIVE_INFINITY),
            Ordering::Equal
        );
    }

    #[test]
    fn extremes_compare_against_strings_and_tuples() {
        assert!(Extended::Finite("zzz") < Extended::INFINITY);
        assert!(Extended::Finite((u64::MAX, "a")) > Extended::NEGATIVE_INFINITY);
        assert!(Extended::Finite((1, "a")) < Extended::Finite((1, "b")));
    }

    #[test]
    fn negation() {
        assert_eq!(-Infinity::Positive, Infinity::Negative);
        assert_eq!(-Infinity::Negative, Infinity::Positive);
        assert_eq!(-(-Infinity::Positive), Infinity::Positive);
    }

    #[test]
    fn display() {
        assert_eq!(Infinity::Positive.to_string(), "Infinity");
        assert_eq!(Infinity::Negative.to_string(), "-Infinity");
    }

    #[test]
    fn or_extreme() {
        assert_eq!(
            Extended::or_extreme(None::<u64>, Infinity::Positive),
            Extended::INFINITY
        );
        assert_eq!(
            Extended::or_extreme(Some(3u64), Infinity::Negative),
            Extended::Finite(3)
        );
    }
}
