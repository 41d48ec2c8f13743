//! Occurrence and delimiter counts.
//!
//! Counts are written as `N`, `A..B`, `A..`, `..B` or `..` in help files. An
//! omitted upper bound means "no upper limit", which is modelled by
//! [`Bound::Unbounded`] rather than a sentinel number.
//!
//! # Examples
//!
//! ```
//! use helpspec_core::{Bound, CountRange};
//!
//! let count = CountRange::parse("2..").unwrap();
//! assert_eq!(count.min, 2);
//! assert_eq!(count.max, Bound::Unbounded);
//! assert_eq!(count.to_string(), "2..");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper limit of a [`CountRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// At most this many.
    Bounded(u32),
    /// No upper limit.
    Unbounded,
}

impl Bound {
    /// Returns `true` for [`Bound::Unbounded`].
    pub fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Returns the limit, or `None` when unbounded.
    pub fn limit(self) -> Option<u32> {
        match self {
            Self::Bounded(n) => Some(n),
            Self::Unbounded => None,
        }
    }

    /// The larger of two bounds. Unbounded wins.
    pub fn max(self, other: Self) -> Self {
        match (self, other) {
            (Self::Bounded(a), Self::Bounded(b)) => Self::Bounded(a.max(b)),
            _ => Self::Unbounded,
        }
    }

    /// Sum of two bounds. Unbounded absorbs.
    pub fn add(self, other: Self) -> Self {
        match (self, other) {
            (Self::Bounded(a), Self::Bounded(b)) => Self::Bounded(a.saturating_add(b)),
            _ => Self::Unbounded,
        }
    }

    /// Product of two bounds. Unbounded absorbs.
    pub fn mul(self, other: Self) -> Self {
        match (self, other) {
            (Self::Bounded(a), Self::Bounded(b)) => Self::Bounded(a.saturating_mul(b)),
            _ => Self::Unbounded,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{n}"),
            Self::Unbounded => Ok(()),
        }
    }
}

/// Errors from [`CountRange::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountParseError {
    /// The text is not a count.
    #[error("invalid count: \"{0}\"")]
    Invalid(String),
    /// The minimum is below zero.
    #[error("minimum count can't be less than 0: \"{0}\"")]
    NegativeMinimum(String),
    /// The maximum is smaller than the minimum.
    #[error("invalid range: \"{0}\"")]
    InvertedRange(String),
}

/// An inclusive `min..max` range of repetitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountRange {
    /// Smallest legal number.
    pub min: u32,
    /// Largest legal number.
    pub max: Bound,
}

impl CountRange {
    /// `0..1`, the default for options.
    pub const ZERO_OR_ONE: Self = Self::new(0, Bound::Bounded(1));
    /// `1`, the default for positional arguments.
    pub const EXACTLY_ONE: Self = Self::exactly(1);
    /// `0..`.
    pub const ZERO_OR_MORE: Self = Self::new(0, Bound::Unbounded);
    /// `0`, the delimiter count of an undelimited capture.
    pub const NONE: Self = Self::exactly(0);

    /// Creates a range.
    pub const fn new(min: u32, max: Bound) -> Self {
        Self { min, max }
    }

    /// Creates the range `n..n`.
    pub const fn exactly(n: u32) -> Self {
        Self::new(n, Bound::Bounded(n))
    }

    /// Returns `true` when min and max are the same number.
    pub fn is_fixed(&self) -> bool {
        self.max == Bound::Bounded(self.min)
    }

    /// Smallest min and largest max of the two ranges.
    pub fn combine(self, other: Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Elementwise sum of the two ranges.
    pub fn sum(self, other: Self) -> Self {
        Self::new(self.min.saturating_add(other.min), self.max.add(other.max))
    }

    /// The number of sub-values when every occurrence is split by a delimiter
    /// occurring `delimiters` times.
    pub fn times_arity(self, delimiters: Self) -> Self {
        let arity_max = delimiters.max.add(Bound::Bounded(1));
        Self::new(
            self.min.saturating_mul(delimiters.min.saturating_add(1)),
            self.max.mul(arity_max),
        )
    }

    /// Parses `N`, `A..B`, `A..`, `..B` or `..`.
    ///
    /// # Errors
    ///
    /// Returns [`CountParseError`] for non-numeric parts, a negative minimum
    /// or a maximum below the minimum.
    pub fn parse(text: &str) -> Result<Self, CountParseError> {
        let trimmed = text.trim();
        let parse_part = |part: &str| -> Result<i64, CountParseError> {
            part.trim()
                .parse::<i64>()
                .map_err(|_| CountParseError::Invalid(trimmed.to_string()))
        };

        let (min, max) = match trimmed.split_once("..") {
            None => {
                let n = parse_part(trimmed)?;
                (n, Some(n))
            }
            Some((lo, hi)) => {
                let min = if lo.trim().is_empty() { 0 } else { parse_part(lo)? };
                let max = if hi.trim().is_empty() {
                    None
                } else {
                    Some(parse_part(hi)?)
                };
                (min, max)
            }
        };

        if min < 0 {
            return Err(CountParseError::NegativeMinimum(trimmed.to_string()));
        }
        let min = u32::try_from(min).map_err(|_| CountParseError::Invalid(trimmed.to_string()))?;
        let max = match max {
            None => Bound::Unbounded,
            Some(n) if n < i64::from(min) => {
                return Err(CountParseError::InvertedRange(trimmed.to_string()));
            }
            Some(n) => Bound::Bounded(
                u32::try_from(n).map_err(|_| CountParseError::Invalid(trimmed.to_string()))?,
            ),
        };
        Ok(Self::new(min, max))
    }
}

impl Default for CountRange {
    fn default() -> Self {
        Self::EXACTLY_ONE
    }
}

impl fmt::Display for CountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fixed() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}..{}", self.min, self.max)
        }
    }
}
