//! Bit range descriptions.
//!
//! Ranges follow the RISC-V manual convention: `high:low`, both ends
//! inclusive, bit 0 being the least significant bit of the word.

use serde::Serialize;
use std::fmt;

use crate::error::RangeError;

/// One inclusive bit range, optionally pinned to a fixed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RangeSpec {
    high: usize,
    low: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    constant: Option<u128>,
}

impl RangeSpec {
    /// Parameter range `high:low`.
    pub const fn new(high: usize, low: usize) -> Self {
        assert!(high >= low, "bit range high end must not be below its low end");
        Self { high, low, constant: None }
    }

    /// Constant range `high:low` holding `value`.
    pub const fn fixed(high: usize, low: usize, value: u128) -> Self {
        assert!(high >= low, "bit range high end must not be below its low end");
        Self { high, low, constant: Some(value) }
    }

    /// Fallible counterpart of [`RangeSpec::new`]/[`RangeSpec::fixed`].
    pub fn try_new(high: usize, low: usize, constant: Option<u128>) -> Result<Self, RangeError> {
        if high < low {
            return Err(RangeError { high, low });
        }
        Ok(Self { high, low, constant })
    }

    pub const fn high(&self) -> usize {
        self.high
    }

    pub const fn low(&self) -> usize {
        self.low
    }

    pub const fn width(&self) -> usize {
        self.high - self.low + 1
    }

    pub const fn constant(&self) -> Option<u128> {
        self.constant
    }

    pub const fn is_constant(&self) -> bool {
        self.constant.is_some()
    }

    /// The same bit positions as a parameter range.
    pub const fn position(&self) -> Self {
        Self { high: self.high, low: self.low, constant: None }
    }

    /// The same bit positions pinned to `value`.
    pub const fn with_constant(&self, value: u128) -> Self {
        Self { high: self.high, low: self.low, constant: Some(value) }
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.high == self.low {
            write!(f, "[{}]", self.high)?;
        } else {
            write!(f, "[{}:{}]", self.high, self.low)?;
        }
        if let Some(c) = self.constant {
            write!(f, "=0b{:0w$b}", c, w = self.width())?;
        }
        Ok(())
    }
}

/// Parameter range `high:low`.
pub const fn bits(high: usize, low: usize) -> RangeSpec {
    RangeSpec::new(high, low)
}

/// Single-bit parameter range `k:k`.
pub const fn bit(k: usize) -> RangeSpec {
    RangeSpec::new(k, k)
}

/// Constant range `high:low` fixed to `value`.
pub const fn fixed(high: usize, low: usize, value: u128) -> RangeSpec {
    RangeSpec::fixed(high, low, value)
}

/// Anything that can describe where a field lives: a bit index, a single
/// range, or an ordered collection of ranges.
pub trait IntoRanges {
    fn into_ranges(self) -> Vec<RangeSpec>;
}

impl IntoRanges for usize {
    fn into_ranges(self) -> Vec<RangeSpec> {
        vec![bit(self)]
    }
}

impl IntoRanges for RangeSpec {
    fn into_ranges(self) -> Vec<RangeSpec> {
        vec![self]
    }
}

impl IntoRanges for Vec<RangeSpec> {
    fn into_ranges(self) -> Vec<RangeSpec> {
        self
    }
}

impl IntoRanges for &[RangeSpec] {
    fn into_ranges(self) -> Vec<RangeSpec> {
        self.to_vec()
    }
}

impl<const N: usize> IntoRanges for [RangeSpec; N] {
    fn into_ranges(self) -> Vec<RangeSpec> {
        self.to_vec()
    }
}

/// Normalize a range description into an ordered list. Order is kept as
/// given; nothing is sorted or merged.
pub fn normalize(ranges: impl IntoRanges) -> Vec<RangeSpec> {
    ranges.into_ranges()
}
