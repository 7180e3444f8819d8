//! Length-aware bit vectors.
//!
//! A [`BitVector`] is a fixed-width unsigned value. Bit `i` of the storage
//! is bit `i` of the value, so the raw bytes of the backing store are the
//! value in little-endian order.

use bitvec::prelude::*;
use std::fmt;

use crate::error::BitsError;
use crate::range::RangeSpec;

const VALUE_BITS: usize = u128::BITS as usize;

#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BitVector {
    bits: BitVec<u8, Lsb0>,
}

impl BitVector {
    /// Build a vector of `length` bits holding `value`. The value must fit
    /// exactly; it is never truncated.
    pub fn new(length: usize, value: u128) -> Result<Self, BitsError> {
        if length < VALUE_BITS && value >> length != 0 {
            return Err(BitsError::Construction { length, value });
        }
        let mut bits = bitvec![u8, Lsb0; 0; length];
        for i in 0..length.min(VALUE_BITS) {
            bits.set(i, (value >> i) & 1 == 1);
        }
        Ok(Self { bits })
    }

    pub fn zeros(length: usize) -> Self {
        Self { bits: bitvec![u8, Lsb0; 0; length] }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// The numeric value, or `None` if a bit above bit 127 is set.
    pub fn value(&self) -> Option<u128> {
        let mut acc = 0u128;
        for i in self.bits.iter_ones() {
            if i >= VALUE_BITS {
                return None;
            }
            acc |= 1 << i;
        }
        Some(acc)
    }

    /// `ceil(len / 8)` bytes, least significant byte first.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.bits.chunks(8).map(|c| c.load_le::<u8>()).collect()
    }

    /// `self` in the high bits, `low` in the low bits.
    pub fn concat(&self, low: &BitVector) -> BitVector {
        let mut bits = low.bits.clone();
        bits.extend_from_bitslice(self.bits.as_bitslice());
        Self { bits }
    }

    /// Concatenate `parts` with the first one most significant.
    pub fn concat_all<'a>(parts: impl IntoIterator<Item = &'a BitVector>) -> BitVector {
        parts
            .into_iter()
            .fold(BitVector::default(), |acc, part| acc.concat(part))
    }

    /// Grow by `amount` low zero bits.
    pub fn shift_left(&self, amount: usize) -> BitVector {
        let mut bits = bitvec![u8, Lsb0; 0; amount];
        bits.extend_from_bitslice(self.bits.as_bitslice());
        Self { bits }
    }

    /// Drop the `amount` low bits; the length never goes below zero.
    pub fn shift_right(&self, amount: usize) -> BitVector {
        let from = amount.min(self.len());
        Self { bits: self.bits[from..].to_bitvec() }
    }

    pub fn xor(&self, other: &BitVector) -> Result<BitVector, BitsError> {
        self.pointwise("XOR", other, |a, b| a ^ b)
    }

    pub fn and(&self, other: &BitVector) -> Result<BitVector, BitsError> {
        self.pointwise("AND", other, |a, b| a & b)
    }

    fn pointwise(
        &self,
        op: &'static str,
        other: &BitVector,
        f: impl Fn(bool, bool) -> bool,
    ) -> Result<BitVector, BitsError> {
        if self.len() != other.len() {
            return Err(BitsError::LengthMismatch {
                op,
                left: self.len(),
                right: other.len(),
            });
        }
        let bits = self
            .bits
            .iter()
            .by_vals()
            .zip(other.bits.iter().by_vals())
            .map(|(a, b)| f(a, b))
            .collect();
        Ok(Self { bits })
    }

    /// Split into chunks of the given sizes, most significant chunk first.
    ///
    /// ```
    /// use rv_macroasm::BitVector;
    /// let parts = BitVector::new(8, 0b1011_0010).unwrap().split(&[2, 4, 1, 1]).unwrap();
    /// let values: Vec<_> = parts.iter().map(|p| p.value().unwrap()).collect();
    /// assert_eq!(values, vec![0b10, 0b1100, 0b1, 0b0]);
    /// ```
    pub fn split(&self, sizes: &[usize]) -> Result<Vec<BitVector>, BitsError> {
        let total: usize = sizes.iter().sum();
        if total != self.len() {
            return Err(BitsError::Split { length: self.len(), total });
        }
        let mut end = self.len();
        Ok(sizes
            .iter()
            .map(|&n| {
                let start = end - n;
                let chunk = Self { bits: self.bits[start..end].to_bitvec() };
                end = start;
                chunk
            })
            .collect())
    }

    /// Overwrite each range with the matching value. Ranges in one call are
    /// expected to be disjoint. Nothing is written unless every pair checks
    /// out.
    pub fn set_ranges(&mut self, ranges: &[RangeSpec], values: &[BitVector]) -> Result<(), BitsError> {
        if ranges.len() != values.len() {
            return Err(BitsError::SliceCount {
                ranges: ranges.len(),
                values: values.len(),
            });
        }
        for (r, v) in ranges.iter().zip(values) {
            if r.is_constant() {
                return Err(BitsError::ConstantRange { range: r.to_string() });
            }
            if r.high() >= self.len() {
                return Err(BitsError::SliceBounds {
                    range: r.to_string(),
                    length: self.len(),
                });
            }
            if v.len() != r.width() {
                return Err(BitsError::SliceWidth {
                    range: r.to_string(),
                    width: r.width(),
                    value: v.len(),
                });
            }
        }
        for (r, v) in ranges.iter().zip(values) {
            self.bits[r.low()..=r.high()].copy_from_bitslice(v.bits.as_bitslice());
        }
        Ok(())
    }

    /// Always fails: bit vectors only get composed, never sliced back out.
    pub fn read_range(&self, range: RangeSpec) -> Result<BitVector, BitsError> {
        Err(BitsError::ReadUnsupported { range: range.to_string() })
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "BitVector(0)");
        }
        write!(f, "BitVector({}, 0b", self.len())?;
        for b in self.bits.iter().rev() {
            f.write_str(if *b { "1" } else { "0" })?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::{bit, bits, fixed};

    fn bv(length: usize, value: u128) -> BitVector {
        BitVector::new(length, value).unwrap()
    }

    #[test]
    fn construction_roundtrip() {
        for (n, v) in [(0, 0), (1, 1), (7, 0b1010101), (32, 0xdead_beef), (128, u128::MAX)] {
            let x = bv(n, v);
            assert_eq!(x.len(), n);
            assert_eq!(x.value(), Some(v));
        }
    }

    #[test]
    fn construction_rejects_wide_value() {
        assert_eq!(
            BitVector::new(3, 8),
            Err(BitsError::Construction { length: 3, value: 8 })
        );
        assert!(BitVector::new(0, 1).is_err());
    }

    #[test]
    fn wide_vectors_beyond_u128() {
        let x = bv(1, 1).shift_left(200);
        assert_eq!(x.len(), 201);
        assert_eq!(x.value(), None);
        assert_eq!(x.shift_right(200), bv(1, 1));
    }

    #[test]
    fn concat_puts_first_operand_high() {
        let x = bv(4, 0xA).concat(&bv(8, 0x5C));
        assert_eq!(x.len(), 12);
        assert_eq!(x.value(), Some(0xA5C));
        assert_eq!(bv(0, 0).concat(&bv(3, 5)), bv(3, 5));
    }

    #[test]
    fn shifts() {
        let x = bv(4, 0b1011);
        assert_eq!(x.shift_left(2), bv(6, 0b101100));
        assert_eq!(x.shift_right(1), bv(3, 0b101));
        assert_eq!(x.shift_right(9), bv(0, 0));
    }

    #[test]
    fn pointwise_ops() {
        assert_eq!(bv(4, 0b1100).xor(&bv(4, 0b1010)).unwrap(), bv(4, 0b0110));
        assert_eq!(bv(4, 0b1100).and(&bv(4, 0b1010)).unwrap(), bv(4, 0b1000));
    }

    #[test]
    fn pointwise_ops_reject_length_mismatch() {
        let err = bv(4, 1).xor(&bv(5, 1)).unwrap_err();
        assert_eq!(err, BitsError::LengthMismatch { op: "XOR", left: 4, right: 5 });
        assert!(bv(8, 1).and(&bv(4, 1)).is_err());
        assert!(bv(0, 0).and(&bv(1, 0)).is_err());
    }

    #[test]
    fn split_is_most_significant_first() {
        let parts = bv(12, 0xABC).split(&[4, 8]).unwrap();
        assert_eq!(parts, vec![bv(4, 0xA), bv(8, 0xBC)]);
    }

    #[test]
    fn split_concat_inverse() {
        let v = bv(32, 0x1234_5678);
        for sizes in [vec![32], vec![7, 25], vec![1, 1, 30], vec![12, 5, 3, 5, 7], vec![8; 4]] {
            let parts = v.split(&sizes).unwrap();
            assert_eq!(BitVector::concat_all(&parts), v, "sizes {sizes:?}");
        }
    }

    #[test]
    fn split_rejects_bad_sizes() {
        assert_eq!(
            bv(8, 0).split(&[4, 3]),
            Err(BitsError::Split { length: 8, total: 7 })
        );
    }

    #[test]
    fn set_ranges_writes_each_range() {
        let mut acc = BitVector::zeros(16);
        acc.set_ranges(&[bits(15, 12), bit(0)], &[bv(4, 0xF), bv(1, 1)]).unwrap();
        assert_eq!(acc.value(), Some(0xF001));
        // overwrite clears previously set bits
        acc.set_ranges(&[bits(15, 12)], &[bv(4, 0x5)]).unwrap();
        assert_eq!(acc.value(), Some(0x5001));
    }

    #[test]
    fn set_ranges_checks_inputs() {
        let mut acc = BitVector::zeros(8);
        assert!(matches!(
            acc.set_ranges(&[bits(3, 0)], &[bv(3, 0)]),
            Err(BitsError::SliceWidth { width: 4, value: 3, .. })
        ));
        assert!(matches!(
            acc.set_ranges(&[bits(8, 5)], &[bv(4, 0)]),
            Err(BitsError::SliceBounds { length: 8, .. })
        ));
        assert!(matches!(
            acc.set_ranges(&[bits(3, 0), bits(7, 4)], &[bv(4, 0)]),
            Err(BitsError::SliceCount { ranges: 2, values: 1 })
        ));
        assert!(matches!(
            acc.set_ranges(&[fixed(3, 0, 1)], &[bv(4, 1)]),
            Err(BitsError::ConstantRange { .. })
        ));
        assert_eq!(acc, BitVector::zeros(8));
    }

    #[test]
    fn read_access_is_unsupported() {
        assert!(matches!(
            bv(8, 0xFF).read_range(bits(3, 0)),
            Err(BitsError::ReadUnsupported { .. })
        ));
    }

    #[test]
    fn little_endian_bytes() {
        assert_eq!(bv(32, 0x0010_0093).to_le_bytes(), vec![0x93, 0x00, 0x10, 0x00]);
        assert_eq!(bv(12, 0xABC).to_le_bytes(), vec![0xBC, 0x0A]);
        assert!(bv(0, 0).to_le_bytes().is_empty());
    }

    #[test]
    fn display() {
        assert_eq!(bv(0, 0).to_string(), "BitVector(0)");
        assert_eq!(bv(4, 0b0101).to_string(), "BitVector(4, 0b0101)");
    }
}
