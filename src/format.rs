//! Instruction formats: a fixed-width word split into named fields.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::bits::BitVector;
use crate::error::{BitsError, CoverageError, EncodeError};
use crate::range::{normalize, IntoRanges, RangeSpec};

/// Field values handed to [`InstructionFormat::encode`], keyed by field name.
pub type Params<'a> = BTreeMap<&'a str, u128>;

/// A named part of an instruction mapped onto one or more bit ranges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    name: String,
    ranges: Vec<RangeSpec>,
}

impl Field {
    pub fn new(name: impl Into<String>, ranges: impl IntoRanges) -> Self {
        Self {
            name: name.into(),
            ranges: normalize(ranges),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ranges in declaration order.
    pub fn ranges(&self) -> &[RangeSpec] {
        &self.ranges
    }

    pub fn width(&self) -> usize {
        self.ranges.iter().map(RangeSpec::width).sum()
    }

    pub fn param_ranges(&self) -> Vec<RangeSpec> {
        self.ranges.iter().filter(|r| !r.is_constant()).copied().collect()
    }

    pub fn constant_ranges(&self) -> Vec<RangeSpec> {
        self.ranges.iter().filter(|r| r.is_constant()).copied().collect()
    }

    pub fn param_width(&self) -> usize {
        self.ranges
            .iter()
            .filter(|r| !r.is_constant())
            .map(RangeSpec::width)
            .sum()
    }

    /// True when the field takes no value at encode time.
    pub fn is_fixed(&self) -> bool {
        self.ranges.iter().all(RangeSpec::is_constant)
    }

    /// Constant ranges concatenated in declaration order, first one high.
    pub fn fixed_value(&self) -> Result<BitVector, BitsError> {
        let parts = constant_values(&self.constant_ranges())?;
        Ok(BitVector::concat_all(&parts))
    }

    fn check_fixed(&self, value: u128) -> Result<(), EncodeError> {
        let fixed = self.fixed_value()?;
        match BitVector::new(fixed.len(), value) {
            Ok(given) if given == fixed => Ok(()),
            _ => Err(EncodeError::ConstantMismatch {
                name: self.name.clone(),
                expected: fixed.to_string(),
                value,
            }),
        }
    }

    /// The parameter value cut into one chunk per parameter range.
    fn param_chunks(&self, value: u128) -> Result<Vec<BitVector>, EncodeError> {
        let sizes: Vec<usize> = self
            .ranges
            .iter()
            .filter(|r| !r.is_constant())
            .map(RangeSpec::width)
            .collect();
        let width = sizes.iter().sum();
        let whole = BitVector::new(width, value).map_err(|_| EncodeError::ValueTooWide {
            name: self.name.clone(),
            width,
            value,
        })?;
        Ok(whole.split(&sizes)?)
    }
}

fn constant_values(ranges: &[RangeSpec]) -> Result<Vec<BitVector>, BitsError> {
    ranges
        .iter()
        .map(|r| BitVector::new(r.width(), r.constant().unwrap_or_default()))
        .collect()
}

/// A fixed-width instruction word and the fields that make it up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructionFormat {
    width: usize,
    fields: Vec<Field>,
}

impl InstructionFormat {
    pub fn new(width: usize) -> Self {
        Self { width, fields: Vec::new() }
    }

    /// Add a field, replacing any field of the same name in place.
    pub fn field(mut self, name: impl Into<String>, ranges: impl IntoRanges) -> Self {
        let field = Field::new(name, ranges);
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(slot) => *slot = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check that every bit of the word belongs to exactly one range.
    pub fn validate(&self) -> Result<(), CoverageError> {
        let mut ranges: Vec<(usize, usize, &str)> = self
            .fields
            .iter()
            .flat_map(|f| f.ranges.iter().map(move |r| (r.high(), r.low(), f.name.as_str())))
            .collect();
        ranges.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

        // bits next-1..0 are still unclaimed
        let mut next = self.width;
        for (high, low, name) in ranges {
            if high >= self.width {
                return Err(CoverageError::OutOfBounds {
                    field: name.to_string(),
                    high,
                    low,
                    width: self.width,
                });
            }
            if high >= next {
                return Err(CoverageError::Overlap {
                    field: name.to_string(),
                    high,
                    low,
                });
            }
            if high + 1 < next {
                return Err(CoverageError::Gap {
                    field: name.to_string(),
                    high,
                    low,
                    missing_high: next - 1,
                    missing_low: high + 1,
                });
            }
            next = low;
        }
        if next != 0 {
            return Err(CoverageError::Uncovered { high: next - 1, low: 0 });
        }
        debug!(width = self.width, fields = self.fields.len(), "format covers every bit");
        Ok(())
    }

    /// Build the instruction word from `params`.
    ///
    /// Every field with parameter ranges needs a value; unknown names are
    /// rejected. A value given for a fully constant field must match it.
    /// Coverage is not checked here, see [`InstructionFormat::validate`].
    pub fn encode(&self, params: &Params) -> Result<BitVector, EncodeError> {
        if let Some(name) = params.keys().find(|name| self.get(name).is_none()) {
            return Err(EncodeError::UnknownField { name: name.to_string() });
        }
        debug!(width = self.width, fields = self.fields.len(), "encode");

        let mut acc = BitVector::zeros(self.width);
        for field in &self.fields {
            let value = params.get(field.name()).copied();
            if field.is_fixed() {
                if let Some(v) = value {
                    field.check_fixed(v)?;
                }
            } else {
                let v = value.ok_or_else(|| EncodeError::MissingField {
                    name: field.name.clone(),
                })?;
                let ranges = field.param_ranges();
                trace!(field = field.name(), value = v, ?ranges, "set parameter");
                acc.set_ranges(&ranges, &field.param_chunks(v)?)?;
            }

            let consts = field.constant_ranges();
            if !consts.is_empty() {
                let values = constant_values(&consts)?;
                let positions: Vec<RangeSpec> = consts.iter().map(RangeSpec::position).collect();
                trace!(field = field.name(), ranges = ?consts, "set constant");
                acc.set_ranges(&positions, &values)?;
            }
        }
        Ok(acc)
    }

    /// [`InstructionFormat::encode`] serialized least significant byte first.
    pub fn encode_bytes(&self, params: &Params) -> Result<Vec<u8>, EncodeError> {
        Ok(self.encode(params)?.to_le_bytes())
    }

    /// Derive a format with `name` pinned to `value`: the field's parameter
    /// ranges become constant ranges holding the matching chunks of `value`.
    pub fn pin(&self, name: &str, value: u128) -> Result<InstructionFormat, EncodeError> {
        let field = self.get(name).ok_or_else(|| EncodeError::UnknownField {
            name: name.to_string(),
        })?;
        if field.is_fixed() {
            field.check_fixed(value)?;
            return Ok(self.clone());
        }

        let mut chunks = field.param_chunks(value)?.into_iter();
        let mut ranges = Vec::with_capacity(field.ranges.len());
        for r in &field.ranges {
            if r.is_constant() {
                ranges.push(*r);
                continue;
            }
            let chunk = chunks
                .next()
                .and_then(|c| c.value())
                .ok_or_else(|| EncodeError::ValueTooWide {
                    name: name.to_string(),
                    width: field.param_width(),
                    value,
                })?;
            ranges.push(r.with_constant(chunk));
        }
        debug!(field = name, value, "pinned field");
        Ok(self.clone().field(name, ranges))
    }
}
