use thiserror::Error;

/// Failures of `BitVector` construction and arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitsError {
    #[error("value {value:#x} is larger than specified bitwidth {length}")]
    Construction { length: usize, value: u128 },
    #[error("cannot {op} bit vectors of length {left} and {right}")]
    LengthMismatch {
        op: &'static str,
        left: usize,
        right: usize,
    },
    #[error("positional read of {range} is not supported; bit vectors are write-only accumulators")]
    ReadUnsupported { range: String },
    #[error("tried to split a bit vector of length {length}, but sizes add up to {total}")]
    Split { length: usize, total: usize },
    #[error("can't set {values} values in {ranges} locations")]
    SliceCount { ranges: usize, values: usize },
    #[error("value of length {value} does not fit range {range} of width {width}")]
    SliceWidth {
        range: String,
        width: usize,
        value: usize,
    },
    #[error("range {range} reaches past bit vector of length {length}")]
    SliceBounds { range: String, length: usize },
    #[error("range {range} is a constant and cannot be written with a parameter value")]
    ConstantRange { range: String },
}

/// A bit range written high end first came out inverted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("bit range {high}:{low} has its high end below its low end")]
pub struct RangeError {
    pub high: usize,
    pub low: usize,
}

/// A format's bit ranges do not tile its word exactly once.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoverageError {
    #[error("bit range in part {field}=bits[{high}:{low}] exceeds instruction width {width}")]
    OutOfBounds {
        field: String,
        high: usize,
        low: usize,
        width: usize,
    },
    #[error("gap before part {field}=bits[{high}:{low}]: bits {missing_high}:{missing_low} are not covered")]
    Gap {
        field: String,
        high: usize,
        low: usize,
        missing_high: usize,
        missing_low: usize,
    },
    #[error("overlapping bit range in part {field}=bits[{high}:{low}]: bit {high} is already covered")]
    Overlap {
        field: String,
        high: usize,
        low: usize,
    },
    #[error("instruction did not cover bits {high}:{low}")]
    Uncovered { high: usize, low: usize },
}

impl CoverageError {
    /// The field the check stopped at, if the failure can be pinned on one.
    pub fn field(&self) -> Option<&str> {
        match self {
            CoverageError::OutOfBounds { field, .. }
            | CoverageError::Gap { field, .. }
            | CoverageError::Overlap { field, .. } => Some(field.as_str()),
            CoverageError::Uncovered { .. } => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unknown field `{name}`")]
    UnknownField { name: String },
    #[error("missing value for field `{name}`")]
    MissingField { name: String },
    #[error("value {value:#x} does not fit field `{name}` of width {width}")]
    ValueTooWide {
        name: String,
        width: usize,
        value: u128,
    },
    #[error("field `{name}` is fixed to {expected}, got {value:#x}")]
    ConstantMismatch {
        name: String,
        expected: String,
        value: u128,
    },
    #[error(transparent)]
    Bits(#[from] BitsError),
}
