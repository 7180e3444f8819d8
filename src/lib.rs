pub mod bits;
pub mod catalog;
pub mod error;
pub mod format;
pub mod range;

pub use bits::BitVector;
pub use catalog::{catalog, Catalog};
pub use error::{BitsError, CoverageError, EncodeError, RangeError};
pub use format::{Field, InstructionFormat, Params};
pub use range::{bit, bits, fixed, normalize, IntoRanges, RangeSpec};
