pub mod board;
pub mod program;
pub mod report;

// Re-export commonly used types/functions for the binaries
pub use board::{AddressLoad, Board, Preset};
pub use program::{assemble, encode_program, hello_world, Encoded, Insn};
pub use report::{validate_formats, EntryReport, Report};
