//! CDP1802 family assembler library.

#[cfg(test)]
use proptest as _;

/// Top-level two-pass assembler pipeline.
pub mod assembler;
pub use assembler::{assemble, AssembleError, AssembleErrorKind, AssembleResult, ListingEntry};
/// Instruction encoding.
pub mod encoder;
pub use encoder::Assembler;
/// Mnemonic resolution against the CPU's prefix pages.
pub mod mnemonic;
/// Assembly parser for instructions, labels, and directives.
pub mod parser;
/// Symbol table used by the driver.
pub mod symbols;
pub use symbols::{Symbol, Symbols};
