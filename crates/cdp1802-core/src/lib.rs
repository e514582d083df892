//! Table-driven instruction engine for the RCA CDP1802 family.

#[cfg(test)]
use proptest as _;

/// Error taxonomy shared by encode and decode.
pub mod error;
pub use error::{Error, ErrorKind};

/// Addressing modes and operand acceptance.
pub mod mode;
pub use mode::{accept_mode, AddrMode};

/// Opcode tables and prefix pages.
pub mod table;
pub use table::{
    Entry, Page, PAGE_CDP1802, PAGE_CDP1804, PAGE_CDP1804A, PREFIX_68, TABLE_CDP1802,
    TABLE_CDP1804, TABLE_CDP1804A,
};

/// CPU variants and page search.
pub mod cpu;
pub use cpu::{list_cpu, Cpu, CpuId, CPUS};

/// Runtime options.
pub mod config;
pub use config::{Options, OPT_SMART_BRANCH, OPT_UPPER_HEX, OPT_USE_REGISTER};

/// Symbol table contract.
pub mod symbols;
pub use symbols::{NoSymbols, SymbolTable};

/// Operand text rendering.
pub mod formatter;
pub use formatter::Formatter;

/// Single-instruction decoder.
pub mod decoder;
pub use decoder::{page_base, DecodedInsn, Disassembler, InsnReader};

/// Linear disassembly listings.
pub mod disasm;
pub use disasm::{disassemble, DisassemblyRow};
