//! Linear disassembly listings.
//!
//! Walks a memory image from its first byte and produces one row per
//! instruction, turning undecodable bytes into `DB` rows.

use crate::decoder::Disassembler;
use crate::error::ErrorKind;
use crate::formatter::Formatter;
use crate::symbols::SymbolTable;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// The starting address of this instruction.
    pub addr_start: u16,
    /// Length in bytes, prefix included.
    pub len_bytes: u8,
    /// Raw instruction bytes.
    pub bytes: Vec<u8>,
    /// The instruction mnemonic, or `DB` for an illegal encoding.
    pub mnemonic: String,
    /// The formatted operands (e.g. `"3, #8485"`).
    pub operands: String,
    /// Whether this row covers bytes no page of the CPU decodes.
    pub is_illegal: bool,
}

impl DisassemblyRow {
    #[allow(clippy::cast_possible_truncation)]
    fn illegal(addr_start: u16, bytes: &[u8], fmt: &Formatter<'_>) -> Self {
        let operands = bytes
            .iter()
            .map(|&b| fmt.byte(b))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            addr_start,
            len_bytes: bytes.len() as u8,
            bytes: bytes.to_vec(),
            mnemonic: "DB".to_string(),
            operands,
            is_illegal: true,
        }
    }
}

/// Disassembles up to `count` instructions of `memory`, which is loaded at
/// `origin`.
///
/// An unknown opcode produces an illegal row and decoding resumes after it;
/// when that opcode sits behind a prefix byte both bytes are reserved.
/// The listing ends early at an instruction truncated by the end of memory.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn disassemble(
    dis: &Disassembler,
    memory: &[u8],
    origin: u16,
    count: usize,
    symbols: &dyn SymbolTable,
) -> Vec<DisassemblyRow> {
    let mut rows = Vec::with_capacity(count.min(memory.len()));
    let mut offset = 0usize;

    while rows.len() < count && offset < memory.len() {
        let address = origin.wrapping_add(offset as u16);
        let rest = &memory[offset..];
        let row = match dis.decode(rest, address, symbols) {
            Ok(insn) => DisassemblyRow {
                addr_start: insn.address,
                len_bytes: insn.bytes.len() as u8,
                bytes: insn.bytes,
                mnemonic: insn.mnemonic.to_string(),
                operands: insn.operands,
                is_illegal: false,
            },
            Err(err) if err.kind == ErrorKind::NoMemory => {
                log::debug!("listing stops at {address:04X}: truncated instruction");
                break;
            }
            Err(_) => {
                let len = if dis.cpu().is_prefix(rest[0]) { 2 } else { 1 };
                let fmt = Formatter::new(*dis.options(), symbols);
                DisassemblyRow::illegal(address, &rest[..len.min(rest.len())], &fmt)
            }
        };
        offset += usize::from(row.len_bytes);
        rows.push(row);
    }

    rows
}
