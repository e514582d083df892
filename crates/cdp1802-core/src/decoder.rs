//! Instruction decoder for the CDP1802 family.
//!
//! Resolves a possibly prefixed opcode to its table entry, then renders the
//! entry's operands as text.

use crate::config::Options;
use crate::cpu::{Cpu, CpuId};
use crate::error::{Error, ErrorKind};
use crate::formatter::Formatter;
use crate::mode::AddrMode;
use crate::symbols::SymbolTable;

/// Sequential byte cursor over the memory of one instruction.
#[derive(Debug, Clone)]
pub struct InsnReader<'a> {
    memory: &'a [u8],
    offset: usize,
}

impl<'a> InsnReader<'a> {
    /// Creates a reader positioned at the first byte of `memory`.
    #[must_use]
    pub const fn new(memory: &'a [u8]) -> Self {
        Self { memory, offset: 0 }
    }

    /// Reads the next byte.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NoMemory`] past the end of memory.
    pub fn read_byte(&mut self) -> Result<u8, Error> {
        let byte = *self
            .memory
            .get(self.offset)
            .ok_or(Error::new(ErrorKind::NoMemory))?;
        self.offset += 1;
        Ok(byte)
    }

    /// Reads the next two bytes as a big-endian value.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NoMemory`] past the end of memory.
    pub fn read_u16(&mut self) -> Result<u16, Error> {
        let hi = self.read_byte()?;
        let lo = self.read_byte()?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn consumed(&self) -> &'a [u8] {
        &self.memory[..self.offset]
    }
}

/// A decoded instruction with rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInsn {
    /// Address of the first byte (the prefix, if any).
    pub address: u16,
    /// Every byte of the instruction.
    pub bytes: Vec<u8>,
    /// Canonical mnemonic of the first matching entry.
    pub mnemonic: &'static str,
    /// Operands joined by `", "`; empty when there are none.
    pub operands: String,
}

impl DecodedInsn {
    /// Mnemonic and operands as one source line.
    #[must_use]
    pub fn text(&self) -> String {
        if self.operands.is_empty() {
            self.mnemonic.to_string()
        } else {
            format!("{} {}", self.mnemonic, self.operands)
        }
    }
}

/// Table-driven disassembler bound to one CPU variant.
#[derive(Debug, Clone)]
pub struct Disassembler {
    cpu: &'static Cpu,
    options: Options,
}

impl Default for Disassembler {
    fn default() -> Self {
        Self::new(CpuId::Cdp1802)
    }
}

impl Disassembler {
    /// Creates a disassembler for `id` with default options.
    #[must_use]
    pub fn new(id: CpuId) -> Self {
        Self {
            cpu: Cpu::get(id),
            options: Options::default(),
        }
    }

    /// Selects the CPU by name; leaves the selection unchanged on failure.
    pub fn set_cpu(&mut self, name: &str) -> bool {
        match Cpu::by_name(name) {
            Some(cpu) => {
                log::debug!("disassembler cpu {} -> {}", self.cpu.name(), cpu.name());
                self.cpu = cpu;
                true
            }
            None => false,
        }
    }

    /// Current CPU.
    #[must_use]
    pub const fn cpu(&self) -> &'static Cpu {
        self.cpu
    }

    /// Current options.
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Sets an option by name.
    ///
    /// # Errors
    ///
    /// See [`Options::set`].
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), Error> {
        self.options.set(name, value)
    }

    /// Decodes the instruction at the start of `memory`, located at
    /// `address`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NoMemory`] when `memory` ends mid-instruction
    /// and [`ErrorKind::UnknownInstruction`] when no page of the current CPU
    /// holds the opcode.
    pub fn decode(
        &self,
        memory: &[u8],
        address: u16,
        symbols: &dyn SymbolTable,
    ) -> Result<DecodedInsn, Error> {
        let mut reader = InsnReader::new(memory);
        let first = reader.read_byte()?;
        let (prefix, opcode) = if self.cpu.is_prefix(first) {
            (Some(first), reader.read_byte()?)
        } else {
            (None, first)
        };

        let Some((page, entry)) = self.cpu.search_opcode(prefix, opcode) else {
            return Err(Error::at(
                ErrorKind::UnknownInstruction,
                hex_bytes(reader.consumed()),
            ));
        };

        let base = page_base(address);
        let fmt = Formatter::new(self.options, symbols);
        let mut operands = Vec::with_capacity(2);
        for mode in [entry.mode1, entry.mode2] {
            if let Some(text) = render_operand(mode, opcode, base, &mut reader, &fmt)? {
                operands.push(text);
            }
        }

        log::trace!("{address:04X}: {} {}", entry.name, operands.join(", "));
        Ok(DecodedInsn {
            address,
            bytes: reader.consumed().to_vec(),
            mnemonic: entry.name,
            operands: operands.join(", "),
        })
    }
}

fn render_operand(
    mode: AddrMode,
    opcode: u8,
    base: u16,
    reader: &mut InsnReader<'_>,
    fmt: &Formatter<'_>,
) -> Result<Option<String>, Error> {
    let text = match mode {
        AddrMode::None => return Ok(None),
        AddrMode::Regn | AddrMode::Reg1 => fmt.register(opcode & mode.embedded_mask()),
        AddrMode::Ioad => fmt.decimal(opcode & mode.embedded_mask()),
        AddrMode::Imm8 => fmt.hex8(reader.read_byte()?),
        AddrMode::Addr | AddrMode::Long => fmt.hex16(reader.read_u16()?),
        AddrMode::Page | AddrMode::Shrt => {
            let low = reader.read_byte()?;
            fmt.hex16((base & 0xFF00) | u16::from(low))
        }
    };
    Ok(Some(text))
}

/// Address whose page a short branch at `address` stays on: the byte after
/// the opcode byte, prefixed or not.
#[must_use]
pub const fn page_base(address: u16) -> u16 {
    address.wrapping_add(2)
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
