//! Instruction encoding.
//!
//! Resolves a parsed instruction to its table entry and emits the prefix,
//! the opcode with any embedded field, and the operand bytes.

use cdp1802_core::{page_base, AddrMode, Cpu, CpuId, Error, ErrorKind, Options, SymbolTable};

use crate::mnemonic::{resolve_mnemonic, MnemonicResolution};
use crate::parser::{parse_instruction, Operand, ParsedInstruction, Value};

/// Register assumed for an undefined symbol in a register slot.
const DEFAULT_REGISTER: u32 = 7;
/// I/O address assumed for an undefined symbol.
const DEFAULT_IO_ADDRESS: u32 = 1;
/// Highest I/O address.
const MAX_IO_ADDRESS: u32 = 7;
/// Highest register number.
const MAX_REGISTER: u32 = 15;

/// Sequential output buffer for one instruction.
#[derive(Debug, Default)]
struct ByteSink {
    bytes: Vec<u8>,
}

impl ByteSink {
    fn emit_byte(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    fn emit_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }
}

/// Table-driven assembler bound to one CPU variant.
#[derive(Debug, Clone)]
pub struct Assembler {
    cpu: &'static Cpu,
    options: Options,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(CpuId::Cdp1802)
    }
}

impl Assembler {
    /// Creates an assembler for `id` with default options.
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
                log::debug!("assembler cpu {} -> {}", self.cpu.name(), cpu.name());
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

    /// Parses instruction text with the current options.
    ///
    /// # Errors
    ///
    /// See [`parse_instruction`].
    pub fn parse(&self, text: &str) -> Result<ParsedInstruction, Error> {
        parse_instruction(text, self.options.use_register)
    }

    /// Resolves a parsed instruction to its page and entry.
    ///
    /// # Errors
    ///
    /// See [`resolve_mnemonic`].
    pub fn resolve(&self, insn: &ParsedInstruction) -> Result<MnemonicResolution, Error> {
        resolve_mnemonic(self.cpu, &insn.mnemonic, insn.modes())
    }

    /// Encoded length of an instruction, known without operand values.
    ///
    /// # Errors
    ///
    /// See [`resolve_mnemonic`].
    pub fn instruction_length(&self, insn: &ParsedInstruction) -> Result<u8, Error> {
        let (page, entry) = self.resolve(insn)?;
        Ok(page.insn_length(entry))
    }

    /// Parses and encodes one instruction located at
    /// `symbols.current_origin()`.
    ///
    /// # Errors
    ///
    /// Returns parse errors, the resolution errors of [`resolve_mnemonic`],
    /// and the operand errors of [`Self::encode_instruction`].
    pub fn encode(&self, text: &str, symbols: &dyn SymbolTable) -> Result<Vec<u8>, Error> {
        let insn = self.parse(text)?;
        self.encode_instruction(&insn, symbols)
    }

    /// Encodes a parsed instruction located at `symbols.current_origin()`.
    ///
    /// Nothing is emitted unless every operand encodes.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::IllegalRegister`] for a register outside 0-15, or 0
    ///   where the entry forbids it.
    /// - [`ErrorKind::OverflowRange`] for an I/O address outside 1-7 or an
    ///   address wider than 16 bits.
    /// - [`ErrorKind::OperandTooFar`] for a short branch leaving the page of
    ///   its operand byte.
    /// - [`ErrorKind::UndefinedSymbol`] for an undefined symbol in a 16-bit
    ///   operand.
    pub fn encode_instruction(
        &self,
        insn: &ParsedInstruction,
        symbols: &dyn SymbolTable,
    ) -> Result<Vec<u8>, Error> {
        let (page, entry) = self.resolve(insn)?;
        let length = page.insn_length(entry);
        let base = page_base(symbols.current_origin());

        let mut opcode = entry.opcode;
        let mut tail = ByteSink::default();
        let slots = [
            (entry.mode1, insn.operands.first()),
            (entry.mode2, insn.operands.get(1)),
        ];
        for (mode, operand) in slots {
            opcode |= encode_operand(mode, operand, base, symbols, &mut tail)?;
        }

        let mut out = ByteSink::default();
        if let Some(prefix) = page.prefix() {
            out.emit_byte(prefix);
        }
        out.emit_byte(opcode);
        out.bytes.extend(tail.bytes);
        debug_assert_eq!(out.bytes.len(), usize::from(length));
        Ok(out.bytes)
    }
}

/// Encodes one operand, returning bits to merge into the opcode.
#[allow(clippy::cast_possible_truncation)]
fn encode_operand(
    mode: AddrMode,
    operand: Option<&Operand>,
    base: u16,
    symbols: &dyn SymbolTable,
    sink: &mut ByteSink,
) -> Result<u8, Error> {
    let operand = match (mode, operand) {
        (AddrMode::None, None) => return Ok(0),
        (AddrMode::None, Some(op)) => {
            return Err(Error::at(ErrorKind::InternalError, op.to_string()));
        }
        (_, None) => return Err(Error::new(ErrorKind::InternalError)),
        (_, Some(op)) => op,
    };

    match mode {
        AddrMode::Regn | AddrMode::Reg1 => {
            let reg = match operand {
                Operand::Register(n) => *n,
                Operand::Value(value) => resolve_value(value, symbols, Some(DEFAULT_REGISTER))?,
            };
            if reg > MAX_REGISTER || (reg == 0 && mode.excludes_zero()) {
                return Err(Error::at(ErrorKind::IllegalRegister, operand.to_string()));
            }
            Ok(reg as u8)
        }
        AddrMode::Ioad => {
            let port = value_of(operand, symbols, Some(DEFAULT_IO_ADDRESS))?;
            if !(1..=MAX_IO_ADDRESS).contains(&port) {
                return Err(Error::at(ErrorKind::OverflowRange, operand.to_string()));
            }
            Ok(port as u8)
        }
        AddrMode::Imm8 => {
            let value = value_of(operand, symbols, Some(0))?;
            sink.emit_byte(value as u8);
            Ok(0)
        }
        AddrMode::Page | AddrMode::Shrt => {
            let target = address_of(operand, symbols, Some(u32::from(base)))?;
            if target & 0xFF00 != base & 0xFF00 {
                return Err(Error::at(ErrorKind::OperandTooFar, operand.to_string()));
            }
            sink.emit_byte(target as u8);
            Ok(0)
        }
        AddrMode::Addr | AddrMode::Long => {
            let target = address_of(operand, symbols, None)?;
            sink.emit_u16(target);
            Ok(0)
        }
        AddrMode::None => Err(Error::new(ErrorKind::InternalError)),
    }
}

fn value_of(
    operand: &Operand,
    symbols: &dyn SymbolTable,
    default: Option<u32>,
) -> Result<u32, Error> {
    match operand {
        Operand::Value(value) => resolve_value(value, symbols, default),
        Operand::Register(_) => Err(Error::at(ErrorKind::InternalError, operand.to_string())),
    }
}

fn address_of(
    operand: &Operand,
    symbols: &dyn SymbolTable,
    default: Option<u32>,
) -> Result<u16, Error> {
    let value = value_of(operand, symbols, default)?;
    u16::try_from(value).map_err(|_| Error::at(ErrorKind::OverflowRange, operand.to_string()))
}

/// Resolves a value, substituting `default` for an undefined symbol.
///
/// # Errors
///
/// Returns [`ErrorKind::UndefinedSymbol`] for an undefined symbol when no
/// default is given.
pub fn resolve_value(
    value: &Value,
    symbols: &dyn SymbolTable,
    default: Option<u32>,
) -> Result<u32, Error> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Symbol(name) => symbols
            .lookup_name(name)
            .map(u32::from)
            .or(default)
            .ok_or_else(|| Error::at(ErrorKind::UndefinedSymbol, name.as_str())),
    }
}
