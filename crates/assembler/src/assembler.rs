//! Top-level assembler pipeline.
//!
//! 1. **Pass 1**: parse each line under the options in force, apply `.cpu`
//!    and `.option` as they appear, size instructions from their table
//!    entries and define labels.
//! 2. **Pass 2**: replay the directives from the initial state and encode
//!    every instruction at its pass-1 address.
//!
//! The main entry point is [`assemble`], which takes source text and
//! returns a flat binary plus a listing.

use std::fmt;

use cdp1802_core::{Error, ErrorKind};

use crate::encoder::{resolve_value, Assembler};
use crate::parser::{
    parse_line, Directive, LineBody, Operand, ParseError, ParsedInstruction, ParsedLine, Value,
};
use crate::symbols::Symbols;

/// One past the highest address.
const ADDRESS_LIMIT: u32 = 0x1_0000;

/// Assembly error with the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleError {
    /// Kind of error.
    pub kind: AssembleErrorKind,
    /// 1-indexed source line.
    pub line: usize,
}

/// Classification of assembly errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembleErrorKind {
    /// Line could not be parsed.
    Parse(ParseError),
    /// Instruction, directive value, CPU or option error.
    Core(Error),
    /// Label defined twice.
    DuplicateLabel {
        /// The label name.
        name: String,
        /// Line of the first definition.
        first_definition: usize,
    },
    /// Output ran past `0xFFFF`.
    AddressOverflow {
        /// The address that would result.
        address: u32,
    },
}

impl AssembleError {
    const fn new(kind: AssembleErrorKind, line: usize) -> Self {
        Self { kind, line }
    }

    const fn core(err: Error, line: usize) -> Self {
        Self::new(AssembleErrorKind::Core(err), line)
    }

    /// Shared error kind, when the failure has one.
    #[must_use]
    pub const fn error_kind(&self) -> Option<ErrorKind> {
        match &self.kind {
            AssembleErrorKind::Core(err) | AssembleErrorKind::Parse(ParseError::Operand(err)) => {
                Some(err.kind)
            }
            _ => None,
        }
    }
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            AssembleErrorKind::Parse(e) => write!(f, "{e}"),
            AssembleErrorKind::Core(e) => write!(f, "{e}"),
            AssembleErrorKind::DuplicateLabel {
                name,
                first_definition,
            } => write!(
                f,
                "duplicate label '{name}' (first defined at line {first_definition})"
            ),
            AssembleErrorKind::AddressOverflow { address } => write!(
                f,
                "address overflow: 0x{address:05X} exceeds 16-bit address space"
            ),
        }
    }
}

impl std::error::Error for AssembleError {}

/// An entry in the address-to-source listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Address of this entry.
    pub address: u16,
    /// Bytes at this address.
    pub bytes: Vec<u8>,
    /// Source line text.
    pub source: String,
}

/// Result of assembly.
#[derive(Debug, Clone)]
pub struct AssembleResult {
    /// Address of the first byte of `binary`.
    pub origin: u16,
    /// Flat image from the lowest to the highest emitted address; gaps are
    /// zero-filled.
    pub binary: Vec<u8>,
    /// Every line that emitted bytes, in source order.
    pub listing: Vec<ListingEntry>,
    /// Labels defined in pass 1.
    pub symbols: Symbols,
}

/// A line with its pass-1 address.
struct AddressedLine<'a> {
    number: usize,
    text: &'a str,
    address: u16,
    parsed: ParsedLine,
}

/// Assembles source text.
///
/// `asm` supplies the initial CPU and options; `.cpu` and `.option` lines
/// change it, and it is left in its final state.
///
/// # Errors
///
/// Returns the first [`AssembleError`] in source order.
pub fn assemble(source: &str, asm: &mut Assembler) -> Result<AssembleResult, AssembleError> {
    let initial = asm.clone();
    let mut symbols = Symbols::new();
    let lines = assign_addresses(source, asm, &mut symbols)?;
    log::debug!("pass 1: {} lines, {} symbols", lines.len(), symbols.len());

    *asm = initial;
    let listing = encode_pass2(&lines, asm, &mut symbols)?;
    let (origin, binary) = flatten(&listing);
    log::debug!("pass 2: {} bytes from {origin:04X}, {} listing rows", binary.len(), listing.len());

    Ok(AssembleResult {
        origin,
        binary,
        listing,
        symbols,
    })
}

fn assign_addresses<'a>(
    source: &'a str,
    asm: &mut Assembler,
    symbols: &mut Symbols,
) -> Result<Vec<AddressedLine<'a>>, AssembleError> {
    let mut lines = Vec::new();
    let mut pc: u32 = 0;

    for (i, text) in source.lines().enumerate() {
        let number = i + 1;
        let parsed = parse_line(text, asm.options())
            .map_err(|e| AssembleError::new(AssembleErrorKind::Parse(e), number))?;

        let size = match &parsed.body {
            LineBody::Blank => 0,
            LineBody::Directive(Directive::Org(value)) => {
                pc = resolve_value(value, symbols, None)
                    .map_err(|e| AssembleError::core(e, number))?;
                0
            }
            LineBody::Directive(Directive::Byte(values)) => values.len(),
            LineBody::Directive(directive) => {
                apply_directive(directive, asm, number)?;
                0
            }
            LineBody::Instruction(insn) => asm
                .instruction_length(insn)
                .map(usize::from)
                .map_err(|e| AssembleError::core(e, number))?,
        };

        let address = u16::try_from(pc).map_err(|_| {
            AssembleError::new(AssembleErrorKind::AddressOverflow { address: pc }, number)
        })?;
        if let Some(label) = &parsed.label {
            symbols.define(label, address, number).map_err(|first| {
                AssembleError::new(
                    AssembleErrorKind::DuplicateLabel {
                        name: label.clone(),
                        first_definition: first.defined_at,
                    },
                    number,
                )
            })?;
        }

        pc += u32::try_from(size).unwrap_or(ADDRESS_LIMIT);
        if pc > ADDRESS_LIMIT {
            return Err(AssembleError::new(
                AssembleErrorKind::AddressOverflow { address: pc },
                number,
            ));
        }

        lines.push(AddressedLine {
            number,
            text,
            address,
            parsed,
        });
    }

    Ok(lines)
}

fn apply_directive(
    directive: &Directive,
    asm: &mut Assembler,
    line: usize,
) -> Result<(), AssembleError> {
    match directive {
        Directive::Cpu(name) => {
            if !asm.set_cpu(name) {
                return Err(AssembleError::core(
                    Error::at(ErrorKind::UnsupportedCpu, name.as_str()),
                    line,
                ));
            }
        }
        Directive::Option { name, value } => asm
            .set_option(name, value)
            .map_err(|e| AssembleError::core(e, line))?,
        Directive::Org(_) | Directive::Byte(_) => {}
    }
    Ok(())
}

fn encode_pass2(
    lines: &[AddressedLine<'_>],
    asm: &mut Assembler,
    symbols: &mut Symbols,
) -> Result<Vec<ListingEntry>, AssembleError> {
    let mut listing = Vec::new();

    for line in lines {
        let bytes = match &line.parsed.body {
            LineBody::Blank => continue,
            LineBody::Directive(Directive::Byte(values)) => values
                .iter()
                .map(|value| {
                    let byte = resolve_value(value, symbols, None)?;
                    u8::try_from(byte)
                        .map_err(|_| Error::at(ErrorKind::OverflowRange, value.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| AssembleError::core(e, line.number))?,
            LineBody::Directive(directive) => {
                apply_directive(directive, asm, line.number)?;
                continue;
            }
            LineBody::Instruction(insn) => {
                symbols.set_origin(line.address);
                require_defined(insn, symbols)
                    .and_then(|()| asm.encode_instruction(insn, symbols))
                    .map_err(|e| AssembleError::core(e, line.number))?
            }
        };

        listing.push(ListingEntry {
            address: line.address,
            bytes,
            source: line.text.trim_end().to_string(),
        });
    }

    Ok(listing)
}

/// Pass 1 has bound every label, so an unbound symbol is an error here.
fn require_defined(insn: &ParsedInstruction, symbols: &Symbols) -> Result<(), Error> {
    let undefined = insn.operands.iter().find_map(|operand| match operand {
        Operand::Value(Value::Symbol(name)) if symbols.get(name).is_none() => Some(name),
        _ => None,
    });
    match undefined {
        Some(name) => Err(Error::at(ErrorKind::UndefinedSymbol, name.as_str())),
        None => Ok(()),
    }
}

fn flatten(listing: &[ListingEntry]) -> (u16, Vec<u8>) {
    let Some(origin) = listing.iter().map(|entry| entry.address).min() else {
        return (0, Vec::new());
    };
    let end = listing
        .iter()
        .map(|entry| usize::from(entry.address) + entry.bytes.len())
        .max()
        .unwrap_or_default();

    let base = usize::from(origin);
    let mut binary = vec![0u8; end - base];
    for entry in listing {
        let start = usize::from(entry.address) - base;
        binary[start..start + entry.bytes.len()].copy_from_slice(&entry.bytes);
    }
    (origin, binary)
}
