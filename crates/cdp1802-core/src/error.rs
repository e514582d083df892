use std::fmt;

use thiserror::Error;

/// Stable error taxonomy shared by the assembler and disassembler.
///
/// Every kind is terminal for the one instruction that raised it; callers
/// decide whether to continue with the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum ErrorKind {
    /// Mnemonic or opcode not present in any page of the current CPU.
    #[error("unknown instruction")]
    UnknownInstruction = 0x01,
    /// Mnemonic is known but no entry accepts the operand shapes given.
    #[error("illegal operand")]
    IllegalOperand = 0x02,
    /// Register number outside the range allowed by the addressing mode.
    #[error("illegal register")]
    IllegalRegister = 0x03,
    /// Value outside the range allowed by the addressing mode.
    #[error("overflow range")]
    OverflowRange = 0x04,
    /// Page-relative branch target outside the page of the next instruction.
    #[error("operand too far")]
    OperandTooFar = 0x05,
    /// Symbol has no value in the symbol table.
    #[error("undefined symbol")]
    UndefinedSymbol = 0x06,
    /// Operand text is neither a number nor a symbol.
    #[error("not a number")]
    NotANumber = 0x07,
    /// Unexpected text after the last operand.
    #[error("garbage at end")]
    GarbageAtEnd = 0x08,
    /// Disassembly read past the end of the supplied memory.
    #[error("no memory")]
    NoMemory = 0x09,
    /// CPU name not recognised.
    #[error("unsupported cpu")]
    UnsupportedCpu = 0x0A,
    /// Option name not recognised.
    #[error("unknown option")]
    UnknownOption = 0x0B,
    /// Option value not a boolean, or a dependency is not satisfied.
    #[error("illegal option value")]
    IllegalOptionValue = 0x0C,
    /// Addressing mode reached a path with no handling; a table defect.
    #[error("internal error")]
    InternalError = 0x0D,
}

impl ErrorKind {
    /// Converts the kind to its stable numeric code.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Converts a stable numeric code back into a kind.
    #[must_use]
    pub const fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::UnknownInstruction),
            0x02 => Some(Self::IllegalOperand),
            0x03 => Some(Self::IllegalRegister),
            0x04 => Some(Self::OverflowRange),
            0x05 => Some(Self::OperandTooFar),
            0x06 => Some(Self::UndefinedSymbol),
            0x07 => Some(Self::NotANumber),
            0x08 => Some(Self::GarbageAtEnd),
            0x09 => Some(Self::NoMemory),
            0x0A => Some(Self::UnsupportedCpu),
            0x0B => Some(Self::UnknownOption),
            0x0C => Some(Self::IllegalOptionValue),
            0x0D => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Returns true for kinds that indicate a defect rather than bad input.
    #[must_use]
    pub const fn is_defect(self) -> bool {
        matches!(self, Self::InternalError)
    }
}

/// An error kind paired with the operand or field text that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Offending token, if one can be pointed at.
    pub token: Option<String>,
}

impl Error {
    /// Creates an error without a token.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self { kind, token: None }
    }

    /// Creates an error pointing at `token`.
    #[must_use]
    pub fn at(kind: ErrorKind, token: impl Into<String>) -> Self {
        Self {
            kind,
            token: Some(token.into()),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token {
            Some(token) => write!(f, "{}: {token}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {}
