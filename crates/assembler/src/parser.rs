//! Assembly source line parser for instructions, labels, and directives.
//!
//! Lines have the shape `[label:] [mnemonic [op1 [, op2]]] [; comment]` or
//! `[label:] .directive args`. Operand text is classified here into a
//! register or a value; widths and ranges are checked by the encoder once
//! the table entry is known.

use std::fmt;

use cdp1802_core::{AddrMode, Error, ErrorKind, Options};

/// Most operands any table entry declares.
const MAX_OPERANDS: usize = 2;

/// A numeric literal or a symbol reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Literal value, wider than 16 bits so overflow can be reported.
    Number(u32),
    /// Symbol resolved through the symbol table at encode time.
    Symbol(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Symbol(name) => f.write_str(name),
        }
    }
}

/// Parsed operand forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `Rn` register syntax, only recognised with `use-register` on.
    Register(u32),
    /// Any other operand.
    Value(Value),
}

impl Operand {
    /// Addressing mode offered to name resolution.
    #[must_use]
    pub const fn mode(&self) -> AddrMode {
        match self {
            Self::Register(_) => AddrMode::Regn,
            Self::Value(_) => AddrMode::Addr,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(n) => write!(f, "R{n}"),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}

/// A parsed instruction with its operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstruction {
    /// Mnemonic, upper-cased.
    pub mnemonic: String,
    /// Zero to two operands in source order.
    pub operands: Vec<Operand>,
}

impl ParsedInstruction {
    /// Operand modes for the two table slots, `None` where absent.
    #[must_use]
    pub fn modes(&self) -> (AddrMode, AddrMode) {
        let mode = |i: usize| self.operands.get(i).map_or(AddrMode::None, Operand::mode);
        (mode(0), mode(1))
    }
}

/// A parsed assembler directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `.org value` - set the assembly address.
    Org(Value),
    /// `.byte v[, v...]` - emit literal bytes.
    Byte(Vec<Value>),
    /// `.cpu name` - select the CPU variant.
    Cpu(String),
    /// `.option name value` - set an option.
    Option {
        /// Option name.
        name: String,
        /// Textual value.
        value: String,
    },
}

/// Content of a line after its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineBody {
    /// Nothing but a label or comment.
    Blank,
    /// Directive line.
    Directive(Directive),
    /// Instruction line.
    Instruction(ParsedInstruction),
}

/// A single parsed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Label defined on this line.
    pub label: Option<String>,
    /// The rest of the line.
    pub body: LineBody,
}

/// Parse failure on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Malformed instruction or operand.
    Operand(Error),
    /// Unknown directive name.
    UnknownDirective(String),
    /// Directive given the wrong arguments.
    DirectiveArguments(String),
}

impl From<Error> for ParseError {
    fn from(err: Error) -> Self {
        Self::Operand(err)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operand(err) => write!(f, "{err}"),
            Self::UnknownDirective(name) => write!(f, "unknown directive: .{name}"),
            Self::DirectiveArguments(name) => write!(f, "bad arguments for .{name}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses a source line.
///
/// `options` decides whether `Rn` is register syntax.
///
/// # Errors
///
/// Returns a [`ParseError`] for malformed operands, unknown directives, or
/// directives with the wrong arguments.
pub fn parse_line(line: &str, options: &Options) -> Result<ParsedLine, ParseError> {
    let trimmed = strip_comment(line).trim();
    let (label, rest) = match split_label(trimmed) {
        Some((label, rest)) => (Some(label), rest.trim()),
        None => (None, trimmed),
    };

    let body = if rest.is_empty() {
        LineBody::Blank
    } else if let Some(directive) = rest.strip_prefix('.') {
        LineBody::Directive(parse_directive(directive)?)
    } else {
        LineBody::Instruction(parse_instruction(rest, options.use_register)?)
    };

    Ok(ParsedLine { label, body })
}

fn strip_comment(line: &str) -> &str {
    line.find(';').map_or(line, |pos| &line[..pos])
}

fn split_label(text: &str) -> Option<(String, &str)> {
    let colon_pos = text.find(':')?;
    let label = text[..colon_pos].trim();
    is_symbol(label).then(|| (label.to_string(), &text[colon_pos + 1..]))
}

/// Returns true for `[A-Za-z_][A-Za-z0-9_]*`.
#[must_use]
pub fn is_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn split_word(text: &str) -> (&str, &str) {
    text.find(char::is_whitespace)
        .map_or((text, ""), |pos| (&text[..pos], text[pos..].trim()))
}

fn parse_directive(text: &str) -> Result<Directive, ParseError> {
    let (name, args) = split_word(text);
    let lower = name.to_ascii_lowercase();
    let bad_args = || ParseError::DirectiveArguments(lower.clone());

    let directive = match lower.as_str() {
        "org" => {
            if args.is_empty() {
                return Err(bad_args());
            }
            Directive::Org(parse_value(args)?)
        }
        "byte" => {
            if args.is_empty() {
                return Err(bad_args());
            }
            let values = args
                .split(',')
                .map(|arg| parse_value(arg.trim()))
                .collect::<Result<Vec<_>, _>>()?;
            Directive::Byte(values)
        }
        "cpu" => {
            let (cpu, extra) = split_word(args);
            if cpu.is_empty() || !extra.is_empty() {
                return Err(bad_args());
            }
            Directive::Cpu(cpu.to_string())
        }
        "option" => {
            let (name, value) = split_word(args);
            if name.is_empty() || value.is_empty() || value.contains(char::is_whitespace) {
                return Err(bad_args());
            }
            Directive::Option {
                name: name.to_string(),
                value: value.to_string(),
            }
        }
        _ => return Err(ParseError::UnknownDirective(name.to_string())),
    };

    Ok(directive)
}

/// Parses `mnemonic [op1 [, op2]]`.
///
/// # Errors
///
/// Returns [`ErrorKind::GarbageAtEnd`] for more than two operands or text
/// trailing an operand, and the operand errors of [`parse_operand`].
pub fn parse_instruction(text: &str, use_register: bool) -> Result<ParsedInstruction, Error> {
    let (mnemonic, rest) = split_word(text.trim());
    if !is_symbol(mnemonic) {
        return Err(Error::at(ErrorKind::UnknownInstruction, mnemonic));
    }

    let mut operands = Vec::with_capacity(MAX_OPERANDS);
    if !rest.is_empty() {
        for (i, part) in rest.split(',').enumerate() {
            let part = part.trim();
            if i == MAX_OPERANDS {
                return Err(Error::at(ErrorKind::GarbageAtEnd, part));
            }
            operands.push(parse_operand(part, use_register)?);
        }
    }

    Ok(ParsedInstruction {
        mnemonic: mnemonic.to_ascii_uppercase(),
        operands,
    })
}

/// Parses a single operand.
///
/// # Errors
///
/// Returns [`ErrorKind::GarbageAtEnd`] when whitespace splits the operand,
/// [`ErrorKind::IllegalRegister`] for an `Rn` number too large to hold, and
/// the errors of [`parse_value`].
pub fn parse_operand(text: &str, use_register: bool) -> Result<Operand, Error> {
    let (head, tail) = split_word(text);
    if !tail.is_empty() {
        return Err(Error::at(ErrorKind::GarbageAtEnd, tail));
    }

    if use_register {
        if let Some(digits) = head.strip_prefix(['R', 'r']) {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                let reg = digits
                    .parse::<u32>()
                    .map_err(|_| Error::at(ErrorKind::IllegalRegister, head))?;
                return Ok(Operand::Register(reg));
            }
        }
    }

    parse_value(head).map(Operand::Value)
}

/// Parses a numeral or symbol.
///
/// Numerals are decimal, `#hex`, `$hex`, `0xhex`, `%binary` or `0bbinary`.
///
/// # Errors
///
/// Returns [`ErrorKind::NotANumber`] for malformed text and
/// [`ErrorKind::OverflowRange`] for numerals wider than 32 bits.
pub fn parse_value(text: &str) -> Result<Value, Error> {
    let text = text.trim();
    let radix_digits = text
        .strip_prefix('#')
        .or_else(|| text.strip_prefix('$'))
        .or_else(|| text.strip_prefix("0x"))
        .or_else(|| text.strip_prefix("0X"))
        .map(|digits| (16, digits))
        .or_else(|| {
            text.strip_prefix('%')
                .or_else(|| text.strip_prefix("0b"))
                .or_else(|| text.strip_prefix("0B"))
                .map(|digits| (2, digits))
        });

    if let Some((radix, digits)) = radix_digits {
        return parse_radix(text, digits, radix).map(Value::Number);
    }
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        return parse_radix(text, text, 10).map(Value::Number);
    }
    if is_symbol(text) {
        return Ok(Value::Symbol(text.to_string()));
    }
    Err(Error::at(ErrorKind::NotANumber, text))
}

fn parse_radix(text: &str, digits: &str, radix: u32) -> Result<u32, Error> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(Error::at(ErrorKind::NotANumber, text));
    }
    u32::from_str_radix(digits, radix).map_err(|_| Error::at(ErrorKind::OverflowRange, text))
}
