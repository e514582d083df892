//! Mnemonic resolution against the CPU's prefix pages.

use cdp1802_core::{accept_mode, AddrMode, Cpu, Entry, Error, ErrorKind, Page};

/// Lookup result for a parsed mnemonic.
pub type MnemonicResolution = (&'static Page, &'static Entry);

/// Resolves a mnemonic and its operand modes to a table entry.
///
/// Lookup is case-insensitive. Pages are searched in CPU order and the
/// first entry whose declared modes accept `modes` wins.
///
/// # Errors
///
/// Returns [`ErrorKind::UnknownInstruction`] when no page defines the name
/// and [`ErrorKind::IllegalOperand`] when it is defined but no entry takes
/// operands of the given shape.
pub fn resolve_mnemonic(
    cpu: &Cpu,
    name: &str,
    modes: (AddrMode, AddrMode),
) -> Result<MnemonicResolution, Error> {
    let upper = name.to_ascii_uppercase();
    let mut known = false;
    for (page, entry) in cpu.search_name(&upper) {
        known = true;
        if accept_mode(modes.0, entry.mode1) && accept_mode(modes.1, entry.mode2) {
            log::trace!("{} {upper} {modes:?} -> {:02X}", cpu.name(), entry.opcode);
            return Ok((page, entry));
        }
    }

    let kind = if known {
        ErrorKind::IllegalOperand
    } else {
        ErrorKind::UnknownInstruction
    };
    Err(Error::at(kind, name))
}

/// Every distinct mnemonic the CPU accepts, sorted.
#[must_use]
pub fn mnemonics(cpu: &Cpu) -> Vec<&'static str> {
    let mut names: Vec<_> = cpu
        .pages()
        .iter()
        .flat_map(|page| page.entries().iter().map(|entry| entry.name))
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}
