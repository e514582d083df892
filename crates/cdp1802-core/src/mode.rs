//! Addressing modes and the operand/table compatibility rule.

/// Operand shapes an instruction entry can declare.
///
/// Register numbers and I/O addresses are embedded in the opcode byte;
/// every other operand follows the opcode as separate bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AddrMode {
    /// No operand.
    None,
    /// Register 0-15 in the low nibble.
    Regn,
    /// Register 1-15 in the low nibble.
    Reg1,
    /// 8-bit immediate byte.
    Imm8,
    /// Page-relative branch target with no long counterpart.
    Page,
    /// 16-bit absolute address.
    Addr,
    /// Page-relative branch target that pairs with a `Long` row.
    Shrt,
    /// 16-bit branch target that pairs with a `Shrt` row.
    Long,
    /// I/O address 1-7 in the low three bits.
    Ioad,
}

impl AddrMode {
    /// Bits of the opcode byte reserved for an embedded operand.
    #[must_use]
    pub const fn embedded_mask(self) -> u8 {
        match self {
            Self::Regn | Self::Reg1 => 0x0F,
            Self::Ioad => 0x07,
            _ => 0,
        }
    }

    /// Returns true when an embedded field value of 0 is not encodable.
    #[must_use]
    pub const fn excludes_zero(self) -> bool {
        matches!(self, Self::Reg1 | Self::Ioad)
    }

    /// Number of operand bytes that follow the opcode.
    #[must_use]
    pub const fn operand_bytes(self) -> u8 {
        match self {
            Self::Imm8 | Self::Page | Self::Shrt => 1,
            Self::Addr | Self::Long => 2,
            Self::None | Self::Regn | Self::Reg1 | Self::Ioad => 0,
        }
    }

    /// Returns true for the page-relative branch modes.
    #[must_use]
    pub const fn is_page_relative(self) -> bool {
        matches!(self, Self::Page | Self::Shrt)
    }
}

/// Decides whether an operand of mode `opr` may target a table entry
/// declaring mode `table`.
///
/// Range checks are left to the encoder: `Regn` operands may target `Reg1`
/// entries, and a plain value (`Addr`) may target any mode that takes one.
#[must_use]
pub const fn accept_mode(opr: AddrMode, table: AddrMode) -> bool {
    if opr as u8 == table as u8 {
        return true;
    }
    match opr {
        AddrMode::Regn => matches!(table, AddrMode::Reg1),
        AddrMode::Addr => matches!(
            table,
            AddrMode::Regn
                | AddrMode::Reg1
                | AddrMode::Imm8
                | AddrMode::Page
                | AddrMode::Ioad
                | AddrMode::Shrt
                | AddrMode::Long
        ),
        _ => false,
    }
}
