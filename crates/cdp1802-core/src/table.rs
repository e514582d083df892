//! Opcode tables, prefix pages and the per-page name index.
//!
//! Each page keeps its entries in declaration order, which decides alias
//! priority on decode, plus a lazily built index of entry positions sorted
//! by mnemonic for binary search on assembly.

use std::sync::OnceLock;

use crate::mode::AddrMode as M;
use crate::mode::AddrMode;

/// Prefix byte that opens the CDP1804/CDP1804A extended opcode space.
pub const PREFIX_68: u8 = 0x68;

/// One row of an opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// Opcode with every embedded operand field cleared.
    pub opcode: u8,
    /// First operand shape.
    pub mode1: AddrMode,
    /// Second operand shape.
    pub mode2: AddrMode,
    /// Canonical upper-case mnemonic.
    pub name: &'static str,
}

impl Entry {
    const fn new(opcode: u8, name: &'static str, mode1: AddrMode, mode2: AddrMode) -> Self {
        Self {
            opcode,
            mode1,
            mode2,
            name,
        }
    }

    /// Bits of the opcode byte that carry embedded operands.
    #[must_use]
    pub const fn mask(&self) -> u8 {
        self.mode1.embedded_mask() | self.mode2.embedded_mask()
    }

    /// Returns true when `opcode` decodes to this entry.
    ///
    /// Embedded fields are masked off before comparing. Entries whose
    /// embedded field excludes 0 never match a zero field.
    #[must_use]
    pub const fn matches_opcode(&self, opcode: u8) -> bool {
        let mask = self.mask();
        if opcode & !mask != self.opcode {
            return false;
        }
        let zero_field = mask != 0 && opcode & mask == 0;
        !(zero_field && (self.mode1.excludes_zero() || self.mode2.excludes_zero()))
    }

    /// Number of operand bytes following the opcode byte.
    #[must_use]
    pub const fn operand_bytes(&self) -> u8 {
        self.mode1.operand_bytes() + self.mode2.operand_bytes()
    }
}

const fn e0(opcode: u8, name: &'static str) -> Entry {
    Entry::new(opcode, name, M::None, M::None)
}

const fn e1(opcode: u8, name: &'static str, mode1: AddrMode) -> Entry {
    Entry::new(opcode, name, mode1, M::None)
}

const fn e2(opcode: u8, name: &'static str, mode1: AddrMode, mode2: AddrMode) -> Entry {
    Entry::new(opcode, name, mode1, mode2)
}

/// Base CDP1802 instruction set.
pub const TABLE_CDP1802: &[Entry] = &[
    e0(0x00, "IDL"),
    e1(0x00, "LDN", M::Reg1),
    e1(0x10, "INC", M::Regn),
    e1(0x20, "DEC", M::Regn),
    e1(0x30, "BR", M::Shrt),
    e1(0x31, "BQ", M::Shrt),
    e1(0x32, "BZ", M::Shrt),
    e1(0x33, "BDF", M::Shrt),
    e1(0x33, "BPZ", M::Shrt),
    e1(0x33, "BGE", M::Shrt),
    e1(0x34, "B1", M::Page),
    e1(0x35, "B2", M::Page),
    e1(0x36, "B3", M::Page),
    e1(0x37, "B4", M::Page),
    e0(0x38, "SKP"),
    e0(0x38, "NBR"),
    e1(0x39, "BNQ", M::Shrt),
    e1(0x3A, "BNZ", M::Shrt),
    e1(0x3B, "BNF", M::Shrt),
    e1(0x3B, "BM", M::Shrt),
    e1(0x3B, "BL", M::Shrt),
    e1(0x3C, "BN1", M::Page),
    e1(0x3D, "BN2", M::Page),
    e1(0x3E, "BN3", M::Page),
    e1(0x3F, "BN4", M::Page),
    e1(0x40, "LDA", M::Regn),
    e1(0x50, "STR", M::Regn),
    e0(0x60, "IRX"),
    e1(0x60, "OUT", M::Ioad),
    e1(0x68, "INP", M::Ioad),
    e0(0x70, "RET"),
    e0(0x71, "DIS"),
    e0(0x72, "LDXA"),
    e0(0x73, "STXD"),
    e0(0x74, "ADC"),
    e0(0x75, "SDB"),
    e0(0x76, "SHRC"),
    e0(0x76, "RSHR"),
    e0(0x77, "SMB"),
    e0(0x78, "SAV"),
    e0(0x79, "MARK"),
    e0(0x7A, "REQ"),
    e0(0x7B, "SEQ"),
    e1(0x7C, "ADCI", M::Imm8),
    e1(0x7D, "SDBI", M::Imm8),
    e0(0x7E, "SHLC"),
    e0(0x7E, "RSHL"),
    e1(0x7F, "SMBI", M::Imm8),
    e1(0x80, "GLO", M::Regn),
    e1(0x90, "GHI", M::Regn),
    e1(0xA0, "PLO", M::Regn),
    e1(0xB0, "PHI", M::Regn),
    e1(0xC0, "LBR", M::Long),
    e1(0xC1, "LBQ", M::Long),
    e1(0xC2, "LBZ", M::Long),
    e1(0xC3, "LBDF", M::Long),
    e1(0xC3, "LBPZ", M::Long),
    e1(0xC3, "LBGE", M::Long),
    e0(0xC4, "NOP"),
    e0(0xC5, "LSNQ"),
    e0(0xC6, "LSNZ"),
    e0(0xC7, "LSNF"),
    e0(0xC8, "LSKP"),
    e0(0xC8, "NLBR"),
    e1(0xC9, "LBNQ", M::Long),
    e1(0xCA, "LBNZ", M::Long),
    e1(0xCB, "LBNF", M::Long),
    e1(0xCB, "LBM", M::Long),
    e1(0xCB, "LBL", M::Long),
    e0(0xCC, "LSIE"),
    e0(0xCD, "LSQ"),
    e0(0xCE, "LSZ"),
    e0(0xCF, "LSDF"),
    e1(0xD0, "SEP", M::Regn),
    e1(0xE0, "SEX", M::Regn),
    e0(0xF0, "LDX"),
    e0(0xF1, "OR"),
    e0(0xF2, "AND"),
    e0(0xF3, "XOR"),
    e0(0xF4, "ADD"),
    e0(0xF5, "SD"),
    e0(0xF6, "SHR"),
    e0(0xF7, "SM"),
    e1(0xF8, "LDI", M::Imm8),
    e1(0xF9, "ORI", M::Imm8),
    e1(0xFA, "ANI", M::Imm8),
    e1(0xFB, "XRI", M::Imm8),
    e1(0xFC, "ADI", M::Imm8),
    e1(0xFD, "SDI", M::Imm8),
    e0(0xFE, "SHL"),
    e1(0xFF, "SMI", M::Imm8),
];

/// CDP1804 additions reachable after the `0x68` prefix.
pub const TABLE_CDP1804: &[Entry] = &[
    e0(0x00, "STPC"),
    e0(0x01, "DTC"),
    e0(0x02, "SPM2"),
    e0(0x03, "SCM2"),
    e0(0x04, "SPM1"),
    e0(0x05, "SCM1"),
    e0(0x06, "LDC"),
    e0(0x07, "STM"),
    e0(0x08, "GEC"),
    e0(0x09, "ETQ"),
    e0(0x0A, "XIE"),
    e0(0x0B, "XID"),
    e0(0x0C, "CIE"),
    e0(0x0D, "CID"),
    e1(0x3E, "BCI", M::Page),
    e1(0x3F, "BXI", M::Page),
    e1(0x60, "RLXA", M::Regn),
    e2(0x80, "SCAL", M::Regn, M::Addr),
    e1(0x90, "SRET", M::Regn),
    e1(0xA0, "RSXA", M::Regn),
    e1(0xB0, "RNX", M::Regn),
    e2(0xC0, "RLDI", M::Regn, M::Addr),
];

/// CDP1804A additions reachable after the `0x68` prefix.
pub const TABLE_CDP1804A: &[Entry] = &[
    e2(0x20, "DBNZ", M::Regn, M::Addr),
    e0(0x74, "DADC"),
    e0(0x76, "DSAV"),
    e0(0x77, "DSMB"),
    e1(0x7C, "DACI", M::Imm8),
    e1(0x7F, "DSBI", M::Imm8),
    e0(0xF4, "DADD"),
    e0(0xF7, "DSM"),
    e1(0xFC, "DADI", M::Imm8),
    e1(0xFF, "DSMI", M::Imm8),
];

/// A set of entries reachable after an optional prefix byte.
#[derive(Debug)]
pub struct Page {
    prefix: Option<u8>,
    entries: &'static [Entry],
    index: OnceLock<Vec<usize>>,
}

impl Page {
    /// Creates a page over a static entry table.
    #[must_use]
    pub const fn new(prefix: Option<u8>, entries: &'static [Entry]) -> Self {
        Self {
            prefix,
            entries,
            index: OnceLock::new(),
        }
    }

    /// Prefix byte that must precede opcodes of this page.
    #[must_use]
    pub const fn prefix(&self) -> Option<u8> {
        self.prefix
    }

    /// Entries in declaration order.
    #[must_use]
    pub const fn entries(&self) -> &'static [Entry] {
        self.entries
    }

    /// Entry positions sorted by mnemonic.
    ///
    /// The sort is stable, so rows sharing a mnemonic keep table order.
    pub fn name_index(&self) -> &[usize] {
        self.index.get_or_init(|| {
            let entries = self.entries;
            let mut index: Vec<usize> = (0..entries.len()).collect();
            index.sort_by(|&a, &b| entries[a].name.cmp(entries[b].name));
            index
        })
    }

    /// Entries whose mnemonic is exactly `name`, in table order.
    pub fn search_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'static Entry> + 'a {
        let entries = self.entries;
        let index = self.name_index();
        let start = index.partition_point(|&i| entries[i].name < name);
        index[start..]
            .iter()
            .map(move |&i| &entries[i])
            .take_while(move |entry| entry.name == name)
    }

    /// First entry in table order that `opcode` decodes to.
    #[must_use]
    pub fn search_opcode(&self, opcode: u8) -> Option<&'static Entry> {
        let entries = self.entries;
        entries.iter().find(|entry| entry.matches_opcode(opcode))
    }

    /// Total encoded length of `entry` when reached through this page.
    #[must_use]
    pub const fn insn_length(&self, entry: &Entry) -> u8 {
        let opcode_bytes = match self.prefix {
            Some(_) => 2,
            None => 1,
        };
        opcode_bytes + entry.operand_bytes()
    }
}

/// Unprefixed CDP1802 page.
pub static PAGE_CDP1802: Page = Page::new(None, TABLE_CDP1802);
/// CDP1804 page under the `0x68` prefix.
pub static PAGE_CDP1804: Page = Page::new(Some(PREFIX_68), TABLE_CDP1804);
/// CDP1804A page under the `0x68` prefix.
pub static PAGE_CDP1804A: Page = Page::new(Some(PREFIX_68), TABLE_CDP1804A);
