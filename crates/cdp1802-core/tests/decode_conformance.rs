//! Decode conformance over the full opcode space of every CPU variant.

use cdp1802_core::{
    disassemble, Cpu, CpuId, Disassembler, ErrorKind, NoSymbols, SymbolTable, CPUS, PREFIX_68,
};
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use log as _;
use thiserror as _;

use std::collections::HashMap;

struct Labels {
    names: HashMap<u16, String>,
}

impl Labels {
    fn new(pairs: &[(u16, &str)]) -> Self {
        Self {
            names: pairs.iter().map(|&(v, n)| (v, n.to_string())).collect(),
        }
    }
}

impl SymbolTable for Labels {
    fn lookup_value(&self, value: u16) -> Option<&str> {
        self.names.get(&value).map(String::as_str)
    }

    fn lookup_name(&self, name: &str) -> Option<u16> {
        self.names
            .iter()
            .find_map(|(v, n)| (n == name).then_some(*v))
    }

    fn intern(&mut self, value: u16, name: &str) {
        self.names.insert(value, name.to_string());
    }

    fn current_origin(&self) -> u16 {
        0
    }
}

#[rstest]
#[case(CpuId::Cdp1802, &[0x68, 0x83, 0x84, 0x85], Err(ErrorKind::UnknownInstruction))]
#[case(CpuId::Cdp1804, &[0x68, 0x83, 0x84, 0x85], Ok("SCAL 3, #8485"))]
#[case(CpuId::Cdp1804, &[0x68, 0x0F], Err(ErrorKind::UnknownInstruction))]
#[case(CpuId::Cdp1804, &[0x68, 0x2A, 0x12, 0x34], Err(ErrorKind::UnknownInstruction))]
#[case(CpuId::Cdp1804A, &[0x68, 0x2A, 0x12, 0x34], Ok("DBNZ 10, #1234"))]
#[case(CpuId::Cdp1804A, &[0x68, 0x74, 0x55], Ok("DADC"))]
#[case(CpuId::Cdp1804, &[0x68, 0xC5, 0xBE, 0xEF], Ok("RLDI 5, #BEEF"))]
#[case(CpuId::Cdp1802, &[0x7C, 0x01], Ok("ADCI #01"))]
fn decodes_reference_bytes(
    #[case] id: CpuId,
    #[case] memory: &[u8],
    #[case] expected: Result<&str, ErrorKind>,
) {
    let dis = Disassembler::new(id);
    let got = dis
        .decode(memory, 0xABCD, &NoSymbols)
        .map(|insn| insn.text())
        .map_err(|e| e.kind);
    assert_eq!(got, expected.map(str::to_string));
}

#[test]
fn every_unprefixed_byte_decodes_or_is_unknown() {
    for cpu in CPUS {
        let dis = Disassembler::new(cpu.id());
        for byte in (0..=u8::MAX).filter(|&b| !cpu.is_prefix(b)) {
            let memory = [byte, 0x00, 0x00, 0x00];
            match dis.decode(&memory, 0x1000, &NoSymbols) {
                Ok(insn) => {
                    let (page, entry) = cpu.search_opcode(None, byte).expect("entry for opcode");
                    assert_eq!(insn.bytes.len(), usize::from(page.insn_length(entry)));
                    assert_eq!(insn.mnemonic, entry.name);
                }
                Err(err) => assert_eq!(err.kind, ErrorKind::UnknownInstruction),
            }
        }
    }
}

#[test]
fn cdp1802_leaves_exactly_the_prefix_byte_undefined() {
    let dis = Disassembler::new(CpuId::Cdp1802);
    let unknown: Vec<u8> = (0..=u8::MAX)
        .filter(|&byte| dis.decode(&[byte, 0, 0], 0, &NoSymbols).is_err())
        .collect();
    assert_eq!(unknown, [PREFIX_68]);
}

#[test]
fn prefixed_lengths_include_the_prefix() {
    let cpu = Cpu::get(CpuId::Cdp1804A);
    let dis = Disassembler::new(cpu.id());
    for opcode in 0..=u8::MAX {
        let memory = [PREFIX_68, opcode, 0x00, 0x00];
        if let Ok(insn) = dis.decode(&memory, 0, &NoSymbols) {
            let (page, entry) = cpu
                .search_opcode(Some(PREFIX_68), opcode)
                .expect("prefixed entry");
            assert_eq!(page.prefix(), Some(PREFIX_68));
            assert_eq!(insn.bytes.len(), usize::from(page.insn_length(entry)));
            assert!(insn.bytes.len() >= 2);
        }
    }
}

#[test]
fn symbols_replace_addresses_and_immediates() {
    let labels = Labels::new(&[(0x1234, "START"), (0x2A, "ANSWER")]);
    let dis = Disassembler::new(CpuId::Cdp1802);
    let insn = dis.decode(&[0xC0, 0x12, 0x34], 0, &labels).expect("LBR");
    assert_eq!(insn.text(), "LBR START");
    let insn = dis.decode(&[0xF8, 0x2A], 0, &labels).expect("LDI");
    assert_eq!(insn.text(), "LDI ANSWER");
    assert_eq!(labels.lookup_name("START"), Some(0x1234));
}

#[test]
fn lower_case_hex_option() {
    let mut dis = Disassembler::new(CpuId::Cdp1802);
    dis.set_option("upper-hex", "off").expect("option");
    let insn = dis.decode(&[0xC0, 0xAB, 0xCD], 0, &NoSymbols).expect("LBR");
    assert_eq!(insn.text(), "LBR #abcd");
}

#[test]
fn listing_covers_a_small_program() {
    let dis = Disassembler::new(CpuId::Cdp1802);
    let program = [0xF8, 0x00, 0xA5, 0x30, 0x00, 0x68];
    let rows = disassemble(&dis, &program, 0x0200, 16, &NoSymbols);
    let text: Vec<_> = rows
        .iter()
        .map(|row| format!("{} {}", row.mnemonic, row.operands))
        .collect();
    assert_eq!(text, ["LDI #00", "PLO 5", "BR #0200", "DB #68"]);
    assert!(rows[3].is_illegal);
}

proptest! {
    #[test]
    fn decode_never_reports_a_table_defect(
        id in prop_oneof![Just(CpuId::Cdp1802), Just(CpuId::Cdp1804), Just(CpuId::Cdp1804A)],
        memory in proptest::collection::vec(any::<u8>(), 0..5),
        address in any::<u16>(),
    ) {
        let dis = Disassembler::new(id);
        match dis.decode(&memory, address, &NoSymbols) {
            Ok(insn) => {
                prop_assert!(!insn.bytes.is_empty() && insn.bytes.len() <= 4);
                prop_assert_eq!(&memory[..insn.bytes.len()], insn.bytes.as_slice());
                prop_assert_eq!(insn.address, address);
            }
            Err(err) => prop_assert!(matches!(
                err.kind,
                ErrorKind::NoMemory | ErrorKind::UnknownInstruction
            )),
        }
    }

    #[test]
    fn short_branch_targets_stay_on_next_page(address in any::<u16>(), low in any::<u8>()) {
        let dis = Disassembler::new(CpuId::Cdp1802);
        let insn = dis.decode(&[0x30, low], address, &NoSymbols).expect("BR");
        let next = address.wrapping_add(2);
        let expected = format!("#{:04X}", (next & 0xFF00) | u16::from(low));
        prop_assert_eq!(insn.operands, expected);
    }
}
