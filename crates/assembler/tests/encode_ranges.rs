//! Operand range and page-relative properties of the encoder.

use cdp1802_asm::{Assembler, Symbols};
use cdp1802_core::{list_cpu, CpuId, ErrorKind, NoSymbols};
use log as _;
use proptest::prelude::*;
use rstest::rstest;

fn at(origin: u16) -> Symbols {
    let mut symbols = Symbols::new();
    symbols.set_origin(origin);
    symbols
}

fn encode(asm: &Assembler, text: &str, origin: u16) -> Result<Vec<u8>, ErrorKind> {
    asm.encode(text, &at(origin)).map_err(|e| e.kind)
}

#[rstest]
#[case("OUT 0", Err(ErrorKind::OverflowRange))]
#[case("OUT 3", Ok(vec![0x63]))]
#[case("OUT 7", Ok(vec![0x67]))]
#[case("INP 1", Ok(vec![0x69]))]
#[case("IRX", Ok(vec![0x60]))]
fn io_addresses(#[case] text: &str, #[case] expected: Result<Vec<u8>, ErrorKind>) {
    assert_eq!(encode(&Assembler::default(), text, 0), expected);
}

#[test]
fn ldn_register_syntax() {
    let mut asm = Assembler::default();
    asm.set_option("use-register", "on").expect("option");
    assert_eq!(asm.encode("LDN R5", &NoSymbols).expect("LDN"), [0x05]);
    assert_eq!(asm.encode("INC R5", &NoSymbols).expect("INC"), [0x15]);
}

#[test]
fn branch_to_label_on_same_and_other_page() {
    let asm = Assembler::default();
    let mut symbols = at(0x0410);
    symbols.define("same", 0x04F0, 1).expect("same");
    symbols.define("other", 0x0500, 2).expect("other");
    assert_eq!(asm.encode("BR same", &symbols).expect("same page"), [0x30, 0xF0]);
    assert_eq!(
        asm.encode("BR other", &symbols).map_err(|e| e.kind),
        Err(ErrorKind::OperandTooFar)
    );
}

#[test]
fn cdp1804a_exposes_every_generation() {
    let mut asm = Assembler::default();
    assert!(asm.set_cpu("cdp1804a"));
    assert_eq!(encode(&asm, "DBNZ 1, #0000", 0), Ok(vec![0x68, 0x21, 0x00, 0x00]));
    assert_eq!(encode(&asm, "RNX 2", 0), Ok(vec![0x68, 0xB2]));
    assert_eq!(encode(&asm, "GHI 2", 0), Ok(vec![0x92]));
    assert_eq!(asm.cpu().id(), CpuId::Cdp1804A);
    assert!(!asm.set_cpu("cdp1806"));
    assert_eq!(list_cpu(), "CDP1802, CDP1804, CDP1804A");
}

proptest! {
    #[test]
    fn page_branch_accepts_exactly_the_next_page(origin in 0u16..0xFFFE, low in any::<u8>()) {
        let asm = Assembler::default();
        let page = origin.wrapping_add(2) & 0xFF00;
        let target = page | u16::from(low);
        prop_assert_eq!(
            encode(&asm, &format!("B1 {target}"), origin),
            Ok(vec![0x34, low])
        );

        let elsewhere = target ^ 0x0100;
        prop_assert_eq!(
            encode(&asm, &format!("B1 {elsewhere}"), origin),
            Err(ErrorKind::OperandTooFar)
        );
    }

    #[test]
    fn prefixed_branch_stays_on_operand_page(origin in 0u16..0xFFFD, low in any::<u8>()) {
        let asm = Assembler::new(CpuId::Cdp1804);
        let target = (origin.wrapping_add(2) & 0xFF00) | u16::from(low);
        prop_assert_eq!(
            encode(&asm, &format!("BCI {target}"), origin),
            Ok(vec![0x68, 0x3E, low])
        );
    }

    #[test]
    fn reg1_rejects_zero(n in 0u32..32) {
        let result = encode(&Assembler::default(), &format!("LDN {n}"), 0);
        if (1..=15).contains(&n) {
            prop_assert_eq!(result, Ok(vec![u8::try_from(n).unwrap_or_default()]));
        } else {
            prop_assert_eq!(result, Err(ErrorKind::IllegalRegister));
        }
    }

    #[test]
    fn regn_accepts_all_sixteen(n in 0u32..32) {
        let mut asm = Assembler::default();
        asm.set_option("use-register", "on").expect("option");
        let result = encode(&asm, &format!("INC R{n}"), 0);
        if n <= 15 {
            prop_assert_eq!(result, Ok(vec![0x10 | u8::try_from(n).unwrap_or_default()]));
        } else {
            prop_assert_eq!(result, Err(ErrorKind::IllegalRegister));
        }
    }

    #[test]
    fn ioad_accepts_one_through_seven(n in 0u32..16) {
        let result = encode(&Assembler::default(), &format!("OUT {n}"), 0);
        if (1..=7).contains(&n) {
            prop_assert_eq!(result, Ok(vec![0x60 | u8::try_from(n).unwrap_or_default()]));
        } else {
            prop_assert_eq!(result, Err(ErrorKind::OverflowRange));
        }
    }

    #[test]
    fn immediates_truncate_to_eight_bits(value in 0u32..=0xFFFF) {
        let result = encode(&Assembler::default(), &format!("ADI {value}"), 0);
        prop_assert_eq!(result, Ok(vec![0xFC, value.to_le_bytes()[0]]));
    }
}
