//! CPU variants and the ordered prefix pages each one searches.

use std::fmt;

use crate::table::{Entry, Page, PAGE_CDP1802, PAGE_CDP1804, PAGE_CDP1804A};

/// Supported CPU variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CpuId {
    /// RCA CDP1802.
    Cdp1802,
    /// RCA CDP1804, adds the `0x68` extended page.
    Cdp1804,
    /// RCA CDP1804A, extends the CDP1804 page further.
    Cdp1804A,
}

impl CpuId {
    /// Canonical display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Cdp1802 => "CDP1802",
            Self::Cdp1804 => "CDP1804",
            Self::Cdp1804A => "CDP1804A",
        }
    }
}

impl fmt::Display for CpuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A CPU variant with the pages it searches, most specific first.
#[derive(Debug)]
pub struct Cpu {
    id: CpuId,
    pages: &'static [&'static Page],
}

static CPU_CDP1802: Cpu = Cpu {
    id: CpuId::Cdp1802,
    pages: &[&PAGE_CDP1802],
};

static CPU_CDP1804: Cpu = Cpu {
    id: CpuId::Cdp1804,
    pages: &[&PAGE_CDP1804, &PAGE_CDP1802],
};

static CPU_CDP1804A: Cpu = Cpu {
    id: CpuId::Cdp1804A,
    pages: &[&PAGE_CDP1804A, &PAGE_CDP1804, &PAGE_CDP1802],
};

/// Every supported CPU in canonical listing order.
pub static CPUS: [&Cpu; 3] = [&CPU_CDP1802, &CPU_CDP1804, &CPU_CDP1804A];

const CPU_PREFIX: &str = "CDP";

impl Cpu {
    /// Looks up a CPU descriptor by id.
    #[must_use]
    pub fn get(id: CpuId) -> &'static Self {
        match id {
            CpuId::Cdp1802 => &CPU_CDP1802,
            CpuId::Cdp1804 => &CPU_CDP1804,
            CpuId::Cdp1804A => &CPU_CDP1804A,
        }
    }

    /// Finds a CPU by name.
    ///
    /// Matching is ASCII case-insensitive, and the `CDP` prefix is optional
    /// so `1804a` selects the CDP1804A.
    #[must_use]
    pub fn by_name(name: &str) -> Option<&'static Self> {
        let name = name.trim();
        let part = strip_prefix_ignore_case(name, CPU_PREFIX).unwrap_or(name);
        CPUS.iter().copied().find(|cpu| {
            let display = cpu.id.display_name();
            display.eq_ignore_ascii_case(name)
                || display[CPU_PREFIX.len()..].eq_ignore_ascii_case(part)
        })
    }

    /// Variant id.
    #[must_use]
    pub const fn id(&self) -> CpuId {
        self.id
    }

    /// Canonical display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.id.display_name()
    }

    /// Pages in search order.
    #[must_use]
    pub const fn pages(&self) -> &'static [&'static Page] {
        self.pages
    }

    /// Returns true when some page of this CPU requires `byte` as prefix.
    #[must_use]
    pub fn is_prefix(&self, byte: u8) -> bool {
        self.pages.iter().any(|page| page.prefix() == Some(byte))
    }

    /// Entries named exactly `name` across all pages, paired with their
    /// page, in search order.
    pub fn search_name<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (&'static Page, &'static Entry)> + 'a {
        self.pages
            .iter()
            .copied()
            .flat_map(move |page| page.search_name(name).map(move |entry| (page, entry)))
    }

    /// Resolves an opcode, after an optional `prefix`, to its entry.
    ///
    /// Only pages whose prefix requirement equals `prefix` are scanned, in
    /// page order; the first matching entry wins.
    #[must_use]
    pub fn search_opcode(
        &self,
        prefix: Option<u8>,
        opcode: u8,
    ) -> Option<(&'static Page, &'static Entry)> {
        let found = self
            .pages
            .iter()
            .copied()
            .filter(|page| page.prefix() == prefix)
            .find_map(|page| page.search_opcode(opcode).map(|entry| (page, entry)));
        log::trace!(
            "{}: opcode {prefix:02X?} {opcode:02X} -> {:?}",
            self.name(),
            found.map(|(_, entry)| entry.name)
        );
        found
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// Comma-separated list of supported CPU names.
#[must_use]
pub fn list_cpu() -> String {
    CPUS.iter()
        .map(|cpu| cpu.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{list_cpu, Cpu, CpuId};
    use crate::mode::AddrMode;
    use crate::table::{Entry, Page, PAGE_CDP1802, PAGE_CDP1804, PREFIX_68};

    static OVERRIDE_PAGE: Page = Page::new(
        Some(PREFIX_68),
        &[Entry {
            opcode: 0x80,
            mode1: AddrMode::Regn,
            mode2: AddrMode::Addr,
            name: "XCAL",
        }],
    );

    static OVERRIDE_CPU: Cpu = Cpu {
        id: CpuId::Cdp1804A,
        pages: &[&OVERRIDE_PAGE, &PAGE_CDP1804, &PAGE_CDP1802],
    };

    #[rstest]
    #[case("CDP1802", Some(CpuId::Cdp1802))]
    #[case("cdp1802", Some(CpuId::Cdp1802))]
    #[case("1802", Some(CpuId::Cdp1802))]
    #[case("1804", Some(CpuId::Cdp1804))]
    #[case("cdp1804a", Some(CpuId::Cdp1804A))]
    #[case("1804A", Some(CpuId::Cdp1804A))]
    #[case(" CDP1804 ", Some(CpuId::Cdp1804))]
    #[case("1805", None)]
    #[case("CDP", None)]
    #[case("", None)]
    #[case("6502", None)]
    fn cpu_names_resolve(#[case] name: &str, #[case] expected: Option<CpuId>) {
        assert_eq!(Cpu::by_name(name).map(Cpu::id), expected);
    }

    #[test]
    fn list_is_canonical() {
        assert_eq!(list_cpu(), "CDP1802, CDP1804, CDP1804A");
    }

    #[test]
    fn prefix_bytes_depend_on_variant() {
        assert!(!Cpu::get(CpuId::Cdp1802).is_prefix(PREFIX_68));
        assert!(Cpu::get(CpuId::Cdp1804).is_prefix(PREFIX_68));
        assert!(Cpu::get(CpuId::Cdp1804A).is_prefix(PREFIX_68));
        assert!(!Cpu::get(CpuId::Cdp1804A).is_prefix(0x00));
    }

    #[test]
    fn extended_names_only_on_extended_variants() {
        assert_eq!(Cpu::get(CpuId::Cdp1802).search_name("SCAL").count(), 0);
        assert_eq!(Cpu::get(CpuId::Cdp1804).search_name("SCAL").count(), 1);
        assert_eq!(Cpu::get(CpuId::Cdp1804).search_name("DBNZ").count(), 0);
        assert_eq!(Cpu::get(CpuId::Cdp1804A).search_name("DBNZ").count(), 1);
        assert_eq!(Cpu::get(CpuId::Cdp1804A).search_name("LDN").count(), 1);
    }

    #[test]
    fn prefixed_opcodes_search_only_prefixed_pages() {
        let cpu = Cpu::get(CpuId::Cdp1804A);
        let (page, entry) = cpu.search_opcode(Some(PREFIX_68), 0x74).expect("DADC");
        assert_eq!(entry.name, "DADC");
        assert_eq!(page.prefix(), Some(PREFIX_68));
        let (_, entry) = cpu.search_opcode(None, 0x74).expect("ADC");
        assert_eq!(entry.name, "ADC");
        let (_, entry) = cpu.search_opcode(Some(PREFIX_68), 0x83).expect("SCAL");
        assert_eq!(entry.name, "SCAL");
        assert!(cpu.search_opcode(Some(PREFIX_68), 0x0F).is_none());
        assert!(Cpu::get(CpuId::Cdp1804)
            .search_opcode(Some(PREFIX_68), 0x74)
            .is_none());
    }

    #[test]
    fn earlier_page_wins_at_shared_prefixed_opcode() {
        let (_, entry) = OVERRIDE_CPU
            .search_opcode(Some(PREFIX_68), 0x85)
            .expect("shadowed opcode");
        assert_eq!(entry.name, "XCAL");
        let (_, entry) = OVERRIDE_CPU
            .search_opcode(Some(PREFIX_68), 0x95)
            .expect("fall through to later page");
        assert_eq!(entry.name, "SRET");
        let names: Vec<_> = OVERRIDE_CPU.search_name("SCAL").map(|(_, e)| e.name).collect();
        assert_eq!(names, ["SCAL"]);
    }
}
