//! In-memory symbol table used by the two-pass driver.

use std::collections::{BTreeMap, HashMap};

use cdp1802_core::SymbolTable;

/// A symbol (label) with its assigned address and definition location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    /// The address assigned to this label.
    pub address: u16,
    /// Source line number where the label was defined, 0 when interned
    /// without one.
    pub defined_at: usize,
}

/// Symbol table mapping label names to their definitions.
///
/// Reverse lookups return the first name bound to an address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbols {
    by_name: HashMap<String, Symbol>,
    by_value: BTreeMap<u16, String>,
    origin: u16,
}

impl Symbols {
    /// Creates an empty table at origin 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a label at `address`.
    ///
    /// # Errors
    ///
    /// Returns the existing definition when `name` is already defined.
    pub fn define(&mut self, name: &str, address: u16, line: usize) -> Result<(), Symbol> {
        if let Some(existing) = self.by_name.get(name) {
            return Err(*existing);
        }
        self.insert(
            name,
            Symbol {
                address,
                defined_at: line,
            },
        );
        Ok(())
    }

    /// Looks up a symbol by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name)
    }

    /// Number of symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true when no symbol is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Sets the address reported by [`SymbolTable::current_origin`].
    pub const fn set_origin(&mut self, origin: u16) {
        self.origin = origin;
    }

    /// Symbols sorted by address, then name.
    #[must_use]
    pub fn sorted(&self) -> Vec<(&str, Symbol)> {
        let mut all: Vec<_> = self
            .by_name
            .iter()
            .map(|(name, symbol)| (name.as_str(), *symbol))
            .collect();
        all.sort_by(|a, b| a.1.address.cmp(&b.1.address).then(a.0.cmp(b.0)));
        all
    }

    fn insert(&mut self, name: &str, symbol: Symbol) {
        if let Some(old) = self.by_name.insert(name.to_string(), symbol) {
            if self.by_value.get(&old.address).is_some_and(|n| n == name) {
                self.by_value.remove(&old.address);
            }
        }
        self.by_value
            .entry(symbol.address)
            .or_insert_with(|| name.to_string());
    }
}

impl SymbolTable for Symbols {
    fn lookup_value(&self, value: u16) -> Option<&str> {
        self.by_value.get(&value).map(String::as_str)
    }

    fn lookup_name(&self, name: &str) -> Option<u16> {
        self.by_name.get(name).map(|symbol| symbol.address)
    }

    fn intern(&mut self, value: u16, name: &str) {
        self.insert(
            name,
            Symbol {
                address: value,
                defined_at: 0,
            },
        );
    }

    fn current_origin(&self) -> u16 {
        self.origin
    }
}
