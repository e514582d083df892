//! Symbol table contract consumed by the encoder and decoder.

/// Name/value lookups and the current assembly origin.
///
/// The encoder only reads through this trait; the assembler driver interns
/// labels during its first pass.
pub trait SymbolTable {
    /// Name bound to `value`, if any.
    fn lookup_value(&self, value: u16) -> Option<&str>;

    /// Value bound to `name`, if any.
    fn lookup_name(&self, name: &str) -> Option<u16>;

    /// Binds `name` to `value`.
    fn intern(&mut self, value: u16, name: &str);

    /// Address of the instruction currently being assembled.
    fn current_origin(&self) -> u16;
}

/// An always-empty symbol table at origin 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoSymbols;

impl SymbolTable for NoSymbols {
    fn lookup_value(&self, _value: u16) -> Option<&str> {
        None
    }

    fn lookup_name(&self, _name: &str) -> Option<u16> {
        None
    }

    fn intern(&mut self, _value: u16, _name: &str) {}

    fn current_origin(&self) -> u16 {
        0
    }
}
