//! Numeral and symbol rendering for disassembly.

use crate::config::Options;
use crate::symbols::SymbolTable;

/// Renders operand values with symbol substitution.
///
/// Register and I/O fields are decimal; immediates and addresses are hex
/// with the RCA `#` prefix.
#[derive(Clone, Copy)]
pub struct Formatter<'a> {
    options: Options,
    symbols: &'a dyn SymbolTable,
}

impl<'a> Formatter<'a> {
    /// Creates a formatter over `symbols`.
    #[must_use]
    pub const fn new(options: Options, symbols: &'a dyn SymbolTable) -> Self {
        Self { options, symbols }
    }

    /// Register field: `Rn` with register syntax, else symbol or decimal.
    #[must_use]
    pub fn register(&self, reg: u8) -> String {
        if self.options.use_register {
            return format!("R{reg}");
        }
        self.decimal(reg)
    }

    /// Small embedded field as symbol or decimal.
    #[must_use]
    pub fn decimal(&self, value: u8) -> String {
        self.symbol(u16::from(value)).unwrap_or_else(|| value.to_string())
    }

    /// Immediate byte as symbol or `#XX`.
    #[must_use]
    pub fn hex8(&self, value: u8) -> String {
        self.symbol(u16::from(value)).unwrap_or_else(|| self.byte(value))
    }

    /// Raw data byte as `#XX`, never substituted.
    #[must_use]
    pub fn byte(&self, value: u8) -> String {
        if self.options.uppercase_hex {
            format!("#{value:02X}")
        } else {
            format!("#{value:02x}")
        }
    }

    /// Address as symbol or `#XXXX`.
    #[must_use]
    pub fn hex16(&self, value: u16) -> String {
        self.symbol(value).unwrap_or_else(|| {
            if self.options.uppercase_hex {
                format!("#{value:04X}")
            } else {
                format!("#{value:04x}")
            }
        })
    }

    fn symbol(&self, value: u16) -> Option<String> {
        self.symbols.lookup_value(value).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::Formatter;
    use crate::config::Options;
    use crate::symbols::{NoSymbols, SymbolTable};

    struct Named(HashMap<u16, String>);

    impl SymbolTable for Named {
        fn lookup_value(&self, value: u16) -> Option<&str> {
            self.0.get(&value).map(String::as_str)
        }

        fn lookup_name(&self, name: &str) -> Option<u16> {
            self.0.iter().find(|(_, n)| *n == name).map(|(v, _)| *v)
        }

        fn intern(&mut self, value: u16, name: &str) {
            self.0.insert(value, name.to_string());
        }

        fn current_origin(&self) -> u16 {
            0
        }
    }

    #[test]
    fn radix_depends_on_field_kind() {
        let fmt = Formatter::new(Options::default(), &NoSymbols);
        assert_eq!(fmt.register(3), "3");
        assert_eq!(fmt.decimal(7), "7");
        assert_eq!(fmt.hex8(0x0A), "#0A");
        assert_eq!(fmt.hex16(0x8485), "#8485");
    }

    #[test]
    fn register_syntax_and_lower_case_hex() {
        let options = Options {
            use_register: true,
            uppercase_hex: false,
            ..Options::default()
        };
        let fmt = Formatter::new(options, &NoSymbols);
        assert_eq!(fmt.register(12), "R12");
        assert_eq!(fmt.hex16(0xABCD), "#abcd");
        assert_eq!(fmt.byte(0xAF), "#af");
    }

    #[test]
    fn symbols_replace_numerals() {
        let mut symbols = Named(HashMap::new());
        symbols.intern(0x1234, "start");
        symbols.intern(3, "three");
        let fmt = Formatter::new(Options::default(), &symbols);
        assert_eq!(fmt.hex16(0x1234), "start");
        assert_eq!(fmt.decimal(3), "three");
        assert_eq!(fmt.hex8(4), "#04");
    }
}
