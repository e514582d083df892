//! Assembler and disassembler options.

use crate::error::{Error, ErrorKind};

/// Option name enabling `Rn` register syntax.
pub const OPT_USE_REGISTER: &str = "use-register";
/// Option name of the smart-branch toggle.
pub const OPT_SMART_BRANCH: &str = "smart-branch";
/// Option name selecting upper-case hex digits.
pub const OPT_UPPER_HEX: &str = "upper-hex";

/// Runtime options shared by the assembler and disassembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Options {
    /// Accept and render registers as `R0`-`R15`.
    pub use_register: bool,
    /// Declared toggle with no encode/decode effect; requires `use_register`.
    pub smart_branch: bool,
    /// Render hex digits in upper case.
    pub uppercase_hex: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            use_register: false,
            smart_branch: false,
            uppercase_hex: true,
        }
    }
}

impl Options {
    /// Sets an option by name from its textual value.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::UnknownOption`] for an unrecognised name, and
    /// [`ErrorKind::IllegalOptionValue`] for a non-boolean value or when
    /// enabling `smart-branch` while `use-register` is off.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), Error> {
        let option =
            OptionName::parse(name).ok_or_else(|| Error::at(ErrorKind::UnknownOption, name))?;
        let flag =
            parse_bool(value).ok_or_else(|| Error::at(ErrorKind::IllegalOptionValue, value))?;
        match option {
            OptionName::UseRegister => {
                self.use_register = flag;
                if !flag {
                    self.smart_branch = false;
                }
            }
            OptionName::SmartBranch => {
                if flag && !self.use_register {
                    return Err(Error::at(ErrorKind::IllegalOptionValue, name));
                }
                self.smart_branch = flag;
            }
            OptionName::UpperHex => self.uppercase_hex = flag,
        }
        log::debug!("option {name} = {flag}");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum OptionName {
    UseRegister,
    SmartBranch,
    UpperHex,
}

impl OptionName {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            OPT_USE_REGISTER => Some(Self::UseRegister),
            OPT_SMART_BRANCH => Some(Self::SmartBranch),
            OPT_UPPER_HEX => Some(Self::UpperHex),
            _ => None,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "enable" | "1" => Some(true),
        "off" | "false" | "no" | "disable" | "0" => Some(false),
        _ => None,
    }
}
