//! Configuration for sfp-eeprom.
//!
//! Bus addresses, rendering options, and checksum enforcement. A config is
//! usually built in code or loaded from a TOML file; tools overlay their
//! command-line flags on top.

use std::fs;
use std::path::Path;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::regs::{DEFAULT_A0_ADDRESS, DEFAULT_A2_ADDRESS};

bitflags! {
    /// Rendering options for the field decoder.
    ///
    /// In TOML these are written as a string, e.g.
    /// `flags = "LONG_OPT | HEX_OUTPUT"`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PrintFlags: u32 {
        /// Bit options one per line with long names
        const LONG_OPT = 0x01;
        /// Append raw hex to decoded values
        const HEX_OUTPUT = 0x02;
        /// Show fields whose value is unknown or zero
        const PRINT_UNKNOWN = 0x04;
        /// Show the calibration constants section
        const CALIBRATIONS = 0x08;
        /// Show the alarm/warning thresholds section
        const THRESHOLDS = 0x10;
        /// Show bit-option fields at all
        const BIT_OPTIONS = 0x20;
        /// Hide optical or copper fields depending on the module type
        const LASER_AUTO = 0x40;
        /// Show checksum verification lines
        const CHECKSUMS = 0x80;
        /// Dump the vendor-specific and user EEPROM areas
        const VENDOR = 0x100;

        const VERBOSE = Self::LONG_OPT.bits()
            | Self::PRINT_UNKNOWN.bits()
            | Self::CALIBRATIONS.bits()
            | Self::THRESHOLDS.bits()
            | Self::BIT_OPTIONS.bits()
            | Self::CHECKSUMS.bits();
    }
}

impl Default for PrintFlags {
    fn default() -> Self {
        PrintFlags::LONG_OPT
    }
}

/// Decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Bus address of the A0 bank
    pub a0_address: u8,

    /// Bus address of the A2 bank
    pub a2_address: u8,

    pub flags: PrintFlags,

    /// Turn checksum mismatches into read failures
    pub enforce_checksum: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            a0_address: DEFAULT_A0_ADDRESS,
            a2_address: DEFAULT_A2_ADDRESS,
            flags: PrintFlags::default(),
            enforce_checksum: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn with_flags(mut self, flags: PrintFlags) -> Self {
        self.flags = flags;
        self
    }
}
