//! Lookup and bit-option tables.
//!
//! Single-byte codes (identifier, connector, encoding, ...) decode through
//! `strum` enums. Capability bitfields decode through [`BitOptionTable`]s,
//! each describing the exact byte window it applies to.

use std::fmt;
use std::ops::RangeInclusive;

use strum::{Display, FromRepr};

/// A single-byte code with a descriptive rendering.
pub trait Code: Sized + fmt::Display {
    fn from_code(raw: u8) -> Option<Self>;

    /// Descriptive text for `raw`, or `None` for unassigned codes.
    fn describe(raw: u8) -> Option<String> {
        Self::from_code(raw).map(|c| c.to_string())
    }
}

macro_rules! impl_code {
    ($($ty:ty),* $(,)?) => {
        $(impl Code for $ty {
            fn from_code(raw: u8) -> Option<Self> {
                Self::from_repr(raw)
            }
        })*
    };
}

/// Physical device type (A0 byte 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, Display)]
#[repr(u8)]
pub enum Identifier {
    #[strum(serialize = "GBIC")]
    Gbic = 0x01,
    #[strum(serialize = "SFF")]
    Sff = 0x02,
    #[strum(serialize = "SFP or SFP+")]
    Sfp = 0x03,
}

/// Extended identifier (A0 byte 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, Display)]
#[repr(u8)]
pub enum ExtIdentifier {
    #[strum(serialize = "GBIC definition is not specified")]
    Unspecified = 0x00,
    #[strum(serialize = "GBIC is compliant with MOD_DEF 1")]
    ModDef1 = 0x01,
    #[strum(serialize = "GBIC is compliant with MOD_DEF 2")]
    ModDef2 = 0x02,
    #[strum(serialize = "GBIC is compliant with MOD_DEF 3")]
    ModDef3 = 0x03,
    #[strum(serialize = "GBIC/SFP function is defined by two-wire interface ID only")]
    TwoWireOnly = 0x04,
    #[strum(serialize = "GBIC is compliant with MOD_DEF 5")]
    ModDef5 = 0x05,
    #[strum(serialize = "GBIC is compliant with MOD_DEF 6")]
    ModDef6 = 0x06,
    #[strum(serialize = "GBIC is compliant with MOD_DEF 7")]
    ModDef7 = 0x07,
}

/// Connector type (A0 byte 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, Display)]
#[repr(u8)]
pub enum Connector {
    #[strum(serialize = "SC")]
    Sc = 0x01,
    #[strum(serialize = "Fiber style 1")]
    FiberStyle1 = 0x02,
    #[strum(serialize = "Fiber style 2")]
    FiberStyle2 = 0x03,
    #[strum(serialize = "BNC/TNC")]
    BncTnc = 0x04,
    #[strum(serialize = "Fiber coaxial")]
    FiberCoax = 0x05,
    #[strum(serialize = "FiberJack")]
    FiberJack = 0x06,
    #[strum(serialize = "LC")]
    Lc = 0x07,
    #[strum(serialize = "MT-RJ")]
    MtRj = 0x08,
    #[strum(serialize = "MU")]
    Mu = 0x09,
    #[strum(serialize = "SG")]
    Sg = 0x0A,
    #[strum(serialize = "Optical pigtail")]
    OpticalPigtail = 0x0B,
    #[strum(serialize = "MPO Paralel opt")]
    Mpo = 0x0C,
    #[strum(serialize = "HSSDC 2")]
    Hssdc2 = 0x20,
    #[strum(serialize = "Copper")]
    CopperPigtail = 0x21,
    #[strum(serialize = "RJ45")]
    Rj45 = 0x22,
}

impl Connector {
    /// Whether the raw connector code rules out an optical module.
    ///
    /// Electrical connectors (0x20..=0x22) and the copper-style fiber
    /// connectors (0x02..=0x06) count as non-optical.
    pub fn is_non_optical_code(raw: u8) -> bool {
        (0x20..=0x22).contains(&raw) || (0x02..=0x06).contains(&raw)
    }
}

/// Serial encoding (A0 byte 11)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, Display)]
#[repr(u8)]
pub enum Encoding {
    #[strum(serialize = "8B/10B")]
    Enc8b10b = 0x01,
    #[strum(serialize = "4B/5B")]
    Enc4b5b = 0x02,
    #[strum(serialize = "NRZ")]
    Nrz = 0x03,
    #[strum(serialize = "Manchester")]
    Manchester = 0x04,
    #[strum(serialize = "Sonet Scrambled")]
    SonetScrambled = 0x05,
    #[strum(serialize = "64B/66B")]
    Enc64b66b = 0x06,
}

/// Rate identifier (A0 byte 13)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, Display)]
#[repr(u8)]
pub enum RateIdentifier {
    #[strum(serialize = "SFF-8079 (4/2/1G Rate_Select & AS0/AS1)")]
    Sff8079 = 0x01,
    #[strum(serialize = "SFF-8431 (8/4/2G Rx Rate_Select only)")]
    Sff8431Rx = 0x02,
    #[strum(serialize = "SFF-8431 (8/4/2G Tx Rate_Select only)")]
    Sff8431Tx = 0x04,
    #[strum(serialize = "SFF-8431 (8/4/2G Independent Rx & Tx Rate_select)")]
    Sff8431RxTx = 0x06,
    #[strum(serialize = "FC-PI-5 (16/8/4G Rx Rate_select only) High=16G only, Low=8G/4G")]
    FcPi5Rx = 0x08,
    #[strum(
        serialize = "FC-PI-5 (16/8/4G Independent Rx, Tx Rate_select) High=16G only, Low=8G/4G"
    )]
    FcPi5RxTx = 0x0A,
    #[strum(serialize = "FC-PI-6 (32/16/8G Independent Rx, Tx Rate_Select)")]
    FcPi6 = 0x0C,
}

/// SFF-8472 compliance revision (A0 byte 94)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, Display)]
#[repr(u8)]
pub enum Sff8472Compliance {
    #[strum(serialize = "Functionality not included")]
    NotIncluded = 0x00,
    #[strum(serialize = "Rev 9.3")]
    Rev9_3 = 0x01,
    #[strum(serialize = "Rev 9.5")]
    Rev9_5 = 0x02,
    #[strum(serialize = "Rev 10.2")]
    Rev10_2 = 0x03,
    #[strum(serialize = "Rev 10.4")]
    Rev10_4 = 0x04,
    #[strum(serialize = "Rev 11.0")]
    Rev11_0 = 0x05,
}

impl_code!(
    Identifier,
    ExtIdentifier,
    Connector,
    Encoding,
    RateIdentifier,
    Sff8472Compliance,
);

/// A named capability flag at a fixed (byte, bit) position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitOption {
    /// Absolute byte offset within the bank
    pub byte: u8,
    pub bit: u8,
    /// Empty when the flag has no assigned meaning
    pub long_name: &'static str,
    /// Empty when the flag is omitted from short listings
    pub short_name: &'static str,
}

const fn opt(byte: u8, bit: u8, long_name: &'static str, short_name: &'static str) -> BitOption {
    BitOption {
        byte,
        bit,
        long_name,
        short_name,
    }
}

/// A declaration-ordered list of bit options sharing one byte window.
#[derive(Debug, Clone, Copy)]
pub struct BitOptionTable {
    pub name: &'static str,
    pub options: &'static [BitOption],
}

impl BitOptionTable {
    /// First byte of the window (the byte of the first declared option).
    pub fn base(&self) -> usize {
        self.options.first().map_or(0, |o| o.byte as usize)
    }

    /// Byte offsets referenced by the table, relative to [`Self::base`].
    pub fn span(&self) -> RangeInclusive<usize> {
        let base = self.base();
        let offsets = self.options.iter().map(|o| o.byte as usize - base);
        let min = offsets.clone().min().unwrap_or(0);
        let max = offsets.max().unwrap_or(0);
        min..=max
    }

    /// Slice of `bank` the table applies to, starting at [`Self::base`].
    pub fn window<'a>(&self, bank: &'a [u8]) -> &'a [u8] {
        let base = self.base();
        &bank[base..=base + *self.span().end()]
    }

    /// Set options, in declaration order, for a window starting at the
    /// table's base byte.
    pub fn decode<'t, 'w>(&'t self, window: &'w [u8]) -> impl Iterator<Item = &'t BitOption> + 'w
    where
        't: 'w,
    {
        let base = self.base();
        let options: &'t [BitOption] = self.options;
        options.iter().filter(move |o| {
            window
                .get(o.byte as usize - base)
                .is_some_and(|b| b & (1 << o.bit) != 0)
        })
    }
}

/// Transceiver compliance codes (A0 bytes 3-10)
pub const TRANSCEIVER: BitOptionTable = BitOptionTable {
    name: "Transeiver",
    options: &[
        opt(3, 7, "10G Base-ER", "10G Base-ER"),
        opt(3, 6, "10G Base-LRM", "10G Base-LRM"),
        opt(3, 5, "10G Base-LR", "10G Base-LR"),
        opt(3, 4, "10G Base-SM", "10G Base-SM"),
        opt(3, 3, "1X SX", ""),
        opt(3, 2, "1X LX", ""),
        opt(3, 1, "1X Copper Active", ""),
        opt(3, 0, "1X Copper Passive", ""),
        opt(4, 7, "", ""),
        opt(4, 6, "", ""),
        opt(4, 5, "", ""),
        opt(4, 4, "", ""),
        opt(4, 3, "", ""),
        opt(4, 2, "", ""),
        opt(4, 1, "", ""),
        opt(4, 0, "", ""),
        opt(5, 7, "", ""),
        opt(5, 6, "", ""),
        opt(5, 5, "", ""),
        opt(5, 4, "", ""),
        opt(5, 3, "", ""),
        opt(5, 2, "", ""),
        opt(5, 1, "", ""),
        opt(5, 0, "", ""),
        opt(6, 7, "BASE-PX", "BASE-PX"),
        opt(6, 6, "BASE-BX10", "BASE-BX10"),
        opt(6, 5, "100BASE-FX", "100BASE-FX"),
        opt(6, 4, "100BASE-LX/LX10", "100BASE-LX/LX10"),
        opt(6, 3, "1000BASE-T", "1000BASE-T"),
        opt(6, 2, "1000BASE-CX", "1000BASE-CX"),
        opt(6, 1, "1000BASE-LX", "1000BASE-LX"),
        opt(6, 0, "1000BASE-SX", "1000BASE-SX"),
        opt(7, 7, "Very long distance", "V"),
        opt(7, 6, "Short distance", "S"),
        opt(7, 5, "Intermediate distance", "I"),
        opt(7, 4, "Long distance", "L"),
        opt(7, 3, "mediaum distance", "M"),
        opt(7, 2, "Shortwave laser linear RX", "SA"),
        opt(7, 1, "Longwave laser", "LC"),
        opt(7, 0, "EL", ""),
        opt(8, 7, "", ""),
        opt(8, 6, "Shortwave laser w/o OFC", "SN"),
        opt(8, 5, "Shortwave laser with OFC", "SL"),
        opt(8, 4, "Longwave laser", "LL"),
        opt(8, 3, "Active Cable", ""),
        opt(8, 2, "Passive Cable", ""),
        opt(8, 1, "", ""),
        opt(8, 0, "", ""),
        opt(9, 7, "Twin axial pair", "TW"),
        opt(9, 6, "Twisted pair", "TP"),
        opt(9, 5, "Miniature", "MI"),
        opt(9, 4, "Video Coax", "TV"),
        opt(9, 3, "Multimode 62.6um", "M6"),
        opt(9, 2, "Multimode 50um", "M5"),
        opt(9, 1, "", ""),
        opt(9, 0, "Single Mode", "SM"),
        opt(10, 7, "1200 Mbyte/s", ""),
        opt(10, 6, "800 Mbyte/s", ""),
        opt(10, 5, "1600 Mbyte/s", ""),
        opt(10, 4, "400 Mbyte/s", ""),
        opt(10, 3, "", ""),
        opt(10, 2, "200 Mbyte/s", ""),
        opt(10, 1, "", ""),
        opt(10, 0, "100 Mbyte/s", ""),
    ],
};

/// Implemented options (A0 bytes 64-65)
pub const OPTIONS: BitOptionTable = BitOptionTable {
    name: "Options",
    options: &[
        opt(64, 2, "Cooled Transceiver", "CT"),
        opt(64, 1, "Power level 2", "PW2"),
        opt(64, 0, "Linear Receiver Output", "LRO"),
        opt(65, 5, "Rate Select", "RS"),
        opt(65, 4, "TX Disable", "TXD"),
        opt(65, 3, "TX Fault", "TXF"),
        opt(65, 2, "Signal detect", "SD"),
        opt(65, 1, "Lost of signal", "LS"),
    ],
};

/// Diagnostic monitoring type (A0 byte 92)
pub const MONITORING_TYPE: BitOptionTable = BitOptionTable {
    name: "Monitoring type",
    options: &[
        opt(92, 7, "Legacy diagnostic", "LDI"),
        opt(92, 6, "Monitoring implemented", "MON"),
        opt(92, 5, "Internally calibrated", "INC"),
        opt(92, 4, "Externally calibrated", "EXC"),
        opt(92, 3, "Average power", "APW"),
        opt(92, 2, "Address change required", "ACH"),
    ],
};

/// Enhanced options (A0 byte 93)
pub const ENHANCED_OPTIONS: BitOptionTable = BitOptionTable {
    name: "Enhanced options",
    options: &[
        opt(93, 7, "Alarm/warning flags", "AWF"),
        opt(93, 6, "Soft TX Disable", "TXD"),
        opt(93, 5, "Soft TX Fault", "TXF"),
        opt(93, 4, "Soft RX Los ", "RXL"),
        opt(93, 3, "Soft Rate select", "RS"),
        opt(93, 2, "Application Select SFF-8079", "AS"),
        opt(93, 1, "Soft Rate select SFF-8431", "RSF"),
    ],
};

/// Status/control (A2 bytes 110 and 118)
pub const STATUS_CONTROL: BitOptionTable = BitOptionTable {
    name: "Status/Control",
    options: &[
        opt(110, 7, "TX Disable", "TXD"),
        opt(110, 5, "Rate select 1", "RS1"),
        opt(110, 4, "Rate select 0", "RS0"),
        opt(110, 2, "TX fault state", "TXF"),
        opt(110, 1, "RX loss", "RXL"),
        opt(110, 0, "Data_Ready_Bar", "DR"),
        opt(118, 1, "Power level 2", "PW2"),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0x03, Some("SFP or SFP+"); "sfp")]
    #[test_case(0x01, Some("GBIC"); "gbic")]
    #[test_case(0x00, None; "unassigned zero")]
    #[test_case(0x0D, None; "unassigned qsfp")]
    fn test_identifier_lookup(raw: u8, expected: Option<&str>) {
        assert_eq!(Identifier::describe(raw).as_deref(), expected);
    }

    #[test_case(0x07, Some("LC"))]
    #[test_case(0x21, Some("Copper"))]
    #[test_case(0x22, Some("RJ45"))]
    #[test_case(0x0D, None)]
    #[test_case(0x23, None)]
    fn test_connector_lookup(raw: u8, expected: Option<&str>) {
        assert_eq!(Connector::describe(raw).as_deref(), expected);
    }

    #[test]
    fn test_other_code_tables() {
        assert_eq!(Encoding::describe(0x06).as_deref(), Some("64B/66B"));
        assert_eq!(Encoding::describe(0x00), None);
        assert_eq!(
            ExtIdentifier::describe(0x04).as_deref(),
            Some("GBIC/SFP function is defined by two-wire interface ID only")
        );
        assert_eq!(RateIdentifier::describe(0x03), None, "odd rate ids are unassigned");
        assert_eq!(
            Sff8472Compliance::describe(0x00).as_deref(),
            Some("Functionality not included")
        );
    }

    #[test]
    fn test_non_optical_connectors() {
        for raw in [0x02, 0x03, 0x04, 0x05, 0x06, 0x20, 0x21, 0x22] {
            assert!(Connector::is_non_optical_code(raw), "{:#04x} should be non-optical", raw);
        }
        for raw in [0x00, 0x01, 0x07, 0x0B, 0x23] {
            assert!(
                !Connector::is_non_optical_code(raw),
                "{:#04x} should not rule out optics",
                raw
            );
        }
    }

    #[test]
    fn test_table_spans() {
        assert_eq!(TRANSCEIVER.base(), 3);
        assert_eq!(TRANSCEIVER.span(), 0..=7);
        assert_eq!(OPTIONS.span(), 0..=1);
        assert_eq!(MONITORING_TYPE.span(), 0..=0);
        assert_eq!(STATUS_CONTROL.base(), 110);
        assert_eq!(STATUS_CONTROL.span(), 0..=8);
    }

    #[test]
    fn test_decode_preserves_declaration_order() {
        // Byte 64 bit 0 and byte 65 bits 5 and 1
        let window = [0x01, 0x22];
        let names: Vec<_> = OPTIONS.decode(&window).map(|o| o.short_name).collect();
        assert_eq!(names, ["LRO", "RS", "LS"]);
    }

    #[test]
    fn test_window_extraction() {
        let mut bank = [0u8; 256];
        bank[110] = 0x80;
        bank[118] = 0x02;
        let window = STATUS_CONTROL.window(&bank);
        assert_eq!(window.len(), 9);
        let names: Vec<_> = STATUS_CONTROL.decode(window).map(|o| o.long_name).collect();
        assert_eq!(names, ["TX Disable", "Power level 2"]);
    }

    #[test]
    fn test_unnamed_options_still_decode() {
        let mut window = [0u8; 8];
        window[1] = 0x80; // byte 4, bit 7
        let set: Vec<_> = TRANSCEIVER.decode(&window).collect();
        assert_eq!(set.len(), 1);
        assert_eq!((set[0].byte, set[0].bit), (4, 7));
        assert!(set[0].long_name.is_empty());
    }
}
