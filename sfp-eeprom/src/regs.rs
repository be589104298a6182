//! SFF-8472 Memory Map
//!
//! Offset and length constants for the two 256-byte banks an SFP/SFP+
//! module exposes on its two-wire interface: the A0 identification bank and
//! the A2 digital diagnostics bank.
//!
//! Specification: SFF-8472 "Management Interface for SFP+"

/// Default bus address of bank A0 (0xA0 >> 1)
pub const DEFAULT_A0_ADDRESS: u8 = 0xA0 >> 1;

/// Default bus address of bank A2 (0xA2 >> 1)
pub const DEFAULT_A2_ADDRESS: u8 = 0xA2 >> 1;

/// Size of each bank as exposed by the module
pub const BANK_SIZE: usize = 256;

/// A0 bank field offsets
pub mod a0 {
    pub const IDENTIFIER: u8 = 0;
    pub const EXT_IDENTIFIER: u8 = 1;
    pub const CONNECTOR: u8 = 2;
    pub const TRANSCEIVER: u8 = 3;
    pub const ENCODING: u8 = 11;
    pub const BR_NOMINAL: u8 = 12;
    pub const RATE_IDENTIFIER: u8 = 13;
    pub const LENGTH_SMF_KM: u8 = 14;
    pub const LENGTH_CABLE: u8 = 18;
    pub const VENDOR_NAME: u8 = 20;
    pub const VENDOR_OUI: u8 = 37;
    pub const VENDOR_PN: u8 = 40;
    pub const VENDOR_REV: u8 = 56;
    pub const WAVELENGTH: u8 = 60;
    pub const CC_BASE: u8 = 63;
    pub const OPTIONS: u8 = 64;
    pub const BR_MAX: u8 = 66;
    pub const BR_MIN: u8 = 67;
    pub const VENDOR_SN: u8 = 68;
    pub const DATE_CODE: u8 = 84;
    pub const DIAGMON_TYPE: u8 = 92;
    pub const ENHANCED_OPTIONS: u8 = 93;
    pub const SFF_8472_COMPLIANCE: u8 = 94;
    pub const CC_EXT: u8 = 95;

    /// Number of bytes making up the base and extended ID fields
    pub const RECORD_LEN: usize = 96;
}

/// A0 bank field lengths (multi-byte fields only)
pub mod a0_len {
    pub const TRANSCEIVER: usize = 8;
    pub const VENDOR_NAME: usize = 16;
    pub const VENDOR_OUI: usize = 3;
    pub const VENDOR_PN: usize = 16;
    pub const VENDOR_REV: usize = 4;
    pub const OPTIONS: usize = 2;
    pub const VENDOR_SN: usize = 16;
    pub const DATE_CODE: usize = 8;
}

/// A2 bank field offsets
pub mod a2 {
    pub const AW_THRESHOLDS: u8 = 0;
    pub const EXT_CAL_CONSTANTS: u8 = 56;
    pub const CC_DMI: u8 = 95;
    pub const DIAGNOSTICS: u8 = 96;
    pub const DIAGNOSTICS_TXPOWER: u8 = 102;
    pub const DIAGNOSTICS_RXPOWER: u8 = 104;
    pub const STATUS_CONTROL: u8 = 110;
    pub const ALARM_FLAGS: u8 = 112;
    pub const WARNING_FLAGS: u8 = 116;
    pub const EXT_STATUS_CONTROL: u8 = 118;
    pub const VENDOR_SPECIFIC: u8 = 120;
    pub const USER_EEPROM: u8 = 128;
    pub const VENDOR_CONTROL: u8 = 248;
}

/// A2 bank field lengths
pub mod a2_len {
    pub const AW_THRESHOLDS: usize = 40;
    pub const EXT_CAL_CONSTANTS: usize = 36;
    pub const ALARM_FLAGS: usize = 2;
    pub const WARNING_FLAGS: usize = 2;
    pub const EXT_STATUS_CONTROL: usize = 2;
    pub const VENDOR_SPECIFIC: usize = 8;
    pub const USER_EEPROM: usize = 120;
    pub const VENDOR_CONTROL: usize = 8;
}

/// Diagnostic monitoring type bits (A0 byte 92)
pub mod diag_mon_type {
    pub const DDM: u8 = 0x40;               // Bit 6: Digital diagnostic monitoring implemented
    pub const EXTERNAL_CAL: u8 = 0x10;      // Bit 4: Externally calibrated
}

/// Enhanced options bits (A0 byte 93)
pub mod enhanced_options {
    pub const ALARM_WARNING_FLAGS: u8 = 0x80; // Bit 7: Alarm/warning flags implemented
    pub const SOFT_TX_DISABLE: u8 = 0x40;     // Bit 6: Soft TX_DISABLE implemented
    pub const SOFT_RATE_SELECT: u8 = 0x08;    // Bit 3: Soft RATE_SELECT implemented
}

/// Status/control bits (A2 byte 110)
pub mod status_control {
    pub const TX_DISABLE_STATE: u8 = 0x80;  // Bit 7: TX_DISABLE pin state
    pub const SOFT_TX_DISABLE: u8 = 0x40;   // Bit 6: Soft TX disable select (writable)
    pub const RS1_STATE: u8 = 0x20;         // Bit 5: RS(1) pin state
    pub const RS0_STATE: u8 = 0x10;         // Bit 4: RS(0) pin state
    pub const SOFT_RS0: u8 = 0x08;          // Bit 3: Soft RS(0) select (writable)
    pub const TX_FAULT: u8 = 0x04;          // Bit 2: TX_FAULT state
    pub const RX_LOS: u8 = 0x02;            // Bit 1: RX_LOS state
    pub const DATA_NOT_READY: u8 = 0x01;    // Bit 0: Data_Ready_Bar
}

/// Extended status/control bits (A2 byte 118)
pub mod ext_status_control {
    pub const SOFT_RS1: u8 = 0x08;          // Bit 3: Soft RS(1) select (writable)
}

/// Transceiver compliance bits consulted outside of the bit-option tables
pub mod transceiver {
    /// A0 byte 3, bits 7-4: 10G Ethernet compliance codes
    pub const TEN_G_ETHERNET_MASK: u8 = 0xF0;
    /// A0 byte 6, bits 3-0: 1G Ethernet compliance codes
    pub const ONE_G_ETHERNET_MASK: u8 = 0x0F;
    /// A0 byte 6, bit 3: 1000BASE-T
    pub const BASE_T_1000: u8 = 0x08;
    /// A0 byte 8, bit 2: Passive cable (SFP+ cable technology)
    pub const PASSIVE_CABLE: u8 = 0x04;
    /// A0 byte 9, bits 7-4: twin axial, twisted pair, miniature, video coax
    pub const COPPER_MEDIA_MASK: u8 = 0xF0;
}

/// Connector codes consulted outside of the lookup tables
pub mod connector {
    pub const COPPER_PIGTAIL: u8 = 0x21;
}
