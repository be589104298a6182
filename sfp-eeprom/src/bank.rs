//! Typed views of the A0 and A2 banks.
//!
//! Each bank keeps its raw bytes alongside the parsed fields so that hex
//! rendering and checksum validation work from exactly what was read.

use crate::alarm::Thresholds;
use crate::calibration::{Calibration, Quantity};
use crate::checksum::{ChecksumResult, ChecksumSection};
use crate::regs::{a0, a0_len, a2, a2_len, diag_mon_type, enhanced_options, transceiver, BANK_SIZE};
use crate::tables::Connector;

fn array<const N: usize>(b: &[u8], offset: u8) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&b[offset as usize..offset as usize + N]);
    out
}

/// Base ID fields (A0 0..64).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseFields {
    pub identifier: u8,
    pub ext_identifier: u8,
    pub connector: u8,
    pub transceiver: [u8; a0_len::TRANSCEIVER],
    pub encoding: u8,
    pub br_nominal: u8,
    pub rate_identifier: u8,
    /// SM km, SM 100m, OM2, OM1, copper, OM3
    pub lengths: [u8; 6],
    pub vendor_name: [u8; a0_len::VENDOR_NAME],
    pub vendor_oui: [u8; a0_len::VENDOR_OUI],
    pub vendor_pn: [u8; a0_len::VENDOR_PN],
    pub vendor_rev: [u8; a0_len::VENDOR_REV],
    pub wavelength: u16,
    pub cc_base: u8,
}

impl BaseFields {
    fn parse(b: &[u8]) -> Self {
        Self {
            identifier: b[a0::IDENTIFIER as usize],
            ext_identifier: b[a0::EXT_IDENTIFIER as usize],
            connector: b[a0::CONNECTOR as usize],
            transceiver: array(b, a0::TRANSCEIVER),
            encoding: b[a0::ENCODING as usize],
            br_nominal: b[a0::BR_NOMINAL as usize],
            rate_identifier: b[a0::RATE_IDENTIFIER as usize],
            lengths: array(b, a0::LENGTH_SMF_KM),
            vendor_name: array(b, a0::VENDOR_NAME),
            vendor_oui: array(b, a0::VENDOR_OUI),
            vendor_pn: array(b, a0::VENDOR_PN),
            vendor_rev: array(b, a0::VENDOR_REV),
            wavelength: u16::from_be_bytes(array(b, a0::WAVELENGTH)),
            cc_base: b[a0::CC_BASE as usize],
        }
    }

    /// Transceiver compliance byte at absolute A0 offset `byte` (3..=10).
    pub fn transceiver_byte(&self, byte: u8) -> u8 {
        self.transceiver[(byte - a0::TRANSCEIVER) as usize]
    }

    /// Whether the module carries a laser, judged from connector type and
    /// transceiver compliance codes.
    ///
    /// Copper connectors, 1000BASE-T, and twin-axial/twisted-pair/coax
    /// media all rule a laser out.
    pub fn is_laser(&self) -> bool {
        if Connector::is_non_optical_code(self.connector) {
            return false;
        }
        self.transceiver_byte(6) & transceiver::BASE_T_1000 == 0
            && self.transceiver_byte(9) & transceiver::COPPER_MEDIA_MASK == 0
    }
}

/// Extended ID fields (A0 64..96).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedFields {
    pub options: [u8; a0_len::OPTIONS],
    pub br_max: u8,
    pub br_min: u8,
    pub vendor_sn: [u8; a0_len::VENDOR_SN],
    pub date_code: [u8; a0_len::DATE_CODE],
    pub diag_mon_type: u8,
    pub enhanced_options: u8,
    pub sff8472_compliance: u8,
    pub cc_ext: u8,
}

impl ExtendedFields {
    fn parse(b: &[u8]) -> Self {
        Self {
            options: array(b, a0::OPTIONS),
            br_max: b[a0::BR_MAX as usize],
            br_min: b[a0::BR_MIN as usize],
            vendor_sn: array(b, a0::VENDOR_SN),
            date_code: array(b, a0::DATE_CODE),
            diag_mon_type: b[a0::DIAGMON_TYPE as usize],
            enhanced_options: b[a0::ENHANCED_OPTIONS as usize],
            sff8472_compliance: b[a0::SFF_8472_COMPLIANCE as usize],
            cc_ext: b[a0::CC_EXT as usize],
        }
    }

    pub fn has_diagnostics(&self) -> bool {
        self.diag_mon_type & diag_mon_type::DDM != 0
    }

    pub fn is_externally_calibrated(&self) -> bool {
        self.diag_mon_type & diag_mon_type::EXTERNAL_CAL != 0
    }

    pub fn has_alarm_flags(&self) -> bool {
        self.enhanced_options & enhanced_options::ALARM_WARNING_FLAGS != 0
    }
}

/// Identification bank A0, first 96 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankA0 {
    pub base: BaseFields,
    pub ext: ExtendedFields,
    raw: [u8; a0::RECORD_LEN],
}

impl BankA0 {
    pub fn from_bytes(raw: &[u8; a0::RECORD_LEN]) -> Self {
        Self {
            base: BaseFields::parse(raw),
            ext: ExtendedFields::parse(raw),
            raw: *raw,
        }
    }

    pub fn raw(&self) -> &[u8; a0::RECORD_LEN] {
        &self.raw
    }

    pub fn checksums(&self) -> [ChecksumResult; 2] {
        [
            ChecksumResult::evaluate(ChecksumSection::Base, &self.raw),
            ChecksumResult::evaluate(ChecksumSection::Extended, &self.raw),
        ]
    }
}

/// Real-time diagnostics (A2 96..120).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    /// Raw measurements in [`Quantity::ALL`] order
    pub measurements: [u16; 5],
    pub status_control: u8,
    pub alarm_flags: [u8; a2_len::ALARM_FLAGS],
    pub warning_flags: [u8; a2_len::WARNING_FLAGS],
    pub ext_status_control: [u8; a2_len::EXT_STATUS_CONTROL],
}

impl Diagnostics {
    fn parse(b: &[u8]) -> Self {
        let mut measurements = [0u16; 5];
        for (i, m) in measurements.iter_mut().enumerate() {
            *m = u16::from_be_bytes(array(b, a2::DIAGNOSTICS + 2 * i as u8));
        }
        Self {
            measurements,
            status_control: b[a2::STATUS_CONTROL as usize],
            alarm_flags: array(b, a2::ALARM_FLAGS),
            warning_flags: array(b, a2::WARNING_FLAGS),
            ext_status_control: array(b, a2::EXT_STATUS_CONTROL),
        }
    }

    pub fn raw(&self, quantity: Quantity) -> u16 {
        self.measurements[quantity.index()]
    }
}

/// Diagnostics bank A2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankA2 {
    pub thresholds: Thresholds,
    pub calibration: Calibration,
    pub diagnostics: Diagnostics,
    pub cc_dmi: u8,
    raw: [u8; BANK_SIZE],
}

impl BankA2 {
    pub fn from_bytes(raw: &[u8; BANK_SIZE]) -> Self {
        Self {
            thresholds: Thresholds::from_bytes(&array(raw, a2::AW_THRESHOLDS)),
            calibration: Calibration::from_bytes(&array(raw, a2::EXT_CAL_CONSTANTS)),
            diagnostics: Diagnostics::parse(raw),
            cc_dmi: raw[a2::CC_DMI as usize],
            raw: *raw,
        }
    }

    pub fn raw(&self) -> &[u8; BANK_SIZE] {
        &self.raw
    }

    pub fn checksum(&self) -> ChecksumResult {
        ChecksumResult::evaluate(ChecksumSection::Diagnostics, &self.raw)
    }

    pub fn vendor_specific(&self) -> &[u8] {
        &self.raw[a2::VENDOR_SPECIFIC as usize..][..a2_len::VENDOR_SPECIFIC]
    }

    pub fn user_eeprom(&self) -> &[u8] {
        &self.raw[a2::USER_EEPROM as usize..][..a2_len::USER_EEPROM]
    }

    pub fn vendor_control(&self) -> &[u8] {
        &self.raw[a2::VENDOR_CONTROL as usize..][..a2_len::VENDOR_CONTROL]
    }
}

/// Everything read from a module in one pass.
///
/// `a2` is present only when A0 declares digital diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dump {
    pub a0: BankA0,
    pub a2: Option<BankA2>,
}

impl Dump {
    /// External calibration constants, when the module uses them.
    pub fn external_calibration(&self) -> Option<&Calibration> {
        match &self.a2 {
            Some(a2) if self.a0.ext.is_externally_calibrated() => Some(&a2.calibration),
            _ => None,
        }
    }

    /// Every checksum available in this dump.
    pub fn checksums(&self) -> Vec<ChecksumResult> {
        let mut results = self.a0.checksums().to_vec();
        if let Some(a2) = &self.a2 {
            results.push(a2.checksum());
        }
        results
    }

    /// Calibrated value of a live measurement.
    pub fn measurement(&self, quantity: Quantity) -> Option<f32> {
        let a2 = self.a2.as_ref()?;
        Some(quantity.calibrate(a2.diagnostics.raw(quantity), self.external_calibration()))
    }
}
