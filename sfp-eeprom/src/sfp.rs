//! SFP/SFP+ module handle.
//!
//! [`Sfp`] owns a register transport and a [`Config`], and exposes the full
//! decode path (read both banks, validate, render) alongside point queries
//! that touch only the registers they need.

use serde::Serialize;

use crate::bank::{BankA0, BankA2, Dump};
use crate::brief::{padded_ascii, BriefInfo, SpeedMode, POWER_UNAVAILABLE};
use crate::calibration::{Calibration, Quantity};
use crate::config::{Config, PrintFlags};
use crate::decoder::FieldDecoder;
use crate::eeprom::RegisterAccess;
use crate::error::{Error, Result};
use crate::regs::{
    a0, a0_len, a2, a2_len, connector, diag_mon_type, enhanced_options, ext_status_control,
    status_control, transceiver, BANK_SIZE,
};
use crate::sink::Sink;
use crate::tracing::prelude::*;

/// Software-controllable module pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftPin {
    /// Soft TX disable select (A2 byte 110, bit 6)
    TxDisable,
    /// Soft RS(0) select (A2 byte 110, bit 3)
    RateSelect0,
    /// Soft RS(1) select (A2 byte 118, bit 3)
    RateSelect1,
}

impl SoftPin {
    fn register(self) -> (u8, u8) {
        match self {
            SoftPin::TxDisable => (a2::STATUS_CONTROL, status_control::SOFT_TX_DISABLE),
            SoftPin::RateSelect0 => (a2::STATUS_CONTROL, status_control::SOFT_RS0),
            SoftPin::RateSelect1 => (a2::EXT_STATUS_CONTROL, ext_status_control::SOFT_RS1),
        }
    }

    // Enhanced options bit that declares the soft control.
    fn capability(self) -> u8 {
        match self {
            SoftPin::TxDisable => enhanced_options::SOFT_TX_DISABLE,
            SoftPin::RateSelect0 | SoftPin::RateSelect1 => enhanced_options::SOFT_RATE_SELECT,
        }
    }
}

/// Live pin and soft-control state from A2 bytes 110 and 118.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PinState {
    pub tx_disable: bool,
    pub soft_tx_disable: bool,
    pub rate_select1: bool,
    pub rate_select0: bool,
    pub soft_rate_select0: bool,
    pub soft_rate_select1: bool,
    pub tx_fault: bool,
    pub rx_los: bool,
    pub data_ready: bool,
}

impl PinState {
    fn from_registers(status: u8, ext_status: u8) -> Self {
        Self {
            tx_disable: status & status_control::TX_DISABLE_STATE != 0,
            soft_tx_disable: status & status_control::SOFT_TX_DISABLE != 0,
            rate_select1: status & status_control::RS1_STATE != 0,
            rate_select0: status & status_control::RS0_STATE != 0,
            soft_rate_select0: status & status_control::SOFT_RS0 != 0,
            soft_rate_select1: ext_status & ext_status_control::SOFT_RS1 != 0,
            tx_fault: status & status_control::TX_FAULT != 0,
            rx_los: status & status_control::RX_LOS != 0,
            data_ready: status & status_control::DATA_NOT_READY == 0,
        }
    }
}

/// An SFP/SFP+ module reached through a register transport.
pub struct Sfp<R: RegisterAccess> {
    regs: R,
    config: Config,
}

impl<R: RegisterAccess> Sfp<R> {
    pub fn new(regs: R, config: Config) -> Self {
        Self { regs, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_flags(&mut self, flags: PrintFlags) {
        self.config.flags = flags;
    }

    pub fn set_addresses(&mut self, a0_address: u8, a2_address: u8) {
        self.config.a0_address = a0_address;
        self.config.a2_address = a2_address;
    }

    pub fn into_inner(self) -> R {
        self.regs
    }

    fn read(&mut self, bank: u8, offset: u8, buf: &mut [u8]) -> Result<()> {
        trace!("Reading {} bytes at {:#04x}:{:#04x}", buf.len(), bank, offset);
        self.regs
            .read(bank, offset, buf)
            .map_err(|source| Error::Io {
                bank,
                offset,
                len: buf.len(),
                source,
            })
    }

    fn write(&mut self, bank: u8, offset: u8, data: &[u8]) -> Result<()> {
        debug!("Writing {:02X?} at {:#04x}:{:#04x}", data, bank, offset);
        self.regs
            .write(bank, offset, data)
            .map_err(|source| Error::Io {
                bank,
                offset,
                len: data.len(),
                source,
            })
    }

    fn read_a0_byte(&mut self, offset: u8) -> Result<u8> {
        let mut b = [0u8; 1];
        self.read(self.config.a0_address, offset, &mut b)?;
        Ok(b[0])
    }

    fn read_a2_byte(&mut self, offset: u8) -> Result<u8> {
        let mut b = [0u8; 1];
        self.read(self.config.a2_address, offset, &mut b)?;
        Ok(b[0])
    }

    fn read_a2_word(&mut self, offset: u8) -> Result<u16> {
        let mut b = [0u8; 2];
        self.read(self.config.a2_address, offset, &mut b)?;
        Ok(u16::from_be_bytes(b))
    }

    /// Read A0 and, when diagnostics are implemented, A2.
    ///
    /// Fails with [`Error::Checksum`] listing every bad section when
    /// checksum enforcement is on.
    pub fn read_info(&mut self) -> Result<Dump> {
        let mut raw_a0 = [0u8; a0::RECORD_LEN];
        self.read(self.config.a0_address, 0, &mut raw_a0)?;
        let bank_a0 = BankA0::from_bytes(&raw_a0);
        debug!(
            "A0: identifier {:#04x}, diag type {:#04x}",
            bank_a0.base.identifier, bank_a0.ext.diag_mon_type
        );

        let bank_a2 = if bank_a0.ext.has_diagnostics() {
            let mut raw_a2 = [0u8; BANK_SIZE];
            self.read(self.config.a2_address, 0, &mut raw_a2)?;
            Some(BankA2::from_bytes(&raw_a2))
        } else {
            debug!("Diagnostics not implemented, skipping A2");
            None
        };

        let dump = Dump {
            a0: bank_a0,
            a2: bank_a2,
        };

        let mismatches: Vec<_> = dump
            .checksums()
            .into_iter()
            .filter(|c| !c.is_valid())
            .collect();
        for m in &mismatches {
            warn!("Checksum mismatch: {}", m);
        }
        if self.config.enforce_checksum && !mismatches.is_empty() {
            return Err(Error::Checksum(mismatches));
        }

        Ok(dump)
    }

    /// Render a previously read dump with the configured flags.
    pub fn print_info<S: Sink>(&self, dump: &Dump, sink: S) -> S {
        let mut decoder = FieldDecoder::new(sink, self.config.flags);
        decoder.render(dump);
        decoder.into_sink()
    }

    /// Read and render in one step. Nothing reaches the sink on failure.
    pub fn show_info<S: Sink>(&mut self, sink: S) -> Result<S> {
        let dump = self.read_info()?;
        Ok(self.print_info(&dump, sink))
    }

    /// Vendor, part number, bitrate, speed class, and optical power.
    ///
    /// Reads only the registers involved. Power values are
    /// [`POWER_UNAVAILABLE`] when the module has no diagnostics.
    pub fn read_brief(&mut self) -> Result<BriefInfo> {
        let br_nominal = self.read_a0_byte(a0::BR_NOMINAL)?;
        let speed_mode = self.speed_mode()?;

        let mut vendor = [0u8; a0_len::VENDOR_NAME];
        self.read(self.config.a0_address, a0::VENDOR_NAME, &mut vendor)?;
        let mut part_number = [0u8; a0_len::VENDOR_PN];
        self.read(self.config.a0_address, a0::VENDOR_PN, &mut part_number)?;

        let mut info = BriefInfo {
            vendor: padded_ascii(&vendor),
            part_number: padded_ascii(&part_number),
            tx_power: POWER_UNAVAILABLE,
            rx_power: POWER_UNAVAILABLE,
            bitrate: br_nominal as u32 * 100,
            speed_mode,
        };

        let dm_type = self.read_a0_byte(a0::DIAGMON_TYPE)?;
        if dm_type & diag_mon_type::DDM == 0 {
            debug!("No diagnostics, brief info without power");
            return Ok(info);
        }

        let tx_raw = self.read_a2_word(a2::DIAGNOSTICS_TXPOWER)?;
        let rx_raw = self.read_a2_word(a2::DIAGNOSTICS_RXPOWER)?;

        let cal = if dm_type & diag_mon_type::EXTERNAL_CAL != 0 {
            let mut block = [0u8; a2_len::EXT_CAL_CONSTANTS];
            self.read(self.config.a2_address, a2::EXT_CAL_CONSTANTS, &mut block)?;
            Some(Calibration::from_bytes(&block))
        } else {
            None
        };

        info.tx_power = Quantity::TxPower.calibrate(tx_raw, cal.as_ref());
        info.rx_power = Quantity::RxPower.calibrate(rx_raw, cal.as_ref());
        Ok(info)
    }

    /// Speed class from the nominal bitrate, falling back to Ethernet
    /// compliance codes when the bitrate does not decide it.
    pub fn speed_mode(&mut self) -> Result<SpeedMode> {
        let br_nominal = self.read_a0_byte(a0::BR_NOMINAL)?;
        let mode = SpeedMode::from_nominal(br_nominal);
        if mode != SpeedMode::Unknown {
            return Ok(mode);
        }

        let mut codes = [0u8; a0_len::TRANSCEIVER];
        self.read(self.config.a0_address, a0::TRANSCEIVER, &mut codes)?;
        Ok(SpeedMode::from_transceiver(&codes))
    }

    /// Whether the module is 1000BASE-T copper Ethernet.
    pub fn is_copper_eth(&mut self) -> Result<bool> {
        let codes = self.read_a0_byte(a0::TRANSCEIVER + 3)?;
        Ok(codes & transceiver::BASE_T_1000 != 0)
    }

    /// Whether the module is a passive direct-attach copper cable.
    pub fn is_direct_attach(&mut self) -> Result<bool> {
        if self.read_a0_byte(a0::CONNECTOR)? != connector::COPPER_PIGTAIL {
            return Ok(false);
        }
        let cable = self.read_a0_byte(a0::TRANSCEIVER + 5)?;
        Ok(cable & transceiver::PASSIVE_CABLE != 0)
    }

    /// Copper cable length in meters.
    pub fn copper_length(&mut self) -> Result<u8> {
        self.read_a0_byte(a0::LENGTH_CABLE)
    }

    fn require_diagnostics(&mut self) -> Result<u8> {
        let dm_type = self.read_a0_byte(a0::DIAGMON_TYPE)?;
        if dm_type & diag_mon_type::DDM == 0 {
            return Err(Error::Unsupported("digital diagnostics not implemented"));
        }
        self.read_a0_byte(a0::ENHANCED_OPTIONS)
    }

    pub fn pin_state(&mut self) -> Result<PinState> {
        self.require_diagnostics()?;
        let status = self.read_a2_byte(a2::STATUS_CONTROL)?;
        let ext_status = self.read_a2_byte(a2::EXT_STATUS_CONTROL)?;
        Ok(PinState::from_registers(status, ext_status))
    }

    /// Set or clear a soft control pin with one read-modify-write.
    ///
    /// Fails with [`Error::Unsupported`] before touching the module when it
    /// does not declare the matching soft control.
    pub fn set_soft_pin(&mut self, pin: SoftPin, on: bool) -> Result<()> {
        let en_options = self.require_diagnostics()?;
        if en_options & pin.capability() == 0 {
            return Err(Error::Unsupported(match pin {
                SoftPin::TxDisable => "soft TX disable not implemented",
                _ => "soft rate select not implemented",
            }));
        }

        let (offset, mask) = pin.register();
        let current = self.read_a2_byte(offset)?;
        let updated = if on { current | mask } else { current & !mask };
        if updated == current {
            trace!("{:?} already {}", pin, if on { "set" } else { "clear" });
            return Ok(());
        }
        info!("Setting {:?} {}", pin, if on { "on" } else { "off" });
        self.write(self.config.a2_address, offset, &[updated])
    }
}
