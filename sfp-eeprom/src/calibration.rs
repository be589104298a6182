//! Calibration of the five analog diagnostics.
//!
//! Raw A2 measurements are 16-bit big-endian fixed-point values. Internally
//! calibrated modules report them directly in physical units; externally
//! calibrated modules require the constants stored at A2 56..92.
//!
//! Two formulas here deliberately match deployed tooling rather than the
//! letter of SFF-8472:
//!
//! - External bias current applies the 0.002 mA scale both before and after
//!   the slope/offset correction.
//! - External rx power is `sum(c[0..4]) * p + c[4]`, a linear combination,
//!   not the fourth-order polynomial. The coefficients are read as unsigned
//!   integers, not IEEE-754 floats.

use serde::Serialize;

use crate::regs::a2_len;

/// The analog quantities monitored in A2, in register order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Quantity {
    Temperature,
    Voltage,
    BiasCurrent,
    TxPower,
    RxPower,
}

impl Quantity {
    pub const ALL: [Quantity; 5] = [
        Quantity::Temperature,
        Quantity::Voltage,
        Quantity::BiasCurrent,
        Quantity::TxPower,
        Quantity::RxPower,
    ];

    /// Position in the A2 threshold and real-time blocks.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Quantity::Temperature => "Temperature",
            Quantity::Voltage => "Voltage",
            Quantity::BiasCurrent => "Bias current",
            Quantity::TxPower => "TX power",
            Quantity::RxPower => "RX power",
        }
    }

    /// Unit suffix as rendered in reports (trailing space included).
    pub fn unit(self) -> &'static str {
        match self {
            Quantity::Temperature => "C ",
            Quantity::Voltage => "V ",
            Quantity::BiasCurrent => "mA ",
            Quantity::TxPower | Quantity::RxPower => "mW ",
        }
    }

    /// Convert a raw register value to physical units.
    ///
    /// `cal` selects external calibration; pass `None` for internally
    /// calibrated modules.
    pub fn calibrate(self, raw: u16, cal: Option<&Calibration>) -> f32 {
        match self {
            Quantity::Temperature => {
                let t = temperature_raw(raw);
                match cal {
                    Some(c) => (c.temperature.slope() * t + c.temperature.offset()) / 1000.0,
                    None => t,
                }
            }
            Quantity::Voltage => {
                let v = raw as f32 / 10000.0;
                match cal {
                    Some(c) => (c.voltage.slope() * v + c.voltage.offset()) / 10.0,
                    None => v,
                }
            }
            Quantity::BiasCurrent => {
                let i = raw as f32 * 0.002;
                match cal {
                    Some(c) => (c.bias.slope() * i + c.bias.offset()) * 0.002,
                    None => i,
                }
            }
            Quantity::TxPower => {
                let p = raw as f32 / 10000.0;
                match cal {
                    Some(c) => (c.tx_power.slope() * p + c.tx_power.offset()) / 10.0,
                    None => p,
                }
            }
            Quantity::RxPower => {
                let p = raw as f32 / 10000.0;
                match cal {
                    Some(c) => {
                        let c = c.rx_power_coefficients();
                        c[..4].iter().map(|k| k * p).sum::<f32>() + c[4]
                    }
                    None => p,
                }
            }
        }
    }

    /// Encode a physical value as an internally calibrated raw register.
    ///
    /// Values outside the representable range saturate.
    pub fn encode_internal(self, value: f32) -> u16 {
        match self {
            Quantity::Temperature => {
                let magnitude = (value.abs() * 256.0).round().min(0x7FFF as f32) as u16;
                if value < 0.0 && magnitude != 0 {
                    magnitude | 0x8000
                } else {
                    magnitude
                }
            }
            Quantity::Voltage | Quantity::TxPower | Quantity::RxPower => {
                (value * 10000.0).round().clamp(0.0, u16::MAX as f32) as u16
            }
            Quantity::BiasCurrent => (value / 0.002).round().clamp(0.0, u16::MAX as f32) as u16,
        }
    }
}

// High byte bit 7 is the sign, bits 6..0 the integer part, the low byte
// the fraction in 1/256 steps.
fn temperature_raw(raw: u16) -> f32 {
    let [hi, lo] = raw.to_be_bytes();
    let magnitude = (hi & 0x7F) as f32 + lo as f32 / 256.0;
    if hi & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// A slope/offset correction pair as stored in A2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlopeOffset {
    /// Unsigned fixed point: integer byte, then fraction/256
    pub slope: [u8; 2],
    /// Signed 16-bit integer
    pub offset: [u8; 2],
}

impl SlopeOffset {
    pub fn from_bytes(b: &[u8]) -> Self {
        Self {
            slope: [b[0], b[1]],
            offset: [b[2], b[3]],
        }
    }

    pub fn slope(&self) -> f32 {
        self.slope[0] as f32 + self.slope[1] as f32 / 256.0
    }

    pub fn offset(&self) -> f32 {
        i16::from_be_bytes(self.offset) as f32
    }

    pub fn raw_slope(&self) -> u16 {
        u16::from_be_bytes(self.slope)
    }

    pub fn raw_offset(&self) -> u16 {
        u16::from_be_bytes(self.offset)
    }
}

/// External calibration constants (A2 56..92).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Calibration {
    /// Rx power coefficients 4, 3, 2, 1, 0 in register order
    pub rx_power: [u32; 5],
    pub bias: SlopeOffset,
    pub tx_power: SlopeOffset,
    pub temperature: SlopeOffset,
    pub voltage: SlopeOffset,
}

impl Calibration {
    /// Parse the 36-byte calibration block.
    pub fn from_bytes(b: &[u8; a2_len::EXT_CAL_CONSTANTS]) -> Self {
        let mut rx_power = [0u32; 5];
        for (i, chunk) in b[..20].chunks_exact(4).enumerate() {
            rx_power[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self {
            rx_power,
            bias: SlopeOffset::from_bytes(&b[20..24]),
            tx_power: SlopeOffset::from_bytes(&b[24..28]),
            temperature: SlopeOffset::from_bytes(&b[28..32]),
            voltage: SlopeOffset::from_bytes(&b[32..36]),
        }
    }

    pub fn rx_power_coefficients(&self) -> [f32; 5] {
        self.rx_power.map(|c| c as f32)
    }

    /// Slope/offset pairs in register order, with their report labels.
    pub fn slope_offsets(&self) -> [(&'static str, &SlopeOffset); 4] {
        [
            ("Bias current slope/offset", &self.bias),
            ("Power slope/offset", &self.tx_power),
            ("Temperature slope/offset", &self.temperature),
            ("Voltage slope/offset", &self.voltage),
        ]
    }
}
