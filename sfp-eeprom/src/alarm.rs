//! Alarm and warning evaluation.
//!
//! Thresholds are stored in A2 0..40 as (high, low) pairs: alarm then
//! warning for each quantity. Live severity is not computed by comparing
//! against them. The module latches dedicated flag bits at A2 112..114
//! (alarms) and 116..118 (warnings), and those are what we report.

use std::fmt;

use serde::Serialize;

use crate::calibration::Quantity;
use crate::regs::a2_len;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Alarm,
    Warning,
}

impl Severity {
    /// Marker appended to a live value in reports.
    pub fn marker(self) -> &'static str {
        match self {
            Severity::Alarm => "Alarm!",
            Severity::Warning => "Warning!",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Alarm => write!(f, "alarm"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Raw high/low threshold registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ThresholdPair {
    pub high: u16,
    pub low: u16,
}

/// The A2 threshold table, indexed by quantity and severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    pairs: [[ThresholdPair; 2]; 5],
}

impl Thresholds {
    pub fn from_bytes(b: &[u8; a2_len::AW_THRESHOLDS]) -> Self {
        let mut pairs = [[ThresholdPair::default(); 2]; 5];
        for (k, chunk) in b.chunks_exact(4).enumerate() {
            pairs[k / 2][k % 2] = ThresholdPair {
                high: u16::from_be_bytes([chunk[0], chunk[1]]),
                low: u16::from_be_bytes([chunk[2], chunk[3]]),
            };
        }
        Self { pairs }
    }

    pub fn get(&self, quantity: Quantity, severity: Severity) -> ThresholdPair {
        self.pairs[quantity.index()][severity as usize]
    }

    /// All ten pairs in register order.
    pub fn iter(&self) -> impl Iterator<Item = (Quantity, Severity, ThresholdPair)> + '_ {
        Quantity::ALL.into_iter().flat_map(move |q| {
            [Severity::Alarm, Severity::Warning]
                .into_iter()
                .map(move |s| (q, s, self.get(q, s)))
        })
    }
}

/// Report label for a threshold pair, e.g. "TX power warning".
pub fn threshold_label(quantity: Quantity, severity: Severity) -> String {
    format!("{} {}", quantity.name(), severity)
}

// (byte, high bit, low bit) for the alarm and warning flags of a quantity.
struct FlagBits {
    alarm: (usize, u8, u8),
    warning: (usize, u8, u8),
}

const FLAG_BITS: [FlagBits; 5] = [
    FlagBits {
        alarm: (112, 7, 6),
        warning: (116, 7, 6),
    },
    FlagBits {
        alarm: (112, 5, 4),
        warning: (116, 5, 4),
    },
    FlagBits {
        alarm: (112, 3, 2),
        warning: (116, 3, 2),
    },
    FlagBits {
        alarm: (112, 1, 0),
        warning: (116, 1, 0),
    },
    FlagBits {
        alarm: (113, 7, 6),
        warning: (117, 7, 6),
    },
];

fn either_set(a2: &[u8], (byte, high, low): (usize, u8, u8)) -> bool {
    a2.get(byte)
        .is_some_and(|b| b & (1 << high) != 0 || b & (1 << low) != 0)
}

/// Severity latched for `quantity` in the A2 flag bytes.
///
/// An alarm bit (high or low) takes precedence over a warning bit.
pub fn evaluate(quantity: Quantity, a2: &[u8]) -> Option<Severity> {
    let bits = &FLAG_BITS[quantity.index()];
    if either_set(a2, bits.alarm) {
        Some(Severity::Alarm)
    } else if either_set(a2, bits.warning) {
        Some(Severity::Warning)
    } else {
        None
    }
}
