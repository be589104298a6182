//! Brief module information for programmatic callers.

use serde::Serialize;

use crate::regs::transceiver;

/// Coarse speed class of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpeedMode {
    Unknown,
    #[serde(rename = "1G")]
    Speed1G,
    #[serde(rename = "10G")]
    Speed10G,
    #[serde(rename = "20G")]
    Speed20G,
}

impl SpeedMode {
    /// Classify from the nominal bit rate byte (units of 100 MBd).
    pub fn from_nominal(br_nominal: u8) -> Self {
        match br_nominal {
            0..=9 => SpeedMode::Unknown,
            10..=24 => SpeedMode::Speed1G,
            25..=199 => SpeedMode::Speed10G,
            _ => SpeedMode::Speed20G,
        }
    }

    /// Fall back to Ethernet compliance codes (A0 bytes 3..11).
    pub fn from_transceiver(codes: &[u8; 8]) -> Self {
        if codes[0] & transceiver::TEN_G_ETHERNET_MASK != 0 {
            SpeedMode::Speed10G
        } else if codes[3] & transceiver::ONE_G_ETHERNET_MASK != 0 {
            SpeedMode::Speed1G
        } else {
            SpeedMode::Unknown
        }
    }

    /// Nominal speed in Mbit/s, zero when unknown.
    pub fn mbps(self) -> u32 {
        match self {
            SpeedMode::Unknown => 0,
            SpeedMode::Speed1G => 1000,
            SpeedMode::Speed10G => 10000,
            SpeedMode::Speed20G => 20000,
        }
    }
}

/// Power value reported when the module has no diagnostics.
pub const POWER_UNAVAILABLE: f32 = -1.0;

/// Identity, speed, and optical power of a module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BriefInfo {
    /// Vendor name, trailing padding removed
    pub vendor: String,
    /// Vendor part number, trailing padding removed
    pub part_number: String,
    /// Tx power in mW, or [`POWER_UNAVAILABLE`]
    pub tx_power: f32,
    /// Rx power in mW, or [`POWER_UNAVAILABLE`]
    pub rx_power: f32,
    /// Nominal bit rate in Mbit/s (register value x 100)
    pub bitrate: u32,
    pub speed_mode: SpeedMode,
}

impl BriefInfo {
    pub fn has_power(&self) -> bool {
        self.tx_power != POWER_UNAVAILABLE && self.rx_power != POWER_UNAVAILABLE
    }
}

/// Decode a space-padded ASCII field.
pub fn padded_ascii(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches([' ', '\0'])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, SpeedMode::Unknown)]
    #[test_case(9, SpeedMode::Unknown)]
    #[test_case(10, SpeedMode::Speed1G)]
    #[test_case(13, SpeedMode::Speed1G; "gigabit ethernet")]
    #[test_case(25, SpeedMode::Speed10G; "2500 boundary")]
    #[test_case(103, SpeedMode::Speed10G; "10gbase-r")]
    #[test_case(199, SpeedMode::Speed10G)]
    #[test_case(200, SpeedMode::Speed20G)]
    #[test_case(255, SpeedMode::Speed20G)]
    fn test_speed_from_nominal(br: u8, expected: SpeedMode) {
        assert_eq!(SpeedMode::from_nominal(br), expected);
    }

    #[test]
    fn test_speed_from_transceiver() {
        let mut codes = [0u8; 8];
        assert_eq!(SpeedMode::from_transceiver(&codes), SpeedMode::Unknown);

        codes[3] = 0x01; // 1000BASE-SX
        assert_eq!(SpeedMode::from_transceiver(&codes), SpeedMode::Speed1G);

        codes[0] = 0x10; // 10GBASE-SR wins over the 1G code
        assert_eq!(SpeedMode::from_transceiver(&codes), SpeedMode::Speed10G);

        let codes = [0, 0, 0, 0x80, 0, 0, 0, 0]; // BASE-PX is not a 1G Ethernet code
        assert_eq!(SpeedMode::from_transceiver(&codes), SpeedMode::Unknown);
    }

    #[test_case(SpeedMode::Unknown, 0)]
    #[test_case(SpeedMode::Speed1G, 1000)]
    #[test_case(SpeedMode::Speed10G, 10000)]
    #[test_case(SpeedMode::Speed20G, 20000)]
    fn test_mbps(mode: SpeedMode, expected: u32) {
        assert_eq!(mode.mbps(), expected);
    }

    #[test]
    fn test_padded_ascii() {
        assert_eq!(padded_ascii(b"ACME            "), "ACME");
        assert_eq!(padded_ascii(b"A B\0\0"), "A B");
        assert_eq!(padded_ascii(b""), "");
    }

    #[test]
    fn test_serialized_form() {
        let info = BriefInfo {
            vendor: "ACME".into(),
            part_number: "SFP-10G-SR".into(),
            tx_power: POWER_UNAVAILABLE,
            rx_power: POWER_UNAVAILABLE,
            bitrate: 10300,
            speed_mode: SpeedMode::Speed10G,
        };
        assert!(!info.has_power());
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["speed_mode"], "10G");
        assert_eq!(json["tx_power"], -1.0);
        assert_eq!(json["bitrate"], 10300);
    }
}
