//! Field decoder.
//!
//! Walks a [`Dump`] in register order and emits one line per field to a
//! [`Sink`], shaped by [`PrintFlags`]. Nothing here can fail: by the time a
//! dump exists every byte it needs has been read.

use crate::alarm::{self, threshold_label};
use crate::bank::{BankA2, BaseFields, Dump, ExtendedFields};
use crate::calibration::{Calibration, Quantity};
use crate::checksum::ChecksumResult;
use crate::config::PrintFlags;
use crate::sink::{Sink, NAME_COLUMN};
use crate::tables::{
    self, BitOptionTable, Code, Connector, Encoding, ExtIdentifier, Identifier, RateIdentifier,
    Sff8472Compliance,
};

/// Length fields in register order: label, unit, and meters (or km) per
/// count.
const LENGTHS: [(&str, &str, u32); 6] = [
    ("Length SM-km", "km", 1),
    ("Length SM-100m", "m", 100),
    ("Length MM (500MHz*km at 850nm)", "m", 10),
    ("Length MM (200 MHz*km-850nm)", "m", 10),
    ("Length Copper", "m", 1),
    ("Length MM (2000 Mhz*km)", "m", 10),
];

const COPPER_LENGTH: usize = 4;

fn indent() -> String {
    " ".repeat(NAME_COLUMN)
}

fn ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b == b' ' || b.is_ascii_graphic() {
                b as char
            } else {
                '.'
            }
        })
        .collect()
}

/// Renders decoded fields to a sink.
pub struct FieldDecoder<S: Sink> {
    sink: S,
    flags: PrintFlags,
}

impl<S: Sink> FieldDecoder<S> {
    pub fn new(sink: S, flags: PrintFlags) -> Self {
        Self { sink, flags }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn has(&self, flag: PrintFlags) -> bool {
        self.flags.contains(flag)
    }

    fn field(&mut self, name: &str, value: &str) {
        self.sink.emit_name(name);
        self.sink.emit_value(value);
        self.sink.emit_newline();
    }

    /// Render every section of the dump.
    pub fn render(&mut self, dump: &Dump) {
        let [base, ext] = dump.a0.checksums();
        self.base_fields(&dump.a0.base);
        self.checksum(&base);
        self.ext_fields(&dump.a0.ext, dump.a0.base.br_nominal);
        self.checksum(&ext);

        if !dump.a0.ext.has_diagnostics() {
            return;
        }
        let Some(a2) = &dump.a2 else {
            return;
        };

        let cal = dump.external_calibration();
        self.thresholds(a2, cal);
        self.calibrations(&a2.calibration);
        self.checksum(&a2.checksum());
        self.diagnostics(a2, &dump.a0.ext, cal);
        self.vendor_areas(a2);
    }

    pub fn base_fields(&mut self, bf: &BaseFields) {
        let laser = !self.has(PrintFlags::LASER_AUTO) || bf.is_laser();

        self.code::<Identifier>("Identifier", bf.identifier);
        self.code::<ExtIdentifier>("Ext. identifier", bf.ext_identifier);
        self.code::<Connector>("Connector", bf.connector);
        self.bit_options(&tables::TRANSCEIVER, &bf.transceiver);
        self.code::<Encoding>("Encoding", bf.encoding);
        self.br_nominal(bf.br_nominal);
        self.code::<RateIdentifier>("Rate identifier", bf.rate_identifier);
        self.lengths(&bf.lengths, laser);
        self.field("Vendor", &ascii(&bf.vendor_name));
        self.field("Vendor PN", &ascii(&bf.vendor_pn));
        self.field("Vendor rev", &ascii(&bf.vendor_rev));
        self.hex_bytes("Vendor OUI", &bf.vendor_oui);
        if laser {
            self.wavelength(bf.wavelength);
        }
    }

    pub fn ext_fields(&mut self, ef: &ExtendedFields, br_nominal: u8) {
        self.bit_options(&tables::OPTIONS, &ef.options);
        self.br_margin("Maximum bitrate", br_nominal, ef.br_max);
        self.br_margin("Minimum bitrate", br_nominal, ef.br_min);
        self.field("Vendor SN", &ascii(&ef.vendor_sn));
        self.date_code(&ef.date_code);
        self.bit_options(&tables::MONITORING_TYPE, &[ef.diag_mon_type]);
        self.bit_options(&tables::ENHANCED_OPTIONS, &[ef.enhanced_options]);
        self.code::<Sff8472Compliance>("SFF-8472 compliance", ef.sff8472_compliance);
    }

    fn checksum(&mut self, result: &ChecksumResult) {
        if !self.has(PrintFlags::CHECKSUMS) {
            return;
        }
        let value = if result.is_valid() {
            format!("{:02X}", result.stored)
        } else {
            format!("{:02X} (Expected: {:02X})", result.stored, result.computed)
        };
        self.field(result.section.label(), &value);
    }

    fn code<T: Code>(&mut self, name: &str, raw: u8) {
        let text = match T::describe(raw) {
            Some(text) => text,
            None if self.has(PrintFlags::PRINT_UNKNOWN) => "Unknown".to_string(),
            None => return,
        };
        self.sink.emit_name(name);
        self.sink.emit_value(&text);
        if self.has(PrintFlags::HEX_OUTPUT) {
            self.sink.emit_value(&format!(" ({:02x})", raw));
        }
        self.sink.emit_newline();
    }

    /// Render a bit-option table over `window`, which starts at the table's
    /// base byte.
    fn bit_options(&mut self, table: &BitOptionTable, window: &[u8]) {
        if !self.has(PrintFlags::BIT_OPTIONS) {
            return;
        }
        let long = self.has(PrintFlags::LONG_OPT);

        self.sink.emit_name(table.name);
        if long {
            self.sink.emit_newline();
        }

        for option in table.decode(window) {
            if long {
                self.sink.emit_value(&indent());
                if option.long_name.is_empty() {
                    self.sink.emit_value(&format!("({}/{})", option.byte, option.bit));
                } else {
                    self.sink.emit_value(option.long_name);
                }
                self.sink.emit_newline();
            } else if !option.short_name.is_empty() {
                self.sink.emit_value(&format!("{} ", option.short_name));
            }
        }

        if self.has(PrintFlags::HEX_OUTPUT) {
            let span = table.span();
            let bytes = window.get(span).unwrap_or_default();
            let pad = if long { indent() } else { " ".to_string() };
            self.sink.emit_value(&pad);
            self.sink.emit_value(&format!("({})", hex::encode_upper(bytes)));
            self.sink.emit_newline();
        } else if !long {
            self.sink.emit_newline();
        }
    }

    fn br_nominal(&mut self, raw: u8) {
        self.sink.emit_name("Bit rate nominal");
        self.sink.emit_value(&format!("{} MBits/s", raw as u32 * 100));
        if self.has(PrintFlags::HEX_OUTPUT) {
            self.sink.emit_value(&format!(" ({:02X})", raw));
        }
        self.sink.emit_newline();
    }

    // Margin above or below nominal, in Mbit/s.
    fn br_margin(&mut self, name: &str, br_nominal: u8, percent: u8) {
        if percent == 0 && !self.has(PrintFlags::PRINT_UNKNOWN) {
            return;
        }
        self.sink.emit_name(name);
        self.sink.emit_value(&format!("{} Mbits/s", br_nominal as u32 * percent as u32));
        if self.has(PrintFlags::HEX_OUTPUT) {
            self.sink.emit_value(&format!(" ({:02X})", percent));
        }
        self.sink.emit_newline();
    }

    fn lengths(&mut self, lengths: &[u8; 6], laser: bool) {
        for (i, (&raw, (name, unit, scale))) in lengths.iter().zip(LENGTHS).enumerate() {
            if raw == 0 && !self.has(PrintFlags::PRINT_UNKNOWN) {
                continue;
            }
            if self.has(PrintFlags::LASER_AUTO) && laser == (i == COPPER_LENGTH) {
                continue;
            }
            self.sink.emit_name(name);
            self.sink.emit_value(&format!("{} {}", raw as u32 * scale, unit));
            if self.has(PrintFlags::HEX_OUTPUT) {
                self.sink.emit_value(&format!(" ({:02X})", raw));
            }
            self.sink.emit_newline();
        }
    }

    fn wavelength(&mut self, nm: u16) {
        if nm == 0 && !self.has(PrintFlags::PRINT_UNKNOWN) {
            return;
        }
        self.sink.emit_name("Laser wave length ");
        self.sink.emit_value(&format!("{} nm", nm));
        if self.has(PrintFlags::HEX_OUTPUT) {
            self.sink.emit_value(&format!(" ({:04X})", nm));
        }
        self.sink.emit_newline();
    }

    fn date_code(&mut self, d: &[u8; 8]) {
        let c = ascii(d);
        let c: Vec<char> = c.chars().collect();
        self.field(
            "Date code",
            &format!(
                "{}{}.{}{}.{}{} {}{}",
                c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]
            ),
        );
    }

    fn hex_bytes(&mut self, name: &str, bytes: &[u8]) {
        let text: String = bytes.iter().map(|b| format!("{:02X} ", b)).collect();
        self.field(name, &text);
    }

    // 16 bytes per row, continuation rows indented under the value column.
    fn hex_rows(&mut self, name: &str, bytes: &[u8]) {
        self.sink.emit_name(name);
        for (i, row) in bytes.chunks(16).enumerate() {
            if i > 0 {
                self.sink.emit_value(&indent());
            }
            let text: String = row.iter().map(|b| format!("{:02X} ", b)).collect();
            self.sink.emit_value(&text);
            self.sink.emit_newline();
        }
    }

    fn thresholds(&mut self, a2: &BankA2, cal: Option<&Calibration>) {
        if !self.has(PrintFlags::THRESHOLDS) {
            return;
        }
        for (quantity, severity, pair) in a2.thresholds.iter() {
            self.sink.emit_name(&threshold_label(quantity, severity));
            self.sink.emit_value(&format!(
                "{:.3} - {:.3} {}",
                quantity.calibrate(pair.low, cal),
                quantity.calibrate(pair.high, cal),
                quantity.unit()
            ));
            if self.has(PrintFlags::HEX_OUTPUT) {
                self.sink.emit_value(&format!("({:04X} {:04X})", pair.high, pair.low));
            }
            self.sink.emit_newline();
        }
    }

    fn calibrations(&mut self, cal: &Calibration) {
        if !self.has(PrintFlags::CALIBRATIONS) {
            return;
        }

        self.sink.emit_name("RX_PWR 4/3/2/1/0");
        let values: Vec<String> = cal
            .rx_power_coefficients()
            .iter()
            .map(|c| format!("{:.2}", c))
            .collect();
        self.sink.emit_value(&values.join("/"));
        if self.has(PrintFlags::HEX_OUTPUT) {
            self.sink.emit_newline();
            let raw: Vec<String> = cal.rx_power.iter().map(|c| format!("{:08X}", c)).collect();
            self.sink.emit_value(&indent());
            self.sink.emit_value(&format!("({})", raw.join("/")));
        }
        self.sink.emit_newline();

        for (name, so) in cal.slope_offsets() {
            self.sink.emit_name(name);
            self.sink.emit_value(&format!("{:.4} / {:.0}", so.slope(), so.offset()));
            if self.has(PrintFlags::HEX_OUTPUT) {
                self.sink.emit_value(&format!(" ({:04X} {:04X})", so.raw_slope(), so.raw_offset()));
            }
            self.sink.emit_newline();
        }
    }

    fn diagnostics(&mut self, a2: &BankA2, ef: &ExtendedFields, cal: Option<&Calibration>) {
        let flags_implemented = ef.has_alarm_flags();
        for quantity in Quantity::ALL {
            let raw = a2.diagnostics.raw(quantity);
            self.sink.emit_name(quantity.name());
            self.sink.emit_value(&format!(
                "{:.3} {}",
                quantity.calibrate(raw, cal),
                quantity.unit()
            ));
            if self.has(PrintFlags::HEX_OUTPUT) {
                self.sink.emit_value(&format!("({:04X})", raw));
            }
            if flags_implemented {
                if let Some(severity) = alarm::evaluate(quantity, a2.raw()) {
                    self.sink.emit_value(severity.marker());
                }
            }
            self.sink.emit_newline();
        }

        let table = &tables::STATUS_CONTROL;
        self.bit_options(table, table.window(a2.raw()));
    }

    fn vendor_areas(&mut self, a2: &BankA2) {
        if !self.has(PrintFlags::VENDOR) {
            return;
        }
        self.hex_rows("Vendor Specific", a2.vendor_specific());
        self.hex_rows("User EEPROM", a2.user_eeprom());
        self.hex_rows("Vendor Control", a2.vendor_control());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::{BankA0, BankA2};
    use crate::checksum::checksum;
    use crate::sink::TextSink;

    fn line(name: &str, value: &str) -> String {
        format!("{:<32} : {}\n", name, value)
    }

    fn a0_bytes(connector: u8) -> [u8; 96] {
        let mut b = [0u8; 96];
        b[0] = 0x03;
        b[1] = 0x04;
        b[2] = connector;
        b[11] = 0x06;
        b[12] = 0x67;
        b[14..20].copy_from_slice(&[10, 20, 30, 40, 5, 60]);
        b[20..36].copy_from_slice(b"ACME CORP       ");
        b[37..40].copy_from_slice(&[0x00, 0x90, 0x65]);
        b[40..56].copy_from_slice(b"SFP-10G-SR      ");
        b[56..60].copy_from_slice(b"A1  ");
        b[60..62].copy_from_slice(&850u16.to_be_bytes());
        b[63] = checksum(&b[..63]);
        b[64..66].copy_from_slice(&[0x01, 0x22]);
        b[66] = 5;
        b[68..84].copy_from_slice(b"SN0001          ");
        b[84..92].copy_from_slice(b"24031501");
        b[94] = 0x05;
        b[95] = checksum(&b[64..95]);
        b
    }

    fn render(dump: &Dump, flags: PrintFlags) -> String {
        let mut decoder = FieldDecoder::new(TextSink::new(), flags);
        decoder.render(dump);
        decoder.into_sink().into_string()
    }

    fn a0_only(raw: [u8; 96]) -> Dump {
        Dump {
            a0: BankA0::from_bytes(&raw),
            a2: None,
        }
    }

    #[test]
    fn test_default_listing() {
        let out = render(&a0_only(a0_bytes(0x07)), PrintFlags::LONG_OPT);
        assert!(out.starts_with(&line("Identifier", "SFP or SFP+")));
        assert!(out.contains(&line("Connector", "LC")));
        assert!(out.contains(&line("Encoding", "64B/66B")));
        assert!(out.contains(&line("Bit rate nominal", "10300 MBits/s")));
        assert!(out.contains(&line("Length SM-100m", "2000 m")));
        assert!(out.contains(&line("Vendor", "ACME CORP       ")));
        assert!(out.contains(&line("Vendor OUI", "00 90 65 ")));
        assert!(out.contains(&line("Laser wave length ", "850 nm")));
        assert!(out.contains(&line("Maximum bitrate", "515 Mbits/s")));
        assert!(!out.contains("Minimum bitrate"), "zero margin is hidden");
        assert!(out.contains(&line("Date code", "24.03.15 01")));
        assert!(out.contains(&line("SFF-8472 compliance", "Rev 11.0")));
        assert!(!out.contains("Rate identifier"), "unknown code is hidden");
        assert!(!out.contains("Options"), "bit options are off by default");
        assert!(!out.contains("Checksum"));
    }

    #[test]
    fn test_unknown_and_hex() {
        let flags = PrintFlags::LONG_OPT | PrintFlags::PRINT_UNKNOWN | PrintFlags::HEX_OUTPUT;
        let out = render(&a0_only(a0_bytes(0x07)), flags);
        assert!(out.contains(&line("Rate identifier", "Unknown (00)")));
        assert!(out.contains(&line("Identifier", "SFP or SFP+ (03)")));
        assert!(out.contains(&line("Minimum bitrate", "0 Mbits/s (00)")));
        assert!(out.contains(&line("Laser wave length ", "850 nm (0352)")));
    }

    #[test]
    fn test_laser_auto_copper_module() {
        let flags = PrintFlags::LONG_OPT | PrintFlags::LASER_AUTO;
        let out = render(&a0_only(a0_bytes(0x21)), flags);
        assert!(out.contains(&line("Length Copper", "5 m")));
        for hidden in ["Length SM-km", "Length SM-100m", "Length MM", "Laser wave length"] {
            assert!(!out.contains(hidden), "{} should be suppressed for copper", hidden);
        }
    }

    #[test]
    fn test_laser_auto_optical_module() {
        let flags = PrintFlags::LONG_OPT | PrintFlags::LASER_AUTO;
        let out = render(&a0_only(a0_bytes(0x07)), flags);
        assert!(out.contains(&line("Laser wave length ", "850 nm")));
        assert!(out.contains(&line("Length SM-km", "10 km")));
        assert!(!out.contains("Length Copper"));
    }

    #[test]
    fn test_without_laser_auto_everything_shows() {
        let out = render(&a0_only(a0_bytes(0x21)), PrintFlags::LONG_OPT);
        assert!(out.contains("Length Copper"));
        assert!(out.contains("Length SM-km"));
        assert!(out.contains("Laser wave length"));
    }

    #[test]
    fn test_bit_options_short_form() {
        let out = render(&a0_only(a0_bytes(0x07)), PrintFlags::BIT_OPTIONS);
        assert!(out.contains(&line("Options", "LRO RS LS ")));
        assert!(out.contains(&line("Monitoring type", "")));
    }

    #[test]
    fn test_bit_options_long_form_with_hex() {
        let mut raw = a0_bytes(0x07);
        raw[4] = 0x80; // unnamed transceiver bit
        raw[6] = 0x01; // 1000BASE-SX
        let flags = PrintFlags::LONG_OPT | PrintFlags::BIT_OPTIONS | PrintFlags::HEX_OUTPUT;
        let out = render(&a0_only(raw), flags);
        let pad = " ".repeat(35);
        let expected = format!(
            "{}{pad}(4/7)\n{pad}1000BASE-SX\n{pad}(0080000100000000)\n",
            line("Transeiver", ""),
        );
        assert!(out.contains(&expected), "got:\n{}", out);
    }

    #[test]
    fn test_checksum_lines() {
        let mut raw = a0_bytes(0x07);
        let good = raw[63];
        raw[63] = good.wrapping_add(1);
        let out = render(&a0_only(raw), PrintFlags::CHECKSUMS);
        assert!(out.contains(&line(
            "Checksum base",
            &format!("{:02X} (Expected: {:02X})", good.wrapping_add(1), good)
        )));
        assert!(out.contains(&line("Checksum ext", &format!("{:02X}", raw[95]))));
        assert!(!out.contains("Checksum dmi"));
    }

    fn ddm_dump(en_options: u8) -> Dump {
        let mut raw = a0_bytes(0x07);
        raw[92] = 0x60; // DDM, internally calibrated
        raw[93] = en_options;
        let mut a2 = [0u8; 256];
        a2[0..4].copy_from_slice(&[0x50, 0x00, 0xF6, 0x00]); // 80 C / -118 C
        a2[96..98].copy_from_slice(&[0x19, 0x80]);
        a2[98..100].copy_from_slice(&33000u16.to_be_bytes());
        a2[100..102].copy_from_slice(&3000u16.to_be_bytes());
        a2[102..104].copy_from_slice(&5000u16.to_be_bytes());
        a2[104..106].copy_from_slice(&4000u16.to_be_bytes());
        a2[110] = 0x80;
        a2[112] = 0x20; // voltage high alarm
        a2[117] = 0x40; // rx low warning
        a2[95] = checksum(&a2[..95]);
        Dump {
            a0: BankA0::from_bytes(&raw),
            a2: Some(BankA2::from_bytes(&a2)),
        }
    }

    #[test]
    fn test_live_values_and_severity() {
        let out = render(&ddm_dump(0x80), PrintFlags::LONG_OPT);
        assert!(out.contains(&line("Temperature", "25.500 C ")));
        assert!(out.contains(&line("Voltage", "3.300 V Alarm!")));
        assert!(out.contains(&line("Bias current", "6.000 mA ")));
        assert!(out.contains(&line("TX power", "0.500 mW ")));
        assert!(out.contains(&line("RX power", "0.400 mW Warning!")));
    }

    #[test]
    fn test_severity_requires_enhanced_option() {
        let out = render(&ddm_dump(0x00), PrintFlags::LONG_OPT);
        assert!(out.contains(&line("Voltage", "3.300 V ")));
        assert!(!out.contains("Alarm!"));
        assert!(!out.contains("Warning!"));
    }

    #[test]
    fn test_thresholds_and_checksum_dmi() {
        let flags = PrintFlags::THRESHOLDS | PrintFlags::CHECKSUMS | PrintFlags::HEX_OUTPUT;
        let dump = ddm_dump(0x80);
        let out = render(&dump, flags);
        assert!(out.contains(&line("Temperature alarm", "-118.000 - 80.000 C (5000 F600)")));
        assert!(out.contains(&line("RX power warning", "0.000 - 0.000 mW (0000 0000)")));
        let cc = dump.a2.as_ref().map(|a2| a2.cc_dmi).unwrap_or_default();
        assert!(out.contains(&line("Checksum dmi", &format!("{:02X}", cc))));
    }

    #[test]
    fn test_calibration_section() {
        let mut dump = ddm_dump(0x80);
        if let Some(a2) = dump.a2.as_mut() {
            a2.calibration.rx_power = [0, 0, 0, 1, 0];
            a2.calibration.bias.slope = [1, 0];
            a2.calibration.bias.offset = (-3i16).to_be_bytes();
        }
        let flags = PrintFlags::CALIBRATIONS | PrintFlags::HEX_OUTPUT;
        let out = render(&dump, flags);
        let expected = format!(
            "{}{}(00000000/00000000/00000000/00000001/00000000)\n",
            line("RX_PWR 4/3/2/1/0", "0.00/0.00/0.00/1.00/0.00"),
            " ".repeat(35)
        );
        assert!(out.contains(&expected), "got:\n{}", out);
        assert!(out.contains(&line("Bias current slope/offset", "1.0000 / -3 (0100 FFFD)")));
        assert!(out.contains(&line("Voltage slope/offset", "0.0000 / 0 (0000 0000)")));
    }

    #[test]
    fn test_status_control_and_vendor_rows() {
        let flags = PrintFlags::BIT_OPTIONS | PrintFlags::VENDOR;
        let out = render(&ddm_dump(0x80), flags);
        assert!(out.contains(&line("Status/Control", "TXD ")));

        let user = out
            .lines()
            .skip_while(|l| !l.starts_with("User EEPROM"))
            .take_while(|l| !l.starts_with("Vendor Control"))
            .count();
        assert_eq!(user, 8, "120 bytes render as 8 rows of up to 16");
        assert!(out.contains(&line("Vendor Specific", &"00 ".repeat(8))));
    }

    #[test]
    fn test_diagnostics_gated_by_a0() {
        let mut dump = ddm_dump(0x80);
        dump.a0 = BankA0::from_bytes(&a0_bytes(0x07));
        let out = render(&dump, PrintFlags::VERBOSE | PrintFlags::VENDOR);
        assert!(!out.contains("Temperature"));
        assert!(!out.contains("Checksum dmi"));
        assert!(!out.contains("User EEPROM"));
    }
}
