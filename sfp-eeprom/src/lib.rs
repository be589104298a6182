//! Decoder for SFP/SFP+ transceiver EEPROM banks (SFF-8472).
//!
//! A module exposes two 256-byte banks: A0 (identity and capabilities) and
//! A2 (digital diagnostics). [`Sfp`] reads them through a
//! [`RegisterAccess`] transport, validates checksums, calibrates live
//! measurements and renders the result through a [`Sink`].

pub mod alarm;
pub mod bank;
pub mod brief;
pub mod calibration;
pub mod checksum;
pub mod config;
pub mod decoder;
pub mod eeprom;
pub mod error;
pub mod regs;
pub mod sfp;
pub mod sink;
pub mod tables;
pub mod tracing;

pub use bank::Dump;
pub use brief::{BriefInfo, SpeedMode};
pub use config::{Config, PrintFlags};
pub use eeprom::{DumpImage, RegisterAccess};
pub use error::{Error, Result};
pub use sfp::{PinState, Sfp, SoftPin};
pub use sink::{HtmlSink, Sink, TextSink};
