//! Common error types for sfp-eeprom.
//!
//! This module provides a centralized Error enum using thiserror. Every
//! decode entry point returns one of these categories; nothing in the
//! table-driven decoding path fails on its own.

use thiserror::Error;

use crate::checksum::ChecksumMismatch;

/// Main error type for sfp-eeprom operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Register read or write failed, or returned fewer bytes than requested
    #[error("I/O error on {len} bytes at {bank:#04x}:{offset:#04x}: {source}")]
    Io {
        bank: u8,
        offset: u8,
        len: usize,
        #[source]
        source: std::io::Error,
    },

    /// One or more stored checksums disagree with the computed value
    #[error("checksum mismatch: {}", describe_mismatches(.0))]
    Checksum(Vec<ChecksumMismatch>),

    /// The module does not declare the capability needed for the operation
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

fn describe_mismatches(mismatches: &[ChecksumMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
