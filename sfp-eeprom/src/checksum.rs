//! SFF-8472 check codes.
//!
//! Each check code is the low 8 bits of the sum of the bytes it covers.
//! Three independent codes exist: base ID fields, extended ID fields, and
//! the A2 threshold/calibration region.

use std::fmt;

use serde::Serialize;

use crate::regs::{a0, a2};

/// Compute a check code: sum of all bytes modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// A checksummed region of the module memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChecksumSection {
    /// A0 bytes 0..63, stored at 63
    Base,
    /// A0 bytes 64..95, stored at 95
    Extended,
    /// A2 bytes 0..95, stored at 95
    Diagnostics,
}

impl ChecksumSection {
    /// Byte range covered by the check code, within its bank.
    pub fn covered(self) -> std::ops::Range<usize> {
        match self {
            ChecksumSection::Base => 0..a0::CC_BASE as usize,
            ChecksumSection::Extended => a0::OPTIONS as usize..a0::CC_EXT as usize,
            ChecksumSection::Diagnostics => 0..a2::CC_DMI as usize,
        }
    }

    /// Offset of the stored check code, within its bank.
    pub fn stored_at(self) -> usize {
        match self {
            ChecksumSection::Base => a0::CC_BASE as usize,
            ChecksumSection::Extended => a0::CC_EXT as usize,
            ChecksumSection::Diagnostics => a2::CC_DMI as usize,
        }
    }

    /// Label used in rendered reports.
    pub fn label(self) -> &'static str {
        match self {
            ChecksumSection::Base => "Checksum base",
            ChecksumSection::Extended => "Checksum ext",
            ChecksumSection::Diagnostics => "Checksum dmi",
        }
    }
}

/// Stored and computed check codes for one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecksumResult {
    pub section: ChecksumSection,
    pub stored: u8,
    pub computed: u8,
}

impl ChecksumResult {
    /// Evaluate `section` against the bank bytes it lives in.
    pub fn evaluate(section: ChecksumSection, bank: &[u8]) -> Self {
        Self {
            section,
            stored: bank[section.stored_at()],
            computed: checksum(&bank[section.covered()]),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.stored == self.computed
    }
}

/// A section whose stored check code is wrong.
pub type ChecksumMismatch = ChecksumResult;

impl fmt::Display for ChecksumResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} stored {:02X}, computed {:02X}",
            self.section, self.stored, self.computed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0x01, 0x02, 0x03]), 0x06);
        assert_eq!(checksum(&[0xFF, 0x01]), 0x00, "sum must wrap at 256");
        assert_eq!(checksum(&[0x80; 4]), 0x00);
    }

    #[test]
    fn test_section_ranges() {
        assert_eq!(ChecksumSection::Base.covered(), 0..63);
        assert_eq!(ChecksumSection::Extended.covered(), 64..95);
        assert_eq!(ChecksumSection::Diagnostics.covered(), 0..95);
        assert_eq!(ChecksumSection::Base.stored_at(), 63);
        assert_eq!(ChecksumSection::Extended.stored_at(), 95);
        assert_eq!(ChecksumSection::Diagnostics.stored_at(), 95);
    }

    #[test]
    fn test_evaluate_detects_mismatch() {
        let mut bank = [0u8; 96];
        bank[0] = 0x03;
        bank[20] = 0x41;
        bank[63] = 0x44;
        let result = ChecksumResult::evaluate(ChecksumSection::Base, &bank);
        assert!(result.is_valid());

        bank[63] = 0x45;
        let result = ChecksumResult::evaluate(ChecksumSection::Base, &bank);
        assert!(!result.is_valid());
        assert_eq!(result.to_string(), "Base stored 45, computed 44");
    }

    proptest! {
        #[test]
        fn checksum_is_sum_mod_256(bytes in proptest::collection::vec(any::<u8>(), 0..300)) {
            let expected = (bytes.iter().map(|&b| b as u32).sum::<u32>() % 256) as u8;
            prop_assert_eq!(checksum(&bytes), expected);
        }

        #[test]
        fn checksum_is_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..300)) {
            prop_assert_eq!(checksum(&bytes), checksum(&bytes.clone()));
        }

        #[test]
        fn single_byte_change_changes_checksum(
            bytes in proptest::collection::vec(any::<u8>(), 1..128),
            index in any::<prop::sample::Index>(),
            replacement in any::<u8>(),
        ) {
            let i = index.index(bytes.len());
            let mut mutated = bytes.clone();
            mutated[i] = replacement;
            if replacement == bytes[i] {
                prop_assert_eq!(checksum(&mutated), checksum(&bytes));
            } else {
                prop_assert_ne!(checksum(&mutated), checksum(&bytes));
            }
        }
    }
}
