//! Register access to module memory.
//!
//! The decoder talks to hardware only through [`RegisterAccess`]. A real
//! deployment wraps an I2C adapter; [`DumpImage`] serves both banks from
//! memory, typically loaded from files captured earlier.

use std::fs;
use std::io;
use std::path::Path;

use crate::checksum::{checksum, ChecksumSection};
use crate::regs::{BANK_SIZE, DEFAULT_A0_ADDRESS, DEFAULT_A2_ADDRESS};
use crate::tracing::prelude::*;

/// Byte-level access to the two module banks.
///
/// Implementations fill the whole buffer or fail; a short read is an error.
/// Retry policy, if any, belongs to the implementation.
pub trait RegisterAccess {
    fn read(&mut self, bank: u8, offset: u8, buf: &mut [u8]) -> io::Result<()>;

    fn write(&mut self, bank: u8, offset: u8, data: &[u8]) -> io::Result<()> {
        let _ = (bank, offset, data);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "register writes not supported by this transport",
        ))
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &mut T {
    fn read(&mut self, bank: u8, offset: u8, buf: &mut [u8]) -> io::Result<()> {
        (**self).read(bank, offset, buf)
    }

    fn write(&mut self, bank: u8, offset: u8, data: &[u8]) -> io::Result<()> {
        (**self).write(bank, offset, data)
    }
}

/// In-memory image of a module's A0 and A2 banks.
///
/// A bank may be shorter than 256 bytes (for example an A0-only capture);
/// reads past its end fail with `UnexpectedEof`.
#[derive(Debug, Clone)]
pub struct DumpImage {
    a0: Vec<u8>,
    a2: Vec<u8>,
    a0_address: u8,
    a2_address: u8,
}

impl DumpImage {
    pub fn new(a0: Vec<u8>, a2: Vec<u8>) -> Self {
        Self {
            a0,
            a2,
            a0_address: DEFAULT_A0_ADDRESS,
            a2_address: DEFAULT_A2_ADDRESS,
        }
    }

    /// Split a combined image: A0 first, A2 starting at offset 0x100.
    pub fn from_combined(bytes: &[u8]) -> Self {
        let split = bytes.len().min(BANK_SIZE);
        let (a0, rest) = bytes.split_at(split);
        let a2 = &rest[..rest.len().min(BANK_SIZE)];
        Self::new(a0.to_vec(), a2.to_vec())
    }

    /// Load from one combined file, or from separate A0 and A2 files.
    pub fn load(a0_path: &Path, a2_path: Option<&Path>) -> io::Result<Self> {
        let first = fs::read(a0_path)?;
        debug!(path = %a0_path.display(), len = first.len(), "Loaded image");
        match a2_path {
            None => Ok(Self::from_combined(&first)),
            Some(path) => {
                let second = fs::read(path)?;
                debug!(path = %path.display(), len = second.len(), "Loaded A2 image");
                let mut a0 = first;
                a0.truncate(BANK_SIZE);
                let mut a2 = second;
                a2.truncate(BANK_SIZE);
                Ok(Self::new(a0, a2))
            }
        }
    }

    /// Answer on bus addresses other than the SFF-8472 defaults.
    pub fn with_addresses(mut self, a0_address: u8, a2_address: u8) -> Self {
        self.a0_address = a0_address;
        self.a2_address = a2_address;
        self
    }

    pub fn a0(&self) -> &[u8] {
        &self.a0
    }

    pub fn a2(&self) -> &[u8] {
        &self.a2
    }

    /// Rewrite all three stored check codes to match the current contents.
    ///
    /// Sections that lie beyond the end of a short bank are left alone.
    pub fn update_checksums(&mut self) {
        for section in [ChecksumSection::Base, ChecksumSection::Extended] {
            fix_checksum(&mut self.a0, section);
        }
        fix_checksum(&mut self.a2, ChecksumSection::Diagnostics);
    }

    fn bank_mut(&mut self, bank: u8) -> io::Result<&mut Vec<u8>> {
        if bank == self.a0_address {
            Ok(&mut self.a0)
        } else if bank == self.a2_address {
            Ok(&mut self.a2)
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no bank at address {:#04x}", bank),
            ))
        }
    }
}

fn fix_checksum(bank: &mut [u8], section: ChecksumSection) {
    let at = section.stored_at();
    if at < bank.len() {
        bank[at] = checksum(&bank[section.covered()]);
    }
}

impl RegisterAccess for DumpImage {
    fn read(&mut self, bank: u8, offset: u8, buf: &mut [u8]) -> io::Result<()> {
        let data = self.bank_mut(bank)?;
        let start = offset as usize;
        let end = start + buf.len();
        let src = data.get(start..end).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("image holds {} bytes, read wants {}..{}", data.len(), start, end),
            )
        })?;
        buf.copy_from_slice(src);
        trace!("Image read {:#04x}:{:#04x} len {}", bank, offset, buf.len());
        Ok(())
    }

    fn write(&mut self, bank: u8, offset: u8, data: &[u8]) -> io::Result<()> {
        let image = self.bank_mut(bank)?;
        let start = offset as usize;
        let end = start + data.len();
        if end > BANK_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("write {}..{} runs past the end of the bank", start, end),
            ));
        }
        if image.len() < end {
            image.resize(end, 0);
        }
        image[start..end].copy_from_slice(data);
        trace!("Image write {:#04x}:{:#04x} len {}", bank, offset, data.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_image_routing() {
        let mut bytes = vec![0u8; 512];
        bytes[5] = 0xA0;
        bytes[0x100 + 5] = 0xA2;
        let mut image = DumpImage::from_combined(&bytes);

        let mut buf = [0u8; 1];
        image.read(0x50, 5, &mut buf).unwrap();
        assert_eq!(buf[0], 0xA0);
        image.read(0x51, 5, &mut buf).unwrap();
        assert_eq!(buf[0], 0xA2);
    }

    #[test]
    fn test_short_image_reports_eof() {
        let mut image = DumpImage::from_combined(&[0u8; 256]);
        let mut buf = [0u8; 96];
        image.read(0x50, 0, &mut buf).expect("A0 is present");

        let err = image.read(0x51, 0, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let mut tail = [0u8; 8];
        let err = image.read(0x50, 250, &mut tail).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof, "read past end of bank");
    }

    #[test]
    fn test_unknown_address() {
        let mut image = DumpImage::from_combined(&[0u8; 512]);
        let mut buf = [0u8; 1];
        let err = image.read(0x52, 0, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_custom_addresses() {
        let mut image = DumpImage::new(vec![1; 256], vec![2; 256]).with_addresses(0x10, 0x11);
        let mut buf = [0u8; 1];
        image.read(0x11, 0, &mut buf).unwrap();
        assert_eq!(buf[0], 2);
        assert!(image.read(0x51, 0, &mut buf).is_err());
    }

    #[test]
    fn test_write_then_read() {
        let mut image = DumpImage::new(vec![0; 256], vec![0; 256]);
        image.write(0x51, 110, &[0x40]).unwrap();
        let mut buf = [0u8; 1];
        image.read(0x51, 110, &mut buf).unwrap();
        assert_eq!(buf[0], 0x40);

        let err = image.write(0x51, 250, &[0; 8]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_update_checksums() {
        let mut image = DumpImage::new(vec![1; 256], vec![2; 256]);
        image.update_checksums();
        assert_eq!(image.a0()[63], 63);
        assert_eq!(image.a0()[95], 31);
        assert_eq!(image.a2()[95], (95u32 * 2 % 256) as u8);
    }

    #[test]
    fn test_load_from_files() {
        let dir = std::env::temp_dir().join(format!("sfp-eeprom-load-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let a0_path = dir.join("a0.bin");
        let a2_path = dir.join("a2.bin");
        fs::write(&a0_path, [0xAAu8; 256]).unwrap();
        fs::write(&a2_path, [0xBBu8; 256]).unwrap();

        let mut image = DumpImage::load(&a0_path, Some(&a2_path)).unwrap();
        let mut buf = [0u8; 2];
        image.read(0x50, 0, &mut buf).unwrap();
        assert_eq!(buf, [0xAA, 0xAA]);
        image.read(0x51, 254, &mut buf).unwrap();
        assert_eq!(buf, [0xBB, 0xBB]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
