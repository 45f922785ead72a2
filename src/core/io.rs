//! Block-level I/O on an SD card or disk image

use crate::error::{CartError, Result};
use crate::layout::{self, Geometry, BLOCK_SIZE, MAX_ROM_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Open handle on the device holding the cartridge slots
///
/// The handle is owned for the lifetime of the value and closed on drop.
pub struct SlotDevice {
    file: File,
    path: PathBuf,
}

impl SlotDevice {
    /// Open an existing device or image for reading and writing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        Ok(SlotDevice {
            file,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Open a device for reading only; writes will fail with an I/O error
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(&path)?;

        Ok(SlotDevice {
            file,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Create a zero-filled image large enough for every slot of `geometry`
    pub fn create_image<P: AsRef<Path>>(path: P, geometry: &Geometry) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        file.set_len(geometry.device_size())?;

        debug!(
            "Created {}-slot image at {:?}",
            geometry.slot_count(),
            path.as_ref()
        );

        Ok(SlotDevice {
            file,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Read the metadata block of `slot`
    ///
    /// Bytes past the end of the device read as zero, so a short image
    /// yields empty slots rather than an error.
    pub fn read_metadata_block(&mut self, slot: usize) -> Result<[u8; BLOCK_SIZE]> {
        let mut block = [0u8; BLOCK_SIZE];
        let read = self.read_at(layout::metadata_offset(slot), &mut block)?;
        if read < BLOCK_SIZE {
            warn!(
                "Short read of slot {} metadata ({} of {} bytes)",
                slot, read, BLOCK_SIZE
            );
        }
        Ok(block)
    }

    /// Write an encoded record prefix over the metadata block of `slot`
    pub fn write_metadata(&mut self, slot: usize, prefix: &[u8]) -> Result<()> {
        if prefix.len() > BLOCK_SIZE {
            return Err(CartError::InvalidBlockLength {
                expected: BLOCK_SIZE,
                actual: prefix.len(),
            });
        }

        self.write_at(layout::metadata_offset(slot), prefix)?;
        debug!("Wrote {} metadata bytes to slot {}", prefix.len(), slot);
        Ok(())
    }

    /// Write ROM bytes into the payload area of `slot`
    pub fn write_rom(&mut self, slot: usize, rom: &[u8]) -> Result<()> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(CartError::RomTooLarge {
                len: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }

        self.write_at(layout::rom_offset(slot), rom)?;
        debug!("Wrote {} ROM bytes to slot {}", rom.len(), slot);
        Ok(())
    }

    /// Read `len` bytes of the payload area of `slot`
    pub fn read_rom(&mut self, slot: usize, len: usize) -> Result<Vec<u8>> {
        if len > MAX_ROM_SIZE {
            return Err(CartError::RomTooLarge {
                len,
                max: MAX_ROM_SIZE,
            });
        }

        let mut buffer = vec![0u8; len];
        self.read_at(layout::rom_offset(slot), &mut buffer)?;
        Ok(buffer)
    }

    /// Zero the metadata block of `slot`; the ROM payload is left in place
    pub fn erase(&mut self, slot: usize) -> Result<()> {
        self.write_at(layout::metadata_offset(slot), &[0u8; BLOCK_SIZE])?;
        debug!("Zeroed metadata block of slot {}", slot);
        Ok(())
    }

    /// Get device path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sync all writes to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        self.file.flush()?;
        Ok(())
    }

    /// Fill `buffer` from `offset`, stopping early at end of file
    fn read_at(&mut self, offset: u64, buffer: &mut [u8]) -> Result<usize> {
        self.file.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buffer.len() {
            match self.file.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}
