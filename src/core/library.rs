//! Edit session over every slot of a CHIPnGo SD card

use crate::config::ToolConfig;
use crate::error::{CartError, Result};
use crate::io::SlotDevice;
use crate::layout::{Geometry, MAX_ROM_SIZE};
use crate::record::{CartridgeRecord, RecordOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The decoded records of one device, kept in step with what is on disk
pub struct Library {
    device: SlotDevice,
    geometry: Geometry,
    options: RecordOptions,
    records: Vec<CartridgeRecord>,
}

impl Library {
    /// Open `path` with the default 5x5 grid and load every slot
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        LibraryBuilder::new().path(path.as_ref()).build()
    }

    /// Re-read and decode every slot
    pub fn load(&mut self) -> Result<()> {
        let count = self.geometry.slot_count();
        let mut records = Vec::with_capacity(count);
        for slot in 0..count {
            records.push(self.read_record(slot)?);
        }
        self.records = records;

        debug!(
            "Loaded {} slots from {:?} ({} occupied)",
            count,
            self.device.path(),
            self.occupied().count()
        );
        Ok(())
    }

    pub fn records(&self) -> &[CartridgeRecord] {
        &self.records
    }

    pub fn record(&self, slot: usize) -> Result<&CartridgeRecord> {
        self.geometry.check_slot(slot)?;
        Ok(&self.records[slot])
    }

    /// Slots holding a cartridge
    pub fn occupied(&self) -> impl Iterator<Item = &CartridgeRecord> {
        self.records.iter().filter(|r| r.valid)
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn options(&self) -> &RecordOptions {
        &self.options
    }

    pub fn device_path(&self) -> &Path {
        self.device.path()
    }

    /// Write `record` into `slot`, followed by `rom` when given
    ///
    /// Metadata goes first, then the payload. Nothing is written if the
    /// record fails to encode or the ROM does not fit.
    pub fn save(
        &mut self,
        slot: usize,
        record: &CartridgeRecord,
        rom: Option<&[u8]>,
    ) -> Result<()> {
        self.geometry.check_slot(slot)?;

        if let Some(rom) = rom {
            if rom.len() > MAX_ROM_SIZE {
                return Err(CartError::RomTooLarge {
                    len: rom.len(),
                    max: MAX_ROM_SIZE,
                });
            }
        }

        let metadata = record.encode(&self.options)?;
        self.device.write_metadata(slot, &metadata)?;
        info!("Metadata saved to slot {} ({:?})", slot, record.title);

        if let Some(rom) = rom {
            self.device.write_rom(slot, rom)?;
            info!("ROM data saved to slot {} ({} bytes)", slot, rom.len());
        }

        self.records[slot] = self.read_record(slot)?;
        Ok(())
    }

    /// Like [`Library::save`], reading the ROM from `rom_path` first
    ///
    /// A ROM file that can't be read aborts the save before anything is written.
    pub fn save_from_file<P: AsRef<Path>>(
        &mut self,
        slot: usize,
        record: &CartridgeRecord,
        rom_path: P,
    ) -> Result<()> {
        let rom = std::fs::read(&rom_path)?;
        debug!("Read {} ROM bytes from {:?}", rom.len(), rom_path.as_ref());
        self.save(slot, record, Some(&rom))
    }

    /// Zero the metadata block of `slot` so it reads as empty
    pub fn erase(&mut self, slot: usize) -> Result<()> {
        self.geometry.check_slot(slot)?;
        self.device.erase(slot)?;
        info!("Slot {} erased", slot);

        self.records[slot] = CartridgeRecord::empty(slot);
        Ok(())
    }

    /// Read `len` bytes of the ROM payload stored in `slot`
    pub fn dump_rom(&mut self, slot: usize, len: usize) -> Result<Vec<u8>> {
        self.geometry.check_slot(slot)?;
        self.device.read_rom(slot, len)
    }

    /// Flush device writes to stable storage
    pub fn sync(&mut self) -> Result<()> {
        self.device.sync()
    }

    fn read_record(&mut self, slot: usize) -> Result<CartridgeRecord> {
        let block = self.device.read_metadata_block(slot)?;
        CartridgeRecord::decode(slot, &block)
    }
}

/// Builder for [`Library`]
pub struct LibraryBuilder {
    path: Option<PathBuf>,
    geometry: Geometry,
    options: RecordOptions,
    create: bool,
    read_only: bool,
}

impl LibraryBuilder {
    pub fn new() -> Self {
        LibraryBuilder {
            path: None,
            geometry: Geometry::default(),
            options: RecordOptions::default(),
            create: false,
            read_only: false,
        }
    }

    /// Take device path, layout and record options from a config
    pub fn config(mut self, config: &ToolConfig) -> Self {
        if let Some(device) = &config.device {
            self.path = Some(device.clone());
        }
        self.geometry = config.layout;
        self.options = config.record;
        self
    }

    pub fn path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn options(mut self, options: RecordOptions) -> Self {
        self.options = options;
        self
    }

    /// Create a fresh zero-filled image instead of opening an existing device
    pub fn create_image(mut self) -> Self {
        self.create = true;
        self
    }

    /// Open the device without write access
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Open the device and load every slot
    pub fn build(self) -> Result<Library> {
        let path = self.path.ok_or_else(|| {
            CartError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "device path must be set",
            ))
        })?;

        // Validates deserialized layouts too
        let geometry = Geometry::new(self.geometry.rows, self.geometry.cols)?;

        let device = if self.create {
            SlotDevice::create_image(&path, &geometry)?
        } else if self.read_only {
            SlotDevice::open_read_only(&path)?
        } else {
            SlotDevice::open(&path)?
        };

        info!(
            "Opened {:?} ({}x{} slots, {:?} records)",
            path, geometry.rows, geometry.cols, self.options.format
        );

        let mut library = Library {
            device,
            geometry,
            options: self.options,
            records: Vec::new(),
        };
        library.load()?;
        Ok(library)
    }
}

impl Default for LibraryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
