//! # chipngo-cart - CHIPnGo cartridge editing
//!
//! The CHIPnGo console boots CHIP-8 games from an SD card split into fixed
//! 4KB slots. Each slot starts with a 512-byte metadata record (title, clock
//! rates, interpreter quirks and button maps) followed by the ROM itself.
//! `chipngo-cart` reads and writes those slots on a raw device or image file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chipngo_cart::{CartridgeRecord, Library, Quirk, Result};
//!
//! # fn main() -> Result<()> {
//! let mut library = Library::open("/dev/sda")?;
//!
//! for record in library.occupied() {
//!     println!("{:>2}: {}", record.slot, record.title);
//! }
//!
//! let mut record = CartridgeRecord::new(3, "OCTOPEG");
//! record.quirks.set(Quirk::NoSpriteWrap, true);
//! record.a = "5,6".parse()?;
//! library.save_from_file(3, &record, "octopeg.ch8")?;
//!
//! library.erase(7)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Record formats
//!
//! Two record variants exist on real cards. [`RecordFormat::Legacy`] stores an
//! 11-byte title followed by 16 user flag bytes. [`RecordFormat::Sentinel`]
//! stores at most 10 title bytes and ends the button maps with `0xDEADBEEF`.
//! The decoder reads both; the format only selects what gets written, and
//! [`CartridgeRecord::complete`] reports whether the trailer was found.

// Core implementation
pub mod core;

// Re-export core modules internally so crate:: paths in core still work
#[allow(unused_imports)]
pub(crate) use self::core::{bits, config, display, error, font, io, layout, library, record};

pub use crate::core::{
    bits::{pack_bits, unpack_bits, ButtonMap, Quirk, Quirks, NUM_KEYS, NUM_QUIRKS},
    config::ToolConfig,
    display::DisplayFrame,
    error::{CartError, Result},
    font::Glyph,
    io::SlotDevice,
    layout::{metadata_offset, rom_offset, Geometry, BLOCK_SIZE, MAX_ROM_SIZE, SLOT_SIZE},
    library::{Library, LibraryBuilder},
    record::{CartridgeRecord, RecordFormat, RecordOptions, TitlePolicy, START_BYTE, TRAILER},
};

use serde::{Deserialize, Serialize};

/// Flat, serializable view of one slot
///
/// # Examples
///
/// ```rust,no_run
/// use chipngo_cart::{Library, SlotSummary};
///
/// # fn main() -> chipngo_cart::Result<()> {
/// let library = Library::open("card.img")?;
/// let summaries: Vec<SlotSummary> = library.records().iter().map(SlotSummary::from).collect();
/// println!("{}", serde_json::to_string_pretty(&summaries).unwrap());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotSummary {
    pub slot: usize,
    pub valid: bool,
    pub complete: bool,
    pub title: String,
    pub cpu_freq: u32,
    pub timer_freq: u8,
    pub display_freq: u8,

    /// Names of enabled quirks
    pub quirks: Vec<String>,

    /// Mapped keys per button, e.g. `"7,8"`
    pub left: String,
    pub right: String,
    pub up: String,
    pub down: String,
    pub a: String,
    pub b: String,
}

impl From<&CartridgeRecord> for SlotSummary {
    fn from(record: &CartridgeRecord) -> Self {
        SlotSummary {
            slot: record.slot,
            valid: record.valid,
            complete: record.complete,
            title: record.title.clone(),
            cpu_freq: record.cpu_freq,
            timer_freq: record.timer_freq,
            display_freq: record.display_freq,
            quirks: record.quirks.enabled().map(|q| q.name().to_string()).collect(),
            left: record.left.to_string(),
            right: record.right.to_string(),
            up: record.up.to_string(),
            down: record.down.to_string(),
            a: record.a.to_string(),
            b: record.b.to_string(),
        }
    }
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_empty_slot() {
        let summary = SlotSummary::from(&CartridgeRecord::empty(12));
        assert_eq!(summary.slot, 12);
        assert!(!summary.valid);
        assert_eq!(summary.title, "Empty");
        assert!(summary.quirks.is_empty());
        assert_eq!(summary.left, "7");
        assert_eq!(summary.right, "9");
        assert_eq!(summary.up, "5");
        assert_eq!(summary.down, "8");
        assert_eq!(summary.a, "6");
    }

    #[test]
    fn test_summary_json() {
        let mut record = CartridgeRecord::new(0, "BLINKY");
        record.quirks.set(Quirk::JumpBug, true);
        let json = serde_json::to_value(SlotSummary::from(&record)).unwrap();

        assert_eq!(json["title"], "BLINKY");
        assert_eq!(json["quirks"][0], "jump");
        assert_eq!(json["valid"], true);
    }
}
