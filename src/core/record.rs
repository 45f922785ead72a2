//! Cartridge metadata record (block 0 of every slot)
//!
//! # Layout
//!
//! ```text
//! Offset  Size  Field
//!      0     1  start byte: 0xC8 when a cartridge is present
//!      1    11  title, ASCII, zero-padded
//!     12     4  cpu_freq (big-endian)
//!     16     1  timer_freq
//!     17     1  display_freq
//!     18     1  quirks bitfield
//!     19    12  left, right, up, down, a, b button maps (big-endian u16 each)
//!     31    16  user flags (legacy format)
//!     31     4  0xDEADBEEF trailer (sentinel format)
//! ```
//!
//! Only the encoded prefix is ever written; the rest of the 512-byte block
//! keeps whatever the device already held.

use crate::bits::{ButtonMap, Quirks};
use crate::error::{CartError, Result};
use crate::layout::BLOCK_SIZE;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Start byte marking an occupied slot
pub const START_BYTE: u8 = 0xC8;

/// Trailer written after the button maps by the sentinel format
pub const TRAILER: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

/// Width of the title field on the device
pub const TITLE_FIELD_LEN: usize = 11;

pub const TITLE_OFFSET: usize = 1;
pub const CONFIG_OFFSET: usize = TITLE_OFFSET + TITLE_FIELD_LEN;
pub const CONFIG_LEN: usize = 19;
pub const USER_FLAGS_OFFSET: usize = CONFIG_OFFSET + CONFIG_LEN;
pub const USER_FLAGS_LEN: usize = 16;

pub const DEFAULT_TITLE: &str = "Empty";
pub const DEFAULT_CPU_FREQ: u32 = 1000;
pub const DEFAULT_TIMER_FREQ: u8 = 60;
pub const DEFAULT_DISPLAY_FREQ: u8 = 30;
pub const DEFAULT_LEFT_MAP: u16 = 0x0080;
pub const DEFAULT_RIGHT_MAP: u16 = 0x0200;
pub const DEFAULT_UP_MAP: u16 = 0x0020;
pub const DEFAULT_DOWN_MAP: u16 = 0x0100;
pub const DEFAULT_A_MAP: u16 = 0x0040;
pub const DEFAULT_B_MAP: u16 = 0x0040;

/// Placeholder user flags for an empty slot: 0x0040 as a 16-byte big-endian value
pub const DEFAULT_USER_FLAGS: [u8; USER_FLAGS_LEN] = {
    let mut flags = [0u8; USER_FLAGS_LEN];
    flags[USER_FLAGS_LEN - 1] = 0x40;
    flags
};

/// Which on-device record variant to write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// 11-byte titles followed by the 16 user flag bytes
    Legacy,
    /// 10-byte titles, button maps terminated by 0xDEADBEEF
    #[default]
    Sentinel,
}

impl RecordFormat {
    /// Longest title this format stores
    pub fn max_title_len(self) -> usize {
        match self {
            RecordFormat::Legacy => TITLE_FIELD_LEN,
            RecordFormat::Sentinel => TITLE_FIELD_LEN - 1,
        }
    }

    /// Number of bytes `encode` produces
    pub fn encoded_len(self) -> usize {
        match self {
            RecordFormat::Legacy => USER_FLAGS_OFFSET + USER_FLAGS_LEN,
            RecordFormat::Sentinel => USER_FLAGS_OFFSET + TRAILER.len(),
        }
    }
}

/// What to do with a title longer than the format allows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitlePolicy {
    #[default]
    Truncate,
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordOptions {
    pub format: RecordFormat,
    pub title_policy: TitlePolicy,
}

/// Decoded metadata for one cartridge slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeRecord {
    /// Slot index on the device (not stored in the record)
    pub slot: usize,
    /// Start byte was 0xC8
    pub valid: bool,
    /// The 0xDEADBEEF trailer follows the button maps
    pub complete: bool,
    pub title: String,
    pub cpu_freq: u32,
    pub timer_freq: u8,
    pub display_freq: u8,
    pub quirks: Quirks,
    pub left: ButtonMap,
    pub right: ButtonMap,
    pub up: ButtonMap,
    pub down: ButtonMap,
    pub a: ButtonMap,
    pub b: ButtonMap,
    pub user_flags: [u8; USER_FLAGS_LEN],
}

impl CartridgeRecord {
    /// Record for an unoccupied slot, carrying the editor defaults
    pub fn empty(slot: usize) -> Self {
        CartridgeRecord {
            slot,
            valid: false,
            complete: false,
            title: DEFAULT_TITLE.to_string(),
            cpu_freq: DEFAULT_CPU_FREQ,
            timer_freq: DEFAULT_TIMER_FREQ,
            display_freq: DEFAULT_DISPLAY_FREQ,
            quirks: Quirks::default(),
            left: ButtonMap::from_bits(DEFAULT_LEFT_MAP),
            right: ButtonMap::from_bits(DEFAULT_RIGHT_MAP),
            up: ButtonMap::from_bits(DEFAULT_UP_MAP),
            down: ButtonMap::from_bits(DEFAULT_DOWN_MAP),
            a: ButtonMap::from_bits(DEFAULT_A_MAP),
            b: ButtonMap::from_bits(DEFAULT_B_MAP),
            user_flags: DEFAULT_USER_FLAGS,
        }
    }

    /// Start a new cartridge in `slot` from the defaults with the given title
    pub fn new(slot: usize, title: impl Into<String>) -> Self {
        CartridgeRecord {
            valid: true,
            title: title.into(),
            ..CartridgeRecord::empty(slot)
        }
    }

    /// Button maps in storage order: left, right, up, down, a, b
    pub fn button_maps(&self) -> [ButtonMap; 6] {
        [self.left, self.right, self.up, self.down, self.a, self.b]
    }

    /// Decode a 512-byte metadata block
    ///
    /// Anything other than the start byte is never validated: a block whose
    /// first byte isn't 0xC8 is an empty slot, not an error.
    pub fn decode(slot: usize, block: &[u8]) -> Result<Self> {
        if block.len() != BLOCK_SIZE {
            return Err(CartError::InvalidBlockLength {
                expected: BLOCK_SIZE,
                actual: block.len(),
            });
        }

        if block[0] != START_BYTE {
            return Ok(CartridgeRecord::empty(slot));
        }

        let title_bytes = &block[TITLE_OFFSET..CONFIG_OFFSET];
        let title = String::from_utf8_lossy(title_bytes)
            .trim_end_matches('\0')
            .to_string();

        let c = &block[CONFIG_OFFSET..USER_FLAGS_OFFSET];
        let u16_at = |i: usize| u16::from_be_bytes([c[i], c[i + 1]]);

        let mut user_flags = [0u8; USER_FLAGS_LEN];
        user_flags.copy_from_slice(&block[USER_FLAGS_OFFSET..USER_FLAGS_OFFSET + USER_FLAGS_LEN]);

        Ok(CartridgeRecord {
            slot,
            valid: true,
            complete: user_flags[..TRAILER.len()] == TRAILER,
            title,
            cpu_freq: u32::from_be_bytes([c[0], c[1], c[2], c[3]]),
            timer_freq: c[4],
            display_freq: c[5],
            quirks: Quirks::from_bits(c[6]),
            left: ButtonMap::from_bits(u16_at(7)),
            right: ButtonMap::from_bits(u16_at(9)),
            up: ButtonMap::from_bits(u16_at(11)),
            down: ButtonMap::from_bits(u16_at(13)),
            a: ButtonMap::from_bits(u16_at(15)),
            b: ButtonMap::from_bits(u16_at(17)),
            user_flags,
        })
    }

    /// Encode the record prefix that gets written over the metadata block
    pub fn encode(&self, options: &RecordOptions) -> Result<Vec<u8>> {
        let title = self.encoded_title(options)?;
        let format = options.format;

        let mut bytes = Vec::with_capacity(format.encoded_len());
        bytes.push(START_BYTE);
        bytes.extend_from_slice(title);
        bytes.resize(CONFIG_OFFSET, 0);

        bytes.extend_from_slice(&self.cpu_freq.to_be_bytes());
        bytes.push(self.timer_freq);
        bytes.push(self.display_freq);
        bytes.push(self.quirks.bits());
        for map in self.button_maps() {
            bytes.extend_from_slice(&map.bits().to_be_bytes());
        }

        match format {
            RecordFormat::Legacy => bytes.extend_from_slice(&self.user_flags),
            RecordFormat::Sentinel => bytes.extend_from_slice(&TRAILER),
        }

        debug_assert_eq!(bytes.len(), format.encoded_len());
        Ok(bytes)
    }

    /// Encode over a zeroed 512-byte block
    pub fn encode_block(&self, options: &RecordOptions) -> Result<[u8; BLOCK_SIZE]> {
        let prefix = self.encode(options)?;
        let mut block = [0u8; BLOCK_SIZE];
        block[..prefix.len()].copy_from_slice(&prefix);
        Ok(block)
    }

    fn encoded_title(&self, options: &RecordOptions) -> Result<&[u8]> {
        if !self.title.is_ascii() || self.title.contains('\0') {
            return Err(CartError::InvalidTitle(self.title.clone()));
        }

        let bytes = self.title.as_bytes();
        let max = options.format.max_title_len();
        if bytes.len() <= max {
            return Ok(bytes);
        }

        match options.title_policy {
            TitlePolicy::Strict => Err(CartError::TitleTooLong {
                len: bytes.len(),
                max,
            }),
            TitlePolicy::Truncate => {
                warn!(
                    "Title {:?} truncated to {} bytes for slot {}",
                    self.title, max, self.slot
                );
                Ok(&bytes[..max])
            }
        }
    }
}
