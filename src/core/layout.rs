//! Slot geometry on the SD card
//!
//! ```text
//! ┌────────────────────────── slot n (4096 bytes) ──────────────────────────┐
//! │ block 0: metadata (512) │ blocks 1..7: ROM payload (up to 3584 bytes)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! offset(n) = n * 4096        rom_offset(n) = n * 4096 + 512
//! ```

use crate::error::{CartError, Result};
use serde::{Deserialize, Serialize};

/// SD card block size in bytes
pub const BLOCK_SIZE: usize = 512;

/// Blocks per cartridge slot
pub const SLOT_BLOCKS: usize = 8;

/// Bytes per cartridge slot
pub const SLOT_SIZE: usize = BLOCK_SIZE * SLOT_BLOCKS;

/// Largest ROM payload that fits before the next slot
pub const MAX_ROM_SIZE: usize = SLOT_SIZE - BLOCK_SIZE;

pub const GRID_ROWS: usize = 5;
pub const GRID_COLS: usize = 5;

/// Largest grid accepted from a config (a 4GB card of slots)
pub const MAX_SLOTS: usize = 1 << 20;

/// Grid of cartridge slots shown by the console's menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub rows: usize,
    pub cols: usize,
}

impl Geometry {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(CartError::InvalidLayout(format!(
                "grid must have at least one slot (got {}x{})",
                rows, cols
            )));
        }

        if rows.checked_mul(cols).map_or(true, |count| count > MAX_SLOTS) {
            return Err(CartError::InvalidLayout(format!(
                "{}x{} grid exceeds {} slots",
                rows, cols, MAX_SLOTS
            )));
        }

        Ok(Geometry { rows, cols })
    }

    /// Saturates for grids that [`Geometry::new`] would reject
    pub fn slot_count(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// Bytes needed to hold every slot of the grid
    pub fn device_size(&self) -> u64 {
        (self.slot_count() as u64).saturating_mul(SLOT_SIZE as u64)
    }

    pub fn check_slot(&self, slot: usize) -> Result<()> {
        if slot >= self.slot_count() {
            return Err(CartError::SlotOutOfRange {
                slot,
                count: self.slot_count(),
            });
        }
        Ok(())
    }

    /// Slot index shown at grid position (`row`, `col`)
    pub fn slot_at(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then_some(row * self.cols + col)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry {
            rows: GRID_ROWS,
            cols: GRID_COLS,
        }
    }
}

/// Byte offset of slot `slot`'s metadata block
pub fn metadata_offset(slot: usize) -> u64 {
    (slot as u64) * SLOT_SIZE as u64
}

/// Byte offset of slot `slot`'s ROM payload
pub fn rom_offset(slot: usize) -> u64 {
    metadata_offset(slot) + BLOCK_SIZE as u64
}
