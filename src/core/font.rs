//! 5x5 font glyphs for the console's menu font
//!
//! The firmware stores each glyph column-wise: one byte per column, row 0 in
//! bit 0 through row 4 in bit 4. The top three bits are always clear.

use crate::error::{CartError, Result};
use std::fmt;
use std::str::FromStr;

pub const GLYPH_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Glyph {
    pixels: [[bool; GLYPH_SIZE]; GLYPH_SIZE],
}

impl Glyph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.pixels
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    pub fn set(&mut self, row: usize, col: usize, on: bool) {
        if let Some(px) = self.pixels.get_mut(row).and_then(|r| r.get_mut(col)) {
            *px = on;
        }
    }

    /// Flip one pixel; out-of-range positions are ignored
    pub fn toggle(&mut self, row: usize, col: usize) {
        let on = self.get(row, col);
        self.set(row, col, !on);
    }

    /// Parse five lines of five cells: `#`/`1` is set, `.`/`0`/space is clear
    ///
    /// Empty lines are skipped. A line of spaces is a clear row, and short
    /// lines are padded with clear cells.
    pub fn parse(text: &str) -> Result<Self> {
        let mut glyph = Glyph::new();
        let rows: Vec<&str> = text
            .lines()
            .filter(|l| !l.is_empty())
            .map(|l| l.trim_end())
            .collect();

        if rows.len() != GLYPH_SIZE {
            return Err(CartError::InvalidGlyph(format!(
                "expected {} rows, got {}",
                GLYPH_SIZE,
                rows.len()
            )));
        }

        for (r, line) in rows.iter().enumerate() {
            let cells: Vec<char> = line.chars().collect();
            if cells.len() > GLYPH_SIZE {
                return Err(CartError::InvalidGlyph(format!(
                    "row {} has {} cells (max {})",
                    r,
                    cells.len(),
                    GLYPH_SIZE
                )));
            }
            for (c, cell) in cells.into_iter().enumerate() {
                let on = match cell {
                    '#' | '1' | 'X' | 'x' => true,
                    '.' | '0' | ' ' => false,
                    other => {
                        return Err(CartError::InvalidGlyph(format!(
                            "unexpected cell {:?} at row {}, column {}",
                            other, r, c
                        )))
                    }
                };
                glyph.set(r, c, on);
            }
        }

        Ok(glyph)
    }

    /// Column bytes as the firmware's font table stores them
    pub fn column_bytes(&self) -> [u8; GLYPH_SIZE] {
        let mut out = [0u8; GLYPH_SIZE];
        for (col, byte) in out.iter_mut().enumerate() {
            for row in 0..GLYPH_SIZE {
                if self.pixels[row][col] {
                    *byte |= 1 << row;
                }
            }
        }
        out
    }

    pub fn from_column_bytes(bytes: [u8; GLYPH_SIZE]) -> Self {
        let mut glyph = Glyph::new();
        for (col, byte) in bytes.iter().enumerate() {
            for row in 0..GLYPH_SIZE {
                glyph.pixels[row][col] = (byte >> row) & 1 == 1;
            }
        }
        glyph
    }

    /// A C initializer line, e.g. `{0x1F, 0x05, 0x05, 0x05, 0x02},`
    pub fn hex_line(&self) -> String {
        let cols: Vec<String> = self
            .column_bytes()
            .iter()
            .map(|b| format!("0x{:02X}", b))
            .collect();
        format!("{{{}}},", cols.join(", "))
    }
}

impl FromStr for Glyph {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self> {
        Glyph::parse(s)
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.pixels {
            let line: String = row.iter().map(|&on| if on { '#' } else { '.' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
