//! Display frames mirrored from the console over serial
//!
//! A frame is the 128x64 monochrome framebuffer packed eight pixels per
//! byte, 16 bytes per row, most significant bit leftmost.

use crate::error::{CartError, Result};

pub const DISPLAY_WIDTH: usize = 128;
pub const DISPLAY_HEIGHT: usize = 64;
pub const BYTES_PER_ROW: usize = DISPLAY_WIDTH / 8;
pub const FRAME_LEN: usize = BYTES_PER_ROW * DISPLAY_HEIGHT;

#[derive(Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    bytes: Vec<u8>,
}

impl DisplayFrame {
    /// Wrap one frame; anything but exactly 1024 bytes is an incomplete read
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != FRAME_LEN {
            return Err(CartError::InvalidFrameLength {
                expected: FRAME_LEN,
                actual: bytes.len(),
            });
        }
        Ok(DisplayFrame {
            bytes: bytes.to_vec(),
        })
    }

    pub fn blank() -> Self {
        DisplayFrame {
            bytes: vec![0; FRAME_LEN],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= DISPLAY_WIDTH || y >= DISPLAY_HEIGHT {
            return false;
        }
        let byte = self.bytes[y * BYTES_PER_ROW + x / 8];
        (byte >> (7 - (x % 8))) & 1 == 1
    }

    /// Unpacked pixel rows, top to bottom
    pub fn rows(&self) -> Vec<[bool; DISPLAY_WIDTH]> {
        (0..DISPLAY_HEIGHT)
            .map(|y| {
                let mut row = [false; DISPLAY_WIDTH];
                for (x, px) in row.iter_mut().enumerate() {
                    *px = self.pixel(x, y);
                }
                row
            })
            .collect()
    }

    pub fn lit_pixels(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Text rendering, `#` for lit pixels
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((DISPLAY_WIDTH + 1) * DISPLAY_HEIGHT);
        for row in self.rows() {
            out.extend(row.iter().map(|&on| if on { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }
}

impl std::fmt::Debug for DisplayFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayFrame")
            .field("lit_pixels", &self.lit_pixels())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_length() {
        assert_eq!(FRAME_LEN, 1024);
        assert!(matches!(
            DisplayFrame::from_bytes(&[0u8; 1023]),
            Err(CartError::InvalidFrameLength {
                expected: 1024,
                actual: 1023
            })
        ));
    }

    #[test]
    fn test_msb_is_leftmost() {
        let mut bytes = vec![0u8; FRAME_LEN];
        bytes[0] = 0b1000_0001;
        bytes[BYTES_PER_ROW + 1] = 0b0100_0000;
        let frame = DisplayFrame::from_bytes(&bytes).unwrap();

        assert!(frame.pixel(0, 0));
        assert!(frame.pixel(7, 0));
        assert!(!frame.pixel(1, 0));
        assert!(frame.pixel(9, 1));
        assert_eq!(frame.lit_pixels(), 3);
    }

    #[test]
    fn test_last_pixel() {
        let mut bytes = vec![0u8; FRAME_LEN];
        bytes[FRAME_LEN - 1] = 0x01;
        let frame = DisplayFrame::from_bytes(&bytes).unwrap();
        assert!(frame.pixel(127, 63));
        assert!(!frame.pixel(128, 63));
    }

    #[test]
    fn test_ascii_dimensions() {
        let ascii = DisplayFrame::blank().to_ascii();
        let lines: Vec<&str> = ascii.lines().collect();
        assert_eq!(lines.len(), 64);
        assert!(lines.iter().all(|l| l.len() == 128 && !l.contains('#')));
    }
}
