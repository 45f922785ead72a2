//! Boolean-array <-> bitfield packing for quirks and button maps
//!
//! The editor stores checkbox arrays as integers by formatting the value as a
//! fixed-width binary string, reversing it, and reading positions `0..N` as
//! booleans. Encoding does the same in reverse. After both reversals array
//! index `i` lands on bit `i`, so the low-order bit is index 0.

use crate::error::{CartError, Result};
use std::fmt;
use std::str::FromStr;

/// Number of quirk flags stored in the quirks byte
pub const NUM_QUIRKS: usize = 8;

/// Number of keys on the CHIP-8 hex keypad
pub const NUM_KEYS: usize = 16;

/// Unpack the low `N` bits of `value` into a boolean array, index `i` = bit `i`.
pub fn unpack_bits<const N: usize>(value: u16) -> [bool; N] {
    debug_assert!(N <= 16);
    let mut out = [false; N];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = (value >> i) & 1 == 1;
    }
    out
}

/// Pack a boolean array into an integer, index `i` = bit `i`.
///
/// Entries past the sixteenth are ignored.
pub fn pack_bits(flags: &[bool]) -> u16 {
    flags
        .iter()
        .take(16)
        .enumerate()
        .filter(|(_, set)| **set)
        .fold(0u16, |acc, (i, _)| acc | (1 << i))
}

/// Named CHIP-8 interpreter quirks, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quirk {
    /// 8xy6/8xyE shift Vy instead of Vx
    ShiftBug = 0,
    /// Fx55/Fx65 increment I
    LoadStoreBug = 1,
    /// Bnnn jumps relative to Vx
    JumpBug = 2,
    /// Don't allow big sprites to be drawn in LO-RES mode
    NoBigSpriteLores = 3,
    /// Don't clear the display when 00FE/00FF execute
    NoClearOnResolution = 4,
    /// Don't allow sprite wrapping
    NoSpriteWrap = 5,
    /// Enable collision enumeration
    CollisionEnumeration = 6,
    /// Enable collision check with the bottom of the screen
    BottomCollision = 7,
}

impl Quirk {
    pub const ALL: [Quirk; NUM_QUIRKS] = [
        Quirk::ShiftBug,
        Quirk::LoadStoreBug,
        Quirk::JumpBug,
        Quirk::NoBigSpriteLores,
        Quirk::NoClearOnResolution,
        Quirk::NoSpriteWrap,
        Quirk::CollisionEnumeration,
        Quirk::BottomCollision,
    ];

    /// Short kebab-case name used on the command line
    pub fn name(self) -> &'static str {
        match self {
            Quirk::ShiftBug => "shift",
            Quirk::LoadStoreBug => "load-store",
            Quirk::JumpBug => "jump",
            Quirk::NoBigSpriteLores => "no-big-sprite-lores",
            Quirk::NoClearOnResolution => "no-clear-on-resolution",
            Quirk::NoSpriteWrap => "no-sprite-wrap",
            Quirk::CollisionEnumeration => "collision-enumeration",
            Quirk::BottomCollision => "bottom-collision",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Quirk::ShiftBug => "Enable 8xy6/8xye bug",
            Quirk::LoadStoreBug => "Enable Fx55/Fx65 bug",
            Quirk::JumpBug => "Enable Bnnn bug",
            Quirk::NoBigSpriteLores => "Don't allow big sprites to be drawn in LO-RES mode",
            Quirk::NoClearOnResolution => "Don't clear display when 00FE/00FF execute",
            Quirk::NoSpriteWrap => "Don't allow sprite wrapping",
            Quirk::CollisionEnumeration => "Enable collision enumeration",
            Quirk::BottomCollision => "Enable collision check with bottom of screen",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Quirk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Quirk {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Quirk::ALL
            .into_iter()
            .find(|q| q.name() == wanted)
            .ok_or_else(|| CartError::UnknownQuirk(s.to_string()))
    }
}

/// The eight quirk flags of a cartridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quirks([bool; NUM_QUIRKS]);

impl Quirks {
    pub fn from_bits(bits: u8) -> Self {
        Quirks(unpack_bits::<NUM_QUIRKS>(bits as u16))
    }

    pub fn bits(&self) -> u8 {
        // Eight flags never exceed one byte
        pack_bits(&self.0) as u8
    }

    pub fn from_flags(flags: [bool; NUM_QUIRKS]) -> Self {
        Quirks(flags)
    }

    pub fn flags(&self) -> [bool; NUM_QUIRKS] {
        self.0
    }

    pub fn get(&self, quirk: Quirk) -> bool {
        self.0[quirk.index()]
    }

    pub fn set(&mut self, quirk: Quirk, enabled: bool) {
        self.0[quirk.index()] = enabled;
    }

    /// Quirks currently enabled, in storage order
    pub fn enabled(&self) -> impl Iterator<Item = Quirk> + '_ {
        Quirk::ALL.into_iter().filter(|q| self.get(*q))
    }
}

/// A hex-keypad mask selecting which physical keys trigger one logical button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonMap([bool; NUM_KEYS]);

impl ButtonMap {
    pub fn from_bits(bits: u16) -> Self {
        ButtonMap(unpack_bits::<NUM_KEYS>(bits))
    }

    pub fn bits(&self) -> u16 {
        pack_bits(&self.0)
    }

    pub fn from_keys(keys: [bool; NUM_KEYS]) -> Self {
        ButtonMap(keys)
    }

    pub fn keys(&self) -> [bool; NUM_KEYS] {
        self.0
    }

    /// Whether hex key `key` (0x0..=0xF) is mapped; out-of-range keys never are.
    pub fn is_mapped(&self, key: u8) -> bool {
        self.0.get(key as usize).copied().unwrap_or(false)
    }

    pub fn set(&mut self, key: u8, mapped: bool) -> Result<()> {
        let slot = self
            .0
            .get_mut(key as usize)
            .ok_or_else(|| CartError::InvalidKey(format!("{key:#x}")))?;
        *slot = mapped;
        Ok(())
    }

    /// Mapped keys in ascending order
    pub fn mapped_keys(&self) -> impl Iterator<Item = u8> + '_ {
        (0..NUM_KEYS as u8).filter(|k| self.is_mapped(*k))
    }
}

impl fmt::Display for ButtonMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.mapped_keys().map(|k| format!("{k:X}")).collect();
        if keys.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&keys.join(","))
        }
    }
}

impl FromStr for ButtonMap {
    type Err = CartError;

    /// Parse a comma-separated list of hex keys, e.g. `"7,8,A"`.
    /// `"-"` or an empty string yields an empty map.
    fn from_str(s: &str) -> Result<Self> {
        let mut map = ButtonMap::default();
        let s = s.trim();
        if s.is_empty() || s == "-" {
            return Ok(map);
        }

        for part in s.split(',') {
            let part = part.trim();
            let key = u8::from_str_radix(part, 16)
                .ok()
                .filter(|k| (*k as usize) < NUM_KEYS)
                .ok_or_else(|| CartError::InvalidKey(part.to_string()))?;
            map.set(key, true)?;
        }

        Ok(map)
    }
}
