use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartError {
    #[error("Invalid metadata block length: expected {expected} bytes, got {actual}")]
    InvalidBlockLength { expected: usize, actual: usize },

    #[error("Title too long: {len} bytes (max {max})")]
    TitleTooLong { len: usize, max: usize },

    #[error("Invalid title: {0} (must be ASCII)")]
    InvalidTitle(String),

    #[error("Slot {slot} out of range (device holds {count} slots)")]
    SlotOutOfRange { slot: usize, count: usize },

    #[error("ROM too large: {len} bytes (slot payload holds at most {max})")]
    RomTooLarge { len: usize, max: usize },

    #[error("Invalid display frame length: expected {expected} bytes, got {actual}")]
    InvalidFrameLength { expected: usize, actual: usize },

    #[error("Invalid glyph: {0}")]
    InvalidGlyph(String),

    #[error("Invalid key: {0} (expected a hex digit 0-F)")]
    InvalidKey(String),

    #[error("Unknown quirk: {0}")]
    UnknownQuirk(String),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CartError>;
