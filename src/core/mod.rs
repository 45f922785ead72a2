//! Core codec, geometry and device access

pub mod bits;
pub mod config;
pub mod display;
pub mod error;
pub mod font;
pub mod io;
pub mod layout;
pub mod library;
pub mod record;
