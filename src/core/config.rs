//! Tool configuration
//!
//! Loaded from a TOML file; every field is optional.
//!
//! ```toml
//! device = "/dev/sda"
//!
//! [layout]
//! rows = 5
//! cols = 5
//!
//! [record]
//! format = "sentinel"        # or "legacy"
//! title_policy = "truncate"  # or "strict"
//! ```

use crate::error::Result;
use crate::layout::Geometry;
use crate::record::RecordOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// SD card device or image path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<PathBuf>,

    pub layout: Geometry,

    pub record: RecordOptions,
}

impl ToolConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path)?;
        let config = Self::from_toml(&text)?;
        debug!("Loaded config from {:?}: {:?}", path.as_ref(), config);
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CartError;
    use crate::record::{RecordFormat, TitlePolicy};

    #[test]
    fn test_empty_config_defaults() {
        let config = ToolConfig::from_toml("").unwrap();
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.layout.slot_count(), 25);
        assert_eq!(config.record.format, RecordFormat::Sentinel);
        assert_eq!(config.record.title_policy, TitlePolicy::Truncate);
    }

    #[test]
    fn test_full_config() {
        let config = ToolConfig::from_toml(
            r#"
            device = "/dev/sdb"

            [layout]
            rows = 2
            cols = 4

            [record]
            format = "legacy"
            title_policy = "strict"
            "#,
        )
        .unwrap();

        assert_eq!(config.device, Some(PathBuf::from("/dev/sdb")));
        assert_eq!(config.layout.slot_count(), 8);
        assert_eq!(config.record.format, RecordFormat::Legacy);
        assert_eq!(config.record.title_policy, TitlePolicy::Strict);
    }

    #[test]
    fn test_partial_sections() {
        let config = ToolConfig::from_toml("[layout]\nrows = 3\n").unwrap();
        assert_eq!(config.layout.rows, 3);
        assert_eq!(config.layout.cols, 5);
    }

    #[test]
    fn test_bad_format_rejected() {
        assert!(matches!(
            ToolConfig::from_toml("[record]\nformat = \"v3\"\n"),
            Err(CartError::Config(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ToolConfig::default();
        config.record.format = RecordFormat::Legacy;
        let text = config.to_toml().unwrap();
        assert_eq!(ToolConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart8.toml");
        std::fs::write(&path, "device = \"card.img\"\n").unwrap();

        let config = ToolConfig::load(&path).unwrap();
        assert_eq!(config.device, Some(PathBuf::from("card.img")));
    }
}
