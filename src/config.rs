//! User configuration: viewport presets and scan defaults.
//!
//! Stored as JSON at `XDG_CONFIG_HOME/rowfill/config.json`. A missing file at
//! the default location means defaults; a missing explicit path is an error.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::MAX_RATING;
use crate::scanner::ScanConfig;

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Viewport used when neither a width nor a viewport is requested.
    pub default_viewport: String,
    /// Viewport name to row width in slots.
    pub viewports: BTreeMap<String, u32>,
    /// Rating given to scanned items without an explicit rating.
    pub default_rating: u8,
    /// Emit subdirectories as collection items when scanning.
    pub include_collections: bool,
}

impl Default for Config {
    fn default() -> Self {
        let viewports = [("desktop", 5), ("tablet", 4), ("mobile", 1)]
            .into_iter()
            .map(|(name, width)| (name.to_string(), width))
            .collect();
        Self {
            default_viewport: "desktop".to_string(),
            viewports,
            default_rating: 3,
            include_collections: true,
        }
    }
}

impl Config {
    /// Returns the default config path based on XDG directories.
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "rowfill")
            .context("Failed to determine project directories")?;
        Ok(proj_dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Loads `path` if given, otherwise the default location (or defaults).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        let default_path = Self::default_path()?;
        if !default_path.exists() {
            debug!("No config at {:?}, using defaults", default_path);
            return Ok(Self::default());
        }
        Self::load_from(&default_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_rating > MAX_RATING {
            bail!(
                "default_rating must be at most {}, got {}",
                MAX_RATING,
                self.default_rating
            );
        }
        if let Some((name, _)) = self.viewports.iter().find(|(_, width)| **width == 0) {
            bail!("Viewport {:?} has a row width of 0", name);
        }
        Ok(())
    }

    /// Row width in slots for a named viewport.
    pub fn row_width_for(&self, viewport: &str) -> Result<u32> {
        match self.viewports.get(viewport) {
            Some(&width) => Ok(width),
            None => {
                let known: Vec<&str> = self.viewports.keys().map(String::as_str).collect();
                bail!(
                    "Unknown viewport {:?} (known: {})",
                    viewport,
                    known.join(", ")
                )
            }
        }
    }

    pub fn default_row_width(&self) -> Result<u32> {
        self.row_width_for(&self.default_viewport)
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            include_collections: self.include_collections,
            default_rating: self.default_rating,
            ..ScanConfig::default()
        }
    }
}
