//! Directory scanner that turns an image folder into layout input.
//!
//! - Recursive discovery using walkdir, sorted by path
//! - Header-only dimension reads (see `MetadataExtractor`)
//! - Ratings from an optional id → rating map, with a default
//! - Immediate subdirectories as square collection items

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

use crate::models::{ContentItem, MAX_RATING};
use crate::scanner::metadata::{is_image_extension, MetadataExtractor};

/// Rating overrides keyed by item id (path relative to the scan root).
pub type Ratings = HashMap<String, u8>;

/// Configuration for the file scanner.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to scan directories recursively.
    pub recursive: bool,
    /// Maximum directory depth (0 = unlimited).
    pub max_depth: usize,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
    /// Emit immediate subdirectories as collection items.
    pub include_collections: bool,
    /// Rating for items missing from the ratings map.
    pub default_rating: u8,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            max_depth: 0, // unlimited
            follow_symlinks: false,
            include_collections: true,
            default_rating: 3,
        }
    }
}

/// Result of a completed scan operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Total number of image files found.
    pub total_files: usize,
    /// Number of collection items emitted.
    pub collections: usize,
    /// Number of files skipped because their dimensions could not be read.
    pub error_count: usize,
}

/// A discovered image file (before metadata extraction).
#[derive(Debug, Clone)]
struct DiscoveredEntry {
    path: PathBuf,
}

pub struct FileScanner {
    config: ScanConfig,
}

impl FileScanner {
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }

    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scans a directory and returns collection items followed by image items.
    pub fn scan(&self, dir: &Path, ratings: &Ratings) -> Result<(Vec<ContentItem>, ScanResult)> {
        if !dir.is_dir() {
            anyhow::bail!("Scan path is not a directory: {}", dir.display());
        }
        info!("Starting scan of {:?}", dir);

        let mut items = Vec::new();
        let mut result = ScanResult::default();

        if self.config.include_collections {
            for collection in Self::discover_collections(dir)? {
                let id = relative_id(dir, &collection);
                let rating = self.rating_for(&id, ratings);
                items.push(ContentItem::new_collection(id, rating));
                result.collections += 1;
            }
        }

        let discovered = Self::discover_files(dir, &self.config)?;
        info!("Discovered {} image files", discovered.len());
        result.total_files = discovered.len();

        for entry in discovered {
            let dimensions = MetadataExtractor::extract_dimensions(&entry.path)?;
            if MetadataExtractor::is_broken(dimensions) {
                warn!("Skipping unreadable image {:?}", entry.path);
                result.error_count += 1;
                continue;
            }

            let id = relative_id(dir, &entry.path);
            let rating = self.rating_for(&id, ratings);
            trace!(%id, rating, "Scanned item");
            items.push(ContentItem::from_dimensions(
                id,
                dimensions.0,
                dimensions.1,
                rating,
            ));
        }

        debug!(
            "Scan complete: {} files, {} collections, {} errors",
            result.total_files, result.collections, result.error_count
        );
        Ok((items, result))
    }

    fn rating_for(&self, id: &str, ratings: &Ratings) -> u8 {
        ratings
            .get(id)
            .copied()
            .unwrap_or(self.config.default_rating)
            .min(MAX_RATING)
    }

    /// Discovers all image files in a directory.
    fn discover_files(dir: &Path, config: &ScanConfig) -> Result<Vec<DiscoveredEntry>> {
        let mut walker = WalkDir::new(dir).follow_links(config.follow_symlinks);

        if !config.recursive {
            walker = walker.max_depth(1);
        } else if config.max_depth > 0 {
            walker = walker.max_depth(config.max_depth);
        }

        let mut entries = Vec::new();

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !is_image_extension(ext) {
                continue;
            }

            entries.push(DiscoveredEntry {
                path: path.to_path_buf(),
            });
        }

        // Sort by path for consistent ordering
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(entries)
    }

    /// Immediate subdirectories, sorted, hidden ones excluded.
    fn discover_collections(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut collections = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
            let entry = entry.with_context(|| format!("Failed to read entry in {:?}", dir))?;
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if !hidden && entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                collections.push(entry.path());
            }
        }
        collections.sort();
        Ok(collections)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads a JSON object of `{ "relative/path.jpg": rating }`.
pub fn load_ratings(path: &Path) -> Result<Ratings> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ratings file {:?}", path))?;
    serde_json::from_str(&data).with_context(|| format!("Failed to parse ratings file {:?}", path))
}

/// Path relative to `root` with forward slashes, used as the item id.
fn relative_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
