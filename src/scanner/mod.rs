//! Input adapter: builds layout items from an image directory.
//!
//! - `FileScanner` - Walks a directory and emits `ContentItem`s
//! - `MetadataExtractor` - Reads image dimensions from headers

pub mod file_scanner;
pub mod metadata;

pub use file_scanner::{load_ratings, FileScanner, Ratings, ScanConfig, ScanResult};
pub use metadata::MetadataExtractor;
