//! Pattern-based row layout for photo and collection galleries.
//!
//! `layout` holds the pure engine; `scanner`, `config` and `bench` are the
//! application layers used by the `rowfill` binary.

pub mod bench;
pub mod config;
pub mod layout;
pub mod models;
pub mod scanner;

pub use layout::{build_rows, BoxTree, CachedRowBuilder, LayoutError, PatternName, RowBuilder};
pub use models::{ContentItem, ContentKind, Orientation, Row, RowLayout};
