//! Row layout engine.
//!
//! Arranges an ordered item sequence into rows of a fixed slot width using a
//! curated pattern catalog, with a best-fit packer as fallback. The engine is
//! pure: no I/O, no shared state beyond the optional `RowCache`.

pub mod box_tree;
pub mod classifier;
pub mod error;
pub mod fill;
pub mod force_fill;
pub mod layout_cache;
pub mod matcher;
pub mod patterns;
pub mod row_builder;
pub mod value;

pub use box_tree::BoxTree;
pub use classifier::classify;
pub use error::LayoutError;
pub use fill::{fill_ratio, is_row_complete, MAX_FILL_RATIO, MIN_FILL_RATIO};
pub use force_fill::{force_fill, ForcedRow};
pub use layout_cache::{CachedRowBuilder, RowCache};
pub use matcher::{match_pattern, PatternMatch};
pub use patterns::{Direction, PatternDefinition, PatternName, Requirement, CATALOG};
pub use row_builder::{build_rows, RowBuilder, RowPlan};
pub use value::{component_value, effective_rating, orientation};
