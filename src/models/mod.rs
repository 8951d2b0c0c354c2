pub mod content_item;
pub mod row_model;

pub use content_item::*;
pub use row_model::*;
