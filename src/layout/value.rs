//! Orientation and value model: how much of a row one item claims.

use crate::models::{ContentItem, Orientation};

pub fn orientation(item: &ContentItem) -> Orientation {
    item.orientation()
}

pub fn effective_rating(item: &ContentItem) -> u8 {
    item.effective_rating()
}

/// Number of items of this rating that would share a row on their own.
pub fn items_per_row(effective_rating: u8, row_width: u32) -> u32 {
    let row_width = row_width.max(1);
    let raw = row_width as i64 + 1 - effective_rating as i64;
    raw.clamp(1, row_width as i64) as u32
}

/// Slots one item of the given effective rating occupies in a row of `row_width` slots.
pub fn component_value(effective_rating: u8, row_width: u32) -> f64 {
    let row_width = row_width.max(1);
    row_width as f64 / items_per_row(effective_rating, row_width) as f64
}

pub fn item_value(item: &ContentItem, row_width: u32) -> f64 {
    component_value(item.effective_rating(), row_width)
}
