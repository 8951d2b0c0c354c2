use crate::layout::value::item_value;
use crate::models::ContentItem;

/// Lowest fill ratio a row may have and still count as complete.
pub const MIN_FILL_RATIO: f64 = 0.9;

/// Highest fill ratio a row may have and still count as complete.
pub const MAX_FILL_RATIO: f64 = 1.15;

/// Absorbs float noise when sums land exactly on a bound.
pub(crate) const FILL_EPSILON: f64 = 1e-9;

pub fn total_value<'a, I>(components: I, row_width: u32) -> f64
where
    I: IntoIterator<Item = &'a ContentItem>,
{
    components
        .into_iter()
        .map(|item| item_value(item, row_width))
        .sum()
}

/// Sum of component values divided by the row width.
pub fn fill_ratio<'a, I>(components: I, row_width: u32) -> f64
where
    I: IntoIterator<Item = &'a ContentItem>,
{
    total_value(components, row_width) / row_width.max(1) as f64
}

pub fn is_fill_complete(ratio: f64) -> bool {
    ratio >= MIN_FILL_RATIO - FILL_EPSILON && ratio <= MAX_FILL_RATIO + FILL_EPSILON
}

pub fn exceeds_max_fill(ratio: f64) -> bool {
    ratio > MAX_FILL_RATIO + FILL_EPSILON
}

pub fn is_row_complete(components: &[ContentItem], row_width: u32) -> bool {
    !components.is_empty() && is_fill_complete(fill_ratio(components, row_width))
}
