//! Best-effort row assembly used when no catalog pattern fits.
//!
//! Packs from every remaining unconsumed item, not just the lookahead window.
//! Always takes the leading item, then prefers reading order and only
//! reorders (best fit) once the next sequential item would overfill the row.

use crate::layout::error::LayoutError;
use crate::layout::fill::{exceeds_max_fill, FILL_EPSILON, MIN_FILL_RATIO};
use crate::layout::value::item_value;
use crate::models::ContentItem;

#[derive(Debug, Clone, PartialEq)]
pub struct ForcedRow {
    /// Selected positions in the remaining slice, ascending.
    pub positions: Vec<usize>,
    pub fill_ratio: f64,
}

pub fn force_fill(remaining: &[&ContentItem], row_width: u32) -> Result<ForcedRow, LayoutError> {
    if remaining.is_empty() {
        return Err(LayoutError::EmptyWindow);
    }

    let width = row_width.max(1) as f64;
    let share = |pos: usize| item_value(remaining[pos], row_width) / width;

    let mut used = vec![false; remaining.len()];
    let mut positions = vec![0];
    used[0] = true;
    let mut fill = share(0);

    // Sequential phase: natural reading order until complete or about to overfill.
    let mut next = 1;
    while fill < MIN_FILL_RATIO - FILL_EPSILON && next < remaining.len() {
        let prospective = fill + share(next);
        if exceeds_max_fill(prospective) {
            break;
        }
        positions.push(next);
        used[next] = true;
        fill = prospective;
        next += 1;
    }

    // Best-fit phase: the next sequential item overflows, so pick by gap.
    if fill < MIN_FILL_RATIO - FILL_EPSILON && next < remaining.len() {
        loop {
            let gap = 1.0 - fill;
            let candidate = (0..remaining.len())
                .filter(|&pos| !used[pos])
                .min_by(|&a, &b| {
                    (share(a) - gap)
                        .abs()
                        .total_cmp(&(share(b) - gap).abs())
                        .then(a.cmp(&b))
                });
            let Some(pos) = candidate else {
                break;
            };

            let prospective = fill + share(pos);
            let improves = (1.0 - prospective).abs() < (1.0 - fill).abs() - FILL_EPSILON;
            if !improves || exceeds_max_fill(prospective) {
                break;
            }
            positions.push(pos);
            used[pos] = true;
            fill = prospective;
        }
    }

    positions.sort_unstable();
    Ok(ForcedRow {
        positions,
        fill_ratio: fill,
    })
}
