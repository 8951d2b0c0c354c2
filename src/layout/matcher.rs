//! Tests one catalog pattern against a lookahead window.
//!
//! The window is the slice of upcoming unconsumed items in document order.
//! The anchor item (normally position 0) must take part in every match so the
//! row builder never reorders the sequence beyond what a pattern allows.

use crate::layout::fill::{exceeds_max_fill, is_fill_complete, FILL_EPSILON};
use crate::layout::patterns::PatternDefinition;
use crate::layout::value::{component_value, item_value};
use crate::models::ContentItem;

/// Leading items worth no more than an item of this effective rating may wait
/// for a later row.
pub const SKIP_RATING_THRESHOLD: u8 = 2;

/// A successful pattern match, in window positions.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub pattern: &'static PatternDefinition,
    /// Selected window positions, ascending.
    pub positions: Vec<usize>,
    /// Window position that filled the pattern's first role.
    pub main_position: usize,
}

/// Whether the leading window item may be deferred to a later row.
///
/// Below three slots every component value saturates to the full row, so the
/// effective rating is checked as well as the value.
pub fn is_skippable(item: &ContentItem, row_width: u32) -> bool {
    item.effective_rating() <= SKIP_RATING_THRESHOLD
        && item_value(item, row_width)
            <= component_value(SKIP_RATING_THRESHOLD, row_width) + FILL_EPSILON
}

/// Try to satisfy every role of `pattern` with distinct items from `window`,
/// using the item at `anchor`.
///
/// Returns the first assignment, in depth-first order, whose fill passes the
/// fill check; `None` when no assignment does.
pub fn match_pattern(
    pattern: &'static PatternDefinition,
    window: &[&ContentItem],
    anchor: usize,
    row_width: u32,
) -> Option<PatternMatch> {
    if !pattern.applies_to_width(row_width) {
        return None;
    }
    if anchor >= window.len() || window.len() - anchor < pattern.min_items() {
        return None;
    }

    let mut search = RoleSearch {
        pattern,
        window,
        anchor,
        row_width,
        selected: Vec::with_capacity(pattern.requirements.len()),
        used: vec![false; window.len()],
    };
    if !search.assign(0) {
        return None;
    }

    let main_position = search.selected[0];
    let mut positions = search.selected;
    positions.sort_unstable();
    Some(PatternMatch {
        pattern,
        positions,
        main_position,
    })
}

struct RoleSearch<'a> {
    pattern: &'static PatternDefinition,
    window: &'a [&'a ContentItem],
    anchor: usize,
    row_width: u32,
    /// Window position chosen for each role so far.
    selected: Vec<usize>,
    used: Vec<bool>,
}

impl RoleSearch<'_> {
    fn assign(&mut self, role: usize) -> bool {
        let requirements = self.pattern.requirements;
        if role == requirements.len() {
            return self.accept();
        }

        let requirement = &requirements[role];
        let ignore_orientation = self.pattern.flexible && role > 0;
        let candidates = self.candidate_range(role);

        for pos in candidates {
            if self.used[pos] || !requirement.accepts(self.window[pos], ignore_orientation) {
                continue;
            }
            if !self.within_rating_proximity(role, pos) {
                continue;
            }

            self.selected.push(pos);
            self.used[pos] = true;
            if self.assign(role + 1) {
                return true;
            }
            self.used[pos] = false;
            self.selected.pop();
        }
        false
    }

    fn candidate_range(&self, role: usize) -> std::ops::Range<usize> {
        let len = self.window.len();
        if role == 0 {
            return if self.pattern.flexible {
                self.anchor..len
            } else {
                self.anchor..self.anchor + 1
            };
        }

        let previous = self.selected[role - 1];
        let same_role = self.pattern.requirements[role] == self.pattern.requirements[role - 1];
        if !self.pattern.flexible || same_role {
            // Ordered roles, and interchangeable flexible roles, only look forward.
            previous + 1..len
        } else {
            self.anchor..len
        }
    }

    fn within_rating_proximity(&self, role: usize, pos: usize) -> bool {
        let Some(limit) = self.pattern.rating_proximity else {
            return true;
        };
        let requirement = &self.pattern.requirements[role];
        let rating = self.window[pos].effective_rating();

        self.selected.iter().enumerate().all(|(other_role, &other_pos)| {
            self.pattern.requirements[other_role] != *requirement
                || self.window[other_pos].effective_rating().abs_diff(rating) <= limit
        })
    }

    /// Final check on a full role assignment. Extension items are rolled
    /// back when the row still misses the fill band.
    fn accept(&mut self) -> bool {
        if !self.selected.contains(&self.anchor) || !self.within_skip_budget(&self.selected) {
            return false;
        }

        let assigned = self.selected.len();
        if self.pattern.extendable {
            self.extend();
        }
        if is_fill_complete(self.fill()) {
            return true;
        }

        for pos in self.selected.drain(assigned..) {
            self.used[pos] = false;
        }
        false
    }

    fn fill(&self) -> f64 {
        let width = self.row_width.max(1) as f64;
        self.selected
            .iter()
            .map(|&pos| item_value(self.window[pos], self.row_width))
            .sum::<f64>()
            / width
    }

    fn within_skip_budget(&self, selected: &[usize]) -> bool {
        match self.pattern.max_proximity {
            Some(limit) => skipped_between(self.anchor, selected) <= limit,
            None => true,
        }
    }

    /// Repeat the last role while the row is still short of full.
    fn extend(&mut self) {
        let Some(requirement) = self.pattern.requirements.last() else {
            return;
        };
        let row_width = self.row_width;
        let width = row_width.max(1) as f64;
        let mut fill = self.fill();

        for pos in self.anchor..self.window.len() {
            if fill >= 1.0 - FILL_EPSILON {
                break;
            }
            let item = self.window[pos];
            if self.used[pos] || !requirement.accepts(item, self.pattern.flexible) {
                continue;
            }
            let prospective = fill + item_value(item, row_width) / width;
            if exceeds_max_fill(prospective) {
                continue;
            }

            self.selected.push(pos);
            if !self.within_skip_budget(&self.selected) {
                self.selected.pop();
                break;
            }
            self.used[pos] = true;
            fill = prospective;
        }
    }
}

/// Unselected positions between the anchor and the furthest selected item.
fn skipped_between(anchor: usize, selected: &[usize]) -> usize {
    let Some(&last) = selected.iter().max() else {
        return 0;
    };
    let span = last.saturating_sub(anchor) + 1;
    let taken = selected.iter().filter(|&&pos| pos >= anchor && pos <= last).count();
    span - taken
}
