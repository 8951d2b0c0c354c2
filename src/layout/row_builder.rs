use tracing::{debug, trace};

use crate::layout::box_tree::BoxTree;
use crate::layout::classifier::classify;
use crate::layout::error::LayoutError;
use crate::layout::fill::fill_ratio;
use crate::layout::force_fill::force_fill;
use crate::layout::matcher::{is_skippable, match_pattern, PatternMatch};
use crate::layout::patterns::{PatternName, CATALOG};
use crate::models::{ContentItem, Row, MAX_RATING};

/// Minimum number of upcoming items the builder looks at per row.
const MIN_LOOKAHEAD: usize = 8;

/// Extra items beyond the row width kept in the window for skipping.
const LOOKAHEAD_MARGIN: usize = 3;

/// Compact description of one committed row: enough to rebuild it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPlan {
    pub pattern: PatternName,
    /// Indices into the input slice, ascending.
    pub used_indices: Vec<usize>,
    /// Component index of the pattern's main role, if it has one.
    pub main: Option<usize>,
}

/// Drives the pattern catalog over a whole item sequence.
///
/// # Algorithm
/// 1. Form a lookahead window of the next unconsumed items.
/// 2. Try every catalog pattern anchored at the leading item, then (if the
///    leading item is low value) anchored at the second item.
/// 3. Commit the first match, otherwise commit the force-fill packer's row,
///    packed from every remaining item, under the fallback pattern.
/// 4. Mark the used items consumed and repeat until nothing is left.
#[derive(Debug, Clone, Copy)]
pub struct RowBuilder {
    row_width: u32,
}

impl RowBuilder {
    pub fn new(row_width: u32) -> Self {
        Self { row_width }
    }

    pub fn row_width(&self) -> u32 {
        self.row_width
    }

    pub fn window_size(&self) -> usize {
        MIN_LOOKAHEAD.max(self.row_width as usize + LOOKAHEAD_MARGIN)
    }

    /// Arranges `items` into rows covering every item exactly once.
    pub fn build(&self, items: &[ContentItem]) -> Result<Vec<Row>, LayoutError> {
        let plans = self.plan(items)?;
        self.rows_from_plans(items, &plans)
    }

    /// Runs the row selection without assembling layouts and box trees.
    pub fn plan(&self, items: &[ContentItem]) -> Result<Vec<RowPlan>, LayoutError> {
        validate(items, self.row_width)?;

        let window_size = self.window_size();
        let mut consumed = vec![false; items.len()];
        let mut remaining = items.len();
        let mut cursor = 0usize;
        let mut plans = Vec::new();

        while remaining > 0 {
            while consumed[cursor] {
                cursor += 1;
            }

            let indices: Vec<usize> = (cursor..items.len())
                .filter(|&i| !consumed[i])
                .take(window_size)
                .collect();
            let window: Vec<&ContentItem> = indices.iter().map(|&i| &items[i]).collect();

            let plan = match self.match_catalog(&window) {
                Some(found) => Self::pattern_plan(&found, &indices),
                None => self.fallback_plan(items, &consumed, cursor)?,
            };
            debug!(
                row = plans.len(),
                pattern = %plan.pattern,
                items = plan.used_indices.len(),
                "Committed row"
            );

            for &i in &plan.used_indices {
                consumed[i] = true;
            }
            remaining -= plan.used_indices.len();
            plans.push(plan);
        }

        debug!(
            "Planned {} rows for {} items at width {}",
            plans.len(),
            items.len(),
            self.row_width
        );
        Ok(plans)
    }

    /// Rebuilds full rows from plans, e.g. plans restored from a cache.
    pub fn rows_from_plans(
        &self,
        items: &[ContentItem],
        plans: &[RowPlan],
    ) -> Result<Vec<Row>, LayoutError> {
        plans
            .iter()
            .enumerate()
            .map(|(row_index, plan)| self.assemble(items, plan, row_index as u32))
            .collect()
    }

    fn assemble(
        &self,
        items: &[ContentItem],
        plan: &RowPlan,
        row_index: u32,
    ) -> Result<Row, LayoutError> {
        let components: Vec<ContentItem> = plan
            .used_indices
            .iter()
            .filter_map(|&i| items.get(i))
            .cloned()
            .collect();
        let layout = classify(&components, plan.main);
        let box_tree = BoxTree::build(&components, &layout).ok_or(LayoutError::EmptyWindow)?;
        let direction = plan.pattern.direction();

        Ok(Row {
            row_index,
            pattern: plan.pattern,
            used_indices: plan.used_indices.clone(),
            fill_ratio: fill_ratio(&components, self.row_width),
            components,
            direction,
            layout,
            box_tree,
        })
    }

    fn pattern_plan(found: &PatternMatch, indices: &[usize]) -> RowPlan {
        let main = if found.pattern.has_main {
            found.positions.iter().position(|&p| p == found.main_position)
        } else {
            None
        };
        RowPlan {
            pattern: found.pattern.name,
            used_indices: found.positions.iter().map(|&p| indices[p]).collect(),
            main,
        }
    }

    /// Packs from all unconsumed items at or after `cursor`, not just the window.
    fn fallback_plan(
        &self,
        items: &[ContentItem],
        consumed: &[bool],
        cursor: usize,
    ) -> Result<RowPlan, LayoutError> {
        let indices: Vec<usize> = (cursor..items.len()).filter(|&i| !consumed[i]).collect();
        let remaining: Vec<&ContentItem> = indices.iter().map(|&i| &items[i]).collect();

        let forced = force_fill(&remaining, self.row_width)?;
        trace!(fill = forced.fill_ratio, "No pattern fits, force-filled row");
        Ok(RowPlan {
            pattern: PatternName::Fallback,
            used_indices: forced.positions.iter().map(|&p| indices[p]).collect(),
            main: None,
        })
    }

    fn match_catalog(&self, window: &[&ContentItem]) -> Option<PatternMatch> {
        let mut anchors = vec![0];
        if window.len() > 1 && is_skippable(window[0], self.row_width) {
            anchors.push(1);
        }

        for anchor in anchors {
            for pattern in CATALOG {
                if let Some(found) = match_pattern(pattern, window, anchor, self.row_width) {
                    if anchor > 0 {
                        trace!(id = %window[0].id, "Deferred low value leading item");
                    }
                    return Some(found);
                }
            }
        }
        None
    }
}

/// Arranges `items` into rows of `row_width` slots.
pub fn build_rows(items: &[ContentItem], row_width: u32) -> Result<Vec<Row>, LayoutError> {
    RowBuilder::new(row_width).build(items)
}

fn validate(items: &[ContentItem], row_width: u32) -> Result<(), LayoutError> {
    if row_width == 0 {
        return Err(LayoutError::InvalidRowWidth(row_width));
    }
    for item in items {
        if !item.aspect_ratio.is_finite() || item.aspect_ratio <= 0.0 {
            return Err(LayoutError::InvalidAspectRatio {
                id: item.id.clone(),
                aspect_ratio: item.aspect_ratio,
            });
        }
        if item.rating > MAX_RATING {
            return Err(LayoutError::RatingOutOfRange {
                id: item.id.clone(),
                rating: item.rating,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::fill::is_row_complete;
    use crate::layout::patterns::Direction;
    use crate::models::RowLayout;
    use std::collections::HashSet;

    fn h(id: &str, rating: u8) -> ContentItem {
        ContentItem::new(id, 2.0, rating)
    }

    fn v(id: &str, rating: u8) -> ContentItem {
        ContentItem::new(id, 0.5, rating)
    }

    fn ids(row: &Row) -> Vec<&str> {
        row.components.iter().map(|c| c.id.as_str()).collect()
    }

    fn assert_partition(items: &[ContentItem], rows: &[Row]) {
        let mut seen = HashSet::new();
        for row in rows {
            assert!(!row.is_empty());
            for &i in &row.used_indices {
                assert!(seen.insert(i), "index {} used twice", i);
            }
        }
        assert_eq!(seen.len(), items.len());
    }

    #[test]
    fn test_empty_items() {
        let rows = build_rows(&[], 5).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_zero_row_width_is_rejected() {
        assert_eq!(
            build_rows(&[h("a", 3)], 0).unwrap_err(),
            LayoutError::InvalidRowWidth(0)
        );
    }

    #[test]
    fn test_invalid_items_are_rejected() {
        let err = build_rows(&[ContentItem::new("bad", 0.0, 3)], 5).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidAspectRatio { .. }));

        let err = build_rows(&[ContentItem::new("nan", f64::NAN, 3)], 5).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidAspectRatio { .. }));

        let err = build_rows(&[h("loud", 6)], 5).unwrap_err();
        assert_eq!(
            err,
            LayoutError::RatingOutOfRange {
                id: "loud".to_string(),
                rating: 6
            }
        );
    }

    #[test]
    fn test_two_heroes_get_their_own_rows() {
        let items = [h("a", 5), h("b", 5)];
        let rows = build_rows(&items, 5).unwrap();
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.pattern, PatternName::Hero);
            assert_eq!(row.len(), 1);
            assert!((row.fill_ratio - 1.0).abs() < 1e-9);
            assert!(row.box_tree.is_leaf());
        }
    }

    #[test]
    fn test_horizontal_pair() {
        let items = [h("a", 4), h("b", 4)];
        let rows = build_rows(&items, 5).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pattern, PatternName::HorizontalPair);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0].direction, Some(Direction::Horizontal));
        assert!((rows[0].fill_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_underfilled_pair_falls_back() {
        let items = [h("a", 3), h("b", 4)];
        let rows = build_rows(&items, 5).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_fallback());
        assert_eq!(ids(&rows[0]), vec!["a", "b"]);
        assert!((rows[0].fill_ratio - 0.8333).abs() < 1e-3);
        assert_eq!(rows[0].direction, Some(Direction::Horizontal));
    }

    #[test]
    fn test_dominant_with_stacked_pair() {
        let items = [h("main", 4), v("s1", 3), v("s2", 3)];
        let rows = build_rows(&items, 5).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.pattern, PatternName::DominantStacked);
        assert_eq!(
            row.layout,
            RowLayout::MainStacked {
                main: 0,
                stacked: vec![1, 2],
            }
        );
        assert!((row.fill_ratio - 1.0).abs() < 1e-9);
        assert_eq!(row.box_tree.leaf_count(), 3);
    }

    #[test]
    fn test_low_value_leading_item_waits() {
        let items = [v("low", 1), h("hero", 5), h("mid", 3)];
        let rows = build_rows(&items, 5).unwrap();
        assert_eq!(rows[0].pattern, PatternName::Hero);
        assert_eq!(ids(&rows[0]), vec!["hero"]);
        assert_eq!(rows[0].used_indices, vec![1]);
        assert!(rows[1..].iter().any(|r| ids(r).contains(&"low")));
        assert_partition(&items, &rows);
    }

    #[test]
    fn test_significant_leading_item_is_not_skipped() {
        let items = [h("lead", 4), h("hero", 5), h("tail", 4)];
        let rows = build_rows(&items, 5).unwrap();
        assert!(ids(&rows[0]).contains(&"lead"));
        assert_partition(&items, &rows);
    }

    #[test]
    fn test_many_small_nested_quad() {
        let items = [v("a", 2), v("b", 3), v("c", 2), h("d", 2)];
        let rows = build_rows(&items, 5).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pattern, PatternName::ManySmall);
        assert_eq!(
            rows[0].layout,
            RowLayout::NestedQuad {
                main: 1,
                top: [0, 2],
                bottom: 3,
            }
        );
    }

    #[test]
    fn test_many_small_fills_wide_row() {
        let items: Vec<ContentItem> = (0..5).map(|i| h(&format!("s{}", i), 1)).collect();
        let rows = build_rows(&items, 5).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].pattern, PatternName::ManySmall);
        assert_eq!(rows[0].layout, RowLayout::Horizontal);
        assert_eq!(rows[0].box_tree.leaf_count(), 5);
    }

    #[test]
    fn test_single_slot_rows() {
        let items = [h("a", 5), v("b", 1), h("c", 3), v("d", 4)];
        let rows = build_rows(&items, 1).unwrap();
        assert_eq!(rows.len(), items.len());
        assert!(rows.iter().all(|r| r.len() == 1));
        assert_partition(&items, &rows);
    }

    #[test]
    fn test_components_keep_original_order() {
        let items = [
            h("a", 4),
            v("b", 1),
            h("c", 4),
            v("d", 2),
            h("e", 3),
            h("f", 3),
            h("g", 3),
            v("h", 5),
            v("i", 5),
        ];
        let rows = build_rows(&items, 5).unwrap();
        assert_partition(&items, &rows);
        for row in &rows {
            assert!(row.used_indices.windows(2).all(|w| w[0] < w[1]));
            for (component, &index) in row.components.iter().zip(&row.used_indices) {
                assert_eq!(component.id, items[index].id);
            }
        }
    }

    #[test]
    fn test_pattern_rows_are_complete() {
        let items: Vec<ContentItem> = (0..40)
            .map(|i| {
                let rating = (i * 7 % 6) as u8;
                if i % 3 == 0 {
                    v(&format!("v{}", i), rating)
                } else {
                    h(&format!("h{}", i), rating)
                }
            })
            .collect();
        let rows = build_rows(&items, 5).unwrap();
        assert_partition(&items, &rows);
        for row in rows.iter().filter(|r| !r.is_fallback()) {
            assert!(is_row_complete(&row.components, 5), "{:?}", row.pattern);
        }
        for row in &rows {
            assert!(row.fill_ratio <= 1.15 + 1e-9);
            assert_eq!(row.box_tree.leaf_count(), row.len());
        }
    }

    #[test]
    fn test_row_indices_are_sequential() {
        let items: Vec<ContentItem> = (0..12).map(|i| h(&format!("{}", i), 4)).collect();
        let rows = build_rows(&items, 5).unwrap();
        assert_eq!(rows.len(), 6);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.row_index, i as u32);
        }
    }

    #[test]
    fn test_force_fill_reaches_past_the_window() {
        // Only the last item completes the first row, and it sits beyond the window.
        let mut items = vec![h("a", 3), h("b", 4)];
        items.extend((0..6).map(|i| h(&format!("hero{}", i), 5)));
        items.push(v("small", 2));
        assert!(items.len() > RowBuilder::new(5).window_size());

        let rows = build_rows(&items, 5).unwrap();
        assert!(rows[0].is_fallback());
        assert_eq!(rows[0].used_indices, vec![0, 1, 8]);
        assert!((rows[0].fill_ratio - 1.0333).abs() < 1e-3);
        assert_eq!(rows.len(), 7);
        assert!(rows[1..].iter().all(|r| r.pattern == PatternName::Hero));
    }

    #[test]
    fn test_narrow_rows_keep_significant_leading_item() {
        let items = [h("lead", 4), h("hero", 5)];
        for row_width in [1, 2] {
            let rows = build_rows(&items, row_width).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].used_indices, vec![0]);
            assert_eq!(rows[1].pattern, PatternName::Hero);
        }
    }

    #[test]
    fn test_backtracked_assignment_fills_row() {
        let items = [h("main", 4), h("small", 1), v("tall", 5)];
        let rows = build_rows(&items, 5).unwrap();
        assert_eq!(rows[0].pattern, PatternName::DominantSecondary);
        assert_eq!(rows[0].used_indices, vec![0, 2]);
        assert!((rows[0].fill_ratio - 1.0).abs() < 1e-9);
        assert_eq!(ids(&rows[1]), vec!["small"]);
    }

    #[test]
    fn test_window_size_grows_with_row_width() {
        assert_eq!(RowBuilder::new(5).window_size(), 8);
        assert_eq!(RowBuilder::new(10).window_size(), 13);
    }

    #[test]
    fn test_plan_round_trips_through_rows_from_plans() {
        let items = [h("main", 4), v("s1", 3), v("s2", 3), h("x", 5)];
        let builder = RowBuilder::new(5);
        let plans = builder.plan(&items).unwrap();
        let rebuilt = builder.rows_from_plans(&items, &plans).unwrap();
        let direct = builder.build(&items).unwrap();
        assert_eq!(rebuilt.len(), direct.len());
        for (a, b) in rebuilt.iter().zip(&direct) {
            assert_eq!(a.layout, b.layout);
            assert_eq!(a.box_tree, b.box_tree);
        }
    }
}
