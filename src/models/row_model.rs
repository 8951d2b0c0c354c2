use serde::Serialize;

use crate::layout::box_tree::BoxTree;
use crate::layout::patterns::{Direction, PatternName};
use crate::models::ContentItem;

/// Nesting shape of a finished row. Indices point into `Row::components`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "kebab-case")]
pub enum RowLayout {
    Horizontal,
    MainStacked {
        main: usize,
        stacked: Vec<usize>,
    },
    NestedQuad {
        main: usize,
        top: [usize; 2],
        bottom: usize,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub row_index: u32,
    pub pattern: PatternName,
    /// Indices into the input slice, ascending.
    pub used_indices: Vec<usize>,
    pub components: Vec<ContentItem>,
    pub direction: Option<Direction>,
    pub layout: RowLayout,
    pub box_tree: BoxTree,
    pub fill_ratio: f64,
}

impl Row {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.pattern == PatternName::Fallback
    }
}
