//! Recursive binary box tree handed to the downstream sizer.
//!
//! Every `Combined` node has exactly two children. Runs of three or more items
//! fold to the left, so nesting grows on the left-hand side.

use serde::Serialize;

use crate::layout::patterns::Direction;
use crate::models::{ContentItem, RowLayout};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BoxTree {
    Leaf {
        item: ContentItem,
    },
    Combined {
        direction: Direction,
        left: Box<BoxTree>,
        right: Box<BoxTree>,
    },
}

impl BoxTree {
    pub fn leaf(item: &ContentItem) -> Self {
        Self::Leaf { item: item.clone() }
    }

    pub fn combined(direction: Direction, left: BoxTree, right: BoxTree) -> Self {
        Self::Combined {
            direction,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Left fold of `nodes` under `direction`; `None` when empty.
    pub fn fold<I>(nodes: I, direction: Direction) -> Option<Self>
    where
        I: IntoIterator<Item = BoxTree>,
    {
        let mut nodes = nodes.into_iter();
        let first = nodes.next()?;
        Some(nodes.fold(first, |acc, next| Self::combined(direction, acc, next)))
    }

    /// Build the tree for a classified row. `None` for an empty row.
    pub fn build(components: &[ContentItem], layout: &RowLayout) -> Option<Self> {
        match layout {
            RowLayout::Horizontal => {
                Self::fold(components.iter().map(Self::leaf), Direction::Horizontal)
            }
            RowLayout::MainStacked { main, stacked } => {
                let main = Self::leaf(components.get(*main)?);
                let stack = Self::fold(
                    stacked
                        .iter()
                        .filter_map(|&i| components.get(i))
                        .map(Self::leaf),
                    Direction::Vertical,
                )?;
                Some(Self::combined(Direction::Horizontal, main, stack))
            }
            RowLayout::NestedQuad { main, top, bottom } => {
                let main = Self::leaf(components.get(*main)?);
                let top = Self::combined(
                    Direction::Horizontal,
                    Self::leaf(components.get(top[0])?),
                    Self::leaf(components.get(top[1])?),
                );
                let bottom = Self::leaf(components.get(*bottom)?);
                Some(Self::combined(
                    Direction::Horizontal,
                    main,
                    Self::combined(Direction::Vertical, top, bottom),
                ))
            }
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Combined { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Combined { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Leaves in left-to-right, top-to-bottom order.
    pub fn leaves(&self) -> Vec<&ContentItem> {
        let mut out = Vec::with_capacity(self.leaf_count());
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ContentItem>) {
        match self {
            Self::Leaf { item } => out.push(item),
            Self::Combined { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }
}
