//! Curated catalog of row patterns.
//!
//! Patterns are listed from most to least selective; the row builder tries
//! them in this order at every cursor position. Rating thresholds always
//! apply to the effective rating (after the vertical penalty).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{ContentItem, Orientation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternName {
    Hero,
    HorizontalPair,
    VerticalPair,
    DominantSecondary,
    ThreeHorizontal,
    DominantStacked,
    ManySmall,
    /// Rows produced by the force-fill packer. Never matched directly.
    Fallback,
}

impl PatternName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::HorizontalPair => "horizontal-pair",
            Self::VerticalPair => "vertical-pair",
            Self::DominantSecondary => "dominant-secondary",
            Self::ThreeHorizontal => "three-horizontal",
            Self::DominantStacked => "dominant-stacked",
            Self::ManySmall => "many-small",
            Self::Fallback => "fallback",
        }
    }

    /// Catalog entry for this name; `None` for the fallback sentinel.
    pub fn definition(self) -> Option<&'static PatternDefinition> {
        CATALOG.iter().find(|p| p.name == self)
    }

    /// Box direction reported for rows of this pattern. Force-filled rows are
    /// laid out left to right.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Fallback => Some(Direction::Horizontal),
            _ => self.definition().and_then(|p| p.direction),
        }
    }
}

impl fmt::Display for PatternName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// Structural constraint one item must meet to fill a pattern role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub orientation: Option<Orientation>,
    pub min_rating: Option<u8>,
    pub max_rating: Option<u8>,
}

impl Requirement {
    pub const fn any() -> Self {
        Self {
            orientation: None,
            min_rating: None,
            max_rating: None,
        }
    }

    pub const fn horizontal() -> Self {
        Self {
            orientation: Some(Orientation::Horizontal),
            ..Self::any()
        }
    }

    pub const fn vertical() -> Self {
        Self {
            orientation: Some(Orientation::Vertical),
            ..Self::any()
        }
    }

    pub const fn at_least(self, rating: u8) -> Self {
        Self {
            min_rating: Some(rating),
            ..self
        }
    }

    pub const fn at_most(self, rating: u8) -> Self {
        Self {
            max_rating: Some(rating),
            ..self
        }
    }

    pub const fn exactly(self, rating: u8) -> Self {
        self.at_least(rating).at_most(rating)
    }

    pub fn accepts_rating(&self, effective_rating: u8) -> bool {
        self.min_rating.map_or(true, |min| effective_rating >= min)
            && self.max_rating.map_or(true, |max| effective_rating <= max)
    }

    /// Flexible patterns relax the orientation constraint on their later roles.
    pub fn accepts(&self, item: &ContentItem, ignore_orientation: bool) -> bool {
        let orientation_ok = ignore_orientation
            || self
                .orientation
                .map_or(true, |orientation| item.orientation() == orientation);
        orientation_ok && self.accepts_rating(item.effective_rating())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternDefinition {
    pub name: PatternName,
    pub requirements: &'static [Requirement],
    pub direction: Option<Direction>,
    /// Max effective-rating spread among items filling identical roles.
    pub rating_proximity: Option<u8>,
    /// Max unselected window items between the anchor and the last selected item.
    pub max_proximity: Option<usize>,
    /// Roles after the first may be filled by any remaining items, in any order.
    pub flexible: bool,
    pub min_row_width: u32,
    /// The first role is the dominant item of a main + stack row.
    pub has_main: bool,
    /// The last role may repeat until the row is full.
    pub extendable: bool,
}

impl PatternDefinition {
    pub fn min_items(&self) -> usize {
        self.requirements.len()
    }

    pub fn applies_to_width(&self, row_width: u32) -> bool {
        row_width >= self.min_row_width
    }
}

/// Ordered by priority: most specific first, most permissive last.
pub const CATALOG: &[PatternDefinition] = &[
    PatternDefinition {
        name: PatternName::Hero,
        requirements: &[Requirement::horizontal().exactly(5)],
        direction: Some(Direction::Horizontal),
        rating_proximity: None,
        max_proximity: None,
        flexible: false,
        min_row_width: 1,
        has_main: false,
        extendable: false,
    },
    PatternDefinition {
        name: PatternName::HorizontalPair,
        requirements: &[
            Requirement::horizontal().at_least(3).at_most(4),
            Requirement::horizontal().at_least(3).at_most(4),
        ],
        direction: Some(Direction::Horizontal),
        rating_proximity: Some(1),
        max_proximity: Some(2),
        flexible: false,
        min_row_width: 2,
        has_main: false,
        extendable: false,
    },
    PatternDefinition {
        name: PatternName::VerticalPair,
        requirements: &[
            Requirement::vertical().at_least(3),
            Requirement::vertical().at_least(3),
        ],
        direction: Some(Direction::Horizontal),
        rating_proximity: Some(0),
        max_proximity: Some(2),
        flexible: false,
        min_row_width: 2,
        has_main: false,
        extendable: false,
    },
    PatternDefinition {
        name: PatternName::DominantSecondary,
        requirements: &[
            Requirement::horizontal().exactly(4),
            Requirement::any().at_most(4),
        ],
        direction: Some(Direction::Horizontal),
        rating_proximity: None,
        max_proximity: Some(1),
        flexible: false,
        min_row_width: 2,
        has_main: true,
        extendable: false,
    },
    PatternDefinition {
        name: PatternName::ThreeHorizontal,
        requirements: &[
            Requirement::horizontal().at_least(2).at_most(3),
            Requirement::horizontal().at_least(2).at_most(3),
            Requirement::horizontal().at_least(2).at_most(3),
        ],
        direction: Some(Direction::Horizontal),
        rating_proximity: Some(0),
        max_proximity: Some(2),
        flexible: false,
        min_row_width: 3,
        has_main: false,
        extendable: false,
    },
    PatternDefinition {
        name: PatternName::DominantStacked,
        requirements: &[
            Requirement::horizontal().exactly(4),
            Requirement::any().at_most(3),
            Requirement::any().at_most(3),
        ],
        direction: Some(Direction::Vertical),
        rating_proximity: None,
        max_proximity: Some(2),
        flexible: true,
        min_row_width: 3,
        has_main: true,
        extendable: false,
    },
    PatternDefinition {
        name: PatternName::ManySmall,
        requirements: &[
            Requirement::any().at_most(2),
            Requirement::any().at_most(2),
            Requirement::any().at_most(2),
        ],
        direction: None,
        rating_proximity: None,
        max_proximity: Some(1),
        flexible: true,
        min_row_width: 3,
        has_main: false,
        extendable: true,
    },
];
