use serde::{Deserialize, Serialize};

/// Highest rating a caller may assign to an item.
pub const MAX_RATING: u8 = 5;

/// Fixed penalty subtracted from the rating of vertical items.
pub const VERTICAL_PENALTY: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Photo,
    Collection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub aspect_ratio: f64,
    pub rating: u8,
    #[serde(default)]
    pub kind: ContentKind,
}

impl ContentItem {
    /// Create a new photo item
    pub fn new(id: impl Into<String>, aspect_ratio: f64, rating: u8) -> Self {
        Self {
            id: id.into(),
            aspect_ratio,
            rating,
            kind: ContentKind::Photo,
        }
    }

    /// Create a collection thumbnail item with fixed 1:1 aspect ratio
    pub fn new_collection(id: impl Into<String>, rating: u8) -> Self {
        Self {
            id: id.into(),
            aspect_ratio: 1.0,
            rating,
            kind: ContentKind::Collection,
        }
    }

    /// Build an item from pixel dimensions. Zero height falls back to square.
    pub fn from_dimensions(id: impl Into<String>, width: u32, height: u32, rating: u8) -> Self {
        let aspect_ratio = if height == 0 {
            1.0
        } else {
            width as f64 / height as f64
        };
        Self::new(id, aspect_ratio, rating)
    }

    /// Square items count as vertical.
    pub fn orientation(&self) -> Orientation {
        if self.aspect_ratio > 1.0 {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.orientation() == Orientation::Horizontal
    }

    pub fn is_vertical(&self) -> bool {
        self.orientation() == Orientation::Vertical
    }

    pub fn is_collection(&self) -> bool {
        self.kind == ContentKind::Collection
    }

    /// Rating after the vertical penalty.
    pub fn effective_rating(&self) -> u8 {
        match self.orientation() {
            Orientation::Horizontal => self.rating,
            Orientation::Vertical => self.rating.saturating_sub(VERTICAL_PENALTY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_aspect_ratio() {
        assert_eq!(
            ContentItem::new("a", 1920.0 / 1080.0, 3).orientation(),
            Orientation::Horizontal
        );
        assert_eq!(
            ContentItem::new("b", 1080.0 / 1920.0, 3).orientation(),
            Orientation::Vertical
        );
        assert_eq!(ContentItem::new("c", 1.0, 3).orientation(), Orientation::Vertical);
    }

    #[test]
    fn test_effective_rating_penalizes_vertical() {
        assert_eq!(ContentItem::new("h", 2.0, 4).effective_rating(), 4);
        assert_eq!(ContentItem::new("v", 0.5, 4).effective_rating(), 3);
        assert_eq!(ContentItem::new("v", 0.5, 1).effective_rating(), 0);
        assert_eq!(ContentItem::new("v", 0.5, 0).effective_rating(), 0);
    }

    #[test]
    fn test_from_dimensions() {
        let item = ContentItem::from_dimensions("wide.jpg", 1920, 1080, 2);
        assert!(item.is_horizontal());
        assert!((item.aspect_ratio - 1920.0 / 1080.0).abs() < 1e-12);

        let broken = ContentItem::from_dimensions("broken.jpg", 100, 0, 2);
        assert_eq!(broken.aspect_ratio, 1.0);
    }

    #[test]
    fn test_collection_is_square() {
        let folder = ContentItem::new_collection("trips", 4);
        assert!(folder.is_collection());
        assert!(folder.is_vertical());
        assert_eq!(folder.effective_rating(), 3);
    }

    #[test]
    fn test_deserialize_defaults_kind() {
        let item: ContentItem =
            serde_json::from_str(r#"{"id":"x","aspectRatio":1.5,"rating":2}"#).unwrap();
        assert_eq!(item.kind, ContentKind::Photo);
        assert_eq!(item.rating, 2);
    }
}
