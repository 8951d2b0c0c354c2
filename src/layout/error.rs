use thiserror::Error;

/// Errors raised by the row layout engine.
///
/// Pattern non-matches are not errors; they surface as `None` from the matcher.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("row width must be at least 1, got {0}")]
    InvalidRowWidth(u32),

    #[error("item {id:?} has invalid aspect ratio {aspect_ratio}")]
    InvalidAspectRatio { id: String, aspect_ratio: f64 },

    #[error("item {id:?} has rating {rating}, expected 0..=5")]
    RatingOutOfRange { id: String, rating: u8 },

    #[error("force-fill invoked with an empty window")]
    EmptyWindow,
}
