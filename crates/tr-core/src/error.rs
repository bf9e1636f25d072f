use crate::model::ShapeKind;
use thiserror::Error;

/// Fatal shape-construction failures. Raised before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("shape kind `{0}` is not supported")]
    UnsupportedShape(String),

    #[error("{field} is required to create a {shape}")]
    MissingGeometry {
        shape: ShapeKind,
        field: &'static str,
    },
}

/// Failure reported by an [`ImageLoader`](crate::surface::ImageLoader) for a
/// requested URL. The engine makes no retry attempt; the pending slot is
/// dropped and the failure logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load image from `{url}`")]
pub struct ImageError {
    pub url: String,
}
