use std::result::Result as StdResult;

use thiserror::Error;

use crate::{geom, id::NodeId};

/// Result type for trellis operations.
pub type Result<T> = StdResult<T, Error>;

/// Core error type.
#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("invalid dimensions: {w}x{h}")]
    /// A draw target was constructed with a width or height below one.
    InvalidDimensions {
        /// Requested width.
        w: i32,
        /// Requested height.
        h: i32,
    },
    #[error("not implemented: {0}")]
    /// A drawing operation was invoked on a target that does not provide it.
    Unsupported(&'static str),
    #[error("node already has a parent: {0:?}")]
    /// Re-parenting without detaching first.
    AlreadyParented(NodeId),
    #[error("node not found: {0:?}")]
    /// The node is not (or no longer) in the arena.
    NodeNotFound(NodeId),
    #[error("unknown frame {key} in namespace {namespace}")]
    /// A sprite frame lookup failed.
    UnknownFrame {
        /// Registry namespace.
        namespace: String,
        /// Frame key within the namespace.
        key: String,
    },
    #[error("unknown animation: {0}")]
    /// A sprite animation lookup failed.
    UnknownAnimation(String),
    #[error("unknown screen: {0}")]
    /// A screen was requested that was never registered.
    UnknownScreen(String),
    #[error("metadata: {0}")]
    /// Sprite or configuration metadata could not be parsed.
    Metadata(String),
    #[error("backend: {0}")]
    /// The graphics backend refused an operation.
    Backend(String),
    #[error("geometry: {0}")]
    /// Geometry failure.
    Geometry(String),
    #[error("invalid: {0}")]
    /// Invalid input error.
    Invalid(String),
}

impl From<geom::Error> for Error {
    fn from(e: geom::Error) -> Self {
        match e {
            geom::Error::InvalidDimensions { w, h } => Self::InvalidDimensions { w, h },
            other => Self::Geometry(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Metadata(e.to_string())
    }
}
