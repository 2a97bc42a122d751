use std::{error::Error as StdError, fmt, result::Result as StdResult};

/// Geometry error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A surface or box was given a width or height below one.
    InvalidDimensions {
        /// Requested width.
        w: i32,
        /// Requested height.
        h: i32,
    },
    /// Generic geometry error message.
    Geometry(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { w, h } => write!(f, "invalid dimensions {w}x{h}"),
            Self::Geometry(s) => write!(f, "{s}"),
        }
    }
}

impl StdError for Error {}

/// Result type for geometry operations.
pub type Result<T> = StdResult<T, Error>;
