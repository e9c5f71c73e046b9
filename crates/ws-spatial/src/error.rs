//! Spatial-subsystem error type.

use thiserror::Error;

use ws_core::NodeId;

/// Errors produced by `ws-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("spatial index radius must be positive, got {0}")]
    InvalidRadius(f64),

    #[error("node {0} is not in the spatial index")]
    NodeNotFound(NodeId),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
