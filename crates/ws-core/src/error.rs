//! Framework error type.
//!
//! Sub-crates define their own error enums and convert `WsError` into them
//! via `From` impls, so configuration failures surface unchanged at the
//! simulation boundary.

use thiserror::Error;

use crate::NodeId;

/// The top-level error type for `ws-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum WsError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WsError {
    /// Shorthand for a [`WsError::Config`] naming an offending parameter.
    pub fn invalid_param(name: &str, value: impl std::fmt::Display, expected: &str) -> Self {
        WsError::Config(format!("parameter `{name}` = {value} is invalid: expected {expected}"))
    }
}

/// Shorthand result type for all `ws-*` crates.
pub type WsResult<T> = Result<T, WsError>;
