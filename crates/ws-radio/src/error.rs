//! Radio-model error type.

use thiserror::Error;

use ws_core::WsError;

/// Errors raised while constructing radio models.  Running models never
/// fail: per-packet outcomes are data, see [`DeliveryOutcome`][crate::DeliveryOutcome].
#[derive(Debug, Error)]
pub enum RadioError {
    #[error(transparent)]
    Config(#[from] WsError),

    #[error("invalid distribution: {0}")]
    Distribution(String),
}

pub type RadioResult<T> = Result<T, RadioError>;
