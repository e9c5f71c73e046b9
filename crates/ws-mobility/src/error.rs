use thiserror::Error;
use ws_core::WsError;

#[derive(Debug, Error)]
pub enum MobilityError {
    #[error(transparent)]
    Config(#[from] WsError),

    #[error("grid distribution needs a positive area, got {width} x {height}")]
    EmptyArea { width: f64, height: f64 },
}

pub type MobilityResult<T> = Result<T, MobilityError>;
