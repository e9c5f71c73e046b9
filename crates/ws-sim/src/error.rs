use thiserror::Error;

use ws_core::{ExecutionMode, WsError};
use ws_mobility::MobilityError;
use ws_radio::RadioError;
use ws_schedule::ScheduleError;
use ws_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] WsError),

    #[error("scheduling error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("radio model error: {0}")]
    Radio(#[from] RadioError),

    #[error("spatial index error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("mobility error: {0}")]
    Mobility(#[from] MobilityError),

    #[error("{what} length {got} does not match node count {expected}")]
    NodeCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("edge arena is full at {0} slots")]
    EdgeArenaFull(usize),

    #[error("{operation} is not available in {mode:?} mode")]
    WrongMode {
        operation: &'static str,
        mode:      ExecutionMode,
    },
}

pub type SimResult<T> = Result<T, SimError>;
