use thiserror::Error;

use ws_core::SimTime;

#[derive(Clone, Debug, Error)]
pub enum ScheduleError {
    #[error("timer delay must be positive, got {0}")]
    NonPositiveDelay(f64),

    #[error("fire time {time} is not after the current time {now}")]
    NotInFuture { time: SimTime, now: SimTime },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
