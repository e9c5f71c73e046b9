//! The `OutputWriter` trait implemented by backend writers.

use crate::{DeliveryRow, OutputResult, RoundSummaryRow};

/// Sink for simulation statistics.
///
/// Errors are returned here but swallowed by the observer, which keeps the
/// first one for [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    fn write_round_summary(&mut self, row: &RoundSummaryRow) -> OutputResult<()>;

    /// Write a batch of resolved packets.
    fn write_deliveries(&mut self, rows: &[DeliveryRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent, safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
