//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use ws_core::{Round, SimTime};
use ws_radio::{DeliveryOutcome, PacketHeader};
use ws_sim::{RoundStats, SimObserver};

use crate::row::{DeliveryRow, RoundSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes round summaries and resolved packets to any
/// [`OutputWriter`] backend.
///
/// Resolved packets are buffered and written once per round.  In
/// asynchronous mode there are no rounds: the buffer is written at the end
/// of the run together with a single summary row of the totals.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:      W,
    deliveries:  bool,
    pending:     Vec<DeliveryRow>,
    saw_rounds:  bool,
    last_error:  Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            deliveries: true,
            pending:    Vec::new(),
            saw_rounds: false,
            last_error: None,
        }
    }

    /// Skip the per-packet rows; only round summaries are written.
    pub fn without_deliveries(mut self) -> Self {
        self.deliveries = false;
        self
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let result = self.writer.write_deliveries(&self.pending);
        self.pending.clear();
        self.store_err(result);
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_round_end(&mut self, _round: Round, stats: &RoundStats) {
        self.saw_rounds = true;
        self.flush_pending();
        let result = self.writer.write_round_summary(&RoundSummaryRow::from(stats));
        self.store_err(result);
    }

    fn on_packet_resolved(&mut self, packet: &PacketHeader, _outcome: DeliveryOutcome) {
        if self.deliveries {
            self.pending.push(DeliveryRow::from(packet));
        }
    }

    fn on_sim_end(&mut self, _time: SimTime, totals: &RoundStats) {
        self.flush_pending();
        if !self.saw_rounds {
            let result = self.writer.write_round_summary(&RoundSummaryRow::from(totals));
            self.store_err(result);
        }
        let result = self.writer.finish();
        self.store_err(result);
    }
}
