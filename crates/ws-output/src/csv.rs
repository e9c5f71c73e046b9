//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `round_summaries.csv`
//! - `deliveries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{DeliveryRow, OutputResult, RoundSummaryRow};

pub const ROUND_SUMMARIES_FILE: &str = "round_summaries.csv";
pub const DELIVERIES_FILE: &str = "deliveries.csv";

/// Writes simulation statistics to two CSV files.
pub struct CsvWriter {
    summaries:  Writer<File>,
    deliveries: Writer<File>,
    finished:   bool,
}

impl CsvWriter {
    /// Create (or truncate) the two CSV files in `dir` and write the header
    /// rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut summaries = Writer::from_path(dir.join(ROUND_SUMMARIES_FILE))?;
        summaries.write_record([
            "round",
            "time",
            "delivered",
            "dropped",
            "disturbed",
            "not_connected",
            "edges",
            "packets_in_air",
        ])?;

        let mut deliveries = Writer::from_path(dir.join(DELIVERIES_FILE))?;
        deliveries.write_record(["packet", "origin", "destination", "kind", "sent", "arrived", "outcome"])?;

        Ok(Self { summaries, deliveries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_round_summary(&mut self, row: &RoundSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.round.to_string(),
            row.time.to_string(),
            row.delivered.to_string(),
            row.dropped.to_string(),
            row.disturbed.to_string(),
            row.not_connected.to_string(),
            row.edges.to_string(),
            row.packets_in_air.to_string(),
        ])?;
        Ok(())
    }

    fn write_deliveries(&mut self, rows: &[DeliveryRow]) -> OutputResult<()> {
        for row in rows {
            self.deliveries.write_record(&[
                row.packet.to_string(),
                row.origin.to_string(),
                row.destination.to_string(),
                row.kind.to_string(),
                row.sent.to_string(),
                row.arrived.to_string(),
                row.outcome.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.summaries.flush()?;
        self.deliveries.flush()?;
        Ok(())
    }
}
