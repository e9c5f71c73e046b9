//! `ws-output`: simulation output for the `wsim` simulator.
//!
//! | Module       | Files                                                   |
//! |--------------|---------------------------------------------------------|
//! | [`csv`]      | `round_summaries.csv`, `deliveries.csv`                 |
//! | [`snapshot`] | position snapshot (`Number of nodes:` + `x,y,z` lines)  |
//!
//! Writers implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `ws_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ws_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod snapshot;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{DeliveryRow, RoundSummaryRow};
pub use snapshot::{read_positions, read_positions_from, write_positions, write_positions_to};
pub use writer::OutputWriter;
