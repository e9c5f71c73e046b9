//! Position snapshot files.
//!
//! # Format
//!
//! ```text
//! Number of nodes: 3
//! 0,0,0
//! 10.5,20,0
//! 31,4.25,0
//! ```
//!
//! One `x,y,z` line per node in `NodeId` order.  Feed the result of
//! [`read_positions`] to `SimBuilder::positions` to replay a placement.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use ws_core::Position;

use crate::{OutputError, OutputResult};

const SENTINEL: &str = "Number of nodes:";

/// Write `positions` to a new file at `path`.
pub fn write_positions(path: &Path, positions: &[Position]) -> OutputResult<()> {
    let file = File::create(path)?;
    write_positions_to(file, positions)
}

/// Like [`write_positions`] but accepts any `Write` sink.
pub fn write_positions_to<W: Write>(mut sink: W, positions: &[Position]) -> OutputResult<()> {
    writeln!(sink, "{SENTINEL} {}", positions.len())?;
    let mut rows = csv::WriterBuilder::new().has_headers(false).from_writer(sink);
    for p in positions {
        rows.serialize((p.x, p.y, p.z))?;
    }
    rows.flush()?;
    Ok(())
}

/// Load a snapshot written by [`write_positions`].
pub fn read_positions(path: &Path) -> OutputResult<Vec<Position>> {
    let file = File::open(path)?;
    read_positions_from(file)
}

/// Like [`read_positions`] but accepts any `Read` source.
///
/// The node count in the first line must match the number of position
/// lines that follow.
pub fn read_positions_from<R: Read>(source: R) -> OutputResult<Vec<Position>> {
    let mut reader = BufReader::new(source);
    let mut first = String::new();
    reader.read_line(&mut first)?;

    let count: usize = first
        .trim()
        .strip_prefix(SENTINEL)
        .ok_or_else(|| malformed(1, format!("expected `{SENTINEL}`")))?
        .trim()
        .parse()
        .map_err(|e| malformed(1, format!("bad node count: {e}")))?;

    let mut rows = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut positions = Vec::with_capacity(count.min(1_000_000));
    for (i, record) in rows.deserialize::<(f64, f64, f64)>().enumerate() {
        let (x, y, z) = record.map_err(|e| malformed(i + 2, e.to_string()))?;
        positions.push(Position::new(x, y, z));
    }

    if positions.len() != count {
        return Err(malformed(
            positions.len() + 2,
            format!("header announces {count} nodes, found {}", positions.len()),
        ));
    }
    Ok(positions)
}

fn malformed(line: usize, message: String) -> OutputError {
    OutputError::Snapshot { line, message }
}
