//! `ws-spatial`: candidate-neighbor lookup for the connectivity pass.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`index`] | `SpatialIndex` (R-tree of node positions, bounded radius) |
//! | [`error`] | `SpatialError`, `SpatialResult<T>`                        |
//!
//! The index answers one question: which nodes lie within its configured
//! bound of a point?  Connectivity models only ever see those candidates, so a
//! model whose radius exceeds the bound silently misses neighbors.  The
//! connectivity layer warns about that at construction time.

pub mod error;
pub mod index;


pub use error::{SpatialError, SpatialResult};
pub use index::SpatialIndex;
