//! recordcount: rebuild the node statistics of decision-tree ensembles.
//!
//! A tree ensemble carries, at every node, how many training records reached
//! it and how they split across classes. When those statistics are lost or
//! stale, they can be rebuilt by replaying a labeled dataset through the
//! model and counting where every row goes.
//!
//! # Key Types
//!
//! - [`Model`] - An ensemble (or single tree) with its data dictionary
//! - [`ReplayConfig`] - How the dataset is read and the result written
//! - [`RecountError`] - Everything that can abort a recount
//!
//! # Recounting
//!
//! Use [`run`] to go from a model file and a dataset file to a recounted
//! model file, or [`recount`] to work on an in-memory model.
//! See the [`recount`](mod@recount) module for details.

pub mod config;
pub mod inference;
pub mod persist;
pub mod recount;
pub mod repr;
pub mod testing;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use config::{ConfigError, ReplayConfig};
pub use persist::JsonWriteOptions;
pub use recount::{recount, run, RecountError, ReplaySummary};
pub use repr::Model;
