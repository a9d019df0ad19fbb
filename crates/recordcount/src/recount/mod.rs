//! Record-count reconstruction.
//!
//! A recount accepts an ensemble of decision trees, zeroes every node's
//! counters and then replays a labeled dataset through the model: each row is
//! evaluated, and every segment's decision path adds one record to each node
//! it visits (and, for classification, one to the row's class at that node).
//!
//! ```
//! use recordcount::recount::recount;
//! use recordcount::{testing, ReplayConfig};
//!
//! let mut model = testing::two_segment_classifier();
//! let data = "x,y\n0.5,yes\n1.5,no\n2.5,yes\n";
//! let summary = recount(&mut model, data.as_bytes(), &ReplayConfig::default()).unwrap();
//!
//! assert_eq!(summary.rows, 3);
//! assert_eq!(testing::record_count(&model, 0, 0), Some(3));
//! ```

mod accumulate;
mod dataset;
mod error;
mod guard;
mod replay;
mod reset;

pub use accumulate::{accumulate_path, accumulate_row, AccumulationStats};
pub use dataset::DatasetReader;
pub use error::{RecountError, RowDefect};
pub use guard::{check_model, AcceptedModel};
pub use replay::{recount, replay, run, ReplaySummary};
pub use reset::{reset_counts, reset_tree};
