//! Streaming int-count core for n-gram language-model estimation.
//!
//! Count files are sorted streams of per-context records, each mapping a
//! next-symbol id to an aggregate [`Count`] that also keeps its three
//! largest contributions. Everything here is single-pass and holds one
//! record in memory at a time, so files can be far larger than RAM.

pub mod count;
pub mod error;
pub mod extract;
pub mod filter;
pub mod record;
pub mod stream;

pub use count::{Count, SlotCredits};
pub use error::DataError;
pub use extract::{HistoryExtractor, StreamStats};
pub use filter::{FilterStats, StreamFilter};
pub use record::ContextRecord;
pub use stream::{Format, HistListReader, RecordReader, RecordWriter};
