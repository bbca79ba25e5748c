use thiserror::Error;

/// Data-invariant failures while reading or validating count streams.
///
/// These indicate an upstream pipeline bug or a corrupted intermediate
/// file; the binaries stop immediately on any of them rather than trying
/// to route around bad data.
#[derive(Debug, Error)]
pub enum DataError {
    /// `next()` was called after the stream was exhausted.
    #[error("end of stream")]
    EndOfStream,

    /// Bytes were present but could not be decoded into a record.
    #[error("corrupt input: {0}")]
    Corrupt(String),

    /// Input violated the sorted-order precondition.
    #[error("input not sorted: {0}")]
    Unsorted(String),

    /// A non-derivative count failed `total >= top1 >= top2 >= top3 >= 0`.
    #[error("count invariant violated: total={total} top1={top1} top2={top2} top3={top3}")]
    CountInvariant {
        total: f32,
        top1: f32,
        top2: f32,
        top3: f32,
    },

    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}
