//! Single-pass extraction of the distinct leading history symbols of a
//! sorted count stream.
//!
//! Records sharing a leading symbol are contiguous in a sorted file, so
//! one `last_emitted` scalar is enough state; a leading symbol that goes
//! backwards means the input was never sorted and processing stops.

use std::io::BufRead;

use crate::error::DataError;
use crate::stream::RecordReader;

/// Running totals reported to stderr by the binaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Records consumed.
    pub records: u64,
    /// Next-symbol count entries consumed.
    pub entries: u64,
}

pub struct HistoryExtractor<R: BufRead> {
    reader: RecordReader<R>,
    last_emitted: Option<u32>,
    stats: StreamStats,
}

impl<R: BufRead> HistoryExtractor<R> {
    pub fn new(reader: RecordReader<R>) -> Self {
        Self {
            reader,
            last_emitted: None,
            stats: StreamStats::default(),
        }
    }

    /// The next distinct leading symbol, strictly greater than anything
    /// emitted before; `None` once the stream is exhausted.
    pub fn next_history(&mut self) -> Result<Option<u32>, DataError> {
        while self.reader.has_next()? {
            let record = self.reader.next()?;
            self.stats.records += 1;
            self.stats.entries += record.counts.len() as u64;
            let lead = record.leading();
            match self.last_emitted {
                Some(prev) if lead == prev => continue,
                Some(prev) if lead < prev => {
                    return Err(DataError::Unsorted(format!(
                        "leading history {} after {}",
                        lead, prev
                    )));
                }
                _ => {
                    self.last_emitted = Some(lead);
                    return Ok(Some(lead));
                }
            }
        }
        Ok(None)
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }
}
