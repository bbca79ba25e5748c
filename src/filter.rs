//! Semi-join of a sorted count stream against a sorted history-id list.
//!
//! Classic two-pointer merge-intersection: both inputs ascend by the
//! same key (the record's leading history symbol), so one comparison per
//! step selects exactly the records whose leading symbol appears in the
//! id list, in original stream order, with one record in memory at a
//! time. Records left after the id list runs out are still read so the
//! reported totals cover the whole input; they are never emitted.

use std::io::BufRead;

use crate::error::DataError;
use crate::extract::StreamStats;
use crate::record::ContextRecord;
use crate::stream::{HistListReader, RecordReader};

/// Totals for the filter's stderr summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub total: StreamStats,
    pub filtered: StreamStats,
}

pub struct StreamFilter<R: BufRead, H: BufRead> {
    records: RecordReader<R>,
    ids: HistListReader<H>,
    current_id: Option<u32>,
    started: bool,
    stats: FilterStats,
}

impl<R: BufRead, H: BufRead> StreamFilter<R, H> {
    pub fn new(records: RecordReader<R>, ids: HistListReader<H>) -> Self {
        Self {
            records,
            ids,
            current_id: None,
            started: false,
            stats: FilterStats::default(),
        }
    }

    /// The next record whose leading history symbol is in the id list,
    /// or `None` once the record stream is exhausted (including the
    /// trailing drain that only updates totals).
    pub fn next_match(&mut self) -> Result<Option<ContextRecord>, DataError> {
        if !self.started {
            self.started = true;
            self.current_id = self.ids.next_id()?;
        }
        while self.records.has_next()? {
            let record = self.records.next()?;
            self.stats.total.records += 1;
            self.stats.total.entries += record.counts.len() as u64;
            let lead = record.leading();
            loop {
                match self.current_id {
                    // Id list exhausted: keep draining for the totals.
                    None => break,
                    Some(id) if lead == id => {
                        self.stats.filtered.records += 1;
                        self.stats.filtered.entries += record.counts.len() as u64;
                        return Ok(Some(record));
                    }
                    // This record's leading symbol is absent from the
                    // id list; drop it.
                    Some(id) if lead < id => break,
                    // Current id has no more matching records.
                    Some(_) => self.current_id = self.ids.next_id()?,
                }
            }
        }
        Ok(None)
    }

    pub fn stats(&self) -> FilterStats {
        self.stats
    }
}
