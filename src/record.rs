//! One serialized unit of a count file: an ordered history plus the
//! counts of every symbol observed after it.
//!
//! Binary record layout (all little-endian, following the stream header
//! in stream.rs):
//!   u32 history length (n-1 for an order-n file, at least 1)
//!   u32 * length      history ids, most recent context symbol first
//!   u32               number of count entries (at least 1)
//!   per entry:        u32 symbol id, 16-byte count (see count.rs)
//!
//! Text layout is one record per line: `[ 11 1 ]: 12->2 14->(3,2,1,0)`.

use std::io::{Read, Write};

use crate::count::Count;
use crate::error::DataError;

// Decode guard; real files are order 2..7. Anything past this is a
// corrupt length field, not a legitimate model order.
const MAX_HISTORY_LEN: u32 = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ContextRecord {
    /// Context symbol ids, most recent first; never empty.
    pub history: Vec<u32>,
    /// Next-symbol id to aggregated count, ascending by symbol id,
    /// symbols unique; never empty.
    pub counts: Vec<(u32, Count)>,
}

impl ContextRecord {
    pub fn new(history: Vec<u32>, counts: Vec<(u32, Count)>) -> Self {
        debug_assert!(!history.is_empty());
        debug_assert!(!counts.is_empty());
        Self { history, counts }
    }

    /// The leading (most recent) context symbol; monotone non-decreasing
    /// across a sorted file.
    pub fn leading(&self) -> u32 {
        self.history[0]
    }

    pub fn write_binary<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(&(self.history.len() as u32).to_le_bytes())?;
        for &id in &self.history {
            out.write_all(&id.to_le_bytes())?;
        }
        out.write_all(&(self.counts.len() as u32).to_le_bytes())?;
        for (symbol, count) in &self.counts {
            out.write_all(&symbol.to_le_bytes())?;
            count.write_binary(out)?;
        }
        Ok(())
    }

    /// Decode one record. The caller has already established that at
    /// least one byte is available, so a clean EOF here means a
    /// truncated record.
    pub fn read_binary<R: Read>(input: &mut R) -> Result<ContextRecord, DataError> {
        let hist_len = read_u32(input)?;
        if hist_len == 0 || hist_len > MAX_HISTORY_LEN {
            return Err(DataError::Corrupt(format!(
                "bad history length {}",
                hist_len
            )));
        }
        let mut history = Vec::with_capacity(hist_len as usize);
        for _ in 0..hist_len {
            history.push(read_u32(input)?);
        }

        let num_counts = read_u32(input)?;
        if num_counts == 0 {
            return Err(DataError::Corrupt("record with no counts".to_string()));
        }
        let mut counts = Vec::with_capacity(num_counts.min(MAX_HISTORY_LEN) as usize);
        let mut last_symbol: Option<u32> = None;
        for _ in 0..num_counts {
            let symbol = read_u32(input)?;
            if let Some(prev) = last_symbol {
                if symbol <= prev {
                    return Err(DataError::Corrupt(format!(
                        "count symbols out of order ({} after {})",
                        symbol, prev
                    )));
                }
            }
            last_symbol = Some(symbol);
            counts.push((symbol, Count::read_binary(input)?));
        }
        Ok(ContextRecord { history, counts })
    }

    pub fn write_text<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write!(out, "[")?;
        for &id in &self.history {
            write!(out, " {}", id)?;
        }
        write!(out, " ]:")?;
        for (symbol, count) in &self.counts {
            write!(out, " {}->{}", symbol, count.to_text())?;
        }
        writeln!(out)
    }

    pub fn parse_text(line: &str) -> Result<ContextRecord, DataError> {
        let bad = |what: &str| DataError::Corrupt(format!("{} in line '{}'", what, line));

        let rest = line
            .trim()
            .strip_prefix('[')
            .ok_or_else(|| bad("missing '['"))?;
        let (hist_part, counts_part) = rest
            .split_once("]:")
            .ok_or_else(|| bad("missing ']:'"))?;

        let history = hist_part
            .split_whitespace()
            .map(|tok| tok.parse::<u32>())
            .collect::<Result<Vec<u32>, _>>()
            .map_err(|_| bad("unparseable history id"))?;
        if history.is_empty() {
            return Err(bad("empty history"));
        }

        let mut counts = Vec::new();
        for tok in counts_part.split_whitespace() {
            let (symbol, count) = tok.split_once("->").ok_or_else(|| bad("missing '->'"))?;
            let symbol = symbol
                .parse::<u32>()
                .map_err(|_| bad("unparseable symbol id"))?;
            if let Some(&(prev, _)) = counts.last() {
                if symbol <= prev {
                    return Err(bad("count symbols out of order"));
                }
            }
            counts.push((symbol, Count::parse_text(count)?));
        }
        if counts.is_empty() {
            return Err(bad("record with no counts"));
        }
        Ok(ContextRecord { history, counts })
    }
}

fn read_u32<R: Read>(input: &mut R) -> Result<u32, DataError> {
    let mut buf = [0u8; 4];
    input
        .read_exact(&mut buf)
        .map_err(|_| DataError::Corrupt("truncated record".to_string()))?;
    Ok(u32::from_le_bytes(buf))
}
