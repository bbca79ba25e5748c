//! Emit the distinct leading history symbol of every record in a sorted
//! binary count stream, one per line, ascending.
//!
//! Usage: extract-latest-histories <counts.int >latest_hist.txt

use anyhow::Result;
use intcounts::{Format, HistoryExtractor, RecordReader};
use std::io::{self, BufWriter, Write};

fn main() -> Result<()> {
    if std::env::args().len() != 1 {
        eprintln!(
            "extract-latest-histories: expected usage: extract-latest-histories <counts.int >latest_hist.txt"
        );
        std::process::exit(1);
    }

    let stdin = io::stdin();
    let reader = RecordReader::new(stdin.lock(), Format::Binary);
    let mut extractor = HistoryExtractor::new(reader);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    while let Some(hist) = extractor.next_history()? {
        writeln!(out, "{}", hist)?;
    }
    out.flush()?;

    let stats = extractor.stats();
    eprintln!(
        "extract-latest-histories: processed {} LM states, with {} individual n-grams.",
        stats.records, stats.entries
    );
    Ok(())
}
