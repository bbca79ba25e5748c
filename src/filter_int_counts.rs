//! Keep the records of a sorted binary count stream whose leading
//! history symbol appears in a sorted history-id list.
//!
//! Usage: filter-int-counts <int-counts> <hist-list>
//!        (writes the filtered int-counts to stdout)
//! For example:
//!        filter-int-counts counts/int.3 counts/latest_hist.3 > filter_counts/int.3
//!
//! A counts path ending in .gz is read through gzip.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use intcounts::{Format, HistListReader, RecordReader, RecordWriter, StreamFilter};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "filter-int-counts: expected usage: filter-int-counts <int-counts> <hist-list>\n \
             ( it writes the filtered int-counts to stdout).  For example:\n \
             filter-int-counts counts/int.3 counts/latest_hist.3 > filter_counts/int.3"
        );
        std::process::exit(1);
    }
    let counts_path = &args[1];
    let hist_list_path = &args[2];

    let counts_file = File::open(counts_path)
        .with_context(|| format!("filter-int-counts: error opening '{}' for reading", counts_path))?;
    let counts_input: Box<dyn BufRead> = if counts_path.ends_with(".gz") {
        Box::new(BufReader::with_capacity(1 << 20, GzDecoder::new(counts_file)))
    } else {
        Box::new(BufReader::with_capacity(1 << 20, counts_file))
    };

    let hist_list_file = File::open(hist_list_path).with_context(|| {
        format!(
            "filter-int-counts: error opening '{}' for reading",
            hist_list_path
        )
    })?;

    let mut filter = StreamFilter::new(
        RecordReader::new(counts_input, Format::Binary),
        HistListReader::new(BufReader::new(hist_list_file)),
    );

    let stdout = io::stdout();
    let mut writer = RecordWriter::new(BufWriter::new(stdout.lock()), Format::Binary);
    while let Some(record) = filter.next_match()? {
        writer.write(&record)?;
    }
    writer.flush()?;

    let stats = filter.stats();
    eprintln!(
        "filter-int-counts: filtered {} LM states(with {} n-grams) from total {} LM states(with {} n-grams).",
        stats.filtered.records, stats.filtered.entries, stats.total.records, stats.total.entries
    );
    Ok(())
}
