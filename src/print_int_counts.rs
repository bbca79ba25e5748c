//! Dump a binary count stream in the human-readable text form, one
//! record per line. The debugging companion of the other count tools.
//!
//! Usage: print-int-counts <counts.int

use anyhow::Result;
use intcounts::{Format, RecordReader, RecordWriter};
use std::io::{self, BufWriter};

fn main() -> Result<()> {
    if std::env::args().len() != 1 {
        eprintln!("print-int-counts: expected usage: print-int-counts <counts.int");
        std::process::exit(1);
    }

    let stdin = io::stdin();
    let mut reader = RecordReader::new(stdin.lock(), Format::Binary);

    let stdout = io::stdout();
    let mut writer = RecordWriter::new(BufWriter::new(stdout.lock()), Format::Text);

    let mut num_records = 0u64;
    while reader.has_next()? {
        writer.write(&reader.next()?)?;
        num_records += 1;
    }
    writer.flush()?;

    eprintln!("print-int-counts: printed {} LM states.", num_records);
    Ok(())
}
