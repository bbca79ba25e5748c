//! Pull-based cursors over count streams.
//!
//! A binary stream opens with an 8-byte header (magic "ICNT", version),
//! then records back to back; a zero-length input is an empty stream.
//! Text streams are headerless, one record per line, blank lines skipped.
//! The format is picked once at stream construction and is part of the
//! stream's identity, not a per-call flag.

use std::io::{BufRead, Write};

use crate::error::DataError;
use crate::record::ContextRecord;

pub const MAGIC: u32 = 0x49434E54; // "ICNT"
pub const VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Binary,
    Text,
}

/// Forward-only cursor over an ordered stream of records. One record is
/// decoded per `next()`; nothing is buffered beyond the byte-level peek
/// that distinguishes end-of-input from a truncated record.
pub struct RecordReader<R: BufRead> {
    input: R,
    format: Format,
    header_checked: bool,
    pending_line: Option<String>,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(input: R, format: Format) -> Self {
        Self {
            input,
            format,
            header_checked: false,
            pending_line: None,
        }
    }

    /// True unless the stream is exhausted. Validates the stream header
    /// on first use of a binary stream.
    pub fn has_next(&mut self) -> Result<bool, DataError> {
        match self.format {
            Format::Binary => {
                self.check_header()?;
                Ok(!self.input.fill_buf()?.is_empty())
            }
            Format::Text => {
                while self.pending_line.is_none() {
                    let mut line = String::new();
                    if self.input.read_line(&mut line)? == 0 {
                        return Ok(false);
                    }
                    if !line.trim().is_empty() {
                        self.pending_line = Some(line);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Decode the next record; `EndOfStream` if `has_next()` is false.
    pub fn next(&mut self) -> Result<ContextRecord, DataError> {
        if !self.has_next()? {
            return Err(DataError::EndOfStream);
        }
        match self.format {
            Format::Binary => ContextRecord::read_binary(&mut self.input),
            Format::Text => {
                let line = self.pending_line.take().unwrap();
                ContextRecord::parse_text(&line)
            }
        }
    }

    fn check_header(&mut self) -> Result<(), DataError> {
        if self.header_checked {
            return Ok(());
        }
        // An empty input is an empty stream, not a corrupt one.
        if self.input.fill_buf()?.is_empty() {
            self.header_checked = true;
            return Ok(());
        }
        let mut buf = [0u8; 8];
        self.input
            .read_exact(&mut buf)
            .map_err(|_| DataError::Corrupt("truncated stream header".to_string()))?;
        let magic = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let version = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        if magic != MAGIC {
            return Err(DataError::Corrupt(format!("bad magic 0x{:08X}", magic)));
        }
        if version != VERSION {
            return Err(DataError::Corrupt(format!(
                "unsupported stream version {}",
                version
            )));
        }
        self.header_checked = true;
        Ok(())
    }
}

/// Writer side of a record stream. The binary header is emitted before
/// the first record, so an output with no records stays empty and reads
/// back as an empty stream.
pub struct RecordWriter<W: Write> {
    output: W,
    format: Format,
    header_written: bool,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(output: W, format: Format) -> Self {
        Self {
            output,
            format,
            header_written: false,
        }
    }

    pub fn write(&mut self, record: &ContextRecord) -> std::io::Result<()> {
        match self.format {
            Format::Binary => {
                if !self.header_written {
                    self.output.write_all(&MAGIC.to_le_bytes())?;
                    self.output.write_all(&VERSION.to_le_bytes())?;
                    self.header_written = true;
                }
                record.write_binary(&mut self.output)
            }
            Format::Text => record.write_text(&mut self.output),
        }
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.output.flush()
    }
}

/// Reader for the sorted history-id list consumed by the filter: one or
/// more ascending distinct positive integers per line, whitespace
/// separated. Sortedness and positivity are validated, not assumed.
pub struct HistListReader<R: BufRead> {
    input: R,
    queued: Vec<u32>,
    last: Option<u32>,
}

impl<R: BufRead> HistListReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            queued: Vec::new(),
            last: None,
        }
    }

    pub fn next_id(&mut self) -> Result<Option<u32>, DataError> {
        while self.queued.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let mut ids = line
                .split_whitespace()
                .map(|tok| {
                    tok.parse::<u32>()
                        .map_err(|_| DataError::Corrupt(format!("bad history id '{}'", tok)))
                })
                .collect::<Result<Vec<u32>, DataError>>()?;
            ids.reverse(); // pop from the back in file order
            self.queued = ids;
        }
        let id = self.queued.pop().unwrap();
        if id == 0 {
            return Err(DataError::Corrupt("history id 0".to_string()));
        }
        if let Some(prev) = self.last {
            if id <= prev {
                return Err(DataError::Unsorted(format!(
                    "history id {} after {}",
                    id, prev
                )));
            }
        }
        self.last = Some(id);
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count::Count;

    fn sample(lead: u32) -> ContextRecord {
        ContextRecord::new(vec![lead, 1], vec![(2, Count::from(1.0))])
    }

    fn write_stream(records: &[ContextRecord], format: Format) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut writer = RecordWriter::new(&mut buf, format);
        for rec in records {
            writer.write(rec).unwrap();
        }
        writer.flush().unwrap();
        buf
    }

    #[test]
    fn binary_stream_round_trip() {
        let records = vec![sample(3), sample(5), sample(9)];
        let buf = write_stream(&records, Format::Binary);
        let mut reader = RecordReader::new(buf.as_slice(), Format::Binary);
        let mut back = Vec::new();
        while reader.has_next().unwrap() {
            back.push(reader.next().unwrap());
        }
        assert_eq!(records, back);
        assert!(matches!(reader.next(), Err(DataError::EndOfStream)));
    }

    #[test]
    fn text_stream_round_trip() {
        let records = vec![sample(3), sample(5)];
        let buf = write_stream(&records, Format::Text);
        let mut reader = RecordReader::new(buf.as_slice(), Format::Text);
        assert_eq!(reader.next().unwrap(), records[0]);
        assert_eq!(reader.next().unwrap(), records[1]);
        assert!(!reader.has_next().unwrap());
    }

    #[test]
    fn empty_input_is_empty_stream() {
        let mut reader = RecordReader::new(&b""[..], Format::Binary);
        assert!(!reader.has_next().unwrap());
        assert!(matches!(reader.next(), Err(DataError::EndOfStream)));
    }

    #[test]
    fn bad_magic_is_corrupt() {
        let buf = [0xDEu8, 0xAD, 0xBE, 0xEF, 1, 0, 0, 0];
        let mut reader = RecordReader::new(&buf[..], Format::Binary);
        assert!(matches!(reader.has_next(), Err(DataError::Corrupt(_))));
    }

    #[test]
    fn future_version_is_corrupt() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&MAGIC.to_le_bytes());
        buf.extend_from_slice(&99u32.to_le_bytes());
        let mut reader = RecordReader::new(buf.as_slice(), Format::Binary);
        assert!(matches!(reader.has_next(), Err(DataError::Corrupt(_))));
    }

    #[test]
    fn hist_list_reads_in_order() {
        let mut reader = HistListReader::new("11\n12 13\n\n14\n".as_bytes());
        let mut ids = Vec::new();
        while let Some(id) = reader.next_id().unwrap() {
            ids.push(id);
        }
        assert_eq!(ids, vec![11, 12, 13, 14]);
    }

    #[test]
    fn hist_list_rejects_disorder_and_zero() {
        let mut reader = HistListReader::new("5\n3\n".as_bytes());
        assert_eq!(reader.next_id().unwrap(), Some(5));
        assert!(matches!(reader.next_id(), Err(DataError::Unsorted(_))));

        let mut reader = HistListReader::new("0\n".as_bytes());
        assert!(matches!(reader.next_id(), Err(DataError::Corrupt(_))));

        let mut reader = HistListReader::new("7\nx\n".as_bytes());
        assert_eq!(reader.next_id().unwrap(), Some(7));
        assert!(matches!(reader.next_id(), Err(DataError::Corrupt(_))));
    }
}
