//! End-to-end run of the worked example from the toolkit's own docs:
//! extract the latest histories of an order-3 count file, then use them
//! to filter, and check the degenerate order-2 case.

use intcounts::{
    ContextRecord, Count, Format, HistListReader, HistoryExtractor, RecordReader, RecordWriter,
    StreamFilter,
};

fn record(history: &[u32], counts: &[(u32, f32)]) -> ContextRecord {
    ContextRecord::new(
        history.to_vec(),
        counts
            .iter()
            .map(|&(sym, c)| (sym, Count::from(c)))
            .collect(),
    )
}

fn write_stream(records: &[ContextRecord]) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut writer = RecordWriter::new(&mut buf, Format::Binary);
    for rec in records {
        writer.write(rec).unwrap();
    }
    buf
}

// print-int-counts <int.2
// [ 1 ]: 11->2
fn order2() -> Vec<ContextRecord> {
    vec![record(&[1], &[(11, 2.0)])]
}

// print-int-counts <int.3
// [ 11 1 ]: 12->2
// [ 12 11 ]: 13->2
// [ 13 12 ]: 2->1 14->1
// [ 14 13 ]: 2->1
fn order3() -> Vec<ContextRecord> {
    vec![
        record(&[11, 1], &[(12, 2.0)]),
        record(&[12, 11], &[(13, 2.0)]),
        record(&[13, 12], &[(2, 1.0), (14, 1.0)]),
        record(&[14, 13], &[(2, 1.0)]),
    ]
}

#[test]
fn extract_latest_histories_order3() {
    let buf = write_stream(&order3());
    let mut extractor = HistoryExtractor::new(RecordReader::new(buf.as_slice(), Format::Binary));
    let mut hists = Vec::new();
    while let Some(hist) = extractor.next_history().unwrap() {
        hists.push(hist);
    }
    assert_eq!(hists, vec![11, 12, 13, 14]);
    let stats = extractor.stats();
    assert_eq!(stats.records, 4);
    assert_eq!(stats.entries, 5);
}

#[test]
fn extract_latest_histories_order2() {
    let buf = write_stream(&order2());
    let mut extractor = HistoryExtractor::new(RecordReader::new(buf.as_slice(), Format::Binary));
    assert_eq!(extractor.next_history().unwrap(), Some(1));
    assert_eq!(extractor.next_history().unwrap(), None);
}

#[test]
fn filter_order2_is_degenerate_no_op() {
    // The order-2 file's only leading id participates, so filtering it
    // against its own latest-history list returns the same record.
    let records = order2();
    let buf = write_stream(&records);
    let mut filter = StreamFilter::new(
        RecordReader::new(buf.as_slice(), Format::Binary),
        HistListReader::new("1\n".as_bytes()),
    );
    assert_eq!(filter.next_match().unwrap(), Some(records[0].clone()));
    assert_eq!(filter.next_match().unwrap(), None);
    let stats = filter.stats();
    assert_eq!(stats.filtered.records, 1);
    assert_eq!(stats.total.records, 1);
}

#[test]
fn extracted_histories_feed_the_filter() {
    // Stage 1: extract the latest histories of a dev-set order-3 file.
    let dev = vec![
        record(&[11, 1], &[(12, 1.0)]),
        record(&[12, 11], &[(13, 1.0)]),
        record(&[13, 12], &[(2, 1.0)]),
    ];
    let dev_buf = write_stream(&dev);
    let mut extractor =
        HistoryExtractor::new(RecordReader::new(dev_buf.as_slice(), Format::Binary));
    let mut hist_list = String::new();
    while let Some(hist) = extractor.next_history().unwrap() {
        hist_list.push_str(&hist.to_string());
        hist_list.push('\n');
    }
    assert_eq!(hist_list, "11\n12\n13\n");

    // Stage 2: filter a larger training-set file down to those histories.
    let train = vec![
        record(&[11, 1], &[(11, 1.0), (12, 2.0)]),
        record(&[11, 11], &[(13, 1.0)]),
        record(&[12, 11], &[(13, 2.0)]),
        record(&[13, 11], &[(15, 1.0)]),
        record(&[13, 12], &[(2, 1.0), (14, 1.0)]),
        record(&[14, 13], &[(2, 1.0)]),
        record(&[15, 13], &[(2, 1.0)]),
    ];
    let train_buf = write_stream(&train);
    let mut filter = StreamFilter::new(
        RecordReader::new(train_buf.as_slice(), Format::Binary),
        HistListReader::new(hist_list.as_bytes()),
    );
    let mut kept = Vec::new();
    while let Some(rec) = filter.next_match().unwrap() {
        kept.push(rec);
    }
    assert_eq!(kept, train[..5].to_vec());

    let stats = filter.stats();
    assert_eq!(stats.total.records, 7);
    assert_eq!(stats.total.entries, 9);
    assert_eq!(stats.filtered.records, 5);
    assert_eq!(stats.filtered.entries, 7);
}

#[test]
fn filtered_output_round_trips() {
    // The filter's output is itself a valid stream.
    let buf = write_stream(&order3());
    let mut filter = StreamFilter::new(
        RecordReader::new(buf.as_slice(), Format::Binary),
        HistListReader::new("12\n14\n".as_bytes()),
    );
    let mut out = Vec::new();
    let mut writer = RecordWriter::new(&mut out, Format::Binary);
    while let Some(rec) = filter.next_match().unwrap() {
        writer.write(&rec).unwrap();
    }
    drop(writer);

    let mut reader = RecordReader::new(out.as_slice(), Format::Binary);
    assert_eq!(reader.next().unwrap().history, vec![12, 11]);
    assert_eq!(reader.next().unwrap().history, vec![14, 13]);
    assert!(!reader.has_next().unwrap());
}
