use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use csvtok::{make_reader, open_buffered, open_mapped, Dialect, HeaderPolicy};

struct TempCsv {
    path: std::path::PathBuf,
}

impl TempCsv {
    fn new(data: &[u8]) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("csvtok-mapped-test-{}-{n}.csv", std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(data).unwrap();
        f.sync_all().unwrap();
        TempCsv { path }
    }
}

impl Drop for TempCsv {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn rows(data: &[u8]) -> Vec<Vec<(Vec<u8>, bool)>> {
    let tmp = TempCsv::new(data);
    let cursor = open_mapped(&tmp.path).unwrap();
    let mut reader = make_reader(cursor, Dialect::default(), HeaderPolicy::NoHeader).unwrap();
    let mut out = Vec::new();
    while let Some(row) = reader.next_row() {
        let row = row.unwrap();
        out.push(row.as_tuple().map(|c| (c.raw().to_vec(), c.is_escaped())).collect());
    }
    out
}

fn cells(row: &[(Vec<u8>, bool)]) -> Vec<&[u8]> {
    row.iter().map(|(bytes, _)| bytes.as_slice()).collect()
}

#[test]
fn s1_basic_rows() {
    let got = rows(b"a,b,c\n1,2,3\n");
    assert_eq!(got.len(), 2);
    assert_eq!(cells(&got[0]), vec![b"a".as_slice(), b"b", b"c"]);
    assert_eq!(cells(&got[1]), vec![b"1".as_slice(), b"2", b"3"]);
}

#[test]
fn s2_empty_middle_cell() {
    let got = rows(b"a,,c\n");
    assert_eq!(got.len(), 1);
    assert_eq!(cells(&got[0]), vec![b"a".as_slice(), b"", b"c"]);
}

#[test]
fn s3_quoted_with_doubled_quote_escape() {
    let got = rows(b"\"a,b\",\"c\"\"d\"\n");
    assert_eq!(got.len(), 1);
    assert_eq!(got[0][0].0, b"a,b");
    assert_eq!(got[0][1].0, b"c\"\"d");
    assert_eq!(got[0][1].1, true);
}

#[test]
fn s4_crlf_terminator() {
    let got = rows(b"x\r\ny\r\n");
    assert_eq!(got.len(), 2);
    assert_eq!(cells(&got[0]), vec![b"x".as_slice()]);
    assert_eq!(cells(&got[1]), vec![b"y".as_slice()]);
}

#[test]
fn s5_no_trailing_terminator() {
    let got = rows(b"x");
    assert_eq!(got.len(), 1);
    assert_eq!(cells(&got[0]), vec![b"x".as_slice()]);
}

#[test]
fn s6_unterminated_quote_errors_by_default() {
    use csvtok::ParseError;
    let tmp = TempCsv::new(b"\"oops");
    let cursor = open_mapped(&tmp.path).unwrap();
    let mut reader = make_reader(cursor, Dialect::default(), HeaderPolicy::NoHeader).unwrap();
    match reader.next_row() {
        Some(Err(ParseError::UnterminatedQuotedField { start })) => assert_eq!(start, 0),
        other => panic!("expected UnterminatedQuotedField, got {other:?}"),
    }
}

#[test]
fn s7_mixed_quoting_no_final_newline() {
    let got = rows(b"a,b\n\"c\"\"c\",d");
    assert_eq!(got.len(), 2);
    assert_eq!(cells(&got[0]), vec![b"a".as_slice(), b"b"]);
    assert_eq!(got[1][0].0, b"c\"\"c");
    assert_eq!(got[1][1].0, b"d");
}

/// Regression test: a file shorter than the 16-byte sentinel window must
/// still be read correctly, not served as the zero-filled tail scratch
/// buffer.
#[test]
fn file_shorter_than_sentinel_len_reads_real_bytes() {
    let got = rows(b"x");
    assert_eq!(cells(&got[0]), vec![b"x".as_slice()]);

    let got = rows(b"a,b");
    assert_eq!(cells(&got[0]), vec![b"a".as_slice(), b"b"]);
}

/// Regression test: rows without a trailing newline, at every length
/// crossing the sentinel-tail boundary, must terminate rather than hang,
/// and must agree with `BufferedCursor` over the same bytes.
#[test]
fn sizes_crossing_sentinel_boundary_match_buffered_cursor_and_terminate() {
    for len in 1..40 {
        let data: Vec<u8> = (0..len).map(|i| if i % 4 == 3 { b',' } else { b'a' + (i % 26) as u8 }).collect();

        let mapped = rows(&data);

        let buffered_cursor = open_buffered(data.as_slice(), 4096);
        let mut buffered_reader = make_reader(buffered_cursor, Dialect::default(), HeaderPolicy::NoHeader).unwrap();
        let mut buffered = Vec::new();
        while let Some(row) = buffered_reader.next_row() {
            let row = row.unwrap();
            buffered.push(row.as_tuple().map(|c| (c.raw().to_vec(), c.is_escaped())).collect::<Vec<_>>());
        }

        assert_eq!(mapped, buffered, "mismatch at len={len}");
    }
}
