use anyhow::Result;
use csvrow::{Columns, CsvSource, ErrorKind, Header, Reader, ReaderBuilder, RecordSource, Row};
use std::collections::VecDeque;
use std::error::Error as _;
use std::fmt;
use std::io::{self, Read, Write};

fn collect_rows<S: RecordSource>(reader: &mut Reader<S>) -> (Vec<String>, csvrow::Result<()>) {
    let mut seen = Vec::new();
    let res = reader.for_each(|row| seen.push(row.to_string()));
    (seen, res)
}

fn map_to_string<S: RecordSource>(
    reader: &mut Reader<S>,
    transform: impl FnMut(&mut Row<'_>),
) -> Result<String> {
    let mut out = Vec::new();
    reader.map_rows(&mut out, transform)?;
    Ok(String::from_utf8(out)?)
}

fn first_to_t(row: &mut Row<'_>) {
    row.set(0, "T").unwrap();
}

#[test]
fn for_each_visits_every_row_in_order() -> Result<()> {
    let input: String = (0..100).map(|i| format!("{i},{}\n", i * 2)).collect();
    let mut reader = Reader::from_bytes(input.as_str());

    let mut seen = Vec::new();
    reader.for_each(|row| seen.push(row.at(0).parse::<u32>().unwrap()))?;
    assert_eq!(seen, (0..100).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn for_each_without_header_includes_first_line() -> Result<()> {
    let mut reader = Reader::from_bytes("a,b,c\n1,2,3");
    let (seen, res) = collect_rows(&mut reader);
    res?;
    assert_eq!(seen, ["a,b,c", "1,2,3"]);
    assert!(reader.header().is_none());
    Ok(())
}

#[test]
fn for_each_skips_blank_lines() -> Result<()> {
    let mut reader = Reader::from_bytes("a,b,c\n\n1,2,3");
    let (seen, res) = collect_rows(&mut reader);
    res?;
    assert_eq!(seen, ["a,b,c", "1,2,3"]);
    Ok(())
}

#[test]
fn ragged_row_stops_iteration() {
    let mut reader = Reader::from_bytes("a,b,c\n1,2,3,4\n5,6,7\n");
    let (seen, res) = collect_rows(&mut reader);
    let err = res.unwrap_err();
    assert!(err.is(ErrorKind::ReadLine));
    assert_eq!(err.line(), Some(2));
    assert_eq!(seen, ["a,b,c"]);
}

#[test]
fn ragged_row_after_header_visits_nothing() {
    let mut reader = Reader::from_bytes_with_header("a,b,c\n1,2,3,4\n5,6,7\n", b',').unwrap();
    let (seen, res) = collect_rows(&mut reader);
    let err = res.unwrap_err();
    assert!(err.is(ErrorKind::ReadLine));
    assert!(!err.is(ErrorKind::ReadHeader));
    assert!(seen.is_empty());

    let cause = err.source().and_then(|s| s.downcast_ref::<csv::Error>());
    assert!(matches!(
        cause.map(csv::Error::kind),
        Some(csv::ErrorKind::UnequalLengths { .. })
    ));
}

#[test]
fn parse_header_binds_names() -> Result<()> {
    for input in ["a,b,c\n1,2,3", "a,b,c"] {
        let mut reader = Reader::from_bytes(input);
        reader.parse_header()?;
        assert_eq!(reader.header(), Some(&Header::new(["a", "b", "c"])));
        assert_eq!(reader.header_row().to_string(), "a,b,c");
        assert_eq!(reader.header_row().column("b"), Some("b"));
    }
    Ok(())
}

#[test]
fn parse_header_on_empty_input_is_empty_not_error() -> Result<()> {
    let mut reader = Reader::from_bytes("");
    reader.parse_header()?;
    let header = reader.header().expect("header should be set");
    assert!(header.is_empty());
    assert_eq!(reader.header_row().to_string(), "");
    Ok(())
}

#[test]
fn parse_header_failure_leaves_header_unset() {
    let mut reader = Reader::from_bytes("a;b;c\n1,2,3");
    assert_eq!(reader.read_record().unwrap().unwrap().len(), 1);

    let err = reader.parse_header().unwrap_err();
    assert!(err.is(ErrorKind::ReadHeader));
    assert!(err.source().is_some());
    assert!(reader.header().is_none());
    assert_eq!(reader.header_row().to_string(), "");
}

#[test]
fn read_all_collects_remaining_records() -> Result<()> {
    let abc: Columns = ["a", "b", "c"].into_iter().collect();
    assert_eq!(Reader::from_bytes("a,b,c").read_all()?, vec![abc]);
    assert_eq!(Reader::from_bytes(b"a,b,c".to_vec()).read_all()?.len(), 1);
    assert!(Reader::from_bytes("").read_all()?.is_empty());
    assert!(Reader::from_bytes(Vec::<u8>::new()).read_all()?.is_empty());

    let mut reader = Reader::from_bytes_with_header("a,b,c\n1,2,3", b',')?;
    let one: Columns = ["1", "2", "3"].into_iter().collect();
    assert_eq!(reader.read_all()?, vec![one]);
    assert!(Reader::from_bytes_with_header("", b',')?.read_all()?.is_empty());
    Ok(())
}

#[test]
fn named_lookup_and_set() -> Result<()> {
    let mut reader = Reader::from_bytes_with_header("a,b,c\n1,2,3\n4,5,6\n7,8,9", b',')?;
    let mut count = 0;
    reader.for_each(|mut row| {
        assert!(!row.column("a").unwrap_or_default().is_empty());
        row.set(0, "10").unwrap();
        assert_eq!(row.column("a"), Some("10"));
        assert_eq!(row.column("z"), None);
        count += 1;
    })?;
    assert_eq!(count, 3);
    Ok(())
}

#[test]
fn map_rows_identity_round_trips() -> Result<()> {
    let mut reader = Reader::from_bytes_with_header("a,b\n1,2\n", b',')?;
    assert_eq!(map_to_string(&mut reader, |_| {})?, "a,b\n1,2\n");

    let mut reader = Reader::from_bytes_with_header("x;y\n1;2\n3;4\n", b';')?;
    assert_eq!(map_to_string(&mut reader, |_| {})?, "x;y\n1;2\n3;4\n");
    Ok(())
}

#[test]
fn map_rows_keeps_quoted_fields_decodable() -> Result<()> {
    let mut reader = Reader::from_bytes_with_header("a,b\n\"x,y\",2\n", b',')?;
    assert_eq!(map_to_string(&mut reader, |_| {})?, "a,b\n\"x,y\",2\n");
    Ok(())
}

#[test]
fn map_rows_with_header_leaves_header_line_alone() -> Result<()> {
    let mut reader = Reader::from_bytes_with_header("a,b\n1,2\n", b',')?;
    assert_eq!(map_to_string(&mut reader, first_to_t)?, "a,b\nT,2\n");
    Ok(())
}

// Without a parsed header the first line is data and gets transformed too.
#[test]
fn map_rows_without_header_transforms_first_line() -> Result<()> {
    let mut reader = Reader::from_bytes("a,b\n1,2\n");
    assert_eq!(map_to_string(&mut reader, first_to_t)?, "T,b\nT,2\n");
    Ok(())
}

#[test]
fn map_rows_increments_every_cell() -> Result<()> {
    let mut reader = Reader::from_bytes_with_header("Sun,Mon,Tue,Wed,Thu,Fri,Sat\n0,1,2,3,4,5,6", b',')?;
    let out = map_to_string(&mut reader, |row| {
        for i in 0..row.len() {
            let day: i64 = row.at(i).parse().unwrap();
            row.set(i, (day + 1).to_string()).unwrap();
        }
    })?;
    assert_eq!(out, "Sun,Mon,Tue,Wed,Thu,Fri,Sat\n1,2,3,4,5,6,7\n");
    Ok(())
}

#[test]
fn map_rows_preserves_input_order() -> Result<()> {
    let body: String = (0..50).map(|i| format!("{i}\n")).collect();
    let mut reader = Reader::from_bytes_with_header(format!("n\n{body}"), b',')?;
    assert_eq!(map_to_string(&mut reader, |_| {})?, format!("n\n{body}"));
    Ok(())
}

#[test]
fn map_rows_on_empty_input_writes_nothing() -> Result<()> {
    let mut reader = Reader::from_bytes_with_header("", b',')?;
    assert_eq!(map_to_string(&mut reader, first_to_t)?, "");
    Ok(())
}

#[test]
fn map_rows_reuses_custom_quote() -> Result<()> {
    let input = "a,b\n'x,y',2\nsay \"hi\",3\n";
    let mut builder = ReaderBuilder::new();
    builder.quote(b'\'');

    let mut reader = builder.from_bytes(input)?;
    assert_eq!(reader.quote(), b'\'');
    let out = map_to_string(&mut reader, |_| {})?;
    assert_eq!(out, input);

    let mut reread = builder.from_bytes(out.as_str())?;
    let records = reread.read_all()?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].at(0), "x,y");
    assert_eq!(records[1].at(0), "say \"hi\"");
    Ok(())
}

// Duplicate names collapse, so the header line is shorter than the rows.
#[test]
fn map_rows_with_duplicate_header_names() -> Result<()> {
    let mut reader = Reader::from_bytes_with_header("id,name,id\n1,ada,2\n", b',')?;
    assert_eq!(map_to_string(&mut reader, |_| {})?, ",name\n1,ada,2\n");
    Ok(())
}

struct FailingIo;

impl Write for FailingIo {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("sink closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for FailingIo {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("source closed"))
    }
}

#[test]
fn map_rows_wraps_sink_failure() {
    let mut reader = Reader::from_bytes("a,b\n1,2\n");
    let err = reader.map_rows(FailingIo, first_to_t).unwrap_err();
    assert!(err.is(ErrorKind::MapRows));

    let cause = err.source().and_then(|s| s.downcast_ref::<io::Error>());
    assert_eq!(cause.map(ToString::to_string).as_deref(), Some("sink closed"));
}

struct FlushFailing(Vec<u8>);

impl Write for FlushFailing {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("flush refused"))
    }
}

#[test]
fn map_rows_wraps_flush_failure() {
    let mut reader = Reader::from_bytes_with_header("a,b\n1,2\n", b',').unwrap();
    let mut sink = FlushFailing(Vec::new());
    let err = reader.map_rows(&mut sink, |_| {}).unwrap_err();
    assert!(err.is(ErrorKind::MapRows));

    let cause = err.source().and_then(|s| s.downcast_ref::<io::Error>());
    assert_eq!(cause.map(ToString::to_string).as_deref(), Some("flush refused"));
    assert_eq!(sink.0, b"a,b\n1,2\n");
}

/// Takes five bytes, fails once, then accepts everything.
#[derive(Default)]
struct StutteringSink {
    received: Vec<u8>,
    calls: usize,
}

impl Write for StutteringSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls += 1;
        let n = match self.calls {
            1 => buf.len().min(5),
            2 => return Err(io::Error::other("interrupted sink")),
            _ => buf.len(),
        };
        self.received.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn map_rows_never_resends_accepted_bytes() {
    let mut reader = Reader::from_bytes_with_header("a,b\n1,2\n", b',').unwrap();
    let mut sink = StutteringSink::default();
    let err = reader.map_rows(&mut sink, |_| {}).unwrap_err();
    assert!(err.is(ErrorKind::MapRows));
    assert_eq!(String::from_utf8_lossy(&sink.received), "a,b\n1,2\n");
}

#[test]
fn map_rows_propagates_read_failure_as_read_line() {
    let mut reader = Reader::new(FailingIo);
    let err = reader.map_rows(Vec::new(), |_| {}).unwrap_err();
    assert!(err.is(ErrorKind::ReadLine));
    assert!(!err.is(ErrorKind::MapRows));

    let cause = err.source().and_then(|s| s.downcast_ref::<csv::Error>());
    assert!(cause.is_some_and(csv::Error::is_io_error));
}

#[test]
fn try_for_each_stops_at_first_visitor_error() {
    let mut reader = Reader::from_bytes("1\n2\n3\n");
    let mut seen = 0;
    let res: Result<()> = reader.try_for_each(|row| {
        seen += 1;
        anyhow::ensure!(row.at(0) != "2", "stop at two");
        Ok(())
    });
    assert_eq!(res.unwrap_err().to_string(), "stop at two");
    assert_eq!(seen, 2);

    let (rest, res) = collect_rows(&mut reader);
    assert!(res.is_ok());
    assert_eq!(rest, ["3"]);
}

#[derive(Debug)]
struct MockError;

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("mock decode failure")
    }
}

impl std::error::Error for MockError {}

struct MockSource(VecDeque<Result<Columns, MockError>>);

impl MockSource {
    fn new(records: Vec<Result<Vec<&str>, MockError>>) -> Self {
        Self(
            records
                .into_iter()
                .map(|r| r.map(|cols| cols.into_iter().collect()))
                .collect(),
        )
    }
}

impl RecordSource for MockSource {
    type Error = MockError;

    fn next_record(&mut self) -> Result<Option<Columns>, MockError> {
        self.0.pop_front().transpose()
    }
}

#[test]
fn mock_source_blank_record_ends_iteration() -> Result<()> {
    let source = MockSource::new(vec![Ok(vec!["id"]), Ok(vec!["1"]), Ok(vec![]), Ok(vec!["2"])]);
    let mut reader = Reader::from_source(source, b'\t');
    reader.parse_header()?;

    let mut ids = Vec::new();
    reader.for_each(|row| ids.push(row.column("id").map(str::to_owned)))?;
    assert_eq!(ids, [Some("1".to_owned())]);
    Ok(())
}

#[test]
fn mock_source_errors_keep_their_kind() {
    let source = MockSource::new(vec![Err(MockError)]);
    let err = Reader::from_source(source, b',').parse_header().unwrap_err();
    assert!(err.is(ErrorKind::ReadHeader));
    assert!(err.source().is_some_and(|s| s.is::<MockError>()));

    let source = MockSource::new(vec![Ok(vec!["a"]), Err(MockError), Ok(vec!["b"])]);
    let mut reader = Reader::from_source(source, b',');
    let (seen, res) = collect_rows(&mut reader);
    let err = res.unwrap_err();
    assert!(err.is(ErrorKind::ReadLine));
    assert_eq!(err.line(), Some(2));
    assert_eq!(err.to_string(), "error reading line (record: 2): mock decode failure");
    assert_eq!(seen, ["a"]);
}

#[test]
fn mock_source_rows_use_reader_delimiter() -> Result<()> {
    let source = MockSource::new(vec![Ok(vec!["a", "b"]), Ok(vec!["1", "2"])]);
    let mut reader = Reader::from_source(source, b'\t');
    reader.parse_header()?;
    assert_eq!(map_to_string(&mut reader, |_| {})?, "a\tb\n1\t2\n");
    Ok(())
}

#[test]
fn csv_source_can_be_borrowed() -> Result<()> {
    let mut source = CsvSource::new("a\n1\n".as_bytes(), b',');
    Reader::from_source(&mut source, b',').parse_header()?;
    assert_eq!(source.next_record()?.map(|c| c.to_vec()), Some(vec!["1".to_owned()]));
    Ok(())
}
