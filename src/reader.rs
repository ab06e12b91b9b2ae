//! Row iteration and the map-and-rewrite pipeline.
//!
//! A [`Reader`] owns a [`RecordSource`] and, once [`Reader::parse_header`] has
//! run, the [`Header`] shared by every [`Row`] it produces.
//!
//! ```
//! use csvrow::Reader;
//!
//! # fn main() -> csvrow::Result<()> {
//! let mut reader = Reader::from_bytes_with_header("Sun,Mon,Tue\n0,1,2\n", b',')?;
//!
//! let mut out = Vec::new();
//! reader.map_rows(&mut out, |row| {
//!     for i in 0..row.len() {
//!         let next = row.at(i).parse::<i64>().unwrap_or_default() + 1;
//!         row.set(i, next.to_string()).ok();
//!     }
//! })?;
//!
//! assert_eq!(String::from_utf8_lossy(&out), "Sun,Mon,Tue\n1,2,3\n");
//! # Ok(())
//! # }
//! ```

use crate::columns::Columns;
use crate::error::{Error, Result};
use crate::header::Header;
use crate::row::Row;
use crate::source::{CsvSource, RecordSource};
use std::io::{BufWriter, Cursor, Read, Write};

// Larger than the csv writer's own buffer, so every chunk it hands over is
// taken whole.
const SINK_BUFFER: usize = 64 * 1024;
const RECORD_BUFFER: usize = 8 * 1024;

/// Reads records from a [`RecordSource`] and hands them out as [`Row`]s.
///
/// Build one with [`Reader::new`], [`Reader::from_bytes`], or a
/// [`ReaderBuilder`](crate::ReaderBuilder) for other dialects.
///
/// Not meant for concurrent use: every call drives the source from the
/// calling thread until it is exhausted or fails.
pub struct Reader<S> {
    source: S,
    header: Option<Header>,
    delimiter: u8,
    quote: u8,
    records: u64,
}

impl<R: Read> Reader<CsvSource<R>> {
    /// Comma-delimited reader over `reader`. No header is parsed.
    pub fn new(reader: R) -> Self {
        Self::with_delimiter(reader, b',')
    }

    pub fn with_delimiter(reader: R, delimiter: u8) -> Self {
        Self::from_source(CsvSource::new(reader, delimiter), delimiter)
    }
}

impl<T: AsRef<[u8]>> Reader<CsvSource<Cursor<T>>> {
    /// Comma-delimited reader over in-memory text or bytes.
    pub fn from_bytes(data: T) -> Self {
        Self::new(Cursor::new(data))
    }

    /// Reader over in-memory data whose first record is parsed as the header.
    ///
    /// # Errors
    /// Fails with [`ErrorKind::ReadHeader`](crate::ErrorKind::ReadHeader) when
    /// the first record cannot be decoded.
    pub fn from_bytes_with_header(data: T, delimiter: u8) -> Result<Self> {
        let mut reader = Self::with_delimiter(Cursor::new(data), delimiter);
        reader.parse_header()?;
        Ok(reader)
    }
}

impl<S: RecordSource> Reader<S> {
    /// Wrap an arbitrary record source. `delimiter` is used when rows are
    /// serialized back to text; the quote character defaults to `"`.
    pub fn from_source(source: S, delimiter: u8) -> Self {
        Self {
            source,
            header: None,
            delimiter,
            quote: b'"',
            records: 0,
        }
    }

    /// Quote character used by [`Reader::map_rows`]. Should match the one the
    /// source decodes with.
    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Consume one record and use it as the header.
    ///
    /// An empty stream yields an empty header rather than an error. On a
    /// decode failure the header stays unset.
    ///
    /// # Errors
    /// Fails with [`ErrorKind::ReadHeader`](crate::ErrorKind::ReadHeader),
    /// wrapping the decode error.
    pub fn parse_header(&mut self) -> Result<()> {
        let names = match self.source.next_record() {
            Ok(Some(columns)) => {
                self.records += 1;
                columns.into_inner()
            }
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::debug!(error = %err, "failed to read header record");
                return Err(Error::read_header(err).with_line(self.records + 1));
            }
        };
        tracing::debug!(columns = names.len(), "parsed header");
        self.header = Some(Header::new(names));
        Ok(())
    }

    /// The parsed header. `None` until [`Reader::parse_header`] succeeds.
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// The header names as a row bound to the header itself. Empty when no
    /// header was parsed.
    pub fn header_row(&self) -> Row<'_> {
        let names = self.header.as_ref().map(Header::names).unwrap_or_default();
        Row::new(names.into(), self.header.as_ref(), self.delimiter)
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn quote(&self) -> u8 {
        self.quote
    }

    /// Pull the next raw record, bypassing header binding.
    pub fn read_record(&mut self) -> Result<Option<Columns>> {
        match self.source.next_record() {
            Ok(Some(columns)) => {
                self.records += 1;
                Ok(Some(columns))
            }
            Ok(None) => Ok(None),
            Err(err) => Err(Error::read_line(err).with_line(self.records + 1)),
        }
    }

    /// Collect every remaining record.
    pub fn read_all(&mut self) -> Result<Vec<Columns>> {
        let mut out = Vec::new();
        while let Some(columns) = self.read_record()? {
            out.push(columns);
        }
        Ok(out)
    }

    /// Visit every remaining record in order.
    ///
    /// Stops at the end of the stream or at a record with no columns.
    ///
    /// # Errors
    /// Fails with [`ErrorKind::ReadLine`](crate::ErrorKind::ReadLine) on the
    /// first record that cannot be decoded, ragged records included. Rows
    /// visited before the failure stay visited.
    pub fn for_each<F>(&mut self, mut visit: F) -> Result<()>
    where
        F: FnMut(Row<'_>),
    {
        self.try_for_each::<Error, _>(|row| {
            visit(row);
            Ok(())
        })
    }

    /// Like [`Reader::for_each`], but stops at the first error `visit` returns.
    pub fn try_for_each<E, F>(&mut self, mut visit: F) -> Result<(), E>
    where
        E: From<Error>,
        F: FnMut(Row<'_>) -> Result<(), E>,
    {
        let header = self.header.as_ref();
        loop {
            let columns = match self.source.next_record() {
                Ok(Some(columns)) if !columns.is_empty() => columns,
                Ok(_) => return Ok(()),
                Err(err) => {
                    return Err(Error::read_line(err).with_line(self.records + 1).into());
                }
            };
            self.records += 1;
            visit(Row::new(columns, header, self.delimiter))?;
        }
    }

    /// Rewrite every remaining row into `sink`.
    ///
    /// When a non-empty header was parsed, its line is written first, ahead of
    /// the first data row. Each row is passed to `transform`, then written as
    /// one `\n`-terminated line using the reader's delimiter and quote. The
    /// sink is flushed at the end.
    ///
    /// The header line comes from [`Header::names`]. If the header had
    /// duplicate names (logged as a warning when it was parsed) that line is
    /// shorter than the data rows.
    ///
    /// # Errors
    /// Decode failures propagate as
    /// [`ErrorKind::ReadLine`](crate::ErrorKind::ReadLine). Sink failures,
    /// including the final flush, are wrapped as
    /// [`ErrorKind::MapRows`](crate::ErrorKind::MapRows). Lines written before
    /// a failure are not rolled back. Bytes the sink has accepted are never
    /// sent twice; bytes still buffered when a write fails are retried as the
    /// internal writers are dropped, and those results are ignored.
    pub fn map_rows<W, F>(&mut self, sink: W, mut transform: F) -> Result<()>
    where
        W: Write,
        F: FnMut(&mut Row<'_>),
    {
        let mut pending_header = self
            .header
            .as_ref()
            .filter(|header| !header.is_empty())
            .map(Header::names);
        let mut out = BufWriter::with_capacity(SINK_BUFFER, sink);
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .terminator(csv::Terminator::Any(b'\n'))
            .has_headers(false)
            .flexible(true)
            .buffer_capacity(RECORD_BUFFER)
            .from_writer(&mut out);
        let mut written = 0u64;

        self.try_for_each::<Error, _>(|mut row| {
            if let Some(names) = pending_header.take() {
                writer.write_record(&names).map_err(sink_error)?;
            }
            transform(&mut row);
            writer.write_record(row.iter()).map_err(sink_error)?;
            written += 1;
            Ok(())
        })?;
        writer.flush().map_err(Error::map_rows)?;
        drop(writer);
        out.flush().map_err(Error::map_rows)?;

        tracing::debug!(rows = written, "rewrote rows");
        Ok(())
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

/// Unwraps I/O failures to the sink's own error; anything else keeps the
/// `csv::Error` as the cause.
fn sink_error(err: csv::Error) -> Error {
    if !err.is_io_error() {
        return Error::map_rows(err);
    }
    match err.into_kind() {
        csv::ErrorKind::Io(err) => Error::map_rows(err),
        _ => Error::new(crate::ErrorKind::MapRows),
    }
}
