//! Record decoding behind the [`Reader`](crate::Reader).
//!
//! A [`RecordSource`] yields one record at a time. [`CsvSource`] is the
//! default implementation on top of the `csv` crate; tests and callers can
//! plug in anything else that produces [`Columns`].

use crate::columns::Columns;
use std::error::Error as StdError;
use std::io::Read;

/// A sequential source of delimited records.
pub trait RecordSource {
    type Error: StdError + Send + Sync + 'static;

    /// Decode the next record.
    ///
    /// Returns `Ok(None)` at the end of the stream. Implementations must reject
    /// a record whose field count differs from the first record's.
    fn next_record(&mut self) -> Result<Option<Columns>, Self::Error>;
}

impl<S: RecordSource + ?Sized> RecordSource for &mut S {
    type Error = S::Error;

    fn next_record(&mut self) -> Result<Option<Columns>, Self::Error> {
        (**self).next_record()
    }
}

/// [`RecordSource`] over a `csv::Reader`.
///
/// The underlying reader never consumes a header itself and is never
/// flexible, so ragged records surface as `csv::ErrorKind::UnequalLengths`.
pub struct CsvSource<R> {
    inner: csv::Reader<R>,
    record: csv::StringRecord,
}

impl<R: Read> CsvSource<R> {
    pub fn new(reader: R, delimiter: u8) -> Self {
        Self::from_builder(csv::ReaderBuilder::new().delimiter(delimiter), reader)
    }

    /// Wrap a reader using a preconfigured `csv::ReaderBuilder`.
    ///
    /// Header handling and flexibility are forced off.
    pub fn from_builder(builder: &mut csv::ReaderBuilder, reader: R) -> Self {
        let inner = builder
            .has_headers(false)
            .flexible(false)
            .from_reader(reader);
        Self {
            inner,
            record: csv::StringRecord::new(),
        }
    }

    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }
}

impl<R: Read> RecordSource for CsvSource<R> {
    type Error = csv::Error;

    fn next_record(&mut self) -> Result<Option<Columns>, csv::Error> {
        if !self.inner.read_record(&mut self.record)? {
            return Ok(None);
        }
        tracing::trace!(
            line = ?self.record.position().map(|p| p.line()),
            fields = self.record.len(),
            "decoded record"
        );
        Ok(Some(Columns::from(&self.record)))
    }
}
