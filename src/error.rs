//! Error taxonomy for reading and rewriting rows.
//!
//! Every failure carries an [`ErrorKind`] so callers can ask "is this a header
//! failure?" while the underlying cause stays reachable through
//! [`std::error::Error::source`].

use std::error::Error as StdError;
use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The closed set of failure kinds.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Decoding the header record failed. Not raised for an empty stream.
    ReadHeader,
    /// Decoding a body record failed, including ragged rows.
    ReadLine,
    /// A positional write addressed a column that does not exist.
    IndexOutOfRange,
    /// The output sink failed while rewriting rows.
    MapRows,
}

impl ErrorKind {
    fn describe(self) -> &'static str {
        match self {
            ErrorKind::ReadHeader => "error reading header",
            ErrorKind::ReadLine => "error reading line",
            ErrorKind::IndexOutOfRange => "index out of range",
            ErrorKind::MapRows => "error mapping rows",
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    line: Option<u64>,
    index: Option<(usize, usize)>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            line: None,
            index: None,
            source: None,
        }
    }

    pub(crate) fn read_header(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(ErrorKind::ReadHeader).with_source(source)
    }

    pub(crate) fn read_line(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(ErrorKind::ReadLine).with_source(source)
    }

    pub(crate) fn map_rows(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::new(ErrorKind::MapRows).with_source(source)
    }

    pub(crate) fn index_out_of_range(index: usize, len: usize) -> Self {
        Self {
            index: Some((index, len)),
            ..Self::new(ErrorKind::IndexOutOfRange)
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns `true` when this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// 1-based record number the failure was reported at, if known.
    pub fn line(&self) -> Option<u64> {
        self.line
    }

    pub fn with_line(mut self, line: u64) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_source(mut self, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.describe())?;
        if let Some((index, len)) = self.index {
            write!(f, " (index: {index}, len: {len})")?;
        }
        if let Some(line) = self.line {
            write!(f, " (record: {line})")?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}
