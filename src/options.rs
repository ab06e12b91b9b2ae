//! Reader configuration.
//!
//! [`ReaderOptions`] is the serde-loadable form (e.g. from a JSON config file);
//! [`ReaderBuilder`] is the validated, byte-level form that actually builds a
//! [`Reader`].

use crate::error::Result;
use crate::reader::Reader;
use crate::source::CsvSource;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};

/// Dialect and header settings for a [`Reader`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Field separator.
    pub delimiter: char,
    /// Quote character.
    pub quote: char,
    /// Lines starting with this character are skipped.
    pub comment: Option<char>,
    /// Treat the first record as the header.
    pub has_header: bool,
    /// Trim whitespace around every field.
    pub trim: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            comment: None,
            has_header: true,
            trim: false,
        }
    }
}

impl ReaderOptions {
    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let options: Self = serde_json::from_str(json).context("parse reader options")?;
        options.validate()?;
        Ok(options)
    }

    /// Check that every configured character fits in a single ASCII byte and
    /// that delimiter and quote differ.
    pub fn validate(&self) -> anyhow::Result<()> {
        ascii_byte("delimiter", self.delimiter)?;
        ascii_byte("quote", self.quote)?;
        if let Some(comment) = self.comment {
            ascii_byte("comment", comment)?;
        }
        if self.delimiter == self.quote {
            bail!("delimiter and quote must differ (both {:?})", self.delimiter);
        }
        Ok(())
    }
}

fn ascii_byte(what: &str, c: char) -> anyhow::Result<u8> {
    if !c.is_ascii() {
        bail!("{what} must be a single ASCII character, got {c:?}");
    }
    Ok(c as u8)
}

/// Builds a [`Reader`] over the `csv` crate.
#[derive(Clone, Debug)]
pub struct ReaderBuilder {
    delimiter: u8,
    quote: u8,
    comment: Option<u8>,
    has_header: bool,
    trim: bool,
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReaderBuilder {
    /// Comma-delimited, `"`-quoted, header on.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            comment: None,
            has_header: true,
            trim: false,
        }
    }

    /// Validate `options` and convert them to a builder.
    pub fn from_options(options: &ReaderOptions) -> anyhow::Result<Self> {
        options.validate()?;
        Ok(Self {
            delimiter: ascii_byte("delimiter", options.delimiter)?,
            quote: ascii_byte("quote", options.quote)?,
            comment: options
                .comment
                .map(|c| ascii_byte("comment", c))
                .transpose()?,
            has_header: options.has_header,
            trim: options.trim,
        })
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn quote(&mut self, quote: u8) -> &mut Self {
        self.quote = quote;
        self
    }

    pub fn comment(&mut self, comment: Option<u8>) -> &mut Self {
        self.comment = comment;
        self
    }

    pub fn has_header(&mut self, yes: bool) -> &mut Self {
        self.has_header = yes;
        self
    }

    pub fn trim(&mut self, yes: bool) -> &mut Self {
        self.trim = yes;
        self
    }

    /// Build a reader over `reader`, parsing the header if configured.
    ///
    /// # Errors
    /// Fails with [`ErrorKind::ReadHeader`](crate::ErrorKind::ReadHeader) when
    /// the header is enabled and cannot be decoded.
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<Reader<CsvSource<R>>> {
        let mut csv_builder = csv::ReaderBuilder::new();
        csv_builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .comment(self.comment)
            .trim(if self.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            });
        let source = CsvSource::from_builder(&mut csv_builder, reader);
        let mut reader = Reader::from_source(source, self.delimiter).with_quote(self.quote);
        if self.has_header {
            reader.parse_header()?;
        }
        Ok(reader)
    }

    /// Build a reader over in-memory text or bytes.
    pub fn from_bytes<T: AsRef<[u8]>>(&self, data: T) -> Result<Reader<CsvSource<Cursor<T>>>> {
        self.from_reader(Cursor::new(data))
    }
}
