//! A decoded record bound to its reader's header.

use crate::columns::Columns;
use crate::error::Result;
use crate::header::Header;
use std::fmt;

/// One record handed to a [`Reader`](crate::Reader) callback.
///
/// The header is borrowed from the reader, so a `Row` cannot outlive the
/// callback it was passed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row<'h> {
    columns: Columns,
    header: Option<&'h Header>,
    delimiter: u8,
}

impl<'h> Row<'h> {
    pub fn new(columns: Columns, header: Option<&'h Header>, delimiter: u8) -> Self {
        Self {
            columns,
            header,
            delimiter,
        }
    }

    /// Look up a value by column name.
    ///
    /// Returns `None` when the name is unknown or no header is bound. A known
    /// name always yields `Some`, with `""` for a missing cell.
    pub fn column(&self, name: &str) -> Option<&str> {
        let index = self.header?.resolve(name)?;
        Some(self.columns.at(index))
    }

    pub fn at(&self, index: usize) -> &str {
        self.columns.at(index)
    }

    /// Replace the value at `index`. See [`Columns::set`].
    pub fn set(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        self.columns.set(index, value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut Columns {
        &mut self.columns
    }

    pub fn header(&self) -> Option<&'h Header> {
        self.header
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn into_columns(self) -> Columns {
        self.columns
    }
}

/// Values joined by the delimiter, with no trailing delimiter or newline.
impl fmt::Display for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let delimiter = char::from(self.delimiter);
        for (i, value) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, "{delimiter}")?;
            }
            f.write_str(value)?;
        }
        Ok(())
    }
}
