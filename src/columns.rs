//! Raw cell values of a single record.

use crate::error::{Error, Result};
use std::ops::Deref;

/// Ordered cell values of one record, 0-indexed.
///
/// Reads are total: [`Columns::at`] returns `""` for any index past the end.
/// Writes are strict: [`Columns::set`] rejects such an index and leaves the
/// values untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Columns(Vec<String>);

impl Columns {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// Value at `index`, or `""` when out of range.
    pub fn at(&self, index: usize) -> &str {
        self.0.get(index).map_or("", String::as_str)
    }

    /// Replace the value at `index`.
    ///
    /// # Errors
    /// Returns an [`ErrorKind::IndexOutOfRange`](crate::ErrorKind::IndexOutOfRange)
    /// error when `index >= len`.
    pub fn set(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        let len = self.0.len();
        match self.0.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(Error::index_out_of_range(index, len)),
        }
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for Columns {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Columns {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl From<&csv::StringRecord> for Columns {
    fn from(record: &csv::StringRecord) -> Self {
        Self(record.iter().map(str::to_owned).collect())
    }
}

impl<S: Into<String>> FromIterator<S> for Columns {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
