//! Opening readers and sinks by path.
//!
//! Errors here are `anyhow` errors annotated with the path. A header failure
//! keeps its typed form and can be recovered with
//! `err.downcast_ref::<csvrow::Error>()`.

pub mod compression;

use crate::options::{ReaderBuilder, ReaderOptions};
use crate::reader::Reader;
use crate::source::CsvSource;
use anyhow::{Context, Result};
use compression::{auto_detect_reader, auto_detect_writer};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Reader type produced by [`open_csv`].
pub type FileReader = Reader<CsvSource<Box<dyn Read>>>;

/// Open `path` as a delimited file, decompressing it if needed.
///
/// The header is parsed when `options.has_header` is set.
///
/// # Errors
/// Returns an error if the options are invalid, the file cannot be opened, or
/// the header cannot be decoded.
pub fn open_csv(path: impl AsRef<Path>, options: &ReaderOptions) -> Result<FileReader> {
    let path = path.as_ref();
    let builder = ReaderBuilder::from_options(options)?;
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = auto_detect_reader(f, path)
        .with_context(|| format!("setup decompression for {}", path.display()))?;
    let reader = builder
        .from_reader(rdr)
        .with_context(|| format!("read header of {}", path.display()))?;
    tracing::debug!(path = %path.display(), "opened csv");
    Ok(reader)
}

/// Create a buffered sink at `path` for [`Reader::map_rows`], compressing by
/// extension and creating parent directories.
///
/// # Errors
/// Returns an error if the directories or the file cannot be created.
pub fn create_sink(path: impl AsRef<Path>) -> Result<Box<dyn Write>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let w = auto_detect_writer(f, path)
        .with_context(|| format!("setup compression for {}", path.display()))?;
    Ok(Box::new(BufWriter::new(w)))
}
