//! # csvrow
//!
//! Row-oriented reading of **delimited text** (CSV and friends) with optional
//! named-column access and a **map-and-rewrite** pipeline.
//!
//! ## Key Features
//!
//! - **Incremental decoding** - records are pulled one at a time from any `Read`
//! - **Deferred header binding** - parse the first record as a header only when asked
//! - **Named lookups** - [`Row::column`] resolves names through a shared [`Header`]
//! - **Rewrite pipeline** - [`Reader::map_rows`] mutates rows in place and re-emits them
//! - **Pluggable decoding** - any [`RecordSource`] can drive a [`Reader`]
//! - **Typed errors** - every failure carries an [`ErrorKind`] and keeps its cause
//!
//! ## Quick Start
//!
//! ```
//! use csvrow::Reader;
//!
//! # fn main() -> csvrow::Result<()> {
//! let mut reader = Reader::from_bytes_with_header("name,age\nada,36\ngrace,45\n", b',')?;
//!
//! let mut names = Vec::new();
//! reader.for_each(|row| {
//!     if let Some(name) = row.column("name") {
//!         names.push(name.to_owned());
//!     }
//! })?;
//!
//! assert_eq!(names, ["ada", "grace"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Columns and Rows
//!
//! [`Columns`] holds the raw values of one record. Reads past the end return
//! `""`; writes past the end fail with [`ErrorKind::IndexOutOfRange`]. A
//! [`Row`] bundles the columns with a borrowed [`Header`] and the delimiter, and
//! formats itself (via `Display`) as the delimiter-joined line.
//!
//! ### Header
//!
//! [`Reader::parse_header`] consumes one record and maps each name to its
//! position. An empty stream yields an empty header, not an error. Without a
//! header, name lookups return `None` and the first record is an ordinary row.
//!
//! ### Rewriting
//!
//! [`Reader::map_rows`] writes the header line (if any), then each row after
//! passing it through the transform, preserving input order.
//!
//! ## Files
//!
//! [`io::open_csv`] opens a path with [`ReaderOptions`] and transparently
//! decompresses gzip/zstd input (features `compression-gzip`,
//! `compression-zstd`); [`io::create_sink`] creates the matching output.
//!
//! ## Module Overview
//!
//! - [`columns`] - raw cell values
//! - [`header`] - name to index mapping
//! - [`row`] - a record bound to its header
//! - [`reader`] - iteration and the rewrite pipeline
//! - [`source`] - record decoding
//! - [`options`] - configuration and the builder
//! - [`error`] - error kinds
//! - [`io`] - path-based helpers

pub mod columns;
pub mod error;
pub mod header;
pub mod io;
pub mod options;
pub mod reader;
pub mod row;
pub mod source;

pub use columns::Columns;
pub use error::{Error, ErrorKind, Result};
pub use header::Header;
pub use options::{ReaderBuilder, ReaderOptions};
pub use reader::Reader;
pub use row::Row;
pub use source::{CsvSource, RecordSource};
