//! Tools for scanning WARC (Web ARChive) containers, filtering their records,
//! and building and consuming CDX indexes.
//!
//! ## Background
//!
//! WARC files are used to store digital resources and related information,
//! generally for archival storage. A WARC file is a simple concatenation of
//! records, each consisting of a version line, a number of header fields, and
//! any number of bytes of data:
//!
//! ```text
//! WARC/1.0
//! WARC-Type: response
//! WARC-Target-URI: https://example.com
//! WARC-Date: 2018-06-15T12:00:00Z
//! Content-Type: application/http;msgtype=response
//! Content-Length: 135
//!
//! HTTP/1.1 200 OK
//! Content-Type: text/html
//! ...
//! ```
//!
//! Collections of WARC files are commonly accompanied by CDX index files: a
//! compact columnar summary with one line per record, keyed by single-letter
//! field codes, recording among other things each record's compressed byte
//! offset and length within its container. Provided the container compresses
//! each record as its own gzip member, an index line is enough to recover a
//! single record without decompressing anything else.
//!
//! ## Library structure
//!
//! [`RecordScanner`] splits a decoded container stream into [`Record`]s.
//! [`Criteria`] evaluates records, or structured index [`Entry`] values, against
//! URL, MIME type, and capture date conditions. [`IndexBuilder`] derives index
//! entries from a container's on-disk bytes, and [`Extractor`] performs the
//! reverse operation, re-materializing record bytes named by index entries.

#[macro_use]
extern crate log;

pub mod builder;
pub mod cdx;
pub mod compression;
pub mod extract;
pub mod filter;
pub mod record;
#[cfg(test)]
mod tests;
mod version;

pub use builder::IndexBuilder;
pub use cdx::{Entry, Field, IndexFormat, IndexParseError, IndexReader};
pub use compression::{Compression, Writer};
pub use extract::{ExtractError, Extractor};
pub use filter::{Criteria, DateSelector};
pub use record::{Record, RecordScanner};
pub use version::Version;
