//! Random-access extraction of records named by index entries.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use flate2::bufread::GzDecoder;
use thiserror::Error;

use crate::cdx::{Entry, Field};
use crate::compression::GZIP_MAGIC;

/// Errors that prevent extracting a single entry.
///
/// Each failure is scoped to one entry; callers are expected to report it
/// and continue with the remaining entries.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The entry lacks a field required to locate its record bytes.
    #[error("index entry is missing its {0} field")]
    MissingField(&'static str),
    /// A numeric locator field failed to parse.
    #[error("index entry field {field} has non-numeric value {value:?}")]
    BadNumber {
        field: &'static str,
        value: String,
    },
    /// The resolved source container could not be opened or read.
    #[error("cannot read source container {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing to the output stream failed.
    #[error("I/O error writing output: {0}")]
    Io(#[from] io::Error),
}

/// Extracts record bytes by random access into the containers named by
/// index entries.
///
/// Source containers are resolved by the sibling-file convention: the
/// entry's `file name` value replaces the index file's own name within the
/// index file's parent directory.
///
/// Extraction reads each entry's compressed extent and decodes it as a
/// self-contained unit. That is only correct when the offsets in the index
/// point at the start of an independently decodable gzip member, which holds
/// for containers written with one member per record. A container that
/// interleaves records within a member yields corrupted or partial bytes
/// here; the condition is surfaced as a warning, not an error, favoring
/// best-effort batch completion.
pub struct Extractor {
    index_dir: PathBuf,
}

impl Extractor {
    /// Create an extractor resolving sources relative to the given index
    /// file path.
    pub fn new<P: AsRef<Path>>(index_path: P) -> Self {
        let index_dir = index_path
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Extractor { index_dir }
    }

    /// Resolve the container path named by an entry's `file name` field.
    pub fn resolve_source(&self, entry: &Entry) -> Result<PathBuf, ExtractError> {
        let name = entry
            .get(Field::Filename.name())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ExtractError::MissingField(Field::Filename.name()))?;
        Ok(self.index_dir.join(name))
    }

    /// Append one entry's record bytes to `out`, returning the number of
    /// bytes written.
    pub fn append_record<W: Write>(&self, entry: &Entry, out: &mut W) -> Result<u64, ExtractError> {
        let offset = numeric_field(entry, Field::CompressedFileOffset)?;
        let length = numeric_field(entry, Field::Length)?;
        let path = self.resolve_source(entry)?;

        let mut raw = Vec::with_capacity(length as usize);
        let read = |raw: &mut Vec<u8>| -> io::Result<()> {
            let mut file = File::open(&path)?;
            file.seek(SeekFrom::Start(offset))?;
            file.take(length).read_to_end(raw)?;
            Ok(())
        };
        read(&mut raw).map_err(|source| ExtractError::Source {
            path: path.clone(),
            source,
        })?;
        if (raw.len() as u64) < length {
            warn!(
                "{}: container ends {} bytes short of the entry extent at offset {}",
                path.display(),
                length - raw.len() as u64,
                offset
            );
        }

        let bytes = if raw.starts_with(&GZIP_MAGIC) {
            let mut unit = Vec::new();
            if let Err(e) = GzDecoder::new(&raw[..]).read_to_end(&mut unit) {
                // Best effort: whatever decoded before the failure is still
                // written out.
                warn!(
                    "{}: corrupt compression unit at offset {}: {}",
                    path.display(),
                    offset,
                    e
                );
            }
            unit
        } else {
            raw
        };

        out.write_all(&bytes)?;
        Ok(bytes.len() as u64)
    }
}

fn numeric_field(entry: &Entry, field: Field) -> Result<u64, ExtractError> {
    let name = field.name();
    let value = entry
        .get(name)
        .ok_or(ExtractError::MissingField(name))?;
    value.parse().map_err(|_| ExtractError::BadNumber {
        field: name,
        value: value.clone(),
    })
}
