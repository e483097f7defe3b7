//! CDX index model: the field legend, ordered entries, and index reading.
//!
//! An index file begins with a header line declaring its field order as a
//! list of single-letter codes, e.g. ` CDX N b a m s k r M S V g`; every
//! following line carries that many space-separated tokens, mapped
//! positionally through the [legend].

use std::io::BufRead;

use indexmap::IndexMap;
use thiserror::Error;

pub mod legend;
mod writer;

pub use writer::{write_entry, write_header, IndexFormat, CDX11_HEADER};

/// One index row: an ordered mapping from semantic field name to value.
///
/// Entries preserve the column order they were parsed or built with, so
/// serializing an entry set reproduces a stable layout.
pub type Entry = IndexMap<&'static str, String>;

/// The index fields recorded for each container record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// A searchable URI.
    ///
    /// In CDX indexes this is an 'N' field. The value is a canonicalized URI
    /// in sorted (SURT) form that omits the scheme.
    SearchableUrl,
    /// The capture date of the record, in canonical timestamp form.
    ///
    /// 'b' fields in a CDX index.
    Date,
    /// The target URI of the record.
    ///
    /// CDX 'a' field.
    Url,
    /// MIME type of the record.
    ///
    /// This value is warc/revisit for revisit records, the HTTP content type
    /// of the entity body for responses, otherwise the Content-Type header of
    /// the record itself.
    ///
    /// CDX 'm' field.
    MimeType,
    /// HTTP response code (for response records only).
    ///
    /// CDX 's' field.
    ResponseCode,
    /// Payload digest value.
    ///
    /// CDX 'k' field.
    Digest,
    /// Redirect target.
    ///
    /// CDX 'r' field.
    Redirect,
    /// Meta tags.
    ///
    /// CDX 'M' field.
    MetaTags,
    /// Size of the compressed record data.
    ///
    /// CDX 'S' field.
    Length,
    /// Record offset in the compressed file containing the record.
    ///
    /// CDX 'V' field.
    CompressedFileOffset,
    /// Name of the file containing the described record.
    ///
    /// CDX 'g' field.
    Filename,
}

/// The eleven-column field order declared by [`CDX11_HEADER`].
pub const CDX11_FIELDS: [Field; 11] = [
    Field::SearchableUrl,
    Field::Date,
    Field::Url,
    Field::MimeType,
    Field::ResponseCode,
    Field::Digest,
    Field::Redirect,
    Field::MetaTags,
    Field::Length,
    Field::CompressedFileOffset,
    Field::Filename,
];

impl Field {
    /// The single-letter code identifying the field in an index header.
    pub fn code(&self) -> char {
        match self {
            Field::SearchableUrl => 'N',
            Field::Date => 'b',
            Field::Url => 'a',
            Field::MimeType => 'm',
            Field::ResponseCode => 's',
            Field::Digest => 'k',
            Field::Redirect => 'r',
            Field::MetaTags => 'M',
            Field::Length => 'S',
            Field::CompressedFileOffset => 'V',
            Field::Filename => 'g',
        }
    }

    /// The semantic field name, as resolved through the [legend].
    pub fn name(&self) -> &'static str {
        match self {
            Field::SearchableUrl => "massaged url",
            Field::Date => "date",
            Field::Url => "original url",
            Field::MimeType => "mime type of original document",
            Field::ResponseCode => "response code",
            Field::Digest => "new style checksum",
            Field::Redirect => "redirect",
            Field::MetaTags => "meta tags",
            Field::Length => "compressed record size",
            Field::CompressedFileOffset => "compressed arc/warc file offset",
            Field::Filename => "file name",
        }
    }
}

/// Errors arising while reading an index file.
#[derive(Debug, Error)]
pub enum IndexParseError {
    /// A data line's token count does not match the header's declared arity.
    ///
    /// Malformed lines are scoped to themselves; callers skip them and keep
    /// scanning the remaining lines.
    #[error("index line has {found} fields where its header declares {expected}")]
    FieldCountMismatch { expected: usize, found: usize },
    /// An I/O error occurred while reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse an index header line into its declared field order.
///
/// The first two tokens are format markers and are dropped; each remaining
/// single-letter code resolves through the [legend]. Unrecognized codes keep
/// their column position but carry no name, so their tokens are consumed and
/// discarded when zipping data lines.
pub fn parse_header_line(line: &str) -> Vec<Option<&'static str>> {
    line.split(' ')
        .skip(2)
        .map(|token| {
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(code), None) => legend::lookup(code),
                _ => None,
            }
        })
        .collect()
}

/// Zip one data line against the field order declared by the header.
pub fn parse_entry_line(
    line: &str,
    fields: &[Option<&'static str>],
) -> Result<Entry, IndexParseError> {
    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() != fields.len() {
        return Err(IndexParseError::FieldCountMismatch {
            expected: fields.len(),
            found: tokens.len(),
        });
    }

    let mut entry = Entry::default();
    for (name, token) in fields.iter().zip(tokens) {
        if let Some(name) = name {
            entry.insert(*name, token.to_owned());
        }
    }
    Ok(entry)
}

/// Reads index entries from a line stream.
///
/// The first non-empty line declares the field order; each following line is
/// yielded as an [`Entry`]. A malformed line surfaces as an error item and
/// the iterator continues with the next line, so one bad row never ends the
/// scan.
pub struct IndexReader<R> {
    input: R,
    fields: Option<Vec<Option<&'static str>>>,
    line: String,
}

impl<R: BufRead> IndexReader<R> {
    pub fn new(input: R) -> Self {
        IndexReader {
            input,
            fields: None,
            line: String::new(),
        }
    }

    /// The field order declared by the index header, once it has been read.
    pub fn fields(&self) -> Option<&[Option<&'static str>]> {
        self.fields.as_deref()
    }
}

impl<R: BufRead> Iterator for IndexReader<R> {
    type Item = Result<Entry, IndexParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.input.read_line(&mut self.line) {
                Err(e) => return Some(Err(e.into())),
                Ok(0) => return None,
                Ok(_) => {}
            }
            let line = self.line.trim_end_matches(&['\r', '\n'][..]);
            if line.is_empty() {
                continue;
            }
            match &self.fields {
                None => self.fields = Some(parse_header_line(line)),
                Some(fields) => return Some(parse_entry_line(line, fields)),
            }
        }
    }
}
