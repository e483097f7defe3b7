//! Deriving index entries from container files.

use std::io::Read;
use std::str;

use data_encoding::BASE32;
use flate2::bufread::GzDecoder;
use sha1::{Digest, Sha1};

use crate::cdx::{Entry, Field};
use crate::compression::GZIP_MAGIC;
use crate::filter::canonical_timestamp;
use crate::record::{
    Record, RecordScanner, CONTENT_TYPE_FIELD, DATE_FIELD, PAYLOAD_DIGEST_FIELD, TARGET_URI_FIELD,
    TYPE_FIELD,
};

/// Derives one index [`Entry`] per record from a container's on-disk bytes.
///
/// Offsets and sizes always describe the compressed (on-disk) byte stream,
/// never the decoded text, which is what makes later random-access extraction
/// possible without decompressing a whole container. For gzip containers the
/// builder walks independently decodable members; correctness of the
/// resulting offsets relies on the container having been written with one
/// member per record. A member holding several records is indexed at member
/// granularity and reported as a warning, since its inner records cannot be
/// addressed separately.
pub struct IndexBuilder<'a> {
    filename: &'a str,
}

impl<'a> IndexBuilder<'a> {
    /// Create a builder for a container known by `filename`, the name
    /// recorded in each entry's `file name` field.
    pub fn new(filename: &'a str) -> Self {
        IndexBuilder { filename }
    }

    /// Build entries, in record order, from the raw bytes of a container
    /// file.
    pub fn build(&self, data: &[u8]) -> std::io::Result<Vec<Entry>> {
        if data.starts_with(&GZIP_MAGIC) {
            self.build_compressed(data)
        } else {
            self.build_plain(data)
        }
    }

    /// Walk concatenated gzip members, indexing each at its compressed
    /// extent.
    fn build_compressed(&self, data: &[u8]) -> std::io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        let mut pos = 0usize;

        while pos < data.len() {
            let remaining = &data[pos..];
            if !remaining.starts_with(&GZIP_MAGIC) {
                warn!(
                    "{}: unexpected bytes at offset {}, stopping member walk",
                    self.filename, pos
                );
                break;
            }

            let mut decoder = GzDecoder::new(remaining);
            let mut unit = Vec::new();
            if let Err(e) = decoder.read_to_end(&mut unit) {
                warn!(
                    "{}: cannot decode member at offset {}: {}",
                    self.filename, pos, e
                );
                break;
            }
            let consumed = remaining.len() - decoder.into_inner().len();
            if consumed == 0 {
                break;
            }

            let records = self.scan_unit(&unit)?;
            if records.len() > 1 {
                warn!(
                    "{}: member at offset {} holds {} records; indexing at member granularity",
                    self.filename,
                    pos,
                    records.len()
                );
            }
            for record in records {
                entries.push(self.entry_for(&record, pos as u64, consumed as u64));
            }
            pos += consumed;
        }

        Ok(entries)
    }

    /// Index an uncompressed container using the scanner's byte extents
    /// directly.
    fn build_plain(&self, data: &[u8]) -> std::io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        let mut scanner = RecordScanner::new(data);
        let mut offset: Option<usize> = None;

        while let Some(record) = scanner.next() {
            let record = record?;
            let start = offset.unwrap_or_else(|| scanner.leading_bytes_skipped());
            let len = record.len();
            entries.push(self.entry_for(&record, start as u64, len as u64));
            offset = Some(start + len);
        }
        Ok(entries)
    }

    fn scan_unit(&self, unit: &[u8]) -> std::io::Result<Vec<Record>> {
        RecordScanner::new(unit).collect()
    }

    /// Assemble the eleven index fields for one record.
    fn entry_for(&self, record: &Record, offset: u64, length: u64) -> Entry {
        let url = record.field(TARGET_URI_FIELD).unwrap_or("");
        let date = record
            .field(DATE_FIELD)
            .and_then(canonical_timestamp)
            .unwrap_or_default();
        let warc_type = record.field(TYPE_FIELD).unwrap_or("");

        let (status, http_mime) = http_response_head(&record.content);
        let mime = if warc_type.eq_ignore_ascii_case("revisit") {
            Some("warc/revisit".to_owned())
        } else {
            http_mime
                .or_else(|| record.field(CONTENT_TYPE_FIELD).map(str::to_owned))
                .map(|value| mime_essence(&value))
        };

        let digest = record
            .field(PAYLOAD_DIGEST_FIELD)
            .map(|value| value.rsplit(':').next().unwrap_or(value).to_owned())
            .unwrap_or_else(|| content_digest(&record.content));

        let mut entry = Entry::default();
        entry.insert(Field::SearchableUrl.name(), massage_url(url));
        entry.insert(Field::Date.name(), date);
        entry.insert(Field::Url.name(), url.to_owned());
        entry.insert(Field::MimeType.name(), mime.unwrap_or_default());
        entry.insert(Field::ResponseCode.name(), status.unwrap_or_default());
        entry.insert(Field::Digest.name(), digest);
        entry.insert(Field::Redirect.name(), String::new());
        entry.insert(Field::MetaTags.name(), String::new());
        entry.insert(Field::Length.name(), length.to_string());
        entry.insert(Field::CompressedFileOffset.name(), offset.to_string());
        entry.insert(Field::Filename.name(), self.filename.to_owned());
        entry
    }
}

/// Pull the status code and entity content type out of an HTTP response
/// head, when the record content starts with one.
fn http_response_head(content: &[u8]) -> (Option<String>, Option<String>) {
    let mut headers = [httparse::EMPTY_HEADER; 32];
    let mut response = httparse::Response::new(&mut headers);
    if response.parse(content).is_err() {
        return (None, None);
    }

    let status = response.code.map(|code| code.to_string());
    let content_type = response
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(CONTENT_TYPE_FIELD))
        .and_then(|h| str::from_utf8(h.value).ok())
        .map(|value| value.trim().to_owned());
    (status, content_type)
}

/// Reduce a Content-Type value to its `type/subtype` essence.
fn mime_essence(value: &str) -> String {
    match value.parse::<mime::Mime>() {
        Ok(parsed) => parsed.essence_str().to_owned(),
        Err(_) => value.split(';').next().unwrap_or(value).trim().to_owned(),
    }
}

/// SHA-1 digest of the content block, base32-encoded as conventional for
/// WARC digests.
fn content_digest(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(content);
    BASE32.encode(&hasher.finalize())
}

/// Reduce a URI to searchable sorted form: the host reversed into
/// comma-joined segments, a `)` separator, then the path, all lowercased
/// with the scheme omitted.
///
/// `http://www.Example.com/About` becomes `com,example,www)/about`.
fn massage_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    let (host, path) = match without_scheme.find('/') {
        Some(i) => (&without_scheme[..i], &without_scheme[i..]),
        None => (without_scheme, "/"),
    };

    let host = host.to_ascii_lowercase();
    let mut segments: Vec<&str> = host.split('.').collect();
    segments.reverse();
    format!("{}){}", segments.join(","), path.to_ascii_lowercase())
}
