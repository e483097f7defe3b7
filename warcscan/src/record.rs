//! Splitting container streams into discrete records.

use std::io::{self, BufRead};
use std::mem;
use std::str;

use uncased::AsUncased;

use crate::version::Version;

/// Header field holding the record's capture date.
pub const DATE_FIELD: &str = "WARC-Date";
/// Header field holding the record's target URI.
pub const TARGET_URI_FIELD: &str = "WARC-Target-URI";
/// Header field holding the record type.
pub const TYPE_FIELD: &str = "WARC-Type";
/// Field naming a block's content type, in record headers and HTTP payload
/// heads alike.
pub const CONTENT_TYPE_FIELD: &str = "Content-Type";
/// Header field holding a precomputed digest of the record payload.
pub const PAYLOAD_DIGEST_FIELD: &str = "WARC-Payload-Digest";

/// A complete record read out of a container: the raw header block and the raw
/// content block.
///
/// Both blocks keep their original bytes, line terminators included, so that
/// writing `header` followed by `content` reproduces the record exactly as it
/// appeared in the (decoded) input. The header always ends with one empty
/// line; the content is everything up to the next record's start marker and
/// may hold arbitrary binary data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    /// The header block: the version marker line, the header fields, and the
    /// terminating empty line.
    pub header: Vec<u8>,
    /// The content block.
    pub content: Vec<u8>,
}

impl Record {
    /// Total serialized length of the record in bytes.
    pub fn len(&self) -> usize {
        self.header.len() + self.content.len()
    }

    /// Returns `true` if the record holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.content.is_empty()
    }

    /// Look up a header field value by name.
    ///
    /// Header lines are free-form `Key: value` text rather than a strict
    /// mapping; the name comparison is case-insensitive and the first
    /// matching line wins. Lines that are not valid UTF-8 are passed over.
    pub fn field(&self, name: &str) -> Option<&str> {
        for line in self.header.split(|&b| b == b'\n') {
            let text = match str::from_utf8(line) {
                Ok(text) => text,
                Err(_) => continue,
            };
            let colon = match text.find(':') {
                Some(i) => i,
                None => continue,
            };
            if text[..colon].trim().as_uncased() == name.as_uncased() {
                return Some(text[colon + 1..].trim());
            }
        }
        None
    }
}

/// States of the record accumulation machine.
///
/// ```text
/// Seeking --marker--> Header --empty line--> Body --marker--> (emit, Header)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Discarding bytes until the first record-start marker.
    Seeking,
    /// Accumulating header lines until the empty terminator line.
    Header,
    /// Accumulating content lines until the next record-start marker.
    Body,
}

/// Streaming scanner producing [`Record`]s from a decoded container stream.
///
/// The scanner is lazy, finite and forward-only: it consumes the underlying
/// reader as records are requested and is exhausted once the stream ends.
/// Content is treated as opaque bytes; only line boundaries and record-start
/// markers are interpreted, so binary record bodies pass through untouched.
///
/// A stream holding no record-start marker yields no records. At end of
/// stream, any accumulated partial record is emitted as the final record.
pub struct RecordScanner<R> {
    input: R,
    state: ScanState,
    header: Vec<u8>,
    content: Vec<u8>,
    line: Vec<u8>,
    skipped: usize,
    finished: bool,
}

impl<R: BufRead> RecordScanner<R> {
    pub fn new(input: R) -> Self {
        RecordScanner {
            input,
            state: ScanState::Seeking,
            header: Vec::new(),
            content: Vec::new(),
            line: Vec::new(),
            skipped: 0,
            finished: false,
        }
    }

    /// Bytes discarded before the first record-start marker was seen.
    ///
    /// The first record's byte offset within the stream, once it has been
    /// emitted.
    pub fn leading_bytes_skipped(&self) -> usize {
        self.skipped
    }

    /// Feed one line through the state machine, returning a record when the
    /// line completes one.
    fn step(&mut self, line: &[u8]) -> Option<Record> {
        let is_marker = Version::find_in_line(line).is_some();

        match self.state {
            ScanState::Seeking if is_marker => {
                self.state = ScanState::Header;
                self.header.extend_from_slice(line);
                None
            }
            ScanState::Seeking => {
                self.skipped += line.len();
                None
            }
            ScanState::Header => {
                self.header.extend_from_slice(line);
                if line_is_empty(line) {
                    self.state = ScanState::Body;
                }
                None
            }
            ScanState::Body if is_marker => {
                let record = Record {
                    header: mem::take(&mut self.header),
                    content: mem::take(&mut self.content),
                };
                self.state = ScanState::Header;
                self.header.extend_from_slice(line);
                Some(record)
            }
            ScanState::Body => {
                self.content.extend_from_slice(line);
                None
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordScanner<R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            self.line.clear();
            match self.input.read_until(b'\n', &mut self.line) {
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                Ok(0) => {
                    self.finished = true;
                    if !self.header.is_empty() || !self.content.is_empty() {
                        trace!("emitting final record at end of stream");
                        return Some(Ok(Record {
                            header: mem::take(&mut self.header),
                            content: mem::take(&mut self.content),
                        }));
                    }
                    return None;
                }
                Ok(_) => {
                    // step() can't take a borrow of self.line while also
                    // borrowing self, so lend it the buffer and take it back.
                    let line = mem::take(&mut self.line);
                    let emitted = self.step(&line);
                    self.line = line;
                    if let Some(record) = emitted {
                        return Some(Ok(record));
                    }
                }
            }
        }
    }
}

/// An empty line: nothing but its terminator.
fn line_is_empty(line: &[u8]) -> bool {
    matches!(line, b"\n" | b"\r\n")
}
