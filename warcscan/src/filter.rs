//! Evaluating records and index entries against selection criteria.

use crate::cdx::Entry;
use crate::record::{Record, CONTENT_TYPE_FIELD, DATE_FIELD, TARGET_URI_FIELD};

/// Number of characters in a canonical `YYYYMMDDHHMMSS` timestamp.
const TIMESTAMP_LEN: usize = 14;

/// Maximum number of content lines inspected for a MIME marker.
///
/// Content types are conventionally emitted within the first few lines of an
/// HTTP payload head; bounding the scan keeps filtering cost independent of
/// record size.
const CONTENT_SCAN_LINES: usize = 10;

/// Entry field consulted for URL criteria.
const ENTRY_URL_FIELD: &str = "original url";
/// Entry field consulted for date criteria.
const ENTRY_DATE_FIELD: &str = "date";
/// Entry field consulted for MIME type criteria.
const ENTRY_TYPE_FIELD: &str = "mime type of original document";

/// Date selection: either any-of fragments or an inclusive range.
///
/// All comparison happens on canonical timestamps. Range bounds may be given
/// partially (`2018`, `201806`) and are right-padded with zeros to the full
/// fourteen characters, after which lexicographic order coincides with
/// chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSelector {
    /// Match any timestamp containing one of the given fragments.
    Values(Vec<String>),
    /// Match timestamps falling within the inclusive range.
    Range { from: String, until: String },
}

impl DateSelector {
    /// Test a canonical timestamp against the selector.
    pub fn matches(&self, canonical: &str) -> bool {
        match self {
            DateSelector::Values(values) => {
                values.iter().any(|value| canonical.contains(value.as_str()))
            }
            DateSelector::Range { from, until } => {
                let lo = pad_timestamp(from);
                let hi = pad_timestamp(until);
                canonical >= lo.as_str() && canonical <= hi.as_str()
            }
        }
    }
}

/// Record and index entry selection criteria.
///
/// An absent category is vacuously satisfied. Within a category, supplied
/// values combine with OR; across categories the combination is AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Substrings matched against the record's target URI.
    pub url: Option<Vec<String>>,
    /// Substrings matched against the record's MIME type.
    pub file_type: Option<Vec<String>>,
    /// Date selection over the record's canonical capture timestamp.
    pub date: Option<DateSelector>,
}

impl Criteria {
    /// Returns `true` if no category is constrained.
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.file_type.is_none() && self.date.is_none()
    }

    /// Evaluate a record against the criteria.
    ///
    /// Date and URL markers are looked for in the header block; the MIME
    /// marker is looked for within the first few content lines only, since
    /// that is where HTTP payload heads carry it.
    pub fn accepts_record(&self, record: &Record) -> bool {
        let mut date_ok = self.date.is_none();
        let mut url_ok = self.url.is_none();
        let mut type_ok = self.file_type.is_none();

        if !date_ok || !url_ok {
            for line in record.header.split(|&b| b == b'\n') {
                let line = String::from_utf8_lossy(line);
                if let Some(date) = &self.date {
                    if !date_ok && line.contains(DATE_FIELD) {
                        if let Some(stamp) = second_token(&line).and_then(canonical_timestamp) {
                            date_ok = date.matches(&stamp);
                        }
                    }
                }
                if let Some(urls) = &self.url {
                    if !url_ok && line.contains(TARGET_URI_FIELD) {
                        url_ok = urls.iter().any(|url| line.contains(url.as_str()));
                    }
                }
            }
        }

        if let Some(types) = &self.file_type {
            for line in record
                .content
                .split(|&b| b == b'\n')
                .take(CONTENT_SCAN_LINES)
            {
                let line = String::from_utf8_lossy(line);
                if !line.contains(CONTENT_TYPE_FIELD) {
                    continue;
                }
                if let Some(value) = second_token(&line) {
                    if types.iter().any(|t| value.contains(t.as_str())) {
                        type_ok = true;
                        break;
                    }
                }
            }
        }

        date_ok && url_ok && type_ok
    }

    /// Evaluate a structured index entry against the criteria.
    ///
    /// Same semantics as [`accepts_record`](Self::accepts_record), but over
    /// already-parsed fields: a criterion whose field is absent from the
    /// entry passes vacuously.
    pub fn accepts_entry(&self, entry: &Entry) -> bool {
        if let (Some(date), Some(value)) = (&self.date, entry.get(ENTRY_DATE_FIELD)) {
            if !date.matches(value) {
                return false;
            }
        }
        if let (Some(urls), Some(value)) = (&self.url, entry.get(ENTRY_URL_FIELD)) {
            if !urls.iter().any(|url| value.contains(url.as_str())) {
                return false;
            }
        }
        if let (Some(types), Some(value)) = (&self.file_type, entry.get(ENTRY_TYPE_FIELD)) {
            if !types.iter().any(|t| value.contains(t.as_str())) {
                return false;
            }
        }
        true
    }
}

/// Right-pad a partial timestamp with zeros to canonical width.
///
/// `2018` becomes `20180000000000`; already-full timestamps are unchanged.
pub fn pad_timestamp(stamp: &str) -> String {
    let mut padded = stamp.to_owned();
    while padded.len() < TIMESTAMP_LEN {
        padded.push('0');
    }
    padded
}

/// Convert an RFC 3339 `WARC-Date` value to canonical `YYYYMMDDHHMMSS` form.
pub fn canonical_timestamp(stamp: &str) -> Option<String> {
    chrono::DateTime::parse_from_rfc3339(stamp)
        .ok()
        .map(|parsed| parsed.format("%Y%m%d%H%M%S").to_string())
}

/// The whitespace-delimited token following a header line's field name.
fn second_token(line: &str) -> Option<&str> {
    line.split_whitespace().nth(1)
}
