//! Parsing of the free-text command form.
//!
//! A command names its inputs, output, and mode, followed by any filters:
//!
//! ```text
//! src: a.warc.gz,b.warc.gz dest: out.warc mode: warc url: example.com date: 2018-2019 recordLimit: 100
//! ```
//!
//! Keyword tokens end with `:`; every following token up to the next keyword
//! belongs to that keyword's value. Comma-separated values form OR lists, and
//! a `date` value of `start-end` selects an inclusive range.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;
use warcscan::{Criteria, DateSelector, IndexFormat};

/// Recognized argument keywords.
const KEYWORDS: &[&str] = &[
    "src",
    "dest",
    "mode",
    "fileType",
    "date",
    "url",
    "recordLimit",
    "fileLimit",
    "type",
    "compressed",
];

/// The three operations a command can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Filter container records into a new container (`warc`).
    FilterRecords,
    /// Filter an index and re-materialize the matching records (`cdx`).
    ExtractFromIndex,
    /// Build an index from containers (`createCDX`).
    BuildIndex,
}

impl Mode {
    /// The mode keyword as written in commands.
    pub fn keyword(self) -> &'static str {
        match self {
            Mode::FilterRecords => "warc",
            Mode::ExtractFromIndex => "cdx",
            Mode::BuildIndex => "createCDX",
        }
    }
}

/// A fully parsed command, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub sources: Vec<PathBuf>,
    pub dest: PathBuf,
    pub mode: Mode,
    pub criteria: Criteria,
    /// Ceiling on records written across all sources.
    pub record_limit: usize,
    /// Gzip-compress the finished output as a final pass.
    pub compress_output: bool,
    /// Row format for `createCDX` output.
    pub index_format: IndexFormat,
}

/// Configuration problems that abort an invocation before any output is
/// produced.
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    /// The mode is missing or not one of the known keywords.
    #[error("{0:?} is not a valid mode (expected warc, cdx, or createCDX)")]
    UnknownMode(String),
    /// A required argument was not supplied.
    #[error("missing required {0}: argument")]
    MissingArgument(&'static str),
    /// The record limit is not a number.
    #[error("recordLimit must be a number, got {0:?}")]
    BadRecordLimit(String),
    /// The index type is not a known format.
    #[error("type must be cdx or cdxj, got {0:?}")]
    BadIndexType(String),
}

/// Parse a free-text command into a [`Request`].
pub fn parse(input: &str) -> Result<Request, CommandError> {
    let mut values: HashMap<&'static str, String> = HashMap::new();
    let mut current: Option<&'static str> = None;

    for token in input.split_whitespace() {
        let bare: String = token.chars().filter(|&c| c != ':').collect();
        if let Some(&keyword) = KEYWORDS.iter().find(|&&keyword| keyword == bare) {
            current = Some(keyword);
            values.entry(keyword).or_default();
        } else if let Some(value) = current.and_then(|keyword| values.get_mut(keyword)) {
            value.push_str(token);
        }
        // tokens before the first keyword carry no meaning and are dropped
    }

    let mode = match values.get("mode").map(String::as_str) {
        Some("warc") => Mode::FilterRecords,
        Some("cdx") => Mode::ExtractFromIndex,
        Some("createCDX") => Mode::BuildIndex,
        other => return Err(CommandError::UnknownMode(other.unwrap_or("").to_owned())),
    };

    let sources: Vec<PathBuf> = list_values(values.get("src"))
        .into_iter()
        .map(PathBuf::from)
        .collect();
    if sources.is_empty() {
        return Err(CommandError::MissingArgument("src"));
    }
    let dest = values
        .get("dest")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .ok_or(CommandError::MissingArgument("dest"))?;

    let url = non_empty(list_values(values.get("url")));
    let file_type = non_empty(list_values(values.get("fileType")));
    let date = values
        .get("date")
        .filter(|value| !value.is_empty())
        .map(|value| {
            let parts: Vec<String> = value.split('-').map(str::to_owned).collect();
            if parts.len() > 1 {
                DateSelector::Range {
                    from: parts[0].clone(),
                    until: parts[1].clone(),
                }
            } else {
                DateSelector::Values(parts)
            }
        });

    let record_limit = match values.get("recordLimit").filter(|value| !value.is_empty()) {
        None => usize::MAX,
        Some(value) => value
            .parse()
            .map_err(|_| CommandError::BadRecordLimit(value.clone()))?,
    };

    let compress_output = values.get("compressed").map(String::as_str) == Some("true")
        || dest.extension().map(|ext| ext == "gz").unwrap_or(false);

    let index_format = match values.get("type").map(String::as_str) {
        None | Some("cdx") => IndexFormat::Cdx,
        Some("cdxj") => IndexFormat::Cdxj,
        Some(other) => return Err(CommandError::BadIndexType(other.to_owned())),
    };

    Ok(Request {
        sources,
        dest,
        mode,
        criteria: Criteria {
            url,
            file_type,
            date,
        },
        record_limit,
        compress_output,
        index_format,
    })
}

fn list_values(value: Option<&String>) -> Vec<String> {
    value
        .map(|value| {
            value
                .split(',')
                .filter(|part| !part.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn full_command_parses() {
        let request = parse(
            "src: a.warc.gz,b.warc.gz dest: out.warc mode: warc \
             url: google.com,bing.com fileType: .html date: 2018-2019 recordLimit: 100",
        )
        .unwrap();

        assert_eq!(request.sources.len(), 2);
        assert_eq!(request.dest, PathBuf::from("out.warc"));
        assert_eq!(request.mode, Mode::FilterRecords);
        assert_eq!(
            request.criteria.url,
            Some(vec!["google.com".to_owned(), "bing.com".to_owned()])
        );
        assert_eq!(request.criteria.file_type, Some(vec![".html".to_owned()]));
        assert_eq!(
            request.criteria.date,
            Some(DateSelector::Range {
                from: "2018".to_owned(),
                until: "2019".to_owned(),
            })
        );
        assert_eq!(request.record_limit, 100);
        assert!(!request.compress_output);
    }

    #[test]
    fn single_date_value_is_a_fragment_match() {
        let request = parse("src: a.cdx dest: out.warc mode: cdx date: 20180615").unwrap();
        assert_eq!(
            request.criteria.date,
            Some(DateSelector::Values(vec!["20180615".to_owned()]))
        );
    }

    #[test]
    fn gz_destination_requests_compressed_output() {
        let request = parse("src: a.warc dest: out.warc.gz mode: warc").unwrap();
        assert!(request.compress_output);

        let request = parse("src: a.warc dest: out.warc mode: warc compressed: true").unwrap();
        assert!(request.compress_output);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = parse("src: a.warc dest: out.warc mode: nonsense").unwrap_err();
        assert_eq!(err, CommandError::UnknownMode("nonsense".to_owned()));

        let err = parse("src: a.warc dest: out.warc").unwrap_err();
        assert_eq!(err, CommandError::UnknownMode(String::new()));
    }

    #[test]
    fn missing_paths_are_rejected() {
        assert_eq!(
            parse("dest: out.warc mode: warc").unwrap_err(),
            CommandError::MissingArgument("src")
        );
        assert_eq!(
            parse("src: a.warc mode: warc").unwrap_err(),
            CommandError::MissingArgument("dest")
        );
    }

    #[test]
    fn cdxj_type_selects_the_json_rows() {
        let request = parse("src: a.warc dest: out.cdxj mode: createCDX type: cdxj").unwrap();
        assert_eq!(request.index_format, IndexFormat::Cdxj);

        let err = parse("src: a.warc dest: out.cdx mode: createCDX type: tsv").unwrap_err();
        assert_eq!(err, CommandError::BadIndexType("tsv".to_owned()));
    }
}
