//! Filtering WARC containers and CDX indexes.
//!
//! This crate wires the `warcscan` building blocks into the three batch
//! operations the tool offers, dispatched per [`Request`]:
//!
//! * filter-container: scan containers and copy through the records matching
//!   the request criteria;
//! * build-index: derive a CDX or CDXJ index from containers;
//! * extract-from-index: filter an index and re-materialize the matching
//!   records out of their source containers by random access.
//!
//! Sources are processed strictly sequentially in the order given, sharing a
//! single remaining-record ceiling, so output order is deterministic and the
//! ceiling means the same thing regardless of how records spread across
//! sources. Failures scoped to one record, entry, or source are reported and
//! skipped; the run carries on with whatever remains.

#[macro_use]
extern crate log;

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;
use warcscan::cdx::{write_entry, write_header};
use warcscan::{
    compression, Criteria, Extractor, IndexBuilder, IndexFormat, IndexParseError, IndexReader,
    RecordScanner,
};

pub mod command;

pub use command::{CommandError, Mode, Request};

/// Summary of one completed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Records or index entries written across all sources.
    pub records_written: usize,
}

/// Failures that end a whole invocation.
///
/// Per-record and per-entry problems never surface here; they are logged and
/// skipped so a batch completes best-effort.
#[derive(Debug, Error)]
pub enum RunError {
    /// Could not prepare or finalize the output file.
    #[error("cannot write output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// An I/O error with no more specific context.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Execute a parsed request.
pub fn run(request: &Request) -> Result<RunSummary, RunError> {
    let started = Instant::now();
    let (work_path, final_path) = output_paths(request);

    // A stale output file from an earlier run must not be appended onto.
    remove_if_exists(&final_path).map_err(|source| RunError::Output {
        path: final_path.clone(),
        source,
    })?;
    remove_if_exists(&work_path).map_err(|source| RunError::Output {
        path: work_path.clone(),
        source,
    })?;

    let file = File::create(&work_path).map_err(|source| RunError::Output {
        path: work_path.clone(),
        source,
    })?;
    let mut out = BufWriter::new(file);

    if request.mode == Mode::BuildIndex {
        write_header(&mut out, request.index_format)?;
    }

    let mut summary = RunSummary::default();
    let mut remaining = request.record_limit;

    for source in &request.sources {
        if remaining == 0 {
            break;
        }
        let written = match request.mode {
            Mode::FilterRecords => {
                filter_container(source, &request.criteria, remaining, &mut out)
            }
            Mode::BuildIndex => build_index(source, remaining, request.index_format, &mut out),
            Mode::ExtractFromIndex => {
                extract_from_index(source, &request.criteria, remaining, &mut out)
            }
        };
        match written {
            Ok(written) => {
                info!(
                    "finished writing {} records from {} to {}",
                    written,
                    source.display(),
                    work_path.display()
                );
                summary.records_written += written;
                remaining -= written;
            }
            Err(e) => error!("skipping source {}: {}", source.display(), e),
        }
    }

    out.flush()?;
    drop(out);

    if request.compress_output {
        compress_in_place(&work_path, &final_path)?;
    }

    info!(
        "{:.6} seconds were needed for the {} run",
        started.elapsed().as_secs_f64(),
        request.mode.keyword()
    );
    Ok(summary)
}

/// Scan one container, copying through the records accepted by the criteria.
fn filter_container(
    source: &Path,
    criteria: &Criteria,
    limit: usize,
    out: &mut impl Write,
) -> io::Result<usize> {
    let input = compression::open_container(source)?;
    let mut written = 0;

    for record in RecordScanner::new(input) {
        let record = record?;
        if !criteria.accepts_record(&record) {
            continue;
        }
        out.write_all(&record.header)?;
        out.write_all(&record.content)?;
        written += 1;
        if written == limit {
            break;
        }
    }
    Ok(written)
}

/// Derive index rows from one container.
fn build_index(
    source: &Path,
    limit: usize,
    format: IndexFormat,
    out: &mut impl Write,
) -> io::Result<usize> {
    let data = fs::read(source)?;
    let filename = source
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or_default();

    let mut written = 0;
    for entry in IndexBuilder::new(filename).build(&data)? {
        write_entry(out, &entry, format)?;
        written += 1;
        if written == limit {
            break;
        }
    }
    Ok(written)
}

/// Filter one index and re-materialize the matching records from their
/// source containers.
fn extract_from_index(
    source: &Path,
    criteria: &Criteria,
    limit: usize,
    out: &mut impl Write,
) -> io::Result<usize> {
    let input = compression::open_container(source)?;
    let extractor = Extractor::new(source);
    let mut matched = 0;

    for entry in IndexReader::new(input) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e @ IndexParseError::FieldCountMismatch { .. }) => {
                warn!("skipping malformed line in {}: {}", source.display(), e);
                continue;
            }
            Err(IndexParseError::Io(e)) => return Err(e),
        };
        if !criteria.accepts_entry(&entry) {
            continue;
        }
        matched += 1;
        if let Err(e) = extractor.append_record(&entry, out) {
            error!("skipping entry from {}: {}", source.display(), e);
        }
        if matched == limit {
            break;
        }
    }
    Ok(matched)
}

/// The uncompressed working path and the final destination path for a
/// request.
///
/// When compressed output is requested the run writes uncompressed rows or
/// records to the working path first, then a final gzip pass produces the
/// destination and removes the intermediate.
fn output_paths(request: &Request) -> (PathBuf, PathBuf) {
    if !request.compress_output {
        return (request.dest.clone(), request.dest.clone());
    }
    if request.dest.extension() == Some(OsStr::new("gz")) {
        (request.dest.with_extension(""), request.dest.clone())
    } else {
        let mut compressed = request.dest.clone().into_os_string();
        compressed.push(".gz");
        (request.dest.clone(), PathBuf::from(compressed))
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Gzip the finished working file into the final path and remove the
/// uncompressed intermediate.
fn compress_in_place(work_path: &Path, final_path: &Path) -> Result<(), RunError> {
    let compress = || -> io::Result<()> {
        let mut input = File::open(work_path)?;
        let mut encoder = flate2::write::GzEncoder::new(
            BufWriter::new(File::create(final_path)?),
            flate2::Compression::default(),
        );
        let mut buf = [0u8; 64 << 10];
        loop {
            let n = input.read(&mut buf)?;
            if n == 0 {
                break;
            }
            encoder.write_all(&buf[..n])?;
        }
        encoder.finish()?.flush()?;
        Ok(())
    };
    compress().map_err(|source| RunError::Output {
        path: final_path.to_path_buf(),
        source,
    })?;
    remove_if_exists(work_path).map_err(|source| RunError::Output {
        path: work_path.to_path_buf(),
        source,
    })
}
