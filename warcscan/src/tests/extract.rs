use std::fs;
use std::io::Read;

use flate2::bufread::GzDecoder;
use pretty_assertions::assert_eq;

use super::{gzip_member, sample_record};
use crate::builder::IndexBuilder;
use crate::cdx::{write_entry, write_header, Field, IndexFormat, IndexReader, CDX11_HEADER};
use crate::extract::{ExtractError, Extractor};

#[test]
fn indexed_records_extract_byte_identically() {
    let dir = tempfile::tempdir().unwrap();
    let records = [
        sample_record(
            "http://example.com/index.html",
            "2018-06-15T12:00:00Z",
            "text/html",
            "<html>hello</html>",
        ),
        sample_record(
            "http://archive.example.org/logo.png",
            "2019-02-01T08:30:00Z",
            "image/png",
            "not really a png",
        ),
    ];
    let mut container = Vec::new();
    for record in &records {
        container.extend(gzip_member(record));
    }
    let container_path = dir.path().join("site.warc.gz");
    fs::write(&container_path, &container).unwrap();

    let entries = IndexBuilder::new("site.warc.gz").build(&container).unwrap();
    let index_path = dir.path().join("site.cdx");
    let mut index = Vec::new();
    write_header(&mut index, IndexFormat::Cdx).unwrap();
    for entry in &entries {
        write_entry(&mut index, entry, IndexFormat::Cdx).unwrap();
    }
    fs::write(&index_path, &index).unwrap();

    let extractor = Extractor::new(&index_path);
    let mut out = Vec::new();
    let reader = IndexReader::new(fs::read(&index_path).unwrap().as_slice())
        .collect::<Vec<_>>();
    for entry in reader {
        extractor.append_record(&entry.unwrap(), &mut out).unwrap();
    }

    let expected: Vec<u8> = records.iter().flatten().copied().collect();
    assert_eq!(out, expected);
}

#[test]
fn sources_resolve_as_index_siblings() {
    let fields = crate::cdx::parse_header_line(CDX11_HEADER);
    let line = "com,example)/ 20180615120000 http://example.com/ text/html 200 X - - 10 0 other.warc.gz";
    let entry = crate::cdx::parse_entry_line(line, &fields).unwrap();

    let extractor = Extractor::new("/somewhere/indexes/site.cdx");
    let resolved = extractor.resolve_source(&entry).unwrap();
    assert_eq!(
        resolved,
        std::path::Path::new("/somewhere/indexes/other.warc.gz")
    );
}

#[test]
fn missing_sources_skip_without_ending_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let record = sample_record(
        "http://example.com/",
        "2018-06-15T12:00:00Z",
        "text/html",
        "x",
    );
    let container = gzip_member(&record);
    fs::write(dir.path().join("real.warc.gz"), &container).unwrap();

    let mut good = IndexBuilder::new("real.warc.gz").build(&container).unwrap();
    let mut bad = good.clone();
    bad[0].insert(Field::Filename.name(), "gone.warc.gz".to_owned());

    let extractor = Extractor::new(dir.path().join("site.cdx"));
    let mut out = Vec::new();

    match extractor.append_record(&bad[0], &mut out) {
        Err(ExtractError::Source { path, .. }) => {
            assert!(path.ends_with("gone.warc.gz"));
        }
        other => panic!("expected a source error, got {:?}", other),
    }
    assert!(out.is_empty());

    extractor
        .append_record(&good.remove(0), &mut out)
        .unwrap();
    assert_eq!(out, record);
}

#[test]
fn uncompressed_extents_pass_through_raw() {
    let dir = tempfile::tempdir().unwrap();
    let record = sample_record(
        "http://example.com/",
        "2018-06-15T12:00:00Z",
        "text/html",
        "plain",
    );
    let container_path = dir.path().join("site.warc");
    fs::write(&container_path, &record).unwrap();

    let entries = IndexBuilder::new("site.warc").build(&record).unwrap();
    let extractor = Extractor::new(dir.path().join("site.cdx"));
    let mut out = Vec::new();
    extractor.append_record(&entries[0], &mut out).unwrap();
    assert_eq!(out, record);
}

#[test]
fn extracted_members_decode_like_the_source() {
    // The extractor emits decoded bytes; decoding the member directly from
    // the container must agree.
    let record = sample_record(
        "http://example.com/",
        "2018-06-15T12:00:00Z",
        "text/html",
        "agreement",
    );
    let member = gzip_member(&record);
    let mut direct = Vec::new();
    GzDecoder::new(&member[..])
        .read_to_end(&mut direct)
        .unwrap();
    assert_eq!(direct, record);
}
