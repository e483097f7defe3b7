use std::io::Read;

use flate2::bufread::GzDecoder;
use pretty_assertions::assert_eq;

use super::{gzip_member, sample_container, sample_record};
use crate::builder::IndexBuilder;
use crate::cdx::{Entry, Field};

fn field<'e>(entry: &'e Entry, field: Field) -> &'e str {
    entry
        .get(field.name())
        .map(String::as_str)
        .unwrap_or_default()
}

#[test]
fn plain_container_offsets_address_record_extents() {
    let data = sample_container();
    let entries = IndexBuilder::new("site.warc").build(&data).unwrap();
    assert_eq!(entries.len(), 2);

    let mut expected_offset = 0u64;
    for entry in &entries {
        let offset: u64 = field(entry, Field::CompressedFileOffset).parse().unwrap();
        let length: u64 = field(entry, Field::Length).parse().unwrap();
        assert_eq!(offset, expected_offset);
        let extent = &data[offset as usize..(offset + length) as usize];
        assert!(extent.starts_with(b"WARC/1.0\r\n"));
        expected_offset = offset + length;
    }
    assert_eq!(expected_offset, data.len() as u64);
}

#[test]
fn entry_fields_come_from_header_and_http_head() {
    let data = sample_container();
    let entries = IndexBuilder::new("site.warc").build(&data).unwrap();

    let first = &entries[0];
    assert_eq!(field(first, Field::Url), "http://example.com/index.html");
    assert_eq!(field(first, Field::Date), "20180615120000");
    assert_eq!(field(first, Field::MimeType), "text/html");
    assert_eq!(field(first, Field::ResponseCode), "200");
    assert_eq!(field(first, Field::SearchableUrl), "com,example)/index.html");
    assert_eq!(field(first, Field::Filename), "site.warc");
    assert!(!field(first, Field::Digest).is_empty());

    let second = &entries[1];
    assert_eq!(field(second, Field::MimeType), "image/png");
    assert_eq!(
        field(second, Field::SearchableUrl),
        "org,example,archive)/logo.png"
    );
}

#[test]
fn compressed_container_offsets_address_gzip_members() {
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
    let mut data = Vec::new();
    let mut member_offsets = Vec::new();
    for record in &records {
        member_offsets.push(data.len() as u64);
        data.extend(gzip_member(record));
    }

    let entries = IndexBuilder::new("site.warc.gz").build(&data).unwrap();
    assert_eq!(entries.len(), 2);

    for (i, entry) in entries.iter().enumerate() {
        let offset: u64 = field(entry, Field::CompressedFileOffset).parse().unwrap();
        let length: u64 = field(entry, Field::Length).parse().unwrap();
        assert_eq!(offset, member_offsets[i]);

        let extent = &data[offset as usize..(offset + length) as usize];
        let mut unit = Vec::new();
        GzDecoder::new(extent).read_to_end(&mut unit).unwrap();
        assert_eq!(unit, records[i]);
    }
}

#[test]
fn revisit_records_index_as_warc_revisit() {
    let data = b"WARC/1.0\r\n\
        WARC-Type: revisit\r\n\
        WARC-Target-URI: http://example.com/seen-before\r\n\
        WARC-Date: 2018-06-15T12:00:00Z\r\n\
        Content-Length: 0\r\n\
        \r\n";
    let entries = IndexBuilder::new("site.warc").build(data).unwrap();
    assert_eq!(field(&entries[0], Field::MimeType), "warc/revisit");
}

#[test]
fn declared_payload_digest_is_reused() {
    let data = b"WARC/1.0\r\n\
        WARC-Type: response\r\n\
        WARC-Target-URI: http://example.com/\r\n\
        WARC-Date: 2018-06-15T12:00:00Z\r\n\
        WARC-Payload-Digest: sha1:M5SUFL6BCYB4PVLQCXMPCV74BWSMS5ZG\r\n\
        Content-Length: 4\r\n\
        \r\n\
        body";
    let entries = IndexBuilder::new("site.warc").build(data).unwrap();
    assert_eq!(
        field(&entries[0], Field::Digest),
        "M5SUFL6BCYB4PVLQCXMPCV74BWSMS5ZG"
    );
}
