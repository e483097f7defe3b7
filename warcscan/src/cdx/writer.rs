//! Index row serialization.
//!
//! Entries serialize in either of two interchangeable forms: fixed
//! eleven-column space-delimited rows under a legend-letter header, or
//! two leading fields followed by an embedded JSON value (the CDXJ style).
//! Both carry the same entry data.

use std::io::{self, Write};

use serde_json::json;

use super::{Entry, Field, CDX11_FIELDS};

/// The legend header declared at the start of an eleven-column index file.
pub const CDX11_HEADER: &str = " CDX N b a m s k r M S V g";

/// Placeholder token written for fields with no value.
const EMPTY_FIELD: &str = "-";

/// The serialization formats for index rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    /// Eleven space-delimited columns under a legend-letter header.
    Cdx,
    /// Searchable URL and timestamp followed by a JSON value.
    Cdxj,
}

/// Write the file-leading header for the chosen format, if it has one.
pub fn write_header<W: Write>(out: &mut W, format: IndexFormat) -> io::Result<()> {
    if format == IndexFormat::Cdx {
        writeln!(out, "{}", CDX11_HEADER)?;
    }
    Ok(())
}

/// Serialize one entry in the chosen format.
pub fn write_entry<W: Write>(out: &mut W, entry: &Entry, format: IndexFormat) -> io::Result<()> {
    match format {
        IndexFormat::Cdx => write_cdx11(out, entry),
        IndexFormat::Cdxj => write_cdxj(out, entry),
    }
}

fn field_value(entry: &Entry, field: Field) -> &str {
    match entry.get(field.name()) {
        Some(value) if !value.is_empty() => value,
        _ => EMPTY_FIELD,
    }
}

/// Serialize one entry as an eleven-column row in [`CDX11_HEADER`] order.
fn write_cdx11<W: Write>(out: &mut W, entry: &Entry) -> io::Result<()> {
    let mut row = String::new();
    for field in CDX11_FIELDS.iter() {
        if !row.is_empty() {
            row.push(' ');
        }
        row.push_str(field_value(entry, *field));
    }
    writeln!(out, "{}", row)
}

/// Serialize one entry as a two-field row with an embedded JSON value.
fn write_cdxj<W: Write>(out: &mut W, entry: &Entry) -> io::Result<()> {
    let block = json!({
        "url": field_value(entry, Field::Url),
        "mime": field_value(entry, Field::MimeType),
        "status": field_value(entry, Field::ResponseCode),
        "digest": field_value(entry, Field::Digest),
        "length": field_value(entry, Field::Length),
        "offset": field_value(entry, Field::CompressedFileOffset),
        "filename": field_value(entry, Field::Filename),
    });
    writeln!(
        out,
        "{} {} {}",
        field_value(entry, Field::SearchableUrl),
        field_value(entry, Field::Date),
        block
    )
}
