//! The process-wide mapping from single-letter CDX field codes to semantic
//! field names.
//!
//! Field codes follow the IIPC CDX specification:
//! <https://iipc.github.io/warc-specifications/specifications/cdx-format/cdx-2015/>

use phf::phf_map;

static LEGEND: phf::Map<char, &'static str> = phf_map! {
    'A' => "canonized url",
    'B' => "news group",
    'C' => "rulespace category",
    'D' => "compressed dat file offset",
    'F' => "canonized frame",
    'G' => "multi-column language description",
    'H' => "canonized host",
    'I' => "canonized image",
    'J' => "canonized jump point",
    'K' => "FBIS what's changed",
    'L' => "canonized link",
    'M' => "meta tags",
    'N' => "massaged url",
    'P' => "canonized path",
    'Q' => "language string",
    'R' => "canonized redirect",
    'S' => "compressed record size",
    'U' => "uniqueness",
    'V' => "compressed arc/warc file offset",
    'X' => "canonized url in other href tags",
    'Y' => "canonized url in other src tags",
    'Z' => "canonized url found in script",
    'a' => "original url",
    'b' => "date",
    'c' => "old style checksum",
    'd' => "uncompressed dat file offset",
    'e' => "IP",
    'f' => "frame",
    'g' => "file name",
    'h' => "original host",
    'i' => "image",
    'j' => "original jump point",
    'k' => "new style checksum",
    'l' => "link",
    'm' => "mime type of original document",
    'n' => "arc document length",
    'o' => "port",
    'p' => "original path",
    'r' => "redirect",
    's' => "response code",
    't' => "title",
    'v' => "uncompressed arc file offset",
    'x' => "url in other href tags",
    'y' => "url in other src tags",
    'z' => "url found in script",
    '#' => "comment",
};

/// Resolve a single-letter field code to its semantic field name.
///
/// The legend is immutable process-wide state, identical for index readers
/// and writers.
pub fn lookup(code: char) -> Option<&'static str> {
    LEGEND.get(&code).copied()
}
