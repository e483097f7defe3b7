use std::str::{self, FromStr};

/// The `WARC/` signature opening every record-start marker line.
const SIGNATURE: &[u8] = b"WARC/";

/// The version of a WARC record, as declared by its `WARC/m.n` start marker.
///
/// Versions 1.0 and 1.1 are well-known, corresponding to ISO 28500 and
/// ISO 28500:2017 respectively, and can be referred to with the associated
/// constants [`WARC1_0`](Self::WARC1_0) and [`WARC1_1`](Self::WARC1_1).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Version {
    /// The integer part of the version number.
    pub major: u32,
    /// The fractional part of the version number.
    pub minor: u32,
}

impl Version {
    /// WARC 1.0, as specified by ISO 28500:2009.
    pub const WARC1_0: Self = Version { major: 1, minor: 0 };
    /// WARC 1.1, as specified by ISO 28500:2017.
    pub const WARC1_1: Self = Version { major: 1, minor: 1 };

    /// Parse a `WARC/m.n` marker at the start of `bytes`, returning the
    /// version and the number of bytes consumed.
    ///
    /// ```
    /// # use warcscan::Version;
    /// assert_eq!(Version::parse(b"WARC/1.0\r\n"), Some((Version::WARC1_0, 8)));
    /// assert_eq!(Version::parse(b"HTTP/1.1 200 OK"), None);
    /// ```
    pub fn parse(bytes: &[u8]) -> Option<(Version, usize)> {
        fn bytes_to_u32(bytes: &[u8]) -> Option<u32> {
            str::from_utf8(bytes).ok().and_then(|s| u32::from_str(s).ok())
        }

        if !bytes.starts_with(SIGNATURE) {
            return None;
        }
        let major_start = SIGNATURE.len();
        let major_end = major_start + bytes[major_start..].iter().position(|&b| b == b'.')?;
        let major = bytes_to_u32(&bytes[major_start..major_end])?;

        let minor_start = major_end + 1;
        let minor_end = bytes[minor_start..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map(|i| i + minor_start)
            .unwrap_or_else(|| bytes.len());
        let minor = bytes_to_u32(&bytes[minor_start..minor_end])?;

        Some((Version { major, minor }, minor_end))
    }

    /// Find a version marker anywhere within a single line.
    ///
    /// Record content is split on newlines by the scanner without regard to
    /// encoding, so a marker is recognized even with leading bytes on the
    /// line.
    pub fn find_in_line(line: &[u8]) -> Option<Version> {
        let start = line
            .windows(SIGNATURE.len())
            .position(|window| window == SIGNATURE)?;
        Self::parse(&line[start..]).map(|(version, _)| version)
    }
}

/// Construct a Version with parts from a tuple of integers.
impl From<(u32, u32)> for Version {
    fn from((major, minor): (u32, u32)) -> Self {
        Version { major, minor }
    }
}
