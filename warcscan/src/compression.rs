//! Container compression handling.
//!
//! A compressed container is the concatenation of one gzip member per record.
//! Offsets recorded in an index point at member starts, so a single record
//! can be recovered without decompressing any preceding records. Whole-file
//! sequential reads instead decode all members in order.

use std::fs::File;
use std::io::{BufRead, BufReader, Result as IoResult, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

/// Leading magic bytes of a gzip member.
pub(crate) const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// The supported methods of compressing a container.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Compression {
    /// Uncompressed data.
    None,
    /// `gzip` compression, one member per record.
    Gzip,
}

impl Compression {
    /// Return the best guess of compression used for a file with the given
    /// name.
    ///
    /// A file that may be present is not accessed in any way; only the path
    /// is used to guess based on the name.
    ///
    /// ```
    /// # use warcscan::Compression;
    /// assert_eq!(Compression::guess_for_filename("test.warc.gz"), Compression::Gzip);
    /// ```
    pub fn guess_for_filename<P: AsRef<Path>>(path: P) -> Compression {
        match path.as_ref().extension() {
            Some(ext) if ext == "gz" => Compression::Gzip,
            _ => Compression::None,
        }
    }
}

/// Open a container file for sequential reading, decoding all gzip members
/// in order when the file name indicates compression.
pub fn open_container<P: AsRef<Path>>(path: P) -> IoResult<Box<dyn BufRead>> {
    let file = BufReader::new(File::open(path.as_ref())?);
    Ok(match Compression::guess_for_filename(path) {
        Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        Compression::None => Box::new(file),
    })
}

/// Writes to an output stream with the specified [`Compression`].
pub enum Writer<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> Writer<W> {
    /// Construct a writer to the given adapter with the given compression
    /// mode.
    pub fn new(dest: W, mode: Compression) -> Self {
        match mode {
            Compression::None => Writer::Plain(dest),
            Compression::Gzip => Writer::Gzip(GzEncoder::new(dest, flate2::Compression::best())),
        }
    }

    /// Gracefully close the writer (terminating a compressed stream) and
    /// return the output stream.
    pub fn finish(self) -> IoResult<W> {
        match self {
            Writer::Plain(w) => Ok(w),
            Writer::Gzip(gz) => gz.finish(),
        }
    }
}

impl<W: Write> Write for Writer<W> {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        match self {
            Writer::Plain(w) => w.write(buf),
            Writer::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> IoResult<()> {
        match self {
            Writer::Plain(w) => w.flush(),
            Writer::Gzip(w) => w.flush(),
        }
    }
}
