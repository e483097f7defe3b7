use std::io::Write;

use flate2::write::GzEncoder;

mod build;
mod extract;

/// Render one response record, trailing separator lines included, so that
/// concatenating several yields a well-formed container.
fn sample_record(uri: &str, date: &str, mime: &str, body: &str) -> Vec<u8> {
    let http = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n{}",
        mime,
        body.len(),
        body
    );
    format!(
        "WARC/1.0\r\n\
         WARC-Type: response\r\n\
         WARC-Record-ID: <urn:uuid:b4beb26f-54c4-4277-8e23-51aa9fc4476d>\r\n\
         WARC-Target-URI: {}\r\n\
         WARC-Date: {}\r\n\
         Content-Type: application/http;msgtype=response\r\n\
         Content-Length: {}\r\n\
         \r\n\
         {}\r\n\
         \r\n",
        uri,
        date,
        http.len(),
        http
    )
    .into_bytes()
}

/// A two-record container used across the test modules.
fn sample_container() -> Vec<u8> {
    let mut data = sample_record(
        "http://example.com/index.html",
        "2018-06-15T12:00:00Z",
        "text/html",
        "<html>hello</html>",
    );
    data.extend(sample_record(
        "http://archive.example.org/logo.png",
        "2019-02-01T08:30:00Z",
        "image/png",
        "not really a png",
    ));
    data
}

/// Compress `bytes` as one self-contained gzip member.
fn gzip_member(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}
