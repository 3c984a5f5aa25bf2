//! HTTP/1.0 request and response handling over a [`Transport`]
//!
//! The engine writes the request in one go, reads the status prefix as a
//! single chunk and then fills a fixed-capacity buffer until the peer closes
//! or the buffer runs out. It is generic over `Read`/`Write` so it does not
//! care whether TLS sits underneath.

pub mod buffer;
pub mod connector;
pub mod tls;
pub mod transport;

pub use buffer::ResponseBuffer;
pub use connector::{connect, ConnectOptions, Connection};
pub use transport::{establish, ConnectionState, Established, Transport, TransportSetup};

use crate::{
    defaults::{STATUS_CODE_OFFSET, STATUS_PROBE_LEN},
    error::{AppError, Result},
    target::Target,
};
use std::io::{ErrorKind, Read, Write};

const EXPECTED_STATUS: &[u8] = b"200";

/// Request bytes for `target`
pub fn build_request(target: &Target, user_agent: &str) -> String {
    format!(
        "GET {} HTTP/1.0\r\nHost: {}\r\nUser-Agent: {}\r\nConnection: close\r\n\r\n",
        target.path, target.host, user_agent
    )
}

/// Write the request with a single write call. A short write is accepted as
/// is; returns the number of bytes the transport took.
pub fn send_request<W: Write>(writer: &mut W, request: &[u8]) -> Result<usize> {
    let written = writer
        .write(request)
        .map_err(|e| AppError::write(format!("Can't send request: {}", e)))?;
    if written == 0 && !request.is_empty() {
        return Err(AppError::write("Can't send request: connection accepted no bytes"));
    }
    writer
        .flush()
        .map_err(|e| AppError::write(format!("Can't send request: {}", e)))?;
    Ok(written)
}

/// One read of at most the status prefix (`HTTP/1.x 200`). Accepts only a
/// full prefix whose status code is 200.
pub fn read_status<R: Read>(reader: &mut R, buffer: &mut ResponseBuffer) -> Result<usize> {
    let read = match reader.read(buffer.spare_up_to(STATUS_PROBE_LEN)) {
        Ok(0) => return Err(AppError::empty_response("Connection closed before any data arrived")),
        Ok(n) => n,
        Err(e) => return Err(AppError::empty_response(format!("Can't read response: {}", e))),
    };
    buffer.advance(read);

    let head = buffer.as_bytes();
    if read < STATUS_PROBE_LEN || &head[STATUS_CODE_OFFSET..STATUS_PROBE_LEN] != EXPECTED_STATUS {
        return Err(AppError::status(format!(
            "'{}'",
            String::from_utf8_lossy(head).trim_end()
        )));
    }
    Ok(read)
}

/// How the body read ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyOutcome {
    /// Bytes read by this phase, status prefix not included
    pub bytes_read: usize,
    /// Buffer reached capacity. Set even when the peer would have closed
    /// right after the last byte, since nothing further is read to tell.
    pub truncated: bool,
}

/// Fill the rest of the buffer. End of stream, a read error, or a full
/// buffer all end the phase; none of them is fatal.
pub fn read_body<R: Read>(reader: &mut R, buffer: &mut ResponseBuffer) -> BodyOutcome {
    let start = buffer.len();
    let mut truncated = false;

    loop {
        if buffer.is_full() {
            truncated = true;
            break;
        }
        match reader.read(buffer.spare_mut()) {
            Ok(0) => break,
            Ok(n) => buffer.advance(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            // Peers often drop TLS without close_notify; treat as end of stream.
            Err(_) => break,
        }
    }

    BodyOutcome {
        bytes_read: buffer.len() - start,
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn target(url: &str) -> Target {
        Target::parse(url).unwrap()
    }

    #[test]
    fn test_request_bytes_exact() {
        let request = build_request(&target("http://example.com/a?b=1"), "curl/7.29.0");
        assert_eq!(
            request,
            "GET /a?b=1 HTTP/1.0\r\nHost: example.com\r\nUser-Agent: curl/7.29.0\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn test_request_default_path() {
        let request = build_request(&target("https://example.com"), "probe");
        assert!(request.starts_with("GET / HTTP/1.0\r\n"));
    }

    #[test]
    fn test_send_request_single_write() {
        let mut sink = Vec::new();
        let written = send_request(&mut sink, b"GET / HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(written, 18);
        assert_eq!(sink, b"GET / HTTP/1.0\r\n\r\n");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::BrokenPipe, "broken pipe"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_send_request_failure_is_write_error() {
        let err = send_request(&mut BrokenPipe, b"GET").unwrap_err();
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_status_200_accepted() {
        let mut reader = Cursor::new(b"HTTP/1.0 200 OK\r\n\r\nhello".to_vec());
        let mut buffer = ResponseBuffer::with_capacity(1024);
        assert_eq!(read_status(&mut reader, &mut buffer).unwrap(), 12);
        assert_eq!(buffer.as_bytes(), b"HTTP/1.0 200");
    }

    #[test]
    fn test_status_other_than_200_rejected() {
        let mut reader = Cursor::new(b"HTTP/1.1 500 Internal Server Error\r\n\r\n".to_vec());
        let mut buffer = ResponseBuffer::with_capacity(1024);
        let err = read_status(&mut reader, &mut buffer).unwrap_err();
        assert_eq!(err.exit_code(), 7);
        assert!(err.to_string().contains("HTTP/1.1 500"));
    }

    #[test]
    fn test_short_first_read_rejected() {
        let mut reader = Cursor::new(b"HTTP/1.0 20".to_vec());
        let mut buffer = ResponseBuffer::with_capacity(1024);
        let err = read_status(&mut reader, &mut buffer).unwrap_err();
        assert_eq!(err.category(), "STATUS");
    }

    #[test]
    fn test_empty_response() {
        let mut reader = Cursor::new(Vec::new());
        let mut buffer = ResponseBuffer::with_capacity(1024);
        let err = read_status(&mut reader, &mut buffer).unwrap_err();
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn test_body_reads_to_end_of_stream() {
        let response = b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\nhello".to_vec();
        let total = response.len();
        let mut reader = Cursor::new(response);
        let mut buffer = ResponseBuffer::with_capacity(1024);

        read_status(&mut reader, &mut buffer).unwrap();
        let outcome = read_body(&mut reader, &mut buffer);

        assert!(!outcome.truncated);
        assert_eq!(outcome.bytes_read, total - 12);
        assert_eq!(buffer.len(), total);
        assert!(buffer.as_bytes().ends_with(b"hello"));
    }

    #[test]
    fn test_body_stops_at_capacity() {
        // Endless stream: only the buffer limit can end the read.
        let mut reader = io::repeat(b'x');
        let mut buffer = ResponseBuffer::with_capacity(4096);
        let outcome = read_body(&mut reader, &mut buffer);

        assert!(outcome.truncated);
        assert_eq!(buffer.len(), 4096);
    }

    #[test]
    fn test_response_of_exactly_capacity_counts_as_truncated() {
        let response = b"HTTP/1.0 200 OK\r\n\r\n0123456789".to_vec();
        let capacity = response.len();
        let mut reader = Cursor::new(response);
        let mut buffer = ResponseBuffer::with_capacity(capacity);

        read_status(&mut reader, &mut buffer).unwrap();
        let outcome = read_body(&mut reader, &mut buffer);

        assert!(outcome.truncated);
        assert_eq!(buffer.len(), capacity);
        assert!(buffer.as_bytes().ends_with(b"0123456789"));
    }

    struct FailsAfter {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailsAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(ErrorKind::UnexpectedEof, "peer closed connection without sending TLS close_notify")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_read_error_ends_body_without_failing() {
        let mut reader = FailsAfter { data: Cursor::new(b"abcdef".to_vec()) };
        let mut buffer = ResponseBuffer::with_capacity(64);
        let outcome = read_body(&mut reader, &mut buffer);

        assert!(!outcome.truncated);
        assert_eq!(buffer.as_bytes(), b"abcdef");
    }
}
