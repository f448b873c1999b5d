//! Line transport abstraction.
//!
//! The byte-level serial port is a collaborator: whatever sits behind it
//! (a device node, a TCP stream, a recorded log) is assumed to deliver
//! newline-terminated ASCII lines. Port opening and baud configuration
//! belong to that collaborator; this module only pulls lines out of it.

use std::io::{self, BufRead, BufReader, Read};

/// A source of newline-terminated sentences.
///
/// `Ok(None)` is a timed-out or empty poll: nothing arrived within the
/// transport's read timeout, and the caller gets a chance to observe its
/// stop flag before blocking again. End of stream is reported as an
/// [`io::ErrorKind::UnexpectedEof`] error.
pub trait LineSource {
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// Adapts any byte stream into a [`LineSource`].
///
/// Read timeouts configured on the underlying handle (serial port, TCP
/// socket) surface here as `TimedOut`/`WouldBlock` and are mapped to
/// `Ok(None)`; a line cut in half by a timeout is kept and completed on
/// the next poll. Bytes that are not valid UTF-8 are replaced rather
/// than rejected, matching how receivers occasionally garble a line.
pub struct LineReader<R: Read> {
    inner: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            pending: Vec::new(),
        }
    }
}

impl<R: Read> LineSource for LineReader<R> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        match self.inner.read_until(b'\n', &mut self.pending) {
            Ok(0) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "line source closed",
            )),
            Ok(_) => {
                let line = String::from_utf8_lossy(&self.pending).trim().to_string();
                self.pending.clear();
                Ok(Some(line))
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                // Whatever arrived before the timeout stays in `pending`
                // and the line is completed on a later poll.
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;

    /// Plays back a scripted sequence of read results.
    struct Scripted {
        chunks: VecDeque<io::Result<Vec<u8>>>,
    }

    impl Scripted {
        fn new(chunks: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                chunks: chunks.into(),
            }
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop_front() {
                None => Ok(0),
                Some(Ok(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(e)) => Err(e),
            }
        }
    }

    fn timed_out() -> io::Error {
        io::Error::new(io::ErrorKind::TimedOut, "read timed out")
    }

    #[test]
    fn yields_lines_in_order() {
        let mut source = LineReader::new(Cursor::new("first\r\nsecond\nthird"));
        assert_eq!(source.read_line().unwrap(), Some("first".to_string()));
        assert_eq!(source.read_line().unwrap(), Some("second".to_string()));
        // Final line has no terminator but still comes through.
        assert_eq!(source.read_line().unwrap(), Some("third".to_string()));
        let err = source.read_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn timeout_maps_to_empty_poll() {
        let mut source = LineReader::new(Scripted::new(vec![Err(timed_out())]));
        assert_eq!(source.read_line().unwrap(), None);
    }

    #[test]
    fn partial_line_survives_a_timeout() {
        let mut source = LineReader::new(Scripted::new(vec![
            Ok(b"$GPGGA,12".to_vec()),
            Err(timed_out()),
            Ok(b"34\n".to_vec()),
        ]));
        assert_eq!(source.read_line().unwrap(), None);
        assert_eq!(source.read_line().unwrap(), Some("$GPGGA,1234".to_string()));
    }

    #[test]
    fn garbled_bytes_are_replaced_not_fatal() {
        let mut source = LineReader::new(Cursor::new(b"\xff$GPGGA,ok\n".to_vec()));
        let line = source.read_line().unwrap().unwrap();
        assert!(line.ends_with("$GPGGA,ok"));
    }
}
