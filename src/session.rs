//! The inbound half of a status ping, independent of any socket.
//!
//! A [`Session`] is fed every chunk read from the connection, in order. It
//! decodes the frame header from the first bytes, then counts down the bytes
//! still owed until the frame is complete, at which point the status JSON is
//! handed back.

use tracing::trace;

use crate::{Error, packet::PacketReader, packet::STATUS_PACKET_ID, varint};

/// Default cap on the number of chunks a status frame may span.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingFirstFrame,
    Accumulating { bytes_left: i64 },
}

#[derive(Debug)]
pub struct Session {
    reader: PacketReader,
    state: State,
    iterations: usize,
    max_iterations: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

impl Session {
    #[must_use]
    pub const fn new(max_iterations: usize) -> Self {
        Self {
            reader: PacketReader::new(),
            state: State::AwaitingFirstFrame,
            iterations: 0,
            max_iterations,
        }
    }

    /// Chunks fed so far.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Bytes still owed before the frame is complete, once the header is known.
    #[must_use]
    pub const fn bytes_left(&self) -> Option<i64> {
        match self.state {
            State::AwaitingFirstFrame => None,
            State::Accumulating { bytes_left } => Some(bytes_left),
        }
    }

    /// Feeds one chunk read from the connection.
    ///
    /// Returns the status JSON once the frame is complete, `None` while more
    /// data is needed.
    ///
    /// # Errors
    /// - [`Error::ProtocolMismatch`] if the frame is not a status response
    /// - [`Error::InvalidFrameLength`] if the declared length is not positive
    /// - [`Error::FrameOverrun`] if more bytes arrive than the frame declared
    /// - [`Error::FrameOverflow`] if the frame is still incomplete after
    ///   `max_iterations` chunks
    /// - [`Error::MalformedVarint`] and [`Error::MalformedString`] for
    ///   undecodable contents
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<String>, Error> {
        self.iterations += 1;
        self.reader.append(chunk);

        let bytes_left = match self.state {
            State::AwaitingFirstFrame => match self.read_header()? {
                // The whole buffer so far counts towards the frame, this chunk included.
                Some(frame_size) => frame_size - as_i64(self.reader.len()),
                None => return self.check_iterations().map(|()| None),
            },
            State::Accumulating { bytes_left } => bytes_left - as_i64(chunk.len()),
        };
        self.state = State::Accumulating { bytes_left };
        trace!(iterations = self.iterations, bytes_left, "received status chunk");

        if bytes_left == 0 {
            let json = self.reader.read_string()?;
            if self.reader.remaining() != 0 {
                return Err(Error::MalformedString);
            }
            return Ok(Some(json));
        }
        if bytes_left < 0 {
            return Err(Error::FrameOverrun {
                overrun: bytes_left.unsigned_abs(),
            });
        }
        self.check_iterations().map(|()| None)
    }

    /// Decodes the frame length and packet id, returning the full frame size
    /// including the length prefix.
    fn read_header(&mut self) -> Result<Option<i64>, Error> {
        let Some(length) = self.reader.read_varint()? else {
            return Ok(None);
        };
        let Some(packet_id) = self.reader.read_varint()? else {
            // The length is decoded again once the id arrives.
            self.reader.rewind();
            return Ok(None);
        };
        if packet_id != STATUS_PACKET_ID {
            return Err(Error::ProtocolMismatch {
                expected: STATUS_PACKET_ID,
                received: packet_id,
            });
        }
        if length <= 0 {
            return Err(Error::InvalidFrameLength(length));
        }
        Ok(Some(i64::from(length) + as_i64(varint::size_of(length))))
    }

    fn check_iterations(&self) -> Result<(), Error> {
        if self.iterations >= self.max_iterations {
            return Err(Error::FrameOverflow {
                iterations: self.iterations,
            });
        }
        Ok(())
    }
}

fn as_i64(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ServerStatus, packet::PacketBuilder};

    const STATUS: &str = r#"{"version":{"name":"1.20.4","protocol":765},"players":{"max":100,"online":3,"sample":[]},"description":"A server","favicon":"data:image/png;base64,iVBORw0KGgo="}"#;

    fn response_frame(json: &str) -> Vec<u8> {
        PacketBuilder::new()
            .write_varint(0x00)
            .write_string(json)
            .into_frame()
    }

    fn feed_all(session: &mut Session, chunks: &[&[u8]]) -> Result<Option<String>, Error> {
        let mut out = None;
        for chunk in chunks {
            out = session.feed(chunk)?;
        }
        Ok(out)
    }

    fn split(frame: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
        let mut pieces = Vec::new();
        let mut start = 0;
        for &cut in cuts {
            pieces.push(frame[start..cut].to_vec());
            start = cut;
        }
        pieces.push(frame[start..].to_vec());
        pieces
    }

    fn status_from(chunks: &[Vec<u8>], max_iterations: usize) -> ServerStatus {
        let mut session = Session::new(max_iterations);
        let refs: Vec<&[u8]> = chunks.iter().map(Vec::as_slice).collect();
        let json = feed_all(&mut session, &refs).unwrap().unwrap();
        ServerStatus::from_json_at(&json, 0).unwrap()
    }

    #[test]
    fn test_single_chunk() {
        let frame = response_frame(STATUS);
        let mut session = Session::default();
        let json = session.feed(&frame).unwrap().unwrap();
        assert_eq!(json, STATUS);
        assert_eq!(session.iterations(), 1);
        assert_eq!(session.bytes_left(), Some(0));
    }

    #[test]
    fn test_fragmented_reassembly() {
        let frame = response_frame(STATUS);
        let whole = status_from(&[frame.clone()], 8);
        let halves = status_from(&split(&frame, &[frame.len() / 2]), 8);
        let sevenths = status_from(&split(&frame, &[1, 2, 3, 20, 50, 51]), 8);
        assert_eq!(whole, halves);
        assert_eq!(whole, sevenths);
        assert_eq!(whole.description.text(), "A server");
    }

    #[test]
    fn test_header_split_inside_varint() {
        let json = "x".repeat(300);
        let frame = response_frame(&json);
        // Length varint is two bytes long; cut between them.
        let pieces = split(&frame, &[1, 2, 3]);
        let mut session = Session::default();
        assert_eq!(session.feed(&pieces[0]).unwrap(), None);
        assert_eq!(session.bytes_left(), None);
        assert_eq!(session.feed(&pieces[1]).unwrap(), None);
        assert_eq!(session.bytes_left(), None);
        assert_eq!(session.feed(&pieces[2]).unwrap(), None);
        assert_eq!(
            session.bytes_left(),
            Some(i64::try_from(frame.len() - 3).unwrap())
        );
        assert_eq!(session.feed(&pieces[3]).unwrap(), Some(json));
    }

    #[test]
    fn test_wrong_packet_id() {
        let frame = PacketBuilder::new()
            .write_varint(0x01)
            .write_string("{}")
            .into_frame();
        let mut session = Session::default();
        assert!(matches!(
            session.feed(&frame),
            Err(Error::ProtocolMismatch {
                expected: 0,
                received: 1
            })
        ));
    }

    #[test]
    fn test_never_completes() {
        let frame = response_frame(&"y".repeat(1000));
        let mut session = Session::default();
        for chunk in frame[..40].chunks(10) {
            assert_eq!(session.feed(chunk).unwrap(), None);
        }
        assert!(matches!(
            session.feed(&frame[40..50]),
            Err(Error::FrameOverflow { iterations: 5 })
        ));
    }

    #[test]
    fn test_default_cap_allows_five_chunks() {
        let frame = response_frame(STATUS);
        let pieces = split(&frame, &[5, 10, 15, 20]);
        assert_eq!(pieces.len(), 5);
        let status = status_from(&pieces, DEFAULT_MAX_ITERATIONS);
        assert_eq!(status.players.online, 3);
    }

    #[test]
    fn test_overrun() {
        let mut frame = response_frame(STATUS);
        let mut tail = frame.split_off(10);
        let mut session = Session::default();
        assert_eq!(session.feed(&frame).unwrap(), None);
        tail.extend_from_slice(&[0xAA, 0xBB]);
        assert!(matches!(
            session.feed(&tail),
            Err(Error::FrameOverrun { overrun: 2 })
        ));
    }

    #[test]
    fn test_overrun_in_first_chunk() {
        let mut frame = response_frame(STATUS);
        frame.push(0x00);
        let mut session = Session::default();
        assert!(matches!(
            session.feed(&frame),
            Err(Error::FrameOverrun { overrun: 1 })
        ));
    }

    #[test]
    fn test_zero_length_frame() {
        let mut session = Session::default();
        assert!(matches!(
            session.feed(&[0x00, 0x00]),
            Err(Error::InvalidFrameLength(0))
        ));
    }

    #[test]
    fn test_string_shorter_than_frame() {
        // Frame claims 4 bytes of body, string prefix claims only 1.
        let mut session = Session::default();
        assert!(matches!(
            session.feed(&[0x04, 0x00, 0x01, b'a', b'b']),
            Err(Error::MalformedString)
        ));
    }

    #[test]
    fn test_malformed_length_varint() {
        let mut session = Session::default();
        assert!(matches!(
            session.feed(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]),
            Err(Error::MalformedVarint)
        ));
    }
}
