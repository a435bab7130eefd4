//! Building outbound frames and reading inbound ones.
//! [Server List Ping](https://wiki.vg/Server_List_Ping)

use crate::{Error, varint};

/// Packet id shared by the handshake, the status request and the status response.
pub const STATUS_PACKET_ID: i32 = 0x00;

/// The `next state` handshake field value that selects the status state.
const NEXT_STATE_STATUS: i32 = 1;

/// Accumulates the body of a serverbound packet.
///
/// # Examples
///
/// ```
/// use slping::packet::PacketBuilder;
///
/// let frame = PacketBuilder::new().write_varint(0x00).into_frame();
/// assert_eq!(frame, [0x01, 0x00]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PacketBuilder {
    body: Vec<u8>,
}

impl PacketBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self { body: Vec::new() }
    }

    #[must_use]
    pub fn write_varint(mut self, value: i32) -> Self {
        varint::write(&mut self.body, value);
        self
    }

    /// Writes the UTF-8 bytes of `value` behind a varint byte count.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn write_string(mut self, value: &str) -> Self {
        varint::write(&mut self.body, value.len() as i32);
        self.body.extend_from_slice(value.as_bytes());
        self
    }

    #[must_use]
    pub fn write_unsigned_short(mut self, value: u16) -> Self {
        self.body.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// The complete frame: the body prefixed by its own length.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn into_frame(self) -> Vec<u8> {
        let length = self.body.len() as i32;
        let mut frame = Vec::with_capacity(varint::size_of(length) + self.body.len());
        varint::write(&mut frame, length);
        frame.extend_from_slice(&self.body);
        frame
    }
}

/// The handshake frame that moves the connection into the status state.
#[must_use]
pub fn handshake(protocol_version: i32, hostname: &str, port: u16) -> Vec<u8> {
    PacketBuilder::new()
        .write_varint(STATUS_PACKET_ID)
        .write_varint(protocol_version)
        .write_string(hostname)
        .write_unsigned_short(port)
        .write_varint(NEXT_STATE_STATUS)
        .into_frame()
}

/// The empty status request frame.
#[must_use]
pub fn status_request() -> Vec<u8> {
    PacketBuilder::new()
        .write_varint(STATUS_PACKET_ID)
        .into_frame()
}

/// A read cursor over a buffer that can keep growing as data arrives.
#[derive(Debug, Clone, Default)]
pub struct PacketReader {
    buf: Vec<u8>,
    cursor: usize,
}

impl PacketReader {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            cursor: 0,
        }
    }

    /// Adds newly received bytes to the end of the buffer. The cursor stays put.
    pub fn append(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Total bytes buffered, read or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes after the cursor.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.cursor
    }

    /// Moves the cursor back to the start of the buffer.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Reads a varint at the cursor.
    ///
    /// Returns `Ok(None)`, leaving the cursor where it was, if the buffer ends
    /// in the middle of the varint.
    ///
    /// # Errors
    /// [`Error::MalformedVarint`] if the varint runs past five bytes.
    pub fn read_varint(&mut self) -> Result<Option<i32>, Error> {
        let Some((value, size)) = varint::decode(&self.buf[self.cursor..])? else {
            return Ok(None);
        };
        self.cursor += size;
        Ok(Some(value))
    }

    /// Reads a big-endian `u16` at the cursor, or `None` if fewer than two bytes remain.
    pub fn read_unsigned_short(&mut self) -> Option<u16> {
        let bytes = self.buf.get(self.cursor..self.cursor + 2)?;
        let value = u16::from_be_bytes([bytes[0], bytes[1]]);
        self.cursor += 2;
        Some(value)
    }

    /// Reads a varint-prefixed UTF-8 string at the cursor.
    ///
    /// # Errors
    /// [`Error::MalformedString`] if the prefix is negative, more bytes are
    /// claimed than are buffered, or the bytes are not UTF-8.
    pub fn read_string(&mut self) -> Result<String, Error> {
        let start = self.cursor;
        let Some(length) = self.read_varint()? else {
            return Err(Error::MalformedString);
        };
        let Ok(length) = usize::try_from(length) else {
            self.cursor = start;
            return Err(Error::MalformedString);
        };
        if length > self.remaining() {
            self.cursor = start;
            return Err(Error::MalformedString);
        }
        let bytes = &self.buf[self.cursor..self.cursor + length];
        let Ok(value) = std::str::from_utf8(bytes) else {
            self.cursor = start;
            return Err(Error::MalformedString);
        };
        let value = value.to_owned();
        self.cursor += length;
        Ok(value)
    }
}
