//! The protocol's 32-bit variable length integer.
//! [Data types: VarInt](https://wiki.vg/Protocol#VarInt_and_VarLong)

use crate::Error;

/// The most bytes a 32-bit varint can occupy.
pub const MAX_SIZE: usize = 5;

const SEGMENT_BITS: u32 = 0x7F;
const CONTINUE_BIT: u8 = 0x80;

/// Appends the encoding of `value` to `buf`.
///
/// Negative values are written as their two's complement bit pattern and
/// always take [`MAX_SIZE`] bytes.
#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
pub fn write(buf: &mut Vec<u8>, value: i32) {
    let mut value = value as u32;
    loop {
        if value & !SEGMENT_BITS == 0 {
            buf.push(value as u8);
            return;
        }
        buf.push((value & SEGMENT_BITS) as u8 | CONTINUE_BIT);
        value >>= 7;
    }
}

#[must_use]
pub fn encode(value: i32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(size_of(value));
    write(&mut buf, value);
    buf
}

/// The exact number of bytes [`encode`] produces for `value`.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn size_of(value: i32) -> usize {
    let value = value as u32;
    let mut size = 1;
    let mut rest = value >> 7;
    while rest != 0 {
        size += 1;
        rest >>= 7;
    }
    size
}

/// Decodes a varint from the front of `buf`.
///
/// Returns the value and the number of bytes it took, or `None` if `buf`
/// ends before the terminating byte.
///
/// # Errors
/// [`Error::MalformedVarint`] if no terminating byte shows up within
/// [`MAX_SIZE`] bytes.
#[allow(clippy::cast_possible_wrap)]
pub fn decode(buf: &[u8]) -> Result<Option<(i32, usize)>, Error> {
    let mut value: u32 = 0;
    for (index, byte) in buf.iter().enumerate() {
        if index == MAX_SIZE {
            return Err(Error::MalformedVarint);
        }
        value |= (u32::from(*byte) & SEGMENT_BITS) << (7 * index);
        if byte & CONTINUE_BIT == 0 {
            return Ok(Some((value as i32, index + 1)));
        }
    }
    if buf.len() >= MAX_SIZE {
        return Err(Error::MalformedVarint);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [i32; 7] = [0, 1, 127, 128, 300, 16384, i32::MAX];

    #[test]
    fn test_round_trip() {
        for value in SAMPLES {
            let bytes = encode(value);
            assert_eq!(decode(&bytes).unwrap(), Some((value, bytes.len())));
            assert_eq!(size_of(value), bytes.len(), "size_of({value})");
        }
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode(0), [0x00]);
        assert_eq!(encode(127), [0x7F]);
        assert_eq!(encode(128), [0x80, 0x01]);
        assert_eq!(encode(300), [0xAC, 0x02]);
        assert_eq!(encode(754), [0xF2, 0x05]);
        assert_eq!(encode(i32::MAX), [0xFF, 0xFF, 0xFF, 0xFF, 0x07]);
        assert_eq!(encode(-1), [0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn test_negative_round_trip() {
        assert_eq!(size_of(-1), MAX_SIZE);
        assert_eq!(decode(&encode(-1)).unwrap(), Some((-1, MAX_SIZE)));
        assert_eq!(decode(&encode(i32::MIN)).unwrap(), Some((i32::MIN, MAX_SIZE)));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        assert_eq!(decode(&[0xAC, 0x02, 0x00, 0x7F]).unwrap(), Some((300, 2)));
    }

    #[test]
    fn test_decode_incomplete() {
        assert_eq!(decode(&[]).unwrap(), None);
        assert_eq!(decode(&[0x80]).unwrap(), None);
        assert_eq!(decode(&[0xFF, 0xFF, 0xFF, 0xFF]).unwrap(), None);
    }

    #[test]
    fn test_decode_too_long() {
        assert!(matches!(
            decode(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF]),
            Err(Error::MalformedVarint)
        ));
        assert!(matches!(
            decode(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]),
            Err(Error::MalformedVarint)
        ));
    }
}
