//! Byte-level framing primitives: fixed-width big-endian integers, U7
//! variable-length integers and length-prefixed streams.

use std::io::{ErrorKind, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};

/// Number of 7-bit groups needed for any 64-bit value.
pub const U7_MAX_LENGTH: usize = 10;

const U7_CONTINUATION: u8 = 0x80;
const U7_DATA_MASK: u8 = 0x7F;

/// Reads a big-endian unsigned integer of `num_bytes` bytes (1..=8).
pub fn read_uint<R: Read>(reader: &mut R, num_bytes: usize) -> GabacResult<u64> {
    assert!(
        (1..=8).contains(&num_bytes),
        "Invalid integer size: {} bytes",
        num_bytes
    );
    Ok(reader.read_uint::<BigEndian>(num_bytes)?)
}

/// Writes `value` as a big-endian unsigned integer of `num_bytes` bytes
/// (1..=8) and returns the number of bytes written.
pub fn write_uint<W: Write>(writer: &mut W, value: u64, num_bytes: usize) -> GabacResult<usize> {
    assert!(
        (1..=8).contains(&num_bytes),
        "Invalid integer size: {} bytes",
        num_bytes
    );
    if num_bytes < 8 && value >> (num_bytes * 8) != 0 {
        return Err(GabacError::value_out_of_range(
            value,
            (1 << (num_bytes * 8)) - 1,
        ));
    }

    writer.write_uint::<BigEndian>(value, num_bytes)?;
    Ok(num_bytes)
}

/// Reads a U7 integer: 7 data bits per byte, most significant group first,
/// with the top bit of each byte set when more bytes follow.
pub fn read_u7<R: Read>(reader: &mut R) -> GabacResult<u64> {
    let mut value = 0u64;
    for _ in 0..U7_MAX_LENGTH {
        let byte = reader.read_u8()?;
        value = (value << 7) | (byte & U7_DATA_MASK) as u64;
        if byte & U7_CONTINUATION == 0 {
            return Ok(value);
        }
    }

    Err(GabacError::corrupt_payload(format!(
        "U7 integer longer than {} bytes",
        U7_MAX_LENGTH
    )))
}

/// Writes `value` as a U7 integer and returns the number of bytes written.
///
/// Zero is written as a single zero byte.
pub fn write_u7<W: Write>(writer: &mut W, value: u64) -> GabacResult<usize> {
    let num_bits = 64 - value.leading_zeros() as usize;
    let num_groups = ((num_bits + 6) / 7).max(1);

    let mut bytes = [0u8; U7_MAX_LENGTH];
    for (i, byte) in bytes[..num_groups].iter_mut().enumerate() {
        let shift = (num_groups - 1 - i) * 7;
        let continuation = if shift > 0 { U7_CONTINUATION } else { 0 };
        *byte = ((value >> shift) as u8 & U7_DATA_MASK) | continuation;
    }

    writer.write_all(&bytes[..num_groups])?;
    Ok(num_groups)
}

/// Reads exactly `num_bytes` bytes.
///
/// The buffer grows with the data actually read, so a corrupt length never
/// causes a huge allocation up front.
pub fn read_bytes<R: Read>(reader: &mut R, num_bytes: usize) -> GabacResult<Vec<u8>> {
    let mut buf = Vec::new();
    reader.by_ref().take(num_bytes as u64).read_to_end(&mut buf)?;
    if buf.len() != num_bytes {
        return Err(std::io::Error::from(ErrorKind::UnexpectedEof).into());
    }
    Ok(buf)
}

pub fn write_bytes<W: Write>(writer: &mut W, bytes: &[u8]) -> GabacResult<usize> {
    writer.write_all(bytes)?;
    Ok(bytes.len())
}

/// Reads the rest of `reader` as symbols of `word_size` bytes.
pub fn read_full<R: Read>(reader: &mut R, word_size: u8) -> GabacResult<DataBlock> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    DataBlock::from_bytes(buf, word_size)
}

/// A length-prefixed byte stream together with its symbol count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizedStream {
    pub num_symbols: u64,
    pub data: Vec<u8>,
}

/// Reads `[payload_size: u32][num_symbols: u32][data]`.
///
/// A payload size of 0 denotes an empty stream without a symbol count.
pub fn read_stream<R: Read>(reader: &mut R) -> GabacResult<SizedStream> {
    let payload_size = read_uint(reader, 4)? as usize;
    match payload_size {
        0 => Ok(SizedStream::default()),
        1..=3 => Err(GabacError::corrupt_payload(format!(
            "stream payload size {} cannot hold a symbol count",
            payload_size
        ))),
        _ => Ok(SizedStream {
            num_symbols: read_uint(reader, 4)?,
            data: read_bytes(reader, payload_size - 4)?,
        }),
    }
}

/// Writes a stream in the format read by [`read_stream`] and returns the
/// number of bytes written.
pub fn write_stream<W: Write>(writer: &mut W, stream: &SizedStream) -> GabacResult<usize> {
    if stream.num_symbols == 0 && stream.data.is_empty() {
        return write_uint(writer, 0, 4);
    }

    let payload_size = stream.data.len() as u64 + 4;
    let mut written = write_uint(writer, payload_size, 4)?;
    written += write_uint(writer, stream.num_symbols, 4)?;
    written += write_bytes(writer, &stream.data)?;
    Ok(written)
}
