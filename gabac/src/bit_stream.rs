//! MSB-first bit-level I/O over byte buffers.

use crate::error::{GabacError, GabacResult};

#[inline(always)]
#[must_use]
const fn low_bits_mask(num_bits: u8) -> u64 {
    if num_bits >= 64 {
        u64::MAX
    } else {
        (1 << num_bits) - 1
    }
}

/// Bit writer over a growable byte buffer.
///
/// Bits that do not fill a whole byte yet are held back until further writes
/// complete the byte, or until [`BitWriter::write_align_zero`] pads them.
///
/// # Examples
///
/// ```
/// use gabac::bit_stream::BitWriter;
///
/// let mut writer = BitWriter::new();
/// writer.write(0b101, 3);
/// writer.write(0b11111, 5);
/// writer.write(1, 1);
/// writer.write_align_zero();
///
/// assert_eq!(writer.into_bytes(), vec![0b1011_1111, 0b1000_0000]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    held_bits: u8,
    num_held_bits: u8,
}

impl BitWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the lowest `num_bits` bits of `bits`, most significant first.
    ///
    /// # Panics
    ///
    /// Panics if `num_bits` is greater than 32.
    pub fn write(&mut self, bits: u64, num_bits: u8) {
        assert!(num_bits <= 32, "Cannot write {} bits at once", num_bits);
        if num_bits == 0 {
            return;
        }

        let mut total_bits = self.num_held_bits + num_bits;
        let accumulator =
            ((self.held_bits as u64) << num_bits) | (bits & low_bits_mask(num_bits));
        while total_bits >= 8 {
            total_bits -= 8;
            self.bytes.push((accumulator >> total_bits) as u8);
        }

        self.held_bits = (accumulator & low_bits_mask(total_bits)) as u8;
        self.num_held_bits = total_bits;
    }

    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.write(byte as u64, 8);
    }

    /// Pads held bits with zeros up to the next byte boundary.
    pub fn write_align_zero(&mut self) {
        if self.num_held_bits > 0 {
            self.bytes.push(self.held_bits << (8 - self.num_held_bits));
            self.held_bits = 0;
            self.num_held_bits = 0;
        }
    }

    /// Number of complete bytes written so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() && self.num_held_bits == 0
    }

    /// Returns the written bytes; held bits that do not form a full byte are
    /// discarded, so call [`BitWriter::write_align_zero`] first.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Bit reader over a byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    position: usize,
    held_bits: u8,
    num_held_bits: u8,
}

impl<'a> BitReader<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            position: 0,
            held_bits: 0,
            num_held_bits: 0,
        }
    }

    /// Reads `num_bits` bits, most significant first.
    ///
    /// Reading past the end of the buffer fails with
    /// [`GabacError::UnexpectedEndOfStream`].
    ///
    /// # Panics
    ///
    /// Panics if `num_bits` is greater than 32.
    pub fn read(&mut self, num_bits: u8) -> GabacResult<u64> {
        assert!(num_bits <= 32, "Cannot read {} bits at once", num_bits);

        let mut result = 0u64;
        let mut remaining = num_bits;
        while remaining > 0 {
            if self.num_held_bits == 0 {
                self.held_bits = *self
                    .bytes
                    .get(self.position)
                    .ok_or_else(|| GabacError::unexpected_end_of_stream(self.position))?;
                self.position += 1;
                self.num_held_bits = 8;
            }

            let take = remaining.min(self.num_held_bits);
            let shift = self.num_held_bits - take;
            result = (result << take) | ((self.held_bits >> shift) as u64 & low_bits_mask(take));
            self.num_held_bits -= take;
            remaining -= take;
        }

        Ok(result)
    }

    #[inline]
    pub fn read_byte(&mut self) -> GabacResult<u8> {
        Ok(self.read(8)? as u8)
    }

    /// Number of bytes fetched from the underlying buffer so far.
    #[inline]
    #[must_use]
    pub fn bytes_read(&self) -> usize {
        self.position
    }
}
