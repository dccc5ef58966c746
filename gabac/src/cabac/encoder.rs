use crate::bit_stream::BitWriter;
use crate::cabac::context_model::ContextModel;
use crate::cabac::tables::{RANGE_TAB_LPS, RENORM_TABLE};

/// Binary arithmetic encoder.
///
/// Produces a byte-aligned payload terminated by a terminating bin and a stop
/// bit, so that a decoder never needs to read beyond the last written byte.
#[derive(Debug, Clone)]
pub struct BinaryArithmeticEncoder {
    writer: BitWriter,
    low: u64,
    range: u32,
    bits_left: i32,
    buffered_byte: u32,
    num_buffered_bytes: u32,
}

impl BinaryArithmeticEncoder {
    #[must_use]
    pub fn new() -> Self {
        let mut encoder = Self {
            writer: BitWriter::new(),
            low: 0,
            range: 0,
            bits_left: 0,
            buffered_byte: 0,
            num_buffered_bytes: 0,
        };
        encoder.start();
        encoder
    }

    pub fn start(&mut self) {
        self.low = 0;
        self.range = 510;
        self.bits_left = 23;
        self.num_buffered_bytes = 0;
        self.buffered_byte = 0xFF;
    }

    /// Codes one bin against `context` and adapts it when `adaptive` is set.
    #[inline]
    pub fn encode_bin(&mut self, bin: u8, context: &mut ContextModel, adaptive: bool) {
        let lps = RANGE_TAB_LPS[context.state() as usize][((self.range >> 6) & 3) as usize] as u32;
        self.range -= lps;

        if bin != context.mps() {
            let num_bits = RENORM_TABLE[(lps >> 3) as usize] as i32;
            self.low = (self.low + self.range as u64) << num_bits;
            self.range = lps << num_bits;
            if adaptive {
                context.update_lps();
            }
            self.bits_left -= num_bits;
        } else {
            if adaptive {
                context.update_mps();
            }
            if self.range >= 256 {
                return;
            }
            self.low <<= 1;
            self.range <<= 1;
            self.bits_left -= 1;
        }

        self.test_and_write_out();
    }

    /// Codes one equiprobable bin.
    #[inline]
    pub fn encode_bin_ep(&mut self, bin: u8) {
        self.low <<= 1;
        if bin != 0 {
            self.low += self.range as u64;
        }
        self.bits_left -= 1;

        self.test_and_write_out();
    }

    /// Codes the lowest `num_bins` bits of `bins` as equiprobable bins, most
    /// significant first.
    pub fn encode_bins_ep(&mut self, bins: u64, num_bins: u32) {
        for i in (0..num_bins).rev() {
            self.encode_bin_ep(((bins >> i) & 1) as u8);
        }
    }

    pub fn encode_bin_trm(&mut self, bin: u8) {
        self.range -= 2;
        if bin != 0 {
            self.low += self.range as u64;
            self.low <<= 7;
            self.range = 2 << 7;
            self.bits_left -= 7;
        } else if self.range >= 256 {
            return;
        } else {
            self.low <<= 1;
            self.range <<= 1;
            self.bits_left -= 1;
        }

        self.test_and_write_out();
    }

    /// Terminates the arithmetic codeword, writes the stop bit and aligns the
    /// output to a byte boundary.
    pub fn flush(&mut self) {
        self.encode_bin_trm(1);
        self.finish();
        self.writer.write(1, 1);
        self.writer.write_align_zero();
        self.start();
    }

    /// Number of bytes emitted so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.writer.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }

    fn finish(&mut self) {
        if (self.low >> (32 - self.bits_left)) != 0 {
            self.writer.write((self.buffered_byte + 1) as u64, 8);
            while self.num_buffered_bytes > 1 {
                self.writer.write(0x00, 8);
                self.num_buffered_bytes -= 1;
            }
            self.low -= 1 << (32 - self.bits_left);
        } else {
            if self.num_buffered_bytes > 0 {
                self.writer.write(self.buffered_byte as u64, 8);
            }
            while self.num_buffered_bytes > 1 {
                self.writer.write(0xFF, 8);
                self.num_buffered_bytes -= 1;
            }
        }
        self.writer
            .write(self.low >> 8, (24 - self.bits_left) as u8);
    }

    #[inline]
    fn test_and_write_out(&mut self) {
        if self.bits_left < 12 {
            self.write_out();
        }
    }

    fn write_out(&mut self) {
        let lead_byte = (self.low >> (24 - self.bits_left)) as u32;
        self.bits_left += 8;
        self.low &= 0xFFFF_FFFF_u64 >> self.bits_left;

        if lead_byte == 0xFF {
            self.num_buffered_bytes += 1;
        } else if self.num_buffered_bytes > 0 {
            let carry = lead_byte >> 8;
            let byte = self.buffered_byte + carry;
            self.buffered_byte = lead_byte & 0xFF;
            self.writer.write(byte as u64, 8);

            let byte = (0xFF + carry) & 0xFF;
            while self.num_buffered_bytes > 1 {
                self.writer.write(byte as u64, 8);
                self.num_buffered_bytes -= 1;
            }
        } else {
            self.num_buffered_bytes = 1;
            self.buffered_byte = lead_byte;
        }
    }
}

impl Default for BinaryArithmeticEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::cabac::context_model::ContextModel;
    use crate::cabac::encoder::BinaryArithmeticEncoder;

    #[test]
    fn test_empty_payload() {
        let mut encoder = BinaryArithmeticEncoder::new();
        encoder.flush();
        assert_eq!(encoder.into_bytes(), vec![0xFE, 0x80]);
    }

    #[test]
    fn test_skewed_input_compresses() {
        let mut encoder = BinaryArithmeticEncoder::new();
        let mut ctx = ContextModel::default();
        for _ in 0..8000 {
            encoder.encode_bin(0, &mut ctx, true);
        }
        encoder.flush();

        assert!(encoder.len() < 100);
    }
}
