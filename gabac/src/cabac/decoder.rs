use crate::bit_stream::BitReader;
use crate::cabac::context_model::ContextModel;
use crate::cabac::tables::{RANGE_TAB_LPS, RENORM_TABLE};
use crate::error::{GabacError, GabacResult};

/// Binary arithmetic decoder, the counterpart of
/// [`BinaryArithmeticEncoder`](crate::cabac::BinaryArithmeticEncoder).
#[derive(Debug, Clone)]
pub struct BinaryArithmeticDecoder<'a> {
    reader: BitReader<'a>,
    range: u32,
    value: u32,
    bits_needed: i32,
}

impl<'a> BinaryArithmeticDecoder<'a> {
    /// Creates a decoder and reads the initial code value.
    pub fn new(bytes: &'a [u8]) -> GabacResult<Self> {
        let mut decoder = Self {
            reader: BitReader::new(bytes),
            range: 0,
            value: 0,
            bits_needed: 0,
        };
        decoder.start()?;
        Ok(decoder)
    }

    fn start(&mut self) -> GabacResult<()> {
        self.range = 510;
        self.bits_needed = -8;
        self.value = ((self.reader.read_byte()? as u32) << 8) | self.reader.read_byte()? as u32;
        Ok(())
    }

    #[inline]
    pub fn decode_bin(&mut self, context: &mut ContextModel, adaptive: bool) -> GabacResult<u8> {
        let lps = RANGE_TAB_LPS[context.state() as usize][((self.range >> 6) & 3) as usize] as u32;
        self.range -= lps;
        let scaled_range = self.range << 7;

        if self.value < scaled_range {
            let bin = context.mps();
            if adaptive {
                context.update_mps();
            }
            if scaled_range < (256 << 7) {
                self.range = scaled_range >> 6;
                self.value <<= 1;
                self.bits_needed += 1;
                if self.bits_needed == 0 {
                    self.bits_needed = -8;
                    self.value += self.reader.read_byte()? as u32;
                }
            }
            Ok(bin)
        } else {
            let num_bits = RENORM_TABLE[(lps >> 3) as usize] as i32;
            self.value = (self.value - scaled_range) << num_bits;
            self.range = lps << num_bits;
            let bin = 1 - context.mps();
            if adaptive {
                context.update_lps();
            }
            self.bits_needed += num_bits;
            if self.bits_needed >= 0 {
                self.value += (self.reader.read_byte()? as u32) << self.bits_needed;
                self.bits_needed -= 8;
            }
            Ok(bin)
        }
    }

    #[inline]
    pub fn decode_bin_ep(&mut self) -> GabacResult<u8> {
        self.value <<= 1;
        self.bits_needed += 1;
        if self.bits_needed >= 0 {
            self.bits_needed = -8;
            self.value += self.reader.read_byte()? as u32;
        }

        let scaled_range = self.range << 7;
        if self.value >= scaled_range {
            self.value -= scaled_range;
            Ok(1)
        } else {
            Ok(0)
        }
    }

    /// Decodes `num_bins` equiprobable bins, most significant first.
    pub fn decode_bins_ep(&mut self, num_bins: u32) -> GabacResult<u64> {
        let mut bins = 0u64;
        for _ in 0..num_bins {
            bins = (bins << 1) | self.decode_bin_ep()? as u64;
        }
        Ok(bins)
    }

    pub fn decode_bin_trm(&mut self) -> GabacResult<u8> {
        self.range -= 2;
        let scaled_range = self.range << 7;
        if self.value >= scaled_range {
            return Ok(1);
        }

        if scaled_range < (256 << 7) {
            self.range = scaled_range >> 6;
            self.value <<= 1;
            self.bits_needed += 1;
            if self.bits_needed == 0 {
                self.bits_needed = -8;
                self.value += self.reader.read_byte()? as u32;
            }
        }
        Ok(0)
    }

    /// Reads the terminating bin and returns the number of payload bytes
    /// consumed.
    pub fn close(mut self) -> GabacResult<usize> {
        if self.decode_bin_trm()? != 1 {
            return Err(GabacError::corrupt_payload(
                "arithmetic codeword is not terminated",
            ));
        }

        Ok(self.reader.bytes_read())
    }
}
