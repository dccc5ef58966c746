use crate::cabac::{build_context_table, BinaryArithmeticDecoder, ContextModel};
use crate::error::{GabacError, GabacResult};
use crate::writer::split_units;

/// Longest exp-Golomb prefix a 64-bit value can produce.
const MAX_EG_LEADING_ZEROS: usize = 63;

/// Reads binarized values through the arithmetic decoder; the mirror image
/// of [`CabacWriter`](crate::writer::CabacWriter).
#[derive(Debug)]
pub struct CabacReader<'a> {
    decoder: BinaryArithmeticDecoder<'a>,
    contexts: Vec<ContextModel>,
    bypass: bool,
    adaptive: bool,
}

impl<'a> CabacReader<'a> {
    pub fn new(
        payload: &'a [u8],
        num_contexts: usize,
        init_values: &[u8],
        bypass: bool,
        adaptive: bool,
    ) -> GabacResult<Self> {
        Ok(Self {
            decoder: BinaryArithmeticDecoder::new(payload)?,
            contexts: build_context_table(num_contexts, init_values),
            bypass,
            adaptive,
        })
    }

    #[inline]
    fn read_bin(&mut self, ctx: usize) -> GabacResult<u8> {
        if self.bypass {
            return self.decoder.decode_bin_ep();
        }

        let num_contexts = self.contexts.len();
        let context = self
            .contexts
            .get_mut(ctx)
            .ok_or_else(|| GabacError::context_out_of_range(ctx, num_contexts))?;
        self.decoder.decode_bin(context, self.adaptive)
    }

    pub fn read_as_bi(&mut self, c_length: u8, ctx: usize) -> GabacResult<u64> {
        let mut value = 0;
        for i in 0..c_length as usize {
            value = (value << 1) | self.read_bin(ctx + i)? as u64;
        }
        Ok(value)
    }

    pub fn read_as_tu(&mut self, c_max: u64, ctx: usize) -> GabacResult<u64> {
        let mut value = 0;
        while value < c_max && self.read_bin(ctx + value as usize)? == 1 {
            value += 1;
        }
        Ok(value)
    }

    pub fn read_as_eg(&mut self, ctx: usize) -> GabacResult<u64> {
        let mut num_lead_zeros = 0;
        while self.read_bin(ctx + num_lead_zeros)? == 0 {
            num_lead_zeros += 1;
            if num_lead_zeros > MAX_EG_LEADING_ZEROS {
                return Err(GabacError::corrupt_payload(
                    "exp-Golomb prefix longer than 63 bins",
                ));
            }
        }

        if num_lead_zeros == 0 {
            return Ok(0);
        }
        let suffix = self.read_bypass_bins(num_lead_zeros as u32)?;
        Ok(((1 << num_lead_zeros) | suffix) - 1)
    }

    pub fn read_as_teg(&mut self, c_max_teg: u64, ctx: usize) -> GabacResult<u64> {
        let mut value = self.read_as_tu(c_max_teg, ctx)?;
        if value == c_max_teg {
            let remainder = self.read_as_eg(ctx + c_max_teg as usize)?;
            value = value.checked_add(remainder).ok_or_else(|| {
                GabacError::corrupt_payload("truncated exp-Golomb value overflows")
            })?;
        }
        Ok(value)
    }

    pub fn read_as_sutu(
        &mut self,
        output_symbol_size: u8,
        split_unit_size: u8,
        ctx: usize,
    ) -> GabacResult<u64> {
        let mut ctx = ctx;
        let mut value = 0u64;
        for unit_size in split_units(output_symbol_size, split_unit_size) {
            let c_max = (1u64 << unit_size) - 1;
            let unit = self.read_as_tu(c_max, ctx)?;
            value = (value << unit_size) | unit;
            ctx += c_max as usize;
        }
        Ok(value)
    }

    pub fn read_as_dtu(
        &mut self,
        output_symbol_size: u8,
        split_unit_size: u8,
        c_max_dtu: u64,
        ctx: usize,
    ) -> GabacResult<u64> {
        let mut value = self.read_as_tu(c_max_dtu, ctx)?;
        if value == c_max_dtu {
            let remainder = self.read_as_sutu(
                output_symbol_size,
                split_unit_size,
                ctx + c_max_dtu as usize,
            )?;
            value = value.wrapping_add(remainder);
        }
        Ok(value)
    }

    /// Returns `true` for a negative value.
    #[inline]
    pub fn read_sign_flag(&mut self) -> GabacResult<bool> {
        Ok(self.decoder.decode_bin_ep()? == 1)
    }

    pub fn read_bypass_bins(&mut self, num_bins: u32) -> GabacResult<u64> {
        if num_bins > 32 {
            let high = self.decoder.decode_bins_ep(num_bins - 32)?;
            let low = self.decoder.decode_bins_ep(32)?;
            Ok((high << 32) | low)
        } else {
            self.decoder.decode_bins_ep(num_bins)
        }
    }

    /// Verifies the end of the codeword and returns the number of payload
    /// bytes consumed.
    pub fn close(self) -> GabacResult<usize> {
        self.decoder.close()
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    use crate::error::GabacError;
    use crate::reader::CabacReader;
    use crate::writer::CabacWriter;

    #[test]
    fn test_all_binarizations() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1337);
        let values: Vec<u64> = (0..500).map(|_| rng.gen_range(0..256)).collect();

        for bypass in [false, true] {
            let mut writer = CabacWriter::new(64, &[], bypass, true);
            for &value in &values {
                writer.write_as_bi(value, 8, 0).unwrap();
                writer.write_as_tu(value % 6, 5.max(value % 6), 8).unwrap();
                writer.write_as_eg(value, 14).unwrap();
                writer.write_as_teg(value, 3, 24).unwrap();
                writer.write_as_sutu(value, 8, 3, 40).unwrap();
                writer.write_as_dtu(value, 8, 4, 2, 0).unwrap();
                writer.write_sign_flag(value % 2 == 1);
            }
            let payload = writer.close();

            let mut reader = CabacReader::new(&payload, 64, &[], bypass, true).unwrap();
            for &value in &values {
                assert_eq!(reader.read_as_bi(8, 0).unwrap(), value);
                assert_eq!(reader.read_as_tu(5.max(value % 6), 8).unwrap(), value % 6);
                assert_eq!(reader.read_as_eg(14).unwrap(), value);
                assert_eq!(reader.read_as_teg(3, 24).unwrap(), value);
                assert_eq!(reader.read_as_sutu(8, 3, 40).unwrap(), value);
                assert_eq!(reader.read_as_dtu(8, 4, 2, 0).unwrap(), value);
                assert_eq!(reader.read_sign_flag().unwrap(), value % 2 == 1);
            }
            assert_eq!(reader.close().unwrap(), payload.len());
        }
    }

    #[test]
    fn test_wide_exp_golomb() {
        let values = [0, 1, u32::MAX as u64, 1 << 40, u64::MAX - 1];

        let mut writer = CabacWriter::new(0, &[], true, true);
        for &value in &values {
            writer.write_as_eg(value, 0).unwrap();
        }
        let payload = writer.close();

        let mut reader = CabacReader::new(&payload, 0, &[], true, true).unwrap();
        for &value in &values {
            assert_eq!(reader.read_as_eg(0).unwrap(), value);
        }
    }

    #[test]
    fn test_non_adaptive_contexts() {
        let mut writer = CabacWriter::new(4, &[10, 120, 64, 64], false, false);
        for _ in 0..100 {
            writer.write_as_bi(0b0110, 4, 0).unwrap();
        }
        let payload = writer.close();

        let mut reader = CabacReader::new(&payload, 4, &[10, 120, 64, 64], false, false).unwrap();
        for _ in 0..100 {
            assert_eq!(reader.read_as_bi(4, 0).unwrap(), 0b0110);
        }
        assert_eq!(reader.close().unwrap(), payload.len());
    }

    #[test]
    fn test_reader_context_out_of_range() {
        let mut writer = CabacWriter::new(8, &[], false, true);
        writer.write_as_bi(0x0F, 8, 0).unwrap();
        let payload = writer.close();

        let mut reader = CabacReader::new(&payload, 4, &[], false, true).unwrap();
        assert!(matches!(
            reader.read_as_bi(8, 0),
            Err(GabacError::ContextOutOfRange(4, 4))
        ));
    }
}
