use crate::cabac::{build_context_table, BinaryArithmeticEncoder, ContextModel};
use crate::error::{GabacError, GabacResult};

/// Writes binarized values through the arithmetic encoder.
///
/// Every `write_as_*` method takes the index of the first context it may
/// use; the binarization decides how many subsequent contexts it touches.
/// In bypass mode contexts are ignored and all bins are equiprobable.
#[derive(Debug)]
pub struct CabacWriter {
    encoder: BinaryArithmeticEncoder,
    contexts: Vec<ContextModel>,
    bypass: bool,
    adaptive: bool,
}

impl CabacWriter {
    #[must_use]
    pub fn new(num_contexts: usize, init_values: &[u8], bypass: bool, adaptive: bool) -> Self {
        Self {
            encoder: BinaryArithmeticEncoder::new(),
            contexts: build_context_table(num_contexts, init_values),
            bypass,
            adaptive,
        }
    }

    #[inline]
    fn write_bin(&mut self, bin: u8, ctx: usize) -> GabacResult<()> {
        if self.bypass {
            self.encoder.encode_bin_ep(bin);
            return Ok(());
        }

        let num_contexts = self.contexts.len();
        let context = self
            .contexts
            .get_mut(ctx)
            .ok_or_else(|| GabacError::context_out_of_range(ctx, num_contexts))?;
        self.encoder.encode_bin(bin, context, self.adaptive);
        Ok(())
    }

    /// Fixed-length binary, most significant bit first, one context per bit.
    pub fn write_as_bi(&mut self, input: u64, c_length: u8, ctx: usize) -> GabacResult<()> {
        for i in 0..c_length as usize {
            let bin = ((input >> (c_length as usize - 1 - i)) & 1) as u8;
            self.write_bin(bin, ctx + i)?;
        }
        Ok(())
    }

    /// Truncated unary: `input` ones, then a zero unless `input == c_max`.
    pub fn write_as_tu(&mut self, input: u64, c_max: u64, ctx: usize) -> GabacResult<()> {
        if input > c_max {
            return Err(GabacError::value_out_of_range(input, c_max));
        }

        for i in 0..input as usize {
            self.write_bin(1, ctx + i)?;
        }
        if input < c_max {
            self.write_bin(0, ctx + input as usize)?;
        }
        Ok(())
    }

    /// Order-0 exp-Golomb. The unary prefix is context coded, the suffix is
    /// always bypass coded.
    pub fn write_as_eg(&mut self, input: u64, ctx: usize) -> GabacResult<()> {
        let value = input
            .checked_add(1)
            .ok_or_else(|| GabacError::value_out_of_range(input, u64::MAX - 1))?;
        let num_lead_zeros = 63 - value.leading_zeros() as usize;

        for i in 0..num_lead_zeros {
            self.write_bin(0, ctx + i)?;
        }
        self.write_bin(1, ctx + num_lead_zeros)?;

        let suffix = value & ((1 << num_lead_zeros) - 1);
        self.write_bypass_bins(suffix, num_lead_zeros as u32);
        Ok(())
    }

    /// Truncated unary up to `c_max_teg`, continued with exp-Golomb for the
    /// remainder.
    pub fn write_as_teg(&mut self, input: u64, c_max_teg: u64, ctx: usize) -> GabacResult<()> {
        self.write_as_tu(input.min(c_max_teg), c_max_teg, ctx)?;
        if input >= c_max_teg {
            self.write_as_eg(input - c_max_teg, ctx + c_max_teg as usize)?;
        }
        Ok(())
    }

    /// Split-unit truncated unary: the `output_symbol_size`-bit value is cut
    /// into units of `split_unit_size` bits (the first unit takes the
    /// remainder), each coded as truncated unary with its own contexts.
    pub fn write_as_sutu(
        &mut self,
        input: u64,
        output_symbol_size: u8,
        split_unit_size: u8,
        ctx: usize,
    ) -> GabacResult<()> {
        let mut ctx = ctx;
        let mut remaining_bits = output_symbol_size as u32;
        for unit_size in split_units(output_symbol_size, split_unit_size) {
            let c_max = (1u64 << unit_size) - 1;
            remaining_bits -= unit_size as u32;
            let value = input.checked_shr(remaining_bits).unwrap_or(0) & c_max;
            self.write_as_tu(value, c_max, ctx)?;
            ctx += c_max as usize;
        }
        Ok(())
    }

    /// Truncated unary up to `c_max_dtu`, continued with split-unit truncated
    /// unary for the remainder.
    pub fn write_as_dtu(
        &mut self,
        input: u64,
        output_symbol_size: u8,
        split_unit_size: u8,
        c_max_dtu: u64,
        ctx: usize,
    ) -> GabacResult<()> {
        self.write_as_tu(input.min(c_max_dtu), c_max_dtu, ctx)?;
        if input >= c_max_dtu {
            self.write_as_sutu(
                input - c_max_dtu,
                output_symbol_size,
                split_unit_size,
                ctx + c_max_dtu as usize,
            )?;
        }
        Ok(())
    }

    #[inline]
    pub fn write_sign_flag(&mut self, negative: bool) {
        self.encoder.encode_bin_ep(negative as u8);
    }

    /// Writes up to 64 bypass bins, most significant first.
    pub fn write_bypass_bins(&mut self, bins: u64, num_bins: u32) {
        if num_bins > 32 {
            self.encoder.encode_bins_ep(bins >> 32, num_bins - 32);
            self.encoder.encode_bins_ep(bins & 0xFFFF_FFFF, 32);
        } else {
            self.encoder.encode_bins_ep(bins, num_bins);
        }
    }

    /// Number of payload bytes emitted so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.encoder.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.encoder.is_empty()
    }

    /// Terminates the codeword and returns the payload.
    #[must_use]
    pub fn close(mut self) -> Vec<u8> {
        self.encoder.flush();
        self.encoder.into_bytes()
    }
}

/// Sizes of the units a split-unit binarization cuts an
/// `output_symbol_size`-bit value into, most significant unit first.
pub(crate) fn split_units(
    output_symbol_size: u8,
    split_unit_size: u8,
) -> impl Iterator<Item = u8> {
    let remainder = output_symbol_size % split_unit_size;
    let full_units = output_symbol_size / split_unit_size;
    (remainder != 0)
        .then_some(remainder)
        .into_iter()
        .chain(std::iter::repeat(split_unit_size).take(full_units as usize))
}
