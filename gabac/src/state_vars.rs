use log::trace;

use crate::config::{BinarizationId, SubsymTransform, TransformedSubSeqConfig};
use crate::error::{GabacError, GabacResult};

/// Maximum total number of contexts of a single transformed sub-sequence.
pub const MAX_NUM_CONTEXTS: u64 = 1 << 24;

/// Quantities derived from a [`TransformedSubSeqConfig`] that drive the
/// context modelling of a transformed sub-sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateVars {
    num_subsyms: u32,
    num_alpha_subsym: u64,
    num_ctx_subsym: u64,
    c_length_bi: u8,
    coding_order_ctx_offset: [u64; 3],
    coding_size_ctx_offset: u64,
    num_ctx_luts: u64,
    num_ctx_total: u64,
    num_luts: u32,
    num_prvs: u32,
}

fn too_many_contexts() -> GabacError {
    GabacError::invalid_config(format!(
        "configuration needs more than {} contexts",
        MAX_NUM_CONTEXTS
    ))
}

#[inline]
fn checked_mul(a: u64, b: u64) -> GabacResult<u64> {
    a.checked_mul(b)
        .filter(|&x| x <= MAX_NUM_CONTEXTS * MAX_NUM_CONTEXTS)
        .ok_or_else(too_many_contexts)
}

/// `floor(log2(value))`; `value` must be non-zero.
#[inline]
fn floor_log2(value: u64) -> u64 {
    63 - value.leading_zeros() as u64
}

/// Number of contexts used by a split-unit truncated unary binarization of
/// `output_symbol_size` bits.
#[must_use]
pub fn num_ctx_split_unit(output_symbol_size: u8, split_unit_size: u8) -> u64 {
    let full_units = (output_symbol_size / split_unit_size) as u64;
    let remainder = output_symbol_size % split_unit_size;
    full_units * ((1 << split_unit_size) - 1) + ((1 << remainder) - 1)
}

impl StateVars {
    pub fn new(config: &TransformedSubSeqConfig) -> GabacResult<Self> {
        let support = &config.support_values;
        let binarization = &config.cabac_binarization;
        let params = &binarization.cabac_binarization_parameters;
        let context_params = &binarization.cabac_context_parameters;

        let css = support.coding_subsym_size;
        let oss = support.output_symbol_size;
        let coding_order = support.coding_order as usize;
        if css == 0 || css > 32 {
            return Err(GabacError::invalid_config(format!(
                "coding sub-symbol size {} is not in 1..=32",
                css
            )));
        }
        if coding_order > 2 {
            return Err(GabacError::invalid_config(format!(
                "unknown coding order {}",
                coding_order
            )));
        }

        let mut vars = StateVars {
            num_subsyms: (oss / css) as u32,
            num_alpha_subsym: 1 << css,
            ..Default::default()
        };
        if binarization.binarization_id == BinarizationId::Bi {
            vars.c_length_bi = css;
        }

        let lut_enabled =
            coding_order > 0 && config.transform_id_subsym == SubsymTransform::LutTransform;
        vars.num_luts = match (lut_enabled, support.share_subsym_lut_flag) {
            (false, _) => 0,
            (true, true) => 1,
            (true, false) => vars.num_subsyms,
        };
        vars.num_prvs = if support.share_subsym_prv_flag {
            1
        } else {
            vars.num_subsyms
        };

        if !binarization.bypass_flag {
            let eg_ctx = floor_log2(vars.num_alpha_subsym + 1) + 1;
            let split_unit_size = params.split_unit_size.max(1);
            vars.num_ctx_subsym = match binarization.binarization_id {
                BinarizationId::Bi => css as u64,
                BinarizationId::Tu => params.c_max as u64,
                BinarizationId::Eg => eg_ctx,
                BinarizationId::Seg => eg_ctx + 1,
                BinarizationId::Teg => params.c_max_teg as u64 + eg_ctx,
                BinarizationId::Steg => params.c_max_teg as u64 + eg_ctx + 1,
                BinarizationId::Sutu => num_ctx_split_unit(oss, split_unit_size),
                BinarizationId::Ssutu => num_ctx_split_unit(oss, split_unit_size) + 1,
                BinarizationId::Dtu => {
                    params.c_max_dtu as u64 + num_ctx_split_unit(oss, split_unit_size)
                }
                BinarizationId::Sdtu => {
                    params.c_max_dtu as u64 + num_ctx_split_unit(oss, split_unit_size) + 1
                }
            };

            if coding_order >= 1 {
                vars.coding_order_ctx_offset[1] = vars.num_ctx_subsym;
            }
            if coding_order == 2 {
                vars.coding_order_ctx_offset[2] =
                    checked_mul(vars.num_ctx_subsym, vars.num_alpha_subsym)?;
            }

            let context_size = if coding_order == 0 {
                vars.num_ctx_subsym
            } else {
                checked_mul(
                    vars.coding_order_ctx_offset[coding_order],
                    vars.num_alpha_subsym,
                )?
            };
            vars.coding_size_ctx_offset = if context_params.share_subsym_ctx_flag {
                0
            } else {
                context_size
            };

            if config.transform_id_subsym == SubsymTransform::LutTransform {
                vars.num_ctx_luts = num_ctx_split_unit(css, 2);
            }

            vars.num_ctx_total = if context_params.num_contexts != 0 {
                context_params.num_contexts as u64
            } else {
                let context_count = if context_params.share_subsym_ctx_flag {
                    1
                } else {
                    vars.num_subsyms as u64
                };
                vars.num_ctx_luts + checked_mul(context_count, context_size)?
            };
            if vars.num_ctx_total > MAX_NUM_CONTEXTS {
                return Err(too_many_contexts());
            }
        }

        trace!("State variables: {:?}", vars);
        Ok(vars)
    }

    #[inline]
    #[must_use]
    pub fn num_subsyms(&self) -> u32 {
        self.num_subsyms
    }

    #[inline]
    #[must_use]
    pub fn num_alpha_subsym(&self) -> u64 {
        self.num_alpha_subsym
    }

    #[inline]
    #[must_use]
    pub fn num_ctx_subsym(&self) -> u64 {
        self.num_ctx_subsym
    }

    #[inline]
    #[must_use]
    pub fn c_length_bi(&self) -> u8 {
        self.c_length_bi
    }

    #[inline]
    #[must_use]
    pub fn coding_order_ctx_offset(&self, index: usize) -> u64 {
        self.coding_order_ctx_offset[index]
    }

    #[inline]
    #[must_use]
    pub fn coding_size_ctx_offset(&self) -> u64 {
        self.coding_size_ctx_offset
    }

    #[inline]
    #[must_use]
    pub fn num_ctx_luts(&self) -> u64 {
        self.num_ctx_luts
    }

    #[inline]
    #[must_use]
    pub fn num_ctx_total(&self) -> u64 {
        self.num_ctx_total
    }

    #[inline]
    #[must_use]
    pub fn num_luts(&self) -> u32 {
        self.num_luts
    }

    #[inline]
    #[must_use]
    pub fn num_prvs(&self) -> u32 {
        self.num_prvs
    }
}
