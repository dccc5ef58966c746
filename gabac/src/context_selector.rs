use crate::state_vars::StateVars;

/// Working state of one sub-symbol position while a symbol is being coded.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Subsymbol {
    pub subsym_idx: u8,
    pub subsym_value: u64,
    /// Previously coded values in this position class, most recent first.
    pub prv_values: [u64; 2],
    pub lut_entry_idx: u64,
    pub lut_num_max_elems: u64,
}

impl Subsymbol {
    /// Shifts the history by one, making `value` the most recent value.
    #[inline]
    pub fn push_previous(&mut self, value: u64, coding_order: u8) {
        if coding_order == 2 {
            self.prv_values[1] = self.prv_values[0];
        }
        self.prv_values[0] = value;
    }
}

/// Maps sub-symbol positions and their history onto context indices.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ContextSelector {
    coding_size_ctx_offset: u64,
    coding_order_ctx_offset: [u64; 3],
    num_ctx_luts: u64,
}

impl ContextSelector {
    #[must_use]
    pub fn new(state_vars: &StateVars) -> Self {
        Self {
            coding_size_ctx_offset: state_vars.coding_size_ctx_offset(),
            coding_order_ctx_offset: [
                state_vars.coding_order_ctx_offset(0),
                state_vars.coding_order_ctx_offset(1),
                state_vars.coding_order_ctx_offset(2),
            ],
            num_ctx_luts: state_vars.num_ctx_luts(),
        }
    }

    #[inline]
    #[must_use]
    pub fn context_idx_order_0(&self, subsym_idx: u8) -> usize {
        (subsym_idx as u64 * self.coding_size_ctx_offset) as usize
    }

    /// Context of sub-symbol `subsym_idx` for coding orders 1 and 2, using
    /// the history stored in `subsymbols[prv_idx]`.
    #[inline]
    #[must_use]
    pub fn context_idx_order_gt0(
        &self,
        subsym_idx: u8,
        prv_idx: usize,
        subsymbols: &[Subsymbol],
        coding_order: u8,
    ) -> usize {
        let mut ctx_idx = self.num_ctx_luts + subsym_idx as u64 * self.coding_size_ctx_offset;
        for i in 1..=coding_order as usize {
            ctx_idx += subsymbols[prv_idx].prv_values[i - 1] * self.coding_order_ctx_offset[i];
        }
        ctx_idx as usize
    }
}
