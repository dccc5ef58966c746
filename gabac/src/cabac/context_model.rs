use crate::cabac::tables::{TRANS_IDX_LPS, TRANS_IDX_MPS};

/// Initialization value giving an equiprobable state.
pub const DEFAULT_CONTEXT_INIT_VALUE: u8 = 64;

/// Adaptive probability estimate of a single binary context.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ContextModel {
    state: u8,
    mps: u8,
}

impl ContextModel {
    /// Creates a context from a 7-bit initialization value.
    ///
    /// Values up to 63 start with MPS = 0 (the lower the value, the more
    /// confident), values from 64 start with MPS = 1. The value is clipped to
    /// `1..=126`, so the non-adaptive terminating state is never produced.
    ///
    /// # Examples
    ///
    /// ```
    /// use gabac::cabac::ContextModel;
    ///
    /// let ctx = ContextModel::from_init_value(64);
    /// assert_eq!(ctx.state(), 0);
    /// assert_eq!(ctx.mps(), 1);
    /// ```
    #[must_use]
    pub const fn from_init_value(init_value: u8) -> Self {
        let value = if init_value < 1 {
            1
        } else if init_value > 126 {
            126
        } else {
            init_value
        };

        if value <= 63 {
            Self {
                state: 63 - value,
                mps: 0,
            }
        } else {
            Self {
                state: value - 64,
                mps: 1,
            }
        }
    }

    #[inline(always)]
    #[must_use]
    pub const fn state(&self) -> u8 {
        self.state
    }

    #[inline(always)]
    #[must_use]
    pub const fn mps(&self) -> u8 {
        self.mps
    }

    #[inline(always)]
    pub fn update_lps(&mut self) {
        if self.state == 0 {
            self.mps = 1 - self.mps;
        }
        self.state = TRANS_IDX_LPS[self.state as usize];
    }

    #[inline(always)]
    pub fn update_mps(&mut self) {
        self.state = TRANS_IDX_MPS[self.state as usize];
    }
}

impl Default for ContextModel {
    fn default() -> Self {
        Self::from_init_value(DEFAULT_CONTEXT_INIT_VALUE)
    }
}

/// Builds a table of `num_contexts` contexts. Contexts without an explicit
/// initialization value start equiprobable.
#[must_use]
pub fn build_context_table(num_contexts: usize, init_values: &[u8]) -> Vec<ContextModel> {
    (0..num_contexts)
        .map(|i| {
            init_values
                .get(i)
                .map_or_else(ContextModel::default, |&value| {
                    ContextModel::from_init_value(value)
                })
        })
        .collect()
}
