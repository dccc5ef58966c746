use crate::config::{BinarizationId, TransformedSubSeqConfig};
use crate::error::GabacResult;
use crate::reader::CabacReader;
use crate::state_vars::StateVars;
use crate::writer::CabacWriter;

/// Binarization selected for a transformed sub-sequence, with all of its
/// parameters resolved.
///
/// Signed binarizations share the shape of their unsigned counterpart; the
/// sign itself is handled by the sub-sequence codec.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Binarizer {
    Bi {
        c_length: u8,
    },
    Tu {
        c_max: u64,
    },
    Eg,
    Teg {
        c_max_teg: u64,
    },
    Sutu {
        output_symbol_size: u8,
        split_unit_size: u8,
    },
    Dtu {
        output_symbol_size: u8,
        split_unit_size: u8,
        c_max_dtu: u64,
    },
}

impl Binarizer {
    #[must_use]
    pub fn new(config: &TransformedSubSeqConfig, state_vars: &StateVars) -> Self {
        let params = &config.cabac_binarization.cabac_binarization_parameters;
        let output_symbol_size = config.support_values.output_symbol_size;

        match config.binarization_id() {
            BinarizationId::Bi => Binarizer::Bi {
                c_length: state_vars.c_length_bi(),
            },
            BinarizationId::Tu => Binarizer::Tu {
                c_max: params.c_max as u64,
            },
            BinarizationId::Eg | BinarizationId::Seg => Binarizer::Eg,
            BinarizationId::Teg | BinarizationId::Steg => Binarizer::Teg {
                c_max_teg: params.c_max_teg as u64,
            },
            BinarizationId::Sutu | BinarizationId::Ssutu => Binarizer::Sutu {
                output_symbol_size,
                split_unit_size: params.split_unit_size,
            },
            BinarizationId::Dtu | BinarizationId::Sdtu => Binarizer::Dtu {
                output_symbol_size,
                split_unit_size: params.split_unit_size,
                c_max_dtu: params.c_max_dtu as u64,
            },
        }
    }

    /// Lowers the truncation bound of a truncated unary binarization; other
    /// binarizations are returned unchanged.
    #[must_use]
    pub fn with_c_max(self, new_c_max: u64) -> Self {
        match self {
            Binarizer::Tu { c_max } => Binarizer::Tu {
                c_max: c_max.min(new_c_max),
            },
            other => other,
        }
    }

    #[inline]
    pub fn write(&self, writer: &mut CabacWriter, value: u64, ctx: usize) -> GabacResult<()> {
        match *self {
            Binarizer::Bi { c_length } => writer.write_as_bi(value, c_length, ctx),
            Binarizer::Tu { c_max } => writer.write_as_tu(value, c_max, ctx),
            Binarizer::Eg => writer.write_as_eg(value, ctx),
            Binarizer::Teg { c_max_teg } => writer.write_as_teg(value, c_max_teg, ctx),
            Binarizer::Sutu {
                output_symbol_size,
                split_unit_size,
            } => writer.write_as_sutu(value, output_symbol_size, split_unit_size, ctx),
            Binarizer::Dtu {
                output_symbol_size,
                split_unit_size,
                c_max_dtu,
            } => writer.write_as_dtu(value, output_symbol_size, split_unit_size, c_max_dtu, ctx),
        }
    }

    #[inline]
    pub fn read(&self, reader: &mut CabacReader, ctx: usize) -> GabacResult<u64> {
        match *self {
            Binarizer::Bi { c_length } => reader.read_as_bi(c_length, ctx),
            Binarizer::Tu { c_max } => reader.read_as_tu(c_max, ctx),
            Binarizer::Eg => reader.read_as_eg(ctx),
            Binarizer::Teg { c_max_teg } => reader.read_as_teg(c_max_teg, ctx),
            Binarizer::Sutu {
                output_symbol_size,
                split_unit_size,
            } => reader.read_as_sutu(output_symbol_size, split_unit_size, ctx),
            Binarizer::Dtu {
                output_symbol_size,
                split_unit_size,
                c_max_dtu,
            } => reader.read_as_dtu(output_symbol_size, split_unit_size, c_max_dtu, ctx),
        }
    }
}
