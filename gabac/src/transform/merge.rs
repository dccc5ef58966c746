use crate::data_block::{signed_value, DataBlock};
use crate::error::{GabacError, GabacResult};

/// Word size of merge-coded sub-sequences and of their reassembly.
pub const MERGE_WORD_SIZE: u8 = 8;

/// Bit layout of one sub-sequence produced by merge coding.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MergeField {
    pub shift: u8,
    pub size: u8,
    /// Whether this field may carry the sign of the symbol.
    pub signed: bool,
}

impl MergeField {
    #[inline]
    fn mask(&self) -> u64 {
        if self.size >= 64 {
            u64::MAX
        } else {
            (1 << self.size) - 1
        }
    }
}

/// Splits every symbol into one field per sub-sequence with
/// `(value >> shift) & mask`.
///
/// When any field is signed the symbols are read as signed integers of the
/// input word size; their magnitude is split and the sign moves onto the
/// first non-zero *signed* field, stored as a two's complement negation.
///
/// Fails when a symbol has bits outside every field, or when it is negative
/// and all of its signed fields are zero, since neither could be restored.
pub fn transform_merge_coding(
    values: DataBlock,
    fields: &[MergeField],
) -> GabacResult<Vec<DataBlock>> {
    let signed = fields.iter().any(|f| f.signed);
    let covered = fields.iter().fold(0u64, |acc, field| {
        acc | field.mask().checked_shl(field.shift.into()).unwrap_or(0)
    });
    let word_size = values.word_size();
    let mut subseqs = vec![DataBlock::with_capacity(values.len(), MERGE_WORD_SIZE); fields.len()];

    for (i, value) in values.iter().enumerate() {
        let (magnitude, mut sign_pending) = if signed {
            let signed_value = signed_value(value, word_size);
            (signed_value.unsigned_abs(), signed_value < 0)
        } else {
            (value, false)
        };
        if magnitude & !covered != 0 {
            return Err(GabacError::invalid_transform_input(format!(
                "symbol {} at position {} has bits outside the merge fields",
                value, i
            )));
        }

        for (field, subseq) in fields.iter().zip(subseqs.iter_mut()) {
            let part = (magnitude >> field.shift) & field.mask();
            if sign_pending && field.signed && part != 0 {
                subseq.push(part.wrapping_neg());
                sign_pending = false;
            } else {
                subseq.push(part);
            }
        }

        if sign_pending {
            return Err(GabacError::invalid_transform_input(format!(
                "negative symbol at position {} has no non-zero signed merge field",
                i
            )));
        }
    }

    Ok(subseqs)
}

pub fn inverse_transform_merge_coding(
    subseqs: Vec<DataBlock>,
    fields: &[MergeField],
) -> GabacResult<DataBlock> {
    if subseqs.len() != fields.len() {
        return Err(GabacError::invalid_transform_input(format!(
            "expected {} merged sub-sequences, got {}",
            fields.len(),
            subseqs.len()
        )));
    }
    let num_values = subseqs.first().map_or(0, DataBlock::len);
    if subseqs.iter().any(|s| s.len() != num_values) {
        return Err(GabacError::invalid_transform_input(
            "merged sub-sequences differ in length",
        ));
    }

    let mut values = DataBlock::with_capacity(num_values, MERGE_WORD_SIZE);
    for i in 0..num_values {
        let mut value = 0u64;
        let mut negative = false;
        for (field, subseq) in fields.iter().zip(subseqs.iter()) {
            let part = if field.signed {
                let signed_part = subseq.get_signed(i);
                negative |= signed_part < 0;
                signed_part.unsigned_abs()
            } else {
                subseq.get(i)
            };
            value |= (part & field.mask()) << field.shift;
        }

        values.push(if negative { value.wrapping_neg() } else { value });
    }

    Ok(values)
}
