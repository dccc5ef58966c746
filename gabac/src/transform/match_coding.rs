use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};

/// Word size of the pointer and length streams.
pub const MATCH_WORD_SIZE: u8 = 4;

/// Shortest match emitted as a pointer/length pair.
const MIN_MATCH_LENGTH: usize = 2;

/// Replaces repeated runs of symbols with back-references into a sliding
/// window of `window_size` preceding symbols.
///
/// Returns `(pointers, lengths, raw_values)`. Every length of `0` stands for
/// one literal taken from `raw_values`; any other length comes with a
/// pointer holding the backward distance of the match. The window is
/// scanned from its oldest position, and a later position replaces an
/// earlier one on equal length, so ties go to the nearest match.
#[must_use]
pub fn transform_match_coding(
    values: DataBlock,
    window_size: u16,
) -> (DataBlock, DataBlock, DataBlock) {
    let mut pointers = DataBlock::new(0, MATCH_WORD_SIZE);
    let mut lengths = DataBlock::new(0, MATCH_WORD_SIZE);
    let mut raw_values = DataBlock::new(0, values.word_size());

    let max_length = u32::MAX as usize;
    let num_values = values.len();
    let mut i = 0;
    while i < num_values {
        let mut best_length = 0;
        let mut best_pointer = 0;

        for w in i.saturating_sub(window_size as usize)..i {
            let mut length = 0;
            while i + length < num_values
                && length < max_length
                && values.get(w + length) == values.get(i + length)
            {
                length += 1;
            }
            if length >= best_length {
                best_length = length;
                best_pointer = i - w;
            }
        }

        if best_length < MIN_MATCH_LENGTH {
            lengths.push(0);
            raw_values.push(values.get(i));
            i += 1;
        } else {
            pointers.push(best_pointer as u64);
            lengths.push(best_length as u64);
            i += best_length;
        }
    }

    (pointers, lengths, raw_values)
}

pub fn inverse_transform_match_coding(
    pointers: DataBlock,
    lengths: DataBlock,
    raw_values: DataBlock,
) -> GabacResult<DataBlock> {
    let mut values = DataBlock::with_capacity(lengths.len(), raw_values.word_size());
    let mut pointers_iter = pointers.iter();
    let mut raw_values_iter = raw_values.iter();

    for length in lengths.iter() {
        if length == 0 {
            let raw_value = raw_values_iter.next().ok_or_else(|| {
                GabacError::invalid_transform_input("match lengths refer to missing raw values")
            })?;
            values.push(raw_value);
            continue;
        }

        let pointer = pointers_iter.next().ok_or_else(|| {
            GabacError::invalid_transform_input("match lengths refer to missing pointers")
        })? as usize;
        if pointer == 0 || pointer > values.len() {
            return Err(GabacError::invalid_transform_input(format!(
                "match pointer {} outside of {} decoded symbols",
                pointer,
                values.len()
            )));
        }
        for _ in 0..length {
            let value = values.get(values.len() - pointer);
            values.push(value);
        }
    }

    if pointers_iter.next().is_some() || raw_values_iter.next().is_some() {
        return Err(GabacError::invalid_transform_input(
            "pointers or raw values left over after match decoding",
        ));
    }
    Ok(values)
}
