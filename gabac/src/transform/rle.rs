use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};

/// Word size of the run length stream.
pub const RLE_LENGTH_WORD_SIZE: u8 = 1;

fn push_run_lengths(lengths: &mut DataBlock, run_length: u64, guard: u64, is_last: bool) {
    let mut remaining = run_length;
    while remaining > guard {
        lengths.push(guard);
        remaining -= guard;
    }

    // The end of the stream terminates the last run, so an exact multiple
    // of `guard` needs no closing entry there
    if is_last && remaining == guard {
        lengths.push(guard);
    } else {
        lengths.push(remaining - 1);
    }
}

/// Replaces runs of equal symbols with one raw value and a sequence of
/// length entries.
///
/// An entry equal to `guard` adds `guard` repetitions and continues the run;
/// an entry `k < guard` adds `k + 1` repetitions and closes it. Returns
/// `(lengths, raw_values)`.
///
/// # Panics
///
/// Panics if `guard` is 0.
#[must_use]
pub fn transform_rle_coding(values: DataBlock, guard: u8) -> (DataBlock, DataBlock) {
    assert!(guard > 0, "RLE guard must be at least 1");

    let mut lengths = DataBlock::new(0, RLE_LENGTH_WORD_SIZE);
    let mut raw_values = DataBlock::new(0, values.word_size());

    let num_values = values.len();
    let mut i = 0;
    while i < num_values {
        let value = values.get(i);
        let mut run_length = 1;
        while i + run_length < num_values && values.get(i + run_length) == value {
            run_length += 1;
        }

        raw_values.push(value);
        push_run_lengths(
            &mut lengths,
            run_length as u64,
            guard as u64,
            i + run_length == num_values,
        );
        i += run_length;
    }

    (lengths, raw_values)
}

pub fn inverse_transform_rle_coding(
    lengths: DataBlock,
    raw_values: DataBlock,
    guard: u8,
) -> GabacResult<DataBlock> {
    if guard == 0 {
        return Err(GabacError::invalid_config("RLE guard must be at least 1"));
    }
    let guard = guard as u64;

    let mut values = DataBlock::new(0, raw_values.word_size());
    let mut raw_values_iter = raw_values.iter();
    let mut current_run = None;

    for length in lengths.iter() {
        let value = match current_run {
            Some(value) => value,
            None => raw_values_iter.next().ok_or_else(|| {
                GabacError::invalid_transform_input("run lengths refer to missing raw values")
            })?,
        };
        if length > guard {
            return Err(GabacError::invalid_transform_input(format!(
                "run length entry {} exceeds guard {}",
                length, guard
            )));
        }

        let (repetitions, next_run) = if length == guard {
            (guard, Some(value))
        } else {
            (length + 1, None)
        };
        for _ in 0..repetitions {
            values.push(value);
        }
        current_run = next_run;
    }

    if raw_values_iter.next().is_some() {
        return Err(GabacError::invalid_transform_input(
            "raw values left over after run-length decoding",
        ));
    }
    Ok(values)
}
