use crate::data_block::DataBlock;

/// Replaces every symbol by its difference to the preceding symbol, with
/// wrapping arithmetic in the block's word width.
pub fn transform_diff_coding(values: &mut DataBlock) {
    let mut previous = 0u64;
    let mut stepper = values.stepper();
    while stepper.is_valid() {
        let value = stepper.get();
        stepper.set(value.wrapping_sub(previous));
        previous = value;
        stepper.inc();
    }
}

pub fn inverse_transform_diff_coding(values: &mut DataBlock) {
    let word_size = values.word_size();
    let mask = if word_size == 8 {
        u64::MAX
    } else {
        (1 << (word_size as u32 * 8)) - 1
    };

    let mut previous = 0u64;
    let mut stepper = values.stepper();
    while stepper.is_valid() {
        previous = previous.wrapping_add(stepper.get()) & mask;
        stepper.set(previous);
        stepper.inc();
    }
}
