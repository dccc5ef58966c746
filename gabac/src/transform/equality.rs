use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};

/// Splits `values` into equality flags (`1` when a symbol repeats its
/// predecessor) and the remaining raw values.
///
/// A raw value greater than its predecessor is stored decremented by one,
/// since it can never be equal to it.
#[must_use]
pub fn transform_equality_coding(values: DataBlock) -> (DataBlock, DataBlock) {
    let mut flags = DataBlock::with_capacity(values.len(), 1);
    let mut raw_values = DataBlock::new(0, values.word_size());

    let mut previous = 0;
    for value in values.iter() {
        if value == previous {
            flags.push(1);
        } else {
            flags.push(0);
            raw_values.push(if value > previous { value - 1 } else { value });
            previous = value;
        }
    }

    (flags, raw_values)
}

pub fn inverse_transform_equality_coding(
    flags: DataBlock,
    raw_values: DataBlock,
) -> GabacResult<DataBlock> {
    let mut values = DataBlock::with_capacity(flags.len(), raw_values.word_size());
    let mut raw_values_iter = raw_values.iter();

    let mut previous = 0u64;
    for flag in flags.iter() {
        if flag == 0 {
            let raw_value = raw_values_iter.next().ok_or_else(|| {
                GabacError::invalid_transform_input("equality flags refer to missing raw values")
            })?;
            previous = if raw_value >= previous {
                raw_value.wrapping_add(1)
            } else {
                raw_value
            };
        }
        values.push(previous);
    }

    if raw_values_iter.next().is_some() {
        return Err(GabacError::invalid_transform_input(
            "raw values left over after equality decoding",
        ));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use crate::data_block::DataBlock;
    use crate::transform::equality::{
        inverse_transform_equality_coding, transform_equality_coding,
    };

    #[test]
    fn test_example() {
        let input = [
            -3438430427565543845i64,
            -3438430427565543845,
            8686590606261860295,
            810438489069303389,
            810438489069303389,
            810438489069303389,
            0,
        ]
        .map(|x| x as u64);
        let block = DataBlock::from_values(&input, 8);

        let (flags, raw_values) = transform_equality_coding(block.clone());
        assert_eq!(flags.iter().collect::<Vec<_>>(), vec![0, 1, 0, 0, 1, 1, 0]);
        assert_eq!(
            raw_values.iter().collect::<Vec<_>>(),
            vec![
                (-3438430427565543845i64 - 1) as u64,
                8686590606261860295,
                810438489069303389,
                0
            ]
        );

        let decoded = inverse_transform_equality_coding(flags, raw_values).unwrap();
        assert_eq!(decoded, block);
    }

    #[test]
    fn test_small_words() {
        let block = DataBlock::from_values(&[0, 0, 255, 254, 254, 1, 0], 1);
        let (flags, raw_values) = transform_equality_coding(block.clone());
        assert_eq!(flags.word_size(), 1);
        assert_eq!(raw_values.word_size(), 1);
        assert_eq!(raw_values.iter().collect::<Vec<_>>(), vec![254, 254, 1, 0]);

        assert_eq!(
            inverse_transform_equality_coding(flags, raw_values).unwrap(),
            block
        );
    }

    #[test]
    fn test_missing_raw_values() {
        let flags = DataBlock::from_values(&[0, 0], 1);
        let raw_values = DataBlock::from_values(&[5], 2);
        assert!(inverse_transform_equality_coding(flags, raw_values).is_err());
    }
}
