//! Reversible transforms of whole descriptor subsequences.
//!
//! A transform turns one sequence of symbols into a fixed number of derived
//! sub-sequences, each of which is entropy coded on its own.

use log::trace;

use crate::config::{SequenceTransform, TransformedSubSeqConfig};
use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};

pub mod diff;
pub mod equality;
pub mod match_coding;
pub mod merge;
pub mod rle;

pub use diff::{inverse_transform_diff_coding, transform_diff_coding};
pub use equality::{inverse_transform_equality_coding, transform_equality_coding};
pub use match_coding::{inverse_transform_match_coding, transform_match_coding};
pub use merge::{inverse_transform_merge_coding, transform_merge_coding, MergeField};
pub use rle::{inverse_transform_rle_coding, transform_rle_coding};

fn merge_fields(shifts: &[u8], configs: &[TransformedSubSeqConfig]) -> Vec<MergeField> {
    shifts
        .iter()
        .zip(configs)
        .map(|(&shift, config)| MergeField {
            shift,
            size: config.support_values.output_symbol_size,
            signed: config.binarization_id().is_signed(),
        })
        .collect()
}

fn into_array<const N: usize>(subseqs: Vec<DataBlock>) -> GabacResult<[DataBlock; N]> {
    subseqs.try_into().map_err(|subseqs: Vec<DataBlock>| {
        GabacError::invalid_transform_input(format!(
            "expected {} sub-sequences, got {}",
            N,
            subseqs.len()
        ))
    })
}

/// Applies `transform` to `values` and returns the derived sub-sequences.
///
/// `configs` are the configurations of the derived sub-sequences; only merge
/// coding looks at them, to find the field sizes and signedness.
pub fn transform_subseq(
    transform: &SequenceTransform,
    configs: &[TransformedSubSeqConfig],
    values: DataBlock,
) -> GabacResult<Vec<DataBlock>> {
    trace!("Applying {} to {} symbols", transform, values.len());

    let subseqs = match transform {
        SequenceTransform::NoTransform => vec![values],
        SequenceTransform::EqualityCoding => {
            let (flags, raw_values) = transform_equality_coding(values);
            vec![flags, raw_values]
        }
        SequenceTransform::MatchCoding {
            match_coding_buffer_size,
        } => {
            let (pointers, lengths, raw_values) =
                transform_match_coding(values, *match_coding_buffer_size);
            vec![pointers, lengths, raw_values]
        }
        SequenceTransform::RleCoding { rle_coding_guard } => {
            if *rle_coding_guard == 0 {
                return Err(GabacError::invalid_config("RLE guard must be at least 1"));
            }
            let (lengths, raw_values) = transform_rle_coding(values, *rle_coding_guard);
            vec![lengths, raw_values]
        }
        SequenceTransform::MergeCoding {
            merge_coding_shift_size,
        } => transform_merge_coding(values, &merge_fields(merge_coding_shift_size, configs))?,
    };

    Ok(subseqs)
}

/// Reassembles the original sequence from the derived sub-sequences.
pub fn inverse_transform_subseq(
    transform: &SequenceTransform,
    configs: &[TransformedSubSeqConfig],
    subseqs: Vec<DataBlock>,
) -> GabacResult<DataBlock> {
    let values = match transform {
        SequenceTransform::NoTransform => {
            let [values] = into_array(subseqs)?;
            values
        }
        SequenceTransform::EqualityCoding => {
            let [flags, raw_values] = into_array(subseqs)?;
            inverse_transform_equality_coding(flags, raw_values)?
        }
        SequenceTransform::MatchCoding { .. } => {
            let [pointers, lengths, raw_values] = into_array(subseqs)?;
            inverse_transform_match_coding(pointers, lengths, raw_values)?
        }
        SequenceTransform::RleCoding { rle_coding_guard } => {
            let [lengths, raw_values] = into_array(subseqs)?;
            inverse_transform_rle_coding(lengths, raw_values, *rle_coding_guard)?
        }
        SequenceTransform::MergeCoding {
            merge_coding_shift_size,
        } => inverse_transform_merge_coding(
            subseqs,
            &merge_fields(merge_coding_shift_size, configs),
        )?,
    };

    trace!("Inverse {} restored {} symbols", transform, values.len());
    Ok(values)
}

#[cfg(test)]
mod tests {
    use crate::config::{
        Binarization, BinarizationId, SequenceTransform, SupportValues, TransformedSubSeqConfig,
    };
    use crate::data_block::DataBlock;
    use crate::transform::{inverse_transform_subseq, transform_subseq};

    fn all_transforms() -> Vec<SequenceTransform> {
        vec![
            SequenceTransform::NoTransform,
            SequenceTransform::EqualityCoding,
            SequenceTransform::MatchCoding {
                match_coding_buffer_size: 16,
            },
            SequenceTransform::RleCoding {
                rle_coding_guard: 4,
            },
            SequenceTransform::MergeCoding {
                merge_coding_shift_size: vec![4, 0],
            },
        ]
    }

    fn configs(transform: &SequenceTransform) -> Vec<TransformedSubSeqConfig> {
        let config = TransformedSubSeqConfig::new(
            SupportValues::new(4, 4, 0),
            Binarization::new(BinarizationId::Seg),
        );
        vec![config; transform.num_derived_subseqs()]
    }

    #[test]
    fn test_void_input() {
        for transform in all_transforms() {
            let configs = configs(&transform);
            let subseqs = transform_subseq(&transform, &configs, DataBlock::new(0, 1)).unwrap();
            assert_eq!(subseqs.len(), transform.num_derived_subseqs());
            assert!(subseqs.iter().all(DataBlock::is_empty), "{}", transform);

            let values = inverse_transform_subseq(&transform, &configs, subseqs).unwrap();
            assert!(values.is_empty(), "{}", transform);
        }
    }

    #[test]
    fn test_round_trip_all_transforms() {
        let input = [3, 3, 3, 250, 7, 3, 3, 250, 7, 0, 0, 0, 0, 0, 12];
        let block = DataBlock::from_values(&input, 1);

        for transform in all_transforms() {
            let configs = configs(&transform);
            let subseqs = transform_subseq(&transform, &configs, block.clone()).unwrap();
            let values = inverse_transform_subseq(&transform, &configs, subseqs).unwrap();
            assert_eq!(
                values.with_word_size(1).iter().collect::<Vec<_>>(),
                input.to_vec(),
                "{}",
                transform
            );
        }
    }

    #[test]
    fn test_wrong_number_of_subseqs() {
        let result = inverse_transform_subseq(
            &SequenceTransform::EqualityCoding,
            &[],
            vec![DataBlock::new(0, 1)],
        );
        assert!(result.is_err());
    }
}
