use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::config::{
    Binarization, BinarizationId, BinarizationParameters, SequenceTransform, SubsequenceConfig,
    SupportValues, TransformedSubSeqConfig,
};
use crate::data_block::DataBlock;

pub const TEST_SEED: u64 = 1337;
pub const TEST_DATA_LEN: usize = 4096;

fn rng() -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(TEST_SEED)
}

lazy_static! {
    /// Uniformly distributed bytes.
    pub static ref RANDOM_BYTES: DataBlock = {
        let mut rng = rng();
        let values: Vec<u64> = (0..TEST_DATA_LEN).map(|_| rng.gen_range(0..256)).collect();
        DataBlock::from_values(&values, 1)
    };

    /// Small values with a roughly geometric distribution, as produced by
    /// typical genomic descriptors (mismatch counts, positions deltas).
    pub static ref SKEWED_BYTES: DataBlock = {
        let mut rng = rng();
        let values: Vec<u64> = (0..TEST_DATA_LEN)
            .map(|_| {
                let mut value = 0;
                while value < 255 && rng.gen_bool(0.6) {
                    value += 1;
                }
                value
            })
            .collect();
        DataBlock::from_values(&values, 1)
    };

    /// Long runs of repeated 16-bit values.
    pub static ref RUNS: DataBlock = {
        let mut rng = rng();
        let mut values = Vec::with_capacity(TEST_DATA_LEN);
        while values.len() < TEST_DATA_LEN {
            let value = rng.gen_range(0..1024u64);
            let run = rng.gen_range(1..40);
            values.extend(std::iter::repeat(value).take(run));
        }
        values.truncate(TEST_DATA_LEN);
        DataBlock::from_values(&values, 2)
    };

    /// Text-like 8-bit data with repeated phrases, for match coding.
    pub static ref REPETITIVE_BYTES: DataBlock = {
        const PHRASES: [&[u8]; 4] = [b"ACGTTGCA", b"GATTACA", b"TTTT", b"CCGGA"];
        let mut rng = rng();
        let mut values = Vec::with_capacity(TEST_DATA_LEN);
        while values.len() < TEST_DATA_LEN {
            let phrase = PHRASES[rng.gen_range(0..PHRASES.len())];
            values.extend(phrase.iter().map(|&b| b as u64));
        }
        values.truncate(TEST_DATA_LEN);
        DataBlock::from_values(&values, 1)
    };

    /// Signed 32-bit values centered around zero.
    pub static ref SIGNED_WORDS: DataBlock = {
        let mut rng = rng();
        let values: Vec<u64> = (0..TEST_DATA_LEN)
            .map(|_| rng.gen_range(-3000i64..3000) as u64)
            .collect();
        DataBlock::from_values(&values, 4)
    };
}

/// A single-sub-sequence configuration coding 8-bit symbols.
#[must_use]
pub fn byte_config(binarization_id: BinarizationId, coding_order: u8) -> SubsequenceConfig {
    SubsequenceConfig::new(
        SequenceTransform::NoTransform,
        vec![TransformedSubSeqConfig::new(
            SupportValues::new(8, 8, coding_order),
            Binarization::new(binarization_id).with_parameters(BinarizationParameters {
                c_max: 255,
                c_max_teg: 2,
                c_max_dtu: 2,
                split_unit_size: 4,
            }),
        )],
    )
}
