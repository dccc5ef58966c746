use gabac::_internal_test_data::{
    byte_config, RANDOM_BYTES, REPETITIVE_BYTES, RUNS, SIGNED_WORDS, SKEWED_BYTES,
};
use gabac::config::{
    Binarization, BinarizationId, BinarizationParameters, SequenceTransform, SubsymTransform,
    SupportValues, TransformedSubSeqConfig,
};
use gabac::{
    decode_descriptor_subsequence, encode_descriptor_subsequence, DataBlock, SubsequenceConfig,
};

fn round_trip(config: &SubsequenceConfig, symbols: &DataBlock) -> usize {
    let bitstream = encode_descriptor_subsequence(config, symbols.clone(), None).unwrap();
    let (decoded, consumed) = decode_descriptor_subsequence(config, &bitstream, None).unwrap();

    assert_eq!(consumed, bitstream.len());
    assert_eq!(decoded.len(), symbols.len());
    assert!(
        decoded.iter().eq(symbols.iter()),
        "round trip failed for {:?}",
        config
    );
    bitstream.len()
}

fn subseq_config(
    binarization_id: BinarizationId,
    output_symbol_size: u8,
    coding_subsym_size: u8,
    coding_order: u8,
) -> TransformedSubSeqConfig {
    TransformedSubSeqConfig::new(
        SupportValues::new(output_symbol_size, coding_subsym_size, coding_order),
        Binarization::new(binarization_id).with_parameters(BinarizationParameters {
            c_max: 255,
            c_max_teg: 3,
            c_max_dtu: 2,
            split_unit_size: 4,
        }),
    )
}

#[test_log::test]
fn test_unsigned_binarizations_compress_skewed_data() {
    for binarization_id in [
        BinarizationId::Bi,
        BinarizationId::Tu,
        BinarizationId::Eg,
        BinarizationId::Teg,
        BinarizationId::Sutu,
        BinarizationId::Dtu,
    ] {
        for coding_order in [0, 1] {
            let config = byte_config(binarization_id, coding_order);
            let size = round_trip(&config, &SKEWED_BYTES);
            if binarization_id != BinarizationId::Bi {
                assert!(
                    size < SKEWED_BYTES.len() * 3 / 4,
                    "{} order {}: {} bytes",
                    binarization_id,
                    coding_order,
                    size
                );
            }
        }
    }
}

#[test]
fn test_random_bytes_bypass() {
    let config = SubsequenceConfig::new(
        SequenceTransform::NoTransform,
        vec![TransformedSubSeqConfig::new(
            SupportValues::new(8, 8, 0),
            Binarization::new(BinarizationId::Bi).with_bypass(true),
        )],
    );

    let size = round_trip(&config, &RANDOM_BYTES);
    assert!(size <= RANDOM_BYTES.len() + 16);
}

#[test]
fn test_order_2_with_luts() {
    let config = SubsequenceConfig::new(
        SequenceTransform::NoTransform,
        vec![subseq_config(BinarizationId::Tu, 8, 4, 2)
            .with_subsym_transform(SubsymTransform::LutTransform)],
    );
    round_trip(&config, &REPETITIVE_BYTES);
}

#[test_log::test]
fn test_equality_coding() {
    let config = SubsequenceConfig::new(
        SequenceTransform::EqualityCoding,
        vec![
            subseq_config(BinarizationId::Bi, 1, 1, 1),
            subseq_config(BinarizationId::Eg, 16, 8, 1),
        ],
    );

    let size = round_trip(&config, &RUNS);
    assert!(size < RUNS.raw_len() / 4);
}

#[test]
fn test_match_coding() {
    let config = SubsequenceConfig::new(
        SequenceTransform::MatchCoding {
            match_coding_buffer_size: 64,
        },
        vec![
            subseq_config(BinarizationId::Eg, 32, 32, 0),
            subseq_config(BinarizationId::Eg, 32, 32, 0),
            subseq_config(BinarizationId::Tu, 8, 8, 1),
        ],
    );

    let size = round_trip(&config, &REPETITIVE_BYTES);
    assert!(size < REPETITIVE_BYTES.len() / 2);
}

#[test]
fn test_rle_coding() {
    for rle_coding_guard in [1, 16, 255] {
        let config = SubsequenceConfig::new(
            SequenceTransform::RleCoding { rle_coding_guard },
            vec![
                subseq_config(BinarizationId::Teg, 8, 8, 0),
                subseq_config(BinarizationId::Eg, 16, 16, 0),
            ],
        );
        round_trip(&config, &RUNS);
    }
}

#[test]
fn test_merge_coding_signed() {
    let config = SubsequenceConfig::new(
        SequenceTransform::MergeCoding {
            merge_coding_shift_size: vec![8, 0],
        },
        vec![
            subseq_config(BinarizationId::Seg, 8, 8, 0),
            subseq_config(BinarizationId::Ssutu, 8, 8, 0),
        ],
    );

    let bitstream = encode_descriptor_subsequence(&config, SIGNED_WORDS.clone(), None).unwrap();
    let (decoded, _) = decode_descriptor_subsequence(&config, &bitstream, None).unwrap();

    assert_eq!(decoded.word_size(), 8);
    let expected: Vec<i64> = (0..SIGNED_WORDS.len())
        .map(|i| SIGNED_WORDS.get_signed(i))
        .collect();
    let actual: Vec<i64> = (0..decoded.len()).map(|i| decoded.get_signed(i)).collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_merge_coding_mixed_signedness() {
    let config = SubsequenceConfig::new(
        SequenceTransform::MergeCoding {
            merge_coding_shift_size: vec![8, 0],
        },
        vec![
            subseq_config(BinarizationId::Bi, 8, 8, 0),
            subseq_config(BinarizationId::Seg, 8, 8, 0),
        ],
    );
    let input = [-0x0101i64, 0x0203, -0x7F, 0x7F00 + 1].map(|x| x as u64);
    let symbols = DataBlock::from_values(&input, 2);

    let bitstream = encode_descriptor_subsequence(&config, symbols, None).unwrap();
    let (decoded, _) = decode_descriptor_subsequence(&config, &bitstream, None).unwrap();

    let actual: Vec<i64> = (0..decoded.len()).map(|i| decoded.get_signed(i)).collect();
    assert_eq!(actual, vec![-0x0101, 0x0203, -0x7F, 0x7F01]);
}

#[test]
fn test_token_type_json_config() {
    let config = SubsequenceConfig::from_json(
        r#"{
            "token_type": true,
            "transform_subseq_parameters": { "transform_id_subseq": "equality_coding" },
            "transform_subseq_cfgs": [
                {
                    "support_values": { "output_symbol_size": 1, "coding_subsym_size": 1, "coding_order": 1 },
                    "cabac_binarization": { "binarization_id": "BI" }
                },
                {
                    "transform_id_subsym": "diff_coding",
                    "support_values": { "output_symbol_size": 8, "coding_subsym_size": 8, "coding_order": 0 },
                    "cabac_binarization": { "binarization_id": "EG" }
                }
            ]
        }"#,
    )
    .unwrap();

    let values: Vec<u64> = (0..300).map(|x| x / 3).collect();
    round_trip(&config, &DataBlock::from_values(&values, 1));
}
