use std::io::Write;

use gabac::config::{
    Binarization, BinarizationId, BinarizationParameters, SequenceTransform, SupportValues,
    TransformedSubSeqConfig,
};
use gabac::SubsequenceConfig;

use crate::cli::TemplateTransform;

fn subseq(
    binarization_id: BinarizationId,
    output_symbol_size: u8,
    coding_order: u8,
) -> TransformedSubSeqConfig {
    TransformedSubSeqConfig::new(
        SupportValues::new(output_symbol_size, output_symbol_size.min(8), coding_order),
        Binarization::new(binarization_id).with_parameters(BinarizationParameters {
            c_max: 0,
            c_max_teg: 2,
            c_max_dtu: 0,
            split_unit_size: 0,
        }),
    )
}

#[must_use]
pub fn template(transform: TemplateTransform) -> SubsequenceConfig {
    let (transform, cfgs) = match transform {
        TemplateTransform::NoTransform => (
            SequenceTransform::NoTransform,
            vec![subseq(BinarizationId::Teg, 8, 1)],
        ),
        TemplateTransform::Equality => (
            SequenceTransform::EqualityCoding,
            vec![
                subseq(BinarizationId::Bi, 1, 1),
                subseq(BinarizationId::Teg, 8, 1),
            ],
        ),
        TemplateTransform::Match => (
            SequenceTransform::MatchCoding {
                match_coding_buffer_size: 32,
            },
            vec![
                subseq(BinarizationId::Eg, 8, 0),
                subseq(BinarizationId::Eg, 32, 0),
                subseq(BinarizationId::Teg, 8, 1),
            ],
        ),
        TemplateTransform::Rle => (
            SequenceTransform::RleCoding {
                rle_coding_guard: 255,
            },
            vec![
                subseq(BinarizationId::Teg, 8, 0),
                subseq(BinarizationId::Teg, 8, 1),
            ],
        ),
        TemplateTransform::Merge => (
            SequenceTransform::MergeCoding {
                merge_coding_shift_size: vec![8, 0],
            },
            vec![
                subseq(BinarizationId::Teg, 8, 0),
                subseq(BinarizationId::Teg, 8, 0),
            ],
        ),
    };

    SubsequenceConfig::new(transform, cfgs)
}

pub fn config_template<W: Write>(
    mut writer: W,
    transform: TemplateTransform,
) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, &template(transform))?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use gabac::SubsequenceConfig;

    use crate::cli::TemplateTransform;
    use crate::cmd::config_template::{config_template, template};

    #[test]
    fn test_templates_are_valid() {
        for transform in [
            TemplateTransform::NoTransform,
            TemplateTransform::Equality,
            TemplateTransform::Match,
            TemplateTransform::Rle,
            TemplateTransform::Merge,
        ] {
            let mut buf = Vec::new();
            config_template(&mut buf, transform).unwrap();

            let config = SubsequenceConfig::from_reader(buf.as_slice()).unwrap();
            assert_eq!(config, template(transform));
        }
    }
}
