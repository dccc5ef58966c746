//! Entropy coding of a single transformed sub-sequence.
//!
//! Every symbol is split into `output_symbol_size / coding_subsym_size`
//! sub-symbols, most significant first. Each sub-symbol is binarized and
//! coded with a context that depends on its position and, for coding orders
//! 1 and 2, on the previously coded sub-symbols.

use log::debug;

use crate::binarization::Binarizer;
use crate::config::{SubsymTransform, TransformedSubSeqConfig};
use crate::context_selector::{ContextSelector, Subsymbol};
use crate::data_block::{signed_value, word_size_for_bits, DataBlock};
use crate::error::{GabacError, GabacResult};
use crate::lut::SubsymbolLuts;
use crate::reader::CabacReader;
use crate::state_vars::StateVars;
use crate::writer::CabacWriter;

/// Word size of the symbols produced by [`decode_transformed_subseq`].
///
/// Signed binarizations produce negative numbers, which are always
/// sign-extended to 64 bits.
#[must_use]
pub fn decoded_word_size(config: &TransformedSubSeqConfig) -> u8 {
    if config.binarization_id().is_signed() {
        8
    } else {
        word_size_for_bits(config.support_values.output_symbol_size)
    }
}

#[inline]
fn low_bits_mask(num_bits: u8) -> u64 {
    if num_bits >= 64 {
        u64::MAX
    } else {
        (1 << num_bits) - 1
    }
}

fn check_dependencies(dependencies: Option<&DataBlock>, num_symbols: usize) -> GabacResult<()> {
    match dependencies {
        Some(dependencies) if dependencies.len() != num_symbols => Err(
            GabacError::dependency_size_mismatch(dependencies.len(), num_symbols),
        ),
        _ => Ok(()),
    }
}

/// Parameters shared by the encoder and the decoder of one sub-sequence.
#[derive(Debug)]
struct CodingSetup {
    state_vars: StateVars,
    binarizer: Binarizer,
    selector: ContextSelector,
    coding_order: u8,
    output_symbol_size: u8,
    coding_subsym_size: u8,
    subsym_mask: u64,
    signed: bool,
    diff_enabled: bool,
}

impl CodingSetup {
    fn new(config: &TransformedSubSeqConfig) -> GabacResult<Self> {
        config.validate()?;
        let state_vars = StateVars::new(config)?;
        let support = &config.support_values;

        Ok(Self {
            binarizer: Binarizer::new(config, &state_vars),
            selector: ContextSelector::new(&state_vars),
            coding_order: support.coding_order,
            output_symbol_size: support.output_symbol_size,
            coding_subsym_size: support.coding_subsym_size,
            subsym_mask: low_bits_mask(support.coding_subsym_size),
            signed: config.binarization_id().is_signed(),
            diff_enabled: config.transform_id_subsym == SubsymTransform::DiffCoding,
            state_vars,
        })
    }

    #[inline]
    fn num_subsyms(&self) -> usize {
        self.state_vars.num_subsyms() as usize
    }

    #[inline]
    fn lut_idx(&self, s: usize) -> usize {
        if self.state_vars.num_luts() > 1 {
            s
        } else {
            0
        }
    }

    #[inline]
    fn prv_idx(&self, s: usize) -> usize {
        if self.state_vars.num_prvs() > 1 {
            s
        } else {
            0
        }
    }

    /// Value actually split into sub-symbols: the magnitude for signed
    /// binarizations, the raw symbol otherwise.
    fn magnitude(&self, value: u64, word_size: u8) -> GabacResult<(u64, bool)> {
        let (magnitude, negative) = if self.signed {
            let signed = signed_value(value, word_size);
            (signed.unsigned_abs(), signed < 0)
        } else {
            (value, false)
        };

        let max_value = low_bits_mask(self.output_symbol_size);
        if magnitude > max_value {
            return Err(GabacError::value_out_of_range(magnitude, max_value));
        }
        Ok((magnitude, negative))
    }
}

/// Entropy codes `symbols` and returns the arithmetic-coded payload.
///
/// Coding stops early once the payload reaches `max_size` bytes; pass
/// `usize::MAX` to code every symbol. `dependencies`, when given, seeds the
/// most recent history value of every sub-symbol for coding orders above 0,
/// and must hold exactly one value per symbol.
pub fn encode_transformed_subseq(
    config: &TransformedSubSeqConfig,
    symbols: &DataBlock,
    dependencies: Option<&DataBlock>,
    max_size: usize,
) -> GabacResult<Vec<u8>> {
    if symbols.is_empty() {
        return Ok(Vec::new());
    }
    check_dependencies(dependencies, symbols.len())?;
    let setup = CodingSetup::new(config)?;
    let dependencies = dependencies.filter(|_| setup.coding_order > 0);

    let mut magnitudes = Vec::with_capacity(symbols.len());
    for value in symbols.iter() {
        magnitudes.push(setup.magnitude(value, symbols.word_size())?);
    }

    let context_params = &config.cabac_binarization.cabac_context_parameters;
    let mut writer = CabacWriter::new(
        setup.state_vars.num_ctx_total() as usize,
        &context_params.context_initialization_value,
        config.cabac_binarization.bypass_flag,
        context_params.adaptive_mode_flag,
    );

    let luts = if setup.state_vars.num_luts() > 0 {
        let mut luts = SubsymbolLuts::new(
            setup.state_vars.num_luts(),
            setup.coding_order,
            setup.coding_subsym_size,
        );
        let values: Vec<u64> = magnitudes.iter().map(|&(magnitude, _)| magnitude).collect();
        luts.build(
            &values,
            dependencies,
            setup.output_symbol_size,
            setup.state_vars.num_prvs(),
        );
        luts.encode(&mut writer)?;
        Some(luts)
    } else {
        None
    };

    let css = setup.coding_subsym_size;
    let mut subsymbols = vec![Subsymbol::default(); setup.num_subsyms()];
    let mut num_coded = 0;
    for (i, &(magnitude, negative)) in magnitudes.iter().enumerate() {
        if writer.len() >= max_size {
            break;
        }

        let dependency = dependencies.map(|d| d.get(i));
        let mut shift = setup.output_symbol_size;
        for s in 0..setup.num_subsyms() {
            shift -= css;
            let subsym_value = (magnitude >> shift) & setup.subsym_mask;
            subsymbols[s].subsym_idx = s as u8;
            subsymbols[s].subsym_value = subsym_value;

            if setup.coding_order == 0 {
                let ctx = setup.selector.context_idx_order_0(s as u8);
                let mut value_to_code = subsym_value;
                if setup.diff_enabled {
                    let previous = subsymbols[s].prv_values[0];
                    if subsym_value < previous {
                        return Err(GabacError::diff_not_monotonic(previous, subsym_value));
                    }
                    value_to_code = subsym_value - previous;
                    subsymbols[s].prv_values[0] = subsym_value;
                }
                setup.binarizer.write(&mut writer, value_to_code, ctx)?;
                continue;
            }

            let prv_idx = setup.prv_idx(s);
            if let Some(dependency) = dependency {
                subsymbols[prv_idx].prv_values[0] = (dependency >> shift) & setup.subsym_mask;
            }
            let ctx = setup.selector.context_idx_order_gt0(
                s as u8,
                prv_idx,
                &subsymbols,
                setup.coding_order,
            );

            match &luts {
                Some(luts) => {
                    let history = subsymbols[prv_idx].prv_values;
                    luts.transform(&mut subsymbols[s], setup.lut_idx(s), &history)?;
                    setup
                        .binarizer
                        .with_c_max(subsymbols[s].lut_num_max_elems)
                        .write(&mut writer, subsymbols[s].lut_entry_idx, ctx)?;
                }
                None => setup.binarizer.write(&mut writer, subsym_value, ctx)?,
            }

            subsymbols[prv_idx].push_previous(subsym_value, setup.coding_order);
        }

        if setup.signed && magnitude != 0 {
            writer.write_sign_flag(negative);
        }
        num_coded += 1;
    }

    let payload = writer.close();
    debug!(
        "Encoded {} of {} symbols (order {}, {}) into {} bytes",
        num_coded,
        symbols.len(),
        setup.coding_order,
        config.binarization_id(),
        payload.len()
    );
    Ok(payload)
}

/// Decodes `num_symbols` symbols from `payload`.
///
/// Returns the symbols, in blocks of [`decoded_word_size`], and the number
/// of payload bytes consumed.
pub fn decode_transformed_subseq(
    config: &TransformedSubSeqConfig,
    num_symbols: usize,
    payload: &[u8],
    dependencies: Option<&DataBlock>,
) -> GabacResult<(DataBlock, usize)> {
    let word_size = decoded_word_size(config);
    if num_symbols == 0 {
        return Ok((DataBlock::new(0, word_size), 0));
    }
    check_dependencies(dependencies, num_symbols)?;
    let setup = CodingSetup::new(config)?;
    let dependencies = dependencies.filter(|_| setup.coding_order > 0);

    let context_params = &config.cabac_binarization.cabac_context_parameters;
    let mut reader = CabacReader::new(
        payload,
        setup.state_vars.num_ctx_total() as usize,
        &context_params.context_initialization_value,
        config.cabac_binarization.bypass_flag,
        context_params.adaptive_mode_flag,
    )?;

    let luts = if setup.state_vars.num_luts() > 0 {
        Some(SubsymbolLuts::decode(
            &mut reader,
            setup.state_vars.num_luts(),
            setup.coding_order,
            setup.coding_subsym_size,
        )?)
    } else {
        None
    };

    let css = setup.coding_subsym_size;
    let mut subsymbols = vec![Subsymbol::default(); setup.num_subsyms()];
    let mut symbols = DataBlock::new(num_symbols, word_size);
    let mut stepper = symbols.stepper();
    while stepper.is_valid() {
        let dependency = dependencies.map(|d| d.get(stepper.position()));
        let mut shift = setup.output_symbol_size;
        let mut symbol_value = 0u64;

        for s in 0..setup.num_subsyms() {
            shift -= css;
            subsymbols[s].subsym_idx = s as u8;

            let subsym_value = if setup.coding_order == 0 {
                let ctx = setup.selector.context_idx_order_0(s as u8);
                let mut value = setup.binarizer.read(&mut reader, ctx)?;
                if setup.diff_enabled {
                    value = value.wrapping_add(subsymbols[s].prv_values[0]);
                    subsymbols[s].prv_values[0] = value;
                }
                value
            } else {
                let prv_idx = setup.prv_idx(s);
                if let Some(dependency) = dependency {
                    subsymbols[prv_idx].prv_values[0] = (dependency >> shift) & setup.subsym_mask;
                }
                let ctx = setup.selector.context_idx_order_gt0(
                    s as u8,
                    prv_idx,
                    &subsymbols,
                    setup.coding_order,
                );

                let value = match &luts {
                    Some(luts) => {
                        let history = subsymbols[prv_idx].prv_values;
                        let lut_idx = setup.lut_idx(s);
                        let num_max_elems = luts.row(lut_idx, &history).num_max_elems();
                        subsymbols[s].lut_num_max_elems = num_max_elems;
                        subsymbols[s].lut_entry_idx = setup
                            .binarizer
                            .with_c_max(num_max_elems)
                            .read(&mut reader, ctx)?;
                        luts.inverse_transform(&mut subsymbols[s], lut_idx, &history)?;
                        subsymbols[s].subsym_value
                    }
                    None => setup.binarizer.read(&mut reader, ctx)?,
                };

                subsymbols[prv_idx].push_previous(value, setup.coding_order);
                value
            };

            if subsym_value > setup.subsym_mask {
                return Err(GabacError::corrupt_payload(format!(
                    "sub-symbol value {} does not fit in {} bits",
                    subsym_value, css
                )));
            }
            subsymbols[s].subsym_value = subsym_value;
            symbol_value = if css >= 64 {
                subsym_value
            } else {
                (symbol_value << css) | subsym_value
            };
        }

        if setup.signed && symbol_value != 0 && reader.read_sign_flag()? {
            symbol_value = symbol_value.wrapping_neg();
        }
        stepper.set(symbol_value);
        stepper.inc();
    }

    let bytes_consumed = reader.close()?;
    debug!(
        "Decoded {} symbols (order {}, {}) from {} bytes",
        num_symbols,
        setup.coding_order,
        config.binarization_id(),
        bytes_consumed
    );
    Ok((symbols, bytes_consumed))
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    use crate::config::{
        Binarization, BinarizationId, BinarizationParameters, ContextParameters,
        SubsymTransform, SupportValues, TransformedSubSeqConfig,
    };
    use crate::data_block::DataBlock;
    use crate::error::GabacError;
    use crate::transformed_subseq::{
        decode_transformed_subseq, decoded_word_size, encode_transformed_subseq,
    };

    fn config(
        binarization_id: BinarizationId,
        support_values: SupportValues,
    ) -> TransformedSubSeqConfig {
        TransformedSubSeqConfig::new(
            support_values,
            Binarization::new(binarization_id).with_parameters(BinarizationParameters {
                c_max: 255,
                c_max_teg: 4,
                c_max_dtu: 3,
                split_unit_size: 3,
            }),
        )
    }

    fn random_symbols(num: usize, max: u64, word_size: u8) -> DataBlock {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1337);
        let values: Vec<u64> = (0..num).map(|_| rng.gen_range(0..=max)).collect();
        DataBlock::from_values(&values, word_size)
    }

    fn assert_round_trip(
        config: &TransformedSubSeqConfig,
        symbols: &DataBlock,
        dependencies: Option<&DataBlock>,
    ) -> usize {
        let payload = encode_transformed_subseq(config, symbols, dependencies, usize::MAX).unwrap();
        let (decoded, consumed) =
            decode_transformed_subseq(config, symbols.len(), &payload, dependencies).unwrap();

        assert_eq!(consumed, payload.len());
        assert_eq!(decoded.word_size(), decoded_word_size(config));
        assert_eq!(
            decoded.iter().collect::<Vec<_>>(),
            symbols.iter().collect::<Vec<_>>(),
            "{:?}",
            config
        );
        payload.len()
    }

    #[test_log::test]
    fn test_unsigned_binarizations_all_orders() {
        let symbols = random_symbols(300, 63, 1);
        let ids = [
            BinarizationId::Bi,
            BinarizationId::Tu,
            BinarizationId::Eg,
            BinarizationId::Teg,
            BinarizationId::Sutu,
            BinarizationId::Dtu,
        ];

        for id in ids {
            for order in 0..=2 {
                assert_round_trip(&config(id, SupportValues::new(6, 6, order)), &symbols, None);
            }
        }
    }

    #[test_log::test]
    fn test_sub_symbols() {
        let symbols = random_symbols(300, 0xFFFF, 2);
        for order in 0..=2 {
            assert_round_trip(
                &config(BinarizationId::Bi, SupportValues::new(16, 4, order)),
                &symbols,
                None,
            );
        }

        let mut shared = SupportValues::new(16, 4, 2);
        shared.share_subsym_prv_flag = true;
        let mut config = config(BinarizationId::Eg, shared);
        config.cabac_binarization.cabac_context_parameters = ContextParameters {
            share_subsym_ctx_flag: true,
            ..Default::default()
        };
        assert_round_trip(&config, &symbols, None);
    }

    #[test]
    fn test_signed_binarizations() {
        let values: Vec<u64> = [-100i64, 0, 5, -1, 127, -127, 3, 0, -3]
            .iter()
            .map(|&x| x as u64)
            .collect();
        let symbols = DataBlock::from_values(&values, 8);

        for id in [
            BinarizationId::Seg,
            BinarizationId::Steg,
            BinarizationId::Ssutu,
            BinarizationId::Sdtu,
        ] {
            assert_round_trip(&config(id, SupportValues::new(8, 8, 0)), &symbols, None);
            assert_round_trip(&config(id, SupportValues::new(8, 4, 1)), &symbols, None);
        }
    }

    #[test]
    fn test_signed_narrow_input_words() {
        let values = [0xFFu64, 0x80, 0x7F];
        let symbols = DataBlock::from_values(&values, 1);
        let config = config(BinarizationId::Seg, SupportValues::new(8, 8, 0));

        let payload = encode_transformed_subseq(&config, &symbols, None, usize::MAX).unwrap();
        let (decoded, _) = decode_transformed_subseq(&config, 3, &payload, None).unwrap();
        assert_eq!(
            decoded.iter().map(|x| x as i64).collect::<Vec<_>>(),
            vec![-1, -128, 127]
        );
    }

    #[test]
    fn test_bypass() {
        let symbols = random_symbols(500, u32::MAX as u64, 4);
        let config = TransformedSubSeqConfig::new(
            SupportValues::new(32, 32, 0),
            Binarization::new(BinarizationId::Eg).with_bypass(true),
        );
        assert_round_trip(&config, &symbols, None);
    }

    #[test_log::test]
    fn test_lut_transform() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1337);
        // Markov-like source so that LUT rows are skewed
        let mut values = vec![0u64];
        for _ in 0..1000 {
            let previous = *values.last().unwrap();
            let next = if rng.gen_range(0..10) < 8 {
                (previous * 3 + 1) % 16
            } else {
                rng.gen_range(0..16)
            };
            values.push(next);
        }
        let symbols = DataBlock::from_values(&values, 1);

        for order in [1, 2] {
            for id in [BinarizationId::Tu, BinarizationId::Eg, BinarizationId::Bi] {
                let mut support = SupportValues::new(8, 4, order);
                assert_round_trip(
                    &config(id, support).with_subsym_transform(SubsymTransform::LutTransform),
                    &symbols,
                    None,
                );

                support.share_subsym_lut_flag = true;
                support.share_subsym_prv_flag = true;
                assert_round_trip(
                    &config(id, support).with_subsym_transform(SubsymTransform::LutTransform),
                    &symbols,
                    None,
                );
            }
        }
    }

    #[test]
    fn test_diff_sub_symbols() {
        let symbols = DataBlock::from_values(&[1, 1, 4, 9, 9, 200, 255], 1);
        let config = config(BinarizationId::Eg, SupportValues::new(8, 8, 0))
            .with_subsym_transform(SubsymTransform::DiffCoding);
        assert_round_trip(&config, &symbols, None);

        let decreasing = DataBlock::from_values(&[5, 4], 1);
        assert!(matches!(
            encode_transformed_subseq(&config, &decreasing, None, usize::MAX),
            Err(GabacError::DiffNotMonotonic(5, 4))
        ));
    }

    #[test]
    fn test_dependencies() {
        let symbols = random_symbols(200, 255, 1);
        let dependencies = {
            let shifted: Vec<u64> = symbols.iter().map(|x| (x + 1) % 256).collect();
            DataBlock::from_values(&shifted, 1)
        };

        let config = config(BinarizationId::Tu, SupportValues::new(8, 8, 1));
        assert_round_trip(&config, &symbols, Some(&dependencies));
        assert_round_trip(
            &config
                .clone()
                .with_subsym_transform(SubsymTransform::LutTransform),
            &symbols,
            Some(&dependencies),
        );

        let short = DataBlock::from_values(&[1, 2], 1);
        assert!(matches!(
            encode_transformed_subseq(&config, &symbols, Some(&short), usize::MAX),
            Err(GabacError::DependencySizeMismatch(2, 200))
        ));
    }

    #[test]
    fn test_value_out_of_range() {
        let symbols = DataBlock::from_values(&[300], 2);
        let config = config(BinarizationId::Bi, SupportValues::new(8, 8, 0));
        assert!(matches!(
            encode_transformed_subseq(&config, &symbols, None, usize::MAX),
            Err(GabacError::ValueOutOfRange(300, 255))
        ));
    }

    #[test]
    fn test_max_size_stops_early() {
        let symbols = random_symbols(10_000, 255, 1);
        let config = TransformedSubSeqConfig::new(
            SupportValues::new(8, 8, 0),
            Binarization::new(BinarizationId::Bi).with_bypass(true),
        );

        let full = encode_transformed_subseq(&config, &symbols, None, usize::MAX).unwrap();
        let limited = encode_transformed_subseq(&config, &symbols, None, 100).unwrap();
        assert!(limited.len() < full.len());
        assert!(limited.len() <= 110);
    }

    #[test]
    fn test_empty() {
        let config = config(BinarizationId::Bi, SupportValues::new(8, 8, 0));
        assert!(
            encode_transformed_subseq(&config, &DataBlock::new(0, 1), None, usize::MAX)
                .unwrap()
                .is_empty()
        );

        let (decoded, consumed) = decode_transformed_subseq(&config, 0, &[], None).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(consumed, 0);
    }
}
