//! Framing of a whole descriptor subsequence.
//!
//! ```text
//! [payload_size: u32]
//! [num_symbols: u32, or U7 for token-type subsequences]
//! for each derived sub-sequence i of N:
//!     [segment_size: u32]              if i < N - 1
//!     [num_transformed_symbols: u32]   if N > 1 and the segment is not empty
//!     [CABAC payload]
//! ```
//!
//! All integers are big-endian. The size of the last segment is implied by
//! the payload size. An empty derived sub-sequence takes an empty segment.

use std::io::{Cursor, ErrorKind, Read, Write};

use byteorder::{BigEndian, ByteOrder};
use itertools::Itertools;
use log::trace;

use crate::config::{SequenceTransform, SubsequenceConfig};
use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};
use crate::stream_handler::{
    read_stream, read_u7, read_uint, write_bytes, write_stream, write_u7, write_uint, SizedStream,
};
use crate::transform::{inverse_transform_subseq, transform_subseq};
use crate::transformed_subseq::{
    decode_transformed_subseq, decoded_word_size, encode_transformed_subseq,
};

const SIZE_FIELD_LENGTH: usize = 4;

fn check_dependency_transform(
    config: &SubsequenceConfig,
    dependencies: Option<&DataBlock>,
) -> GabacResult<()> {
    let transform = &config.transform_subseq_parameters;
    if dependencies.is_some() && *transform != SequenceTransform::NoTransform {
        return Err(GabacError::invalid_config(format!(
            "dependency streams cannot be combined with {}",
            transform
        )));
    }
    Ok(())
}

fn write_num_symbols<W: Write>(
    writer: &mut W,
    token_type: bool,
    num_symbols: usize,
) -> GabacResult<usize> {
    if token_type {
        write_u7(writer, num_symbols as u64)
    } else {
        write_uint(writer, num_symbols as u64, SIZE_FIELD_LENGTH)
    }
}

/// Encodes `symbols` as one descriptor subsequence.
///
/// `dependencies` holds one value per symbol and can only be used with
/// [`SequenceTransform::NoTransform`].
pub fn encode_descriptor_subsequence(
    config: &SubsequenceConfig,
    symbols: DataBlock,
    dependencies: Option<&DataBlock>,
) -> GabacResult<Vec<u8>> {
    config.validate()?;
    check_dependency_transform(config, dependencies)?;

    let num_symbols = symbols.len();
    let mut bitstream = vec![0; SIZE_FIELD_LENGTH];
    write_num_symbols(&mut bitstream, config.token_type, num_symbols)?;

    if num_symbols > 0 {
        let derived = transform_subseq(
            &config.transform_subseq_parameters,
            &config.transform_subseq_cfgs,
            symbols,
        )?;
        let num_derived = derived.len();

        for (i, (subseq, subseq_config)) in derived
            .iter()
            .zip_eq(&config.transform_subseq_cfgs)
            .enumerate()
        {
            let payload = if subseq.is_empty() {
                Vec::new()
            } else {
                encode_transformed_subseq(subseq_config, subseq, dependencies, usize::MAX)?
            };

            let segment = SizedStream {
                num_symbols: subseq.len() as u64,
                data: payload,
            };
            let written = if i < num_derived - 1 {
                write_stream(&mut bitstream, &segment)?
            } else {
                write_last_segment(&mut bitstream, &segment, num_derived)?
            };

            trace!(
                "Derived sub-sequence {}/{}: {} symbols, {} bytes",
                i + 1,
                num_derived,
                segment.num_symbols,
                written
            );
        }
    }

    let payload_size = bitstream.len() - SIZE_FIELD_LENGTH;
    if payload_size > u32::MAX as usize {
        return Err(GabacError::value_out_of_range(
            payload_size as u64,
            u32::MAX as u64,
        ));
    }
    BigEndian::write_u32(&mut bitstream[..SIZE_FIELD_LENGTH], payload_size as u32);

    Ok(bitstream)
}

/// The last segment has no size field; its symbol count is only written
/// when there are several derived sub-sequences.
fn write_last_segment<W: Write>(
    writer: &mut W,
    segment: &SizedStream,
    num_derived: usize,
) -> GabacResult<usize> {
    let mut written = 0;
    if num_derived > 1 && segment.num_symbols > 0 {
        written += write_uint(writer, segment.num_symbols, SIZE_FIELD_LENGTH)?;
    }
    written += write_bytes(writer, &segment.data)?;
    Ok(written)
}

fn read_last_segment(
    cursor: &mut Cursor<&[u8]>,
    num_derived: usize,
    num_symbols: usize,
) -> GabacResult<SizedStream> {
    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    if remaining == 0 {
        return Ok(SizedStream::default());
    }

    let num_symbols = if num_derived > 1 {
        if remaining < SIZE_FIELD_LENGTH {
            return Err(GabacError::corrupt_payload(format!(
                "segment of {} bytes cannot hold a symbol count",
                remaining
            )));
        }
        read_uint(cursor, SIZE_FIELD_LENGTH)?
    } else {
        num_symbols as u64
    };
    let mut data = Vec::new();
    cursor.read_to_end(&mut data)?;

    Ok(SizedStream { num_symbols, data })
}

fn truncated_at(error: GabacError, position: usize) -> GabacError {
    match error {
        GabacError::IoError(e) if e.kind() == ErrorKind::UnexpectedEof => {
            GabacError::unexpected_end_of_stream(position)
        }
        e => e,
    }
}

fn read_size(cursor: &mut Cursor<&[u8]>, offset: usize) -> GabacResult<usize> {
    let position = offset + cursor.position() as usize;
    read_uint(cursor, SIZE_FIELD_LENGTH)
        .map(|value| value as usize)
        .map_err(|e| truncated_at(e, position))
}

/// Decodes one descriptor subsequence from the start of `bitstream`.
///
/// Returns the symbols and the number of bytes consumed.
pub fn decode_descriptor_subsequence(
    config: &SubsequenceConfig,
    bitstream: &[u8],
    dependencies: Option<&DataBlock>,
) -> GabacResult<(DataBlock, usize)> {
    config.validate()?;
    check_dependency_transform(config, dependencies)?;

    let payload_size = read_size(&mut Cursor::new(bitstream), 0)?;
    let total_size = SIZE_FIELD_LENGTH + payload_size;
    if bitstream.len() < total_size {
        return Err(GabacError::unexpected_end_of_stream(bitstream.len()));
    }

    let payload = &bitstream[SIZE_FIELD_LENGTH..total_size];
    let mut cursor = Cursor::new(payload);
    let num_symbols = if config.token_type {
        read_u7(&mut cursor).map_err(|e| truncated_at(e, SIZE_FIELD_LENGTH))? as usize
    } else {
        read_size(&mut cursor, SIZE_FIELD_LENGTH)?
    };

    let num_derived = config.transform_subseq_cfgs.len();
    let mut derived = Vec::with_capacity(num_derived);
    for (i, subseq_config) in config.transform_subseq_cfgs.iter().enumerate() {
        let segment_start = SIZE_FIELD_LENGTH + cursor.position() as usize;
        let segment = if num_symbols == 0 {
            SizedStream::default()
        } else if i < num_derived - 1 {
            read_stream(&mut cursor).map_err(|e| truncated_at(e, segment_start))?
        } else {
            read_last_segment(&mut cursor, num_derived, num_symbols)?
        };
        if segment.num_symbols == 0 && segment.data.is_empty() {
            derived.push(DataBlock::new(0, decoded_word_size(subseq_config)));
            continue;
        }

        let num_subseq_symbols = segment.num_symbols as usize;
        let coded = segment.data.as_slice();
        let (subseq, consumed) =
            decode_transformed_subseq(subseq_config, num_subseq_symbols, coded, dependencies)?;
        if consumed != coded.len() {
            return Err(GabacError::corrupt_payload(format!(
                "sub-sequence {} used {} of {} payload bytes",
                i,
                consumed,
                coded.len()
            )));
        }

        trace!(
            "Derived sub-sequence {}/{}: {} symbols, {} bytes",
            i + 1,
            num_derived,
            num_subseq_symbols,
            coded.len()
        );
        derived.push(subseq);
    }

    if (cursor.position() as usize) != payload.len() {
        return Err(GabacError::corrupt_payload(format!(
            "{} trailing bytes after the last segment",
            payload.len() - cursor.position() as usize
        )));
    }

    let symbols = inverse_transform_subseq(
        &config.transform_subseq_parameters,
        &config.transform_subseq_cfgs,
        derived,
    )?;
    if symbols.len() != num_symbols {
        return Err(GabacError::corrupt_payload(format!(
            "decoded {} symbols, but {} were announced",
            symbols.len(),
            num_symbols
        )));
    }

    Ok((symbols, total_size))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::config::{
        Binarization, BinarizationId, SequenceTransform, SubsequenceConfig, SupportValues,
        TransformedSubSeqConfig,
    };
    use crate::data_block::DataBlock;
    use crate::descriptor::{decode_descriptor_subsequence, encode_descriptor_subsequence};
    use crate::error::GabacError;
    use crate::stream_handler::read_stream;

    fn eg_config(transform: SequenceTransform) -> SubsequenceConfig {
        let num_derived = transform.num_derived_subseqs();
        SubsequenceConfig::new(
            transform,
            vec![
                TransformedSubSeqConfig::new(
                    SupportValues::new(8, 8, 0),
                    Binarization::new(BinarizationId::Eg),
                );
                num_derived
            ],
        )
    }

    #[test]
    fn test_header_layout() {
        let config = eg_config(SequenceTransform::NoTransform);
        let bitstream =
            encode_descriptor_subsequence(&config, DataBlock::from_values(&[1, 2, 3], 1), None)
                .unwrap();

        assert_eq!(
            bitstream[..4],
            ((bitstream.len() - 4) as u32).to_be_bytes()
        );
        assert_eq!(bitstream[4..8], [0, 0, 0, 3]);

        let (symbols, consumed) = decode_descriptor_subsequence(&config, &bitstream, None).unwrap();
        assert_eq!(consumed, bitstream.len());
        assert_eq!(symbols.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_subsequence() {
        let config = eg_config(SequenceTransform::EqualityCoding);
        let bitstream =
            encode_descriptor_subsequence(&config, DataBlock::new(0, 1), None).unwrap();
        assert_eq!(bitstream, vec![0, 0, 0, 4, 0, 0, 0, 0]);

        let (symbols, consumed) = decode_descriptor_subsequence(&config, &bitstream, None).unwrap();
        assert!(symbols.is_empty());
        assert_eq!(consumed, 8);
    }

    #[test]
    fn test_token_type_count() {
        let config = eg_config(SequenceTransform::NoTransform).with_token_type(true);
        let values: Vec<u64> = (0..200).map(|x| x % 7).collect();
        let bitstream =
            encode_descriptor_subsequence(&config, DataBlock::from_values(&values, 1), None)
                .unwrap();
        assert_eq!(bitstream[4..6], [0x81, 0x48]);

        let (symbols, _) = decode_descriptor_subsequence(&config, &bitstream, None).unwrap();
        assert_eq!(symbols.iter().collect::<Vec<_>>(), values);
    }

    #[test]
    fn test_empty_derived_segment() {
        // all values equal to their predecessor: no raw values except the first
        let config = eg_config(SequenceTransform::EqualityCoding);
        let bitstream =
            encode_descriptor_subsequence(&config, DataBlock::from_values(&[0, 0, 0], 1), None)
                .unwrap();

        let (symbols, _) = decode_descriptor_subsequence(&config, &bitstream, None).unwrap();
        assert_eq!(symbols.iter().collect::<Vec<_>>(), vec![0, 0, 0]);
    }

    #[test]
    fn test_segments_are_sized_streams() {
        let config = eg_config(SequenceTransform::EqualityCoding);
        let bitstream =
            encode_descriptor_subsequence(&config, DataBlock::from_values(&[4, 4, 9, 4], 1), None)
                .unwrap();

        let mut cursor = Cursor::new(&bitstream[8..]);
        let flags = read_stream(&mut cursor).unwrap();
        assert_eq!(flags.num_symbols, 4);

        let raw_values = &bitstream[8 + cursor.position() as usize..];
        assert_eq!(raw_values[..4], [0, 0, 0, 3]);
    }

    #[test]
    fn test_truncated() {
        let config = eg_config(SequenceTransform::RleCoding {
            rle_coding_guard: 4,
        });
        let bitstream = encode_descriptor_subsequence(
            &config,
            DataBlock::from_values(&[5, 5, 5, 5, 5, 1, 2], 1),
            None,
        )
        .unwrap();

        assert!(matches!(
            decode_descriptor_subsequence(&config, &bitstream[..bitstream.len() - 1], None),
            Err(GabacError::UnexpectedEndOfStream(_))
        ));
        assert!(matches!(
            decode_descriptor_subsequence(&config, &bitstream[..2], None),
            Err(GabacError::UnexpectedEndOfStream(0))
        ));
    }

    #[test]
    fn test_dependency_requires_no_transform() {
        let config = eg_config(SequenceTransform::EqualityCoding);
        let symbols = DataBlock::from_values(&[1, 2], 1);
        assert!(matches!(
            encode_descriptor_subsequence(&config, symbols.clone(), Some(&symbols)),
            Err(GabacError::InvalidConfig(_))
        ));
    }
}
