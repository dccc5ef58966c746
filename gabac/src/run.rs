//! Encoding and decoding of a descriptor subsequence between byte streams.

use std::fmt::{Debug, Formatter};
use std::io::{Read, Write};
use std::sync::Arc;

use log::info;

use crate::config::SubsequenceConfig;
use crate::data_block::DataBlock;
use crate::descriptor::{decode_descriptor_subsequence, encode_descriptor_subsequence};
use crate::error::{GabacError, GabacResult};
use crate::progress::{ByteNum, DummyProgressNotifier, ProgressNotifier, Stage};
use crate::stream_handler::{read_full, write_bytes};

/// Streams and symbol widths used by [`run`].
///
/// When encoding, `input` holds raw symbols of `input_word_size` bytes
/// (little-endian) and `output` receives the descriptor subsequence. When
/// decoding the roles are reversed and decoded symbols are written with
/// `output_word_size` bytes each. An optional dependency stream holds one
/// raw symbol per coded symbol, with the width of the raw side.
pub struct IoConfiguration<'a> {
    input: Box<dyn Read + 'a>,
    dependency: Option<Box<dyn Read + 'a>>,
    output: Box<dyn Write + 'a>,
    input_word_size: u8,
    output_word_size: u8,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl<'a> IoConfiguration<'a> {
    pub fn builder<R: Read + 'a, W: Write + 'a>(
        input: R,
        output: W,
    ) -> IoConfigurationBuilder<'a> {
        IoConfigurationBuilder::new(input, output)
    }
}

impl Debug for IoConfiguration<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoConfiguration")
            .field("has_dependency", &self.dependency.is_some())
            .field("input_word_size", &self.input_word_size)
            .field("output_word_size", &self.output_word_size)
            .field("progress_notifier", &self.progress_notifier)
            .finish_non_exhaustive()
    }
}

pub struct IoConfigurationBuilder<'a> {
    input: Box<dyn Read + 'a>,
    dependency: Option<Box<dyn Read + 'a>>,
    output: Box<dyn Write + 'a>,
    input_word_size: u8,
    output_word_size: u8,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl<'a> IoConfigurationBuilder<'a> {
    pub fn new<R: Read + 'a, W: Write + 'a>(input: R, output: W) -> Self {
        Self {
            input: Box::new(input),
            dependency: None,
            output: Box::new(output),
            input_word_size: 1,
            output_word_size: 1,
            progress_notifier: Arc::new(DummyProgressNotifier),
        }
    }

    pub fn dependency<D: Read + 'a>(mut self, dependency: D) -> Self {
        self.dependency = Some(Box::new(dependency));
        self
    }

    pub fn input_word_size(mut self, input_word_size: u8) -> Self {
        self.input_word_size = input_word_size;
        self
    }

    pub fn output_word_size(mut self, output_word_size: u8) -> Self {
        self.output_word_size = output_word_size;
        self
    }

    pub fn progress_notifier(mut self, progress_notifier: Arc<dyn ProgressNotifier>) -> Self {
        self.progress_notifier = progress_notifier;
        self
    }

    pub fn build(self) -> GabacResult<IoConfiguration<'a>> {
        for word_size in [self.input_word_size, self.output_word_size] {
            if !matches!(word_size, 1 | 2 | 4 | 8) {
                return Err(GabacError::invalid_config(format!(
                    "word size {} is not one of 1, 2, 4, 8",
                    word_size
                )));
            }
        }

        Ok(IoConfiguration {
            input: self.input,
            dependency: self.dependency,
            output: self.output,
            input_word_size: self.input_word_size,
            output_word_size: self.output_word_size,
            progress_notifier: self.progress_notifier,
        })
    }
}

fn read_dependency(
    dependency: Option<Box<dyn Read + '_>>,
    word_size: u8,
) -> GabacResult<Option<DataBlock>> {
    dependency
        .map(|mut reader| read_full(&mut reader, word_size))
        .transpose()
}

/// Encodes (or, with `decode`, decodes) one descriptor subsequence from the
/// input stream into the output stream.
///
/// Returns the number of bytes written to the output.
pub fn run(io: IoConfiguration, config: &SubsequenceConfig, decode: bool) -> GabacResult<usize> {
    config.validate()?;
    if decode {
        run_decode(io, config)
    } else {
        run_encode(io, config)
    }
}

fn run_encode(mut io: IoConfiguration, config: &SubsequenceConfig) -> GabacResult<usize> {
    io.progress_notifier.stage(Stage::ReadingInput);
    let symbols = read_full(&mut io.input, io.input_word_size)?;
    let dependency = read_dependency(io.dependency, io.input_word_size)?;
    let num_symbols = symbols.len();
    let raw_len = symbols.raw_len();

    io.progress_notifier.stage(Stage::Encoding);
    let bitstream = encode_descriptor_subsequence(config, symbols, dependency.as_ref())?;
    io.progress_notifier.processed_bytes(ByteNum::new(raw_len));

    io.progress_notifier.stage(Stage::WritingOutput);
    let written = write_bytes(&mut io.output, &bitstream)?;
    io.output.flush()?;

    info!(
        "Encoded {} symbols ({} bytes) into {} bytes",
        num_symbols, raw_len, written
    );
    Ok(written)
}

fn run_decode(mut io: IoConfiguration, config: &SubsequenceConfig) -> GabacResult<usize> {
    io.progress_notifier.stage(Stage::ReadingInput);
    let mut bitstream = Vec::new();
    io.input.read_to_end(&mut bitstream)?;
    let dependency = read_dependency(io.dependency, io.output_word_size)?;

    io.progress_notifier.stage(Stage::Decoding);
    let (symbols, consumed) =
        decode_descriptor_subsequence(config, &bitstream, dependency.as_ref())?;
    if consumed != bitstream.len() {
        return Err(GabacError::corrupt_payload(format!(
            "{} trailing bytes after the descriptor subsequence",
            bitstream.len() - consumed
        )));
    }
    io.progress_notifier.processed_bytes(ByteNum::new(consumed));

    let num_symbols = symbols.len();
    io.progress_notifier.stage(Stage::WritingOutput);
    let symbols = symbols.with_word_size(io.output_word_size);
    let written = write_bytes(&mut io.output, symbols.as_bytes())?;
    io.output.flush()?;

    info!(
        "Decoded {} symbols from {} bytes into {} bytes",
        num_symbols, consumed, written
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::config::{
        Binarization, BinarizationId, SequenceTransform, SubsequenceConfig, SupportValues,
        TransformedSubSeqConfig,
    };
    use crate::error::GabacError;
    use crate::progress::{ByteNum, ProgressNotifier};
    use crate::run::{run, IoConfiguration};

    #[derive(Debug, Default)]
    struct CountingNotifier(AtomicUsize);

    impl ProgressNotifier for CountingNotifier {
        fn processed_bytes(&self, bytes: ByteNum) {
            self.0.fetch_add(bytes.get(), Ordering::Relaxed);
        }
    }

    fn config(order: u8) -> SubsequenceConfig {
        SubsequenceConfig::new(
            SequenceTransform::NoTransform,
            vec![TransformedSubSeqConfig::new(
                SupportValues::new(16, 8, order),
                Binarization::new(BinarizationId::Teg),
            )],
        )
    }

    #[test_log::test]
    fn test_run_round_trip() {
        let raw: Vec<u8> = (0..1000u32).flat_map(|x| ((x * 7) as u16).to_le_bytes()).collect();
        let notifier = Arc::new(CountingNotifier::default());

        let mut encoded = Vec::new();
        let io = IoConfiguration::builder(Cursor::new(&raw), &mut encoded)
            .input_word_size(2)
            .progress_notifier(notifier.clone())
            .build()
            .unwrap();
        let written = run(io, &config(0), false).unwrap();
        assert_eq!(written, encoded.len());
        assert_eq!(notifier.0.load(Ordering::Relaxed), raw.len());

        let mut decoded = Vec::new();
        let io = IoConfiguration::builder(Cursor::new(&encoded), &mut decoded)
            .output_word_size(2)
            .build()
            .unwrap();
        run(io, &config(0), true).unwrap();
        assert_eq!(decoded, raw);
    }

    #[test]
    fn test_run_with_dependency() {
        let raw: Vec<u8> = (0..500u32).map(|x| (x % 251) as u8).collect();
        let dependency: Vec<u8> = raw.iter().map(|x| x.wrapping_add(3)).collect();
        let config = SubsequenceConfig::new(
            SequenceTransform::NoTransform,
            vec![TransformedSubSeqConfig::new(
                SupportValues::new(8, 8, 1),
                Binarization::new(BinarizationId::Eg),
            )],
        );

        let mut encoded = Vec::new();
        let io = IoConfiguration::builder(Cursor::new(&raw), &mut encoded)
            .dependency(Cursor::new(&dependency))
            .build()
            .unwrap();
        run(io, &config, false).unwrap();

        let mut decoded = Vec::new();
        let io = IoConfiguration::builder(Cursor::new(&encoded), &mut decoded)
            .dependency(Cursor::new(&dependency))
            .build()
            .unwrap();
        run(io, &config, true).unwrap();
        assert_eq!(decoded, raw);
    }

    #[test]
    fn test_trailing_bytes() {
        let mut encoded = Vec::new();
        let io = IoConfiguration::builder(Cursor::new(&[1u8, 0, 2, 0]), &mut encoded)
            .input_word_size(2)
            .build()
            .unwrap();
        run(io, &config(1), false).unwrap();
        encoded.push(0);

        let io = IoConfiguration::builder(Cursor::new(&encoded), Vec::new())
            .build()
            .unwrap();
        assert!(matches!(
            run(io, &config(1), true),
            Err(GabacError::CorruptPayload(_))
        ));
    }

    #[test]
    fn test_invalid_word_size() {
        assert!(matches!(
            IoConfiguration::builder(Cursor::new(Vec::new()), Vec::new())
                .input_word_size(3)
                .build(),
            Err(GabacError::InvalidConfig(_))
        ));
    }
}
