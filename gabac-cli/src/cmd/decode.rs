use std::io::{BufReader, BufWriter, Read, Write};
use std::sync::Arc;

use anyhow::Context;
use gabac::progress::ProgressNotifier;
use gabac::{IoConfiguration, SubsequenceConfig};

pub fn decode<R: Read, W: Write, D: Read>(
    reader: R,
    writer: W,
    dependency: Option<D>,
    config: &SubsequenceConfig,
    output_word_size: u8,
    progress_notifier: Arc<dyn ProgressNotifier>,
) -> anyhow::Result<usize> {
    let mut builder = IoConfiguration::builder(BufReader::new(reader), BufWriter::new(writer))
        .output_word_size(output_word_size)
        .progress_notifier(progress_notifier);
    if let Some(dependency) = dependency {
        builder = builder.dependency(BufReader::new(dependency));
    }
    let io = builder.build()?;

    gabac::run(io, config, true).context("Could not decode the subsequence")
}
