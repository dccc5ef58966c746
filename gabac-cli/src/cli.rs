use std::path::PathBuf;

use clap::{ArgEnum, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::opts::{input_file, input_stream, InputFile, InputStream};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// Don't display a progress bar/spinner
    #[clap(long, global = true, value_parser)]
    pub no_progress: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Sequence transform used by a generated configuration template.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ArgEnum)]
pub enum TemplateTransform {
    NoTransform,
    Equality,
    Match,
    Rle,
    Merge,
}

fn word_size(value: &str) -> Result<u8, String> {
    match value.parse::<u8>() {
        Ok(word_size @ (1 | 2 | 4 | 8)) => Ok(word_size),
        _ => Err(format!("`{}` is not one of 1, 2, 4, 8", value)),
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a file of raw little-endian symbols into a descriptor
    /// subsequence
    Encode {
        /// Input file with raw symbols; `-` is the standard input
        #[clap(default_value_t, value_parser = input_stream)]
        input: InputStream,

        /// Output file path; `-` is the standard output
        #[clap(short, long, value_parser)]
        output: Option<PathBuf>,

        /// JSON configuration of the subsequence
        #[clap(short, long, value_parser = input_file)]
        config: InputFile,

        /// Size of a single input symbol in bytes
        #[clap(long, default_value_t = 1, value_parser = word_size)]
        input_word_size: u8,

        /// File with one raw symbol per input symbol, used as the coding
        /// dependency
        #[clap(long, value_parser = input_file)]
        dependency: Option<InputFile>,
    },

    /// Decode a descriptor subsequence into a file of raw little-endian
    /// symbols
    Decode {
        /// Input file with an encoded subsequence; `-` is the standard input
        #[clap(default_value_t, value_parser = input_stream)]
        input: InputStream,

        /// Output file path; `-` is the standard output
        #[clap(short, long, value_parser)]
        output: Option<PathBuf>,

        /// JSON configuration the subsequence was encoded with
        #[clap(short, long, value_parser = input_file)]
        config: InputFile,

        /// Size of a single output symbol in bytes; wider symbols are
        /// truncated
        #[clap(long, default_value_t = 1, value_parser = word_size)]
        output_word_size: u8,

        /// File with the raw dependency symbols used when encoding
        #[clap(long, value_parser = input_file)]
        dependency: Option<InputFile>,
    },

    /// Print an example JSON configuration
    ConfigTemplate {
        /// Sequence transform to use in the template
        #[clap(arg_enum, value_parser, default_value = "no-transform")]
        transform: TemplateTransform,

        /// Output file path; `-` is the standard output
        #[clap(short, long, value_parser)]
        output: Option<PathBuf>,
    },
}
