#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use cmd::{config_template, decode, encode, read_config};
use human_panic::setup_panic;
use lazy_static::lazy_static;

use crate::logging::init_logging;
use crate::opts::{InputReader, OutputMode, OutputWriter};
use crate::progress_bar::GabacProgressBar;

mod cli;
mod cmd;
mod logging;
mod opts;
mod progress_bar;

lazy_static! {
    pub(crate) static ref PROGRESS_BAR: GabacProgressBar = GabacProgressBar::new();
}

fn main() -> anyhow::Result<()> {
    setup_panic!();

    let cli: Cli = Cli::parse();

    if !cli.no_progress {
        PROGRESS_BAR.show();
    }

    init_logging(cli.verbose.log_level_filter()).expect("Could not initialize logging");

    match &cli.command {
        Commands::Encode {
            input,
            output,
            config,
            input_word_size,
            dependency,
        } => {
            let config = read_config(config)?;
            let reader = input.as_reader()?;
            PROGRESS_BAR.set_total_bytes(reader.length()?.unwrap_or(0));
            let output = OutputWriter::from_path_and_input(
                output,
                Some(&reader),
                "gabac",
                OutputMode::Binary,
            )?;
            let dependency = dependency.as_ref().map(|d| d.as_reader()).transpose()?;

            encode::encode(
                reader.into_read(),
                output.into_write(),
                dependency.map(InputReader::into_read),
                &config,
                *input_word_size,
                Arc::new(PROGRESS_BAR.clone()),
            )
            .context("Failed to encode given file")?;
        }
        Commands::Decode {
            input,
            output,
            config,
            output_word_size,
            dependency,
        } => {
            let config = read_config(config)?;
            let reader = input.as_reader()?;
            PROGRESS_BAR.set_total_bytes(reader.length()?.unwrap_or(0));
            let output = OutputWriter::from_path_and_input(
                output,
                Some(&reader),
                "raw",
                OutputMode::Binary,
            )?;
            let dependency = dependency.as_ref().map(|d| d.as_reader()).transpose()?;

            decode::decode(
                reader.into_read(),
                output.into_write(),
                dependency.map(InputReader::into_read),
                &config,
                *output_word_size,
                Arc::new(PROGRESS_BAR.clone()),
            )
            .context("Failed to decode given file")?;
        }
        Commands::ConfigTemplate { transform, output } => {
            let output = OutputWriter::from_path_and_input(output, None, "json", OutputMode::Text)?;

            config_template::config_template(output.into_write(), *transform)
                .context("Failed to write the configuration template")?;
        }
    }

    PROGRESS_BAR.finish();
    Ok(())
}
