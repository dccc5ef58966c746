use std::io::BufReader;

use anyhow::Context;
use gabac::SubsequenceConfig;

use crate::opts::InputFile;

pub mod config_template;
pub mod decode;
pub mod encode;

pub fn read_config(path: &InputFile) -> anyhow::Result<SubsequenceConfig> {
    let reader = path.as_reader()?;
    SubsequenceConfig::from_reader(BufReader::new(reader.into_read()))
        .with_context(|| format!("Could not load the configuration from {}", path))
}
