pub mod binarization;
pub mod bit_stream;
pub mod cabac;
pub mod config;
pub mod context_selector;
pub mod data_block;
pub mod descriptor;
pub mod error;
pub mod lut;
pub mod progress;
pub mod reader;
pub mod run;
pub mod state_vars;
pub mod stream_handler;
pub mod transform;
pub mod transformed_subseq;
pub mod writer;

#[doc(hidden)]
pub mod _internal_test_data;

pub use config::SubsequenceConfig;
pub use data_block::DataBlock;
pub use descriptor::{decode_descriptor_subsequence, encode_descriptor_subsequence};
pub use error::{GabacError, GabacResult};
pub use run::{run, IoConfiguration};
