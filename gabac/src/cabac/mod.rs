//! Context-adaptive binary arithmetic coding engine.

mod context_model;
mod decoder;
mod encoder;
mod tables;

pub use context_model::{build_context_table, ContextModel, DEFAULT_CONTEXT_INIT_VALUE};
pub use decoder::BinaryArithmeticDecoder;
pub use encoder::BinaryArithmeticEncoder;
