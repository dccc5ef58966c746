use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error raised by any stage of the GABAC pipeline.
///
/// All errors are terminal for the subsequence being processed: there is no
/// partially encoded or decoded result once one of these is returned.
#[derive(Debug)]
pub enum GabacError {
    IoError(std::io::Error),
    ConfigParseError(serde_json::Error),
    InvalidConfig(String),
    UnexpectedEndOfStream(usize),
    CorruptPayload(String),
    ContextOutOfRange(usize, usize),
    ValueOutOfRange(u64, u64),
    DependencySizeMismatch(usize, usize),
    MisalignedInput(usize, u8),
    DiffNotMonotonic(u64, u64),
    InvalidTransformInput(String),
}

impl GabacError {
    #[must_use]
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig(message.into())
    }

    #[must_use]
    pub fn corrupt_payload<S: Into<String>>(message: S) -> Self {
        Self::CorruptPayload(message.into())
    }

    #[must_use]
    pub fn unexpected_end_of_stream(bytes_read: usize) -> Self {
        Self::UnexpectedEndOfStream(bytes_read)
    }

    #[must_use]
    pub fn context_out_of_range(index: usize, num_contexts: usize) -> Self {
        Self::ContextOutOfRange(index, num_contexts)
    }

    #[must_use]
    pub fn value_out_of_range(value: u64, max_value: u64) -> Self {
        Self::ValueOutOfRange(value, max_value)
    }

    #[must_use]
    pub fn dependency_size_mismatch(dependency_len: usize, symbols_len: usize) -> Self {
        Self::DependencySizeMismatch(dependency_len, symbols_len)
    }

    #[must_use]
    pub fn misaligned_input(byte_len: usize, word_size: u8) -> Self {
        Self::MisalignedInput(byte_len, word_size)
    }

    #[must_use]
    pub fn diff_not_monotonic(previous: u64, current: u64) -> Self {
        Self::DiffNotMonotonic(previous, current)
    }

    #[must_use]
    pub fn invalid_transform_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidTransformInput(message.into())
    }
}

impl From<std::io::Error> for GabacError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<serde_json::Error> for GabacError {
    fn from(e: serde_json::Error) -> Self {
        Self::ConfigParseError(e)
    }
}

impl Display for GabacError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GabacError::IoError(e) => write!(f, "IO error: {}", e),
            GabacError::ConfigParseError(e) => write!(f, "Could not parse configuration: {}", e),
            GabacError::InvalidConfig(message) => write!(f, "Invalid configuration: {}", message),
            GabacError::UnexpectedEndOfStream(bytes_read) => write!(
                f,
                "Unexpected end of bitstream after {} bytes",
                bytes_read
            ),
            GabacError::CorruptPayload(message) => write!(f, "Corrupt payload: {}", message),
            GabacError::ContextOutOfRange(index, num_contexts) => write!(
                f,
                "Context index {} out of range (number of contexts: {})",
                index, num_contexts
            ),
            GabacError::ValueOutOfRange(value, max_value) => write!(
                f,
                "Value {} cannot be represented (maximum: {})",
                value, max_value
            ),
            GabacError::DependencySizeMismatch(dependency_len, symbols_len) => write!(
                f,
                "Dependency stream has {} symbols, but {} were expected",
                dependency_len, symbols_len
            ),
            GabacError::MisalignedInput(byte_len, word_size) => write!(
                f,
                "Input length {} is not a multiple of the word size {}",
                byte_len, word_size
            ),
            GabacError::DiffNotMonotonic(previous, current) => write!(
                f,
                "Diff coding requires non-decreasing sub-symbols (previous: {}, current: {})",
                previous, current
            ),
            GabacError::InvalidTransformInput(message) => {
                write!(f, "Invalid transform input: {}", message)
            }
        }
    }
}

impl Error for GabacError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GabacError::IoError(e) => Some(e),
            GabacError::ConfigParseError(e) => Some(e),
            _ => None,
        }
    }
}

pub type GabacResult<T> = Result<T, GabacError>;
