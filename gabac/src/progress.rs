use std::fmt::{Debug, Display, Formatter};

use derive_more::{Add, AddAssign};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Add, AddAssign)]
#[repr(transparent)]
pub struct ByteNum(usize);

impl ByteNum {
    pub const ZERO: ByteNum = ByteNum(0);

    #[inline]
    #[must_use]
    pub const fn new(bytes: usize) -> Self {
        Self(bytes)
    }

    #[inline]
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

impl Display for ByteNum {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} B", self.0)
    }
}

/// Phase of a [`run`](crate::run::run) invocation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Stage {
    ReadingInput,
    Encoding,
    Decoding,
    WritingOutput,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::ReadingInput => "Reading input",
            Stage::Encoding => "Encoding",
            Stage::Decoding => "Decoding",
            Stage::WritingOutput => "Writing output",
        };
        f.write_str(name)
    }
}

/// Receives progress reports from [`run`](crate::run::run).
pub trait ProgressNotifier: Debug + Send + Sync {
    /// Called with the number of input bytes consumed since the last call.
    fn processed_bytes(&self, bytes: ByteNum);

    fn stage(&self, _stage: Stage) {}
}

impl<T: ProgressNotifier> ProgressNotifier for &T {
    fn processed_bytes(&self, bytes: ByteNum) {
        T::processed_bytes(self, bytes)
    }

    fn stage(&self, stage: Stage) {
        T::stage(self, stage)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct DummyProgressNotifier;

impl ProgressNotifier for DummyProgressNotifier {
    fn processed_bytes(&self, _bytes: ByteNum) {
        // do nothing
    }
}
