use std::fmt::{Debug, Formatter};

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{GabacError, GabacResult};

/// Resizable sequence of fixed-width unsigned integers.
///
/// Values are stored as little-endian words of 1, 2, 4 or 8 bytes. The total
/// byte length is always a multiple of the word size. Values passed to
/// [`DataBlock::set`] and [`DataBlock::push`] are truncated to the word width.
///
/// # Examples
///
/// ```
/// use gabac::data_block::DataBlock;
///
/// let mut block = DataBlock::new(0, 1);
/// block.push(3);
/// block.push(0x1FF);
///
/// assert_eq!(block.len(), 2);
/// assert_eq!(block.get(1), 0xFF);
/// assert_eq!(block.get_signed(1), -1);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DataBlock {
    data: Vec<u8>,
    word_size: u8,
}

#[inline]
fn check_word_size(word_size: u8) {
    assert!(
        matches!(word_size, 1 | 2 | 4 | 8),
        "Invalid word size: {} (expected 1, 2, 4 or 8)",
        word_size
    );
}

/// Returns the smallest word size able to hold `bits` bits.
#[must_use]
pub fn word_size_for_bits(bits: u8) -> u8 {
    match bits {
        0..=8 => 1,
        9..=16 => 2,
        17..=32 => 4,
        _ => 8,
    }
}

/// Interprets the lowest `word_size` bytes of `value` as a two's-complement
/// signed integer.
///
/// # Panics
///
/// Panics if `word_size` is not one of 1, 2, 4, 8.
#[must_use]
pub fn signed_value(value: u64, word_size: u8) -> i64 {
    match word_size {
        1 => value as i8 as i64,
        2 => value as i16 as i64,
        4 => value as i32 as i64,
        8 => value as i64,
        _ => panic!("Invalid word size: {}", word_size),
    }
}

impl DataBlock {
    /// Creates a zero-filled block of `size` words.
    ///
    /// # Panics
    ///
    /// Panics if `word_size` is not one of 1, 2, 4, 8.
    #[must_use]
    pub fn new(size: usize, word_size: u8) -> Self {
        check_word_size(word_size);

        Self {
            data: vec![0; size * word_size as usize],
            word_size,
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize, word_size: u8) -> Self {
        check_word_size(word_size);

        Self {
            data: Vec::with_capacity(capacity * word_size as usize),
            word_size,
        }
    }

    #[must_use]
    pub fn from_values(values: &[u64], word_size: u8) -> Self {
        let mut block = Self::with_capacity(values.len(), word_size);
        for &value in values {
            block.push(value);
        }
        block
    }

    /// Wraps raw little-endian bytes.
    ///
    /// Returns an error if the byte length is not a multiple of the word size.
    pub fn from_bytes(data: Vec<u8>, word_size: u8) -> GabacResult<Self> {
        check_word_size(word_size);
        if data.len() % word_size as usize != 0 {
            return Err(GabacError::misaligned_input(data.len(), word_size));
        }

        Ok(Self { data, word_size })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / self.word_size as usize
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn word_size(&self) -> u8 {
        self.word_size
    }

    #[inline]
    #[must_use]
    pub fn raw_len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> u64 {
        let start = index * self.word_size as usize;
        let bytes = &self.data[start..start + self.word_size as usize];
        match self.word_size {
            1 => bytes[0] as u64,
            2 => LittleEndian::read_u16(bytes) as u64,
            4 => LittleEndian::read_u32(bytes) as u64,
            _ => LittleEndian::read_u64(bytes),
        }
    }

    #[inline]
    #[must_use]
    pub fn get_signed(&self, index: usize) -> i64 {
        signed_value(self.get(index), self.word_size)
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: u64) {
        let start = index * self.word_size as usize;
        let bytes = &mut self.data[start..start + self.word_size as usize];
        match self.word_size {
            1 => bytes[0] = value as u8,
            2 => LittleEndian::write_u16(bytes, value as u16),
            4 => LittleEndian::write_u32(bytes, value as u32),
            _ => LittleEndian::write_u64(bytes, value),
        }
    }

    #[inline]
    pub fn push(&mut self, value: u64) {
        let len = self.len();
        self.data.resize(self.data.len() + self.word_size as usize, 0);
        self.set(len, value);
    }

    pub fn resize(&mut self, size: usize) {
        self.data.resize(size * self.word_size as usize, 0);
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Exchanges the contents (including word sizes) of two blocks without
    /// copying the data.
    pub fn swap(&mut self, other: &mut DataBlock) {
        std::mem::swap(self, other);
    }

    /// Moves the contents out, leaving an empty block with the same word
    /// size behind.
    #[must_use]
    pub fn take(&mut self) -> DataBlock {
        let word_size = self.word_size;
        std::mem::replace(self, DataBlock::new(0, word_size))
    }

    /// Converts the block to another word size, truncating every value that
    /// does not fit.
    #[must_use]
    pub fn with_word_size(self, word_size: u8) -> DataBlock {
        if word_size == self.word_size {
            return self;
        }

        let mut block = DataBlock::with_capacity(self.len(), word_size);
        for value in self.iter() {
            block.push(value);
        }
        block
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Returns a cursor for in-place linear scans.
    pub fn stepper(&mut self) -> BlockStepper<'_> {
        BlockStepper {
            block: self,
            position: 0,
        }
    }
}

impl Default for DataBlock {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl Debug for DataBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataBlock")
            .field("word_size", &self.word_size)
            .field("values", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Forward cursor over a [`DataBlock`].
#[derive(Debug)]
pub struct BlockStepper<'a> {
    block: &'a mut DataBlock,
    position: usize,
}

impl<'a> BlockStepper<'a> {
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.position < self.block.len()
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> u64 {
        self.block.get(self.position)
    }

    #[inline]
    pub fn set(&mut self, value: u64) {
        self.block.set(self.position, value);
    }

    #[inline]
    pub fn inc(&mut self) {
        self.position += 1;
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use crate::data_block::{signed_value, word_size_for_bits, DataBlock};
    use crate::error::GabacError;

    #[test]
    fn test_truncates_to_word_width() {
        let mut block = DataBlock::new(2, 2);
        block.set(0, 0x1_2345);
        block.set(1, u64::MAX);

        assert_eq!(block.get(0), 0x2345);
        assert_eq!(block.get(1), 0xFFFF);
        assert_eq!(block.get_signed(1), -1);
        assert_eq!(block.raw_len(), 4);
    }

    #[test]
    fn test_push_and_resize() {
        let mut block = DataBlock::new(0, 8);
        block.push(u64::MAX);
        block.push(7);
        assert_eq!(block.iter().collect::<Vec<_>>(), vec![u64::MAX, 7]);

        block.resize(4);
        assert_eq!(block.len(), 4);
        assert_eq!(block.get(3), 0);

        block.clear();
        assert!(block.is_empty());
    }

    #[test]
    fn test_swap_moves_ownership() {
        let mut a = DataBlock::from_values(&[1, 2, 3], 1);
        let mut b = DataBlock::new(0, 4);
        a.swap(&mut b);

        assert!(a.is_empty());
        assert_eq!(a.word_size(), 4);
        assert_eq!(b, DataBlock::from_values(&[1, 2, 3], 1));

        let taken = b.take();
        assert!(b.is_empty());
        assert_eq!(b.word_size(), 1);
        assert_eq!(taken.len(), 3);
    }

    #[test]
    fn test_stepper() {
        let mut block = DataBlock::from_values(&[1, 2, 3], 4);
        let mut stepper = block.stepper();
        while stepper.is_valid() {
            let value = stepper.get();
            stepper.set(value * 10);
            stepper.inc();
        }

        assert_eq!(block.iter().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn test_from_bytes_misaligned() {
        let result = DataBlock::from_bytes(vec![0; 7], 2);
        assert!(matches!(result, Err(GabacError::MisalignedInput(7, 2))));

        let block = DataBlock::from_bytes(vec![1, 0, 2, 0], 2).unwrap();
        assert_eq!(block.iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_with_word_size() {
        let block = DataBlock::from_values(&[0x101, (-2i64) as u64], 8).with_word_size(1);
        assert_eq!(block.iter().collect::<Vec<_>>(), vec![1, 0xFE]);
        assert_eq!(block.get_signed(1), -2);
    }

    #[test]
    fn test_helpers() {
        assert_eq!(word_size_for_bits(1), 1);
        assert_eq!(word_size_for_bits(9), 2);
        assert_eq!(word_size_for_bits(32), 4);
        assert_eq!(word_size_for_bits(33), 8);
        assert_eq!(signed_value(0x80, 1), -128);
        assert_eq!(signed_value(0x80, 2), 128);
    }

    #[test]
    #[should_panic(expected = "Invalid word size: 3")]
    fn test_invalid_word_size() {
        let _block = DataBlock::new(1, 3);
    }
}
