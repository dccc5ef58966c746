//! Lookup-table sub-symbol transform.
//!
//! For coding orders 1 and 2 a sub-symbol can be replaced by its rank among
//! the values seen after the same history, so that frequent values get small
//! numbers. The tables are built by the encoder in a dry run over all
//! symbols and sent in front of the coded symbols.

use log::trace;

use crate::context_selector::Subsymbol;
use crate::data_block::DataBlock;
use crate::error::{GabacError, GabacResult};
use crate::reader::CabacReader;
use crate::writer::CabacWriter;

/// Split unit size of the binarization LUT entries are coded with.
const LUT_SPLIT_UNIT_SIZE: u8 = 2;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LutEntry {
    pub value: u64,
    pub freq: u64,
}

/// Values observed after a single history, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LutRow {
    entries: Vec<LutEntry>,
}

impl LutRow {
    fn count(&mut self, value: u64) {
        match self.entries.iter_mut().find(|e| e.value == value) {
            Some(entry) => entry.freq += 1,
            None => self.entries.push(LutEntry { value, freq: 1 }),
        }
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| b.freq.cmp(&a.freq));
    }

    /// Highest valid rank in this row.
    #[inline]
    #[must_use]
    pub fn num_max_elems(&self) -> u64 {
        self.entries.len().saturating_sub(1) as u64
    }

    #[must_use]
    pub fn entries(&self) -> &[LutEntry] {
        &self.entries
    }

    fn value_at(&self, rank: u64) -> u64 {
        self.entries.get(rank as usize).map_or(0, |e| e.value)
    }
}

/// All lookup tables of a transformed sub-sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsymbolLuts {
    coding_order: u8,
    coding_subsym_size: u8,
    num_alpha_subsym: u64,
    tables: Vec<Vec<LutRow>>,
}

impl SubsymbolLuts {
    #[must_use]
    pub fn new(num_luts: u32, coding_order: u8, coding_subsym_size: u8) -> Self {
        let num_alpha_subsym = 1u64 << coding_subsym_size;
        let num_rows = num_alpha_subsym.pow(coding_order.max(1) as u32) as usize;

        Self {
            coding_order,
            coding_subsym_size,
            num_alpha_subsym,
            tables: vec![vec![LutRow::default(); num_rows]; num_luts as usize],
        }
    }

    #[inline]
    fn row_index(&self, prv_values: &[u64; 2]) -> usize {
        if self.coding_order == 2 {
            (prv_values[1] * self.num_alpha_subsym + prv_values[0]) as usize
        } else {
            prv_values[0] as usize
        }
    }

    #[inline]
    #[must_use]
    pub fn row(&self, lut_idx: usize, prv_values: &[u64; 2]) -> &LutRow {
        &self.tables[lut_idx][self.row_index(prv_values)]
    }

    /// Counts sub-symbol values along the same history flow the encoder uses
    /// and sorts every row by descending frequency.
    ///
    /// `magnitudes` holds the values that will actually be coded, i.e.
    /// symbol magnitudes for signed binarizations.
    pub fn build(
        &mut self,
        magnitudes: &[u64],
        dependencies: Option<&DataBlock>,
        output_symbol_size: u8,
        num_prvs: u32,
    ) {
        let css = self.coding_subsym_size;
        let num_subsyms = (output_symbol_size / css) as usize;
        let mask = self.num_alpha_subsym - 1;
        let mut subsymbols = vec![Subsymbol::default(); num_subsyms];

        for (i, &value) in magnitudes.iter().enumerate() {
            let dependency = dependencies.map(|d| d.get(i));
            let mut shift = output_symbol_size;
            for s in 0..num_subsyms {
                let lut_idx = if self.tables.len() > 1 { s } else { 0 };
                let prv_idx = if num_prvs > 1 { s } else { 0 };

                if let Some(dependency) = dependency {
                    subsymbols[prv_idx].prv_values[0] = (dependency >> (shift - css)) & mask;
                }
                shift -= css;
                let subsym_value = (value >> shift) & mask;

                let row_index = self.row_index(&subsymbols[prv_idx].prv_values);
                self.tables[lut_idx][row_index].count(subsym_value);
                subsymbols[prv_idx].push_previous(subsym_value, self.coding_order);
            }
        }

        for row in self.tables.iter_mut().flatten() {
            row.sort();
        }
    }

    /// Writes every row as its highest rank followed by the values of all
    /// ranks.
    pub fn encode(&self, writer: &mut CabacWriter) -> GabacResult<()> {
        let css = self.coding_subsym_size;
        for row in self.tables.iter().flatten() {
            let num_max_elems = row.num_max_elems();
            writer.write_as_sutu(num_max_elems, css, LUT_SPLIT_UNIT_SIZE, 0)?;
            for rank in 0..=num_max_elems {
                writer.write_as_sutu(row.value_at(rank), css, LUT_SPLIT_UNIT_SIZE, 0)?;
            }
        }

        trace!(
            "Encoded {} LUTs with {} rows each",
            self.tables.len(),
            self.tables.first().map_or(0, Vec::len)
        );
        Ok(())
    }

    pub fn decode(
        reader: &mut CabacReader,
        num_luts: u32,
        coding_order: u8,
        coding_subsym_size: u8,
    ) -> GabacResult<Self> {
        let mut luts = Self::new(num_luts, coding_order, coding_subsym_size);
        let css = coding_subsym_size;

        for row in luts.tables.iter_mut().flatten() {
            let num_max_elems = reader.read_as_sutu(css, LUT_SPLIT_UNIT_SIZE, 0)?;
            row.entries = (0..=num_max_elems)
                .map(|_| {
                    Ok(LutEntry {
                        value: reader.read_as_sutu(css, LUT_SPLIT_UNIT_SIZE, 0)?,
                        freq: 0,
                    })
                })
                .collect::<GabacResult<_>>()?;
        }

        Ok(luts)
    }

    /// Replaces the value of `subsymbol` by its rank in the row selected by
    /// `history`, filling in `lut_entry_idx` and `lut_num_max_elems`.
    pub fn transform(
        &self,
        subsymbol: &mut Subsymbol,
        lut_idx: usize,
        history: &[u64; 2],
    ) -> GabacResult<()> {
        let row = self.row(lut_idx, history);
        let rank = row
            .entries
            .iter()
            .position(|e| e.value == subsymbol.subsym_value && e.freq > 0)
            .ok_or_else(|| {
                GabacError::invalid_transform_input(format!(
                    "sub-symbol value {} missing from LUT",
                    subsymbol.subsym_value
                ))
            })?;

        subsymbol.lut_entry_idx = rank as u64;
        subsymbol.lut_num_max_elems = row.num_max_elems();
        Ok(())
    }

    pub fn inverse_transform(
        &self,
        subsymbol: &mut Subsymbol,
        lut_idx: usize,
        history: &[u64; 2],
    ) -> GabacResult<()> {
        let row = self.row(lut_idx, history);
        if subsymbol.lut_entry_idx > row.num_max_elems() {
            return Err(GabacError::corrupt_payload(format!(
                "LUT index {} exceeds {}",
                subsymbol.lut_entry_idx,
                row.num_max_elems()
            )));
        }

        subsymbol.subsym_value = row.value_at(subsymbol.lut_entry_idx);
        Ok(())
    }
}
