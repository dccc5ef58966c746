//! Encoding configuration of descriptor subsequences.
//!
//! Configurations are plain values, usually loaded from JSON. A
//! [`SubsequenceConfig`] names the sequence transform and carries one
//! [`TransformedSubSeqConfig`] per derived sub-sequence.

use std::fmt::{Display, Formatter};
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{GabacError, GabacResult};
use crate::state_vars::StateVars;

/// Largest alphabet size for which LUT sub-symbol transform is supported.
pub const MAX_LUT_SIZE: u64 = 256;
/// Maximum number of sub-sequences produced by merge coding.
pub const MAX_MERGE_SUBSEQS: usize = 15;

/// Binarization scheme of sub-symbol values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BinarizationId {
    Bi,
    Tu,
    Eg,
    Seg,
    Teg,
    Steg,
    Sutu,
    Ssutu,
    Dtu,
    Sdtu,
}

impl BinarizationId {
    pub const ALL: [BinarizationId; 10] = [
        BinarizationId::Bi,
        BinarizationId::Tu,
        BinarizationId::Eg,
        BinarizationId::Seg,
        BinarizationId::Teg,
        BinarizationId::Steg,
        BinarizationId::Sutu,
        BinarizationId::Ssutu,
        BinarizationId::Dtu,
        BinarizationId::Sdtu,
    ];

    /// Returns the numeric identifier as used in MPEG-G parameter sets.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            BinarizationId::Seg | BinarizationId::Steg | BinarizationId::Ssutu | BinarizationId::Sdtu
        )
    }

    /// Whether this is one of the split-unit schemes (SUTU, SSUTU, DTU,
    /// SDTU).
    #[must_use]
    pub const fn is_split_unit(self) -> bool {
        matches!(
            self,
            BinarizationId::Sutu | BinarizationId::Ssutu | BinarizationId::Dtu | BinarizationId::Sdtu
        )
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BinarizationId::Bi => "BI",
            BinarizationId::Tu => "TU",
            BinarizationId::Eg => "EG",
            BinarizationId::Seg => "SEG",
            BinarizationId::Teg => "TEG",
            BinarizationId::Steg => "STEG",
            BinarizationId::Sutu => "SUTU",
            BinarizationId::Ssutu => "SSUTU",
            BinarizationId::Dtu => "DTU",
            BinarizationId::Sdtu => "SDTU",
        }
    }
}

impl TryFrom<u8> for BinarizationId {
    type Error = GabacError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| GabacError::invalid_config(format!("unknown binarization id {}", value)))
    }
}

impl Display for BinarizationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Transform applied to single sub-symbols before they are binarized.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsymTransform {
    #[default]
    NoTransform,
    LutTransform,
    DiffCoding,
}

impl SubsymTransform {
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for SubsymTransform {
    type Error = GabacError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SubsymTransform::NoTransform),
            1 => Ok(SubsymTransform::LutTransform),
            2 => Ok(SubsymTransform::DiffCoding),
            _ => Err(GabacError::invalid_config(format!(
                "unknown sub-symbol transform id {}",
                value
            ))),
        }
    }
}

/// Transform applied to a whole descriptor subsequence, together with its
/// parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "transform_id_subseq", rename_all = "snake_case")]
pub enum SequenceTransform {
    #[default]
    NoTransform,
    EqualityCoding,
    MatchCoding {
        match_coding_buffer_size: u16,
    },
    RleCoding {
        rle_coding_guard: u8,
    },
    MergeCoding {
        merge_coding_shift_size: Vec<u8>,
    },
}

impl SequenceTransform {
    #[must_use]
    pub fn id(&self) -> u8 {
        match self {
            SequenceTransform::NoTransform => 0,
            SequenceTransform::EqualityCoding => 1,
            SequenceTransform::MatchCoding { .. } => 2,
            SequenceTransform::RleCoding { .. } => 3,
            SequenceTransform::MergeCoding { .. } => 4,
        }
    }

    /// Returns the number of derived sub-sequences this transform produces.
    #[must_use]
    pub fn num_derived_subseqs(&self) -> usize {
        match self {
            SequenceTransform::NoTransform => 1,
            SequenceTransform::EqualityCoding => 2,
            SequenceTransform::MatchCoding { .. } => 3,
            SequenceTransform::RleCoding { .. } => 2,
            SequenceTransform::MergeCoding {
                merge_coding_shift_size,
            } => merge_coding_shift_size.len(),
        }
    }

    pub fn validate(&self) -> GabacResult<()> {
        match self {
            SequenceTransform::RleCoding { rle_coding_guard } if *rle_coding_guard == 0 => {
                Err(GabacError::invalid_config("RLE guard must be at least 1"))
            }
            SequenceTransform::MergeCoding {
                merge_coding_shift_size,
            } => {
                if merge_coding_shift_size.is_empty()
                    || merge_coding_shift_size.len() > MAX_MERGE_SUBSEQS
                {
                    return Err(GabacError::invalid_config(format!(
                        "merge coding needs 1 to {} sub-sequences, got {}",
                        MAX_MERGE_SUBSEQS,
                        merge_coding_shift_size.len()
                    )));
                }
                if let Some(shift) = merge_coding_shift_size.iter().find(|&&x| x > 31) {
                    return Err(GabacError::invalid_config(format!(
                        "merge shift size {} exceeds 31",
                        shift
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl Display for SequenceTransform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceTransform::NoTransform => write!(f, "no transform"),
            SequenceTransform::EqualityCoding => write!(f, "equality coding"),
            SequenceTransform::MatchCoding {
                match_coding_buffer_size,
            } => write!(f, "match coding (window {})", match_coding_buffer_size),
            SequenceTransform::RleCoding { rle_coding_guard } => {
                write!(f, "RLE coding (guard {})", rle_coding_guard)
            }
            SequenceTransform::MergeCoding {
                merge_coding_shift_size,
            } => write!(f, "merge coding (shifts {:?})", merge_coding_shift_size),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupportValues {
    pub output_symbol_size: u8,
    pub coding_subsym_size: u8,
    pub coding_order: u8,
    #[serde(default)]
    pub share_subsym_lut_flag: bool,
    #[serde(default)]
    pub share_subsym_prv_flag: bool,
}

impl SupportValues {
    #[must_use]
    pub const fn new(output_symbol_size: u8, coding_subsym_size: u8, coding_order: u8) -> Self {
        Self {
            output_symbol_size,
            coding_subsym_size,
            coding_order,
            share_subsym_lut_flag: false,
            share_subsym_prv_flag: false,
        }
    }
}

impl Default for SupportValues {
    fn default() -> Self {
        Self::new(8, 8, 0)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizationParameters {
    pub c_max: u8,
    pub c_max_teg: u8,
    pub c_max_dtu: u8,
    pub split_unit_size: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextParameters {
    pub adaptive_mode_flag: bool,
    /// Explicit number of contexts; `0` means "derive from the
    /// configuration".
    pub num_contexts: u16,
    pub context_initialization_value: Vec<u8>,
    pub share_subsym_ctx_flag: bool,
}

impl Default for ContextParameters {
    fn default() -> Self {
        Self {
            adaptive_mode_flag: true,
            num_contexts: 0,
            context_initialization_value: Vec::new(),
            share_subsym_ctx_flag: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Binarization {
    pub binarization_id: BinarizationId,
    #[serde(default)]
    pub bypass_flag: bool,
    #[serde(default)]
    pub cabac_binarization_parameters: BinarizationParameters,
    #[serde(default)]
    pub cabac_context_parameters: ContextParameters,
}

impl Binarization {
    #[must_use]
    pub fn new(binarization_id: BinarizationId) -> Self {
        Self {
            binarization_id,
            bypass_flag: false,
            cabac_binarization_parameters: BinarizationParameters::default(),
            cabac_context_parameters: ContextParameters::default(),
        }
    }

    #[must_use]
    pub fn with_bypass(mut self, bypass_flag: bool) -> Self {
        self.bypass_flag = bypass_flag;
        self
    }

    #[must_use]
    pub fn with_parameters(mut self, parameters: BinarizationParameters) -> Self {
        self.cabac_binarization_parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_context_parameters(mut self, parameters: ContextParameters) -> Self {
        self.cabac_context_parameters = parameters;
        self
    }
}

/// Configuration of a single transformed sub-sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransformedSubSeqConfig {
    #[serde(default)]
    pub transform_id_subsym: SubsymTransform,
    pub support_values: SupportValues,
    pub cabac_binarization: Binarization,
}

impl TransformedSubSeqConfig {
    #[must_use]
    pub fn new(support_values: SupportValues, cabac_binarization: Binarization) -> Self {
        Self {
            transform_id_subsym: SubsymTransform::NoTransform,
            support_values,
            cabac_binarization,
        }
    }

    #[must_use]
    pub fn with_subsym_transform(mut self, transform: SubsymTransform) -> Self {
        self.transform_id_subsym = transform;
        self
    }

    #[inline]
    #[must_use]
    pub fn binarization_id(&self) -> BinarizationId {
        self.cabac_binarization.binarization_id
    }

    #[inline]
    #[must_use]
    pub fn coding_order(&self) -> u8 {
        self.support_values.coding_order
    }

    /// Checks that the configuration describes a codable sub-sequence.
    pub fn validate(&self) -> GabacResult<()> {
        let support = &self.support_values;
        let binarization = &self.cabac_binarization;
        let binarization_id = binarization.binarization_id;

        if !(1..=64).contains(&support.output_symbol_size) {
            return Err(GabacError::invalid_config(format!(
                "output symbol size {} is not in 1..=64",
                support.output_symbol_size
            )));
        }
        if !(1..=32).contains(&support.coding_subsym_size) {
            return Err(GabacError::invalid_config(format!(
                "coding sub-symbol size {} is not in 1..=32",
                support.coding_subsym_size
            )));
        }
        if support.output_symbol_size % support.coding_subsym_size != 0 {
            return Err(GabacError::invalid_config(format!(
                "output symbol size {} is not a multiple of coding sub-symbol size {}",
                support.output_symbol_size, support.coding_subsym_size
            )));
        }
        if support.coding_order > 2 {
            return Err(GabacError::invalid_config(format!(
                "unknown coding order {}",
                support.coding_order
            )));
        }
        if binarization.bypass_flag && support.coding_order > 0 {
            return Err(GabacError::invalid_config(
                "bypass coding is only supported with coding order 0",
            ));
        }
        if binarization_id.is_split_unit()
            && !(1..=8).contains(&binarization.cabac_binarization_parameters.split_unit_size)
        {
            return Err(GabacError::invalid_config(format!(
                "split unit size {} is not in 1..=8",
                binarization.cabac_binarization_parameters.split_unit_size
            )));
        }

        match self.transform_id_subsym {
            SubsymTransform::NoTransform => {}
            SubsymTransform::LutTransform => {
                if support.coding_order == 0
                    || binarization_id.is_split_unit()
                    || (1u64 << support.coding_subsym_size) > MAX_LUT_SIZE
                {
                    return Err(GabacError::invalid_config(format!(
                        "LUT transform not supported with coding order {}, binarization {} \
                         and coding sub-symbol size {}",
                        support.coding_order, binarization_id, support.coding_subsym_size
                    )));
                }
            }
            SubsymTransform::DiffCoding => {
                if support.coding_order > 0 {
                    return Err(GabacError::invalid_config(
                        "diff coding of sub-symbols is only supported with coding order 0",
                    ));
                }
            }
        }

        StateVars::new(self).map(|_| ())
    }
}

impl Default for TransformedSubSeqConfig {
    fn default() -> Self {
        Self::new(
            SupportValues::default(),
            Binarization::new(BinarizationId::Bi),
        )
    }
}

/// Full configuration of a descriptor subsequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubsequenceConfig {
    #[serde(default)]
    pub descriptor_subsequence_id: Option<u16>,
    #[serde(default)]
    pub token_type: bool,
    #[serde(default)]
    pub transform_subseq_parameters: SequenceTransform,
    pub transform_subseq_cfgs: Vec<TransformedSubSeqConfig>,
}

impl SubsequenceConfig {
    #[must_use]
    pub fn new(
        transform: SequenceTransform,
        transform_subseq_cfgs: Vec<TransformedSubSeqConfig>,
    ) -> Self {
        Self {
            descriptor_subsequence_id: None,
            token_type: false,
            transform_subseq_parameters: transform,
            transform_subseq_cfgs,
        }
    }

    #[must_use]
    pub fn with_token_type(mut self, token_type: bool) -> Self {
        self.token_type = token_type;
        self
    }

    pub fn from_json(json: &str) -> GabacResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_reader<R: Read>(reader: R) -> GabacResult<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> GabacResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> GabacResult<()> {
        self.transform_subseq_parameters.validate()?;

        let expected = self.transform_subseq_parameters.num_derived_subseqs();
        if self.transform_subseq_cfgs.len() != expected {
            return Err(GabacError::invalid_config(format!(
                "{} needs {} transformed sub-sequence configurations, got {}",
                self.transform_subseq_parameters,
                expected,
                self.transform_subseq_cfgs.len()
            )));
        }

        for config in &self.transform_subseq_cfgs {
            config.validate()?;
        }
        Ok(())
    }
}

impl Default for SubsequenceConfig {
    fn default() -> Self {
        Self::new(
            SequenceTransform::NoTransform,
            vec![TransformedSubSeqConfig::default()],
        )
    }
}
