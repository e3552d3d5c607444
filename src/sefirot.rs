//! The fixed ten-dimension scoring taxonomy.
//!
//! Every case is scored against the same ten Sefirot, in a canonical order
//! that doubles as the ordinal position (1–10) of each persisted result row.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// One of the ten recognized scoring dimensions.
///
/// Declaration order is the canonical order; `ordinal()` is 1-based.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sefira {
    Keter,
    Chochmah,
    Binah,
    Chesed,
    Gevurah,
    Tiferet,
    Netzach,
    Hod,
    Yesod,
    Malchut,
}

/// Number of dimensions applied to every case.
pub const SEFIROT_COUNT: u32 = 10;

impl Sefira {
    /// Canonical 1-based position, unique per case.
    pub fn ordinal(self) -> u32 {
        Self::iter().position(|s| s == self).map_or(0, |i| i as u32) + 1
    }

    pub fn hebrew_name(self) -> &'static str {
        match self {
            Self::Keter => "כתר",
            Self::Chochmah => "חכמה",
            Self::Binah => "בינה",
            Self::Chesed => "חסד",
            Self::Gevurah => "גבורה",
            Self::Tiferet => "תפארת",
            Self::Netzach => "נצח",
            Self::Hod => "הוד",
            Self::Yesod => "יסוד",
            Self::Malchut => "מלכות",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Keter => "Ethical Validation - Divine Purpose Alignment",
            Self::Chochmah => "Deep Reasoning - Wisdom & Insight",
            Self::Binah => "Understanding - 9D Contextual Analysis",
            Self::Chesed => "Kindness - Opportunities & Expansion",
            Self::Gevurah => "Strength - Risks & Restrictions",
            Self::Tiferet => "Beauty - Dialectical Synthesis",
            Self::Netzach => "Victory - Implementation Strategy",
            Self::Hod => "Splendor - Effective Communication",
            Self::Yesod => "Foundation - Integration & Coherence",
            Self::Malchut => "Kingdom - Concrete Action Plan",
        }
    }

    /// Field name carrying the main score inside this dimension's fixture blob.
    pub fn score_key(self) -> &'static str {
        match self {
            Self::Keter => "alignment_score",
            Self::Chochmah => "confidence_level",
            Self::Binah => "contextual_depth_score",
            Self::Chesed => "expansion_score",
            Self::Gevurah => "severity_score",
            Self::Tiferet => "harmony_score",
            Self::Netzach => "persistence_score",
            Self::Hod => "splendor_score",
            Self::Yesod => "integration_score",
            Self::Malchut => "manifestation_score",
        }
    }

    /// Fixed score emitted by the mock orchestrator for this dimension.
    pub fn demo_score(self) -> f64 {
        match self {
            Self::Keter => 75.0,
            Self::Chochmah => 80.0,
            Self::Binah => 85.0,
            Self::Chesed => 90.0,
            Self::Gevurah => 70.0,
            Self::Tiferet => 82.0,
            Self::Netzach => 78.0,
            Self::Hod => 88.0,
            Self::Yesod => 85.0,
            Self::Malchut => 92.0,
        }
    }
}
