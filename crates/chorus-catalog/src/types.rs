use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A voice as reported by the upstream provider, before enrichment
#[derive(Debug, Clone, Deserialize)]
pub struct RawVoice {
    pub name: String,
    pub language: String,
    pub engine: String,
}

/// Estimated speaker gender, derived from curated name lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

/// Synthesis quality tier, derived from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    High,
    Medium,
    Basic,
}

impl Gender {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unknown => "unknown",
        }
    }
}

impl Quality {
    /// Sort rank for quality-ordered display: high before medium before
    /// everything else
    pub(crate) const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Basic => 2,
        }
    }
}

/// An enriched catalog entry
///
/// `id` is the `name-language-engine` triple and uniquely identifies the
/// voice within one catalog snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub language: String,
    pub engine: String,
    pub category: String,
    pub gender: Gender,
    pub quality: Quality,
}

/// Frequency tables over the current catalog
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total: usize,
    /// Keyed by the 2-letter language prefix (`en`, not `en-US`)
    pub by_language: BTreeMap<String, u64>,
    pub by_engine: BTreeMap<String, u64>,
    pub by_gender: BTreeMap<String, u64>,
    pub by_category: BTreeMap<String, u64>,
}
