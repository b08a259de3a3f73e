// src/core/types.rs
use serde::{Deserialize, Serialize};

/// Structured decomposition of a raw author-name string.
///
/// `last_name` always carries its attached particles ("de la Vega" stays
/// whole); `display()` reconstructs a full printable name from the parts.
/// Immutable once built by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedName {
    pub first_name: String,
    pub last_name: String,
    /// Surname particles in source order, e.g. ["de", "la"].
    pub particles: Vec<String>,
    /// Generational suffix such as "Jr" or "III", split off the surname.
    pub suffix: Option<String>,
    /// First letters of the given-name tokens that are initials
    /// (single letter or dot-terminated).
    pub initials: Vec<char>,
}

impl ParsedName {
    pub fn empty() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            particles: Vec::new(),
            suffix: None,
            initials: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_empty() && self.last_name.is_empty()
    }

    /// Rebuilds a displayable "First Last[, Suffix]" string.
    pub fn display(&self) -> String {
        let mut out = String::new();
        if !self.first_name.is_empty() {
            out.push_str(&self.first_name);
        }
        if !self.last_name.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&self.last_name);
        }
        if let Some(suffix) = &self.suffix {
            out.push_str(", ");
            out.push_str(suffix);
        }
        out
    }

    /// The surname head without its particles ("Vega" for "de la Vega").
    pub fn bare_surname(&self) -> &str {
        let mut rest = self.last_name.as_str();
        for particle in &self.particles {
            let trimmed = rest.trim_start();
            match trimmed.get(..particle.len()) {
                Some(prefix) if prefix.eq_ignore_ascii_case(particle) => {
                    rest = &trimmed[particle.len()..];
                }
                _ => break,
            }
        }
        rest.trim_start()
    }
}

/// Strategy that produced an alternate rendering of a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantKind {
    Initials,
    Expanded,
    ParticleVariant,
    Reordered,
}

/// One plausible alternate rendering of a parsed name. Generated on demand,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub text: String,
    pub kind: VariantKind,
}

/// Which scorer produced a similarity value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreAlgorithm {
    JaroWinkler,
    LcsRatio,
    LevenshteinRatio,
    InitialMatch,
}

/// A similarity value in [0,1] tagged with the algorithm that computed it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub value: f64,
    pub algorithm: ScoreAlgorithm,
}

/// A user-confirmed raw -> normalized correspondence, owned by the
/// learning engine. Keys are case-normalized and whitespace-collapsed
/// before they reach this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedMapping {
    pub key: String,
    pub value: String,
    pub confidence: f64,
    /// Unix seconds at store time.
    pub timestamp: u64,
}

/// Surname occurrence count for one analysis pass. `display` keeps the
/// original casing from the first occurrence seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurnameFrequency {
    pub display: String,
    pub count: u32,
}

/// Two distinct surnames judged likely to denote the same person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePair {
    pub name1: String,
    pub name2: String,
    pub frequency1: u32,
    pub frequency2: u32,
    pub similarity: f64,
}

/// The explicit capability boundary toward the host library: any creator
/// record reduces to these three fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorRecord {
    pub first_name: String,
    pub last_name: String,
    pub creator_type: String,
}

impl CreatorRecord {
    pub fn new(first_name: &str, last_name: &str, creator_type: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            creator_type: creator_type.to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.first_name.trim().is_empty() && self.last_name.trim().is_empty()
    }
}

/// Whether a normalization result came from the learned store or is fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultStatus {
    Learned,
    New,
}

/// Where a ranked suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionSource {
    Learned,
    Variant,
    Original,
}

/// One entry of the ranked suggestion list the orchestrator returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub source: SuggestionSource,
    pub score: f64,
}

/// A stored key that matched a lookup fuzzily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarMatch {
    pub raw: String,
    pub normalized: String,
    pub similarity: f64,
}

/// Outcome of normalizing one creator. `accepted` and `normalized` are
/// filled in by the caller (typically UI-side) before apply_normalizations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationResult {
    pub original: String,
    pub creator_type: String,
    pub status: ResultStatus,
    /// The learned target, when `status == Learned`.
    pub suggestion: Option<String>,
    pub similars: Vec<SimilarMatch>,
    pub variants: Vec<Variant>,
    pub accepted: bool,
    pub normalized: Option<String>,
}

/// Aggregate report of one whole-library analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryAnalysis {
    /// Lowercased surname -> frequency entry.
    pub surname_frequencies: std::collections::HashMap<String, SurnameFrequency>,
    pub total_names: u32,
    pub unique_surnames: u32,
    pub potential_variants: Vec<CandidatePair>,
}
