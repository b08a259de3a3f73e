// src/core/engine.rs
//! Orchestrator tying the parser, variant generator, candidate finder, and
//! learning store together. Owns one instance of each collaborator; hosts
//! inject only the persistence backend and, optionally, a name structurer.

use std::collections::HashMap;
use std::io::Error;

use crate::core::parser::{NameParser, NameStructurer};
use crate::core::types::{
    CreatorRecord, LibraryAnalysis, NormalizationResult, ParsedName, ResultStatus, Suggestion,
    SuggestionSource, SurnameFrequency,
};
use crate::core::variants::VariantGenerator;
use crate::fuzzy::candidates::CandidateFinder;
use crate::fuzzy::similarity::jaro_winkler_similarity;
use crate::learning::{LearningEngine, SIMILAR_THRESHOLD};
use crate::persistence::MappingBackend;

/// Collaborator through which accepted normalizations flow back into the
/// host library's items. The engine never mutates host records directly.
pub trait ItemUpdate {
    fn update_creator(&mut self, original: &str, normalized: &str);
}

pub struct NormalizationEngine {
    parser: NameParser,
    generator: VariantGenerator,
    finder: CandidateFinder,
    learning: LearningEngine,
    structurer: Option<Box<dyn NameStructurer>>,
}

impl NormalizationEngine {
    pub fn new(backend: Box<dyn MappingBackend>) -> Self {
        Self {
            parser: NameParser::new(),
            generator: VariantGenerator::new(),
            finder: CandidateFinder::new(),
            learning: LearningEngine::new(backend),
            structurer: None,
        }
    }

    /// Plugs in an external name structurer (e.g. an NER model) tried
    /// ahead of the rule-based parser. Absence is the normal case.
    pub fn with_structurer(mut self, structurer: Box<dyn NameStructurer>) -> Self {
        self.structurer = Some(structurer);
        self
    }

    pub fn learning(&self) -> &LearningEngine {
        &self.learning
    }

    pub fn learning_mut(&mut self) -> &mut LearningEngine {
        &mut self.learning
    }

    fn structure(&self, raw: &str) -> ParsedName {
        if let Some(structurer) = &self.structurer {
            if let Some(parsed) = structurer.analyze(raw) {
                return parsed;
            }
        }
        self.parser.parse(raw)
    }

    /// Normalizes a batch of creators. Creators with both name fields
    /// empty are skipped outright; every other creator yields exactly one
    /// result: a learned hit, or a fresh result carrying fuzzy near-matches
    /// and structural variants.
    pub fn process_creators(&self, creators: &[CreatorRecord]) -> Vec<NormalizationResult> {
        creators
            .iter()
            .filter(|c| !c.is_blank())
            .map(|creator| self.process_creator(creator))
            .collect()
    }

    fn process_creator(&self, creator: &CreatorRecord) -> NormalizationResult {
        let raw = display_name(creator);

        if let Some(learned) = self.learning.get_mapping(&raw) {
            return NormalizationResult {
                original: raw,
                creator_type: creator.creator_type.clone(),
                status: ResultStatus::Learned,
                suggestion: Some(learned),
                similars: Vec::new(),
                variants: Vec::new(),
                accepted: false,
                normalized: None,
            };
        }

        let similars = self.learning.find_similar(&raw, SIMILAR_THRESHOLD);
        let parsed = self
            .structure_creator(creator)
            .unwrap_or_else(|| self.structure(&raw));
        let variants = self.generator.generate(&parsed);

        NormalizationResult {
            original: raw,
            creator_type: creator.creator_type.clone(),
            status: ResultStatus::New,
            suggestion: None,
            similars,
            variants,
            accepted: false,
            normalized: None,
        }
    }

    fn structure_creator(&self, creator: &CreatorRecord) -> Option<ParsedName> {
        if creator.last_name.trim().is_empty() {
            return None;
        }
        Some(
            self.parser
                .parse_creator(&creator.first_name, &creator.last_name),
        )
    }

    /// Ranked suggestion list with provenance for one result: the learned
    /// target first, then fuzzy near-matches, then structural variants,
    /// with the untouched original as the final fallback.
    pub fn ranked_suggestions(&self, result: &NormalizationResult) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        if let Some(learned) = &result.suggestion {
            let score = self
                .learning
                .get_entry(&result.original)
                .map(|e| e.confidence)
                .unwrap_or(1.0);
            suggestions.push(Suggestion {
                text: learned.clone(),
                source: SuggestionSource::Learned,
                score,
            });
        }
        for similar in &result.similars {
            suggestions.push(Suggestion {
                text: similar.normalized.clone(),
                source: SuggestionSource::Learned,
                score: similar.similarity,
            });
        }
        for variant in &result.variants {
            suggestions.push(Suggestion {
                text: variant.text.clone(),
                source: SuggestionSource::Variant,
                score: jaro_winkler_similarity(&result.original, &variant.text),
            });
        }

        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        let mut seen = std::collections::HashSet::new();
        suggestions.retain(|s| seen.insert(s.text.to_lowercase()));

        suggestions.push(Suggestion {
            text: result.original.clone(),
            source: SuggestionSource::Original,
            score: 0.0,
        });
        suggestions
    }

    /// Learns every accepted result (once each) and forwards the change to
    /// the injected item updater. With `only_accepted` unset, every result
    /// carrying a normalized form is applied.
    pub fn apply_normalizations(
        &mut self,
        results: &[NormalizationResult],
        updater: &mut dyn ItemUpdate,
        only_accepted: bool,
    ) {
        for result in results {
            if only_accepted && !result.accepted {
                continue;
            }
            let normalized = result
                .normalized
                .clone()
                .or_else(|| result.suggestion.clone());
            let Some(normalized) = normalized else {
                continue;
            };
            self.learning.store_mapping(&result.original, &normalized, 1.0);
            updater.update_creator(&result.original, &normalized);
        }
        self.learning.save_quietly();
    }

    /// Aggregates surname frequencies across all items (case-insensitive
    /// key, display case from first occurrence) and runs the candidate
    /// pass over them.
    pub fn perform_library_analysis(&self, items: &[Vec<CreatorRecord>]) -> LibraryAnalysis {
        let mut surname_frequencies: HashMap<String, SurnameFrequency> = HashMap::new();
        let mut total_names = 0u32;

        for creators in items {
            for creator in creators {
                let parsed = match self.structure_creator(creator) {
                    Some(parsed) => parsed,
                    None => continue,
                };
                let surname = parsed.last_name;
                if surname.is_empty() {
                    continue;
                }
                total_names += 1;
                surname_frequencies
                    .entry(surname.to_lowercase())
                    .and_modify(|f| f.count += 1)
                    .or_insert_with(|| SurnameFrequency {
                        display: surname.clone(),
                        count: 1,
                    });
            }
        }

        let displays: Vec<String> = surname_frequencies
            .values()
            .map(|f| f.display.clone())
            .collect();
        let counts: HashMap<String, u32> = surname_frequencies
            .iter()
            .map(|(key, f)| (key.clone(), f.count))
            .collect();
        let potential_variants = self
            .finder
            .find_potential_variants(&displays, Some(&counts));

        log::debug!(
            "library analysis: {} names, {} unique surnames, {} candidate pairs",
            total_names,
            surname_frequencies.len(),
            potential_variants.len()
        );

        LibraryAnalysis {
            unique_surnames: surname_frequencies.len() as u32,
            surname_frequencies,
            total_names,
            potential_variants,
        }
    }

    /// Durability barrier for the learning store; call before shutdown.
    pub fn save(&mut self) -> Result<(), Error> {
        self.learning.force_save()
    }
}

/// Builds the raw display string for a creator record.
fn display_name(creator: &CreatorRecord) -> String {
    let first = creator.first_name.trim();
    let last = creator.last_name.trim();
    match (first.is_empty(), last.is_empty()) {
        (true, _) => last.to_string(),
        (_, true) => first.to_string(),
        _ => format!("{} {}", first, last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryBackend;

    fn engine() -> NormalizationEngine {
        NormalizationEngine::new(Box::new(MemoryBackend::new()))
    }

    #[derive(Default)]
    struct RecordingUpdater {
        calls: Vec<(String, String)>,
    }

    impl ItemUpdate for RecordingUpdater {
        fn update_creator(&mut self, original: &str, normalized: &str) {
            self.calls.push((original.to_string(), normalized.to_string()));
        }
    }

    fn creator(first: &str, last: &str) -> CreatorRecord {
        CreatorRecord::new(first, last, "author")
    }

    #[test]
    fn blank_creators_are_skipped_silently() {
        let results = engine().process_creators(&[
            creator("", ""),
            creator("John", "Smith"),
            creator("", "  "),
            creator("", "Fodor"),
        ]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].original, "John Smith");
        assert_eq!(results[1].original, "Fodor");
    }

    #[test]
    fn fresh_creator_gets_new_status_with_variants() {
        let results = engine().process_creators(&[creator("Sancho", "de la Vega")]);
        let result = &results[0];
        assert_eq!(result.status, ResultStatus::New);
        assert!(result.suggestion.is_none());
        assert!(!result.variants.is_empty());
    }

    #[test]
    fn learned_mapping_short_circuits_to_learned_status() {
        let mut engine = engine();
        engine
            .learning_mut()
            .store_mapping("J. Smith", "John Smith", 1.0);

        let results = engine.process_creators(&[creator("J.", "Smith")]);
        assert_eq!(results[0].status, ResultStatus::Learned);
        assert_eq!(results[0].suggestion.as_deref(), Some("John Smith"));
        assert!(results[0].variants.is_empty());
    }

    #[test]
    fn near_mapping_surfaces_as_similar() {
        let mut engine = engine();
        engine
            .learning_mut()
            .store_mapping("A. Johnson", "Albert Johnson", 1.0);

        let results = engine.process_creators(&[creator("A.", "Johnsen")]);
        let result = &results[0];
        assert_eq!(result.status, ResultStatus::New);
        assert!(result
            .similars
            .iter()
            .any(|s| s.normalized == "Albert Johnson"));
    }

    #[test]
    fn apply_normalizations_stores_exactly_accepted_entries() {
        let mut engine = engine();
        let mut results = engine.process_creators(&[
            creator("J.", "Smith"),
            creator("R.", "Smyth"),
            creator("A.", "Johnsen"),
        ]);
        results[0].accepted = true;
        results[0].normalized = Some("John Smith".to_string());
        results[1].accepted = false;
        results[1].normalized = Some("Robert Smyth".to_string());
        results[2].accepted = true;
        results[2].normalized = Some("Albert Johnson".to_string());

        let mut updater = RecordingUpdater::default();
        engine.apply_normalizations(&results, &mut updater, true);

        assert_eq!(updater.calls.len(), 2);
        assert_eq!(
            updater.calls[0],
            ("J. Smith".to_string(), "John Smith".to_string())
        );
        assert_eq!(engine.learning().len(), 2);
        assert_eq!(
            engine.learning().get_mapping("J. Smith").as_deref(),
            Some("John Smith")
        );
        assert_eq!(engine.learning().get_mapping("R. Smyth"), None);
    }

    #[test]
    fn library_analysis_counts_surnames() {
        let engine = engine();
        let items = vec![
            vec![creator("John", "Smith"), creator("Ann", "Johnson")],
            vec![creator("Jane", "smith")],
        ];
        let analysis = engine.perform_library_analysis(&items);

        assert_eq!(analysis.total_names, 3);
        assert_eq!(analysis.unique_surnames, 2);
        assert_eq!(analysis.surname_frequencies["smith"].count, 2);
        assert_eq!(analysis.surname_frequencies["johnson"].count, 1);
        // Display casing comes from the first occurrence
        assert_eq!(analysis.surname_frequencies["smith"].display, "Smith");
    }

    #[test]
    fn library_analysis_feeds_candidate_finder() {
        let engine = engine();
        let items = vec![
            vec![creator("John", "Smith")],
            vec![creator("Jon", "Smyth")],
            vec![creator("Ann", "Johnson")],
            vec![creator("Arne", "Johnsen")],
        ];
        let analysis = engine.perform_library_analysis(&items);
        assert!(!analysis.potential_variants.is_empty());
        assert!(analysis
            .potential_variants
            .iter()
            .all(|p| p.similarity >= 0.70));
    }

    #[test]
    fn ranked_suggestions_carry_provenance() {
        let mut engine = engine();
        engine
            .learning_mut()
            .store_mapping("Smyth, J.", "John Smith", 1.0);

        let results = engine.process_creators(&[creator("J.", "Smyth")]);
        let suggestions = engine.ranked_suggestions(&results[0]);

        assert!(!suggestions.is_empty());
        // Original is always present and last
        let last = suggestions.last().unwrap();
        assert_eq!(last.source, SuggestionSource::Original);
        assert_eq!(last.text, "J. Smyth");
        for window in suggestions[..suggestions.len() - 1].windows(2) {
            assert!(window[0].score >= window[1].score);
        }
    }

    #[test]
    fn structurer_overrides_rule_based_parse() {
        struct FixedStructurer;
        impl NameStructurer for FixedStructurer {
            fn analyze(&self, raw: &str) -> Option<ParsedName> {
                if raw == "J. Smith" {
                    let mut parsed = ParsedName::empty();
                    parsed.first_name = "Josephine".to_string();
                    parsed.last_name = "Smith".to_string();
                    Some(parsed)
                } else {
                    None
                }
            }
        }

        let engine = engine().with_structurer(Box::new(FixedStructurer));
        let parsed = engine.structure("J. Smith");
        assert_eq!(parsed.first_name, "Josephine");
        // Fallback path still works when the structurer declines
        let parsed = engine.structure("Jane Doe");
        assert_eq!(parsed.last_name, "Doe");
    }
}
