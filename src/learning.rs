// src/learning.rs
//! Persistent raw-name -> normalized-name mappings with confidence scores.
//!
//! The whole store is loaded once at construction and the in-memory cache
//! is the source of truth for the session: reads always see the latest
//! write, flushed or not. Writes mark the cache dirty and coalesce into a
//! single backend flush at `force_save`.

use std::collections::HashMap;
use std::io::Error;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::types::{LearnedMapping, SimilarMatch};
use crate::fuzzy::similarity::jaro_winkler_similarity;
use crate::persistence::MappingBackend;

/// Default fuzzy-lookup acceptance threshold.
pub const SIMILAR_THRESHOLD: f64 = 0.85;

/// Field separator in the backend's value encoding
/// (`value\0confidence\0timestamp`).
const FIELD_SEP: char = '\u{0}';

pub struct LearningEngine {
    cache: HashMap<String, LearnedMapping>,
    backend: Box<dyn MappingBackend>,
    dirty: bool,
}

impl LearningEngine {
    /// Loads every stored mapping from the backend into the cache. A
    /// backend is required by construction; "no backend configured" is a
    /// wiring error that cannot occur at runtime.
    pub fn new(backend: Box<dyn MappingBackend>) -> Self {
        let mut cache = HashMap::new();
        for key in backend.keys() {
            if let Some(encoded) = backend.get(&key) {
                cache.insert(key.clone(), decode_mapping(&key, &encoded));
            }
        }
        log::debug!("learning store loaded with {} mappings", cache.len());
        Self {
            cache,
            backend,
            dirty: false,
        }
    }

    /// Upserts a mapping under the normalized key. The value is always
    /// overwritten; a previously learned higher confidence is retained.
    /// The write is deferred: only `force_save` touches durable storage.
    pub fn store_mapping(&mut self, raw: &str, normalized: &str, confidence: f64) {
        let key = normalize_key(raw);
        if key.is_empty() || normalized.trim().is_empty() {
            return;
        }
        let value = collapse_whitespace(normalized);
        let confidence = confidence.clamp(0.0, 1.0);

        let confidence = match self.cache.get(&key) {
            Some(existing) if existing.confidence > confidence => existing.confidence,
            _ => confidence,
        };

        let mapping = LearnedMapping {
            key: key.clone(),
            value,
            confidence,
            timestamp: unix_now(),
        };
        self.backend.set(&key, &encode_mapping(&mapping));
        self.cache.insert(key, mapping);
        self.dirty = true;
    }

    /// Exact-key lookup; never fails, a miss is `None`.
    pub fn get_mapping(&self, raw: &str) -> Option<String> {
        self.cache
            .get(&normalize_key(raw))
            .map(|m| m.value.clone())
    }

    /// Full stored entry, including confidence and timestamp.
    pub fn get_entry(&self, raw: &str) -> Option<&LearnedMapping> {
        self.cache.get(&normalize_key(raw))
    }

    /// Linear scan of all stored keys for fuzzy matches at or above
    /// `threshold`, sorted by descending similarity. O(n) in the store
    /// size, which is fine for per-author lookups.
    pub fn find_similar(&self, raw: &str, threshold: f64) -> Vec<SimilarMatch> {
        let probe = normalize_key(raw);
        if probe.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<SimilarMatch> = self
            .cache
            .values()
            .filter_map(|mapping| {
                let similarity = jaro_winkler_similarity(&probe, &mapping.key);
                if similarity >= threshold {
                    Some(SimilarMatch {
                        raw: mapping.key.clone(),
                        normalized: mapping.value.clone(),
                        similarity,
                    })
                } else {
                    None
                }
            })
            .collect();
        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches
    }

    /// Manual removal; mappings are never deleted automatically.
    pub fn remove_mapping(&mut self, raw: &str) -> bool {
        let key = normalize_key(raw);
        if self.cache.remove(&key).is_some() {
            self.backend.remove(&key);
            self.dirty = true;
            true
        } else {
            false
        }
    }

    /// Synchronous durability barrier for all pending writes. Call before
    /// shutdown; tests use it for determinism.
    pub fn force_save(&mut self) -> Result<(), Error> {
        if !self.dirty {
            return Ok(());
        }
        self.backend.flush()?;
        self.dirty = false;
        Ok(())
    }

    /// Best-effort variant of `force_save`: failures are logged, learning
    /// must never block normalization.
    pub fn save_quietly(&mut self) {
        if let Err(e) = self.force_save() {
            log::warn!("learned-mapping flush failed, keeping in-memory state: {}", e);
        }
    }

    pub fn mappings(&self) -> impl Iterator<Item = &LearnedMapping> {
        self.cache.values()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Lowercased, whitespace-collapsed form used for all key matching.
pub fn normalize_key(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn encode_mapping(mapping: &LearnedMapping) -> String {
    format!(
        "{}{}{}{}{}",
        mapping.value, FIELD_SEP, mapping.confidence, FIELD_SEP, mapping.timestamp
    )
}

/// Tolerant decoder: bare values (or a value with only a confidence field)
/// from older stores default the missing fields.
fn decode_mapping(key: &str, encoded: &str) -> LearnedMapping {
    let mut fields = encoded.splitn(3, FIELD_SEP);
    let value = fields.next().unwrap_or_default().to_string();
    let confidence = fields
        .next()
        .and_then(|f| f.parse::<f64>().ok())
        .unwrap_or(1.0)
        .clamp(0.0, 1.0);
    let timestamp = fields
        .next()
        .and_then(|f| f.parse::<u64>().ok())
        .unwrap_or(0);
    LearnedMapping {
        key: key.to_string(),
        value,
        confidence,
        timestamp,
    }
}
