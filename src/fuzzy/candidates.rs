// src/fuzzy/candidates.rs
//! Pairwise scan over a library's surnames for likely variant pairs.
//!
//! Deliberately O(n^2): library surname counts sit in the low thousands,
//! where the quadratic pass is fast enough and needs no blocking index.
//! The pass is side-effect-free, so callers may abandon its result.

use std::collections::HashMap;

use crate::core::types::CandidatePair;
use crate::fuzzy::similarity::{initials_compatible, jaro_winkler_similarity};

/// Pairs at or above this similarity are accepted outright.
const ACCEPT_THRESHOLD: f64 = 0.80;
/// Initial-compatible pairs are accepted down to this floor.
const RELAXED_THRESHOLD: f64 = 0.70;

#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateFinder;

impl CandidateFinder {
    pub fn new() -> Self {
        Self
    }

    /// Scores every unordered pair of distinct surnames with Jaro-Winkler
    /// and keeps those at/above 0.80, or at/above 0.70 when the pair is
    /// initial-compatible. Result is sorted by descending similarity, ties
    /// broken by descending combined frequency. A surname missing from
    /// `frequencies` counts as occurring once.
    pub fn find_potential_variants(
        &self,
        surnames: &[String],
        frequencies: Option<&HashMap<String, u32>>,
    ) -> Vec<CandidatePair> {
        let mut pairs = Vec::new();

        for i in 0..surnames.len() {
            for j in (i + 1)..surnames.len() {
                let a = surnames[i].trim();
                let b = surnames[j].trim();
                if a.is_empty() || b.is_empty() || a.eq_ignore_ascii_case(b) {
                    continue;
                }

                let similarity = jaro_winkler_similarity(a, b);
                let accepted = similarity >= ACCEPT_THRESHOLD
                    || (similarity >= RELAXED_THRESHOLD && initials_compatible(a, b));
                if !accepted {
                    continue;
                }

                pairs.push(CandidatePair {
                    name1: a.to_string(),
                    name2: b.to_string(),
                    frequency1: lookup_frequency(frequencies, a),
                    frequency2: lookup_frequency(frequencies, b),
                    similarity,
                });
            }
        }

        pairs.sort_by(|x, y| {
            y.similarity.total_cmp(&x.similarity).then_with(|| {
                let fx = x.frequency1 + x.frequency2;
                let fy = y.frequency1 + y.frequency2;
                fy.cmp(&fx)
            })
        });
        pairs
    }
}

fn lookup_frequency(frequencies: Option<&HashMap<String, u32>>, surname: &str) -> u32 {
    frequencies
        .and_then(|map| {
            map.get(surname)
                .or_else(|| map.get(&surname.to_lowercase()))
        })
        .copied()
        .unwrap_or(1)
}
