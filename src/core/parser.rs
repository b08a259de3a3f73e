// src/core/parser.rs
//! Rule-based structural parsing of raw author-name strings.
//!
//! The parser never fails: malformed input degrades to a partial or empty
//! `ParsedName`. Particle and suffix tables are tuned for Latin-alphabet
//! Western/Romance conventions; anything outside them is best-effort.

use crate::core::types::ParsedName;

/// Known surname particles, matched case-insensitively.
const PARTICLES: &[&str] = &[
    "van", "von", "de", "la", "del", "der", "den", "di", "da", "le", "du",
    "dos", "das", "do", "ter", "ten", "el",
];

/// Generational suffixes, matched case-insensitively with or without a dot.
const SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv", "v"];

/// Optional pre-parse hook: an external component (e.g. an NER model) that
/// can structure a raw name. Returning `None` falls back to the rule-based
/// parser; absence of any structurer is the normal configuration.
pub trait NameStructurer {
    fn analyze(&self, raw: &str) -> Option<ParsedName>;
}

/// Splits raw name strings into structured components.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameParser;

impl NameParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses "First Last", "Last, First", or arbitrary token runs.
    /// Empty input yields an empty `ParsedName`; a single token is taken
    /// entirely as the surname.
    pub fn parse(&self, raw: &str) -> ParsedName {
        let cleaned = collapse_whitespace(raw);
        if cleaned.is_empty() {
            return ParsedName::empty();
        }

        if let Some(comma_pos) = cleaned.find(',') {
            let last_part = cleaned[..comma_pos].trim();
            let first_part = cleaned[comma_pos + 1..].trim();
            return self.parse_comma_form(last_part, first_part);
        }

        let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
        let suffix = take_trailing_suffix(&mut tokens);

        if tokens.is_empty() {
            let mut parsed = ParsedName::empty();
            parsed.suffix = suffix;
            return parsed;
        }
        if tokens.len() == 1 {
            return ParsedName {
                first_name: String::new(),
                last_name: tokens[0].to_string(),
                particles: Vec::new(),
                suffix,
                initials: Vec::new(),
            };
        }

        // Final token is the surname head; absorb the contiguous particle
        // run immediately before it into the surname.
        let head_idx = tokens.len() - 1;
        let mut surname_start = head_idx;
        while surname_start > 0 && is_particle(tokens[surname_start - 1]) {
            surname_start -= 1;
        }
        // A name that is nothing but particles plus a head keeps at least
        // one token as the given name when possible.
        if surname_start == 0 && tokens.len() > 1 {
            surname_start = if is_particle(tokens[0]) { 0 } else { 1 };
        }

        let particles: Vec<String> = tokens[surname_start..head_idx]
            .iter()
            .map(|t| t.to_string())
            .collect();
        let last_name = tokens[surname_start..].join(" ");
        let first_name = tokens[..surname_start].join(" ");
        let initials = derive_initials(&first_name);

        ParsedName {
            first_name,
            last_name,
            particles,
            suffix,
            initials,
        }
    }

    /// Builds a `ParsedName` directly from a {firstName, lastName} creator
    /// record, detecting particles and suffix inside the surname field.
    pub fn parse_creator(&self, first_name: &str, last_name: &str) -> ParsedName {
        let first = collapse_whitespace(first_name);
        let last = collapse_whitespace(last_name);
        if first.is_empty() && last.is_empty() {
            return ParsedName::empty();
        }
        if last.is_empty() {
            // Only a given name present; fall back to positional parsing.
            return self.parse(&first);
        }

        let mut last_tokens: Vec<&str> = last.split_whitespace().collect();
        let suffix = take_trailing_suffix(&mut last_tokens);

        let particles = leading_particles(&last_tokens);
        let initials = derive_initials(&first);
        ParsedName {
            first_name: first,
            last_name: last_tokens.join(" "),
            particles,
            suffix,
            initials,
        }
    }

    fn parse_comma_form(&self, last_part: &str, first_part: &str) -> ParsedName {
        let mut last_tokens: Vec<&str> = last_part.split_whitespace().collect();
        let mut first_tokens: Vec<&str> = first_part.split_whitespace().collect();

        // A suffix may trail either segment ("Smith Jr., John" or
        // "Smith, John Jr.").
        let suffix =
            take_trailing_suffix(&mut last_tokens).or_else(|| take_trailing_suffix(&mut first_tokens));

        let particles = leading_particles(&last_tokens);
        let first_name = first_tokens.join(" ");
        let initials = derive_initials(&first_name);
        ParsedName {
            first_name,
            last_name: last_tokens.join(" "),
            particles,
            suffix,
            initials,
        }
    }
}

/// Contiguous particle run at the front of a surname token list; the final
/// token is always kept as the surname head.
fn leading_particles(tokens: &[&str]) -> Vec<String> {
    let mut count = 0;
    while count + 1 < tokens.len() && is_particle(tokens[count]) {
        count += 1;
    }
    tokens[..count].iter().map(|t| t.to_string()).collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_particle(token: &str) -> bool {
    PARTICLES.iter().any(|p| token.eq_ignore_ascii_case(p))
}

fn is_suffix(token: &str) -> bool {
    let stripped = token.strip_suffix('.').unwrap_or(token);
    SUFFIXES.iter().any(|s| stripped.eq_ignore_ascii_case(s))
}

/// Removes and returns a trailing suffix token ("Jr", "III", ...) if present.
fn take_trailing_suffix(tokens: &mut Vec<&str>) -> Option<String> {
    if tokens.len() > 1 && is_suffix(tokens[tokens.len() - 1]) {
        let token = tokens.pop().unwrap_or_default();
        Some(token.strip_suffix('.').unwrap_or(token).to_string())
    } else {
        None
    }
}

/// First letters of dotted or single-letter given-name tokens.
fn derive_initials(first_name: &str) -> Vec<char> {
    first_name
        .split_whitespace()
        .filter(|t| t.ends_with('.') || t.chars().count() == 1)
        .filter_map(|t| t.chars().next())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_last() {
        let parsed = NameParser::new().parse("John Smith");
        assert_eq!(parsed.first_name, "John");
        assert_eq!(parsed.last_name, "Smith");
        assert!(parsed.particles.is_empty());
        assert_eq!(parsed.suffix, None);
    }

    #[test]
    fn parses_dotted_initial() {
        let parsed = NameParser::new().parse("J. Smith");
        assert_eq!(parsed.first_name, "J.");
        assert_eq!(parsed.last_name, "Smith");
        assert_eq!(parsed.initials, vec!['J']);
    }

    #[test]
    fn parses_comma_form() {
        let parsed = NameParser::new().parse("Smith, John");
        assert_eq!(parsed.first_name, "John");
        assert_eq!(parsed.last_name, "Smith");
    }

    #[test]
    fn keeps_compound_particle_surname_whole() {
        let parsed = NameParser::new().parse("de la Vega, Sancho");
        assert_eq!(parsed.first_name, "Sancho");
        assert_eq!(parsed.last_name, "de la Vega");
        assert_eq!(parsed.particles, vec!["de".to_string(), "la".to_string()]);
        assert_eq!(parsed.bare_surname(), "Vega");
    }

    #[test]
    fn absorbs_particles_in_positional_form() {
        let parsed = NameParser::new().parse("Sancho de la Vega");
        assert_eq!(parsed.first_name, "Sancho");
        assert_eq!(parsed.last_name, "de la Vega");
        assert_eq!(parsed.particles, vec!["de".to_string(), "la".to_string()]);

        let parsed = NameParser::new().parse("Ludwig van Beethoven");
        assert_eq!(parsed.first_name, "Ludwig");
        assert_eq!(parsed.last_name, "van Beethoven");
    }

    #[test]
    fn splits_trailing_suffix() {
        let parsed = NameParser::new().parse("Martin Luther King Jr.");
        assert_eq!(parsed.last_name, "King");
        assert_eq!(parsed.first_name, "Martin Luther");
        assert_eq!(parsed.suffix.as_deref(), Some("Jr"));

        let parsed = NameParser::new().parse("Smith, John Jr.");
        assert_eq!(parsed.first_name, "John");
        assert_eq!(parsed.last_name, "Smith");
        assert_eq!(parsed.suffix.as_deref(), Some("Jr"));
    }

    #[test]
    fn empty_and_single_token_degrade() {
        assert_eq!(NameParser::new().parse(""), ParsedName::empty());
        assert_eq!(NameParser::new().parse("   "), ParsedName::empty());

        let parsed = NameParser::new().parse("Smith");
        assert_eq!(parsed.first_name, "");
        assert_eq!(parsed.last_name, "Smith");
    }

    #[test]
    fn collapses_messy_whitespace() {
        let parsed = NameParser::new().parse("  Jerry   A.  Fodor ");
        assert_eq!(parsed.first_name, "Jerry A.");
        assert_eq!(parsed.last_name, "Fodor");
        assert_eq!(parsed.initials, vec!['A']);
    }

    #[test]
    fn multiple_initials_collected_in_order() {
        let parsed = NameParser::new().parse("J. A. Fodor");
        assert_eq!(parsed.initials, vec!['J', 'A']);
    }

    #[test]
    fn creator_record_form() {
        let parsed = NameParser::new().parse_creator("Sancho", "de la Vega");
        assert_eq!(parsed.first_name, "Sancho");
        assert_eq!(parsed.last_name, "de la Vega");
        assert_eq!(parsed.particles.len(), 2);
        assert_eq!(parsed.display(), "Sancho de la Vega");

        let parsed = NameParser::new().parse_creator("", "");
        assert!(parsed.is_empty());
    }

    #[test]
    fn display_round_trips_full_name() {
        let parsed = NameParser::new().parse("de la Vega, Sancho");
        assert_eq!(parsed.display(), "Sancho de la Vega");

        let parsed = NameParser::new().parse("Martin Luther King Jr.");
        assert_eq!(parsed.display(), "Martin Luther King, Jr");
    }
}
