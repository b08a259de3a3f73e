// src/core/variants.rs
//! Bounded generation of plausible alternate renderings of a parsed name.
//! Strategy application order is fixed, so identical input always yields
//! the identical sequence.

use crate::core::types::{ParsedName, Variant, VariantKind};

/// Hard cap on the produced sequence length.
const MAX_VARIANTS: usize = 20;

#[derive(Debug, Clone, Copy, Default)]
pub struct VariantGenerator;

impl VariantGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Produces the deduped union of all strategies, capped at
    /// `MAX_VARIANTS`. Non-empty for any non-empty parsed name.
    pub fn generate(&self, parsed: &ParsedName) -> Vec<Variant> {
        let mut variants = Vec::new();
        if parsed.is_empty() {
            return variants;
        }

        self.push_initials(parsed, &mut variants);
        self.push_expanded(parsed, &mut variants);
        self.push_particle_forms(parsed, &mut variants);
        self.push_reordered(parsed, &mut variants);

        dedup_in_order(&mut variants);
        variants.truncate(MAX_VARIANTS);
        variants
    }

    /// Replace expanded given names with dotted initials, in both
    /// "Initial Last" and "Last, Initial" orders.
    fn push_initials(&self, parsed: &ParsedName, out: &mut Vec<Variant>) {
        if parsed.first_name.is_empty() || parsed.last_name.is_empty() {
            return;
        }
        let initials: Vec<String> = parsed
            .first_name
            .split_whitespace()
            .filter_map(|t| t.chars().next())
            .map(|c| format!("{}.", c.to_uppercase()))
            .collect();
        if initials.is_empty() {
            return;
        }
        let joined = initials.join(" ");
        push(out, format!("{} {}", joined, parsed.last_name), VariantKind::Initials);
        push(out, format!("{}, {}", parsed.last_name, joined), VariantKind::Initials);
    }

    /// No dictionary of full names exists, so an initials-only input is
    /// never expanded; this strategy only reformats what is already there
    /// (compacts "J. A." into "J.A.").
    fn push_expanded(&self, parsed: &ParsedName, out: &mut Vec<Variant>) {
        if parsed.first_name.is_empty() || parsed.last_name.is_empty() {
            return;
        }
        let tokens: Vec<&str> = parsed.first_name.split_whitespace().collect();
        let all_initials = tokens
            .iter()
            .all(|t| t.ends_with('.') || t.chars().count() == 1);
        if !all_initials {
            return;
        }
        let compact: String = tokens
            .iter()
            .filter_map(|t| t.chars().next())
            .map(|c| format!("{}.", c.to_uppercase()))
            .collect();
        push(out, format!("{} {}", compact, parsed.last_name), VariantKind::Expanded);
        push(out, format!("{}, {}", parsed.last_name, compact), VariantKind::Expanded);
    }

    /// Both particle-attached ("de la Vega") and particle-detached ("Vega")
    /// surname forms.
    fn push_particle_forms(&self, parsed: &ParsedName, out: &mut Vec<Variant>) {
        if parsed.particles.is_empty() {
            return;
        }
        let bare = parsed.bare_surname().to_string();
        if bare.is_empty() {
            return;
        }
        if parsed.first_name.is_empty() {
            push(out, parsed.last_name.clone(), VariantKind::ParticleVariant);
            push(out, bare, VariantKind::ParticleVariant);
        } else {
            push(
                out,
                format!("{} {}", parsed.first_name, parsed.last_name),
                VariantKind::ParticleVariant,
            );
            push(
                out,
                format!("{} {}", parsed.first_name, bare),
                VariantKind::ParticleVariant,
            );
            push(
                out,
                format!("{}, {}", bare, parsed.first_name),
                VariantKind::ParticleVariant,
            );
        }
    }

    /// Swap between "First Last" and "Last, First" representations.
    fn push_reordered(&self, parsed: &ParsedName, out: &mut Vec<Variant>) {
        if parsed.first_name.is_empty() {
            push(out, parsed.last_name.clone(), VariantKind::Reordered);
            return;
        }
        if parsed.last_name.is_empty() {
            push(out, parsed.first_name.clone(), VariantKind::Reordered);
            return;
        }
        push(
            out,
            format!("{} {}", parsed.first_name, parsed.last_name),
            VariantKind::Reordered,
        );
        push(
            out,
            format!("{}, {}", parsed.last_name, parsed.first_name),
            VariantKind::Reordered,
        );
    }
}

fn push(out: &mut Vec<Variant>, text: String, kind: VariantKind) {
    if !text.is_empty() {
        out.push(Variant { text, kind });
    }
}

/// Removes duplicate texts, keeping the first occurrence's position and tag.
fn dedup_in_order(variants: &mut Vec<Variant>) {
    let mut seen = std::collections::HashSet::new();
    variants.retain(|v| seen.insert(v.text.clone()));
}
