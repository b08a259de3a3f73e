// src/fuzzy/mod.rs

pub mod candidates;
pub mod similarity;
