// src/lib.rs

pub mod core;
pub mod fuzzy;
pub mod learning;
pub mod persistence;

pub use crate::core::engine::NormalizationEngine;
