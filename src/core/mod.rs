// src/core/mod.rs

pub mod engine;
pub mod parser;
pub mod types;
pub mod variants;
