//! Core pipeline orchestration and domain logic for autodict.
//!
//! This crate ties together executable discovery, documentation lookups,
//! and dictionary assembly into end-to-end workflows (e.g., `build_dictionary`).

pub mod assembler;
pub mod enrichment;
pub mod pipeline;
