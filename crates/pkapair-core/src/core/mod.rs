//! # Core Module
//!
//! Stateless building blocks for the protonation-state dataset pipeline.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Annotated small-molecule
//!   graphs with positional atom indexing
//! - **File I/O** ([`io`]) - Streaming SDF records with transparent gzip
//!   detection
//! - **SMILES Serialization** ([`smiles`]) - Deterministic canonical SMILES
//!   generation for generated states

pub mod io;
pub mod models;
pub mod smiles;
