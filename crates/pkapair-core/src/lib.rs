//! # pKa Pair Core Library
//!
//! A library for building labeled datasets of molecular protonation-state
//! pairs: for every titratable site a pKa predictor annotates on an input
//! molecule, it constructs the matched (protonated, deprotonated) conjugate
//! pair, assigns stable identifiers, validates internal consistency, and
//! renders the result as feature-annotated paired graphs for training pKa
//! prediction models.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure
//! a clear separation of concerns, making it modular, testable, and
//! extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models
//!   (`MoleculeGraph`, `MoleculeRecord`), SDF I/O with transparent gzip
//!   detection, and deterministic SMILES serialization.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer implements the
//!   enumeration pipeline: the acid/base site classifier, valence-checked
//!   protonation transforms, the per-polarity state-pair generators with
//!   their threaded run counters, and the pair-consistency validator.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level,
//!   user-facing layer. [`workflows::enumerate`] drives the sequential
//!   per-molecule state machine; [`workflows::encode`] fans the finished
//!   output across a worker pool to produce training-ready paired graphs
//!   via [`encoding`].

pub mod core;
pub mod encoding;
pub mod engine;
pub mod workflows;
