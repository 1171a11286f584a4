//! # Workflows Module
//!
//! The highest-level, user-facing layer: complete pipeline procedures tying
//! the `core` and `engine` layers together.
//!
//! - [`enumerate`] drives the per-molecule state machine over a stream of
//!   input records and produces the run's output mapping.
//! - [`encode`] converts a finished output mapping into training-ready
//!   paired graphs, in parallel across molecules.

pub mod encode;
pub mod enumerate;
