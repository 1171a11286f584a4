//! Data structures for representing annotated small molecules.
//!
//! The central type is [`record::MoleculeRecord`]: an owned chemical graph
//! ([`molecule::MoleculeGraph`]) plus the key/value annotation map that the
//! dataset pipeline reads predictor output from and writes state bookkeeping
//! into. Atoms are addressed positionally, in the order of the source SDF
//! atom block, because external site predictions reference exactly those
//! ordinals.

pub mod atom;
pub mod bond;
pub mod element;
pub mod molecule;
pub mod record;
