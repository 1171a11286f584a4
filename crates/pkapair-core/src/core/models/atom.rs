use super::element::Element;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Represents an atom in a molecular graph with its chemical properties.
///
/// Hydrogens on titratable sites are tracked implicitly via
/// [`implicit_hydrogens`](Self::implicit_hydrogens); the protonation-state
/// transforms edit that count together with the formal charge. Positions are
/// carried through from the input file so that generated states can be
/// written back out with the parent geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// The chemical element of this atom.
    pub element: Element,
    /// The formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Number of implicit hydrogens attached to this atom.
    pub implicit_hydrogens: u8,
    /// Whether this atom is part of an aromatic system.
    pub aromatic: bool,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new neutral, non-aromatic atom with no implicit hydrogens.
    pub fn new(element: Element, position: Point3<f64>) -> Self {
        Self {
            element,
            formal_charge: 0,
            implicit_hydrogens: 0,
            aromatic: false,
            position,
        }
    }
}
