use crate::core::models::element::Element;
use crate::core::models::molecule::MoleculeGraph;
use thiserror::Error;

/// Recoverable failures of a single protonation-state edit.
///
/// A failed transform skips the affected site; it never aborts the run.
#[derive(Debug, Error, PartialEq)]
pub enum TransformError {
    #[error("Atom index {index} is out of bounds for a molecule with {atom_count} atoms")]
    AtomIndexOutOfBounds { index: usize, atom_count: usize },

    #[error("Atom {index} carries no proton to remove")]
    NoRemovableProton { index: usize },

    #[error("Protonating atom {index} ({element}) would exceed its valence")]
    ValenceExceeded { index: usize, element: Element },

    #[error("No valence model for atom {index} ({element}) at charge {charge}")]
    UnmodeledValence {
        index: usize,
        element: Element,
        charge: i8,
    },
}

/// Adds one proton at the given atom: implicit hydrogen +1, formal charge +1.
///
/// Exchangeable hydrogens are implicit (the input convention strips explicit
/// hydrogens), so the edit never inserts atoms and positional indices stay
/// valid across the transformation.
pub fn protonate(graph: &mut MoleculeGraph, index: usize) -> Result<(), TransformError> {
    let atom_count = graph.atom_count();
    let bond_sum = graph.bond_order_sum(index).round() as i64;
    let atom = graph
        .atom_mut(index)
        .ok_or(TransformError::AtomIndexOutOfBounds { index, atom_count })?;

    let new_charge = atom.formal_charge + 1;
    let allowed =
        atom.element
            .valence_for_charge(new_charge)
            .ok_or(TransformError::UnmodeledValence {
                index,
                element: atom.element,
                charge: new_charge,
            })?;

    if bond_sum + atom.implicit_hydrogens as i64 + 1 > allowed as i64 {
        return Err(TransformError::ValenceExceeded {
            index,
            element: atom.element,
        });
    }

    atom.implicit_hydrogens += 1;
    atom.formal_charge = new_charge;
    Ok(())
}

/// Removes one proton at the given atom: implicit hydrogen -1, formal charge -1.
pub fn deprotonate(graph: &mut MoleculeGraph, index: usize) -> Result<(), TransformError> {
    let atom_count = graph.atom_count();
    let atom = graph
        .atom_mut(index)
        .ok_or(TransformError::AtomIndexOutOfBounds { index, atom_count })?;

    if atom.implicit_hydrogens == 0 {
        return Err(TransformError::NoRemovableProton { index });
    }

    let new_charge = atom.formal_charge - 1;
    atom.element
        .valence_for_charge(new_charge)
        .ok_or(TransformError::UnmodeledValence {
            index,
            element: atom.element,
            charge: new_charge,
        })?;

    atom.implicit_hydrogens -= 1;
    atom.formal_charge = new_charge;
    Ok(())
}
