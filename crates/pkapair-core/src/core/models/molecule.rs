use super::atom::Atom;
use super::bond::{Bond, BondOrder};
use super::element::Element;
use serde::{Deserialize, Serialize};

/// A small-molecule chemical graph: atoms, bonds, and a cached adjacency list.
///
/// Atoms are addressed by their position in the atom list, matching the atom
/// ordering of the SDF record the graph was parsed from. Site predictions
/// produced by external pKa predictors reference exactly these positional
/// indices, so the graph never reorders or compacts its atom list.
///
/// Duplication is plain [`Clone`]: the pair generator takes one deep copy per
/// titratable site so that transformations at different sites never observe
/// each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoleculeGraph {
    /// Atoms in input order.
    atoms: Vec<Atom>,
    /// All bonds in the graph.
    bonds: Vec<Bond>,
    /// Cached adjacency list, indexed in parallel with `atoms`.
    adjacency: Vec<Vec<usize>>,
}

impl MoleculeGraph {
    /// Creates a new, empty molecular graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Retrieves an immutable reference to an atom by its index.
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Retrieves a mutable reference to an atom by its index.
    pub fn atom_mut(&mut self, index: usize) -> Option<&mut Atom> {
        self.atoms.get_mut(index)
    }

    /// Returns an iterator over `(index, &Atom)` pairs in input order.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (usize, &Atom)> {
        self.atoms.iter().enumerate()
    }

    /// Returns a slice of all bonds in the graph.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Appends an atom and returns its index.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        self.atoms.len() - 1
    }

    /// Adds a bond between two atoms.
    ///
    /// This method is idempotent; adding an existing bond succeeds without
    /// creating duplicates.
    ///
    /// # Return
    ///
    /// Returns `Some(())` if successful, otherwise `None` (e.g., if either
    /// index is out of bounds or the bond would be a self-loop).
    pub fn add_bond(&mut self, atom1: usize, atom2: usize, order: BondOrder) -> Option<()> {
        if atom1 == atom2 || atom1 >= self.atoms.len() || atom2 >= self.atoms.len() {
            return None;
        }

        if self.adjacency[atom1].contains(&atom2) {
            return Some(());
        }

        self.bonds.push(Bond::new(atom1, atom2, order));
        self.adjacency[atom1].push(atom2);
        self.adjacency[atom2].push(atom1);
        Some(())
    }

    /// Retrieves the bonded neighbors of an atom.
    pub fn neighbors(&self, index: usize) -> Option<&[usize]> {
        self.adjacency.get(index).map(|v| v.as_slice())
    }

    /// Number of explicit bonds incident to an atom.
    pub fn degree(&self, index: usize) -> Option<usize> {
        self.adjacency.get(index).map(|v| v.len())
    }

    /// Finds the bond connecting two atoms, if any.
    pub fn bond_between(&self, atom1: usize, atom2: usize) -> Option<&Bond> {
        self.bonds
            .iter()
            .find(|b| b.contains(atom1) && b.contains(atom2))
    }

    /// Sum of bond orders incident to an atom (aromatic bonds count 1.5).
    pub fn bond_order_sum(&self, index: usize) -> f64 {
        self.bonds
            .iter()
            .filter(|b| b.contains(index))
            .map(|b| b.order.as_valence())
            .sum()
    }

    /// Total hydrogen count at an atom: implicit hydrogens plus explicit
    /// hydrogen neighbors.
    ///
    /// This is the quantity the canonical pair-ordering rule compares: the
    /// member of a conjugate pair with the higher total hydrogen count at
    /// the titratable site is the protonated one.
    pub fn total_hydrogens(&self, index: usize) -> Option<u8> {
        let atom = self.atoms.get(index)?;
        let explicit = self.adjacency[index]
            .iter()
            .filter(|&&n| self.atoms[n].element == Element::H)
            .count() as u8;
        Some(atom.implicit_hydrogens + explicit)
    }

    /// Whether a bond is part of a ring.
    ///
    /// A bond is a ring bond iff its endpoints stay connected when the bond
    /// itself is ignored.
    pub fn bond_in_ring(&self, bond: &Bond) -> bool {
        let mut visited = vec![false; self.atoms.len()];
        let mut stack = vec![bond.atom1];
        visited[bond.atom1] = true;

        while let Some(current) = stack.pop() {
            for &next in &self.adjacency[current] {
                if current == bond.atom1 && next == bond.atom2 {
                    continue;
                }
                if current == bond.atom2 && next == bond.atom1 {
                    continue;
                }
                if !visited[next] {
                    if next == bond.atom2 {
                        return true;
                    }
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }
        false
    }
}
