//! Deterministic SMILES generation for molecular graphs.
//!
//! Every generated protonation state is annotated with a SMILES string, and
//! downstream tooling relies on that string being stable: the same graph
//! must always serialize to the same SMILES. Atoms are first assigned
//! canonical ranks by iterative refinement of local invariants, then the
//! string is emitted by a depth-first traversal that always follows the
//! lowest-ranked neighbor, with ring-closure digits for non-tree bonds.
//!
//! Stereochemistry is not emitted; the upstream pipeline strips stereo
//! before state enumeration.

use crate::core::models::bond::BondOrder;
use crate::core::models::element::Element;
use crate::core::models::molecule::MoleculeGraph;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Writes the canonical SMILES of a molecular graph.
pub fn write_smiles(graph: &MoleculeGraph) -> String {
    if graph.atom_count() == 0 {
        return String::new();
    }

    let ranks = canonical_ranks(graph);
    let mut emitter = Emitter::new(graph, &ranks);
    emitter.run()
}

/// Assigns each atom a unique canonical rank.
///
/// Starts from local invariants (element, charge, hydrogen count, degree,
/// aromaticity), refines by neighborhood until stable, and breaks remaining
/// ties deterministically by atom index.
fn canonical_ranks(graph: &MoleculeGraph) -> Vec<usize> {
    let n = graph.atom_count();

    let initial: Vec<(u8, u8, u8, u8, i16)> = graph
        .atoms_iter()
        .map(|(index, atom)| {
            (
                atom.element.atomic_number(),
                u8::from(atom.aromatic),
                graph.degree(index).unwrap_or(0) as u8,
                graph.total_hydrogens(index).unwrap_or(0),
                atom.formal_charge as i16,
            )
        })
        .collect();
    let mut ranks = dense_ranks(&initial);

    loop {
        let refined_keys: Vec<(usize, Vec<usize>)> = (0..n)
            .map(|index| {
                let mut neighbor_ranks: Vec<usize> = graph
                    .neighbors(index)
                    .unwrap_or(&[])
                    .iter()
                    .map(|&neighbor| ranks[neighbor])
                    .collect();
                neighbor_ranks.sort_unstable();
                (ranks[index], neighbor_ranks)
            })
            .collect();
        let refined = dense_ranks(&refined_keys);

        if refined != ranks {
            ranks = refined;
            continue;
        }

        let distinct = ranks.iter().collect::<HashSet<_>>().len();
        if distinct == n {
            return ranks;
        }

        // Stable refinement with a tie left: split the lowest tied class on
        // the smallest atom index and refine again.
        let tied_rank = (0..n)
            .map(|index| ranks[index])
            .filter(|rank| ranks.iter().filter(|&&r| r == *rank).count() > 1)
            .min()
            .expect("a tied class exists");
        let chosen = (0..n)
            .find(|&index| ranks[index] == tied_rank)
            .expect("tied class is non-empty");
        let tiebreak_keys: Vec<(usize, u8)> = (0..n)
            .map(|index| (ranks[index], u8::from(index != chosen)))
            .collect();
        ranks = dense_ranks(&tiebreak_keys);
    }
}

/// Replaces arbitrary ordered keys with dense ranks starting at zero.
fn dense_ranks<T: Ord + Clone>(keys: &[T]) -> Vec<usize> {
    let mut positions = BTreeMap::new();
    for key in keys {
        positions.entry(key.clone()).or_insert(0usize);
    }
    for (position, (_, slot)) in positions.iter_mut().enumerate() {
        *slot = position;
    }
    keys.iter().map(|key| positions[key]).collect()
}

struct Emitter<'a> {
    graph: &'a MoleculeGraph,
    ranks: &'a [usize],
    visited: Vec<bool>,
    /// Ring-closure digits to print right after each atom's token.
    ring_digits: HashMap<usize, Vec<(u8, usize)>>,
    /// Normalized endpoints of every ring-closure bond.
    ring_bonds: HashSet<(usize, usize)>,
    next_digit: u8,
    out: String,
}

impl<'a> Emitter<'a> {
    fn new(graph: &'a MoleculeGraph, ranks: &'a [usize]) -> Self {
        Self {
            graph,
            ranks,
            visited: vec![false; graph.atom_count()],
            ring_digits: HashMap::new(),
            ring_bonds: HashSet::new(),
            next_digit: 1,
            out: String::new(),
        }
    }

    fn run(&mut self) -> String {
        let mut first_component = true;
        while let Some(start) = self.next_component_start() {
            self.collect_ring_bonds(start, usize::MAX);
            if !first_component {
                self.out.push('.');
            }
            first_component = false;
            // Reset visitation for the emission pass over this component.
            self.clear_component_visited(start);
            self.emit(start, usize::MAX);
        }
        std::mem::take(&mut self.out)
    }

    /// The unvisited atom with the lowest canonical rank, if any.
    fn next_component_start(&self) -> Option<usize> {
        (0..self.graph.atom_count())
            .filter(|&index| !self.visited[index])
            .min_by_key(|&index| self.ranks[index])
    }

    /// Neighbors of an atom ordered by canonical rank.
    fn ordered_neighbors(&self, index: usize) -> Vec<usize> {
        let mut neighbors: Vec<usize> = self.graph.neighbors(index).unwrap_or(&[]).to_vec();
        neighbors.sort_unstable_by_key(|&neighbor| self.ranks[neighbor]);
        neighbors
    }

    /// First pass: finds non-tree bonds and assigns their closure digits.
    fn collect_ring_bonds(&mut self, index: usize, parent: usize) {
        self.visited[index] = true;
        for neighbor in self.ordered_neighbors(index) {
            if neighbor == parent {
                continue;
            }
            if self.visited[neighbor] {
                let key = normalized(index, neighbor);
                if self.ring_bonds.insert(key) {
                    let digit = self.next_digit;
                    self.next_digit += 1;
                    self.ring_digits.entry(index).or_default().push((digit, neighbor));
                    self.ring_digits
                        .entry(neighbor)
                        .or_default()
                        .push((digit, index));
                }
            } else {
                self.collect_ring_bonds(neighbor, index);
            }
        }
    }

    /// Un-marks exactly the atoms of one connected component.
    fn clear_component_visited(&mut self, start: usize) {
        let mut stack = vec![start];
        let mut seen = HashSet::from([start]);
        while let Some(current) = stack.pop() {
            self.visited[current] = false;
            for &neighbor in self.graph.neighbors(current).unwrap_or(&[]) {
                if seen.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }
    }

    /// Second pass: emits the SMILES text along the same traversal.
    fn emit(&mut self, index: usize, parent: usize) {
        self.visited[index] = true;
        let token = self.atom_token(index);
        self.out.push_str(&token);

        if let Some(digits) = self.ring_digits.get(&index).cloned() {
            for (digit, partner) in digits {
                let bond = self.bond_token(index, partner);
                self.out.push_str(&bond);
                self.out.push_str(&digit_token(digit));
            }
        }

        let children: Vec<usize> = self
            .ordered_neighbors(index)
            .into_iter()
            .filter(|&neighbor| {
                neighbor != parent
                    && !self.visited[neighbor]
                    && !self.ring_bonds.contains(&normalized(index, neighbor))
            })
            .collect();

        for (position, &child) in children.iter().enumerate() {
            let bond = self.bond_token(index, child);
            if position + 1 < children.len() {
                self.out.push('(');
                self.out.push_str(&bond);
                self.emit(child, index);
                self.out.push(')');
            } else {
                self.out.push_str(&bond);
                self.emit(child, index);
            }
        }
    }

    fn bond_token(&self, atom1: usize, atom2: usize) -> String {
        let Some(bond) = self.graph.bond_between(atom1, atom2) else {
            return String::new();
        };
        let both_aromatic = self.graph.atom(atom1).is_some_and(|a| a.aromatic)
            && self.graph.atom(atom2).is_some_and(|a| a.aromatic);
        match bond.order {
            BondOrder::Single if both_aromatic => "-".to_string(),
            BondOrder::Single => String::new(),
            BondOrder::Double => "=".to_string(),
            BondOrder::Triple => "#".to_string(),
            BondOrder::Aromatic => String::new(),
        }
    }

    fn atom_token(&self, index: usize) -> String {
        let atom = self.graph.atom(index).expect("index in range");
        let hydrogens = atom.implicit_hydrogens;

        let needs_bracket = atom.formal_charge != 0
            || !atom.element.is_organic_subset()
            || hydrogens != self.inferred_hydrogens(index);

        let symbol = if atom.aromatic {
            atom.element.symbol().to_ascii_lowercase()
        } else {
            atom.element.symbol().to_string()
        };

        if !needs_bracket {
            return symbol;
        }

        let mut token = String::from("[");
        token.push_str(&symbol);
        match hydrogens {
            0 => {}
            1 => token.push('H'),
            n => {
                token.push('H');
                token.push_str(&n.to_string());
            }
        }
        match atom.formal_charge {
            0 => {}
            1 => token.push('+'),
            -1 => token.push('-'),
            charge if charge > 1 => token.push_str(&format!("+{}", charge)),
            charge => token.push_str(&format!("-{}", -charge)),
        }
        token.push(']');
        token
    }

    /// The hydrogen count a SMILES reader would infer for a bare atom.
    fn inferred_hydrogens(&self, index: usize) -> u8 {
        let atom = self.graph.atom(index).expect("index in range");
        let Some(valence) = atom.element.valence_for_charge(atom.formal_charge) else {
            return u8::MAX;
        };
        let bond_sum = self.graph.bond_order_sum(index).round() as i64;
        (valence as i64 - bond_sum).max(0) as u8
    }
}

fn normalized(atom1: usize, atom2: usize) -> (usize, usize) {
    (atom1.min(atom2), atom1.max(atom2))
}

/// Ring-closure digits above 9 require the two-digit `%nn` notation.
fn digit_token(digit: u8) -> String {
    if digit > 9 {
        format!("%{}", digit)
    } else {
        digit.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    fn atom(element: Element, hydrogens: u8) -> Atom {
        let mut a = Atom::new(element, Point3::origin());
        a.implicit_hydrogens = hydrogens;
        a
    }

    fn ethanol() -> MoleculeGraph {
        let mut graph = MoleculeGraph::new();
        let c1 = graph.add_atom(atom(Element::C, 3));
        let c2 = graph.add_atom(atom(Element::C, 2));
        let o = graph.add_atom(atom(Element::O, 1));
        graph.add_bond(c1, c2, BondOrder::Single).unwrap();
        graph.add_bond(c2, o, BondOrder::Single).unwrap();
        graph
    }

    fn acetic_acid() -> MoleculeGraph {
        let mut graph = MoleculeGraph::new();
        let c1 = graph.add_atom(atom(Element::C, 3));
        let c2 = graph.add_atom(atom(Element::C, 0));
        let o_carbonyl = graph.add_atom(atom(Element::O, 0));
        let o_hydroxyl = graph.add_atom(atom(Element::O, 1));
        graph.add_bond(c1, c2, BondOrder::Single).unwrap();
        graph.add_bond(c2, o_carbonyl, BondOrder::Double).unwrap();
        graph.add_bond(c2, o_hydroxyl, BondOrder::Single).unwrap();
        graph
    }

    fn benzene() -> MoleculeGraph {
        let mut graph = MoleculeGraph::new();
        let atoms: Vec<usize> = (0..6)
            .map(|_| {
                let mut a = atom(Element::C, 1);
                a.aromatic = true;
                graph.add_atom(a)
            })
            .collect();
        for i in 0..6 {
            graph
                .add_bond(atoms[i], atoms[(i + 1) % 6], BondOrder::Aromatic)
                .unwrap();
        }
        graph
    }

    #[test]
    fn single_atoms_write_their_implied_form() {
        let mut water = MoleculeGraph::new();
        water.add_atom(atom(Element::O, 2));
        assert_eq!(write_smiles(&water), "O");

        let mut methane = MoleculeGraph::new();
        methane.add_atom(atom(Element::C, 4));
        assert_eq!(write_smiles(&methane), "C");
    }

    #[test]
    fn charged_atoms_are_bracketed() {
        let mut ammonium = MoleculeGraph::new();
        let n = ammonium.add_atom(atom(Element::N, 4));
        ammonium.atom_mut(n).unwrap().formal_charge = 1;
        assert_eq!(write_smiles(&ammonium), "[NH4+]");

        let mut hydroxide = MoleculeGraph::new();
        let o = hydroxide.add_atom(atom(Element::O, 1));
        hydroxide.atom_mut(o).unwrap().formal_charge = -1;
        assert_eq!(write_smiles(&hydroxide), "[OH-]");
    }

    #[test]
    fn chains_start_at_the_lowest_ranked_terminal() {
        assert_eq!(write_smiles(&ethanol()), "CCO");
    }

    #[test]
    fn branches_are_parenthesized_in_rank_order() {
        assert_eq!(write_smiles(&acetic_acid()), "CC(=O)O");
    }

    #[test]
    fn deprotonation_changes_the_emitted_string() {
        let neutral = acetic_acid();
        let mut anion = neutral.clone();
        anion.atom_mut(3).unwrap().implicit_hydrogens = 0;
        anion.atom_mut(3).unwrap().formal_charge = -1;

        let neutral_smiles = write_smiles(&neutral);
        let anion_smiles = write_smiles(&anion);
        assert_ne!(neutral_smiles, anion_smiles);
        assert!(anion_smiles.contains("[O-]"));
    }

    #[test]
    fn aromatic_rings_use_closure_digits() {
        assert_eq!(write_smiles(&benzene()), "c1ccccc1");
    }

    #[test]
    fn output_is_deterministic_across_calls_and_clones() {
        let graph = acetic_acid();
        let first = write_smiles(&graph);
        let second = write_smiles(&graph.clone());
        assert_eq!(first, second);
    }

    #[test]
    fn disconnected_components_are_dot_separated() {
        let mut salt = MoleculeGraph::new();
        let n = salt.add_atom(atom(Element::N, 4));
        salt.atom_mut(n).unwrap().formal_charge = 1;
        let cl = salt.add_atom(atom(Element::Cl, 0));
        salt.atom_mut(cl).unwrap().formal_charge = -1;

        let smiles = write_smiles(&salt);
        assert!(smiles.contains('.'));
        assert!(smiles.contains("[NH4+]"));
        assert!(smiles.contains("[Cl-]"));
    }

    #[test]
    fn triple_bonds_use_the_hash_symbol() {
        let mut acetonitrile = MoleculeGraph::new();
        let c1 = acetonitrile.add_atom(atom(Element::C, 3));
        let c2 = acetonitrile.add_atom(atom(Element::C, 0));
        let n = acetonitrile.add_atom(atom(Element::N, 0));
        acetonitrile.add_bond(c1, c2, BondOrder::Single).unwrap();
        acetonitrile.add_bond(c2, n, BondOrder::Triple).unwrap();
        assert_eq!(write_smiles(&acetonitrile), "CC#N");
    }
}
