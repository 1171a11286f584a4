use super::EncodingError;
use crate::core::models::bond::{Bond, BondOrder};
use crate::core::models::element::Element;
use crate::core::models::molecule::MoleculeGraph;
use std::str::FromStr;

/// Elements with a dedicated one-hot slot; everything else shares the
/// trailing overflow slot.
const ONE_HOT_ELEMENTS: [Element; 9] = [
    Element::C,
    Element::N,
    Element::O,
    Element::F,
    Element::P,
    Element::S,
    Element::Cl,
    Element::Br,
    Element::I,
];

/// Per-atom input features of the paired-graph encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFeature {
    /// One-hot element identity (9 common elements + overflow).
    Element,
    /// Formal charge as a signed scalar.
    FormalCharge,
    /// Total hydrogen count (implicit + explicit).
    TotalHydrogens,
    /// Aromaticity flag.
    Aromatic,
    /// Number of explicit bonds.
    Degree,
    /// 1.0 on the titratable site atom, 0.0 elsewhere.
    ReactionCenter,
}

impl NodeFeature {
    pub const ALL: [NodeFeature; 6] = [
        NodeFeature::Element,
        NodeFeature::FormalCharge,
        NodeFeature::TotalHydrogens,
        NodeFeature::Aromatic,
        NodeFeature::Degree,
        NodeFeature::ReactionCenter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NodeFeature::Element => "element",
            NodeFeature::FormalCharge => "formal_charge",
            NodeFeature::TotalHydrogens => "total_hydrogens",
            NodeFeature::Aromatic => "aromatic",
            NodeFeature::Degree => "degree",
            NodeFeature::ReactionCenter => "reaction_center",
        }
    }

    /// Number of columns this feature contributes to the node matrix.
    pub fn width(&self) -> usize {
        match self {
            NodeFeature::Element => ONE_HOT_ELEMENTS.len() + 1,
            _ => 1,
        }
    }

    pub fn encode(
        &self,
        graph: &MoleculeGraph,
        index: usize,
        reaction_center: usize,
        out: &mut Vec<f32>,
    ) {
        match self {
            NodeFeature::Element => {
                let element = graph.atom(index).map(|a| a.element);
                let slot = element
                    .and_then(|e| ONE_HOT_ELEMENTS.iter().position(|&known| known == e))
                    .unwrap_or(ONE_HOT_ELEMENTS.len());
                for position in 0..=ONE_HOT_ELEMENTS.len() {
                    out.push(if position == slot { 1.0 } else { 0.0 });
                }
            }
            NodeFeature::FormalCharge => {
                out.push(graph.atom(index).map_or(0.0, |a| a.formal_charge as f32));
            }
            NodeFeature::TotalHydrogens => {
                out.push(graph.total_hydrogens(index).unwrap_or(0) as f32);
            }
            NodeFeature::Aromatic => {
                out.push(graph.atom(index).is_some_and(|a| a.aromatic) as u8 as f32);
            }
            NodeFeature::Degree => {
                out.push(graph.degree(index).unwrap_or(0) as f32);
            }
            NodeFeature::ReactionCenter => {
                out.push((index == reaction_center) as u8 as f32);
            }
        }
    }
}

impl FromStr for NodeFeature {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.name() == s)
            .ok_or_else(|| EncodingError::UnknownFeature(s.to_string()))
    }
}

/// Per-bond input features of the paired-graph encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeFeature {
    /// One-hot bond order (single, double, triple, aromatic).
    BondOrder,
    /// Ring-membership flag.
    InRing,
    /// Rotatable-bond flag: an acyclic single bond between non-terminal atoms.
    Rotatable,
}

impl EdgeFeature {
    pub const ALL: [EdgeFeature; 3] = [
        EdgeFeature::BondOrder,
        EdgeFeature::InRing,
        EdgeFeature::Rotatable,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EdgeFeature::BondOrder => "bond_order",
            EdgeFeature::InRing => "in_ring",
            EdgeFeature::Rotatable => "rotatable",
        }
    }

    pub fn width(&self) -> usize {
        match self {
            EdgeFeature::BondOrder => 4,
            _ => 1,
        }
    }

    pub fn encode(&self, graph: &MoleculeGraph, bond: &Bond, out: &mut Vec<f32>) {
        match self {
            EdgeFeature::BondOrder => {
                for order in [
                    BondOrder::Single,
                    BondOrder::Double,
                    BondOrder::Triple,
                    BondOrder::Aromatic,
                ] {
                    out.push(if bond.order == order { 1.0 } else { 0.0 });
                }
            }
            EdgeFeature::InRing => {
                out.push(graph.bond_in_ring(bond) as u8 as f32);
            }
            EdgeFeature::Rotatable => {
                let rotatable = bond.order == BondOrder::Single
                    && !graph.bond_in_ring(bond)
                    && graph.degree(bond.atom1).unwrap_or(0) > 1
                    && graph.degree(bond.atom2).unwrap_or(0) > 1;
                out.push(rotatable as u8 as f32);
            }
        }
    }
}

impl FromStr for EdgeFeature {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.name() == s)
            .ok_or_else(|| EncodingError::UnknownFeature(s.to_string()))
    }
}

/// The active node and edge feature subset of an encoding run.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSelection {
    pub node: Vec<NodeFeature>,
    pub edge: Vec<EdgeFeature>,
}

impl Default for FeatureSelection {
    fn default() -> Self {
        Self {
            node: NodeFeature::ALL.to_vec(),
            edge: EdgeFeature::ALL.to_vec(),
        }
    }
}

impl FeatureSelection {
    /// Builds a selection from feature names.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::UnknownFeature`] for any name outside the
    /// registry.
    pub fn from_names<S: AsRef<str>>(node: &[S], edge: &[S]) -> Result<Self, EncodingError> {
        Ok(Self {
            node: node
                .iter()
                .map(|name| name.as_ref().parse())
                .collect::<Result<_, _>>()?,
            edge: edge
                .iter()
                .map(|name| name.as_ref().parse())
                .collect::<Result<_, _>>()?,
        })
    }

    /// Total number of columns of the node feature matrix.
    pub fn node_width(&self) -> usize {
        self.node.iter().map(NodeFeature::width).sum()
    }

    /// Total number of columns of the edge feature matrix.
    pub fn edge_width(&self) -> usize {
        self.edge.iter().map(EdgeFeature::width).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    fn pyridinium_fragment() -> MoleculeGraph {
        // N+-C with the nitrogen protonated.
        let mut graph = MoleculeGraph::new();
        let n = graph.add_atom({
            let mut a = Atom::new(Element::N, Point3::origin());
            a.formal_charge = 1;
            a.implicit_hydrogens = 3;
            a
        });
        let c = graph.add_atom({
            let mut a = Atom::new(Element::C, Point3::origin());
            a.implicit_hydrogens = 3;
            a
        });
        graph.add_bond(n, c, BondOrder::Single).unwrap();
        graph
    }

    #[test]
    fn element_one_hot_has_a_single_active_slot() {
        let graph = pyridinium_fragment();
        let mut row = Vec::new();
        NodeFeature::Element.encode(&graph, 0, 0, &mut row);

        assert_eq!(row.len(), NodeFeature::Element.width());
        assert_eq!(row.iter().sum::<f32>(), 1.0);
        assert_eq!(row[1], 1.0); // N slot
    }

    #[test]
    fn unlisted_elements_use_the_overflow_slot() {
        let mut graph = MoleculeGraph::new();
        graph.add_atom(Atom::new(Element::Se, Point3::origin()));
        let mut row = Vec::new();
        NodeFeature::Element.encode(&graph, 0, 0, &mut row);
        assert_eq!(*row.last().unwrap(), 1.0);
    }

    #[test]
    fn scalar_node_features_read_graph_state() {
        let graph = pyridinium_fragment();
        let mut row = Vec::new();
        NodeFeature::FormalCharge.encode(&graph, 0, 0, &mut row);
        NodeFeature::TotalHydrogens.encode(&graph, 0, 0, &mut row);
        NodeFeature::Degree.encode(&graph, 0, 0, &mut row);
        NodeFeature::ReactionCenter.encode(&graph, 0, 0, &mut row);
        NodeFeature::ReactionCenter.encode(&graph, 1, 0, &mut row);

        assert_eq!(row, vec![1.0, 3.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn bond_order_one_hot_marks_the_order() {
        let graph = pyridinium_fragment();
        let mut row = Vec::new();
        EdgeFeature::BondOrder.encode(&graph, &graph.bonds()[0], &mut row);
        assert_eq!(row, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn terminal_single_bonds_are_not_rotatable() {
        let graph = pyridinium_fragment();
        let mut row = Vec::new();
        EdgeFeature::Rotatable.encode(&graph, &graph.bonds()[0], &mut row);
        assert_eq!(row, vec![0.0]);
    }

    #[test]
    fn selection_widths_sum_over_features() {
        let selection = FeatureSelection::default();
        assert_eq!(selection.node_width(), 10 + 5);
        assert_eq!(selection.edge_width(), 4 + 2);
    }

    #[test]
    fn selection_parses_known_names_and_rejects_unknown() {
        let selection =
            FeatureSelection::from_names(&["element", "formal_charge"], &["bond_order"]).unwrap();
        assert_eq!(selection.node.len(), 2);
        assert_eq!(selection.edge, vec![EdgeFeature::BondOrder]);

        let result = FeatureSelection::from_names(&["chirality"], &[]);
        assert!(matches!(result, Err(EncodingError::UnknownFeature(name)) if name == "chirality"));
    }
}
