use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chemical elements commonly encountered in small-molecule datasets.
///
/// The set covers the organic subset plus the heteroatoms that appear in
/// drug-like molecules deposited in public databases. Anything outside this
/// set parses as [`Element::Unknown`], which carries no valence model and is
/// therefore never eligible for protonation-state edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    H,
    B,
    C,
    N,
    O,
    F,
    Si,
    P,
    S,
    Cl,
    Se,
    Br,
    I,
    Unknown,
}

static ELEMENT_BY_SYMBOL: phf::Map<&'static str, Element> = phf_map! {
    "H" => Element::H,
    "B" => Element::B,
    "C" => Element::C,
    "N" => Element::N,
    "O" => Element::O,
    "F" => Element::F,
    "SI" => Element::Si,
    "P" => Element::P,
    "S" => Element::S,
    "CL" => Element::Cl,
    "SE" => Element::Se,
    "BR" => Element::Br,
    "I" => Element::I,
};

impl Element {
    /// Looks up an element from its periodic-table symbol (case-insensitive).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        ELEMENT_BY_SYMBOL
            .get(symbol.trim().to_ascii_uppercase().as_str())
            .copied()
    }

    /// The periodic-table symbol as written in SDF atom blocks.
    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::Se => "Se",
            Element::Br => "Br",
            Element::I => "I",
            Element::Unknown => "*",
        }
    }

    pub fn atomic_number(&self) -> u8 {
        match self {
            Element::H => 1,
            Element::B => 5,
            Element::C => 6,
            Element::N => 7,
            Element::O => 8,
            Element::F => 9,
            Element::Si => 14,
            Element::P => 15,
            Element::S => 16,
            Element::Cl => 17,
            Element::Se => 34,
            Element::Br => 35,
            Element::I => 53,
            Element::Unknown => 0,
        }
    }

    /// Default bonding valence of the neutral element, if it has a simple one.
    pub fn default_valence(&self) -> Option<u8> {
        match self {
            Element::H => Some(1),
            Element::B => Some(3),
            Element::C => Some(4),
            Element::N => Some(3),
            Element::O => Some(2),
            Element::F | Element::Cl | Element::Br | Element::I => Some(1),
            Element::Si => Some(4),
            Element::P => Some(3),
            Element::S | Element::Se => Some(2),
            Element::Unknown => None,
        }
    }

    /// Bonding valence adjusted for a formal charge.
    ///
    /// Covers the charge states that occur on titratable sites: a protonated
    /// amine nitrogen binds four partners, a carboxylate oxygen one, and so
    /// on. Charges this table does not model yield `None`, which callers
    /// treat as "valence unknown, edit refused".
    pub fn valence_for_charge(&self, charge: i8) -> Option<u8> {
        match (self, charge) {
            (_, 0) => self.default_valence(),
            (Element::N, 1) => Some(4),
            (Element::N, -1) => Some(2),
            (Element::O, 1) => Some(3),
            (Element::O, -1) => Some(1),
            (Element::S, 1) => Some(3),
            (Element::S, -1) => Some(1),
            (Element::Se, -1) => Some(1),
            (Element::C, 1) | (Element::C, -1) => Some(3),
            (Element::P, 1) => Some(4),
            _ => None,
        }
    }

    /// True for elements SMILES may write without brackets when neutral.
    pub fn is_organic_subset(&self) -> bool {
        matches!(
            self,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::F
                | Element::P
                | Element::S
                | Element::Cl
                | Element::Br
                | Element::I
        )
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown element symbol: '{0}'")]
pub struct ParseElementError(pub String);

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Element::from_symbol(s).ok_or_else(|| ParseElementError(s.to_string()))
    }
}
