//! Species and equations: which formulas take part in a reaction, and on which side.
//!
//! Species order is significant: it fixes the column order of the composition matrix and
//! the order of the coefficients in the solution, reactants first, then products.
use crate::Stoichiometry::errors::{EquationError, ParseError};
use crate::Stoichiometry::formula_parser::{ElementCount, parse_formula};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// separator between terms on one side of the equation: `+` with optional whitespace
static TERM_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\+\s*").expect("term separator regex is valid"));
/// one term: optional leading coefficient, then the formula
static TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<coefficient>\d+)?\s*(?P<formula>.*)$").expect("term regex is valid")
});

const ARROW: &str = "->";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Reactant,
    Product,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Reactant => "reactant",
            Side::Product => "product",
        }
    }
    /// sign of the species column in the composition matrix
    pub fn sign(&self) -> i64 {
        match self {
            Side::Reactant => 1,
            Side::Product => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// one reactant or product formula, parsed once at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Species {
    formula: String,
    side: Side,
    composition: ElementCount,
}

impl Species {
    pub fn new(formula: &str, side: Side) -> Result<Self, ParseError> {
        let composition = parse_formula(formula)?;
        Ok(Self {
            formula: formula.to_string(),
            side,
            composition,
        })
    }
    pub fn formula(&self) -> &str {
        &self.formula
    }
    pub fn side(&self) -> Side {
        self.side
    }
    pub fn composition(&self) -> &ElementCount {
        &self.composition
    }
}

/// Ordered reactants followed by ordered products; at least one of each.
///
/// Serialized as its two formula lists; deserialization reparses them through
/// [`Equation::new`], so compositions are never taken from the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "EquationFormulas", try_from = "EquationFormulas")]
pub struct Equation {
    reactants: Vec<Species>,
    products: Vec<Species>,
}

impl Equation {
    /// Builds an equation from already split formula lists.
    /// # Examples
    /// ```
    /// use chem_balance::Stoichiometry::equation::Equation;
    /// let equation = Equation::new(&["H2", "O2"], &["H2O"]).unwrap();
    /// assert_eq!(equation.len(), 3);
    /// assert_eq!(equation.elements(), vec!["H", "O"]);
    /// ```
    pub fn new<S: AsRef<str>>(reactants: &[S], products: &[S]) -> Result<Self, EquationError> {
        if reactants.is_empty() {
            return Err(EquationError::MissingReactants);
        }
        if products.is_empty() {
            return Err(EquationError::MissingProducts);
        }
        let reactants = reactants
            .iter()
            .map(|formula| Species::new(formula.as_ref(), Side::Reactant))
            .collect::<Result<Vec<_>, _>>()?;
        let products = products
            .iter()
            .map(|formula| Species::new(formula.as_ref(), Side::Product))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            reactants,
            products,
        })
    }
    pub fn reactants(&self) -> &[Species] {
        &self.reactants
    }
    pub fn products(&self) -> &[Species] {
        &self.products
    }
    /// all species in column order: reactants, then products
    pub fn species(&self) -> impl Iterator<Item = &Species> {
        self.reactants.iter().chain(self.products.iter())
    }
    /// number of species (columns of the composition matrix)
    pub fn len(&self) -> usize {
        self.reactants.len() + self.products.len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// distinct element symbols of the whole equation, sorted
    pub fn elements(&self) -> Vec<String> {
        self.species()
            .flat_map(|species| species.composition().elements())
            .map(str::to_string)
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }
}

/// wire form of an [`Equation`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquationFormulas {
    pub reactants: Vec<String>,
    pub products: Vec<String>,
}

impl From<Equation> for EquationFormulas {
    fn from(equation: Equation) -> Self {
        let formulas =
            |species: Vec<Species>| -> Vec<String> { species.into_iter().map(|s| s.formula).collect() };
        Self {
            reactants: formulas(equation.reactants),
            products: formulas(equation.products),
        }
    }
}

impl TryFrom<EquationFormulas> for Equation {
    type Error = EquationError;
    fn try_from(formulas: EquationFormulas) -> Result<Self, Self::Error> {
        Equation::new(formulas.reactants.as_slice(), formulas.products.as_slice())
    }
}

/// splits one side of `A + B -> C` into formulas, dropping leading nonzero coefficients
fn split_side(text: &str, equation: &str, side: Side) -> Result<Vec<String>, EquationError> {
    let mut formulas = Vec::new();
    for term in TERM_SEPARATOR.split(text.trim()) {
        let caps = TERM.captures(term.trim());
        let coefficient = caps.as_ref().and_then(|caps| caps.name("coefficient"));
        if coefficient.is_some_and(|m| m.as_str().bytes().all(|b| b == b'0')) {
            return Err(EquationError::ZeroCoefficient {
                equation: equation.to_string(),
                term: term.trim().to_string(),
            });
        }
        let formula = caps
            .as_ref()
            .and_then(|caps| caps.name("formula"))
            .map(|m| m.as_str().trim())
            .unwrap_or("");
        if formula.is_empty() {
            return Err(EquationError::EmptyTerm {
                equation: equation.to_string(),
                side,
            });
        }
        formulas.push(formula.to_string());
    }
    Ok(formulas)
}

impl FromStr for Equation {
    type Err = EquationError;
    /// Parses the textual form `A + B -> C + D`; whitespace around `+` and `->` is ignored.
    /// A leading integer on a term (`2H2O`) is taken as an existing coefficient and dropped.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let arrows = text.matches(ARROW).count();
        if arrows == 0 {
            return Err(EquationError::MissingArrow(text.to_string()));
        }
        if arrows > 1 {
            return Err(EquationError::MultipleArrows(text.to_string()));
        }
        let (left, right) = text
            .split_once(ARROW)
            .ok_or_else(|| EquationError::MissingArrow(text.to_string()))?;
        if left.trim().is_empty() {
            return Err(EquationError::MissingReactants);
        }
        if right.trim().is_empty() {
            return Err(EquationError::MissingProducts);
        }
        let reactants = split_side(left, text, Side::Reactant)?;
        let products = split_side(right, text, Side::Product)?;
        debug!(
            "equation '{}' split into reactants {:?} and products {:?}",
            text, reactants, products
        );
        Equation::new(reactants.as_slice(), products.as_slice())
    }
}
