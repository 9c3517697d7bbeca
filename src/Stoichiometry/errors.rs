//! Error taxonomy of the balancing pipeline.
//!
//! Every failure is detected where it happens and returned immediately, no partial
//! results are produced. The errors carry the offending formula or equation detail so a
//! caller can show them verbatim.

use crate::Stoichiometry::equation::Side;
use thiserror::Error;

/// malformed molecular formula
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty formula: '{formula}'")]
    Empty { formula: String },
    #[error("unexpected character '{character}' at position {position} in formula '{formula}'")]
    UnexpectedCharacter {
        formula: String,
        character: char,
        position: usize,
    },
    #[error("unbalanced parentheses in formula '{formula}'")]
    UnbalancedParentheses { formula: String },
    #[error("multiplier at position {position} has nothing to multiply in formula '{formula}'")]
    DanglingMultiplier { formula: String, position: usize },
    #[error("zero multiplier at position {position} in formula '{formula}'")]
    ZeroMultiplier { formula: String, position: usize },
    #[error("empty group at position {position} in formula '{formula}'")]
    EmptyGroup { formula: String, position: usize },
    #[error("atom count overflow in formula '{formula}'")]
    CountOverflow { formula: String },
}

/// malformed equation: wrong shape of the `A + B -> C` text or a bad formula inside it
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EquationError {
    #[error("equation has no reactants")]
    MissingReactants,
    #[error("equation has no products")]
    MissingProducts,
    #[error("no '->' found in equation '{0}'")]
    MissingArrow(String),
    #[error("more than one '->' found in equation '{0}'")]
    MultipleArrows(String),
    #[error("empty term among the {side}s of equation '{equation}'")]
    EmptyTerm { equation: String, side: Side },
    #[error("zero coefficient on term '{term}' of equation '{equation}'")]
    ZeroCoefficient { equation: String, term: String },
    #[error(transparent)]
    Formula(#[from] ParseError),
}

/// the homogeneous system has no usable one-dimensional positive solution
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("reaction cannot be balanced: {reason}")]
    NoSolution { reason: String },
    #[error("reaction is underdetermined: null space has dimension {nullity}, expected 1")]
    Underdetermined { nullity: usize },
    #[error("balanced coefficient does not fit into a 64-bit integer")]
    CoefficientOverflow,
}

/// any failure of the text-in, text-out pipeline
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error(transparent)]
    Equation(#[from] EquationError),
    #[error(transparent)]
    Solve(#[from] SolveError),
}

impl From<ParseError> for BalanceError {
    fn from(err: ParseError) -> Self {
        BalanceError::Equation(EquationError::Formula(err))
    }
}
