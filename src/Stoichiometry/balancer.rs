//! Balancing of chemical equations
//!
//! The composition matrix of the equation is row reduced with exact fractions. A balanceable
//! equation has a one-dimensional null space; its generator, scaled to integers in lowest
//! terms with a canonical sign, gives the stoichiometric coefficients.
use crate::Stoichiometry::composition_matrix::CoefficientMatrix;
use crate::Stoichiometry::equation::{Equation, Species};
use crate::Stoichiometry::errors::{BalanceError, SolveError};
use crate::Stoichiometry::rational_linalg::{integer_normalize, reduced_row_echelon};
use crate::settings::FormatConfig;
use log::{debug, info, warn};
use malachite::Rational;
use malachite::num::basic::traits::Zero;
use serde::Serialize;
use std::fmt;

/// Stoichiometric coefficients, one per species in equation order, all positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolutionVector(Vec<u64>);

impl SolutionVector {
    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }
    pub fn iter(&self) -> impl Iterator<Item = &u64> {
        self.0.iter()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    /// coefficients of the reactants of `equation`
    pub fn reactants(&self, equation: &Equation) -> &[u64] {
        let split = equation.reactants().len().min(self.0.len());
        &self.0[..split]
    }
    /// coefficients of the products of `equation`
    pub fn products(&self, equation: &Equation) -> &[u64] {
        let split = equation.reactants().len().min(self.0.len());
        &self.0[split..]
    }
    pub fn to_rationals(&self) -> Vec<Rational> {
        self.0.iter().map(|c| Rational::from(*c)).collect()
    }
}

impl From<SolutionVector> for Vec<u64> {
    fn from(solution: SolutionVector) -> Self {
        solution.0
    }
}

/// Computes the smallest positive integer coefficients balancing `equation`.
///
/// Fails with [`SolveError::NoSolution`] when only the all-zero vector conserves every
/// element or when no all-positive multiple of the null-space generator exists, and with
/// [`SolveError::Underdetermined`] when the null space has more than one dimension.
/// # Examples
/// ```
/// use chem_balance::Stoichiometry::balancer::solve;
/// use chem_balance::Stoichiometry::equation::Equation;
/// let equation: Equation = "Fe + O2 -> Fe2O3".parse().unwrap();
/// assert_eq!(solve(&equation).unwrap().as_slice(), &[4, 3, 2]);
/// ```
pub fn solve(equation: &Equation) -> Result<SolutionVector, SolveError> {
    let matrix = CoefficientMatrix::from_equation(equation);
    let echelon = reduced_row_echelon(matrix.as_matrix());
    let nullity = echelon.nullity();
    debug!("rank {}, nullity {}", echelon.rank(), nullity);
    if nullity == 0 {
        warn!("only the trivial solution exists");
        return Err(SolveError::NoSolution {
            reason: "only the all-zero solution conserves every element".to_string(),
        });
    }
    if nullity > 1 {
        warn!("null space of dimension {}", nullity);
        return Err(SolveError::Underdetermined { nullity });
    }
    let generator = echelon
        .null_space()
        .into_iter()
        .next()
        .ok_or(SolveError::Underdetermined { nullity })?;

    let mut coefficients = integer_normalize(&generator);
    // the sign of a null-space generator is arbitrary
    if coefficients.iter().all(|c| *c < Rational::ZERO) {
        debug!("all coefficients negative, flipping sign");
        coefficients = coefficients.into_iter().map(|c| -c).collect();
    }
    let species: Vec<_> = equation.species().collect();
    if let Some((position, coefficient)) = coefficients
        .iter()
        .enumerate()
        .find(|(_, c)| **c <= Rational::ZERO)
    {
        let formula = species
            .get(position)
            .map(|s| s.formula())
            .unwrap_or_default();
        warn!("{} would get coefficient {}", formula, coefficient);
        return Err(SolveError::NoSolution {
            reason: format!(
                "no all-positive coefficients exist, {} would get coefficient {}",
                formula, coefficient
            ),
        });
    }
    debug_assert!(matrix.is_balanced_by(&coefficients));

    let coefficients = coefficients
        .iter()
        .map(|c| u64::try_from(c).map_err(|_| SolveError::CoefficientOverflow))
        .collect::<Result<Vec<u64>, _>>()?;
    info!("balanced with coefficients {:?}", coefficients);
    Ok(SolutionVector(coefficients))
}

/// An equation together with its balancing coefficients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalancedEquation {
    equation: Equation,
    coefficients: SolutionVector,
}

impl BalancedEquation {
    pub fn equation(&self) -> &Equation {
        &self.equation
    }
    pub fn coefficients(&self) -> &SolutionVector {
        &self.coefficients
    }
    /// coefficient of the first species written as `formula`
    pub fn coefficient_of(&self, formula: &str) -> Option<u64> {
        self.equation
            .species()
            .zip(self.coefficients.iter())
            .find(|(species, _)| species.formula() == formula)
            .map(|(_, coefficient)| *coefficient)
    }
    /// the equation written out with `config`
    pub fn render(&self, config: &FormatConfig) -> String {
        let side = |species: &[Species], coefficients: &[u64]| {
            species
                .iter()
                .zip(coefficients)
                .map(|(s, c)| config.term(*c, s.formula()))
                .collect::<Vec<_>>()
                .join(&config.plus)
        };
        format!(
            "{}{}{}",
            side(
                self.equation.reactants(),
                self.coefficients.reactants(&self.equation)
            ),
            config.arrow,
            side(
                self.equation.products(),
                self.coefficients.products(&self.equation)
            )
        )
    }
}

impl fmt::Display for BalancedEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&FormatConfig::default()))
    }
}

/// balances `equation`, keeping the equation alongside its coefficients
pub fn balance(equation: &Equation) -> Result<BalancedEquation, SolveError> {
    let coefficients = solve(equation)?;
    Ok(BalancedEquation {
        equation: equation.clone(),
        coefficients,
    })
}

/// Parses and balances an equation given as `A + B -> C + D`.
/// # Examples
/// ```
/// use chem_balance::Stoichiometry::balancer::balance_str;
/// let balanced = balance_str("C3H8 + O2 -> CO2 + H2O").unwrap();
/// assert_eq!(balanced.to_string(), "C3H8 + 5O2 -> 3CO2 + 4H2O");
/// ```
pub fn balance_str(text: &str) -> Result<BalancedEquation, BalanceError> {
    let equation: Equation = text.parse()?;
    Ok(balance(&equation)?)
}
