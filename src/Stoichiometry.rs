/// Error taxonomy: malformed formulas, malformed equations, and equations that cannot be balanced.
pub mod errors;

/// Module to calculate the atomic composition of a chemical formula
///
///  # Examples
/// ```
/// use chem_balance::Stoichiometry::formula_parser::parse_formula;
/// let composition = parse_formula("Fe2(SO4)3").unwrap();
/// assert_eq!(composition.get("Fe"), 2);
/// assert_eq!(composition.get("S"), 3);
/// assert_eq!(composition.get("O"), 12);
/// ```
pub mod formula_parser;

/// Species (a formula with its side) and equations (ordered reactants, then ordered products).
/// Equations can be built from split formula lists or parsed from `A + B -> C + D`.
pub mod equation;

/// The element-by-species matrix of an equation with exact rational entries, products negated.
///
///  # Examples
/// ```
/// use chem_balance::Stoichiometry::composition_matrix::CoefficientMatrix;
/// use chem_balance::Stoichiometry::equation::Equation;
/// let equation: Equation = "H2 + O2 -> H2O".parse().unwrap();
/// let matrix = CoefficientMatrix::from_equation(&equation);
/// assert_eq!(matrix.elements(), &["H", "O"]);
/// matrix.to_table(&equation).printstd();
/// ```
pub mod composition_matrix;

/// Gauss-Jordan elimination, null space and LCM/GCD normalization over exact rationals.
pub mod rational_linalg;

/// THE BALANCER: from an equation to its smallest positive integer coefficients.
///
/// 1) the composition matrix is built (rows = elements, columns = species)
/// 2) it is row reduced with exact fractions and its free columns are found
/// 3) exactly one free column is required; its null-space vector is scaled to integers,
///    reduced to lowest terms and given a positive sign
/// 4) the coefficients come back in species order, reactants first
///
///  # Examples
/// ```
/// use chem_balance::Stoichiometry::balancer::balance_str;
/// let balanced = balance_str("Fe + O2 -> Fe2O3").unwrap();
/// assert_eq!(balanced.to_string(), "4Fe + 3O2 -> 2Fe2O3");
/// assert!(balance_str("H2 -> O2").is_err());
/// ```
pub mod balancer;
