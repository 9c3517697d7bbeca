//! Element-by-species composition matrix of an equation
//!
//! Rows are the distinct elements of the equation (sorted by symbol), columns are the species
//! in equation order. An entry is the number of atoms of the element in the species, negated
//! for products, so a balanced coefficient vector is exactly a vector of its null space.
use crate::Stoichiometry::equation::Equation;
use log::debug;
use malachite::Rational;
use malachite::num::basic::traits::Zero;
use nalgebra::DMatrix;
use prettytable::{Cell, Row, Table};

#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientMatrix {
    elements: Vec<String>,
    matrix: DMatrix<Rational>,
}

impl CoefficientMatrix {
    pub fn from_equation(equation: &Equation) -> Self {
        let elements = equation.elements();
        let species: Vec<_> = equation.species().collect();
        let matrix = DMatrix::from_fn(elements.len(), species.len(), |row, col| {
            let count = species[col].composition().get(&elements[row]);
            let sign = species[col].side().sign();
            Rational::from(count) * Rational::from(sign)
        });
        debug!(
            "composition matrix: {} elements x {} species",
            matrix.nrows(),
            matrix.ncols()
        );
        Self { elements, matrix }
    }
    /// element symbols labelling the rows
    pub fn elements(&self) -> &[String] {
        &self.elements
    }
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }
    pub fn get(&self, row: usize, col: usize) -> Option<&Rational> {
        self.matrix.get((row, col))
    }
    pub fn as_matrix(&self) -> &DMatrix<Rational> {
        &self.matrix
    }
    /// Exact matrix-vector product, one entry per element row.
    /// `None` when the vector length differs from the number of species.
    pub fn apply(&self, coefficients: &[Rational]) -> Option<Vec<Rational>> {
        if coefficients.len() != self.ncols() {
            return None;
        }
        let balance = (0..self.nrows())
            .map(|row| {
                let mut sum = Rational::ZERO;
                for (col, coefficient) in coefficients.iter().enumerate() {
                    sum += &self.matrix[(row, col)] * coefficient;
                }
                sum
            })
            .collect();
        Some(balance)
    }
    /// true when the coefficients conserve every element exactly
    pub fn is_balanced_by(&self, coefficients: &[Rational]) -> bool {
        self.apply(coefficients)
            .is_some_and(|balance| balance.iter().all(|atoms| *atoms == Rational::ZERO))
    }
    /// table with species formulas as column titles and elements as row titles
    pub fn to_table(&self, equation: &Equation) -> Table {
        let mut table = Table::new();
        let mut titles = vec![Cell::new("element")];
        titles.extend(equation.species().map(|species| Cell::new(species.formula())));
        table.set_titles(Row::new(titles));
        for (row, element) in self.elements.iter().enumerate() {
            let mut cells = vec![Cell::new(element)];
            cells.extend((0..self.ncols()).map(|col| Cell::new(&self.matrix[(row, col)].to_string())));
            table.add_row(Row::new(cells));
        }
        table
    }
}
