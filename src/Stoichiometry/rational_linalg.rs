//! Exact linear algebra over rationals: Gauss-Jordan elimination, null space and
//! integer normalization of a rational vector. No floating point anywhere.
use log::debug;
use malachite::num::arithmetic::traits::{Abs, Gcd, Lcm};
use malachite::num::basic::traits::{One, Zero};
use malachite::{Natural, Rational};
use nalgebra::DMatrix;

/// Reduced row-echelon form of a matrix together with its pivot columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEchelon {
    pub matrix: DMatrix<Rational>,
    /// pivot column of row `i` is `pivot_columns[i]`, strictly increasing
    pub pivot_columns: Vec<usize>,
}

impl RowEchelon {
    pub fn rank(&self) -> usize {
        self.pivot_columns.len()
    }
    /// columns without a pivot, i.e. the free variables of `A x = 0`
    pub fn free_columns(&self) -> Vec<usize> {
        (0..self.matrix.ncols())
            .filter(|col| !self.pivot_columns.contains(col))
            .collect()
    }
    /// dimension of the null space
    pub fn nullity(&self) -> usize {
        self.matrix.ncols() - self.rank()
    }
    /// One basis vector per free column: that free variable set to 1, the other free
    /// variables to 0, pivot variables solved by back substitution.
    pub fn null_space(&self) -> Vec<Vec<Rational>> {
        self.free_columns()
            .into_iter()
            .map(|free| {
                let mut vector = vec![Rational::ZERO; self.matrix.ncols()];
                vector[free] = Rational::ONE;
                for (row, pivot) in self.pivot_columns.iter().enumerate() {
                    vector[*pivot] = -&self.matrix[(row, free)];
                }
                vector
            })
            .collect()
    }
}

/// Gauss-Jordan elimination with exact fractions.
///
/// The pivot of each column is the entry of largest absolute value below the current row,
/// every pivot is scaled to 1 and cleared above and below. Zero columns are skipped and
/// become free columns.
/// # Examples
/// ```
/// use chem_balance::Stoichiometry::rational_linalg::reduced_row_echelon;
/// use malachite::Rational;
/// use nalgebra::DMatrix;
/// let values: Vec<Rational> = [2, 0, -2, 0, 2, -1].iter().map(|v| Rational::from(*v)).collect();
/// let echelon = reduced_row_echelon(&DMatrix::from_row_slice(2, 3, &values));
/// assert_eq!(echelon.pivot_columns, vec![0, 1]);
/// assert_eq!(echelon.free_columns(), vec![2]);
/// ```
pub fn reduced_row_echelon(matrix: &DMatrix<Rational>) -> RowEchelon {
    let mut m = matrix.clone();
    let (nrows, ncols) = m.shape();
    let mut pivot_columns = Vec::new();
    let mut row = 0;
    for col in 0..ncols {
        if row == nrows {
            break;
        }
        let mut i_max = row;
        for i in (row + 1)..nrows {
            if (&m[(i, col)]).abs() > (&m[(i_max, col)]).abs() {
                i_max = i;
            }
        }
        if m[(i_max, col)] == Rational::ZERO {
            continue;
        }
        m.swap_rows(row, i_max);

        let pivot = m[(row, col)].clone();
        for j in col..ncols {
            m[(row, j)] /= &pivot;
        }
        for i in 0..nrows {
            if i == row || m[(i, col)] == Rational::ZERO {
                continue;
            }
            let factor = m[(i, col)].clone();
            for j in col..ncols {
                let amount = &factor * &m[(row, j)];
                m[(i, j)] -= amount;
            }
        }
        pivot_columns.push(col);
        row += 1;
    }
    debug!(
        "row reduction of {}x{} matrix: pivot columns {:?}",
        nrows, ncols, pivot_columns
    );
    RowEchelon {
        matrix: m,
        pivot_columns,
    }
}

/// basis of the null space of `matrix`, one vector per free column
pub fn null_space(matrix: &DMatrix<Rational>) -> Vec<Vec<Rational>> {
    reduced_row_echelon(matrix).null_space()
}

/// least common multiple of all denominators (1 for an empty slice)
pub fn lcm_of_denominators(values: &[Rational]) -> Natural {
    values
        .iter()
        .fold(Natural::ONE, |lcm, value| lcm.lcm(value.denominator_ref()))
}

/// Scales a rational vector to the proportional integer vector in lowest terms:
/// denominators are cleared with their LCM, then everything is divided by the GCD of the
/// absolute values. Signs are kept. The returned rationals all have denominator 1.
/// An all-zero vector is returned unchanged.
pub fn integer_normalize(values: &[Rational]) -> Vec<Rational> {
    let scale = Rational::from(&lcm_of_denominators(values));
    let scaled: Vec<Rational> = values.iter().map(|value| value * &scale).collect();
    let divisor = scaled
        .iter()
        .fold(Natural::ZERO, |gcd, value| gcd.gcd(value.numerator_ref()));
    if divisor == Natural::ZERO {
        return scaled;
    }
    let divisor = Rational::from(&divisor);
    scaled.iter().map(|value| value / &divisor).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn q(text: &str) -> Rational {
        Rational::from_str(text).unwrap()
    }

    fn matrix(nrows: usize, ncols: usize, values: &[i64]) -> DMatrix<Rational> {
        let values: Vec<Rational> = values.iter().map(|v| Rational::from(*v)).collect();
        DMatrix::from_row_slice(nrows, ncols, &values)
    }

    #[test]
    fn test_reduced_row_echelon_full_rank() {
        // pivots end up normalized to 1 with zeros above and below
        let echelon = reduced_row_echelon(&matrix(
            3,
            4,
            &[
                3, 0, -1, 0, //
                8, 0, 0, -2, //
                0, 2, -2, -1,
            ],
        ));
        assert_eq!(echelon.pivot_columns, vec![0, 1, 2]);
        assert_eq!(echelon.rank(), 3);
        assert_eq!(echelon.nullity(), 1);
        let expected = DMatrix::from_row_slice(
            3,
            4,
            &[
                q("1"), q("0"), q("0"), q("-1/4"),
                q("0"), q("1"), q("0"), q("-5/4"),
                q("0"), q("0"), q("1"), q("-3/4"),
            ],
        );
        assert_eq!(echelon.matrix, expected);
    }

    #[test]
    fn test_zero_column_becomes_free() {
        let echelon = reduced_row_echelon(&matrix(2, 3, &[0, 1, 2, 0, 2, 4]));
        assert_eq!(echelon.pivot_columns, vec![1]);
        assert_eq!(echelon.free_columns(), vec![0, 2]);
        assert_eq!(echelon.nullity(), 2);
    }

    #[test]
    fn test_null_space_vectors_annihilate_matrix() {
        let a = matrix(2, 4, &[2, 0, 2, -2, 0, 2, 2, -1]);
        let basis = null_space(&a);
        assert_eq!(basis.len(), 2);
        for vector in basis {
            for row in 0..a.nrows() {
                let mut sum = Rational::ZERO;
                for col in 0..a.ncols() {
                    sum += &a[(row, col)] * &vector[col];
                }
                assert_eq!(sum, Rational::ZERO);
            }
        }
    }

    #[test]
    fn test_trivial_null_space() {
        let echelon = reduced_row_echelon(&matrix(2, 2, &[2, 0, 0, -2]));
        assert_eq!(echelon.nullity(), 0);
        assert!(echelon.null_space().is_empty());
    }

    #[test]
    fn test_lcm_of_denominators() {
        assert_eq!(
            lcm_of_denominators(&[q("1/4"), q("5/6"), q("3")]),
            Natural::from(12u32)
        );
        assert_eq!(lcm_of_denominators(&[]), Natural::ONE);
    }

    #[test]
    fn test_integer_normalize() {
        assert_eq!(
            integer_normalize(&[q("2"), q("3/2"), q("1")]),
            vec![q("4"), q("3"), q("2")]
        );
        assert_eq!(
            integer_normalize(&[q("6"), q("-9"), q("3")]),
            vec![q("2"), q("-3"), q("1")]
        );
        assert_eq!(
            integer_normalize(&[q("-1/3"), q("-2/3")]),
            vec![q("-1"), q("-2")]
        );
        assert_eq!(integer_normalize(&[q("0"), q("0")]), vec![q("0"), q("0")]);
    }
}
