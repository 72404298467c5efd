use std::{
    fmt::Display,
    ops::{Index, IndexMut},
    slice::Chunks,
};

use tracing::{debug, instrument};

use crate::{domains::Field, error::ArithmeticError, printer::MatrixPrinter};

/// Convert a row or column count to the 32-bit size matrices are indexed with.
fn dimension(len: usize) -> Result<u32, ArithmeticError> {
    u32::try_from(len).map_err(|_| ArithmeticError::DimensionTooLarge(len))
}

/// A matrix with entries that are elements of a field `F`.
///
/// The entries are stored row by row. A matrix always has at least one
/// row and one column, so the entries can produce the identities of their
/// field, which is how a residue matrix knows its prime.
#[derive(Clone, PartialEq, Debug)]
pub struct Matrix<F: Field> {
    pub(crate) data: Vec<F>,
    pub(crate) nrows: u32,
    pub(crate) ncols: u32,
}

impl<F: Field> Matrix<F> {
    /// Create a new matrix from a list of rows.
    pub fn from_nested_vec(rows: Vec<Vec<F>>) -> Result<Matrix<F>, ArithmeticError> {
        let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
        if ncols == 0 {
            return Err(ArithmeticError::EmptyMatrix);
        }

        let nrows = rows.len();
        let shape = (dimension(nrows)?, dimension(ncols)?);

        let mut data = Vec::with_capacity(ncols);
        for (row, entries) in rows.into_iter().enumerate() {
            if entries.len() != ncols {
                return Err(ArithmeticError::NotRectangular {
                    row,
                    expected: ncols,
                    found: entries.len(),
                });
            }

            data.extend(entries);
        }

        Ok(Matrix {
            data,
            nrows: shape.0,
            ncols: shape.1,
        })
    }

    /// Create a new matrix from a row-major list of entries.
    pub fn from_linear(data: Vec<F>, nrows: u32, ncols: u32) -> Result<Matrix<F>, ArithmeticError> {
        if nrows == 0 || ncols == 0 {
            return Err(ArithmeticError::EmptyMatrix);
        }

        if data.len() != nrows as usize * ncols as usize {
            return Err(ArithmeticError::IncompatibleDimensions {
                lhs: (nrows, ncols),
                rhs: (1, dimension(data.len())?),
            });
        }

        Ok(Matrix { data, nrows, ncols })
    }

    /// Create the `n x n` identity matrix, given the unit of the field.
    pub fn identity(n: u32, one: &F) -> Result<Matrix<F>, ArithmeticError> {
        if n == 0 {
            return Err(ArithmeticError::EmptyMatrix);
        }

        let zero = one.zero();
        let data = (0..n * n)
            .map(|i| {
                if i % n == i / n {
                    one.clone()
                } else {
                    zero.clone()
                }
            })
            .collect();

        Ok(Matrix {
            data,
            nrows: n,
            ncols: n,
        })
    }

    /// Return the number of rows.
    pub fn nrows(&self) -> usize {
        self.nrows as usize
    }

    /// Return the number of columns.
    pub fn ncols(&self) -> usize {
        self.ncols as usize
    }

    /// Return the entries in row-major order.
    pub fn data(&self) -> &[F] {
        &self.data
    }

    /// Return an iterator over the rows of the matrix.
    pub fn row_iter(&self) -> Chunks<'_, F> {
        self.data.chunks(self.ncols as usize)
    }

    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    fn field_zero(&self) -> F {
        self.data[0].zero()
    }

    fn field_one(&self) -> F {
        self.data[0].one()
    }

    fn check_same_shape(&self, rhs: &Matrix<F>) -> Result<(), ArithmeticError> {
        if self.nrows != rhs.nrows || self.ncols != rhs.ncols {
            return Err(ArithmeticError::IncompatibleDimensions {
                lhs: (self.nrows, self.ncols),
                rhs: (rhs.nrows, rhs.ncols),
            });
        }

        Ok(())
    }

    /// Transpose the matrix.
    pub fn transpose(&self) -> Matrix<F> {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.ncols {
            for i in 0..self.nrows {
                data.push(self[(i, j)].clone());
            }
        }

        Matrix {
            data,
            nrows: self.ncols,
            ncols: self.nrows,
        }
    }

    /// Add two matrices of the same shape.
    pub fn add(&self, rhs: &Matrix<F>) -> Result<Matrix<F>, ArithmeticError> {
        self.check_same_shape(rhs)?;

        Ok(Matrix {
            data: self
                .data
                .iter()
                .zip(&rhs.data)
                .map(|(a, b)| a.add(b))
                .collect::<Result<_, _>>()?,
            nrows: self.nrows,
            ncols: self.ncols,
        })
    }

    /// Subtract two matrices of the same shape.
    pub fn sub(&self, rhs: &Matrix<F>) -> Result<Matrix<F>, ArithmeticError> {
        self.check_same_shape(rhs)?;

        Ok(Matrix {
            data: self
                .data
                .iter()
                .zip(&rhs.data)
                .map(|(a, b)| a.sub(b))
                .collect::<Result<_, _>>()?,
            nrows: self.nrows,
            ncols: self.ncols,
        })
    }

    /// Multiply two matrices. The number of columns of `self` must equal
    /// the number of rows of `rhs`.
    pub fn mul(&self, rhs: &Matrix<F>) -> Result<Matrix<F>, ArithmeticError> {
        if self.ncols != rhs.nrows {
            return Err(ArithmeticError::IncompatibleDimensions {
                lhs: (self.nrows, self.ncols),
                rhs: (rhs.nrows, rhs.ncols),
            });
        }

        let mut data = Vec::with_capacity(self.nrows as usize * rhs.ncols as usize);
        for i in 0..self.nrows {
            for j in 0..rhs.ncols {
                let mut sum = self.field_zero();
                for k in 0..self.ncols {
                    sum = sum.add(&self[(i, k)].mul(&rhs[(k, j)])?)?;
                }
                data.push(sum);
            }
        }

        Ok(Matrix {
            data,
            nrows: self.nrows,
            ncols: rhs.ncols,
        })
    }

    /// Multiply the scalar `e` to each entry of the matrix.
    pub fn mul_scalar(&self, e: &F) -> Result<Matrix<F>, ArithmeticError> {
        Ok(Matrix {
            data: self
                .data
                .iter()
                .map(|ee| ee.mul(e))
                .collect::<Result<_, _>>()?,
            nrows: self.nrows,
            ncols: self.ncols,
        })
    }

    /// Negate each entry of the matrix.
    pub fn neg(&self) -> Matrix<F> {
        Matrix {
            data: self.data.iter().map(|e| e.neg()).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }

    fn swap_rows(&mut self, i: u32, k: u32) {
        if i == k {
            return;
        }

        for l in 0..self.ncols {
            self.data
                .swap((self.ncols * i + l) as usize, (self.ncols * k + l) as usize);
        }
    }

    fn scale_row(&mut self, row: u32, factor: &F) -> Result<(), ArithmeticError> {
        for l in 0..self.ncols {
            let e = self[(row, l)].mul(factor)?;
            self[(row, l)] = e;
        }

        Ok(())
    }

    /// Add `factor` times row `source` to row `target`.
    fn add_scaled_row(&mut self, target: u32, factor: &F, source: u32) -> Result<(), ArithmeticError> {
        for l in 0..self.ncols {
            let e = self[(target, l)].add(&self[(source, l)].mul(factor)?)?;
            self[(target, l)] = e;
        }

        Ok(())
    }

    /// Write the matrix in echelon form, choosing for every column the first
    /// row at or below the current one with a non-zero entry as the pivot.
    /// Returns the pivot positions and the sign picked up from row swaps.
    fn gaussian_elimination(&mut self) -> Result<(Vec<(u32, u32)>, F), ArithmeticError> {
        let mut sign = self.field_one();
        let mut pivots = vec![];

        let mut i = 0;
        for j in 0..self.ncols {
            if i >= self.nrows {
                break;
            }

            let Some(k) = (i..self.nrows).find(|&k| !self[(k, j)].is_zero()) else {
                continue;
            };

            if k != i {
                self.swap_rows(i, k);
                sign = sign.neg();
            }

            let x = self[(i, j)].clone();
            for k in i + 1..self.nrows {
                if !self[(k, j)].is_zero() {
                    let s = self[(k, j)].div(&x)?.neg();
                    self.add_scaled_row(k, &s, i)?;
                }
            }

            pivots.push((i, j));
            i += 1;
        }

        Ok((pivots, sign))
    }

    /// Create a row-reduced matrix from a matrix in echelon form, scaling
    /// every pivot to one. Returns `det` multiplied by all pivots.
    fn back_substitution(&mut self, pivots: &[(u32, u32)], mut det: F) -> Result<F, ArithmeticError> {
        for &(i, j) in pivots.iter().rev() {
            let x = self[(i, j)].clone();
            det = det.mul(&x)?;

            if !x.is_one() {
                self.scale_row(i, &x.inv()?)?;
            }

            for k in 0..i {
                if !self[(k, j)].is_zero() {
                    let s = self[(k, j)].neg();
                    self.add_scaled_row(k, &s, i)?;
                }
            }
        }

        Ok(det)
    }

    /// Compute the reduced row echelon form, the rank and the determinant
    /// in a single elimination pass.
    ///
    /// The determinant is zero if the matrix is not square or not of full rank.
    #[instrument(level = "debug", skip_all, fields(nrows = self.nrows, ncols = self.ncols))]
    pub fn rref(&self) -> Result<(Matrix<F>, usize, F), ArithmeticError> {
        let mut m = self.clone();

        let (pivots, sign) = m.gaussian_elimination()?;
        let mut det = m.back_substitution(&pivots, sign)?;

        let rank = pivots.len();
        if !self.is_square() || rank != self.nrows as usize {
            det = det.zero();
        }

        debug!(rank = rank, det = %det, "row reduced");
        Ok((m, rank, det))
    }

    /// Get the rank of the matrix.
    pub fn rank(&self) -> Result<usize, ArithmeticError> {
        Ok(self.rref()?.1)
    }

    /// Get the determinant of the matrix. Non-square matrices have
    /// determinant zero.
    pub fn det(&self) -> Result<F, ArithmeticError> {
        Ok(self.rref()?.2)
    }
}

impl<F: Field> Index<u32> for Matrix<F> {
    type Output = [F];

    /// Get the `index`th row of the matrix.
    #[inline]
    fn index(&self, index: u32) -> &Self::Output {
        &self.data[index as usize * self.ncols as usize..(index as usize + 1) * self.ncols as usize]
    }
}

impl<F: Field> Index<(u32, u32)> for Matrix<F> {
    type Output = F;

    /// Get the `i`th row and `j`th column of the matrix, where `index=(i,j)`.
    #[inline]
    fn index(&self, index: (u32, u32)) -> &Self::Output {
        &self.data[(index.0 * self.ncols + index.1) as usize]
    }
}

impl<F: Field> IndexMut<(u32, u32)> for Matrix<F> {
    /// Get the `i`th row and `j`th column of the matrix, where `index=(i,j)`.
    #[inline]
    fn index_mut(&mut self, index: (u32, u32)) -> &mut F {
        &mut self.data[(index.0 * self.ncols + index.1) as usize]
    }
}

impl<F: Field> Display for Matrix<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        MatrixPrinter::new(self).fmt(f)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        domains::{finite_field::Residue, rational::Rational, Field},
        error::ArithmeticError,
        tensors::matrix::Matrix,
    };

    use super::dimension;

    fn q_matrix(rows: &[&[&str]]) -> Matrix<Rational> {
        Matrix::from_nested_vec(
            rows.iter()
                .map(|r| r.iter().map(|e| e.parse().unwrap()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn zp_matrix(rows: &[&[u32]], p: u32) -> Matrix<Residue> {
        Matrix::from_nested_vec(
            rows.iter()
                .map(|r| r.iter().map(|&e| Residue::new(e, p).unwrap()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn q(s: &str) -> Rational {
        s.parse().unwrap()
    }

    #[test]
    fn basics() {
        let a = q_matrix(&[&["1", "2", "3"], &["4", "5", "6"]]);

        assert_eq!(a.nrows(), 2);
        assert_eq!(a.ncols(), 3);
        assert_eq!(a.transpose(), q_matrix(&[&["1", "4"], &["2", "5"], &["3", "6"]]));
        assert_eq!(a.neg(), q_matrix(&[&["-1", "-2", "-3"], &["-4", "-5", "-6"]]));
        assert_eq!(a.sub(&a), Ok(q_matrix(&[&["0", "0", "0"], &["0", "0", "0"]])));
        assert_eq!(a.add(&a), Ok(q_matrix(&[&["2", "4", "6"], &["8", "10", "12"]])));
        assert_eq!(
            a.mul_scalar(&q("1/2")),
            Ok(q_matrix(&[&["1/2", "1", "3/2"], &["2", "5/2", "3"]]))
        );

        let b = q_matrix(&[&["7", "8"], &["9", "10"], &["11", "12"]]);
        let c = a.mul(&b).unwrap();
        assert_eq!(c, q_matrix(&[&["58", "64"], &["139", "154"]]));
        assert_eq!(&c[1], &[q("139"), q("154")]);
        assert_eq!(c[(0, 1)], q("64"));
        assert_eq!(c.row_iter().count(), 2);
    }

    #[test]
    fn construction_errors() {
        assert_eq!(
            Matrix::<Rational>::from_nested_vec(vec![]),
            Err(ArithmeticError::EmptyMatrix)
        );
        assert_eq!(
            Matrix::<Rational>::from_nested_vec(vec![vec![]]),
            Err(ArithmeticError::EmptyMatrix)
        );
        assert_eq!(
            Matrix::from_nested_vec(vec![vec![q("1"), q("2")], vec![q("3")]]),
            Err(ArithmeticError::NotRectangular {
                row: 1,
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            Matrix::from_linear(vec![q("1"), q("2"), q("3")], 2, 2),
            Err(ArithmeticError::IncompatibleDimensions {
                lhs: (2, 2),
                rhs: (1, 3)
            })
        );
        assert_eq!(
            Matrix::<Rational>::from_linear(vec![], 0, 3),
            Err(ArithmeticError::EmptyMatrix)
        );
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn dimension_overflow() {
        assert_eq!(dimension(u32::MAX as usize), Ok(u32::MAX));

        let len = u32::MAX as usize + 1;
        assert_eq!(dimension(len), Err(ArithmeticError::DimensionTooLarge(len)));
    }

    #[test]
    fn dimension_mismatch() {
        let a = q_matrix(&[&["1", "2", "3"], &["4", "5", "6"]]);
        assert_eq!(
            a.mul(&a),
            Err(ArithmeticError::IncompatibleDimensions {
                lhs: (2, 3),
                rhs: (2, 3)
            })
        );
        assert_eq!(
            a.add(&a.transpose()),
            Err(ArithmeticError::IncompatibleDimensions {
                lhs: (2, 3),
                rhs: (3, 2)
            })
        );
    }

    #[test]
    fn identity() {
        let i = Matrix::identity(3, &q("1")).unwrap();
        let a = q_matrix(&[&["1", "2", "3"], &["4", "5", "16"], &["7", "8", "9"]]);
        assert_eq!(a.mul(&i), Ok(a.clone()));
        assert_eq!(i.det(), Ok(q("1")));
        assert_eq!(
            Matrix::identity(0, &q("1")),
            Err(ArithmeticError::EmptyMatrix)
        );
    }

    #[test]
    fn row_reduce() {
        let a = q_matrix(&[&["1", "2", "3"], &["4", "5", "6"], &["7", "8", "9"]]);

        let (r, rank, det) = a.rref().unwrap();
        assert_eq!(r, q_matrix(&[&["1", "0", "-1"], &["0", "1", "2"], &["0", "0", "0"]]));
        assert_eq!(rank, 2);
        assert!(det.is_zero());
    }

    #[test]
    fn row_reduce_with_swap() {
        let a = q_matrix(&[&["0", "1"], &["1", "0"]]);

        let (r, rank, det) = a.rref().unwrap();
        assert_eq!(r, q_matrix(&[&["1", "0"], &["0", "1"]]));
        assert_eq!(rank, 2);
        assert_eq!(det, q("-1"));
    }

    #[test]
    fn determinant() {
        let a = q_matrix(&[&["2", "1"], &["1", "3"]]);
        assert_eq!(a.det(), Ok(q("5")));

        let b = q_matrix(&[&["1", "2", "3"], &["4", "5", "16"], &["7", "8", "9"]]);
        assert_eq!(b.det(), Ok(q("60")));

        let c = q_matrix(&[&["1/2", "1/3"], &["1/4", "1/5"]]);
        assert_eq!(c.det(), Ok(q("1/60")));
    }

    #[test]
    fn non_square() {
        let a = q_matrix(&[&["1", "2", "3"], &["2", "4", "7"]]);

        let (r, rank, det) = a.rref().unwrap();
        assert_eq!(r, q_matrix(&[&["1", "2", "0"], &["0", "0", "1"]]));
        assert_eq!(rank, 2);
        assert!(det.is_zero());

        let t = a.transpose();
        assert_eq!(t.rank(), Ok(2));
        assert!(t.det().unwrap().is_zero());
    }

    #[test]
    fn zero_matrix() {
        let a = q_matrix(&[&["0", "0"], &["0", "0"]]);
        let (r, rank, det) = a.rref().unwrap();
        assert_eq!(r, a);
        assert_eq!(rank, 0);
        assert!(det.is_zero());
    }

    #[test]
    fn finite_field() {
        let a = zp_matrix(&[&[1, 2], &[3, 4]], 5);

        let (r, rank, det) = a.rref().unwrap();
        assert_eq!(r, zp_matrix(&[&[1, 0], &[0, 1]], 5));
        assert_eq!(rank, 2);
        assert_eq!(det, Residue::new(3, 5).unwrap());

        // rows that are independent over Q can be dependent modulo p
        let b = zp_matrix(&[&[1, 2], &[2, 4 + 7]], 7);
        assert_eq!(b.rank(), Ok(1));
        assert!(b.det().unwrap().is_zero());
    }

    #[test]
    fn mixed_moduli() {
        let a = zp_matrix(&[&[1, 2]], 5);
        let b = zp_matrix(&[&[1, 2]], 7);
        assert_eq!(a.add(&b), Err(ArithmeticError::IncompatibleModulo(5, 7)));
    }
}
