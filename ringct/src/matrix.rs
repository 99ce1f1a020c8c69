use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Row-major matrix, indexed by `(row, column)`
///
/// In an MLSAG ring each row holds the key vector of one ring member and each column
/// one key of that vector
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Matrix<T> {
    /// Builds a `rows` x `cols` matrix by calling `closure(row, col)` for every cell
    ///
    /// Returns `None` if the matrix would not fit in memory
    pub fn from_fn(
        rows: usize,
        cols: usize,
        mut closure: impl FnMut(usize, usize) -> T,
    ) -> Option<Matrix<T>> {
        let len = rows.checked_mul(cols)?;
        let mut data = Vec::with_capacity(len);
        for row in 0..rows {
            for col in 0..cols {
                data.push(closure(row, col));
            }
        }

        Some(Matrix { rows, cols, data })
    }

    /// Builds a matrix from a list of rows, which must all have the same length
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Matrix<T>> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != cols) {
            return None;
        }

        Some(Matrix {
            rows: rows.len(),
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(col < self.cols, "column index out of bounds");
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(col < self.cols, "column index out of bounds");
        &mut self.data[row * self.cols + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_indexes_row_major() {
        let matrix = Matrix::from_fn(2, 3, |row, col| row * 10 + col).unwrap();
        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.cols(), 3);
        assert_eq!(matrix[(1, 2)], 12);
        assert_eq!(matrix.row(1), &[10, 11, 12]);
    }

    #[test]
    fn it_rejects_ragged_rows() {
        assert!(Matrix::from_rows(vec![vec![1, 2], vec![3]]).is_none());
        let matrix = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(matrix[(1, 0)], 3);
    }
}
