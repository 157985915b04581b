//! Dense 2-D matrix engine.
//!
//! # Matrix Engine
//!
//! This module defines the numeric container every higher-level computation in
//! the crate is expressed through: a rectangular, row-major array of `f64`
//! values with value semantics.
//!
//! It supports:
//! - Construction from dimensions, nested literals (`matrix!`) or delimited text
//! - Arithmetic with matrices and scalars, including the Hadamard product
//! - Elementwise transforms via arbitrary scalar functions
//! - Shape operations: transpose, concatenation, sub-ranges, flattening
//! - Reductions by row, by column and over all entries
//! - Uniform random fill through an explicitly injected RNG
//!
//! ## Design Highlights
//! - Shape (`rows × columns`) is fixed at construction; every shape-changing
//!   operation allocates and returns a new matrix
//! - In-place mutation is limited to explicit setters (`set`, `set_row`, ...)
//! - Equality is exact: same shape and bit-identical entries
//! - Matrix multiplication parallelizes over output rows with [`rayon`](https://docs.rs/rayon)
//!
//! ## Limitations
//! - `f64` only, two dimensions only
//! - No broadcasting; shape mismatches panic rather than coerce
//! - `normalize` on a constant matrix divides by zero and yields NaN entries
//!   (documented hazard, intentionally not special-cased)

use rand::Rng;
use rayon::prelude::*;
use std::fmt;

/// A dense `rows × columns` matrix of `f64` values in row-major order.
///
/// Invariants, enforced at every construction site:
/// - `rows >= 1` and `columns >= 1`
/// - `data.len() == rows * columns`
///
/// The shape never changes for the life of an instance; operations that would
/// change it return a fresh matrix instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a zero-filled matrix with the given dimensions.
    ///
    /// # Panics
    /// Panics if either dimension is zero.
    pub fn new(rows: usize, columns: usize) -> Self {
        assert!(
            rows >= 1 && columns >= 1,
            "matrix dimensions must be at least 1x1, got {rows}x{columns}"
        );
        Self {
            rows,
            columns,
            data: vec![0.0; rows * columns],
        }
    }

    /// Creates a matrix from explicit row slices.
    ///
    /// # Panics
    /// Panics if `rows` is empty, any row is empty, or the rows have
    /// mismatched lengths.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        assert!(!rows.is_empty(), "matrix needs at least one row");
        let columns = rows[0].len();
        assert!(columns >= 1, "matrix needs at least one column");
        let mut data = Vec::with_capacity(rows.len() * columns);
        for row in rows {
            assert_eq!(
                row.len(),
                columns,
                "ragged rows: expected {} entries, got {}",
                columns,
                row.len()
            );
            data.extend_from_slice(row);
        }
        Self {
            rows: rows.len(),
            columns,
            data,
        }
    }

    /// Creates a matrix with the given shape, reusing an existing row-major
    /// buffer.
    ///
    /// # Panics
    /// Panics if the buffer length does not match `rows * columns` or either
    /// dimension is zero.
    pub fn from_vec(rows: usize, columns: usize, data: Vec<f64>) -> Self {
        assert!(
            rows >= 1 && columns >= 1,
            "matrix dimensions must be at least 1x1, got {rows}x{columns}"
        );
        assert_eq!(
            data.len(),
            rows * columns,
            "shape {rows}x{columns} is incompatible with {} data elements",
            data.len()
        );
        Self {
            rows,
            columns,
            data,
        }
    }

    /// Parses a matrix from delimited text: `;` separates rows, whitespace
    /// separates entries (`"1 2 3 ; 4 5 6"`). Used mainly for test fixtures.
    ///
    /// # Errors
    /// Returns an error if the text is empty, a number fails to parse, or the
    /// rows have mismatched lengths.
    pub fn parse(src: &str) -> Result<Self, &'static str> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        for line in src.split(';') {
            let row: Vec<f64> = line
                .split_whitespace()
                .map(str::parse::<f64>)
                .collect::<Result<_, _>>()
                .map_err(|_| "bad number")?;
            if row.is_empty() {
                return Err("empty row");
            }
            if let Some(first) = rows.first()
                && first.len() != row.len()
            {
                return Err("ragged rows");
            }
            rows.push(row);
        }
        if rows.is_empty() {
            return Err("empty matrix text");
        }
        Ok(Self::from_rows(&rows))
    }

    /// Creates a matrix with every entry set to `value`.
    pub fn filled(rows: usize, columns: usize, value: f64) -> Self {
        let mut result = Self::new(rows, columns);
        result.data.fill(value);
        result
    }

    /// Creates a zero matrix (alias of [`Matrix::new`]).
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self::new(rows, columns)
    }

    /// Creates a matrix of ones.
    pub fn ones(rows: usize, columns: usize) -> Self {
        Self::filled(rows, columns, 1.0)
    }

    /// Fills a new matrix with values drawn uniformly from `[min, max)`.
    ///
    /// The random source is passed in by the caller, so deterministic tests
    /// can inject a seeded RNG.
    pub fn random<R: Rng>(rows: usize, columns: usize, min: f64, max: f64, rng: &mut R) -> Self {
        let mut result = Self::new(rows, columns);
        for entry in &mut result.data {
            *entry = rng.random_range(min..max);
        }
        result
    }

    /// One-hot encodes a `1×m` row vector of class indices into a
    /// `num_values × m` matrix: column `j` holds a single `1` at row
    /// `labels[j]`.
    ///
    /// # Panics
    /// Panics if `labels` is not a row vector.
    pub fn one_hot(labels: &Matrix, num_values: usize) -> Self {
        assert!(
            labels.is_row(),
            "one_hot expects a 1xM row vector, got {}x{}",
            labels.rows,
            labels.columns
        );
        let mut result = Self::new(num_values, labels.columns);
        for r in 0..num_values {
            for c in 0..labels.columns {
                if labels.get(0, c) == r as f64 {
                    result.set(r, c, 1.0);
                }
            }
        }
        result
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// `(rows, columns)` pair.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    /// Total number of entries.
    pub fn size(&self) -> usize {
        self.rows * self.columns
    }

    /// `true` for a `1×1` matrix.
    pub fn is_scalar(&self) -> bool {
        self.rows == 1 && self.columns == 1
    }

    /// `true` for a `1×n` matrix.
    pub fn is_row(&self) -> bool {
        self.rows == 1
    }

    /// `true` for an `n×1` matrix.
    pub fn is_column(&self) -> bool {
        self.columns == 1
    }

    /// `true` when `rows == columns`.
    pub fn is_square(&self) -> bool {
        self.rows == self.columns
    }

    /// The row-major entries as a flat slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Returns the entry at `(row, column)`.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.check_index(row, column);
        self.data[row * self.columns + column]
    }

    /// Overwrites the entry at `(row, column)` in place.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        self.check_index(row, column);
        self.data[row * self.columns + column] = value;
    }

    fn check_index(&self, row: usize, column: usize) {
        assert!(
            row < self.rows && column < self.columns,
            "index ({row}, {column}) out of range for {}x{} matrix",
            self.rows,
            self.columns
        );
    }

    /// Extracts row `row` as a `1×columns` matrix.
    ///
    /// # Panics
    /// Panics if `row` is out of range.
    pub fn row(&self, row: usize) -> Matrix {
        self.check_index(row, 0);
        let start = row * self.columns;
        Matrix::from_vec(1, self.columns, self.data[start..start + self.columns].to_vec())
    }

    /// Extracts column `column` as a `rows×1` matrix.
    ///
    /// # Panics
    /// Panics if `column` is out of range.
    pub fn column(&self, column: usize) -> Matrix {
        self.check_index(0, column);
        let data = (0..self.rows).map(|r| self.get(r, column)).collect();
        Matrix::from_vec(self.rows, 1, data)
    }

    /// Overwrites row `row` with the entries of a `1×columns` matrix.
    ///
    /// # Panics
    /// Panics if `row` is out of range or `values` has the wrong shape.
    pub fn set_row(&mut self, row: usize, values: &Matrix) {
        self.check_index(row, 0);
        assert!(
            values.is_row() && values.columns == self.columns,
            "set_row expects a 1x{} row vector, got {}x{}",
            self.columns,
            values.rows,
            values.columns
        );
        let start = row * self.columns;
        self.data[start..start + self.columns].copy_from_slice(&values.data);
    }

    /// Overwrites column `column` with the entries of a `rows×1` matrix.
    ///
    /// # Panics
    /// Panics if `column` is out of range or `values` has the wrong shape.
    pub fn set_column(&mut self, column: usize, values: &Matrix) {
        self.check_index(0, column);
        assert!(
            values.is_column() && values.rows == self.rows,
            "set_column expects a {}x1 column vector, got {}x{}",
            self.rows,
            values.rows,
            values.columns
        );
        for r in 0..self.rows {
            self.data[r * self.columns + column] = values.data[r];
        }
    }

    /// Sets every entry of column `column` to `value` in place.
    ///
    /// # Panics
    /// Panics if `column` is out of range.
    pub fn set_column_value(&mut self, column: usize, value: f64) {
        self.check_index(0, column);
        for r in 0..self.rows {
            self.data[r * self.columns + column] = value;
        }
    }

    fn check_same_shape(&self, other: &Matrix, op: &str) {
        assert!(
            self.rows == other.rows && self.columns == other.columns,
            "{op} shape mismatch: {}x{} vs {}x{}",
            self.rows,
            self.columns,
            other.rows,
            other.columns
        );
    }

    /// Entrywise sum of two equal-shaped matrices.
    ///
    /// # Panics
    /// Panics if the shapes differ.
    pub fn add(&self, other: &Matrix) -> Matrix {
        self.check_same_shape(other, "add");
        self.zip_with(other, |a, b| a + b)
    }

    /// Entrywise difference of two equal-shaped matrices.
    ///
    /// # Panics
    /// Panics if the shapes differ.
    pub fn subtract(&self, other: &Matrix) -> Matrix {
        self.check_same_shape(other, "subtract");
        self.zip_with(other, |a, b| a - b)
    }

    /// Hadamard (entrywise) product of two equal-shaped matrices.
    ///
    /// # Panics
    /// Panics if the shapes differ.
    pub fn multiply_each_entry(&self, other: &Matrix) -> Matrix {
        self.check_same_shape(other, "multiply_each_entry");
        self.zip_with(other, |a, b| a * b)
    }

    /// Entrywise quotient of two equal-shaped matrices.
    ///
    /// # Panics
    /// Panics if the shapes differ.
    pub fn divide_each_entry(&self, other: &Matrix) -> Matrix {
        self.check_same_shape(other, "divide_each_entry");
        self.zip_with(other, |a, b| a / b)
    }

    fn zip_with(&self, other: &Matrix, f: impl Fn(f64, f64) -> f64) -> Matrix {
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Matrix::from_vec(self.rows, self.columns, data)
    }

    /// Adds `value` to every entry.
    pub fn add_scalar(&self, value: f64) -> Matrix {
        self.map(|x| x + value)
    }

    /// Subtracts `value` from every entry.
    pub fn subtract_scalar(&self, value: f64) -> Matrix {
        self.map(|x| x - value)
    }

    /// Multiplies every entry by `value`.
    pub fn multiply_scalar(&self, value: f64) -> Matrix {
        self.map(|x| x * value)
    }

    /// Divides every entry by `value`.
    pub fn divide_scalar(&self, value: f64) -> Matrix {
        self.map(|x| x / value)
    }

    /// Standard matrix product `self · other` (`m×k · k×n -> m×n`).
    ///
    /// Output rows are computed in parallel with rayon; within a row the inner
    /// dimension is accumulated sequentially, so results are deterministic.
    ///
    /// # Panics
    /// Panics if `self.columns != other.rows`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        assert_eq!(
            self.columns, other.rows,
            "multiply shape mismatch: {}x{} * {}x{}",
            self.rows, self.columns, other.rows, other.columns
        );
        let (m, k, n) = (self.rows, self.columns, other.columns);
        let mut out = vec![0.0; m * n];
        out.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
            for (j, out_entry) in row.iter_mut().enumerate() {
                let mut sum = 0.0;
                for l in 0..k {
                    sum += self.data[i * k + l] * other.data[l * n + j];
                }
                *out_entry = sum;
            }
        });
        Matrix::from_vec(m, n, out)
    }

    /// Applies a scalar function to every entry, returning a new matrix of the
    /// same shape. Used for sigmoid, logarithm, negation and squaring.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Matrix {
        let data = self.data.iter().map(|&x| f(x)).collect();
        Matrix::from_vec(self.rows, self.columns, data)
    }

    /// Negates every entry.
    pub fn negative(&self) -> Matrix {
        self.map(|x| -x)
    }

    /// Natural logarithm of every entry. Entries that are exactly zero map to
    /// `-inf`, negative entries to NaN; neither case is trapped here.
    pub fn ln(&self) -> Matrix {
        self.map(f64::ln)
    }

    /// Transposes into an `n×m` matrix.
    pub fn transpose(&self) -> Matrix {
        let mut result = Matrix::new(self.columns, self.rows);
        for r in 0..self.rows {
            for c in 0..self.columns {
                result.data[c * self.rows + r] = self.data[r * self.columns + c];
            }
        }
        result
    }

    /// Stacks `other` below `self`.
    ///
    /// # Panics
    /// Panics if the column counts differ.
    pub fn concat_v(&self, other: &Matrix) -> Matrix {
        assert_eq!(
            self.columns, other.columns,
            "concat_v shape mismatch: {}x{} over {}x{}",
            self.rows, self.columns, other.rows, other.columns
        );
        let mut data = Vec::with_capacity(self.data.len() + other.data.len());
        data.extend_from_slice(&self.data);
        data.extend_from_slice(&other.data);
        Matrix::from_vec(self.rows + other.rows, self.columns, data)
    }

    /// Joins `other` to the right of `self`.
    ///
    /// # Panics
    /// Panics if the row counts differ.
    pub fn concat_h(&self, other: &Matrix) -> Matrix {
        assert_eq!(
            self.rows, other.rows,
            "concat_h shape mismatch: {}x{} beside {}x{}",
            self.rows, self.columns, other.rows, other.columns
        );
        let mut data = Vec::with_capacity(self.data.len() + other.data.len());
        for r in 0..self.rows {
            data.extend_from_slice(&self.data[r * self.columns..(r + 1) * self.columns]);
            data.extend_from_slice(&other.data[r * other.columns..(r + 1) * other.columns]);
        }
        Matrix::from_vec(self.rows, self.columns + other.columns, data)
    }

    /// Extracts the inclusive row range `[start_row, end_row]`.
    ///
    /// # Panics
    /// Panics if the range is empty or out of bounds.
    pub fn rows_range(&self, start_row: usize, end_row: usize) -> Matrix {
        assert!(
            start_row <= end_row && end_row < self.rows,
            "row range [{start_row}, {end_row}] out of range for {}x{} matrix",
            self.rows,
            self.columns
        );
        let data = self.data[start_row * self.columns..(end_row + 1) * self.columns].to_vec();
        Matrix::from_vec(end_row - start_row + 1, self.columns, data)
    }

    /// Extracts the inclusive column range `[start_column, end_column]`.
    ///
    /// # Panics
    /// Panics if the range is empty or out of bounds.
    pub fn columns_range(&self, start_column: usize, end_column: usize) -> Matrix {
        assert!(
            start_column <= end_column && end_column < self.columns,
            "column range [{start_column}, {end_column}] out of range for {}x{} matrix",
            self.rows,
            self.columns
        );
        let width = end_column - start_column + 1;
        let mut data = Vec::with_capacity(self.rows * width);
        for r in 0..self.rows {
            let start = r * self.columns + start_column;
            data.extend_from_slice(&self.data[start..start + width]);
        }
        Matrix::from_vec(self.rows, width, data)
    }

    /// Drops the first `start_row` rows and `start_column` columns.
    ///
    /// # Panics
    /// Panics if nothing would remain in either dimension.
    pub fn sub_matrix(&self, start_row: usize, start_column: usize) -> Matrix {
        self.rows_range(start_row, self.rows - 1)
            .columns_range(start_column, self.columns - 1)
    }

    /// Linearizes all entries in row-major order into a `1×(rows·columns)`
    /// matrix.
    pub fn flat_row(&self) -> Matrix {
        Matrix::from_vec(1, self.data.len(), self.data.clone())
    }

    /// Linearizes all entries in row-major order into a `(rows·columns)×1`
    /// matrix.
    pub fn flat_column(&self) -> Matrix {
        Matrix::from_vec(self.data.len(), 1, self.data.clone())
    }

    /// Largest entry in the matrix.
    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest entry in the matrix.
    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Per-row maxima as a `rows×1` column vector.
    pub fn max_by_row(&self) -> Matrix {
        let data = (0..self.rows).map(|r| self.row_max(r)).collect();
        Matrix::from_vec(self.rows, 1, data)
    }

    /// Per-row minima as a `rows×1` column vector.
    pub fn min_by_row(&self) -> Matrix {
        let data = (0..self.rows).map(|r| self.row_min(r)).collect();
        Matrix::from_vec(self.rows, 1, data)
    }

    /// Per-column maxima as a `1×columns` row vector.
    pub fn max_by_column(&self) -> Matrix {
        let data = (0..self.columns)
            .map(|c| (0..self.rows).map(|r| self.get(r, c)).fold(f64::NEG_INFINITY, f64::max))
            .collect();
        Matrix::from_vec(1, self.columns, data)
    }

    /// Per-column minima as a `1×columns` row vector.
    pub fn min_by_column(&self) -> Matrix {
        let data = (0..self.columns)
            .map(|c| (0..self.rows).map(|r| self.get(r, c)).fold(f64::INFINITY, f64::min))
            .collect();
        Matrix::from_vec(1, self.columns, data)
    }

    /// Per-row index of the maximum, as a `rows×1` column vector.
    ///
    /// The scan compares with `>=`, so when several entries tie for the
    /// maximum the **last** index wins. Prediction relies on this exact
    /// tie-break whenever two class scores are equal.
    pub fn index_max_by_row(&self) -> Matrix {
        let data = (0..self.rows)
            .map(|r| index_max(&self.data[r * self.columns..(r + 1) * self.columns]) as f64)
            .collect();
        Matrix::from_vec(self.rows, 1, data)
    }

    /// Per-row index of the minimum, as a `rows×1` column vector.
    ///
    /// The scan compares with `<`, so ties keep the **first** index — note the
    /// asymmetry with [`Matrix::index_max_by_row`].
    pub fn index_min_by_row(&self) -> Matrix {
        let data = (0..self.rows)
            .map(|r| index_min(&self.data[r * self.columns..(r + 1) * self.columns]) as f64)
            .collect();
        Matrix::from_vec(self.rows, 1, data)
    }

    /// Per-column index of the maximum, as a `1×columns` row vector.
    /// Ties resolve to the last equal maximum, as in
    /// [`Matrix::index_max_by_row`].
    pub fn index_max_by_column(&self) -> Matrix {
        let data = (0..self.columns)
            .map(|c| {
                let column: Vec<f64> = (0..self.rows).map(|r| self.get(r, c)).collect();
                index_max(&column) as f64
            })
            .collect();
        Matrix::from_vec(1, self.columns, data)
    }

    /// Per-column index of the minimum, as a `1×columns` row vector.
    /// Ties resolve to the first minimum, as in [`Matrix::index_min_by_row`].
    pub fn index_min_by_column(&self) -> Matrix {
        let data = (0..self.columns)
            .map(|c| {
                let column: Vec<f64> = (0..self.rows).map(|r| self.get(r, c)).collect();
                index_min(&column) as f64
            })
            .collect();
        Matrix::from_vec(1, self.columns, data)
    }

    fn row_max(&self, r: usize) -> f64 {
        self.data[r * self.columns..(r + 1) * self.columns]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    fn row_min(&self, r: usize) -> f64 {
        self.data[r * self.columns..(r + 1) * self.columns]
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Reduces along the shorter description of the matrix: row vectors sum by
    /// row (to `1×1`), everything else sums by column.
    pub fn sum(&self) -> Matrix {
        if self.is_row() {
            self.sum_by_row()
        } else {
            self.sum_by_column()
        }
    }

    /// Per-row sums as a `rows×1` column vector.
    pub fn sum_by_row(&self) -> Matrix {
        let data = (0..self.rows)
            .map(|r| self.data[r * self.columns..(r + 1) * self.columns].iter().sum())
            .collect();
        Matrix::from_vec(self.rows, 1, data)
    }

    /// Per-column sums as a `1×columns` row vector.
    pub fn sum_by_column(&self) -> Matrix {
        let data = (0..self.columns)
            .map(|c| (0..self.rows).map(|r| self.get(r, c)).sum())
            .collect();
        Matrix::from_vec(1, self.columns, data)
    }

    /// Sum of all entries.
    pub fn sum_all(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Rescales all entries linearly into `[0, 1]` using the matrix's own
    /// global minimum and maximum.
    ///
    /// When every entry is equal (`min == max`) the division degenerates and
    /// every entry becomes NaN. Callers are expected to know their data; this
    /// is documented rather than guarded.
    pub fn normalize(&self) -> Matrix {
        let max = self.max();
        let min = self.min();
        self.map(|x| (x - min) / (max - min))
    }
}

fn index_max(entries: &[f64]) -> usize {
    let mut largest = entries[0];
    let mut index = 0;
    for (i, &value) in entries.iter().enumerate().skip(1) {
        if value >= largest {
            largest = value;
            index = i;
        }
    }
    index
}

fn index_min(entries: &[f64]) -> usize {
    let mut lowest = entries[0];
    let mut index = 0;
    for (i, &value) in entries.iter().enumerate().skip(1) {
        if value < lowest {
            lowest = value;
            index = i;
        }
    }
    index
}

impl fmt::Display for Matrix {
    /// Shape header plus entries, truncated to the first 10 rows and columns.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{};{}]", self.rows, self.columns)?;
        let limited_rows = self.rows.min(10);
        let limited_columns = self.columns.min(10);
        for r in 0..limited_rows {
            write!(f, "\t")?;
            for c in 0..limited_columns {
                write!(f, "{:.8}\t", self.get(r, c))?;
            }
            if limited_columns < self.columns {
                writeln!(f, " ...")?;
            } else {
                writeln!(f)?;
            }
        }
        if limited_rows < self.rows {
            writeln!(f, "\t...")?;
        }
        Ok(())
    }
}

/// Defines a matrix from a nested literal array.
///
/// Rows must be uniform in length.
///
/// # Example
/// ```
/// use perceptra::matrix;
/// let m = matrix!([[1.0, 2.0], [3.0, 4.0]]);
/// assert_eq!(m.shape(), (2, 2));
/// ```
#[macro_export]
macro_rules! matrix {
    ([ $( [ $( $x:expr ),+ $(,)? ] ),+ $(,)? ]) => {
        $crate::matrix::Matrix::from_rows(&[ $( vec![ $( f64::from($x) ),+ ] ),+ ])
    };
}
