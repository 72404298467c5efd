use std::fmt;

use crate::{domains::Field, tensors::matrix::Matrix};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PrintMode {
    /// Draw the matrix inside a box, one row per line, with all cells
    /// left-aligned to the width of the widest entry.
    Boxed,
    /// Print the matrix on a single line as a list of rows, e.g. `[[1,2],[3,4]]`.
    Nested,
}

pub struct MatrixPrinter<'a, F: Field> {
    pub matrix: &'a Matrix<F>,
    pub print_mode: PrintMode,
}

impl<'a, F: Field> MatrixPrinter<'a, F> {
    pub fn new(matrix: &'a Matrix<F>) -> MatrixPrinter<'a, F> {
        MatrixPrinter {
            matrix,
            print_mode: PrintMode::Boxed,
        }
    }

    pub fn new_with_mode(matrix: &'a Matrix<F>, print_mode: PrintMode) -> MatrixPrinter<'a, F> {
        MatrixPrinter { matrix, print_mode }
    }

    fn fmt_boxed(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cells: Vec<String> = self.matrix.data().iter().map(|e| e.to_string()).collect();
        let cell_width = cells.iter().map(|c| c.chars().count()).max().unwrap_or(0) + 1;
        let inner_width = cell_width * self.matrix.ncols() + 1;

        writeln!(f, "╭{}╮", " ".repeat(inner_width))?;
        for row in cells.chunks(self.matrix.ncols()) {
            f.write_str("│ ")?;
            for cell in row {
                write!(f, "{:<width$}", cell, width = cell_width)?;
            }
            writeln!(f, "│")?;
        }
        write!(f, "╰{}╯", " ".repeat(inner_width))
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("[")?;
        for (i, row) in self.matrix.row_iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str("[")?;
            for (j, e) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}", e)?;
            }
            f.write_str("]")?;
        }
        f.write_str("]")
    }
}

impl<'a, F: Field> fmt::Display for MatrixPrinter<'a, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.print_mode {
            PrintMode::Boxed => self.fmt_boxed(f),
            PrintMode::Nested => self.fmt_nested(f),
        }
    }
}
