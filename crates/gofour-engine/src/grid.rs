//! The rectangular cell matrix and its gravity rules.
//!
//! Cells are stored in a single row-major `Vec`. Row 0 is the entry side:
//! pieces are dropped in at row 0 and fall toward `rows - 1`.

use crate::State;

/// A fixed-size grid of [`State`] cells.
///
/// The grid itself only knows about gravity. Turn order, win detection and
/// game lifecycle live in [`Four`](crate::Four).
///
/// Grids are only built by [`Four::new`](crate::Four::new), after the
/// configuration has been validated, so every grid is at least 2×2. Outside
/// the crate a grid can be read through [`Four::grid`](crate::Four::grid)
/// but not constructed:
///
/// ```compile_fail
/// let grid = gofour_engine::Grid::new(0, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    columns: usize,
    rows: usize,
    cells: Vec<State>,
}

impl Grid {
    /// Allocates an all-empty grid. Both dimensions must be non-zero.
    pub(crate) fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![State::Empty; columns * rows],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the cell at `(row, column)`, or `None` outside the grid.
    pub fn get(&self, row: usize, column: usize) -> Option<State> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        Some(self.cells[row * self.columns + column])
    }

    /// Signed lookup used by the line walker; negative coordinates are
    /// simply outside the grid.
    pub(crate) fn get_signed(&self, row: isize, column: isize) -> Option<State> {
        if row < 0 || column < 0 {
            return None;
        }
        self.get(row as usize, column as usize)
    }

    /// Number of occupied cells in `column` (0 for a column outside the
    /// grid).
    pub fn column_count(&self, column: usize) -> usize {
        if column >= self.columns {
            return 0;
        }
        (0..self.rows)
            .filter(|&row| self.cells[row * self.columns + column] != State::Empty)
            .count()
    }

    /// `true` when the entry cell of `column` is occupied.
    pub fn is_column_full(&self, column: usize) -> bool {
        self.get(0, column)
            .is_none_or(|state| state != State::Empty)
    }

    /// Finds the row a piece dropped into `column` would land on.
    ///
    /// Scans from the entry row downward and stops at the first occupied
    /// cell; the piece lands just above it, or on the last row when the
    /// column is empty. Returns `None` when the column is full or out of
    /// range.
    pub fn landing_row(&self, column: usize) -> Option<usize> {
        if column >= self.columns {
            return None;
        }
        let first_occupied = (0..self.rows)
            .find(|&row| self.cells[row * self.columns + column] != State::Empty)
            .unwrap_or(self.rows);
        first_occupied.checked_sub(1)
    }

    /// Writes `state` at `(row, column)`. The caller guarantees the
    /// coordinates come from [`Grid::landing_row`].
    pub(crate) fn set(&mut self, row: usize, column: usize, state: State) {
        self.cells[row * self.columns + column] = state;
    }

    /// `true` once every cell of the entry row is occupied. Because of
    /// gravity, that means the whole grid is full.
    pub fn is_top_row_full(&self) -> bool {
        self.cells[..self.columns]
            .iter()
            .all(|&state| state != State::Empty)
    }

    /// Iterates over the rows, top first.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[State]> {
        self.cells.chunks(self.columns)
    }

    /// `true` when no empty cell sits below an occupied one.
    pub fn respects_gravity(&self) -> bool {
        (0..self.columns).all(|column| {
            let mut seen_piece = false;
            (0..self.rows).all(|row| {
                let occupied = self.cells[row * self.columns + column] != State::Empty;
                if seen_piece && !occupied {
                    return false;
                }
                seen_piece |= occupied;
                true
            })
        })
    }
}
