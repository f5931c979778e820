//! Win and stale detection.
//!
//! After each move the whole grid is rescanned. Boards are small, so a full
//! scan costs nothing noticeable and needs no incremental bookkeeping.
//!
//! For every start cell (row-major) and every axis, the walker inspects
//! `n_win` consecutive cells. Leaving the grid aborts the walk. The first
//! walk whose cells all hold the same player colour decides the winner.

use crate::{Grid, State};

/// Axis steps as `(d_row, d_column)`: along a column, along a row, the `↘`
/// diagonal and the `↗`/`↙` diagonal.
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (-1, 1)];

/// Computes the outcome of `grid`.
///
/// Returns the winning colour, [`State::Stale`] when the grid is full with
/// no winner, or [`State::Empty`] when play continues.
pub fn compute(grid: &Grid, n_win: usize) -> State {
    for row in 0..grid.rows() {
        for column in 0..grid.columns() {
            for direction in DIRECTIONS {
                let winner = check_direction(grid, n_win, row, column, direction);
                if winner != State::Empty {
                    return winner;
                }
            }
        }
    }

    if grid.is_top_row_full() {
        return State::Stale;
    }
    State::Empty
}

/// Walks `n_win` cells from `(row, column)` along `(d_row, d_column)`,
/// tracking the streak of identical cells.
///
/// Returns the colour whose streak reaches `n_win`, or `Empty`.
fn check_direction(
    grid: &Grid,
    n_win: usize,
    row: usize,
    column: usize,
    (d_row, d_column): (isize, isize),
) -> State {
    let mut previous = State::Empty;
    let mut streak = 0;

    for i in 0..n_win as isize {
        let Some(current) =
            grid.get_signed(row as isize + i * d_row, column as isize + i * d_column)
        else {
            return State::Empty;
        };

        if current == previous {
            streak += 1;
        } else {
            previous = current;
            streak = 1;
        }

        if current != State::Empty && streak >= n_win {
            return current;
        }
    }
    State::Empty
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a grid from rows of characters: `.` empty, `R` red,
    /// `Y` yellow, `G` green.
    fn grid_from(rows: &[&str]) -> Grid {
        let columns = rows[0].len();
        let mut grid = Grid::new(columns, rows.len());
        for (row, line) in rows.iter().enumerate() {
            for (column, ch) in line.chars().enumerate() {
                let state = match ch {
                    'R' => State::Red,
                    'Y' => State::Yellow,
                    'G' => State::Green,
                    _ => State::Empty,
                };
                grid.set(row, column, state);
            }
        }
        grid
    }

    #[test]
    fn test_empty_grid_continues() {
        assert_eq!(compute(&Grid::new(7, 6), 4), State::Empty);
    }

    #[test]
    fn test_horizontal_win() {
        let grid = grid_from(&[
            ".......",
            ".......",
            "YYY....",
            ".RRRR..",
        ]);
        assert_eq!(compute(&grid, 4), State::Red);
    }

    #[test]
    fn test_vertical_win() {
        let grid = grid_from(&[
            "....",
            "Y...",
            "Y.R.",
            "Y.R.",
            "Y.R.",
        ]);
        assert_eq!(compute(&grid, 4), State::Yellow);
    }

    #[test]
    fn test_down_right_diagonal_win() {
        let grid = grid_from(&[
            "G...",
            "YG..",
            "YRG.",
            "RYRG",
        ]);
        assert_eq!(compute(&grid, 4), State::Green);
    }

    #[test]
    fn test_up_right_diagonal_win() {
        let grid = grid_from(&[
            "...R",
            "..RY",
            ".RYY",
            "RYYR",
        ]);
        assert_eq!(compute(&grid, 4), State::Red);
    }

    #[test]
    fn test_one_short_is_not_a_win() {
        let grid = grid_from(&[
            ".......",
            ".......",
            "R......",
            "R.YYY..",
            "R.RYRR.",
        ]);
        assert_eq!(compute(&grid, 4), State::Empty);
    }

    #[test]
    fn test_interrupted_run_is_not_a_win() {
        let grid = grid_from(&[
            ".......",
            "RRYRR..",
        ]);
        assert_eq!(compute(&grid, 4), State::Empty);
    }

    #[test]
    fn test_run_longer_than_needed_still_wins() {
        let grid = grid_from(&[
            "......",
            "YYYYY.",
        ]);
        assert_eq!(compute(&grid, 3), State::Yellow);
    }

    #[test]
    fn test_run_touching_the_edge_wins() {
        let grid = grid_from(&[
            "....",
            "...R",
            "...R",
        ]);
        assert_eq!(compute(&grid, 2), State::Red);
    }

    #[test]
    fn test_full_grid_without_run_is_stale() {
        let grid = grid_from(&[
            "RYR",
            "YRY",
            "YRY",
        ]);
        assert_eq!(compute(&grid, 3), State::Stale);
    }

    #[test]
    fn test_full_grid_with_run_is_a_win_not_stale() {
        let grid = grid_from(&[
            "RYR",
            "YRY",
            "RRR",
        ]);
        assert_eq!(compute(&grid, 3), State::Red);
    }
}
