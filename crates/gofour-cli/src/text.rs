//! Line-oriented runtime: print the grid, read a column, repeat.

use std::io::{self, BufRead, Write};

use gofour_engine::{Four, State};

use crate::render;

/// Plays a game over any reader/writer pair.
pub struct TextRuntime<R, W> {
    input: R,
    output: W,
    color: bool,
}

impl<R: BufRead, W: Write> TextRuntime<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            color: false,
        }
    }

    /// Draw pieces with ANSI colours instead of letters.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Runs until the game ends or input runs out, returning the outcome
    /// (`Empty` when input ended first).
    ///
    /// Unparsable input and invalid moves are reported and the same player
    /// is asked again.
    pub fn run(&mut self, four: &mut Four) -> io::Result<State> {
        let mut line = String::new();
        loop {
            self.dump(four)?;
            writeln!(
                self.output,
                "Player {} turn, select column:",
                four.current_player()
            )?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                tracing::debug!("input closed");
                return Ok(four.grid_state());
            }

            let column = match line.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n - 1,
                _ => {
                    writeln!(self.output, "invalid column number")?;
                    continue;
                }
            };

            let player = four.current_player();
            match four.player_move(player, column) {
                Ok(State::Empty) => {}
                Ok(outcome) => {
                    self.dump(four)?;
                    if outcome == State::Stale {
                        writeln!(self.output, "Stale, nobody wins!")?;
                    } else {
                        writeln!(self.output, "Player {outcome} won!")?;
                    }
                    self.output.flush()?;
                    return Ok(outcome);
                }
                Err(e) if e.is_invalid_move() => {
                    writeln!(self.output, "{e}")?;
                }
                Err(e) => return Err(io::Error::other(e)),
            }
        }
    }

    /// Writes the grid with 1-based column headers.
    fn dump(&mut self, four: &Four) -> io::Result<()> {
        writeln!(self.output)?;
        for column in 0..four.columns() {
            write!(self.output, "{:<4}", column + 1)?;
        }
        writeln!(self.output)?;
        for _ in 0..four.columns() {
            write!(self.output, "{:<4}", "---")?;
        }
        writeln!(self.output)?;

        for row in four.grid().rows_iter() {
            for &cell in row {
                if self.color {
                    write!(self.output, "{}   ", render::ansi(cell))?;
                } else {
                    write!(self.output, "{:<4}", render::letter(cell))?;
                }
            }
            writeln!(self.output)?;
        }
        writeln!(self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gofour_engine::GameConfig;

    fn play(config: GameConfig, input: &str) -> (State, String) {
        let mut four = Four::new(config).unwrap();
        let mut output = Vec::new();
        let outcome = TextRuntime::new(input.as_bytes(), &mut output)
            .run(&mut four)
            .unwrap();
        (outcome, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_vertical_win() {
        let (outcome, output) = play(GameConfig::default(), "1\n2\n1\n2\n1\n2\n1\n");
        assert_eq!(outcome, State::Red);
        assert!(output.contains("Player red won!"));
        assert!(output.contains("Player yellow turn, select column:"));
    }

    #[test]
    fn test_stale_game() {
        let (outcome, output) = play(GameConfig::new(3, 2, 2, 3), "1\n2\n3\n1\n2\n3\n");
        assert_eq!(outcome, State::Stale);
        assert!(output.trim_end().ends_with("Stale, nobody wins!"));
    }

    #[test]
    fn test_bad_input_reprompts_same_player() {
        let (outcome, output) = play(GameConfig::default(), "x\n0\n9\n");
        assert_eq!(outcome, State::Empty);
        assert_eq!(output.matches("invalid column number").count(), 2);
        assert!(output.contains("8 is an invalid move for player red"));
        assert_eq!(output.matches("Player red turn").count(), 4);
        assert!(!output.contains("Player yellow turn"));
    }

    #[test]
    fn test_full_column_is_rejected() {
        let (_, output) = play(GameConfig::new(2, 2, 2, 2), "1\n1\n1\n");
        assert!(output.contains("column 0 is full"));
    }

    #[test]
    fn test_grid_shows_pieces_bottom_up() {
        let (_, output) = play(GameConfig::new(3, 2, 2, 3), "2\n");
        let last_grid: Vec<&str> = output
            .lines()
            .filter(|line| line.contains('.') || line.contains('R'))
            .collect();
        assert_eq!(last_grid.last().map(|l| l.trim_end()), Some(".   R   ."));
        assert!(output.contains("1   2   3"));
    }
}
