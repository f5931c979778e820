//! How cells look on screen.

use gofour_engine::State;
use ratatui::style::Color;

/// Glyph used for every player's piece.
pub const PIECE: char = '●';

/// Plain single-letter form, for output that is not a terminal.
pub fn letter(state: State) -> char {
    match state {
        State::Red => 'R',
        State::Yellow => 'Y',
        State::Green => 'G',
        State::Magenta => 'M',
        State::Blue => 'B',
        State::Cyan => 'C',
        State::Black => 'K',
        State::Empty | State::Stale => '.',
    }
}

fn ansi_code(state: State) -> u8 {
    match state {
        State::Red => 31,
        State::Yellow => 33,
        State::Green => 32,
        State::Blue => 34,
        State::Magenta => 35,
        State::Cyan => 36,
        State::Black => 30,
        State::Empty | State::Stale => 37,
    }
}

/// Bold coloured piece for an ANSI terminal. Empty cells are a white dot.
pub fn ansi(state: State) -> String {
    let glyph = if state.is_player() { PIECE } else { '.' };
    format!("\x1b[1;{}m{glyph}\x1b[0m", ansi_code(state))
}

/// Foreground colour in the full-screen UI.
pub fn color(state: State) -> Color {
    match state {
        State::Red => Color::Red,
        State::Yellow => Color::Yellow,
        State::Green => Color::Green,
        State::Magenta => Color::Magenta,
        State::Blue => Color::Blue,
        State::Cyan => Color::Cyan,
        State::Black => Color::DarkGray,
        State::Empty | State::Stale => Color::Gray,
    }
}
