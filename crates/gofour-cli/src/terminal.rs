//! Full-screen runtime on `ratatui` + `crossterm`.
//!
//! The cursor sits above the grid; dropping a piece plays the move at once
//! and then animates the piece falling to the row it landed on.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use gofour_engine::{Four, State};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};

use crate::render;

/// Time a falling piece spends on each row.
const FALL_STEP: Duration = Duration::from_millis(50);

/// Input poll interval while nothing is moving.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// A piece on its way down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fall {
    column: usize,
    player: State,
    row: usize,
    target: usize,
    outcome: State,
}

pub struct App {
    four: Four,
    cursor: usize,
    fall: Option<Fall>,
    message: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(four: Four) -> Self {
        Self {
            four,
            cursor: 0,
            fall: None,
            message: None,
            should_quit: false,
        }
    }

    pub fn four(&self) -> &Four {
        &self.four
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_animating(&self) -> bool {
        self.fall.is_some()
    }

    /// Draw, read input, advance the animation, until the user quits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let mut last_step = Instant::now();
        loop {
            terminal.draw(|frame| self.render(frame))?;
            if self.should_quit {
                return Ok(());
            }

            let timeout = if self.is_animating() {
                FALL_STEP.saturating_sub(last_step.elapsed())
            } else {
                IDLE_POLL
            };
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            if last_step.elapsed() >= FALL_STEP {
                self.step();
                last_step = Instant::now();
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Char('b') if ctrl => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Char('f') if ctrl => self.move_cursor_right(),
            KeyCode::Char(' ') | KeyCode::Enter => self.drop_piece(),
            KeyCode::Char('r') => self.reset(),
            _ => {}
        }
    }

    fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_cursor_right(&mut self) {
        if self.cursor + 1 < self.four.columns() {
            self.cursor += 1;
        }
    }

    fn drop_piece(&mut self) {
        if self.is_animating() {
            return;
        }
        if self.four.is_finished() {
            self.message = Some("Game over! Press 'r' to restart.".to_string());
            return;
        }

        let column = self.cursor;
        let player = self.four.current_player();
        match self.four.player_move(player, column) {
            Ok(outcome) => {
                self.message = None;
                // The piece is already in the grid; it landed on the
                // topmost occupied row of its column.
                let target = self.four.rows() - self.four.column_count(column);
                self.fall = Some(Fall {
                    column,
                    player,
                    row: 0,
                    target,
                    outcome,
                });
            }
            Err(e) => {
                tracing::debug!(error = %e, "move rejected");
                self.message = Some(e.to_string());
            }
        }
    }

    fn reset(&mut self) {
        self.four = self.four.reset();
        self.fall = None;
        self.message = Some("New game started!".to_string());
    }

    /// Moves the falling piece down one row, or settles it.
    pub fn step(&mut self) {
        let Some(fall) = self.fall.as_mut() else {
            return;
        };
        if fall.row < fall.target {
            fall.row += 1;
            return;
        }

        let outcome = fall.outcome;
        self.fall = None;
        self.message = match outcome {
            State::Empty => None,
            State::Stale => Some("Stale, nobody wins! (q to exit)".to_string()),
            winner => Some(format!("Player {winner} won! (q to exit)")),
        };
    }

    /// What a cell shows right now, with the falling piece drawn in flight.
    pub fn visible_cell(&self, row: usize, column: usize) -> State {
        if let Some(fall) = self.fall.filter(|f| f.column == column) {
            if row == fall.row {
                return fall.player;
            }
            if row == fall.target {
                return State::Empty;
            }
        }
        self.four.cell(row, column).unwrap_or_default()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(self.four.rows() as u16 + 4),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);
        self.render_grid(frame, chunks[1]);
        self.render_message(frame, chunks[2]);
        render_controls(frame, chunks[3]);
    }

    /// Header line and the colour to draw it in.
    ///
    /// The engine rotates the turn even on the move that ends the game, so
    /// while that last piece is still falling the header names the player
    /// who dropped it instead of a next player who will never move.
    pub fn header(&self) -> (String, Color) {
        if let Some(fall) = self.fall.filter(|f| f.outcome.is_terminal()) {
            return (
                format!("Player {} played column {}", fall.player, fall.column + 1),
                render::color(fall.player),
            );
        }
        if self.four.is_finished() {
            return match self.four.grid_state() {
                State::Stale => ("Stale, nobody wins!".to_string(), Color::White),
                winner => (format!("Player {winner} won!"), render::color(winner)),
            };
        }
        let player = self.four.current_player();
        (
            format!("Player {player} turn, select column (Enter or Space)"),
            render::color(player),
        )
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let (text, color) = self.header();
        let header = Paragraph::new(text)
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("GoFour"));
        frame.render_widget(header, area);
    }

    fn render_grid(&self, frame: &mut Frame, area: Rect) {
        let columns = self.four.columns();
        let mut lines = Vec::with_capacity(self.four.rows() + 3);

        let mut cursor_line = vec![Span::raw(" ")];
        for column in 0..columns {
            if column == self.cursor {
                cursor_line.push(Span::styled(
                    " ▼ ",
                    Style::default().fg(render::color(self.four.current_player())),
                ));
            } else {
                cursor_line.push(Span::raw("   "));
            }
        }
        cursor_line.push(Span::raw(" "));
        lines.push(Line::from(cursor_line));

        let border = "═".repeat(columns * 3);
        lines.push(Line::from(format!("╔{border}╗")));
        for row in 0..self.four.rows() {
            let mut spans = vec![Span::raw("║")];
            for column in 0..columns {
                let cell = self.visible_cell(row, column);
                let symbol = if cell.is_player() {
                    format!(" {} ", render::PIECE)
                } else {
                    " . ".to_string()
                };
                spans.push(Span::styled(symbol, Style::default().fg(render::color(cell))));
            }
            spans.push(Span::raw("║"));
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(format!("╚{border}╝")));

        let mut numbers = vec![Span::raw(" ")];
        for column in 0..columns {
            numbers.push(Span::raw(format!("{:^3}", column + 1)));
        }
        numbers.push(Span::raw(" "));
        lines.push(Line::from(numbers));

        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
    }

    fn render_message(&self, frame: &mut Frame, area: Rect) {
        let widget = Paragraph::new(self.message().unwrap_or(""))
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(widget, area);
    }
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let controls = Paragraph::new("←/→: Move  |  Space/Enter: Drop  |  R: Restart  |  Q: Quit")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));
    frame.render_widget(controls, area);
}

/// Takes over the terminal, plays `four`, and restores the terminal even
/// when the game loop fails.
pub fn run(four: Four) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = App::new(four).run(&mut terminal);

    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use gofour_engine::GameConfig;
    use ratatui::backend::TestBackend;

    fn new_app(columns: usize, rows: usize, n_win: usize) -> App {
        App::new(Four::new(GameConfig::new(columns, rows, 2, n_win)).unwrap())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn settle(app: &mut App) {
        while app.is_animating() {
            app.step();
        }
    }

    fn aim(app: &mut App, column: usize) {
        while app.cursor() > column {
            press(app, KeyCode::Left);
        }
        while app.cursor() < column {
            press(app, KeyCode::Right);
        }
    }

    fn drop_at(app: &mut App, column: usize) {
        aim(app, column);
        press(app, KeyCode::Enter);
        settle(app);
    }

    #[test]
    fn test_cursor_stays_on_grid() {
        let mut app = new_app(3, 3, 3);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.cursor(), 0);
        for _ in 0..5 {
            press(&mut app, KeyCode::Right);
        }
        assert_eq!(app.cursor(), 2);
    }

    #[test]
    fn test_emacs_keys_move_cursor() {
        let mut app = new_app(7, 6, 4);
        app.handle_key(KeyEvent::new(KeyCode::Char('f'), KeyModifiers::CONTROL));
        app.handle_key(KeyEvent::new(KeyCode::Char('f'), KeyModifiers::CONTROL));
        assert_eq!(app.cursor(), 2);
        app.handle_key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::CONTROL));
        assert_eq!(app.cursor(), 1);
        // Without control they are ignored.
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.cursor(), 1);
    }

    #[test]
    fn test_piece_falls_to_landing_row() {
        let mut app = new_app(3, 4, 3);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.is_animating());
        assert_eq!(app.visible_cell(0, 0), State::Red);
        assert_eq!(app.visible_cell(3, 0), State::Empty);

        app.step();
        assert_eq!(app.visible_cell(0, 0), State::Empty);
        assert_eq!(app.visible_cell(1, 0), State::Red);

        settle(&mut app);
        assert_eq!(app.visible_cell(3, 0), State::Red);
        assert_eq!(app.four().current_player(), State::Yellow);
    }

    #[test]
    fn test_drop_ignored_while_falling() {
        let mut app = new_app(3, 4, 3);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        settle(&mut app);
        assert_eq!(app.four().column_count(0), 1);
    }

    #[test]
    fn test_win_message_after_animation() {
        let mut app = new_app(3, 3, 2);
        drop_at(&mut app, 0);
        drop_at(&mut app, 1);
        aim(&mut app, 0);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.four().grid_state(), State::Red);
        assert_eq!(app.message(), None);

        settle(&mut app);
        assert_eq!(app.message(), Some("Player red won! (q to exit)"));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.message(), Some("Game over! Press 'r' to restart."));
    }

    #[test]
    fn test_header_names_mover_while_winning_piece_falls() {
        let mut app = new_app(3, 3, 2);
        drop_at(&mut app, 0);
        drop_at(&mut app, 1);
        aim(&mut app, 0);
        press(&mut app, KeyCode::Enter);
        assert!(app.is_animating());

        let (text, _) = app.header();
        assert_eq!(text, "Player red played column 1");
        assert!(!text.contains("yellow"));

        settle(&mut app);
        assert_eq!(app.header().0, "Player red won!");
    }

    #[test]
    fn test_header_shows_next_player_during_ordinary_fall() {
        let mut app = new_app(7, 6, 4);
        press(&mut app, KeyCode::Enter);
        assert!(app.is_animating());
        assert!(app.header().0.starts_with("Player yellow turn"));
    }

    #[test]
    fn test_full_column_reports_error() {
        let mut app = new_app(2, 2, 2);
        drop_at(&mut app, 0);
        drop_at(&mut app, 0);
        press(&mut app, KeyCode::Enter);
        assert!(!app.is_animating());
        assert!(app.message().is_some_and(|m| m.contains("full")));
    }

    #[test]
    fn test_reset_starts_over_with_same_config() {
        let mut app = new_app(5, 4, 3);
        drop_at(&mut app, 2);
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.four().column_count(2), 0);
        assert_eq!(app.four().columns(), 5);
        assert_eq!(app.four().current_player(), State::Red);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = new_app(7, 6, 4);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());

        let mut app = new_app(7, 6, 4);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit());
    }

    #[test]
    fn test_render_shows_current_player() {
        let app = new_app(7, 6, 4);
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Player red turn"));
    }
}
