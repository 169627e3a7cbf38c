use std::{
    io::{self, stdout, Stdout},
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use tetris::board::{CellState, GRID_HEIGHT, GRID_WIDTH};
use tetris::game::{Command, Game, GameEvent, Phase, Snapshot};
use tetris::highscore::{HighScoreStore, DEFAULT_HIGH_SCORE_FILE};
use tetris::piece::{PieceProvider, RandomPieceProvider, TetrominoType};
use tetris::scheduler::Scheduler;

// ============================================================================
// Configuration
// ============================================================================

/// Falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Seed for the piece sequence. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// File the high score is read from and written to.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_HIGH_SCORE_FILE)]
    high_score_file: PathBuf,

    /// Keep the high score in memory only.
    #[arg(long)]
    no_save: bool,
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const FLASH_CHAR: &str = "░░";
const FLASH_DURATION: Duration = Duration::from_millis(250);
const IDLE_POLL: Duration = Duration::from_millis(100);

// ============================================================================
// Color Mapping
// ============================================================================

fn tetromino_color(t: TetrominoType) -> Color {
    match t {
        TetrominoType::I => Color::Cyan,
        TetrominoType::O => Color::Yellow,
        TetrominoType::T => Color::Magenta,
        TetrominoType::S => Color::Green,
        TetrominoType::Z => Color::Red,
        TetrominoType::J => Color::Blue,
        TetrominoType::L => Color::Rgb(255, 165, 0),
    }
}

// ============================================================================
// Host-side presentation state
// ============================================================================

#[derive(Default)]
struct Hud {
    flash_rows: Vec<usize>,
    flash_until: Option<Instant>,
    status: Option<String>,
}

impl Hud {
    fn observe(&mut self, event: &GameEvent, store: Option<&HighScoreStore>) {
        match event {
            GameEvent::LinesCleared { rows } => {
                self.flash_rows = rows.clone();
                self.flash_until = Some(Instant::now() + FLASH_DURATION);
                if rows.len() == 4 {
                    self.status = Some("TETRIS!".to_string());
                }
            }
            GameEvent::LevelUp(level) => self.status = Some(format!("Level {level}")),
            GameEvent::Started | GameEvent::Restarted => self.status = None,
            GameEvent::GameOver {
                score,
                new_high_score: true,
            } => {
                self.status = Some("New high score!".to_string());
                if let Some(store) = store {
                    if let Err(err) = store.save(*score) {
                        self.status = Some(format!("{err}"));
                    }
                }
            }
            _ => {}
        }
    }

    fn is_flashing(&self, y: usize) -> bool {
        self.flash_until.is_some_and(|until| Instant::now() < until) && self.flash_rows.contains(&y)
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, view: &Snapshot, hud: &Hud) {
    let area = frame.size();

    render_game(frame, view, hud, area);
    match view.phase {
        Phase::Idle => render_popup(
            frame,
            area,
            " Tetris ",
            vec![
                Line::from(""),
                Line::from(Span::styled("READY", Style::default().fg(Color::Green))),
                Line::from(""),
                Line::from(format!("High score: {}", view.high_score)),
                Line::from(""),
                hint("Press Enter to start"),
                hint("Press ESC to quit"),
            ],
        ),
        Phase::Running => {}
        Phase::Paused => render_popup(
            frame,
            area,
            " Paused ",
            vec![
                Line::from(""),
                Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
                Line::from(""),
                hint("Press P to continue"),
                hint("Press ESC to quit"),
            ],
        ),
        Phase::GameOver => render_popup(
            frame,
            area,
            " Game Over ",
            vec![
                Line::from(""),
                Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
                Line::from(""),
                Line::from(format!("Score: {}", view.score)),
                Line::from(format!("Best: {}", view.high_score)),
                Line::from(format!("Lines: {}", view.lines_cleared)),
                Line::from(format!("Level: {}", view.level)),
                Line::from(""),
                hint("Press R to restart"),
                hint("Press ESC to quit"),
            ],
        ),
    }
}

fn hint(text: &str) -> Line<'_> {
    Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}

fn render_game(frame: &mut Frame, view: &Snapshot, hud: &Hud, area: Rect) {
    let grid_display_width = (GRID_WIDTH as u16 * CELL_WIDTH) + 2;
    let grid_display_height = GRID_HEIGHT as u16 + 2;
    let side_width = 14;
    let total_width = grid_display_width + side_width + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Side panel]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(side_width),
    ])
    .split(game_row);

    let side = Layout::vertical([Constraint::Length(6), Constraint::Fill(1)]).split(horizontal[1]);

    render_grid(frame, view, hud, horizontal[0]);
    render_preview(frame, view, side[0]);
    render_info(frame, view, hud, side[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "A/D ←→: Move | S ↓: Drop | W ↑: Rotate | P: Pause | R: Restart | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, view: &Snapshot, hud: &Hud, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tetris ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = view
        .grid
        .iter()
        .enumerate()
        .map(|(y, row)| {
            let flashing = hud.is_flashing(y);
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match cell {
                    CellState::Filled(piece_type) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(tetromino_color(*piece_type)))
                    }
                    CellState::Empty if flashing => {
                        Span::styled(FLASH_CHAR, Style::default().fg(Color::White))
                    }
                    CellState::Empty => Span::raw(EMPTY_CHAR),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_preview(frame: &mut Frame, view: &Snapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();

    if let Some(next) = &view.next {
        let color = tetromino_color(next.tetromino_type);
        for row in next.shape.rows() {
            let mut spans: Vec<Span> = vec![Span::raw(" ")];
            for &filled in row {
                if filled {
                    spans.push(Span::styled(BLOCK_CHAR, Style::default().fg(color)));
                } else {
                    spans.push(Span::raw(EMPTY_CHAR));
                }
            }
            lines.push(Line::from(spans));
        }
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, view: &Snapshot, hud: &Hud, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", view.score)),
        Line::from(Span::styled("Best", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", view.high_score)),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", view.lines_cleared)),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", view.level)),
        Line::from(Span::styled("Combo", Style::default().fg(Color::Magenta))),
        Line::from(format!("{}", view.combo)),
    ];
    if let Some(status) = &hud.status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            status.as_str(),
            Style::default().fg(Color::White),
        )));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_popup(frame: &mut Frame, area: Rect, title: &str, text: Vec<Line>) {
    let height = text.len() as u16 + 2;
    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(24, height, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Input
// ============================================================================

enum Input {
    Quit,
    Command(Command),
}

fn map_key(key: KeyEvent) -> Option<Input> {
    let command = match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return Some(Input::Quit),
        KeyCode::Enter => Command::Start,
        KeyCode::Char('r') | KeyCode::Char('R') => Command::Restart,
        KeyCode::Char('p') | KeyCode::Char('P') => Command::TogglePause,
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Command::MoveLeft,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Command::MoveRight,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Command::SoftDrop,
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Command::RotateCw,
        _ => return None,
    };
    Some(Input::Command(command))
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    game: &mut Game,
    store: Option<&HighScoreStore>,
) -> Result<()> {
    let mut scheduler = Scheduler::new();
    let mut hud = Hud::default();

    loop {
        let view = game.snapshot();
        terminal.draw(|frame| render(frame, &view, &hud))?;

        // Wait for input until the next gravity tick is due
        let timeout = scheduler
            .time_until_tick()
            .unwrap_or(IDLE_POLL)
            .min(IDLE_POLL);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match map_key(key) {
                        Some(Input::Quit) => break,
                        Some(Input::Command(command)) => {
                            game.apply_command(command);
                            scheduler.sync(game);
                        }
                        None => {}
                    }
                }
            }
        }

        scheduler.poll(game);

        for event in game.take_events() {
            hud.observe(&event, store);
        }
    }

    scheduler.cancel();
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let store = (!args.no_save).then(|| HighScoreStore::new(args.high_score_file.clone()));
    let high_score = match &store {
        Some(store) => store
            .load_or_default()
            .with_context(|| format!("loading high score from {}", store.path().display()))?,
        None => 0,
    };

    let provider: Box<dyn PieceProvider> = match args.seed {
        Some(seed) => Box::new(RandomPieceProvider::seeded(seed)),
        None => Box::new(RandomPieceProvider::from_entropy()),
    };
    let mut game = Game::with_provider(provider).with_high_score(high_score);

    // Setup terminal
    enable_raw_mode().context("enabling raw mode")?;
    stdout()
        .execute(EnterAlternateScreen)
        .context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend).context("creating terminal")?;

    let result = run(&mut terminal, &mut game, store.as_ref());

    // Always restore the terminal, even if the loop failed
    let restored = restore_terminal().context("restoring terminal");
    result.and(restored)
}
