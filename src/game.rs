use std::time::Duration;

use crate::board::{Board, CellState};
use crate::collision::{collides, fits};
use crate::piece::{PieceProvider, RandomPieceProvider, Shape, Tetromino, TetrominoType};

// ============================================================================
// Configuration
// ============================================================================

// Timing (in milliseconds)
const BASE_DROP_MS: u64 = 1000;
const MIN_DROP_MS: u64 = 100;
const SPEED_INCREASE_PER_LEVEL: u64 = 100;
pub const LINES_PER_LEVEL: u32 = 10;

// Scoring
pub const SCORE_SINGLE: u32 = 100;
pub const SCORE_DOUBLE: u32 = 300;
pub const SCORE_TRIPLE: u32 = 500;
pub const SCORE_TETRIS: u32 = 800;
pub const COMBO_BONUS: u32 = 50;
pub const SOFT_DROP_POINTS: u32 = 1;

const LINE_SCORES: [u32; 5] = [0, SCORE_SINGLE, SCORE_DOUBLE, SCORE_TRIPLE, SCORE_TETRIS];

/// Points for clearing `lines` rows in one lock. The combo bonus applies
/// from the second consecutive clearing lock on, and the sum scales with level.
pub fn line_clear_points(lines: usize, combo: u32, level: u32) -> u32 {
    let base = LINE_SCORES[lines.min(LINE_SCORES.len() - 1)];
    let combo_bonus = if combo > 0 { combo * COMBO_BONUS } else { 0 };
    (base + combo_bonus) * level
}

/// Gravity interval for a level, floored at 100ms.
pub fn drop_interval_ms(level: u32) -> u64 {
    let speed_reduction = level.saturating_sub(1) as u64 * SPEED_INCREASE_PER_LEVEL;
    BASE_DROP_MS.saturating_sub(speed_reduction).max(MIN_DROP_MS)
}

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    GameOver,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Start,
    MoveLeft,
    MoveRight,
    SoftDrop,
    RotateCw,
    TogglePause,
    Restart,
}

/// Advisory notifications for the host. Dropping them has no effect on play.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Started,
    Restarted,
    PieceMoved,
    PieceRotated,
    SoftDropped,
    /// A piece locked without completing any row.
    PieceLocked,
    /// Rows removed by the last lock, indexed as they were before removal.
    LinesCleared { rows: Vec<usize> },
    LevelUp(u32),
    Paused,
    Resumed,
    GameOver { score: u32, new_high_score: bool },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NextPiece {
    pub tetromino_type: TetrominoType,
    pub shape: Shape,
}

/// Owned copy of everything a renderer needs for one frame.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Snapshot {
    pub grid: Vec<Vec<CellState>>,
    pub next: Option<NextPiece>,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub combo: u32,
    pub high_score: u32,
    pub phase: Phase,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    board: Board,
    active: Option<Tetromino>,
    next: Option<TetrominoType>,
    score: u32,
    lines_cleared: u32,
    level: u32,
    combo: u32,
    high_score: u32,
    phase: Phase,
    epoch: u64,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new() -> Self {
        Self::with_provider(Box::new(RandomPieceProvider::from_entropy()))
    }

    /// An idle engine. Nothing happens until `start`.
    pub fn with_provider(provider: Box<dyn PieceProvider>) -> Self {
        Self {
            board: Board::default(),
            active: None,
            next: None,
            score: 0,
            lines_cleared: 0,
            level: 1,
            combo: 0,
            high_score: 0,
            phase: Phase::Idle,
            epoch: 0,
            piece_provider: provider,
            events: Vec::new(),
        }
    }

    /// A running engine with a prepared board and falling piece.
    pub fn with_board(
        board: Board,
        current_piece: Tetromino,
        mut provider: Box<dyn PieceProvider>,
    ) -> Self {
        let next = provider.next_piece();
        Self {
            board,
            active: Some(current_piece),
            next: Some(next),
            phase: Phase::Running,
            ..Self::with_provider(provider)
        }
    }

    /// Seeds the session high score, e.g. from a file the host loaded.
    pub fn with_high_score(mut self, high_score: u32) -> Self {
        self.high_score = high_score;
        self
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_piece(&self) -> Option<&Tetromino> {
        self.active.as_ref()
    }

    pub fn next_piece(&self) -> Option<TetrominoType> {
        self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Bumped whenever gravity must restart from a full interval: a new
    /// session or a resume from pause.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn drop_interval(&self) -> Duration {
        Duration::from_millis(drop_interval_ms(self.level))
    }

    /// Returns the visual grid state with the current piece overlaid
    pub fn render_grid(&self) -> Vec<Vec<CellState>> {
        let mut visual_grid = self.board.rows().to_vec();

        if let Some(piece) = &self.active {
            for block in piece.blocks() {
                if block.y >= 0
                    && (block.y as usize) < self.board.height()
                    && block.x >= 0
                    && (block.x as usize) < self.board.width()
                {
                    visual_grid[block.y as usize][block.x as usize] =
                        CellState::Filled(piece.tetromino_type);
                }
            }
        }

        visual_grid
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.render_grid(),
            next: self.next.map(|tetromino_type| NextPiece {
                tetromino_type,
                shape: tetromino_type.shape(),
            }),
            score: self.score,
            level: self.level,
            lines_cleared: self.lines_cleared,
            combo: self.combo,
            high_score: self.high_score,
            phase: self.phase,
        }
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Dispatches a command. Returns whether anything changed.
    pub fn apply_command(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start(),
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::SoftDrop => self.soft_drop(),
            Command::RotateCw => self.rotate_cw(),
            Command::TogglePause => self.toggle_pause(),
            Command::Restart => self.restart(),
        }
    }

    pub fn start(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.begin_session();
        self.events.push(GameEvent::Started);
        true
    }

    /// Fresh board and counters. The high score survives.
    pub fn restart(&mut self) -> bool {
        if self.phase == Phase::Idle {
            return self.start();
        }
        self.begin_session();
        self.events.push(GameEvent::Restarted);
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(1)
    }

    pub fn soft_drop(&mut self) -> bool {
        if !self.try_move(0, 1) {
            return false;
        }
        self.score += SOFT_DROP_POINTS;
        self.events.push(GameEvent::SoftDropped);
        true
    }

    /// Rotation without wall kicks: a blocked rotation keeps the old shape.
    pub fn rotate_cw(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let Some(piece) = &self.active else {
            return false;
        };
        let rotated = piece.rotated();
        if !fits(&rotated, &self.board) {
            return false;
        }
        self.active = Some(rotated);
        self.events.push(GameEvent::PieceRotated);
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            Phase::Running => {
                self.phase = Phase::Paused;
                self.events.push(GameEvent::Paused);
                true
            }
            Phase::Paused => {
                self.phase = Phase::Running;
                self.epoch += 1;
                self.events.push(GameEvent::Resumed);
                true
            }
            Phase::Idle | Phase::GameOver => false,
        }
    }

    /// One gravity step: fall a row, or lock, clear, score and spawn.
    pub fn apply_tick(&mut self) -> bool {
        if self.phase != Phase::Running || self.active.is_none() {
            return false;
        }
        if !self.try_move(0, 1) {
            self.lock_and_spawn();
        }
        true
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn begin_session(&mut self) {
        self.epoch += 1;
        self.board = Board::default();
        self.score = 0;
        self.lines_cleared = 0;
        self.level = 1;
        self.combo = 0;

        let first = self.piece_provider.next_piece();
        self.next = Some(self.piece_provider.next_piece());
        self.active = Some(Tetromino::spawn(first, self.board.width()));
        self.phase = Phase::Running;
    }

    fn shift(&mut self, dx: i16) -> bool {
        if !self.try_move(dx, 0) {
            return false;
        }
        self.events.push(GameEvent::PieceMoved);
        true
    }

    fn try_move(&mut self, dx: i16, dy: i16) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let Some(piece) = &self.active else {
            return false;
        };
        if collides(piece, &self.board, dx, dy) {
            return false;
        }
        self.active = Some(piece.moved(dx, dy));
        true
    }

    fn lock_and_spawn(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };
        let (board, rows) = self.board.lock_piece(&piece).clear_full_rows();
        self.board = board;

        if rows.is_empty() {
            self.combo = 0;
            self.events.push(GameEvent::PieceLocked);
        } else {
            let count = rows.len();
            self.events.push(GameEvent::LinesCleared { rows });
            self.add_score(count);
        }

        self.spawn_next_piece();
    }

    fn add_score(&mut self, lines: usize) {
        self.score += line_clear_points(lines, self.combo, self.level);
        self.lines_cleared += lines as u32;
        self.combo += 1;

        let new_level = (self.lines_cleared / LINES_PER_LEVEL) + 1;
        if new_level > self.level {
            self.level = new_level;
            self.events.push(GameEvent::LevelUp(self.level));
        }
    }

    fn spawn_next_piece(&mut self) {
        let next_type = self
            .next
            .take()
            .unwrap_or_else(|| self.piece_provider.next_piece());
        self.next = Some(self.piece_provider.next_piece());

        let piece = Tetromino::spawn(next_type, self.board.width());
        let blocked = !fits(&piece, &self.board);
        self.active = Some(piece);

        if blocked {
            self.phase = Phase::GameOver;
            let new_high_score = self.score > self.high_score;
            if new_high_score {
                self.high_score = self.score;
            }
            self.events.push(GameEvent::GameOver {
                score: self.score,
                new_high_score,
            });
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::board::{GRID_HEIGHT, GRID_WIDTH};

    pub fn empty_board() -> Board {
        Board::new(GRID_WIDTH, GRID_HEIGHT)
    }

    pub fn fill_row(board: &mut Board, y: usize) {
        for x in 0..board.width() {
            board.set(x, y, CellState::Filled(TetrominoType::T));
        }
    }

    pub fn fill_row_with_gap(board: &mut Board, y: usize, gap_x: usize) {
        fill_row_except(board, y, &[gap_x]);
    }

    pub fn fill_row_except(board: &mut Board, y: usize, gaps: &[usize]) {
        for x in 0..board.width() {
            if !gaps.contains(&x) {
                board.set(x, y, CellState::Filled(TetrominoType::T));
            }
        }
    }
}
