//! Falling-block puzzle engine: board, piece catalog, collision, a
//! tick-driven game state machine, and the gravity scheduler that drives it.

pub mod board;
pub mod collision;
pub mod game;
pub mod highscore;
pub mod piece;
pub mod scheduler;

pub use board::{Board, CellState, GRID_HEIGHT, GRID_WIDTH};
pub use game::{Command, Game, GameEvent, Phase, Snapshot};
pub use piece::{PieceProvider, RandomPieceProvider, Shape, Tetromino, TetrominoType};
pub use scheduler::Scheduler;
