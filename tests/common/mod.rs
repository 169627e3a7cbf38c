#![allow(dead_code)]

use tetris::board::{Board, CellState, GRID_HEIGHT, GRID_WIDTH};
use tetris::game::{test_helpers::*, Game, GameEvent};
use tetris::piece::{PieceProvider, SequencePieceProvider, Tetromino, TetrominoType};

pub fn seq(pieces: &[TetrominoType]) -> Box<dyn PieceProvider> {
    Box::new(SequencePieceProvider::new(pieces.to_vec()))
}

pub fn started(pieces: &[TetrominoType]) -> Game {
    let mut game = Game::with_provider(seq(pieces));
    game.start();
    game
}

pub fn vertical_i_at(x: i16, y: i16) -> Tetromino {
    let mut piece = Tetromino::new_at(TetrominoType::I, x, y);
    piece.shape = piece.shape.rotated_cw();
    piece
}

/// Ticks until the active piece locks and returns the events of that run.
pub fn tick_until_lock(game: &mut Game) -> Vec<GameEvent> {
    game.take_events();
    for _ in 0..(GRID_HEIGHT * 2) {
        game.apply_tick();
        let events = game.take_events();
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::PieceLocked | GameEvent::LinesCleared { .. }))
        {
            return events;
        }
    }
    panic!("piece never locked");
}

/// Board whose bottom `rows` rows are full except the rightmost column.
pub fn right_well(rows: usize) -> Board {
    let mut board = empty_board();
    for y in (GRID_HEIGHT - rows)..GRID_HEIGHT {
        fill_row_with_gap(&mut board, y, GRID_WIDTH - 1);
    }
    board
}

/// Turns a freshly spawned I upright and slides it into the rightmost column.
pub fn steer_i_into_right_well(game: &mut Game) {
    assert!(game.rotate_cw());
    while game.move_right() {}
    assert_eq!(
        game.active_piece().map(|p| p.position.x),
        Some(GRID_WIDTH as i16 - 1)
    );
}

/// Rows 0 and 1 are filled apart from column 0, so any centered spawn is
/// blocked. The current O sits three soft drops above the floor in the
/// right corner.
pub fn game_over_setup() -> Game {
    let mut board = empty_board();
    fill_row_with_gap(&mut board, 0, 0);
    fill_row_with_gap(&mut board, 1, 0);
    let piece = Tetromino::new_at(TetrominoType::O, 8, 15);
    Game::with_board(board, piece, seq(&[TetrominoType::T, TetrominoType::O]))
}

/// Drives `game_over_setup` into game over with a final score of 3.
pub fn play_into_game_over(game: &mut Game) {
    while game.soft_drop() {}
    game.apply_tick();
}

pub fn filled(t: TetrominoType) -> CellState {
    CellState::Filled(t)
}
