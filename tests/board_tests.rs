//! Board model, piece catalog and collision tests

mod common;

use common::*;
use tetris::board::{Board, CellState, GRID_HEIGHT, GRID_WIDTH};
use tetris::collision::{collides, fits};
use tetris::game::test_helpers::*;
use tetris::piece::{
    PieceProvider, Position, RandomPieceProvider, SequencePieceProvider, Shape, Tetromino,
    TetrominoType,
};

// ============================================================================
// Board Model Tests
// ============================================================================

mod board_model {
    use super::*;

    #[test]
    fn default_board_is_empty_ten_by_twenty() {
        let board = Board::default();

        assert_eq!(board.width(), GRID_WIDTH);
        assert_eq!(board.height(), GRID_HEIGHT);
        assert_eq!(board.total_filled_cells(), 0);
    }

    #[test]
    #[should_panic(expected = "board dimensions must be positive")]
    fn zero_sized_board_is_rejected() {
        Board::new(0, 20);
    }

    #[test]
    #[should_panic(expected = "same width")]
    fn ragged_rows_are_rejected() {
        Board::from_rows(vec![vec![CellState::Empty; 3], vec![CellState::Empty; 2]]);
    }

    #[test]
    fn is_filled_blocks_outside_sides_and_floor_only() {
        let mut board = empty_board();
        board.set(2, 7, filled(TetrominoType::L));

        assert!(board.is_filled(2, 7));
        assert!(!board.is_filled(3, 7));
        assert!(board.is_filled(-1, 5));
        assert!(board.is_filled(GRID_WIDTH as i16, 5));
        assert!(board.is_filled(4, GRID_HEIGHT as i16));
        assert!(!board.is_filled(4, -1));
        assert!(!board.is_filled(4, -3));
    }

    #[test]
    fn set_ignores_out_of_range_writes() {
        let mut board = empty_board();

        board.set(GRID_WIDTH, 0, filled(TetrominoType::O));
        board.set(0, GRID_HEIGHT, filled(TetrominoType::O));

        assert_eq!(board.total_filled_cells(), 0);
        assert_eq!(board.cell(GRID_WIDTH, 0), None);
    }

    #[test]
    fn row_queries_outside_the_board_are_empty() {
        let mut board = empty_board();
        fill_row(&mut board, GRID_HEIGHT - 1);

        assert!(board.is_row_full(GRID_HEIGHT - 1));
        assert!(!board.is_row_full(GRID_HEIGHT));
        assert_eq!(board.filled_count_in_row(GRID_HEIGHT), 0);
        assert_eq!(board.filled_count_in_row(usize::MAX), 0);
    }

    #[test]
    fn lock_piece_returns_new_board() {
        let board = empty_board();
        let piece = Tetromino::new_at(TetrominoType::O, 4, 10);

        let locked = board.lock_piece(&piece);

        assert_eq!(board.total_filled_cells(), 0);
        assert_eq!(locked.total_filled_cells(), 4);
        assert_eq!(locked.cell(5, 11), Some(filled(TetrominoType::O)));
        assert_eq!(locked.cell(5, 11).unwrap().color_index(), 2);
    }

    #[test]
    fn lock_piece_skips_cells_above_the_board() {
        let piece = Tetromino::new_at(TetrominoType::T, 3, -1);

        let locked = empty_board().lock_piece(&piece);

        assert_eq!(locked.total_filled_cells(), 3);
        assert_eq!(locked.filled_count_in_row(0), 3);
    }

    #[test]
    fn clear_without_full_rows_is_identity() {
        let mut board = empty_board();
        fill_row_with_gap(&mut board, GRID_HEIGHT - 1, 5);
        board.set(3, 10, filled(TetrominoType::S));

        let (cleared, rows) = board.clear_full_rows();

        assert!(rows.is_empty());
        assert_eq!(cleared, board);
    }

    #[test]
    fn full_rows_are_removed_and_rest_shift_down() {
        let mut board = empty_board();
        fill_row(&mut board, GRID_HEIGHT - 1);
        fill_row(&mut board, GRID_HEIGHT - 3);
        board.set(0, GRID_HEIGHT - 2, filled(TetrominoType::J));
        board.set(7, GRID_HEIGHT - 4, filled(TetrominoType::Z));

        let (cleared, rows) = board.clear_full_rows();

        assert_eq!(rows, vec![GRID_HEIGHT - 3, GRID_HEIGHT - 1]);
        assert_eq!(cleared.height(), GRID_HEIGHT);
        assert_eq!(cleared.cell(0, GRID_HEIGHT - 1), Some(filled(TetrominoType::J)));
        assert_eq!(cleared.cell(7, GRID_HEIGHT - 2), Some(filled(TetrominoType::Z)));
        assert_eq!(cleared.total_filled_cells(), 2);
        assert!(cleared.rows()[0].iter().all(|c| c.is_empty()));
        assert!(cleared.rows()[1].iter().all(|c| c.is_empty()));
    }

    #[test]
    fn clearing_every_row_leaves_empty_board() {
        let mut board = empty_board();
        for y in 0..GRID_HEIGHT {
            fill_row(&mut board, y);
        }

        let (cleared, rows) = board.clear_full_rows();

        assert_eq!(rows.len(), GRID_HEIGHT);
        assert_eq!(cleared, empty_board());
    }
}

// ============================================================================
// Piece Catalog Tests
// ============================================================================

mod catalog {
    use super::*;

    #[test]
    fn seven_pieces_with_distinct_colors() {
        let mut colors: Vec<u8> = TetrominoType::ALL.iter().map(|t| t.color_index()).collect();
        colors.sort_unstable();

        assert_eq!(colors, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn every_piece_has_four_cells() {
        for t in TetrominoType::ALL {
            assert_eq!(t.shape().cells().count(), 4, "{}", t.name());
        }
    }

    #[test]
    fn four_rotations_are_identity() {
        for t in TetrominoType::ALL {
            let shape = t.shape();
            let spun = shape.rotated_cw().rotated_cw().rotated_cw().rotated_cw();
            assert_eq!(spun, shape, "{}", t.name());
        }
    }

    #[test]
    fn rotation_is_clockwise() {
        let t = TetrominoType::T.shape();

        let rotated = t.rotated_cw();

        let expected = Shape::new(vec![
            vec![true, false],
            vec![true, true],
            vec![true, false],
        ]);
        assert_eq!(rotated, expected);
    }

    #[test]
    fn rotation_swaps_dimensions() {
        let i = TetrominoType::I.shape();
        let rotated = i.rotated_cw();

        assert_eq!((i.width(), i.height()), (4, 1));
        assert_eq!((rotated.width(), rotated.height()), (1, 4));
        assert!(rotated.is_occupied(0, 3));
    }

    #[test]
    #[should_panic(expected = "must not be empty")]
    fn empty_shape_is_rejected() {
        Shape::new(Vec::new());
    }

    #[test]
    #[should_panic(expected = "at least one cell")]
    fn blank_shape_is_rejected() {
        Shape::new(vec![vec![false, false]]);
    }

    #[test]
    fn spawn_is_centered_on_top_row() {
        let board_width = GRID_WIDTH;

        assert_eq!(
            Tetromino::spawn(TetrominoType::O, board_width).position,
            Position { x: 4, y: 0 }
        );
        assert_eq!(
            Tetromino::spawn(TetrominoType::I, board_width).position,
            Position { x: 3, y: 0 }
        );
        assert_eq!(
            Tetromino::spawn(TetrominoType::Z, board_width).position,
            Position { x: 3, y: 0 }
        );
    }

    #[test]
    fn sequence_provider_cycles() {
        let mut provider = SequencePieceProvider::new(vec![TetrominoType::I, TetrominoType::O]);

        assert_eq!(provider.next_piece(), TetrominoType::I);
        assert_eq!(provider.next_piece(), TetrominoType::O);
        assert_eq!(provider.next_piece(), TetrominoType::I);
    }

    #[test]
    fn seeded_provider_is_reproducible() {
        let mut a = RandomPieceProvider::seeded(42);
        let mut b = RandomPieceProvider::seeded(42);

        let first: Vec<_> = (0..50).map(|_| a.next_piece()).collect();
        let second: Vec<_> = (0..50).map(|_| b.next_piece()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn random_provider_draws_every_piece() {
        let mut provider = RandomPieceProvider::seeded(3);
        let drawn: Vec<_> = (0..700).map(|_| provider.next_piece()).collect();

        for t in TetrominoType::ALL {
            assert!(drawn.contains(&t), "{} never drawn", t.name());
        }
    }
}

// ============================================================================
// Collision Tests
// ============================================================================

mod collision {
    use super::*;

    #[test]
    fn walls_and_floor_collide() {
        let board = empty_board();
        let piece = Tetromino::new_at(TetrominoType::O, 0, GRID_HEIGHT as i16 - 2);

        assert!(!collides(&piece, &board, 0, 0));
        assert!(collides(&piece, &board, -1, 0));
        assert!(collides(&piece, &board, 0, 1));
        assert!(!collides(&piece, &board, 1, 0));
        assert!(collides(&piece, &board, GRID_WIDTH as i16 - 1, 0));
    }

    #[test]
    fn filled_cells_collide() {
        let mut board = empty_board();
        board.set(5, 12, filled(TetrominoType::I));
        let piece = Tetromino::new_at(TetrominoType::O, 4, 10);

        assert!(!collides(&piece, &board, 0, 0));
        assert!(collides(&piece, &board, 0, 1));
        assert!(!collides(&piece, &board, -1, 1));
    }

    #[test]
    fn cells_above_the_board_only_hit_walls() {
        let mut board = empty_board();
        fill_row(&mut board, 1);
        let piece = vertical_i_at(0, -4);

        assert!(fits(&piece, &board));
        assert!(!collides(&piece, &board, 0, 1));
        assert!(collides(&piece, &board, 0, 2));
        assert!(collides(&piece, &board, -1, 0));

        let flat = Tetromino::new_at(TetrominoType::I, 7, -1);
        assert!(collides(&flat, &board, 0, 0));
    }
}
