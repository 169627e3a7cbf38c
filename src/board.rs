use crate::piece::{Tetromino, TetrominoType};

// ============================================================================
// Configuration
// ============================================================================

pub const GRID_WIDTH: usize = 10;
pub const GRID_HEIGHT: usize = 20;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellState {
    #[default]
    Empty,
    Filled(TetrominoType),
}

impl CellState {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellState::Empty)
    }

    /// Color index of the cell: 0 when empty, 1-7 otherwise.
    pub fn color_index(&self) -> u8 {
        match self {
            CellState::Empty => 0,
            CellState::Filled(t) => t.color_index(),
        }
    }
}

/// Fixed-size playfield. Row 0 is the top row.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    width: usize,
    height: usize,
    rows: Vec<Vec<CellState>>,
}

// ============================================================================
// Board Logic
// ============================================================================

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "board dimensions must be positive");
        Self {
            width,
            height,
            rows: vec![vec![CellState::Empty; width]; height],
        }
    }

    /// Builds a board from explicit rows. All rows must share one non-zero width.
    pub fn from_rows(rows: Vec<Vec<CellState>>) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        assert!(width > 0 && height > 0, "board dimensions must be positive");
        assert!(
            rows.iter().all(|row| row.len() == width),
            "board rows must all have the same width"
        );
        Self { width, height, rows }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<CellState>] {
        &self.rows
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<CellState> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Writes a single cell. Out-of-range coordinates are ignored.
    pub fn set(&mut self, col: usize, row: usize, cell: CellState) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = cell;
        }
    }

    /// Blocking query used for collision. Rows above the board never block;
    /// anything below it or beside it always does.
    pub fn is_filled(&self, col: i16, row: i16) -> bool {
        if row < 0 {
            return false;
        }
        if col < 0 || col as usize >= self.width || row as usize >= self.height {
            return true;
        }
        !self.rows[row as usize][col as usize].is_empty()
    }

    /// Returns a copy of the board with the piece merged in. Cells above
    /// the visible area are dropped.
    pub fn lock_piece(&self, piece: &Tetromino) -> Board {
        let mut locked = self.clone();
        let cell = CellState::Filled(piece.tetromino_type);
        for block in piece.blocks() {
            if block.y >= 0 && block.x >= 0 {
                locked.set(block.x as usize, block.y as usize, cell);
            }
        }
        locked
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(|cell| !cell.is_empty()))
    }

    /// Removes every full row at once. Surviving rows keep their order and
    /// the board is topped up with empty rows. Returns the new board and the
    /// indices (top to bottom) of the rows that were removed.
    pub fn clear_full_rows(&self) -> (Board, Vec<usize>) {
        let cleared: Vec<usize> = (0..self.height).filter(|&y| self.is_row_full(y)).collect();
        if cleared.is_empty() {
            return (self.clone(), cleared);
        }

        let mut rows: Vec<Vec<CellState>> = Vec::with_capacity(self.height);
        rows.resize(cleared.len(), vec![CellState::Empty; self.width]);
        rows.extend(
            self.rows
                .iter()
                .enumerate()
                .filter(|(y, _)| !cleared.contains(y))
                .map(|(_, row)| row.clone()),
        );

        let board = Board {
            width: self.width,
            height: self.height,
            rows,
        };
        (board, cleared)
    }

    /// Count filled cells in a row
    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.rows
            .get(y)
            .map_or(0, |row| row.iter().filter(|cell| !cell.is_empty()).count())
    }

    pub fn total_filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| !cell.is_empty()).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(GRID_WIDTH, GRID_HEIGHT)
    }
}
