use rand::{rngs::StdRng, Rng, SeedableRng};

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TetrominoType {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl TetrominoType {
    pub const ALL: [TetrominoType; 7] = [
        TetrominoType::I,
        TetrominoType::O,
        TetrominoType::T,
        TetrominoType::L,
        TetrominoType::J,
        TetrominoType::S,
        TetrominoType::Z,
    ];

    pub fn color_index(&self) -> u8 {
        match self {
            TetrominoType::I => 1,
            TetrominoType::O => 2,
            TetrominoType::T => 3,
            TetrominoType::L => 4,
            TetrominoType::J => 5,
            TetrominoType::S => 6,
            TetrominoType::Z => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TetrominoType::I => "I",
            TetrominoType::O => "O",
            TetrominoType::T => "T",
            TetrominoType::L => "L",
            TetrominoType::J => "J",
            TetrominoType::S => "S",
            TetrominoType::Z => "Z",
        }
    }

    /// Canonical orientation. Every call builds a fresh mask.
    pub fn shape(&self) -> Shape {
        let rows: &[&[u8]] = match self {
            TetrominoType::I => &[&[1, 1, 1, 1]],
            TetrominoType::O => &[&[1, 1], &[1, 1]],
            TetrominoType::T => &[&[0, 1, 0], &[1, 1, 1]],
            TetrominoType::L => &[&[0, 0, 1], &[1, 1, 1]],
            TetrominoType::J => &[&[1, 0, 0], &[1, 1, 1]],
            TetrominoType::S => &[&[0, 1, 1], &[1, 1, 0]],
            TetrominoType::Z => &[&[1, 1, 0], &[0, 1, 1]],
        };
        Shape::new(
            rows.iter()
                .map(|row| row.iter().map(|&c| c != 0).collect())
                .collect(),
        )
    }
}

/// Rectangular 0/1 occupancy mask of a piece.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    pub fn new(rows: Vec<Vec<bool>>) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        assert!(width > 0, "shape mask must not be empty");
        assert!(
            rows.iter().all(|row| row.len() == width),
            "shape mask rows must all have the same width"
        );
        assert!(
            rows.iter().flatten().any(|&c| c),
            "shape mask must occupy at least one cell"
        );
        Self { rows }
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.rows.get(y).and_then(|r| r.get(x)).copied().unwrap_or(false)
    }

    /// Occupied cells as (x, y) offsets from the top-left corner.
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(x, _)| (x as i16, y as i16))
        })
    }

    /// 90° clockwise: transpose, then reverse each row.
    pub fn rotated_cw(&self) -> Shape {
        let height = self.height();
        let rows = (0..self.width())
            .map(|x| (0..height).map(|y| self.rows[height - 1 - y][x]).collect())
            .collect();
        Shape { rows }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Tetromino {
    pub tetromino_type: TetrominoType,
    pub shape: Shape,
    pub position: Position,
}

impl Tetromino {
    /// Horizontally centered on a board of `board_width` columns, top row.
    pub fn spawn(tetromino_type: TetrominoType, board_width: usize) -> Self {
        let shape = tetromino_type.shape();
        let x = (board_width as i16 - shape.width() as i16) / 2;
        Self {
            tetromino_type,
            shape,
            position: Position { x, y: 0 },
        }
    }

    pub fn new_at(tetromino_type: TetrominoType, x: i16, y: i16) -> Self {
        Self {
            tetromino_type,
            shape: tetromino_type.shape(),
            position: Position { x, y },
        }
    }

    pub fn blocks(&self) -> Vec<Position> {
        self.shape
            .cells()
            .map(|(dx, dy)| Position {
                x: self.position.x + dx,
                y: self.position.y + dy,
            })
            .collect()
    }

    pub(crate) fn rotated(&self) -> Self {
        Self {
            tetromino_type: self.tetromino_type,
            shape: self.shape.rotated_cw(),
            position: self.position,
        }
    }

    pub(crate) fn moved(&self, dx: i16, dy: i16) -> Self {
        Self {
            tetromino_type: self.tetromino_type,
            shape: self.shape.clone(),
            position: Position {
                x: self.position.x + dx,
                y: self.position.y + dy,
            },
        }
    }
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> TetrominoType;
}

/// Uniform, independent draws. Repeats are allowed.
pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        TetrominoType::ALL[self.rng.gen_range(0..TetrominoType::ALL.len())]
    }
}

pub struct SequencePieceProvider {
    pieces: Vec<TetrominoType>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<TetrominoType>) -> Self {
        assert!(!pieces.is_empty(), "piece sequence must not be empty");
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> TetrominoType {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}
