use crate::board::Board;
use crate::piece::Tetromino;

/// True if the piece, shifted by (dx, dy), would leave the board sideways,
/// sink below the floor, or overlap a filled cell. Cells above the top row
/// only collide with the side walls.
pub fn collides(piece: &Tetromino, board: &Board, dx: i16, dy: i16) -> bool {
    piece.shape.cells().any(|(cx, cy)| {
        let x = piece.position.x + cx + dx;
        let y = piece.position.y + cy + dy;
        if x < 0 || x as usize >= board.width() {
            return true;
        }
        board.is_filled(x, y)
    })
}

/// Whether the piece may sit exactly where it is.
pub fn fits(piece: &Tetromino, board: &Board) -> bool {
    !collides(piece, board, 0, 0)
}
