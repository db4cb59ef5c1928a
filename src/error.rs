use thiserror::Error;

use crate::tile::Coord;

/// Reasons a puzzle is rejected before the search starts.
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("board {0} has no cells")]
    EmptyBoard(Coord),
    #[error("tile {index} has degenerate size {size}")]
    DegenerateTile { index: usize, size: Coord },
    #[error("{count} tiles given, at most {max} are supported")]
    TooManyTiles { count: usize, max: usize },
    #[error("tiles cover {tile_area} cells but the board has {board_area}")]
    AreaMismatch { board_area: i64, tile_area: i64 },
    #[error("invalid checkpoint: {0}")]
    Checkpoint(#[from] serde_json::Error),
}
