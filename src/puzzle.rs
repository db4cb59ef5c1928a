//! Puzzle input and search outcome types.

use std::fmt;
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::canonical::{Canonicalizer, Solution};
use crate::error::PuzzleError;
use crate::tile::{almost_square_tiles, Coord, TilePlacement};

/// Occupancy cells store `index + 1` in a `u16`.
pub const MAX_TILES: usize = u16::MAX as usize;

/// One tiling job: the board, the tiles and the search window.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub board: Coord,
    pub tiles: Vec<Coord>,
    /// Placements replayed before searching.
    #[serde(default)]
    pub start: Vec<TilePlacement>,
    /// The search halts as solved once it reaches or passes this sequence.
    #[serde(default)]
    pub stop: Option<Vec<TilePlacement>>,
    #[serde(skip)]
    pub deadline: Option<Instant>,
}

impl Puzzle {
    pub fn new(board: Coord, tiles: Vec<Coord>) -> Self {
        Self {
            board,
            tiles,
            ..Self::default()
        }
    }

    /// The `(k + 1) x k` family for `k = n..=1` on the given board.
    pub fn almost_square(n: i32, board: Coord) -> Self {
        Self::new(board, almost_square_tiles(n))
    }

    pub fn with_start(mut self, start: Vec<TilePlacement>) -> Self {
        self.start = start;
        self
    }

    pub fn with_stop(mut self, stop: Vec<TilePlacement>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn tile_area(&self) -> i64 {
        self.tiles.iter().map(|tile| tile.area()).sum()
    }

    pub fn validate(&self) -> Result<(), PuzzleError> {
        if self.board.x <= 0 || self.board.y <= 0 {
            return Err(PuzzleError::EmptyBoard(self.board));
        }
        if let Some((index, &size)) = self
            .tiles
            .iter()
            .enumerate()
            .find(|(_, size)| size.x <= 0 || size.y <= 0)
        {
            return Err(PuzzleError::DegenerateTile { index, size });
        }
        if self.tiles.len() > MAX_TILES {
            return Err(PuzzleError::TooManyTiles {
                count: self.tiles.len(),
                max: MAX_TILES,
            });
        }
        let board_area = self.board.area();
        let tile_area = self.tile_area();
        if board_area != tile_area {
            return Err(PuzzleError::AreaMismatch {
                board_area,
                tile_area,
            });
        }
        Ok(())
    }

    /// Parses a checkpoint in its wire form, `[{"Idx":0,"Rot":false},..]`.
    pub fn parse_checkpoint(json: &str) -> Result<Vec<TilePlacement>, PuzzleError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The same job on the board mirrored through its diagonal.
    ///
    /// Tiles keep their sizes, so every checkpoint entry of a non-square tile
    /// switches orientation.
    pub fn transposed(&self) -> Self {
        let flip = |placements: &[TilePlacement]| -> Vec<TilePlacement> {
            placements
                .iter()
                .map(|entry| toggle_if_oblong(entry, &self.tiles))
                .collect()
        };
        Self {
            board: self.board.transposed(),
            tiles: self.tiles.clone(),
            start: flip(&self.start),
            stop: self.stop.as_deref().map(flip),
            deadline: self.deadline,
        }
    }
}

fn toggle_if_oblong(entry: &TilePlacement, tiles: &[Coord]) -> TilePlacement {
    match tiles.get(entry.tile_index) {
        Some(size) if size.x != size.y => {
            TilePlacement::new(entry.tile_index, entry.orientation.toggled())
        }
        _ => *entry,
    }
}

/// Pipeline status of a finished search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Every solution in the window was found.
    #[serde(rename = "solved")]
    Solved,
    /// Stopped at the first solution.
    #[serde(rename = "solved1")]
    SolvedFirst,
    /// Cut short; `current_placement` is where to resume.
    #[serde(rename = "interrupted")]
    Interrupted,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Solved => "solved",
            Self::SolvedFirst => "solved1",
            Self::Interrupted => "interrupted",
        })
    }
}

/// Why the search loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Termination {
    Exhausted,
    StopCheckpoint,
    FirstSolution,
    Deadline,
    StepLimit,
}

impl Termination {
    pub const fn status(self) -> Status {
        match self {
            Self::Exhausted | Self::StopCheckpoint => Status::Solved,
            Self::FirstSolution => Status::SolvedFirst,
            Self::Deadline | Self::StepLimit => Status::Interrupted,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exhausted => "search space exhausted",
            Self::StopCheckpoint => "stop checkpoint reached",
            Self::FirstSolution => "first solution found",
            Self::Deadline => "deadline passed",
            Self::StepLimit => "step limit reached",
        })
    }
}

/// Everything a search reports back to the pipeline.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub solutions: FxHashSet<Solution>,
    pub status: Status,
    pub termination: Termination,
    /// Successful search placements, including ones undone by pruning.
    pub tiles_placed: u64,
    pub steps: u64,
    /// Placement sequence to resume from; empty after exhausting the search.
    pub current_placement: Vec<TilePlacement>,
}

impl Outcome {
    /// Solution keys in sorted order.
    pub fn solution_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.solutions.iter().map(Solution::key).collect();
        keys.sort_unstable();
        keys
    }

    /// Maps an outcome of the transposed job back onto the original board.
    pub(crate) fn transposed_back(self, canon: &Canonicalizer) -> Self {
        Self {
            solutions: self
                .solutions
                .iter()
                .map(|solution| canon.canonicalize_transposed(solution))
                .collect(),
            current_placement: self
                .current_placement
                .iter()
                .map(|entry| toggle_if_oblong(entry, canon.tile_sizes()))
                .collect(),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Orientation;

    fn puzzle() -> Puzzle {
        Puzzle::new(
            Coord::new(5, 4),
            vec![Coord::new(2, 1), Coord::new(3, 2), Coord::new(4, 3)],
        )
    }

    #[test]
    fn test_validate_accepts_exact_area() {
        assert!(puzzle().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let mut bad = puzzle();
        bad.board = Coord::new(0, 4);
        assert!(matches!(bad.validate(), Err(PuzzleError::EmptyBoard(_))));

        let mut bad = puzzle();
        bad.tiles[1] = Coord::new(3, 0);
        assert!(matches!(
            bad.validate(),
            Err(PuzzleError::DegenerateTile { index: 1, .. })
        ));

        let mut bad = puzzle();
        bad.tiles.push(Coord::new(1, 1));
        let err = bad.validate().unwrap_err();
        assert_eq!(err.to_string(), "tiles cover 21 cells but the board has 20");
    }

    #[test]
    fn test_transpose_toggles_oblong_checkpoint_entries() {
        let mut puzzle = Puzzle::new(
            Coord::new(3, 2),
            vec![Coord::new(2, 2), Coord::new(1, 2)],
        )
        .with_start(vec![
            TilePlacement::new(0, Orientation::Normal),
            TilePlacement::new(1, Orientation::Normal),
        ]);
        puzzle.stop = Some(vec![TilePlacement::new(1, Orientation::Turned)]);

        let upright = puzzle.transposed();
        assert_eq!(upright.board, Coord::new(2, 3));
        assert_eq!(upright.start[0].orientation, Orientation::Normal);
        assert_eq!(upright.start[1].orientation, Orientation::Turned);
        assert_eq!(
            upright.stop,
            Some(vec![TilePlacement::new(1, Orientation::Normal)])
        );
    }

    #[test]
    fn test_checkpoint_parsing() {
        let parsed = Puzzle::parse_checkpoint(r#"[{"Idx":2,"Rot":true},{"Idx":0,"Rot":false}]"#)
            .unwrap();
        assert_eq!(
            parsed,
            vec![
                TilePlacement::new(2, Orientation::Turned),
                TilePlacement::new(0, Orientation::Normal)
            ]
        );
        assert!(matches!(
            Puzzle::parse_checkpoint("[{\"Idx\":2}"),
            Err(PuzzleError::Checkpoint(_))
        ));
    }

    #[test]
    fn test_status_names() {
        assert_eq!(Termination::StopCheckpoint.status().to_string(), "solved");
        assert_eq!(Termination::FirstSolution.status().to_string(), "solved1");
        assert_eq!(Termination::Deadline.status(), Status::Interrupted);
        assert_eq!(
            serde_json::to_string(&Status::SolvedFirst).unwrap(),
            r#""solved1""#
        );
    }
}
