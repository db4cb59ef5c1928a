//! Depth-first tiling search.
//!
//! The search walks placement sequences in a fixed order: at every depth the
//! unplaced tiles are tried by ascending index, normal before turned, at the
//! frontier's next candidate gap. Instead of a recursion stack it keeps a
//! single resume cursor, so the whole search state is the board plus the
//! cursor and can be stopped and restarted from any placement sequence.
//!
//! Key properties:
//! - Identical tiles are only placed in index order
//! - Pruning runs right after each placement and undoes it on failure
//! - Stop checkpoint, deadline and step limit are checked only at freshly
//!   reached states, so an interrupted search reports a resumable sequence

use std::cmp::Ordering;
use std::time::Instant;

use log::{debug, info, warn};
use rustc_hash::FxHashSet;

use crate::board::Board;
use crate::canonical::{Canonicalizer, Solution};
use crate::config::{GapDetection, SolverConfig};
use crate::error::PuzzleError;
use crate::pruning::GapScope;
use crate::puzzle::{Outcome, Puzzle, Termination};
use crate::tile::{Orientation, TilePlacement};

/// Where the scan for the next placement resumes at the current depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Cursor {
    index: usize,
    /// The normal orientation of `index` was already explored.
    turned_only: bool,
}

impl Cursor {
    /// The alternative following `entry` in depth-first order.
    fn after(entry: TilePlacement, square: bool) -> Self {
        match entry.orientation {
            Orientation::Normal if !square => Self {
                index: entry.tile_index,
                turned_only: true,
            },
            _ => Self {
                index: entry.tile_index + 1,
                turned_only: false,
            },
        }
    }
}

/// A resumable depth-first search over one puzzle.
#[derive(Clone, Debug)]
pub struct Search {
    board: Board,
    config: SolverConfig,
    canonicalizer: Canonicalizer,
    solutions: FxHashSet<Solution>,
    stop: Option<Vec<TilePlacement>>,
    deadline: Option<Instant>,
    /// Tiles allowed in the bottom-left corner.
    viable_at_origin: Vec<bool>,
    cursor: Cursor,
    /// The current state has not been checked for solutions and limits yet.
    fresh: bool,
    tiles_placed: u64,
    steps: u64,
    termination: Option<Termination>,
}

impl Search {
    /// Validates the puzzle, builds the board and replays the start checkpoint.
    pub fn new(puzzle: &Puzzle, config: SolverConfig) -> Result<Self, PuzzleError> {
        puzzle.validate()?;

        let board = Board::new(puzzle.board, &puzzle.tiles, &config);
        let canonicalizer = Canonicalizer::new(puzzle.board, &puzzle.tiles);
        let viable_at_origin = viable_at_origin(&board);
        let stop = checked_stop(puzzle.stop.as_deref(), puzzle.tiles.len());

        let mut search = Self {
            board,
            config,
            canonicalizer,
            solutions: FxHashSet::default(),
            stop,
            deadline: puzzle.deadline,
            viable_at_origin,
            cursor: Cursor::default(),
            fresh: true,
            tiles_placed: 0,
            steps: 0,
            termination: None,
        };

        let first_unusable = puzzle.start.first().is_some_and(|entry| {
            search
                .viable_at_origin
                .get(entry.tile_index)
                .is_some_and(|&viable| !viable)
        });
        if first_unusable {
            debug!("start checkpoint opens with a tile that cannot hold the bottom-left corner");
            search.finish(Termination::Exhausted);
        } else {
            search.seed(&puzzle.start);
        }
        Ok(search)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn solutions(&self) -> &FxHashSet<Solution> {
        &self.solutions
    }

    pub const fn tiles_placed(&self) -> u64 {
        self.tiles_placed
    }

    pub const fn steps(&self) -> u64 {
        self.steps
    }

    pub const fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Runs the search to completion.
    pub fn run(mut self) -> Outcome {
        while self.step().is_none() {}
        self.into_outcome()
    }

    /// Advances the search by one placement or one backtrack.
    ///
    /// Returns the termination reason once the search has ended.
    pub fn step(&mut self) -> Option<Termination> {
        if self.termination.is_some() {
            return self.termination;
        }

        if self.fresh {
            self.fresh = false;
            if self.reached_stop() {
                return self.finish(Termination::StopCheckpoint);
            }
            if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return self.finish(Termination::Deadline);
            }
            if self.config.step_limit.is_some_and(|limit| self.steps >= limit) {
                return self.finish(Termination::StepLimit);
            }
            if self.board.is_complete() {
                self.record_solution();
                if self.config.stop_on_first_solution {
                    return self.finish(Termination::FirstSolution);
                }
            }
        }

        self.steps += 1;
        if self.advance() {
            self.fresh = true;
            return None;
        }

        let Some(last) = self.board.last_placement() else {
            return self.finish(Termination::Exhausted);
        };
        self.board.remove_last();
        let square = self.board.tile(last.tile_index).is_square();
        self.cursor = Cursor::after(last, square);
        None
    }

    /// Converts a finished (or abandoned) search into its outcome.
    pub fn into_outcome(self) -> Outcome {
        let termination = self.termination.unwrap_or(Termination::Deadline);
        let current_placement = match termination {
            Termination::Exhausted => Vec::new(),
            _ => self.board.placements(),
        };
        Outcome {
            solutions: self.solutions,
            status: termination.status(),
            termination,
            tiles_placed: self.tiles_placed,
            steps: self.steps,
            current_placement,
        }
    }

    fn seed(&mut self, start: &[TilePlacement]) {
        for (depth, entry) in start.iter().enumerate() {
            let index = entry.tile_index;
            if index >= self.board.tiles().len() || self.board.tile(index).is_placed() {
                warn!(
                    "start checkpoint entry {depth} names tile {index} which cannot be placed; \
                     searching on from the first {depth} entries"
                );
                self.cursor = Cursor::default();
                return;
            }
            if !self.board.place(index, entry.orientation) {
                debug!("start checkpoint entry {depth} does not fit, resuming after it");
                self.cursor = Cursor::after(*entry, self.board.tile(index).is_square());
                return;
            }
        }
        if !start.is_empty() {
            debug!("seeded {} placements from the start checkpoint", start.len());
        }
    }

    /// Places the next tile at the current depth, starting from the cursor.
    fn advance(&mut self) -> bool {
        let at_origin = self.board.is_empty();
        for index in self.cursor.index..self.board.tiles().len() {
            if self.skip_tile(index, at_origin) {
                continue;
            }
            let turned_only = index == self.cursor.index && self.cursor.turned_only;
            let orientations: &[Orientation] =
                match (turned_only, self.board.tile(index).is_square()) {
                    (true, true) => &[],
                    (true, false) => &[Orientation::Turned],
                    (false, true) => &[Orientation::Normal],
                    (false, false) => &[Orientation::Normal, Orientation::Turned],
                };

            for &orientation in orientations {
                if !self.board.place(index, orientation) {
                    continue;
                }
                self.tiles_placed += 1;
                if self.is_pruned() {
                    self.board.remove_last();
                    continue;
                }
                self.cursor = Cursor::default();
                return true;
            }
        }
        false
    }

    fn skip_tile(&self, index: usize, at_origin: bool) -> bool {
        let tile = self.board.tile(index);
        if tile.is_placed() || (at_origin && !self.viable_at_origin[index]) {
            return true;
        }
        // identical tiles go down in index order
        index > 0 && {
            let previous = self.board.tile(index - 1);
            !previous.is_placed() && previous.same_shape(tile)
        }
    }

    fn is_pruned(&self) -> bool {
        let unfillable = match self.config.gap_detection {
            GapDetection::Off => false,
            GapDetection::NextCandidate => {
                self.board.has_unfillable_gaps(GapScope::NextCandidate, false)
            }
            GapDetection::AllActive => self.board.has_unfillable_gaps(GapScope::AllActive, false),
            GapDetection::AllActiveWithLeftSide => {
                self.board.has_unfillable_gaps(GapScope::AllActive, true)
            }
        };
        unfillable || (self.config.total_gap_area_check && self.board.total_gap_area_exceeded())
    }

    /// Whether the placed sequence has reached or passed the stop checkpoint.
    fn reached_stop(&self) -> bool {
        let Some(stop) = &self.stop else {
            return false;
        };
        let placed = self.board.placements();
        for (current, limit) in placed.iter().zip(stop) {
            match current.order_key().cmp(&limit.order_key()) {
                Ordering::Greater => return true,
                Ordering::Less => return false,
                Ordering::Equal => {}
            }
        }
        placed.len() >= stop.len()
    }

    fn record_solution(&mut self) {
        let Some(layout) = self.board.layout() else {
            return;
        };
        let solution = self.canonicalizer.canonicalize(&layout);
        if self.solutions.insert(solution) {
            debug!(
                "solution {} found after {} steps",
                self.solutions.len(),
                self.steps
            );
        }
    }

    fn finish(&mut self, termination: Termination) -> Option<Termination> {
        info!(
            "{termination} after {} steps and {} placements, {} solutions",
            self.steps,
            self.tiles_placed,
            self.solutions.len()
        );
        self.termination = Some(termination);
        self.termination
    }
}

/// Solves a puzzle within its start/stop window and deadline.
pub fn solve(puzzle: &Puzzle, config: &SolverConfig) -> Result<Outcome, PuzzleError> {
    if config.force_frame_upright && puzzle.board.x > puzzle.board.y {
        debug!("solving {} board transposed", puzzle.board);
        let outcome = Search::new(&puzzle.transposed(), config.clone())?.run();
        let canonicalizer = Canonicalizer::new(puzzle.board, &puzzle.tiles);
        return Ok(outcome.transposed_back(&canonicalizer));
    }
    Ok(Search::new(puzzle, config.clone())?.run())
}

/// Which tiles may sit in the bottom-left corner.
///
/// When no tile reaches across the narrower board side every corner holds a
/// different tile, and the bottom-left one must rank at least as high as the
/// other three.
fn viable_at_origin(board: &Board) -> Vec<bool> {
    let tiles = board.tiles();
    let shorter_board_side = board.size().x.min(board.size().y);
    let spans_side = tiles.iter().any(|tile| tile.longer_side() >= shorter_board_side);
    if spans_side {
        return vec![true; tiles.len()];
    }
    tiles
        .iter()
        .map(|tile| {
            tiles
                .iter()
                .filter(|other| other.index != tile.index && other.rank() <= tile.rank())
                .count()
                >= 3
        })
        .collect()
}

fn checked_stop(stop: Option<&[TilePlacement]>, tile_count: usize) -> Option<Vec<TilePlacement>> {
    let stop = stop?;
    if stop.is_empty() {
        warn!("stop checkpoint is empty, searching without it");
        return None;
    }
    if let Some(entry) = stop.iter().find(|entry| entry.tile_index >= tile_count) {
        warn!(
            "stop checkpoint names tile {} of {tile_count}, searching without it",
            entry.tile_index
        );
        return None;
    }
    Some(stop.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Coord;

    fn sizes(dims: &[(i32, i32)]) -> Vec<Coord> {
        dims.iter().map(|&(w, h)| Coord::new(w, h)).collect()
    }

    fn oracle() -> Puzzle {
        Puzzle::new(Coord::new(5, 4), sizes(&[(2, 1), (3, 2), (4, 3)]))
    }

    #[test]
    fn test_oracle_has_single_solution() {
        let outcome = solve(&oracle(), &SolverConfig::default()).unwrap();
        assert_eq!(outcome.termination, Termination::Exhausted);
        assert_eq!(
            outcome.solution_keys(),
            vec![r#"[{"X":3,"Y":0,"T":false},{"X":3,"Y":1,"T":true},{"X":0,"Y":0,"T":true}]"#]
        );
        assert!(outcome.current_placement.is_empty());
        assert!(outcome.tiles_placed > 0);
    }

    #[test]
    fn test_two_dominoes_on_a_square() {
        let puzzle = Puzzle::new(Coord::new(2, 2), sizes(&[(2, 1), (2, 1)]));
        let outcome = solve(&puzzle, &SolverConfig::default()).unwrap();
        assert_eq!(outcome.solutions.len(), 2);
    }

    #[test]
    fn test_strip_with_two_tiles() {
        let puzzle = Puzzle::new(Coord::new(3, 1), sizes(&[(1, 1), (2, 1)]));
        let outcome = solve(&puzzle, &SolverConfig::default()).unwrap();
        assert_eq!(outcome.solutions.len(), 1);
        let solution = outcome.solutions.iter().next().unwrap();
        assert_eq!(solution.positions()[1].x, 0);
    }

    #[test]
    fn test_impossible_instance_is_solved_empty() {
        let puzzle = Puzzle::new(Coord::new(3, 3), sizes(&[(2, 2), (5, 1)]));
        let outcome = solve(&puzzle, &SolverConfig::default()).unwrap();
        assert!(outcome.solutions.is_empty());
        assert_eq!(outcome.status.to_string(), "solved");
    }

    #[test]
    fn test_area_mismatch_is_an_error() {
        let puzzle = Puzzle::new(Coord::new(3, 3), sizes(&[(2, 2)]));
        assert!(matches!(
            solve(&puzzle, &SolverConfig::default()),
            Err(PuzzleError::AreaMismatch { .. })
        ));
    }

    #[test]
    fn test_board_stays_consistent_every_step() {
        let puzzle = Puzzle::almost_square(4, Coord::new(5, 8));
        let mut search = Search::new(&puzzle, SolverConfig::default()).unwrap();
        while search.step().is_none() {
            assert!(search.board().is_consistent());
        }
        assert_eq!(search.termination(), Some(Termination::Exhausted));
    }

    #[test]
    fn test_first_solution_stops_early() {
        let config = SolverConfig {
            stop_on_first_solution: true,
            ..SolverConfig::default()
        };
        let puzzle = Puzzle::new(Coord::new(2, 2), sizes(&[(2, 1), (2, 1)]));
        let outcome = solve(&puzzle, &config).unwrap();
        assert_eq!(outcome.termination, Termination::FirstSolution);
        assert_eq!(outcome.status.to_string(), "solved1");
        assert_eq!(outcome.solutions.len(), 1);
        assert_eq!(outcome.current_placement.len(), 2);
    }

    #[test]
    fn test_unusable_first_start_tile_exits_immediately() {
        // no tile spans the 7x10 board, so each corner gets its own tile and
        // the three smallest can never rank highest among them
        let puzzle = Puzzle::almost_square(5, Coord::new(7, 10))
            .with_start(vec![TilePlacement::new(3, Orientation::Normal)]);
        let outcome = solve(&puzzle, &SolverConfig::default()).unwrap();
        assert_eq!(outcome.termination, Termination::Exhausted);
        assert_eq!(outcome.steps, 0);
        assert!(outcome.solutions.is_empty());
    }

    #[test]
    fn test_failed_start_resumes_with_next_alternative() {
        // the 3x2 lying flat overruns the board right of the 3x4
        let puzzle = oracle().with_start(vec![
            TilePlacement::new(2, Orientation::Turned),
            TilePlacement::new(1, Orientation::Normal),
        ]);
        let search = Search::new(&puzzle, SolverConfig::default()).unwrap();
        assert_eq!(search.board().placed_count(), 1);
        assert_eq!(
            search.cursor,
            Cursor {
                index: 1,
                turned_only: true
            }
        );
        let outcome = search.run();
        assert_eq!(outcome.solutions.len(), 1);
    }

    #[test]
    fn test_malformed_stop_is_ignored() {
        let puzzle = oracle().with_stop(vec![TilePlacement::new(9, Orientation::Normal)]);
        let outcome = solve(&puzzle, &SolverConfig::default()).unwrap();
        assert_eq!(outcome.termination, Termination::Exhausted);
        assert_eq!(outcome.solutions.len(), 1);
    }

    #[test]
    fn test_passed_deadline_interrupts() {
        let puzzle = Puzzle::almost_square(4, Coord::new(5, 8)).with_deadline(Instant::now());
        let outcome = solve(&puzzle, &SolverConfig::default()).unwrap();
        assert_eq!(outcome.termination, Termination::Deadline);
        assert_eq!(outcome.steps, 0);
        assert!(outcome.current_placement.is_empty());
    }
}
