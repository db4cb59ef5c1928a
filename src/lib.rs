//! Rectangle Tiling Solver Library
//!
//! Enumerates every way to tile a rectangular board with a given list of
//! rectangular tiles, each usable in either orientation. Tilings that are
//! mirror images of each other, or that only swap tiles of identical shape,
//! are reported once.
//!
//! A search can be seeded from a start checkpoint, bounded by a stop
//! checkpoint, cut short by a deadline or a step limit, or stopped at the
//! first solution. An interrupted search reports the placement sequence it
//! reached, which is a valid start checkpoint for the next run.

pub mod board;
pub mod canonical;
pub mod config;
pub mod error;
pub mod frontier;
pub mod geometry;
pub mod pairs;
pub mod pruning;
pub mod puzzle;
pub mod solver;
pub mod tile;

pub use canonical::{Canonicalizer, Solution, TilePosition};
pub use config::{GapDetection, NeighborCheck, SolverConfig};
pub use error::PuzzleError;
pub use frontier::PlacementOrder;
pub use puzzle::{Outcome, Puzzle, Status, Termination};
pub use solver::{solve, Search};
pub use tile::{Coord, Orientation, TilePlacement};
