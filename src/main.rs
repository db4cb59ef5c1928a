//! Rectangle Tiling Solver
//!
//! Command-line front end: solves a single board from the command line and
//! prints the canonical solutions, the final status and the resume point.
//! Set `RUST_LOG=tiling_solver=debug` to follow the search.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::error;

use tiling_solver::canonical::render;
use tiling_solver::{
    solve, Coord, GapDetection, NeighborCheck, Outcome, PlacementOrder, Puzzle, SolverConfig,
};

/// Enumerates every tiling of a rectangular board with rectangular tiles.
#[derive(Parser)]
#[command(name = "tilingsolver")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a board with an explicit tile list.
    Solve {
        /// Tile sizes as WxH, in input order.
        #[arg(long = "tile", value_parser = parse_size, required = true)]
        tiles: Vec<Coord>,
        #[command(flatten)]
        options: SolveOptions,
    },
    /// Solve a board with the (k+1)xk tiles for k = N down to 1.
    AlmostSquare {
        /// Largest k of the family.
        n: i32,
        #[command(flatten)]
        options: SolveOptions,
    },
}

#[derive(Args)]
struct SolveOptions {
    /// Board size as WxH.
    #[arg(long, value_parser = parse_size)]
    board: Coord,
    /// Which gap the next tile goes into.
    #[arg(long, default_value_t = PlacementOrder::LastGapFirst)]
    order: PlacementOrder,
    /// Gap fillability pruning after each placement.
    #[arg(long, default_value_t = GapDetection::NextCandidate)]
    gap_detection: GapDetection,
    /// Same-side neighbour pairing (reduces the solution set).
    #[arg(long, default_value_t = NeighborCheck::Off)]
    neighbors: NeighborCheck,
    /// Prune states whose enclosed holes need more area than fits them.
    #[arg(long)]
    total_gap_area: bool,
    /// Give up after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Give up after this many search steps.
    #[arg(long)]
    step_limit: Option<u64>,
    /// Stop at the first solution.
    #[arg(long)]
    first: bool,
    /// Solve wide boards transposed.
    #[arg(long)]
    upright: bool,
    /// Start checkpoint, e.g. '[{"Idx":0,"Rot":false}]'.
    #[arg(long)]
    start: Option<String>,
    /// Stop checkpoint in the same form.
    #[arg(long)]
    stop: Option<String>,
    /// Print the outcome as JSON instead of pictures.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let (tiles, options) = match cli.command {
        Command::Solve { tiles, options } => (tiles, options),
        Command::AlmostSquare { n, options } => {
            (Puzzle::almost_square(n, options.board).tiles, options)
        }
    };

    match run_solver(tiles, &options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

/// Builds the puzzle from the options, solves it and prints the outcome.
fn run_solver(tiles: Vec<Coord>, options: &SolveOptions) -> Result<(), String> {
    let mut puzzle = Puzzle::new(options.board, tiles);
    if let Some(start) = &options.start {
        puzzle.start = Puzzle::parse_checkpoint(start).map_err(|e| e.to_string())?;
    }
    if let Some(stop) = &options.stop {
        puzzle.stop = Some(Puzzle::parse_checkpoint(stop).map_err(|e| e.to_string())?);
    }
    if let Some(ms) = options.timeout_ms {
        puzzle = puzzle.with_timeout(Duration::from_millis(ms));
    }

    let config = SolverConfig {
        same_side_neighbors: options.neighbors,
        gap_detection: options.gap_detection,
        total_gap_area_check: options.total_gap_area,
        force_frame_upright: options.upright,
        placement_order: options.order,
        stop_on_first_solution: options.first,
        step_limit: options.step_limit,
    };

    let outcome = solve(&puzzle, &config).map_err(|e| e.to_string())?;
    if options.json {
        let json = serde_json::to_string_pretty(&outcome).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        print!("{}", format_outcome(&puzzle, &outcome));
    }
    Ok(())
}

fn format_outcome(puzzle: &Puzzle, outcome: &Outcome) -> String {
    let mut solutions: Vec<_> = outcome.solutions.iter().collect();
    solutions.sort_unstable();

    let mut output = format!(
        "Found {} solutions ({}, {} steps, {} placements)\n",
        solutions.len(),
        outcome.status,
        outcome.steps,
        outcome.tiles_placed
    );
    for (i, solution) in solutions.iter().enumerate() {
        output.push_str(&format!("\nSolution {}:\n", i + 1));
        output.push_str(&render(puzzle.board, &solution.rects(&puzzle.tiles)));
        output.push('\n');
    }
    if !outcome.current_placement.is_empty() {
        let resume = serde_json::to_string(&outcome.current_placement).unwrap_or_default();
        output.push_str(&format!("\nResume from: {resume}\n"));
    }
    output
}

/// Parses a `WxH` size.
fn parse_size(text: &str) -> Result<Coord, String> {
    let (w, h) = text
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WxH, got '{text}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<i32>()
            .map_err(|e| format!("bad size '{text}': {e}"))
    };
    Ok(Coord::new(parse(w)?, parse(h)?))
}
