//! Optimisation switches for a solve.
//!
//! Every switch only affects how fast the search runs, never which canonical
//! solutions it reports (the neighbour pairing check is the one exception and
//! is off by default).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::frontier::PlacementOrder;

/// Same-side neighbour pairing check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NeighborCheck {
    #[default]
    Off,
    /// Pair tiles sharing a full side, one level deep.
    Pairs,
    /// Keep merging pairs into larger virtual rectangles.
    Full,
}

impl FromStr for NeighborCheck {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" | "none" => Ok(Self::Off),
            "pairs" | "same-side-neighbor-check" => Ok(Self::Pairs),
            "full" | "full-same-side-neighbor-check" => Ok(Self::Full),
            other => Err(format!(
                "unknown neighbour check '{other}' (expected off, pairs or full)"
            )),
        }
    }
}

impl fmt::Display for NeighborCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::Pairs => "pairs",
            Self::Full => "full",
        })
    }
}

/// Gap fillability check run after every placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GapDetection {
    Off,
    /// Check only the gap the next tile goes into.
    #[default]
    NextCandidate,
    /// Check every gap on the frontier.
    AllActive,
    /// Check every gap, including the strip along its left support.
    AllActiveWithLeftSide,
}

impl FromStr for GapDetection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" | "none" => Ok(Self::Off),
            "next" | "next-candidate" | "nextCandidate" => Ok(Self::NextCandidate),
            "all" | "all-active" | "allActive" => Ok(Self::AllActive),
            "all-left" | "all-active-left-side" | "allActiveWithLeftSide" => {
                Ok(Self::AllActiveWithLeftSide)
            }
            other => Err(format!(
                "unknown gap detection '{other}' (expected off, next, all or all-left)"
            )),
        }
    }
}

impl fmt::Display for GapDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::NextCandidate => "next",
            Self::AllActive => "all",
            Self::AllActiveWithLeftSide => "all-left",
        })
    }
}

/// Typed optimisation flags for one solve.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverConfig {
    pub same_side_neighbors: NeighborCheck,
    pub gap_detection: GapDetection,
    /// Reject states whose enclosed holes need more area than the tiles that fit them.
    pub total_gap_area_check: bool,
    /// Transpose boards wider than tall before solving.
    pub force_frame_upright: bool,
    pub placement_order: PlacementOrder,
    pub stop_on_first_solution: bool,
    /// Interrupt after this many search steps.
    pub step_limit: Option<u64>,
}

impl SolverConfig {
    pub fn with_placement_order(mut self, order: PlacementOrder) -> Self {
        self.placement_order = order;
        self
    }

    pub fn with_gap_detection(mut self, detection: GapDetection) -> Self {
        self.gap_detection = detection;
        self
    }

    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }
}
