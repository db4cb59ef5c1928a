//! Candidate frontier: the empty corners where the next tile may be anchored.
//!
//! Every tiling of the board can be built by repeatedly covering an empty cell
//! whose left and lower neighbours are already filled (or are walls). Such a
//! cell must be the bottom-left corner of whatever tile covers it, so the
//! search only ever anchors tiles there. The frontier holds exactly these
//! cells, each with a cached description of the empty space around it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::tile::Coord;

/// Policy deciding which gap of the frontier is filled next.
///
/// The policy changes performance and enumeration order, never the set of
/// canonical solutions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementOrder {
    /// Most recently added gap (depth-first stack discipline).
    #[default]
    #[serde(rename = "lastGapAdded")]
    LastGapFirst,
    /// Narrowest active gap, the tallest one winning a tie.
    #[serde(rename = "smallestGap", alias = "smalestGap")]
    SmallestGapFirst,
    /// Lowest active gap, the leftmost one winning a tie.
    #[serde(rename = "bottomLeft")]
    BottomLeft,
}

impl PlacementOrder {
    pub const ALL: [Self; 3] = [Self::LastGapFirst, Self::SmallestGapFirst, Self::BottomLeft];
}

impl FromStr for PlacementOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lastGapAdded" | "last-gap-added" | "last-gap-first" => Ok(Self::LastGapFirst),
            // the batch database still carries the misspelled name
            "smallestGap" | "smalestGap" | "smallest-gap" | "smallest-gap-first" => {
                Ok(Self::SmallestGapFirst)
            }
            "bottomLeft" | "bottom-left" => Ok(Self::BottomLeft),
            other => Err(format!(
                "unknown placement order '{other}' (expected lastGapAdded, smallestGap or bottomLeft)"
            )),
        }
    }
}

impl fmt::Display for PlacementOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LastGapFirst => "lastGapAdded",
            Self::SmallestGapFirst => "smallestGap",
            Self::BottomLeft => "bottomLeft",
        })
    }
}

/// Cached geometry of the empty region anchored at a frontier corner.
///
/// Only `pos` is authoritative; everything else is re-derived from the
/// occupancy grid by the board whenever a neighbouring tile changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Gap {
    pub pos: Coord,
    /// Empty cells to the right of `pos`, including `pos`.
    pub width: i32,
    /// Empty cells above `pos`, including `pos`.
    pub height: i32,
    /// How far the filled cells (or wall) left of the gap column reach
    /// upwards from `pos`, capped at `height`.
    pub left_height: i32,
    /// The `width x height` box is walled in on all four sides.
    pub enclosed: bool,
    /// Some unplaced tile still fits the `width x height` box.
    pub active: bool,
    /// The strip along the left support is long enough to check separately.
    pub left_side_active: bool,
}

impl Gap {
    pub const fn new(pos: Coord) -> Self {
        Self {
            pos,
            width: 0,
            height: 0,
            left_height: 0,
            enclosed: false,
            active: true,
            left_side_active: false,
        }
    }

    /// The box spanned by the gap's width and height runs.
    pub const fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Whether `pos` lies on the column just right of `tile`, level with it.
    pub const fn is_right_of(&self, tile: &Rect) -> bool {
        self.pos.x == tile.right() && self.pos.y >= tile.y && self.pos.y < tile.top()
    }

    /// Whether `pos` lies on the row just above `tile`, within its span.
    pub const fn is_above(&self, tile: &Rect) -> bool {
        self.pos.y == tile.top() && self.pos.x >= tile.x && self.pos.x < tile.right()
    }
}

/// Ordered bag of gaps plus the index of the designated next candidate.
#[derive(Clone, Debug)]
pub struct Frontier {
    gaps: Vec<Gap>,
    next: usize,
    order: PlacementOrder,
}

impl Frontier {
    pub fn new(order: PlacementOrder, capacity: usize) -> Self {
        Self {
            gaps: Vec::with_capacity(capacity),
            next: 0,
            order,
        }
    }

    pub const fn order(&self) -> PlacementOrder {
        self.order
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    pub(crate) fn gaps_mut(&mut self) -> &mut [Gap] {
        &mut self.gaps
    }

    /// Slot of the gap the next tile goes into.
    pub fn next_index(&self) -> Option<usize> {
        (self.next < self.gaps.len()).then_some(self.next)
    }

    pub fn next_gap(&self) -> Option<&Gap> {
        self.gaps.get(self.next)
    }

    pub(crate) fn push(&mut self, gap: Gap) {
        self.gaps.push(gap);
    }

    /// Puts a gap back at `slot` (clamped to the end of the list).
    pub(crate) fn insert(&mut self, slot: usize, gap: Gap) {
        let slot = slot.min(self.gaps.len());
        self.gaps.insert(slot, gap);
    }

    pub(crate) fn remove(&mut self, slot: usize) -> Gap {
        self.gaps.remove(slot)
    }

    /// Removes the (at most two) gaps on the right and top boundary of `tile`.
    ///
    /// These are exactly the gaps the tile exposed when it was placed, provided
    /// everything placed after it has already been removed.
    pub(crate) fn remove_adjacent(&mut self, tile: &Rect) -> usize {
        let mut removed = 0;
        let mut slot = self.gaps.len();
        while slot > 0 && removed < 2 {
            slot -= 1;
            let gap = &self.gaps[slot];
            if gap.is_right_of(tile) || gap.is_above(tile) {
                self.gaps.remove(slot);
                removed += 1;
            }
        }
        removed
    }

    /// Picks the next candidate according to the placement order.
    pub fn recalc_next_candidate(&mut self) {
        let last = self.gaps.len().saturating_sub(1);
        self.next = match self.order {
            PlacementOrder::LastGapFirst => last,
            PlacementOrder::SmallestGapFirst => self
                .active_slots()
                .min_by(|&a, &b| {
                    let (ga, gb) = (&self.gaps[a], &self.gaps[b]);
                    ga.width
                        .cmp(&gb.width)
                        .then(gb.height.cmp(&ga.height))
                        .then(a.cmp(&b))
                })
                .unwrap_or(last),
            PlacementOrder::BottomLeft => self
                .active_slots()
                .min_by_key(|&slot| (self.gaps[slot].pos.y, self.gaps[slot].pos.x, slot))
                .unwrap_or(last),
        };
    }

    fn active_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.gaps
            .iter()
            .enumerate()
            .filter(|(_, gap)| gap.active)
            .map(|(slot, _)| slot)
    }
}
