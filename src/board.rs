//! Board state: occupancy grid, tiles, placed stack and frontier.
//!
//! The occupancy grid is a flat `y * width + x` array holding `index + 1` for
//! cells on the boundary of a placed tile and `0` elsewhere. Interior cells
//! are never consulted: every run, diagonal and enclosure query the search
//! makes starts from an empty cell, so the first filled cell it meets is
//! always on a tile's edge.

use crate::config::{NeighborCheck, SolverConfig};
use crate::frontier::{Frontier, Gap};
use crate::geometry::{Corner, Rect};
use crate::pairs::PairTree;
use crate::pruning::{GapScope, PruningTables};
use crate::tile::{Coord, Orientation, Tile, TilePlacement};

/// A placed tile together with the frontier slot its anchor gap occupied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Placed {
    index: usize,
    slot: usize,
}

#[derive(Clone, Debug)]
pub struct Board {
    size: Coord,
    occupancy: Vec<u16>,
    tiles: Vec<Tile>,
    placed: Vec<Placed>,
    frontier: Frontier,
    tables: PruningTables,
    pairs: Option<PairTree>,
    last_collision: Option<usize>,
}

impl Board {
    /// Creates an empty board whose only gap is the bottom-left corner.
    pub fn new(size: Coord, tile_sizes: &[Coord], config: &SolverConfig) -> Self {
        let tiles: Vec<Tile> = tile_sizes
            .iter()
            .enumerate()
            .map(|(index, &dims)| Tile::new(index, dims))
            .collect();
        let tables = PruningTables::new(size.x, size.y, &tiles);
        let pairs = match config.same_side_neighbors {
            NeighborCheck::Off => None,
            mode => Some(PairTree::new(mode, tiles.len())),
        };
        let cells = (size.x.max(0) as usize) * (size.y.max(0) as usize);

        let mut board = Self {
            size,
            occupancy: vec![0; cells],
            placed: Vec::with_capacity(tiles.len()),
            frontier: Frontier::new(config.placement_order, tiles.len() + 1),
            tiles,
            tables,
            pairs,
            last_collision: None,
        };
        if cells > 0 {
            board.frontier.push(Gap::new(Coord::new(0, 0)));
            board.refresh_around(&Rect::new(0, 0, 1, 1));
        }
        board
    }

    pub const fn size(&self) -> Coord {
        self.size
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> &Tile {
        &self.tiles[index]
    }

    pub const fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub const fn tables(&self) -> &PruningTables {
        &self.tables
    }

    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        !self.tiles.is_empty() && self.placed.len() == self.tiles.len()
    }

    /// Tile indices in placement order.
    pub fn placed_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.placed.iter().map(|entry| entry.index)
    }

    /// The current placement sequence in checkpoint form.
    pub fn placements(&self) -> Vec<TilePlacement> {
        self.placed
            .iter()
            .filter_map(|entry| {
                let orientation = self.tiles[entry.index].orientation()?;
                Some(TilePlacement::new(entry.index, orientation))
            })
            .collect()
    }

    pub fn last_placement(&self) -> Option<TilePlacement> {
        let entry = self.placed.last()?;
        let orientation = self.tiles[entry.index].orientation()?;
        Some(TilePlacement::new(entry.index, orientation))
    }

    /// Rectangle of every tile in input order, if all tiles are placed.
    pub fn layout(&self) -> Option<Vec<Rect>> {
        self.tiles.iter().map(Tile::rect).collect()
    }

    /// Whether the cell is covered by a tile edge or lies outside the board.
    pub fn is_filled(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).map_or(true, |cell| self.occupancy[cell] != 0)
    }

    /// Tile whose boundary covers the cell, if any.
    pub fn occupant(&self, x: i32, y: i32) -> Option<usize> {
        let value = self.occupancy[self.cell(x, y)?];
        (value != 0).then(|| usize::from(value) - 1)
    }

    fn cell(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.size.x && y < self.size.y)
            .then(|| (y * self.size.x + x) as usize)
    }

    /// Places tile `index` at the next candidate gap.
    ///
    /// Returns `false` without touching the board if the tile does not fit
    /// there or one of the ordering rules forbids it.
    pub fn place(&mut self, index: usize, orientation: Orientation) -> bool {
        debug_assert!(!self.tiles[index].is_placed(), "tile {index} is already placed");
        let Some(slot) = self.frontier.next_index() else {
            return false;
        };
        let gap = self.frontier.gaps()[slot];
        let rect = self.tiles[index].rect_at(gap.pos, orientation);

        if !rect.fits_within(self.size) || rect.width > gap.width {
            return false;
        }
        if self.breaks_corner_order(index, &rect) || self.collides(&rect) {
            return false;
        }
        if let Some(pairs) = self.pairs.as_mut() {
            if !pairs.try_attach(index, rect) {
                return false;
            }
        }

        self.mark(&rect, index as u16 + 1);
        self.tiles[index].place(gap.pos, orientation);
        self.placed.push(Placed { index, slot });
        self.frontier.remove(slot);
        self.discover_gaps(&rect);
        self.refresh_around(&rect);
        true
    }

    /// Takes the most recently placed tile off the board and returns its index.
    pub fn remove_last(&mut self) -> Option<usize> {
        let entry = self.placed.pop()?;
        let tile = &mut self.tiles[entry.index];
        let rect = tile.rect()?;
        tile.remove();

        self.mark(&rect, 0);
        self.frontier.remove_adjacent(&rect);
        self.frontier.insert(entry.slot, Gap::new(rect.origin()));
        if self.last_collision == Some(entry.index) {
            self.last_collision = None;
        }
        if let Some(pairs) = self.pairs.as_mut() {
            pairs.detach_last();
        }
        self.refresh_around(&rect);
        Some(entry.index)
    }

    /// Whether some gap in `scope` can certainly no longer be filled.
    pub fn has_unfillable_gaps(&self, scope: GapScope, check_left_side: bool) -> bool {
        let gaps = self.frontier.gaps();
        let selected: &[Gap] = match scope {
            GapScope::NextCandidate => match self.frontier.next_index() {
                Some(slot) => &gaps[slot..=slot],
                None => &[],
            },
            GapScope::AllActive => gaps,
        };
        selected
            .iter()
            .any(|gap| self.is_unfillable(gap, check_left_side))
    }

    /// Whether the enclosed holes need more area than the tiles that fit into them.
    pub fn total_gap_area_exceeded(&self) -> bool {
        let holes: Vec<&Gap> = self.frontier.gaps().iter().filter(|g| g.enclosed).collect();
        if holes.is_empty() {
            return false;
        }
        let needed: i64 = holes.iter().map(|gap| gap.area()).sum();
        let supply: i64 = self
            .tiles
            .iter()
            .filter(|tile| !tile.is_placed())
            .filter(|tile| {
                holes
                    .iter()
                    .any(|gap| self.tables.gap_area(gap.width, gap.height, tile.index) > 0)
            })
            .map(Tile::area)
            .sum();
        needed > supply
    }

    fn is_unfillable(&self, gap: &Gap, check_left_side: bool) -> bool {
        if !gap.active {
            return true;
        }
        let available = self
            .tables
            .available_area(gap.width, gap.height, self.placed_indices());
        let target = if gap.enclosed { gap.area() as u64 } else { 1 };
        if available < target {
            return true;
        }
        check_left_side && gap.left_side_active && self.left_side_uncoverable(gap)
    }

    /// Every cell of the strip along the left support is covered by a distinct
    /// tile whose left edge sits on the gap column.
    fn left_side_uncoverable(&self, gap: &Gap) -> bool {
        let needed = gap.left_height;
        let reach: i32 = self
            .tiles
            .iter()
            .filter(|tile| !tile.is_placed())
            .map(|tile| self.tables.column_reach(gap.height, tile.index).min(needed))
            .sum();
        reach < needed
    }

    /// A tile reaching a corner other than the bottom-left may not outrank
    /// the tile in the bottom-left corner.
    fn breaks_corner_order(&self, index: usize, rect: &Rect) -> bool {
        let Some(first) = self.placed.first() else {
            return false;
        };
        rect.corners(self.size).any(|corner| corner != Corner::BottomLeft)
            && self.tiles[index].rank() > self.tiles[first.index].rank()
    }

    fn collides(&mut self, rect: &Rect) -> bool {
        let hits = |index: usize| self.tiles[index].rect().is_some_and(|r| r.overlaps(rect));
        if self.last_collision.is_some_and(hits) {
            return true;
        }
        match self.placed.iter().map(|entry| entry.index).find(|&index| hits(index)) {
            Some(index) => {
                self.last_collision = Some(index);
                true
            }
            None => false,
        }
    }

    fn mark(&mut self, rect: &Rect, value: u16) {
        let (left, right) = (rect.x, rect.right() - 1);
        let (bottom, top) = (rect.y, rect.top() - 1);
        for x in left..=right {
            for y in [bottom, top] {
                if let Some(cell) = self.cell(x, y) {
                    self.occupancy[cell] = value;
                }
            }
        }
        for y in bottom..=top {
            for x in [left, right] {
                if let Some(cell) = self.cell(x, y) {
                    self.occupancy[cell] = value;
                }
            }
        }
    }

    /// Pushes the concave corners a new tile exposes: first on its top edge,
    /// then on its right edge.
    fn discover_gaps(&mut self, rect: &Rect) {
        let top = rect.top();
        if top < self.size.y {
            if let Some(x) = (rect.x..rect.right()).find(|&x| !self.is_filled(x, top)) {
                if x > rect.x || self.is_filled(rect.x - 1, top) {
                    self.frontier.push(Gap::new(Coord::new(x, top)));
                }
            }
        }
        let right = rect.right();
        if right < self.size.x {
            if let Some(y) = (rect.y..rect.top()).find(|&y| !self.is_filled(right, y)) {
                if y > rect.y || self.is_filled(right, rect.y - 1) {
                    self.frontier.push(Gap::new(Coord::new(right, y)));
                }
            }
        }
    }

    /// Recomputes gaps near `rect`, then activity and the next candidate.
    fn refresh_around(&mut self, rect: &Rect) {
        for slot in 0..self.frontier.len() {
            let gap = self.frontier.gaps()[slot];
            if gap.width == 0 || gap.bounds().expanded().overlaps(rect) {
                let updated = self.measure_gap(gap.pos);
                self.frontier.gaps_mut()[slot] = updated;
            }
        }
        for slot in 0..self.frontier.len() {
            let gap = self.frontier.gaps()[slot];
            let active = self
                .tables
                .available_area(gap.width, gap.height, self.placed_indices())
                > 0;
            self.frontier.gaps_mut()[slot].active = active;
        }
        self.frontier.recalc_next_candidate();
    }

    /// Geometry of the empty region anchored at `pos`.
    fn measure_gap(&self, pos: Coord) -> Gap {
        let (p, q) = (pos.x, pos.y);
        let width = (p..self.size.x).take_while(|&x| !self.is_filled(x, q)).count() as i32;
        let height = (q..self.size.y).take_while(|&y| !self.is_filled(p, y)).count() as i32;
        let left_height = (q..q + height).take_while(|&y| self.is_filled(p - 1, y)).count() as i32;
        let enclosed = (q..q + height)
            .all(|y| self.is_filled(p - 1, y) && self.is_filled(p + width, y))
            && (p..p + width).all(|x| self.is_filled(x, q - 1) && self.is_filled(x, q + height));

        Gap {
            pos,
            width,
            height,
            left_height,
            enclosed,
            active: true,
            left_side_active: left_height >= 2,
        }
    }

    /// Full consistency check of the derived state against the placed tiles.
    ///
    /// Rebuilds coverage from scratch, so it is only meant for tests and
    /// debugging.
    pub fn is_consistent(&self) -> bool {
        let mut cover = vec![0u16; self.occupancy.len()];
        let mut boundary = vec![0u16; self.occupancy.len()];
        for entry in &self.placed {
            let Some(rect) = self.tiles[entry.index].rect() else {
                return false;
            };
            if !rect.fits_within(self.size) {
                return false;
            }
            let value = entry.index as u16 + 1;
            for y in rect.y..rect.top() {
                for x in rect.x..rect.right() {
                    let cell = (y * self.size.x + x) as usize;
                    if cover[cell] != 0 {
                        return false;
                    }
                    cover[cell] = value;
                    let edge = x == rect.x || x == rect.right() - 1 || y == rect.y || y == rect.top() - 1;
                    if edge {
                        boundary[cell] = value;
                    }
                }
            }
        }
        if boundary != self.occupancy {
            return false;
        }
        let placed_flags = self.tiles.iter().filter(|t| t.is_placed()).count();
        if placed_flags != self.placed.len() {
            return false;
        }

        let covered = |x: i32, y: i32| {
            x < 0 || y < 0 || x >= self.size.x || y >= self.size.y
                || cover[(y * self.size.x + x) as usize] != 0
        };
        let mut corners: Vec<(i32, i32)> = Vec::new();
        for y in 0..self.size.y {
            for x in 0..self.size.x {
                if !covered(x, y) && covered(x - 1, y) && covered(x, y - 1) {
                    corners.push((x, y));
                }
            }
        }
        let mut frontier: Vec<(i32, i32)> =
            self.frontier.gaps().iter().map(|g| (g.pos.x, g.pos.y)).collect();
        corners.sort_unstable();
        frontier.sort_unstable();
        corners == frontier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GapDetection;
    use proptest::prelude::*;

    fn sizes(dims: &[(i32, i32)]) -> Vec<Coord> {
        dims.iter().map(|&(w, h)| Coord::new(w, h)).collect()
    }

    fn board(width: i32, height: i32, dims: &[(i32, i32)]) -> Board {
        Board::new(Coord::new(width, height), &sizes(dims), &SolverConfig::default())
    }

    #[derive(Debug, PartialEq)]
    struct Snapshot {
        occupancy: Vec<u16>,
        gaps: Vec<Gap>,
        placed: Vec<Placed>,
        roots: Option<Vec<(Rect, usize)>>,
    }

    fn snapshot(board: &Board) -> Snapshot {
        let mut gaps = board.frontier.gaps().to_vec();
        gaps.sort_by_key(|g| (g.pos.y, g.pos.x));
        Snapshot {
            occupancy: board.occupancy.clone(),
            gaps,
            placed: board.placed.clone(),
            roots: board.pairs.as_ref().map(PairTree::roots),
        }
    }

    #[test]
    fn test_new_board_has_single_corner_gap() {
        let board = board(5, 4, &[(2, 1), (3, 2), (4, 3)]);
        let gaps = board.frontier().gaps();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].pos, Coord::new(0, 0));
        assert_eq!((gaps[0].width, gaps[0].height), (5, 4));
        assert!(gaps[0].enclosed);
        assert!(board.is_consistent());
    }

    #[test]
    fn test_place_exposes_top_and_right_gaps() {
        let mut board = board(5, 4, &[(2, 1), (3, 2), (4, 3)]);
        assert!(board.place(2, Orientation::Turned));
        let positions: Vec<Coord> = board.frontier().gaps().iter().map(|g| g.pos).collect();
        assert_eq!(positions, vec![Coord::new(3, 0)]);
        assert_eq!(board.frontier().next_gap().map(|g| g.pos), Some(Coord::new(3, 0)));
        assert_eq!(board.occupant(0, 0), Some(2));
        assert_eq!(board.occupant(1, 1), None);
        assert!(board.is_filled(-1, 2));
        assert!(board.is_consistent());
    }

    #[test]
    fn test_tile_wider_than_gap_is_rejected() {
        let mut board = board(4, 2, &[(1, 2), (1, 1), (1, 1), (1, 2), (3, 1), (2, 1)]);
        for index in 0..4 {
            assert!(board.place(index, Orientation::Normal), "tile {index}");
        }
        let gap = *board.frontier().next_gap().unwrap();
        assert_eq!(gap.pos, Coord::new(1, 1));
        assert_eq!(gap.width, 2);
        assert!(gap.enclosed);
        assert!(!board.place(4, Orientation::Normal));
        assert!(board.place(5, Orientation::Normal));
        assert!(board.is_consistent());
    }

    #[test]
    fn test_corner_rule_rejects_larger_tile_in_other_corner() {
        let mut board = board(4, 3, &[(1, 3), (3, 3)]);
        assert!(board.place(0, Orientation::Normal));
        assert!(!board.place(1, Orientation::Normal));
        assert_eq!(board.placed_count(), 1);

        let mut board = self::board(4, 3, &[(3, 3), (1, 3)]);
        assert!(board.place(0, Orientation::Normal));
        assert!(board.place(1, Orientation::Normal));
        assert!(board.is_complete());
        assert_eq!(
            board.layout(),
            Some(vec![Rect::new(0, 0, 3, 3), Rect::new(3, 0, 1, 3)])
        );
    }

    #[test]
    fn test_remove_last_restores_empty_board() {
        let mut board = board(5, 4, &[(2, 1), (3, 2), (4, 3)]);
        let before = snapshot(&board);
        assert!(board.place(2, Orientation::Turned));
        assert!(board.place(1, Orientation::Turned));
        assert_eq!(board.placed_count(), 2);
        assert_eq!(board.remove_last(), Some(1));
        assert_eq!(board.remove_last(), Some(2));
        assert_eq!(board.remove_last(), None);
        assert_eq!(snapshot(&board), before);
    }

    #[test]
    fn test_enclosed_hole_is_detected() {
        // a 1x2 on the left of a 3x2 board leaves an enclosed 2x2 hole
        let mut board = board(3, 2, &[(1, 2), (2, 1), (1, 1), (1, 1)]);
        assert!(board.place(0, Orientation::Normal));
        let gap = *board.frontier().next_gap().unwrap();
        assert_eq!(gap.pos, Coord::new(1, 0));
        assert_eq!((gap.width, gap.height), (2, 2));
        assert!(gap.enclosed);
        assert!(!board.has_unfillable_gaps(GapScope::AllActive, true));
    }

    #[test]
    fn test_unfillable_gap_when_nothing_fits() {
        // after the 2x2 only the 1x1 fits the remaining 1x2 column
        let mut board = board(3, 2, &[(2, 2), (3, 1), (1, 1)]);
        assert!(board.place(0, Orientation::Normal));
        assert!(board.has_unfillable_gaps(GapScope::NextCandidate, false));
        assert!(board.total_gap_area_exceeded());
    }

    #[test]
    fn test_left_side_check() {
        // the 5x1 can line at most one cell of the 3-tall strip beside the 1x3
        let mut board = board(6, 4, &[(1, 3), (5, 1)]);
        assert!(board.place(0, Orientation::Normal));
        let gap = *board.frontier().next_gap().unwrap();
        assert_eq!(gap.pos, Coord::new(1, 0));
        assert_eq!((gap.width, gap.height), (5, 4));
        assert_eq!(gap.left_height, 3);
        assert!(gap.left_side_active);
        assert!(!board.has_unfillable_gaps(GapScope::AllActive, false));
        assert!(board.has_unfillable_gaps(GapScope::AllActive, true));
    }

    #[derive(Clone, Debug)]
    struct Case {
        width: i32,
        height: i32,
        tiles: Vec<(i32, i32)>,
        moves: Vec<(usize, bool)>,
        neighbors: NeighborCheck,
    }

    fn case() -> impl Strategy<Value = Case> {
        (
            2i32..=7,
            2i32..=7,
            prop::collection::vec((1i32..=4, 1i32..=4), 1..=7),
            prop::collection::vec((0usize..7, any::<bool>()), 1..=24),
            prop_oneof![
                Just(NeighborCheck::Off),
                Just(NeighborCheck::Pairs),
                Just(NeighborCheck::Full)
            ],
        )
            .prop_map(|(width, height, tiles, moves, neighbors)| Case {
                width,
                height,
                tiles,
                moves,
                neighbors,
            })
    }

    proptest! {
        #[test]
        fn place_then_remove_restores_state(case in case()) {
            let config = SolverConfig {
                same_side_neighbors: case.neighbors,
                gap_detection: GapDetection::Off,
                ..SolverConfig::default()
            };
            let mut board = Board::new(
                Coord::new(case.width, case.height),
                &sizes(&case.tiles),
                &config,
            );
            for &(index, turned) in &case.moves {
                let index = index % case.tiles.len();
                if board.tile(index).is_placed() {
                    continue;
                }
                let orientation = Orientation::from(turned);
                let before = snapshot(&board);
                if board.place(index, orientation) {
                    prop_assert!(board.is_consistent());
                    prop_assert_eq!(board.remove_last(), Some(index));
                    prop_assert_eq!(&snapshot(&board), &before);
                    prop_assert!(board.place(index, orientation));
                } else {
                    prop_assert_eq!(&snapshot(&board), &before);
                }
                prop_assert!(board.is_consistent());
            }
            while board.remove_last().is_some() {
                prop_assert!(board.is_consistent());
            }
            prop_assert_eq!(board.frontier().len(), 1);
        }
    }
}
