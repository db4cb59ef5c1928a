//! Lookup tables certifying that a gap can no longer be filled.
//!
//! The tables are built once per puzzle for every box size that fits on the
//! board and are read-only afterwards, so one set can be shared between
//! threads solving the same tile set.

use crate::tile::{Orientation, Tile};

/// Which gaps the fillability check looks at after each placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GapScope {
    /// Only the gap the next tile will be placed in.
    NextCandidate,
    /// Every gap on the frontier.
    AllActive,
}

/// Per-box maximum contributions of the tile set.
#[derive(Clone, Debug)]
pub struct PruningTables {
    max_width: i32,
    max_height: i32,
    tile_count: usize,
    /// `[w][h][tile]`: area of the tile if it fits a `w x h` box, else 0.
    gap_table: Vec<u32>,
    /// `[w][h]`: sum of `gap_table` over all tiles.
    max_area_table: Vec<u64>,
    /// `[h][tile]`: tallest extent of the tile no taller than `h`, else 0.
    column_table: Vec<u32>,
}

impl PruningTables {
    /// Builds the tables for boxes up to `max_width x max_height`.
    pub fn new(max_width: i32, max_height: i32, tiles: &[Tile]) -> Self {
        let max_width = max_width.max(0);
        let max_height = max_height.max(0);
        let tile_count = tiles.len();
        let columns = max_width as usize + 1;
        let rows = max_height as usize + 1;

        let mut gap_table = vec![0u32; columns * rows * tile_count];
        let mut max_area_table = vec![0u64; columns * rows];
        for w in 0..=max_width {
            for h in 0..=max_height {
                let cell = w as usize * rows + h as usize;
                let mut total = 0u64;
                for tile in tiles {
                    let fits = [Orientation::Normal, Orientation::Turned].iter().any(|&o| {
                        let dims = tile.dims(o);
                        dims.x <= w && dims.y <= h
                    });
                    if fits {
                        let area = tile.area() as u32;
                        gap_table[cell * tile_count + tile.index] = area;
                        total += u64::from(area);
                    }
                }
                max_area_table[cell] = total;
            }
        }

        let mut column_table = vec![0u32; rows * tile_count];
        for h in 0..=max_height {
            for tile in tiles {
                let reach = [tile.width, tile.height]
                    .into_iter()
                    .filter(|&side| side <= h)
                    .max()
                    .unwrap_or(0);
                column_table[h as usize * tile_count + tile.index] = reach as u32;
            }
        }

        Self {
            max_width,
            max_height,
            tile_count,
            gap_table,
            max_area_table,
            column_table,
        }
    }

    fn cell(&self, width: i32, height: i32) -> usize {
        let w = width.clamp(0, self.max_width) as usize;
        let h = height.clamp(0, self.max_height) as usize;
        w * (self.max_height as usize + 1) + h
    }

    /// Area tile `index` contributes to a `width x height` box (0 if it cannot fit).
    pub fn gap_area(&self, width: i32, height: i32, index: usize) -> u64 {
        u64::from(self.gap_table[self.cell(width, height) * self.tile_count + index])
    }

    /// Total area all tiles together could contribute to a `width x height` box.
    pub fn max_area(&self, width: i32, height: i32) -> u64 {
        self.max_area_table[self.cell(width, height)]
    }

    /// Area still available for the box once the `placed` tiles are taken out.
    pub fn available_area(
        &self,
        width: i32,
        height: i32,
        placed: impl IntoIterator<Item = usize>,
    ) -> u64 {
        let consumed: u64 = placed
            .into_iter()
            .map(|index| self.gap_area(width, height, index))
            .sum();
        self.max_area(width, height) - consumed
    }

    /// Tallest column stretch tile `index` can cover without exceeding `height`.
    pub fn column_reach(&self, height: i32, index: usize) -> i32 {
        let h = height.clamp(0, self.max_height) as usize;
        self.column_table[h * self.tile_count + index] as i32
    }

    pub const fn tile_count(&self) -> usize {
        self.tile_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::Coord;

    fn tiles() -> Vec<Tile> {
        [(2, 1), (3, 2), (4, 3)]
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| Tile::new(i, Coord::new(w, h)))
            .collect()
    }

    #[test]
    fn test_gap_table_accepts_either_orientation() {
        let tables = PruningTables::new(5, 4, &tiles());
        assert_eq!(tables.gap_area(1, 2, 0), 2);
        assert_eq!(tables.gap_area(2, 3, 1), 6);
        assert_eq!(tables.gap_area(2, 4, 2), 0);
        assert_eq!(tables.gap_area(3, 4, 2), 12);
    }

    #[test]
    fn test_max_area_sums_fitting_tiles() {
        let tables = PruningTables::new(5, 4, &tiles());
        assert_eq!(tables.max_area(5, 4), 20);
        assert_eq!(tables.max_area(2, 4), 8);
        assert_eq!(tables.max_area(1, 1), 0);
        assert_eq!(tables.available_area(2, 4, [1]), 2);
    }

    #[test]
    fn test_box_larger_than_window_is_clamped() {
        let tables = PruningTables::new(5, 4, &tiles());
        assert_eq!(tables.max_area(50, 40), tables.max_area(5, 4));
    }

    #[test]
    fn test_column_reach_uses_tallest_fitting_side() {
        let tables = PruningTables::new(5, 4, &tiles());
        assert_eq!(tables.column_reach(4, 2), 4);
        assert_eq!(tables.column_reach(3, 2), 3);
        assert_eq!(tables.column_reach(1, 1), 0);
        assert_eq!(tables.column_reach(2, 0), 2);
    }
}
