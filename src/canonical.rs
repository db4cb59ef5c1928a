//! Canonical form of completed tilings.
//!
//! A tiling and its three mirror images describe the same solution, and so
//! do tilings that only permute tiles of identical shape. The canonical form
//! picks one representative: among the mirror images whose bottom-left tile
//! ranks highest of all corner tiles, identical tiles are renumbered in
//! sorted position order and the smallest resulting position list wins.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Corner, Flip, Rect};
use crate::tile::{Coord, Tile};

/// Final position of one tile in a solution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePosition {
    #[serde(rename = "X")]
    pub x: i32,
    #[serde(rename = "Y")]
    pub y: i32,
    #[serde(rename = "T")]
    pub turned: bool,
}

/// A tiling as one position per tile, in input order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Solution(Vec<TilePosition>);

impl Solution {
    /// Builds a solution from tile rectangles given in input order.
    pub fn from_rects(rects: &[Rect], tile_sizes: &[Coord]) -> Self {
        Self(
            rects
                .iter()
                .zip(tile_sizes)
                .map(|(rect, &size)| TilePosition {
                    x: rect.x,
                    y: rect.y,
                    turned: rect.dims() != size,
                })
                .collect(),
        )
    }

    pub fn positions(&self) -> &[TilePosition] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tile rectangles in input order.
    pub fn rects(&self, tile_sizes: &[Coord]) -> Vec<Rect> {
        self.0
            .iter()
            .zip(tile_sizes)
            .map(|(pos, &size)| {
                let dims = if pos.turned { size.transposed() } else { size };
                Rect::new(pos.x, pos.y, dims.x, dims.y)
            })
            .collect()
    }

    /// Stable string form used as the storage key: `[{"X":..,"Y":..,"T":..},..]`.
    pub fn key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Text picture of the tiling, top row first.
    pub fn render(&self, board: Coord, tile_sizes: &[Coord]) -> String {
        render(board, &self.rects(tile_sizes))
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Draws the rectangles on a `board` sized grid, top row first.
///
/// Cells show the 1-based tile number (letters from 10 on), `.` when empty.
pub fn render(board: Coord, rects: &[Rect]) -> String {
    let width = board.x.max(0) as usize;
    let height = board.y.max(0) as usize;
    let mut grid = vec![b'.'; width * height];
    for (index, rect) in rects.iter().enumerate() {
        let number = index + 1;
        let symbol = match number {
            1..=9 => b'0' + number as u8,
            10..=35 => b'A' + (number - 10) as u8,
            _ => b'#',
        };
        for y in rect.y.max(0)..rect.top().min(board.y) {
            for x in rect.x.max(0)..rect.right().min(board.x) {
                grid[y as usize * width + x as usize] = symbol;
            }
        }
    }

    grid.chunks(width.max(1))
        .rev()
        .map(|row| String::from_utf8_lossy(row).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Canonicalization context for one board and tile list.
#[derive(Clone, Debug)]
pub struct Canonicalizer {
    board: Coord,
    tile_sizes: Vec<Coord>,
    ranks: Vec<(i64, i32)>,
    /// Groups of two or more interchangeable tiles, indices ascending.
    groups: Vec<Vec<usize>>,
}

impl Canonicalizer {
    pub fn new(board: Coord, tile_sizes: &[Coord]) -> Self {
        let tiles: Vec<Tile> = tile_sizes
            .iter()
            .enumerate()
            .map(|(index, &size)| Tile::new(index, size))
            .collect();

        let mut groups: Vec<Vec<usize>> = Vec::new();
        for tile in &tiles {
            match groups.iter_mut().find(|group| tiles[group[0]].same_shape(tile)) {
                Some(group) => group.push(tile.index),
                None => groups.push(vec![tile.index]),
            }
        }
        groups.retain(|group| group.len() > 1);

        Self {
            board,
            tile_sizes: tile_sizes.to_vec(),
            ranks: tiles.iter().map(Tile::rank).collect(),
            groups,
        }
    }

    pub const fn board(&self) -> Coord {
        self.board
    }

    pub fn tile_sizes(&self) -> &[Coord] {
        &self.tile_sizes
    }

    /// Canonical form of a complete tiling given as rectangles in input order.
    pub fn canonicalize(&self, layout: &[Rect]) -> Solution {
        let best = Corner::ALL
            .into_iter()
            .filter_map(|corner| self.owner(layout, corner))
            .map(|index| self.ranks[index])
            .max();

        Flip::ALL
            .into_iter()
            .filter_map(|flip| {
                let mut image: Vec<Rect> =
                    layout.iter().map(|rect| rect.flipped(self.board, flip)).collect();
                let anchor = self.owner(&image, Corner::BottomLeft)?;
                if Some(self.ranks[anchor]) != best {
                    return None;
                }
                self.sort_groups(&mut image);
                Some(Solution::from_rects(&image, &self.tile_sizes))
            })
            .min()
            .unwrap_or_else(|| Solution::from_rects(layout, &self.tile_sizes))
    }

    /// Canonical form of a solution recorded on the transposed board.
    pub fn canonicalize_transposed(&self, solution: &Solution) -> Solution {
        let layout: Vec<Rect> = solution
            .rects(&self.tile_sizes)
            .iter()
            .map(Rect::transposed)
            .collect();
        self.canonicalize(&layout)
    }

    fn owner(&self, layout: &[Rect], corner: Corner) -> Option<usize> {
        let cell = corner.cell(self.board);
        layout.iter().position(|rect| rect.contains(cell))
    }

    fn sort_groups(&self, image: &mut [Rect]) {
        for group in &self.groups {
            let mut rects: Vec<Rect> = group.iter().map(|&index| image[index]).collect();
            rects.sort_unstable();
            for (&index, rect) in group.iter().zip(rects) {
                image[index] = rect;
            }
        }
    }
}
