//! Tile definitions and coordinate types.
//!
//! A tile is an axis-aligned rectangle with fixed side lengths. During a
//! search it is placed at a board position in one of two orientations and
//! removed again on backtrack.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// An integer 2D vector used for board sizes, tile sizes and positions.
///
/// `x` grows to the right and `y` grows upwards; `(0, 0)` is the bottom-left
/// cell of the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    #[serde(rename = "X")]
    pub x: i32,
    #[serde(rename = "Y")]
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Mirrors the vector through the `x = y` diagonal.
    pub const fn transposed(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }

    pub const fn area(self) -> i64 {
        self.x as i64 * self.y as i64
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// How a tile is laid on the board.
///
/// Serialized as a bool (`true` means turned) to match the checkpoint wire format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum Orientation {
    /// Width along x, height along y.
    #[default]
    Normal,
    /// Rotated a quarter turn: width and height are swapped.
    Turned,
}

impl Orientation {
    pub const fn is_turned(self) -> bool {
        matches!(self, Self::Turned)
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Turned,
            Self::Turned => Self::Normal,
        }
    }
}

impl From<bool> for Orientation {
    fn from(turned: bool) -> Self {
        if turned {
            Self::Turned
        } else {
            Self::Normal
        }
    }
}

impl From<Orientation> for bool {
    fn from(orientation: Orientation) -> Self {
        orientation.is_turned()
    }
}

/// One entry of a start or stop checkpoint: which tile went down, and how.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePlacement {
    #[serde(rename = "Idx")]
    pub tile_index: usize,
    #[serde(rename = "Rot")]
    pub orientation: Orientation,
}

impl TilePlacement {
    pub const fn new(tile_index: usize, orientation: Orientation) -> Self {
        Self {
            tile_index,
            orientation,
        }
    }

    /// Depth-first ordering key: lower index first, normal before turned.
    pub const fn order_key(&self) -> (usize, bool) {
        (self.tile_index, self.orientation.is_turned())
    }
}

/// A puzzle piece: static size and identity plus its current placement.
#[derive(Clone, Debug)]
pub struct Tile {
    pub width: i32,
    pub height: i32,
    pub index: usize,
    x: i32,
    y: i32,
    orientation: Orientation,
    placed: bool,
}

impl Tile {
    pub const fn new(index: usize, size: Coord) -> Self {
        Self {
            width: size.x,
            height: size.y,
            index,
            x: 0,
            y: 0,
            orientation: Orientation::Normal,
            placed: false,
        }
    }

    pub const fn size(&self) -> Coord {
        Coord::new(self.width, self.height)
    }

    /// Extent of the tile when laid in `orientation`.
    pub const fn dims(&self, orientation: Orientation) -> Coord {
        match orientation {
            Orientation::Normal => Coord::new(self.width, self.height),
            Orientation::Turned => Coord::new(self.height, self.width),
        }
    }

    pub const fn current_width(&self) -> i32 {
        self.dims(self.orientation).x
    }

    pub const fn current_height(&self) -> i32 {
        self.dims(self.orientation).y
    }

    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub const fn is_square(&self) -> bool {
        self.width == self.height
    }

    pub const fn is_placed(&self) -> bool {
        self.placed
    }

    pub const fn longer_side(&self) -> i32 {
        if self.width > self.height {
            self.width
        } else {
            self.height
        }
    }

    pub const fn shorter_side(&self) -> i32 {
        if self.width < self.height {
            self.width
        } else {
            self.height
        }
    }

    /// Size ranking used for corner ordering and canonicalization.
    ///
    /// Two tiles rank equal exactly when they have the same shape.
    pub const fn rank(&self) -> (i64, i32) {
        (self.area(), self.longer_side())
    }

    /// Whether the two tiles are interchangeable (same sides, either orientation).
    pub const fn same_shape(&self, other: &Self) -> bool {
        self.shorter_side() == other.shorter_side() && self.longer_side() == other.longer_side()
    }

    /// Orientation that gives this tile the extent `dims`, if any.
    pub fn orientation_for(&self, dims: Coord) -> Option<Orientation> {
        if dims == self.dims(Orientation::Normal) {
            Some(Orientation::Normal)
        } else if dims == self.dims(Orientation::Turned) {
            Some(Orientation::Turned)
        } else {
            None
        }
    }

    pub fn position(&self) -> Option<Coord> {
        self.placed.then_some(Coord::new(self.x, self.y))
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.placed.then_some(self.orientation)
    }

    /// Rectangle covered by the tile, if it is on the board.
    pub fn rect(&self) -> Option<Rect> {
        self.placed.then(|| self.rect_at(Coord::new(self.x, self.y), self.orientation))
    }

    /// Rectangle the tile would cover if laid at `pos` in `orientation`.
    pub const fn rect_at(&self, pos: Coord, orientation: Orientation) -> Rect {
        let dims = self.dims(orientation);
        Rect::new(pos.x, pos.y, dims.x, dims.y)
    }

    pub(crate) fn place(&mut self, pos: Coord, orientation: Orientation) {
        debug_assert!(!self.placed, "tile {} placed twice", self.index);
        self.x = pos.x;
        self.y = pos.y;
        self.orientation = orientation;
        self.placed = true;
    }

    pub(crate) fn remove(&mut self) {
        debug_assert!(self.placed, "tile {} removed while not placed", self.index);
        self.placed = false;
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile {} ({}x{})", self.index, self.width, self.height)?;
        if let Some(pos) = self.position() {
            write!(f, " at ({}, {}) {:?}", pos.x, pos.y, self.orientation)?;
        }
        Ok(())
    }
}

/// Tile sizes of the "almost square" family: `(k + 1) x k` for `k = n..=1`.
///
/// Listed largest first, the order the batch pipeline uses.
pub fn almost_square_tiles(n: i32) -> Vec<Coord> {
    (1..=n).rev().map(|k| Coord::new(k + 1, k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turned_tile_swaps_current_dims() {
        let mut tile = Tile::new(0, Coord::new(3, 2));
        tile.place(Coord::new(1, 1), Orientation::Turned);
        assert_eq!(tile.current_width(), 2);
        assert_eq!(tile.current_height(), 3);
        assert_eq!(tile.rect(), Some(Rect::new(1, 1, 2, 3)));
    }

    #[test]
    fn test_unplaced_tile_hides_position() {
        let mut tile = Tile::new(2, Coord::new(4, 1));
        assert_eq!(tile.position(), None);
        tile.place(Coord::new(0, 3), Orientation::Normal);
        assert_eq!(tile.position(), Some(Coord::new(0, 3)));
        tile.remove();
        assert_eq!(tile.position(), None);
        assert_eq!(tile.orientation(), None);
    }

    #[test]
    fn test_same_shape_ignores_orientation() {
        let a = Tile::new(0, Coord::new(2, 3));
        let b = Tile::new(1, Coord::new(3, 2));
        let c = Tile::new(2, Coord::new(1, 6));
        assert!(a.same_shape(&b));
        assert_eq!(a.rank(), b.rank());
        assert!(!a.same_shape(&c));
        assert!(c.rank() > a.rank());
    }

    #[test]
    fn test_placement_wire_format() {
        let placement = TilePlacement::new(3, Orientation::Turned);
        let json = serde_json::to_string(&placement).unwrap();
        assert_eq!(json, r#"{"Idx":3,"Rot":true}"#);
        let back: TilePlacement = serde_json::from_str(r#"{"Idx":1,"Rot":false}"#).unwrap();
        assert_eq!(back, TilePlacement::new(1, Orientation::Normal));
    }

    #[test]
    fn test_almost_square_tiles_fill_expected_area() {
        let tiles = almost_square_tiles(8);
        assert_eq!(tiles.first(), Some(&Coord::new(9, 8)));
        assert_eq!(tiles.last(), Some(&Coord::new(2, 1)));
        let area: i64 = tiles.iter().map(|t| t.area()).sum();
        assert_eq!(area, 15 * 16);
    }
}
