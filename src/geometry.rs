//! Rectangle geometry and the board's mirror symmetries.
//!
//! A rectangular board has four mirror images under horizontal and vertical
//! flips. These are the only symmetries used for deduplication; quarter turns
//! are handled separately by transposing the whole puzzle.

use crate::tile::Coord;

/// An axis-aligned rectangle of cells: `x..x + width` by `y..y + height`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn origin(&self) -> Coord {
        Coord::new(self.x, self.y)
    }

    pub const fn dims(&self) -> Coord {
        Coord::new(self.width, self.height)
    }

    /// First column past the right edge.
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// First row past the top edge.
    pub const fn top(&self) -> i32 {
        self.y + self.height
    }

    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub const fn contains(&self, point: Coord) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.top()
    }

    pub const fn overlaps(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.top()
            && other.y < self.top()
    }

    /// Whether the rectangle lies completely inside a board of `size`.
    pub const fn fits_within(&self, size: Coord) -> bool {
        self.x >= 0 && self.y >= 0 && self.right() <= size.x && self.top() <= size.y
    }

    /// Grows the rectangle by one cell on every side.
    pub const fn expanded(&self) -> Self {
        Self::new(self.x - 1, self.y - 1, self.width + 2, self.height + 2)
    }

    /// Whether `other`'s top side coincides exactly with this rectangle's bottom side.
    pub const fn rests_on(&self, other: &Self) -> bool {
        other.top() == self.y && other.x == self.x && other.width == self.width
    }

    /// Whether `other`'s right side coincides exactly with this rectangle's left side.
    pub const fn leans_on(&self, other: &Self) -> bool {
        other.right() == self.x && other.y == self.y && other.height == self.height
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.top().max(other.top()) - y,
        )
    }

    pub const fn transposed(&self) -> Self {
        Self::new(self.y, self.x, self.height, self.width)
    }

    /// Mirror image of the rectangle on a board of `size`.
    pub const fn flipped(&self, size: Coord, flip: Flip) -> Self {
        let x = if flip.horizontal() {
            size.x - self.x - self.width
        } else {
            self.x
        };
        let y = if flip.vertical() {
            size.y - self.y - self.height
        } else {
            self.y
        };
        Self::new(x, y, self.width, self.height)
    }

    /// Board corners covered by this rectangle.
    pub fn corners(&self, size: Coord) -> impl Iterator<Item = Corner> + '_ {
        Corner::ALL
            .into_iter()
            .filter(move |corner| self.contains(corner.cell(size)))
    }

    pub fn touches_corner(&self, size: Coord) -> bool {
        self.corners(size).next().is_some()
    }
}

/// One of the four corner cells of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}

impl Corner {
    pub const ALL: [Self; 4] = [
        Self::BottomLeft,
        Self::BottomRight,
        Self::TopLeft,
        Self::TopRight,
    ];

    /// The cell occupying this corner on a board of `size`.
    pub const fn cell(self, size: Coord) -> Coord {
        match self {
            Self::BottomLeft => Coord::new(0, 0),
            Self::BottomRight => Coord::new(size.x - 1, 0),
            Self::TopLeft => Coord::new(0, size.y - 1),
            Self::TopRight => Coord::new(size.x - 1, size.y - 1),
        }
    }
}

/// A mirror symmetry of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Flip {
    None,
    Horizontal,
    Vertical,
    Both,
}

impl Flip {
    pub const ALL: [Self; 4] = [Self::None, Self::Horizontal, Self::Vertical, Self::Both];

    /// Whether x is mirrored.
    pub const fn horizontal(self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }

    /// Whether y is mirrored.
    pub const fn vertical(self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }

    /// The flip that moves `corner` to the bottom-left.
    pub const fn to_bottom_left(corner: Corner) -> Self {
        match corner {
            Corner::BottomLeft => Self::None,
            Corner::BottomRight => Self::Horizontal,
            Corner::TopLeft => Self::Vertical,
            Corner::TopRight => Self::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_excludes_shared_edges() {
        let a = Rect::new(0, 0, 2, 2);
        assert!(!a.overlaps(&Rect::new(2, 0, 1, 1)));
        assert!(!a.overlaps(&Rect::new(0, 2, 3, 1)));
        assert!(a.overlaps(&Rect::new(1, 1, 5, 5)));
    }

    #[test]
    fn test_flips_are_involutions() {
        let size = Coord::new(7, 5);
        let rect = Rect::new(1, 2, 3, 2);
        for flip in Flip::ALL {
            assert_eq!(rect.flipped(size, flip).flipped(size, flip), rect, "{flip:?}");
            assert!(rect.flipped(size, flip).fits_within(size));
        }
    }

    #[test]
    fn test_flip_moves_corner_to_bottom_left() {
        let size = Coord::new(6, 4);
        for corner in Corner::ALL {
            let cell = corner.cell(size);
            let rect = Rect::new(cell.x, cell.y, 1, 1);
            let moved = rect.flipped(size, Flip::to_bottom_left(corner));
            assert_eq!(moved.origin(), Coord::new(0, 0), "{corner:?}");
        }
    }

    #[test]
    fn test_full_width_strip_covers_two_corners() {
        let size = Coord::new(5, 4);
        let strip = Rect::new(0, 0, 5, 1);
        let corners: Vec<Corner> = strip.corners(size).collect();
        assert_eq!(corners, vec![Corner::BottomLeft, Corner::BottomRight]);
    }

    #[test]
    fn test_side_contact_requires_exact_match() {
        let lower = Rect::new(2, 0, 3, 2);
        assert!(Rect::new(2, 2, 3, 4).rests_on(&lower));
        assert!(!Rect::new(2, 2, 2, 4).rests_on(&lower));
        let left = Rect::new(0, 1, 2, 3);
        assert!(Rect::new(2, 1, 5, 3).leans_on(&left));
        assert!(!Rect::new(2, 0, 5, 3).leans_on(&left));
        assert_eq!(lower.union(&Rect::new(2, 2, 3, 4)), Rect::new(2, 0, 3, 6));
    }
}
