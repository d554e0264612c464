use core::fmt;
use smallvec::SmallVec;

use crate::N_SMALLVEC_SIZE;

/// Grid coordinate. `x` is the row and `y` the column, matching the row-major layout of
/// [OccupancyMap](crate::occupancy::OccupancyMap) and [Grid](crate::grid::Grid).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Orthogonal offsets in the order N, E, S, W.
const NEUMANN_OFFSETS: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];
/// All eight offsets clockwise, starting at N.
const MOORE_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

impl Position {
    pub const fn new(x: i32, y: i32) -> Position {
        Position { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }

    pub fn neumann_neighborhood(&self) -> SmallVec<[Position; N_SMALLVEC_SIZE]> {
        NEUMANN_OFFSETS
            .iter()
            .map(|&(dx, dy)| self.offset(dx, dy))
            .collect()
    }

    pub fn moore_neighborhood(&self) -> SmallVec<[Position; N_SMALLVEC_SIZE]> {
        MOORE_OFFSETS
            .iter()
            .map(|&(dx, dy)| self.offset(dx, dy))
            .collect()
    }

    pub fn manhattan_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// True if `other` is one diagonal step away.
    pub fn is_diagonal_to(&self, other: &Position) -> bool {
        (self.x - other.x).abs() == 1 && (self.y - other.y).abs() == 1
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Position::new(x, y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
