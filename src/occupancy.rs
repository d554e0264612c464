use core::fmt;

use crate::error::{Endpoint, Error, Result};
use crate::position::Position;

/// Persisted description of a square map: per-cell blocked flags plus the designated start and
/// end. A search only ever sees an immutable snapshot of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyMap {
    size: usize,
    blocked: Vec<bool>,
    start: Position,
    end: Position,
}

impl OccupancyMap {
    /// An obstacle-free map of `size × size` cells.
    pub fn new(size: usize, start: Position, end: Position) -> OccupancyMap {
        OccupancyMap {
            size,
            blocked: vec![false; size * size],
            start,
            end,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }
    pub fn start(&self) -> Position {
        self.start
    }
    pub fn end(&self) -> Position {
        self.end
    }
    pub fn set_start(&mut self, start: Position) {
        self.start = start;
    }
    pub fn set_end(&mut self, end: Position) {
        self.end = end;
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.size && (pos.y as usize) < self.size
    }

    fn ix(&self, pos: Position) -> usize {
        pos.x as usize * self.size + pos.y as usize
    }

    /// Cells outside the map count as blocked.
    pub fn is_blocked(&self, pos: Position) -> bool {
        !self.in_bounds(pos) || self.blocked[self.ix(pos)]
    }

    pub fn is_passable(&self, pos: Position) -> bool {
        !self.is_blocked(pos)
    }

    pub fn set_blocked(&mut self, pos: Position, blocked: bool) -> Result<()> {
        if !self.in_bounds(pos) {
            return Err(Error::OutOfBounds(pos));
        }
        let ix = self.ix(pos);
        self.blocked[ix] = blocked;
        Ok(())
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|b| **b).count()
    }

    /// Row-major iterator over every coordinate of the map.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let n = self.size as i32;
        (0..n).flat_map(move |x| (0..n).map(move |y| Position::new(x, y)))
    }

    /// Checks the precondition every search relies on: both endpoints inside the map and on
    /// passable cells.
    pub fn validate_endpoints(&self) -> Result<()> {
        for (which, position) in [(Endpoint::Start, self.start), (Endpoint::End, self.end)] {
            if !self.in_bounds(position) {
                return Err(Error::EndpointOutOfBounds { which, position });
            }
            if self.is_blocked(position) {
                return Err(Error::EndpointBlocked { which, position });
            }
        }
        Ok(())
    }
}

impl fmt::Display for OccupancyMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for x in 0..self.size as i32 {
            let row: String = (0..self.size as i32)
                .map(|y| if self.is_blocked(Position::new(x, y)) { '1' } else { '0' })
                .collect();
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
