use core::fmt;

use crate::cell::{Cell, CellTag};
use crate::error::{Error, Result};
use crate::event::{Action, VisualizationEvent};
use crate::occupancy::OccupancyMap;
use crate::position::Position;

/// The consumer's view of the map: one [Cell] per location, row-major.
///
/// Only the consumer mutates a [Grid]. A running search never touches it and reaches it only
/// through [VisualizationEvent]s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Cell>,
    rows: usize,
    cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Grid {
        Grid {
            cells: vec![Cell::new(CellTag::Free); rows * cols],
            rows,
            cols,
        }
    }

    /// Loads terrain from `map` and marks its start and end. A wall under an endpoint is
    /// cleared first, so endpoints always show.
    pub fn build(map: &OccupancyMap) -> Result<Grid> {
        let mut grid = Grid::new(map.size(), map.size());
        for pos in map.positions() {
            if map.is_blocked(pos) {
                grid.push(pos, CellTag::Wall)?;
            }
        }
        for endpoint in [map.start(), map.end()] {
            grid.pop(endpoint, CellTag::Wall)?;
            grid.push(endpoint, CellTag::Endpoint)?;
        }
        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.rows && (y as usize) < self.cols
    }

    fn ix(&self, pos: Position) -> Result<usize> {
        if self.is_valid(pos.x, pos.y) {
            Ok(pos.x as usize * self.cols + pos.y as usize)
        } else {
            Err(Error::OutOfBounds(pos))
        }
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.ix(pos).ok().map(|ix| &self.cells[ix])
    }

    pub fn top(&self, pos: Position) -> Result<CellTag> {
        let ix = self.ix(pos)?;
        Ok(self.cells[ix].top())
    }

    pub fn push(&mut self, pos: Position, tag: CellTag) -> Result<()> {
        let ix = self.ix(pos)?;
        self.cells[ix].push(tag);
        Ok(())
    }

    pub fn pop(&mut self, pos: Position, tag: CellTag) -> Result<()> {
        let ix = self.ix(pos)?;
        self.cells[ix].pop_while_top_equals(tag);
        Ok(())
    }

    /// Executes a `Push` or `Pop` on the addressed cell. Lock signals are left to the consumer.
    pub fn apply(&mut self, event: &VisualizationEvent) -> Result<()> {
        match (event.action, event.tag) {
            (Action::Push, Some(tag)) => self.push(event.position(), tag),
            (Action::Pop, Some(tag)) => self.pop(event.position(), tag),
            _ => Ok(()),
        }
    }

    /// Builds a fresh map with `base`'s size and endpoints, reading every blocked flag from the
    /// terrain layer of the cell even when an overlay sits on top.
    pub fn extract_occupancy(&self, base: &OccupancyMap) -> Result<OccupancyMap> {
        let mut map = base.clone();
        for pos in base.positions() {
            let terrain = self.cell(pos).ok_or(Error::OutOfBounds(pos))?.terrain();
            map.set_blocked(pos, terrain == CellTag::Wall)?;
        }
        Ok(map)
    }

    /// Like [extract_occupancy](Self::extract_occupancy), but only cells whose top tag is
    /// terrain are written; a cell showing an overlay keeps the value it has in `base`.
    pub fn extract_occupancy_top_only(&self, base: &OccupancyMap) -> Result<OccupancyMap> {
        let mut map = base.clone();
        for pos in base.positions() {
            match self.top(pos)? {
                CellTag::Free => map.set_blocked(pos, false)?,
                CellTag::Wall => map.set_blocked(pos, true)?,
                _ => {}
            }
        }
        Ok(map)
    }

    /// Strips frontier and visited overlays left by a finished search.
    pub fn clear_search_marks(&mut self) {
        for cell in self.cells.iter_mut() {
            while cell.top().is_search_mark() && cell.depth() > 1 {
                let top = cell.top();
                cell.pop_while_top_equals(top);
            }
        }
    }

    pub fn count_top(&self, tag: CellTag) -> usize {
        self.cells.iter().filter(|c| c.top() == tag).count()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.cells.chunks(self.cols.max(1)) {
            let line = row.iter().map(|c| c.top().symbol()).collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
