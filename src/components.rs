use log::info;
use petgraph::unionfind::UnionFind;

use crate::config::SearchConfig;
use crate::occupancy::OccupancyMap;
use crate::position::Position;
use crate::search::can_step;

/// Connected components of the passable cells of an [OccupancyMap], under the same movement
/// rules a search with the given [SearchConfig] uses.
#[derive(Clone, Debug)]
pub struct Connectivity {
    size: usize,
    components: UnionFind<usize>,
}

impl Connectivity {
    /// Links every passable cell to its passable successors with a [UnionFind].
    pub fn generate(map: &OccupancyMap, config: &SearchConfig) -> Connectivity {
        let size = map.size();
        let mut components = UnionFind::new(size * size);
        for point in map.positions().filter(|p| map.is_passable(*p)) {
            let parent_ix = ix(size, point);
            // Looking forward is enough: every edge is seen from one of its two ends
            let forward = if config.allow_diagonal_move {
                vec![
                    point.offset(0, 1),
                    point.offset(1, -1),
                    point.offset(1, 0),
                    point.offset(1, 1),
                ]
            } else {
                vec![point.offset(0, 1), point.offset(1, 0)]
            };
            forward
                .into_iter()
                .filter(|p| can_step(map, config, point, *p))
                .for_each(|p| {
                    components.union(parent_ix, ix(size, p));
                });
        }
        Connectivity { size, components }
    }

    /// Retrieves the component id a given [Position] belongs to.
    pub fn component(&self, pos: &Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| self.components.find(ix(self.size, *pos)))
    }

    /// Checks if start and goal are on the same component.
    pub fn reachable(&self, start: &Position, goal: &Position) -> bool {
        !self.unreachable(start, goal)
    }

    /// Checks if start and goal are not on the same component.
    pub fn unreachable(&self, start: &Position, goal: &Position) -> bool {
        if self.in_bounds(start) && self.in_bounds(goal) {
            let equiv = self
                .components
                .equiv(ix(self.size, *start), ix(self.size, *goal));
            if !equiv {
                info!("{} and {} are on different components", start, goal);
            }
            !equiv
        } else {
            true
        }
    }

    fn in_bounds(&self, pos: &Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.size && (pos.y as usize) < self.size
    }
}

fn ix(size: usize, pos: Position) -> usize {
    pos.x as usize * size + pos.y as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests whether points are correctly mapped to different connected components
    #[test]
    fn test_component_generation() {
        // Corresponds to the following 3x3 grid:
        //  ___
        // | # |
        // | # |
        // | # |
        //  ___
        let mut map = OccupancyMap::new(3, Position::new(0, 0), Position::new(0, 2));
        for x in 0..3 {
            map.set_blocked(Position::new(x, 1), true).unwrap();
        }
        let conn = Connectivity::generate(&map, &SearchConfig::eight_connected());
        assert!(conn.unreachable(&Position::new(0, 0), &Position::new(0, 2)));
        assert!(conn.reachable(&Position::new(0, 0), &Position::new(2, 0)));
        assert!(conn.unreachable(&Position::new(0, 0), &Position::new(5, 0)));
        assert!(conn.component(&Position::new(5, 0)).is_none());
    }

    // Tests whether allowing diagonals has the expected effect on diagonal reachability in a minimal setting.
    #[test]
    fn test_diagonal_switch_reachable() {
        //  __
        // | #|
        // |# |
        //  __
        let mut map = OccupancyMap::new(2, Position::new(0, 0), Position::new(1, 1));
        map.set_blocked(Position::new(0, 1), true).unwrap();
        map.set_blocked(Position::new(1, 0), true).unwrap();
        let start = map.start();
        let end = map.end();

        let four = Connectivity::generate(&map, &SearchConfig::four_connected());
        assert!(four.unreachable(&start, &end));

        let eight = Connectivity::generate(&map, &SearchConfig::eight_connected());
        assert!(eight.unreachable(&start, &end));

        let cutting = SearchConfig {
            allow_corner_cutting: true,
            ..SearchConfig::eight_connected()
        };
        let eight_cutting = Connectivity::generate(&map, &cutting);
        assert!(eight_cutting.reachable(&start, &end));
    }

    /// Asserts that the two corners are connected on a 4-grid around a central wall.
    #[test]
    fn reachable_without_diagonals() {
        // |S  |
        // | # |
        // |  G|
        let mut map = OccupancyMap::new(3, Position::new(0, 0), Position::new(2, 2));
        map.set_blocked(Position::new(1, 1), true).unwrap();
        let conn = Connectivity::generate(&map, &SearchConfig::four_connected());
        assert!(conn.reachable(&map.start(), &map.end()));
    }
}
