//! This module implements a variant of
//! [pathfinding's astar function](https://docs.rs/pathfinding/latest/pathfinding/directed/astar/index.html)
//! that reports every discovery and expansion to an observer, so the search can be replayed,
//! and that can be cancelled between expansions.
use fxhash::FxBuildHasher;
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use num_traits::Zero;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;

struct SmallestCostHolder<K> {
    estimated_cost: K,
    cost: K,
    index: usize,
}

impl<K: PartialEq> Eq for SmallestCostHolder<K> {}

impl<K: PartialEq> PartialEq for SmallestCostHolder<K> {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_cost.eq(&other.estimated_cost)
            && self.cost.eq(&other.cost)
            && self.index == other.index
    }
}

impl<K: Ord> PartialOrd for SmallestCostHolder<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for SmallestCostHolder<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lowest estimated cost first. Among equals the larger cost wins, which is the
        // smaller heuristic, and after that the node discovered first.
        match other.estimated_cost.cmp(&self.estimated_cost) {
            Ordering::Equal => match self.cost.cmp(&other.cost) {
                Ordering::Equal => other.index.cmp(&self.index),
                s => s,
            },
            s => s,
        }
    }
}

struct Node<C> {
    parent: usize,
    cost: C,
    closed: bool,
}

/// What the observer of [astar_observed] is told about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step<'a, N> {
    /// The node entered the open set for the first time.
    Discovered(&'a N),
    /// The node left the open set and is being expanded.
    Expanded(&'a N),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AstarResult<N, C> {
    Found(Vec<N>, C),
    /// The open set ran empty without reaching a goal.
    Exhausted,
    Cancelled,
}

fn reverse_path<N, C>(nodes: &FxIndexMap<N, Node<C>>, start: usize) -> Vec<N>
where
    N: Eq + Hash + Clone,
{
    let mut path: Vec<N> = std::iter::successors(nodes.get_index(start), |(_, node)| {
        nodes.get_index(node.parent)
    })
    .map(|(n, _)| n.clone())
    .collect();
    path.reverse();
    path
}

/// Best-first search from `start` ordered by `cost + heuristic`.
///
/// Every node is reported once as [Step::Discovered] when it first enters the open set and at
/// most once as [Step::Expanded]. Nodes are never reopened once expanded, so `heuristic` has to
/// be consistent for the result to be optimal. `cancelled` is polled once per iteration.
pub fn astar_observed<N, C, FN, IN, FH, FS, FO, FC>(
    start: &N,
    mut successors: FN,
    mut heuristic: FH,
    mut success: FS,
    mut observe: FO,
    mut cancelled: FC,
) -> AstarResult<N, C>
where
    N: Eq + Hash + Clone,
    C: Zero + Ord + Copy,
    FN: FnMut(&N) -> IN,
    IN: IntoIterator<Item = (N, C)>,
    FH: FnMut(&N) -> C,
    FS: FnMut(&N) -> bool,
    FO: FnMut(Step<'_, N>),
    FC: FnMut() -> bool,
{
    let mut to_see = BinaryHeap::new();
    to_see.push(SmallestCostHolder {
        estimated_cost: heuristic(start),
        cost: Zero::zero(),
        index: 0,
    });
    let mut nodes: FxIndexMap<N, Node<C>> = FxIndexMap::default();
    nodes.insert(
        start.clone(),
        Node {
            parent: usize::MAX,
            cost: Zero::zero(),
            closed: false,
        },
    );
    observe(Step::Discovered(start));
    while let Some(SmallestCostHolder { cost, index, .. }) = to_see.pop() {
        if cancelled() {
            return AstarResult::Cancelled;
        }
        let successors = {
            let Some((node, entry)) = nodes.get_index(index) else {
                continue;
            };
            // A node may sit in the heap several times if a cheaper way to it was found.
            // Only the entry matching its best cost is expanded, and only once.
            if entry.closed || cost > entry.cost {
                continue;
            }
            observe(Step::Expanded(node));
            if success(node) {
                let path = reverse_path(&nodes, index);
                return AstarResult::Found(path, cost);
            }
            successors(node)
        };
        if let Some((_, entry)) = nodes.get_index_mut(index) {
            entry.closed = true;
        }
        for (successor, move_cost) in successors {
            let new_cost = cost + move_cost;
            let h; // heuristic(&successor)
            let n; // index for successor
            match nodes.entry(successor) {
                Vacant(e) => {
                    h = heuristic(e.key());
                    n = e.index();
                    observe(Step::Discovered(e.key()));
                    e.insert(Node {
                        parent: index,
                        cost: new_cost,
                        closed: false,
                    });
                }
                Occupied(mut e) => {
                    if e.get().closed || e.get().cost <= new_cost {
                        continue;
                    }
                    h = heuristic(e.key());
                    n = e.index();
                    e.insert(Node {
                        parent: index,
                        cost: new_cost,
                        closed: false,
                    });
                }
            }

            to_see.push(SmallestCostHolder {
                estimated_cost: new_cost + h,
                cost: new_cost,
                index: n,
            });
        }
    }
    AstarResult::Exhausted
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A line graph 0 - 1 - 2 - ... - 9 with unit costs.
    fn line_successors(n: &i32) -> Vec<(i32, i32)> {
        [n - 1, n + 1]
            .into_iter()
            .filter(|m| (0..10).contains(m))
            .map(|m| (m, 1))
            .collect()
    }

    #[test]
    fn finds_path_on_line() {
        let mut steps = Vec::new();
        let result = astar_observed(
            &0,
            line_successors,
            |n| 9 - n,
            |n| *n == 9,
            |s| {
                steps.push(match s {
                    Step::Discovered(n) => (true, *n),
                    Step::Expanded(n) => (false, *n),
                })
            },
            || false,
        );
        assert_eq!(result, AstarResult::Found((0..10).collect(), 9));
        assert_eq!(steps[0], (true, 0));
        assert_eq!(steps[1], (false, 0));
        assert_eq!(*steps.last().unwrap(), (false, 9));
    }

    #[test]
    fn exhausts_when_goal_missing() {
        let mut expanded = 0;
        let result = astar_observed(
            &0,
            line_successors,
            |_| 0,
            |n| *n == 42,
            |s| {
                if let Step::Expanded(_) = s {
                    expanded += 1
                }
            },
            || false,
        );
        assert_eq!(result, AstarResult::Exhausted);
        assert_eq!(expanded, 10);
    }

    #[test]
    fn cancellation_is_polled_per_iteration() {
        let mut polls = 0;
        let result = astar_observed(
            &0,
            line_successors,
            |n| 9 - n,
            |n| *n == 9,
            |_| {},
            || {
                polls += 1;
                polls > 3
            },
        );
        assert_eq!(result, AstarResult::<i32, i32>::Cancelled);
    }

    #[test]
    fn cheaper_route_replaces_parent() {
        // 0 -> 1 costs 5, 0 -> 2 -> 1 costs 2
        let successors = |n: &u8| -> Vec<(u8, i32)> {
            match *n {
                0 => vec![(1, 5), (2, 1)],
                2 => vec![(1, 1)],
                1 => vec![(3, 1)],
                _ => vec![],
            }
        };
        let result = astar_observed(&0, successors, |_| 0, |n| *n == 3, |_| {}, || false);
        assert_eq!(result, AstarResult::Found(vec![0, 2, 1, 3], 3));
    }
}
