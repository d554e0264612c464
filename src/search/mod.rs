//! The background search.
//!
//! [search] runs A* over an [OccupancyMap] and describes every step as a
//! [VisualizationEvent]: one `Lock`, a `Push(Frontier)` for each discovered cell, a
//! `Pop(Frontier)`/`Push(Visited)` pair for each expanded cell, and one `Unlock` at the very end.
//! [SearchTask] runs it on its own thread and feeds the events into an [EventSender].

pub mod astar;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use itertools::Itertools;
use log::{info, trace, warn};
use smallvec::SmallVec;

use crate::cell::CellTag;
use crate::channel::EventSender;
use crate::components::Connectivity;
use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::event::VisualizationEvent;
use crate::occupancy::OccupancyMap;
use crate::position::Position;
use crate::{C, D, E, N_SMALLVEC_SIZE};
use astar::{astar_observed, AstarResult, Step};

/// Converts the integer cost to an approximate floating point equivalent where cardinal directions have cost 1.0.
pub fn convert_cost_to_unit_cost_float(cost: i32) -> f64 {
    (cost as f64) / (C as f64)
}

/// Whether a single move from `from` to the adjacent `to` is allowed.
pub(crate) fn can_step(
    map: &OccupancyMap,
    config: &SearchConfig,
    from: Position,
    to: Position,
) -> bool {
    if !map.is_passable(to) {
        return false;
    }
    if from.is_diagonal_to(&to) && !config.allow_corner_cutting {
        map.is_passable(Position::new(from.x, to.y)) && map.is_passable(Position::new(to.x, from.y))
    } else {
        true
    }
}

pub fn neighborhood_points_and_cost(
    map: &OccupancyMap,
    config: &SearchConfig,
    pos: &Position,
) -> SmallVec<[(Position, i32); N_SMALLVEC_SIZE]> {
    let points = if config.allow_diagonal_move {
        pos.moore_neighborhood()
    } else {
        pos.neumann_neighborhood()
    };
    points
        .into_iter()
        .filter(|p| can_step(map, config, *pos, *p))
        .map(|p| (p, if pos.is_diagonal_to(&p) { D } else { C }))
        .collect()
}

/// Uses C as cost for cardinal (straight) moves and D for diagonal moves. Never overestimates,
/// so it doubles as the heuristic.
pub fn heuristic(config: &SearchConfig, p1: &Position, p2: &Position) -> i32 {
    if config.allow_diagonal_move {
        let delta_x = (p1.x - p2.x).abs();
        let delta_y = (p1.y - p2.y).abs();
        // Formula from https://github.com/riscy/a_star_on_grids
        // to efficiently compute the cost of a path taking the maximal amount
        // of diagonal steps before going straight
        (E * (delta_x - delta_y).abs() + D * (delta_x + delta_y)) / 2
    } else {
        p1.manhattan_distance(p2) * C
    }
}

/// Sums the step costs along a path of adjacent positions.
pub fn path_cost(path: &[Position]) -> i32 {
    path.iter()
        .tuple_windows()
        .map(|(a, b)| if a.is_diagonal_to(b) { D } else { C })
        .sum()
}

/// How a search ended. Reaching no path is a normal result, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Found {
        path: Vec<Position>,
        cost: i32,
        expanded: usize,
    },
    Unreachable {
        expanded: usize,
    },
    Cancelled {
        expanded: usize,
    },
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }

    pub fn path(&self) -> Option<&[Position]> {
        match self {
            SearchOutcome::Found { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Path cost in units of one cardinal step.
    pub fn cost_in_steps(&self) -> Option<f64> {
        match self {
            SearchOutcome::Found { cost, .. } => Some(convert_cost_to_unit_cost_float(*cost)),
            _ => None,
        }
    }

    /// Number of cells that were expanded, which equals the number of `Visited` pushes.
    pub fn expanded(&self) -> usize {
        match self {
            SearchOutcome::Found { expanded, .. }
            | SearchOutcome::Unreachable { expanded }
            | SearchOutcome::Cancelled { expanded } => *expanded,
        }
    }
}

/// Emits `Lock` when opened and `Unlock` when dropped, so the pair stays balanced however the
/// search ends.
struct LockWindow<F: FnMut(VisualizationEvent)> {
    emit: F,
}

impl<F: FnMut(VisualizationEvent)> LockWindow<F> {
    fn open(mut emit: F) -> Self {
        emit(VisualizationEvent::lock());
        LockWindow { emit }
    }

    fn emit(&mut self, event: VisualizationEvent) {
        (self.emit)(event)
    }

    fn close(self) {}
}

impl<F: FnMut(VisualizationEvent)> Drop for LockWindow<F> {
    fn drop(&mut self) {
        (self.emit)(VisualizationEvent::unlock());
    }
}

/// Runs one A* search from `map.start()` to `map.end()` on the calling thread, handing every
/// event to `emit` in order. `cancelled` is polled once per expansion.
///
/// The map must satisfy [OccupancyMap::validate_endpoints]; [SearchTask::new] checks this.
pub fn search<F, K>(
    map: &OccupancyMap,
    config: &SearchConfig,
    emit: F,
    cancelled: K,
) -> SearchOutcome
where
    F: FnMut(VisualizationEvent),
    K: FnMut() -> bool,
{
    let mut window = LockWindow::open(emit);
    let start = map.start();
    let end = map.end();
    if config.precheck_components
        && Connectivity::generate(map, config).unreachable(&start, &end)
    {
        info!("{} is not reachable from {}, skipping search", end, start);
        window.close();
        return SearchOutcome::Unreachable { expanded: 0 };
    }
    info!("Searching from {} to {}", start, end);

    let mut expanded = 0;
    let result = astar_observed(
        &start,
        |node| neighborhood_points_and_cost(map, config, node),
        |point| heuristic(config, point, &end),
        |point| *point == end,
        |step| match step {
            Step::Discovered(p) => window.emit(VisualizationEvent::push(*p, CellTag::Frontier)),
            Step::Expanded(p) => {
                trace!("Expanding {}", p);
                expanded += 1;
                window.emit(VisualizationEvent::pop(*p, CellTag::Frontier));
                window.emit(VisualizationEvent::push(*p, CellTag::Visited));
            }
        },
        cancelled,
    );
    let outcome = match result {
        AstarResult::Found(path, cost) => {
            info!("Found a path of {} cells after {} expansions", path.len(), expanded);
            SearchOutcome::Found {
                path,
                cost,
                expanded,
            }
        }
        AstarResult::Exhausted => {
            info!("{} is not reachable from {} ({} expansions)", end, start, expanded);
            SearchOutcome::Unreachable { expanded }
        }
        AstarResult::Cancelled => {
            info!("Search cancelled after {} expansions", expanded);
            SearchOutcome::Cancelled { expanded }
        }
    };
    window.close();
    outcome
}

/// Shared flag a [SearchTask] polls between expansions.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
enum TaskState {
    Ready,
    Running(JoinHandle<SearchOutcome>),
    Finished(SearchOutcome),
    Panicked,
}

/// A single search on a background thread. Each instance runs at most once.
#[derive(Debug)]
pub struct SearchTask {
    map: Arc<OccupancyMap>,
    config: SearchConfig,
    sender: Option<EventSender>,
    cancel: CancelToken,
    state: TaskState,
}

impl SearchTask {
    /// Prepares a search over an immutable snapshot of `map`. Fails if an endpoint is off the
    /// map or blocked; nothing is emitted in that case.
    pub fn new(
        map: impl Into<Arc<OccupancyMap>>,
        sender: EventSender,
        config: SearchConfig,
    ) -> Result<SearchTask> {
        let map = map.into();
        map.validate_endpoints()?;
        Ok(SearchTask {
            map,
            config,
            sender: Some(sender),
            cancel: CancelToken::default(),
            state: TaskState::Ready,
        })
    }

    pub fn map(&self) -> &OccupancyMap {
        &self.map
    }

    /// Spawns the search thread.
    pub fn start(&mut self) -> Result<()> {
        let sender = match (&self.state, self.sender.take()) {
            (TaskState::Ready, Some(sender)) => sender,
            _ => return Err(Error::AlreadyStarted),
        };
        let map = Arc::clone(&self.map);
        let config = self.config;
        let cancel = self.cancel.clone();
        let handle = thread::Builder::new()
            .name("astar-search".to_owned())
            .spawn(move || {
                let mut disconnected = false;
                search(
                    &map,
                    &config,
                    |event| {
                        if sender.send(event).is_err() && !disconnected {
                            warn!("Event receiver is gone, finishing search without replay");
                            disconnected = true;
                        }
                    },
                    || cancel.is_cancelled(),
                )
            })?;
        self.state = TaskState::Running(handle);
        Ok(())
    }

    /// Blocks until the search has emitted `Unlock` and returned. Joining a finished task
    /// returns the same outcome again.
    pub fn join(&mut self) -> Result<SearchOutcome> {
        self.state = match std::mem::replace(&mut self.state, TaskState::Ready) {
            TaskState::Ready => return Err(Error::NotStarted),
            TaskState::Running(handle) => match handle.join() {
                Ok(outcome) => TaskState::Finished(outcome),
                Err(_) => TaskState::Panicked,
            },
            other => other,
        };
        match &self.state {
            TaskState::Finished(outcome) => Ok(outcome.clone()),
            TaskState::Panicked => Err(Error::WorkerPanicked),
            _ => Err(Error::NotStarted),
        }
    }

    /// Asks the search to stop before its next expansion. `Unlock` is still emitted.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_started(&self) -> bool {
        !matches!(self.state, TaskState::Ready)
    }

    /// True once the search thread has returned, whether or not it was joined.
    pub fn is_finished(&self) -> bool {
        match &self.state {
            TaskState::Ready => false,
            TaskState::Running(handle) => handle.is_finished(),
            TaskState::Finished(_) | TaskState::Panicked => true,
        }
    }
}
