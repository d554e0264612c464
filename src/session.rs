//! The consumer side of a search.
//!
//! A [Session] owns everything the foreground loop mutates: the [Grid], the live
//! [OccupancyMap], the chosen endpoints, the input lock and the receiving end of the event
//! channel. Nothing in here is shared with the search thread except through the channel.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::debug;

use crate::cell::CellTag;
use crate::channel::{self, EventReceiver, EventSender};
use crate::config::SessionConfig;
use crate::error::{Endpoint, Error, Result};
use crate::event::{Action, VisualizationEvent};
use crate::grid::Grid;
use crate::occupancy::OccupancyMap;
use crate::position::Position;
use crate::search::{SearchOutcome, SearchTask};

const JOIN_POLL: Duration = Duration::from_millis(10);

/// Lets one event through per interval.
#[derive(Clone, Debug)]
pub struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Pacer {
        Pacer {
            interval,
            last: None,
        }
    }

    /// True if at least one interval has passed since the last time this returned true.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

pub struct Session {
    grid: Grid,
    map: OccupancyMap,
    start: Option<Position>,
    end: Option<Position>,
    input_locked: bool,
    marks_visible: bool,
    sender: EventSender,
    receiver: EventReceiver,
    /// Events taken off the channel while joining, not yet replayed.
    pending: VecDeque<VisualizationEvent>,
    pacer: Pacer,
    config: SessionConfig,
    task: Option<SearchTask>,
    last_outcome: Option<SearchOutcome>,
}

impl Session {
    /// Starts from a loaded map with both endpoints chosen.
    pub fn new(map: OccupancyMap, config: SessionConfig) -> Result<Session> {
        let grid = Grid::build(&map)?;
        let (start, end) = (Some(map.start()), Some(map.end()));
        Ok(Self::with_parts(grid, map, start, end, config))
    }

    /// An obstacle-free `size × size` map with no endpoints chosen yet.
    pub fn blank(size: usize, config: SessionConfig) -> Session {
        let origin = Position::new(0, 0);
        let map = OccupancyMap::new(size, origin, origin);
        Self::with_parts(Grid::new(size, size), map, None, None, config)
    }

    fn with_parts(
        grid: Grid,
        map: OccupancyMap,
        start: Option<Position>,
        end: Option<Position>,
        config: SessionConfig,
    ) -> Session {
        let (sender, receiver) = channel::from_config(&config.playback);
        Session {
            grid,
            map,
            start,
            end,
            input_locked: false,
            marks_visible: false,
            sender,
            receiver,
            pending: VecDeque::new(),
            pacer: Pacer::new(config.playback.tick_interval),
            config,
            task: None,
            last_outcome: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    pub fn map(&self) -> &OccupancyMap {
        &self.map
    }
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
    pub fn start(&self) -> Option<Position> {
        self.start
    }
    pub fn end(&self) -> Option<Position> {
        self.end
    }
    pub fn is_locked(&self) -> bool {
        self.input_locked
    }
    /// Events produced by the search that have not been replayed yet.
    pub fn backlog(&self) -> usize {
        self.pending.len() + self.receiver.backlog()
    }
    pub fn last_outcome(&self) -> Option<&SearchOutcome> {
        self.last_outcome.as_ref()
    }

    /// True while a search thread is running or its events are still queued.
    pub fn search_in_progress(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished()) || self.backlog() > 0
    }

    /// Edits wait until a started search has been fully replayed, including the stretch
    /// before its `Lock` event reaches the grid.
    fn edits_suppressed(&self) -> bool {
        self.input_locked || self.search_in_progress()
    }

    fn next_event(&mut self) -> Option<VisualizationEvent> {
        self.pending
            .pop_front()
            .or_else(|| self.receiver.try_receive())
    }

    /// Applies at most one queued event, and only if a full tick interval has passed since the
    /// previous tick.
    pub fn tick(&mut self, now: Instant) -> Result<Option<VisualizationEvent>> {
        if !self.pacer.ready(now) {
            return Ok(None);
        }
        match self.next_event() {
            Some(event) => {
                self.apply(&event)?;
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    /// Applies everything queued right now, ignoring the pacing.
    pub fn flush(&mut self) -> Result<usize> {
        let mut applied = 0;
        while let Some(event) = self.next_event() {
            self.apply(&event)?;
            applied += 1;
        }
        Ok(applied)
    }

    fn apply(&mut self, event: &VisualizationEvent) -> Result<()> {
        match event.action {
            Action::Lock => self.input_locked = true,
            Action::Unlock => {
                self.input_locked = false;
                self.join_search()?;
            }
            Action::Push | Action::Pop => {
                self.marks_visible = true;
                self.grid.apply(event)?;
            }
        }
        Ok(())
    }

    fn endpoints(&self) -> Result<(Position, Position)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(Error::MissingEndpoints),
        }
    }

    fn reconciled_map(&self, start: Position, end: Position) -> Result<OccupancyMap> {
        let mut map = self.grid.extract_occupancy(&self.map)?;
        map.set_start(start);
        map.set_end(end);
        Ok(map)
    }

    /// Starts a search over a snapshot of the current terrain and endpoints.
    pub fn start_search(&mut self) -> Result<()> {
        if self.input_locked {
            return Err(Error::InputLocked);
        }
        if self.search_in_progress() {
            return Err(Error::SearchInProgress);
        }
        let (start, end) = self.endpoints()?;
        self.join_search()?;
        self.dismiss_search_marks();
        let snapshot = self.reconciled_map(start, end)?;
        let mut task = SearchTask::new(snapshot, self.sender.clone(), self.config.search)?;
        task.start()?;
        debug!("Started search from {} to {}", start, end);
        self.task = Some(task);
        Ok(())
    }

    pub fn cancel_search(&self) {
        if let Some(task) = &self.task {
            task.cancel();
        }
    }

    /// Waits for the current search thread, if any, and returns the latest outcome.
    ///
    /// Events the search sends in the meantime are kept for replay, so a bounded channel
    /// cannot hold the worker in `send` forever.
    pub fn join_search(&mut self) -> Result<Option<SearchOutcome>> {
        if let Some(mut task) = self.task.take() {
            while !task.is_finished() {
                if let Some(event) = self.receiver.receive_timeout(JOIN_POLL) {
                    self.pending.push_back(event);
                }
            }
            self.last_outcome = Some(task.join()?);
        }
        Ok(self.last_outcome.clone())
    }

    fn dismiss_search_marks(&mut self) {
        if self.marks_visible {
            self.grid.clear_search_marks();
            self.marks_visible = false;
        }
    }

    /// Bounds-checks `pos`, drops the marks of the previous search and returns the cell's top.
    fn edit_target(&mut self, pos: Position) -> Result<CellTag> {
        if !self.grid.is_valid(pos.x, pos.y) {
            return Err(Error::OutOfBounds(pos));
        }
        self.dismiss_search_marks();
        self.grid.top(pos)
    }

    /// Builds (`add`) or removes a wall. Returns whether the grid changed; edits are ignored
    /// inside a lock window and on endpoints.
    pub fn modify_wall(&mut self, pos: Position, add: bool) -> Result<bool> {
        if self.edits_suppressed() {
            debug!("Ignoring wall edit at {} during a search", pos);
            return Ok(false);
        }
        match (self.edit_target(pos)?, add) {
            (CellTag::Free, true) => self.grid.push(pos, CellTag::Wall)?,
            (CellTag::Wall, false) => self.grid.pop(pos, CellTag::Wall)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Marks a free cell as the start, or as the end once the start exists.
    pub fn choose_endpoint(&mut self, pos: Position) -> Result<Option<Endpoint>> {
        if self.edits_suppressed() {
            return Ok(None);
        }
        if self.edit_target(pos)? != CellTag::Free {
            return Ok(None);
        }
        let slot = match (self.start, self.end) {
            (None, _) => Endpoint::Start,
            (Some(_), None) => Endpoint::End,
            (Some(_), Some(_)) => {
                debug!("Start and end already chosen, ignoring {}", pos);
                return Ok(None);
            }
        };
        self.grid.push(pos, CellTag::Endpoint)?;
        match slot {
            Endpoint::Start => self.start = Some(pos),
            Endpoint::End => self.end = Some(pos),
        }
        Ok(Some(slot))
    }

    /// Unmarks the endpoint at `pos`. Removing the start while the end exists moves the end
    /// into the start slot, so a lone endpoint is always the start.
    pub fn remove_endpoint(&mut self, pos: Position) -> Result<Option<Endpoint>> {
        if self.edits_suppressed() {
            return Ok(None);
        }
        self.edit_target(pos)?;
        let removed = match (self.start, self.end) {
            (Some(start), Some(end)) if start == pos => {
                self.start = Some(end);
                self.end = None;
                Endpoint::Start
            }
            (Some(_), Some(end)) if end == pos => {
                self.end = None;
                Endpoint::End
            }
            (Some(start), None) if start == pos => {
                self.start = None;
                Endpoint::Start
            }
            (None, Some(end)) if end == pos => {
                self.end = None;
                Endpoint::End
            }
            _ => return Ok(None),
        };
        self.grid.pop(pos, CellTag::Endpoint)?;
        Ok(Some(removed))
    }

    pub fn clear_endpoints(&mut self) -> Result<bool> {
        if self.edits_suppressed() {
            return Ok(false);
        }
        self.dismiss_search_marks();
        for pos in [self.start.take(), self.end.take()].into_iter().flatten() {
            self.grid.pop(pos, CellTag::Endpoint)?;
        }
        Ok(true)
    }

    /// Writes the edited terrain and the chosen endpoints back into the live map.
    pub fn save_map(&mut self) -> Result<&OccupancyMap> {
        if self.input_locked {
            return Err(Error::InputLocked);
        }
        if self.search_in_progress() {
            return Err(Error::SearchInProgress);
        }
        let (start, end) = self.endpoints()?;
        self.map = self.reconciled_map(start, end)?;
        Ok(&self.map)
    }

    /// Waits for a running search before the session goes away. Call
    /// [cancel_search](Self::cancel_search) first to stop it early.
    pub fn shutdown(mut self) -> Result<Option<SearchOutcome>> {
        self.join_search()
    }
}
