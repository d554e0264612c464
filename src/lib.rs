//! # astar_visualizer
//!
//! A* search on an occupancy grid that runs on a background thread and describes its progress
//! as an ordered stream of [VisualizationEvent](event::VisualizationEvent)s, so that a
//! foreground loop can replay the search at its own pace without sharing any mutable state with
//! it.
//!
//! The pieces, from the bottom up:
//! - [Position](position::Position) and [OccupancyMap](occupancy::OccupancyMap): the persisted
//!   map of blocked cells plus a start and an end.
//! - [Cell](cell::Cell) and [Grid](grid::Grid): the consumer's layered view of the map, where
//!   search marks sit on top of the terrain and can be peeled off again.
//! - [SearchTask](search::SearchTask): one A* run over an immutable map snapshot, emitting
//!   `Lock`, `Push`/`Pop` events and `Unlock`.
//! - [channel]: the ordered queue between the two.
//! - [Session](session::Session): the consumer side, owning the grid and the input lock and
//!   applying at most one event per tick.
//!
//! Movement is 4-connected with a Manhattan heuristic unless
//! [SearchConfig::allow_diagonal_move](config::SearchConfig::allow_diagonal_move) is set, in
//! which case the octile distance is used.
pub mod cell;
pub mod channel;
pub mod components;
pub mod config;
pub mod error;
pub mod event;
pub mod grid;
pub mod map_io;
pub mod occupancy;
pub mod position;
pub mod search;
pub mod session;

pub use cell::{Cell, CellTag};
pub use config::{PlaybackConfig, SearchConfig, SessionConfig};
pub use error::{Error, Result};
pub use event::{Action, VisualizationEvent};
pub use grid::Grid;
pub use occupancy::OccupancyMap;
pub use position::Position;
pub use search::{SearchOutcome, SearchTask};
pub use session::Session;

/// Cost of a cardinal step.
pub const C: i32 = 99;
/// Cost of a diagonal step, C times the square root of two, rounded.
pub const D: i32 = 140;
/// Helper for the octile distance.
pub const E: i32 = 2 * C - D;

pub(crate) const N_SMALLVEC_SIZE: usize = 8;
