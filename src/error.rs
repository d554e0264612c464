//! Error types for astar_visualizer.
//!
//! Usage errors (bad coordinates, misuse of a [SearchTask](crate::search::SearchTask)) and
//! external I/O failures end up here. An unreachable destination is not an error; it is
//! reported through [SearchOutcome](crate::search::SearchOutcome).

use crate::position::Position;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two marked coordinates an error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::End => write!(f, "end"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Coordinate outside the grid
    #[error("position {0} is out of bounds")]
    OutOfBounds(Position),

    /// Start or end lies outside the map
    #[error("{which} {position} is outside the map")]
    EndpointOutOfBounds {
        which: Endpoint,
        position: Position,
    },

    /// Start or end lies on a blocked cell
    #[error("{which} {position} is blocked")]
    EndpointBlocked {
        which: Endpoint,
        position: Position,
    },

    /// Start or end has not been chosen yet
    #[error("start and end must both be chosen")]
    MissingEndpoints,

    /// The search task was already started once
    #[error("search task was already started")]
    AlreadyStarted,

    /// Joining a search task that never ran
    #[error("search task was never started")]
    NotStarted,

    /// The search thread panicked before returning
    #[error("search thread panicked")]
    WorkerPanicked,

    /// A search is running or its events are still being replayed
    #[error("a search is still in progress")]
    SearchInProgress,

    /// Edits and new searches are suppressed inside a lock window
    #[error("input is locked while a search is replayed")]
    InputLocked,

    /// The consumer side of the event channel is gone
    #[error("event channel closed")]
    ChannelClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed map description
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
