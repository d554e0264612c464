use std::time::Duration;

/// Movement rules and pre-checks for a single search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Expand the 8-neighbourhood with octile costs instead of the 4-neighbourhood.
    pub allow_diagonal_move: bool,
    /// Permit a diagonal step past a blocked orthogonal neighbour. Only relevant with
    /// `allow_diagonal_move`.
    pub allow_corner_cutting: bool,
    /// Check connected components before searching and skip the flood fill when the end
    /// cannot be reached.
    pub precheck_components: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            allow_diagonal_move: false,
            allow_corner_cutting: false,
            precheck_components: false,
        }
    }
}

impl SearchConfig {
    pub fn four_connected() -> Self {
        Self::default()
    }

    pub fn eight_connected() -> Self {
        SearchConfig {
            allow_diagonal_move: true,
            ..Self::default()
        }
    }
}

/// How fast the consumer replays events and how much the channel may buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// At most one event is applied per interval.
    pub tick_interval: Duration,
    /// `None` keeps the channel unbounded; `Some(n)` blocks the producer once `n` events are
    /// pending.
    pub channel_capacity: Option<usize>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            tick_interval: Duration::from_millis(100),
            channel_capacity: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub search: SearchConfig,
    pub playback: PlaybackConfig,
}
