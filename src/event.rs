use crate::cell::CellTag;
use crate::position::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Opens the lock window: the consumer suppresses edits until the paired `Unlock`.
    Lock,
    Unlock,
    Push,
    Pop,
}

/// One step of search progress, addressed to a single cell of the consumer's
/// [Grid](crate::grid::Grid). `Lock` and `Unlock` carry no coordinate and no tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VisualizationEvent {
    pub x: i32,
    pub y: i32,
    pub action: Action,
    pub tag: Option<CellTag>,
}

impl VisualizationEvent {
    pub fn lock() -> Self {
        Self::signal(Action::Lock)
    }

    pub fn unlock() -> Self {
        Self::signal(Action::Unlock)
    }

    pub fn push(pos: Position, tag: CellTag) -> Self {
        VisualizationEvent {
            x: pos.x,
            y: pos.y,
            action: Action::Push,
            tag: Some(tag),
        }
    }

    pub fn pop(pos: Position, tag: CellTag) -> Self {
        VisualizationEvent {
            x: pos.x,
            y: pos.y,
            action: Action::Pop,
            tag: Some(tag),
        }
    }

    fn signal(action: Action) -> Self {
        VisualizationEvent {
            x: 0,
            y: 0,
            action,
            tag: None,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn is_lock_signal(&self) -> bool {
        matches!(self.action, Action::Lock | Action::Unlock)
    }
}
