use smallvec::SmallVec;

/// State tags layered on a [Cell]. There is no rank between them: which tag shows is decided
/// purely by push/pop order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellTag {
    Free,
    Wall,
    Endpoint,
    /// In the open set of a running search.
    Frontier,
    /// Expanded by a running search.
    Visited,
}

impl CellTag {
    /// Free and Wall describe the persistent terrain; everything else is an overlay.
    pub fn is_terrain(&self) -> bool {
        matches!(self, CellTag::Free | CellTag::Wall)
    }

    pub fn is_search_mark(&self) -> bool {
        matches!(self, CellTag::Frontier | CellTag::Visited)
    }

    pub fn symbol(&self) -> char {
        match self {
            CellTag::Free => '.',
            CellTag::Wall => '#',
            CellTag::Endpoint => 'E',
            CellTag::Frontier => 'o',
            CellTag::Visited => 'x',
        }
    }
}

/// A stack of [CellTag]s whose top is the effective state of the location.
///
/// The bottom entry is the terrain the cell was created with and is never popped, so the stack
/// is never empty. Overlays are removed with [pop_while_top_equals](Cell::pop_while_top_equals),
/// which collapses repeated pushes of the same tag into one layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    stack: SmallVec<[CellTag; 4]>,
}

impl Cell {
    pub fn new(terrain: CellTag) -> Cell {
        debug_assert!(terrain.is_terrain());
        let mut stack = SmallVec::new();
        stack.push(terrain);
        Cell { stack }
    }

    pub fn push(&mut self, tag: CellTag) {
        self.stack.push(tag);
    }

    pub fn top(&self) -> CellTag {
        debug_assert!(!self.is_empty());
        self.stack[self.stack.len() - 1]
    }

    /// Removes every consecutive top entry equal to `tag`. Does nothing if the top differs.
    pub fn pop_while_top_equals(&mut self, tag: CellTag) {
        while self.stack.len() > 1 && self.top() == tag {
            self.stack.pop();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The top-most terrain entry, ignoring any overlay above it.
    pub fn terrain(&self) -> CellTag {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(CellTag::is_terrain)
            .unwrap_or(CellTag::Free)
    }

    pub fn tags(&self) -> &[CellTag] {
        &self.stack
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::new(CellTag::Free)
    }
}
