//! Strictly linear undo/redo over full-grid snapshots. Snapshots are
//! independent deep copies; total memory is bounded by capacity x W x H.

use std::collections::VecDeque;

use crate::heightmap::HeightMap;

pub const DEFAULT_CAPACITY: usize = 50;

pub struct History {
    undo: VecDeque<HeightMap>,
    redo: VecDeque<HeightMap>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(capacity),
            redo: VecDeque::new(),
            capacity,
        }
    }

    /// Record the pre-edit state. Oldest entry is evicted once the
    /// capacity is hit; any pending redo states are discarded.
    pub fn checkpoint(&mut self, current: &HeightMap) {
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(current.clone());
        self.redo.clear();
    }

    /// Swap the live grid with the most recent undo snapshot. Returns
    /// false when there is nothing to undo.
    pub fn undo(&mut self, current: &mut HeightMap) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        self.redo.push_back(std::mem::replace(current, previous));
        true
    }

    /// Inverse of [`History::undo`].
    pub fn redo(&mut self, current: &mut HeightMap) -> bool {
        let Some(next) = self.redo.pop_back() else {
            return false;
        };
        self.undo.push_back(std::mem::replace(current, next));
        true
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
