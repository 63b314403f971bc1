//! 编辑历史管理（线性、有上限）
//!
//! - 每个条目都是完整快照（`Rope` 克隆共享结构）
//! - Undo 之后再 push 会丢弃 redo 分支
//! - 超过 `limit` 时淘汰最旧的条目

use ropey::Rope;
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct EditHistory<T = Rope> {
    entries: VecDeque<T>,
    index: usize,
    limit: usize,
}

impl<T: Clone> EditHistory<T> {
    /// Starts a history whose only entry is `initial`.
    pub fn new(initial: T, limit: usize) -> Self {
        let mut entries = VecDeque::with_capacity(limit.clamp(1, 64));
        entries.push_back(initial);
        Self {
            entries,
            index: 0,
            limit: limit.max(1),
        }
    }

    pub fn push(&mut self, snapshot: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push_back(snapshot);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.index = self.entries.len() - 1;
    }

    /// Steps back one entry; `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Steps forward one entry; `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn entries(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/edit_history.rs"]
mod tests;
