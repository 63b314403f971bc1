//! Live editing buffers.
//!
//! A file opened for editing gets a buffer seeded from its saved content.
//! Edits replace the buffer and append to a bounded history; `save` copies
//! the buffer back into the node. Buffers are keyed by node id so they
//! follow renames and moves.

use crate::models::{EditHistory, FileTree, FileTreeError, NodeId};
use ropey::Rope;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct LiveBuffer {
    rope: Rope,
    history: EditHistory<Rope>,
}

impl LiveBuffer {
    fn new(saved: &str, limit: usize) -> Self {
        let rope = Rope::from_str(saved);
        Self {
            history: EditHistory::new(rope.clone(), limit),
            rope,
        }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn history(&self) -> &EditHistory<Rope> {
        &self.history
    }
}

pub struct ContentBuffers {
    buffers: FxHashMap<NodeId, LiveBuffer>,
    history_limit: usize,
}

impl ContentBuffers {
    pub fn new(history_limit: usize) -> Self {
        Self {
            buffers: FxHashMap::default(),
            history_limit: history_limit.max(1),
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub fn get(&self, id: NodeId) -> Option<&LiveBuffer> {
        self.buffers.get(&id)
    }

    pub fn is_open(&self, id: NodeId) -> bool {
        self.buffers.contains_key(&id)
    }

    pub fn open_ids(&self) -> Vec<NodeId> {
        self.buffers.keys().copied().collect()
    }

    /// Opening an already open file keeps its buffer.
    pub fn open(&mut self, tree: &FileTree, id: NodeId) -> Result<&LiveBuffer, FileTreeError> {
        let saved = tree
            .find_by_id(id)
            .ok_or(FileTreeError::InvalidNodeId)?
            .content()
            .ok_or(FileTreeError::NotAFile)?;
        let limit = self.history_limit;
        let buffer = self
            .buffers
            .entry(id)
            .or_insert_with(|| LiveBuffer::new(saved, limit));
        Ok(&*buffer)
    }

    pub fn update_live(
        &mut self,
        tree: &FileTree,
        id: NodeId,
        text: &str,
    ) -> Result<(), FileTreeError> {
        self.open(tree, id)?;
        let buffer = self
            .buffers
            .get_mut(&id)
            .ok_or(FileTreeError::InvalidNodeId)?;
        buffer.rope = Rope::from_str(text);
        buffer.history.push(buffer.rope.clone());
        Ok(())
    }

    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, id: NodeId) -> bool {
        let Some(buffer) = self.buffers.get_mut(&id) else {
            return false;
        };
        match buffer.history.undo() {
            Some(snapshot) => {
                buffer.rope = snapshot.clone();
                true
            }
            None => false,
        }
    }

    /// Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, id: NodeId) -> bool {
        let Some(buffer) = self.buffers.get_mut(&id) else {
            return false;
        };
        match buffer.history.redo() {
            Some(snapshot) => {
                buffer.rope = snapshot.clone();
                true
            }
            None => false,
        }
    }

    /// Commits the live buffer into the node's saved content. History is
    /// kept. Returns `false` when the file has no open buffer.
    pub fn save(&self, tree: &mut FileTree, id: NodeId) -> Result<bool, FileTreeError> {
        let Some(buffer) = self.buffers.get(&id) else {
            return Ok(false);
        };
        tree.set_content(id, &buffer.rope.to_string())?;
        Ok(true)
    }

    /// Drops the buffer and its history; saved content is untouched.
    pub fn close(&mut self, id: NodeId) -> bool {
        self.buffers.remove(&id).is_some()
    }

    pub fn live_content(&self, id: NodeId) -> Option<String> {
        self.buffers.get(&id).map(|b| b.rope.to_string())
    }

    pub fn is_dirty(&self, tree: &FileTree, id: NodeId) -> bool {
        let (Some(buffer), Some(saved)) = (
            self.buffers.get(&id),
            tree.find_by_id(id).and_then(|n| n.content()),
        ) else {
            return false;
        };
        buffer.rope != saved
    }

    pub fn discard(&mut self, ids: &[NodeId]) -> usize {
        ids.iter()
            .filter(|id| self.buffers.remove(*id).is_some())
            .count()
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/buffers.rs"]
mod tests;
