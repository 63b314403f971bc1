//! Structural mutations over the tree, kept consistent with live buffers.
//!
//! Every operation validates before touching anything, so a rejected call
//! leaves both the tree and the buffers unchanged. Successful calls return a
//! [`Mutation`] describing what happened, which is enough for a caller to
//! build its own undo of the operation.

use super::buffers::{ContentBuffers, LiveBuffer};
use super::services::ports::WorkspaceConfig;
use crate::models::{path, FileTree, FileTreeError, Node, NodeId, NodeKind, NodeSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Created {
        id: NodeId,
        path: String,
    },
    /// `snapshot` can be passed to [`Workspace::restore`] under
    /// `parent_path` to recreate the content; ids are not resurrected.
    Deleted {
        parent_path: String,
        snapshot: NodeSnapshot,
        removed: Vec<NodeId>,
    },
    Renamed {
        id: NodeId,
        old_name: String,
        old_path: String,
        new_path: String,
    },
    Moved {
        id: NodeId,
        old_parent: Option<NodeId>,
        old_path: String,
        new_path: String,
    },
}

impl Mutation {
    /// The surviving node the mutation applied to, if any.
    pub fn id(&self) -> Option<NodeId> {
        match self {
            Mutation::Created { id, .. }
            | Mutation::Renamed { id, .. }
            | Mutation::Moved { id, .. } => Some(*id),
            Mutation::Deleted { .. } => None,
        }
    }
}

pub struct Workspace {
    tree: FileTree,
    buffers: ContentBuffers,
    config: WorkspaceConfig,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(WorkspaceConfig::default())
    }
}

impl Workspace {
    pub fn new(config: WorkspaceConfig) -> Self {
        Self {
            tree: FileTree::with_saved_history_limit(config.saved_history_limit),
            buffers: ContentBuffers::new(config.history_limit),
            config,
        }
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn buffers(&self) -> &ContentBuffers {
        &self.buffers
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn find_by_path(&self, path: &str) -> Option<&Node> {
        self.tree.find_by_path(path)
    }

    pub fn find_by_id(&self, id: NodeId) -> Option<&Node> {
        self.tree.find_by_id(id)
    }

    pub fn list_children(&self, parent: Option<NodeId>) -> Vec<&Node> {
        self.tree.list_children(parent)
    }

    fn resolve(&self, path: &str) -> Result<NodeId, FileTreeError> {
        self.tree
            .id_of(path)
            .ok_or_else(|| FileTreeError::NotFound(path::normalize(path)))
    }

    fn path_of(&self, id: NodeId) -> String {
        self.tree
            .find_by_id(id)
            .map(|n| n.path().to_string())
            .unwrap_or_default()
    }

    // ==================== structure ====================

    pub fn create(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        kind: NodeKind,
    ) -> Result<Mutation, FileTreeError> {
        let id = self
            .tree
            .insert(parent, name, kind)
            .inspect_err(|err| tracing::debug!(%name, error = %err, "create rejected"))?;
        let path = self.path_of(id);
        tracing::debug!(%path, ?kind, "created");
        Ok(Mutation::Created { id, path })
    }

    /// Creates the node named by the last segment of `path` inside the
    /// folder named by the rest. The parent must already exist.
    pub fn create_at(&mut self, path: &str, kind: NodeKind) -> Result<Mutation, FileTreeError> {
        let normalized = path::normalize(path);
        let name = path::file_name(&normalized)
            .ok_or_else(|| FileTreeError::InvalidName(normalized.clone()))?
            .to_string();
        let parent_path = path::parent(&normalized);
        let parent = if path::is_root(&parent_path) {
            None
        } else {
            Some(self.resolve(&parent_path)?)
        };
        self.create(parent, &name, kind)
    }

    pub fn delete(&mut self, id: NodeId) -> Result<Mutation, FileTreeError> {
        let node = self.tree.find_by_id(id).ok_or(FileTreeError::InvalidNodeId)?;
        let parent_path = path::parent(node.path());
        let snapshot = self
            .tree
            .snapshot(id)
            .ok_or(FileTreeError::InvalidNodeId)?;

        let removed = self.tree.remove(id)?;
        let discarded = self.buffers.discard(&removed);
        tracing::debug!(
            path = %path::join(&parent_path, &snapshot.name),
            removed = removed.len(),
            discarded_buffers = discarded,
            "deleted"
        );
        Ok(Mutation::Deleted {
            parent_path,
            snapshot,
            removed,
        })
    }

    pub fn rename(&mut self, id: NodeId, new_name: &str) -> Result<Mutation, FileTreeError> {
        let old_path = self.path_of(id);
        let old_name = self
            .tree
            .rename(id, new_name)
            .inspect_err(|err| tracing::debug!(%old_path, error = %err, "rename rejected"))?;
        let new_path = self.path_of(id);
        tracing::debug!(%old_path, %new_path, "renamed");
        Ok(Mutation::Renamed {
            id,
            old_name: old_name.to_string(),
            old_path,
            new_path,
        })
    }

    /// `new_parent == None` moves the node to the top level.
    pub fn move_node(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
    ) -> Result<Mutation, FileTreeError> {
        let old_path = self.path_of(id);
        let old_parent = self
            .tree
            .reparent(id, new_parent)
            .inspect_err(|err| tracing::debug!(%old_path, error = %err, "move rejected"))?;
        let new_path = self.path_of(id);
        tracing::debug!(%old_path, %new_path, "moved");
        Ok(Mutation::Moved {
            id,
            old_parent,
            old_path,
            new_path,
        })
    }

    /// Recreates a deleted subtree under `parent_path` with fresh ids.
    pub fn restore(
        &mut self,
        parent_path: &str,
        snapshot: &NodeSnapshot,
    ) -> Result<Mutation, FileTreeError> {
        let parent = if path::is_root(parent_path) {
            None
        } else {
            Some(self.resolve(parent_path)?)
        };
        let id = self.tree.restore(parent, snapshot)?;
        let path = self.path_of(id);
        tracing::debug!(%path, "restored");
        Ok(Mutation::Created { id, path })
    }

    /// Loads a tree wholesale, e.g. after an archive import. All live
    /// buffers belong to the old tree and are dropped.
    pub fn replace_tree(&mut self, tree: FileTree) {
        tracing::info!(nodes = tree.len(), "workspace replaced");
        self.tree = tree;
        self.buffers.clear();
    }

    // ==================== content ====================

    pub fn open(&mut self, path: &str) -> Result<&LiveBuffer, FileTreeError> {
        let id = self.resolve(path)?;
        self.buffers.open(&self.tree, id)
    }

    pub fn update_live(&mut self, path: &str, text: &str) -> Result<(), FileTreeError> {
        let id = self.resolve(path)?;
        self.buffers.update_live(&self.tree, id, text)
    }

    /// `Ok(false)` at the history boundary or when the file is not open.
    pub fn undo(&mut self, path: &str) -> Result<bool, FileTreeError> {
        let id = self.resolve(path)?;
        Ok(self.buffers.undo(id))
    }

    pub fn redo(&mut self, path: &str) -> Result<bool, FileTreeError> {
        let id = self.resolve(path)?;
        Ok(self.buffers.redo(id))
    }

    pub fn save(&mut self, path: &str) -> Result<bool, FileTreeError> {
        let id = self.resolve(path)?;
        let saved = self.buffers.save(&mut self.tree, id)?;
        if saved {
            tracing::debug!(path = %self.path_of(id), "saved");
        }
        Ok(saved)
    }

    /// Saves every open buffer; returns how many were committed.
    pub fn save_all(&mut self) -> usize {
        let mut saved = 0;
        for id in self.buffers.open_ids() {
            match self.buffers.save(&mut self.tree, id) {
                Ok(true) => saved += 1,
                Ok(false) => {}
                Err(err) => tracing::warn!(error = %err, "save_all: skipped buffer"),
            }
        }
        saved
    }

    pub fn close(&mut self, path: &str) -> Result<bool, FileTreeError> {
        let id = self.resolve(path)?;
        Ok(self.buffers.close(id))
    }

    /// Live content of an open file, or `None` if the file is not open.
    pub fn live_content(&self, path: &str) -> Result<Option<String>, FileTreeError> {
        let id = self.resolve(path)?;
        Ok(self.buffers.live_content(id))
    }

    pub fn is_dirty(&self, path: &str) -> Result<bool, FileTreeError> {
        let id = self.resolve(path)?;
        Ok(self.buffers.is_dirty(&self.tree, id))
    }

    pub fn can_undo(&self, path: &str) -> Result<bool, FileTreeError> {
        let id = self.resolve(path)?;
        Ok(self
            .buffers
            .get(id)
            .is_some_and(|buffer| buffer.history().can_undo()))
    }

    pub fn can_redo(&self, path: &str) -> Result<bool, FileTreeError> {
        let id = self.resolve(path)?;
        Ok(self
            .buffers
            .get(id)
            .is_some_and(|buffer| buffer.history().can_redo()))
    }

    /// Current paths of all open files, sorted.
    pub fn open_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .buffers
            .open_ids()
            .into_iter()
            .filter_map(|id| self.tree.find_by_id(id).map(|n| n.path().to_string()))
            .collect();
        paths.sort();
        paths
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/workspace.rs"]
mod tests;
