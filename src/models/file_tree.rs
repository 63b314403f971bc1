//! 虚拟文件树数据模型
//!
//! 节点存放在 arena 中，另有路径索引；所有结构性操作都会同步维护两者。

use super::edit_history::EditHistory;
use super::path;
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

new_key_type! { pub struct NodeId; }

pub const DEFAULT_SAVED_HISTORY_LIMIT: usize = 20;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTreeError {
    InvalidNodeId,
    NotFound(String),
    ParentNotDirectory,
    NotAFile,
    NameExists(String),
    InvalidName(String),
    SameName,
    MoveIntoSelf,
    MoveIntoDescendant,
    AlreadyInParent,
}

impl fmt::Display for FileTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileTreeError::InvalidNodeId => write!(f, "invalid node id"),
            FileTreeError::NotFound(p) => write!(f, "no such file or folder: {}", p),
            FileTreeError::ParentNotDirectory => write!(f, "parent is not a folder"),
            FileTreeError::NotAFile => write!(f, "node is not a file"),
            FileTreeError::NameExists(name) => {
                write!(f, "a file or folder named '{}' already exists here", name)
            }
            FileTreeError::InvalidName(name) => write!(f, "invalid name: '{}'", name),
            FileTreeError::SameName => write!(f, "new name is the same as the current name"),
            FileTreeError::MoveIntoSelf => write!(f, "cannot move a node into itself"),
            FileTreeError::MoveIntoDescendant => {
                write!(f, "cannot move node into its own subtree")
            }
            FileTreeError::AlreadyInParent => write!(f, "node is already in that folder"),
        }
    }
}

impl std::error::Error for FileTreeError {}

#[derive(Debug, Clone)]
struct FileData {
    content: String,
    revisions: EditHistory<String>,
}

#[derive(Debug, Clone)]
enum Payload {
    File(FileData),
    Folder(BTreeMap<CompactString, NodeId>),
}

/// A file or folder. Read-only outside this module; structural change goes
/// through [`FileTree`].
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    name: CompactString,
    path: String,
    parent: Option<NodeId>,
    payload: Payload,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> NodeKind {
        match self.payload {
            Payload::File(_) => NodeKind::File,
            Payload::Folder(_) => NodeKind::Folder,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.payload, Payload::File(_))
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.payload, Payload::Folder(_))
    }

    /// Last saved content. `None` for folders.
    pub fn content(&self) -> Option<&str> {
        match &self.payload {
            Payload::File(data) => Some(&data.content),
            Payload::Folder(_) => None,
        }
    }

    /// Bounded history of saved revisions, newest last. `None` for folders.
    pub fn saved_history(&self) -> Option<&EditHistory<String>> {
        match &self.payload {
            Payload::File(data) => Some(&data.revisions),
            Payload::Folder(_) => None,
        }
    }

    /// Child ids in name order. `None` for files.
    pub fn children(&self) -> Option<impl Iterator<Item = NodeId> + '_> {
        match &self.payload {
            Payload::Folder(children) => Some(children.values().copied()),
            Payload::File(_) => None,
        }
    }

    pub fn child_count(&self) -> usize {
        match &self.payload {
            Payload::Folder(children) => children.len(),
            Payload::File(_) => 0,
        }
    }
}

/// Detached copy of a subtree, used to recreate deleted nodes and to move
/// trees across workspaces. Restoring always allocates fresh ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::File,
            content: Some(content.into()),
            children: Vec::new(),
        }
    }

    pub fn folder(name: impl Into<String>, children: Vec<NodeSnapshot>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Folder,
            content: None,
            children,
        }
    }

    fn validate(&self) -> Result<(), FileTreeError> {
        if !path::is_valid_name(&self.name) {
            return Err(FileTreeError::InvalidName(self.name.clone()));
        }
        if self.kind == NodeKind::File && !self.children.is_empty() {
            return Err(FileTreeError::ParentNotDirectory);
        }
        let mut seen = rustc_hash::FxHashSet::default();
        for child in &self.children {
            if !seen.insert(child.name.as_str()) {
                return Err(FileTreeError::NameExists(child.name.clone()));
            }
            child.validate()?;
        }
        Ok(())
    }
}

/// Folders first, then case-sensitive name order.
pub fn default_order(a: &Node, b: &Node) -> Ordering {
    match (a.is_folder(), b.is_folder()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    }
}

pub struct FileTree {
    arena: SlotMap<NodeId, Node>,
    roots: BTreeMap<CompactString, NodeId>,
    id_by_path: FxHashMap<String, NodeId>,
    saved_history_limit: usize,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FileTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.walk().into_iter().map(|n| n.path()))
            .finish()
    }
}

impl FileTree {
    pub fn new() -> Self {
        Self::with_saved_history_limit(DEFAULT_SAVED_HISTORY_LIMIT)
    }

    pub fn with_saved_history_limit(limit: usize) -> Self {
        Self {
            arena: SlotMap::with_key(),
            roots: BTreeMap::new(),
            id_by_path: FxHashMap::default(),
            saved_history_limit: limit.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn find_by_id(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// Accepts bare or slash-prefixed, un-normalized input.
    pub fn find_by_path(&self, path: &str) -> Option<&Node> {
        self.id_of(path).and_then(|id| self.arena.get(id))
    }

    pub fn id_of(&self, path: &str) -> Option<NodeId> {
        let normalized = path::normalize(path);
        self.id_by_path.get(&normalized).copied()
    }

    pub fn list_children(&self, parent: Option<NodeId>) -> Vec<&Node> {
        self.list_children_by(parent, default_order)
    }

    pub fn list_children_by<F>(&self, parent: Option<NodeId>, mut compare: F) -> Vec<&Node>
    where
        F: FnMut(&Node, &Node) -> Ordering,
    {
        let Ok(children) = self.children_of(parent) else {
            return Vec::new();
        };
        let mut nodes: Vec<&Node> = children
            .values()
            .filter_map(|&id| self.arena.get(id))
            .collect();
        nodes.sort_by(|a, b| compare(a, b));
        nodes
    }

    pub fn roots(&self) -> Vec<&Node> {
        self.list_children(None)
    }

    /// Depth-first pre-order walk using the default sibling order.
    pub fn walk(&self) -> Vec<&Node> {
        let mut result = Vec::with_capacity(self.arena.len());
        let mut stack: Vec<&Node> = self.list_children(None).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            result.push(node);
            if node.is_folder() {
                stack.extend(self.list_children(Some(node.id)).into_iter().rev());
            }
        }
        result
    }

    pub fn is_descendant(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(current) = self.arena.get(node) {
            match current.parent {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => node = parent,
                None => break,
            }
        }
        false
    }

    /// `id` and all of its descendants, pre-order.
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.arena.get(current) else {
                continue;
            };
            result.push(current);
            if let Payload::Folder(children) = &node.payload {
                stack.extend(children.values().rev().copied());
            }
        }
        result
    }

    fn children_of(
        &self,
        parent: Option<NodeId>,
    ) -> Result<&BTreeMap<CompactString, NodeId>, FileTreeError> {
        match parent {
            None => Ok(&self.roots),
            Some(id) => match &self.arena.get(id).ok_or(FileTreeError::InvalidNodeId)?.payload {
                Payload::Folder(children) => Ok(children),
                Payload::File(_) => Err(FileTreeError::ParentNotDirectory),
            },
        }
    }

    fn children_of_mut(
        &mut self,
        parent: Option<NodeId>,
    ) -> Result<&mut BTreeMap<CompactString, NodeId>, FileTreeError> {
        match parent {
            None => Ok(&mut self.roots),
            Some(id) => match &mut self
                .arena
                .get_mut(id)
                .ok_or(FileTreeError::InvalidNodeId)?
                .payload
            {
                Payload::Folder(children) => Ok(children),
                Payload::File(_) => Err(FileTreeError::ParentNotDirectory),
            },
        }
    }

    fn path_of_parent(&self, parent: Option<NodeId>) -> String {
        parent
            .and_then(|id| self.arena.get(id))
            .map(|n| n.path.clone())
            .unwrap_or_else(|| path::ROOT.to_string())
    }

    pub fn insert(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        kind: NodeKind,
    ) -> Result<NodeId, FileTreeError> {
        if !path::is_valid_name(name) {
            return Err(FileTreeError::InvalidName(name.to_string()));
        }
        if self.children_of(parent)?.contains_key(name) {
            return Err(FileTreeError::NameExists(name.to_string()));
        }

        let node_path = path::join(&self.path_of_parent(parent), name);
        let payload = match kind {
            NodeKind::File => Payload::File(FileData {
                content: String::new(),
                revisions: EditHistory::new(String::new(), self.saved_history_limit),
            }),
            NodeKind::Folder => Payload::Folder(BTreeMap::new()),
        };
        let name = CompactString::new(name);
        let id = self.arena.insert_with_key(|id| Node {
            id,
            name: name.clone(),
            path: node_path.clone(),
            parent,
            payload,
        });
        self.children_of_mut(parent)?.insert(name, id);
        self.id_by_path.insert(node_path, id);
        Ok(id)
    }

    pub fn insert_file(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        content: &str,
    ) -> Result<NodeId, FileTreeError> {
        let id = self.insert(parent, name, NodeKind::File)?;
        if let Some(Payload::File(data)) = self.arena.get_mut(id).map(|n| &mut n.payload) {
            data.content = content.to_string();
            data.revisions = EditHistory::new(content.to_string(), self.saved_history_limit);
        }
        Ok(id)
    }

    /// Replaces the saved content and records it as a new saved revision.
    pub fn set_content(&mut self, id: NodeId, content: &str) -> Result<(), FileTreeError> {
        let node = self.arena.get_mut(id).ok_or(FileTreeError::InvalidNodeId)?;
        match &mut node.payload {
            Payload::File(data) => {
                if data.content != content {
                    data.content = content.to_string();
                    data.revisions.push(content.to_string());
                }
                Ok(())
            }
            Payload::Folder(_) => Err(FileTreeError::NotAFile),
        }
    }

    /// Returns the previous name.
    pub fn rename(&mut self, id: NodeId, new_name: &str) -> Result<CompactString, FileTreeError> {
        let (parent, old_name) = {
            let node = self.arena.get(id).ok_or(FileTreeError::InvalidNodeId)?;
            (node.parent, node.name.clone())
        };
        if !path::is_valid_name(new_name) {
            return Err(FileTreeError::InvalidName(new_name.to_string()));
        }
        if old_name == new_name {
            return Err(FileTreeError::SameName);
        }

        let children = self.children_of_mut(parent)?;
        if children.contains_key(new_name) {
            return Err(FileTreeError::NameExists(new_name.to_string()));
        }
        children.remove(&old_name);
        let new_name = CompactString::new(new_name);
        children.insert(new_name.clone(), id);

        if let Some(node) = self.arena.get_mut(id) {
            node.name = new_name;
        }
        self.cascade_paths(id);
        Ok(old_name)
    }

    /// Moves `id` under `new_parent` (`None` is the root). Returns the old
    /// parent.
    pub fn reparent(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
    ) -> Result<Option<NodeId>, FileTreeError> {
        let (name, old_parent) = {
            let node = self.arena.get(id).ok_or(FileTreeError::InvalidNodeId)?;
            (node.name.clone(), node.parent)
        };
        if let Some(target) = new_parent {
            if target == id {
                return Err(FileTreeError::MoveIntoSelf);
            }
            if self.is_descendant(id, target) {
                return Err(FileTreeError::MoveIntoDescendant);
            }
        }
        if old_parent == new_parent {
            return Err(FileTreeError::AlreadyInParent);
        }
        if self.children_of(new_parent)?.contains_key(&name) {
            return Err(FileTreeError::NameExists(name.to_string()));
        }

        self.children_of_mut(old_parent)?.remove(&name);
        self.children_of_mut(new_parent)?.insert(name, id);
        if let Some(node) = self.arena.get_mut(id) {
            node.parent = new_parent;
        }
        self.cascade_paths(id);
        Ok(old_parent)
    }

    /// Detaches `id` and drops its whole subtree from the arena and the path
    /// index. Returns every removed id.
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<NodeId>, FileTreeError> {
        let (parent, name) = {
            let node = self.arena.get(id).ok_or(FileTreeError::InvalidNodeId)?;
            (node.parent, node.name.clone())
        };
        self.children_of_mut(parent)?.remove(&name);

        let removed = self.subtree_ids(id);
        for &node_id in &removed {
            if let Some(node) = self.arena.remove(node_id) {
                if self.id_by_path.get(&node.path) == Some(&node_id) {
                    self.id_by_path.remove(&node.path);
                }
            }
        }
        Ok(removed)
    }

    /// Recomputes the stored path of `id` and its descendants from their
    /// parents and re-keys the path index.
    fn cascade_paths(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.arena.get(current) else {
                continue;
            };
            let new_path = path::join(&self.path_of_parent(node.parent), &node.name);
            let old_path = node.path.clone();
            if let Payload::Folder(children) = &node.payload {
                stack.extend(children.values().copied());
            }

            if self.id_by_path.get(&old_path) == Some(&current) {
                self.id_by_path.remove(&old_path);
            }
            self.id_by_path.insert(new_path.clone(), current);
            if let Some(node) = self.arena.get_mut(current) {
                node.path = new_path;
            }
        }
    }

    pub fn snapshot(&self, id: NodeId) -> Option<NodeSnapshot> {
        let node = self.arena.get(id)?;
        Some(match &node.payload {
            Payload::File(data) => NodeSnapshot::file(node.name.as_str(), data.content.as_str()),
            Payload::Folder(children) => NodeSnapshot::folder(
                node.name.as_str(),
                children
                    .values()
                    .filter_map(|&child| self.snapshot(child))
                    .collect(),
            ),
        })
    }

    /// Rebuilds a snapshot under `parent` with fresh ids. Validation happens
    /// up front so a rejected snapshot leaves the tree untouched.
    pub fn restore(
        &mut self,
        parent: Option<NodeId>,
        snapshot: &NodeSnapshot,
    ) -> Result<NodeId, FileTreeError> {
        snapshot.validate()?;
        if self.children_of(parent)?.contains_key(snapshot.name.as_str()) {
            return Err(FileTreeError::NameExists(snapshot.name.clone()));
        }
        self.restore_unchecked(parent, snapshot)
    }

    fn restore_unchecked(
        &mut self,
        parent: Option<NodeId>,
        snapshot: &NodeSnapshot,
    ) -> Result<NodeId, FileTreeError> {
        match snapshot.kind {
            NodeKind::File => self.insert_file(
                parent,
                &snapshot.name,
                snapshot.content.as_deref().unwrap_or_default(),
            ),
            NodeKind::Folder => {
                let id = self.insert(parent, &snapshot.name, NodeKind::Folder)?;
                for child in &snapshot.children {
                    self.restore_unchecked(Some(id), child)?;
                }
                Ok(id)
            }
        }
    }

    /// Removes every folder that holds no file directly or transitively.
    /// Returns the number of folders removed.
    pub fn prune_empty_folders(&mut self) -> usize {
        let mut empty = rustc_hash::FxHashSet::default();
        let mut order: Vec<NodeId> = self.walk().into_iter().map(|n| n.id).collect();
        // Children precede parents in reverse pre-order.
        order.reverse();
        for id in order {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            if let Payload::Folder(children) = &node.payload {
                if children.values().all(|child| empty.contains(child)) {
                    empty.insert(id);
                }
            }
        }

        let tops: Vec<NodeId> = empty
            .iter()
            .copied()
            .filter(|&id| {
                self.arena
                    .get(id)
                    .and_then(|n| n.parent)
                    .map_or(true, |parent| !empty.contains(&parent))
            })
            .collect();
        for id in tops {
            if let Err(err) = self.remove(id) {
                tracing::error!(error = %err, "prune: failed to remove empty folder");
            }
        }
        empty.len()
    }

    /// If the top level is exactly one folder, promotes its children to the
    /// top level and drops the folder. Returns the unwrapped folder's name.
    pub fn unwrap_single_root(&mut self) -> Option<String> {
        if self.roots.len() != 1 {
            return None;
        }
        let (_, &wrapper_id) = self.roots.iter().next()?;
        if !self.arena.get(wrapper_id)?.is_folder() {
            return None;
        }

        let wrapper = self.arena.remove(wrapper_id)?;
        self.roots.clear();
        if self.id_by_path.get(&wrapper.path) == Some(&wrapper_id) {
            self.id_by_path.remove(&wrapper.path);
        }
        if let Payload::Folder(children) = wrapper.payload {
            for (name, child) in children {
                if let Some(node) = self.arena.get_mut(child) {
                    node.parent = None;
                }
                self.roots.insert(name, child);
                self.cascade_paths(child);
            }
        }
        Some(wrapper.name.to_string())
    }

    /// Verifies the path invariant, parent/child links and index sync.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut reachable = 0usize;
        let mut stack: Vec<(Option<NodeId>, &BTreeMap<CompactString, NodeId>)> =
            vec![(None, &self.roots)];
        while let Some((parent, children)) = stack.pop() {
            let parent_path = self.path_of_parent(parent);
            for (name, &id) in children {
                let node = self
                    .arena
                    .get(id)
                    .ok_or_else(|| format!("dangling child '{}' under {}", name, parent_path))?;
                reachable += 1;
                if node.name != *name {
                    return Err(format!("child key '{}' != node name '{}'", name, node.name));
                }
                if node.parent != parent {
                    return Err(format!("{} has a stale parent link", node.path));
                }
                let expected = path::join(&parent_path, &node.name);
                if node.path != expected {
                    return Err(format!("path {} should be {}", node.path, expected));
                }
                if self.id_by_path.get(&node.path) != Some(&id) {
                    return Err(format!("path index out of sync for {}", node.path));
                }
                if let Payload::Folder(grandchildren) = &node.payload {
                    stack.push((Some(id), grandchildren));
                }
            }
        }
        if reachable != self.arena.len() {
            return Err(format!(
                "{} nodes in arena but {} reachable",
                self.arena.len(),
                reachable
            ));
        }
        if self.id_by_path.len() != self.arena.len() {
            return Err(format!(
                "path index has {} entries for {} nodes",
                self.id_by_path.len(),
                self.arena.len()
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/file_tree.rs"]
mod tests;
