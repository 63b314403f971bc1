//! 数据模型层：路径、节点树、编辑历史

pub mod edit_history;
pub mod file_tree;
pub mod path;

pub use edit_history::{EditHistory, DEFAULT_HISTORY_LIMIT};
pub use file_tree::{
    default_order, FileTree, FileTreeError, Node, NodeId, NodeKind, NodeSnapshot,
    DEFAULT_SAVED_HISTORY_LIMIT,
};
