//! Service ports: configuration types shared by the kernel and adapters.

pub mod config;

pub use config::{ArchiveConfig, WorkspaceConfig};
