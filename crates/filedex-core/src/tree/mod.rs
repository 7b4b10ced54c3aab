//! Folder-spec notation and the tree walkers built on it.
//!
//! A [`FolderSpec`] is the compact nested-list description of a directory
//! hierarchy: an ordered sequence of names and groups, where a group lists
//! the children of the name that precedes it. [`create_tree`] materializes
//! the hierarchy under a base directory; [`delete_tree`] removes it again
//! under a [`DeleteMode`]. A legacy wildcard grammar is available through
//! [`delete_tree_wildcard`].

pub mod create;
pub mod delete;
pub mod spec;

// Re-export commonly used types
pub use create::create_tree;
pub use delete::{DeleteMode, ParseDeleteModeError, delete_tree, delete_tree_wildcard};
pub use spec::{FolderEntry, FolderSpec, FolderTree, SpecNode, TreeError};
