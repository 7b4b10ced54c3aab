//! The folder-spec data model and its parse into an unambiguous tree.
//!
//! The external surface is a heterogeneous nested list: strings name
//! folders, nested lists group the children of the most recently named
//! sibling. The JSON form is the bit-exact wire format, so
//! `["a", ["b", "c"], "d"]` deserializes directly into a [`FolderSpec`].
//!
//! The flat encoding is ambiguous about which name a group attaches to, so
//! it is parsed exactly once into a [`FolderTree`] with a fixed rule: a
//! group attaches to the nearest preceding name in its sequence, and
//! consecutive groups attach to that same name. A group with no preceding
//! name is rejected as [`TreeError::InvalidStructure`] rather than being
//! silently attached to the base.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing or walking a folder spec.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The folder spec is malformed (e.g. a leading group with no name to
    /// attach to).
    #[error("invalid folder spec: {0}")]
    InvalidStructure(String),

    /// The base directory does not exist; creating it is the caller's
    /// responsibility.
    #[error("base directory not found: {}", .0.display())]
    BaseNotFound(PathBuf),

    /// IO error during directory operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One element of the flat folder-spec notation.
///
/// # Examples
///
/// ```
/// use filedex_core::tree::{FolderSpec, SpecNode};
///
/// // ["a", ["b", "c"], "d"]
/// let spec = FolderSpec::new(vec![
///     SpecNode::name("a"),
///     SpecNode::group(vec![SpecNode::name("b"), SpecNode::name("c")]),
///     SpecNode::name("d"),
/// ]);
/// assert_eq!(spec, FolderSpec::from_json(r#"["a", ["b", "c"], "d"]"#).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecNode {
    /// A folder name, created as a sibling at the current level.
    Name(String),
    /// The children of the most recently named sibling.
    Group(Vec<SpecNode>),
}

impl SpecNode {
    /// Build a name node.
    pub fn name(name: impl Into<String>) -> Self {
        SpecNode::Name(name.into())
    }

    /// Build a group node.
    pub fn group(children: impl Into<Vec<SpecNode>>) -> Self {
        SpecNode::Group(children.into())
    }
}

/// An ordered folder-spec sequence in its flat source form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderSpec(pub Vec<SpecNode>);

impl FolderSpec {
    /// Wrap a sequence of nodes.
    pub fn new(nodes: Vec<SpecNode>) -> Self {
        FolderSpec(nodes)
    }

    /// Deserialize a spec from its JSON surface form.
    ///
    /// # Examples
    ///
    /// ```
    /// use filedex_core::tree::FolderSpec;
    ///
    /// let spec = FolderSpec::from_json(r#"["logs", ["2024", "2025"]]"#).unwrap();
    /// let tree = spec.parse().unwrap();
    /// assert_eq!(tree.entries[0].name, "logs");
    /// assert_eq!(tree.entries[0].children.len(), 2);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the spec back to its JSON surface form.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_owned())
    }

    /// True when the spec holds no nodes; walking it is a no-op.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve the ambiguous flat encoding into a [`FolderTree`].
    pub fn parse(&self) -> Result<FolderTree, TreeError> {
        Ok(FolderTree {
            entries: parse_sequence(&self.0)?,
        })
    }
}

impl From<Vec<SpecNode>> for FolderSpec {
    fn from(nodes: Vec<SpecNode>) -> Self {
        FolderSpec(nodes)
    }
}

/// A parsed folder spec with group attachment resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderTree {
    /// Top-level sibling entries.
    pub entries: Vec<FolderEntry>,
}

/// One folder in a parsed spec, with its resolved children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    /// The folder name, passed to the filesystem unescaped.
    pub name: String,
    /// Children contributed by groups attached to this name.
    pub children: Vec<FolderEntry>,
    /// True when the group supplying the children was the final element of
    /// its flat sequence. Deletion in preserve mode only removes an emptied
    /// parent when this held.
    pub tail_group: bool,
}

fn parse_sequence(nodes: &[SpecNode]) -> Result<Vec<FolderEntry>, TreeError> {
    let mut entries: Vec<FolderEntry> = Vec::new();
    for (idx, node) in nodes.iter().enumerate() {
        match node {
            SpecNode::Name(name) => {
                if name.is_empty() {
                    return Err(TreeError::InvalidStructure("empty folder name".to_owned()));
                }
                entries.push(FolderEntry {
                    name: name.clone(),
                    children: Vec::new(),
                    tail_group: false,
                });
            }
            SpecNode::Group(children) => {
                let parsed = parse_sequence(children)?;
                let Some(last) = entries.last_mut() else {
                    return Err(TreeError::InvalidStructure(
                        "group has no preceding folder name to attach to".to_owned(),
                    ));
                };
                last.children.extend(parsed);
                last.tail_group = idx == nodes.len() - 1;
            }
        }
    }
    Ok(entries)
}
