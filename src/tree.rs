//! Tree summary of retained paths.
//!
//! Two renderings are produced:
//!
//! - [`TreeSummary::to_json`]: a nested mapping keyed by path segment, files
//!   as `null`, pretty-printed with two-space indentation.
//! - [`flat`]: the paths sorted lexicographically, one per line.
//!
//! Keys are kept in a `BTreeMap`, so output is deterministic for a given
//! path set regardless of input order.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File,
    Dir(TreeSummary),
}

/// Nested mapping of path segment to file marker or subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSummary {
    pub entries: BTreeMap<String, TreeNode>,
}

impl TreeSummary {
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = TreeSummary::default();
        for path in paths {
            root.insert(path.as_ref());
        }
        root
    }

    /// Inserts one `/`-delimited path. A name that is both a file and a
    /// directory stays a directory.
    pub fn insert(&mut self, path: &str) {
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let Some((last, dirs)) = parts.split_last() else {
            return;
        };

        let mut current = self;
        for dir in dirs {
            let node = current
                .entries
                .entry(dir.to_string())
                .or_insert_with(|| TreeNode::Dir(TreeSummary::default()));
            if *node == TreeNode::File {
                *node = TreeNode::Dir(TreeSummary::default());
            }
            current = match node {
                TreeNode::Dir(sub) => sub,
                TreeNode::File => unreachable!("file nodes are promoted above"),
            };
        }

        current
            .entries
            .entry(last.to_string())
            .or_insert(TreeNode::File);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of file leaves in the tree.
    pub fn file_count(&self) -> usize {
        self.entries
            .values()
            .map(|node| match node {
                TreeNode::File => 1,
                TreeNode::Dir(sub) => sub.file_count(),
            })
            .sum()
    }

    pub fn get(&self, segment: &str) -> Option<&TreeNode> {
        self.entries.get(segment)
    }

    pub fn to_json(&self) -> String {
        // Serializing string-keyed maps and nulls cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Serialize for TreeSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, node) in &self.entries {
            match node {
                TreeNode::File => map.serialize_entry(name, &())?,
                TreeNode::Dir(sub) => map.serialize_entry(name, sub)?,
            }
        }
        map.end()
    }
}

/// Paths sorted lexicographically and joined with `\n`.
pub fn flat<I, S>(paths: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sorted: Vec<String> = paths.into_iter().map(|p| p.as_ref().to_string()).collect();
    sorted.sort();
    sorted.join("\n")
}
