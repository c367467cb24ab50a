//! Validation findings, organised as a tree of named groups.
//!
//! A leaf holds zero or more messages; a group holds named children. The tree
//! is considered empty when no leaf anywhere below it carries a message, so
//! checks can always register their group and only fill it when they find
//! something.
//!
//! # Example
//!
//! ```
//! use bcn_core::diagnostics::ErrorTree;
//!
//! let mut root = ErrorTree::group();
//! let mut budget = ErrorTree::leaf();
//! root.push_child("shortest_paths", ErrorTree::leaf());
//! assert!(root.is_empty());
//!
//! budget.push_message("arc_1_2 could be upgraded");
//! root.push_child("budget_excess", budget);
//! assert!(!root.is_empty());
//! assert_eq!(root.flatten(), vec!["budget_excess: arc_1_2 could be upgraded"]);
//! ```

use serde::Serialize;
use std::fmt;

/// A tree of validation messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorTree {
    /// Messages collected by a single check
    Leaf(Vec<String>),
    /// Named sub-trees, in insertion order
    Group(Vec<(String, ErrorTree)>),
}

impl Default for ErrorTree {
    fn default() -> Self {
        ErrorTree::leaf()
    }
}

impl ErrorTree {
    pub fn leaf() -> Self {
        ErrorTree::Leaf(Vec::new())
    }

    pub fn group() -> Self {
        ErrorTree::Group(Vec::new())
    }

    /// Append a message. Pushing onto a group files it under an unnamed leaf.
    pub fn push_message(&mut self, message: impl Into<String>) {
        match self {
            ErrorTree::Leaf(messages) => messages.push(message.into()),
            ErrorTree::Group(children) => {
                if let Some((_, ErrorTree::Leaf(messages))) =
                    children.iter_mut().find(|(name, _)| name.is_empty())
                {
                    messages.push(message.into());
                } else {
                    children.push((String::new(), ErrorTree::Leaf(vec![message.into()])));
                }
            }
        }
    }

    /// Attach a named child. Attaching to a leaf turns it into a group that
    /// keeps the existing messages under an unnamed leaf.
    pub fn push_child(&mut self, name: impl Into<String>, child: ErrorTree) {
        if let ErrorTree::Leaf(messages) = self {
            let kept = std::mem::take(messages);
            *self = if kept.is_empty() {
                ErrorTree::group()
            } else {
                ErrorTree::Group(vec![(String::new(), ErrorTree::Leaf(kept))])
            };
        }
        if let ErrorTree::Group(children) = self {
            children.push((name.into(), child));
        }
    }

    /// Child registered under `name`, if any.
    pub fn child(&self, name: &str) -> Option<&ErrorTree> {
        match self {
            ErrorTree::Leaf(_) => None,
            ErrorTree::Group(children) => children
                .iter()
                .find(|(child, _)| child == name)
                .map(|(_, tree)| tree),
        }
    }

    /// True iff no message exists anywhere in the tree.
    pub fn is_empty(&self) -> bool {
        match self {
            ErrorTree::Leaf(messages) => messages.is_empty(),
            ErrorTree::Group(children) => children.iter().all(|(_, child)| child.is_empty()),
        }
    }

    /// Total number of messages in the tree.
    pub fn message_count(&self) -> usize {
        match self {
            ErrorTree::Leaf(messages) => messages.len(),
            ErrorTree::Group(children) => children.iter().map(|(_, c)| c.message_count()).sum(),
        }
    }

    /// Every message, prefixed by its `group/sub-group` path.
    pub fn flatten(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);
        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut Vec<String>) {
        match self {
            ErrorTree::Leaf(messages) => {
                for message in messages {
                    if prefix.is_empty() {
                        out.push(message.clone());
                    } else {
                        out.push(format!("{}: {}", prefix, message));
                    }
                }
            }
            ErrorTree::Group(children) => {
                for (name, child) in children {
                    let path = match (prefix.is_empty(), name.is_empty()) {
                        (true, _) => name.clone(),
                        (false, true) => prefix.to_string(),
                        (false, false) => format!("{}/{}", prefix, name),
                    };
                    child.flatten_into(&path, out);
                }
            }
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            ErrorTree::Leaf(messages) => {
                for message in messages {
                    writeln!(f, "{}- {}", pad, message)?;
                }
            }
            ErrorTree::Group(children) => {
                for (name, child) in children.iter().filter(|(_, c)| !c.is_empty()) {
                    if name.is_empty() {
                        child.fmt_indented(f, depth)?;
                    } else {
                        writeln!(f, "{}{}:", pad, name)?;
                        child.fmt_indented(f, depth + 1)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "no errors");
        }
        self.fmt_indented(f, 0)
    }
}
