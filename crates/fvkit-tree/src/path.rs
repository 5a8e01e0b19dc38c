use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of a node as child indices from the root.
///
/// A path does not own or borrow the node it names. It stays meaningful as
/// long as the tree is not restructured (children added, removed or
/// reordered); resolve it with [`Firmware::get`](crate::Firmware::get).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The path of the root node.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build from explicit indices.
    pub fn from_indices(indices: impl Into<Vec<usize>>) -> Self {
        Self(indices.into())
    }

    /// Child indices, outermost first.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// The path of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub(crate) fn push(&mut self, index: usize) {
        self.0.push(index);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}
