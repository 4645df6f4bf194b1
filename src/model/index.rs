//! Model index for addressing rows of the tree-table

use super::NodeId;

/// A position within a [`PdfObjectModel`](super::PdfObjectModel).
///
/// An invalid index stands for the implicit top level (as a parent) or for
/// "no such item" (as a lookup result). Indices are only meaningful until
/// the next structural change announced by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModelIndex {
    row: usize,
    column: usize,
    node: Option<NodeId>,
}

impl ModelIndex {
    /// Creates an invalid (null) model index
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            row: 0,
            column: 0,
            node: None,
        }
    }

    #[inline]
    pub(crate) fn new(row: usize, column: usize, node: NodeId) -> Self {
        Self {
            row,
            column,
            node: Some(node),
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.node.is_some()
    }

    /// Row within the parent. 0 for invalid indices.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column within the row. 0 for invalid indices.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Tree node this index points at
    #[inline]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Same row and node, another column
    pub fn sibling_column(&self, column: usize) -> Self {
        if self.is_valid() {
            Self { column, ..*self }
        } else {
            *self
        }
    }
}
