//! Tree-table presentation of a document's object graph
//!
//! [`ModelTree`] owns the nodes, builds them lazily and keeps the alias
//! index. [`PdfObjectModel`] exposes the tree as rows and columns and
//! announces structural changes through [`ModelListener`]s.

mod adapter;
mod config;
mod event;
mod index;
mod node;
mod role;
mod tree;

pub use adapter::PdfObjectModel;
pub use config::{ModelConfig, RootSelection};
pub use event::{ModelEvent, ModelListener};
pub use index::ModelIndex;
pub use node::{ModelNode, NodeId, Parentage};
pub use role::{Column, ItemData, ItemFlags, ItemRole, Orientation};
pub use tree::ModelTree;
