//! Model tree: owns every node built for one document and tracks which
//! nodes present the same underlying object.
//!
//! The tree relies on the document not being modified except through the
//! tree's own operations (or the model built on it). Modifying the document
//! behind its back breaks the alias index and the child lists, and is
//! reported by a panic the next time the damage is noticed.

use std::collections::HashMap;
use log::{debug, trace};
use slotmap::SlotMap;

use crate::error::{ModelResult, ObjectModelError};
use crate::pdf::{Document, Object, ObjectId};
use super::node::{Children, ModelNode, NodeId, Parentage};
use super::ModelConfig;

/// Arena of model nodes plus the alias index over their objects
#[derive(Debug)]
pub struct ModelTree {
    pub(super) nodes: SlotMap<NodeId, ModelNode>,
    aliases: HashMap<ObjectId, Vec<NodeId>>,
    root: NodeId,
    config: ModelConfig,
}

impl ModelTree {
    /// Create a tree rooted on `root`. Only the root node is built; its
    /// descendants are created on demand.
    pub fn new(document: &Document, root: ObjectId, config: ModelConfig) -> ModelResult<Self> {
        if document.get(&root).is_none() {
            return Err(ObjectModelError::InvalidArgument(format!(
                "root object {} is not in the document",
                root
            )));
        }

        let mut tree = Self {
            nodes: SlotMap::with_key(),
            aliases: HashMap::new(),
            root: NodeId::default(),
            config,
        };
        tree.root = tree.create_node(root, None, None, Parentage::Root, 0)?;
        debug!("Created model tree rooted on {}", tree.nodes[tree.root].object());
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn follow_references(&self) -> bool {
        self.config.follow_references
    }

    /// Node by id, or `None` if it has been destroyed
    pub fn get(&self, id: NodeId) -> Option<&ModelNode> {
        self.nodes.get(id)
    }

    /// Ids of all live nodes, in no particular order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by id. A stale id here means a caller kept a node past an
    /// invalidation, which the tree cannot recover from.
    pub(crate) fn node(&self, id: NodeId) -> &ModelNode {
        self.nodes
            .get(id)
            .unwrap_or_else(|| panic!("model node {:?} used after it was destroyed", id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut ModelNode {
        self.nodes
            .get_mut(id)
            .unwrap_or_else(|| panic!("model node {:?} used after it was destroyed", id))
    }

    /// Object wrapped by `id`, looked up in `document`
    pub(crate) fn object<'d>(&self, document: &'d Document, id: NodeId) -> &'d Object {
        let object = self.node(id).object();
        document.get(object).unwrap_or_else(|| {
            panic!(
                "object {} of model node {:?} is missing: document modified outside the model",
                object, id
            )
        })
    }

    pub fn object_id(&self, id: NodeId) -> &ObjectId {
        self.node(id).object()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent()
    }

    pub fn parent_key(&self, id: NodeId) -> Option<&str> {
        self.node(id).parent_key()
    }

    pub fn parentage(&self, id: NodeId) -> Parentage {
        self.node(id).parentage()
    }

    /// Number of live nodes wrapping `object`
    pub fn count_aliases_of(&self, object: &ObjectId) -> usize {
        self.aliases.get(object).map_or(0, Vec::len)
    }

    /// Live nodes wrapping `object`, in creation order
    pub fn aliases_of(&self, object: &ObjectId) -> Vec<NodeId> {
        self.aliases.get(object).cloned().unwrap_or_default()
    }

    /// Number of nodes wrapping the same object as `id`, including `id`
    pub fn count_aliases(&self, id: NodeId) -> usize {
        self.count_aliases_of(self.node(id).object())
    }

    /// Nodes wrapping the same object as `id`, including `id`
    pub fn aliases(&self, id: NodeId) -> Vec<NodeId> {
        self.aliases_of(self.node(id).object())
    }

    /// Build and register a node. Every node except the root needs a parent.
    pub(crate) fn create_node(
        &mut self,
        object: ObjectId,
        parent: Option<NodeId>,
        parent_key: Option<String>,
        parentage: Parentage,
        row: usize,
    ) -> ModelResult<NodeId> {
        if parentage != Parentage::Root && parent.is_none() {
            return Err(ObjectModelError::InvalidArgument(
                "Non-root node with null parent".to_string(),
            ));
        }

        let id = self.nodes.insert(ModelNode::new(object, parent, parent_key, parentage, row));
        self.node_created(id);
        Ok(id)
    }

    fn node_created(&mut self, id: NodeId) {
        let object = self.nodes[id].object().clone();
        trace!("Node {:?} created for {}", id, object);
        self.aliases.entry(object).or_default().push(id);
    }

    fn node_deleted(&mut self, id: NodeId, object: &ObjectId) {
        trace!("Node {:?} deleted for {}", id, object);
        let nodes = self.aliases.get_mut(object).unwrap_or_else(|| {
            panic!("Could not find object {} in alias map for deleted node {:?}", object, id)
        });
        let position = nodes.iter().position(|&n| n == id).unwrap_or_else(|| {
            panic!("Could not find object,node pair ({}, {:?}) in alias map", object, id)
        });
        nodes.remove(position);
        if nodes.is_empty() {
            self.aliases.remove(object);
        }
    }

    /// Destroy `id` and everything below it, deregistering each node
    pub(crate) fn destroy_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let node = self
                .nodes
                .remove(id)
                .unwrap_or_else(|| panic!("model node {:?} destroyed twice", id));
            if let Children::Populated(children) = &node.children {
                pending.extend(children.iter().copied());
            }
            self.node_deleted(id, node.object());
        }
    }
}

impl Drop for ModelTree {
    fn drop(&mut self) {
        if self.nodes.contains_key(self.root) {
            self.destroy_subtree(self.root);
        }
        if !std::thread::panicking() {
            assert!(
                self.aliases.is_empty() && self.nodes.is_empty(),
                "model tree torn down with {} orphaned nodes",
                self.nodes.len()
            );
        }
    }
}
