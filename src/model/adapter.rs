//! Tree-table adapter presenting a [`ModelTree`] to a display layer.
//!
//! Rows are tree nodes; the top level holds a single row, the root. Queries
//! take `&mut self` because answering them may build children lazily.
//!
//! Any change of shape is bracketed by notifications for every node that
//! presents the changed object: rows are announced as removed before the
//! tree is trimmed and as inserted once it has been rebuilt.

use log::{debug, trace, warn};

use crate::error::{ModelResult, ObjectModelError};
use crate::pdf::{Document, Object, ObjectId};
use super::{
    Column, ItemData, ItemFlags, ItemRole, ModelConfig, ModelEvent, ModelIndex, ModelListener,
    ModelTree, NodeId, Orientation, RootSelection,
};

/// Dictionary keys shown in a dictionary's value summary
const SUMMARY_KEYS: [&str; 3] = ["Type", "SubType", "Name"];

/// Tree-table model over the object graph of one document
pub struct PdfObjectModel {
    document: Document,
    tree: ModelTree,
    listeners: Vec<Box<dyn ModelListener>>,
    document_changed: bool,
}

impl std::fmt::Debug for PdfObjectModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfObjectModel")
            .field("tree", &self.tree)
            .field("listeners", &self.listeners.len())
            .field("document_changed", &self.document_changed)
            .finish_non_exhaustive()
    }
}

impl PdfObjectModel {
    /// Build a model rooted on the document catalog, following references
    pub fn new(document: Document) -> ModelResult<Self> {
        Self::with_config(document, ModelConfig::default())
    }

    pub fn with_config(document: Document, config: ModelConfig) -> ModelResult<Self> {
        let root = match config.root {
            RootSelection::Catalog => {
                let catalog_ref = document.catalog_ref()?;
                let catalog = document.fetch(catalog_ref).map_err(|e| {
                    ObjectModelError::invalid_document(format!("Catalog unavailable: {}", e))
                })?;
                if !catalog.is_dictionary() {
                    return Err(ObjectModelError::invalid_document(
                        "Invalid or non-dictionary referenced by /Root trailer entry",
                    ));
                }
                ObjectId::indirect(catalog_ref)
            }
            RootSelection::Trailer => {
                if !document.trailer().is_dictionary() {
                    return Err(ObjectModelError::invalid_document(
                        "Document invalid - non-dictionary trailer",
                    ));
                }
                ObjectId::trailer()
            }
        };

        debug!("Creating object model rooted on {}", root);
        let tree = ModelTree::new(&document, root, config)?;
        Ok(Self {
            document,
            tree,
            listeners: Vec::new(),
            document_changed: false,
        })
    }

    /// Register a receiver for structural change notifications
    pub fn add_listener(&mut self, listener: impl ModelListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Give up the model and keep the (possibly edited) document
    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn tree(&self) -> &ModelTree {
        &self.tree
    }

    /// Whether an edit or insertion has changed the document
    pub fn is_document_changed(&self) -> bool {
        self.document_changed
    }

    /// Clear the changed flag, e.g. once the document has been saved
    pub fn mark_saved(&mut self) {
        self.document_changed = false;
    }

    fn emit(&mut self, event: ModelEvent) {
        trace!("Model event {:?}", event);
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
    }

    /// Live node behind `index`, if any
    fn node_for(&self, index: &ModelIndex) -> Option<NodeId> {
        index.node().filter(|&node| self.tree.contains(node))
    }

    /// Column-0 index of `node`
    pub fn index_for_node(&self, node: NodeId) -> ModelIndex {
        ModelIndex::new(self.tree.index_in_parent(node), 0, node)
    }

    /// Index of the item at `row`, `column` under `parent`. The invalid
    /// parent is the top level, whose only row is the root.
    pub fn index(&mut self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column >= Column::COUNT {
            return ModelIndex::invalid();
        }

        if !parent.is_valid() {
            return if row == 0 {
                ModelIndex::new(row, column, self.tree.root())
            } else {
                ModelIndex::invalid()
            };
        }

        let parent_node = match self.node_for(parent) {
            Some(node) => node,
            None => return ModelIndex::invalid(),
        };
        match self.tree.child(&self.document, parent_node, row) {
            Some(child) => ModelIndex::new(row, column, child),
            None => ModelIndex::invalid(),
        }
    }

    /// Index of the parent of `index`; invalid for the root
    pub fn parent(&self, index: &ModelIndex) -> ModelIndex {
        let node = match self.node_for(index) {
            Some(node) => node,
            None => return ModelIndex::invalid(),
        };

        match self.tree.parent(node) {
            Some(parent) => self.index_for_node(parent),
            None => {
                assert!(
                    node == self.tree.root(),
                    "node {:?} with no parent is not the root node",
                    node
                );
                ModelIndex::invalid()
            }
        }
    }

    pub fn row_count(&mut self, parent: &ModelIndex) -> usize {
        if !parent.is_valid() {
            return 1;
        }
        match self.node_for(parent) {
            Some(node) => self.tree.count_children(&self.document, node),
            None => 0,
        }
    }

    pub fn column_count(&self, _parent: &ModelIndex) -> usize {
        Column::COUNT
    }

    pub fn has_children(&mut self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    pub fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        match (orientation, role, Column::from_index(section)) {
            (Orientation::Horizontal, ItemRole::Display, Some(column)) => column.title().into(),
            _ => ItemData::None,
        }
    }

    pub fn flags(&self, index: &ModelIndex) -> ItemFlags {
        if self.node_for(index).is_none() {
            return ItemFlags::enabled_only();
        }
        ItemFlags::new().with_editable(index.column() == Column::Value.to_index())
    }

    /// Cell contents for `index` in `role`. Never modifies the document.
    pub fn data(&mut self, index: &ModelIndex, role: ItemRole) -> ItemData {
        let (node, column) = match (self.node_for(index), Column::from_index(index.column())) {
            (Some(node), Some(column)) => (node, column),
            _ => return ItemData::None,
        };

        match (column, role) {
            (Column::Object, ItemRole::Display) => ItemData::Text(self.node_label(node)),
            (Column::Object, ItemRole::Decoration) => self.node_icon(node),
            (Column::Type, ItemRole::Display) => {
                let object = self.tree.object(&self.document, node);
                object.data_type().as_str().into()
            }
            (Column::Value, ItemRole::Display) => {
                value_summary(self.tree.object(&self.document, node))
            }
            (Column::Value, ItemRole::Edit) => {
                ItemData::Text(self.tree.object(&self.document, node).to_string())
            }
            (_, ItemRole::ToolTip) => ItemData::Text(self.tree.object_id(node).to_string()),
            _ => ItemData::None,
        }
    }

    fn node_label(&self, node: NodeId) -> String {
        let parent = match self.tree.parent(node) {
            Some(parent) => parent,
            None => {
                return match self.tree.config().root {
                    RootSelection::Catalog => "/Root".to_string(),
                    RootSelection::Trailer => "Trailer".to_string(),
                }
            }
        };

        match self.tree.object(&self.document, parent) {
            Object::Dictionary(_) => self.tree.parent_key(node).unwrap_or_default().to_string(),
            Object::Array(_) => format!("<element {}>", self.tree.index_in_parent(node)),
            Object::Reference(r) => format!("{} {} obj", r.number, r.generation),
            _ => "<UNKNOWN>".to_string(),
        }
    }

    fn node_icon(&mut self, node: NodeId) -> ItemData {
        let icon = match self.tree.object(&self.document, node) {
            Object::Boolean(_) => "bool",
            Object::Integer(_) => "number",
            Object::Real(_) => "real",
            Object::String(_) => "litstring",
            Object::HexString(_) => "hexstring",
            Object::Name(_) => "name",
            Object::Array(_) | Object::Dictionary(_) => "dictionary",
            Object::Null => "empty",
            Object::Reference(_) => {
                if self.tree.count_children(&self.document, node) > 0 {
                    "reference"
                } else {
                    "dangling_reference"
                }
            }
            Object::RawData(_) => return ItemData::None,
        };
        ItemData::Icon(icon)
    }

    /// Object wrapped by the node behind `index`
    pub fn object_for_index(&self, index: &ModelIndex) -> Option<&Object> {
        self.node_for(index)
            .map(|node| self.tree.object(&self.document, node))
    }

    pub fn index_is_dictionary(&self, index: &ModelIndex) -> bool {
        self.object_for_index(index).map_or(false, Object::is_dictionary)
    }

    pub fn index_is_array(&self, index: &ModelIndex) -> bool {
        self.object_for_index(index).map_or(false, Object::is_array)
    }

    pub fn index_is_reference(&self, index: &ModelIndex) -> bool {
        self.object_for_index(index).map_or(false, Object::is_reference)
    }

    /// Child count of the node behind `index`; `None` for an invalid index
    pub fn index_child_count(&mut self, index: &ModelIndex) -> Option<usize> {
        let node = self.node_for(index)?;
        Some(self.tree.count_children(&self.document, node))
    }

    /// Replace the value behind `index` with the object literal in `value`.
    ///
    /// Only the value column accepts edits. Returns whether the document
    /// changed. A parse error is returned after the structure has been
    /// re-announced unchanged.
    pub fn set_data(&mut self, index: &ModelIndex, value: &[u8], role: ItemRole) -> ModelResult<bool> {
        let node = self.node_for(index).ok_or(ObjectModelError::InvalidIndex)?;
        if index.column() != Column::Value.to_index() {
            return Err(ObjectModelError::InvalidIndex);
        }
        if role != ItemRole::Edit {
            return Err(ObjectModelError::InvalidArgument(format!(
                "cannot set data for role {:?}",
                role
            )));
        }
        if value.is_empty() {
            return Err(ObjectModelError::EmptyEdit);
        }

        let object = self.tree.object_id(node).clone();
        debug!("Editing {} through node {:?}", object, node);

        // A simple value may become a container, so even scalar edits go
        // through the full subtree protocol.
        self.prepare_for_subtree_change(&object);
        let target = self.live_alias(node, &object);
        let result = self.tree.set_raw_data(&mut self.document, target, value);
        self.subtree_changed(&object);

        match result {
            Ok(changed) => {
                self.document_changed |= changed;
                Ok(changed)
            }
            Err(e) => {
                warn!("Rejected edit of {}: {}", object, e);
                Err(e)
            }
        }
    }

    /// Insert a null element before `row` in the array behind `parent`.
    /// The invalid index addresses the root.
    pub fn insert_element(&mut self, row: usize, parent: &ModelIndex) -> ModelResult<()> {
        let node = self.container_node(parent)?;
        if !self.tree.can_insert_element(&self.document, node, row) {
            let len = self.tree.object(&self.document, node).as_array().map_or(0, Vec::len);
            return Err(ObjectModelError::CannotInsertElement { row, len });
        }

        let object = self.tree.object_id(node).clone();
        self.prepare_for_subtree_change(&object);
        let target = self.live_alias(node, &object);
        let result = self.tree.insert_element(&mut self.document, target, row);
        self.subtree_changed(&object);

        result?;
        self.document_changed = true;
        Ok(())
    }

    /// Add a null entry named `key` to the dictionary behind `parent`.
    /// The invalid index addresses the root.
    pub fn insert_key(&mut self, key: &str, parent: &ModelIndex) -> ModelResult<()> {
        let node = self.container_node(parent)?;
        if !self.tree.can_insert_key(&self.document, node, key) {
            return Err(ObjectModelError::CannotInsertKey(format!(
                "/{} cannot be added to {}",
                key,
                self.tree.object_id(node)
            )));
        }

        let object = self.tree.object_id(node).clone();
        self.prepare_for_subtree_change(&object);
        let target = self.live_alias(node, &object);
        let result = self.tree.insert_key(&mut self.document, target, key);
        self.subtree_changed(&object);

        result?;
        self.document_changed = true;
        Ok(())
    }

    /// Generic row insertion is not supported; rows are created with
    /// [`insert_element`](Self::insert_element) or [`insert_key`](Self::insert_key).
    pub fn insert_row(&mut self, _row: usize, _parent: &ModelIndex) -> ModelResult<()> {
        Err(ObjectModelError::unsupported(
            "Use insert_element(...) or insert_key(...) instead",
        ))
    }

    /// Drop the cached children of the node behind `index` so they are
    /// rebuilt from the document on next access
    pub fn invalidate_children(&mut self, index: &ModelIndex) {
        if let Some(node) = self.node_for(index) {
            self.emit(ModelEvent::LayoutAboutToBeChanged);
            self.tree.invalidate_children(node);
            self.emit(ModelEvent::LayoutChanged);
            self.emit(ModelEvent::DataChanged {
                top_left: *index,
                bottom_right: *index,
            });
        }
    }

    fn container_node(&self, parent: &ModelIndex) -> ModelResult<NodeId> {
        if !parent.is_valid() {
            return Ok(self.tree.root());
        }
        self.node_for(parent).ok_or(ObjectModelError::InvalidIndex)
    }

    // When an object is reachable from inside itself, trimming an outer
    // alias destroys the inner ones. The first alias is never inside another.
    fn live_alias(&self, node: NodeId, object: &ObjectId) -> NodeId {
        if self.tree.contains(node) {
            return node;
        }
        self.tree
            .aliases_of(object)
            .first()
            .copied()
            .unwrap_or_else(|| panic!("no live node left for {} after trimming its aliases", object))
    }

    /// Announce and perform the removal of the children of every node
    /// wrapping `object`, then make those nodes pretend to be empty.
    fn prepare_for_subtree_change(&mut self, object: &ObjectId) {
        for alias in self.tree.aliases_of(object) {
            // Already destroyed along with an outer alias's subtree
            if !self.tree.contains(alias) {
                continue;
            }

            let count = self.tree.count_children(&self.document, alias);
            if count > 0 {
                let parent = self.index_for_node(alias);
                self.emit(ModelEvent::RowsAboutToBeRemoved {
                    parent,
                    first: 0,
                    last: count - 1,
                });
                self.tree.invalidate_children(alias);
                self.tree.set_pretend_empty(alias, true);
                self.emit(ModelEvent::RowsRemoved {
                    parent,
                    first: 0,
                    last: count - 1,
                });
            } else {
                self.tree.invalidate_children(alias);
                self.tree.set_pretend_empty(alias, true);
            }
        }
    }

    /// Stop pretending, then announce the rebuilt children and the changed
    /// value of every node wrapping `object`.
    fn subtree_changed(&mut self, object: &ObjectId) {
        for alias in self.tree.aliases_of(object) {
            if !self.tree.contains(alias) {
                continue;
            }

            self.tree.set_pretend_empty(alias, false);
            let index = self.index_for_node(alias);
            let count = self.tree.count_children(&self.document, alias);
            if count > 0 {
                self.emit(ModelEvent::RowsAboutToBeInserted {
                    parent: index,
                    first: 0,
                    last: count - 1,
                });
                self.emit(ModelEvent::RowsInserted {
                    parent: index,
                    first: 0,
                    last: count - 1,
                });
            }
            self.emit(ModelEvent::DataChanged {
                top_left: index,
                bottom_right: index.sibling_column(Column::Value.to_index()),
            });
        }
    }
}

fn value_summary(object: &Object) -> ItemData {
    match object {
        Object::Dictionary(dict) => {
            let mut value = String::from("<< ");
            for key in SUMMARY_KEYS {
                if let Some(entry) = dict.get(key) {
                    value.push_str(&format!("/{} {} ", key, entry));
                }
            }
            value.push_str("... >>");
            ItemData::Text(value)
        }
        Object::Array(_) => ItemData::None,
        other => ItemData::Text(other.to_string()),
    }
}
