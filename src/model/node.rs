//! Model nodes: one occurrence of one underlying object at one tree position.
//!
//! Nodes live in the [`ModelTree`] arena and are addressed by [`NodeId`].
//! Children are built lazily, one level at a time, the first time anyone
//! asks for them, and are thrown away as a whole by `invalidate_children`.

use log::{debug, trace, warn};
use slotmap::new_key_type;

use crate::error::{ModelResult, ObjectModelError};
use crate::pdf::{parse_object, Document, Object, ObjectId};
use super::ModelTree;

new_key_type! {
    /// Handle of a node in a [`ModelTree`]. Stays unique after the node is
    /// destroyed, so stale handles are detected rather than reused.
    pub struct NodeId;
}

/// How a node is related to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parentage {
    /// Directly contained by the parent dictionary or array
    Contained,
    /// Target of the parent reference
    Referenced,
    /// Root of the tree; has no parent
    Root,
}

/// Child list state
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Children {
    Unpopulated,
    Populated(Vec<NodeId>),
}

/// Wrapper around one underlying object in one tree position
#[derive(Debug)]
pub struct ModelNode {
    object: ObjectId,
    parentage: Parentage,
    // Root: none. Contained: the containing dictionary / array.
    // Referenced: the reference object that points here.
    parent: Option<NodeId>,
    // Key in the containing dictionary; none for array elements and
    // referenced objects.
    parent_key: Option<String>,
    // Position in the parent's child list; 0 for the root
    row: usize,
    pub(crate) children: Children,
    pretend_empty: bool,
}

impl ModelNode {
    pub(crate) fn new(
        object: ObjectId,
        parent: Option<NodeId>,
        parent_key: Option<String>,
        parentage: Parentage,
        row: usize,
    ) -> Self {
        Self {
            object,
            parentage,
            parent,
            parent_key,
            row,
            children: Children::Unpopulated,
            pretend_empty: false,
        }
    }

    /// Identity of the wrapped object
    pub fn object(&self) -> &ObjectId {
        &self.object
    }

    pub fn parentage(&self) -> Parentage {
        self.parentage
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn parent_key(&self) -> Option<&str> {
        self.parent_key.as_deref()
    }

    pub fn is_pretend_empty(&self) -> bool {
        self.pretend_empty
    }

    /// Row the node was created for in its parent's child list
    pub fn row(&self) -> usize {
        self.row
    }

    /// Whether the child list has been built since the last invalidation
    pub fn is_populated(&self) -> bool {
        matches!(self.children, Children::Populated(_))
    }
}

impl ModelTree {
    /// Number of children of `id`, building the child list if needed.
    /// A node pretending to be empty reports 0 without being populated.
    pub fn count_children(&mut self, document: &Document, id: NodeId) -> usize {
        if self.node(id).is_pretend_empty() {
            return 0;
        }
        self.children_of(document, id).len()
    }

    /// The `n`th child of `id`, or `None` if there is no such child
    pub fn child(&mut self, document: &Document, id: NodeId, n: usize) -> Option<NodeId> {
        if self.node(id).is_pretend_empty() {
            return None;
        }
        self.children_of(document, id).get(n).copied()
    }

    /// Row of `id` in its parent's child list. The root occupies row 0 of
    /// the single-row top level.
    pub fn index_in_parent(&self, id: NodeId) -> usize {
        let parent = match self.node(id).parent() {
            Some(parent) => parent,
            None => {
                assert!(id == self.root(), "node {:?} with no parent is not the root node", id);
                return 0;
            }
        };

        let row = self.node(id).row();
        let listed = match &self.node(parent).children {
            Children::Populated(children) => children.get(row) == Some(&id),
            Children::Unpopulated => false,
        };
        if !listed {
            panic!("Node {:?} not present in parent's list of children", id);
        }
        row
    }

    /// Forget the children of `id`, destroying their subtrees. They are
    /// rebuilt from the document the next time they are asked for.
    ///
    /// Callers presenting the tree must announce row removal before calling
    /// this; the tree itself emits nothing.
    pub fn invalidate_children(&mut self, id: NodeId) {
        let children = std::mem::replace(&mut self.node_mut(id).children, Children::Unpopulated);
        if let Children::Populated(children) = children {
            trace!("Invalidating {} children of node {:?}", children.len(), id);
            for child in children {
                self.destroy_subtree(child);
            }
        }
    }

    pub fn set_pretend_empty(&mut self, id: NodeId, empty: bool) {
        self.node_mut(id).pretend_empty = empty;
    }

    pub fn is_pretend_empty(&self, id: NodeId) -> bool {
        self.node(id).is_pretend_empty()
    }

    /// Whether an element may be inserted into the array wrapped by `id`
    /// before row `row`. Insertion is allowed between existing elements and
    /// at the end, but not at the very front.
    pub fn can_insert_element(&self, document: &Document, id: NodeId, row: usize) -> bool {
        match self.object(document, id) {
            Object::Array(array) => row > 0 && row <= array.len(),
            _ => false,
        }
    }

    /// Insert a null element into the array wrapped by `id` at `row`
    pub fn insert_element(&mut self, document: &mut Document, id: NodeId, row: usize) -> ModelResult<()> {
        let object = self.object(document, id);
        let len = match object {
            Object::Array(array) => array.len(),
            other => {
                return Err(ObjectModelError::InvalidObjectType {
                    expected: "Array",
                    found: other.data_type().as_str(),
                })
            }
        };
        if !self.can_insert_element(document, id, row) {
            return Err(ObjectModelError::CannotInsertElement { row, len });
        }

        let object_id = self.node(id).object().clone();
        debug!("Inserting null element at {} into {}", row, object_id);
        self.invalidate_alias_children(&object_id);
        if let Some(array) = self.object_mut(document, &object_id).as_array_mut() {
            array.insert(row, Object::Null);
        }
        Ok(())
    }

    /// Whether `key` may be added to the dictionary wrapped by `id`
    pub fn can_insert_key(&self, document: &Document, id: NodeId, key: &str) -> bool {
        match self.object(document, id) {
            Object::Dictionary(dict) => !key.is_empty() && !dict.has_key(key),
            _ => false,
        }
    }

    /// Add a null entry under `key` to the dictionary wrapped by `id`
    pub fn insert_key(&mut self, document: &mut Document, id: NodeId, key: &str) -> ModelResult<()> {
        if !self.can_insert_key(document, id, key) {
            let reason = match self.object(document, id) {
                Object::Dictionary(_) if key.is_empty() => "empty key name".to_string(),
                Object::Dictionary(_) => format!("key /{} already present", key),
                other => format!("{} is not a dictionary", other.data_type()),
            };
            return Err(ObjectModelError::CannotInsertKey(reason));
        }

        let object_id = self.node(id).object().clone();
        debug!("Inserting key /{} into {}", key, object_id);
        self.invalidate_alias_children(&object_id);
        if let Some(dict) = self.object_mut(document, &object_id).as_dict_mut() {
            dict.set(key, Object::Null);
        }
        Ok(())
    }

    /// Replace the value of the object wrapped by `id` with the single
    /// object literal in `data`.
    ///
    /// On a parse error nothing is modified and no children are dropped.
    /// Returns whether the stored value differs from the previous one.
    pub fn set_raw_data(&mut self, document: &mut Document, id: NodeId, data: &[u8]) -> ModelResult<bool> {
        let value = parse_object(data)?;

        let object_id = self.node(id).object().clone();
        self.invalidate_alias_children(&object_id);
        let target = self.object_mut(document, &object_id);
        let changed = *target != value;
        *target = value;
        debug!("Set {} to new {} value (changed: {})", object_id, target.data_type(), changed);
        Ok(changed)
    }

    /// Number of followed references on the path from the root to `id`
    pub fn reference_depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = Some(id);
        while let Some(node) = current {
            let node = self.node(node);
            if node.parentage() == Parentage::Referenced {
                depth += 1;
            }
            current = node.parent();
        }
        depth
    }

    // Every node wrapping the object shares its children's ids, so a change
    // of shape must drop the child lists of all of them.
    fn invalidate_alias_children(&mut self, object: &ObjectId) {
        for alias in self.aliases_of(object) {
            if self.contains(alias) {
                self.invalidate_children(alias);
            }
        }
    }

    fn object_mut<'d>(&self, document: &'d mut Document, object: &ObjectId) -> &'d mut Object {
        document.get_mut(object).unwrap_or_else(|| {
            panic!("object {} is missing: document modified outside the model", object)
        })
    }

    fn children_of(&mut self, document: &Document, id: NodeId) -> &[NodeId] {
        if !self.node(id).is_populated() {
            self.populate_children(document, id);
        }
        match &self.node(id).children {
            Children::Populated(children) => children,
            Children::Unpopulated => &[],
        }
    }

    fn populate_children(&mut self, document: &Document, id: NodeId) {
        let object_id = self.node(id).object().clone();
        let entries: Vec<(ObjectId, Option<String>, Parentage)> = match self.object(document, id) {
            Object::Reference(reference) if self.follow_references() => {
                if !self.config().may_follow(self.reference_depth(id)) {
                    trace!("Not following {} from {}: reference depth limit", reference, object_id);
                    Vec::new()
                } else if document.resolve(*reference).is_some() {
                    vec![(ObjectId::indirect(*reference), None, Parentage::Referenced)]
                } else {
                    warn!("Dangling reference {} at {}", reference, object_id);
                    Vec::new()
                }
            }
            Object::Dictionary(dict) => dict
                .keys()
                .map(|key| (object_id.key(key), Some(key.to_string()), Parentage::Contained))
                .collect(),
            Object::Array(array) => (0..array.len())
                .map(|i| (object_id.index(i), None, Parentage::Contained))
                .collect(),
            _ => Vec::new(),
        };

        trace!("Populating {} children of node {:?} ({})", entries.len(), id, object_id);
        let mut children = Vec::with_capacity(entries.len());
        for (row, (object, key, parentage)) in entries.into_iter().enumerate() {
            let child = self
                .create_node(object, Some(id), key, parentage, row)
                .unwrap_or_else(|e| panic!("child node creation failed: {}", e));
            children.push(child);
        }
        self.node_mut(id).children = Children::Populated(children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelConfig;
    use crate::pdf::{parse_document, ObjectRef};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const SAMPLE: &[u8] = b"\
        1 0 obj << /Type /Catalog /Pages 2 0 R /Dict << /A 1 /B (two) /C /Three >> /Arr [10 20 30] /Lost 9 0 R >> endobj\n\
        2 0 obj << /Type /Pages /Count 0 >> endobj\n\
        trailer << /Root 1 0 R >>";

    fn setup(config: ModelConfig) -> (Document, ModelTree) {
        let doc = parse_document(SAMPLE).expect("document");
        let tree = ModelTree::new(&doc, ObjectId::indirect(ObjectRef::new(1, 0)), config).expect("tree");
        (doc, tree)
    }

    fn child_keys(tree: &mut ModelTree, doc: &Document, id: NodeId) -> Vec<Option<String>> {
        let count = tree.count_children(doc, id);
        (0..count)
            .map(|i| {
                let child = tree.child(doc, id, i).expect("child");
                tree.parent_key(child).map(str::to_string)
            })
            .collect()
    }

    #[test_log::test]
    fn test_dictionary_children_in_key_order() {
        let (doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let dict = tree.child(&doc, root, 2).expect("/Dict");

        assert_eq!(
            child_keys(&mut tree, &doc, dict),
            vec![Some("A".to_string()), Some("B".to_string()), Some("C".to_string())]
        );
        for i in 0..3 {
            let child = tree.child(&doc, dict, i).expect("child");
            assert_eq!(tree.parentage(child), Parentage::Contained);
            assert_eq!(tree.parent(child), Some(dict));
            assert_eq!(tree.index_in_parent(child), i);
        }
    }

    #[test_log::test]
    fn test_array_children_have_no_key() {
        let (doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let arr = tree.child(&doc, root, 3).expect("/Arr");

        assert_eq!(child_keys(&mut tree, &doc, arr), vec![None, None, None]);
        let second = tree.child(&doc, arr, 1).expect("element");
        assert_eq!(tree.object(&doc, second), &Object::Integer(20));
        assert_eq!(tree.child(&doc, arr, 3), None);
    }

    #[test_log::test]
    fn test_population_is_lazy() {
        let (doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        assert!(!tree.node(root).is_populated());

        assert_eq!(tree.count_children(&doc, root), 5);
        assert_eq!(tree.len(), 6);
        let dict = tree.child(&doc, root, 2).expect("/Dict");
        assert!(!tree.node(dict).is_populated());
    }

    #[test_log::test]
    fn test_reference_has_single_referenced_child() {
        let (doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let pages_ref = tree.child(&doc, root, 1).expect("/Pages");

        assert_eq!(tree.count_children(&doc, pages_ref), 1);
        let pages = tree.child(&doc, pages_ref, 0).expect("pages");
        assert_eq!(tree.parentage(pages), Parentage::Referenced);
        assert_eq!(tree.parent_key(pages), None);
        assert_eq!(tree.object_id(pages), &ObjectId::indirect(ObjectRef::new(2, 0)));
        assert_eq!(tree.reference_depth(pages), 1);
    }

    #[test_log::test]
    fn test_dangling_reference_is_leaf() {
        let (doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let lost = tree.child(&doc, root, 4).expect("/Lost");

        assert_eq!(tree.count_children(&doc, lost), 0);
        assert!(tree.node(lost).is_populated());
    }

    #[test_log::test]
    fn test_references_not_followed_when_disabled() {
        let (doc, mut tree) = setup(ModelConfig::default().with_follow_references(false));
        let root = tree.root();
        let pages_ref = tree.child(&doc, root, 1).expect("/Pages");
        assert_eq!(tree.count_children(&doc, pages_ref), 0);
    }

    #[test_log::test]
    fn test_invalidate_then_repopulate_is_identical() {
        let (doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let before = child_keys(&mut tree, &doc, root);

        tree.invalidate_children(root);
        assert!(!tree.node(root).is_populated());
        assert_eq!(tree.len(), 1);

        assert_eq!(child_keys(&mut tree, &doc, root), before);
    }

    #[test_log::test]
    fn test_pretend_empty_keeps_cache() {
        let (doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let first = tree.child(&doc, root, 0).expect("child");

        tree.set_pretend_empty(root, true);
        assert_eq!(tree.count_children(&doc, root), 0);
        assert_eq!(tree.child(&doc, root, 0), None);
        assert!(tree.contains(first));

        tree.set_pretend_empty(root, false);
        assert_eq!(tree.child(&doc, root, 0), Some(first));
    }

    #[test_log::test]
    fn test_pretend_empty_does_not_populate() {
        let (doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        tree.set_pretend_empty(root, true);

        assert_eq!(tree.count_children(&doc, root), 0);
        assert!(!tree.node(root).is_populated());
    }

    #[test_log::test]
    fn test_root_index_in_parent() {
        let (_doc, tree) = setup(ModelConfig::default());
        assert_eq!(tree.index_in_parent(tree.root()), 0);
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(2, true)]
    #[case(3, true)]
    #[case(4, false)]
    #[case(10, false)]
    fn test_can_insert_element_boundaries(#[case] row: usize, #[case] allowed: bool) {
        let (doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let arr = tree.child(&doc, root, 3).expect("/Arr");
        assert_eq!(tree.can_insert_element(&doc, arr, row), allowed);
    }

    #[test_log::test]
    fn test_insert_element_shifts_elements() -> ModelResult<()> {
        let (mut doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let arr = tree.child(&doc, root, 3).expect("/Arr");
        assert_eq!(tree.count_children(&doc, arr), 3);

        tree.insert_element(&mut doc, arr, 2)?;

        assert_eq!(
            tree.object(&doc, arr),
            &Object::Array(vec![
                Object::Integer(10),
                Object::Integer(20),
                Object::Null,
                Object::Integer(30),
            ])
        );
        assert_eq!(tree.count_children(&doc, arr), 4);
        Ok(())
    }

    #[test_log::test]
    fn test_insert_element_rejected() {
        let (mut doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let arr = tree.child(&doc, root, 3).expect("/Arr");

        let err = tree.insert_element(&mut doc, arr, 0).unwrap_err();
        assert!(matches!(err, ObjectModelError::CannotInsertElement { row: 0, len: 3 }));

        let err = tree.insert_element(&mut doc, root, 1).unwrap_err();
        assert!(matches!(err, ObjectModelError::InvalidObjectType { expected: "Array", .. }));
    }

    #[test_log::test]
    fn test_insert_key() -> ModelResult<()> {
        let (mut doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let dict = tree.child(&doc, root, 2).expect("/Dict");

        assert!(tree.can_insert_key(&doc, dict, "D"));
        assert!(!tree.can_insert_key(&doc, dict, "A"));
        assert!(!tree.can_insert_key(&doc, dict, ""));

        tree.insert_key(&mut doc, dict, "D")?;
        assert_eq!(
            child_keys(&mut tree, &doc, dict),
            vec![Some("A".into()), Some("B".into()), Some("C".into()), Some("D".into())]
        );
        let d = tree.child(&doc, dict, 3).expect("/D");
        assert_eq!(tree.object(&doc, d), &Object::Null);

        assert!(matches!(
            tree.insert_key(&mut doc, dict, "A"),
            Err(ObjectModelError::CannotInsertKey(_))
        ));
        assert!(tree.insert_key(&mut doc, root, "").is_err());
        Ok(())
    }

    #[test_log::test]
    fn test_set_raw_data_replaces_container() -> ModelResult<()> {
        let (mut doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let dict = tree.child(&doc, root, 2).expect("/Dict");
        assert_eq!(tree.count_children(&doc, dict), 3);

        assert!(tree.set_raw_data(&mut doc, dict, b"/Foo")?);

        assert_eq!(tree.object(&doc, dict), &Object::name("Foo"));
        assert_eq!(tree.count_children(&doc, dict), 0);
        assert_eq!(tree.count_aliases_of(&tree.object_id(dict).key("A")), 0);
        Ok(())
    }

    #[test_log::test]
    fn test_set_raw_data_unchanged_value() -> ModelResult<()> {
        let (mut doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let arr = tree.child(&doc, root, 3).expect("/Arr");

        assert!(!tree.set_raw_data(&mut doc, arr, b"[10 20 30]")?);
        assert!(tree.set_raw_data(&mut doc, arr, b"[10 20]")?);
        assert_eq!(tree.count_children(&doc, arr), 2);
        Ok(())
    }

    #[test_log::test]
    fn test_set_raw_data_parse_error_leaves_node() {
        let (mut doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let dict = tree.child(&doc, root, 2).expect("/Dict");
        let first = tree.child(&doc, dict, 0).expect("/A");

        let err = tree.set_raw_data(&mut doc, dict, b"<< /Broken").unwrap_err();
        assert!(err.is_parse_error());
        assert!(tree.contains(first));
        assert_eq!(tree.count_children(&doc, dict), 3);
        assert!(tree.object(&doc, dict).is_dictionary());
    }

    #[test_log::test]
    fn test_rows_recorded_at_population() -> ModelResult<()> {
        let doc = parse_document(
            b"1 0 obj << /Big [0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15] >> endobj trailer << /Root 1 0 R >>",
        )?;
        let mut tree = ModelTree::new(&doc, ObjectId::indirect(ObjectRef::new(1, 0)), ModelConfig::default())?;
        let root = tree.root();
        let big = tree.child(&doc, root, 0).expect("/Big");

        assert_eq!(tree.count_children(&doc, big), 16);
        for row in 0..16 {
            let element = tree.child(&doc, big, row).expect("element");
            assert_eq!(tree.get(element).map(ModelNode::row), Some(row));
            assert_eq!(tree.index_in_parent(element), row);
        }
        Ok(())
    }

    #[test_log::test]
    #[should_panic(expected = "not present in parent's list of children")]
    fn test_unlisted_child_panics() {
        let (_doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        let object = tree.object_id(root).key("Type");
        let stray = tree
            .create_node(object, Some(root), Some("Type".to_string()), Parentage::Contained, 0)
            .expect("node");
        tree.index_in_parent(stray);
    }

    #[test_log::test]
    #[should_panic(expected = "not present in parent's list of children")]
    fn test_child_listed_at_other_row_panics() {
        let (doc, mut tree) = setup(ModelConfig::default());
        let root = tree.root();
        assert_eq!(tree.count_children(&doc, root), 5);
        let object = tree.object_id(root).key("Arr");
        let stray = tree
            .create_node(object, Some(root), Some("Arr".to_string()), Parentage::Contained, 3)
            .expect("node");
        tree.index_in_parent(stray);
    }

    #[test_log::test]
    #[should_panic(expected = "with no parent is not the root node")]
    fn test_parentless_non_root_panics() {
        let (_doc, mut tree) = setup(ModelConfig::default());
        let detached = tree
            .create_node(ObjectId::trailer(), None, None, Parentage::Root, 0)
            .expect("node");
        tree.index_in_parent(detached);
    }
}
