//! In-memory PDF document: indirect objects, trailer and object identity

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ModelResult, ObjectModelError};
use super::{Object, ObjectRef};

/// Top-level owner of an object: the trailer or an indirect object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectRoot {
    Trailer,
    Indirect(ObjectRef),
}

/// One step from a container to one of its direct members
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// Stable identity of an object in a document.
///
/// A directly contained object is identified by the indirect object (or
/// trailer) that owns it and the chain of keys and array positions leading
/// to it. Every route to the same underlying object produces an equal id,
/// which is what makes alias tracking possible.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectId {
    root: ObjectRoot,
    path: Vec<PathStep>,
}

impl ObjectId {
    pub fn trailer() -> Self {
        Self {
            root: ObjectRoot::Trailer,
            path: Vec::new(),
        }
    }

    pub fn indirect(reference: ObjectRef) -> Self {
        Self {
            root: ObjectRoot::Indirect(reference),
            path: Vec::new(),
        }
    }

    pub fn root(&self) -> &ObjectRoot {
        &self.root
    }

    pub fn path(&self) -> &[PathStep] {
        &self.path
    }

    /// Id of the value stored under `key` in this dictionary
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.child(PathStep::Key(key.into()))
    }

    /// Id of the element at `index` in this array
    pub fn index(&self, index: usize) -> Self {
        self.child(PathStep::Index(index))
    }

    fn child(&self, step: PathStep) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(step);
        Self {
            root: self.root.clone(),
            path,
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            ObjectRoot::Trailer => write!(f, "trailer")?,
            ObjectRoot::Indirect(r) => write!(f, "{} {} obj", r.number, r.generation)?,
        }
        for step in &self.path {
            match step {
                PathStep::Key(key) => write!(f, "/{}", key)?,
                PathStep::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// PDF document object store
#[derive(Debug, Clone, Default)]
pub struct Document {
    objects: BTreeMap<ObjectRef, Object>,
    trailer: Object,
}

impl Document {
    /// Create a document with the given trailer and no objects
    pub fn new(trailer: Object) -> Self {
        Self {
            objects: BTreeMap::new(),
            trailer,
        }
    }

    /// Add or replace an indirect object
    pub fn insert(&mut self, reference: ObjectRef, object: Object) -> Option<Object> {
        self.objects.insert(reference, object)
    }

    /// Resolve an indirect reference. `None` for a dangling reference.
    pub fn resolve(&self, reference: ObjectRef) -> Option<&Object> {
        self.objects.get(&reference)
    }

    /// Resolve an indirect reference that must not dangle
    pub fn fetch(&self, reference: ObjectRef) -> ModelResult<&Object> {
        self.resolve(reference)
            .ok_or(ObjectModelError::ObjectNotFound(reference))
    }

    pub fn trailer(&self) -> &Object {
        &self.trailer
    }

    /// Reference held by the trailer's `/Root` entry
    pub fn catalog_ref(&self) -> ModelResult<ObjectRef> {
        let trailer = self.trailer.as_dict().ok_or_else(|| {
            ObjectModelError::invalid_document("Document invalid - non-dictionary trailer")
        })?;
        let root = trailer.get("Root").ok_or_else(|| {
            ObjectModelError::invalid_document("Document lacks catalog dictionary")
        })?;
        root.as_reference()
            .ok_or_else(|| ObjectModelError::invalid_document("Invalid /Root trailer entry"))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look up an object by identity
    pub fn get(&self, id: &ObjectId) -> Option<&Object> {
        let mut current = match &id.root {
            ObjectRoot::Trailer => &self.trailer,
            ObjectRoot::Indirect(r) => self.objects.get(r)?,
        };
        for step in &id.path {
            current = match (step, current) {
                (PathStep::Key(key), Object::Dictionary(dict)) => dict.get(key)?,
                (PathStep::Index(index), Object::Array(array)) => array.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Look up an object by identity for modification
    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut Object> {
        let mut current = match &id.root {
            ObjectRoot::Trailer => &mut self.trailer,
            ObjectRoot::Indirect(r) => self.objects.get_mut(r)?,
        };
        for step in &id.path {
            current = match (step, current) {
                (PathStep::Key(key), Object::Dictionary(dict)) => dict.get_mut(key)?,
                (PathStep::Index(index), Object::Array(array)) => array.get_mut(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }
}
