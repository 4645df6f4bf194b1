//! PDF dictionary implementation

use indexmap::IndexMap;
use super::{Object, ObjectRef};
use super::object::write_name;

/// PDF dictionary object
///
/// Keys are kept in insertion order, which is the order the model
/// presents them in.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: IndexMap<String, Object>,
}

impl Dictionary {
    /// Create new dictionary
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Get value by key
    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.get(key)
    }

    /// Get mutable value by key
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Object> {
        self.entries.get_mut(key)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Get integer value
    pub fn get_integer(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(Object::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// Get name value
    pub fn get_name(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Object::as_name)
    }

    /// Get reference value
    pub fn get_reference(&self, key: &str) -> Option<ObjectRef> {
        self.get(key).and_then(Object::as_reference)
    }

    /// Set value. An existing key keeps its position; a new key is appended.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Object>) -> Option<Object> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Object)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write dictionary to output
    pub fn write_to(&self, output: &mut Vec<u8>) {
        output.extend_from_slice(b"<<");
        for (key, value) in self.iter() {
            output.push(b' ');
            write_name(output, key);
            output.push(b' ');
            value.write_to(output);
        }
        output.extend_from_slice(b" >>");
    }
}

// Key order is part of a dictionary's value
impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl<K: Into<String>, V: Into<Object>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        for (key, value) in iter {
            dict.set(key, value);
        }
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insertion_order() {
        let mut dict = Dictionary::new();
        dict.set("C", 1i64);
        dict.set("A", 2i64);
        dict.set("B", 3i64);

        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut dict: Dictionary = [("A", 1i64), ("B", 2i64), ("C", 3i64)].into_iter().collect();
        let old = dict.set("B", Object::name("Two"));

        assert_eq!(old, Some(Object::Integer(2)));
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(dict.get_name("B"), Some("Two"));
    }

    #[test]
    fn test_typed_getters() {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("Catalog"));
        dict.set("Pages", ObjectRef::new(2, 0));
        dict.set("Count", 4i64);

        assert_eq!(dict.get_name("Type"), Some("Catalog"));
        assert_eq!(dict.get_reference("Pages"), Some(ObjectRef::new(2, 0)));
        assert_eq!(dict.get_integer("Count"), Some(4));
        assert_eq!(dict.get_integer("Type"), None);
        assert!(!dict.has_key("Missing"));
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let ab: Dictionary = [("A", 1i64), ("B", 2i64)].into_iter().collect();
        let ba: Dictionary = [("B", 2i64), ("A", 1i64)].into_iter().collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn test_write() {
        let mut out = Vec::new();
        Dictionary::new().write_to(&mut out);
        assert_eq!(out, b"<< >>");
    }
}
