//! Model construction options

/// Which object the model tree is rooted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootSelection {
    /// The catalog dictionary named by the trailer's `/Root` entry
    #[default]
    Catalog,
    /// The trailer dictionary itself
    Trailer,
}

/// Options controlling how the object graph is presented as a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Expand references to their target object as a single child
    pub follow_references: bool,
    /// Maximum number of followed references on any root-to-node path.
    /// `None` expands reference chains (and cycles) for as long as the
    /// caller keeps asking for children.
    pub max_reference_depth: Option<usize>,
    /// Object the tree is rooted on
    pub root: RootSelection,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            follow_references: true,
            max_reference_depth: None,
            root: RootSelection::Catalog,
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_follow_references(mut self, follow: bool) -> Self {
        self.follow_references = follow;
        self
    }

    pub fn with_max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = Some(depth);
        self
    }

    pub fn with_root(mut self, root: RootSelection) -> Self {
        self.root = root;
        self
    }

    /// Whether a reference node with `depth` followed references above it may be expanded
    pub(crate) fn may_follow(&self, depth: usize) -> bool {
        self.follow_references && self.max_reference_depth.map_or(true, |max| depth < max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert!(config.follow_references);
        assert_eq!(config.max_reference_depth, None);
        assert_eq!(config.root, RootSelection::Catalog);
        assert!(config.may_follow(1000));
    }

    #[test]
    fn test_depth_guard() {
        let config = ModelConfig::new().with_max_reference_depth(2);
        assert!(config.may_follow(0));
        assert!(config.may_follow(1));
        assert!(!config.may_follow(2));
    }

    #[test]
    fn test_follow_disabled() {
        let config = ModelConfig::new()
            .with_follow_references(false)
            .with_root(RootSelection::Trailer);
        assert!(!config.may_follow(0));
        assert_eq!(config.root, RootSelection::Trailer);
    }
}
