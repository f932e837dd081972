use std::fmt;

use nodal_engine::coords::Vec2;

/// Stable node identifier, unique within one editor instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Fresh time-ordered key for nodes created by the editor itself.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A canonical diagram node, owned by the caller.
///
/// `data` is carried along untouched; only the key, position and appearance
/// fields mean anything to the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub key: NodeKey,
    /// World-space center.
    pub position: Vec2,
    pub label: Option<String>,
    /// Straight RGBA in `[0, 1]`; `None` uses the configured fill.
    pub background_color: Option<[f32; 4]>,
    pub data: T,
}

impl<T> Node<T> {
    pub fn new(key: impl Into<NodeKey>, position: Vec2, data: T) -> Self {
        Self {
            key: key.into(),
            position,
            label: None,
            background_color: None,
            data,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_background(mut self, rgba: [f32; 4]) -> Self {
        self.background_color = Some(rgba);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_unique() {
        let a = NodeKey::generate();
        let b = NodeKey::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn builder_sets_optional_fields() {
        let n = Node::new("a", Vec2::new(1.0, 2.0), ())
            .with_label("A")
            .with_background([1.0, 0.0, 0.0, 1.0]);
        assert_eq!(n.key.as_str(), "a");
        assert_eq!(n.label.as_deref(), Some("A"));
        assert_eq!(n.background_color, Some([1.0, 0.0, 0.0, 1.0]));
    }
}
