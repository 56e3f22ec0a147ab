//! Narrow capability interface over a mutable element tree
//!
//! Restoration logic only needs to find elements, read and write their text
//! and attributes, and add or remove children. Keeping it behind this trait
//! lets the loader, planner and writer run against any tree representation.

/// Mutable element tree with copyable node handles
pub trait DocumentTree {
    /// Handle to an element; only meaningful for the tree that issued it
    type Node: Copy + Eq + std::fmt::Debug;

    /// The document (root) element
    fn root(&self) -> Self::Node;

    /// All descendant elements with the given tag, in document order
    fn descendants_by_tag(&self, node: Self::Node, tag: &str) -> Vec<Self::Node>;

    /// True if the element holds any element or non-whitespace text
    fn has_content(&self, node: Self::Node) -> bool;

    /// Attribute value, if present
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Concatenated text directly inside the element, if any
    fn text(&self, node: Self::Node) -> Option<String>;

    /// Create a detached element
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Set (or replace) an attribute
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    /// Attach `child` as the last child of `parent`
    fn append_child(&mut self, parent: Self::Node, child: Self::Node);

    /// Detach every child (elements and text) of the element
    fn remove_children(&mut self, node: Self::Node);

    /// Replace the element's children with a single text node
    fn set_text(&mut self, node: Self::Node, text: &str);

    /// Text of the first descendant with the given tag
    fn descendant_text(&self, node: Self::Node, tag: &str) -> Option<String> {
        self.descendants_by_tag(node, tag)
            .first()
            .and_then(|&found| self.text(found))
    }
}

/// Trees that can be written to disk
pub trait PersistDocument {
    /// Serialize the whole tree to `path`
    fn save(&self, path: &std::path::Path) -> crate::Result<()>;
}
