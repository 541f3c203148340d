//! Locations inside a value tree
//!
//! A [`Location`] is an immutable path of keys and indices. Appending shares
//! the existing prefix, so every child location costs one small allocation no
//! matter how deep the tree is. Locations are only used for diagnostics.
//!
//! Copyright (c) 2025 Jsonbind Team
//! Licensed under the Apache-2.0 license

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathElement {
    /// Struct member name
    Key(String),
    /// Array position
    Index(usize),
}

impl PathElement {
    /// Render as a JSON Pointer reference token (`~` and `/` escaped)
    pub fn to_pointer_token(&self) -> String {
        match self {
            PathElement::Key(name) => name.replace('~', "~0").replace('/', "~1"),
            PathElement::Index(index) => index.to_string(),
        }
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pointer_token())
    }
}

impl From<&str> for PathElement {
    fn from(name: &str) -> Self {
        PathElement::Key(name.to_string())
    }
}

impl From<String> for PathElement {
    fn from(name: String) -> Self {
        PathElement::Key(name)
    }
}

impl From<usize> for PathElement {
    fn from(index: usize) -> Self {
        PathElement::Index(index)
    }
}

#[derive(Debug)]
struct Node {
    parent: Location,
    element: PathElement,
    depth: usize,
}

/// Immutable, appendable path into a value tree
#[derive(Clone, Default)]
pub struct Location {
    node: Option<Arc<Node>>,
}

impl Location {
    /// The document root
    pub fn root() -> Self {
        Self { node: None }
    }

    /// Build a location from its elements, root first
    pub fn from_elements<I, E>(elements: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<PathElement>,
    {
        elements
            .into_iter()
            .fold(Location::root(), |location, element| location.append(element))
    }

    /// A new location one step below this one
    pub fn append(&self, element: impl Into<PathElement>) -> Self {
        Self {
            node: Some(Arc::new(Node {
                parent: self.clone(),
                element: element.into(),
                depth: self.depth() + 1,
            })),
        }
    }

    /// Shorthand for appending a [`PathElement::Key`]
    pub fn key(&self, name: impl Into<String>) -> Self {
        self.append(PathElement::Key(name.into()))
    }

    /// Shorthand for appending a [`PathElement::Index`]
    pub fn index(&self, index: usize) -> Self {
        self.append(PathElement::Index(index))
    }

    /// Number of elements between the root and this location
    pub fn depth(&self) -> usize {
        self.node.as_ref().map_or(0, |node| node.depth)
    }

    pub fn is_root(&self) -> bool {
        self.node.is_none()
    }

    /// The final element, `None` at the root
    pub fn last(&self) -> Option<&PathElement> {
        self.node.as_ref().map(|node| &node.element)
    }

    /// The location one step up, `None` at the root
    pub fn parent(&self) -> Option<&Location> {
        self.node.as_ref().map(|node| &node.parent)
    }

    /// All elements, root first
    pub fn elements(&self) -> Vec<PathElement> {
        let mut elements = Vec::with_capacity(self.depth());
        let mut current = self;
        while let Some(node) = &current.node {
            elements.push(node.element.clone());
            current = &node.parent;
        }
        elements.reverse();
        elements
    }

    /// RFC 6901 rendering; the root is the empty string
    pub fn to_pointer(&self) -> String {
        self.elements()
            .iter()
            .map(|element| format!("/{}", element.to_pointer_token()))
            .collect()
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        let (mut left, mut right) = (self, other);
        if left.depth() != right.depth() {
            return false;
        }
        loop {
            match (&left.node, &right.node) {
                (None, None) => return true,
                (Some(a), Some(b)) => {
                    if Arc::ptr_eq(a, b) {
                        return true;
                    }
                    if a.element != b.element {
                        return false;
                    }
                    left = &a.parent;
                    right = &b.parent;
                }
                _ => return false,
            }
        }
    }
}

impl Eq for Location {}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pointer())
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({:?})", self.to_pointer())
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_pointer())
    }
}
