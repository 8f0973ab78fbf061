//! Defines the declarative shape description type for instance trees.
//!
//! Shapes use the same `$className` convention as Rojo project files: a node
//! is either a bare class name, or a map from child name to nested shape with
//! a reserved `$className` key describing the node itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A description of what an instance and its children should look like.
///
/// A bare class name is shorthand for a subtree with only `$className` set:
/// `"Things": "Folder"` describes the same shape as
/// `"Things": { "$className": "Folder" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeShape {
    /// A child of this class must exist here. Subclasses are accepted.
    Class(String),

    /// A nested description of the instance and some of its children.
    Tree(ShapeTree),
}

impl TreeShape {
    /// Parses a shape from its JSON representation, like
    /// `{"$className": "Folder", "X": "IntValue"}`.
    pub fn from_json(source: &str) -> Result<TreeShape, ShapeError> {
        let shape = serde_json::from_str(source)?;
        Ok(shape)
    }

    /// The class name this shape requires, if it requires one.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TreeShape::Class(class_name) => Some(class_name),
            TreeShape::Tree(tree) => tree.class_name.as_deref(),
        }
    }

    /// The named child slots this shape declares. A bare class tag declares
    /// none.
    pub fn children(&self) -> Option<&BTreeMap<String, TreeShape>> {
        match self {
            TreeShape::Class(_) => None,
            TreeShape::Tree(tree) => Some(&tree.children),
        }
    }
}

impl From<ShapeTree> for TreeShape {
    fn from(tree: ShapeTree) -> TreeShape {
        TreeShape::Tree(tree)
    }
}

impl From<&str> for TreeShape {
    fn from(class_name: &str) -> TreeShape {
        TreeShape::Class(class_name.to_owned())
    }
}

impl From<String> for TreeShape {
    fn from(class_name: String) -> TreeShape {
        TreeShape::Class(class_name)
    }
}

/// The subtree form of [`TreeShape`]: an optional class requirement for the
/// instance itself, plus any number of named child slots.
///
/// Children present on a live instance but not named here never invalidate a
/// match; this is a structural subset, not an exact description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeTree {
    /// The class the described instance must be (or be a subclass of). When
    /// absent, any class is accepted.
    #[serde(rename = "$className", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    /// Expected children by name.
    #[serde(flatten)]
    pub children: BTreeMap<String, TreeShape>,
}

impl ShapeTree {
    pub fn new<S: Into<String>>(class_name: S) -> ShapeTree {
        ShapeTree {
            class_name: Some(class_name.into()),
            children: BTreeMap::new(),
        }
    }

    /// A shape that accepts an instance of any class.
    pub fn any_class() -> ShapeTree {
        ShapeTree::default()
    }

    pub fn with_child<S: Into<String>, T: Into<TreeShape>>(mut self, name: S, shape: T) -> Self {
        self.children.insert(name.into(), shape.into());
        self
    }
}

/// An error from a malformed shape description.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("shape slot '{slot}' has no $className entry, so no instance can be created for it")]
    MissingClassName { slot: String },

    #[error("cannot instantiate from a bare class tag; instantiation needs a shape with named child slots")]
    RootIsClassTag,

    #[error("malformed shape description")]
    InvalidJson {
        #[from]
        source: serde_json::Error,
    },
}
