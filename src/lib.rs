//! Declarative shapes for Roblox instance trees.
//!
//! A [`TreeShape`] describes a hierarchy the same way a Rojo project file
//! does: each node names a class via `$className` and any number of expected
//! children by name. Shapes can be checked against a live tree
//! ([`shape_matches`]), realized as freshly created instances
//! ([`instantiate_shape`]), or waited on until the tree grows into them
//! ([`wait_for_shape`], [`wait_for_child_of_class`]).
//!
//! Matching is a structural subset check: children a shape doesn't mention
//! are always allowed, while every slot it declares must be satisfied.

mod class_hierarchy;
mod instantiate;
mod matcher;
mod shape;
mod tree;
mod wait;

pub use crate::class_hierarchy::is_class_a;
pub use crate::instantiate::instantiate_shape;
pub use crate::matcher::shape_matches;
pub use crate::shape::{ShapeError, ShapeTree, TreeShape};
pub use crate::tree::InstanceTree;
pub use crate::wait::{wait_for_child_of_class, wait_for_shape, DEFAULT_WARN_DELAY};
