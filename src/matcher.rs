//! Defines the algorithm for checking a live instance tree against a shape
//! description.

use std::collections::HashSet;

use rbx_dom_weak::{types::Ref, WeakDom};

use crate::class_hierarchy::is_class_a;
use crate::shape::TreeShape;

/// Tells whether the instance referred to by `object` structurally satisfies
/// `shape`.
///
/// Matching is a structural subset check: every child slot the shape declares
/// must be satisfied by an identically-named child, while children the shape
/// doesn't mention are always allowed. A declared slot with no matching child
/// fails the whole match. Class checks are subtype-aware; a shape with no
/// class requirement accepts any class.
///
/// A `Ref` that isn't in the tree never matches.
pub fn shape_matches(dom: &WeakDom, object: Ref, shape: &TreeShape) -> bool {
    let instance = match dom.get_by_ref(object) {
        Some(instance) => instance,
        None => return false,
    };

    let tree = match shape {
        TreeShape::Class(class_name) => return is_class_a(&instance.class, class_name),
        TreeShape::Tree(tree) => tree,
    };

    if let Some(class_name) = &tree.class_name {
        if !is_class_a(&instance.class, class_name) {
            return false;
        }
    }

    let mut satisfied: HashSet<&str> = HashSet::new();

    for &child_ref in instance.children() {
        let child = dom
            .get_by_ref(child_ref)
            .expect("child listed by instance was not in the tree");

        if let Some(child_shape) = tree.children.get(&child.name) {
            if shape_matches(dom, child_ref, child_shape) {
                satisfied.insert(child.name.as_str());
            }
        }
    }

    tree.children
        .keys()
        .all(|name| satisfied.contains(name.as_str()))
}

#[cfg(test)]
mod test {
    use super::*;

    use rbx_dom_weak::InstanceBuilder;

    use crate::shape::ShapeTree;

    #[test]
    fn missing_declared_child_fails() {
        let dom = WeakDom::new(InstanceBuilder::new("Folder"));
        let shape: TreeShape = ShapeTree::new("Folder").with_child("X", "IntValue").into();

        assert!(!shape_matches(&dom, dom.root_ref(), &shape));
    }

    #[test]
    fn declared_child_satisfies_shape() {
        let mut dom = WeakDom::new(InstanceBuilder::new("Folder"));
        dom.insert(
            dom.root_ref(),
            InstanceBuilder::new("IntValue").with_name("X"),
        );

        let shape: TreeShape = ShapeTree::new("Folder").with_child("X", "IntValue").into();

        assert!(shape_matches(&dom, dom.root_ref(), &shape));
        // No mutation between calls, so the answer doesn't change.
        assert!(shape_matches(&dom, dom.root_ref(), &shape));
    }

    #[test]
    fn extra_children_are_always_allowed() {
        let mut dom = WeakDom::new(InstanceBuilder::new("Folder"));
        dom.insert(
            dom.root_ref(),
            InstanceBuilder::new("IntValue").with_name("X"),
        );
        dom.insert(
            dom.root_ref(),
            InstanceBuilder::new("BoolValue").with_name("Unrelated"),
        );
        dom.insert(
            dom.root_ref(),
            InstanceBuilder::new("Folder").with_name("AlsoUnrelated"),
        );

        let shape: TreeShape = ShapeTree::new("Folder").with_child("X", "IntValue").into();

        assert!(shape_matches(&dom, dom.root_ref(), &shape));
    }

    #[test]
    fn declared_child_with_wrong_class_fails() {
        let mut dom = WeakDom::new(InstanceBuilder::new("Folder"));
        dom.insert(
            dom.root_ref(),
            InstanceBuilder::new("BoolValue").with_name("X"),
        );

        let shape: TreeShape = ShapeTree::new("Folder").with_child("X", "IntValue").into();

        assert!(!shape_matches(&dom, dom.root_ref(), &shape));
    }

    #[test]
    fn root_class_mismatch_is_terminal() {
        let mut dom = WeakDom::new(InstanceBuilder::new("Model"));
        dom.insert(
            dom.root_ref(),
            InstanceBuilder::new("IntValue").with_name("X"),
        );

        let shape: TreeShape = ShapeTree::new("Folder").with_child("X", "IntValue").into();

        assert!(!shape_matches(&dom, dom.root_ref(), &shape));
    }

    #[test]
    fn absent_class_name_accepts_any_class() {
        let mut dom = WeakDom::new(InstanceBuilder::new("Model"));
        dom.insert(
            dom.root_ref(),
            InstanceBuilder::new("IntValue").with_name("X"),
        );

        let shape: TreeShape = ShapeTree::any_class().with_child("X", "IntValue").into();

        assert!(shape_matches(&dom, dom.root_ref(), &shape));
    }

    #[test]
    fn nested_shapes_recurse() {
        let mut dom = WeakDom::new(InstanceBuilder::new("Folder"));
        let a = dom.insert(dom.root_ref(), InstanceBuilder::new("Folder").with_name("A"));
        dom.insert(a, InstanceBuilder::new("IntValue").with_name("B"));

        let shape: TreeShape = ShapeTree::new("Folder")
            .with_child("A", ShapeTree::new("Folder").with_child("B", "IntValue"))
            .into();

        assert!(shape_matches(&dom, dom.root_ref(), &shape));
    }

    #[test]
    fn nested_class_mismatch_fails() {
        let mut dom = WeakDom::new(InstanceBuilder::new("Folder"));
        let a = dom.insert(dom.root_ref(), InstanceBuilder::new("Folder").with_name("A"));
        dom.insert(a, InstanceBuilder::new("BoolValue").with_name("B"));

        let shape: TreeShape = ShapeTree::new("Folder")
            .with_child("A", ShapeTree::new("Folder").with_child("B", "IntValue"))
            .into();

        assert!(!shape_matches(&dom, dom.root_ref(), &shape));
    }

    #[test]
    fn class_checks_accept_subclasses() {
        let mut dom = WeakDom::new(InstanceBuilder::new("Folder"));
        dom.insert(
            dom.root_ref(),
            InstanceBuilder::new("Part").with_name("Brick"),
        );

        let shape: TreeShape = ShapeTree::new("Instance")
            .with_child("Brick", "BasePart")
            .into();

        assert!(shape_matches(&dom, dom.root_ref(), &shape));
    }

    #[test]
    fn bare_class_tag_checks_the_object_itself() {
        let dom = WeakDom::new(InstanceBuilder::new("Part"));

        assert!(shape_matches(&dom, dom.root_ref(), &"BasePart".into()));
        assert!(!shape_matches(&dom, dom.root_ref(), &"Folder".into()));
    }

    #[test]
    fn dangling_ref_never_matches() {
        let dom = WeakDom::new(InstanceBuilder::new("Folder"));

        assert!(!shape_matches(&dom, Ref::new(), &"Folder".into()));
    }
}
