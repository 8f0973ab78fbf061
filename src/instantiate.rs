//! Defines the algorithm for realizing a shape description as freshly created
//! instances.

use rbx_dom_weak::{types::Ref, InstanceBuilder};

use crate::shape::{ShapeError, TreeShape};
use crate::tree::InstanceTree;

/// Creates one new instance per child slot `shape` declares, parents them all
/// under `parent`, and returns `parent` for chaining.
///
/// Nested shapes are realized recursively, so `instantiate_shape` followed by
/// [`shape_matches`](crate::shape_matches) on the same shape always holds.
/// Instantiation never reuses children that already exist; callers wanting
/// idempotent setup should check the shape first.
///
/// The shape's own `$className` describes `parent` and is not checked here,
/// but every nested slot must carry one, since that's the class the new
/// instance is created with. A bare class tag at the root is rejected: it
/// declares no slots to create.
pub fn instantiate_shape(
    tree: &mut InstanceTree,
    parent: Ref,
    shape: &TreeShape,
) -> Result<Ref, ShapeError> {
    let slots = match shape {
        TreeShape::Class(_) => return Err(ShapeError::RootIsClassTag),
        TreeShape::Tree(slots) => slots,
    };

    // Build every slot before touching the tree so a malformed shape fails
    // without leaving a half-realized hierarchy behind.
    let mut builders = Vec::with_capacity(slots.children.len());
    for (name, child_shape) in &slots.children {
        builders.push(builder_for_slot(name, child_shape)?);
    }

    for builder in builders {
        tree.insert(parent, builder);
    }

    Ok(parent)
}

fn builder_for_slot(name: &str, shape: &TreeShape) -> Result<InstanceBuilder, ShapeError> {
    let class_name = shape
        .class_name()
        .ok_or_else(|| ShapeError::MissingClassName {
            slot: name.to_owned(),
        })?;

    let mut builder = InstanceBuilder::new(class_name).with_name(name);

    if let Some(children) = shape.children() {
        for (child_name, child_shape) in children {
            builder = builder.with_child(builder_for_slot(child_name, child_shape)?);
        }
    }

    Ok(builder)
}
