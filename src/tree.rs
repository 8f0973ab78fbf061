//! An expanded variant of rbx_dom_weak's `WeakDom` that layers
//! structural-change notifications on top of mutation.
//!
//! All mutation of the instance graph flows through [`InstanceTree`], which
//! lets it play the role the engine's change signals play for live instances:
//! inserting an instance or renaming one sweeps the pending waiters
//! synchronously, inside the same call, so there's never a window where the
//! tree satisfies a waited-on shape without that waiter resolving.

use std::mem;

use rbx_dom_weak::{types::Ref, Instance, InstanceBuilder, WeakDom};

use crate::class_hierarchy::is_class_a;
use crate::matcher::shape_matches;
use crate::shape::TreeShape;
use crate::wait::{ChildWaiter, ShapeWaiter};

/// A mutable instance tree with change notifications.
pub struct InstanceTree {
    /// Contains the instances themselves.
    inner: WeakDom,

    /// Pending wait-for-shape subscriptions, re-evaluated on every structural
    /// change and removed the first time their shape matches.
    shape_waiters: Vec<ShapeWaiter>,

    /// Pending wait-for-child-of-class subscriptions, checked against every
    /// newly inserted instance.
    child_waiters: Vec<ChildWaiter>,

    next_waiter_id: u32,
}

impl InstanceTree {
    pub fn new(root: InstanceBuilder) -> InstanceTree {
        InstanceTree {
            inner: WeakDom::new(root),
            shape_waiters: Vec::new(),
            child_waiters: Vec::new(),
            next_waiter_id: 0,
        }
    }

    pub fn inner(&self) -> &WeakDom {
        &self.inner
    }

    pub fn root_ref(&self) -> Ref {
        self.inner.root_ref()
    }

    pub fn get_instance(&self, id: Ref) -> Option<&Instance> {
        self.inner.get_by_ref(id)
    }

    /// Tells whether the instance referred to by `id` currently satisfies
    /// `shape`. See [`shape_matches`].
    pub fn shape_matches(&self, id: Ref, shape: &TreeShape) -> bool {
        shape_matches(&self.inner, id, shape)
    }

    /// Inserts a new instance built from `builder` under `parent` and returns
    /// its ref.
    ///
    /// The builder may carry children of its own; every instance it
    /// introduces counts as a newly added descendant for pending waiters.
    pub fn insert(&mut self, parent: Ref, builder: InstanceBuilder) -> Ref {
        let id = self.inner.insert(parent, builder);

        let mut added = vec![id];
        let mut index = 0;
        while index < added.len() {
            let instance = self
                .inner
                .get_by_ref(added[index])
                .expect("instance we just inserted was not in the tree");
            added.extend(instance.children().iter().copied());
            index += 1;
        }

        for new_id in added {
            self.notify_descendant_added(new_id);
        }

        id
    }

    /// Renames an instance, waking any shape waiter the new name satisfies.
    pub fn set_name<S: Into<String>>(&mut self, id: Ref, name: S) {
        let instance = self
            .inner
            .get_by_ref_mut(id)
            .expect("cannot rename an instance that is not in the tree");
        instance.name = name.into();

        self.notify_name_changed(id);
    }

    pub(crate) fn register_shape_waiter(&mut self, waiter: ShapeWaiter) {
        self.shape_waiters.push(waiter);
    }

    pub(crate) fn register_child_waiter(
        &mut self,
        parent: Ref,
        class_name: String,
    ) -> (u32, crossbeam_channel::Receiver<Ref>) {
        let waiter_id = self.next_waiter_id;
        self.next_waiter_id += 1;

        let (sender, receiver) = crossbeam_channel::bounded(1);
        self.child_waiters.push(ChildWaiter {
            waiter_id,
            parent,
            class_name,
            sender,
        });

        (waiter_id, receiver)
    }

    /// Removes a child waiter that timed out before anything satisfied it.
    pub(crate) fn cancel_child_waiter(&mut self, waiter_id: u32) {
        self.child_waiters
            .retain(|waiter| waiter.waiter_id != waiter_id);
    }

    #[cfg(test)]
    pub(crate) fn pending_shape_waiters(&self) -> usize {
        self.shape_waiters.len()
    }

    #[cfg(test)]
    pub(crate) fn pending_child_waiters(&self) -> usize {
        self.child_waiters.len()
    }

    fn notify_descendant_added(&mut self, id: Ref) {
        log::trace!("descendant added: {:?}", id);

        let child_waiters = mem::take(&mut self.child_waiters);
        for waiter in child_waiters {
            let instance = self
                .inner
                .get_by_ref(id)
                .expect("notified about an instance that is not in the tree");

            if instance.parent() == waiter.parent && is_class_a(&instance.class, &waiter.class_name)
            {
                // A dropped receiver just means the caller stopped waiting.
                let _ = waiter.sender.send(id);
            } else {
                self.child_waiters.push(waiter);
            }
        }

        self.sweep_shape_waiters(id);
    }

    fn notify_name_changed(&mut self, id: Ref) {
        log::trace!("name changed: {:?}", id);

        self.sweep_shape_waiters(id);
    }

    /// Re-evaluates every pending shape waiter whose watched subtree contains
    /// the changed instance. Waiters whose shape now matches are removed
    /// before their receiver is completed, so they resolve exactly once and
    /// later changes are inert.
    fn sweep_shape_waiters(&mut self, changed: Ref) {
        if self.shape_waiters.is_empty() {
            return;
        }

        let shape_waiters = mem::take(&mut self.shape_waiters);
        for waiter in shape_waiters {
            if waiter.sender.is_canceled() {
                continue;
            }

            if is_descendant_of(&self.inner, changed, waiter.root)
                && shape_matches(&self.inner, waiter.root, &waiter.shape)
            {
                let _ = waiter.sender.send(waiter.root);
            } else {
                self.shape_waiters.push(waiter);
            }
        }
    }
}

/// Tells whether `id` is a strict descendant of `ancestor`.
fn is_descendant_of(dom: &WeakDom, id: Ref, ancestor: Ref) -> bool {
    let mut current = match dom.get_by_ref(id) {
        Some(instance) => instance.parent(),
        None => return false,
    };

    while !current.is_none() {
        if current == ancestor {
            return true;
        }

        current = match dom.get_by_ref(current) {
            Some(instance) => instance.parent(),
            None => return false,
        };
    }

    false
}
