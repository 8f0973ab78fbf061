//! Defines the operations that suspend until an instance tree grows into an
//! expected structure.
//!
//! Both waits follow the same fire-if-ready-else-park pattern: if the
//! condition already holds at call time the result is produced before
//! returning, otherwise a waiter is parked on the tree and woken from inside
//! whichever mutation satisfies it.

use std::sync::Mutex;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use futures::channel::oneshot;
use rbx_dom_weak::types::Ref;

use crate::class_hierarchy::is_class_a;
use crate::shape::TreeShape;
use crate::tree::InstanceTree;

/// How long a timeout-less [`wait_for_child_of_class`] call blocks before
/// warning that it may never return.
pub const DEFAULT_WARN_DELAY: Duration = Duration::from_secs(5);

/// A parked wait-for-shape subscription.
pub(crate) struct ShapeWaiter {
    pub root: Ref,
    pub shape: TreeShape,
    pub sender: oneshot::Sender<Ref>,
}

/// A parked wait-for-child-of-class subscription.
pub(crate) struct ChildWaiter {
    pub waiter_id: u32,
    pub parent: Ref,
    pub class_name: String,
    pub sender: crossbeam_channel::Sender<Ref>,
}

/// Resolves with `object` once the tree under it satisfies `shape`.
///
/// If the shape already matches, the returned receiver is completed before
/// this function returns and awaiting it never suspends. Otherwise the match
/// is re-evaluated from scratch on every structural change (a descendant
/// added below `object`, or one renamed) until it holds, at which point the
/// waiter is released and the receiver completed, exactly once.
///
/// There is no timeout and no cancellation: if the shape never becomes
/// satisfied, the receiver never completes. That mirrors the engine's
/// wait-forever idiom and is deliberate; callers are responsible for only
/// waiting on shapes something will eventually produce.
///
/// The receiver only yields `Err` if the tree is dropped while the wait is
/// still pending.
pub fn wait_for_shape(
    tree: &Mutex<InstanceTree>,
    object: Ref,
    shape: TreeShape,
) -> oneshot::Receiver<Ref> {
    let (sender, receiver) = oneshot::channel();

    let mut tree = tree.lock().unwrap();

    if tree.shape_matches(object, &shape) {
        let _ = sender.send(object);
    } else {
        tree.register_shape_waiter(ShapeWaiter {
            root: object,
            shape,
            sender,
        });
    }

    receiver
}

/// Blocks until `parent` has a child of class `class_name` (or a subclass),
/// then returns it.
///
/// Returns immediately without blocking if such a child already exists. With
/// a timeout, gives up and returns `None` once it elapses. Without one, this
/// blocks for as long as it takes; after [`DEFAULT_WARN_DELAY`] a warning is
/// logged once to flag that the call may never return.
///
/// This must be called without holding the tree lock, since the qualifying
/// child has to be inserted by some other thread while this one blocks.
pub fn wait_for_child_of_class(
    tree: &Mutex<InstanceTree>,
    parent: Ref,
    class_name: &str,
    timeout: Option<Duration>,
) -> Option<Ref> {
    let (waiter_id, receiver) = {
        let mut tree = tree.lock().unwrap();

        if let Some(existing) = child_of_class(&tree, parent, class_name) {
            return Some(existing);
        }

        tree.register_child_waiter(parent, class_name.to_owned())
    };

    match timeout {
        Some(timeout) => match receiver.recv_timeout(timeout) {
            Ok(child) => Some(child),
            Err(RecvTimeoutError::Timeout) => {
                let mut tree = tree.lock().unwrap();
                tree.cancel_child_waiter(waiter_id);

                // The child may have arrived between the timeout elapsing and
                // us reacquiring the lock.
                receiver.try_recv().ok()
            }
            Err(RecvTimeoutError::Disconnected) => None,
        },
        None => match receiver.recv_timeout(DEFAULT_WARN_DELAY) {
            Ok(child) => Some(child),
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "wait_for_child_of_class({:?}) has been waiting for more than {:?} \
                     with no timeout; it may never return",
                    class_name,
                    DEFAULT_WARN_DELAY,
                );

                receiver.recv().ok()
            }
            Err(RecvTimeoutError::Disconnected) => None,
        },
    }
}

fn child_of_class(tree: &InstanceTree, parent: Ref, class_name: &str) -> Option<Ref> {
    let instance = tree
        .get_instance(parent)
        .expect("cannot wait on an instance that is not in the tree");

    for &child_ref in instance.children() {
        let child = tree
            .get_instance(child_ref)
            .expect("child listed by instance was not in the tree");

        if is_class_a(&child.class, class_name) {
            return Some(child_ref);
        }
    }

    None
}
