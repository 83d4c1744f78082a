//! Authorization policy for task access.
//!
//! The rules are pure functions of the actor's identity and role and the
//! task's owner and status. Callers turn a `false` decision into an
//! authorization failure; the policy itself never errors.

use super::Task;
use crate::identity::domain::Actor;

/// Decides whether `actor` may change `task`.
///
/// Admins may change any task. Everyone else may change only their own tasks,
/// and only while the task is not complete.
#[must_use]
pub fn can_modify(actor: Actor, task: &Task) -> bool {
    if actor.is_admin() {
        return true;
    }
    if task.status().is_complete() {
        return false;
    }
    actor.id() == task.owner()
}

/// Decides whether `actor` may delete `task`. Same rule as [`can_modify`].
#[must_use]
pub fn can_delete(actor: Actor, task: &Task) -> bool {
    can_modify(actor, task)
}

/// Decides whether `actor` may list tasks. Any authenticated actor may.
#[must_use]
pub const fn can_view_list(_actor: Actor) -> bool {
    true
}

/// Decides whether `actor` may read a single `task`: admins and the owner.
#[must_use]
pub fn can_view(actor: Actor, task: &Task) -> bool {
    actor.is_admin() || actor.id() == task.owner()
}
