//! Record Lifecycle State Machine.
//!
//! Governs `standing`/`action` transitions for every moderated entity.
//! Only the transitions below exist; anything else is a conflict. Role
//! tiering (which admin may moderate which entity) belongs to the policy
//! engine — this module only enforces the shape of the machine itself:
//! admin-kind callers, one-way `trashed`, idempotent same-value sets.

use crate::error::ApiError;
use crate::models::{Actor, AdminAction, Standing};

/// Sets a new standing. Legal from `active`/`inactive` to any value;
/// `trashed` is one-way and only [`restore`] leaves it. Setting the current
/// value again succeeds without effect.
pub fn set_standing(
    standing: &mut Standing,
    new: Standing,
    by: &Actor,
) -> Result<(), ApiError> {
    require_admin(by, "alter record status")?;
    if *standing == new {
        return Ok(());
    }
    if *standing == Standing::Trashed {
        return Err(ApiError::Conflict(format!(
            "A trashed record cannot be set to \"{new}\"; it must be restored by an admin first"
        )));
    }
    *standing = new;
    Ok(())
}

/// Brings a trashed record back. The only legal exit from `trashed`.
pub fn restore(standing: &mut Standing, new: Standing, by: &Actor) -> Result<(), ApiError> {
    require_admin(by, "restore this record")?;
    if *standing != Standing::Trashed {
        return Err(ApiError::Conflict(format!(
            "Only a trashed record can be restored, this one is \"{standing}\""
        )));
    }
    if new == Standing::Trashed {
        return Err(ApiError::Conflict(
            "A record cannot be restored to \"trashed\"".to_string(),
        ));
    }
    *standing = new;
    Ok(())
}

/// Sets the administrative action. Admin-only; `deny` locks the owner out
/// of the record until an admin reverts it.
pub fn set_action(action: &mut AdminAction, new: AdminAction, by: &Actor) -> Result<(), ApiError> {
    require_admin(by, "take administrative action")?;
    *action = new;
    Ok(())
}

/// Owner-initiated mutation is only possible while `action == allow`.
/// Anything else locks the record; the reason names the actual action so
/// the owner knows an admin set it.
pub fn owner_may_mutate(action: AdminAction) -> Result<(), ApiError> {
    if action == AdminAction::Allow {
        Ok(())
    } else {
        Err(ApiError::RecordLocked(format!(
            "You cannot update this record while administrative action is \"{action}\""
        )))
    }
}

fn require_admin(by: &Actor, verb: &str) -> Result<(), ApiError> {
    if by.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "Only Admins are allowed to {verb} not {}",
            by.kind
        )))
    }
}
