//! Authorization Policy Engine.
//!
//! One deterministic, side-effect-free function: `authorize(actor, operation,
//! record-state) -> Ok | Denial`. Role checks live in a single
//! operation-to-clearance table plus a small set of special rules (super
//! protection, peer exclusion) rather than being scattered across handlers.
//! Every denial names the actor's actual kind/role and the required one,
//! because callers surface these reasons verbatim in API responses.

use crate::error::ApiError;
use crate::models::{Actor, ActorKind, AdminRole, ModerationMeta};

/// Admin tiers referenced by the clearance table.
pub const MODERATORS: &[AdminRole] = &[AdminRole::Master, AdminRole::Super];
pub const SUPER_ONLY: &[AdminRole] = &[AdminRole::Super];
pub const ANY_ADMIN: &[AdminRole] = &[
    AdminRole::Super,
    AdminRole::Master,
    AdminRole::Support,
    AdminRole::Finance,
    AdminRole::Technical,
];

/// Everything the policy engine can be asked about. Operations carry only
/// what the rules need (e.g. the role an admin mutation wants to assign).
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    ReadProfile,
    UpdateProfile,
    ReadAdmin,
    ModifyAdmin { assign_role: Option<AdminRole> },
    DestroyAdmin,
    ModerateVendor,
    ApproveVendor,
    DestroyVendor,
    CreateCourse,
    UpdateCourse,
    ModerateCourse,
    ApproveCourse,
    DestroyCourse,
    CreateCategory,
    EditCategory,
    ModerateCategory,
    DestroyCategory,
    CreateReview,
    ApproveReview,
    ModerateReview,
    DestroyReview,
    ViewStats,
}

/// A denial with its human-readable reason. `missing_identity` marks the
/// denials where no usable identity was presented at all, which surface as
/// 401 rather than 403.
#[derive(Debug, Clone, PartialEq)]
pub struct Denial {
    pub reason: String,
    pub missing_identity: bool,
}

impl Denial {
    fn new(reason: impl Into<String>) -> Self {
        Denial {
            reason: reason.into(),
            missing_identity: false,
        }
    }

    fn missing_identity(reason: impl Into<String>) -> Self {
        Denial {
            reason: reason.into(),
            missing_identity: true,
        }
    }
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        if denial.missing_identity {
            ApiError::Unauthenticated(denial.reason)
        } else {
            ApiError::Forbidden(denial.reason)
        }
    }
}

/// Who may perform an operation, before the special rules apply.
enum Clearance {
    /// Admin actor whose role is in the listed tier.
    Admin(&'static [AdminRole], &'static str),
    /// A specific non-admin actor kind.
    Kind(ActorKind, &'static str),
    /// Any of the listed actor kinds.
    Kinds(&'static [ActorKind], &'static str),
    /// The record owner only.
    Owner,
    /// The record owner, or any admin.
    OwnerOrAdmin,
    /// A vendor peer, or an admin in the listed tier. Ownership exclusion
    /// is applied as a special rule.
    Peer(&'static [AdminRole], &'static str),
}

/// The operation × role permission matrix.
fn clearance(op: &Operation) -> Clearance {
    use Operation::*;
    match op {
        ReadProfile => Clearance::OwnerOrAdmin,
        UpdateProfile => Clearance::Owner,
        ReadAdmin | ViewStats => Clearance::Admin(ANY_ADMIN, "Admins"),
        ModifyAdmin { .. } => Clearance::Admin(MODERATORS, "Admin Master or Super"),
        DestroyAdmin => Clearance::Admin(SUPER_ONLY, "Super Admin"),
        ModerateVendor | ApproveVendor => Clearance::Admin(MODERATORS, "Admin Master or Super"),
        DestroyVendor => Clearance::Admin(SUPER_ONLY, "Super Admin"),
        CreateCourse => Clearance::Kind(ActorKind::Vendor, "Vendors"),
        UpdateCourse => Clearance::Owner,
        ModerateCourse | DestroyCourse => Clearance::Admin(MODERATORS, "Admin Master or Super"),
        CreateCategory | EditCategory => Clearance::Admin(ANY_ADMIN, "Admins"),
        ModerateCategory | DestroyCategory => {
            Clearance::Admin(MODERATORS, "Admin Master or Super")
        }
        CreateReview => Clearance::Kinds(
            &[ActorKind::Customer, ActorKind::Vendor],
            "customers or vendors",
        ),
        ApproveCourse | ApproveReview => {
            Clearance::Peer(MODERATORS, "vendors or Admin Master or Super")
        }
        ModerateReview | DestroyReview => Clearance::Admin(MODERATORS, "Admin Master or Super"),
    }
}

/// Evaluates whether the actor may perform the operation against the given
/// record state. Pure function of its inputs.
pub fn authorize(
    actor: &Actor,
    op: &Operation,
    record: Option<&ModerationMeta>,
) -> Result<(), Denial> {
    // A partially resolved identity never gets defaults applied downstream.
    if actor.kind == ActorKind::Admin && actor.role.is_none() {
        return Err(Denial::missing_identity("Invalid authentication credentials"));
    }

    match clearance(op) {
        Clearance::Admin(tier, required) => require_tier(actor, tier, required)?,
        Clearance::Kind(kind, required) => {
            if actor.kind != kind {
                return Err(Denial::new(format!(
                    "Only {required} are allowed to perform this operation not {}",
                    actor.kind
                )));
            }
        }
        Clearance::Kinds(kinds, required) => {
            if !kinds.contains(&actor.kind) {
                return Err(Denial::new(format!(
                    "Only {required} are allowed to perform this operation not {}",
                    actor.kind
                )));
            }
        }
        Clearance::Owner => {
            let meta = require_record(record)?;
            if actor.id != meta.owner {
                return Err(Denial::new(format!(
                    "Only the record owner may update this record not another {} (role {})",
                    actor.kind,
                    actor.role_name()
                )));
            }
        }
        Clearance::OwnerOrAdmin => {
            let meta = require_record(record)?;
            if actor.id != meta.owner && !actor.is_admin() {
                return Err(Denial::new(format!(
                    "Only the record owner or an Admin may read this record not {} role {}",
                    actor.kind,
                    actor.role_name()
                )));
            }
        }
        Clearance::Peer(tier, required) => {
            if actor.kind != ActorKind::Vendor {
                require_tier(actor, tier, required)?;
            }
        }
    }

    // Special rules layered over the matrix.
    match op {
        Operation::ModifyAdmin { assign_role } => {
            let meta = require_record(record)?;
            if meta.record_role == Some(AdminRole::Super) {
                return Err(Denial::new("You cannot modify a super admin"));
            }
            match assign_role {
                Some(AdminRole::Super) => {
                    return Err(Denial::new("You cannot assign a Super Admin role"));
                }
                Some(AdminRole::Master) if actor.role != Some(AdminRole::Super) => {
                    return Err(Denial::new(format!(
                        "Only Super Admin can assign master role not a {} admin",
                        actor.role_name()
                    )));
                }
                _ => {}
            }
        }
        Operation::ApproveCourse | Operation::ApproveReview => {
            // Peer-review exclusion: compare the owner reference, not the kind.
            let meta = require_record(record)?;
            if actor.id == meta.owner {
                return Err(Denial::new("A vendor cannot approve her product."));
            }
        }
        _ => {}
    }

    Ok(())
}

fn require_tier(
    actor: &Actor,
    tier: &'static [AdminRole],
    required: &'static str,
) -> Result<(), Denial> {
    let permitted = actor.kind == ActorKind::Admin
        && actor.role.map(|role| tier.contains(&role)).unwrap_or(false);
    if permitted {
        Ok(())
    } else {
        Err(Denial::new(format!(
            "Only {required} is allowed to perform this operation not {} role {}",
            actor.kind,
            actor.role_name()
        )))
    }
}

fn require_record(record: Option<&ModerationMeta>) -> Result<&ModerationMeta, Denial> {
    record.ok_or_else(|| Denial::new("Record state is required for this operation"))
}
