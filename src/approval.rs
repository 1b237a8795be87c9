//! Moderation/Approval Workflow.
//!
//! One state machine per subject: `pending -> accepted` or
//! `pending -> rejected`, both terminal. Rejection always demands a
//! justification comment (entity-specific minimum length); acceptance runs
//! the ordered gate chain and stops at the first failing check, naming it.
//! The `action` lock is orthogonal to `approved`; transactional consumers
//! check both.

use chrono::{DateTime, Utc};

use crate::error::ApiError;
use crate::models::{
    Actor, AdminAction, Approval, ApprovalRequest, CourseRecord, ModerationMeta, ReviewRecord,
    Standing, VendorRecord,
};

/// Rejecting a vendor account requires a comment longer than this.
pub const VENDOR_REJECT_COMMENT_MIN: usize = 20;
/// Rejecting a course requires a comment longer than this.
pub const COURSE_REJECT_COMMENT_MIN: usize = 50;

/// Parses the requested transition. `pending` is not a valid target: the
/// workflow only moves forward.
pub fn parse_target(request: &ApprovalRequest) -> Result<Approval, ApiError> {
    let raw = request
        .approval
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Why no approval status body parameter".to_string()))?;
    let target: Approval = raw.parse().map_err(ApiError::Validation)?;
    if target == Approval::Pending {
        return Err(ApiError::Validation(
            "Approval can only transition to \"accepted\" or \"rejected\", not \"pending\""
                .to_string(),
        ));
    }
    Ok(target)
}

/// Accepted and rejected are terminal; there is no path back to pending.
fn ensure_pending(current: Approval) -> Result<(), ApiError> {
    if current == Approval::Pending {
        Ok(())
    } else {
        Err(ApiError::Conflict(format!(
            "Approval is already \"{current}\" and cannot be decided again"
        )))
    }
}

fn require_comment(
    comment: Option<&str>,
    min: usize,
    subject: &str,
) -> Result<String, ApiError> {
    let comment = comment.ok_or_else(|| {
        ApiError::Validation(format!("State the reason for rejecting this {subject}"))
    })?;
    if comment.chars().count() > min {
        Ok(comment.to_string())
    } else {
        Err(ApiError::Validation(format!(
            "Comment is too short: rejecting a {subject} takes more than {min} characters"
        )))
    }
}

/// The acceptance gate, checked in order; the first failing check is the
/// one reported.
pub fn acceptance_gate(meta: &ModerationMeta) -> Result<(), ApiError> {
    if meta.standing != Standing::Active {
        return Err(ApiError::Conflict(format!(
            "Only \"Active\" records can be granted approval not standing \"{}\"",
            meta.standing
        )));
    }
    if meta.action != AdminAction::Allow {
        return Err(ApiError::Conflict(format!(
            "Admin action needs to be \"allow\" for this operation, not \"{}\"",
            meta.action
        )));
    }
    if meta.business_verified == Some(false) {
        return Err(ApiError::Conflict(
            "Only verified businesses can be approved, not businessVerified false".to_string(),
        ));
    }
    Ok(())
}

/// Decides a vendor account approval. Caller has already authorized the
/// actor; the approver's id is recorded on the record.
pub fn decide_vendor(
    vendor: &VendorRecord,
    request: &ApprovalRequest,
    by: &Actor,
    now: DateTime<Utc>,
) -> Result<VendorRecord, ApiError> {
    let target = parse_target(request)?;
    ensure_pending(vendor.approval)?;

    let mut record = vendor.clone();
    match target {
        Approval::Accepted => {
            acceptance_gate(&vendor.moderation())?;
        }
        Approval::Rejected => {
            record.approval_comment = Some(require_comment(
                request.comment.as_deref(),
                VENDOR_REJECT_COMMENT_MIN,
                "Vendor Account",
            )?);
        }
        Approval::Pending => unreachable!("parse_target rejects pending"),
    }
    record.approval = target;
    record.approved_by = Some(by.id);
    record.updated = now;
    Ok(record)
}

/// Decides a course approval (peer or admin). Ownership exclusion is the
/// policy engine's job; this enforces the state machine and the longer
/// course rejection threshold.
pub fn decide_course(
    course: &CourseRecord,
    request: &ApprovalRequest,
    by: &Actor,
    now: DateTime<Utc>,
) -> Result<CourseRecord, ApiError> {
    let target = parse_target(request)?;
    ensure_pending(course.approved)?;

    let mut record = course.clone();
    match target {
        Approval::Accepted => {
            acceptance_gate(&course.moderation())?;
        }
        Approval::Rejected => {
            record.approval_comment = Some(require_comment(
                request.comment.as_deref(),
                COURSE_REJECT_COMMENT_MIN,
                "course",
            )?);
        }
        Approval::Pending => unreachable!("parse_target rejects pending"),
    }
    record.approved = target;
    record.approved_by = Some(by.id);
    record.updated = now;
    Ok(record)
}

/// Decides a review's crowd/admin verdict. No comment threshold applies;
/// the review's own standing/action are untouched.
pub fn decide_review(
    review: &ReviewRecord,
    request: &ApprovalRequest,
    by: &Actor,
    now: DateTime<Utc>,
) -> Result<ReviewRecord, ApiError> {
    let target = parse_target(request)?;
    ensure_pending(review.approved)?;

    let mut record = review.clone();
    record.approved = target;
    record.approved_by = Some(by.id);
    record.updated = now;
    Ok(record)
}
