use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    AppState, approval,
    auth::issue_token,
    error::{ApiError, ApiReply, ApiResult, success},
    lifecycle,
    models::{
        Actor, ActorKind, AdminAction, AdminModifyRequest, AdminRecord, AdminRole, Approval,
        ApprovalRequest, CategoryPatch, CategoryRecord, CourseRecord, CoursePatch,
        CreateCategoryRequest, CreateCourseRequest, CreateReviewRequest, CustomerRecord,
        DashboardStats, ExistsReply, ModerationRequest, ProfilePatch, RegisterRequest,
        ReviewRecord, ReviewSubject, Standing, VendorModerationRequest, VendorRecord,
        VendorSummary,
    },
    mutation,
    policy::{self, Operation},
    repository::parse_record_id,
};

// --- Filter Structs ---

/// VendorSearchQuery
///
/// Accepted query parameters for the public vendor search endpoint.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct VendorSearchQuery {
    /// The search string matched against business and domain names.
    pub q: Option<String>,
    /// Pagination offset into the ranked hit list.
    pub from: Option<usize>,
    /// Page size; defaults to 10.
    pub size: Option<usize>,
}

// --- Shared helpers ---

fn parse_standing(raw: Option<&str>) -> ApiResult<Option<Standing>> {
    raw.map(|s| s.parse::<Standing>().map_err(ApiError::Validation))
        .transpose()
}

fn parse_action(raw: Option<&str>) -> ApiResult<Option<AdminAction>> {
    raw.map(|s| s.parse::<AdminAction>().map_err(ApiError::Validation))
        .transpose()
}

/// Standing changes route through the lifecycle machine; leaving `trashed`
/// is a restore, everything else is a plain set.
fn apply_standing(current: &mut Standing, new: Standing, by: &Actor) -> ApiResult<()> {
    if *current == Standing::Trashed && new != Standing::Trashed {
        lifecycle::restore(current, new, by)
    } else {
        lifecycle::set_standing(current, new, by)
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("No record found!".to_string())
}

/// The moderation routes may reopen a decided approval, nothing more.
/// Decisions (`accepted`/`rejected`) belong to the approval routes.
fn parse_reflag(raw: Option<&str>) -> ApiResult<Option<Approval>> {
    let Some(raw) = raw else { return Ok(None) };
    let target: Approval = raw.parse().map_err(ApiError::Validation)?;
    if target != Approval::Pending {
        return Err(ApiError::Validation(format!(
            "Approval can only be reset to \"pending\" here, not \"{target}\""
        )));
    }
    Ok(Some(target))
}

fn to_value<T: serde::Serialize>(record: &T) -> ApiResult<Value> {
    serde_json::to_value(record)
        .map_err(|e| ApiError::Upstream(format!("Serialization failed.\r\n{e}")))
}

// --- Public Handlers ---

/// register
///
/// [Public Route] Creates a new account of the requested kind and issues a
/// token for it. Admin registrations start as support/inactive until the
/// profile is completed; the very first admin is promoted to super inside
/// the store. Vendor registrations derive their storefront domain from the
/// email's local part and start the approval workflow at `pending`.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Record created"),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid kind or email")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiReply<Value>>)> {
    let kind: ActorKind = payload.kind.parse().map_err(ApiError::Validation)?;
    let email = payload.email.trim().to_lowercase();
    let (local, host) = email.split_once('@').unwrap_or(("", ""));
    if local.is_empty() || host.is_empty() {
        return Err(ApiError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    let local = local.to_string();
    if state.store.attribute_exists(kind, "email", &email).await? {
        return Err(ApiError::Conflict(
            "A record already exists with this email".to_string(),
        ));
    }

    let now = Utc::now();
    let secret = &state.config.jwt_secret;
    let (record, token) = match kind {
        ActorKind::Admin => {
            let created = state
                .store
                .create_admin(AdminRecord::register(email, now))
                .await?;
            let token = issue_token(&Actor::admin(created.id, created.role), secret)?;
            (to_value(&created)?, token)
        }
        ActorKind::Vendor => {
            let created = state
                .store
                .create_vendor(VendorRecord::register(email, local, now))
                .await?;
            let token = issue_token(&Actor::vendor(created.id), secret)?;
            (to_value(&created)?, token)
        }
        ActorKind::Customer => {
            let created = state
                .store
                .create_customer(CustomerRecord::register(email, now))
                .await?;
            let token = issue_token(&Actor::customer(created.id), secret)?;
            (to_value(&created)?, token)
        }
    };

    Ok((
        StatusCode::CREATED,
        success(
            json!({ "record": record, "token": token }),
            "Record created successfully!",
        ),
    ))
}

/// list_courses
///
/// [Public Route] Lists the storefront catalogue: active courses only.
#[utoipa::path(
    get,
    path = "/courses",
    responses((status = 200, description = "Active courses"))
)]
pub async fn list_courses(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiReply<Vec<CourseRecord>>>> {
    let courses = state.store.list_courses(true).await?;
    let message = format!("{} record(s) found!", courses.len());
    Ok(success(courses, message))
}

/// get_course
///
/// [Public Route] Fetches one course by id. Inactive and trashed courses
/// are indistinguishable from missing ones.
#[utoipa::path(
    get,
    path = "/courses/{id}",
    responses(
        (status = 200, description = "Course"),
        (status = 404, description = "Not found or not visible")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiReply<CourseRecord>>> {
    let id = parse_record_id(&id)?;
    let course = state.store.find_course(id).await?.ok_or_else(not_found)?;
    if course.standing != Standing::Active {
        return Err(not_found());
    }
    Ok(success(course, "Record found!"))
}

/// list_categories
///
/// [Public Route] Active categories for the storefront navigation.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Active categories"))
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiReply<Vec<CategoryRecord>>>> {
    let categories = state.store.list_categories(true).await?;
    let message = format!("{} record(s) found!", categories.len());
    Ok(success(categories, message))
}

/// get_vendor_by_domain
///
/// [Public Route] Resolves a storefront domain to its vendor record.
#[utoipa::path(
    get,
    path = "/vendors/{domain}",
    responses(
        (status = 200, description = "Vendor"),
        (status = 404, description = "No active vendor on this domain")
    )
)]
pub async fn get_vendor_by_domain(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> ApiResult<Json<ApiReply<VendorRecord>>> {
    let vendor = state
        .store
        .find_vendor_by_domain(&domain)
        .await?
        .ok_or_else(not_found)?;
    if vendor.standing != Standing::Active {
        return Err(not_found());
    }
    Ok(success(vendor, "Record found!"))
}

/// search_vendors
///
/// [Public Route] Ranked vendor search through the search index. A missing
/// or empty query string is the caller's fault; an unreachable index is a
/// recoverable upstream fault, never a crash.
#[utoipa::path(
    get,
    path = "/vendors/search",
    params(VendorSearchQuery),
    responses(
        (status = 200, description = "Ranked hits"),
        (status = 404, description = "No hits"),
        (status = 422, description = "Missing query string"),
        (status = 503, description = "Search backend unavailable")
    )
)]
pub async fn search_vendors(
    State(state): State<AppState>,
    Query(query): Query<VendorSearchQuery>,
) -> ApiResult<Json<ApiReply<Vec<VendorSummary>>>> {
    let q = query.q.as_deref().map(str::trim).unwrap_or("");
    if q.is_empty() {
        return Err(ApiError::Validation(format!(
            "Why incorrect query string \"{}\"?",
            query.q.as_deref().unwrap_or("")
        )));
    }
    let hits = state
        .search
        .vendors(q, query.from.unwrap_or(0), query.size.unwrap_or(10))
        .await?;
    if hits.is_empty() {
        return Err(ApiError::NotFound("0 record(s) found!".to_string()));
    }
    let message = format!("{} record(s) found!", hits.len());
    Ok(success(hits, message))
}

/// verify_attribute
///
/// [Public Route] Existence probe used by registration forms: does any
/// record of this kind already hold this email or username?
#[utoipa::path(
    get,
    path = "/verify/{kind}/{attribute}/{value}",
    responses(
        (status = 200, description = "Probe result"),
        (status = 422, description = "Unknown kind or attribute")
    )
)]
pub async fn verify_attribute(
    State(state): State<AppState>,
    Path((kind, attribute, value)): Path<(String, String, String)>,
) -> ApiResult<Json<ApiReply<ExistsReply>>> {
    let kind: ActorKind = kind.parse().map_err(ApiError::Validation)?;
    if attribute != "email" && attribute != "username" {
        return Err(ApiError::Validation(format!(
            "Attribute can only be \"email\" or \"username\", not {attribute}"
        )));
    }
    let exists = state
        .store
        .attribute_exists(kind, &attribute, &value)
        .await?;
    let message = if exists { "Record exists!" } else { "No record found!" };
    Ok(success(ExistsReply { exists }, message))
}

// --- Authenticated Handlers ---

/// get_me
///
/// [Authenticated Route] Returns the caller's own record, whichever
/// collection it lives in.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Own record"))
)]
pub async fn get_me(
    actor: Actor,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiReply<Value>>> {
    let (record, meta) = match actor.kind {
        ActorKind::Admin => {
            let found = state.store.find_admin(actor.id).await?.ok_or_else(not_found)?;
            (to_value(&found)?, found.moderation())
        }
        ActorKind::Vendor => {
            let found = state
                .store
                .find_vendor(actor.id)
                .await?
                .ok_or_else(not_found)?;
            (to_value(&found)?, found.moderation())
        }
        ActorKind::Customer => {
            let found = state
                .store
                .find_customer(actor.id)
                .await?
                .ok_or_else(not_found)?;
            (to_value(&found)?, found.moderation())
        }
    };
    policy::authorize(&actor, &Operation::ReadProfile, Some(&meta))?;
    Ok(success(record, "Record found!"))
}

/// update_me
///
/// [Authenticated Route] Partial self-update. Identity-ish fields
/// (username, email, business name) only fill empty slots; lifecycle,
/// approval and role fields are never writable here regardless of payload.
/// A record under administrative action other than `allow` is locked.
#[utoipa::path(
    put,
    path = "/me",
    request_body = ProfilePatch,
    responses(
        (status = 200, description = "Record updated"),
        (status = 423, description = "Record locked by administrative action")
    )
)]
pub async fn update_me(
    actor: Actor,
    State(state): State<AppState>,
    Json(patch): Json<ProfilePatch>,
) -> ApiResult<Json<ApiReply<Value>>> {
    let now = Utc::now();
    let record = match actor.kind {
        ActorKind::Admin => {
            let existing = state.store.find_admin(actor.id).await?.ok_or_else(not_found)?;
            policy::authorize(&actor, &Operation::UpdateProfile, Some(&existing.moderation()))?;
            let updated = mutation::apply_admin_profile(&existing, &patch, &actor, now)?;
            to_value(&state.store.update_admin(updated).await?.ok_or_else(not_found)?)?
        }
        ActorKind::Vendor => {
            let existing = state
                .store
                .find_vendor(actor.id)
                .await?
                .ok_or_else(not_found)?;
            policy::authorize(&actor, &Operation::UpdateProfile, Some(&existing.moderation()))?;
            let updated = mutation::apply_vendor_profile(&existing, &patch, &actor, now)?;
            to_value(
                &state
                    .store
                    .update_vendor(updated)
                    .await?
                    .ok_or_else(not_found)?,
            )?
        }
        ActorKind::Customer => {
            let existing = state
                .store
                .find_customer(actor.id)
                .await?
                .ok_or_else(not_found)?;
            policy::authorize(&actor, &Operation::UpdateProfile, Some(&existing.moderation()))?;
            let updated = mutation::apply_customer_profile(&existing, &patch, &actor, now)?;
            to_value(
                &state
                    .store
                    .update_customer(updated)
                    .await?
                    .ok_or_else(not_found)?,
            )?
        }
    };
    Ok(success(record, "Record updated successfully!"))
}

/// create_course
///
/// [Authenticated Route] A vendor lists a new course. Courses go live
/// immediately (approved/active/allow); moderation only intervenes after
/// the fact.
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created"),
        (status = 403, description = "Not a vendor"),
        (status = 422, description = "Missing title")
    )
)]
pub async fn create_course(
    actor: Actor,
    State(state): State<AppState>,
    Json(payload): Json<CreateCourseRequest>,
) -> ApiResult<(StatusCode, Json<ApiReply<CourseRecord>>)> {
    policy::authorize(&actor, &Operation::CreateCourse, None)?;
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Course title is required".to_string()));
    }
    let now = Utc::now();
    let record = CourseRecord {
        id: Uuid::new_v4(),
        vendor: actor.id,
        title: payload.title,
        description: payload.description,
        price: payload.price,
        available: payload.available.unwrap_or(true),
        standing: Standing::Active,
        action: AdminAction::Allow,
        approved: Approval::Accepted,
        approval_comment: None,
        approved_by: None,
        created: now,
        updated: now,
    };
    let created = state.store.create_course(record).await?;
    Ok((
        StatusCode::CREATED,
        success(created, "Record created successfully!"),
    ))
}

/// update_course
///
/// [Authenticated Route] Owner-only partial update of a course. Blocked
/// with 423 while the record is under `restrict` or `deny`.
#[utoipa::path(
    put,
    path = "/courses/{id}",
    request_body = CoursePatch,
    responses(
        (status = 200, description = "Course updated"),
        (status = 403, description = "Not the owner"),
        (status = 423, description = "Record locked by administrative action")
    )
)]
pub async fn update_course(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<CoursePatch>,
) -> ApiResult<Json<ApiReply<CourseRecord>>> {
    let id = parse_record_id(&id)?;
    let existing = state.store.find_course(id).await?.ok_or_else(not_found)?;
    policy::authorize(&actor, &Operation::UpdateCourse, Some(&existing.moderation()))?;
    let updated = mutation::apply_course_patch(&existing, &patch, Utc::now())?;
    let stored = state
        .store
        .update_course(updated)
        .await?
        .ok_or_else(not_found)?;
    Ok(success(stored, "Record updated successfully!"))
}

/// approve_course
///
/// [Authenticated Route] Peer-or-admin decision on a course flagged back to
/// `pending`. Another vendor or a moderator-tier admin may decide; the
/// owner may not. The owning vendor is notified of the outcome.
#[utoipa::path(
    post,
    path = "/courses/{id}/approval",
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Decision recorded"),
        (status = 403, description = "Owner or insufficient role"),
        (status = 409, description = "Already decided or gate failed"),
        (status = 422, description = "Missing status or short rejection comment")
    )
)]
pub async fn approve_course(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ApprovalRequest>,
) -> ApiResult<Json<ApiReply<CourseRecord>>> {
    let id = parse_record_id(&id)?;
    let course = state.store.find_course(id).await?.ok_or_else(not_found)?;
    policy::authorize(&actor, &Operation::ApproveCourse, Some(&course.moderation()))?;
    let decided = approval::decide_course(&course, &request, &actor, Utc::now())?;
    let stored = state
        .store
        .update_course(decided)
        .await?
        .ok_or_else(not_found)?;
    state
        .notifier
        .notify(
            stored.vendor,
            "Course approval decision",
            &format!("Your course \"{}\" has been {}", stored.title, stored.approved),
        )
        .await;
    Ok(success(stored, "Record updated successfully!"))
}

/// create_review
///
/// [Authenticated Route] A customer or vendor reviews a subject record.
/// The subject tag is a closed set and the referenced record must exist;
/// new reviews start `pending` until moderated.
#[utoipa::path(
    post,
    path = "/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created"),
        (status = 404, description = "Subject record missing"),
        (status = 422, description = "Bad subject or rating")
    )
)]
pub async fn create_review(
    actor: Actor,
    State(state): State<AppState>,
    Json(payload): Json<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<ApiReply<ReviewRecord>>)> {
    policy::authorize(&actor, &Operation::CreateReview, None)?;
    let subject: ReviewSubject = payload
        .subject
        .as_deref()
        .unwrap_or("")
        .parse()
        .map_err(ApiError::Validation)?;
    let subject_id = payload
        .subject_id
        .ok_or_else(|| ApiError::Validation("A subject Id is required".to_string()))?;
    if let Some(rating) = payload.rating {
        if !(1..=5).contains(&rating) {
            return Err(ApiError::Validation(
                "rating must be between [1 and 5].".to_string(),
            ));
        }
    }
    if !state.store.subject_exists(subject, subject_id).await? {
        return Err(ApiError::NotFound(format!("No {subject} record found!")));
    }

    let now = Utc::now();
    let record = ReviewRecord {
        id: Uuid::new_v4(),
        subject,
        subject_id,
        customer: (actor.kind == ActorKind::Customer).then_some(actor.id),
        vendor: (actor.kind == ActorKind::Vendor).then_some(actor.id),
        comment: payload.comment.unwrap_or_default(),
        rating: payload.rating,
        standing: Standing::Active,
        action: AdminAction::Allow,
        created: now,
        updated: now,
        ..ReviewRecord::default()
    };
    let created = state.store.create_review(record).await?;
    Ok((
        StatusCode::CREATED,
        success(created, "Record created successfully!"),
    ))
}

/// approve_review
///
/// [Authenticated Route] Crowd/admin verdict on a review. The exclusion
/// rule tracks the subject's owner: whoever owns the reviewed record
/// cannot be the one who settles reviews against it.
#[utoipa::path(
    post,
    path = "/reviews/{id}/approval",
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Decision recorded"),
        (status = 403, description = "Subject owner or insufficient role"),
        (status = 409, description = "Already decided")
    )
)]
pub async fn approve_review(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ApprovalRequest>,
) -> ApiResult<Json<ApiReply<ReviewRecord>>> {
    let id = parse_record_id(&id)?;
    let review = state.store.find_review(id).await?.ok_or_else(not_found)?;

    let meta = match review.subject {
        ReviewSubject::Course => state
            .store
            .find_course(review.subject_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No {} record found!", review.subject)))?
            .moderation(),
        ReviewSubject::Vendor => state
            .store
            .find_vendor(review.subject_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("No {} record found!", review.subject)))?
            .moderation(),
        ReviewSubject::Category => {
            let category = state
                .store
                .find_category(review.subject_id)
                .await?
                .ok_or_else(|| {
                    ApiError::NotFound(format!("No {} record found!", review.subject))
                })?;
            // Categories have no owning vendor, so the exclusion rule can
            // never trigger for them.
            crate::models::ModerationMeta {
                owner: Uuid::nil(),
                standing: category.standing,
                action: category.action,
                record_role: None,
                business_verified: None,
            }
        }
        other => return Err(ApiError::NotFound(format!("No {other} record found!"))),
    };
    policy::authorize(&actor, &Operation::ApproveReview, Some(&meta))?;

    let decided = approval::decide_review(&review, &request, &actor, Utc::now())?;
    let stored = state
        .store
        .update_review(decided)
        .await?
        .ok_or_else(not_found)?;
    Ok(success(stored, "Record updated successfully!"))
}

// --- Admin Handlers ---

/// list_admins
///
/// [Admin Route] All administrative accounts, oldest first.
#[utoipa::path(
    get,
    path = "/admin/admins",
    responses((status = 200, description = "Admin accounts"))
)]
pub async fn list_admins(
    actor: Actor,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiReply<Vec<AdminRecord>>>> {
    policy::authorize(&actor, &Operation::ReadAdmin, None)?;
    let admins = state.store.list_admins().await?;
    let message = format!("{} record(s) found!", admins.len());
    Ok(success(admins, message))
}

/// get_admin
#[utoipa::path(
    get,
    path = "/admin/admins/{id}",
    responses(
        (status = 200, description = "Admin account"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_admin(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiReply<AdminRecord>>> {
    policy::authorize(&actor, &Operation::ReadAdmin, None)?;
    let id = parse_record_id(&id)?;
    let admin = state.store.find_admin(id).await?.ok_or_else(not_found)?;
    Ok(success(admin, "Record found!"))
}

/// modify_admin
///
/// [Admin Route] Role and/or standing change on another admin. The super
/// account is untouchable, the super role unassignable, and only a super
/// may hand out `master`.
#[utoipa::path(
    patch,
    path = "/admin/admins/{id}",
    request_body = AdminModifyRequest,
    responses(
        (status = 200, description = "Admin updated"),
        (status = 403, description = "Role rules violated"),
        (status = 422, description = "Nothing to modify or invalid value")
    )
)]
pub async fn modify_admin(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AdminModifyRequest>,
) -> ApiResult<Json<ApiReply<AdminRecord>>> {
    let id = parse_record_id(&id)?;
    let existing = state.store.find_admin(id).await?.ok_or_else(not_found)?;

    let assign_role = request
        .role
        .as_deref()
        .map(|r| r.parse::<AdminRole>().map_err(ApiError::Validation))
        .transpose()?;
    let standing = parse_standing(request.standing.as_deref())?;

    policy::authorize(
        &actor,
        &Operation::ModifyAdmin { assign_role },
        Some(&existing.moderation()),
    )?;
    if assign_role.is_none() && standing.is_none() {
        return Err(ApiError::Validation(
            "Nothing to modify, provide a role or a status".to_string(),
        ));
    }

    let mut record = existing;
    if let Some(role) = assign_role {
        record.role = role;
    }
    if let Some(new) = standing {
        apply_standing(&mut record.standing, new, &actor)?;
    }
    record.updated = Utc::now();
    record.updated_by = Some(actor.id);

    let stored = state
        .store
        .update_admin(record)
        .await?
        .ok_or_else(not_found)?;
    Ok(success(stored, "Record updated successfully!"))
}

/// destroy_admin
///
/// [Admin Route] Super-only hard delete of an admin account. The super
/// account itself cannot be deleted.
#[utoipa::path(
    delete,
    path = "/admin/admins/{id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not super, or target is super")
    )
)]
pub async fn destroy_admin(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiReply<Vec<AdminRecord>>>> {
    let id = parse_record_id(&id)?;
    let existing = state.store.find_admin(id).await?.ok_or_else(not_found)?;
    policy::authorize(&actor, &Operation::DestroyAdmin, Some(&existing.moderation()))?;
    if existing.role == AdminRole::Super {
        return Err(ApiError::Forbidden(
            "You cannot delete a super admin".to_string(),
        ));
    }
    state.store.delete_admin(id).await?.ok_or_else(not_found)?;
    Ok(success(Vec::new(), "Record deleted successfully!"))
}

/// moderate_vendor
///
/// [Admin Route] Standing and administrative action on a vendor, always
/// together; a lone field is rejected rather than partially applied. The
/// acting admin is recorded on the vendor.
#[utoipa::path(
    patch,
    path = "/admin/vendors/{id}",
    request_body = VendorModerationRequest,
    responses(
        (status = 200, description = "Vendor moderated"),
        (status = 409, description = "Illegal standing transition"),
        (status = 422, description = "Missing field or invalid value")
    )
)]
pub async fn moderate_vendor(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<VendorModerationRequest>,
) -> ApiResult<Json<ApiReply<VendorRecord>>> {
    let id = parse_record_id(&id)?;
    let existing = state.store.find_vendor(id).await?.ok_or_else(not_found)?;
    policy::authorize(&actor, &Operation::ModerateVendor, Some(&existing.moderation()))?;

    let (Some(standing_raw), Some(action_raw)) =
        (request.standing.as_deref(), request.action.as_deref())
    else {
        return Err(ApiError::Validation(
            "Both status and administrative action are required to moderate a vendor"
                .to_string(),
        ));
    };
    let standing: Standing = standing_raw.parse().map_err(ApiError::Validation)?;
    let action: AdminAction = action_raw.parse().map_err(ApiError::Validation)?;

    let mut record = existing;
    apply_standing(&mut record.standing, standing, &actor)?;
    lifecycle::set_action(&mut record.action, action, &actor)?;
    if let Some(verified) = request.business_verified {
        record.business_verified = verified;
    }
    if let Some(comment) = request.comment {
        record.approval_comment = Some(comment);
    }
    record.admin = Some(actor.id);
    record.updated = Utc::now();

    let stored = state
        .store
        .update_vendor(record)
        .await?
        .ok_or_else(not_found)?;
    Ok(success(stored, "Record updated successfully!"))
}

/// approve_vendor
///
/// [Admin Route] Settles a vendor account's approval. Acceptance walks the
/// gate chain (standing, action, business verification) and reports the
/// first failure; rejection demands a justification comment. The vendor is
/// notified either way.
#[utoipa::path(
    post,
    path = "/admin/vendors/{id}/approval",
    request_body = ApprovalRequest,
    responses(
        (status = 200, description = "Decision recorded"),
        (status = 409, description = "Already decided or gate failed"),
        (status = 422, description = "Missing status or short rejection comment")
    )
)]
pub async fn approve_vendor(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ApprovalRequest>,
) -> ApiResult<Json<ApiReply<VendorRecord>>> {
    let id = parse_record_id(&id)?;
    let vendor = state.store.find_vendor(id).await?.ok_or_else(not_found)?;
    policy::authorize(&actor, &Operation::ApproveVendor, Some(&vendor.moderation()))?;
    let decided = approval::decide_vendor(&vendor, &request, &actor, Utc::now())?;
    let stored = state
        .store
        .update_vendor(decided)
        .await?
        .ok_or_else(not_found)?;

    let body = match &stored.approval_comment {
        Some(comment) if stored.approval == Approval::Rejected => format!(
            "Your vendor account has been {}: {comment}",
            stored.approval
        ),
        _ => format!("Your vendor account has been {}", stored.approval),
    };
    state
        .notifier
        .notify(stored.id, "Vendor account approval", &body)
        .await;
    Ok(success(stored, "Record updated successfully!"))
}

/// destroy_vendor
///
/// [Admin Route] Super-only hard delete of a vendor. Refused while the
/// vendor still owns any course.
#[utoipa::path(
    delete,
    path = "/admin/vendors/{id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 409, description = "Vendor still has courses")
    )
)]
pub async fn destroy_vendor(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiReply<Vec<VendorRecord>>>> {
    let id = parse_record_id(&id)?;
    let existing = state.store.find_vendor(id).await?.ok_or_else(not_found)?;
    policy::authorize(&actor, &Operation::DestroyVendor, Some(&existing.moderation()))?;
    if state.store.count_courses_by_vendor(id).await? > 0 {
        return Err(ApiError::Conflict(
            "Operation not allowed. Vendor still has product(s).".to_string(),
        ));
    }
    state.store.delete_vendor(id).await?.ok_or_else(not_found)?;
    Ok(success(Vec::new(), "Record deleted successfully!"))
}

/// list_all_courses
///
/// [Admin Route] The full catalogue, including inactive and trashed
/// courses the storefront hides.
#[utoipa::path(
    get,
    path = "/admin/courses",
    responses((status = 200, description = "All courses"))
)]
pub async fn list_all_courses(
    actor: Actor,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiReply<Vec<CourseRecord>>>> {
    policy::authorize(&actor, &Operation::ReadAdmin, None)?;
    let courses = state.store.list_courses(false).await?;
    let message = format!("{} record(s) found!", courses.len());
    Ok(success(courses, message))
}

/// moderate_course
///
/// [Admin Route] Standing/action change on a course; either field alone is
/// accepted. `approval: "pending"` flags a live course back for review,
/// which is the only way a decided course re-enters the approval workflow.
#[utoipa::path(
    patch,
    path = "/admin/courses/{id}",
    request_body = ModerationRequest,
    responses(
        (status = 200, description = "Course moderated"),
        (status = 409, description = "Illegal standing transition"),
        (status = 422, description = "Nothing to modify or invalid value")
    )
)]
pub async fn moderate_course(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ModerationRequest>,
) -> ApiResult<Json<ApiReply<CourseRecord>>> {
    let id = parse_record_id(&id)?;
    let existing = state.store.find_course(id).await?.ok_or_else(not_found)?;
    policy::authorize(&actor, &Operation::ModerateCourse, Some(&existing.moderation()))?;

    let standing = parse_standing(request.standing.as_deref())?;
    let action = parse_action(request.action.as_deref())?;
    let reflag = parse_reflag(request.approval.as_deref())?;
    if standing.is_none() && action.is_none() && reflag.is_none() {
        return Err(ApiError::Validation(
            "Nothing to modify, provide a status or an administrative action".to_string(),
        ));
    }

    let mut record = existing;
    if let Some(new) = standing {
        apply_standing(&mut record.standing, new, &actor)?;
    }
    if let Some(new) = action {
        lifecycle::set_action(&mut record.action, new, &actor)?;
    }
    if reflag.is_some() {
        record.approved = Approval::Pending;
        record.approval_comment = None;
        record.approved_by = None;
    }
    record.updated = Utc::now();

    let stored = state
        .store
        .update_course(record)
        .await?
        .ok_or_else(not_found)?;
    Ok(success(stored, "Record updated successfully!"))
}

/// destroy_course
#[utoipa::path(
    delete,
    path = "/admin/courses/{id}",
    responses((status = 200, description = "Deleted"))
)]
pub async fn destroy_course(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiReply<Vec<CourseRecord>>>> {
    let id = parse_record_id(&id)?;
    let existing = state.store.find_course(id).await?.ok_or_else(not_found)?;
    policy::authorize(&actor, &Operation::DestroyCourse, Some(&existing.moderation()))?;
    state.store.delete_course(id).await?.ok_or_else(not_found)?;
    Ok(success(Vec::new(), "Record deleted successfully!"))
}

/// create_category
///
/// [Admin Route] Any admin may curate the catalogue taxonomy.
#[utoipa::path(
    post,
    path = "/admin/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created"),
        (status = 422, description = "Missing name")
    )
)]
pub async fn create_category(
    actor: Actor,
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<ApiReply<CategoryRecord>>)> {
    policy::authorize(&actor, &Operation::CreateCategory, None)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Category name is required".to_string()));
    }
    let now = Utc::now();
    let record = CategoryRecord {
        id: Uuid::new_v4(),
        name: payload.name,
        description: payload.description.unwrap_or_default(),
        kind: payload.kind.unwrap_or_default(),
        standing: Standing::Active,
        action: AdminAction::Allow,
        created: now,
        updated: now,
    };
    let created = state.store.create_category(record).await?;
    Ok((
        StatusCode::CREATED,
        success(created, "Record created successfully!"),
    ))
}

/// update_category
///
/// [Admin Route] Content edits are open to any admin; a standing or action
/// change in the same payload additionally requires a moderator-tier role.
#[utoipa::path(
    patch,
    path = "/admin/categories/{id}",
    request_body = CategoryPatch,
    responses(
        (status = 200, description = "Category updated"),
        (status = 403, description = "Moderation fields need a higher tier")
    )
)]
pub async fn update_category(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<CategoryPatch>,
) -> ApiResult<Json<ApiReply<CategoryRecord>>> {
    let id = parse_record_id(&id)?;
    let existing = state.store.find_category(id).await?.ok_or_else(not_found)?;
    policy::authorize(&actor, &Operation::EditCategory, None)?;

    let standing = parse_standing(patch.standing.as_deref())?;
    let action = parse_action(patch.action.as_deref())?;

    let mut record = mutation::apply_category_patch(&existing, &patch, Utc::now());
    if standing.is_some() || action.is_some() {
        policy::authorize(&actor, &Operation::ModerateCategory, None)?;
        if let Some(new) = standing {
            apply_standing(&mut record.standing, new, &actor)?;
        }
        if let Some(new) = action {
            lifecycle::set_action(&mut record.action, new, &actor)?;
        }
    }

    let stored = state
        .store
        .update_category(record)
        .await?
        .ok_or_else(not_found)?;
    Ok(success(stored, "Record updated successfully!"))
}

/// destroy_category
#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    responses((status = 200, description = "Deleted"))
)]
pub async fn destroy_category(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiReply<Vec<CategoryRecord>>>> {
    let id = parse_record_id(&id)?;
    state.store.find_category(id).await?.ok_or_else(not_found)?;
    policy::authorize(&actor, &Operation::DestroyCategory, None)?;
    state
        .store
        .delete_category(id)
        .await?
        .ok_or_else(not_found)?;
    Ok(success(Vec::new(), "Record deleted successfully!"))
}

/// moderate_review
///
/// [Admin Route] Standing/action change on a review; `approval: "pending"`
/// reopens a settled review for a fresh verdict.
#[utoipa::path(
    patch,
    path = "/admin/reviews/{id}",
    request_body = ModerationRequest,
    responses(
        (status = 200, description = "Review moderated"),
        (status = 422, description = "Nothing to modify or invalid value")
    )
)]
pub async fn moderate_review(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ModerationRequest>,
) -> ApiResult<Json<ApiReply<ReviewRecord>>> {
    let id = parse_record_id(&id)?;
    let existing = state.store.find_review(id).await?.ok_or_else(not_found)?;
    policy::authorize(&actor, &Operation::ModerateReview, None)?;

    let standing = parse_standing(request.standing.as_deref())?;
    let action = parse_action(request.action.as_deref())?;
    let reflag = parse_reflag(request.approval.as_deref())?;
    if standing.is_none() && action.is_none() && reflag.is_none() {
        return Err(ApiError::Validation(
            "Nothing to modify, provide a status or an administrative action".to_string(),
        ));
    }

    let mut record = existing;
    if let Some(new) = standing {
        apply_standing(&mut record.standing, new, &actor)?;
    }
    if let Some(new) = action {
        lifecycle::set_action(&mut record.action, new, &actor)?;
    }
    if reflag.is_some() {
        record.approved = Approval::Pending;
        record.approved_by = None;
    }
    record.updated = Utc::now();

    let stored = state
        .store
        .update_review(record)
        .await?
        .ok_or_else(not_found)?;
    Ok(success(stored, "Record updated successfully!"))
}

/// destroy_review
#[utoipa::path(
    delete,
    path = "/admin/reviews/{id}",
    responses((status = 200, description = "Deleted"))
)]
pub async fn destroy_review(
    actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiReply<Vec<ReviewRecord>>>> {
    let id = parse_record_id(&id)?;
    state.store.find_review(id).await?.ok_or_else(not_found)?;
    policy::authorize(&actor, &Operation::DestroyReview, None)?;
    state.store.delete_review(id).await?.ok_or_else(not_found)?;
    Ok(success(Vec::new(), "Record deleted successfully!"))
}

/// get_stats
///
/// [Admin Route] Dashboard counters, including the pending vendor
/// approval backlog.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Dashboard counters"))
)]
pub async fn get_stats(
    actor: Actor,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiReply<DashboardStats>>> {
    policy::authorize(&actor, &Operation::ViewStats, None)?;
    let stats = state.store.stats().await?;
    Ok(success(stats, "Record found!"))
}
