use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use coursemart::{
    AppState, MemoryStore, MockNotifier, MockSearch, NotifierState, SearchState, StoreState,
    config::AppConfig,
    repository::Store,
    error::ApiError,
    handlers::{self, VendorSearchQuery},
    models::{
        Actor, AdminAction, AdminModifyRequest, AdminRecord, AdminRole, Approval,
        ApprovalRequest, CoursePatch, CourseRecord, CreateCourseRequest, CreateReviewRequest,
        CustomerRecord, ModerationRequest, ProfilePatch, RegisterRequest, ReviewRecord,
        ReviewSubject, Standing, VendorModerationRequest, VendorRecord, VendorSummary,
    },
};
use serde_json::json;
use tokio::test;
use uuid::Uuid;

// --- Test Harness ---

struct TestContext {
    store: Arc<MemoryStore>,
    notifier: Arc<MockNotifier>,
    state: AppState,
}

fn context() -> TestContext {
    context_with_search(MockSearch::default())
}

fn context_with_search(search: MockSearch) -> TestContext {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(MockNotifier::default());
    let state = AppState {
        store: store.clone() as StoreState,
        search: Arc::new(search) as SearchState,
        notifier: notifier.clone() as NotifierState,
        config: AppConfig::default(),
    };
    TestContext {
        store,
        notifier,
        state,
    }
}

fn master() -> Actor {
    Actor::admin(Uuid::new_v4(), AdminRole::Master)
}

fn superadmin() -> Actor {
    Actor::admin(Uuid::new_v4(), AdminRole::Super)
}

fn seeded_vendor(ctx: &TestContext) -> VendorRecord {
    let vendor = VendorRecord {
        id: Uuid::new_v4(),
        username: "original".to_string(),
        email: "vendor@example.com".to_string(),
        domain_name: "vendor".to_string(),
        standing: Standing::Active,
        action: AdminAction::Allow,
        business_verified: true,
        approval: Approval::Pending,
        created: Utc::now(),
        updated: Utc::now(),
        ..VendorRecord::default()
    };
    ctx.store.seed_vendor(vendor.clone());
    vendor
}

fn seeded_course(ctx: &TestContext, vendor: Uuid, approved: Approval) -> CourseRecord {
    let course = CourseRecord {
        id: Uuid::new_v4(),
        vendor,
        title: "Rust for marketplaces".to_string(),
        standing: Standing::Active,
        action: AdminAction::Allow,
        approved,
        created: Utc::now(),
        updated: Utc::now(),
        ..CourseRecord::default()
    };
    ctx.store.seed_course(course.clone());
    course
}

// --- Registration ---

#[test]
async fn first_admin_registration_is_promoted_to_super() {
    let ctx = context();

    let (status, Json(reply)) = handlers::register(
        State(ctx.state.clone()),
        Json(RegisterRequest {
            kind: "admin".to_string(),
            email: "root@example.com".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    let payload = reply.payload.unwrap();
    assert_eq!(payload["record"]["role"], json!("super"));
    assert_eq!(payload["record"]["standing"], json!("active"));
    assert_eq!(payload["record"]["complete_profile"], json!(true));
    assert!(payload["token"].as_str().is_some_and(|t| !t.is_empty()));

    // The second admin gets the ordinary defaults.
    let (_, Json(reply)) = handlers::register(
        State(ctx.state),
        Json(RegisterRequest {
            kind: "admin".to_string(),
            email: "second@example.com".to_string(),
        }),
    )
    .await
    .unwrap();
    let payload = reply.payload.unwrap();
    assert_eq!(payload["record"]["role"], json!("support"));
    assert_eq!(payload["record"]["standing"], json!("inactive"));
    assert_eq!(payload["record"]["complete_profile"], json!(false));
}

#[test]
async fn concurrent_first_registrations_crown_exactly_one_super() {
    let ctx = context();

    let first = handlers::register(
        State(ctx.state.clone()),
        Json(RegisterRequest {
            kind: "admin".to_string(),
            email: "first@example.com".to_string(),
        }),
    );
    let second = handlers::register(
        State(ctx.state.clone()),
        Json(RegisterRequest {
            kind: "admin".to_string(),
            email: "second@example.com".to_string(),
        }),
    );
    let (first, second) = tokio::join!(first, second);
    first.unwrap();
    second.unwrap();

    let admins = ctx.state.store.list_admins().await.unwrap();
    assert_eq!(admins.len(), 2);
    let supers = admins.iter().filter(|a| a.role == AdminRole::Super).count();
    assert_eq!(supers, 1, "exactly one registration may be promoted");
}

#[test]
async fn vendor_registration_derives_domain_and_starts_pending() {
    let ctx = context();

    let (_, Json(reply)) = handlers::register(
        State(ctx.state),
        Json(RegisterRequest {
            kind: "vendor".to_string(),
            email: "Shop@Example.com".to_string(),
        }),
    )
    .await
    .unwrap();

    let payload = reply.payload.unwrap();
    assert_eq!(payload["record"]["domain_name"], json!("shop"));
    assert_eq!(payload["record"]["approval"], json!("pending"));
    assert_eq!(payload["record"]["email"], json!("shop@example.com"));
}

#[test]
async fn duplicate_registration_email_conflicts() {
    let ctx = context();
    ctx.store.seed_customer(CustomerRecord {
        id: Uuid::new_v4(),
        email: "taken@example.com".to_string(),
        ..CustomerRecord::default()
    });

    let err = handlers::register(
        State(ctx.state),
        Json(RegisterRequest {
            kind: "customer".to_string(),
            email: "taken@example.com".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[test]
async fn unknown_registration_kind_uses_canonical_wording() {
    let ctx = context();

    let err = handlers::register(
        State(ctx.state),
        Json(RegisterRequest {
            kind: "moderator".to_string(),
            email: "x@example.com".to_string(),
        }),
    )
    .await
    .unwrap_err();
    match err {
        ApiError::Validation(message) => {
            assert!(message.contains("\"admin\", \"vendor\", or \"customer\""), "{message}");
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

// --- Storefront reads ---

#[test]
async fn malformed_record_ids_read_as_missing() {
    let ctx = context();

    let err = handlers::get_course(State(ctx.state), Path("not-a-uuid".to_string()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::NotFound("Invalid record Id as request parameter".to_string())
    );
}

#[test]
async fn inactive_courses_are_hidden_from_the_storefront() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);
    let mut course = seeded_course(&ctx, vendor.id, Approval::Accepted);
    course.standing = Standing::Inactive;
    ctx.store.seed_course(course.clone());

    let err = handlers::get_course(State(ctx.state.clone()), Path(course.id.to_string()))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::NotFound("No record found!".to_string()));

    let Json(reply) = handlers::list_courses(State(ctx.state)).await.unwrap();
    assert_eq!(reply.payload.unwrap().len(), 0);
}

// --- Vendor search ---

#[test]
async fn search_without_a_query_string_is_rejected() {
    let ctx = context();

    let err = handlers::search_vendors(
        State(ctx.state),
        Query(VendorSearchQuery {
            q: None,
            from: None,
            size: None,
        }),
    )
    .await
    .unwrap_err();
    match err {
        ApiError::Validation(message) => {
            assert!(message.starts_with("Why incorrect query string"), "{message}");
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[test]
async fn search_index_failure_is_a_recoverable_503() {
    let ctx = context_with_search(MockSearch {
        should_fail: true,
        ..MockSearch::default()
    });

    let err = handlers::search_vendors(
        State(ctx.state),
        Query(VendorSearchQuery {
            q: Some("rust".to_string()),
            from: None,
            size: None,
        }),
    )
    .await
    .unwrap_err();
    match &err {
        ApiError::Upstream(message) => {
            assert!(message.contains("Search backend unavailable"), "{message}");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
    assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[test]
async fn search_with_no_hits_reports_zero_records() {
    let ctx = context();

    let err = handlers::search_vendors(
        State(ctx.state),
        Query(VendorSearchQuery {
            q: Some("nothing".to_string()),
            from: None,
            size: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err, ApiError::NotFound("0 record(s) found!".to_string()));
}

#[test]
async fn search_hits_come_back_counted() {
    let ctx = context_with_search(MockSearch {
        results: vec![VendorSummary {
            id: Uuid::new_v4(),
            business_name: "Rust Shop".to_string(),
            domain_name: "rustshop".to_string(),
            score: 2.0,
        }],
        should_fail: false,
    });

    let Json(reply) = handlers::search_vendors(
        State(ctx.state),
        Query(VendorSearchQuery {
            q: Some("rust".to_string()),
            from: None,
            size: None,
        }),
    )
    .await
    .unwrap();
    assert_eq!(reply.message, "1 record(s) found!");
    assert_eq!(reply.payload.unwrap()[0].business_name, "Rust Shop");
}

// --- Profile updates ---

#[test]
async fn profile_updates_never_overwrite_set_identity_fields() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);

    let Json(reply) = handlers::update_me(
        Actor::vendor(vendor.id),
        State(ctx.state),
        Json(ProfilePatch {
            username: Some("impostor".to_string()),
            business_name: Some("Fresh Goods".to_string()),
            ..ProfilePatch::default()
        }),
    )
    .await
    .unwrap();

    let payload = reply.payload.unwrap();
    assert_eq!(payload["username"], json!("original"));
    // The empty business_name slot fills.
    assert_eq!(payload["business_name"], json!("Fresh Goods"));
}

#[test]
async fn profile_updates_are_locked_under_administrative_action() {
    let ctx = context();
    let mut vendor = seeded_vendor(&ctx);
    vendor.action = AdminAction::Deny;
    ctx.store.seed_vendor(vendor.clone());

    let err = handlers::update_me(
        Actor::vendor(vendor.id),
        State(ctx.state),
        Json(ProfilePatch::default()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::RecordLocked(_)));
    assert_eq!(err.status(), StatusCode::LOCKED);
}

// --- Courses ---

#[test]
async fn course_creation_is_vendor_only() {
    let ctx = context();

    let err = handlers::create_course(
        Actor::customer(Uuid::new_v4()),
        State(ctx.state),
        Json(CreateCourseRequest {
            title: "Nope".to_string(),
            ..CreateCourseRequest::default()
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[test]
async fn created_courses_go_live_immediately() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);

    let (status, Json(reply)) = handlers::create_course(
        Actor::vendor(vendor.id),
        State(ctx.state),
        Json(CreateCourseRequest {
            title: "Ownership and Borrowing".to_string(),
            description: "All of it".to_string(),
            price: Some(1500),
            available: None,
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    let course = reply.payload.unwrap();
    assert_eq!(course.vendor, vendor.id);
    assert_eq!(course.standing, Standing::Active);
    assert_eq!(course.approved, Approval::Accepted);
    assert!(course.available);
}

#[test]
async fn course_updates_are_owner_only() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);
    let course = seeded_course(&ctx, vendor.id, Approval::Accepted);

    let err = handlers::update_course(
        Actor::vendor(Uuid::new_v4()),
        State(ctx.state),
        Path(course.id.to_string()),
        Json(CoursePatch::default()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[test]
async fn owners_cannot_settle_their_own_course_approval() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);
    let course = seeded_course(&ctx, vendor.id, Approval::Pending);

    let err = handlers::approve_course(
        Actor::vendor(vendor.id),
        State(ctx.state),
        Path(course.id.to_string()),
        Json(ApprovalRequest {
            approval: Some("accepted".to_string()),
            comment: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        ApiError::Forbidden("A vendor cannot approve her product.".to_string())
    );
}

#[test]
async fn peer_course_rejection_needs_a_long_comment() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);
    let course = seeded_course(&ctx, vendor.id, Approval::Pending);
    let peer = Actor::vendor(Uuid::new_v4());

    let err = handlers::approve_course(
        peer.clone(),
        State(ctx.state.clone()),
        Path(course.id.to_string()),
        Json(ApprovalRequest {
            approval: Some("rejected".to_string()),
            comment: Some("too short".to_string()),
        }),
    )
    .await
    .unwrap_err();
    match err {
        ApiError::Validation(message) => {
            assert!(message.contains("more than 50 characters"), "{message}");
        }
        other => panic!("expected Validation, got {other:?}"),
    }

    let long_comment = "The syllabus promises content the lessons never actually deliver on.";
    let Json(reply) = handlers::approve_course(
        peer,
        State(ctx.state),
        Path(course.id.to_string()),
        Json(ApprovalRequest {
            approval: Some("rejected".to_string()),
            comment: Some(long_comment.to_string()),
        }),
    )
    .await
    .unwrap();
    let course = reply.payload.unwrap();
    assert_eq!(course.approved, Approval::Rejected);
    assert_eq!(course.approval_comment.as_deref(), Some(long_comment));
}

// --- Vendor approval & moderation ---

#[test]
async fn vendor_acceptance_gate_names_the_standing_check_first() {
    let ctx = context();
    let mut vendor = seeded_vendor(&ctx);
    vendor.standing = Standing::Inactive;
    ctx.store.seed_vendor(vendor.clone());

    let err = handlers::approve_vendor(
        master(),
        State(ctx.state),
        Path(vendor.id.to_string()),
        Json(ApprovalRequest {
            approval: Some("accepted".to_string()),
            comment: None,
        }),
    )
    .await
    .unwrap_err();
    match err {
        ApiError::Conflict(message) => {
            assert!(message.contains("standing \"inactive\""), "{message}");
            assert!(!message.contains("businessVerified"), "{message}");
        }
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[test]
async fn vendor_acceptance_notifies_and_is_terminal() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);
    let by = master();

    let Json(reply) = handlers::approve_vendor(
        by.clone(),
        State(ctx.state.clone()),
        Path(vendor.id.to_string()),
        Json(ApprovalRequest {
            approval: Some("accepted".to_string()),
            comment: None,
        }),
    )
    .await
    .unwrap();
    let updated = reply.payload.unwrap();
    assert_eq!(updated.approval, Approval::Accepted);
    assert_eq!(updated.approved_by, Some(by.id));

    let sent = ctx.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, vendor.id);
    assert!(sent[0].body.contains("accepted"), "{}", sent[0].body);

    // A second decision of any kind is refused.
    let err = handlers::approve_vendor(
        by,
        State(ctx.state),
        Path(vendor.id.to_string()),
        Json(ApprovalRequest {
            approval: Some("rejected".to_string()),
            comment: Some("a comment long enough to pass the vendor bar".to_string()),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[test]
async fn vendor_moderation_requires_standing_and_action_together() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);

    let err = handlers::moderate_vendor(
        master(),
        State(ctx.state),
        Path(vendor.id.to_string()),
        Json(VendorModerationRequest {
            standing: Some("inactive".to_string()),
            action: None,
            ..VendorModerationRequest::default()
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        ApiError::Validation(
            "Both status and administrative action are required to moderate a vendor".to_string()
        )
    );
}

#[test]
async fn vendor_moderation_applies_both_fields_and_stamps_the_admin() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);
    let by = master();

    let Json(reply) = handlers::moderate_vendor(
        by.clone(),
        State(ctx.state),
        Path(vendor.id.to_string()),
        Json(VendorModerationRequest {
            standing: Some("inactive".to_string()),
            action: Some("restrict".to_string()),
            business_verified: Some(true),
            comment: None,
        }),
    )
    .await
    .unwrap();

    let updated = reply.payload.unwrap();
    assert_eq!(updated.standing, Standing::Inactive);
    assert_eq!(updated.action, AdminAction::Restrict);
    assert!(updated.business_verified);
    assert_eq!(updated.admin, Some(by.id));
}

#[test]
async fn vendors_with_courses_cannot_be_destroyed() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);
    let course = seeded_course(&ctx, vendor.id, Approval::Accepted);
    let by = superadmin();

    let err = handlers::destroy_vendor(
        by.clone(),
        State(ctx.state.clone()),
        Path(vendor.id.to_string()),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        ApiError::Conflict("Operation not allowed. Vendor still has product(s).".to_string())
    );

    // Once the catalogue is cleared the delete goes through with an empty
    // payload.
    handlers::destroy_course(by.clone(), State(ctx.state.clone()), Path(course.id.to_string()))
        .await
        .unwrap();
    let Json(reply) = handlers::destroy_vendor(by, State(ctx.state), Path(vendor.id.to_string()))
        .await
        .unwrap();
    assert_eq!(reply.message, "Record deleted successfully!");
    assert_eq!(reply.payload.unwrap().len(), 0);
}

#[test]
async fn course_free_vendors_can_be_destroyed_by_super() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);

    // Master is not enough.
    let err = handlers::destroy_vendor(
        master(),
        State(ctx.state.clone()),
        Path(vendor.id.to_string()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let Json(reply) = handlers::destroy_vendor(
        superadmin(),
        State(ctx.state),
        Path(vendor.id.to_string()),
    )
    .await
    .unwrap();
    assert_eq!(reply.message, "Record deleted successfully!");
}

// --- Admin management ---

#[test]
async fn the_super_admin_record_cannot_be_modified_or_deleted() {
    let ctx = context();
    let target = AdminRecord {
        id: Uuid::new_v4(),
        role: AdminRole::Super,
        standing: Standing::Active,
        ..AdminRecord::default()
    };
    ctx.store.seed_admin(target.clone());

    let err = handlers::modify_admin(
        master(),
        State(ctx.state.clone()),
        Path(target.id.to_string()),
        Json(AdminModifyRequest {
            role: Some("support".to_string()),
            standing: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err, ApiError::Forbidden("You cannot modify a super admin".to_string()));

    let err = handlers::destroy_admin(
        superadmin(),
        State(ctx.state),
        Path(target.id.to_string()),
    )
    .await
    .unwrap_err();
    assert_eq!(err, ApiError::Forbidden("You cannot delete a super admin".to_string()));
}

#[test]
async fn admin_modification_with_an_empty_payload_is_rejected() {
    let ctx = context();
    let target = AdminRecord {
        id: Uuid::new_v4(),
        role: AdminRole::Support,
        ..AdminRecord::default()
    };
    ctx.store.seed_admin(target.clone());

    let err = handlers::modify_admin(
        master(),
        State(ctx.state),
        Path(target.id.to_string()),
        Json(AdminModifyRequest::default()),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        ApiError::Validation("Nothing to modify, provide a role or a status".to_string())
    );
}

#[test]
async fn only_super_assigns_the_master_role() {
    let ctx = context();
    let target = AdminRecord {
        id: Uuid::new_v4(),
        role: AdminRole::Support,
        ..AdminRecord::default()
    };
    ctx.store.seed_admin(target.clone());

    let err = handlers::modify_admin(
        master(),
        State(ctx.state.clone()),
        Path(target.id.to_string()),
        Json(AdminModifyRequest {
            role: Some("master".to_string()),
            standing: None,
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let Json(reply) = handlers::modify_admin(
        superadmin(),
        State(ctx.state),
        Path(target.id.to_string()),
        Json(AdminModifyRequest {
            role: Some("master".to_string()),
            standing: Some("active".to_string()),
        }),
    )
    .await
    .unwrap();
    let updated = reply.payload.unwrap();
    assert_eq!(updated.role, AdminRole::Master);
    assert_eq!(updated.standing, Standing::Active);
}

// --- Reviews ---

#[test]
async fn review_ratings_are_bounded() {
    let ctx = context();

    let err = handlers::create_review(
        Actor::customer(Uuid::new_v4()),
        State(ctx.state),
        Json(CreateReviewRequest {
            subject: Some("course".to_string()),
            subject_id: Some(Uuid::new_v4()),
            rating: Some(7),
            comment: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        ApiError::Validation("rating must be between [1 and 5].".to_string())
    );
}

#[test]
async fn reviews_require_an_existing_subject_record() {
    let ctx = context();

    let err = handlers::create_review(
        Actor::customer(Uuid::new_v4()),
        State(ctx.state),
        Json(CreateReviewRequest {
            subject: Some("course".to_string()),
            subject_id: Some(Uuid::new_v4()),
            rating: Some(4),
            comment: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err, ApiError::NotFound("No course record found!".to_string()));
}

#[test]
async fn created_reviews_start_pending_and_carry_the_author() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);
    let course = seeded_course(&ctx, vendor.id, Approval::Accepted);
    let author = Actor::customer(Uuid::new_v4());

    let (status, Json(reply)) = handlers::create_review(
        author.clone(),
        State(ctx.state),
        Json(CreateReviewRequest {
            subject: Some("course".to_string()),
            subject_id: Some(course.id),
            rating: Some(5),
            comment: Some("Clear and practical".to_string()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    let review = reply.payload.unwrap();
    assert_eq!(review.approved, Approval::Pending);
    assert_eq!(review.customer, Some(author.id));
    assert_eq!(review.vendor, None);
}

#[test]
async fn vendors_cannot_settle_reviews_about_themselves() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);
    let review = ReviewRecord {
        id: Uuid::new_v4(),
        subject: ReviewSubject::Vendor,
        subject_id: vendor.id,
        customer: Some(Uuid::new_v4()),
        approved: Approval::Pending,
        ..ReviewRecord::default()
    };
    ctx.store.seed_review(review.clone());

    let err = handlers::approve_review(
        Actor::vendor(vendor.id),
        State(ctx.state.clone()),
        Path(review.id.to_string()),
        Json(ApprovalRequest {
            approval: Some("accepted".to_string()),
            comment: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        ApiError::Forbidden("A vendor cannot approve her product.".to_string())
    );

    // An uninvolved vendor peer settles it fine.
    let Json(reply) = handlers::approve_review(
        Actor::vendor(Uuid::new_v4()),
        State(ctx.state),
        Path(review.id.to_string()),
        Json(ApprovalRequest {
            approval: Some("accepted".to_string()),
            comment: None,
        }),
    )
    .await
    .unwrap();
    assert_eq!(reply.payload.unwrap().approved, Approval::Accepted);
}

#[test]
async fn vendors_cannot_settle_reviews_about_their_own_course() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);
    let course = seeded_course(&ctx, vendor.id, Approval::Accepted);
    let review = ReviewRecord {
        id: Uuid::new_v4(),
        subject: ReviewSubject::Course,
        subject_id: course.id,
        customer: Some(Uuid::new_v4()),
        approved: Approval::Pending,
        ..ReviewRecord::default()
    };
    ctx.store.seed_review(review.clone());

    let err = handlers::approve_review(
        Actor::vendor(vendor.id),
        State(ctx.state),
        Path(review.id.to_string()),
        Json(ApprovalRequest {
            approval: Some("rejected".to_string()),
            comment: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        ApiError::Forbidden("A vendor cannot approve her product.".to_string())
    );
}

// --- Moderation of courses and categories ---

#[test]
async fn admin_restore_is_the_only_exit_from_trashed() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);
    let mut course = seeded_course(&ctx, vendor.id, Approval::Accepted);
    course.standing = Standing::Trashed;
    ctx.store.seed_course(course.clone());

    // A support admin lacks the moderation tier entirely.
    let err = handlers::moderate_course(
        Actor::admin(Uuid::new_v4(), AdminRole::Support),
        State(ctx.state.clone()),
        Path(course.id.to_string()),
        Json(ModerationRequest {
            standing: Some("active".to_string()),
            ..ModerationRequest::default()
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let Json(reply) = handlers::moderate_course(
        master(),
        State(ctx.state),
        Path(course.id.to_string()),
        Json(ModerationRequest {
            standing: Some("active".to_string()),
            ..ModerationRequest::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(reply.payload.unwrap().standing, Standing::Active);
}

#[test]
async fn courses_can_be_flagged_back_for_review() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);
    let mut course = seeded_course(&ctx, vendor.id, Approval::Accepted);
    course.approval_comment = Some("fine".to_string());
    course.approved_by = Some(Uuid::new_v4());
    ctx.store.seed_course(course.clone());

    // The moderation route never hands out a decision directly.
    let err = handlers::moderate_course(
        master(),
        State(ctx.state.clone()),
        Path(course.id.to_string()),
        Json(ModerationRequest {
            approval: Some("accepted".to_string()),
            ..ModerationRequest::default()
        }),
    )
    .await
    .unwrap_err();
    match err {
        ApiError::Validation(message) => {
            assert!(message.contains("reset to \"pending\""), "{message}");
        }
        other => panic!("expected Validation, got {other:?}"),
    }

    let Json(reply) = handlers::moderate_course(
        master(),
        State(ctx.state.clone()),
        Path(course.id.to_string()),
        Json(ModerationRequest {
            approval: Some("pending".to_string()),
            ..ModerationRequest::default()
        }),
    )
    .await
    .unwrap();
    let reopened = reply.payload.unwrap();
    assert_eq!(reopened.approved, Approval::Pending);
    assert_eq!(reopened.approval_comment, None);
    assert_eq!(reopened.approved_by, None);

    // The reopened course goes through the normal peer decision.
    let peer = Actor::vendor(Uuid::new_v4());
    let Json(reply) = handlers::approve_course(
        peer.clone(),
        State(ctx.state),
        Path(course.id.to_string()),
        Json(ApprovalRequest {
            approval: Some("accepted".to_string()),
            comment: None,
        }),
    )
    .await
    .unwrap();
    let settled = reply.payload.unwrap();
    assert_eq!(settled.approved, Approval::Accepted);
    assert_eq!(settled.approved_by, Some(peer.id));
}

#[test]
async fn moderation_with_no_fields_is_rejected() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);
    let course = seeded_course(&ctx, vendor.id, Approval::Accepted);

    let err = handlers::moderate_course(
        master(),
        State(ctx.state),
        Path(course.id.to_string()),
        Json(ModerationRequest::default()),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        ApiError::Validation(
            "Nothing to modify, provide a status or an administrative action".to_string()
        )
    );
}

// --- Probes and stats ---

#[test]
async fn attribute_probe_answers_both_ways() {
    let ctx = context();
    ctx.store.seed_customer(CustomerRecord {
        id: Uuid::new_v4(),
        email: "known@example.com".to_string(),
        ..CustomerRecord::default()
    });

    let Json(reply) = handlers::verify_attribute(
        State(ctx.state.clone()),
        Path((
            "customer".to_string(),
            "email".to_string(),
            "known@example.com".to_string(),
        )),
    )
    .await
    .unwrap();
    assert!(reply.payload.unwrap().exists);

    let Json(reply) = handlers::verify_attribute(
        State(ctx.state.clone()),
        Path((
            "customer".to_string(),
            "email".to_string(),
            "unknown@example.com".to_string(),
        )),
    )
    .await
    .unwrap();
    assert!(!reply.payload.unwrap().exists);

    let err = handlers::verify_attribute(
        State(ctx.state),
        Path((
            "customer".to_string(),
            "password".to_string(),
            "secret".to_string(),
        )),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[test]
async fn stats_count_the_pending_vendor_backlog() {
    let ctx = context();
    seeded_vendor(&ctx);
    let mut accepted = seeded_vendor(&ctx);
    accepted.email = "other@example.com".to_string();
    accepted.approval = Approval::Accepted;
    ctx.store.seed_vendor(accepted);

    let Json(reply) = handlers::get_stats(master(), State(ctx.state)).await.unwrap();
    let stats = reply.payload.unwrap();
    assert_eq!(stats.total_vendors, 2);
    assert_eq!(stats.pending_vendor_approvals, 1);
}

#[test]
async fn get_me_returns_the_callers_own_record() {
    let ctx = context();
    let vendor = seeded_vendor(&ctx);

    let Json(reply) = handlers::get_me(Actor::vendor(vendor.id), State(ctx.state))
        .await
        .unwrap();
    let payload = reply.payload.unwrap();
    assert_eq!(payload["id"], json!(vendor.id.to_string()));
    assert_eq!(payload["domain_name"], json!("vendor"));
}
