use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::mutation::{lenient_bool, lenient_i64, lenient_nested};

// --- Lifecycle & Role Enums ---

/// Standing
///
/// Lifecycle visibility state carried by every moderated record. `trashed` is
/// one-way: leaving it requires an explicit admin restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "standing", rename_all = "lowercase")]
#[ts(export)]
pub enum Standing {
    #[default]
    Active,
    Inactive,
    Trashed,
}

impl std::fmt::Display for Standing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Standing::Active => "active",
            Standing::Inactive => "inactive",
            Standing::Trashed => "trashed",
        })
    }
}

impl std::str::FromStr for Standing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Standing::Active),
            "inactive" => Ok(Standing::Inactive),
            "trashed" => Ok(Standing::Trashed),
            other => Err(format!(
                "User status can only be \"active\", \"inactive\", or \"trashed\", not {other}"
            )),
        }
    }
}

/// AdminAction
///
/// Administrative lock state, set exclusively by admin actors. Anything other
/// than `allow` blocks owner-initiated mutation of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "admin_action", rename_all = "lowercase")]
#[ts(export)]
pub enum AdminAction {
    #[default]
    Allow,
    Restrict,
    Deny,
}

impl std::fmt::Display for AdminAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AdminAction::Allow => "allow",
            AdminAction::Restrict => "restrict",
            AdminAction::Deny => "deny",
        })
    }
}

impl std::str::FromStr for AdminAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(AdminAction::Allow),
            "restrict" => Ok(AdminAction::Restrict),
            "deny" => Ok(AdminAction::Deny),
            other => Err(format!(
                "Administrative action can only be \"allow\", \"restrict\", or \"deny\", not {other}"
            )),
        }
    }
}

/// Approval
///
/// Vendor/course legitimacy workflow state, orthogonal to standing/action.
/// `accepted` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "approval", rename_all = "lowercase")]
#[ts(export)]
pub enum Approval {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for Approval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Approval::Pending => "pending",
            Approval::Accepted => "accepted",
            Approval::Rejected => "rejected",
        })
    }
}

impl std::str::FromStr for Approval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Approval::Pending),
            "accepted" => Ok(Approval::Accepted),
            "rejected" => Ok(Approval::Rejected),
            other => Err(format!(
                "Approval status can only be \"pending\", \"accepted\", or \"rejected\", not {other}"
            )),
        }
    }
}

/// AdminRole
///
/// Admin sub-roles. Exactly one `super` exists (the first admin to register);
/// `super` is never assignable through any mutation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "admin_role", rename_all = "lowercase")]
#[ts(export)]
pub enum AdminRole {
    Super,
    Master,
    #[default]
    Support,
    Finance,
    Technical,
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AdminRole::Super => "super",
            AdminRole::Master => "master",
            AdminRole::Support => "support",
            AdminRole::Finance => "finance",
            AdminRole::Technical => "technical",
        })
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super" => Ok(AdminRole::Super),
            "master" => Ok(AdminRole::Master),
            "support" => Ok(AdminRole::Support),
            "finance" => Ok(AdminRole::Finance),
            "technical" => Ok(AdminRole::Technical),
            other => Err(format!(
                "Admin role can only be \"super\", \"master\", \"support\", \"finance\", or \"technical\", not {other}"
            )),
        }
    }
}

/// ActorKind
///
/// The three authenticated identity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "actor_kind", rename_all = "lowercase")]
#[ts(export)]
pub enum ActorKind {
    Admin,
    Vendor,
    #[default]
    Customer,
}

impl std::fmt::Display for ActorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ActorKind::Admin => "admin",
            ActorKind::Vendor => "vendor",
            ActorKind::Customer => "customer",
        })
    }
}

impl std::str::FromStr for ActorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(ActorKind::Admin),
            "vendor" => Ok(ActorKind::Vendor),
            "customer" => Ok(ActorKind::Customer),
            other => Err(format!(
                "Actor kind can only be \"admin\", \"vendor\", or \"customer\", not {other}"
            )),
        }
    }
}

/// ReviewSubject
///
/// Typed discriminated union over everything a review can target. Resolved
/// through a single lookup in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "review_subject", rename_all = "lowercase")]
#[ts(export)]
pub enum ReviewSubject {
    #[default]
    Course,
    Category,
    Brand,
    Vendor,
    Order,
    Blog,
    Ticket,
}

impl std::fmt::Display for ReviewSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ReviewSubject::Course => "course",
            ReviewSubject::Category => "category",
            ReviewSubject::Brand => "brand",
            ReviewSubject::Vendor => "vendor",
            ReviewSubject::Order => "order",
            ReviewSubject::Blog => "blog",
            ReviewSubject::Ticket => "ticket",
        })
    }
}

impl std::str::FromStr for ReviewSubject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "course" => Ok(ReviewSubject::Course),
            "category" => Ok(ReviewSubject::Category),
            "brand" => Ok(ReviewSubject::Brand),
            "vendor" => Ok(ReviewSubject::Vendor),
            "order" => Ok(ReviewSubject::Order),
            "blog" => Ok(ReviewSubject::Blog),
            "ticket" => Ok(ReviewSubject::Ticket),
            _ => Err(
                "subject must be either of course, category, brand, vendor, order, blog, or ticket"
                    .to_string(),
            ),
        }
    }
}

// --- Actor & Role Model ---

/// Actor
///
/// The resolved identity of an authenticated request: id, kind, and (for
/// admins) the sub-role. Produced by the Identity/Token Verifier; every
/// downstream operation rejects immediately if any part is missing rather
/// than applying partial defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub id: Uuid,
    pub kind: ActorKind,
    /// Present only when `kind == Admin`.
    pub role: Option<AdminRole>,
}

impl Actor {
    pub fn admin(id: Uuid, role: AdminRole) -> Self {
        Actor {
            id,
            kind: ActorKind::Admin,
            role: Some(role),
        }
    }

    pub fn vendor(id: Uuid) -> Self {
        Actor {
            id,
            kind: ActorKind::Vendor,
            role: None,
        }
    }

    pub fn customer(id: Uuid) -> Self {
        Actor {
            id,
            kind: ActorKind::Customer,
            role: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.kind == ActorKind::Admin
    }

    /// The role name surfaced in denial messages. For non-admins the role
    /// mirrors the actor kind.
    pub fn role_name(&self) -> String {
        match self.role {
            Some(role) => role.to_string(),
            None => self.kind.to_string(),
        }
    }
}

/// ModerationMeta
///
/// The slice of a moderated record the policy engine and approval workflow
/// need: who owns it, its lifecycle state, and the approval-relevant flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModerationMeta {
    pub owner: Uuid,
    pub standing: Standing,
    pub action: AdminAction,
    /// Set for admin records; guards the super-protection rules.
    pub record_role: Option<AdminRole>,
    /// Set for vendor records; gates acceptance.
    pub business_verified: Option<bool>,
}

// --- Nested documents ---

/// Address
///
/// Wholesale-rebuild unit: a patch sub-object missing any of the required
/// keys (country, state, city, street) is dropped entirely, never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Address {
    pub country: String,
    pub state: String,
    pub city: String,
    pub street: String,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct WishlistEntry {
    pub name: String,
    pub course: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CartEntry {
    pub course: Uuid,
    pub quantity: i64,
}

// --- Moderated records ---

/// AdminRecord
///
/// An administrative user. New registrations default to support/inactive
/// until profile completion; the first-ever registration is promoted to
/// super/active inside a single store operation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct AdminRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub phone: String,
    pub address: String,
    pub role: AdminRole,
    pub standing: Standing,
    pub action: AdminAction,
    pub complete_profile: bool,
    pub online_status: bool,
    pub updated_by: Option<Uuid>,
    #[ts(type = "string")]
    pub created: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated: DateTime<Utc>,
}

impl AdminRecord {
    /// A fresh registration before the store decides the first-admin case.
    pub fn register(email: String, now: DateTime<Utc>) -> Self {
        AdminRecord {
            id: Uuid::new_v4(),
            email,
            role: AdminRole::Support,
            standing: Standing::Inactive,
            action: AdminAction::Allow,
            complete_profile: false,
            created: now,
            updated: now,
            ..AdminRecord::default()
        }
    }

    pub fn moderation(&self) -> ModerationMeta {
        ModerationMeta {
            owner: self.id,
            standing: self.standing,
            action: self.action,
            record_role: Some(self.role),
            business_verified: None,
        }
    }
}

/// VendorRecord
///
/// A vendor/instructor account. Activation is gated by the approval
/// workflow: standing active, action allow, and a verified business.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct VendorRecord {
    pub id: Uuid,
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub business_name: String,
    pub domain_name: String,
    #[sqlx(json(nullable))]
    pub address: Option<Address>,
    pub business_verified: bool,
    pub email_verified: bool,
    pub complete_profile: bool,
    pub standing: Standing,
    pub action: AdminAction,
    pub approval: Approval,
    pub approval_comment: Option<String>,
    pub approved_by: Option<Uuid>,
    /// The admin who last changed standing/action.
    pub admin: Option<Uuid>,
    #[ts(type = "string")]
    pub created: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated: DateTime<Utc>,
}

impl VendorRecord {
    pub fn register(email: String, domain_name: String, now: DateTime<Utc>) -> Self {
        VendorRecord {
            id: Uuid::new_v4(),
            email,
            domain_name,
            standing: Standing::Inactive,
            action: AdminAction::Allow,
            approval: Approval::Pending,
            created: now,
            updated: now,
            ..VendorRecord::default()
        }
    }

    pub fn moderation(&self) -> ModerationMeta {
        ModerationMeta {
            owner: self.id,
            standing: self.standing,
            action: self.action,
            record_role: None,
            business_verified: Some(self.business_verified),
        }
    }
}

/// CustomerRecord
///
/// A customer/student account. Active immediately on registration.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CustomerRecord {
    pub id: Uuid,
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    #[sqlx(json(nullable))]
    pub address: Option<Address>,
    #[sqlx(json)]
    pub wishlist: Vec<WishlistEntry>,
    #[sqlx(json)]
    pub cart: Vec<CartEntry>,
    pub standing: Standing,
    pub action: AdminAction,
    #[ts(type = "string")]
    pub created: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated: DateTime<Utc>,
}

impl CustomerRecord {
    pub fn register(email: String, now: DateTime<Utc>) -> Self {
        CustomerRecord {
            id: Uuid::new_v4(),
            email,
            standing: Standing::Active,
            action: AdminAction::Allow,
            created: now,
            updated: now,
            ..CustomerRecord::default()
        }
    }

    pub fn moderation(&self) -> ModerationMeta {
        ModerationMeta {
            owner: self.id,
            standing: self.standing,
            action: self.action,
            record_role: None,
            business_verified: None,
        }
    }
}

/// CourseRecord
///
/// A course/product owned by a vendor. Approved by default; peer or admin
/// review only kicks in when a course is flagged back to pending.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CourseRecord {
    pub id: Uuid,
    pub vendor: Uuid,
    pub title: String,
    pub description: String,
    pub price: Option<i64>,
    pub available: bool,
    pub standing: Standing,
    pub action: AdminAction,
    pub approved: Approval,
    pub approval_comment: Option<String>,
    pub approved_by: Option<Uuid>,
    #[ts(type = "string")]
    pub created: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated: DateTime<Utc>,
}

impl CourseRecord {
    pub fn moderation(&self) -> ModerationMeta {
        ModerationMeta {
            owner: self.vendor,
            standing: self.standing,
            action: self.action,
            record_role: None,
            business_verified: None,
        }
    }
}

/// CategoryRecord
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub kind: String,
    pub standing: Standing,
    pub action: AdminAction,
    #[ts(type = "string")]
    pub created: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated: DateTime<Utc>,
}

/// ReviewRecord
///
/// A review authored by a customer or a vendor against one subject record.
/// Exactly one of `customer`/`vendor` is set, matching the author's kind.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ReviewRecord {
    pub id: Uuid,
    pub subject: ReviewSubject,
    pub subject_id: Uuid,
    pub customer: Option<Uuid>,
    pub vendor: Option<Uuid>,
    pub comment: String,
    pub rating: Option<i64>,
    /// Crowd/admin moderation verdict on the review itself, orthogonal to
    /// standing/action.
    pub approved: Approval,
    pub approved_by: Option<Uuid>,
    pub standing: Standing,
    pub action: AdminAction,
    #[ts(type = "string")]
    pub created: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated: DateTime<Utc>,
}

// --- Request payloads ---

/// RegisterRequest — `POST /register`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub kind: String,
    pub email: String,
}

/// ProfilePatch
///
/// Partial self-update payload for all three actor kinds. Boolean-like and
/// numeric-like fields tolerate string forms; malformed values are treated
/// as omitted, never as errors. Nested documents are rebuilt wholesale and
/// dropped when partially formed.
#[derive(Debug, Clone, Default, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub fullname: Option<String>,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    #[ts(type = "boolean | null")]
    pub online_status: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    #[ts(type = "boolean | null")]
    pub email_verified: Option<bool>,
    #[serde(default, deserialize_with = "lenient_nested")]
    pub address: Option<Address>,
    #[serde(default, deserialize_with = "lenient_nested")]
    pub wishlist: Option<Vec<WishlistEntry>>,
    #[serde(default, deserialize_with = "lenient_nested")]
    pub cart: Option<Vec<CartEntry>>,
}

/// AdminModifyRequest — `PATCH /admin/admins/{id}`: role and/or standing.
/// Enum fields arrive as strings so invalid values fail with the canonical
/// wording instead of an opaque deserializer error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminModifyRequest {
    pub role: Option<String>,
    pub standing: Option<String>,
}

/// VendorModerationRequest — `PATCH /admin/vendors/{id}`: standing and
/// action must both be present; one without the other is a validation
/// error, never a silent partial apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct VendorModerationRequest {
    pub standing: Option<String>,
    pub action: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    #[ts(type = "boolean | null")]
    pub business_verified: Option<bool>,
    pub comment: Option<String>,
}

/// ModerationRequest — standing/action patch for courses and reviews.
/// Either field may be given alone. `approval` is the admin re-flag knob:
/// the only value it accepts is `pending`, which reopens the record for a
/// fresh decision; decisions themselves go through the approval routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ModerationRequest {
    pub standing: Option<String>,
    pub action: Option<String>,
    pub approval: Option<String>,
}

/// ApprovalRequest — vendor and course approval transitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ApprovalRequest {
    pub approval: Option<String>,
    pub comment: Option<String>,
}

/// CreateCourseRequest — `POST /courses`.
#[derive(Debug, Clone, Default, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    #[ts(type = "number | null")]
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    #[ts(type = "boolean | null")]
    pub available: Option<bool>,
}

/// CoursePatch — owner partial update for `PUT /courses/{id}`.
#[derive(Debug, Clone, Default, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    #[ts(type = "number | null")]
    pub price: Option<i64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    #[ts(type = "boolean | null")]
    pub available: Option<bool>,
}

/// CreateCategoryRequest — `POST /admin/categories`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub kind: Option<String>,
}

/// CategoryPatch — `PATCH /admin/categories/{id}`. Content fields may come
/// from any admin; standing/action changes additionally require a
/// moderator-tier role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub standing: Option<String>,
    pub action: Option<String>,
}

/// CreateReviewRequest — `POST /reviews`.
#[derive(Debug, Clone, Default, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateReviewRequest {
    pub subject: Option<String>,
    pub subject_id: Option<Uuid>,
    pub comment: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    #[ts(type = "number | null")]
    pub rating: Option<i64>,
}

// --- Output schemas ---

/// VendorSummary — ranked search hit from the Search Index collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VendorSummary {
    pub id: Uuid,
    pub business_name: String,
    pub domain_name: String,
    pub score: f32,
}

/// ExistsReply — `GET /verify/{kind}/{attribute}/{value}` probe result.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ExistsReply {
    pub exists: bool,
}

/// DashboardStats — `GET /admin/stats`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DashboardStats {
    pub total_admins: i64,
    pub total_vendors: i64,
    pub total_customers: i64,
    pub total_courses: i64,
    /// Vendor accounts still awaiting an approval decision.
    pub pending_vendor_approvals: i64,
}
