//! Entity Mutation Service: partial-update semantics shared by every
//! profile/content update path. One coercion helper set is used uniformly by
//! the patch structs instead of per-field runtime type branching, and every
//! `apply_*` builder returns a fully rebuilt record so the caller performs
//! exactly one persistence write per accepted mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::error::ApiError;
use crate::lifecycle;
use crate::models::{
    Actor, AdminRecord, CategoryPatch, CategoryRecord, CoursePatch, CourseRecord, CustomerRecord,
    ProfilePatch, VendorRecord,
};

// --- Coercion helpers ---

/// Booleans arrive as real booleans or the case-insensitive strings
/// "true"/"false". Anything else is treated as omitted, never an error.
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Numbers arrive as numbers or numeric strings. A non-numeric string leaves
/// the field unset rather than failing the request.
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// serde adapter over [`coerce_bool`] for patch struct fields.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_bool))
}

/// serde adapter over [`coerce_i64`] for patch struct fields.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_i64))
}

/// Nested documents are rebuilt wholesale: a sub-object missing required
/// keys is dropped entirely instead of being partially merged.
pub fn lenient_nested<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value::<T>(v).ok()))
}

/// Merge-if-absent: the patch value wins only while the existing value is
/// empty; once set, non-admin patches to the field are silently ignored.
pub fn merge_if_absent(existing: &str, patch: Option<&str>, actor_is_admin: bool) -> Option<String> {
    let incoming = patch.filter(|s| !s.is_empty())?;
    if existing.is_empty() || actor_is_admin {
        Some(incoming.to_string())
    } else {
        None
    }
}

// --- Per-entity builders ---

/// Own-profile update for an admin. Completing a profile update flips
/// `complete_profile`, which is what activates a freshly registered admin.
pub fn apply_admin_profile(
    existing: &AdminRecord,
    patch: &ProfilePatch,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<AdminRecord, ApiError> {
    lifecycle::owner_may_mutate(existing.action)?;

    let mut record = existing.clone();
    if let Some(username) = merge_if_absent(&existing.username, patch.username.as_deref(), false) {
        record.username = username;
    }
    if let Some(email) = merge_if_absent(&existing.email, patch.email.as_deref(), false) {
        record.email = email.to_lowercase();
    }
    if let Some(fullname) = &patch.fullname {
        record.fullname = fullname.clone();
    }
    if let Some(phone) = &patch.phone {
        record.phone = phone.clone();
    }
    if let Some(address) = &patch.address {
        record.address = format!(
            "{}, {}, {}, {}",
            address.street, address.city, address.state, address.country
        );
    }
    if let Some(online) = patch.online_status {
        record.online_status = online;
    }
    record.complete_profile = true;
    record.updated = now;
    record.updated_by = Some(actor.id);
    Ok(record)
}

/// Own-profile update for a vendor. Username, email and business name are
/// merge-if-absent; the address document is rebuilt wholesale.
pub fn apply_vendor_profile(
    existing: &VendorRecord,
    patch: &ProfilePatch,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<VendorRecord, ApiError> {
    lifecycle::owner_may_mutate(existing.action)?;

    let is_admin = actor.is_admin();
    let mut record = existing.clone();
    if let Some(username) = merge_if_absent(&existing.username, patch.username.as_deref(), is_admin)
    {
        record.username = username;
    }
    if let Some(email) = merge_if_absent(&existing.email, patch.email.as_deref(), is_admin) {
        record.email = email.to_lowercase();
    }
    if let Some(name) = merge_if_absent(
        &existing.business_name,
        patch.business_name.as_deref(),
        is_admin,
    ) {
        record.business_name = name;
    }
    if let Some(fullname) = &patch.fullname {
        record.fullname = fullname.clone();
    }
    if let Some(phone) = &patch.phone {
        record.phone = phone.clone();
    }
    if let Some(verified) = patch.email_verified {
        record.email_verified = verified;
    }
    if let Some(address) = &patch.address {
        record.address = Some(address.clone());
    }
    record.complete_profile = true;
    record.updated = now;
    Ok(record)
}

/// Own-profile update for a customer, including the wholesale wishlist and
/// cart rebuilds.
pub fn apply_customer_profile(
    existing: &CustomerRecord,
    patch: &ProfilePatch,
    actor: &Actor,
    now: DateTime<Utc>,
) -> Result<CustomerRecord, ApiError> {
    lifecycle::owner_may_mutate(existing.action)?;

    let is_admin = actor.is_admin();
    let mut record = existing.clone();
    if let Some(username) = merge_if_absent(&existing.username, patch.username.as_deref(), is_admin)
    {
        record.username = username;
    }
    if let Some(email) = merge_if_absent(&existing.email, patch.email.as_deref(), is_admin) {
        record.email = email.to_lowercase();
    }
    if let Some(fullname) = &patch.fullname {
        record.fullname = fullname.clone();
    }
    if let Some(phone) = &patch.phone {
        record.phone = phone.clone();
    }
    if let Some(address) = &patch.address {
        record.address = Some(address.clone());
    }
    if let Some(wishlist) = &patch.wishlist {
        record.wishlist = wishlist.clone();
    }
    if let Some(cart) = &patch.cart {
        record.cart = cart.clone();
    }
    record.updated = now;
    Ok(record)
}

/// Owner update of a course. Ownership is checked by the policy engine
/// before this runs; the action lock still applies here.
pub fn apply_course_patch(
    existing: &CourseRecord,
    patch: &CoursePatch,
    now: DateTime<Utc>,
) -> Result<CourseRecord, ApiError> {
    lifecycle::owner_may_mutate(existing.action)?;

    let mut record = existing.clone();
    if let Some(title) = &patch.title {
        record.title = title.clone();
    }
    if let Some(description) = &patch.description {
        record.description = description.clone();
    }
    if let Some(price) = patch.price {
        record.price = Some(price);
    }
    if let Some(available) = patch.available {
        record.available = available;
    }
    record.updated = now;
    Ok(record)
}

/// Admin content patch of a category (standing/action handled separately by
/// the lifecycle machine).
pub fn apply_category_patch(
    existing: &CategoryRecord,
    patch: &CategoryPatch,
    now: DateTime<Utc>,
) -> CategoryRecord {
    let mut record = existing.clone();
    if let Some(name) = &patch.name {
        record.name = name.clone();
    }
    if let Some(description) = &patch.description {
        record.description = description.clone();
    }
    if let Some(kind) = &patch.kind {
        record.kind = kind.clone();
    }
    record.updated = now;
    record
}
