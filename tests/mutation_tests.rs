use chrono::Utc;
use coursemart::error::ApiError;
use coursemart::models::{
    Actor, Address, AdminAction, AdminRole, CartEntry, CoursePatch, CourseRecord, CustomerRecord,
    ProfilePatch, VendorRecord, WishlistEntry,
};
use coursemart::mutation::{
    apply_course_patch, apply_customer_profile, apply_vendor_profile, coerce_bool, coerce_i64,
    merge_if_absent,
};
use serde_json::json;
use uuid::Uuid;

#[test]
fn booleans_coerce_from_string_forms() {
    assert_eq!(coerce_bool(&json!(true)), Some(true));
    assert_eq!(coerce_bool(&json!("true")), Some(true));
    assert_eq!(coerce_bool(&json!("FALSE")), Some(false));
    assert_eq!(coerce_bool(&json!("maybe")), None);
    assert_eq!(coerce_bool(&json!(1)), None);
}

#[test]
fn numbers_coerce_from_numeric_strings() {
    assert_eq!(coerce_i64(&json!(42)), Some(42));
    assert_eq!(coerce_i64(&json!("199")), Some(199));
    assert_eq!(coerce_i64(&json!(" 7 ")), Some(7));
    assert_eq!(coerce_i64(&json!("4.5")), None);
    assert_eq!(coerce_i64(&json!("cheap")), None);
}

#[test]
fn merge_if_absent_fills_empty_slots_only() {
    assert_eq!(merge_if_absent("", Some("fresh"), false), Some("fresh".to_string()));
    assert_eq!(merge_if_absent("taken", Some("fresh"), false), None);
    assert_eq!(merge_if_absent("taken", Some("fresh"), true), Some("fresh".to_string()));
    assert_eq!(merge_if_absent("", None, false), None);
    assert_eq!(merge_if_absent("", Some(""), true), None);
}

#[test]
fn malformed_lenient_fields_deserialize_as_omitted() {
    let patch: ProfilePatch = serde_json::from_value(json!({
        "online_status": "TRUE",
        "email_verified": "maybe",
        "address": { "city": "Lagos" }
    }))
    .unwrap();

    assert_eq!(patch.online_status, Some(true));
    // Not an error, just absent.
    assert_eq!(patch.email_verified, None);
    // Partial nested document dropped wholesale.
    assert!(patch.address.is_none());
}

#[test]
fn complete_nested_address_survives_deserialization() {
    let patch: ProfilePatch = serde_json::from_value(json!({
        "address": {
            "country": "NG", "state": "Lagos", "city": "Ikeja", "street": "1 Main Rd"
        }
    }))
    .unwrap();
    assert_eq!(patch.address.unwrap().city, "Ikeja");
}

#[test]
fn course_price_accepts_numeric_strings() {
    let patch: CoursePatch = serde_json::from_value(json!({ "price": "2500" })).unwrap();
    assert_eq!(patch.price, Some(2500));
}

#[test]
fn vendor_identity_fields_do_not_overwrite() {
    let existing = VendorRecord {
        id: Uuid::new_v4(),
        username: "original".to_string(),
        business_name: String::new(),
        ..VendorRecord::default()
    };
    let actor = Actor::vendor(existing.id);
    let patch = ProfilePatch {
        username: Some("impostor".to_string()),
        business_name: Some("Fresh Goods".to_string()),
        email: Some("NEW@Example.COM".to_string()),
        ..ProfilePatch::default()
    };

    let now = Utc::now();
    let updated = apply_vendor_profile(&existing, &patch, &actor, now).unwrap();

    // Username already set: the patch is silently ignored.
    assert_eq!(updated.username, "original");
    // Empty slots fill, email normalized to lowercase.
    assert_eq!(updated.business_name, "Fresh Goods");
    assert_eq!(updated.email, "new@example.com");
    assert!(updated.complete_profile);
    assert_eq!(updated.updated, now);
}

#[test]
fn admins_may_overwrite_vendor_identity_fields() {
    let existing = VendorRecord {
        id: Uuid::new_v4(),
        username: "original".to_string(),
        ..VendorRecord::default()
    };
    let admin = Actor::admin(Uuid::new_v4(), AdminRole::Master);
    let patch = ProfilePatch {
        username: Some("corrected".to_string()),
        ..ProfilePatch::default()
    };

    let updated = apply_vendor_profile(&existing, &patch, &admin, Utc::now()).unwrap();
    assert_eq!(updated.username, "corrected");
}

#[test]
fn locked_records_refuse_profile_updates() {
    let existing = VendorRecord {
        id: Uuid::new_v4(),
        action: AdminAction::Deny,
        ..VendorRecord::default()
    };
    let actor = Actor::vendor(existing.id);

    let err =
        apply_vendor_profile(&existing, &ProfilePatch::default(), &actor, Utc::now()).unwrap_err();
    match err {
        ApiError::RecordLocked(message) => assert!(message.contains("deny"), "{message}"),
        other => panic!("expected RecordLocked, got {other:?}"),
    }
}

#[test]
fn wishlist_and_cart_rebuild_wholesale() {
    let existing = CustomerRecord {
        id: Uuid::new_v4(),
        wishlist: vec![
            WishlistEntry {
                name: "old".to_string(),
                course: Uuid::new_v4(),
            },
            WishlistEntry {
                name: "older".to_string(),
                course: Uuid::new_v4(),
            },
        ],
        ..CustomerRecord::default()
    };
    let actor = Actor::customer(existing.id);
    let replacement = vec![WishlistEntry {
        name: "only".to_string(),
        course: Uuid::new_v4(),
    }];
    let patch = ProfilePatch {
        wishlist: Some(replacement.clone()),
        cart: Some(vec![CartEntry {
            course: Uuid::new_v4(),
            quantity: 2,
        }]),
        ..ProfilePatch::default()
    };

    let updated = apply_customer_profile(&existing, &patch, &actor, Utc::now()).unwrap();
    assert_eq!(updated.wishlist, replacement);
    assert_eq!(updated.cart.len(), 1);
}

#[test]
fn course_patch_applies_content_and_stamps_updated() {
    let existing = CourseRecord {
        id: Uuid::new_v4(),
        title: "Old title".to_string(),
        price: Some(100),
        ..CourseRecord::default()
    };
    let patch = CoursePatch {
        title: Some("New title".to_string()),
        available: Some(false),
        ..CoursePatch::default()
    };

    let now = Utc::now();
    let updated = apply_course_patch(&existing, &patch, now).unwrap();
    assert_eq!(updated.title, "New title");
    assert_eq!(updated.price, Some(100));
    assert!(!updated.available);
    assert_eq!(updated.updated, now);
}

#[test]
fn address_patch_replaces_the_whole_document() {
    let existing = VendorRecord {
        id: Uuid::new_v4(),
        address: Some(Address {
            country: "NG".to_string(),
            state: "Lagos".to_string(),
            city: "Ikeja".to_string(),
            street: "1 Old Rd".to_string(),
            building: Some("Suite 4".to_string()),
            zip: None,
        }),
        ..VendorRecord::default()
    };
    let actor = Actor::vendor(existing.id);
    let patch = ProfilePatch {
        address: Some(Address {
            country: "NG".to_string(),
            state: "Oyo".to_string(),
            city: "Ibadan".to_string(),
            street: "2 New Rd".to_string(),
            building: None,
            zip: None,
        }),
        ..ProfilePatch::default()
    };

    let updated = apply_vendor_profile(&existing, &patch, &actor, Utc::now()).unwrap();
    let address = updated.address.unwrap();
    assert_eq!(address.city, "Ibadan");
    // No field survives from the old document.
    assert_eq!(address.building, None);
}
