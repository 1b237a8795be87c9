use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{
    ActorKind, AdminRecord, AdminRole, Approval, CategoryRecord, CourseRecord, CustomerRecord,
    DashboardStats, ReviewRecord, ReviewSubject, Standing, VendorRecord,
};

/// StoreError
///
/// Storage faults as seen by the rest of the crate. "Not found" is not an
/// error — lookups return `Ok(None)` — so the only variants left are a
/// malformed identifier and a transport/connection failure. Callers
/// reclassify via the `From<StoreError> for ApiError` impl instead of
/// propagating driver errors.
#[derive(Debug)]
pub enum StoreError {
    /// The identifier itself cannot address a record.
    Malformed(String),
    /// Transient storage failure; retry policy belongs to the caller.
    Unavailable(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Malformed(m) => ApiError::NotFound(m),
            StoreError::Unavailable(m) => {
                ApiError::Upstream(format!("Storage unavailable.\r\n{m}"))
            }
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Store
///
/// The persistence interface consumed by the handlers. Implementations must
/// report "not found" distinctly from transport errors, and `create_admin`
/// must make the first-admin promotion decision atomically — never
/// count-then-create.
#[async_trait]
pub trait Store: Send + Sync {
    // --- Admins ---
    /// Inserts an admin. If the collection is empty at insert time, the
    /// record is promoted to super/active/complete in the same operation.
    async fn create_admin(&self, record: AdminRecord) -> Result<AdminRecord, StoreError>;
    async fn find_admin(&self, id: Uuid) -> Result<Option<AdminRecord>, StoreError>;
    async fn list_admins(&self) -> Result<Vec<AdminRecord>, StoreError>;
    async fn update_admin(&self, record: AdminRecord) -> Result<Option<AdminRecord>, StoreError>;
    async fn delete_admin(&self, id: Uuid) -> Result<Option<AdminRecord>, StoreError>;

    // --- Vendors ---
    async fn create_vendor(&self, record: VendorRecord) -> Result<VendorRecord, StoreError>;
    async fn find_vendor(&self, id: Uuid) -> Result<Option<VendorRecord>, StoreError>;
    async fn find_vendor_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<VendorRecord>, StoreError>;
    async fn list_vendors(&self) -> Result<Vec<VendorRecord>, StoreError>;
    async fn update_vendor(&self, record: VendorRecord)
    -> Result<Option<VendorRecord>, StoreError>;
    async fn delete_vendor(&self, id: Uuid) -> Result<Option<VendorRecord>, StoreError>;

    // --- Customers ---
    async fn create_customer(&self, record: CustomerRecord)
    -> Result<CustomerRecord, StoreError>;
    async fn find_customer(&self, id: Uuid) -> Result<Option<CustomerRecord>, StoreError>;
    async fn update_customer(
        &self,
        record: CustomerRecord,
    ) -> Result<Option<CustomerRecord>, StoreError>;

    // --- Courses ---
    async fn create_course(&self, record: CourseRecord) -> Result<CourseRecord, StoreError>;
    async fn find_course(&self, id: Uuid) -> Result<Option<CourseRecord>, StoreError>;
    async fn list_courses(&self, active_only: bool) -> Result<Vec<CourseRecord>, StoreError>;
    async fn update_course(&self, record: CourseRecord)
    -> Result<Option<CourseRecord>, StoreError>;
    async fn delete_course(&self, id: Uuid) -> Result<Option<CourseRecord>, StoreError>;
    /// Undeleted courses still owned by a vendor; guards vendor destroy.
    async fn count_courses_by_vendor(&self, vendor: Uuid) -> Result<i64, StoreError>;

    // --- Categories ---
    async fn create_category(&self, record: CategoryRecord)
    -> Result<CategoryRecord, StoreError>;
    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, StoreError>;
    async fn list_categories(&self, active_only: bool)
    -> Result<Vec<CategoryRecord>, StoreError>;
    async fn update_category(
        &self,
        record: CategoryRecord,
    ) -> Result<Option<CategoryRecord>, StoreError>;
    async fn delete_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, StoreError>;

    // --- Reviews ---
    async fn create_review(&self, record: ReviewRecord) -> Result<ReviewRecord, StoreError>;
    async fn find_review(&self, id: Uuid) -> Result<Option<ReviewRecord>, StoreError>;
    async fn update_review(&self, record: ReviewRecord)
    -> Result<Option<ReviewRecord>, StoreError>;
    async fn delete_review(&self, id: Uuid) -> Result<Option<ReviewRecord>, StoreError>;

    // --- Cross-entity lookups ---
    /// Resolves a review subject tag to its backing collection in one place.
    /// Tags without a backing collection resolve to absent.
    async fn subject_exists(
        &self,
        subject: ReviewSubject,
        id: Uuid,
    ) -> Result<bool, StoreError>;
    /// Existence probe for the `/verify` endpoint. Unknown attributes
    /// resolve to absent.
    async fn attribute_exists(
        &self,
        kind: ActorKind,
        attribute: &str,
        value: &str,
    ) -> Result<bool, StoreError>;
    async fn stats(&self) -> Result<DashboardStats, StoreError>;
}

/// The shared handle used in the application state.
pub type StoreState = Arc<dyn Store>;

// --- In-memory implementation ---

/// MemoryStore
///
/// In-process store used by the tests and the local bootstrap. A single
/// lock per store makes `create_admin`'s first-admin promotion atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    admins: HashMap<Uuid, AdminRecord>,
    vendors: HashMap<Uuid, VendorRecord>,
    customers: HashMap<Uuid, CustomerRecord>,
    courses: HashMap<Uuid, CourseRecord>,
    categories: HashMap<Uuid, CategoryRecord>,
    reviews: HashMap<Uuid, ReviewRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Test convenience: drop a record straight into the store.
    pub fn seed_admin(&self, record: AdminRecord) {
        self.inner.write().unwrap().admins.insert(record.id, record);
    }

    pub fn seed_vendor(&self, record: VendorRecord) {
        self.inner
            .write()
            .unwrap()
            .vendors
            .insert(record.id, record);
    }

    pub fn seed_customer(&self, record: CustomerRecord) {
        self.inner
            .write()
            .unwrap()
            .customers
            .insert(record.id, record);
    }

    pub fn seed_course(&self, record: CourseRecord) {
        self.inner
            .write()
            .unwrap()
            .courses
            .insert(record.id, record);
    }

    pub fn seed_review(&self, record: ReviewRecord) {
        self.inner
            .write()
            .unwrap()
            .reviews
            .insert(record.id, record);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_admin(&self, mut record: AdminRecord) -> Result<AdminRecord, StoreError> {
        let mut inner = self.inner.write().unwrap();
        // First admin to register gets the super role, inside the lock.
        if inner.admins.is_empty() {
            record.role = AdminRole::Super;
            record.standing = Standing::Active;
            record.complete_profile = true;
        }
        inner.admins.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_admin(&self, id: Uuid) -> Result<Option<AdminRecord>, StoreError> {
        Ok(self.inner.read().unwrap().admins.get(&id).cloned())
    }

    async fn list_admins(&self) -> Result<Vec<AdminRecord>, StoreError> {
        let mut records: Vec<_> = self.inner.read().unwrap().admins.values().cloned().collect();
        records.sort_by_key(|r| r.created);
        Ok(records)
    }

    async fn update_admin(&self, record: AdminRecord) -> Result<Option<AdminRecord>, StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.admins.contains_key(&record.id) {
            inner.admins.insert(record.id, record.clone());
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    async fn delete_admin(&self, id: Uuid) -> Result<Option<AdminRecord>, StoreError> {
        Ok(self.inner.write().unwrap().admins.remove(&id))
    }

    async fn create_vendor(&self, record: VendorRecord) -> Result<VendorRecord, StoreError> {
        self.seed_vendor(record.clone());
        Ok(record)
    }

    async fn find_vendor(&self, id: Uuid) -> Result<Option<VendorRecord>, StoreError> {
        Ok(self.inner.read().unwrap().vendors.get(&id).cloned())
    }

    async fn find_vendor_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<VendorRecord>, StoreError> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .vendors
            .values()
            .find(|v| v.domain_name == domain)
            .cloned())
    }

    async fn list_vendors(&self) -> Result<Vec<VendorRecord>, StoreError> {
        let mut records: Vec<_> = self
            .inner
            .read()
            .unwrap()
            .vendors
            .values()
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created);
        Ok(records)
    }

    async fn update_vendor(
        &self,
        record: VendorRecord,
    ) -> Result<Option<VendorRecord>, StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.vendors.contains_key(&record.id) {
            inner.vendors.insert(record.id, record.clone());
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    async fn delete_vendor(&self, id: Uuid) -> Result<Option<VendorRecord>, StoreError> {
        Ok(self.inner.write().unwrap().vendors.remove(&id))
    }

    async fn create_customer(
        &self,
        record: CustomerRecord,
    ) -> Result<CustomerRecord, StoreError> {
        self.seed_customer(record.clone());
        Ok(record)
    }

    async fn find_customer(&self, id: Uuid) -> Result<Option<CustomerRecord>, StoreError> {
        Ok(self.inner.read().unwrap().customers.get(&id).cloned())
    }

    async fn update_customer(
        &self,
        record: CustomerRecord,
    ) -> Result<Option<CustomerRecord>, StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.customers.contains_key(&record.id) {
            inner.customers.insert(record.id, record.clone());
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    async fn create_course(&self, record: CourseRecord) -> Result<CourseRecord, StoreError> {
        self.seed_course(record.clone());
        Ok(record)
    }

    async fn find_course(&self, id: Uuid) -> Result<Option<CourseRecord>, StoreError> {
        Ok(self.inner.read().unwrap().courses.get(&id).cloned())
    }

    async fn list_courses(&self, active_only: bool) -> Result<Vec<CourseRecord>, StoreError> {
        let mut records: Vec<_> = self
            .inner
            .read()
            .unwrap()
            .courses
            .values()
            .filter(|c| !active_only || c.standing == Standing::Active)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created);
        Ok(records)
    }

    async fn update_course(
        &self,
        record: CourseRecord,
    ) -> Result<Option<CourseRecord>, StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.courses.contains_key(&record.id) {
            inner.courses.insert(record.id, record.clone());
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    async fn delete_course(&self, id: Uuid) -> Result<Option<CourseRecord>, StoreError> {
        Ok(self.inner.write().unwrap().courses.remove(&id))
    }

    async fn count_courses_by_vendor(&self, vendor: Uuid) -> Result<i64, StoreError> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .courses
            .values()
            .filter(|c| c.vendor == vendor)
            .count() as i64)
    }

    async fn create_category(
        &self,
        record: CategoryRecord,
    ) -> Result<CategoryRecord, StoreError> {
        self.inner
            .write()
            .unwrap()
            .categories
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, StoreError> {
        Ok(self.inner.read().unwrap().categories.get(&id).cloned())
    }

    async fn list_categories(
        &self,
        active_only: bool,
    ) -> Result<Vec<CategoryRecord>, StoreError> {
        let mut records: Vec<_> = self
            .inner
            .read()
            .unwrap()
            .categories
            .values()
            .filter(|c| !active_only || c.standing == Standing::Active)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created);
        Ok(records)
    }

    async fn update_category(
        &self,
        record: CategoryRecord,
    ) -> Result<Option<CategoryRecord>, StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.categories.contains_key(&record.id) {
            inner.categories.insert(record.id, record.clone());
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    async fn delete_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, StoreError> {
        Ok(self.inner.write().unwrap().categories.remove(&id))
    }

    async fn create_review(&self, record: ReviewRecord) -> Result<ReviewRecord, StoreError> {
        self.seed_review(record.clone());
        Ok(record)
    }

    async fn find_review(&self, id: Uuid) -> Result<Option<ReviewRecord>, StoreError> {
        Ok(self.inner.read().unwrap().reviews.get(&id).cloned())
    }

    async fn update_review(
        &self,
        record: ReviewRecord,
    ) -> Result<Option<ReviewRecord>, StoreError> {
        let mut inner = self.inner.write().unwrap();
        if inner.reviews.contains_key(&record.id) {
            inner.reviews.insert(record.id, record.clone());
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    async fn delete_review(&self, id: Uuid) -> Result<Option<ReviewRecord>, StoreError> {
        Ok(self.inner.write().unwrap().reviews.remove(&id))
    }

    async fn subject_exists(
        &self,
        subject: ReviewSubject,
        id: Uuid,
    ) -> Result<bool, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(match subject {
            ReviewSubject::Course => inner.courses.contains_key(&id),
            ReviewSubject::Category => inner.categories.contains_key(&id),
            ReviewSubject::Vendor => inner.vendors.contains_key(&id),
            // No backing collections for these tags.
            ReviewSubject::Brand
            | ReviewSubject::Order
            | ReviewSubject::Blog
            | ReviewSubject::Ticket => false,
        })
    }

    async fn attribute_exists(
        &self,
        kind: ActorKind,
        attribute: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        let inner = self.inner.read().unwrap();
        let (emails, usernames): (Vec<&str>, Vec<&str>) = match kind {
            ActorKind::Admin => (
                inner.admins.values().map(|r| r.email.as_str()).collect(),
                inner.admins.values().map(|r| r.username.as_str()).collect(),
            ),
            ActorKind::Vendor => (
                inner.vendors.values().map(|r| r.email.as_str()).collect(),
                inner
                    .vendors
                    .values()
                    .map(|r| r.username.as_str())
                    .collect(),
            ),
            ActorKind::Customer => (
                inner.customers.values().map(|r| r.email.as_str()).collect(),
                inner
                    .customers
                    .values()
                    .map(|r| r.username.as_str())
                    .collect(),
            ),
        };
        Ok(match attribute {
            "email" => emails.contains(&value),
            "username" => usernames.contains(&value),
            _ => false,
        })
    }

    async fn stats(&self) -> Result<DashboardStats, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(DashboardStats {
            total_admins: inner.admins.len() as i64,
            total_vendors: inner.vendors.len() as i64,
            total_customers: inner.customers.len() as i64,
            total_courses: inner.courses.len() as i64,
            pending_vendor_approvals: inner
                .vendors
                .values()
                .filter(|v| v.approval == Approval::Pending)
                .count() as i64,
        })
    }
}

// --- Postgres implementation ---

/// PostgresStore
///
/// The production store. Runtime-bound queries only, so the crate builds
/// without a live database; schema lives in `migrations/0001_init.sql`.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_admin(&self, record: &AdminRecord) -> Result<AdminRecord, sqlx::Error> {
        let sql = format!(
            "INSERT INTO admins ({ADMIN_COLS})
             SELECT $1, $2, $3, $4, $5, $6,
                    CASE WHEN NOT EXISTS (SELECT 1 FROM admins) THEN 'super'::admin_role ELSE $7 END,
                    CASE WHEN NOT EXISTS (SELECT 1 FROM admins) THEN 'active'::standing ELSE $8 END,
                    $9,
                    CASE WHEN NOT EXISTS (SELECT 1 FROM admins) THEN true ELSE $10 END,
                    $11, $12, $13, $14
             RETURNING {ADMIN_COLS}"
        );
        sqlx::query_as::<_, AdminRecord>(&sql)
            .bind(record.id)
            .bind(&record.username)
            .bind(&record.email)
            .bind(&record.fullname)
            .bind(&record.phone)
            .bind(&record.address)
            .bind(record.role)
            .bind(record.standing)
            .bind(record.action)
            .bind(record.complete_profile)
            .bind(record.online_status)
            .bind(record.updated_by)
            .bind(record.created)
            .bind(record.updated)
            .fetch_one(&self.pool)
            .await
    }
}

const ADMIN_COLS: &str = "id, username, email, fullname, phone, address, role, standing, action, \
     complete_profile, online_status, updated_by, created, updated";

const VENDOR_COLS: &str = "id, fullname, username, email, phone, business_name, domain_name, \
     address, business_verified, email_verified, complete_profile, standing, action, approval, \
     approval_comment, approved_by, admin, created, updated";

const CUSTOMER_COLS: &str =
    "id, fullname, username, email, phone, address, wishlist, cart, standing, action, created, \
     updated";

const COURSE_COLS: &str = "id, vendor, title, description, price, available, standing, action, \
     approved, approval_comment, approved_by, created, updated";

const CATEGORY_COLS: &str = "id, name, description, kind, standing, action, created, updated";

const REVIEW_COLS: &str = "id, subject, subject_id, customer, vendor, comment, rating, approved, \
     approved_by, standing, action, created, updated";

#[async_trait]
impl Store for PostgresStore {
    async fn create_admin(&self, record: AdminRecord) -> Result<AdminRecord, StoreError> {
        // The first-admin promotion happens inside a single statement,
        // guarded by the emptiness subquery. Two racing first registrations
        // can both see an empty table under read committed, so the `one_super`
        // partial unique index is the real arbiter: the loser retries and
        // lands on the ordinary defaults.
        match self.insert_admin(&record).await {
            Ok(created) => Ok(created),
            Err(sqlx::Error::Database(db)) if db.constraint() == Some("one_super") => {
                Ok(self.insert_admin(&record).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_admin(&self, id: Uuid) -> Result<Option<AdminRecord>, StoreError> {
        let sql = format!("SELECT {ADMIN_COLS} FROM admins WHERE id = $1");
        Ok(sqlx::query_as::<_, AdminRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_admins(&self) -> Result<Vec<AdminRecord>, StoreError> {
        let sql = format!("SELECT {ADMIN_COLS} FROM admins ORDER BY created ASC");
        Ok(sqlx::query_as::<_, AdminRecord>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_admin(&self, record: AdminRecord) -> Result<Option<AdminRecord>, StoreError> {
        let sql = format!(
            "UPDATE admins SET username = $2, email = $3, fullname = $4, phone = $5, address = $6,
                    role = $7, standing = $8, action = $9, complete_profile = $10,
                    online_status = $11, updated_by = $12, updated = $13
             WHERE id = $1 RETURNING {ADMIN_COLS}"
        );
        Ok(sqlx::query_as::<_, AdminRecord>(&sql)
            .bind(record.id)
            .bind(&record.username)
            .bind(&record.email)
            .bind(&record.fullname)
            .bind(&record.phone)
            .bind(&record.address)
            .bind(record.role)
            .bind(record.standing)
            .bind(record.action)
            .bind(record.complete_profile)
            .bind(record.online_status)
            .bind(record.updated_by)
            .bind(record.updated)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_admin(&self, id: Uuid) -> Result<Option<AdminRecord>, StoreError> {
        let sql = format!("DELETE FROM admins WHERE id = $1 RETURNING {ADMIN_COLS}");
        Ok(sqlx::query_as::<_, AdminRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_vendor(&self, record: VendorRecord) -> Result<VendorRecord, StoreError> {
        let sql = format!(
            "INSERT INTO vendors ({VENDOR_COLS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
             RETURNING {VENDOR_COLS}"
        );
        Ok(sqlx::query_as::<_, VendorRecord>(&sql)
            .bind(record.id)
            .bind(&record.fullname)
            .bind(&record.username)
            .bind(&record.email)
            .bind(&record.phone)
            .bind(&record.business_name)
            .bind(&record.domain_name)
            .bind(record.address.as_ref().map(Json))
            .bind(record.business_verified)
            .bind(record.email_verified)
            .bind(record.complete_profile)
            .bind(record.standing)
            .bind(record.action)
            .bind(record.approval)
            .bind(&record.approval_comment)
            .bind(record.approved_by)
            .bind(record.admin)
            .bind(record.created)
            .bind(record.updated)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_vendor(&self, id: Uuid) -> Result<Option<VendorRecord>, StoreError> {
        let sql = format!("SELECT {VENDOR_COLS} FROM vendors WHERE id = $1");
        Ok(sqlx::query_as::<_, VendorRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_vendor_by_domain(
        &self,
        domain: &str,
    ) -> Result<Option<VendorRecord>, StoreError> {
        let sql = format!("SELECT {VENDOR_COLS} FROM vendors WHERE domain_name = $1");
        Ok(sqlx::query_as::<_, VendorRecord>(&sql)
            .bind(domain)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_vendors(&self) -> Result<Vec<VendorRecord>, StoreError> {
        let sql = format!("SELECT {VENDOR_COLS} FROM vendors ORDER BY created ASC");
        Ok(sqlx::query_as::<_, VendorRecord>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_vendor(
        &self,
        record: VendorRecord,
    ) -> Result<Option<VendorRecord>, StoreError> {
        let sql = format!(
            "UPDATE vendors SET fullname = $2, username = $3, email = $4, phone = $5,
                    business_name = $6, domain_name = $7, address = $8, business_verified = $9,
                    email_verified = $10, complete_profile = $11, standing = $12, action = $13,
                    approval = $14, approval_comment = $15, approved_by = $16, admin = $17,
                    updated = $18
             WHERE id = $1 RETURNING {VENDOR_COLS}"
        );
        Ok(sqlx::query_as::<_, VendorRecord>(&sql)
            .bind(record.id)
            .bind(&record.fullname)
            .bind(&record.username)
            .bind(&record.email)
            .bind(&record.phone)
            .bind(&record.business_name)
            .bind(&record.domain_name)
            .bind(record.address.as_ref().map(Json))
            .bind(record.business_verified)
            .bind(record.email_verified)
            .bind(record.complete_profile)
            .bind(record.standing)
            .bind(record.action)
            .bind(record.approval)
            .bind(&record.approval_comment)
            .bind(record.approved_by)
            .bind(record.admin)
            .bind(record.updated)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_vendor(&self, id: Uuid) -> Result<Option<VendorRecord>, StoreError> {
        let sql = format!("DELETE FROM vendors WHERE id = $1 RETURNING {VENDOR_COLS}");
        Ok(sqlx::query_as::<_, VendorRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_customer(
        &self,
        record: CustomerRecord,
    ) -> Result<CustomerRecord, StoreError> {
        let sql = format!(
            "INSERT INTO customers ({CUSTOMER_COLS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {CUSTOMER_COLS}"
        );
        Ok(sqlx::query_as::<_, CustomerRecord>(&sql)
            .bind(record.id)
            .bind(&record.fullname)
            .bind(&record.username)
            .bind(&record.email)
            .bind(&record.phone)
            .bind(record.address.as_ref().map(Json))
            .bind(Json(&record.wishlist))
            .bind(Json(&record.cart))
            .bind(record.standing)
            .bind(record.action)
            .bind(record.created)
            .bind(record.updated)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_customer(&self, id: Uuid) -> Result<Option<CustomerRecord>, StoreError> {
        let sql = format!("SELECT {CUSTOMER_COLS} FROM customers WHERE id = $1");
        Ok(sqlx::query_as::<_, CustomerRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_customer(
        &self,
        record: CustomerRecord,
    ) -> Result<Option<CustomerRecord>, StoreError> {
        let sql = format!(
            "UPDATE customers SET fullname = $2, username = $3, email = $4, phone = $5,
                    address = $6, wishlist = $7, cart = $8, standing = $9, action = $10,
                    updated = $11
             WHERE id = $1 RETURNING {CUSTOMER_COLS}"
        );
        Ok(sqlx::query_as::<_, CustomerRecord>(&sql)
            .bind(record.id)
            .bind(&record.fullname)
            .bind(&record.username)
            .bind(&record.email)
            .bind(&record.phone)
            .bind(record.address.as_ref().map(Json))
            .bind(Json(&record.wishlist))
            .bind(Json(&record.cart))
            .bind(record.standing)
            .bind(record.action)
            .bind(record.updated)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_course(&self, record: CourseRecord) -> Result<CourseRecord, StoreError> {
        let sql = format!(
            "INSERT INTO courses ({COURSE_COLS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {COURSE_COLS}"
        );
        Ok(sqlx::query_as::<_, CourseRecord>(&sql)
            .bind(record.id)
            .bind(record.vendor)
            .bind(&record.title)
            .bind(&record.description)
            .bind(record.price)
            .bind(record.available)
            .bind(record.standing)
            .bind(record.action)
            .bind(record.approved)
            .bind(&record.approval_comment)
            .bind(record.approved_by)
            .bind(record.created)
            .bind(record.updated)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_course(&self, id: Uuid) -> Result<Option<CourseRecord>, StoreError> {
        let sql = format!("SELECT {COURSE_COLS} FROM courses WHERE id = $1");
        Ok(sqlx::query_as::<_, CourseRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_courses(&self, active_only: bool) -> Result<Vec<CourseRecord>, StoreError> {
        let sql = if active_only {
            format!(
                "SELECT {COURSE_COLS} FROM courses WHERE standing = 'active'::standing \
                 ORDER BY created DESC"
            )
        } else {
            format!("SELECT {COURSE_COLS} FROM courses ORDER BY created DESC")
        };
        Ok(sqlx::query_as::<_, CourseRecord>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_course(
        &self,
        record: CourseRecord,
    ) -> Result<Option<CourseRecord>, StoreError> {
        let sql = format!(
            "UPDATE courses SET vendor = $2, title = $3, description = $4, price = $5,
                    available = $6, standing = $7, action = $8, approved = $9,
                    approval_comment = $10, approved_by = $11, updated = $12
             WHERE id = $1 RETURNING {COURSE_COLS}"
        );
        Ok(sqlx::query_as::<_, CourseRecord>(&sql)
            .bind(record.id)
            .bind(record.vendor)
            .bind(&record.title)
            .bind(&record.description)
            .bind(record.price)
            .bind(record.available)
            .bind(record.standing)
            .bind(record.action)
            .bind(record.approved)
            .bind(&record.approval_comment)
            .bind(record.approved_by)
            .bind(record.updated)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_course(&self, id: Uuid) -> Result<Option<CourseRecord>, StoreError> {
        let sql = format!("DELETE FROM courses WHERE id = $1 RETURNING {COURSE_COLS}");
        Ok(sqlx::query_as::<_, CourseRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn count_courses_by_vendor(&self, vendor: Uuid) -> Result<i64, StoreError> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses WHERE vendor = $1")
                .bind(vendor)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn create_category(
        &self,
        record: CategoryRecord,
    ) -> Result<CategoryRecord, StoreError> {
        let sql = format!(
            "INSERT INTO categories ({CATEGORY_COLS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {CATEGORY_COLS}"
        );
        Ok(sqlx::query_as::<_, CategoryRecord>(&sql)
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.description)
            .bind(&record.kind)
            .bind(record.standing)
            .bind(record.action)
            .bind(record.created)
            .bind(record.updated)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, StoreError> {
        let sql = format!("SELECT {CATEGORY_COLS} FROM categories WHERE id = $1");
        Ok(sqlx::query_as::<_, CategoryRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_categories(
        &self,
        active_only: bool,
    ) -> Result<Vec<CategoryRecord>, StoreError> {
        let sql = if active_only {
            format!(
                "SELECT {CATEGORY_COLS} FROM categories WHERE standing = 'active'::standing \
                 ORDER BY name ASC"
            )
        } else {
            format!("SELECT {CATEGORY_COLS} FROM categories ORDER BY name ASC")
        };
        Ok(sqlx::query_as::<_, CategoryRecord>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_category(
        &self,
        record: CategoryRecord,
    ) -> Result<Option<CategoryRecord>, StoreError> {
        let sql = format!(
            "UPDATE categories SET name = $2, description = $3, kind = $4, standing = $5,
                    action = $6, updated = $7
             WHERE id = $1 RETURNING {CATEGORY_COLS}"
        );
        Ok(sqlx::query_as::<_, CategoryRecord>(&sql)
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.description)
            .bind(&record.kind)
            .bind(record.standing)
            .bind(record.action)
            .bind(record.updated)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, StoreError> {
        let sql = format!("DELETE FROM categories WHERE id = $1 RETURNING {CATEGORY_COLS}");
        Ok(sqlx::query_as::<_, CategoryRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_review(&self, record: ReviewRecord) -> Result<ReviewRecord, StoreError> {
        let sql = format!(
            "INSERT INTO reviews ({REVIEW_COLS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {REVIEW_COLS}"
        );
        Ok(sqlx::query_as::<_, ReviewRecord>(&sql)
            .bind(record.id)
            .bind(record.subject)
            .bind(record.subject_id)
            .bind(record.customer)
            .bind(record.vendor)
            .bind(&record.comment)
            .bind(record.rating)
            .bind(record.approved)
            .bind(record.approved_by)
            .bind(record.standing)
            .bind(record.action)
            .bind(record.created)
            .bind(record.updated)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_review(&self, id: Uuid) -> Result<Option<ReviewRecord>, StoreError> {
        let sql = format!("SELECT {REVIEW_COLS} FROM reviews WHERE id = $1");
        Ok(sqlx::query_as::<_, ReviewRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_review(
        &self,
        record: ReviewRecord,
    ) -> Result<Option<ReviewRecord>, StoreError> {
        let sql = format!(
            "UPDATE reviews SET subject = $2, subject_id = $3, customer = $4, vendor = $5,
                    comment = $6, rating = $7, approved = $8, approved_by = $9, standing = $10,
                    action = $11, updated = $12
             WHERE id = $1 RETURNING {REVIEW_COLS}"
        );
        Ok(sqlx::query_as::<_, ReviewRecord>(&sql)
            .bind(record.id)
            .bind(record.subject)
            .bind(record.subject_id)
            .bind(record.customer)
            .bind(record.vendor)
            .bind(&record.comment)
            .bind(record.rating)
            .bind(record.approved)
            .bind(record.approved_by)
            .bind(record.standing)
            .bind(record.action)
            .bind(record.updated)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_review(&self, id: Uuid) -> Result<Option<ReviewRecord>, StoreError> {
        let sql = format!("DELETE FROM reviews WHERE id = $1 RETURNING {REVIEW_COLS}");
        Ok(sqlx::query_as::<_, ReviewRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn subject_exists(
        &self,
        subject: ReviewSubject,
        id: Uuid,
    ) -> Result<bool, StoreError> {
        let table = match subject {
            ReviewSubject::Course => "courses",
            ReviewSubject::Category => "categories",
            ReviewSubject::Vendor => "vendors",
            ReviewSubject::Brand
            | ReviewSubject::Order
            | ReviewSubject::Blog
            | ReviewSubject::Ticket => return Ok(false),
        };
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)");
        Ok(sqlx::query_scalar::<_, bool>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn attribute_exists(
        &self,
        kind: ActorKind,
        attribute: &str,
        value: &str,
    ) -> Result<bool, StoreError> {
        let table = match kind {
            ActorKind::Admin => "admins",
            ActorKind::Vendor => "vendors",
            ActorKind::Customer => "customers",
        };
        // Column name comes from a fixed allowlist, never the raw input.
        let column = match attribute {
            "email" => "email",
            "username" => "username",
            _ => return Ok(false),
        };
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE {column} = $1)");
        Ok(sqlx::query_scalar::<_, bool>(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn stats(&self) -> Result<DashboardStats, StoreError> {
        let total_admins = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        let total_vendors = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vendors")
            .fetch_one(&self.pool)
            .await?;
        let total_customers = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        let total_courses = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?;
        let pending_vendor_approvals = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM vendors WHERE approval = 'pending'::approval",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(DashboardStats {
            total_admins,
            total_vendors,
            total_customers,
            total_courses,
            pending_vendor_approvals,
        })
    }
}

/// Parses a path-supplied record id. A malformed id is reported as a
/// missing record: the address cannot name anything that exists.
pub fn parse_record_id(raw: &str) -> Result<Uuid, ApiError> {
    if raw.is_empty() {
        return Err(ApiError::Validation(
            "No record Id as request parameter".to_string(),
        ));
    }
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::NotFound("Invalid record Id as request parameter".to_string())
    })
}
