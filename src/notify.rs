//! Outbound notifications.
//!
//! Approval decisions tell the affected account holder what happened.
//! Delivery is fire-and-forget: a failed notification never fails the
//! request that triggered it, so the trait is infallible and implementations
//! swallow their own errors.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub recipient: Uuid,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: Uuid, subject: &str, body: &str);
}

pub type NotifierState = Arc<dyn Notifier>;

/// LogNotifier
///
/// Default sink: structured log lines. A real mail/push transport slots in
/// behind the same trait.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, recipient: Uuid, subject: &str, body: &str) {
        tracing::info!(%recipient, subject, body, "notification dispatched");
    }
}

/// MockNotifier
///
/// Records every dispatch so tests can assert on recipients and wording.
#[derive(Default)]
pub struct MockNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

impl MockNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, recipient: Uuid, subject: &str, body: &str) {
        self.sent.lock().unwrap().push(Notification {
            recipient,
            subject: subject.to_string(),
            body: body.to_string(),
        });
    }
}
