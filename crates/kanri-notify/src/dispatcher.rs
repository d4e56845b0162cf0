use std::sync::Arc;

use tokio::task::JoinSet;

use kanri_core::id::{ChangeRequestId, NotificationId, UserId};
use kanri_core::now_ms;
use kanri_core::types::{Notification, NotificationKind, Priority};
use kanri_store::KanriStore;

use crate::mailer::MailSender;

#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub priority: Priority,
    pub recipient: UserId,
    pub related_change: Option<ChangeRequestId>,
    /// When set, an email copy is attempted after the record is stored.
    pub email_to: Option<String>,
}

/// Persists notification records and sends optional email copies.
/// Nothing here ever fails the caller: every store or mail failure is
/// logged and swallowed at this boundary.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<KanriStore>,
    mailer: Arc<dyn MailSender>,
}

impl Dispatcher {
    pub fn new(store: Arc<KanriStore>, mailer: Arc<dyn MailSender>) -> Self {
        Self { store, mailer }
    }

    /// Best-effort delivery of one notification. Returns the stored
    /// record's id, or `None` when persistence failed.
    pub async fn dispatch(&self, req: NotificationRequest) -> Option<NotificationId> {
        let record = Notification {
            id: NotificationId::new(),
            title: req.title.clone(),
            message: req.message.clone(),
            kind: req.kind,
            priority: req.priority,
            read: false,
            recipient: req.recipient,
            related_change: req.related_change,
            created_at_ms: now_ms(),
        };

        let stored = match self.store.insert_notification(&record) {
            Ok(()) => Some(record.id),
            Err(e) => {
                tracing::warn!(
                    "failed to persist notification for {}: {}",
                    req.recipient,
                    e
                );
                None
            }
        };

        if let Some(to) = &req.email_to {
            if let Err(e) = self.mailer.send(to, &req.title, &req.message).await {
                tracing::warn!("failed to email {} ({}): {}", req.recipient, to, e);
            }
        }

        stored
    }

    /// Fan-out: one independent task per request, awaited together.
    /// A failing or panicking child never fails the parent operation;
    /// the caller resumes only after every attempt has settled.
    pub async fn dispatch_all(&self, requests: Vec<NotificationRequest>) -> usize {
        let mut tasks = JoinSet::new();
        for req in requests {
            let dispatcher = self.clone();
            tasks.spawn(async move { dispatcher.dispatch(req).await });
        }

        let mut delivered = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(_)) => delivered += 1,
                Ok(None) => {}
                Err(e) => tracing::warn!("notification task failed: {e}"),
            }
        }
        delivered
    }
}
