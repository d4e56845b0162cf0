use std::sync::Arc;

use kanri_core::id::{ChangeRequestId, NotificationId, UserId};
use kanri_core::now_ms;
use kanri_core::types::{
    Attachment, ChangeDraft, ChangeRequest, ChangeUpdate, Comment, Notification,
    NotificationKind, Priority, ReviewStatus, Reviewer, Role, User,
};
use kanri_core::validate::validate_change_request;
use kanri_notify::{Dispatcher, MailSender, NotificationRequest};
use kanri_policy::guard;
use kanri_store::KanriStore;

use crate::files::FileStorage;
use crate::{EngineConfig, EngineError};

/// The change-request workflow engine: CRUD plus attachment upload,
/// comments and reviewer voting, with notification fan-out decided by
/// diffing the stored document against the incoming update.
pub struct ChangeEngine {
    store: Arc<KanriStore>,
    dispatcher: Dispatcher,
    files: Arc<dyn FileStorage>,
    config: EngineConfig,
}

impl ChangeEngine {
    pub fn new(
        store: Arc<KanriStore>,
        mailer: Arc<dyn MailSender>,
        files: Arc<dyn FileStorage>,
        config: EngineConfig,
    ) -> Self {
        let dispatcher = Dispatcher::new(store.clone(), mailer);
        Self {
            store,
            dispatcher,
            files,
            config,
        }
    }

    pub async fn create(
        &self,
        draft: ChangeDraft,
        actor: &User,
    ) -> Result<ChangeRequest, EngineError> {
        let now = now_ms();
        let cr = ChangeRequest {
            id: ChangeRequestId::new(),
            title: draft.title,
            description: draft.description,
            impact: draft.impact,
            status: draft.status.unwrap_or_default(),
            category: draft.category,
            planned_start_ms: draft.planned_start_ms,
            planned_end_ms: draft.planned_end_ms,
            actual_start_ms: None,
            actual_end_ms: None,
            assigned_to: draft.assigned_to,
            reviewers: stamp_reviewers(draft.reviewers, now),
            attachments: Vec::new(),
            comments: Vec::new(),
            owner: actor.id,
            created_at_ms: now,
            updated_at_ms: now,
        };
        validate_change_request(&cr)?;
        self.store.insert_change_request(&cr)?;

        // Every elevated user hears about a new change request. Failures
        // are the dispatcher's problem, never the caller's.
        let requests = self
            .elevated_users()
            .into_iter()
            .map(|u| NotificationRequest {
                title: "New Change Request".into(),
                message: format!("{} filed change request \"{}\"", actor.name, cr.title),
                kind: NotificationKind::Change,
                priority: Priority::from(cr.impact),
                recipient: u.id,
                related_change: Some(cr.id),
                email_to: Some(u.email),
            })
            .collect();
        self.dispatcher.dispatch_all(requests).await;

        Ok(cr)
    }

    pub fn get(&self, id: &str, actor: &User) -> Result<ChangeRequest, EngineError> {
        let id = parse_change_id(id)?;
        let cr = self
            .store
            .get_change_request(&id)?
            .ok_or(EngineError::NotFound)?;
        if !guard::can_view(actor.role, &actor.id, &cr.owner) {
            return Err(EngineError::Forbidden(
                "not the owner of this change request".into(),
            ));
        }
        Ok(cr)
    }

    /// `owned_only` comes from the route layer; regular users are
    /// restricted to their own records regardless.
    pub fn list(&self, actor: &User, owned_only: bool) -> Result<Vec<ChangeRequest>, EngineError> {
        let restrict = owned_only || actor.role == Role::User;
        let owner = restrict.then_some(&actor.id);
        Ok(self.store.list_change_requests(owner)?)
    }

    pub async fn update(
        &self,
        id: &str,
        update: ChangeUpdate,
        actor: &User,
    ) -> Result<ChangeRequest, EngineError> {
        let id = parse_change_id(id)?;
        let old = self
            .store
            .get_change_request(&id)?
            .ok_or(EngineError::NotFound)?;
        if !guard::can_edit(actor.role, &actor.id, &old.owner) {
            return Err(EngineError::Forbidden(
                "not the owner of this change request".into(),
            ));
        }

        let now = now_ms();
        let added_reviewers = update
            .reviewers
            .as_deref()
            .map(|new| new_reviewer_ids(&old.reviewers, new))
            .unwrap_or_default();
        let updated = apply_update(&old, update, now);
        validate_change_request(&updated)?;
        self.store.put_change_request(&updated)?;

        let mut requests = Vec::new();
        if old.status != updated.status {
            let message = format!(
                "Status of \"{}\" changed from {} to {}",
                updated.title, old.status, updated.status
            );
            // The owner gets an email copy; peer admins only see the
            // in-app record. Intentional asymmetry.
            if updated.owner != actor.id {
                requests.push(NotificationRequest {
                    title: "Change Request Updated".into(),
                    message: message.clone(),
                    kind: NotificationKind::Change,
                    priority: Priority::from(updated.impact),
                    recipient: updated.owner,
                    related_change: Some(updated.id),
                    email_to: self.email_of(&updated.owner),
                });
            }
            for peer in self.elevated_users() {
                if peer.id == actor.id {
                    continue;
                }
                requests.push(NotificationRequest {
                    title: "Change Request Updated".into(),
                    message: message.clone(),
                    kind: NotificationKind::Change,
                    priority: Priority::from(updated.impact),
                    recipient: peer.id,
                    related_change: Some(updated.id),
                    email_to: None,
                });
            }
        }
        for reviewer in added_reviewers {
            requests.push(NotificationRequest {
                title: "Review Request".into(),
                message: format!("You were asked to review \"{}\"", updated.title),
                kind: NotificationKind::Change,
                priority: Priority::from(updated.impact),
                recipient: reviewer,
                related_change: Some(updated.id),
                email_to: self.email_of(&reviewer),
            });
        }
        self.dispatcher.dispatch_all(requests).await;

        Ok(updated)
    }

    /// Staff and editor may update but not delete; only the owner and
    /// (enterprise) admins may remove a change request. Attachment blobs
    /// are left to the file-storage collaborator's lifecycle.
    pub fn delete(&self, id: &str, actor: &User) -> Result<(), EngineError> {
        let id = parse_change_id(id)?;
        let cr = self
            .store
            .get_change_request(&id)?
            .ok_or(EngineError::NotFound)?;
        if !guard::can_delete(actor.role, &actor.id, &cr.owner) {
            return Err(EngineError::Forbidden(
                "only the owner or an admin may delete".into(),
            ));
        }
        self.store.delete_change_request(&id)?;
        Ok(())
    }

    pub fn upload_attachment(
        &self,
        id: &str,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
        actor: &User,
    ) -> Result<ChangeRequest, EngineError> {
        let id = parse_change_id(id)?;
        let mut cr = self
            .store
            .get_change_request(&id)?
            .ok_or(EngineError::NotFound)?;
        if !guard::can_edit(actor.role, &actor.id, &cr.owner) {
            return Err(EngineError::Forbidden(
                "not the owner of this change request".into(),
            ));
        }
        let size = bytes.len() as u64;
        if size > self.config.max_upload_bytes {
            return Err(EngineError::UploadTooLarge {
                size,
                max: self.config.max_upload_bytes,
            });
        }

        let now = now_ms();
        let ext = file_name
            .rfind('.')
            .map(|i| &file_name[i..])
            .unwrap_or_default();
        let stored_name = format!("change_{}_{}{}", cr.id.to_hex(), now, ext);
        let stored_path = self.files.store(bytes, "changes", &stored_name)?;

        cr.attachments.push(Attachment {
            name: file_name.to_string(),
            stored_path,
            content_type: content_type.to_string(),
            size_bytes: size,
            uploaded_at_ms: now,
        });
        cr.updated_at_ms = now;
        self.store.put_change_request(&cr)?;
        Ok(cr)
    }

    pub async fn add_comment(
        &self,
        id: &str,
        text: &str,
        actor: &User,
    ) -> Result<ChangeRequest, EngineError> {
        if text.trim().is_empty() {
            return Err(EngineError::Validation("comment text is required".into()));
        }
        let id = parse_change_id(id)?;
        let mut cr = self
            .store
            .get_change_request(&id)?
            .ok_or(EngineError::NotFound)?;
        if !guard::can_view(actor.role, &actor.id, &cr.owner) {
            return Err(EngineError::Forbidden(
                "not the owner of this change request".into(),
            ));
        }

        let now = now_ms();
        cr.comments.push(Comment {
            text: text.to_string(),
            author: actor.id,
            created_at_ms: now,
        });
        cr.updated_at_ms = now;
        self.store.put_change_request(&cr)?;

        if cr.owner != actor.id {
            self.dispatcher
                .dispatch(NotificationRequest {
                    title: "New Comment".into(),
                    message: format!("{} commented on \"{}\"", actor.name, cr.title),
                    kind: NotificationKind::Change,
                    priority: Priority::from(cr.impact),
                    recipient: cr.owner,
                    related_change: Some(cr.id),
                    email_to: None,
                })
                .await;
        }
        Ok(cr)
    }

    /// A listed reviewer records their verdict on their own entry. The
    /// vote replaces status and comments in place; the review timestamp
    /// is only written if the entry never had one.
    pub async fn submit_review(
        &self,
        id: &str,
        verdict: ReviewStatus,
        comments: Option<String>,
        actor: &User,
    ) -> Result<ChangeRequest, EngineError> {
        if verdict == ReviewStatus::Pending {
            return Err(EngineError::Validation(
                "review verdict must be approved or rejected".into(),
            ));
        }
        let id = parse_change_id(id)?;
        let mut cr = self
            .store
            .get_change_request(&id)?
            .ok_or(EngineError::NotFound)?;

        let now = now_ms();
        let entry = cr
            .reviewers
            .iter_mut()
            .find(|r| r.user == actor.id)
            .ok_or_else(|| {
                EngineError::Forbidden("not a listed reviewer of this change request".into())
            })?;
        entry.status = verdict;
        entry.comments = comments;
        if entry.reviewed_at_ms.is_none() {
            entry.reviewed_at_ms = Some(now);
        }
        cr.updated_at_ms = now;
        self.store.put_change_request(&cr)?;

        let review_complete = cr
            .reviewers
            .iter()
            .all(|r| r.status != ReviewStatus::Pending);
        if review_complete {
            self.dispatcher
                .dispatch(NotificationRequest {
                    title: "Review Complete".into(),
                    message: format!("All reviewers have voted on \"{}\"", cr.title),
                    kind: NotificationKind::Change,
                    priority: Priority::from(cr.impact),
                    recipient: cr.owner,
                    related_change: Some(cr.id),
                    email_to: self.email_of(&cr.owner),
                })
                .await;
        }
        Ok(cr)
    }

    pub fn notifications(&self, actor: &User) -> Result<Vec<Notification>, EngineError> {
        Ok(self.store.list_notifications_for(&actor.id)?)
    }

    pub fn mark_notification_read(&self, id: &str, actor: &User) -> Result<bool, EngineError> {
        let id =
            NotificationId::from_hex(id).map_err(|e| EngineError::InvalidId(e.to_string()))?;
        let Some(n) = self.store.get_notification(&id)? else {
            return Ok(false);
        };
        if n.recipient != actor.id {
            return Err(EngineError::Forbidden(
                "not the recipient of this notification".into(),
            ));
        }
        Ok(self.store.mark_notification_read(&id)?)
    }

    fn elevated_users(&self) -> Vec<User> {
        match self.store.find_users_by_role(&Role::NOTIFIED) {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!("failed to resolve notification recipients: {e}");
                Vec::new()
            }
        }
    }

    fn email_of(&self, id: &UserId) -> Option<String> {
        match self.store.get_user(id) {
            Ok(Some(user)) => Some(user.email),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("failed to resolve email for {id}: {e}");
                None
            }
        }
    }
}

fn parse_change_id(id: &str) -> Result<ChangeRequestId, EngineError> {
    ChangeRequestId::from_hex(id).map_err(|e| EngineError::InvalidId(e.to_string()))
}

/// Entries arriving without a review timestamp get one now; existing
/// stamps are echoed back untouched.
fn stamp_reviewers(reviewers: Vec<Reviewer>, now: u64) -> Vec<Reviewer> {
    reviewers
        .into_iter()
        .map(|mut r| {
            if r.reviewed_at_ms.is_none() {
                r.reviewed_at_ms = Some(now);
            }
            r
        })
        .collect()
}

/// Full-document merge: supplied fields overwrite, id/owner/created_at
/// never move.
fn apply_update(old: &ChangeRequest, update: ChangeUpdate, now: u64) -> ChangeRequest {
    let mut cr = old.clone();
    if let Some(title) = update.title {
        cr.title = title;
    }
    if let Some(description) = update.description {
        cr.description = description;
    }
    if let Some(impact) = update.impact {
        cr.impact = impact;
    }
    if let Some(status) = update.status {
        cr.status = status;
    }
    if let Some(category) = update.category {
        cr.category = category;
    }
    if let Some(v) = update.planned_start_ms {
        cr.planned_start_ms = v;
    }
    if let Some(v) = update.planned_end_ms {
        cr.planned_end_ms = v;
    }
    if let Some(v) = update.actual_start_ms {
        cr.actual_start_ms = Some(v);
    }
    if let Some(v) = update.actual_end_ms {
        cr.actual_end_ms = Some(v);
    }
    if let Some(v) = update.assigned_to {
        cr.assigned_to = Some(v);
    }
    if let Some(reviewers) = update.reviewers {
        cr.reviewers = stamp_reviewers(reviewers, now);
    }
    cr.updated_at_ms = now;
    cr
}

/// Reviewer ids present in the new array but absent from the old one,
/// compared by user-id equality. Duplicate entries for a user already
/// listed are not treated as additions.
fn new_reviewer_ids(old: &[Reviewer], new: &[Reviewer]) -> Vec<UserId> {
    let mut added = Vec::new();
    for r in new {
        if old.iter().any(|o| o.user == r.user) {
            continue;
        }
        if added.contains(&r.user) {
            continue;
        }
        added.push(r.user);
    }
    added
}
