use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use kanri_core::id::UserId;
use kanri_core::types::{
    ChangeDraft, ChangeStatus, Impact, Notification, ReviewStatus, Reviewer, Role, User,
};
use kanri_engine::{ChangeEngine, EngineConfig, EngineError, LocalFileStorage};
use kanri_notify::{MailSender, NotifyError};
use kanri_policy::authorize;
use kanri_store::KanriStore;

struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }

    fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(to, _)| to.clone()).collect()
    }
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

struct Harness {
    _tmp: tempfile::TempDir,
    store: Arc<KanriStore>,
    engine: ChangeEngine,
    mailer: Arc<RecordingMailer>,
    owner: User,
    other: User,
    editor: User,
    staff: User,
    admin: User,
    enterprise: User,
}

fn seed_user(store: &KanriStore, name: &str, role: Role) -> User {
    let user = User {
        id: UserId::new(),
        name: name.into(),
        email: format!("{name}@example.com"),
        password_hash: "!".into(),
        role,
    };
    store.insert_user(&user).unwrap();
    user
}

fn harness() -> Harness {
    let tmp = tempfile::tempdir().unwrap();
    let store = Arc::new(KanriStore::open(&tmp.path().join("kanri.redb")).unwrap());
    let mailer = RecordingMailer::new();
    let files = Arc::new(LocalFileStorage::new(tmp.path().join("uploads")));
    let config = EngineConfig {
        max_upload_bytes: 1024,
        upload_dir: tmp.path().join("uploads"),
    };
    let engine = ChangeEngine::new(store.clone(), mailer.clone(), files, config);

    let owner = seed_user(&store, "olive", Role::User);
    let other = seed_user(&store, "oscar", Role::User);
    let editor = seed_user(&store, "edith", Role::Editor);
    let staff = seed_user(&store, "sven", Role::Staff);
    let admin = seed_user(&store, "ada", Role::Admin);
    let enterprise = seed_user(&store, "elena", Role::EnterpriseAdmin);

    Harness {
        _tmp: tmp,
        store,
        engine,
        mailer,
        owner,
        other,
        editor,
        staff,
        admin,
        enterprise,
    }
}

fn draft() -> ChangeDraft {
    ChangeDraft {
        title: "Upgrade database cluster".into(),
        description: "Move the primary cluster to the new storage tier.".into(),
        impact: Impact::High,
        status: None,
        category: Default::default(),
        planned_start_ms: 1_000,
        planned_end_ms: 2_000,
        assigned_to: None,
        reviewers: vec![],
    }
}

fn pending(user: &User) -> Reviewer {
    Reviewer {
        user: user.id,
        status: ReviewStatus::Pending,
        comments: None,
        reviewed_at_ms: None,
    }
}

fn inbox(h: &Harness, user: &User) -> Vec<Notification> {
    h.store.list_notifications_for(&user.id).unwrap()
}

// === Id validation ===

#[tokio::test]
async fn malformed_id_is_a_validation_error_never_not_found() {
    let h = harness();
    for bad in ["nope", "123", "zzzzzzzzzzzzzzzzzzzzzzzz", ""] {
        assert!(matches!(
            h.engine.get(bad, &h.admin),
            Err(EngineError::InvalidId(_))
        ));
        assert!(matches!(
            h.engine.update(bad, Default::default(), &h.admin).await,
            Err(EngineError::InvalidId(_))
        ));
        assert!(matches!(
            h.engine
                .upload_attachment(bad, "plan.pdf", "application/pdf", b"x", &h.admin),
            Err(EngineError::InvalidId(_))
        ));
        assert!(matches!(
            h.engine.delete(bad, &h.admin),
            Err(EngineError::InvalidId(_))
        ));
    }

    // A well-formed id that matches nothing is the other error kind.
    let absent = "0123456789abcdef01234567";
    assert!(matches!(
        h.engine.get(absent, &h.admin),
        Err(EngineError::NotFound)
    ));
}

// === Create ===

#[tokio::test]
async fn create_defaults_to_draft_and_records_the_creator() {
    let h = harness();
    let cr = h.engine.create(draft(), &h.owner).await.unwrap();
    assert_eq!(cr.status, ChangeStatus::Draft);
    assert_eq!(cr.owner, h.owner.id);
    assert!(cr.updated_at_ms >= cr.created_at_ms);
}

#[tokio::test]
async fn create_honors_a_supplied_status() {
    let h = harness();
    let mut d = draft();
    d.status = Some(ChangeStatus::Submitted);
    let cr = h.engine.create(d, &h.owner).await.unwrap();
    assert_eq!(cr.status, ChangeStatus::Submitted);
}

#[tokio::test]
async fn create_rejects_invalid_drafts() {
    let h = harness();

    let mut d = draft();
    d.title = String::new();
    assert!(matches!(
        h.engine.create(d, &h.owner).await,
        Err(EngineError::Validation(_))
    ));

    let mut d = draft();
    d.planned_end_ms = d.planned_start_ms - 1;
    assert!(matches!(
        h.engine.create(d, &h.owner).await,
        Err(EngineError::Validation(_))
    ));
}

#[tokio::test]
async fn create_notifies_every_elevated_role_with_email() {
    let h = harness();
    h.engine.create(draft(), &h.owner).await.unwrap();

    assert_eq!(inbox(&h, &h.admin).len(), 1);
    assert_eq!(inbox(&h, &h.staff).len(), 1);
    assert_eq!(inbox(&h, &h.enterprise).len(), 1);
    assert!(inbox(&h, &h.editor).is_empty());
    assert!(inbox(&h, &h.other).is_empty());

    let mut emails = h.mailer.recipients();
    emails.sort();
    assert_eq!(
        emails,
        vec!["ada@example.com", "elena@example.com", "sven@example.com"]
    );
}

#[tokio::test]
async fn create_then_read_round_trips() {
    let h = harness();
    let created = h.engine.create(draft(), &h.owner).await.unwrap();
    let read = h.engine.get(&created.id.to_hex(), &h.owner).unwrap();
    assert_eq!(read, created);
}

// === Listing ===

#[tokio::test]
async fn regular_users_only_ever_see_their_own_records() {
    let h = harness();
    h.engine.create(draft(), &h.owner).await.unwrap();
    h.engine.create(draft(), &h.other).await.unwrap();

    // Even without the route-layer flag, a plain user is restricted.
    let mine = h.engine.list(&h.owner, false).unwrap();
    assert_eq!(mine.len(), 1);
    assert!(mine.iter().all(|cr| cr.owner == h.owner.id));

    let all = h.engine.list(&h.staff, false).unwrap();
    assert_eq!(all.len(), 2);

    let staff_owned = h.engine.list(&h.staff, true).unwrap();
    assert!(staff_owned.is_empty());
}

// === Authorization ===

#[tokio::test]
async fn plain_user_cannot_read_or_update_someone_elses_record() {
    let h = harness();
    let cr = h.engine.create(draft(), &h.owner).await.unwrap();
    let id = cr.id.to_hex();

    assert!(matches!(
        h.engine.get(&id, &h.other),
        Err(EngineError::Forbidden(_))
    ));

    let mut update = kanri_core::types::ChangeUpdate::default();
    update.status = Some(ChangeStatus::Approved);
    assert!(matches!(
        h.engine.update(&id, update, &h.other).await,
        Err(EngineError::Forbidden(_))
    ));

    // The stored document is untouched by the denied update.
    let stored = h.engine.get(&id, &h.owner).unwrap();
    assert_eq!(stored, cr);
}

#[tokio::test]
async fn elevated_roles_read_and_update_any_record() {
    let h = harness();
    let cr = h.engine.create(draft(), &h.owner).await.unwrap();
    let id = cr.id.to_hex();

    for actor in [&h.editor, &h.staff, &h.admin, &h.enterprise] {
        assert!(h.engine.get(&id, actor).is_ok());
    }

    let mut update = kanri_core::types::ChangeUpdate::default();
    update.description = Some("Move the primary cluster, window extended.".into());
    assert!(h.engine.update(&id, update, &h.editor).await.is_ok());
}

#[tokio::test]
async fn staff_and_editor_may_update_but_never_delete() {
    let h = harness();
    let cr = h.engine.create(draft(), &h.owner).await.unwrap();
    let id = cr.id.to_hex();

    assert!(matches!(
        h.engine.delete(&id, &h.staff),
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        h.engine.delete(&id, &h.editor),
        Err(EngineError::Forbidden(_))
    ));

    // Owner and admins can.
    h.engine.delete(&id, &h.admin).unwrap();
    assert!(matches!(
        h.engine.get(&id, &h.admin),
        Err(EngineError::NotFound)
    ));

    let cr = h.engine.create(draft(), &h.owner).await.unwrap();
    h.engine.delete(&cr.id.to_hex(), &h.owner).unwrap();

    let cr = h.engine.create(draft(), &h.owner).await.unwrap();
    h.engine.delete(&cr.id.to_hex(), &h.enterprise).unwrap();
}

#[test]
fn guard_override_hierarchy() {
    assert!(authorize(Role::Admin, &[Role::Staff]).is_ok());
    assert!(authorize(Role::Admin, &[Role::EnterpriseAdmin]).is_err());
    assert!(authorize(Role::EnterpriseAdmin, &[Role::Staff]).is_ok());
    assert!(authorize(Role::EnterpriseAdmin, &[Role::EnterpriseAdmin]).is_ok());
    assert!(authorize(Role::User, &[Role::Staff]).is_err());
}

// === Status-change notifications ===

#[tokio::test]
async fn status_change_emails_the_owner_and_pings_peers_in_app() {
    let h = harness();
    let mut d = draft();
    d.status = Some(ChangeStatus::Submitted);
    let cr = h.engine.create(d, &h.owner).await.unwrap();
    let id = cr.id.to_hex();

    let before_owner = inbox(&h, &h.owner).len();
    let before_staff = inbox(&h, &h.staff).len();
    let before_admin = inbox(&h, &h.admin).len();
    let before_enterprise = inbox(&h, &h.enterprise).len();
    h.mailer.clear();

    let mut update = kanri_core::types::ChangeUpdate::default();
    update.status = Some(ChangeStatus::Approved);
    h.engine.update(&id, update, &h.admin).await.unwrap();

    // Exactly one notification for the owner, one per elevated peer,
    // none for the acting admin.
    assert_eq!(inbox(&h, &h.owner).len(), before_owner + 1);
    assert_eq!(inbox(&h, &h.staff).len(), before_staff + 1);
    assert_eq!(inbox(&h, &h.enterprise).len(), before_enterprise + 1);
    assert_eq!(inbox(&h, &h.admin).len(), before_admin);

    // Only the owner's copy goes out by email.
    assert_eq!(h.mailer.recipients(), vec!["olive@example.com"]);
}

#[tokio::test]
async fn unchanged_status_sends_no_status_notifications() {
    let h = harness();
    let cr = h.engine.create(draft(), &h.owner).await.unwrap();
    let before = inbox(&h, &h.staff).len();

    let mut update = kanri_core::types::ChangeUpdate::default();
    update.description = Some("clarified rollout plan".into());
    h.engine.update(&cr.id.to_hex(), update, &h.admin).await.unwrap();

    assert_eq!(inbox(&h, &h.staff).len(), before);
    assert!(inbox(&h, &h.owner).is_empty());
}

#[tokio::test]
async fn owner_updating_their_own_status_gets_no_self_notification() {
    let h = harness();
    let cr = h.engine.create(draft(), &h.owner).await.unwrap();

    let mut update = kanri_core::types::ChangeUpdate::default();
    update.status = Some(ChangeStatus::Submitted);
    h.engine.update(&cr.id.to_hex(), update, &h.owner).await.unwrap();

    assert!(inbox(&h, &h.owner).is_empty());
    // Peers still hear about it in-app.
    assert_eq!(inbox(&h, &h.staff).len(), 2);
}

// === Reviewer notifications ===

#[tokio::test]
async fn newly_added_reviewers_get_exactly_one_review_request() {
    let h = harness();
    let mut d = draft();
    d.reviewers = vec![pending(&h.staff)];
    let cr = h.engine.create(d, &h.owner).await.unwrap();
    let id = cr.id.to_hex();

    let before_staff = inbox(&h, &h.staff).len();
    h.mailer.clear();

    let mut update = kanri_core::types::ChangeUpdate::default();
    update.reviewers = Some(vec![pending(&h.staff), pending(&h.editor)]);
    h.engine.update(&id, update, &h.admin).await.unwrap();

    let editor_inbox = inbox(&h, &h.editor);
    assert_eq!(editor_inbox.len(), 1);
    assert_eq!(editor_inbox[0].title, "Review Request");
    assert_eq!(h.mailer.recipients(), vec!["edith@example.com"]);

    // The reviewer that was already listed is not re-notified.
    assert_eq!(inbox(&h, &h.staff).len(), before_staff);
}

#[tokio::test]
async fn duplicate_entries_for_an_existing_reviewer_are_not_additions() {
    let h = harness();
    let mut d = draft();
    d.reviewers = vec![pending(&h.staff)];
    let cr = h.engine.create(d, &h.owner).await.unwrap();

    let before = inbox(&h, &h.staff).len();
    let mut update = kanri_core::types::ChangeUpdate::default();
    update.reviewers = Some(vec![pending(&h.staff), pending(&h.staff)]);
    let updated = h
        .engine
        .update(&cr.id.to_hex(), update, &h.admin)
        .await
        .unwrap();

    // Duplicates are stored (no dedup), but nobody is re-notified.
    assert_eq!(updated.reviewers.len(), 2);
    assert_eq!(inbox(&h, &h.staff).len(), before);
}

// === Review voting ===

#[tokio::test]
async fn reviewers_vote_on_their_own_entry_only() {
    let h = harness();
    let mut d = draft();
    d.reviewers = vec![pending(&h.staff), pending(&h.editor)];
    let cr = h.engine.create(d, &h.owner).await.unwrap();
    let id = cr.id.to_hex();
    let stamped = cr.reviewers[0].reviewed_at_ms;
    assert!(stamped.is_some());

    assert!(matches!(
        h.engine
            .submit_review(&id, ReviewStatus::Approved, None, &h.other)
            .await,
        Err(EngineError::Forbidden(_))
    ));

    let after = h
        .engine
        .submit_review(&id, ReviewStatus::Approved, Some("looks safe".into()), &h.staff)
        .await
        .unwrap();
    let entry = &after.reviewers[0];
    assert_eq!(entry.status, ReviewStatus::Approved);
    assert_eq!(entry.comments.as_deref(), Some("looks safe"));
    // The review timestamp was written when the entry was created and a
    // vote never revises it.
    assert_eq!(entry.reviewed_at_ms, stamped);
    assert_eq!(after.reviewers[1].status, ReviewStatus::Pending);
}

#[tokio::test]
async fn owner_hears_when_the_last_reviewer_votes() {
    let h = harness();
    let mut d = draft();
    d.reviewers = vec![pending(&h.staff), pending(&h.editor)];
    let cr = h.engine.create(d, &h.owner).await.unwrap();
    let id = cr.id.to_hex();

    h.engine
        .submit_review(&id, ReviewStatus::Approved, None, &h.staff)
        .await
        .unwrap();
    assert!(inbox(&h, &h.owner).is_empty());

    h.engine
        .submit_review(&id, ReviewStatus::Rejected, None, &h.editor)
        .await
        .unwrap();
    let owner_inbox = inbox(&h, &h.owner);
    assert_eq!(owner_inbox.len(), 1);
    assert_eq!(owner_inbox[0].title, "Review Complete");
}

#[tokio::test]
async fn pending_is_not_a_verdict() {
    let h = harness();
    let mut d = draft();
    d.reviewers = vec![pending(&h.staff)];
    let cr = h.engine.create(d, &h.owner).await.unwrap();

    assert!(matches!(
        h.engine
            .submit_review(&cr.id.to_hex(), ReviewStatus::Pending, None, &h.staff)
            .await,
        Err(EngineError::Validation(_))
    ));
}

// === Attachments ===

#[tokio::test]
async fn upload_respects_the_size_limit() {
    let h = harness();
    let cr = h.engine.create(draft(), &h.owner).await.unwrap();
    let id = cr.id.to_hex();

    let too_big = vec![0u8; 2048];
    assert!(matches!(
        h.engine
            .upload_attachment(&id, "dump.bin", "application/octet-stream", &too_big, &h.owner),
        Err(EngineError::UploadTooLarge { size: 2048, max: 1024 })
    ));

    let updated = h
        .engine
        .upload_attachment(&id, "plan.pdf", "application/pdf", b"pdf bytes", &h.owner)
        .unwrap();
    assert_eq!(updated.attachments.len(), 1);
    let att = &updated.attachments[0];
    assert_eq!(att.name, "plan.pdf");
    assert_eq!(att.size_bytes, 9);
    assert!(att.stored_path.ends_with(".pdf"));
    assert!(std::path::Path::new(&att.stored_path).exists());
}

#[tokio::test]
async fn upload_authorization_mirrors_update() {
    let h = harness();
    let cr = h.engine.create(draft(), &h.owner).await.unwrap();

    assert!(matches!(
        h.engine
            .upload_attachment(&cr.id.to_hex(), "x.txt", "text/plain", b"x", &h.other),
        Err(EngineError::Forbidden(_))
    ));
    assert!(h
        .engine
        .upload_attachment(&cr.id.to_hex(), "x.txt", "text/plain", b"x", &h.staff)
        .is_ok());
}

// === Comments and the notification center ===

#[tokio::test]
async fn comments_append_and_notify_the_owner() {
    let h = harness();
    let cr = h.engine.create(draft(), &h.owner).await.unwrap();
    let id = cr.id.to_hex();

    let updated = h
        .engine
        .add_comment(&id, "please schedule after the freeze", &h.staff)
        .await
        .unwrap();
    assert_eq!(updated.comments.len(), 1);
    assert_eq!(updated.comments[0].author, h.staff.id);

    let owner_inbox = inbox(&h, &h.owner);
    assert_eq!(owner_inbox.len(), 1);
    assert_eq!(owner_inbox[0].title, "New Comment");

    // A comment by the owner does not notify the owner.
    h.engine.add_comment(&id, "noted", &h.owner).await.unwrap();
    assert_eq!(inbox(&h, &h.owner).len(), 1);
}

#[tokio::test]
async fn notification_center_marks_read_for_the_recipient_only() {
    let h = harness();
    h.engine.create(draft(), &h.owner).await.unwrap();

    let n = &h.engine.notifications(&h.staff).unwrap()[0];
    assert!(!n.read);

    assert!(matches!(
        h.engine.mark_notification_read(&n.id.to_hex(), &h.admin),
        Err(EngineError::Forbidden(_))
    ));

    assert!(h
        .engine
        .mark_notification_read(&n.id.to_hex(), &h.staff)
        .unwrap());
    assert!(h.engine.notifications(&h.staff).unwrap()[0].read);
}
