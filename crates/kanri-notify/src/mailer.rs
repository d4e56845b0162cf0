use async_trait::async_trait;

use crate::NotifyError;

/// The outbound mail collaborator. Delivery is fire-and-forget from the
/// workflow's perspective; implementations talk to whatever relay the
/// deployment provides.
#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Development sender: traces the message instead of delivering it.
pub struct LogMailSender;

#[async_trait]
impl MailSender for LogMailSender {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        tracing::debug!("mail to {to}: {subject}");
        Ok(())
    }
}
