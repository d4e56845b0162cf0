pub mod dispatcher;
pub mod error;
pub mod mailer;

pub use dispatcher::{Dispatcher, NotificationRequest};
pub use error::NotifyError;
pub use mailer::{LogMailSender, MailSender};
