pub mod error;
pub mod id;
pub mod time;
pub mod types;
pub mod validate;

pub use error::CoreError;
pub use id::{ChangeRequestId, NotificationId, UserId};
pub use time::now_ms;
