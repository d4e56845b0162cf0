mod change;
mod notification;
mod user;

pub use change::*;
pub use notification::*;
pub use user::*;
