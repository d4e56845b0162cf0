//! The single shared policy module: the role/permission table and the
//! request-level access guard. Server-side guards and any front-end
//! gating consult the same table, so the two can never drift.

pub mod error;
pub mod guard;
pub mod table;

pub use error::PolicyError;
pub use guard::{authorize, can_delete, can_edit, can_view};
pub use table::{allowed_actions, role_allows, Action};
