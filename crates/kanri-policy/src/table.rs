use kanri_core::types::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewChanges,
    CreateChange,
    EditChange,
    DeleteChange,
    ReviewChange,
    ManageUsers,
    ManageSettings,
    ViewReports,
}

/// Static role/permission table. This is the one copy; anything that
/// gates on permissions reads it from here.
pub fn allowed_actions(role: Role) -> &'static [Action] {
    use Action::*;
    match role {
        Role::User => &[ViewChanges, CreateChange],
        Role::Editor => &[ViewChanges, CreateChange, EditChange, ReviewChange],
        Role::Staff => &[ViewChanges, CreateChange, EditChange, ReviewChange, ViewReports],
        Role::Admin => &[
            ViewChanges,
            CreateChange,
            EditChange,
            DeleteChange,
            ReviewChange,
            ManageUsers,
            ManageSettings,
            ViewReports,
        ],
        Role::EnterpriseAdmin => &[
            ViewChanges,
            CreateChange,
            EditChange,
            DeleteChange,
            ReviewChange,
            ManageUsers,
            ManageSettings,
            ViewReports,
        ],
    }
}

pub fn role_allows(role: Role, action: Action) -> bool {
    allowed_actions(role).contains(&action)
}
