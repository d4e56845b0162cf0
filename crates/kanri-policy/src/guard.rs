use kanri_core::id::UserId;
use kanri_core::types::Role;

use crate::PolicyError;

/// Two-level override hierarchy, checked in priority order:
///
/// 1. enterprise_admin always passes.
/// 2. admin passes unless the required set names enterprise_admin.
/// 3. everyone else must be named in the required set.
///
/// This is deliberately not a numeric seniority comparison: admin clears
/// a staff-only gate by rule 2, but never an enterprise_admin gate.
pub fn authorize(actor: Role, required: &[Role]) -> Result<(), PolicyError> {
    if actor == Role::EnterpriseAdmin {
        return Ok(());
    }
    if actor == Role::Admin {
        if required.contains(&Role::EnterpriseAdmin) {
            return Err(PolicyError::Denied(
                "enterprise_admin required".into(),
            ));
        }
        return Ok(());
    }
    if required.contains(&actor) {
        return Ok(());
    }
    Err(PolicyError::Denied(format!(
        "role {actor} is not permitted"
    )))
}

/// Read access to a single change request: the owner, or any elevated role.
pub fn can_view(actor_role: Role, actor: &UserId, owner: &UserId) -> bool {
    actor == owner
        || matches!(
            actor_role,
            Role::Admin | Role::Staff | Role::Editor | Role::EnterpriseAdmin
        )
}

/// Write access mirrors read access: the owner, or any elevated role.
pub fn can_edit(actor_role: Role, actor: &UserId, owner: &UserId) -> bool {
    can_view(actor_role, actor, owner)
}

/// Delete is narrower than edit: staff and editor may update a change
/// request but may not remove it.
pub fn can_delete(actor_role: Role, actor: &UserId, owner: &UserId) -> bool {
    actor == owner || matches!(actor_role, Role::Admin | Role::EnterpriseAdmin)
}
