use crate::types::ChangeRequest;
use crate::CoreError;

pub const MAX_TITLE_LEN: usize = 100;

/// Field-level checks applied at create and after every update merge.
pub fn validate_change_request(cr: &ChangeRequest) -> Result<(), CoreError> {
    if cr.title.trim().is_empty() {
        return Err(CoreError::Validation("title is required".into()));
    }
    if cr.title.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "title exceeds {MAX_TITLE_LEN} characters"
        )));
    }
    if cr.description.trim().is_empty() {
        return Err(CoreError::Validation("description is required".into()));
    }
    if cr.planned_end_ms < cr.planned_start_ms {
        return Err(CoreError::Validation(
            "planned end must not precede planned start".into(),
        ));
    }
    Ok(())
}
