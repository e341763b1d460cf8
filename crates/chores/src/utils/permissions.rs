//! Permission checks on family membership.

use crate::entities::{Chore, Member};
use crate::types::{ChoreError, ChoreResult};

pub struct PermissionChecker;

impl PermissionChecker {
    pub fn can_manage_family(member: &Member) -> ChoreResult<()> {
        if member.is_active() && member.is_admin() {
            Ok(())
        } else {
            Err(ChoreError::forbidden("family admin role required"))
        }
    }

    pub fn can_submit(member: &Member, chore: &Chore) -> ChoreResult<()> {
        let assigned = chore.assignee_id.as_deref() == Some(member.id.as_str());
        if member.is_active() && (assigned || member.is_admin()) {
            Ok(())
        } else {
            Err(ChoreError::forbidden("only the assignee or an admin can submit"))
        }
    }
}
