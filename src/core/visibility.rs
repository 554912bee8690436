use crate::model::{
    leave_request::LeaveRequest,
    role::VisibilityScope,
    timesheet::Timesheet,
    user::User,
};
use std::collections::HashSet;

/// Ids of the users whose records the actor may see, per the actor's role
/// capabilities. Managers and admins see the whole company; team leaders see
/// direct reports only (one hop, not transitive); everyone sees themselves.
pub fn visible_owner_ids(actor: &User, users: &[User]) -> HashSet<u64> {
    match actor.role.capabilities().scope {
        VisibilityScope::Company => users
            .iter()
            .filter(|u| u.same_company(actor))
            .map(|u| u.id)
            .collect(),
        VisibilityScope::DirectReports => users
            .iter()
            .filter(|u| u.manager_id == Some(actor.id))
            .map(|u| u.id)
            .collect(),
        VisibilityScope::SelfOnly => HashSet::from([actor.id]),
    }
}

pub fn visible_timesheets<'a>(
    actor: &User,
    timesheets: &'a [Timesheet],
    users: &[User],
) -> Vec<&'a Timesheet> {
    let owners = visible_owner_ids(actor, users);
    timesheets
        .iter()
        .filter(|t| owners.contains(&t.user_id))
        .collect()
}

pub fn visible_leave_requests<'a>(
    actor: &User,
    leave_requests: &'a [LeaveRequest],
    users: &[User],
) -> Vec<&'a LeaveRequest> {
    let owners = visible_owner_ids(actor, users);
    leave_requests
        .iter()
        .filter(|l| owners.contains(&l.user_id))
        .collect()
}

/// Whether the actor may approve or reject at all. Admin is deliberately
/// excluded: it can view every company record but never decide.
pub fn can_approve(actor: &User) -> bool {
    actor.role.capabilities().can_approve
}

/// Whether a given record owner falls inside the actor's visible set.
pub fn can_see_owner(actor: &User, owner_id: u64, users: &[User]) -> bool {
    visible_owner_ids(actor, users).contains(&owner_id)
}
