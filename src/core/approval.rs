use crate::core::{
    error::CoreError,
    events::DomainEvent,
    visibility::{can_approve, can_see_owner},
};
use crate::model::{
    leave_request::{LeaveEntry, LeaveRequest, LeaveType},
    project::Project,
    status::ApprovalStatus,
    timesheet::{ProjectWork, Timesheet},
    user::User,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Candidate timesheet sent by a client. Validated before it enters the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetDraft {
    #[schema(example = "2023-10-26", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:00")]
    pub in_time: String,
    #[schema(example = "17:00")]
    pub out_time: String,
    pub project_work: Vec<ProjectWork>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveDraft {
    pub leave_entries: Vec<LeaveEntry>,
    #[schema(example = "Doctor appointment.")]
    pub reason: String,
}

/// The two legal terminal outcomes of a review.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub fn status(&self) -> ApprovalStatus {
        match self {
            ReviewDecision::Approved => ApprovalStatus::Approved,
            ReviewDecision::Rejected => ApprovalStatus::Rejected,
        }
    }
}

fn validate_timesheet_draft(draft: &TimesheetDraft, projects: &[Project]) -> Result<(), CoreError> {
    if draft.project_work.is_empty()
        || draft.project_work.iter().all(|pw| pw.work_entries.is_empty())
    {
        return Err(CoreError::validation(
            "timesheet must contain at least one work entry",
        ));
    }
    for pw in &draft.project_work {
        if !projects.iter().any(|p| p.id == pw.project_id) {
            return Err(CoreError::not_found(format!("project {}", pw.project_id)));
        }
        for entry in &pw.work_entries {
            if entry.hours <= 0.0 {
                return Err(CoreError::validation("work entry hours must be positive"));
            }
            if entry.description.trim().is_empty() {
                return Err(CoreError::validation(
                    "every work entry needs a description",
                ));
            }
        }
    }
    Ok(())
}

fn validate_leave_draft(draft: &LeaveDraft) -> Result<(), CoreError> {
    if draft.leave_entries.is_empty() {
        return Err(CoreError::validation(
            "leave request must contain at least one leave day",
        ));
    }
    if draft.reason.trim().is_empty() {
        return Err(CoreError::validation("leave request needs a reason"));
    }
    for entry in &draft.leave_entries {
        match entry.leave_type {
            LeaveType::HalfDay if entry.half_day_session.is_none() => {
                return Err(CoreError::validation(
                    "half day leave needs a session (first or second half)",
                ));
            }
            LeaveType::FullDay if entry.half_day_session.is_some() => {
                return Err(CoreError::validation(
                    "full day leave must not carry a half day session",
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Creates a new Pending timesheet for the owner. If the owner reports to a
/// manager, a submission event for that manager is returned alongside.
pub fn submit_timesheet(
    owner: &User,
    id: u64,
    draft: TimesheetDraft,
    projects: &[Project],
) -> Result<(Timesheet, Vec<DomainEvent>), CoreError> {
    validate_timesheet_draft(&draft, projects)?;

    let timesheet = Timesheet {
        id,
        user_id: owner.id,
        date: draft.date,
        in_time: draft.in_time,
        out_time: draft.out_time,
        project_work: draft.project_work,
        status: ApprovalStatus::Pending,
        approver_id: None,
    };
    let events = owner
        .manager_id
        .map(|manager_id| DomainEvent::TimesheetSubmitted {
            manager_id,
            owner_name: owner.name.clone(),
        })
        .into_iter()
        .collect();
    Ok((timesheet, events))
}

/// Replaces a Pending timesheet with a new draft. Status and approver are
/// taken from the stored record, never from the client.
pub fn edit_timesheet(
    owner: &User,
    existing: &Timesheet,
    draft: TimesheetDraft,
    projects: &[Project],
) -> Result<Timesheet, CoreError> {
    if existing.user_id != owner.id {
        return Err(CoreError::authorization(
            "only the owner may edit a timesheet",
        ));
    }
    if existing.status != ApprovalStatus::Pending {
        return Err(CoreError::invalid_state(format!(
            "timesheet is {}; only pending timesheets can be edited",
            existing.status
        )));
    }
    validate_timesheet_draft(&draft, projects)?;

    Ok(Timesheet {
        id: existing.id,
        user_id: existing.user_id,
        date: draft.date,
        in_time: draft.in_time,
        out_time: draft.out_time,
        project_work: draft.project_work,
        status: existing.status,
        approver_id: existing.approver_id,
    })
}

/// The only path that sets `approver_id`. Pending -> Approved | Rejected,
/// no transition out of a terminal state.
pub fn review_timesheet(
    approver: &User,
    existing: &Timesheet,
    decision: ReviewDecision,
    users: &[User],
) -> Result<(Timesheet, Vec<DomainEvent>), CoreError> {
    if !can_approve(approver) {
        return Err(CoreError::authorization(format!(
            "{} role cannot approve or reject",
            approver.role
        )));
    }
    if !can_see_owner(approver, existing.user_id, users) {
        return Err(CoreError::authorization(
            "timesheet is outside your review scope",
        ));
    }
    if existing.status.is_terminal() {
        return Err(CoreError::invalid_state(format!(
            "timesheet is already {}",
            existing.status
        )));
    }

    let status = decision.status();
    let reviewed = Timesheet {
        status,
        approver_id: Some(approver.id),
        ..existing.clone()
    };
    let events = vec![DomainEvent::TimesheetReviewed {
        owner_id: existing.user_id,
        date: existing.date,
        status,
        approver_name: approver.name.clone(),
    }];
    Ok((reviewed, events))
}

pub fn submit_leave_request(
    owner: &User,
    id: u64,
    draft: LeaveDraft,
) -> Result<(LeaveRequest, Vec<DomainEvent>), CoreError> {
    validate_leave_draft(&draft)?;

    let request = LeaveRequest {
        id,
        user_id: owner.id,
        leave_entries: draft.leave_entries,
        reason: draft.reason,
        status: ApprovalStatus::Pending,
        approver_id: None,
    };
    let events = owner
        .manager_id
        .map(|manager_id| DomainEvent::LeaveSubmitted {
            manager_id,
            owner_name: owner.name.clone(),
        })
        .into_iter()
        .collect();
    Ok((request, events))
}

pub fn edit_leave_request(
    owner: &User,
    existing: &LeaveRequest,
    draft: LeaveDraft,
) -> Result<LeaveRequest, CoreError> {
    if existing.user_id != owner.id {
        return Err(CoreError::authorization(
            "only the owner may edit a leave request",
        ));
    }
    if existing.status != ApprovalStatus::Pending {
        return Err(CoreError::invalid_state(format!(
            "leave request is {}; only pending requests can be edited",
            existing.status
        )));
    }
    validate_leave_draft(&draft)?;

    Ok(LeaveRequest {
        id: existing.id,
        user_id: existing.user_id,
        leave_entries: draft.leave_entries,
        reason: draft.reason,
        status: existing.status,
        approver_id: existing.approver_id,
    })
}

pub fn review_leave_request(
    approver: &User,
    existing: &LeaveRequest,
    decision: ReviewDecision,
    users: &[User],
) -> Result<(LeaveRequest, Vec<DomainEvent>), CoreError> {
    if !can_approve(approver) {
        return Err(CoreError::authorization(format!(
            "{} role cannot approve or reject",
            approver.role
        )));
    }
    if !can_see_owner(approver, existing.user_id, users) {
        return Err(CoreError::authorization(
            "leave request is outside your review scope",
        ));
    }
    if existing.status.is_terminal() {
        return Err(CoreError::invalid_state(format!(
            "leave request is already {}",
            existing.status
        )));
    }

    let status = decision.status();
    let reviewed = LeaveRequest {
        status,
        approver_id: Some(approver.id),
        ..existing.clone()
    };
    let events = vec![DomainEvent::LeaveReviewed {
        owner_id: existing.user_id,
        date: existing.first_date(),
        status,
        approver_name: approver.name.clone(),
    }];
    Ok((reviewed, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        leave_request::HalfDaySession, project::ProjectStatus, role::Role, timesheet::WorkEntry,
    };

    fn user(id: u64, role: Role, manager_id: Option<u64>) -> User {
        User {
            id,
            name: format!("user-{id}"),
            email: format!("user{id}@example.com"),
            password: String::new(),
            role,
            manager_id,
            company: "Acme".to_string(),
        }
    }

    fn project(id: u64) -> Project {
        Project {
            id,
            name: format!("project-{id}"),
            description: String::new(),
            manager_id: 3,
            team_leader_id: None,
            team_ids: vec![1],
            customer_name: "Customer".into(),
            job_name: "Job".into(),
            estimated_hours: 100.0,
            actual_hours: 0.0,
            company: "Acme".to_string(),
            status: ProjectStatus::InProgress,
        }
    }

    fn draft(hours: &[f64]) -> TimesheetDraft {
        TimesheetDraft {
            date: "2023-10-26".parse().unwrap(),
            in_time: "09:00".into(),
            out_time: "17:00".into(),
            project_work: vec![ProjectWork {
                project_id: 1,
                work_entries: hours
                    .iter()
                    .map(|&h| WorkEntry {
                        description: "work".into(),
                        hours: h,
                    })
                    .collect(),
            }],
        }
    }

    fn leave_draft() -> LeaveDraft {
        LeaveDraft {
            leave_entries: vec![LeaveEntry {
                date: "2023-11-10".parse().unwrap(),
                leave_type: LeaveType::FullDay,
                half_day_session: None,
            }],
            reason: "Vacation.".into(),
        }
    }

    #[test]
    fn submit_creates_pending_and_notifies_manager() {
        let owner = user(1, Role::Employee, Some(7));
        let (ts, events) = submit_timesheet(&owner, 10, draft(&[5.0, 3.0]), &[project(1)]).unwrap();
        assert_eq!(ts.status, ApprovalStatus::Pending);
        assert_eq!(ts.approver_id, None);
        assert_eq!(ts.total_hours(), 8.0);
        assert_eq!(
            events,
            vec![DomainEvent::TimesheetSubmitted {
                manager_id: 7,
                owner_name: owner.name.clone(),
            }]
        );
    }

    #[test]
    fn submit_without_manager_emits_nothing() {
        let owner = user(3, Role::Manager, None);
        let (_, events) = submit_timesheet(&owner, 10, draft(&[8.0]), &[project(1)]).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn empty_work_entries_are_rejected() {
        let owner = user(1, Role::Employee, Some(7));
        let err = submit_timesheet(&owner, 10, draft(&[]), &[project(1)]).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn non_positive_hours_are_rejected() {
        let owner = user(1, Role::Employee, Some(7));
        let err = submit_timesheet(&owner, 10, draft(&[5.0, 0.0]), &[project(1)]).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn unknown_project_is_not_found() {
        let owner = user(1, Role::Employee, Some(7));
        let err = submit_timesheet(&owner, 10, draft(&[5.0]), &[]).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn manager_approval_stamps_approver_and_notifies_owner() {
        // Scenario: pending timesheet with 5 + 3 hours approved by manager 3.
        let owner = user(1, Role::Employee, Some(7));
        let manager = user(3, Role::Manager, None);
        let users = vec![owner.clone(), manager.clone()];
        let (ts, _) = submit_timesheet(&owner, 10, draft(&[5.0, 3.0]), &[project(1)]).unwrap();

        let (reviewed, events) =
            review_timesheet(&manager, &ts, ReviewDecision::Approved, &users).unwrap();
        assert_eq!(reviewed.status, ApprovalStatus::Approved);
        assert_eq!(reviewed.approver_id, Some(3));
        assert_eq!(
            events,
            vec![DomainEvent::TimesheetReviewed {
                owner_id: 1,
                date: ts.date,
                status: ApprovalStatus::Approved,
                approver_name: manager.name.clone(),
            }]
        );
    }

    #[test]
    fn employee_cannot_review() {
        let owner = user(1, Role::Employee, Some(7));
        let peer = user(2, Role::Employee, Some(7));
        let users = vec![owner.clone(), peer.clone()];
        let (ts, _) = submit_timesheet(&owner, 10, draft(&[5.0]), &[project(1)]).unwrap();
        let err = review_timesheet(&peer, &ts, ReviewDecision::Approved, &users).unwrap_err();
        assert!(matches!(err, CoreError::Authorization { .. }));
    }

    #[test]
    fn admin_cannot_review_despite_company_visibility() {
        let owner = user(1, Role::Employee, Some(7));
        let admin = user(4, Role::Admin, None);
        let users = vec![owner.clone(), admin.clone()];
        let (ts, _) = submit_timesheet(&owner, 10, draft(&[5.0]), &[project(1)]).unwrap();
        let err = review_timesheet(&admin, &ts, ReviewDecision::Approved, &users).unwrap_err();
        assert!(matches!(err, CoreError::Authorization { .. }));
    }

    #[test]
    fn team_leader_cannot_review_outside_direct_reports() {
        let owner = user(2, Role::Employee, Some(3)); // reports to the manager
        let leader = user(7, Role::TeamLeader, Some(3));
        let users = vec![owner.clone(), leader.clone()];
        let (ts, _) = submit_timesheet(&owner, 10, draft(&[5.0]), &[project(1)]).unwrap();
        let err = review_timesheet(&leader, &ts, ReviewDecision::Approved, &users).unwrap_err();
        assert!(matches!(err, CoreError::Authorization { .. }));
    }

    #[test]
    fn terminal_states_cannot_transition_again() {
        let owner = user(1, Role::Employee, Some(7));
        let manager = user(3, Role::Manager, None);
        let users = vec![owner.clone(), manager.clone()];
        let (ts, _) = submit_timesheet(&owner, 10, draft(&[5.0]), &[project(1)]).unwrap();
        let (approved, _) =
            review_timesheet(&manager, &ts, ReviewDecision::Approved, &users).unwrap();
        let err =
            review_timesheet(&manager, &approved, ReviewDecision::Rejected, &users).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[test]
    fn editing_an_approved_timesheet_is_invalid_state() {
        let owner = user(1, Role::Employee, Some(7));
        let manager = user(3, Role::Manager, None);
        let users = vec![owner.clone(), manager.clone()];
        let (ts, _) = submit_timesheet(&owner, 10, draft(&[5.0]), &[project(1)]).unwrap();
        let (approved, _) =
            review_timesheet(&manager, &ts, ReviewDecision::Approved, &users).unwrap();
        let err = edit_timesheet(&owner, &approved, draft(&[6.0]), &[project(1)]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[test]
    fn owner_edit_keeps_status_and_approver_untouched() {
        let owner = user(1, Role::Employee, Some(7));
        let (ts, _) = submit_timesheet(&owner, 10, draft(&[5.0]), &[project(1)]).unwrap();
        let edited = edit_timesheet(&owner, &ts, draft(&[6.0]), &[project(1)]).unwrap();
        assert_eq!(edited.id, ts.id);
        assert_eq!(edited.status, ApprovalStatus::Pending);
        assert_eq!(edited.approver_id, None);
        assert_eq!(edited.total_hours(), 6.0);
    }

    #[test]
    fn empty_leave_entries_are_rejected() {
        let owner = user(1, Role::Employee, Some(7));
        let mut d = leave_draft();
        d.leave_entries.clear();
        let err = submit_leave_request(&owner, 10, d).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn half_day_without_session_is_rejected() {
        let owner = user(1, Role::Employee, Some(7));
        let mut d = leave_draft();
        d.leave_entries[0].leave_type = LeaveType::HalfDay;
        let err = submit_leave_request(&owner, 10, d).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn full_day_with_session_is_rejected() {
        let owner = user(1, Role::Employee, Some(7));
        let mut d = leave_draft();
        d.leave_entries[0].half_day_session = Some(HalfDaySession::FirstHalf);
        let err = submit_leave_request(&owner, 10, d).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn leave_review_uses_the_earliest_entry_date() {
        let owner = user(1, Role::Employee, Some(7));
        let manager = user(3, Role::Manager, None);
        let users = vec![owner.clone(), manager.clone()];
        let mut d = leave_draft();
        d.leave_entries.push(LeaveEntry {
            date: "2023-11-08".parse().unwrap(),
            leave_type: LeaveType::FullDay,
            half_day_session: None,
        });
        let (request, _) = submit_leave_request(&owner, 10, d).unwrap();
        let (_, events) =
            review_leave_request(&manager, &request, ReviewDecision::Approved, &users).unwrap();
        match &events[0] {
            DomainEvent::LeaveReviewed { date, .. } => {
                assert_eq!(*date, Some("2023-11-08".parse().unwrap()));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
