use crate::model::{project::Project, status::ApprovalStatus, timesheet::Timesheet};

/// Sum of work-entry hours booked to a project across approved timesheets.
/// Pending and rejected timesheets never contribute, even transiently.
pub fn actual_hours(project_id: u64, timesheets: &[Timesheet]) -> f64 {
    timesheets
        .iter()
        .filter(|t| t.status == ApprovalStatus::Approved)
        .map(|t| t.hours_for_project(project_id))
        .sum()
}

/// Recomputes `actual_hours` for every project and returns only the projects
/// whose value actually changed, so callers never emit spurious updates.
/// Idempotent: a second run over the same timesheets returns nothing.
pub fn recompute_project_hours(timesheets: &[Timesheet], projects: &[Project]) -> Vec<Project> {
    projects
        .iter()
        .filter_map(|p| {
            let total = actual_hours(p.id, timesheets);
            (p.actual_hours != total).then(|| Project {
                actual_hours: total,
                ..p.clone()
            })
        })
        .collect()
}

/// Applies the recompute to a full project list, returning the new list and
/// whether anything changed. Convenience for the store write path.
pub fn apply_recompute(timesheets: &[Timesheet], projects: &[Project]) -> (Vec<Project>, bool) {
    let changed = recompute_project_hours(timesheets, projects);
    if changed.is_empty() {
        return (projects.to_vec(), false);
    }
    let merged = projects
        .iter()
        .map(|p| {
            changed
                .iter()
                .find(|c| c.id == p.id)
                .cloned()
                .unwrap_or_else(|| p.clone())
        })
        .collect();
    (merged, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        project::ProjectStatus,
        timesheet::{ProjectWork, WorkEntry},
    };

    fn project(id: u64, actual: f64) -> Project {
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
            actual_hours: actual,
            company: "Acme".into(),
            status: ProjectStatus::InProgress,
        }
    }

    fn timesheet(id: u64, status: ApprovalStatus, project_id: u64, hours: &[f64]) -> Timesheet {
        Timesheet {
            id,
            user_id: 1,
            date: "2023-10-26".parse().unwrap(),
            in_time: "09:00".into(),
            out_time: "17:00".into(),
            project_work: vec![ProjectWork {
                project_id,
                work_entries: hours
                    .iter()
                    .map(|&h| WorkEntry {
                        description: "work".into(),
                        hours: h,
                    })
                    .collect(),
            }],
            status,
            approver_id: None,
        }
    }

    #[test]
    fn only_approved_timesheets_count() {
        // One approved 8h sheet, one pending 4h sheet: total stays 8, not 12.
        let sheets = vec![
            timesheet(1, ApprovalStatus::Approved, 1, &[5.0, 3.0]),
            timesheet(2, ApprovalStatus::Pending, 1, &[4.0]),
            timesheet(3, ApprovalStatus::Rejected, 1, &[2.0]),
        ];
        assert_eq!(actual_hours(1, &sheets), 8.0);
    }

    #[test]
    fn recompute_reports_only_changed_projects() {
        let sheets = vec![timesheet(1, ApprovalStatus::Approved, 1, &[8.0])];
        let projects = vec![project(1, 0.0), project(2, 0.0)];
        let changed = recompute_project_hours(&sheets, &projects);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].id, 1);
        assert_eq!(changed[0].actual_hours, 8.0);
    }

    #[test]
    fn recompute_is_idempotent() {
        let sheets = vec![timesheet(1, ApprovalStatus::Approved, 1, &[8.0])];
        let projects = vec![project(1, 0.0)];
        let (once, changed) = apply_recompute(&sheets, &projects);
        assert!(changed);
        let (twice, changed_again) = apply_recompute(&sheets, &once);
        assert!(!changed_again);
        assert_eq!(once[0].actual_hours, twice[0].actual_hours);
    }

    #[test]
    fn hours_across_multiple_sheets_and_projects() {
        let sheets = vec![
            timesheet(1, ApprovalStatus::Approved, 1, &[4.0]),
            timesheet(2, ApprovalStatus::Approved, 1, &[1.5]),
            timesheet(3, ApprovalStatus::Approved, 2, &[8.0]),
        ];
        let projects = vec![project(1, 0.0), project(2, 0.0)];
        let (merged, _) = apply_recompute(&sheets, &projects);
        assert_eq!(merged[0].actual_hours, 5.5);
        assert_eq!(merged[1].actual_hours, 8.0);
    }

    #[test]
    fn stale_totals_are_corrected_downward() {
        // A previously approved sheet no longer exists; the stored 150 must drop.
        let projects = vec![project(1, 150.0)];
        let changed = recompute_project_hours(&[], &projects);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].actual_hours, 0.0);
    }
}
