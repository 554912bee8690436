use crate::model::{notification::Notification, status::ApprovalStatus, user::User};
use chrono::{DateTime, NaiveDate, Utc};

/// Domain events produced by the pure operations. The state machine never
/// writes notifications itself; it returns these and a separate dispatch step
/// turns them into per-recipient Notification records.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    TimesheetSubmitted {
        manager_id: u64,
        owner_name: String,
    },
    TimesheetReviewed {
        owner_id: u64,
        date: NaiveDate,
        status: ApprovalStatus,
        approver_name: String,
    },
    LeaveSubmitted {
        manager_id: u64,
        owner_name: String,
    },
    LeaveReviewed {
        owner_id: u64,
        date: Option<NaiveDate>,
        status: ApprovalStatus,
        approver_name: String,
    },
    TaskAssigned {
        user_id: u64,
        task_title: String,
    },
    /// Fan-out: one notification per company member.
    Announcement {
        recipient_ids: Vec<u64>,
        title: String,
        message: String,
    },
}

fn notification(
    id: u64,
    user_id: u64,
    title: String,
    message: String,
    link_to: Option<&str>,
    is_announcement: bool,
    now: DateTime<Utc>,
) -> Notification {
    Notification {
        id,
        user_id,
        title,
        message,
        read: false,
        dismissed: false,
        created_at: now,
        link_to: link_to.map(str::to_string),
        is_announcement,
    }
}

/// Turns events into notification records with ids `first_id, first_id+1, ..`.
/// Pure with respect to the clock: `now` is injected by the caller.
pub fn dispatch(events: &[DomainEvent], first_id: u64, now: DateTime<Utc>) -> Vec<Notification> {
    let mut out: Vec<Notification> = Vec::new();
    let mut id = first_id;
    let mut push = |n: Notification| out.push(n);

    for event in events {
        match event {
            DomainEvent::TimesheetSubmitted {
                manager_id,
                owner_name,
            } => {
                push(notification(
                    id,
                    *manager_id,
                    "New Timesheet Submission".to_string(),
                    format!("{owner_name} has submitted a timesheet for review."),
                    Some("TEAM_TIMESHEETS"),
                    false,
                    now,
                ));
                id += 1;
            }
            DomainEvent::TimesheetReviewed {
                owner_id,
                date,
                status,
                approver_name,
            } => {
                push(notification(
                    id,
                    *owner_id,
                    format!("Timesheet {status}"),
                    format!(
                        "Your timesheet for {date} has been {} by {approver_name}.",
                        status.to_string().to_lowercase()
                    ),
                    Some("TIMESHEETS"),
                    false,
                    now,
                ));
                id += 1;
            }
            DomainEvent::LeaveSubmitted {
                manager_id,
                owner_name,
            } => {
                push(notification(
                    id,
                    *manager_id,
                    "New Leave Request".to_string(),
                    format!("{owner_name} has submitted a leave request for approval."),
                    Some("TEAM_LEAVE"),
                    false,
                    now,
                ));
                id += 1;
            }
            DomainEvent::LeaveReviewed {
                owner_id,
                date,
                status,
                approver_name,
            } => {
                let date = date.map(|d| d.to_string()).unwrap_or_default();
                push(notification(
                    id,
                    *owner_id,
                    format!("Leave Request {status}"),
                    format!(
                        "Your leave request for {date} has been {} by {approver_name}.",
                        status.to_string().to_lowercase()
                    ),
                    Some("LEAVE"),
                    false,
                    now,
                ));
                id += 1;
            }
            DomainEvent::TaskAssigned {
                user_id,
                task_title,
            } => {
                push(notification(
                    id,
                    *user_id,
                    "New Task Assigned".to_string(),
                    format!("You have been assigned a new task: \"{task_title}\"."),
                    Some("TASKS"),
                    false,
                    now,
                ));
                id += 1;
            }
            DomainEvent::Announcement {
                recipient_ids,
                title,
                message,
            } => {
                for recipient in recipient_ids {
                    push(notification(
                        id,
                        *recipient,
                        title.clone(),
                        message.clone(),
                        None,
                        true,
                        now,
                    ));
                    id += 1;
                }
            }
        }
    }
    out
}

/// Builds the announcement event for a sender: every user in the sender's
/// company receives a copy, the sender included.
pub fn announcement(sender: &User, users: &[User], title: &str, message: &str) -> DomainEvent {
    DomainEvent::Announcement {
        recipient_ids: users
            .iter()
            .filter(|u| u.same_company(sender))
            .map(|u| u.id)
            .collect(),
        title: title.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;

    fn now() -> DateTime<Utc> {
        "2023-10-26T09:00:00Z".parse().unwrap()
    }

    #[test]
    fn review_event_names_the_approver_and_date() {
        let events = [DomainEvent::TimesheetReviewed {
            owner_id: 1,
            date: "2023-10-26".parse().unwrap(),
            status: ApprovalStatus::Approved,
            approver_name: "Charlie Brown".to_string(),
        }];
        let notifications = dispatch(&events, 100, now());
        assert_eq!(notifications.len(), 1);
        let n = &notifications[0];
        assert_eq!(n.id, 100);
        assert_eq!(n.user_id, 1);
        assert_eq!(n.title, "Timesheet Approved");
        assert_eq!(
            n.message,
            "Your timesheet for 2023-10-26 has been approved by Charlie Brown."
        );
        assert_eq!(n.link_to.as_deref(), Some("TIMESHEETS"));
        assert!(!n.read && !n.dismissed && !n.is_announcement);
    }

    #[test]
    fn announcement_fans_out_with_distinct_ids() {
        let users: Vec<User> = (1..=3)
            .map(|id| User {
                id,
                name: format!("u{id}"),
                email: format!("u{id}@example.com"),
                password: String::new(),
                role: Role::Employee,
                manager_id: None,
                company: "Acme".to_string(),
            })
            .collect();
        let sender = &users[0];
        let event = announcement(sender, &users, "All hands", "Friday at noon.");
        let notifications = dispatch(&[event], 50, now());
        assert_eq!(notifications.len(), 3);
        let ids: Vec<u64> = notifications.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![50, 51, 52]);
        assert!(notifications.iter().all(|n| n.is_announcement));
    }

    #[test]
    fn submission_event_targets_the_manager() {
        let events = [DomainEvent::LeaveSubmitted {
            manager_id: 7,
            owner_name: "Alice Johnson".to_string(),
        }];
        let notifications = dispatch(&events, 1, now());
        assert_eq!(notifications[0].user_id, 7);
        assert_eq!(notifications[0].title, "New Leave Request");
        assert_eq!(notifications[0].link_to.as_deref(), Some("TEAM_LEAVE"));
    }
}
