use crate::api::dashboard::DashboardSummary;
use crate::api::leave_request::ReviewLeaveRequest;
use crate::api::notification::AnnouncementReq;
use crate::api::project::ProjectDraft;
use crate::api::task::{TaskDraft, TaskStatusUpdate};
use crate::api::timesheet::ReviewTimesheet;
use crate::api::user::{CreateUserReq, UpdateUserReq, UserResponse};
use crate::core::approval::{LeaveDraft, TimesheetDraft};
use crate::model::leave_request::{HalfDaySession, LeaveEntry, LeaveRequest, LeaveType};
use crate::model::notification::Notification;
use crate::model::project::{Project, ProjectStatus};
use crate::model::role::Role;
use crate::model::status::ApprovalStatus;
use crate::model::task::{Task, TaskStatus};
use crate::model::timesheet::{ProjectWork, Timesheet, WorkEntry};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Timesheet Pro API",
        version = "1.0.0",
        description = r#"
## Workforce Timesheet & Leave Tracking

This API powers a **workforce tracking** system covering daily timesheets, leave requests, projects and tasks within a company.

### 🔹 Key Features
- **Timesheets**
  - Submit daily timesheets, edit while pending, approve/reject as a manager
- **Leave Management**
  - Request full-day or half-day leave and review requests in your scope
- **Projects & Tasks**
  - Track projects with estimated vs. actual hours, assign tasks to the team
- **Notifications**
  - Review outcomes, task assignments and company-wide announcements

### 🔐 Security
All endpoints except signup/login are protected using **JWT Bearer authentication**.
Visibility is role-scoped: managers see their company, team leaders their
direct reports, employees only themselves.

### 📦 Response Format
- JSON-based RESTful responses

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::timesheet::list_my_timesheets,
        crate::api::timesheet::submit_timesheet,
        crate::api::timesheet::edit_timesheet,
        crate::api::timesheet::review_list,
        crate::api::timesheet::approve_timesheet,
        crate::api::timesheet::reject_timesheet,

        crate::api::leave_request::list_my_leave_requests,
        crate::api::leave_request::submit_leave_request,
        crate::api::leave_request::edit_leave_request,
        crate::api::leave_request::review_list,
        crate::api::leave_request::approve_leave_request,
        crate::api::leave_request::reject_leave_request,

        crate::api::project::list_projects,
        crate::api::project::create_project,
        crate::api::project::update_project,
        crate::api::project::delete_project,
        crate::api::project::recompute_hours,

        crate::api::task::list_tasks,
        crate::api::task::create_task,
        crate::api::task::update_task,
        crate::api::task::update_task_status,
        crate::api::task::delete_task,

        crate::api::user::list_users,
        crate::api::user::get_user,
        crate::api::user::create_user,
        crate::api::user::update_user,
        crate::api::user::delete_user,

        crate::api::notification::list_notifications,
        crate::api::notification::mark_read,
        crate::api::notification::mark_all_read,
        crate::api::notification::dismiss,
        crate::api::notification::dismiss_all,
        crate::api::notification::delete_notification,
        crate::api::notification::announce,

        crate::api::dashboard::summary
    ),
    components(
        schemas(
            Timesheet,
            ProjectWork,
            WorkEntry,
            TimesheetDraft,
            ReviewTimesheet,
            LeaveRequest,
            ReviewLeaveRequest,
            LeaveEntry,
            LeaveType,
            HalfDaySession,
            LeaveDraft,
            ApprovalStatus,
            Project,
            ProjectStatus,
            ProjectDraft,
            Task,
            TaskStatus,
            TaskDraft,
            TaskStatusUpdate,
            Role,
            UserResponse,
            CreateUserReq,
            UpdateUserReq,
            Notification,
            AnnouncementReq,
            DashboardSummary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Timesheet", description = "Timesheet submission and review APIs"),
        (name = "Leave", description = "Leave request and review APIs"),
        (name = "Project", description = "Project management APIs"),
        (name = "Task", description = "Task management APIs"),
        (name = "User", description = "Account management APIs"),
        (name = "Notification", description = "Notification and announcement APIs"),
        (name = "Dashboard", description = "Summary counters for the signed-in user"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
