use crate::auth::auth::AuthUser;
use crate::core::visibility;
use crate::model::status::ApprovalStatus;
use crate::store::Store;
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Pending timesheets awaiting the caller's review.
    pub pending_timesheet_count: usize,
    /// Pending leave requests awaiting the caller's review.
    pub pending_leave_count: usize,
    /// The caller's own unread notifications.
    pub unread_notification_count: usize,
}

/// Review workload summary
///
/// Pending counts cover the caller's visible scope and are zero for
/// roles that cannot approve, admins included.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    responses(
        (status = 200, description = "Counts for the caller", body = DashboardSummary)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn summary(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    let data = store.snapshot();
    let actor = auth.current_user(&data)?;

    let (pending_timesheet_count, pending_leave_count) = if visibility::can_approve(&actor) {
        let timesheets = visibility::visible_timesheets(&actor, &data.timesheets, &data.users);
        let leave = visibility::visible_leave_requests(&actor, &data.leave_requests, &data.users);
        (
            timesheets
                .iter()
                .filter(|t| t.status == ApprovalStatus::Pending)
                .count(),
            leave
                .iter()
                .filter(|l| l.status == ApprovalStatus::Pending)
                .count(),
        )
    } else {
        (0, 0)
    };

    let unread_notification_count = data
        .notifications
        .iter()
        .filter(|n| n.user_id == actor.id && !n.read && !n.dismissed)
        .count();

    Ok(HttpResponse::Ok().json(DashboardSummary {
        pending_timesheet_count,
        pending_leave_count,
        unread_notification_count,
    }))
}
