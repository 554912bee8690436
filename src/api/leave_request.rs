use crate::auth::auth::AuthUser;
use crate::core::{
    approval::{self, LeaveDraft, ReviewDecision},
    error::CoreError,
    events, visibility,
};
use crate::model::leave_request::LeaveRequest;
use crate::store::Store;
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

fn storage_error(e: anyhow::Error) -> actix_web::Error {
    error!(error = %e, "Store write failed");
    actix_web::error::ErrorInternalServerError("Storage error")
}

/// List own leave requests
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    responses(
        (status = 200, description = "The caller's own leave requests", body = [LeaveRequest])
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_my_leave_requests(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    let data = store.snapshot();
    let mine: Vec<&LeaveRequest> = data
        .leave_requests
        .iter()
        .filter(|l| l.user_id == auth.user_id)
        .collect();
    Ok(HttpResponse::Ok().json(mine))
}

/// Submit a leave request
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body = LeaveDraft,
    responses(
        (status = 200, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Malformed draft")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn submit_leave_request(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<LeaveDraft>,
) -> actix_web::Result<impl Responder> {
    let draft = payload.into_inner();
    let result = store
        .update(|data| {
            let owner = auth.current_user(data)?;
            let (request, pending_events) =
                approval::submit_leave_request(&owner, data.next_leave_request_id(), draft)?;
            let notifications =
                events::dispatch(&pending_events, data.next_notification_id(), Utc::now());
            data.leave_requests.push(request.clone());
            data.notifications.extend(notifications);
            Ok::<_, CoreError>(request)
        })
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(result?))
}

/// Edit a pending leave request
#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}",
    params(("id" = u64, Path, description = "Leave request ID")),
    request_body = LeaveDraft,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveRequest),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request is no longer pending")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn edit_leave_request(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
    payload: web::Json<LeaveDraft>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let draft = payload.into_inner();
    let result = store
        .update(|data| {
            let owner = auth.current_user(data)?;
            let existing = data
                .leave_requests
                .iter()
                .find(|l| l.id == id)
                .cloned()
                .ok_or_else(|| CoreError::not_found(format!("leave request {id}")))?;
            let edited = approval::edit_leave_request(&owner, &existing, draft)?;
            data.leave_requests = data
                .leave_requests
                .iter()
                .map(|l| if l.id == id { edited.clone() } else { l.clone() })
                .collect();
            Ok::<_, CoreError>(edited)
        })
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(result?))
}

/// Review-view row: the raw record plus the fields the team listing shows.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLeaveRequest {
    #[serde(flatten)]
    pub leave_request: LeaveRequest,
    #[schema(example = "Omar Haddad")]
    pub owner_name: String,
    /// Full days count 1, half days 0.5.
    pub total_days: f64,
}

/// Leave requests awaiting the caller's review
#[utoipa::path(
    get,
    path = "/api/v1/leave/review",
    responses(
        (status = 200, description = "Leave requests visible to the caller for review", body = [ReviewLeaveRequest])
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn review_list(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    let data = store.snapshot();
    let actor = auth.current_user(&data)?;
    let rows: Vec<ReviewLeaveRequest> =
        visibility::visible_leave_requests(&actor, &data.leave_requests, &data.users)
            .into_iter()
            .map(|l| ReviewLeaveRequest {
                owner_name: data.user_name(l.user_id),
                total_days: l.total_days(),
                leave_request: l.clone(),
            })
            .collect();
    Ok(HttpResponse::Ok().json(rows))
}

async fn review(
    auth: AuthUser,
    store: web::Data<Store>,
    id: u64,
    decision: ReviewDecision,
) -> actix_web::Result<HttpResponse> {
    let result = store
        .update(|data| {
            let approver = auth.current_user(data)?;
            let existing = data
                .leave_requests
                .iter()
                .find(|l| l.id == id)
                .cloned()
                .ok_or_else(|| CoreError::not_found(format!("leave request {id}")))?;
            let (reviewed, pending_events) =
                approval::review_leave_request(&approver, &existing, decision, &data.users)?;
            let notifications =
                events::dispatch(&pending_events, data.next_notification_id(), Utc::now());
            data.leave_requests = data
                .leave_requests
                .iter()
                .map(|l| if l.id == id { reviewed.clone() } else { l.clone() })
                .collect();
            data.notifications.extend(notifications);
            Ok::<_, CoreError>(reviewed)
        })
        .map_err(storage_error)?;

    let reviewed = result?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Leave Request {}", reviewed.status),
        "leaveRequest": reviewed
    })))
}

/// Approve a pending leave request
#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}/approve",
    params(("id" = u64, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request approved"),
        (status = 403, description = "Caller may not approve this request"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave_request(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    review(auth, store, path.into_inner(), ReviewDecision::Approved).await
}

/// Reject a pending leave request
#[utoipa::path(
    put,
    path = "/api/v1/leave/{id}/reject",
    params(("id" = u64, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request rejected"),
        (status = 403, description = "Caller may not reject this request"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave_request(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    review(auth, store, path.into_inner(), ReviewDecision::Rejected).await
}
