use crate::auth::auth::AuthUser;
use crate::core::{
    approval::{self, ReviewDecision, TimesheetDraft},
    error::CoreError,
    events, hours, visibility,
};
use crate::model::project::Project;
use crate::model::timesheet::Timesheet;
use crate::store::{AppData, Store};
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

fn company_projects(data: &AppData, company: &str) -> Vec<Project> {
    data.projects
        .iter()
        .filter(|p| p.company.eq_ignore_ascii_case(company))
        .cloned()
        .collect()
}

/// Runs the aggregation pass after any timesheet mutation. Only projects
/// whose computed total changed are rewritten.
fn recompute_hours(data: &mut AppData) {
    let (projects, changed) = hours::apply_recompute(&data.timesheets, &data.projects);
    if changed {
        data.projects = projects;
    }
}

/// List own timesheets
#[utoipa::path(
    get,
    path = "/api/v1/timesheets",
    responses(
        (status = 200, description = "The caller's own timesheets", body = [Timesheet])
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
pub async fn list_my_timesheets(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    let data = store.snapshot();
    let mine: Vec<&Timesheet> = data
        .timesheets
        .iter()
        .filter(|t| t.user_id == auth.user_id)
        .collect();
    Ok(HttpResponse::Ok().json(mine))
}

/// Submit a new timesheet
#[utoipa::path(
    post,
    path = "/api/v1/timesheets",
    request_body = TimesheetDraft,
    responses(
        (status = 200, description = "Timesheet submitted", body = Timesheet),
        (status = 400, description = "Malformed draft"),
        (status = 404, description = "Referenced project does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
pub async fn submit_timesheet(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<TimesheetDraft>,
) -> actix_web::Result<impl Responder> {
    let draft = payload.into_inner();
    let result = store
        .update(|data| {
            let owner = auth.current_user(data)?;
            let projects = company_projects(data, &owner.company);
            let (timesheet, pending_events) =
                approval::submit_timesheet(&owner, data.next_timesheet_id(), draft, &projects)?;
            let notifications =
                events::dispatch(&pending_events, data.next_notification_id(), Utc::now());
            data.timesheets.push(timesheet.clone());
            data.notifications.extend(notifications);
            recompute_hours(data);
            Ok::<_, CoreError>(timesheet)
        })
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(result?))
}

/// Edit a pending timesheet
#[utoipa::path(
    put,
    path = "/api/v1/timesheets/{id}",
    params(("id" = u64, Path, description = "Timesheet ID")),
    request_body = TimesheetDraft,
    responses(
        (status = 200, description = "Timesheet updated", body = Timesheet),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Timesheet not found"),
        (status = 409, description = "Timesheet is no longer pending")
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
pub async fn edit_timesheet(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
    payload: web::Json<TimesheetDraft>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let draft = payload.into_inner();
    let result = store
        .update(|data| {
            let owner = auth.current_user(data)?;
            let existing = data
                .timesheets
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or_else(|| CoreError::not_found(format!("timesheet {id}")))?;
            let projects = company_projects(data, &owner.company);
            let edited = approval::edit_timesheet(&owner, &existing, draft, &projects)?;
            data.timesheets = data
                .timesheets
                .iter()
                .map(|t| if t.id == id { edited.clone() } else { t.clone() })
                .collect();
            recompute_hours(data);
            Ok::<_, CoreError>(edited)
        })
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(result?))
}

/// Review-view row: the raw record plus the fields the team listing shows.
/// Owner names fall back to "Unknown" when the account has been deleted.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewTimesheet {
    #[serde(flatten)]
    pub timesheet: Timesheet,
    #[schema(example = "Omar Haddad")]
    pub owner_name: String,
    pub total_hours: f64,
}

/// Timesheets awaiting the caller's review
#[utoipa::path(
    get,
    path = "/api/v1/timesheets/review",
    responses(
        (status = 200, description = "Timesheets visible to the caller for review", body = [ReviewTimesheet])
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
pub async fn review_list(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    let data = store.snapshot();
    let actor = auth.current_user(&data)?;
    let rows: Vec<ReviewTimesheet> =
        visibility::visible_timesheets(&actor, &data.timesheets, &data.users)
            .into_iter()
            .map(|t| ReviewTimesheet {
                owner_name: data.user_name(t.user_id),
                total_hours: t.total_hours(),
                timesheet: t.clone(),
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
                .timesheets
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or_else(|| CoreError::not_found(format!("timesheet {id}")))?;
            let (reviewed, pending_events) =
                approval::review_timesheet(&approver, &existing, decision, &data.users)?;
            let notifications =
                events::dispatch(&pending_events, data.next_notification_id(), Utc::now());
            data.timesheets = data
                .timesheets
                .iter()
                .map(|t| if t.id == id { reviewed.clone() } else { t.clone() })
                .collect();
            data.notifications.extend(notifications);
            recompute_hours(data);
            Ok::<_, CoreError>(reviewed)
        })
        .map_err(storage_error)?;

    let reviewed = result?;
    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Timesheet {}", reviewed.status),
        "timesheet": reviewed
    })))
}

/// Approve a pending timesheet
#[utoipa::path(
    put,
    path = "/api/v1/timesheets/{id}/approve",
    params(("id" = u64, Path, description = "Timesheet ID")),
    responses(
        (status = 200, description = "Timesheet approved"),
        (status = 403, description = "Caller may not approve this timesheet"),
        (status = 404, description = "Timesheet not found"),
        (status = 409, description = "Timesheet already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
pub async fn approve_timesheet(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    review(auth, store, path.into_inner(), ReviewDecision::Approved).await
}

/// Reject a pending timesheet
#[utoipa::path(
    put,
    path = "/api/v1/timesheets/{id}/reject",
    params(("id" = u64, Path, description = "Timesheet ID")),
    responses(
        (status = 200, description = "Timesheet rejected"),
        (status = 403, description = "Caller may not reject this timesheet"),
        (status = 404, description = "Timesheet not found"),
        (status = 409, description = "Timesheet already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Timesheet"
)]
pub async fn reject_timesheet(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    review(auth, store, path.into_inner(), ReviewDecision::Rejected).await
}
