use crate::auth::auth::AuthUser;
use crate::core::{error::CoreError, hours};
use crate::model::project::{Project, ProjectStatus};
use crate::store::Store;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

fn storage_error(e: anyhow::Error) -> actix_web::Error {
    error!(error = %e, "Store write failed");
    actix_web::error::ErrorInternalServerError("Storage error")
}

/// Client-supplied project fields. `actual_hours` is deliberately absent:
/// it is derived from approved timesheets and never accepted from clients.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    #[schema(example = "Project Phoenix")]
    pub name: String,
    pub description: String,
    /// Owning manager; defaults to the caller.
    pub manager_id: Option<u64>,
    pub team_leader_id: Option<u64>,
    pub team_ids: Vec<u64>,
    #[schema(example = "Innovate Corp")]
    pub customer_name: String,
    #[schema(example = "Phoenix Web App")]
    pub job_name: String,
    pub estimated_hours: f64,
    pub status: ProjectStatus,
}

/// List company projects
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    responses(
        (status = 200, description = "Projects in the caller's company", body = [Project])
    ),
    security(("bearer_auth" = [])),
    tag = "Project"
)]
pub async fn list_projects(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    let data = store.snapshot();
    let actor = auth.current_user(&data)?;
    let projects: Vec<&Project> = data
        .projects
        .iter()
        .filter(|p| p.company.eq_ignore_ascii_case(&actor.company))
        .collect();
    Ok(HttpResponse::Ok().json(projects))
}

/// Create a project
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = ProjectDraft,
    responses(
        (status = 200, description = "Project created", body = Project),
        (status = 400, description = "Invalid draft"),
        (status = 403, description = "Manager/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Project"
)]
pub async fn create_project(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<ProjectDraft>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;
    let draft = payload.into_inner();

    let result = store
        .update(|data| {
            let actor = auth.current_user(data)?;
            if draft.name.trim().is_empty() {
                return Err(CoreError::validation("project name must not be empty"));
            }
            if draft.estimated_hours < 0.0 {
                return Err(CoreError::validation("estimated hours cannot be negative"));
            }
            let id = data.next_project_id();
            let project = Project {
                id,
                name: draft.name,
                description: draft.description,
                manager_id: draft.manager_id.unwrap_or(actor.id),
                team_leader_id: draft.team_leader_id,
                team_ids: draft.team_ids,
                customer_name: draft.customer_name,
                job_name: draft.job_name,
                estimated_hours: draft.estimated_hours,
                // Ids can be reused after a delete, so a new project may
                // already have approved timesheet hours booked against it.
                actual_hours: hours::actual_hours(id, &data.timesheets),
                company: actor.company.clone(),
                status: draft.status,
            };
            data.projects.push(project.clone());
            Ok(project)
        })
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(result?))
}

/// Update a project
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    params(("id" = u64, Path, description = "Project ID")),
    request_body = ProjectDraft,
    responses(
        (status = 200, description = "Project updated", body = Project),
        (status = 403, description = "Manager/Admin only"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Project"
)]
pub async fn update_project(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
    payload: web::Json<ProjectDraft>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;
    let id = path.into_inner();
    let draft = payload.into_inner();

    let result = store
        .update(|data| {
            let actor = auth.current_user(data)?;
            let existing = data
                .projects
                .iter()
                .find(|p| p.id == id && p.company.eq_ignore_ascii_case(&actor.company))
                .cloned()
                .ok_or_else(|| CoreError::not_found(format!("project {id}")))?;
            if draft.name.trim().is_empty() {
                return Err(CoreError::validation("project name must not be empty"));
            }
            let updated = Project {
                id: existing.id,
                name: draft.name,
                description: draft.description,
                manager_id: draft.manager_id.unwrap_or(existing.manager_id),
                team_leader_id: draft.team_leader_id,
                team_ids: draft.team_ids,
                customer_name: draft.customer_name,
                job_name: draft.job_name,
                estimated_hours: draft.estimated_hours,
                // Derived field survives the edit; the aggregator owns it.
                actual_hours: existing.actual_hours,
                company: existing.company,
                status: draft.status,
            };
            data.projects = data
                .projects
                .iter()
                .map(|p| if p.id == id { updated.clone() } else { p.clone() })
                .collect();
            Ok(updated)
        })
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(result?))
}

/// Delete a project
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(("id" = u64, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Project"
)]
pub async fn delete_project(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();

    let result = store
        .update(|data| {
            let actor = auth.current_user(data)?;
            if !data
                .projects
                .iter()
                .any(|p| p.id == id && p.company.eq_ignore_ascii_case(&actor.company))
            {
                return Err(CoreError::not_found(format!("project {id}")));
            }
            data.projects.retain(|p| p.id != id);
            Ok(())
        })
        .map_err(storage_error)?;

    result?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}

/// Recompute actual hours for all projects
#[utoipa::path(
    post,
    path = "/api/v1/projects/recompute-hours",
    responses(
        (status = 200, description = "Projects whose totals changed", body = [Project]),
        (status = 403, description = "Manager/Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Project"
)]
pub async fn recompute_hours(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let result = store
        .update(|data| {
            let changed = hours::recompute_project_hours(&data.timesheets, &data.projects);
            for updated in &changed {
                if let Some(slot) = data.projects.iter_mut().find(|p| p.id == updated.id) {
                    *slot = updated.clone();
                }
            }
            Ok::<_, CoreError>(changed)
        })
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(result?))
}
