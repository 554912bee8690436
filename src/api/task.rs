use crate::auth::auth::AuthUser;
use crate::core::{error::CoreError, events, events::DomainEvent};
use crate::model::role::VisibilityScope;
use crate::model::task::{Task, TaskStatus};
use crate::store::Store;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

fn storage_error(e: anyhow::Error) -> actix_web::Error {
    error!(error = %e, "Store write failed");
    actix_web::error::ErrorInternalServerError("Storage error")
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub project_id: u64,
    #[schema(example = "Design new landing page")]
    pub title: String,
    pub description: String,
    pub assigned_to: Vec<u64>,
    pub status: TaskStatus,
    pub deadline: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusUpdate {
    pub status: TaskStatus,
}

fn completion_date_for(status: TaskStatus, existing: Option<NaiveDate>) -> Option<NaiveDate> {
    match status {
        TaskStatus::Done => existing.or_else(|| Some(Utc::now().date_naive())),
        _ => None,
    }
}

/// List tasks visible to the caller
///
/// Self-scoped roles see only tasks assigned to them; everyone else sees
/// all tasks belonging to their company's projects.
#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    responses(
        (status = 200, description = "Visible tasks", body = [Task])
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn list_tasks(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    let data = store.snapshot();
    let actor = auth.current_user(&data)?;
    let company_project_ids: Vec<u64> = data
        .projects
        .iter()
        .filter(|p| p.company.eq_ignore_ascii_case(&actor.company))
        .map(|p| p.id)
        .collect();

    let self_only = actor.role.capabilities().scope == VisibilityScope::SelfOnly;
    let tasks: Vec<&Task> = data
        .tasks
        .iter()
        .filter(|t| company_project_ids.contains(&t.project_id))
        .filter(|t| !self_only || t.assigned_to.contains(&actor.id))
        .collect();
    Ok(HttpResponse::Ok().json(tasks))
}

/// Create a task
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = TaskDraft,
    responses(
        (status = 200, description = "Task created", body = Task),
        (status = 400, description = "Invalid draft"),
        (status = 403, description = "Manager/Admin only"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn create_task(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<TaskDraft>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;
    let draft = payload.into_inner();

    let result = store
        .update(|data| {
            let actor = auth.current_user(data)?;
            if draft.title.trim().is_empty() {
                return Err(CoreError::validation("task title must not be empty"));
            }
            if !data.projects.iter().any(|p| {
                p.id == draft.project_id && p.company.eq_ignore_ascii_case(&actor.company)
            }) {
                return Err(CoreError::not_found(format!("project {}", draft.project_id)));
            }
            let task = Task {
                id: data.next_task_id(),
                project_id: draft.project_id,
                title: draft.title,
                description: draft.description,
                assigned_to: draft.assigned_to,
                status: draft.status,
                deadline: draft.deadline,
                completion_date: completion_date_for(draft.status, None),
            };

            let events: Vec<DomainEvent> = task
                .assigned_to
                .iter()
                .map(|&user_id| DomainEvent::TaskAssigned {
                    user_id,
                    task_title: task.title.clone(),
                })
                .collect();
            let notifications = events::dispatch(&events, data.next_notification_id(), Utc::now());
            data.notifications.extend(notifications);
            data.tasks.push(task.clone());
            Ok(task)
        })
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(result?))
}

/// Update a task
///
/// Users added to the assignee list get an assignment notification;
/// existing assignees are not re-notified.
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}",
    params(("id" = u64, Path, description = "Task ID")),
    request_body = TaskDraft,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 403, description = "Manager/Admin only"),
        (status = 404, description = "Task not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn update_task(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
    payload: web::Json<TaskDraft>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;
    let id = path.into_inner();
    let draft = payload.into_inner();

    let result = store
        .update(|data| {
            let actor = auth.current_user(data)?;
            let existing = find_company_task(data, id, &actor.company)?;
            if draft.title.trim().is_empty() {
                return Err(CoreError::validation("task title must not be empty"));
            }

            let newly_assigned: Vec<u64> = draft
                .assigned_to
                .iter()
                .copied()
                .filter(|id| !existing.assigned_to.contains(id))
                .collect();

            let updated = Task {
                id: existing.id,
                project_id: existing.project_id,
                title: draft.title,
                description: draft.description,
                assigned_to: draft.assigned_to,
                status: draft.status,
                deadline: draft.deadline,
                completion_date: completion_date_for(draft.status, existing.completion_date),
            };

            let events: Vec<DomainEvent> = newly_assigned
                .iter()
                .map(|&user_id| DomainEvent::TaskAssigned {
                    user_id,
                    task_title: updated.title.clone(),
                })
                .collect();
            let notifications = events::dispatch(&events, data.next_notification_id(), Utc::now());
            data.notifications.extend(notifications);
            data.tasks = data
                .tasks
                .iter()
                .map(|t| if t.id == id { updated.clone() } else { t.clone() })
                .collect();
            Ok(updated)
        })
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(result?))
}

/// Update a task's status
///
/// Available to assignees as well as managers; moving a task to Done
/// stamps the completion date, moving it back clears it.
#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}/status",
    params(("id" = u64, Path, description = "Task ID")),
    request_body = TaskStatusUpdate,
    responses(
        (status = 200, description = "Status updated", body = Task),
        (status = 403, description = "Not an assignee"),
        (status = 404, description = "Task not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn update_task_status(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
    payload: web::Json<TaskStatusUpdate>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let next_status = payload.into_inner().status;

    let result = store
        .update(|data| {
            let actor = auth.current_user(data)?;
            let existing = find_company_task(data, id, &actor.company)?;
            let is_assignee = existing.assigned_to.contains(&actor.id);
            if !is_assignee && !actor.role.capabilities().can_approve {
                return Err(CoreError::authorization(
                    "only assignees or approvers can update task status",
                ));
            }
            let updated = Task {
                status: next_status,
                completion_date: completion_date_for(next_status, existing.completion_date),
                ..existing
            };
            data.tasks = data
                .tasks
                .iter()
                .map(|t| if t.id == id { updated.clone() } else { t.clone() })
                .collect();
            Ok(updated)
        })
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(result?))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    params(("id" = u64, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 403, description = "Manager/Admin only"),
        (status = 404, description = "Task not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Task"
)]
pub async fn delete_task(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;
    let id = path.into_inner();

    let result = store
        .update(|data| {
            let actor = auth.current_user(data)?;
            find_company_task(data, id, &actor.company)?;
            data.tasks.retain(|t| t.id != id);
            Ok::<_, CoreError>(())
        })
        .map_err(storage_error)?;

    result?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}

fn find_company_task(
    data: &crate::store::AppData,
    id: u64,
    company: &str,
) -> Result<Task, CoreError> {
    let task = data
        .tasks
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .ok_or_else(|| CoreError::not_found(format!("task {id}")))?;
    let in_company = data
        .projects
        .iter()
        .any(|p| p.id == task.project_id && p.company.eq_ignore_ascii_case(company));
    if !in_company {
        return Err(CoreError::not_found(format!("task {id}")));
    }
    Ok(task)
}
