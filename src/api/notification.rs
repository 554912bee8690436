use crate::auth::auth::AuthUser;
use crate::core::{error::CoreError, events};
use crate::model::notification::Notification;
use crate::store::Store;
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use utoipa::ToSchema;

fn storage_error(e: anyhow::Error) -> actix_web::Error {
    error!(error = %e, "Store write failed");
    actix_web::error::ErrorInternalServerError("Storage error")
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementReq {
    #[schema(example = "Office closed Friday")]
    pub title: String,
    pub message: String,
}

/// List the caller's notifications
///
/// Dismissed notifications are excluded; the rest come back newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    responses(
        (status = 200, description = "Notifications, newest first", body = [Notification])
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn list_notifications(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    let data = store.snapshot();
    let mut own: Vec<&Notification> = data
        .notifications
        .iter()
        .filter(|n| n.user_id == auth.user_id && !n.dismissed)
        .collect();
    own.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(HttpResponse::Ok().json(own))
}

/// Mark one notification as read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = u64, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read", body = Notification),
        (status = 404, description = "Not the caller's notification")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn mark_read(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let result = store
        .update(|data| mutate_own(data, auth.user_id, id, |n| n.read = true))
        .map_err(storage_error)?;
    Ok(HttpResponse::Ok().json(result?))
}

/// Mark all of the caller's notifications as read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "All marked read")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn mark_all_read(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    store
        .update(|data| {
            for n in data.notifications.iter_mut() {
                if n.user_id == auth.user_id {
                    n.read = true;
                }
            }
            Ok::<_, CoreError>(())
        })
        .map_err(storage_error)??;
    Ok(HttpResponse::Ok().json(json!({ "message": "All notifications marked as read" })))
}

/// Dismiss one notification
///
/// Dismissal also marks the notification read, so it stops counting
/// toward the unread badge.
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/dismiss",
    params(("id" = u64, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Dismissed", body = Notification),
        (status = 404, description = "Not the caller's notification")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn dismiss(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let result = store
        .update(|data| {
            mutate_own(data, auth.user_id, id, |n| {
                n.dismissed = true;
                n.read = true;
            })
        })
        .map_err(storage_error)?;
    Ok(HttpResponse::Ok().json(result?))
}

/// Dismiss all of the caller's notifications
#[utoipa::path(
    put,
    path = "/api/v1/notifications/dismiss-all",
    responses(
        (status = 200, description = "All dismissed")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn dismiss_all(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    store
        .update(|data| {
            for n in data.notifications.iter_mut() {
                if n.user_id == auth.user_id {
                    n.dismissed = true;
                    n.read = true;
                }
            }
            Ok::<_, CoreError>(())
        })
        .map_err(storage_error)??;
    Ok(HttpResponse::Ok().json(json!({ "message": "All notifications dismissed" })))
}

/// Delete one notification
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    params(("id" = u64, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Not the caller's notification")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn delete_notification(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let result = store
        .update(|data| {
            if !data
                .notifications
                .iter()
                .any(|n| n.id == id && n.user_id == auth.user_id)
            {
                return Err(CoreError::not_found(format!("notification {id}")));
            }
            data.notifications.retain(|n| n.id != id);
            Ok(())
        })
        .map_err(storage_error)?;
    result?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}

/// Broadcast an announcement to the caller's company
#[utoipa::path(
    post,
    path = "/api/v1/announcements",
    request_body = AnnouncementReq,
    responses(
        (status = 200, description = "Announcement delivered"),
        (status = 400, description = "Empty title or message"),
        (status = 403, description = "Leadership roles only")
    ),
    security(("bearer_auth" = [])),
    tag = "Notification"
)]
pub async fn announce(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<AnnouncementReq>,
) -> actix_web::Result<impl Responder> {
    let req = payload.into_inner();

    let result = store
        .update(move |data| {
            let sender = auth.current_user(data)?;
            if !sender.role.can_announce() {
                return Err(CoreError::authorization(
                    "only leadership roles can send announcements",
                ));
            }
            if req.title.trim().is_empty() || req.message.trim().is_empty() {
                return Err(CoreError::validation(
                    "announcement title and message must not be empty",
                ));
            }
            let event = events::announcement(&sender, &data.users, &req.title, &req.message);
            let delivered =
                events::dispatch(&[event], data.next_notification_id(), Utc::now());
            let count = delivered.len();
            data.notifications.extend(delivered);
            Ok(count)
        })
        .map_err(storage_error)?;

    let count = result?;
    info!(recipients = count, "Announcement delivered");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Announcement sent",
        "recipients": count
    })))
}

fn mutate_own(
    data: &mut crate::store::AppData,
    user_id: u64,
    id: u64,
    apply: impl FnOnce(&mut Notification),
) -> Result<Notification, CoreError> {
    let n = data
        .notifications
        .iter_mut()
        .find(|n| n.id == id && n.user_id == user_id)
        .ok_or_else(|| CoreError::not_found(format!("notification {id}")))?;
    apply(n);
    Ok(n.clone())
}
