use crate::auth::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::core::{error::CoreError, visibility};
use crate::model::role::Role;
use crate::model::user::User;
use crate::store::Store;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use utoipa::ToSchema;

fn storage_error(e: anyhow::Error) -> actix_web::Error {
    error!(error = %e, "Store write failed");
    actix_web::error::ErrorInternalServerError("Storage error")
}

/// Public view of an account. Password hashes never leave the store.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: u64,
    #[schema(example = "Dana Mitchell")]
    pub name: String,
    #[schema(example = "dana@innovate.example")]
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<u64>,
    pub company: String,
}

impl From<&User> for UserResponse {
    fn from(u: &User) -> Self {
        UserResponse {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role,
            manager_id: u.manager_id,
            company: u.company.clone(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserReq {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub manager_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Admin-only; ignored for other callers.
    pub role: Option<Role>,
    /// Admin-only; ignored for other callers.
    pub manager_id: Option<u64>,
}

/// List accounts in the caller's company
///
/// Team leaders get their direct reports (plus themselves); everyone
/// else gets the whole company roster.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Visible accounts", body = [UserResponse])
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn list_users(
    auth: AuthUser,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    let data = store.snapshot();
    let actor = auth.current_user(&data)?;

    let users: Vec<UserResponse> = match actor.role {
        Role::TeamLeader => {
            let visible = visibility::visible_owner_ids(&actor, &data.users);
            data.users
                .iter()
                .filter(|u| u.id == actor.id || visible.contains(&u.id))
                .map(UserResponse::from)
                .collect()
        }
        _ => data
            .users
            .iter()
            .filter(|u| u.same_company(&actor))
            .map(UserResponse::from)
            .collect(),
    };
    Ok(HttpResponse::Ok().json(users))
}

/// Fetch a single account
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = u64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account found", body = UserResponse),
        (status = 404, description = "No such account in the caller's company")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn get_user(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let data = store.snapshot();
    let actor = auth.current_user(&data)?;
    let user = data
        .users
        .iter()
        .find(|u| u.id == id && u.same_company(&actor))
        .ok_or_else(|| CoreError::not_found(format!("user {id}")))?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Create an account with an explicit role
///
/// Unlike public signup, this lets admins and managers build out the
/// org chart directly, including other managers and team leaders.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid fields"),
        (status = 403, description = "Manager/Admin only"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn create_user(
    auth: AuthUser,
    store: web::Data<Store>,
    payload: web::Json<CreateUserReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;
    let req = payload.into_inner();

    let name = req.name.trim().to_string();
    let email = req.email.trim().to_lowercase();

    let result = store
        .update(move |data| {
            let actor = auth.current_user(data)?;
            if name.is_empty() || email.is_empty() || req.password.is_empty() {
                return Err(CoreError::validation(
                    "name, email and password must not be empty",
                ));
            }
            if data
                .users
                .iter()
                .any(|u| u.email.eq_ignore_ascii_case(&email))
            {
                return Err(CoreError::invalid_state(
                    "an account with this email already exists",
                ));
            }
            if let Some(manager_id) = req.manager_id {
                let manager_valid = data.users.iter().any(|u| {
                    u.id == manager_id && u.same_company(&actor) && u.role.can_announce()
                });
                if !manager_valid {
                    return Err(CoreError::validation(
                        "selected manager does not exist in this company",
                    ));
                }
            }
            let user = User {
                id: data.next_user_id(),
                name,
                email,
                password: hash_password(&req.password),
                role: req.role,
                manager_id: req.manager_id,
                company: actor.company.clone(),
            };
            data.users.push(user.clone());
            Ok(user)
        })
        .map_err(storage_error)?;

    let user = result?;
    info!(user_id = user.id, role = %user.role, "Account created by staff");
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Update an account
///
/// Callers may edit their own name, email and password; admins may edit
/// anyone in the company and also change role and manager.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = u64, Path, description = "User ID")),
    request_body = UpdateUserReq,
    responses(
        (status = 200, description = "Account updated", body = UserResponse),
        (status = 403, description = "Not the account owner or an admin"),
        (status = 404, description = "No such account"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn update_user(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
    payload: web::Json<UpdateUserReq>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let req = payload.into_inner();

    let result = store
        .update(move |data| {
            let actor = auth.current_user(data)?;
            let is_admin = actor.role == Role::Admin;
            if actor.id != id && !is_admin {
                return Err(CoreError::authorization(
                    "only admins can edit other accounts",
                ));
            }
            let mut user = data
                .users
                .iter()
                .find(|u| u.id == id && u.same_company(&actor))
                .cloned()
                .ok_or_else(|| CoreError::not_found(format!("user {id}")))?;

            if let Some(name) = req.name {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(CoreError::validation("name must not be empty"));
                }
                user.name = name;
            }
            if let Some(email) = req.email {
                let email = email.trim().to_lowercase();
                if email.is_empty() {
                    return Err(CoreError::validation("email must not be empty"));
                }
                if data
                    .users
                    .iter()
                    .any(|u| u.id != id && u.email.eq_ignore_ascii_case(&email))
                {
                    return Err(CoreError::invalid_state(
                        "an account with this email already exists",
                    ));
                }
                user.email = email;
            }
            if let Some(password) = req.password {
                if password.is_empty() {
                    return Err(CoreError::validation("password must not be empty"));
                }
                user.password = hash_password(&password);
            }
            if is_admin {
                if let Some(role) = req.role {
                    user.role = role;
                }
                if let Some(manager_id) = req.manager_id {
                    if !data.users.iter().any(|u| {
                        u.id == manager_id && u.same_company(&actor) && u.role.can_announce()
                    }) {
                        return Err(CoreError::validation(
                            "selected manager does not exist in this company",
                        ));
                    }
                    user.manager_id = Some(manager_id);
                }
            }

            data.users = data
                .users
                .iter()
                .map(|u| if u.id == id { user.clone() } else { u.clone() })
                .collect();
            Ok(user)
        })
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&result?)))
}

/// Delete an account
///
/// Historical timesheets and leave requests survive the deletion;
/// listings fall back to "Unknown" for the missing owner.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = u64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 400, description = "Cannot delete own account"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "No such account")
    ),
    security(("bearer_auth" = [])),
    tag = "User"
)]
pub async fn delete_user(
    auth: AuthUser,
    store: web::Data<Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let id = path.into_inner();

    let result = store
        .update(|data| {
            let actor = auth.current_user(data)?;
            if actor.id == id {
                return Err(CoreError::validation("cannot delete your own account"));
            }
            if !data.users.iter().any(|u| u.id == id && u.same_company(&actor)) {
                return Err(CoreError::not_found(format!("user {id}")));
            }
            data.users.retain(|u| u.id != id);
            Ok(())
        })
        .map_err(storage_error)?;

    result?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}
