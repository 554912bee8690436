use crate::{
    auth::{
        jwt::{self, generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    model::{role::Role, user::User},
    models::{LoginReqDto, SignupReq, TokenType},
    store::Store,
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, instrument};

enum SignupError {
    EmailTaken,
    ManagerRequired,
    ManagerNotFound,
    Invalid(&'static str),
}

/// Inserts a new account. The first account of a new company becomes its
/// admin; later accounts join as employees and must name a manager from the
/// company. The uniqueness check runs inside the store's write path, so two
/// racing signups cannot both claim an email.
fn insert_user(req: &SignupReq, store: &Store) -> anyhow::Result<Result<User, SignupError>> {
    let name = req.name.trim().to_string();
    let email = req.email.trim().to_lowercase();
    let company = req.company.trim().to_string();

    if name.is_empty() || email.is_empty() || req.password.is_empty() || company.is_empty() {
        return Ok(Err(SignupError::Invalid(
            "Name, email, password and company must not be empty",
        )));
    }

    let hashed = hash_password(&req.password);
    let manager_id = req.manager_id;

    store.update(move |data| {
        if data
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&email))
        {
            return Err(SignupError::EmailTaken);
        }

        let company_exists = data
            .users
            .iter()
            .any(|u| u.company.eq_ignore_ascii_case(&company));

        let (role, manager_id) = if company_exists {
            let manager_id = manager_id.ok_or(SignupError::ManagerRequired)?;
            let manager_valid = data.users.iter().any(|u| {
                u.id == manager_id
                    && u.company.eq_ignore_ascii_case(&company)
                    && u.role.can_announce() // managers, team leaders and admins lead people
            });
            if !manager_valid {
                return Err(SignupError::ManagerNotFound);
            }
            (Role::Employee, Some(manager_id))
        } else {
            (Role::Admin, None)
        };

        let user = User {
            id: data.next_user_id(),
            name,
            email,
            password: hashed,
            role,
            manager_id,
            company,
        };
        data.users.push(user.clone());
        Ok(user)
    })
}

/// User registration handler
pub async fn signup(req: web::Json<SignupReq>, store: web::Data<Store>) -> impl Responder {
    let result = match insert_user(&req, store.get_ref()) {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Failed to persist signup");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            }));
        }
    };

    match result {
        Ok(user) => {
            info!(user_id = user.id, role = %user.role, "Account created");
            HttpResponse::Created().json(json!({
                "message": "Account created successfully",
                "role": user.role
            }))
        }
        Err(SignupError::EmailTaken) => HttpResponse::Conflict().json(json!({
            "error": "An account with this email already exists"
        })),
        Err(SignupError::ManagerRequired) => HttpResponse::BadRequest().json(json!({
            "error": "Please select a manager for this company"
        })),
        Err(SignupError::ManagerNotFound) => HttpResponse::BadRequest().json(json!({
            "error": "Selected manager does not exist in this company"
        })),
        Err(SignupError::Invalid(msg)) => HttpResponse::BadRequest().json(json!({
            "error": msg
        })),
    }
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

#[instrument(
    name = "auth_login",
    skip(store, config, user),
    fields(email = %user.email)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<Store>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.email.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().body("Email or password required");
    }

    debug!("Fetching user from store");

    let data = store.snapshot();
    let db_user = match data
        .users
        .iter()
        .find(|u| u.email.eq_ignore_ascii_case(user.email.trim()))
    {
        Some(u) => {
            debug!(user_id = u.id, "User found");
            u
        }
        None => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
    };

    debug!("Verifying password");

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Password verified, generating tokens");

    let access_token = generate_access_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role.as_id(),
        &config.jwt_secret,
        config.access_token_ttl,
    );

    let (refresh_token, _refresh_claims) = generate_refresh_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role.as_id(),
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

pub async fn refresh_token(
    req: HttpRequest,
    store: web::Data<Store>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    // Rotate: revoke the presented jti and issue a fresh pair. The revocation
    // set lives in the store so it survives restarts.
    let rotation = store.update(|data| {
        if data.is_revoked(&claims.jti) {
            return Err(());
        }
        if data.user(claims.user_id).is_none() {
            return Err(());
        }
        data.revoke_jti(&claims.jti, claims.exp, jwt::now());
        Ok(())
    });

    match rotation {
        Ok(Ok(())) => {}
        Ok(Err(())) => return HttpResponse::Unauthorized().finish(),
        Err(e) => {
            error!(error = %e, "Failed to rotate refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    }

    let (new_refresh_token, _new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

pub async fn logout(
    req: HttpRequest,
    store: web::Data<Store>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // only refresh tokens can logout
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // revoke (idempotent)
    let _ = store.update(|data| {
        data.revoke_jti(&claims.jti, claims.exp, jwt::now());
        Ok::<_, std::convert::Infallible>(())
    });

    HttpResponse::NoContent().finish()
}
