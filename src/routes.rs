use crate::{
    api::{dashboard, leave_request, notification, project, task, timesheet, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/signup")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::signup)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/timesheets")
                    .service(
                        web::resource("")
                            .route(web::get().to(timesheet::list_my_timesheets))
                            .route(web::post().to(timesheet::submit_timesheet)),
                    )
                    // /timesheets/review must precede /{id}
                    .service(
                        web::resource("/review").route(web::get().to(timesheet::review_list)),
                    )
                    .service(
                        web::resource("/{id}").route(web::put().to(timesheet::edit_timesheet)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(timesheet::approve_timesheet)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(timesheet::reject_timesheet)),
                    ),
            )
            .service(
                web::scope("/leave")
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::list_my_leave_requests))
                            .route(web::post().to(leave_request::submit_leave_request)),
                    )
                    .service(
                        web::resource("/review").route(web::get().to(leave_request::review_list)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(leave_request::edit_leave_request)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave_request)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave_request)),
                    ),
            )
            .service(
                web::scope("/projects")
                    .service(
                        web::resource("")
                            .route(web::get().to(project::list_projects))
                            .route(web::post().to(project::create_project)),
                    )
                    .service(
                        web::resource("/recompute-hours")
                            .route(web::post().to(project::recompute_hours)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(project::update_project))
                            .route(web::delete().to(project::delete_project)),
                    ),
            )
            .service(
                web::scope("/tasks")
                    .service(
                        web::resource("")
                            .route(web::get().to(task::list_tasks))
                            .route(web::post().to(task::create_task)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(task::update_task))
                            .route(web::delete().to(task::delete_task)),
                    )
                    .service(
                        web::resource("/{id}/status")
                            .route(web::put().to(task::update_task_status)),
                    ),
            )
            .service(
                web::scope("/users")
                    .service(
                        web::resource("")
                            .route(web::get().to(user::list_users))
                            .route(web::post().to(user::create_user)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(user::get_user))
                            .route(web::put().to(user::update_user))
                            .route(web::delete().to(user::delete_user)),
                    ),
            )
            .service(
                web::scope("/notifications")
                    .service(
                        web::resource("")
                            .route(web::get().to(notification::list_notifications)),
                    )
                    .service(
                        web::resource("/read-all")
                            .route(web::put().to(notification::mark_all_read)),
                    )
                    .service(
                        web::resource("/dismiss-all")
                            .route(web::put().to(notification::dismiss_all)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(notification::delete_notification)),
                    )
                    .service(
                        web::resource("/{id}/read").route(web::put().to(notification::mark_read)),
                    )
                    .service(
                        web::resource("/{id}/dismiss")
                            .route(web::put().to(notification::dismiss)),
                    ),
            )
            .service(
                web::resource("/announcements").route(web::post().to(notification::announce)),
            )
            .service(
                web::resource("/dashboard/summary").route(web::get().to(dashboard::summary)),
            ),
    );
}
