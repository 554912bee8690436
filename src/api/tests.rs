use crate::auth::{jwt::generate_access_token, password::hash_password};
use crate::config::Config;
use crate::model::{
    project::{Project, ProjectStatus},
    role::Role,
    status::ApprovalStatus,
    user::User,
};
use crate::routes;
use crate::store::{AppData, Store};
use actix_web::{App, test, web::Data};
use serde_json::{Value, json};
use std::net::SocketAddr;

const SECRET: &str = "integration-test-secret";

fn test_config() -> Config {
    Config {
        data_file: String::new(),
        jwt_secret: SECRET.to_string(),
        server_addr: String::new(),
        access_token_ttl: 3600,
        refresh_token_ttl: 86400,
        rate_login_per_min: 1000,
        rate_register_per_min: 1000,
        rate_refresh_per_min: 1000,
        rate_protected_per_min: 1000,
        api_prefix: "/api/v1".to_string(),
    }
}

fn user(id: u64, name: &str, role: Role, manager_id: Option<u64>) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@acme.example", name.to_lowercase()),
        password: "not-a-hash".to_string(),
        role,
        manager_id,
        company: "Acme".to_string(),
    }
}

fn seed() -> AppData {
    AppData {
        users: vec![
            user(1, "Meredith", Role::Manager, None),
            user(2, "Lena", Role::TeamLeader, Some(1)),
            user(3, "Omar", Role::Employee, Some(1)),
        ],
        projects: vec![Project {
            id: 10,
            name: "Phoenix".to_string(),
            description: String::new(),
            manager_id: 1,
            team_leader_id: Some(2),
            team_ids: vec![2, 3],
            customer_name: "Innovate Corp".to_string(),
            job_name: "Phoenix Web App".to_string(),
            estimated_hours: 100.0,
            actual_hours: 0.0,
            company: "Acme".to_string(),
            status: ProjectStatus::InProgress,
        }],
        ..AppData::default()
    }
}

fn token_for(u: &User) -> String {
    generate_access_token(u.id, u.email.clone(), u.role.as_id(), SECRET, 3600)
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

macro_rules! test_app {
    ($store:expr) => {{
        let config = test_config();
        test::init_service(
            App::new()
                .app_data($store.clone())
                .app_data(Data::new(config.clone()))
                .configure(|cfg| routes::configure(cfg, config.clone())),
        )
        .await
    }};
}

fn timesheet_draft(hours: f64) -> Value {
    json!({
        "date": "2023-10-26",
        "inTime": "09:00",
        "outTime": "17:00",
        "projectWork": [{
            "projectId": 10,
            "workEntries": [{ "description": "API integration", "hours": hours }]
        }]
    })
}

#[actix_web::test]
async fn submitted_timesheet_flows_through_review_to_project_hours() {
    let store = Data::new(Store::in_memory(seed()));
    let app = test_app!(store);
    let employee = token_for(&seed().users[2]);
    let manager = token_for(&seed().users[0]);

    let req = test::TestRequest::post()
        .uri("/api/v1/timesheets")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {employee}")))
        .set_json(timesheet_draft(4.0))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let submitted: Value = test::read_body_json(resp).await;
    assert_eq!(submitted["status"], "Pending");
    let id = submitted["id"].as_u64().unwrap();

    // The manager was told about the submission.
    {
        let data = store.snapshot();
        assert!(data.notifications.iter().any(|n| {
            n.user_id == 1
                && n.title == "New Timesheet Submission"
                && n.message == "Omar has submitted a timesheet for review."
        }));
        // Pending sheets contribute nothing yet.
        assert_eq!(data.projects[0].actual_hours, 0.0);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/timesheets/review")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .to_request();
    let visible: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(visible.iter().any(|t| t["id"].as_u64() == Some(id)));

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/timesheets/{id}/approve"))
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let data = store.snapshot();
    let sheet = &data.timesheets[0];
    assert_eq!(sheet.status, ApprovalStatus::Approved);
    assert_eq!(sheet.approver_id, Some(1));
    assert_eq!(data.projects[0].actual_hours, 4.0);
    assert!(data.notifications.iter().any(|n| {
        n.user_id == 3
            && n.title == "Timesheet Approved"
            && n.message == "Your timesheet for 2023-10-26 has been approved by Meredith."
    }));
}

#[actix_web::test]
async fn employee_cannot_review_and_store_is_untouched() {
    let mut data = seed();
    data.timesheets = vec![crate::model::timesheet::Timesheet {
        id: 5,
        user_id: 2,
        date: "2023-10-26".parse().unwrap(),
        in_time: "09:00".to_string(),
        out_time: "17:00".to_string(),
        project_work: vec![],
        status: ApprovalStatus::Pending,
        approver_id: None,
    }];
    let store = Data::new(Store::in_memory(data));
    let app = test_app!(store);
    let employee = token_for(&seed().users[2]);

    let req = test::TestRequest::put()
        .uri("/api/v1/timesheets/5/approve")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {employee}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let data = store.snapshot();
    assert_eq!(data.timesheets[0].status, ApprovalStatus::Pending);
    assert!(data.notifications.is_empty());
}

#[actix_web::test]
async fn second_review_of_same_timesheet_conflicts() {
    let store = Data::new(Store::in_memory(seed()));
    let app = test_app!(store);
    let employee = token_for(&seed().users[2]);
    let manager = token_for(&seed().users[0]);

    let req = test::TestRequest::post()
        .uri("/api/v1/timesheets")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {employee}")))
        .set_json(timesheet_draft(8.0))
        .to_request();
    let submitted: Value = test::call_and_read_body_json(&app, req).await;
    let id = submitted["id"].as_u64().unwrap();

    for (path, expected) in [("approve", 200), ("reject", 409)] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/timesheets/{id}/{path}"))
            .peer_addr(peer())
            .insert_header(("Authorization", format!("Bearer {manager}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }

    // The failed rejection didn't claw back the approved hours.
    assert_eq!(store.snapshot().projects[0].actual_hours, 8.0);
}

#[actix_web::test]
async fn rejected_leave_request_notifies_the_owner() {
    let store = Data::new(Store::in_memory(seed()));
    let app = test_app!(store);
    let employee = token_for(&seed().users[2]);
    let manager = token_for(&seed().users[0]);

    let req = test::TestRequest::post()
        .uri("/api/v1/leave")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {employee}")))
        .set_json(json!({
            "leaveEntries": [
                { "date": "2023-11-02", "leaveType": "Full Day" },
                { "date": "2023-11-01", "leaveType": "Half Day", "halfDaySession": "First Half" }
            ],
            "reason": "Family event."
        }))
        .to_request();
    let submitted: Value = test::call_and_read_body_json(&app, req).await;
    let id = submitted["id"].as_u64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/leave/{id}/reject"))
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let data = store.snapshot();
    assert_eq!(data.leave_requests[0].status, ApprovalStatus::Rejected);
    // Earliest entry date names the request in the message.
    assert!(data.notifications.iter().any(|n| {
        n.user_id == 3
            && n.title == "Leave Request Rejected"
            && n.message == "Your leave request for 2023-11-01 has been rejected by Meredith."
    }));
}

#[actix_web::test]
async fn login_issues_tokens_that_reach_protected_routes() {
    let mut data = seed();
    data.users[2].password = hash_password("hunter2");
    let store = Data::new(Store::in_memory(data));
    let app = test_app!(store);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "email": "omar@acme.example", "password": "hunter2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    let access = body["access_token"].as_str().unwrap().to_string();
    assert!(body["refresh_token"].as_str().is_some());

    let req = test::TestRequest::get()
        .uri("/api/v1/timesheets")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {access}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/v1/timesheets")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn dashboard_counts_follow_visibility() {
    let store = Data::new(Store::in_memory(seed()));
    let app = test_app!(store);
    let employee = token_for(&seed().users[2]);
    let manager = token_for(&seed().users[0]);

    let req = test::TestRequest::post()
        .uri("/api/v1/timesheets")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {employee}")))
        .set_json(timesheet_draft(7.5))
        .to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::get()
        .uri("/api/v1/dashboard/summary")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .to_request();
    let summary: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary["pendingTimesheetCount"], 1);
    assert_eq!(summary["pendingLeaveCount"], 0);
    // Submission notification for the manager is still unread.
    assert_eq!(summary["unreadNotificationCount"], 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/dashboard/summary")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {employee}")))
        .to_request();
    let summary: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary["pendingTimesheetCount"], 0);
}

#[actix_web::test]
async fn announcement_reaches_the_whole_company() {
    let store = Data::new(Store::in_memory(seed()));
    let app = test_app!(store);
    let manager = token_for(&seed().users[0]);
    let employee = token_for(&seed().users[2]);

    let req = test::TestRequest::post()
        .uri("/api/v1/announcements")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .set_json(json!({ "title": "Office closed Friday", "message": "Enjoy the long weekend." }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["recipients"], 3);

    // Employees cannot broadcast.
    let req = test::TestRequest::post()
        .uri("/api/v1/announcements")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {employee}")))
        .set_json(json!({ "title": "Hi", "message": "Hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let data = store.snapshot();
    let announcements: Vec<_> = data
        .notifications
        .iter()
        .filter(|n| n.is_announcement)
        .collect();
    assert_eq!(announcements.len(), 3);
    assert!(announcements.iter().all(|n| n.link_to.is_none()));
}

#[actix_web::test]
async fn recreated_project_picks_up_hours_already_booked_to_its_id() {
    // A delete can free the highest id, so a later create may reuse an id
    // that approved timesheets still reference.
    let mut data = seed();
    data.projects.clear();
    data.timesheets = vec![crate::model::timesheet::Timesheet {
        id: 1,
        user_id: 3,
        date: "2023-10-26".parse().unwrap(),
        in_time: "09:00".to_string(),
        out_time: "17:00".to_string(),
        project_work: vec![crate::model::timesheet::ProjectWork {
            project_id: 1,
            work_entries: vec![crate::model::timesheet::WorkEntry {
                description: "API integration".to_string(),
                hours: 6.0,
            }],
        }],
        status: ApprovalStatus::Approved,
        approver_id: Some(1),
    }];
    let store = Data::new(Store::in_memory(data));
    let app = test_app!(store);
    let manager = token_for(&seed().users[0]);

    let req = test::TestRequest::post()
        .uri("/api/v1/projects")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .set_json(json!({
            "name": "Phoenix Reborn",
            "description": "",
            "teamLeaderId": null,
            "teamIds": [3],
            "customerName": "Innovate Corp",
            "jobName": "Phoenix Web App",
            "estimatedHours": 50.0,
            "status": "In Progress"
        }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["actualHours"], 6.0);
}

#[actix_web::test]
async fn task_lifecycle_notifies_assignees_and_deletes_cleanly() {
    let store = Data::new(Store::in_memory(seed()));
    let app = test_app!(store);
    let manager = token_for(&seed().users[0]);
    let employee = token_for(&seed().users[2]);

    let req = test::TestRequest::post()
        .uri("/api/v1/tasks")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .set_json(json!({
            "projectId": 10,
            "title": "Design new landing page",
            "description": "",
            "assignedTo": [3],
            "status": "To Do",
            "deadline": null
        }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_u64().unwrap();

    assert!(store.snapshot().notifications.iter().any(|n| {
        n.user_id == 3
            && n.title == "New Task Assigned"
            && n.message == "You have been assigned a new task: \"Design new landing page\"."
    }));

    // The assignee moves their own card to Done.
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/tasks/{id}/status"))
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {employee}")))
        .set_json(json!({ "status": "Done" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["status"], "Done");
    assert!(updated["completionDate"].as_str().is_some());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/tasks/{id}"))
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {manager}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert!(store.snapshot().tasks.is_empty());
}

#[actix_web::test]
async fn refresh_rotation_revokes_the_presented_token() {
    let mut data = seed();
    data.users[2].password = hash_password("hunter2");
    let store = Data::new(Store::in_memory(data));
    let app = test_app!(store);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "email": "omar@acme.example", "password": "hunter2" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let refresh = body["refresh_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/auth/refresh")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {refresh}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    // The rotated-out token is dead; the revocation entry carries its expiry.
    let req = test::TestRequest::post()
        .uri("/auth/refresh")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {refresh}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let data = store.snapshot();
    assert_eq!(data.revoked_jtis.len(), 1);
    assert!(data.revoked_jtis[0].exp > 0);
}
