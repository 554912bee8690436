pub mod leave_request;
pub mod notification;
pub mod project;
pub mod role;
pub mod status;
pub mod task;
pub mod timesheet;
pub mod user;
