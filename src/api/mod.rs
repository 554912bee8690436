pub mod dashboard;
pub mod leave_request;
pub mod notification;
pub mod project;
pub mod task;
pub mod timesheet;
pub mod user;

#[cfg(test)]
mod tests;
