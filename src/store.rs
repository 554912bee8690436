use crate::model::{
    leave_request::LeaveRequest, notification::Notification, project::Project, task::Task,
    timesheet::Timesheet, user::User,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};
use tracing::info;

/// A refresh-token jti that was rotated or logged out. Kept only until the
/// token itself expires; after that the jwt layer rejects it anyway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokedToken {
    pub jti: String,
    /// Unix seconds, copied from the token's exp claim.
    pub exp: usize,
}

/// The canonical collections, persisted as a single JSON document with one
/// array per collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppData {
    pub users: Vec<User>,
    pub timesheets: Vec<Timesheet>,
    pub leave_requests: Vec<LeaveRequest>,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub notifications: Vec<Notification>,
    /// Refresh-token jtis that have been rotated or logged out.
    pub revoked_jtis: Vec<RevokedToken>,
}

fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().map_or(1, |max| max + 1)
}

impl AppData {
    pub fn next_user_id(&self) -> u64 {
        next_id(self.users.iter().map(|u| u.id))
    }
    pub fn next_timesheet_id(&self) -> u64 {
        next_id(self.timesheets.iter().map(|t| t.id))
    }
    pub fn next_leave_request_id(&self) -> u64 {
        next_id(self.leave_requests.iter().map(|l| l.id))
    }
    pub fn next_project_id(&self) -> u64 {
        next_id(self.projects.iter().map(|p| p.id))
    }
    pub fn next_task_id(&self) -> u64 {
        next_id(self.tasks.iter().map(|t| t.id))
    }
    pub fn next_notification_id(&self) -> u64 {
        next_id(self.notifications.iter().map(|n| n.id))
    }

    pub fn user(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_name(&self, id: u64) -> String {
        self.user(id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.revoked_jtis.iter().any(|r| r.jti == jti)
    }

    /// Records a jti, pruning entries whose tokens have expired in the
    /// meantime so the set never grows without bound. Idempotent.
    pub fn revoke_jti(&mut self, jti: &str, exp: usize, now: usize) {
        self.revoked_jtis.retain(|r| r.exp > now);
        if !self.is_revoked(jti) {
            self.revoked_jtis.push(RevokedToken {
                jti: jti.to_string(),
                exp,
            });
        }
    }
}

/// The single injected data handle (no global singletons). All mutations go
/// through `update`, which holds the one write lock, so concurrent writers
/// are applied in a total order and a write is all-or-nothing: on any error
/// the in-memory state and the file are left untouched.
pub struct Store {
    path: Option<PathBuf>,
    data: RwLock<AppData>,
}

impl Store {
    /// Loads the JSON data file, initializing an empty one if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read data file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse data file {}", path.display()))?
        } else {
            info!(path = %path.display(), "Data file not found, starting empty");
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let empty = AppData::default();
            persist(&path, &empty)?;
            empty
        };
        Ok(Store {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// A store without a backing file, for tests.
    pub fn in_memory(data: AppData) -> Self {
        Store {
            path: None,
            data: RwLock::new(data),
        }
    }

    /// Full copy of the current state. Readers work on snapshots; they never
    /// observe a half-applied write.
    pub fn snapshot(&self) -> AppData {
        self.data.read().expect("store lock poisoned").clone()
    }

    /// Copy-on-write mutation: `mutate` runs on a clone of the state, and the
    /// clone replaces the state only if it returns Ok and persisting succeeds.
    /// The outer error is a storage failure; the inner result is the domain
    /// outcome passed through untouched.
    pub fn update<T, E>(
        &self,
        mutate: impl FnOnce(&mut AppData) -> std::result::Result<T, E>,
    ) -> Result<std::result::Result<T, E>> {
        let mut guard = self.data.write().expect("store lock poisoned");
        let mut draft = guard.clone();
        match mutate(&mut draft) {
            Ok(value) => {
                if let Some(path) = &self.path {
                    persist(path, &draft)?;
                }
                *guard = draft;
                Ok(Ok(value))
            }
            Err(e) => Ok(Err(e)),
        }
    }
}

fn persist(path: &Path, data: &AppData) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("failed to serialize app data")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write data file {}", path.display()))?;
    Ok(())
}
