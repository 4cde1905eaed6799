//! In-memory user sources for unit tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::data::{UserRecord, UserSource};
use crate::error::{ApiFailure, Result};

/// Builds a user with predictable fields
pub fn user(id: u32) -> UserRecord {
    UserRecord {
        id,
        email: format!("user{}@reqres.in", id),
        first_name: format!("First{}", id),
        last_name: format!("Last{}", id),
        avatar_url: format!("https://reqres.in/img/faces/{}-image.jpg", id),
    }
}

/// Source that replays scripted outcomes and counts calls.
///
/// Once a script runs dry the source falls back to success: `fetch_user_by_id`
/// echoes the requested id and `fetch_all_users` returns `all_users`.
#[derive(Default)]
pub struct ScriptedSource {
    user_script: Mutex<VecDeque<Result<UserRecord>>>,
    list_script: Mutex<VecDeque<Result<Vec<UserRecord>>>>,
    all_users: Vec<UserRecord>,
    user_calls: AtomicU32,
    list_calls: AtomicU32,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_all_users(mut self, users: Vec<UserRecord>) -> Self {
        self.all_users = users;
        self
    }

    pub fn then_user(self, outcome: Result<UserRecord>) -> Self {
        self.user_script
            .lock()
            .expect("script lock")
            .push_back(outcome);
        self
    }

    pub fn then_user_failure(self, failure: ApiFailure) -> Self {
        self.then_user(Err(failure))
    }

    pub fn then_list(self, outcome: Result<Vec<UserRecord>>) -> Self {
        self.list_script
            .lock()
            .expect("script lock")
            .push_back(outcome);
        self
    }

    pub fn user_calls(&self) -> u32 {
        self.user_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> u32 {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserSource for ScriptedSource {
    async fn fetch_user_by_id(&self, id: u32) -> Result<UserRecord> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.user_script.lock().expect("script lock").pop_front();
        next.unwrap_or_else(|| Ok(user(id)))
    }

    async fn fetch_all_users(&self) -> Result<Vec<UserRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.list_script.lock().expect("script lock").pop_front();
        next.unwrap_or_else(|| Ok(self.all_users.clone()))
    }
}
