use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use reflex_core::{Mode, RecordDraft};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::kv::KeyValueStore;
use crate::model::{Record, SessionInfo, User, UserType};

pub const USER_KEY: &str = "reaction-app-user";
pub const RECORDS_KEY: &str = "reaction-app-records";
pub const SESSION_KEY: &str = "reaction-app-session";

/// Typed access to the user profile, the record list and the session
/// metadata on top of any key-value backend.
#[derive(Debug)]
pub struct Storage<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn backend(&self) -> &S {
        &self.kv
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.kv.get(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw).with_context(|| format!("corrupt data under '{key}'"))?;
        Ok(Some(value))
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).with_context(|| format!("failed to encode '{key}'"))?;
        self.kv.set(key, &raw)
    }

    pub fn user(&self) -> Result<Option<User>> {
        self.read(USER_KEY)
    }

    pub fn save_user(&mut self, user: &User) -> Result<()> {
        self.write(USER_KEY, user)
    }

    /// Validates the name and replaces any stored profile.
    pub fn login(&mut self, name: &str, user_type: UserType) -> Result<User> {
        let user = User::new(name, user_type)?;
        self.save_user(&user)?;
        info!(target: "store", "Logged in {} ({}) as {}", user.name, user.user_type, user.id);
        Ok(user)
    }

    pub fn clear_user(&mut self) -> Result<()> {
        debug!(target: "store", "Clearing stored user");
        self.kv.remove(USER_KEY)
    }

    /// Every record, oldest first.
    pub fn records(&self) -> Result<Vec<Record>> {
        Ok(self.read(RECORDS_KEY)?.unwrap_or_default())
    }

    /// Stores a finished session for `user`, filling in the id and timestamp.
    pub fn append(&mut self, user: &User, draft: RecordDraft) -> Result<Record> {
        let record = Record {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            mode: draft.mode,
            reaction_time_ms: draft.reaction_time_ms,
            accuracy_pct: draft.accuracy_pct,
            score: draft.score,
            sleep_hours: None,
            created_at: Utc::now(),
        };
        let mut records = self.records()?;
        records.push(record.clone());
        self.write(RECORDS_KEY, &records)
            .context("failed to save record")?;
        info!(
            target: "store",
            "Saved {} record {} for {}: {}ms", record.mode, record.id, record.user_name, record.reaction_time_ms
        );
        Ok(record)
    }

    pub fn records_by_user(&self, user_id: &str) -> Result<Vec<Record>> {
        let mut records = self.records()?;
        records.retain(|r| r.user_id == user_id);
        Ok(records)
    }

    pub fn records_by_mode(&self, mode: Mode) -> Result<Vec<Record>> {
        let mut records = self.records()?;
        records.retain(|r| r.mode == mode);
        Ok(records)
    }

    /// Current session metadata. Defaults are stored on first read.
    pub fn current_session(&mut self) -> Result<SessionInfo> {
        if let Some(session) = self.read(SESSION_KEY)? {
            return Ok(session);
        }
        let session = SessionInfo::default_for(Utc::now().date_naive());
        self.set_session(&session)?;
        debug!(target: "store", "Initialized session metadata {}", session.id);
        Ok(session)
    }

    pub fn set_session(&mut self, session: &SessionInfo) -> Result<()> {
        self.write(SESSION_KEY, session)
    }
}
