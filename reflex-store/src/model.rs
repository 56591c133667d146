use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use reflex_core::Mode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const MAX_NAME_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Student,
    Adult,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Student => "student",
            UserType::Adult => "adult",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(UserType::Student),
            "adult" => Ok(UserType::Adult),
            other => Err(format!("unknown user type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// New profile from a login form. The name is trimmed and must be
    /// between 1 and `MAX_NAME_CHARS` characters.
    pub fn new(name: &str, user_type: UserType) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            bail!("name must not be empty");
        }
        if name.chars().count() > MAX_NAME_CHARS {
            bail!("name must be at most {MAX_NAME_CHARS} characters");
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            user_type,
            created_at: Utc::now(),
        })
    }
}

/// One completed session as stored. Field names follow the stored JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub mode: Mode,
    #[serde(rename = "reactionTime")]
    pub reaction_time_ms: u64,
    #[serde(rename = "accuracy", default, skip_serializing_if = "Option::is_none")]
    pub accuracy_pct: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// The training event the records belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
}

impl SessionInfo {
    pub fn default_for(date: NaiveDate) -> Self {
        Self {
            id: "ota-city-2025".to_string(),
            name: "Ota City x Nippon Sport Science University Special Course".to_string(),
            date,
        }
    }
}
