//! Subject profile record.

use crate::SubjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flat profile of the person being observed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: SubjectId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u16>,
    #[serde(default)]
    pub education_years: Option<u8>,
    #[serde(default)]
    pub diagnosis_notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Empty profile returned before anything was saved.
    pub fn blank(id: SubjectId) -> Self {
        Self {
            id,
            name: String::new(),
            age: None,
            education_years: None,
            diagnosis_notes: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Raw profile body as sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub education_years: Option<Value>,
    #[serde(default)]
    pub diagnosis_notes: Option<String>,
}
