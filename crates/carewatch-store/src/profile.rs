//! Profile store abstraction.

use crate::error::StorageError;
use async_trait::async_trait;
use carewatch_protocol::{Profile, SubjectId};

/// Persistence for subject profiles, one document per subject.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, subject: &SubjectId) -> Result<Option<Profile>, StorageError>;

    /// Create or replace a profile.
    ///
    /// The store owns the timestamps: `created_at` is kept from the existing
    /// document and `updated_at` is set to now.
    async fn upsert(&self, profile: Profile) -> Result<Profile, StorageError>;
}

/// Apply store-owned timestamps to an incoming profile.
pub(crate) fn stamp(mut profile: Profile, existing: Option<&Profile>) -> Profile {
    let now = chrono::Utc::now();
    profile.created_at = existing.and_then(|current| current.created_at).or(Some(now));
    profile.updated_at = Some(now);
    profile
}
