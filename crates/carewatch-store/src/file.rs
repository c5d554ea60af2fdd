//! File-backed stores: observations as JSONL, profiles as one JSON document.

use crate::error::StorageError;
use crate::ordering::{self, HistoryCursor};
use crate::profile::{self, ProfileStore};
use crate::store::ObservationStore;
use async_trait::async_trait;
use carewatch_protocol::{
    ClientClock, Mood, NewObservation, Observation, ObservationId, Profile, RiskAssessment,
    Scores, SubjectId,
};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const OBSERVATIONS_FILE: &str = "observations.jsonl";
const PROFILES_FILE: &str = "profiles.json";

/// On-disk observation document. The native id never leaves this module.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ObservationDocument {
    id: Uuid,
    subject_id: SubjectId,
    date: NaiveDate,
    #[serde(flatten)]
    scores: Scores,
    mood: Mood,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    client_clock: ClientClock,
    observed_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    assessment: RiskAssessment,
}

impl ObservationDocument {
    fn new(id: Uuid, observation: NewObservation) -> Self {
        Self {
            id,
            subject_id: observation.subject_id,
            date: observation.date,
            scores: observation.scores,
            mood: observation.mood,
            notes: observation.notes,
            client_clock: observation.client_clock,
            observed_at: observation.observed_at,
            created_at: observation.created_at,
            assessment: observation.assessment,
        }
    }

    fn to_observation(&self) -> Observation {
        Observation {
            id: ObservationId::new(self.id.to_string()),
            subject_id: self.subject_id.clone(),
            date: self.date,
            scores: self.scores,
            mood: self.mood,
            notes: self.notes.clone(),
            client_clock: self.client_clock.clone(),
            observed_at: self.observed_at,
            created_at: self.created_at,
            assessment: self.assessment.clone(),
        }
    }
}

/// Parse an external id back into the native form; `None` for foreign ids.
fn native_id(id: &ObservationId) -> Option<Uuid> {
    Uuid::parse_str(id.as_str()).ok()
}

/// Observation store persisting one JSON document per line.
///
/// Documents are cached in memory behind a lock. Appends go straight to the
/// file; assessment updates rewrite it through a temp file and rename, so the
/// file on disk is always a complete set of documents.
#[derive(Debug)]
pub struct FileObservationStore {
    path: PathBuf,
    documents: RwLock<Vec<ObservationDocument>>,
}

impl FileObservationStore {
    /// Open or create the store under `root`.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;
        let path = root.join(OBSERVATIONS_FILE);
        let (documents, torn) = load_documents(&path)?;
        if torn {
            write_documents(&path, &documents)?;
            info!("repaired observation file (path={})", path.display());
        }
        info!(
            "initialized file observation store (path={}, documents={})",
            path.display(),
            documents.len()
        );
        Ok(Self {
            path,
            documents: RwLock::new(documents),
        })
    }

    fn rewrite(&self, documents: &[ObservationDocument]) -> Result<(), StorageError> {
        write_documents(&self.path, documents)
    }

    fn select(
        &self,
        filter: impl Fn(&ObservationDocument) -> bool,
        limit: usize,
    ) -> Vec<Observation> {
        let matching = self
            .documents
            .read()
            .iter()
            .filter(|document| filter(document))
            .map(ObservationDocument::to_observation)
            .collect();
        ordering::newest(matching, limit)
    }
}

/// Replace the file with `documents` through a temp file and rename.
fn write_documents(path: &Path, documents: &[ObservationDocument]) -> Result<(), StorageError> {
    let temp_path = path.with_extension("jsonl.tmp");
    {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&temp_path)?;
        for document in documents {
            let line = serde_json::to_string(document)?;
            writeln!(file, "{line}")?;
        }
        file.sync_all()?;
    }
    fs::rename(temp_path, path)?;
    Ok(())
}

/// Read every document. A torn final line from an interrupted append is
/// dropped and reported through the returned flag.
fn load_documents(path: &Path) -> Result<(Vec<ObservationDocument>, bool), StorageError> {
    if !path.exists() {
        return Ok((Vec::new(), false));
    }
    let file = OpenOptions::new().read(true).open(path)?;
    let lines = BufReader::new(file)
        .lines()
        .collect::<Result<Vec<_>, _>>()?;
    let last = lines.len().saturating_sub(1);
    let mut documents = Vec::with_capacity(lines.len());
    let mut torn = false;
    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(document) => documents.push(document),
            Err(err) if index == last => {
                warn!(
                    "dropping incomplete trailing observation (path={}, error={})",
                    path.display(),
                    err
                );
                torn = true;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok((documents, torn))
}

/// Append one line and flush it to disk.
fn append_line(file: &mut fs::File, line: &str) -> std::io::Result<()> {
    writeln!(file, "{line}")?;
    file.sync_data()
}

#[async_trait]
impl ObservationStore for FileObservationStore {
    async fn save(&self, observation: NewObservation) -> Result<Observation, StorageError> {
        let document = ObservationDocument::new(Uuid::new_v4(), observation);
        let line = serde_json::to_string(&document)?;
        let mut documents = self.documents.write();
        {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            let prior_len = file.metadata()?.len();
            if let Err(err) = append_line(&mut file, &line) {
                if let Err(truncate_err) = file.set_len(prior_len) {
                    warn!(
                        "failed to roll back partial append (path={}, error={})",
                        self.path.display(),
                        truncate_err
                    );
                }
                return Err(err.into());
            }
        }
        let stored = document.to_observation();
        documents.push(document);
        debug!(
            "stored observation (observation_id={}, subject={}, date={})",
            stored.id, stored.subject_id, stored.date
        );
        Ok(stored)
    }

    async fn update_assessment(
        &self,
        id: &ObservationId,
        assessment: RiskAssessment,
    ) -> Result<Observation, StorageError> {
        let not_found = || StorageError::NotFound(id.clone());
        let native = native_id(id).ok_or_else(not_found)?;
        let mut documents = self.documents.write();
        let index = documents
            .iter()
            .position(|document| document.id == native)
            .ok_or_else(not_found)?;
        let mut next = documents.clone();
        next[index].assessment = assessment;
        self.rewrite(&next)?;
        *documents = next;
        debug!(
            "updated observation assessment (observation_id={}, status={})",
            id,
            documents[index].assessment.status.as_str()
        );
        Ok(documents[index].to_observation())
    }

    async fn get(&self, id: &ObservationId) -> Result<Option<Observation>, StorageError> {
        let Some(native) = native_id(id) else {
            return Ok(None);
        };
        Ok(self
            .documents
            .read()
            .iter()
            .find(|document| document.id == native)
            .map(ObservationDocument::to_observation))
    }

    async fn list_recent(
        &self,
        subject: &SubjectId,
        limit: usize,
    ) -> Result<Vec<Observation>, StorageError> {
        Ok(self.select(|document| &document.subject_id == subject, limit))
    }

    async fn list_preceding(
        &self,
        subject: &SubjectId,
        cursor: &HistoryCursor,
        limit: usize,
    ) -> Result<Vec<Observation>, StorageError> {
        let candidates = self.select(|document| &document.subject_id == subject, usize::MAX);
        Ok(candidates
            .into_iter()
            .filter(|observation| ordering::precedes(observation, cursor))
            .take(limit)
            .collect())
    }

    async fn list_pending(&self, limit: usize) -> Result<Vec<Observation>, StorageError> {
        Ok(self.select(|document| document.assessment.is_pending(), limit))
    }
}

/// Profile store keeping every profile in a single JSON document.
#[derive(Debug)]
pub struct FileProfileStore {
    path: PathBuf,
    profiles: RwLock<BTreeMap<SubjectId, Profile>>,
}

impl FileProfileStore {
    /// Open or create the store under `root`.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;
        let path = root.join(PROFILES_FILE);
        let profiles = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            BTreeMap::new()
        };
        info!(
            "initialized file profile store (path={}, profiles={})",
            path.display(),
            profiles.len()
        );
        Ok(Self {
            path,
            profiles: RwLock::new(profiles),
        })
    }
}

#[async_trait]
impl ProfileStore for FileProfileStore {
    async fn get(&self, subject: &SubjectId) -> Result<Option<Profile>, StorageError> {
        Ok(self.profiles.read().get(subject).cloned())
    }

    async fn upsert(&self, profile: Profile) -> Result<Profile, StorageError> {
        let mut profiles = self.profiles.write();
        let existing = profiles.get(&profile.id).cloned();
        let stamped = profile::stamp(profile, existing.as_ref());
        let mut next = profiles.clone();
        next.insert(stamped.id.clone(), stamped.clone());

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_vec_pretty(&next)?)?;
        fs::rename(temp_path, &self.path)?;
        *profiles = next;
        debug!("stored profile (subject={})", stamped.id);
        Ok(stamped)
    }
}
