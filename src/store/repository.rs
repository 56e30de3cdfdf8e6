//! Typed access to the local store: credentials, auth flag, and profiles.
//!
//! All JSON parsing of stored blobs happens here, so a corrupt record is
//! reported once as [`RepositoryError::Corrupt`] instead of every caller
//! handling parse failures on its own.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::RepositoryError;
use crate::onboarding::model::{AggregateProfile, storage_keys};
use crate::store::traits::KeyValueStore;
use crate::validation::Credential;

/// How the completed profile was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistOutcome {
    /// Medical fields merged into the existing credential record.
    Merged,
    /// No credential record existed; the profile was written on its own.
    NoExistingRecord,
    /// The existing record was corrupt; the merge was skipped.
    CorruptRecordSkipped,
    /// The backend rejected the write; nothing was persisted.
    WriteFailed,
}

/// Repository over a [`KeyValueStore`].
#[derive(Clone)]
pub struct ProfileRepository {
    store: Arc<dyn KeyValueStore>,
}

impl ProfileRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Read and parse the JSON under `key`. Absence is `Ok(None)`.
    pub async fn get_json(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| RepositoryError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    /// Read the record under `key` as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RepositoryError> {
        let Some(value) = self.get_json(key).await? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| RepositoryError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    /// Serialize `value` as JSON under `key`.
    pub async fn put<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), RepositoryError> {
        let text = serde_json::to_string(value)?;
        self.store.set(key, &text).await?;
        Ok(())
    }

    /// Merge `fields` into the JSON object under `key` and write it back.
    ///
    /// A missing record starts from an empty object. A record that is not
    /// a JSON object is reported as corrupt and left untouched.
    pub async fn merge(
        &self,
        key: &str,
        fields: Map<String, Value>,
    ) -> Result<Map<String, Value>, RepositoryError> {
        let mut record = match self.get_json(key).await? {
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(RepositoryError::Corrupt {
                    key: key.to_string(),
                    reason: "record is not a JSON object".to_string(),
                });
            }
            None => Map::new(),
        };
        record.extend(fields);
        self.put(key, &record).await?;
        Ok(record)
    }

    pub async fn remove(&self, key: &str) -> Result<bool, RepositoryError> {
        Ok(self.store.remove(key).await?)
    }

    // ── Credentials ─────────────────────────────────────────────────

    /// The stored credential of the current user, if any.
    pub async fn load_credential(&self) -> Result<Option<Credential>, RepositoryError> {
        self.get(storage_keys::USER).await
    }

    /// Store a new credential as the current user, replacing any record.
    pub async fn save_credential(&self, credential: &Credential) -> Result<(), RepositoryError> {
        self.put(storage_keys::USER, credential).await
    }

    pub async fn set_authenticated(&self, authenticated: bool) -> Result<(), RepositoryError> {
        if authenticated {
            self.store.set(storage_keys::IS_AUTHENTICATED, "true").await?;
        } else {
            self.store.remove(storage_keys::IS_AUTHENTICATED).await?;
        }
        Ok(())
    }

    pub async fn is_authenticated(&self) -> Result<bool, RepositoryError> {
        Ok(self
            .store
            .get(storage_keys::IS_AUTHENTICATED)
            .await?
            .is_some_and(|v| v == "true"))
    }

    // ── Profiles ────────────────────────────────────────────────────

    /// The completed registration record, if any.
    pub async fn load_registered(&self) -> Result<Option<Map<String, Value>>, RepositoryError> {
        self.get(storage_keys::REGISTERED_USER).await
    }

    /// Terminal onboarding write: merge the profile into the stored
    /// credential record and save it as both `user` and `registeredUser`.
    ///
    /// Never fails: a corrupt credential record is logged and the profile is
    /// written without it, and a backend failure is logged and reported.
    pub async fn complete_registration(&self, profile: &AggregateProfile) -> PersistOutcome {
        let fields = profile.to_json_fields();

        let (record, outcome) = match self.get_json(storage_keys::USER).await {
            Ok(Some(Value::Object(mut existing))) => {
                for key in AggregateProfile::FIELDS {
                    existing.remove(key);
                }
                existing.extend(fields);
                (existing, PersistOutcome::Merged)
            }
            Ok(Some(_)) => {
                warn!(key = storage_keys::USER, "Stored user is not an object, skipping merge");
                (fields, PersistOutcome::CorruptRecordSkipped)
            }
            Ok(None) => (fields, PersistOutcome::NoExistingRecord),
            Err(RepositoryError::Corrupt { key, reason }) => {
                warn!(key = %key, reason = %reason, "Stored user is corrupt, skipping merge");
                (fields, PersistOutcome::CorruptRecordSkipped)
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored user");
                return PersistOutcome::WriteFailed;
            }
        };

        for key in [storage_keys::USER, storage_keys::REGISTERED_USER] {
            if let Err(e) = self.put(key, &record).await {
                warn!(key, error = %e, "Failed to persist completed profile");
                return PersistOutcome::WriteFailed;
            }
        }

        info!(outcome = ?outcome, "Onboarding profile persisted");
        outcome
    }
}
