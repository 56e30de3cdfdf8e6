//! `KeyValueStore` trait — the local blob store the client persists into.
//!
//! Values are raw strings (JSON text in practice). Keeping them untyped at
//! this layer lets readers see corrupt writes instead of having the backend
//! reject them; typed access lives in [`crate::store::ProfileRepository`].

use async_trait::async_trait;

use crate::error::StoreError;

/// Backend-agnostic key/value blob store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or replace the value under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Returns whether anything was removed.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}
