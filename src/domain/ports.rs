use crate::domain::model::{ContactEmail, Ordering, RecordId, Table};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Row-level access to the hosted table store. Rows cross this boundary as
/// JSON objects; typed records are mapped with serde by the callers.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn list(&self, table: Table, order: &Ordering) -> Result<Vec<Value>>;

    async fn find_by(&self, table: Table, column: &str, value: &str) -> Result<Vec<Value>>;

    /// Inserts one row and returns it as stored (with generated columns).
    async fn insert(&self, table: Table, row: Value) -> Result<Value>;

    /// Patches the row with the given id and returns the updated row.
    async fn update(&self, table: Table, id: &RecordId, patch: Value) -> Result<Value>;

    /// Deletes the row with the given id. Succeeds whenever the store accepts
    /// the request; a filter that matched nothing is not an error.
    async fn delete(&self, table: Table, id: &RecordId) -> Result<()>;
}

/// Binary object storage with publicly retrievable addresses.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<()>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

#[async_trait]
pub trait ContactNotifier: Send + Sync {
    async fn send(&self, email: &ContactEmail) -> Result<()>;
}

#[async_trait]
pub trait AccessVerifier: Send + Sync {
    /// `Ok(false)` for a wrong code; errors only for failures to check.
    async fn verify_access_code(&self, candidate: &str) -> Result<bool>;
}

/// Time source for everything that evaluates deadlines or stamps records.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
