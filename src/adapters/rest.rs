use crate::domain::model::{Ordering, RecordId, Table};
use crate::domain::ports::{BlobStore, DataStore};
use crate::utils::error::{PortalError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Client for a PostgREST table API (`/rest/v1`) and a storage API
/// (`/storage/v1`) served from the same base URL, as hosted by Supabase.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| PortalError::InvalidConfigValueError {
            field: "store.url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.extend(segment.split('/').filter(|s| !s.is_empty()));
            }
        }
        url
    }

    fn table_url(&self, table: Table) -> Url {
        self.endpoint(&["rest", "v1", table.name()])
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        tracing::warn!("❌ Data store responded with {}: {}", status, message);
        Err(PortalError::StoreError {
            status: status.as_u16(),
            message,
        })
    }

    async fn rows(response: Response) -> Result<Vec<Value>> {
        let body: Value = Self::check(response).await?.json().await?;
        match body {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Ok(vec![other]),
        }
    }

    fn first_row(table: Table, id: Option<&RecordId>, rows: Vec<Value>) -> Result<Value> {
        rows.into_iter().next().ok_or_else(|| PortalError::NotFound {
            table: table.name().to_string(),
            id: id.map(|i| i.to_string()).unwrap_or_else(|| "<new>".to_string()),
        })
    }
}

#[async_trait]
impl DataStore for RestStore {
    async fn list(&self, table: Table, order: &Ordering) -> Result<Vec<Value>> {
        let mut url = self.table_url(table);
        url.query_pairs_mut().append_pair("select", "*").append_pair(
            "order",
            &format!(
                "{}.{}",
                order.column,
                if order.ascending { "asc" } else { "desc" }
            ),
        );

        tracing::debug!("GET {}", url);
        let response = self.authorize(self.client.get(url)).send().await?;
        let rows = Self::rows(response).await?;
        tracing::debug!("Fetched {} rows from {}", rows.len(), table);
        Ok(rows)
    }

    async fn find_by(&self, table: Table, column: &str, value: &str) -> Result<Vec<Value>> {
        let mut url = self.table_url(table);
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair(column, &format!("eq.{}", value));

        tracing::debug!("GET {} (filter on {})", table, column);
        let response = self.authorize(self.client.get(url)).send().await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value> {
        let url = self.table_url(table);
        tracing::debug!("POST {}", url);

        let response = self
            .authorize(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let rows = Self::rows(response).await?;
        Self::first_row(table, None, rows)
    }

    async fn update(&self, table: Table, id: &RecordId, patch: Value) -> Result<Value> {
        let mut url = self.table_url(table);
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));
        tracing::debug!("PATCH {} id={}", table, id);

        let response = self
            .authorize(self.client.patch(url))
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;
        let rows = Self::rows(response).await?;
        Self::first_row(table, Some(id), rows)
    }

    async fn delete(&self, table: Table, id: &RecordId) -> Result<()> {
        let mut url = self.table_url(table);
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));
        tracing::debug!("DELETE {} id={}", table, id);

        let response = self.authorize(self.client.delete(url)).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl BlobStore for RestStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let url = self.endpoint(&["storage", "v1", "object", bucket, path]);
        tracing::debug!("Uploading {} bytes to {}/{}", data.len(), bucket, path);

        let response = self
            .authorize(self.client.post(url))
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        self.endpoint(&["storage", "v1", "object", "public", bucket, path])
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_keeps_base_path_and_encodes_segments() {
        let store = RestStore::new(
            "https://demo.supabase.co/project",
            "anon",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(
            store.public_url("documents", "submissions/completed-4-1700000000000.pdf"),
            "https://demo.supabase.co/project/storage/v1/object/public/documents/submissions/completed-4-1700000000000.pdf"
        );
        assert_eq!(
            store.public_url("documents", "a b.pdf"),
            "https://demo.supabase.co/project/storage/v1/object/public/documents/a%20b.pdf"
        );
    }

    #[test]
    fn rejects_malformed_base_url() {
        assert!(RestStore::new("not a url", "anon", Duration::from_secs(5)).is_err());
    }
}
