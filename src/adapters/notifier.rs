use crate::domain::model::ContactEmail;
use crate::domain::ports::ContactNotifier;
use crate::utils::error::{PortalError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Hands composed messages to an HTTP mail relay as a JSON document.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpNotifier {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        crate::utils::validation::validate_url("contact.endpoint", endpoint)?;
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ContactNotifier for HttpNotifier {
    async fn send(&self, email: &ContactEmail) -> Result<()> {
        tracing::debug!("Posting contact message '{}' to relay", email.subject);

        let mut request = self.client.post(&self.endpoint).json(email);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PortalError::NotificationError {
                message: format!("relay responded with {}: {}", status, body),
            });
        }

        Ok(())
    }
}
