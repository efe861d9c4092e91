use crate::domain::model::Table;
use crate::domain::ports::{AccessVerifier, DataStore};
use crate::utils::error::{PortalError, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Settings row holding the shared portal PIN.
pub const ACCESS_PIN_KEY: &str = "access_pin";

/// Checks candidates against the PIN stored in `app_settings`. If the store
/// cannot be reached the check fails with an error; there is no local PIN.
pub struct PinVerifier<S: DataStore> {
    store: S,
}

impl<S: DataStore> PinVerifier<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: DataStore> AccessVerifier for PinVerifier<S> {
    async fn verify_access_code(&self, candidate: &str) -> Result<bool> {
        if candidate.is_empty() {
            return Ok(false);
        }

        let rows = self
            .store
            .find_by(Table::AppSettings, "key", ACCESS_PIN_KEY)
            .await?;

        let stored = rows.first().and_then(|row| match row.get("value") {
            Some(Value::String(pin)) => Some(pin.clone()),
            Some(Value::Number(pin)) => Some(pin.to_string()),
            _ => None,
        });

        match stored {
            Some(pin) => Ok(pins_match(&pin, candidate)),
            None => {
                tracing::warn!("No '{}' row in app_settings; refusing access", ACCESS_PIN_KEY);
                Ok(false)
            }
        }
    }
}

// Compares every byte so the time taken does not depend on where the first
// mismatch is.
fn pins_match(stored: &str, candidate: &str) -> bool {
    let (a, b) = (stored.as_bytes(), candidate.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Fails with `AccessDenied` unless the verifier accepts the candidate.
pub async fn require_access<V: AccessVerifier + ?Sized>(verifier: &V, candidate: &str) -> Result<()> {
    if verifier.verify_access_code(candidate).await? {
        tracing::debug!("Access code accepted");
        Ok(())
    } else {
        tracing::warn!("Access code rejected");
        Err(PortalError::AccessDenied)
    }
}
