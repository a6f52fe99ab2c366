use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::models::{AssignmentMap, BackendSnapshot, SwapRecord};
use crate::error::{Result, RosterError};
use crate::infrastructure::payload::parse_snapshot;
use crate::infrastructure::repository::RosterBackend;

/// Which write a webhook accepts. Reads accept either shape regardless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookShape {
    /// Key-value webhook: POST the full date -> role object
    #[default]
    Mapping,
    /// Spreadsheet-style log: POST one `{person, from, to, swappedWith}` per swap
    Records,
}

/// Remote store reached over HTTP (GET to read, POST to write)
pub struct WebhookBackend {
    client: Client,
    url: String,
    shape: WebhookShape,
}

fn unavailable(e: reqwest::Error) -> RosterError {
    RosterError::BackendUnavailable(e.to_string())
}

impl WebhookBackend {
    pub fn new(url: &str, shape: WebhookShape) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
            shape,
        }
    }

    async fn post<T: Serialize + ?Sized>(&self, body: &T) -> Result<()> {
        let res = self
            .client
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(unavailable)?;

        let status = res.status();
        // fire-and-forget: the body is only logged
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(RosterError::BackendUnavailable(format!(
                "POST {} returned {}: {}",
                self.url, status, text
            )));
        }
        log::debug!("webhook POST {} -> {}: {}", self.url, status, text);
        Ok(())
    }
}

#[async_trait]
impl RosterBackend for WebhookBackend {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn fetch(&self) -> Result<BackendSnapshot> {
        let res = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(unavailable)?;

        let status = res.status();
        if !status.is_success() {
            return Err(RosterError::BackendUnavailable(format!(
                "GET {} returned {}",
                self.url, status
            )));
        }

        let body = res.text().await.map_err(unavailable)?;
        parse_snapshot(&body)
    }

    async fn store_assignments(&self, assignments: &AssignmentMap) -> Result<()> {
        match self.shape {
            WebhookShape::Mapping => self.post(assignments).await,
            WebhookShape::Records => Ok(()),
        }
    }

    async fn submit_swap(&self, record: &SwapRecord) -> Result<()> {
        match self.shape {
            WebhookShape::Records => self.post(record).await,
            WebhookShape::Mapping => Ok(()),
        }
    }
}

#[cfg(test)]
mod webhook_repo_tests {
    use super::*;
    use crate::domain::models::{DateKey, Role};

    #[test]
    fn record_body_matches_the_wire_form() {
        let record = SwapRecord {
            from: DateKey::from_ymd(2024, 3, 4).unwrap(),
            to: DateKey::from_ymd(2024, 3, 5).unwrap(),
            person: Role::new("DC"),
            swapped_with: Some(Role::new("2IC")),
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({
                "from": "2024-03-04",
                "to": "2024-03-05",
                "person": "DC",
                "swappedWith": "2IC"
            })
        );
    }

    #[tokio::test]
    async fn unreachable_webhook_is_backend_unavailable() {
        // port 9 (discard) on localhost is closed in test environments
        let backend = WebhookBackend::new("http://127.0.0.1:9/roster", WebhookShape::Records);
        assert!(matches!(
            backend.fetch().await,
            Err(RosterError::BackendUnavailable(_))
        ));
    }
}
