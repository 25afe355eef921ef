//! Schedule Store client over the backend's JSON HTTP API.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Response, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::models::config::StoreConfig;
use crate::domain::models::schedule::{ScheduleId, ScheduleRecord};
use crate::domain::ports::schedule_store::{ScheduleStore, StoreError};

/// HTTP implementation of [`ScheduleStore`].
///
/// Requests are sent once; failures are classified and returned, never retried.
pub struct HttpScheduleStore {
    http_client: ReqwestClient,
    base_url: Url,
}

impl HttpScheduleStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .with_context(|| format!("Invalid store base_url: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("Store base_url must be a hierarchical http(s) URL: {base_url}");
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Base URL extended with percent-encoded path segments.
    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                StoreError::InvalidRequest(format!("cannot build a path on {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Body of a successful response, or the classified error.
    async fn read_body(response: Response) -> Result<String, StoreError> {
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(StoreError::from_status(status.as_u16(), body))
        }
    }

    /// Decode a create/update acknowledgment.
    ///
    /// Older backends answer with a bare status object instead of the record;
    /// in that case the record that was sent stands in for it.
    fn acknowledged(body: &str, sent: &ScheduleRecord) -> Result<ScheduleRecord, StoreError> {
        let value: Value = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))?
        };

        let is_record = value.as_object().is_some_and(|object| {
            ["id", "uid", "name", "cron", "cron_start", "cron_stop"]
                .iter()
                .any(|key| object.contains_key(*key))
        });
        if !is_record {
            debug!(body, "store acknowledged without a record, keeping sent payload");
            return Ok(sent.clone());
        }

        serde_json::from_value(value).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Network(err.to_string())
    }
}

#[async_trait]
impl ScheduleStore for HttpScheduleStore {
    async fn lookup_by_uid(&self, uid: &str) -> Result<Option<ScheduleRecord>, StoreError> {
        let response = self
            .http_client
            .get(self.url(&["schedules", "uid", uid])?)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = Self::read_body(response).await?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn list(&self) -> Result<Vec<ScheduleRecord>, StoreError> {
        let response = self
            .http_client
            .get(self.url(&["schedules"])?)
            .send()
            .await
            .map_err(transport_error)?;

        let body = Self::read_body(response).await?;
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn create(&self, record: &ScheduleRecord) -> Result<ScheduleRecord, StoreError> {
        let response = self
            .http_client
            .post(self.url(&["schedules"])?)
            .json(record)
            .send()
            .await
            .map_err(transport_error)?;

        let body = Self::read_body(response).await.inspect_err(|err| {
            warn!(error = %err, name = %record.name(), "schedule create rejected");
        })?;
        Self::acknowledged(&body, record)
    }

    async fn update(
        &self,
        id: ScheduleId,
        record: &ScheduleRecord,
    ) -> Result<ScheduleRecord, StoreError> {
        let response = self
            .http_client
            .put(self.url(&["schedules", id.to_string().as_str()])?)
            .json(record)
            .send()
            .await
            .map_err(transport_error)?;

        let body = Self::read_body(response).await.inspect_err(|err| {
            warn!(error = %err, %id, "schedule update rejected");
        })?;
        let mut sent = record.clone();
        sent.set_id(id);
        Self::acknowledged(&body, &sent)
    }

    async fn clear_schedule(&self, uid: &str) -> Result<(), StoreError> {
        let response = self
            .http_client
            .delete(self.url(&["schedules", "uid", uid, "cron"])?)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(uid, "no schedule to clear");
            return Ok(());
        }
        Self::read_body(response).await.map(|_| ())
    }

    async fn delete_record(&self, id: ScheduleId) -> Result<(), StoreError> {
        let response = self
            .http_client
            .delete(self.url(&["schedules", id.to_string().as_str()])?)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(%id, "schedule record already gone");
            return Ok(());
        }
        Self::read_body(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::schedule::{LegacySchedule, ScheduleStatus};

    fn legacy(cron: &str) -> ScheduleRecord {
        ScheduleRecord::Legacy(LegacySchedule {
            id: None,
            name: "deploy-web-up".to_string(),
            start_time: None,
            end_time: None,
            cron: cron.to_string(),
            status: ScheduleStatus::from_crons([cron]),
            active: true,
            resource_type: None,
            resource_name: None,
            resource_namespace: None,
            direction: None,
        })
    }

    #[test]
    fn test_bare_status_ack_returns_sent_record() {
        let sent = legacy("*/5 * * * *");
        let ack = HttpScheduleStore::acknowledged(r#"{"status": "created"}"#, &sent).unwrap();
        assert_eq!(ack, sent);
        let ack = HttpScheduleStore::acknowledged("", &sent).unwrap();
        assert_eq!(ack, sent);
    }

    #[test]
    fn test_record_ack_is_decoded() {
        let sent = legacy("*/5 * * * *");
        let ack = HttpScheduleStore::acknowledged(
            r#"{"id": 12, "name": "deploy-web-up", "cron": "*/5 * * * *", "status": "scheduled"}"#,
            &sent,
        )
        .unwrap();
        assert_eq!(ack.id(), Some(ScheduleId(12)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let store = HttpScheduleStore::new(&StoreConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..StoreConfig::default()
        })
        .unwrap();
        assert_eq!(
            store.url(&["schedules"]).unwrap().as_str(),
            "http://localhost:8000/schedules"
        );
    }

    #[test]
    fn test_uid_segment_is_percent_encoded() {
        let store = HttpScheduleStore::new(&StoreConfig {
            base_url: "http://localhost:8000/api".to_string(),
            ..StoreConfig::default()
        })
        .unwrap();
        let url = store.url(&["schedules", "uid", "a/b?c#d", "cron"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/schedules/uid/a%2Fb%3Fc%23d/cron"
        );
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let result = HttpScheduleStore::new(&StoreConfig {
            base_url: "not a url".to_string(),
            ..StoreConfig::default()
        });
        assert!(result.is_err());
    }
}
