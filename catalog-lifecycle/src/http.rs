//! HTTP transport for the catalog service.
//!
//! Uses reqwest with a per-request timeout. Ids are percent-encoded into the
//! path. Non-2xx answers to delete and update are returned as
//! [`ServiceResponse`]s so the coordinators can interpret them.

use async_trait::async_trait;
use catalog_types::{CatalogEntity, EntityId};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::classifier::extract_message;
use crate::config::ServiceConfig;
use crate::error::{TransportError, TransportResult};
use crate::transport::{CatalogTransport, ServiceResponse};

/// Entity listing as returned by the service: a bare array or an envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntityList {
    Plain(Vec<CatalogEntity>),
    Envelope {
        #[serde(alias = "items")]
        data: Vec<CatalogEntity>,
    },
}

impl EntityList {
    fn into_vec(self) -> Vec<CatalogEntity> {
        match self {
            EntityList::Plain(entities) | EntityList::Envelope { data: entities } => entities,
        }
    }
}

/// One record from the dependents source. Only the referenced id matters.
#[derive(Debug, Deserialize)]
struct DependentRecord {
    #[serde(
        rename = "entityId",
        alias = "entity_id",
        alias = "categoryId",
        alias = "category_id",
        default
    )]
    entity_id: Option<EntityId>,
}

/// reqwest-backed [`CatalogTransport`].
pub struct HttpCatalogTransport {
    client: Client,
    base_url: String,
    entities_path: String,
    dependents_path: String,
    token: Option<String>,
}

impl HttpCatalogTransport {
    /// Builds the transport from the service section of the config.
    pub fn new(config: &ServiceConfig) -> TransportResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            entities_path: normalize_path(&config.entities_path),
            dependents_path: normalize_path(&config.dependents_path),
            token: config.token.clone(),
        })
    }

    fn entities_url(&self) -> String {
        format!("{}{}", self.base_url, self.entities_path)
    }

    fn entity_url(&self, id: &EntityId) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            self.entities_path,
            urlencoding::encode(id.as_str())
        )
    }

    fn dependents_url(&self) -> String {
        format!("{}{}", self.base_url, self.dependents_path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> TransportResult<ServiceResponse> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        into_service_response(response).await
    }

    /// Sends a GET and returns the body of a 2xx answer.
    async fn get_text(&self, url: String) -> TransportResult<String> {
        let response = self.send(self.client.get(url)).await?;
        if !response.is_success() {
            return Err(TransportError::Status {
                status: response.status,
                message: extract_message(response.body.as_deref()),
            });
        }
        Ok(response.body.unwrap_or_default())
    }
}

#[async_trait]
impl CatalogTransport for HttpCatalogTransport {
    async fn delete_entity(&self, id: &EntityId) -> TransportResult<ServiceResponse> {
        debug!("DELETE {}", self.entity_url(id));
        self.send(self.client.delete(self.entity_url(id))).await
    }

    async fn update_entity(&self, entity: &CatalogEntity) -> TransportResult<ServiceResponse> {
        debug!("PUT {} (active={})", self.entity_url(&entity.id), entity.active);
        self.send(self.client.put(self.entity_url(&entity.id)).json(entity))
            .await
    }

    async fn list_entities(&self) -> TransportResult<Vec<CatalogEntity>> {
        let body = self.get_text(self.entities_url()).await?;
        let list: EntityList = serde_json::from_str(&body)
            .map_err(|e| TransportError::Decode(format!("entity list: {e}")))?;
        Ok(list.into_vec())
    }

    async fn dependent_counts(&self) -> TransportResult<HashMap<EntityId, u64>> {
        let body = self.get_text(self.dependents_url()).await?;
        let records: Vec<DependentRecord> = serde_json::from_str(&body)
            .map_err(|e| TransportError::Decode(format!("dependents: {e}")))?;
        Ok(count_dependents(records))
    }
}

fn count_dependents(records: Vec<DependentRecord>) -> HashMap<EntityId, u64> {
    let mut counts = HashMap::new();
    for id in records.into_iter().filter_map(|r| r.entity_id) {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_decode() {
        TransportError::Decode(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}

async fn into_service_response(response: Response) -> TransportResult<ServiceResponse> {
    let status = response.status().as_u16();
    let text = response.text().await.map_err(map_reqwest_error)?;
    let body = if text.trim().is_empty() { None } else { Some(text) };
    Ok(ServiceResponse::new(status, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_variants() {
        assert_eq!(normalize_path("entities"), "/entities");
        assert_eq!(normalize_path("/entities/"), "/entities");
        assert_eq!(normalize_path("/"), "");
    }

    #[test]
    fn entity_url_encodes_id() {
        let transport = HttpCatalogTransport::new(&ServiceConfig {
            base_url: "http://host/api/".into(),
            ..Default::default()
        })
        .unwrap();
        let id = EntityId::new("a b/c").unwrap();
        assert_eq!(transport.entity_url(&id), "http://host/api/entities/a%20b%2Fc");
    }

    #[test]
    fn counts_aggregate_per_entity_and_skip_unlinked() {
        let records: Vec<DependentRecord> = serde_json::from_str(
            r#"[
                {"entityId": "cat-1"},
                {"categoryId": "cat-1"},
                {"category_id": 7},
                {"name": "orphan"}
            ]"#,
        )
        .unwrap();
        let counts = count_dependents(records);
        assert_eq!(counts.get(&EntityId::new("cat-1").unwrap()), Some(&2));
        assert_eq!(counts.get(&EntityId::new("7").unwrap()), Some(&1));
        assert_eq!(counts.len(), 2);
    }
}
