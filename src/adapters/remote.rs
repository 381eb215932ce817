use crate::core::{CatalogRecord, FavoriteSet, FavoriteStore, RecordSource, UserSession};
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

/// Client for a JSON-over-HTTP realtime document store.
///
/// Paths map to `{base}/{path}.json`; reads of missing paths return `null`.
/// Catalog records live under `psychologists`, favorites under
/// `users/{uid}/favorites` and need the session token.
#[derive(Debug, Clone)]
pub struct RealtimeDbClient {
    base_url: Url,
    client: Client,
}

impl RealtimeDbClient {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self> {
        let invalid = |reason: String| CatalogError::InvalidConfigValueError {
            field: "source.database_url".to_string(),
            value: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self { base_url, client })
    }

    /// `{base}/{segments...}.json`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> std::result::Result<Url, String> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| format!("{} cannot carry a path", self.base_url))?;
            path.pop_if_empty();
            if let Some((last, parents)) = segments.split_last() {
                path.extend(parents);
                path.push(&format!("{}.json", last));
            }
        }
        Ok(url)
    }

    fn favorites_url(&self, session: &UserSession) -> std::result::Result<Url, String> {
        self.url(&["users", &session.uid, "favorites"])
    }
}

fn source_error(message: impl Into<String>) -> CatalogError {
    CatalogError::SourceUnavailable {
        message: message.into(),
    }
}

fn persistence_error(message: impl Into<String>) -> CatalogError {
    CatalogError::PersistenceUnavailable {
        message: message.into(),
    }
}

async fn read_json(response: Response) -> std::result::Result<Value, String> {
    let status = response.status();
    if !status.is_success() {
        return Err(format!("document store answered {}", status));
    }
    response.json::<Value>().await.map_err(|e| e.to_string())
}

/// Object entries in the order a JS client enumerates them: integer-like keys
/// ascending, then the remaining keys in document order.
fn ordered_entries(map: Map<String, Value>) -> Vec<(String, Value)> {
    let (mut indexed, named): (Vec<_>, Vec<_>) = map
        .into_iter()
        .map(|(key, value)| (array_index(&key), key, value))
        .partition(|(index, _, _)| index.is_some());
    indexed.sort_by_key(|(index, _, _)| *index);
    indexed
        .into_iter()
        .chain(named)
        .map(|(_, key, value)| (key, value))
        .collect()
}

/// Canonical decimal form only, so "007" stays a named key.
fn array_index(key: &str) -> Option<u32> {
    let index: u32 = key.parse().ok()?;
    (index.to_string() == key).then_some(index)
}

/// Turns a `psychologists` snapshot into records keyed by their backend key.
/// Arrays use the element index as the key and skip `null` holes.
fn records_from_snapshot(snapshot: Value) -> Result<Vec<CatalogRecord>> {
    let entries: Vec<(String, Value)> = match snapshot {
        Value::Null => return Err(source_error("no psychologists in the document store")),
        Value::Object(map) => ordered_entries(map),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        other => {
            return Err(source_error(format!(
                "unexpected psychologists snapshot: {}",
                other
            )))
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        if value.is_null() {
            continue;
        }
        match serde_json::from_value::<CatalogRecord>(value) {
            Ok(mut record) => {
                record.id = Some(key);
                records.push(record);
            }
            Err(e) => tracing::warn!("Skipping malformed record '{}': {}", key, e),
        }
    }
    Ok(records)
}

/// Favorites are stored as an array, but sparse arrays come back as objects.
fn favorites_from_snapshot(snapshot: Value) -> FavoriteSet {
    let values: Vec<Value> = match snapshot {
        Value::Array(items) => items,
        Value::Object(map) => ordered_entries(map).into_iter().map(|(_, v)| v).collect(),
        _ => Vec::new(),
    };
    values
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

#[async_trait]
impl RecordSource for RealtimeDbClient {
    async fn fetch_all(&self) -> Result<Vec<CatalogRecord>> {
        let url = self.url(&["psychologists"]).map_err(source_error)?;
        tracing::debug!("Fetching catalog from: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| source_error(e.to_string()))?;
        let snapshot = read_json(response).await.map_err(source_error)?;

        records_from_snapshot(snapshot)
    }
}

#[async_trait]
impl FavoriteStore for RealtimeDbClient {
    async fn load(&self, session: &UserSession) -> Result<FavoriteSet> {
        let url = self.favorites_url(session).map_err(persistence_error)?;
        tracing::debug!("Loading favorites for {}", session.uid);

        let response = self
            .client
            .get(url)
            .query(&[("auth", session.id_token.as_str())])
            .send()
            .await
            .map_err(|e| persistence_error(e.to_string()))?;
        let snapshot = read_json(response).await.map_err(persistence_error)?;

        Ok(favorites_from_snapshot(snapshot))
    }

    async fn save(&self, session: &UserSession, favorites: &FavoriteSet) -> Result<()> {
        let url = self.favorites_url(session).map_err(persistence_error)?;
        tracing::debug!("Saving {} favorites for {}", favorites.len(), session.uid);

        let response = self
            .client
            .put(url)
            .query(&[("auth", session.id_token.as_str())])
            .json(favorites)
            .send()
            .await
            .map_err(|e| persistence_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(persistence_error(format!(
                "document store answered {}",
                status
            )));
        }
        Ok(())
    }
}
