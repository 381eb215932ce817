use crate::core::{CatalogRecord, RecordSource};
use crate::utils::error::Result;
use async_trait::async_trait;

const BUILTIN_CATALOG: &str = include_str!("../../data/psychologists.json");

/// The catalog shipped with the binary, used whenever the document store is unreachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRecordSource;

impl BuiltinRecordSource {
    pub fn records() -> Vec<CatalogRecord> {
        serde_json::from_str(BUILTIN_CATALOG).unwrap_or_else(|e| {
            tracing::error!("❌ Built-in catalog is malformed: {}", e);
            Vec::new()
        })
    }
}

#[async_trait]
impl RecordSource for BuiltinRecordSource {
    async fn fetch_all(&self) -> Result<Vec<CatalogRecord>> {
        Ok(Self::records())
    }
}
