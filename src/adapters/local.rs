use crate::core::{FavoriteSet, FavoriteStore, Storage, UserSession};
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use url::form_urlencoded;

const SESSION_FILE: &str = "session.json";

fn is_not_found(error: &CatalogError) -> bool {
    matches!(error, CatalogError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound)
}

/// Remembers the signed-in user between CLI invocations.
#[derive(Debug, Clone)]
pub struct SessionStore<S: Storage> {
    storage: S,
}

impl<S: Storage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn load(&self) -> Result<Option<UserSession>> {
        match self.storage.read_file(SESSION_FILE).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn save(&self, session: &UserSession) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(session)?;
        self.storage.write_file(SESSION_FILE, &bytes).await
    }

    pub async fn clear(&self) -> Result<()> {
        match self.storage.remove_file(SESSION_FILE).await {
            Err(e) if is_not_found(&e) => Ok(()),
            other => other,
        }
    }
}

/// Favorites as one JSON array per user, for running without a document store.
#[derive(Debug, Clone)]
pub struct LocalFavoriteStore<S: Storage> {
    storage: S,
}

impl<S: Storage> LocalFavoriteStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// One file per uid; the uid is percent-encoded so distinct uids never share a file.
    fn path(session: &UserSession) -> String {
        let uid: String = form_urlencoded::byte_serialize(session.uid.as_bytes()).collect();
        format!("favorites/{}.json", uid)
    }
}

#[async_trait]
impl<S: Storage> FavoriteStore for LocalFavoriteStore<S> {
    async fn load(&self, session: &UserSession) -> Result<FavoriteSet> {
        match self.storage.read_file(&Self::path(session)).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                CatalogError::PersistenceUnavailable {
                    message: format!("favorites file is corrupt: {}", e),
                }
            }),
            Err(e) if is_not_found(&e) => Ok(FavoriteSet::new()),
            Err(e) => Err(CatalogError::PersistenceUnavailable {
                message: e.to_string(),
            }),
        }
    }

    async fn save(&self, session: &UserSession, favorites: &FavoriteSet) -> Result<()> {
        let bytes = serde_json::to_vec(favorites)?;
        self.storage
            .write_file(&Self::path(session), &bytes)
            .await
            .map_err(|e| CatalogError::PersistenceUnavailable {
                message: e.to_string(),
            })
    }
}
