use crate::domain::forms::{LoginForm, RegisterForm};
use crate::domain::model::{CatalogRecord, FavoriteSet, SortMode, UserSession};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn database_url(&self) -> Option<&str>;
    fn api_key(&self) -> Option<&str>;
    fn auth_endpoint(&self) -> &str;
    fn request_timeout_seconds(&self) -> u64;
    fn initial_count(&self) -> usize;
    fn page_step(&self) -> usize;
    fn default_sort(&self) -> SortMode;
    fn state_dir(&self) -> &str;
}

/// Where catalog records come from.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<CatalogRecord>>;
}

/// Per-user favorites persistence.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn load(&self, session: &UserSession) -> Result<FavoriteSet>;
    async fn save(&self, session: &UserSession, favorites: &FavoriteSet) -> Result<()>;
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, form: &LoginForm) -> Result<UserSession>;
    async fn sign_up(&self, form: &RegisterForm) -> Result<UserSession>;
}

#[async_trait]
impl<T: FavoriteStore + ?Sized> FavoriteStore for Box<T> {
    async fn load(&self, session: &UserSession) -> Result<FavoriteSet> {
        (**self).load(session).await
    }

    async fn save(&self, session: &UserSession, favorites: &FavoriteSet) -> Result<()> {
        (**self).save(session, favorites).await
    }
}
