use crate::adapters::auth::IdentityToolkitAuth;
use crate::adapters::fallback::BuiltinRecordSource;
use crate::adapters::local::{LocalFavoriteStore, SessionStore};
use crate::adapters::remote::RealtimeDbClient;
use crate::config::cli::LocalStorage;
use crate::core::favorites::{FavoriteCommand, FavoritesController};
use crate::core::listing::{load_catalog, CatalogLoad, FavoritesView, ListingView};
use crate::core::pipeline::Page;
use crate::core::session::SessionHub;
use crate::core::{
    AuthProvider, CatalogRecord, ConfigProvider, FavoriteSet, FavoriteStore, Notice, RecordSource,
    SortMode, UserSession,
};
use crate::domain::forms::{AppointmentRequest, LoginForm, RegisterForm};
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::Validate;
use chrono::Utc;
use tokio::sync::watch;

/// One page plus whatever the user should be told about how it was produced.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub page: Page,
    pub notice: Option<Notice>,
}

/// Wires the adapters chosen by the configuration to the views and the favorites controller.
pub struct CatalogApp<C: ConfigProvider> {
    config: C,
    source: Box<dyn RecordSource>,
    auth: Option<Box<dyn AuthProvider>>,
    sessions: SessionStore<LocalStorage>,
    hub: SessionHub,
    session_events: watch::Receiver<Option<UserSession>>,
    favorites: FavoritesController<Box<dyn FavoriteStore>>,
}

impl<C: ConfigProvider> CatalogApp<C> {
    /// Builds the adapters and restores a saved, unexpired session.
    pub async fn open(config: C) -> Result<Self> {
        let storage = LocalStorage::new(config.state_dir().to_string());
        let timeout = config.request_timeout_seconds();

        let source: Box<dyn RecordSource>;
        let store: Box<dyn FavoriteStore>;
        match config.database_url() {
            Some(url) => {
                tracing::debug!("Using document store at {}", url);
                let client = RealtimeDbClient::new(url, timeout)?;
                source = Box::new(client.clone());
                store = Box::new(client);
            }
            None => {
                tracing::info!("📦 No document store configured, using the built-in catalog");
                source = Box::new(BuiltinRecordSource);
                store = Box::new(LocalFavoriteStore::new(storage.clone()));
            }
        }

        let auth: Option<Box<dyn AuthProvider>> = match config.api_key() {
            Some(key) => Some(Box::new(IdentityToolkitAuth::new(
                config.auth_endpoint(),
                key,
                timeout,
            )?)),
            None => None,
        };

        let hub = SessionHub::default();
        let session_events = hub.subscribe();
        let mut app = Self {
            config,
            source,
            auth,
            sessions: SessionStore::new(storage),
            hub,
            session_events,
            favorites: FavoritesController::new(store),
        };

        let saved = app.sessions.load().await;
        match saved {
            Ok(Some(session)) if session.is_expired(Utc::now()) => {
                tracing::info!("Saved session for {} has expired", session.uid);
                app.sessions.clear().await?;
            }
            Ok(Some(session)) => app.publish(Some(session)).await,
            Ok(None) => {}
            Err(e) => tracing::warn!("⚠️ Ignoring unreadable session file: {}", e),
        }

        Ok(app)
    }

    /// Broadcasts a session change and lets the favorites controller react to it.
    async fn publish(&mut self, session: Option<UserSession>) {
        match session {
            Some(session) => self.hub.sign_in(session),
            None => self.hub.sign_out(),
        }
        if self.session_events.has_changed().unwrap_or(false) {
            self.favorites.follow(&mut self.session_events).await;
        }
    }

    pub fn session(&self) -> Option<UserSession> {
        self.hub.current()
    }

    pub fn favorite_set(&self) -> &FavoriteSet {
        self.favorites.snapshot()
    }

    async fn catalog(&self) -> CatalogLoad {
        load_catalog(self.source.as_ref(), &BuiltinRecordSource).await
    }

    /// Finds a record by identity, falling back to an exact display-name match.
    fn resolve<'a>(records: &'a [CatalogRecord], key: &str) -> Result<&'a CatalogRecord> {
        records
            .iter()
            .find(|r| r.identity() == key)
            .or_else(|| records.iter().find(|r| r.name == key))
            .ok_or_else(|| CatalogError::UnknownRecord {
                identity: key.to_string(),
            })
    }

    /// The listing after pressing "Load more" `more` times.
    pub async fn list(&self, sort: Option<SortMode>, more: usize) -> Result<PageOutcome> {
        let load = self.catalog().await;

        let mut view = ListingView::new(self.config.initial_count(), self.config.page_step());
        view.replace_records(load.records);
        view.set_mode(sort.unwrap_or_else(|| self.config.default_sort()));
        for _ in 0..more {
            if !view.load_more() {
                break;
            }
        }

        Ok(PageOutcome {
            page: view.page(),
            notice: load.notice,
        })
    }

    pub async fn favorites(&self, sort: Option<SortMode>) -> Result<PageOutcome> {
        let session = self.hub.current().ok_or(CatalogError::Unauthenticated)?;
        let load = self.catalog().await;

        let mut view = FavoritesView::new(load.records);
        view.set_mode(sort.unwrap_or_else(|| self.config.default_sort()));
        let page = view.page(Some(&session), self.favorites.snapshot())?;

        let notice = if page.items.is_empty() {
            Some(Notice::info("You have no favorite psychologists yet."))
        } else {
            load.notice
        };
        Ok(PageOutcome { page, notice })
    }

    /// Toggles one record in the favorites of the signed-in user.
    pub async fn toggle_favorite(&mut self, key: &str) -> Result<Notice> {
        if self.hub.current().is_none() {
            return Err(CatalogError::Unauthenticated);
        }

        let load = self.catalog().await;
        let identity = Self::resolve(&load.records, key)?.identity().to_string();

        self.favorites
            .apply(FavoriteCommand::Toggle(identity))
            .await
            .ok_or(CatalogError::Unauthenticated)
    }

    fn auth(&self) -> Result<&dyn AuthProvider> {
        self.auth
            .as_deref()
            .ok_or_else(|| CatalogError::MissingConfigError {
                field: "auth.api_key".to_string(),
            })
    }

    async fn start_session(&mut self, session: UserSession) -> Result<Notice> {
        self.sessions.save(&session).await?;
        let greeting = format!(
            "Signed in as {}",
            session
                .display_name
                .as_deref()
                .or(session.email.as_deref())
                .unwrap_or(&session.uid)
        );
        self.publish(Some(session)).await;
        Ok(Notice::success(greeting))
    }

    pub async fn login(&mut self, form: LoginForm) -> Result<Notice> {
        form.validate()?;
        let session = self.auth()?.sign_in(&form).await?;
        self.start_session(session).await
    }

    pub async fn register(&mut self, form: RegisterForm) -> Result<Notice> {
        form.validate()?;
        let session = self.auth()?.sign_up(&form).await?;
        self.start_session(session).await
    }

    pub async fn logout(&mut self) -> Result<Notice> {
        self.sessions.clear().await?;
        self.publish(None).await;
        Ok(Notice::info("Signed out"))
    }

    /// Validates the request against the form rules and the catalog.
    pub async fn book(&self, request: AppointmentRequest) -> Result<Notice> {
        request.validate()?;
        let load = self.catalog().await;
        let record = Self::resolve(&load.records, &request.psychologist)?;
        tracing::info!(
            "📅 Appointment request for {} at {}",
            record.identity(),
            request.time
        );
        Ok(request.confirmation(&record.name))
    }
}
