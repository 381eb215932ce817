use crate::core::{FavoriteSet, FavoriteStore, Notice, Toggle, UserSession};
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteCommand {
    Toggle(String),
}

/// Owns the favorites of the current session.
///
/// Views read `snapshot()`; changes arrive as [`FavoriteCommand`]s or session
/// transitions. Writes go to the store after each change and a failed write
/// only logs a warning.
pub struct FavoritesController<F: FavoriteStore> {
    store: F,
    session: Option<UserSession>,
    favorites: FavoriteSet,
}

impl<F: FavoriteStore> FavoritesController<F> {
    pub fn new(store: F) -> Self {
        Self {
            store,
            session: None,
            favorites: FavoriteSet::new(),
        }
    }

    pub fn snapshot(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn session(&self) -> Option<&UserSession> {
        self.session.as_ref()
    }

    /// Reloads favorites for a new session, or clears them on logout.
    pub async fn on_session_change(&mut self, session: Option<&UserSession>) {
        self.session = session.cloned();
        self.favorites = match &self.session {
            Some(session) => self.reload(session).await,
            None => FavoriteSet::new(),
        };
    }

    /// A failed load reads as an empty set.
    async fn reload(&self, session: &UserSession) -> FavoriteSet {
        match self.store.load(session).await {
            Ok(favorites) => {
                tracing::debug!("Loaded {} favorites for {}", favorites.len(), session.uid);
                favorites
            }
            Err(e) => {
                tracing::warn!("⚠️ Could not load favorites for {}: {}", session.uid, e);
                FavoriteSet::new()
            }
        }
    }

    /// Waits for the next session transition and applies it.
    /// Returns false once the sending side is gone.
    pub async fn follow(&mut self, sessions: &mut watch::Receiver<Option<UserSession>>) -> bool {
        if sessions.changed().await.is_err() {
            return false;
        }
        let session = sessions.borrow_and_update().clone();
        self.on_session_change(session.as_ref()).await;
        true
    }

    /// Without a session the command is ignored and `None` is returned.
    pub async fn apply(&mut self, command: FavoriteCommand) -> Option<Notice> {
        let session = self.session.as_ref()?;

        let notice = match command {
            FavoriteCommand::Toggle(identity) => match self.favorites.toggle(&identity) {
                Toggle::Added => Notice::success("Added to favorites"),
                Toggle::Removed => Notice::info("Removed from favorites"),
            },
        };

        if let Err(e) = self.store.save(session, &self.favorites).await {
            tracing::warn!("⚠️ Favorites not saved for {}: {}", session.uid, e);
        }

        Some(notice)
    }
}
