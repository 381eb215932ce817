use crate::core::UserSession;
use tokio::sync::watch;

/// Holds the current session and tells subscribers about every login and logout.
#[derive(Debug)]
pub struct SessionHub {
    sender: watch::Sender<Option<UserSession>>,
}

impl SessionHub {
    pub fn new(initial: Option<UserSession>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn current(&self) -> Option<UserSession> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserSession>> {
        self.sender.subscribe()
    }

    pub fn sign_in(&self, session: UserSession) {
        tracing::info!("🔑 Signed in as {}", session.uid);
        self.sender.send_replace(Some(session));
    }

    pub fn sign_out(&self) {
        if self.sender.send_replace(None).is_some() {
            tracing::info!("👋 Signed out");
        }
    }
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new(None)
    }
}
