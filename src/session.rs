//! Session context handed to everything that talks to the API.
//!
//! The credential is read and written only here. Consumers that need to react
//! to sign-in, sign-out or a change of user watch [`Session::subscribe`].

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::Result;
use crate::storage::TokenStore;

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    /// Bumped on every login so that re-login with the same token still
    /// counts as a new session.
    generation: u64,
}

impl Credential {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("generation", &self.generation)
            .finish()
    }
}

struct Inner {
    store: Arc<dyn TokenStore>,
    current: watch::Sender<Option<Credential>>,
}

#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    /// Picks up a token persisted by a previous run.
    pub fn restore(store: Arc<dyn TokenStore>) -> Result<Self> {
        let credential = store.load()?.map(|token| Credential {
            token,
            generation: 1,
        });
        if credential.is_some() {
            log::info!("Restored persisted session");
        }
        let (current, _) = watch::channel(credential);
        Ok(Self {
            inner: Arc::new(Inner { store, current }),
        })
    }

    pub fn login(&self, token: &str) -> Result<()> {
        let token = token.trim();
        self.inner.store.save(token)?;
        self.inner.current.send_modify(|current| {
            let generation = current.as_ref().map(|c| c.generation).unwrap_or(0) + 1;
            *current = Some(Credential {
                token: token.to_string(),
                generation,
            });
        });
        log::info!("Signed in");
        Ok(())
    }

    /// Clears the in-memory credential even if removing the file fails.
    pub fn logout(&self) -> Result<()> {
        self.inner.current.send_replace(None);
        log::info!("Signed out");
        self.inner.store.clear()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.inner.current.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .current
            .borrow()
            .as_ref()
            .map(|c| c.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.current.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Credential>> {
        self.inner.current.subscribe()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
