//! Per-user ledgers.
//!
//! Every session owns an independent [`Blockchain`]. The store is handed to
//! whoever serves requests; nothing here is global.

use crate::blockchain::Blockchain;
use crate::error::{ChainError, Result};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Opaque 128-bit session identifier, hex encoded.
pub type SessionId = String;

#[derive(Clone)]
pub struct SessionStore {
    ledgers: Arc<RwLock<HashMap<SessionId, Blockchain>>>,
    max_sessions: usize,
}

fn new_session_id() -> SessionId {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    hex::encode(bytes)
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            ledgers: Arc::new(RwLock::new(HashMap::new())),
            max_sessions,
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    /// Open a session with a fresh ledger.
    pub async fn create(&self) -> Result<SessionId> {
        let mut ledgers = self.ledgers.write().await;
        if ledgers.len() >= self.max_sessions {
            return Err(ChainError::SessionLimitReached(self.max_sessions));
        }

        let mut id = new_session_id();
        while ledgers.contains_key(&id) {
            id = new_session_id();
        }
        ledgers.insert(id.clone(), Blockchain::new());
        tracing::debug!(session = %id, open = ledgers.len(), "session created");
        Ok(id)
    }

    /// Run `f` against the session's ledger for reading.
    pub async fn with_ledger<T>(&self, id: &str, f: impl FnOnce(&Blockchain) -> T) -> Result<T> {
        let ledgers = self.ledgers.read().await;
        let chain = ledgers
            .get(id)
            .ok_or_else(|| ChainError::SessionNotFound(id.to_string()))?;
        Ok(f(chain))
    }

    /// Run `f` against the session's ledger with exclusive access.
    pub async fn with_ledger_mut<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Blockchain) -> T,
    ) -> Result<T> {
        let mut ledgers = self.ledgers.write().await;
        let chain = ledgers
            .get_mut(id)
            .ok_or_else(|| ChainError::SessionNotFound(id.to_string()))?;
        Ok(f(chain))
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        let mut ledgers = self.ledgers.write().await;
        if ledgers.remove(id).is_none() {
            return Err(ChainError::SessionNotFound(id.to_string()));
        }
        tracing::debug!(session = %id, "session closed");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.ledgers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ledgers.read().await.is_empty()
    }
}
