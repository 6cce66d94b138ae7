//! One-shot notices carried in the session and consumed by the next
//! rendered page, the classic flash-message pattern.

use serde::{Deserialize, Serialize};
use tower_sessions::{session, Session};

const FLASH_KEY: &str = "_flash";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

pub async fn push(
    session: &Session,
    kind: FlashKind,
    message: impl Into<String>,
) -> Result<(), session::Error> {
    let mut pending: Vec<Flash> = session.get(FLASH_KEY).await?.unwrap_or_default();
    pending.push(Flash {
        kind,
        message: message.into(),
    });
    session.insert(FLASH_KEY, pending).await
}

/// Remove and return all pending messages; they are shown at most once.
pub async fn take(session: &Session) -> Result<Vec<Flash>, session::Error> {
    Ok(session.remove(FLASH_KEY).await?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn session() -> Session {
        let store = Arc::new(MemoryStore::default());
        Session::new(None, store, None)
    }

    #[tokio::test]
    async fn take_drains_pending_messages() {
        let session = session();
        push(&session, FlashKind::Error, "There are errors in the form:")
            .await
            .unwrap();
        push(&session, FlashKind::Error, "Question must not be empty.")
            .await
            .unwrap();

        let flashes = take(&session).await.unwrap();
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].kind, FlashKind::Error);
        assert_eq!(flashes[1].message, "Question must not be empty.");

        assert!(take(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn take_on_fresh_session_is_empty() {
        assert!(take(&session()).await.unwrap().is_empty());
    }
}
