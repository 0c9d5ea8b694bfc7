use std::sync::Arc;

use crate::application::dispatcher::EventDispatcher;

/// Shared by every request of the callback router.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<EventDispatcher>,
    /// Checked against the token of each callback when set.
    pub verification_token: Option<String>,
    /// Enables decryption and signature checks when set.
    pub encrypt_key: Option<String>,
}

impl AppState {
    pub fn new(dispatcher: EventDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            verification_token: None,
            encrypt_key: None,
        }
    }

    pub fn with_verification_token(mut self, token: Option<String>) -> Self {
        self.verification_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_encrypt_key(mut self, key: Option<String>) -> Self {
        self.encrypt_key = key.filter(|k| !k.is_empty());
        self
    }
}
