use std::sync::Arc;

use super::config::AuthSettings;
use crate::strategy::CasStrategy;

/// Shared state for auth route handlers.
pub(super) struct AuthState<V, H> {
    pub(super) strategy: Arc<CasStrategy<V>>,
    pub(super) login_handler: Arc<H>,
    pub(super) settings: AuthSettings,
}

// Manual Clone: avoid derive adding `V: Clone, H: Clone` bounds.
impl<V, H> Clone for AuthState<V, H> {
    fn clone(&self) -> Self {
        Self {
            strategy: self.strategy.clone(),
            login_handler: self.login_handler.clone(),
            settings: self.settings.clone(),
        }
    }
}
