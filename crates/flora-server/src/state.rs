//! Application state.

use std::sync::Arc;

use flora_cache::{ConditionalCacheGate, InvalidationPlanner};

use crate::auth::JwtVerifier;
use crate::dictionary::Dictionary;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    dictionary: Arc<dyn Dictionary>,
    gate: Arc<ConditionalCacheGate>,
    planner: Arc<InvalidationPlanner>,
    auth: Arc<JwtVerifier>,
}

impl AppState {
    pub fn new(
        dictionary: Arc<dyn Dictionary>,
        gate: ConditionalCacheGate,
        planner: InvalidationPlanner,
        auth: JwtVerifier,
    ) -> Self {
        Self {
            dictionary,
            gate: Arc::new(gate),
            planner: Arc::new(planner),
            auth: Arc::new(auth),
        }
    }

    pub fn dictionary(&self) -> &dyn Dictionary {
        self.dictionary.as_ref()
    }

    /// Gate compartido por las capas de cache de cada recurso.
    pub fn gate(&self) -> Arc<ConditionalCacheGate> {
        Arc::clone(&self.gate)
    }

    pub fn auth(&self) -> &JwtVerifier {
        &self.auth
    }

    /// Drops the user's cached pages. Call after the mutation succeeded.
    ///
    /// Failed deletes are already logged by the planner; the request that
    /// triggered the sweep still succeeds.
    pub async fn invalidate_user(&self, user_id: &str) {
        self.planner.invalidate_user(user_id).await;
    }
}
