//! Shared application state for axum handlers.

use std::sync::Arc;

use zonelight_app::services::zone_registry::ZoneRegistry;

/// State shared by every handler.
///
/// Generic over the registry's port types to avoid dynamic dispatch.
/// `Clone` is implemented manually so the ports do not need to be `Clone`.
pub struct AppState<L, N, P, S> {
    pub registry: Arc<ZoneRegistry<L, N, P, S>>,
}

impl<L, N, P, S> Clone for AppState<L, N, P, S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<L, N, P, S> AppState<L, N, P, S> {
    /// Serve a registry that is also driven by background tasks.
    pub fn new(registry: Arc<ZoneRegistry<L, N, P, S>>) -> Self {
        Self { registry }
    }
}
