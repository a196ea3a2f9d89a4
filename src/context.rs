//! Shared application context.
//!
//! The context is constructed exactly once at process start and handed around
//! by `Arc` handle, replacing any hidden singleton. The view layer may still
//! reach it through [`AppContext::current`], which fails loudly when the
//! context was never initialized; silently handing out a default would let
//! favorites mutations vanish.

use crate::api::MealApi;
use crate::favorites::Favorites;
use crate::settings::Settings;
use crate::store::{KvStore, MemoryStore, SledStore};
use crate::transport::{HttpTransport, Transport};
use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

static CONTEXT: OnceCell<Arc<AppContext>> = OnceCell::new();

/// Everything the view layer needs: endpoints, transport, and the one shared
/// favorites instance.
pub struct AppContext {
    pub settings: Settings,
    pub transport: Arc<dyn Transport>,
    pub api: MealApi,
    pub favorites: Arc<Favorites>,
}

impl AppContext {
    /// Assembles a context from explicit collaborators. Tests use this
    /// directly; production code goes through [`AppContext::init`].
    pub fn new(
        settings: Settings,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KvStore>,
    ) -> Result<Self> {
        let api = MealApi::new(&settings.api.base_url)?;
        let favorites = Arc::new(Favorites::open(store));
        Ok(Self {
            settings,
            transport,
            api,
            favorites,
        })
    }

    /// Builds the production context and registers it as the process-wide
    /// instance. May be called once per process.
    pub fn init(settings: Settings) -> Result<Arc<Self>> {
        let store: Arc<dyn KvStore> = if settings.storage.ephemeral {
            Arc::new(MemoryStore::new())
        } else {
            match SledStore::open(&settings.storage.path) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    // Degraded persistence, not a startup failure.
                    warn!("falling back to in-memory store: {:#}", e);
                    Arc::new(MemoryStore::new())
                }
            }
        };

        let transport = Arc::new(HttpTransport::new(Duration::from_secs(
            settings.api.timeout_seconds,
        ))?);

        let context = Arc::new(Self::new(settings, transport, store)?);
        CONTEXT
            .set(Arc::clone(&context))
            .map_err(|_| anyhow!("application context initialized twice"))?;
        Ok(context)
    }

    /// The process-wide context.
    ///
    /// # Panics
    /// Panics when called before [`AppContext::init`]; that is a wiring bug
    /// in the caller, not a runtime condition to recover from.
    pub fn current() -> Arc<Self> {
        AppContext::try_current()
            .expect("application context accessed before AppContext::init")
    }

    /// Non-panicking probe for the process-wide context.
    pub fn try_current() -> Option<Arc<Self>> {
        CONTEXT.get().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::FakeTransport;

    #[test]
    fn explicit_construction_does_not_touch_the_global() {
        let context = AppContext::new(
            Settings::default(),
            Arc::new(FakeTransport::new()),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();

        assert!(context.favorites.list().is_empty());
        assert!(AppContext::try_current().is_none());
    }
}
