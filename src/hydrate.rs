//! Batch hydration of the favorites set: one detail retrieval per favorite
//! id, all issued concurrently.
//!
//! Policy is strict: any individual failure aborts the whole batch and
//! surfaces as one aggregate error; no partial results are published. The
//! running hydrator re-runs the full batch whenever the favorites set
//! changes, discarding any in-flight batch the same way the request tracker
//! discards a superseded locator.

use crate::api::MealApi;
use crate::error::FetchError;
use crate::favorites::Favorites;
use crate::model::{Meal, MealList};
use crate::tracker::{fetch_payload, Outcome};
use crate::transport::Transport;
use futures::future::try_join_all;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Fetches the full detail for one meal id.
///
/// An empty or null `meals` envelope here means the id has no backing record,
/// which under the strict batch policy is a failure, unlike the list
/// operations where null means "no results".
pub async fn fetch_meal(
    transport: &dyn Transport,
    api: &MealApi,
    id: &str,
) -> Result<Meal, FetchError> {
    let list: MealList<Meal> = fetch_payload(transport, &api.lookup(id)).await?;
    list.into_results()
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::NotFound(id.to_string()))
}

/// Fetches full detail for every id concurrently; completes only when every
/// retrieval has settled or the first failure aborts the batch.
pub async fn hydrate_favorites(
    transport: &dyn Transport,
    api: &MealApi,
    ids: &[String],
) -> Result<Vec<Meal>, FetchError> {
    try_join_all(ids.iter().map(|id| fetch_meal(transport, api, id))).await
}

/// Background task that keeps an observable hydrated view of the favorites
/// set, re-running on every mutation.
pub struct FavoritesHydrator {
    state: Arc<watch::Sender<Outcome<Vec<Meal>>>>,
    handle: JoinHandle<()>,
}

impl FavoritesHydrator {
    /// Spawns the hydration loop. The first batch runs immediately; each
    /// favorites mutation supersedes whatever is in flight.
    pub fn spawn(favorites: Arc<Favorites>, transport: Arc<dyn Transport>, api: MealApi) -> Self {
        let (state, _) = watch::channel(Outcome::Pending);
        let state = Arc::new(state);

        let task_state = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            let mut changes = favorites.watch();
            loop {
                let ids = favorites.list();
                task_state.send_replace(Outcome::Pending);

                tokio::select! {
                    result = hydrate_favorites(transport.as_ref(), &api, &ids) => {
                        let outcome = match result {
                            Ok(meals) => Outcome::Succeeded(meals),
                            Err(error) => Outcome::Failed(error.to_string()),
                        };
                        task_state.send_replace(outcome);

                        // Batch settled; wait for the next mutation.
                        if changes.changed().await.is_err() {
                            break;
                        }
                    }
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        debug!("favorites changed, superseding in-flight hydration");
                    }
                }
            }
        });

        Self { state, handle }
    }

    /// Observe the hydrated view.
    pub fn subscribe(&self) -> watch::Receiver<Outcome<Vec<Meal>>> {
        self.state.subscribe()
    }
}

impl Drop for FavoritesHydrator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
