//! Request-state tracking for a single rebindable locator.
//!
//! A tracker owns a three-valued observable state (pending / failed /
//! succeeded) plus the initial idle state, and guarantees that a retrieval
//! superseded by a newer locator or by teardown never mutates state after it
//! stops being current.

use crate::api::Locator;
use crate::error::FetchError;
use crate::transport::Transport;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Observable state of one tracked request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// No request has been issued (sentinel locator).
    Idle,
    /// A retrieval is in flight.
    Pending,
    /// The retrieval settled with a well-formed payload.
    Succeeded(T),
    /// The retrieval settled with a failure; human-readable message.
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Outcome::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            Outcome::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Outcome::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Tracks the outcome of the most recently bound locator.
///
/// Each [`bind`](Self::bind) supersedes the previous one: the prior in-flight
/// retrieval is aborted, and its generation token is invalidated so a result
/// that has already left the transport can still never overwrite newer state.
pub struct RequestTracker<T> {
    transport: Arc<dyn Transport>,
    state: Arc<watch::Sender<Outcome<T>>>,
    generation: Arc<AtomicU64>,
    inflight: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl<T> RequestTracker<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (state, _) = watch::channel(Outcome::Idle);
        Self {
            transport,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            inflight: parking_lot::Mutex::new(None),
        }
    }

    /// Observe state transitions. The receiver always starts at the current
    /// state and only ever sees outcomes of the most recently bound locator.
    pub fn subscribe(&self) -> watch::Receiver<Outcome<T>> {
        self.state.subscribe()
    }

    /// Current state, cloned out of the observable slot.
    pub fn state(&self) -> Outcome<T>
    where
        T: Clone,
    {
        self.state.borrow().clone()
    }

    /// Binds a new locator, superseding any in-flight retrieval.
    ///
    /// The sentinel (`None`) resets the state to idle and issues nothing.
    /// Otherwise the state moves to pending and exactly one retrieval is
    /// issued; its result is published only if this binding is still current
    /// when it settles.
    pub fn bind(&self, locator: Locator) {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.inflight.lock().take() {
            previous.abort();
        }

        let url = match locator {
            Some(url) => url,
            None => {
                self.state.send_replace(Outcome::Idle);
                return;
            }
        };

        self.state.send_replace(Outcome::Pending);

        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        let generation = Arc::clone(&self.generation);

        let handle = tokio::spawn(async move {
            let outcome = match fetch_payload::<T>(transport.as_ref(), &url).await {
                Ok(payload) => Outcome::Succeeded(payload),
                Err(error) => Outcome::Failed(error.to_string()),
            };

            // The generation check and the write happen under the channel
            // lock, so a result from a stale binding can never land after a
            // newer bind has bumped the generation.
            let published = state.send_if_modified(|current| {
                if generation.load(Ordering::SeqCst) == token {
                    *current = outcome;
                    true
                } else {
                    false
                }
            });
            if !published {
                debug!("discarding superseded result for {}", url);
            }
        });

        *self.inflight.lock() = Some(handle);
    }
}

impl<T> Drop for RequestTracker<T> {
    fn drop(&mut self) {
        // Teardown invalidates any in-flight retrieval the same way a rebind does.
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.inflight.lock().take() {
            handle.abort();
        }
    }
}

/// One retrieval: transport, status check, payload parse.
pub(crate) async fn fetch_payload<T: DeserializeOwned>(
    transport: &dyn Transport,
    url: &str,
) -> Result<T, FetchError> {
    let response = transport.get(url).await?;
    if !response.is_success() {
        return Err(FetchError::Status(response.status));
    }
    serde_json::from_str(&response.body).map_err(|e| FetchError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MealList, MealSummary};
    use crate::transport::testing::FakeTransport;
    use serde::Deserialize;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Payload {
        value: String,
    }

    async fn settle<T: Clone + Send + Sync + 'static>(
        rx: &mut watch::Receiver<Outcome<T>>,
    ) -> Outcome<T> {
        loop {
            let current = rx.borrow_and_update().clone();
            match current {
                Outcome::Pending => {
                    if rx.changed().await.is_err() {
                        return current;
                    }
                }
                other => return other,
            }
        }
    }

    #[tokio::test]
    async fn success_publishes_parsed_payload() {
        let transport = Arc::new(FakeTransport::new());
        transport.ok("http://x/a", r#"{ "value": "hello" }"#);

        let tracker: RequestTracker<Payload> = RequestTracker::new(transport);
        let mut rx = tracker.subscribe();
        tracker.bind(Some("http://x/a".to_string()));

        let outcome = settle(&mut rx).await;
        assert_eq!(
            outcome.payload().map(|p| p.value.as_str()),
            Some("hello")
        );
    }

    #[tokio::test]
    async fn sentinel_stays_idle_and_issues_nothing() {
        let transport = Arc::new(FakeTransport::new());
        let tracker: RequestTracker<Payload> = RequestTracker::new(Arc::clone(&transport) as _);

        tracker.bind(None);
        assert!(tracker.state().is_idle());
        assert_eq!(transport.hits(), 0);
    }

    #[tokio::test]
    async fn sentinel_resets_any_prior_state() {
        let transport = Arc::new(FakeTransport::new());
        transport.ok("http://x/a", r#"{ "value": "hello" }"#);

        let tracker: RequestTracker<Payload> = RequestTracker::new(Arc::clone(&transport) as _);
        let mut rx = tracker.subscribe();
        tracker.bind(Some("http://x/a".to_string()));
        assert!(settle(&mut rx).await.payload().is_some());

        tracker.bind(None);
        assert!(tracker.state().is_idle());
    }

    #[tokio::test]
    async fn non_success_status_fails_with_message() {
        let transport = Arc::new(FakeTransport::new());
        transport.status("http://x/a", 500);

        let tracker: RequestTracker<Payload> = RequestTracker::new(transport);
        let mut rx = tracker.subscribe();
        tracker.bind(Some("http://x/a".to_string()));

        let outcome = settle(&mut rx).await;
        assert_eq!(outcome.failure(), Some("server returned status 500"));
    }

    #[tokio::test]
    async fn unparseable_body_fails_with_message() {
        let transport = Arc::new(FakeTransport::new());
        transport.ok("http://x/a", "not json");

        let tracker: RequestTracker<Payload> = RequestTracker::new(transport);
        let mut rx = tracker.subscribe();
        tracker.bind(Some("http://x/a".to_string()));

        let outcome = settle(&mut rx).await;
        assert!(outcome.failure().unwrap().starts_with("malformed response body"));
    }

    #[tokio::test]
    async fn network_failure_fails_with_message() {
        let transport = Arc::new(FakeTransport::new());
        transport.fail(
            "http://x/a",
            FetchError::Network("connection refused".to_string()),
        );

        let tracker: RequestTracker<Payload> = RequestTracker::new(transport);
        let mut rx = tracker.subscribe();
        tracker.bind(Some("http://x/a".to_string()));

        let outcome = settle(&mut rx).await;
        assert_eq!(outcome.failure(), Some("network error: connection refused"));
    }

    #[tokio::test]
    async fn null_meals_envelope_succeeds_with_empty_results() {
        let transport = Arc::new(FakeTransport::new());
        transport.ok("http://x/filter.php?c=Nope", r#"{ "meals": null }"#);

        let tracker: RequestTracker<MealList<MealSummary>> = RequestTracker::new(transport);
        let mut rx = tracker.subscribe();
        tracker.bind(Some("http://x/filter.php?c=Nope".to_string()));

        let outcome = settle(&mut rx).await;
        let list = outcome.payload().cloned().expect("should succeed");
        assert!(list.into_results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_newest_binding_is_observable() {
        let transport = Arc::new(FakeTransport::new());
        // The older binding resolves last; its result must never be seen.
        transport.ok_after(
            "http://x/old",
            r#"{ "value": "old" }"#,
            Duration::from_millis(100),
        );
        transport.ok_after(
            "http://x/new",
            r#"{ "value": "new" }"#,
            Duration::from_millis(10),
        );

        let tracker: RequestTracker<Payload> = RequestTracker::new(transport);
        let mut rx = tracker.subscribe();
        tracker.bind(Some("http://x/old".to_string()));
        tracker.bind(Some("http://x/new".to_string()));

        let outcome = settle(&mut rx).await;
        assert_eq!(outcome.payload().map(|p| p.value.as_str()), Some("new"));

        // Let the stale retrieval's deadline pass; state must not change.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(
            tracker.state().payload().map(|p| p.value.clone()),
            Some("new".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_retrieval_never_reports_failure() {
        let transport = Arc::new(FakeTransport::new());
        transport.fail(
            "http://x/slow",
            FetchError::Network("boom".to_string()),
        );

        let tracker: RequestTracker<Payload> = RequestTracker::new(transport);
        tracker.bind(Some("http://x/slow".to_string()));
        tracker.bind(None);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(tracker.state().is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_discards_the_inflight_retrieval() {
        let transport = Arc::new(FakeTransport::new());
        transport.ok_after(
            "http://x/slow",
            r#"{ "value": "late" }"#,
            Duration::from_millis(100),
        );

        let tracker: RequestTracker<Payload> = RequestTracker::new(transport);
        let mut rx = tracker.subscribe();
        tracker.bind(Some("http://x/slow".to_string()));
        drop(tracker);

        tokio::time::sleep(Duration::from_millis(200)).await;
        // The sender side is gone and no terminal state was ever published.
        assert!(rx.borrow_and_update().is_pending());
        assert!(rx.changed().await.is_err());
    }
}
