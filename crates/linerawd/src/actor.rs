//! The business-side seam the protocol session drives.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::BROKER_TARGET;

/// Publish/subscribe operations exposed to the command handlers.
///
/// Operations return `None` on success or a diagnostic describing why the
/// request was refused; the caller turns that diagnostic into a `FAILED`
/// result block. Implementations are called from the serial execution queue
/// and must be safe to share across threads.
#[cfg_attr(test, mockall::automock)]
pub trait PubSubActor: Send + Sync {
    /// Publishes a payload under the given metadata.
    fn publish(&self, metadata: &str, payload: &str) -> Option<String>;

    /// Registers a subscription filter under an identifier.
    fn subscribe(&self, subscription_id: i64, filter: &str) -> Option<String>;

    /// Removes a previously registered subscription.
    fn unsubscribe(&self, subscription_id: i64) -> Option<String>;

    /// Discards all subscription state.
    fn clear_cache(&self);
}

#[derive(Default)]
struct BrokerState {
    subscriptions: HashMap<i64, String>,
    publication_count: u64,
}

/// In-memory broker backing the default daemon wiring.
///
/// Tracks subscriptions and counts publications; matching published
/// payloads against subscription filters is left to real broker
/// integrations behind the [`PubSubActor`] seam.
#[derive(Default)]
pub struct InMemoryActor {
    state: Mutex<BrokerState>,
}

impl InMemoryActor {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of publications accepted so far.
    pub fn publication_count(&self) -> u64 {
        self.lock_state().publication_count
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.lock_state().subscriptions.len()
    }
}

impl PubSubActor for InMemoryActor {
    fn publish(&self, metadata: &str, payload: &str) -> Option<String> {
        if metadata.is_empty() {
            return Some("publication metadata must not be empty".to_owned());
        }
        let mut state = self.lock_state();
        state.publication_count += 1;
        debug!(
            target: BROKER_TARGET,
            metadata,
            payload_bytes = payload.len(),
            "accepted publication"
        );
        None
    }

    fn subscribe(&self, subscription_id: i64, filter: &str) -> Option<String> {
        let mut state = self.lock_state();
        if state.subscriptions.contains_key(&subscription_id) {
            return Some(format!("subscription {subscription_id} already exists"));
        }
        state.subscriptions.insert(subscription_id, filter.to_owned());
        debug!(target: BROKER_TARGET, subscription_id, "registered subscription");
        None
    }

    fn unsubscribe(&self, subscription_id: i64) -> Option<String> {
        let mut state = self.lock_state();
        if state.subscriptions.remove(&subscription_id).is_none() {
            return Some(format!("no subscription with id {subscription_id}"));
        }
        debug!(target: BROKER_TARGET, subscription_id, "removed subscription");
        None
    }

    fn clear_cache(&self) {
        let mut state = self.lock_state();
        state.subscriptions.clear();
        debug!(target: BROKER_TARGET, "cleared subscription state");
    }
}
