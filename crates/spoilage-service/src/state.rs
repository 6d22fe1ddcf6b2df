//! Application state shared across handlers.

use std::sync::Arc;

use spoilage_core::Classifier;
use spoilage_store::Store;
use tokio::sync::Mutex;

/// Shared application state.
pub struct AppState {
    /// The reading store (wrapped in Mutex for thread-safe access).
    pub store: Mutex<Store>,
    /// Classifier chosen at startup. Immutable, so no lock is needed.
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Store, classifier: Arc<dyn Classifier>) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
            classifier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spoilage_core::RuleClassifier;
    use spoilage_store::NewReading;
    use spoilage_types::{Prediction, SensorValues};

    #[tokio::test]
    async fn test_app_state_new() {
        let store = Store::open_in_memory().unwrap();
        let state = AppState::new(store, Arc::new(RuleClassifier::default()));

        assert_eq!(state.classifier.name(), "rule");
        assert_eq!(state.store.lock().await.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_shared_between_clones() {
        let store = Store::open_in_memory().unwrap();
        let state = AppState::new(store, Arc::new(RuleClassifier::default()));
        let other = Arc::clone(&state);

        other
            .store
            .lock()
            .await
            .insert(&NewReading::new(
                SensorValues::new(20.0, 50.0, 100.0, 500.0),
                Prediction::Ok,
            ))
            .unwrap();

        assert_eq!(state.store.lock().await.count().unwrap(), 1);
    }
}
