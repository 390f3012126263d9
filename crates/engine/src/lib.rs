//! # TutorMatch Engine
//!
//! Orchestrates matching on top of a [`MatchStore`]: manual requests and their
//! confirmation, the automatic session-then-tutor pipeline, escalation to a coordinator
//! when the pipeline fails, and the read side (tutor listings, a student's requests,
//! analytics).
//!
//! The engine holds no locks of its own. Every write that must not race goes through a
//! single store method that re-checks its invariant at commit time.

pub mod analytics;
pub mod audit;
pub mod auto;
pub mod config;
pub mod escalation;
pub mod listing;
pub mod manual;
pub mod notifier;

use std::{future::Future, sync::Arc};

use tutormatch_core::{MatchError, MatchResult};
use tutormatch_db::MatchStore;

pub use config::EngineConfig;
pub use notifier::{NotificationQueue, NotificationSink, Notifier, TracingSink};

pub struct MatchEngine {
    store: Arc<dyn MatchStore>,
    notifier: Notifier,
    config: EngineConfig,
}

impl MatchEngine {
    pub fn new(store: Arc<dyn MatchStore>, notifier: Notifier, config: EngineConfig) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn MatchStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Runs `work` on its own task and waits for it. Dropping the returned future (request
/// timeout, client gone) no longer cancels `work`, so a match that already wrote to the
/// store still reaches its registration, audit entry and notifications.
pub async fn run_detached<T, F>(work: F) -> MatchResult<T>
where
    T: Send + 'static,
    F: Future<Output = MatchResult<T>> + Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|err| MatchError::Internal(format!("matching task failed: {err}").into()))?
}
