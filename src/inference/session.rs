//! Lazily constructed, memoized classifier handle.

use crate::config::LoadFailurePolicy;
use crate::error::{Error, Result};
use crate::inference::{ClassifierBackend, ClassifierSession, ModelSelector};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Cloneable load failure, shared by every caller of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// No backend, or the backend is not callable.
    Unavailable(String),
    /// Construction failed.
    Load(String),
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(reason) | Self::Load(reason) => f.write_str(reason),
        }
    }
}

impl From<LoadFailure> for Error {
    fn from(failure: LoadFailure) -> Self {
        match failure {
            LoadFailure::Unavailable(reason) => Self::ModelUnavailable { reason },
            LoadFailure::Load(reason) => Self::ModelLoad { reason },
        }
    }
}

impl From<Error> for LoadFailure {
    fn from(err: Error) -> Self {
        match err {
            Error::ModelUnavailable { reason } => Self::Unavailable(reason),
            Error::ModelLoad { reason } => Self::Load(reason),
            other => Self::Load(other.to_string()),
        }
    }
}

type LoadResult = std::result::Result<Arc<dyn ClassifierSession>, LoadFailure>;
type PendingLoad = Shared<BoxFuture<'static, LoadResult>>;

/// Memo slot: the shared attempt plus the generation that created it.
struct Slot {
    generation: u64,
    attempt: Option<PendingLoad>,
}

/// Lazy singleton around a [`ClassifierBackend`].
///
/// The first `acquire` starts construction; concurrent callers attach to the
/// same in-flight future. Under [`LoadFailurePolicy::Retry`] a failed attempt
/// is forgotten so the next `acquire` constructs again.
pub struct ModelSession {
    backend: Option<Arc<dyn ClassifierBackend>>,
    selector: ModelSelector,
    policy: LoadFailurePolicy,
    slot: Mutex<Slot>,
    attempts: Arc<AtomicUsize>,
}

impl ModelSession {
    /// Create an unloaded session. `None` means no classifier is available.
    pub fn new(
        backend: Option<Arc<dyn ClassifierBackend>>,
        selector: ModelSelector,
        policy: LoadFailurePolicy,
    ) -> Self {
        Self {
            backend,
            selector,
            policy,
            slot: Mutex::new(Slot {
                generation: 0,
                attempt: None,
            }),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Resolve the loaded classifier, constructing it on first use.
    pub async fn acquire(&self) -> Result<Arc<dyn ClassifierSession>> {
        let (generation, pending) = self.pending()?;

        match pending.await {
            Ok(session) => Ok(session),
            Err(failure) => {
                if self.policy == LoadFailurePolicy::Retry {
                    self.forget(generation);
                }
                Err(failure.into())
            }
        }
    }

    /// Whether a classifier has been constructed successfully.
    pub fn is_loaded(&self) -> bool {
        let Ok(slot) = self.slot.lock() else {
            return false;
        };
        slot.attempt
            .as_ref()
            .and_then(Shared::peek)
            .is_some_and(std::result::Result::is_ok)
    }

    /// Number of construction attempts started so far.
    pub fn load_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn pending(&self) -> Result<(u64, PendingLoad)> {
        let mut slot = self.slot.lock().map_err(|_| Error::Internal {
            message: "model session lock poisoned".to_string(),
        })?;

        if let Some(attempt) = &slot.attempt {
            debug!("Attaching to existing model load");
            return Ok((slot.generation, attempt.clone()));
        }

        slot.generation += 1;
        let attempt = self.start_load();
        slot.attempt = Some(attempt.clone());
        Ok((slot.generation, attempt))
    }

    fn start_load(&self) -> PendingLoad {
        let backend = self.backend.clone();
        let selector = self.selector.clone();
        let attempts = Arc::clone(&self.attempts);

        async move {
            let Some(backend) = backend else {
                return Err(LoadFailure::Unavailable(
                    "no classifier backend configured".to_string(),
                ));
            };
            if !backend.is_available() {
                return Err(LoadFailure::Unavailable(format!(
                    "{} backend is not callable",
                    backend.name()
                )));
            }

            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            info!("Loading {selector} via {} (attempt {attempt})", backend.name());
            match backend.load(&selector).await {
                Ok(session) => {
                    info!("Classifier ready");
                    Ok(session)
                }
                Err(e) => {
                    warn!("Classifier load failed: {e}");
                    Err(LoadFailure::from(e))
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Drop a failed attempt unless a newer one already replaced it.
    fn forget(&self, generation: u64) {
        if let Ok(mut slot) = self.slot.lock()
            && slot.generation == generation
        {
            debug!("Forgetting failed model load");
            slot.attempt = None;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::inference::Prediction;
    use crate::photo::ImageBuffer;
    use async_trait::async_trait;

    struct Constant;

    #[async_trait]
    impl ClassifierSession for Constant {
        async fn classify(&self, _: &ImageBuffer) -> Result<Vec<Prediction>> {
            Ok(vec![Prediction::new("monarch", 0.9)])
        }
    }

    struct Flaky {
        failures_left: AtomicUsize,
    }

    #[async_trait]
    impl ClassifierBackend for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn load(&self, _: &ModelSelector) -> Result<Arc<dyn ClassifierSession>> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(Error::ModelLoad {
                    reason: "weights missing".to_string(),
                });
            }
            Ok(Arc::new(Constant))
        }
    }

    struct Unplugged;

    #[async_trait]
    impl ClassifierBackend for Unplugged {
        fn name(&self) -> &str {
            "unplugged"
        }

        fn is_available(&self) -> bool {
            false
        }

        async fn load(&self, _: &ModelSelector) -> Result<Arc<dyn ClassifierSession>> {
            Ok(Arc::new(Constant))
        }
    }

    fn session(failures: usize, policy: LoadFailurePolicy) -> ModelSession {
        ModelSession::new(
            Some(Arc::new(Flaky {
                failures_left: AtomicUsize::new(failures),
            })),
            ModelSelector::default(),
            policy,
        )
    }

    #[tokio::test]
    async fn test_missing_backend_is_unavailable() {
        let session = ModelSession::new(None, ModelSelector::default(), LoadFailurePolicy::Retry);
        assert!(matches!(
            session.acquire().await,
            Err(Error::ModelUnavailable { .. })
        ));
        assert_eq!(session.load_attempts(), 0);
    }

    #[tokio::test]
    async fn test_uncallable_backend_is_unavailable() {
        let session = ModelSession::new(
            Some(Arc::new(Unplugged)),
            ModelSelector::default(),
            LoadFailurePolicy::Retry,
        );
        assert!(matches!(
            session.acquire().await,
            Err(Error::ModelUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_error_reason_not_rewrapped() {
        let session = session(1, LoadFailurePolicy::Retry);
        let err = session.acquire().await.err().unwrap();
        assert_eq!(err.to_string(), "failed to load classifier: weights missing");
    }

    #[tokio::test]
    async fn test_retry_policy_reloads_after_failure() {
        let session = session(1, LoadFailurePolicy::Retry);
        assert!(session.acquire().await.is_err());
        assert!(!session.is_loaded());

        assert!(session.acquire().await.is_ok());
        assert!(session.is_loaded());
        assert_eq!(session.load_attempts(), 2);
    }

    #[tokio::test]
    async fn test_cache_policy_keeps_failure() {
        let session = session(1, LoadFailurePolicy::Cache);
        assert!(session.acquire().await.is_err());
        assert!(matches!(
            session.acquire().await,
            Err(Error::ModelLoad { .. })
        ));
        assert_eq!(session.load_attempts(), 1);
    }

    #[tokio::test]
    async fn test_success_is_memoized() {
        let session = session(0, LoadFailurePolicy::Retry);
        let first = session.acquire().await.unwrap();
        let second = session.acquire().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(session.load_attempts(), 1);
    }
}
