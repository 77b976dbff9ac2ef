use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use crate::util;

/// Input provided to side effects after the pipeline completes selection.
#[derive(Clone)]
pub struct SideEffectInput<Q, C> {
    pub query: Arc<Q>,
    pub selected_candidates: Vec<C>,
}

/// A side effect is an action that runs after selection and does not
/// affect the pipeline result. Examples: preference learning, caching,
/// analytics events.
#[async_trait]
pub trait SideEffect<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Decide if this side effect should run.
    fn enable(&self, _query: Arc<Q>) -> bool {
        true
    }

    /// Execute the side effect.
    async fn run(&self, input: Arc<SideEffectInput<Q, C>>) -> Result<(), String>;

    /// Returns a stable name for logging/metrics.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}

/// Tracks the tasks spawned for side effects so completion can be awaited.
///
/// Side effects are fire-and-forget from the pipeline's perspective, but
/// every spawned handle is registered here; `flush` drains the registry and
/// awaits each handle, which is the only way to deterministically know that
/// all outstanding side effects finished. Handles are never left dangling.
#[derive(Default)]
pub struct SideEffectManager {
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl SideEffectManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn every enabled side effect against the given input, one task
    /// per effect. Failures are logged, never propagated.
    pub fn dispatch<Q, C>(
        &self,
        effects: Arc<Vec<Box<dyn SideEffect<Q, C>>>>,
        input: SideEffectInput<Q, C>,
    ) where
        Q: Clone + Send + Sync + 'static,
        C: Clone + Send + Sync + 'static,
    {
        let input = Arc::new(input);
        for idx in 0..effects.len() {
            let effects = Arc::clone(&effects);
            let input = Arc::clone(&input);
            let handle = tokio::spawn(async move {
                let effect = &effects[idx];
                if !effect.enable(Arc::clone(&input.query)) {
                    return;
                }
                if let Err(err) = effect.run(input).await {
                    log::warn!("side effect {} failed: {}", effect.name(), err);
                }
            });
            self.track(handle);
        }
    }

    fn track(&self, handle: JoinHandle<()>) {
        match self.pending.lock() {
            Ok(mut pending) => pending.push(handle),
            Err(poisoned) => {
                log::warn!("side effect registry lock was poisoned, recovering");
                poisoned.into_inner().push(handle);
            }
        }
    }

    /// Await completion of every outstanding side effect task.
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(poisoned) => {
                log::warn!("side effect registry lock was poisoned, recovering");
                poisoned.into_inner().drain(..).collect()
            }
        };
        for handle in handles {
            if let Err(err) = handle.await {
                log::warn!("side effect task aborted: {}", err);
            }
        }
    }

    /// Number of tasks currently registered (mostly for tests).
    pub fn pending_count(&self) -> usize {
        match self.pending.lock() {
            Ok(pending) => pending.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    struct NoQuery;

    struct CountingEffect {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SideEffect<NoQuery, u32> for CountingEffect {
        async fn run(&self, input: Arc<SideEffectInput<NoQuery, u32>>) -> Result<(), String> {
            self.runs
                .fetch_add(input.selected_candidates.len(), Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn flush_awaits_dispatched_effects() {
        let runs = Arc::new(AtomicUsize::new(0));
        let effects: Arc<Vec<Box<dyn SideEffect<NoQuery, u32>>>> =
            Arc::new(vec![Box::new(CountingEffect {
                runs: Arc::clone(&runs),
            })]);
        let manager = SideEffectManager::new();
        manager.dispatch(
            effects,
            SideEffectInput {
                query: Arc::new(NoQuery),
                selected_candidates: vec![1, 2, 3],
            },
        );
        assert_eq!(manager.pending_count(), 1);
        manager.flush().await;
        assert_eq!(manager.pending_count(), 0);
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }
}
