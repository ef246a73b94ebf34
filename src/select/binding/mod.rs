
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, warn};

use super::{Debouncer, RepoSelect};
use crate::config::SelectConfig;
use crate::router::Router;

/// Wires description input to the repository select.
///
/// Each debounced evaluation takes the next request number. Results are applied
/// only while their number is still the latest issued, so a slow earlier request
/// can't overwrite a newer one.
#[derive(Debug)]
pub struct SelectBinding {
    select: Arc<Mutex<RepoSelect>>,
    debouncer: Debouncer<String>,
    applied: watch::Receiver<u64>,
}

impl SelectBinding {
    /// Must be called from within a tokio runtime
    #[inline]
    pub fn new(router: Arc<Router>, select: Arc<Mutex<RepoSelect>>, config: &SelectConfig) -> Self {
        let latest = Arc::new(AtomicU64::new(0));
        let (applied_tx, applied) = watch::channel(0_u64);
        let applied_tx = Arc::new(applied_tx);
        let max_visible = config.max_visible;

        let target = Arc::clone(&select);
        let debouncer = Debouncer::spawn(
            Duration::from_millis(config.debounce_ms),
            move |text: String| {
                let sequence = latest.fetch_add(1, Ordering::SeqCst) + 1;
                let router = Arc::clone(&router);
                let select = Arc::clone(&target);
                let latest = Arc::clone(&latest);
                let applied_tx = Arc::clone(&applied_tx);

                async move {
                    debug!("Evaluating request {} (length: {})", sequence, text.len());

                    let matches =
                        match tokio::task::spawn_blocking(move || router.find_matches(&text)).await
                        {
                            Ok(Ok(matches)) => matches,
                            Ok(Err(e)) => {
                                error!("Request {} failed: {}", sequence, e);
                                return;
                            }
                            Err(e) => {
                                error!("Request {} task failed: {}", sequence, e);
                                return;
                            }
                        };

                    let mut select = select.lock().unwrap_or_else(PoisonError::into_inner);
                    let newest = latest.load(Ordering::SeqCst);
                    if newest != sequence {
                        warn!(
                            "Dropping stale results for request {} (latest is {})",
                            sequence, newest
                        );
                        return;
                    }

                    select.apply_matches(&matches, max_visible);
                    drop(select);
                    applied_tx.send_replace(sequence);
                }
            },
        );

        Self {
            select,
            debouncer,
            applied,
        }
    }

    /// Feed the current contents of the description field
    #[inline]
    pub fn on_input(&self, text: impl Into<String>) {
        if !self.debouncer.push(text.into()) {
            warn!("Input ignored: binding is shut down");
        }
    }

    /// Receives the number of each request whose results were applied
    #[inline]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.applied.clone()
    }

    #[inline]
    pub fn snapshot(&self) -> RepoSelect {
        self.select
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Evaluate any pending input and wait for in-flight requests
    #[inline]
    pub async fn close(self) {
        self.debouncer.close().await;
    }
}
