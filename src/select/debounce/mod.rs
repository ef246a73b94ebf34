
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::timeout;
use tracing::{debug, error};

/// Collapses bursts of values into one call per quiet period.
///
/// Every new value restarts the quiet period. When it elapses, the latest value
/// is handed to the callback and the returned future is spawned; earlier futures
/// are never cancelled.
#[derive(Debug)]
pub struct Debouncer<T> {
    sender: mpsc::UnboundedSender<T>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Must be called from within a tokio runtime
    #[inline]
    pub fn spawn<F, Fut>(delay: Duration, mut fire: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (sender, mut receiver) = mpsc::unbounded_channel::<T>();

        let worker = tokio::spawn(async move {
            let mut in_flight = JoinSet::new();

            while let Some(mut value) = receiver.recv().await {
                let mut superseded = 0_usize;
                let mut closed = false;

                loop {
                    match timeout(delay, receiver.recv()).await {
                        Ok(Some(newer)) => {
                            value = newer;
                            superseded += 1;
                        }
                        Ok(None) => {
                            closed = true;
                            break;
                        }
                        Err(_) => break,
                    }
                }

                debug!("Debounce fired ({} superseded values)", superseded);
                in_flight.spawn(fire(value));
                while let Some(result) = in_flight.try_join_next() {
                    if let Err(e) = result {
                        error!("Debounced task failed: {}", e);
                    }
                }

                if closed {
                    break;
                }
            }

            while let Some(result) = in_flight.join_next().await {
                if let Err(e) = result {
                    error!("Debounced task failed: {}", e);
                }
            }
        });

        Self { sender, worker }
    }

    /// Queue a value. Returns false once the debouncer has shut down.
    #[inline]
    pub fn push(&self, value: T) -> bool {
        self.sender.send(value).is_ok()
    }

    /// Flush any pending value and wait for every spawned callback to finish
    #[inline]
    pub async fn close(self) {
        drop(self.sender);
        if let Err(e) = self.worker.await {
            error!("Debounce worker failed: {}", e);
        }
    }
}
