//! Generic fan-out/fan-in primitives over tokio channels.
//!
//! Nothing here knows about HTTP or records; stages are plain
//! `mpsc::Receiver<T>` streams.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

/// Capacity of every inter-stage channel. One slot is the closest tokio
/// gets to a rendezvous channel, so a slow consumer stalls its producers.
pub const STAGE_CAPACITY: usize = 1;

/// Create a bounded stage channel.
pub fn stage<T>() -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(STAGE_CAPACITY)
}

/// Invoke `factory` exactly `n` times and collect the streams it returns.
pub fn split<T, F>(n: usize, mut factory: F) -> Vec<mpsc::Receiver<T>>
where
    F: FnMut() -> mpsc::Receiver<T>,
{
    (0..n).map(|_| factory()).collect()
}

/// Combine any number of streams into one.
///
/// Every element of every input is delivered exactly once. Order is kept
/// within an input but not across inputs. The output closes only after all
/// inputs have closed: each forwarder holds one sender clone, and the
/// channel closes when the last clone is dropped.
pub fn merge<T>(inputs: Vec<mpsc::Receiver<T>>) -> mpsc::Receiver<T>
where
    T: Send + 'static,
{
    let (tx, rx) = stage();

    for mut input in inputs {
        let tx = tx.clone();
        tokio::spawn(async move {
            while let Some(item) = input.recv().await {
                if tx.send(item).await.is_err() {
                    tracing::warn!("Merged output dropped, abandoning input");
                    break;
                }
            }
        });
    }

    rx
}

/// A receiver that many tasks can pull from concurrently.
///
/// Each item goes to exactly one caller of [`recv`](Self::recv).
pub struct SharedReceiver<T> {
    inner: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> SharedReceiver<T> {
    pub fn new(rx: mpsc::Receiver<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(rx)),
        }
    }

    /// Next item, or `None` once the sender side has closed and drained.
    pub async fn recv(&self) -> Option<T> {
        self.inner.lock().await.recv().await
    }
}

impl<T> Clone for SharedReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
