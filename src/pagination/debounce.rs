//! Single-slot debounce timer

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct Slot {
    timer: Option<JoinHandle<()>>,
    generation: u64,
}

/// Runs an action once its trigger has been quiet for `delay`.
///
/// Each [`call`](Self::call) cancels the pending timer and starts a new
/// one; timers are never queued. Only the timer is cancelled: once an
/// action has started it runs to completion on its own task.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    slot: Mutex<Slot>,
    // Highest generation whose timer has finished or been cancelled
    finished: Arc<watch::Sender<u64>>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            slot: Mutex::new(Slot::default()),
            finished: Arc::new(watch::Sender::new(0)),
        }
    }

    /// Quiet period before the action fires
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the timer with a new action. Must be called within a Tokio runtime.
    pub fn call<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let mut slot = self.slot();
        slot.generation += 1;
        let generation = slot.generation;

        let finished = Arc::clone(&self.finished);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Aborting the timer from here on only detaches the action
            let _ = tokio::spawn(action()).await;
            mark_finished(&finished, generation);
        });

        if let Some(previous) = slot.timer.replace(timer) {
            previous.abort();
            mark_finished(&self.finished, generation - 1);
        }
    }

    /// Cancel the pending timer, if any
    pub fn cancel(&self) {
        let mut slot = self.slot();
        if let Some(timer) = slot.timer.take() {
            timer.abort();
            mark_finished(&self.finished, slot.generation);
        }
    }

    /// Whether a timer is still waiting to fire or its action is running
    pub fn is_pending(&self) -> bool {
        self.pending_generation().is_some()
    }

    /// Wait until the pending timer has fired and its action has finished,
    /// following any timer that replaces it in the meantime.
    ///
    /// The timer stays in its slot, so dropping this future leaves
    /// later calls able to cancel it.
    pub async fn settled(&self) {
        let mut finished = self.finished.subscribe();
        loop {
            let Some(target) = self.pending_generation() else {
                return;
            };

            if finished.wait_for(|done| *done >= target).await.is_err() {
                return;
            }
            if self.slot().generation == target {
                return;
            }
        }
    }

    fn pending_generation(&self) -> Option<u64> {
        let slot = self.slot();
        let finished = *self.finished.borrow();
        (slot.timer.is_some() && slot.generation > finished).then_some(slot.generation)
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn mark_finished(finished: &watch::Sender<u64>, generation: u64) {
    finished.send_modify(|done| *done = (*done).max(generation));
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
