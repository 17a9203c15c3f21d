//! Step registry - ordered step log plus subscriber fan-out

use crate::step::Step;
use crate::stream::StepStream;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use stepcorder_core::{Error, Result};
use tracing::{debug, trace};

/// Subscriber identity is the `Arc` allocation: subscribing the same `Arc`
/// twice delivers every step twice, and `unsubscribe` removes both.
pub type Subscriber = Arc<dyn Fn(&Step) -> anyhow::Result<()> + Send + Sync>;

pub fn subscriber<F>(f: F) -> Subscriber
where
    F: Fn(&Step) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[derive(Default)]
pub struct StepRegistry {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    steps: Vec<Step>,
    subscribers: Vec<Subscriber>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `step` and hand it to every subscriber, in subscription order.
    ///
    /// Fan-out runs over the subscribers present when the push started and
    /// without holding the registry lock, so subscribers may subscribe,
    /// unsubscribe or push from inside the callback. The first subscriber
    /// error ends the fan-out for this step and is returned; the step stays
    /// in the log.
    pub fn push(&self, step: Step) -> Result<()> {
        let subscribers = {
            let mut inner = self.inner.lock();
            inner.steps.push(step.clone());
            inner.subscribers.clone()
        };
        trace!(kind = ?step.kind(), subscribers = subscribers.len(), "step pushed");

        for subscriber in &subscribers {
            subscriber(&step).map_err(Error::subscriber_failed)?;
        }
        Ok(())
    }

    pub fn subscribe(&self, subscriber: Subscriber) {
        let mut inner = self.inner.lock();
        inner.subscribers.push(subscriber);
        debug!(subscribers = inner.subscribers.len(), "subscriber added");
    }

    pub fn unsubscribe(&self, subscriber: &Subscriber) {
        let mut inner = self.inner.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|s| !Arc::ptr_eq(s, subscriber));
        let removed = before - inner.subscribers.len();
        if removed > 0 {
            debug!(removed, "subscriber removed");
        }
    }

    /// Subscribe a bounded channel and return its receiving end
    pub fn stream(&self, capacity: usize) -> StepStream {
        let (stream, subscriber) = StepStream::bounded(capacity);
        self.subscribe(subscriber);
        stream
    }

    /// Drop the whole step history and every subscriber
    pub fn destroy(&self) {
        let mut inner = self.inner.lock();
        debug!(
            steps = inner.steps.len(),
            subscribers = inner.subscribers.len(),
            "registry destroyed"
        );
        inner.steps.clear();
        inner.subscribers.clear();
    }

    /// Snapshot of the log, in capture order
    pub fn steps(&self) -> Vec<Step> {
        self.inner.lock().steps.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().steps.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("StepRegistry")
            .field("steps", &inner.steps.len())
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}
