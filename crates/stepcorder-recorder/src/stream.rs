//! Channel-backed step stream
//!
//! For consumers on another thread that would rather poll a receiver than
//! run inside the fan-out.

use crate::registry::{subscriber, Subscriber};
use crate::step::Step;
use crossbeam_channel::{bounded, TrySendError};
pub use crossbeam_channel::Receiver;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{trace, warn};

type SubscriberFn = dyn Fn(&Step) -> anyhow::Result<()> + Send + Sync;

/// Receiving end of a subscribed channel.
///
/// The registry owns the sending subscriber. Once it is unsubscribed or the
/// recorder stops, the channel disconnects and iteration ends after the
/// buffered steps.
pub struct StepStream {
    events_rx: Receiver<Step>,
    subscriber: Weak<SubscriberFn>,
}

impl StepStream {
    pub(crate) fn bounded(capacity: usize) -> (Self, Subscriber) {
        let (tx, rx) = bounded::<Step>(capacity);
        let sub = subscriber(move |step| {
            match tx.try_send(step.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(capacity, kind = ?step.kind(), "step stream full, dropping step")
                }
                Err(TrySendError::Disconnected(_)) => trace!("step stream receiver gone"),
            }
            Ok(())
        });
        let stream = Self {
            events_rx: rx,
            subscriber: Arc::downgrade(&sub),
        };
        (stream, sub)
    }

    /// The subscriber feeding this stream, while it is still registered somewhere
    pub fn subscriber(&self) -> Option<Subscriber> {
        self.subscriber.upgrade()
    }

    /// Get the underlying receiver (for select! etc)
    pub fn receiver(&self) -> &Receiver<Step> {
        &self.events_rx
    }

    pub fn try_recv(&self) -> Option<Step> {
        self.events_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Step> {
        self.events_rx.recv_timeout(timeout).ok()
    }

    /// Everything buffered right now, oldest first
    pub fn drain(&self) -> Vec<Step> {
        self.events_rx.try_iter().collect()
    }

    pub fn is_connected(&self) -> bool {
        self.subscriber.strong_count() > 0
    }
}

impl Iterator for StepStream {
    type Item = Step;

    fn next(&mut self) -> Option<Self::Item> {
        self.events_rx.recv().ok()
    }
}
