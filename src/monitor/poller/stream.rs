//! Polling stream implementation.
//!
//! This module provides [`PollingStream`], a stream that periodically
//! runs a blocking sample and yields the result when it changes.

use super::super::Sampler;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Interval, MissedTickBehavior, interval};
use tokio_stream::Stream;

type SampleResult<S> = Result<<S as Sampler>::Output, <S as Sampler>::Error>;

/// A stream of changed samples produced by polling.
///
/// This type is returned by [`super::PollingMonitor::into_stream`]. Each
/// sample runs on Tokio's blocking pool; the next tick is not awaited until
/// the in-flight sample finishes.
pub struct PollingStream<S: Sampler> {
    sampler: Arc<S>,
    interval: Interval,
    /// Sample currently running on the blocking pool
    in_flight: Option<JoinHandle<SampleResult<S>>>,
    /// Last yielded value for comparison
    last: Option<S::Output>,
    /// Whether the latest sample failed; only the first failure of a run warns
    failing: bool,
}

impl<S: Sampler> PollingStream<S> {
    pub(super) fn new(sampler: S, poll_interval: Duration) -> Self {
        let mut interval = interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            sampler: Arc::new(sampler),
            interval,
            in_flight: None,
            last: None,
            failing: false,
        }
    }

    /// Returns true while samples keep failing.
    pub(super) const fn is_failing(&self) -> bool {
        self.failing
    }

    /// Records a finished sample, returning it if it should be yielded.
    fn complete(&mut self, joined: Result<SampleResult<S>, JoinError>) -> Option<S::Output> {
        let value = match joined {
            Ok(Ok(value)) => {
                if self.failing {
                    tracing::info!("Sampling recovered");
                    self.failing = false;
                }
                value
            }
            Ok(Err(e)) => {
                if self.failing {
                    tracing::debug!("Sample still failing: {e}");
                } else {
                    tracing::warn!("Sample failed, retrying next tick: {e}");
                    self.failing = true;
                }
                return None;
            }
            Err(e) => {
                tracing::warn!("Sample task did not complete: {e}");
                return None;
            }
        };

        if self.last.as_ref() == Some(&value) {
            return None;
        }
        self.last = Some(value.clone());
        Some(value)
    }
}

// No field is structurally pinned.
impl<S: Sampler> Unpin for PollingStream<S> {}

impl<S: Sampler> Stream for PollingStream<S> {
    type Item = S::Output;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(handle) = this.in_flight.as_mut() {
                let joined = ready!(Pin::new(handle).poll(cx));
                this.in_flight = None;
                if let Some(value) = this.complete(joined) {
                    return Poll::Ready(Some(value));
                }
            }

            // Poll the interval timer - registers waker for next tick when Pending
            if this.interval.poll_tick(cx).is_pending() {
                return Poll::Pending;
            }

            let sampler = Arc::clone(&this.sampler);
            this.in_flight = Some(tokio::task::spawn_blocking(move || sampler.sample()));
        }
    }
}
