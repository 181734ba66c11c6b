//! Coalescing bursts of edits into a single delayed save.
//!
//! A [`DebouncedWriter`] has no thread of its own.  It is meant to be driven
//! from the event loop that also produces the edits: the loop waits for input
//! for no longer than [`DebouncedWriter::time_until_due`] and then calls
//! [`DebouncedWriter::poll`].  Since scheduling, cancelling and firing all
//! happen on that one execution context, a cancel can never race a firing
//! timer.
use std::fmt;
use std::time::{Duration, Instant};

pub(crate) trait Clock {
    fn now(&self) -> Instant;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// The persistence action a [`DebouncedWriter`] defers
pub(crate) trait Flush {
    type Error: fmt::Display;

    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// A scheduled flush.  A writer holds at most one; rescheduling replaces it
/// and cancelling takes it, so a superseded deadline cannot fire.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct PendingWrite {
    due: Instant,
}

#[derive(Debug)]
pub(crate) struct DebouncedWriter<T, K = SystemClock> {
    inner: T,
    clock: K,
    delay: Duration,
    pending: Option<PendingWrite>,
}

impl<T: Flush> DebouncedWriter<T> {
    pub(crate) fn new(inner: T, delay: Duration) -> Self {
        DebouncedWriter::with_clock(inner, delay, SystemClock)
    }
}

impl<T: Flush, K: Clock> DebouncedWriter<T, K> {
    pub(crate) fn with_clock(inner: T, delay: Duration, clock: K) -> Self {
        DebouncedWriter {
            inner,
            clock,
            delay,
            pending: None,
        }
    }

    pub(crate) fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutating the target through this reference does not schedule a
    /// flush; call [`DebouncedWriter::notify`] afterwards.
    pub(crate) fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub(crate) fn delay(&self) -> Duration {
        self.delay
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record that a mutation happened, restarting the quiet period
    pub(crate) fn notify(&mut self) {
        let due = self.clock.now() + self.delay;
        if self.pending.replace(PendingWrite { due }).is_some() {
            tracing::trace!("rescheduling pending flush");
        } else {
            tracing::debug!(delay = ?self.delay, "scheduling flush");
        }
    }

    /// Drop any scheduled flush without running it
    pub(crate) fn cancel(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!("cancelled pending flush");
        }
    }

    /// Cancel any scheduled flush and flush immediately
    pub(crate) fn flush_now(&mut self) {
        self.cancel();
        self.run_flush();
    }

    /// Time left before the scheduled flush is due, or `None` if nothing is
    /// scheduled.  A due flush yields `Some(Duration::ZERO)`.
    pub(crate) fn time_until_due(&self) -> Option<Duration> {
        self.pending
            .map(|pw| pw.due.saturating_duration_since(self.clock.now()))
    }

    /// Fire the scheduled flush if its deadline has passed.  Returns `true`
    /// if a flush was run.
    pub(crate) fn poll(&mut self) -> bool {
        match self.pending {
            Some(pw) if pw.due <= self.clock.now() => {
                self.pending = None;
                self.run_flush();
                true
            }
            _ => false,
        }
    }

    fn run_flush(&mut self) {
        if let Err(e) = self.inner.flush() {
            // The in-memory state stays authoritative until the next flush
            tracing::warn!(error = %e, "flush failed; changes remain unsaved");
        }
    }
}
