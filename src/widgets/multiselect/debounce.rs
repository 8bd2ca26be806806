// SPDX-License-Identifier: MPL-2.0

//! Single-slot debounce timer.
//!
//! Arming a new timer aborts the previous one, and only the most recently
//! armed ticket is accepted when its timer fires.

use futures_util::future::{AbortHandle, Abortable, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Default delay between the last keystroke and the search.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Identifies one armed timer.
pub type DebounceTicket = u64;

/// Owns at most one pending timer.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    last_ticket: DebounceTicket,
    pending: Option<(DebounceTicket, AbortHandle)>,
}

/// A timer armed by [`Debouncer::arm`], to be awaited by the host.
pub struct DebounceTimer {
    pub ticket: DebounceTicket,
    future: BoxFuture<'static, ()>,
}

impl fmt::Debug for DebounceTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebounceTimer")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

impl DebounceTimer {
    /// Waits until the timer expires or is superseded, then yields its ticket.
    ///
    /// A superseded ticket returns early and is rejected by [`Debouncer::fire`].
    pub async fn wait(self) -> DebounceTicket {
        self.future.await;
        self.ticket
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_ticket: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Returns true while a timer is armed and not yet fired or cancelled.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Runs `future` after the delay, unless another call supersedes it first.
    ///
    /// Resolves to `None` when superseded or cancelled.
    pub fn run<F>(
        &mut self,
        future: F,
    ) -> (DebounceTicket, impl Future<Output = Option<F::Output>> + Send + use<F>)
    where
        F: Future + Send + 'static,
        F::Output: Send,
    {
        self.cancel();
        self.last_ticket += 1;
        let ticket = self.last_ticket;

        let (handle, registration) = AbortHandle::new_pair();
        self.pending = Some((ticket, handle));

        let delay = self.delay;
        let guarded = Abortable::new(
            async move {
                tokio::time::sleep(delay).await;
                future.await
            },
            registration,
        );

        (ticket, async move { guarded.await.ok() })
    }

    /// Arms a bare timer. The host awaits it and hands the ticket back to [`fire`](Self::fire).
    pub fn arm(&mut self) -> DebounceTimer {
        let (ticket, future) = self.run(async {});
        DebounceTimer {
            ticket,
            future: future.map(|_| ()).boxed(),
        }
    }

    /// Accepts an expired ticket if it is the one currently armed.
    pub fn fire(&mut self, ticket: DebounceTicket) -> bool {
        match self.pending {
            Some((pending, _)) if pending == ticket => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    /// Drops the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some((_, handle)) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_call_runs() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for query in ["a", "ab", "abc"] {
            let calls = calls.clone();
            let (_, fut) = debouncer.run(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                query
            });
            handles.push(tokio::spawn(fut));
            tokio::time::advance(Duration::from_millis(100)).await;
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(results, vec![None, None, Some("abc")]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_ticket_is_rejected() {
        let mut debouncer = Debouncer::default();
        let first = debouncer.arm();
        let second = debouncer.arm();
        assert_ne!(first.ticket, second.ticket);

        // The superseded timer returns without waiting the full delay.
        let stale = first.wait().await;
        assert!(!debouncer.fire(stale));
        assert!(debouncer.is_pending());

        let latest = second.wait().await;
        assert!(debouncer.fire(latest));
        assert!(!debouncer.is_pending());
        // A ticket fires at most once.
        assert!(!debouncer.fire(latest));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_clears_slot() {
        let mut debouncer = Debouncer::default();
        let timer = debouncer.arm();
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        let ticket = timer.wait().await;
        assert!(!debouncer.fire(ticket));
    }
}
