//! Bounded polling against an externally-owned state machine.
//!
//! The GUI offers no push-based readiness signal, so synchronization is a
//! spin-wait with a short fixed interval and a generous ceiling. The probe
//! itself must not block; all waiting happens here, which keeps timeouts
//! additive rather than multiplicative.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::trace;

/// How long the default poll interval is.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default wait budget for a control to appear or disappear.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Extended budget for the slow transitions: login to main window, and the
/// document-store dialog closing.
pub const EXTENDED_WAIT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

impl PollOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Repeatedly run `probe` until it yields a value or the budget elapses.
///
/// The probe runs immediately, then once per interval; the final sleep is
/// capped at the deadline so the last probe lands exactly on it. Returns
/// `Ok(None)` only at or after the deadline, never before, and a success is
/// reported no later than one interval past the moment the probed condition
/// became observable. Probe errors propagate immediately.
///
/// The probe must be free of side effects on failure: a descriptor that does
/// not resolve is probed again, unchanged, on the next tick.
pub async fn poll_until<T, E, F>(options: PollOptions, mut probe: F) -> Result<Option<T>, E>
where
    F: FnMut() -> Result<Option<T>, E>,
{
    let deadline = Instant::now() + options.timeout;
    loop {
        if let Some(value) = probe()? {
            return Ok(Some(value));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        let step = options.interval.min(deadline - now);
        trace!(?step, "probe unresolved, sleeping");
        sleep(step).await;
    }
}
