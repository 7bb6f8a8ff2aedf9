//! Bounded blocking waits.
//!
//! The live tree mutates asynchronously with respect to the automation
//! thread, so instantaneous checks are adapted into timeout-bounded ones by
//! polling. All waiting blocks the calling thread; there is no background
//! scheduler and no mid-wait cancellation. The only exits are success or
//! [`crate::ManejarError::Timeout`].
//!
//! A timeout of exactly `0` opts out of retry entirely: the probe runs once,
//! synchronously, and whatever state it observes is the answer. This is a
//! reduced-guarantee fast path for callers that have already awaited
//! settlement elsewhere; it is inherently racy against animated surfaces
//! and deliberately not "fixed" into always-polling.

use crate::result::{ManejarError, ManejarResult};
use std::time::{Duration, Instant};

/// Default timeout for wait operations (500ms, sized to span typical UI
/// animation durations)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 500;

/// Default polling interval (25ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 25;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds; `0` selects the single-evaluation fast path
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The no-wait variant: evaluate exactly once, synchronously
    #[must_use]
    pub const fn no_wait() -> Self {
        Self {
            timeout_ms: 0,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Re-evaluate `probe` until it yields a value or the timeout elapses.
///
/// The probe is always evaluated at least once. `Ok(None)` means "not yet";
/// a probe error aborts the wait immediately and propagates.
///
/// # Errors
///
/// [`ManejarError::Timeout`] when the budget expires, or whatever error the
/// probe itself surfaced.
pub fn poll_until<R, F>(options: &WaitOptions, mut probe: F) -> ManejarResult<R>
where
    F: FnMut() -> ManejarResult<Option<R>>,
{
    if options.timeout_ms == 0 {
        // Single synchronous evaluation, no retry.
        return probe()?.ok_or(ManejarError::Timeout { ms: 0 });
    }

    let start = Instant::now();
    loop {
        if let Some(value) = probe()? {
            return Ok(value);
        }
        if start.elapsed() >= options.timeout() {
            tracing::debug!(timeout_ms = options.timeout_ms, "wait expired");
            return Err(ManejarError::Timeout {
                ms: options.timeout_ms,
            });
        }
        std::thread::sleep(options.poll_interval());
    }
}

/// Re-evaluate a boolean predicate until it holds or the timeout elapses
///
/// # Errors
///
/// Same as [`poll_until`].
pub fn wait_for<F>(options: &WaitOptions, mut predicate: F) -> ManejarResult<()>
where
    F: FnMut() -> ManejarResult<bool>,
{
    poll_until(options, || {
        Ok(if predicate()? { Some(()) } else { None })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_chained_setters() {
            let opts = WaitOptions::new().with_timeout(200).with_poll_interval(5);
            assert_eq!(opts.timeout(), Duration::from_millis(200));
            assert_eq!(opts.poll_interval(), Duration::from_millis(5));
        }

        #[test]
        fn test_no_wait() {
            assert_eq!(WaitOptions::no_wait().timeout_ms, 0);
        }
    }

    mod poll_tests {
        use super::*;

        #[test]
        fn test_immediate_success() {
            let result = poll_until(&WaitOptions::new().with_timeout(100), || Ok(Some(7)));
            assert_eq!(result.unwrap(), 7);
        }

        #[test]
        fn test_timeout() {
            let opts = WaitOptions::new().with_timeout(50).with_poll_interval(5);
            let result: ManejarResult<()> = poll_until(&opts, || Ok(None));
            match result {
                Err(ManejarError::Timeout { ms }) => assert_eq!(ms, 50),
                other => panic!("expected Timeout, got {other:?}"),
            }
        }

        #[test]
        fn test_probe_evaluated_at_least_once_with_tiny_timeout() {
            let calls = Cell::new(0u32);
            let opts = WaitOptions::new().with_timeout(1).with_poll_interval(1);
            let _ = poll_until(&opts, || {
                calls.set(calls.get() + 1);
                Ok(Some(()))
            });
            assert_eq!(calls.get(), 1);
        }

        #[test]
        fn test_success_after_a_few_polls() {
            let calls = Cell::new(0u32);
            let opts = WaitOptions::new().with_timeout(500).with_poll_interval(1);
            let result = poll_until(&opts, || {
                calls.set(calls.get() + 1);
                Ok(if calls.get() >= 3 { Some("ok") } else { None })
            });
            assert_eq!(result.unwrap(), "ok");
            assert_eq!(calls.get(), 3);
        }

        #[test]
        fn test_probe_error_aborts_wait() {
            let opts = WaitOptions::new().with_timeout(500);
            let result: ManejarResult<()> = poll_until(&opts, || {
                Err(ManejarError::InputError {
                    message: "boom".to_string(),
                })
            });
            assert!(matches!(result, Err(ManejarError::InputError { .. })));
        }
    }

    mod zero_delay_tests {
        use super::*;

        #[test]
        fn test_zero_delay_evaluates_exactly_once_on_miss() {
            let calls = Cell::new(0u32);
            let result: ManejarResult<()> = poll_until(&WaitOptions::no_wait(), || {
                calls.set(calls.get() + 1);
                Ok(None)
            });
            assert_eq!(calls.get(), 1);
            assert!(matches!(result, Err(ManejarError::Timeout { ms: 0 })));
        }

        #[test]
        fn test_zero_delay_returns_synchronous_hit() {
            let result = poll_until(&WaitOptions::no_wait(), || Ok(Some(42)));
            assert_eq!(result.unwrap(), 42);
        }
    }

    mod wait_for_tests {
        use super::*;

        #[test]
        fn test_wait_for_true() {
            assert!(wait_for(&WaitOptions::new().with_timeout(100), || Ok(true)).is_ok());
        }

        #[test]
        fn test_wait_for_never_true() {
            let opts = WaitOptions::new().with_timeout(30).with_poll_interval(5);
            assert!(matches!(
                wait_for(&opts, || Ok(false)),
                Err(ManejarError::Timeout { .. })
            ));
        }
    }
}
