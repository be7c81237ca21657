//! Deadline, cancellation and backoff for event waits

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Result, SessionError};

/// Longest single sleep, so cancellation is noticed promptly
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Shared abort flag for a running wait
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Bounds of [`crate::RemoteSession::wait_for_event`]
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Give up after this long; `None` waits until cancelled
    pub deadline: Option<Duration>,
    pub cancel: Option<CancelToken>,
    /// First pause between failed dial attempts
    pub initial_backoff: Duration,
    /// Upper bound the pause doubles towards
    pub max_backoff: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            deadline: None,
            cancel: None,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl WaitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max.max(initial);
        self
    }
}

/// One running wait: the options plus its start time and current backoff
pub(crate) struct WaitClock<'a> {
    options: &'a WaitOptions,
    event: &'a str,
    started: Instant,
    backoff: Duration,
}

impl<'a> WaitClock<'a> {
    pub fn start(options: &'a WaitOptions, event: &'a str) -> Self {
        Self {
            options,
            event,
            started: Instant::now(),
            backoff: options.initial_backoff,
        }
    }

    /// Fail with `Cancelled` or `Timeout` once either applies
    pub fn check(&self) -> Result<()> {
        if self.options.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(SessionError::Cancelled);
        }
        if self.remaining() == Some(Duration::ZERO) {
            return Err(SessionError::Timeout(self.event.to_string()));
        }
        Ok(())
    }

    /// Time left before the deadline, if there is one
    pub fn remaining(&self) -> Option<Duration> {
        self.options
            .deadline
            .map(|deadline| deadline.saturating_sub(self.started.elapsed()))
    }

    /// Sleep the current backoff (cut short by deadline or cancel), then double it
    pub fn back_off(&mut self) -> Result<()> {
        let pause = match self.remaining() {
            Some(remaining) => self.backoff.min(remaining),
            None => self.backoff,
        };
        let until = Instant::now() + pause;

        loop {
            self.check()?;
            let now = Instant::now();
            if now >= until {
                break;
            }
            std::thread::sleep(SLEEP_SLICE.min(until - now));
        }

        self.backoff = (self.backoff * 2).min(self.options.max_backoff);
        Ok(())
    }
}
