//! Time-windowed debouncing of query edits.
//!
//! [`Debouncer`] is the pure state machine: every transition takes the
//! current instant, so it can be driven by a test clock or by hand.
//! [`DebouncedFn`] runs it on a background tokio task and hands out a
//! fire-and-forget `call` in place of the wrapped callback.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, trace, warn};

/// Delay used when none is configured.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// What a call made while the debouncer is unarmed does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstCall {
    /// Record the call time only. The first edit after a quiet period never
    /// reaches the callback.
    #[default]
    Swallow,
    /// Schedule a trailing invocation one full delay away.
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceConfig {
    pub delay: Duration,
    pub first_call: FirstCall,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        DebounceConfig {
            delay: DEFAULT_DELAY,
            first_call: FirstCall::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arming {
    Unarmed,
    Armed(Instant),
}

/// Debounce state: the reference time of the last call, at most one pending
/// deadline, and the latest arguments.
#[derive(Debug)]
pub struct Debouncer<A> {
    config: DebounceConfig,
    arming: Arming,
    deadline: Option<Instant>,
    latest: Option<A>,
}

impl<A> Debouncer<A> {
    pub fn new(config: DebounceConfig) -> Self {
        Debouncer {
            config,
            arming: Arming::Unarmed,
            deadline: None,
            latest: None,
        }
    }

    pub fn config(&self) -> DebounceConfig {
        self.config
    }

    /// Record a call made at `now`.
    ///
    /// Returns the arguments to invoke the callback with right away, if the
    /// previous call is at least one delay old. Otherwise the call may leave a
    /// pending deadline behind (see [`Debouncer::deadline`]). Whatever happens,
    /// `now` becomes the new reference time.
    pub fn call(&mut self, now: Instant, args: A) -> Option<A> {
        self.latest = Some(args);
        self.deadline = None;

        let fired = match self.arming {
            Arming::Unarmed => {
                if self.config.first_call == FirstCall::Trailing {
                    self.deadline = Some(now + self.config.delay);
                }
                None
            }
            Arming::Armed(last) if now.saturating_duration_since(last) >= self.config.delay => {
                self.latest.take()
            }
            Arming::Armed(last) => {
                self.deadline = Some(last + self.config.delay);
                None
            }
        };

        self.arming = Arming::Armed(now);
        fired
    }

    /// The pending invocation time, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.arming, Arming::Armed(_))
    }

    /// Take the latest arguments if the pending deadline has passed.
    ///
    /// A timer firing returns the debouncer to the unarmed state.
    pub fn fire_due(&mut self, now: Instant) -> Option<A> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                self.arming = Arming::Unarmed;
                self.latest.take()
            }
            _ => None,
        }
    }
}

/// Handle to a debounced callback running on a tokio task.
///
/// Cloning shares the same debouncer. The task stops once every handle is
/// dropped, after delivering a call that was still pending.
pub struct DebouncedFn<A> {
    tx: mpsc::UnboundedSender<A>,
}

impl<A> Clone for DebouncedFn<A> {
    fn clone(&self) -> Self {
        DebouncedFn {
            tx: self.tx.clone(),
        }
    }
}

impl<A: Send + 'static> DebouncedFn<A> {
    /// Wrap `callback`. Must be called from within a tokio runtime.
    pub fn spawn<F>(config: DebounceConfig, callback: F) -> Self
    where
        F: FnMut(A) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(Debouncer::new(config), rx, callback));
        DebouncedFn { tx }
    }

    /// Feed one call into the debouncer. Never blocks, returns nothing.
    pub fn call(&self, args: A) {
        if self.tx.send(args).is_err() {
            warn!("Debounce task has stopped, dropping call");
        }
    }
}

async fn run<A, F>(mut debouncer: Debouncer<A>, mut rx: mpsc::UnboundedReceiver<A>, mut callback: F)
where
    F: FnMut(A),
{
    loop {
        let event = match debouncer.deadline() {
            Some(deadline) => match timeout_at(deadline, rx.recv()).await {
                Ok(event) => event,
                Err(_) => {
                    if let Some(args) = debouncer.fire_due(Instant::now()) {
                        trace!("Debounce window elapsed, invoking callback");
                        callback(args);
                    }
                    continue;
                }
            },
            None => rx.recv().await,
        };

        let Some(args) = event else {
            if let Some(deadline) = debouncer.deadline() {
                tokio::time::sleep_until(deadline).await;
                if let Some(args) = debouncer.fire_due(Instant::now()) {
                    callback(args);
                }
            }
            debug!("All debounce handles dropped, stopping");
            break;
        };

        if let Some(args) = debouncer.call(Instant::now(), args) {
            trace!("Quiet period exceeded, invoking callback immediately");
            callback(args);
        }
    }
}
