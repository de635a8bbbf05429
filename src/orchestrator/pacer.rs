//! Every wait in the run loop goes through here.
//!
//! A wait races the timer against the shutdown broadcast. Once a shutdown
//! has been seen, all later waits return [`Pace::Cancelled`] immediately.
//! A closed channel (every sender dropped) means no shutdown can arrive, so
//! waits simply run to completion.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::time::{sleep, Instant};

use crate::console::Console;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Elapsed,
    Cancelled,
}

pub struct Pacer {
    console: Arc<dyn Console>,
    shutdown: Option<broadcast::Receiver<()>>,
    cancelled: bool,
}

impl Pacer {
    pub fn new(console: Arc<dyn Console>, shutdown: Option<broadcast::Receiver<()>>) -> Self {
        Self {
            console,
            shutdown,
            cancelled: false,
        }
    }

    /// Whether a shutdown has been observed.
    pub fn is_cancelled(&mut self) -> bool {
        self.poll_shutdown();
        self.cancelled
    }

    /// Countdown of `secs` seconds, redrawn once per second.
    pub async fn countdown(&mut self, label: &str, secs: u64) -> Pace {
        if self.is_cancelled() {
            return Pace::Cancelled;
        }

        for remaining in (1..=secs).rev() {
            self.console.countdown_tick(label, remaining);
            if self.wait(Duration::from_secs(1)).await == Pace::Cancelled {
                self.console.countdown_clear();
                return Pace::Cancelled;
            }
        }
        if secs > 0 {
            self.console.countdown_clear();
        }
        Pace::Elapsed
    }

    /// Silent wait.
    pub async fn sleep(&mut self, duration: Duration) -> Pace {
        if self.is_cancelled() {
            return Pace::Cancelled;
        }
        self.wait(duration).await
    }

    async fn wait(&mut self, duration: Duration) -> Pace {
        if duration.is_zero() {
            return Pace::Elapsed;
        }

        let started = Instant::now();
        let signal = match self.shutdown.as_mut() {
            None => {
                sleep(duration).await;
                return Pace::Elapsed;
            }
            Some(rx) => {
                tokio::select! {
                    _ = sleep(duration) => None,
                    res = rx.recv() => Some(res),
                }
            }
        };

        match signal {
            None => Pace::Elapsed,
            Some(Ok(())) | Some(Err(RecvError::Lagged(_))) => {
                self.cancelled = true;
                Pace::Cancelled
            }
            Some(Err(RecvError::Closed)) => {
                self.shutdown = None;
                sleep(duration.saturating_sub(started.elapsed())).await;
                Pace::Elapsed
            }
        }
    }

    fn poll_shutdown(&mut self) {
        if self.cancelled {
            return;
        }
        if let Some(rx) = self.shutdown.as_mut() {
            match rx.try_recv() {
                Ok(()) | Err(TryRecvError::Lagged(_)) => self.cancelled = true,
                Err(TryRecvError::Closed) => self.shutdown = None,
                Err(TryRecvError::Empty) => {}
            }
        }
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("listening", &self.shutdown.is_some())
            .field("cancelled", &self.cancelled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::SilentConsole;
    use crate::lifecycle::Shutdown;

    fn pacer(shutdown: &Shutdown) -> Pacer {
        Pacer::new(Arc::new(SilentConsole), Some(shutdown.subscribe()))
    }

    #[tokio::test]
    async fn test_zero_wait_elapses() {
        let shutdown = Shutdown::new();
        let mut pacer = pacer(&shutdown);
        assert_eq!(pacer.countdown("next", 0).await, Pace::Elapsed);
        assert_eq!(pacer.sleep(Duration::ZERO).await, Pace::Elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_long_wait() {
        let shutdown = Shutdown::new();
        let mut pacer = pacer(&shutdown);

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            trigger.trigger();
        });

        assert_eq!(pacer.countdown("next round", 86_400).await, Pace::Cancelled);
        // sticky
        assert_eq!(pacer.sleep(Duration::ZERO).await, Pace::Cancelled);
    }

    #[tokio::test]
    async fn test_pending_shutdown_cancels_zero_wait() {
        let shutdown = Shutdown::new();
        let mut pacer = pacer(&shutdown);
        shutdown.trigger();
        assert_eq!(pacer.sleep(Duration::ZERO).await, Pace::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_channel_is_not_a_shutdown() {
        let shutdown = Shutdown::new();
        let mut pacer = pacer(&shutdown);
        drop(shutdown);

        assert_eq!(pacer.sleep(Duration::from_secs(3)).await, Pace::Elapsed);
        assert!(!pacer.is_cancelled());
    }
}
