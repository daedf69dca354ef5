use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// Pacing policy applied before every write to the record store.
#[async_trait]
pub trait Throttle: Send {
    /// Waits until the next call is allowed.
    async fn pace(&mut self);
}

/// Enforces a minimum interval between the starts of consecutive calls.
/// The first call is never delayed.
#[derive(Debug)]
pub struct FixedInterval {
    interval: Duration,
    last: Option<Instant>,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }
}

#[async_trait]
impl Throttle for FixedInterval {
    async fn pace(&mut self) {
        if let Some(last) = self.last {
            tokio::time::sleep_until(last + self.interval).await;
        }
        self.last = Some(Instant::now());
    }
}

/// Never waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unthrottled;

#[async_trait]
impl Throttle for Unthrottled {
    async fn pace(&mut self) {}
}
