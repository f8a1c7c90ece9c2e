use async_trait::async_trait;
use tokio::time::{sleep, Duration};

/// Decides how long a sequential batch waits between two calls.
///
/// `pause` runs after call `completed` (1-based) and only when another call
/// follows, so a batch of `n` keys pauses `n - 1` times.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, completed: usize, remaining: usize);
}

/// Constant gap between consecutive calls.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl Pacer for FixedDelay {
    async fn pause(&self, _completed: usize, _remaining: usize) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

/// Back-to-back calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Pacer for NoDelay {
    async fn pause(&self, _completed: usize, _remaining: usize) {}
}
