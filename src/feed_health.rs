use tokio::time::{Duration, Instant};

/// Health transition reported by [`FeedHealth::check`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedTransition {
    WentSilent,
    Recovered,
}

/// Tracks whether the backend is still delivering fresh samples.
#[derive(Clone, Debug)]
pub struct FeedHealth {
    last_fresh: Instant,
    silence_threshold: Duration,
    reported_silent: bool,
}

impl FeedHealth {
    pub fn new(silence_threshold: Duration) -> Self {
        FeedHealth {
            last_fresh: Instant::now(),
            silence_threshold,
            reported_silent: false,
        }
    }

    pub fn record_fresh(&mut self) {
        self.last_fresh = Instant::now();
    }

    /// Restart the silence window, e.g. when the feed is (re)started.
    pub fn reset(&mut self) {
        self.last_fresh = Instant::now();
        self.reported_silent = false;
    }

    pub fn time_since_fresh(&self) -> Duration {
        self.last_fresh.elapsed()
    }

    pub fn is_silent(&self) -> bool {
        self.time_since_fresh() > self.silence_threshold
    }

    /// Report edges only, so callers log once per outage.
    pub fn check(&mut self) -> Option<FeedTransition> {
        let silent = self.is_silent();
        match (self.reported_silent, silent) {
            (false, true) => {
                self.reported_silent = true;
                Some(FeedTransition::WentSilent)
            }
            (true, false) => {
                self.reported_silent = false;
                Some(FeedTransition::Recovered)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_silence_detection() {
        let mut health = FeedHealth::new(Duration::from_secs(1));
        assert!(!health.is_silent());
        assert_eq!(health.check(), None);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(health.is_silent());
        assert_eq!(health.check(), Some(FeedTransition::WentSilent));
        assert_eq!(health.check(), None);

        health.record_fresh();
        assert!(!health.is_silent());
        assert_eq!(health.check(), Some(FeedTransition::Recovered));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_reported_state() {
        let mut health = FeedHealth::new(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(health.check(), Some(FeedTransition::WentSilent));

        health.reset();
        assert_eq!(health.check(), None);
        assert!(health.time_since_fresh() < Duration::from_millis(100));
    }
}
