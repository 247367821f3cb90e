//! Owned, cancelable periodic tasks.
//!
//! Each subsystem (overlay feed, status poll, status file writer) holds one
//! `RepeatingTask`. Starting it again stops and awaits the previous run
//! first, and `stop` only returns once the loop has exited, so no tick can
//! touch shared state after teardown.

use std::future::Future;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

struct Running {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct RepeatingTask {
    name: &'static str,
    running: Option<Running>,
}

impl RepeatingTask {
    pub fn new(name: &'static str) -> Self {
        RepeatingTask {
            name,
            running: None,
        }
    }

    /// Run `tick` every `period`, first tick immediately.
    ///
    /// Ticks never overlap: a slow tick delays the next one and missed
    /// periods are skipped rather than replayed.
    pub async fn start<F, Fut>(&mut self, period: Duration, mut tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.stop().await;

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let name = self.name;
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = tick() => {}
                }
            }
            log::debug!("[{}] task loop exited", name);
        });

        log::debug!("[{}] task started ({} ms period)", self.name, period.as_millis());
        self.running = Some(Running { stop_tx, handle });
    }

    /// Signal the loop to exit and wait until it has.
    pub async fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.stop_tx.send(true);
            if let Err(e) = running.handle.await {
                if !e.is_cancelled() {
                    log::error!("[{}] task ended abnormally: {}", self.name, e);
                }
            }
            log::debug!("[{}] task stopped", self.name);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .map(|r| !r.handle.is_finished())
            .unwrap_or(false)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.stop_tx.send(true);
            running.handle.abort();
        }
    }
}
