//! The overlay update loop.
//!
//! One recurring task fetches a raw sample from the backend, folds it into
//! the controller and publishes the resulting frame. Fetch failures are
//! logged (locally and through the backend's `log_error`) and leave the last
//! published frame untouched.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::time::Duration;

use crate::controller::{OverlayController, OverlayFrame};
use crate::error::{OverlayError, Result};
use crate::feed_health::{FeedHealth, FeedTransition};
use crate::live_status::LiveStatus;
use crate::rpc::BackendClient;
use crate::scheduler::RepeatingTask;
use crate::settings::{OverlaySettings, SettingsPatch};
use crate::types::ServiceStatus;

/// Nominal overlay cadence (~30 Hz).
pub const DEFAULT_OVERLAY_PERIOD: Duration = Duration::from_millis(33);

#[derive(Clone, Copy, Debug)]
pub struct PipelineConfig {
    pub period: Duration,
    pub silence_threshold: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            period: DEFAULT_OVERLAY_PERIOD,
            silence_threshold: Duration::from_secs(5),
        }
    }
}

struct PipelineState {
    controller: OverlayController,
    status: LiveStatus,
    health: FeedHealth,
}

fn lock(state: &Mutex<PipelineState>) -> Result<MutexGuard<'_, PipelineState>> {
    state
        .lock()
        .map_err(|_| OverlayError::Internal("pipeline state lock poisoned".to_string()))
}

fn report_health(state: &mut PipelineState) {
    match state.health.check() {
        Some(FeedTransition::WentSilent) => log::warn!(
            "[overlay] no fresh motion data for {:.1}s",
            state.health.time_since_fresh().as_secs_f64()
        ),
        Some(FeedTransition::Recovered) => log::info!("[overlay] motion data feed recovered"),
        None => {}
    }
    state.status.feed_silent = state.health.is_silent();
}

/// One fetch/ingest/publish cycle.
async fn run_cycle(
    backend: &BackendClient,
    state: &Mutex<PipelineState>,
    frames: &watch::Sender<OverlayFrame>,
) -> Result<()> {
    let sample = match backend.get_motion_data().await {
        Ok(sample) => sample,
        Err(e) => {
            let message = format!("Error fetching motion data: {}", e);
            log::error!("[overlay] {}", message);
            {
                let mut guard = lock(state)?;
                guard.status.record_failure();
                report_health(&mut guard);
            }
            if let Err(forward_err) = backend.log_error(&message).await {
                log::debug!("[overlay] could not forward error to backend: {}", forward_err);
            }
            return Err(e);
        }
    };

    let frame = {
        let mut guard = lock(state)?;
        let s = &mut *guard;

        let was_visible = s.controller.is_visible();
        s.controller.ingest(&sample);
        let frame = s.controller.frame().clone();

        s.status.samples_ingested += 1;
        s.status.consecutive_failures = 0;
        s.status.last_sample_timestamp = sample.timestamp;
        s.status.smoothed_x = frame.smoothed_x;
        s.status.smoothed_y = frame.smoothed_y;
        s.status.smoothed_z = frame.smoothed_z;
        s.status.record_visibility(was_visible, frame.visible);
        if was_visible != frame.visible {
            log::debug!(
                "[overlay] auto-activate {} overlay",
                if frame.visible { "showed" } else { "hid" }
            );
        }
        if sample.fresh {
            s.status.fresh_samples += 1;
            s.health.record_fresh();
        }
        report_health(s);
        frame
    };

    frames.send_replace(frame);
    Ok(())
}

/// Read-only view of a running pipeline for the preview server.
#[derive(Clone)]
pub struct PipelineHandle {
    state: Arc<Mutex<PipelineState>>,
    frames: watch::Receiver<OverlayFrame>,
}

impl PipelineHandle {
    pub fn frame(&self) -> OverlayFrame {
        self.frames.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OverlayFrame> {
        self.frames.clone()
    }

    pub fn status(&self) -> Result<LiveStatus> {
        let mut status = lock(&self.state)?.status.clone();
        status.touch();
        Ok(status)
    }

    pub fn save_status(&self, path: &Path) -> Result<()> {
        self.status()?
            .save(path)
            .map_err(|e| OverlayError::Internal(format!("writing {}: {}", path.display(), e)))
    }
}

pub struct OverlayPipeline {
    backend: BackendClient,
    state: Arc<Mutex<PipelineState>>,
    frames: Arc<watch::Sender<OverlayFrame>>,
    task: RepeatingTask,
    config: PipelineConfig,
}

impl OverlayPipeline {
    pub fn new(backend: BackendClient, settings: OverlaySettings, config: PipelineConfig) -> Self {
        let controller = OverlayController::new(settings);
        let (frames, _) = watch::channel(controller.frame().clone());
        let state = PipelineState {
            controller,
            status: LiveStatus::new(),
            health: FeedHealth::new(config.silence_threshold),
        };

        OverlayPipeline {
            backend,
            state: Arc::new(Mutex::new(state)),
            frames: Arc::new(frames),
            task: RepeatingTask::new("overlay"),
            config,
        }
    }

    pub fn handle(&self) -> PipelineHandle {
        PipelineHandle {
            state: self.state.clone(),
            frames: self.frames.subscribe(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<OverlayFrame> {
        self.frames.subscribe()
    }

    /// Reset history and (re)start polling. A running loop is stopped first.
    pub async fn start(&mut self) -> Result<()> {
        self.task.stop().await;
        {
            let mut guard = lock(&self.state)?;
            guard.controller.reset();
            guard.health.reset();
            self.frames.send_replace(guard.controller.frame().clone());
        }

        let backend = self.backend.clone();
        let state = self.state.clone();
        let frames = self.frames.clone();
        self.task
            .start(self.config.period, move || {
                let backend = backend.clone();
                let state = state.clone();
                let frames = frames.clone();
                async move {
                    // Failures are already logged; the next tick retries.
                    let _ = run_cycle(&backend, &state, &frames).await;
                }
            })
            .await;

        log::info!(
            "[overlay] motion data updates started ({} ms)",
            self.config.period.as_millis()
        );
        Ok(())
    }

    /// Cancel polling and hide the overlay.
    pub async fn stop(&mut self) -> Result<()> {
        let was_running = self.task.is_running();
        self.task.stop().await;

        let mut guard = lock(&self.state)?;
        let was_visible = guard.controller.is_visible();
        guard.controller.set_visible(false);
        guard.status.record_visibility(was_visible, false);
        self.frames.send_replace(guard.controller.frame().clone());
        if was_running {
            log::info!("[overlay] motion data updates stopped");
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }

    /// Run a single cycle outside the timer.
    pub async fn tick(&self) -> Result<()> {
        run_cycle(&self.backend, &self.state, &self.frames).await
    }

    /// Manually show or hide the overlay.
    ///
    /// Showing while auto-activate is on persists `auto_activate: false`;
    /// the local setting only changes once the backend confirms.
    pub async fn toggle_overlay(&self, show: bool) -> Result<()> {
        let needs_write_back = {
            let mut guard = lock(&self.state)?;
            let was_visible = guard.controller.is_visible();
            let needs_write_back = guard.controller.set_visible(show);
            guard.status.record_visibility(was_visible, show);
            self.frames.send_replace(guard.controller.frame().clone());
            needs_write_back
        };

        if needs_write_back {
            let patch = SettingsPatch::auto_activate(false);
            match self.backend.update_settings(&patch).await {
                Ok(_) => {
                    lock(&self.state)?.controller.apply_settings(&patch);
                    log::info!("[overlay] auto-activate disabled by manual toggle");
                }
                Err(e) => {
                    log::error!("[overlay] failed to disable auto-activate: {}", e);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Persist a settings change, then apply it locally.
    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.backend.update_settings(patch).await {
            log::error!("[overlay] settings update failed: {}", e);
            return Err(e);
        }

        let mut guard = lock(&self.state)?;
        guard.controller.apply_settings(patch);
        self.frames.send_replace(guard.controller.frame().clone());
        Ok(())
    }

    /// Adopt settings fetched from the backend without writing them back.
    pub fn replace_settings(&self, settings: OverlaySettings) -> Result<()> {
        let mut guard = lock(&self.state)?;
        guard.controller.replace_settings(settings);
        self.frames.send_replace(guard.controller.frame().clone());
        Ok(())
    }

    pub fn settings(&self) -> Result<OverlaySettings> {
        Ok(lock(&self.state)?.controller.settings().clone())
    }

    pub fn frame(&self) -> OverlayFrame {
        self.frames.borrow().clone()
    }

    pub fn status(&self) -> Result<LiveStatus> {
        self.handle().status()
    }

    /// Run only while the motion service is up and the plugin is enabled.
    ///
    /// Settings are re-read from the backend first when the service is up,
    /// since `enabled` may have been flipped elsewhere. Returns whether the
    /// overlay is running afterwards.
    pub async fn sync_with_service(&mut self, status: ServiceStatus) -> Result<bool> {
        if status.running {
            match self.backend.get_settings().await {
                Ok(settings) => self.replace_settings(settings)?,
                Err(e) => log::warn!("[overlay] could not refresh settings: {}", e),
            }
        }

        let enabled = self.settings()?.enabled;
        if status.running && enabled {
            if !self.is_running() {
                self.start().await?;
            }
            return Ok(true);
        }

        if self.is_running() {
            if status.running {
                log::info!("[overlay] motion cues disabled, overlay idle");
            } else {
                log::info!("[overlay] motion service stopped, pausing overlay");
            }
            self.stop().await?;
        }
        Ok(false)
    }
}

/// Settings to start from. A failed load falls back to defaults; the
/// next service sync re-reads them.
pub async fn initial_settings(backend: &BackendClient) -> OverlaySettings {
    match backend.get_settings().await {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("[overlay] loading settings failed, using defaults: {}", e);
            OverlaySettings::default()
        }
    }
}
