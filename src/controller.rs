//! Per-sample overlay state: history, visibility and the last rendered frame.
//!
//! The controller is a plain state object. It does no I/O; the pipeline owns
//! one behind a lock and feeds it samples from the backend.

use serde::{Deserialize, Serialize};

use crate::normalize::{motion_threshold, normalize_sample, REST_BASELINE};
use crate::overlay::{render_cues, CueLayout};
use crate::settings::{OverlaySettings, SettingsPatch};
use crate::smoothing::MotionHistoryBuffer;
use crate::types::RawMotionSample;

/// Outcome of the auto-activate gate for one sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Show,
    Hide,
    /// Gate did not run: auto-activate off, stale sample, or untrusted reading.
    Skip,
}

/// Everything a renderer needs to draw one overlay frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayFrame {
    pub visible: bool,
    pub smoothed_x: f64,
    pub smoothed_y: f64,
    pub smoothed_z: f64,
    pub timestamp: f64,
    pub layout: CueLayout,
}

impl OverlayFrame {
    /// Hidden frame with zero intensity for the given settings.
    pub fn idle(settings: &OverlaySettings) -> Self {
        OverlayFrame {
            visible: false,
            smoothed_x: 0.0,
            smoothed_y: 0.0,
            smoothed_z: 0.0,
            timestamp: 0.0,
            layout: render_cues(
                0.0,
                0.0,
                0.0,
                settings.visual_style,
                &settings.color,
                settings.opacity,
            ),
        }
    }
}

/// Whether raw 3-axis motion leaves the sensitivity dead zone.
///
/// Uses the unnormalized acceleration magnitude. Returns `None` for readings
/// with missing or non-finite axes so they never toggle the overlay.
pub fn exceeds_motion_threshold(sample: &RawMotionSample, sensitivity: f64) -> Option<bool> {
    if !sample.complete || !sample.accel.is_finite() {
        return None;
    }
    let magnitude = sample.accel.magnitude();
    Some((magnitude - REST_BASELINE).abs() > motion_threshold(sensitivity))
}

pub struct OverlayController {
    settings: OverlaySettings,
    history: MotionHistoryBuffer,
    visible: bool,
    frame: OverlayFrame,
}

impl OverlayController {
    pub fn new(settings: OverlaySettings) -> Self {
        let frame = OverlayFrame::idle(&settings);
        OverlayController {
            settings,
            history: MotionHistoryBuffer::default(),
            visible: false,
            frame,
        }
    }

    /// Drop buffered history, as on a fresh overlay mount.
    pub fn reset(&mut self) {
        self.history.clear();
        self.frame = OverlayFrame::idle(&self.settings);
        self.frame.visible = self.visible;
    }

    /// Fold one sample into the history, run the gate and re-render.
    pub fn ingest(&mut self, sample: &RawMotionSample) -> GateDecision {
        let point = normalize_sample(sample, self.settings.sensitivity);
        self.history.push(point);

        let decision = self.auto_activate_decision(sample);
        match decision {
            GateDecision::Show => self.visible = true,
            GateDecision::Hide => self.visible = false,
            GateDecision::Skip => {}
        }

        self.render(sample.timestamp);
        decision
    }

    pub fn auto_activate_decision(&self, sample: &RawMotionSample) -> GateDecision {
        if !self.settings.auto_activate || !sample.fresh {
            return GateDecision::Skip;
        }
        match exceeds_motion_threshold(sample, self.settings.sensitivity) {
            Some(true) => GateDecision::Show,
            Some(false) => GateDecision::Hide,
            None => GateDecision::Skip,
        }
    }

    /// Manual show/hide.
    ///
    /// Returns true when auto-activate is on and the overlay was shown, in
    /// which case the caller must persist `auto_activate: false` so the next
    /// quiet sample does not hide it again.
    pub fn set_visible(&mut self, show: bool) -> bool {
        self.visible = show;
        self.frame.visible = show;
        self.settings.auto_activate && show
    }

    /// Apply a confirmed settings change. History is not rescaled.
    pub fn apply_settings(&mut self, patch: &SettingsPatch) {
        self.settings.apply(patch);
        self.render(self.frame.timestamp);
    }

    pub fn replace_settings(&mut self, settings: OverlaySettings) {
        self.settings = settings;
        self.render(self.frame.timestamp);
    }

    fn render(&mut self, timestamp: f64) {
        let (x, y, z) = self.history.smoothed();
        self.frame = OverlayFrame {
            visible: self.visible,
            smoothed_x: x,
            smoothed_y: y,
            smoothed_z: z,
            timestamp,
            layout: render_cues(
                x,
                y,
                z,
                self.settings.visual_style,
                &self.settings.color,
                self.settings.opacity,
            ),
        };
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    pub fn history(&self) -> &MotionHistoryBuffer {
        &self.history
    }

    pub fn frame(&self) -> &OverlayFrame {
        &self.frame
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}
