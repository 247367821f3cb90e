use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Counters and the latest smoothed values of the overlay pipeline.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LiveStatus {
    pub updated_at: String,
    pub samples_ingested: u64,
    pub fresh_samples: u64,
    pub fetch_failures: u64,
    pub consecutive_failures: u32,
    pub overlay_shows: u64,
    pub overlay_hides: u64,
    pub last_sample_timestamp: f64,
    pub overlay_visible: bool,
    pub feed_silent: bool,
    // Smoothed intensities
    pub smoothed_x: f64,
    pub smoothed_y: f64,
    pub smoothed_z: f64,
}

impl LiveStatus {
    pub fn new() -> Self {
        Self {
            updated_at: Utc::now().to_rfc3339(),
            ..Default::default()
        }
    }

    pub fn record_failure(&mut self) {
        self.fetch_failures += 1;
        self.consecutive_failures += 1;
    }

    pub fn record_visibility(&mut self, was_visible: bool, visible: bool) {
        match (was_visible, visible) {
            (false, true) => self.overlay_shows += 1,
            (true, false) => self.overlay_hides += 1,
            _ => {}
        }
        self.overlay_visible = visible;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now().to_rfc3339();
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
