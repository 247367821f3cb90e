use clap::Parser;
use std::path::PathBuf;
use tokio::time::Duration;

use crate::error::{OverlayError, Result};
use crate::pipeline::PipelineConfig;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:1337/plugins/motion-cues";

#[derive(Parser, Debug, Clone)]
#[command(name = "motion_cues")]
#[command(about = "Motion cue overlay client for the motion-cues plugin backend", long_about = None)]
pub struct Args {
    /// Base URL of the plugin backend's method endpoints
    #[arg(long, default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: String,

    /// Overlay poll/render period in milliseconds
    #[arg(long, default_value = "33")]
    pub overlay_period_ms: u64,

    /// Service status poll period in milliseconds
    #[arg(long, default_value = "2000")]
    pub status_period_ms: u64,

    /// Per-call timeout in milliseconds
    #[arg(long, default_value = "1000")]
    pub rpc_timeout_ms: u64,

    /// Port for the overlay preview (0 = disabled)
    #[arg(long, default_value = "8081")]
    pub preview_port: u16,

    /// Write pipeline counters to this JSON file every 2 seconds
    #[arg(long)]
    pub status_file: Option<PathBuf>,

    /// Warn when no fresh sample arrives for this many seconds
    #[arg(long, default_value = "5")]
    pub silence_secs: u64,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("--overlay-period-ms", self.overlay_period_ms),
            ("--status-period-ms", self.status_period_ms),
            ("--rpc-timeout-ms", self.rpc_timeout_ms),
            ("--silence-secs", self.silence_secs),
        ];
        for (flag, value) in periods {
            if value == 0 {
                return Err(OverlayError::InvalidParameters(format!(
                    "{} must be greater than zero",
                    flag
                )));
            }
        }
        if !(self.backend_url.starts_with("http://") || self.backend_url.starts_with("https://")) {
            return Err(OverlayError::InvalidParameters(format!(
                "--backend-url must be an http(s) URL, got '{}'",
                self.backend_url
            )));
        }
        Ok(())
    }

    pub fn overlay_period(&self) -> Duration {
        Duration::from_millis(self.overlay_period_ms)
    }

    pub fn status_period(&self) -> Duration {
        Duration::from_millis(self.status_period_ms)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    pub fn preview_port(&self) -> Option<u16> {
        (self.preview_port != 0).then_some(self.preview_port)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            period: self.overlay_period(),
            silence_threshold: Duration::from_secs(self.silence_secs),
        }
    }
}
