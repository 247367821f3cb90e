//! Motion cue overlay client.
//!
//! Polls raw accelerometer/gyro samples from the plugin backend, turns them
//! into smoothed per-axis intensities and renders one of three cue layouts.

pub mod calibration;
pub mod config;
pub mod controller;
pub mod error;
pub mod feed_health;
pub mod live_status;
pub mod normalize;
pub mod overlay;
pub mod pipeline;
pub mod presets;
pub mod preview;
pub mod rpc;
pub mod scheduler;
pub mod service;
pub mod settings;
pub mod smoothing;
pub mod types;

pub use controller::{GateDecision, OverlayController, OverlayFrame};
pub use error::{OverlayError, Result};
pub use pipeline::{OverlayPipeline, PipelineConfig, PipelineHandle};
pub use rpc::{BackendClient, HttpTransport, RpcReply, RpcTransport};
pub use settings::{OverlaySettings, SettingsPatch, VisualStyle};
pub use types::{NormalizedMotionPoint, RawMotionSample, ServiceStatus};
