//! Typed client for the plugin backend's remote calls.
//!
//! Every call is addressed by name with positional JSON arguments and
//! returns a JSON value. The transport is a trait object so the live client
//! uses HTTP and tests use a scripted stand-in.

pub mod http;
#[cfg(test)]
pub mod mock;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::error::{OverlayError, Result};
use crate::settings::{OverlaySettings, SettingsPatch};
use crate::types::{RawMotionSample, ServiceStatus};

pub use http::HttpTransport;

/// Moves one named call to the backend and back.
pub trait RpcTransport: Send + Sync {
    fn call<'a>(&'a self, method: &'a str, args: Vec<Value>) -> BoxFuture<'a, Result<Value>>;
}

/// Generic `{status, message?, ...}` acknowledgement.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcReply {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RpcReply {
    pub fn success() -> Self {
        RpcReply {
            status: "success".to_string(),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Turn a non-success status into `OverlayError::Rejected`.
    pub fn into_result(self, method: &str) -> Result<RpcReply> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(OverlayError::Rejected {
                method: method.to_string(),
                message: self
                    .message
                    .unwrap_or_else(|| format!("status '{}'", self.status)),
            })
        }
    }

    /// Decode one extra field of a successful reply.
    pub fn field<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .extra
            .get(name)
            .cloned()
            .ok_or_else(|| OverlayError::Decode(format!("reply has no '{}' field", name)))?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Backend calls used by the overlay and the surrounding panels.
#[derive(Clone)]
pub struct BackendClient {
    transport: Arc<dyn RpcTransport>,
}

impl BackendClient {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        BackendClient { transport }
    }

    async fn invoke<T: DeserializeOwned>(&self, method: &str, args: Vec<Value>) -> Result<T> {
        let value = self.transport.call(method, args).await?;
        serde_json::from_value(value)
            .map_err(|e| OverlayError::Decode(format!("{}: {}", method, e)))
    }

    /// Call a method answering with `{status, ...}` and require success.
    async fn acknowledged(&self, method: &str, args: Vec<Value>) -> Result<RpcReply> {
        let reply: RpcReply = self.invoke(method, args).await?;
        reply.into_result(method)
    }

    /// Fetch the latest sample. An error envelope, or a body without any
    /// accel axis, is an error rather than a sample.
    pub async fn get_motion_data(&self) -> Result<RawMotionSample> {
        const METHOD: &str = "get_motion_data";
        let value: Value = self.invoke(METHOD, vec![]).await?;

        if let Some(status) = value.get("status").and_then(Value::as_str) {
            if status != "success" {
                let message = value
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("status '{}'", status));
                return Err(OverlayError::Rejected {
                    method: METHOD.to_string(),
                    message,
                });
            }
        }

        let has_accel = ["accel_x", "accel_y", "accel_z"]
            .iter()
            .any(|key| value.get(*key).map_or(false, |v| !v.is_null()));
        if !has_accel {
            return Err(OverlayError::Decode(format!(
                "{}: reply has no accel fields",
                METHOD
            )));
        }

        serde_json::from_value(value).map_err(|e| OverlayError::Decode(format!("{}: {}", METHOD, e)))
    }

    pub async fn get_settings(&self) -> Result<OverlaySettings> {
        self.invoke("get_settings", vec![]).await
    }

    pub async fn update_settings(&self, patch: &SettingsPatch) -> Result<RpcReply> {
        self.acknowledged("update_settings", vec![serde_json::to_value(patch)?])
            .await
    }

    pub async fn start_calibration(&self) -> Result<RpcReply> {
        self.acknowledged("start_calibration", vec![]).await
    }

    pub async fn set_calibration_offsets(&self) -> Result<RpcReply> {
        self.acknowledged("set_calibration_offsets", vec![]).await
    }

    pub async fn finish_calibration(&self, scale_x: f64, scale_y: f64, scale_z: f64) -> Result<RpcReply> {
        self.acknowledged(
            "finish_calibration",
            vec![json!(scale_x), json!(scale_y), json!(scale_z)],
        )
        .await
    }

    pub async fn check_service_status(&self) -> Result<ServiceStatus> {
        self.invoke("check_dsu_installed", vec![]).await
    }

    pub async fn install_service(&self) -> Result<RpcReply> {
        self.acknowledged("install_dsu", vec![]).await
    }

    pub async fn uninstall_service(&self) -> Result<RpcReply> {
        self.acknowledged("uninstall_dsu", vec![]).await
    }

    pub async fn start_service(&self) -> Result<RpcReply> {
        self.acknowledged("start_dsu_service", vec![]).await
    }

    pub async fn stop_service(&self) -> Result<RpcReply> {
        self.acknowledged("stop_dsu_service", vec![]).await
    }

    pub async fn toggle_enabled(&self, enabled: bool) -> Result<RpcReply> {
        self.acknowledged("toggle_enabled", vec![json!(enabled)]).await
    }

    pub async fn get_presets(&self) -> Result<Vec<String>> {
        let reply = self.acknowledged("get_presets", vec![]).await?;
        reply.field("presets")
    }

    pub async fn save_preset(&self, name: &str, patch: &SettingsPatch) -> Result<RpcReply> {
        self.acknowledged("save_preset", vec![json!(name), serde_json::to_value(patch)?])
            .await
    }

    pub async fn load_preset(&self, name: &str) -> Result<SettingsPatch> {
        let reply = self.acknowledged("load_preset", vec![json!(name)]).await?;
        reply.field("settings")
    }

    pub async fn delete_preset(&self, name: &str) -> Result<RpcReply> {
        self.acknowledged("delete_preset", vec![json!(name)]).await
    }

    /// Forward a client-side error to the backend log.
    pub async fn log_error(&self, message: &str) -> Result<()> {
        self.transport
            .call("log_error", vec![json!(message)])
            .await
            .map(|_| ())
    }
}
