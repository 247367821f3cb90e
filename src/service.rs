//! Motion daemon status polling and install/start/stop actions.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Duration;

use crate::error::Result;
use crate::rpc::{BackendClient, RpcReply};
use crate::scheduler::RepeatingTask;
use crate::types::ServiceStatus;

pub const DEFAULT_STATUS_PERIOD: Duration = Duration::from_secs(2);

/// Publish `status` only if it differs from the last known one.
fn publish_if_changed(tx: &watch::Sender<ServiceStatus>, status: ServiceStatus) -> bool {
    tx.send_if_modified(|current| {
        if *current == status {
            return false;
        }
        log::info!(
            "[service] status changed: installed {} -> {}, running {} -> {}",
            current.installed,
            status.installed,
            current.running,
            status.running
        );
        *current = status;
        true
    })
}

/// Polls `check_dsu_installed` and publishes changes.
pub struct ServiceMonitor {
    backend: BackendClient,
    status_tx: Arc<watch::Sender<ServiceStatus>>,
    enabled_tx: Arc<watch::Sender<Option<bool>>>,
    task: RepeatingTask,
    period: Duration,
}

impl ServiceMonitor {
    pub fn new(backend: BackendClient, period: Duration) -> Self {
        let (status_tx, _) = watch::channel(ServiceStatus::default());
        let (enabled_tx, _) = watch::channel(None);
        ServiceMonitor {
            backend,
            status_tx: Arc::new(status_tx),
            enabled_tx: Arc::new(enabled_tx),
            task: RepeatingTask::new("service-status"),
            period,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ServiceStatus> {
        self.status_tx.subscribe()
    }

    pub fn current(&self) -> ServiceStatus {
        *self.status_tx.borrow()
    }

    /// Last `enabled` value confirmed through [`ServiceControl::set_enabled`].
    pub fn enabled_changes(&self) -> watch::Receiver<Option<bool>> {
        self.enabled_tx.subscribe()
    }

    /// Query the backend once. Returns whether the status changed.
    pub async fn refresh(&self) -> Result<bool> {
        let status = self.backend.check_service_status().await?;
        Ok(publish_if_changed(&self.status_tx, status))
    }

    pub async fn start(&mut self) {
        let backend = self.backend.clone();
        let tx = self.status_tx.clone();
        self.task
            .start(self.period, move || {
                let backend = backend.clone();
                let tx = tx.clone();
                async move {
                    match backend.check_service_status().await {
                        Ok(status) => {
                            publish_if_changed(&tx, status);
                        }
                        Err(e) => log::error!("[service] error checking service status: {}", e),
                    }
                }
            })
            .await;
    }

    pub async fn stop(&mut self) {
        self.task.stop().await;
    }

    /// Apply a locally known status without a round trip.
    pub fn assume(&self, status: ServiceStatus) {
        publish_if_changed(&self.status_tx, status);
    }

    /// Action surface sharing this monitor's status channel.
    pub fn control(&self) -> ServiceControl {
        ServiceControl {
            backend: self.backend.clone(),
            status_tx: self.status_tx.clone(),
            enabled_tx: self.enabled_tx.clone(),
        }
    }
}

/// Install/uninstall/start/stop the motion daemon and toggle the plugin.
#[derive(Clone)]
pub struct ServiceControl {
    backend: BackendClient,
    status_tx: Arc<watch::Sender<ServiceStatus>>,
    enabled_tx: Arc<watch::Sender<Option<bool>>>,
}

impl ServiceControl {
    async fn refresh_after(&self, action: &str) {
        match self.backend.check_service_status().await {
            Ok(status) => {
                publish_if_changed(&self.status_tx, status);
            }
            Err(e) => log::warn!("[service] status check after {} failed: {}", action, e),
        }
    }

    pub async fn install(&self) -> Result<RpcReply> {
        log::info!("[service] installing motion service");
        let reply = self.backend.install_service().await?;
        self.refresh_after("install").await;
        Ok(reply)
    }

    pub async fn uninstall(&self) -> Result<RpcReply> {
        log::info!("[service] uninstalling motion service");
        let reply = self.backend.uninstall_service().await?;
        self.refresh_after("uninstall").await;
        Ok(reply)
    }

    pub async fn start(&self) -> Result<RpcReply> {
        let reply = self.backend.start_service().await?;
        self.refresh_after("start").await;
        Ok(reply)
    }

    /// Stop the daemon. Marks it not running as soon as the backend confirms.
    pub async fn stop(&self) -> Result<RpcReply> {
        let reply = self.backend.stop_service().await?;
        let mut status = *self.status_tx.borrow();
        status.running = false;
        publish_if_changed(&self.status_tx, status);
        Ok(reply)
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<RpcReply> {
        let reply = self.backend.toggle_enabled(enabled).await?;
        self.enabled_tx.send_replace(Some(enabled));
        log::info!(
            "[service] motion cues {}",
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(reply)
    }

    pub fn current(&self) -> ServiceStatus {
        *self.status_tx.borrow()
    }
}
