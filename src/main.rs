use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::time::Duration;

use motion_cues_rs::config::Args;
use motion_cues_rs::pipeline::{initial_settings, OverlayPipeline};
use motion_cues_rs::preview;
use motion_cues_rs::rpc::{BackendClient, HttpTransport};
use motion_cues_rs::scheduler::RepeatingTask;
use motion_cues_rs::service::ServiceMonitor;

const STATUS_FILE_PERIOD: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    args.validate()?;

    log::info!("Motion cues client starting");
    log::info!("  Backend: {}", args.backend_url);
    log::info!("  Overlay period: {} ms", args.overlay_period_ms);
    log::info!("  Status period: {} ms", args.status_period_ms);

    let transport = HttpTransport::new(&args.backend_url, args.rpc_timeout());
    let backend = BackendClient::new(Arc::new(transport));

    let settings = initial_settings(&backend).await;
    log::info!(
        "Settings: enabled={} style={} sensitivity={:.2} auto_activate={}",
        settings.enabled,
        settings.visual_style,
        settings.sensitivity,
        settings.auto_activate
    );

    let mut pipeline = OverlayPipeline::new(backend.clone(), settings, args.pipeline_config());
    let handle = pipeline.handle();

    let mut monitor = ServiceMonitor::new(backend.clone(), args.status_period());
    if let Err(e) = monitor.refresh().await {
        log::warn!("Initial service status check failed: {}", e);
    }
    let mut status_rx = monitor.subscribe();
    monitor.start().await;

    let mut status_writer = RepeatingTask::new("status-file");
    if let Some(path) = args.status_file.clone() {
        let handle = handle.clone();
        status_writer
            .start(STATUS_FILE_PERIOD, move || {
                if let Err(e) = handle.save_status(&path) {
                    log::warn!("Failed to write status file: {}", e);
                }
                futures::future::ready(())
            })
            .await;
    }

    let preview_server = match args.preview_port() {
        Some(port) => Some(preview::start_preview(handle.clone(), port).await?),
        None => None,
    };

    let mut enabled_rx = monitor.enabled_changes();
    // The plugin can be toggled from its own UI, so settings are re-checked
    // on the status cadence as well as on status changes.
    let mut resync = tokio::time::interval(args.status_period());
    resync.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                status_rx.borrow_and_update();
            }
            changed = enabled_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                enabled_rx.borrow_and_update();
            }
            _ = resync.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("Shutting down");
                break;
            }
        }

        if let Err(e) = pipeline.sync_with_service(monitor.current()).await {
            log::error!("Failed to sync overlay with service state: {}", e);
        }
    }

    monitor.stop().await;
    pipeline.stop().await?;
    status_writer.stop().await;
    if let Some(path) = &args.status_file {
        if let Err(e) = handle.save_status(path) {
            log::warn!("Failed to write final status file: {}", e);
        }
    }
    if let Some(server) = preview_server {
        server.abort();
    }

    Ok(())
}
