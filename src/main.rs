use callsync::application::{CallStatusService, LoggingObserver, NotificationDispatcher};
use callsync::config::Config;
use callsync::domain::call::{CallDirection, CallTopology, Snapshot};
use callsync::domain::shared::value_objects::{CallId, DeviceId};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scripted snapshots of an outgoing one-to-one call: ringing, answered
/// (delivered twice), then the remote side hangs up.
const DEMO_SCRIPT: &str = r#"[
    {"topology": "one_to_one", "memberships": [
        {"is_self": true, "state": "joined", "device_id": "demo-device"},
        {"is_self": false, "state": "notified"}]},
    {"topology": "one_to_one", "memberships": [
        {"is_self": true, "state": "joined", "device_id": "demo-device"},
        {"is_self": false, "state": "joined"}]},
    {"topology": "one_to_one", "memberships": [
        {"is_self": true, "state": "joined", "device_id": "demo-device"},
        {"is_self": false, "state": "joined"}]},
    {"topology": "one_to_one", "memberships": [
        {"is_self": true, "state": "joined", "device_id": "demo-device"},
        {"is_self": false, "state": "left"}]}
]"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "callsync".to_string());
    let config = Config::load(&config_path)?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting callsync demo");
    info!("Configuration loaded: {:?}", config);

    let dispatcher = NotificationDispatcher::spawn(Arc::new(LoggingObserver));
    let service = CallStatusService::new(config.engine.clone(), dispatcher);

    demo_call_lifecycle(&service).await?;

    service.shutdown().await?;
    info!("callsync demo finished");
    Ok(())
}

async fn demo_call_lifecycle(service: &CallStatusService) -> anyhow::Result<()> {
    let call_id = CallId::new();
    service
        .register_call(
            call_id,
            CallDirection::Outgoing,
            CallTopology::OneToOne,
            Some(DeviceId::from("demo-device")),
        )
        .await?;

    let script: Vec<serde_json::Value> = serde_json::from_str(DEMO_SCRIPT)?;
    for mut raw in script {
        raw["call_id"] = serde_json::Value::String(call_id.to_string());
        let snapshot: Snapshot = serde_json::from_value(raw)?;

        let events = service.ingest(snapshot).await?;
        let status = service.status(&call_id).await?;
        info!("Snapshot applied: status={}, events={}", status, events.len());
    }

    let final_status = service.remove_call(&call_id).await?;
    info!("Demo call ended in status {}", final_status);
    Ok(())
}
