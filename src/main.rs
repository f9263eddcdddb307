use pulsewire::{ClientConfig, TelemetryClient, Tier};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Small demo emitter: starts the client (heartbeat included), registers a
/// recurring uptime gauge, and sends a burst of sample traffic. Point a
/// collector (or `nc -ul 8125`) at the port to watch it.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = ClientConfig::default();
    config.app_name = Some("pulsewire-demo".to_string());
    if let Ok(port) = std::env::var("PULSEWIRE_PORT") {
        config.port = port.parse()?;
    }

    let client = TelemetryClient::new(config);
    client.start();

    client.register_service(None);
    client.notify("demo emitter online", None);

    // Self-reporting job: uptime ticks every five seconds.
    let ticks = Arc::new(AtomicU64::new(0));
    {
        let emitter = client.clone();
        let ticks = Arc::clone(&ticks);
        client.schedule_recurring(Tier::FiveSeconds, move || {
            let n = ticks.fetch_add(1, Ordering::Relaxed);
            emitter.gauge("demo.uptime_ticks", None, n as f64, None);
        });
    }

    let mut labels = HashMap::new();
    labels.insert("source".to_string(), "demo".to_string());
    loop {
        client.mark("demo.loop", None, Some(&labels));
        client.counter("demo.iterations", None, 1.0, Some(&labels));
        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
    }
}
