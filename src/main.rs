use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use jadwal::directory::{InMemoryDirectory, Seed};
use jadwal::studio::{DEFAULT_SWEEP_PERIOD, StudioManager};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let metrics_port: Option<u16> = std::env::var("JADWAL_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    jadwal::observability::init(metrics_port);

    let sweep_secs: u64 = std::env::var("JADWAL_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SWEEP_PERIOD.as_secs());
    let seed_path = std::env::var("JADWAL_SEED").ok();

    let directory = Arc::new(InMemoryDirectory::new());
    let manager = StudioManager::new(directory.clone(), Duration::from_secs(sweep_secs));

    if let Some(path) = &seed_path {
        let raw = std::fs::read_to_string(path)?;
        let seed: Seed = serde_json::from_str(&raw)?;
        directory.load_seed(&seed);
        for studio in &seed.studios {
            manager.get_or_create(studio.id, studio.slot_interval_min)?;
        }
        info!(
            "seeded {} studios, {} reservations, {} add-on bookings from {path}",
            seed.studios.len(),
            seed.reservations.len(),
            seed.addon_bookings.len()
        );
    }

    info!("jadwal worker running");
    info!("  studios: {}", manager.studio_count());
    info!("  sweep interval: {sweep_secs}s");
    info!(
        "  metrics: {}",
        metrics_port.map_or("disabled".to_string(), |p| format!(
            "http://0.0.0.0:{p}/metrics"
        ))
    );

    // Block until SIGTERM/ctrl-c; sweepers run until the process exits
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }

    info!("jadwal worker stopped");
    Ok(())
}
