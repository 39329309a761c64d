//! Periodic fetch-and-store loop.

use crate::heatspot::Heatspot;
use log::{error, info, warn};
use std::future::Future;
use tokio::time::{self, MissedTickBehavior};

/// Outcome of a single scheduler tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub firms_files: usize,
    pub weather_files: usize,
    pub failures: usize,
}

/// Fetches hotspots, and the current weather when a city and API key are configured,
/// storing whatever succeeds. Failures are logged and counted, never retried.
pub async fn run_once(client: &Heatspot) -> TickReport {
    let mut report = TickReport::default();

    match client.fetch_hotspots().call().await {
        Ok(written) => report.firms_files = written.len(),
        Err(e) => {
            error!("FIRMS fetch failed: {}", e);
            report.failures += 1;
        }
    }

    let weather = &client.config().weather;
    if weather.city.is_some() && client.weather().has_api_key() {
        match client.fetch_weather().call().await {
            Ok(record) => {
                report.weather_files = 1;
                info!(
                    "Stored weather for {} at {}",
                    record.name.as_deref().unwrap_or("unknown city"),
                    record.observed_at
                );
            }
            Err(e) => {
                error!("Weather fetch failed: {}", e);
                report.failures += 1;
            }
        }
    }
    report
}

/// Runs [`run_once`] every `fetch_interval_hours` until `shutdown` resolves. The first
/// tick fires immediately; ticks missed while a fetch is running are skipped.
pub async fn run_until<F>(client: &Heatspot, shutdown: F)
where
    F: Future<Output = ()>,
{
    let period = client.config().fetch_interval();
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    info!("Fetching every {} hour(s)", period.as_secs() / 3600);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Scheduler stopped");
                return;
            }
            _ = ticker.tick() => {
                let report = run_once(client).await;
                info!(
                    "Tick stored {} FIRMS and {} weather file(s), {} failure(s)",
                    report.firms_files, report.weather_files, report.failures
                );
            }
        }
    }
}

/// [`run_until`] Ctrl-C.
pub async fn run(client: &Heatspot) {
    run_until(client, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::time::Duration;
    use tempfile::TempDir;

    fn keyless(dir: &TempDir) -> Config {
        let mut config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        config.firms.map_key = None;
        config.weather.api_key = None;
        config
    }

    #[tokio::test]
    async fn test_tick_without_keys_counts_failure_and_skips_weather() {
        let dir = TempDir::new().unwrap();
        let client = Heatspot::new(keyless(&dir)).await.unwrap();
        let report = run_once(&client).await;
        assert_eq!(
            report,
            TickReport {
                firms_files: 0,
                weather_files: 0,
                failures: 1
            }
        );
    }

    #[tokio::test]
    async fn test_run_until_stops_on_shutdown() {
        let dir = TempDir::new().unwrap();
        let client = Heatspot::new(keyless(&dir)).await.unwrap();
        let stopped = time::timeout(
            Duration::from_secs(5),
            run_until(&client, time::sleep(Duration::from_millis(50))),
        )
        .await;
        assert!(stopped.is_ok());
    }
}
