use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogSettings;

/// Install the global subscriber: console output always, plus Loki when a
/// URL is configured and the `loki` feature is built in.
pub fn init_logging(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&settings.filter)
        .with_context(|| format!("Invalid log filter: {}", settings.filter))?;
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    #[cfg(feature = "loki")]
    {
        if let Some(url) = settings.loki_url.clone() {
            let (loki_layer, task) = tracing_loki::builder()
                .label("service", settings.service_name.as_str())
                .and_then(|b| b.label("environment", settings.environment.as_str()))
                .and_then(|b| b.build_url(url.clone()))
                .map_err(|e| anyhow::anyhow!("Failed to build Loki layer: {}", e))?;

            registry.with(loki_layer).try_init().context("Logging already initialized")?;
            // Ships buffered log lines in the background
            tokio::spawn(task);

            tracing::info!("Logging to console and Loki at {} ({})", url, settings.environment);
            return Ok(());
        }
    }

    registry.try_init().context("Logging already initialized")?;

    #[cfg(not(feature = "loki"))]
    {
        if settings.loki_url.is_some() {
            tracing::warn!("LOKI_URL is set but this build has no Loki support");
        }
    }
    tracing::info!("Logging to console ({})", settings.environment);
    Ok(())
}
