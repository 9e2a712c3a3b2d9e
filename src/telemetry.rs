//! Tracing subscriber setup.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::hub_config::LoggingSection;

pub const DEFAULT_FILTER: &str = "creatorhub=info,tower_http=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Logs go to stdout, or to a daily rolling
/// file when `dir` is set. Keep the returned guard alive until exit so
/// buffered file output is flushed.
pub fn init(logging: &LoggingSection) -> Result<Option<WorkerGuard>> {
    let filter = env_filter();
    match &logging.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "creatorhub.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let registry = tracing_subscriber::registry().with(filter);
            let installed = if logging.json {
                registry
                    .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                    .try_init()
            } else {
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(writer)
                            .with_ansi(false),
                    )
                    .try_init()
            };
            installed.context("Failed to install tracing subscriber")?;
            Ok(Some(guard))
        }
        None => {
            let registry = tracing_subscriber::registry().with(filter);
            let installed = if logging.json {
                registry.with(tracing_subscriber::fmt::layer().json()).try_init()
            } else {
                registry.with(tracing_subscriber::fmt::layer()).try_init()
            };
            installed.context("Failed to install tracing subscriber")?;
            Ok(None)
        }
    }
}
