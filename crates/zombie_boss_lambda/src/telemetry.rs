use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILTER_ENV: &str = "ZOMBIE_BOSS_LOG";

/// Installs a JSON subscriber so each event reaches CloudWatch as one object.
///
/// Filter directives come from `ZOMBIE_BOSS_LOG` and default to `info`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_FILTER_ENV)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .without_time()
                .with_target(false),
        )
        .init();
}
