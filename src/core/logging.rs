use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` wins over
/// `default_filter` when set.
pub fn init(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Ignore the error when a subscriber is already installed
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Filter used by the API server. axum logs rejections from built-in
/// extractors with the `axum::rejection` target at `TRACE` level.
pub fn server_filter() -> String {
    format!(
        "{}=debug,tower_http=debug,axum::rejection=trace",
        env!("CARGO_CRATE_NAME")
    )
}

/// Interactive commands keep the terminal quiet unless asked.
pub fn cli_filter() -> String {
    format!("{}=warn", env!("CARGO_CRATE_NAME"))
}
