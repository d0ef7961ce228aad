//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter used when `RUST_LOG` is not set
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with_default(DEFAULT_DIRECTIVE);
}

/// Initialize tracing with a fallback filter directive.
///
/// `RUST_LOG` takes precedence. Log lines go to stderr so interactive
/// output on stdout is not interleaved with diagnostics.
pub fn init_tracing_with_default(default_directive: &str) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(default_directive))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn build_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_filter_is_used() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let filter = build_filter("warn,lens_market=debug");
        assert!(filter.to_string().contains("lens_market=debug"));
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_tracing_with_default("warn");
        init_tracing();
    }
}
