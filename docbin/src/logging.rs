use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Builds the default filter directives for the given verbosity.
///
/// `0` is INFO, `1` is DEBUG, anything higher is TRACE. Only the docbin crates and the HTTP
/// trace layer are enabled.
pub fn default_directives(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    format!("docbin={level},docbin_core={level},docbin_sqlite={level},tower_http={level}")
}

/// Initialize tracing with the specified verbosity level and output format.
///
/// `RUST_LOG`, when set, replaces the default directives.
///
/// # Examples
/// ```rust,no_run
/// docbin::logging::init_tracing(false, 0); // INFO level, human-readable
/// ```
pub fn init_tracing(json: bool, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().flatten_event(true))
            .init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_selects_level() {
        assert!(default_directives(0).contains("docbin=info"));
        assert!(default_directives(1).contains("docbin_sqlite=debug"));
        assert!(default_directives(5).contains("docbin_core=trace"));
    }
}
