pub mod paths;
pub mod persistence;

use std::sync::Once;

pub use paths::PathResolver;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = match "dashboard_forms=info".parse() {
            Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
            Err(_) => EnvFilter::from_default_env(),
        };

        // A subscriber installed by the host application wins.
        let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    });
}
