use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::{
        SubscriberInitExt,
        TryInitError,
    },
    EnvFilter,
};

/// Build log lines use the `sweagle::build` target, crate internals their
/// own crate names. Build lines are kept at every level, including the
/// response bodies dumped at debug level.
pub const DEFAULT_LOG_FILTER: &str = "warn,sweagle=info,sweagle::build=debug,sweagle_cli=info";

pub const DEBUG_LOG_FILTER: &str =
    "info,sweagle=debug,sweagle_cli=debug,sweagle_core=debug,sweagle_client=debug";

/// Picks the default filter for the step's verbosity. `RUST_LOG` overrides it.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        DEBUG_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    }
}

pub fn init(debug: bool) -> Result<(), TryInitError> {
    init_with_default(default_filter(debug))
}

pub fn init_with_default(default_filter: &str) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
}
