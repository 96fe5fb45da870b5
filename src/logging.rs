use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INSTALLED: OnceCell<bool> = OnceCell::new();

/// Installs a `tracing` subscriber once per process. Later calls are no-ops
/// and return whether the first installation succeeded.
///
/// `filter` uses `EnvFilter` syntax, e.g. `"board_arcade=debug"`.
pub fn init_logging(filter: &str) -> bool {
    *INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .without_time()
            .try_init()
            .is_ok()
    })
}
