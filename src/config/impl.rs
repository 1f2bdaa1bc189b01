use std::sync::{Arc, OnceLock};

use super::StaticConfig;

static CONFIG: OnceLock<Arc<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone.
/// Falls back to defaults if `init_config_from` was never called.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| Arc::new(StaticConfig::default()))
        .clone()
}

/// Initialize the global configuration from the given file
///
/// Only the first call takes effect; later calls keep the loaded config.
///
/// # Examples
/// ```no_run
/// use shortie::config::init_config_from;
/// init_config_from("custom.toml");
/// ```
pub fn init_config_from(path: &str) {
    CONFIG.get_or_init(|| Arc::new(StaticConfig::load_from(path)));
}
