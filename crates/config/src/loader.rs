//! Configuration loading utilities

use crate::Settings;
use config::{Config, ConfigError, Environment, File};

/// Load configuration from the optional config file, with `SWAPFLOW_*`
/// environment variables layered on top.
pub fn load_config() -> Result<Settings, ConfigError> {
	let s = Config::builder()
		.add_source(File::with_name("config/config").required(false))
		.add_source(Environment::with_prefix("SWAPFLOW").separator("__"))
		.build()?;

	s.try_deserialize()
}
