//! Logging setup
//!
//! The crate logs through the `log` facade only. Applications that do not
//! install their own logger can call [`init_logging`] once at startup.
//!
//! ```rust,no_run
//! let config = shibgate_core::config::LoggingConfig::default();
//! shibgate_core::logging::init_logging(&config).unwrap();
//! log::info!("bridge ready");
//! ```

use crate::config::LoggingConfig;
use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Install `env_logger` with the configured level and format.
///
/// Safe to call multiple times; only the first call has an effect. `RUST_LOG`
/// still overrides the configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    config.validate()?;
    INIT.call_once(|| {
        // Another logger may already be installed by the host
        let _ = builder(config).try_init();
    });
    Ok(())
}

fn builder(config: &LoggingConfig) -> env_logger::Builder {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.level));

    if config.format == "json" {
        builder.format(|buf, record| {
            let entry = serde_json::json!({
                "timestamp": buf.timestamp_millis().to_string(),
                "level": record.level().as_str(),
                "target": record.target(),
                "message": record.args().to_string(),
            });
            writeln!(buf, "{}", entry)
        });
    } else {
        builder.format_timestamp_millis().format_module_path(false);
    }

    builder
}
