//! Observability hooks for the container and the evaluation harness.
//!
//! Everything goes through the `log` facade. The `log_metric!` macro adds a
//! structured key/value line at `trace` level that is compiled out of release
//! builds, and `enable_verbose_logging` installs an `env_logger` for binaries and
//! benches that don't bring their own logger.

use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

use crate::error::SplatPressError;

/// Logs a structured key-value metric at `trace` level, only in debug builds.
///
/// # Example
/// ```
/// use splatpress::log_metric;
/// let chunk = 3;
/// log_metric!("event" = "chunk_written", "chunk" = &chunk, "size" = 812);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            $crate::log::trace!(target: "splatpress::metric", "{{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

fn install_logger(level: LevelFilter, log_file: Option<&Path>) -> Result<(), SplatPressError> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);

    // Just the level and the message.
    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(buf, "[{}] {}", record.level(), record.args())
    });

    if let Some(path) = log_file {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // Another logger may already be installed (e.g. by a test harness).
    let _ = builder.try_init();
    Ok(())
}

/// Installs a process-wide logger at `level`, writing to stderr or appending to
/// `log_file`. Only the first call has any effect.
pub fn enable_verbose_logging(
    level: LevelFilter,
    log_file: Option<&Path>,
) -> Result<(), SplatPressError> {
    let mut result = Ok(());
    INIT_LOGGER.call_once(|| {
        result = install_logger(level, log_file);
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_verbose_logging_is_idempotent() {
        enable_verbose_logging(LevelFilter::Trace, None).unwrap();
        enable_verbose_logging(LevelFilter::Off, None).unwrap();
        log::debug!("logger installed");
        log_metric!("event" = "test", "value" = 42);
    }
}
