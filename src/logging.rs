//! Tracing setup for the CLI.
//!
//! Logs go to stderr so stdout stays clean for JSON output. `RUST_LOG`
//! overrides the level picked from flags and settings.

use tracing_subscriber::EnvFilter;

/// Level names from quietest to most verbose.
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Level name for the given flags.
///
/// `-q` wins over `-v`; each `-v` raises the level one step above `default`,
/// stopping at `trace`. An unknown `default` counts as `warn`.
pub fn level_for(verbosity: u8, quiet: bool, default: &str) -> &'static str {
    if quiet {
        return LOG_LEVELS[0];
    }
    let start = LOG_LEVELS.iter().position(|l| *l == default).unwrap_or(1);
    let idx = (start + usize::from(verbosity)).min(LOG_LEVELS.len() - 1);
    LOG_LEVELS[idx]
}

/// Install the global subscriber. Calling this twice is harmless.
pub fn init(verbosity: u8, quiet: bool, default: &str) {
    let level = level_for(verbosity, quiet, default);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for() {
        assert_eq!(level_for(0, false, "warn"), "warn");
        assert_eq!(level_for(1, false, "warn"), "info");
        assert_eq!(level_for(1, false, "error"), "warn");
        assert_eq!(level_for(1, false, "info"), "debug");
        assert_eq!(level_for(2, false, "warn"), "debug");
        assert_eq!(level_for(5, false, "warn"), "trace");
        assert_eq!(level_for(3, true, "warn"), "error");
    }

    #[test]
    fn test_verbose_never_lowers_level() {
        assert_eq!(level_for(1, false, "trace"), "trace");
        assert_eq!(level_for(2, false, "trace"), "trace");
        assert_eq!(level_for(1, false, "debug"), "trace");
        assert_eq!(level_for(0, false, "debug"), "debug");
        assert_eq!(level_for(0, false, "loud"), "warn");
    }

    #[test]
    fn test_init_twice() {
        init(0, true, "warn");
        init(2, false, "warn");
    }
}
