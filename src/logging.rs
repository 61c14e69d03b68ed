//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Default filter directive for a `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "dirpane=info",
        2 => "dirpane=debug",
        _ => "dirpane=trace",
    }
}

/// Installs the global subscriber. Output goes to stderr so command output on
/// stdout stays clean. `RUST_LOG` overrides the verbosity flag.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

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
    fn test_verbosity_levels() {
        assert_eq!(default_directive(0), "warn");
        assert_eq!(default_directive(2), "dirpane=debug");
        assert_eq!(default_directive(9), "dirpane=trace");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(1);
        init(2);
    }
}
