//! Log output setup for the `build-kernel` binary.
//!
//! Logs go to stderr so stdout stays machine readable. `BUILD_KERNEL_LOG`
//! takes an `EnvFilter` directive; `BUILD_KERNEL_LOG_FORMAT=json` switches
//! to JSON lines.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const ENV_FILTER: &str = "BUILD_KERNEL_LOG";
pub const ENV_FORMAT: &str = "BUILD_KERNEL_LOG_FORMAT";

/// Directive used when `BUILD_KERNEL_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "kernel_device_builder=debug,build_kernel=debug"
    } else {
        "kernel_device_builder=info,build_kernel=info"
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(ENV_FILTER)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let json = std::env::var(ENV_FORMAT)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("  [WARN] logging already initialised: {}", e);
    }
}
