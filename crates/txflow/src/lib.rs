//! Command-line front ends for `txflow-core`: the `fetcher` and
//! `flow_to_dot` binaries share argument definitions and logging setup.

pub mod cli;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// `info` filter; logs go to stderr so stdout stays readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();
}
