use std::io::IsTerminal;
use std::process;

use tracing_subscriber::EnvFilter;

mod driver;
#[cfg(feature = "server")]
mod multipart;
#[cfg(feature = "server")]
mod server;

fn main() {
    init_tracing();
    process::exit(driver::run(std::env::args_os()));
}

/// Install the process-wide log subscriber: INFO to stderr unless `RUST_LOG` says otherwise.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
