// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, hand off to `ui::run`.
// - Returns `anyhow::Result` so failures exit non-zero with the error chain.

use clap::Parser;
use predicta_search::ui::{self, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    ui::run(cli)
}

/// Log to stderr so stdout stays clean for the tree or JSON output.
/// `RUST_LOG` wins over the `-v` flags.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
