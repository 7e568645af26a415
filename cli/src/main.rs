//! hostkit - remote administration for common server software

use std::process::ExitCode;

use clap::Parser;
use hostkit_cli::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so `--json` output stays parseable. `RUST_LOG` wins
/// over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "hostkit_cli=debug",
        _ => "hostkit_cli=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            if json {
                let code = hostkit_cli::output::json::error_code(&e);
                match hostkit_cli::output::json::format_error(&format!("{e:#}"), code) {
                    Ok(out) => println!("{out}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}
