//! sfauth CLI binary entry point.

use clap::Parser;
use sfauth::cli::{auth, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match auth::cli_settings(cli.config.as_deref()) {
        Ok(settings) => match &cli.command {
            Commands::Login(args) => auth::handle_login(settings, args).await,
            Commands::Refresh => auth::handle_refresh(settings).await,
            Commands::Status => auth::handle_status(settings).await,
            Commands::Revoke => auth::handle_revoke(settings).await,
            Commands::Logout => auth::handle_logout(settings).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
