use std::io;

use clap::Parser;
use vector_catalog::catalog::VectorClient;
use vector_catalog::cli::{run, Cli, Console};
use vector_catalog::config::ClientConfig;

fn try_main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    env_logger::init();

    let cli = Cli::parse();
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(api_host) = cli.api_host {
        config.api_host = api_host;
    }
    log::debug!("Using catalog service at {}", config.api_host);

    let client = VectorClient::connect(&config)?;
    let mut console = Console::new(io::stdin().lock(), io::stdout().lock());
    run(cli.command, &client, &mut console)
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1)
    }
}
