use std::path::Path;

use anyhow::{Context, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use linesift::cli::{Cli, Commands, init_config};
use linesift::config::Config;
use linesift::ipc::{FilterClient, FilterServer, Response, ServerSettings};
use linesift::source::TextEncoding;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Handle --init flag
    if cli.init {
        return init_config(&cli.config);
    }

    let config = Config::load_or_default(&cli.config)?;
    let socket_path = cli.socket.unwrap_or_else(|| config.socket.path.clone());

    match cli.command {
        Some(Commands::Query {
            filename,
            pattern,
            move_by,
        }) => query(&socket_path, &filename, &pattern, move_by).await,
        Some(Commands::Serve) | None => {
            let encoding = TextEncoding::from_label(&config.encoding.default)?;
            let settings = ServerSettings {
                encoding,
                case_sensitive: config.search.case_sensitive,
            };

            let server = FilterServer::bind(&socket_path, settings)
                .with_context(|| format!("cannot bind {}", socket_path.display()))?;
            server.run().await?;
            Ok(())
        }
    }
}

/// One-shot client flow: init, search, optional move, print the selection
async fn query(
    socket_path: &Path,
    filename: &str,
    pattern: &str,
    move_by: i64,
) -> anyhow::Result<()> {
    let mut client = FilterClient::connect(socket_path).await.with_context(|| {
        format!(
            "cannot connect to {} (is the server running?)",
            socket_path.display()
        )
    })?;

    selection_of(client.init(filename).await?)?;
    let mut line = selection_of(client.search(pattern).await?)?;
    if move_by != 0 {
        line = selection_of(client.move_selection(move_by).await?)?;
    }

    println!("{line}");
    Ok(())
}

fn selection_of(response: Response) -> anyhow::Result<String> {
    match response {
        Response::Ok { line } => Ok(line),
        Response::Error { message } => bail!(message),
    }
}
