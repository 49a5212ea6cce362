//! liftoff - verified downloads and trusted clones from a manifest
//!
//! This is the CLI application; all work is delegated to the ops crate.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use liftoff_config::Config;
use liftoff_events::EventReceiver;
use liftoff_net::{Downloader, NetClient, NetConfig, RetryPolicy};
use liftoff_ops::{OperationResult, OpsContextBuilder, OpsCtx};
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    logging::init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting liftoff v{}", env!("CARGO_PKG_VERSION"));

    // Precedence: file < environment < CLI flags
    let mut config = Config::load_or_default(cli.global.config.as_deref())
        .await
        .map_err(CliError::config)?;
    config.merge_env().map_err(CliError::config)?;

    let (event_sender, event_receiver) = liftoff_events::channel();

    let ctx = OpsContextBuilder::new()
        .with_config(&config)
        .with_downloader(build_downloader(&cli.global)?)
        .with_event_sender(event_sender)
        .build()?;

    let renderer = OutputRenderer::new(cli.global.json);
    let colors = console::Term::stderr().features().colors_supported();
    let mut event_handler =
        (!cli.global.json).then(|| EventHandler::new(colors, cli.global.debug));

    let result = execute_command_with_events(
        cli.command,
        ctx,
        &config,
        event_receiver,
        event_handler.as_mut(),
    )
    .await?;

    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// Downloader honoring `--timeout`
fn build_downloader(global: &GlobalArgs) -> Result<Downloader, CliError> {
    let mut net = NetConfig::default();
    let mut policy = RetryPolicy::default();
    if let Some(secs) = global.timeout.filter(|&s| s > 0) {
        net.timeout = Duration::from_secs(secs);
        policy.attempt_timeout = Duration::from_secs(secs);
    }
    let client = NetClient::new(net)?;
    Ok(Downloader::new(Arc::new(client), policy))
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    ctx: OpsCtx,
    config: &Config,
    mut event_receiver: EventReceiver,
    mut event_handler: Option<&mut EventHandler>,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, &ctx, config));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    if let Some(handler) = event_handler.as_deref_mut() {
                        handler.handle_event(event);
                    }
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let (Some(event), Some(handler)) = (event, event_handler.as_deref_mut()) {
                    handler.handle_event(event);
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    ctx: &OpsCtx,
    config: &Config,
) -> Result<OperationResult, CliError> {
    let result = match command {
        Commands::Apply => liftoff_ops::apply(ctx, config).await?,
        Commands::Download => {
            OperationResult::Downloads(liftoff_ops::download_all(ctx, &config.downloads).await?)
        }
        Commands::Clone => {
            OperationResult::Clones(liftoff_ops::clone_all(ctx, &config.git.repositories).await?)
        }
        Commands::Fetch {
            url,
            dest,
            sha256,
            rename,
        } => {
            let mut request = liftoff_net::DownloadRequest::new(url, dest);
            if let Some(sha256) = sha256 {
                request = request.with_sha256(sha256);
            }
            if let Some(rename) = rename {
                request = request.with_rename(rename);
            }
            OperationResult::Fetched(liftoff_ops::fetch(ctx, &request).await?)
        }
    };
    Ok(result)
}
