//! Primus CLI and REST API entry point.
//!
//! Binary name: `primus`
//!
//! Parses CLI arguments, loads configuration and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, KeyCommand};
use primus_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need app state or logging
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "primus", &mut std::io::stdout());
        return Ok(());
    }

    // Set up tracing based on verbosity; RUST_LOG overrides
    let default_filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 if matches!(cli.command, Commands::Serve { .. }) => "info,tower_http=info",
        0 => "warn",
        1 => "info,primus_api=debug,primus_core=debug,primus_infra=debug",
        _ => "trace",
    };
    init_tracing(&TracingOptions {
        format: cli.log_format,
        default_filter: default_filter.to_string(),
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Primus API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!(
                    "  {} storage, {} point buy ({} points)",
                    console::style(state.config.storage.backend).bold(),
                    state.config.rules.schedule,
                    state.config.rules.budget
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Key { action } => match action {
            KeyCommand::Create { owner, name } => {
                cli::key::create_key(&state, &owner, &name, cli.json).await?;
            }
            KeyCommand::List { owner } => {
                cli::key::list_keys(&state, &owner, cli.json).await?;
            }
            KeyCommand::Revoke { owner, id } => {
                cli::key::revoke_key(&state, &owner, &id, cli.json).await?;
            }
        },

        Commands::Catalog { section } => {
            cli::catalog::show_catalog(&state, section, cli.json)?;
        }

        Commands::Validate { file } => {
            cli::character::validate_file(&state, &file, cli.json).await?;
        }

        Commands::List {
            owner,
            role,
            level,
            sort,
            order,
        } => {
            cli::character::list_characters(&state, &owner, role, level, &sort, &order, cli.json)
                .await?;
        }

        Commands::Show { owner, id } => {
            cli::character::show_character(&state, &owner, &id, cli.json).await?;
        }

        Commands::Export { owner, id, out } => {
            cli::character::export_character(&state, &owner, &id, out.as_deref(), cli.quiet)
                .await?;
        }

        Commands::Delete { owner, id, force } => {
            cli::character::delete_character(&state, &owner, &id, force, cli.json).await?;
        }

        Commands::Stats { owner } => {
            cli::character::show_stats(&state, &owner, cli.json).await?;
        }

        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
