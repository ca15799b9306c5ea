use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Result};
use clap::Parser;
use colored::Colorize;
use meshmap_client::config_manager::{Config, ConfigLoader};
use meshmap_client::exporters::GraphWriter;
use meshmap_client::pipeline::{self, PipelineOutcome};
use meshmap_client::CaptureSession;
use meshmap_common::identity::IdentityMap;
use tokio::io::AsyncBufReadExt;

use crate::commands::{AnalyzeArgs, Cli, Commands, RunArgs};
use crate::logging::setup_logging;

pub async fn process_cli() -> Result<()> {
    let cli = Cli::parse();
    let config = ConfigLoader::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => {
            let config = apply_run_overrides(config, &args);
            setup_logging()?;
            run_command(config).await
        }
        Commands::Analyze(args) => {
            let config = apply_analyze_overrides(config, &args);
            setup_logging()?;
            analyze_command(config, args).await
        }
        Commands::Info => {
            print_config_info(&config);
            Ok(())
        }
    }
}

fn apply_run_overrides(mut config: Config, args: &RunArgs) -> Config {
    if let Some(namespace) = &args.namespace {
        config.namespace = namespace.clone();
    }
    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }
    if let Some(policy) = args.policy {
        config.weight_policy = policy;
    }
    config
}

fn apply_analyze_overrides(mut config: Config, args: &AnalyzeArgs) -> Config {
    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }
    if let Some(policy) = args.policy {
        config.weight_policy = policy;
    }
    config
}

async fn run_command(config: Config) -> Result<()> {
    let wait_tick_interval_ms = config.wait_tick_interval_ms;
    let mut session = CaptureSession::new(config)?;

    session.discover().await?;
    for warning in session.start_capture()? {
        println!("{} {}", "warning:".yellow(), warning);
    }

    println!(
        "{}",
        "Capturing traffic. Go use the application!".cyan().bold()
    );
    println!("Type 'done' when finished.");
    wait_for_operator(wait_tick_interval_ms).await?;

    println!("Stopping sniffers...");
    let captures = session.stop_capture().await;
    ensure!(
        !captures.is_empty(),
        "no capture files were produced; nothing to analyze"
    );

    let outcome = session.analyze(captures).await?;
    report_outcome(&outcome);

    let path = session.export(&outcome.graph).await?;
    println!("{} Wrote {}", "Finished!".green().bold(), path.display());
    Ok(())
}

async fn analyze_command(config: Config, args: AnalyzeArgs) -> Result<()> {
    let identity = Arc::new(IdentityMap::from_file(&args.identity)?);
    ensure!(
        !identity.is_empty(),
        "identity map {} is empty",
        args.identity.display()
    );

    let outcome = pipeline::run(
        args.captures,
        identity,
        config.weight_policy,
        config.edge_channel_capacity,
    )
    .await?;
    report_outcome(&outcome);

    let path = GraphWriter::new(&config.output_path)
        .write(&outcome.graph)
        .await?;
    println!("{} Wrote {}", "Finished!".green().bold(), path.display());
    Ok(())
}

fn report_outcome(outcome: &PipelineOutcome) {
    for failure in &outcome.report.failures {
        println!("{} {}", "warning:".yellow(), failure);
    }
    println!(
        "{} vertices, {} edges ({} frames scanned across {} sources)",
        outcome.graph.vertex_count(),
        outcome.graph.edges.len(),
        outcome.report.stats.frames,
        outcome.report.sources
    );
}

/// Ticks until the operator types `done` (or stdin closes).
async fn wait_for_operator(tick_interval_ms: u64) -> Result<()> {
    let mut interval = tokio::time::interval(Duration::from_millis(tick_interval_ms));
    interval.tick().await; // the first tick is immediate

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(input) if input.trim() == "done" => break,
                    Some(_) => println!("Type 'done' to stop capturing."),
                    None => break,
                }
            }
            _ = interval.tick() => {
                println!("waiting...");
            }
        }
    }
    Ok(())
}

fn print_config_info(config: &Config) {
    let kubectl = match which::which(&config.kubectl_binary) {
        Ok(path) => path.display().to_string().green(),
        Err(_) => format!("{} (not found on PATH)", config.kubectl_binary).red(),
    };

    println!("{}", "meshmap configuration".bold());
    println!("  namespace:             {}", config.namespace);
    println!("  kubectl:               {}", kubectl);
    println!("  weight policy:         {}", config.weight_policy);
    println!("  output path:           {}", config.output_path);
    println!("  edge channel capacity: {}", config.edge_channel_capacity);
}
