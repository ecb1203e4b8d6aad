mod cli;
mod discovery;
mod error;
mod events;
mod kubernetes;
mod logs;
mod render;
mod report;
mod resolver;
mod types;
mod utils;

use clap::Parser;
use std::io::IsTerminal;

use cli::Cli;
use kubernetes::KubeCluster;
use report::build_report;
use resolver::parse_reference;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(cli::usage_exit_code(&e));
        }
    };

    // Diagnostics go to stderr; stdout carries only the report
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Parse before connecting so a bad reference never touches the cluster
    let reference = parse_reference(&cli.resource, &cli.namespace)?;
    let config = cli.report_config();

    let cluster = KubeCluster::connect(cli.context.as_deref(), cli.request_timeout()).await?;
    let report = build_report(&cluster, &reference, &config).await?;

    let output = if cli.json {
        render::render_json(&report)?
    } else {
        let color = !cli.no_color && std::io::stdout().is_terminal();
        render::render_text(&report, color, chrono::Utc::now())
    };
    println!("{}", output);
    Ok(())
}
