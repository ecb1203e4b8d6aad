use crate::logs::{LogFilter, LogOptions};
use crate::report::ReportConfig;
use clap::Parser;
use clap::error::ErrorKind;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "kpeek", version)]
#[command(
    about = "Aggregate pods, container logs and events for a Kubernetes resource into one report"
)]
pub struct Cli {
    /// Resource to inspect, as <type>/<name> (deploy/my-app, pod/my-pod)
    pub resource: String,

    /// Namespace of the resource
    #[arg(short = 'n', long, default_value = "default")]
    pub namespace: String,

    /// Kubeconfig context (defaults to the current context)
    #[arg(long)]
    pub context: Option<String>,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Skip retrieving container logs
    #[arg(long)]
    pub no_logs: bool,

    /// Include events for the resource and its pods
    #[arg(long)]
    pub include_events: bool,

    /// Only keep the last N log lines of each container (0 keeps all)
    #[arg(long, default_value_t = 0)]
    pub tail: usize,

    /// Only keep log lines matching this regular expression
    #[arg(long)]
    pub log_regex: Option<String>,

    /// Maximum number of container logs fetched at once
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// Timeout in seconds for each API request
    #[arg(long, default_value_t = 30)]
    pub request_timeout: u64,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Exit code for an argument parsing outcome: 0 for help/version output, 1 otherwise.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

impl Cli {
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            logs: LogOptions {
                enabled: !self.no_logs,
                filter: LogFilter {
                    tail: self.tail,
                    pattern: self.log_regex.clone(),
                },
                concurrency: self.concurrency as usize,
            },
            include_events: self.include_events,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
