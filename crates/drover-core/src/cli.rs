use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::dispatch::AfterTrigger;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "drover",
    version,
    about = "drover: list and act on scheduler tasks from the terminal",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "droverrc", global = true)]
    pub droverrc: Option<PathBuf>,

    /// Scheduler API base url, overriding `api.url`.
    #[arg(long = "api", global = true)]
    pub api: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List tasks, filtered like the `/tasks/{status}/{types}/{text}` route.
    List(ListArgs),
    /// Kill a running task.
    Kill(KillArgs),
    /// Trigger a request to run now.
    Run(RunArgs),
    /// Remove a request.
    Remove(RemoveArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Route such as `/tasks/scheduled/all/web`.
    pub route: Option<String>,

    #[arg(long)]
    pub status: Option<String>,

    /// Comma-separated request types, or `all`.
    #[arg(long = "types")]
    pub request_types: Option<String>,

    #[arg(long)]
    pub filter: Option<String>,

    /// Print rows as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct KillArgs {
    pub task_id: String,

    #[arg(short = 'm', long)]
    pub message: Option<String>,

    #[arg(long = "wait-for-replacement")]
    pub wait_for_replacement: bool,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    pub request_id: String,

    #[arg(short = 'm', long)]
    pub message: Option<String>,

    #[arg(long = "run-id")]
    pub run_id: Option<String>,

    /// Follow the new run once it launches.
    #[arg(long = "after", value_enum)]
    pub after_trigger: Option<AfterTrigger>,

    /// Sandbox file to tail with `--after tail`.
    #[arg(long = "tail", default_value = "stdout")]
    pub file_to_tail: String,

    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Command line arguments for the run.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RemoveArgs {
    pub request_id: String,

    #[arg(short = 'm', long)]
    pub message: Option<String>,

    /// JSON file with the load balancer settings that go away with the request.
    #[arg(long = "lb-json")]
    pub load_balancer_json: Option<PathBuf>,

    #[arg(short = 'y', long)]
    pub yes: bool,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls positional `rc.key=value` / `rc.key:value` overrides out of the
/// argument list before clap sees it.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = if let Some((k, v)) = rest.split_once('=') {
                Some((format!("rc.{k}"), v.to_string()))
            } else if let Some((k, v)) = rest.split_once(':') {
                Some((format!("rc.{k}"), v.to_string()))
            } else {
                None
            };

            if let Some((k, v)) = parsed {
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((k, v));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}
