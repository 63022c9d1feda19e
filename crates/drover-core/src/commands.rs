use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, anyhow};
use drover_shared::{KillTaskData, RunNowRequest};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::api::SchedulerApi;
use crate::cli::{Command, KillArgs, ListArgs, RemoveArgs, RunArgs};
use crate::config::Config;
use crate::dispatch::{ActionDispatcher, AfterTrigger, RunNowData};
use crate::filter::{FilterState, RouteParams, decode_request_types};
use crate::launcher::RunLauncher;
use crate::modal::{Modal, RemoveModal};
use crate::model::TaskStatus;
use crate::page::{RouteHistory, TasksPage};
use crate::render::Renderer;

#[instrument(skip_all)]
pub async fn dispatch<A>(api: &A, cfg: &Config, renderer: &mut Renderer, command: Command) -> anyhow::Result<()>
where
    A: SchedulerApi,
{
    debug!(?command, "dispatching command");

    match command {
        Command::List(args) => cmd_list(api, renderer, args).await,
        Command::Kill(args) => cmd_kill(api, renderer, args).await,
        Command::Run(args) => cmd_run(api, cfg, renderer, args).await,
        Command::Remove(args) => cmd_remove(api, renderer, args).await,
    }
}

/// Route the list command starts from: the positional route, then any
/// explicit flags layered on top as a filter change.
pub fn resolve_list_filter(args: &ListArgs) -> anyhow::Result<(RouteParams, Option<FilterState>)> {
    let params = match args.route.as_deref() {
        Some(route) => RouteParams::parse_path(route)?,
        None => RouteParams::default(),
    };

    if args.status.is_none() && args.request_types.is_none() && args.filter.is_none() {
        return Ok((params, None));
    }

    let mut next = FilterState::from_params(&params)?;
    if let Some(status) = args.status.as_deref() {
        next.task_status = TaskStatus::parse(status)?;
    }
    if let Some(types) = args.request_types.as_deref() {
        next.request_types = decode_request_types(Some(types))?;
    }
    if let Some(text) = args.filter.as_deref() {
        next.filter_text = text.to_string();
    }

    Ok((params, Some(next)))
}

async fn cmd_list<A>(api: &A, renderer: &mut Renderer, args: ListArgs) -> anyhow::Result<()>
where
    A: SchedulerApi,
{
    let (params, change) = resolve_list_filter(&args)?;
    let mut page = TasksPage::from_params(&params, RouteHistory::default())?;
    page.refresh(api).await?;

    if let Some(next) = change {
        page.change_filter(api, next).await?;
    }
    if let Some(route) = page.navigator().current() {
        info!(route, "filter route");
    }

    let status = page.filter().task_status;
    if args.json {
        return renderer.print_json(&page.rows());
    }
    renderer.print_task_view(status, &page.view())
}

async fn cmd_kill<A>(api: &A, renderer: &mut Renderer, args: KillArgs) -> anyhow::Result<()>
where
    A: SchedulerApi,
{
    let mut modal = Modal::default();
    modal.show(args.task_id.clone());

    let question = format!("Kill task {}?", args.task_id);
    if !args.yes && !confirm_prompt(&question)? {
        modal.cancel();
        println!("cancelled");
        return Ok(());
    }

    let Some(task_id) = modal.take() else {
        return Err(anyhow!("kill confirmation closed unexpectedly"));
    };
    let data = KillTaskData {
        message: args.message,
        wait_for_replacement_task: args.wait_for_replacement.then_some(true),
    };
    let cleanup = ActionDispatcher::new(api).kill_task(&task_id, data).await?;
    renderer.print_kill_result(&cleanup)
}

async fn cmd_run<A>(api: &A, cfg: &Config, renderer: &mut Renderer, args: RunArgs) -> anyhow::Result<()>
where
    A: SchedulerApi,
{
    let mut modal = Modal::default();
    modal.show(args.request_id.clone());

    let question = format!("Run request {} now?", args.request_id);
    if !args.yes && !confirm_prompt(&question)? {
        modal.cancel();
        println!("cancelled");
        return Ok(());
    }

    let Some(request_id) = modal.take() else {
        return Err(anyhow!("run confirmation closed unexpectedly"));
    };
    let data = RunNowData {
        request: RunNowRequest {
            message: args.message,
            run_id: args.run_id,
            command_line_args: (!args.args.is_empty()).then_some(args.args),
        },
        after_trigger: args.after_trigger,
        file_to_tail: match args.after_trigger {
            Some(AfterTrigger::Tail) => Some(args.file_to_tail),
            _ => None,
        },
    };

    let mut launcher = RunLauncher::from_config(cfg)?;
    let response = ActionDispatcher::new(api)
        .run_request(&request_id, data, &mut launcher)
        .await?;
    renderer.print_run_result(&response)?;

    if let Some(outcome) = launcher.follow(api).await? {
        renderer.print_launch(&outcome)?;
    }
    Ok(())
}

async fn cmd_remove<A>(api: &A, renderer: &mut Renderer, args: RemoveArgs) -> anyhow::Result<()>
where
    A: SchedulerApi,
{
    let load_balancer_data = match args.load_balancer_json.as_deref() {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Some(
                serde_json::from_str::<Value>(&text)
                    .with_context(|| format!("{} is not valid JSON", path.display()))?,
            )
        }
        None => None,
    };

    let mut modal = RemoveModal::new(args.request_id, load_balancer_data);
    modal.show();
    renderer.print_lines(&modal.prompt_lines())?;

    if !args.yes && !confirm_prompt("Remove request?")? {
        modal.cancel();
        println!("cancelled");
        return Ok(());
    }

    let dispatcher = ActionDispatcher::new(api);
    let removed = modal.confirm(&dispatcher, args.message, None).await?;
    renderer.print_removed(&removed)
}

/// Asks a yes/no question on stdin. Without a terminal nothing is confirmed.
fn confirm_prompt(question: &str) -> anyhow::Result<bool> {
    if !io::stdin().is_terminal() {
        warn!("stdin is not a terminal; pass --yes to confirm");
        return Ok(false);
    }

    let mut out = io::stdout().lock();
    write!(out, "{question} [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed reading confirmation")?;

    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
