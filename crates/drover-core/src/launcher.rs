use std::time::Duration;

use anyhow::anyhow;
use drover_shared::{
  SandboxFile,
  SingularityTaskId,
  TaskIdHistory
};
use tracing::{
  debug,
  info,
  instrument
};

use crate::api::SchedulerApi;
use crate::config::Config;
use crate::dispatch::{
  LaunchTarget,
  TaskLauncher
};

pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_ATTEMPTS: u64 = 30;

/// Where a followed run ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOutcome {
  pub task_id:   SingularityTaskId,
  pub history:   Option<TaskIdHistory>,
  pub tail_file: Option<SandboxFile>,
  pub route:     String
}

/// Follows a triggered run until its
/// task exists and, when tailing, until
/// the requested file shows up in the
/// sandbox.
#[derive(Debug, Clone)]
pub struct RunLauncher {
  interval: Duration,
  attempts: u64,
  pending:  Option<LaunchTarget>
}

impl TaskLauncher for RunLauncher {
  fn start_polling(
    &mut self,
    target: LaunchTarget
  ) {
    debug!(?target, "queued run to follow");
    self.pending = Some(target);
  }
}

impl RunLauncher {
  pub fn new(
    interval: Duration,
    attempts: u64
  ) -> Self {
    Self {
      interval,
      attempts: attempts.max(1),
      pending: None
    }
  }

  pub fn from_config(
    cfg: &Config
  ) -> anyhow::Result<Self> {
    let interval = cfg
      .get_u64("launcher.interval_ms")?
      .unwrap_or(DEFAULT_INTERVAL_MS);
    let attempts = cfg
      .get_u64("launcher.attempts")?
      .unwrap_or(DEFAULT_ATTEMPTS);
    Ok(Self::new(
      Duration::from_millis(interval),
      attempts
    ))
  }

  pub fn pending(
    &self
  ) -> Option<&LaunchTarget> {
    self.pending.as_ref()
  }

  /// Polls the queued run, if any.
  #[instrument(skip(self, api))]
  pub async fn follow<A>(
    &mut self,
    api: &A
  ) -> anyhow::Result<Option<LaunchOutcome>>
  where
    A: SchedulerApi
  {
    let Some(target) = self.pending.take()
    else {
      return Ok(None);
    };

    let task_id =
      self.wait_for_task(api, &target).await?;
    info!(task_id = %task_id.id, "run launched");

    let history = api
      .fetch_request_run_history(
        &target.request_id,
        &target.run_id
      )
      .await?;

    let tail_file = match target
      .file_to_tail
      .as_deref()
    {
      | Some(path) => Some(
        self
          .wait_for_file(
            api, &task_id.id, path
          )
          .await?
      ),
      | None => None
    };

    let route = match target
      .file_to_tail
      .as_deref()
    {
      | Some(path) => format!(
        "/task/{}/tail/{}",
        task_id.id,
        path.trim_start_matches('/')
      ),
      | None => {
        format!("/task/{}", task_id.id)
      }
    };

    Ok(Some(LaunchOutcome {
      task_id,
      history,
      tail_file,
      route
    }))
  }

  async fn wait_for_task<A>(
    &self,
    api: &A,
    target: &LaunchTarget
  ) -> anyhow::Result<SingularityTaskId>
  where
    A: SchedulerApi
  {
    for attempt in 1..=self.attempts {
      if let Some(task_id) = api
        .fetch_request_run(
          &target.request_id,
          &target.run_id
        )
        .await?
      {
        return Ok(task_id);
      }

      debug!(
        attempt,
        run_id = %target.run_id,
        "run not launched yet"
      );
      if attempt < self.attempts {
        tokio::time::sleep(self.interval)
          .await;
      }
    }

    Err(anyhow!(
      "run {} of request {} did not \
       launch after {} attempts",
      target.run_id,
      target.request_id,
      self.attempts
    ))
  }

  async fn wait_for_file<A>(
    &self,
    api: &A,
    task_id: &str,
    path: &str
  ) -> anyhow::Result<SandboxFile>
  where
    A: SchedulerApi
  {
    let (directory, name) = split_path(path);

    for attempt in 1..=self.attempts {
      let listing = api
        .fetch_task_files(task_id, directory)
        .await?;
      if let Some(file) = listing
        .files
        .into_iter()
        .find(|file| file.name == name)
      {
        return Ok(file);
      }

      debug!(
        attempt,
        path,
        "file not in sandbox yet"
      );
      if attempt < self.attempts {
        tokio::time::sleep(self.interval)
          .await;
      }
    }

    Err(anyhow!(
      "file {path} did not appear in the \
       sandbox of {task_id} after {} \
       attempts",
      self.attempts
    ))
  }
}

/// Splits a sandbox path into the
/// directory to browse and the file
/// name to look for.
fn split_path(path: &str) -> (&str, &str) {
  let trimmed = path.trim_matches('/');
  match trimmed.rsplit_once('/') {
    | Some((dir, name)) => (dir, name),
    | None => ("", trimmed)
  }
}
