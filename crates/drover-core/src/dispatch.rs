use clap::ValueEnum;
use drover_shared::{
  KillTaskData,
  RemoveRequestData,
  RequestParent,
  RunNowRequest,
  SingularityRequest,
  TaskCleanup
};
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info,
  instrument,
  warn
};
use uuid::Uuid;

use crate::api::SchedulerApi;

/// Follow-up requested after a run-now.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AfterTrigger {
  /// Browse the new task's sandbox.
  Sandbox,
  /// Tail a file in the new task's
  /// sandbox.
  Tail
}

#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct RunNowData {
  pub request:       RunNowRequest,
  pub after_trigger: Option<AfterTrigger>,
  pub file_to_tail:  Option<String>
}

/// Where a launcher should start
/// following a freshly triggered run.
#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub struct LaunchTarget {
  pub request_id:   String,
  pub run_id:       String,
  pub file_to_tail: Option<String>
}

/// Receives the starting parameters of
/// a run to follow. Polling cadence and
/// cancellation belong to the
/// implementation.
pub trait TaskLauncher {
  fn start_polling(
    &mut self,
    target: LaunchTarget
  );
}

pub type Continuation<'a, T> =
  Box<dyn FnOnce(&T) + 'a>;

/// Turns operator intents into scheduler
/// calls. Errors are returned untouched.
pub struct ActionDispatcher<'a, A> {
  api: &'a A
}

impl<'a, A> ActionDispatcher<'a, A>
where
  A: SchedulerApi
{
  pub fn new(api: &'a A) -> Self {
    Self {
      api
    }
  }

  pub fn api(&self) -> &'a A {
    self.api
  }

  #[instrument(skip(self, data, then))]
  pub async fn remove_request(
    &self,
    request_id: &str,
    data: RemoveRequestData,
    then: Option<
      Continuation<'_, SingularityRequest>
    >
  ) -> anyhow::Result<SingularityRequest>
  {
    let response = self
      .api
      .remove_request(request_id, &data)
      .await?;
    info!(request_id, "request removed");

    if let Some(then) = then {
      then(&response);
    }
    Ok(response)
  }

  #[instrument(skip(self, data))]
  pub async fn kill_task(
    &self,
    task_id: &str,
    data: KillTaskData
  ) -> anyhow::Result<TaskCleanup> {
    let cleanup = self
      .api
      .kill_task(task_id, &data)
      .await?;
    info!(
      task_id,
      cleanup_type = %cleanup.cleanup_type,
      "task kill requested"
    );
    Ok(cleanup)
  }

  /// Triggers a run. When a follow-up is
  /// requested the launcher is started
  /// once with the new run; a run id is
  /// generated if the caller left it
  /// unset so the run can be found again.
  #[instrument(skip(self, data, launcher))]
  pub async fn run_request<L>(
    &self,
    request_id: &str,
    mut data: RunNowData,
    launcher: &mut L
  ) -> anyhow::Result<RequestParent>
  where
    L: TaskLauncher
  {
    if data.after_trigger.is_some()
      && data.request.run_id.is_none()
    {
      let run_id = Uuid::new_v4().to_string();
      debug!(run_id = %run_id, "generated run id");
      data.request.run_id = Some(run_id);
    }

    let response = self
      .api
      .run_request(request_id, &data.request)
      .await?;
    info!(
      request_id,
      "request run triggered"
    );

    let Some(trigger) = data.after_trigger
    else {
      return Ok(response);
    };

    let run_id = response
      .pending_request
      .as_ref()
      .and_then(|pending| {
        pending.run_id.clone()
      })
      .or(data.request.run_id);

    match run_id {
      | Some(run_id) => {
        let file_to_tail = match trigger {
          | AfterTrigger::Tail => {
            data.file_to_tail
          }
          | AfterTrigger::Sandbox => None
        };
        launcher.start_polling(
          LaunchTarget {
            request_id: response
              .request
              .id
              .clone(),
            run_id,
            file_to_tail
          }
        );
      }
      | None => {
        warn!(
          request_id,
          "run response carried no run \
           id; not following it"
        );
      }
    }

    Ok(response)
  }
}
