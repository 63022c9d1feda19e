use drover_shared::{
  KillTaskData,
  RemoveRequestData,
  RequestParent,
  RunNowRequest,
  SandboxDirectory,
  SingularityRequest,
  SingularityTaskId,
  TaskCleanup,
  TaskIdHistory
};

use crate::model::{
  TaskEntry,
  TaskStatus
};

/// Contract of the scheduler backend.
///
/// Implementations report failures as
/// errors and never retry; callers
/// decide how to surface them.
#[allow(async_fn_in_trait)]
pub trait SchedulerApi {
  /// Tasks listed under `status`, each
  /// tagged with that status.
  async fn fetch_tasks_in_state(
    &self,
    status: TaskStatus
  ) -> anyhow::Result<Vec<TaskEntry>>;

  async fn fetch_task_cleanups(
    &self
  ) -> anyhow::Result<Vec<TaskCleanup>>;

  async fn kill_task(
    &self,
    task_id: &str,
    data: &KillTaskData
  ) -> anyhow::Result<TaskCleanup>;

  async fn run_request(
    &self,
    request_id: &str,
    data: &RunNowRequest
  ) -> anyhow::Result<RequestParent>;

  async fn remove_request(
    &self,
    request_id: &str,
    data: &RemoveRequestData
  ) -> anyhow::Result<SingularityRequest>;

  /// `None` while the run has not been
  /// turned into a task yet.
  async fn fetch_request_run(
    &self,
    request_id: &str,
    run_id: &str
  ) -> anyhow::Result<Option<SingularityTaskId>>;

  async fn fetch_request_run_history(
    &self,
    request_id: &str,
    run_id: &str
  ) -> anyhow::Result<Option<TaskIdHistory>>;

  async fn fetch_task_files(
    &self,
    task_id: &str,
    path: &str
  ) -> anyhow::Result<SandboxDirectory>;
}
