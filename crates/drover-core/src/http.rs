use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use drover_shared::{
  KillTaskData,
  RemoveRequestData,
  RequestParent,
  RunNowRequest,
  SandboxDirectory,
  SingularityRequest,
  SingularityTask,
  SingularityTaskId,
  TaskCleanup,
  TaskIdHistory,
  TaskRequest
};
use reqwest::{
  StatusCode,
  Url
};
use serde::de::DeserializeOwned;
use tracing::{
  debug,
  instrument
};

use crate::api::SchedulerApi;
use crate::config::Config;
use crate::model::{
  TaskEntry,
  TaskStatus
};

pub const DEFAULT_API_URL: &str =
  "http://localhost:7099/singularity/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Scheduler client speaking the JSON
/// HTTP API.
#[derive(Debug, Clone)]
pub struct HttpSchedulerApi {
  client: reqwest::Client,
  base:   Url
}

impl HttpSchedulerApi {
  pub fn new(
    base_url: &str,
    timeout: Duration
  ) -> anyhow::Result<Self> {
    let base = Url::parse(base_url.trim())
      .with_context(|| {
        format!(
          "invalid scheduler API url: \
           {base_url}"
        )
      })?;
    if base.cannot_be_a_base() {
      return Err(anyhow!(
        "scheduler API url cannot be \
         used as a base: {base_url}"
      ));
    }

    let client =
      reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context(
          "failed building HTTP client \
           for scheduler API"
        )?;

    debug!(base = %base, ?timeout, "configured scheduler client");
    Ok(Self {
      client,
      base
    })
  }

  pub fn from_config(
    cfg: &Config
  ) -> anyhow::Result<Self> {
    let base_url = cfg
      .get("api.url")
      .unwrap_or_else(|| {
        DEFAULT_API_URL.to_string()
      });
    let timeout = cfg
      .get_u64("api.timeout")?
      .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Self::new(
      &base_url,
      Duration::from_secs(timeout)
    )
  }

  pub fn base_url(&self) -> &Url {
    &self.base
  }

  fn endpoint(
    &self,
    segments: &[&str]
  ) -> anyhow::Result<Url> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|_| {
        anyhow!(
          "scheduler API url cannot be \
           used as a base: {}",
          self.base
        )
      })?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  async fn get_json<T>(
    &self,
    url: Url
  ) -> anyhow::Result<T>
  where
    T: DeserializeOwned
  {
    debug!(url = %url, "GET");
    self
      .client
      .get(url.clone())
      .send()
      .await
      .with_context(|| {
        format!("failed requesting {url}")
      })?
      .error_for_status()
      .with_context(|| {
        format!("scheduler rejected {url}")
      })?
      .json()
      .await
      .with_context(|| {
        format!(
          "failed decoding response \
           from {url}"
        )
      })
  }

  /// GET where a 404 or an empty body
  /// means the resource does not exist
  /// yet.
  async fn get_optional_json<T>(
    &self,
    url: Url
  ) -> anyhow::Result<Option<T>>
  where
    T: DeserializeOwned
  {
    debug!(url = %url, "GET (optional)");
    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .with_context(|| {
        format!("failed requesting {url}")
      })?;

    if response.status()
      == StatusCode::NOT_FOUND
    {
      return Ok(None);
    }

    let body = response
      .error_for_status()
      .with_context(|| {
        format!("scheduler rejected {url}")
      })?
      .text()
      .await
      .with_context(|| {
        format!(
          "failed reading response \
           from {url}"
        )
      })?;
    if body.trim().is_empty() {
      return Ok(None);
    }

    serde_json::from_str(&body)
      .map(Some)
      .with_context(|| {
        format!(
          "failed decoding response \
           from {url}"
        )
      })
  }
}

impl SchedulerApi for HttpSchedulerApi {
  #[instrument(skip(self))]
  async fn fetch_tasks_in_state(
    &self,
    status: TaskStatus
  ) -> anyhow::Result<Vec<TaskEntry>> {
    let fetch_status =
      status.fetch_status();
    let url = self.endpoint(&[
      "tasks",
      fetch_status.as_str()
    ])?;

    let entries = match fetch_status {
      | TaskStatus::Scheduled => self
        .get_json::<Vec<TaskRequest>>(url)
        .await?
        .into_iter()
        .map(TaskEntry::from_scheduled)
        .collect(),
      | TaskStatus::Cleaning => self
        .get_json::<Vec<TaskCleanup>>(url)
        .await?
        .into_iter()
        .map(TaskEntry::from_cleanup)
        .collect(),
      | TaskStatus::LbCleanup => self
        .get_json::<Vec<SingularityTaskId>>(
          url
        )
        .await?
        .into_iter()
        .map(TaskEntry::from_lb_cleanup)
        .collect(),
      | TaskStatus::Active
      | TaskStatus::Decommissioning => self
        .get_json::<Vec<SingularityTask>>(
          url
        )
        .await?
        .into_iter()
        .map(|task| {
          TaskEntry::from_active(
            task, status
          )
        })
        .collect()
    };

    Ok(entries)
  }

  #[instrument(skip(self))]
  async fn fetch_task_cleanups(
    &self
  ) -> anyhow::Result<Vec<TaskCleanup>> {
    let url = self.endpoint(&[
      "tasks", "cleaning"
    ])?;
    self.get_json(url).await
  }

  #[instrument(skip(self, data))]
  async fn kill_task(
    &self,
    task_id: &str,
    data: &KillTaskData
  ) -> anyhow::Result<TaskCleanup> {
    let url = self.endpoint(&[
      "tasks", "task", task_id
    ])?;
    debug!(url = %url, "DELETE task");
    self
      .client
      .delete(url.clone())
      .json(data)
      .send()
      .await
      .with_context(|| {
        format!("failed requesting {url}")
      })?
      .error_for_status()
      .with_context(|| {
        format!(
          "scheduler refused to kill \
           task {task_id}"
        )
      })?
      .json()
      .await
      .context(
        "failed decoding kill response"
      )
  }

  #[instrument(skip(self, data))]
  async fn run_request(
    &self,
    request_id: &str,
    data: &RunNowRequest
  ) -> anyhow::Result<RequestParent> {
    let url = self.endpoint(&[
      "requests", "request", request_id,
      "run"
    ])?;
    debug!(url = %url, "POST run");
    self
      .client
      .post(url.clone())
      .json(data)
      .send()
      .await
      .with_context(|| {
        format!("failed requesting {url}")
      })?
      .error_for_status()
      .with_context(|| {
        format!(
          "scheduler refused to run \
           request {request_id}"
        )
      })?
      .json()
      .await
      .context(
        "failed decoding run response"
      )
  }

  #[instrument(skip(self, data))]
  async fn remove_request(
    &self,
    request_id: &str,
    data: &RemoveRequestData
  ) -> anyhow::Result<SingularityRequest>
  {
    let url = self.endpoint(&[
      "requests", "request", request_id
    ])?;
    debug!(url = %url, "DELETE request");
    self
      .client
      .delete(url.clone())
      .json(data)
      .send()
      .await
      .with_context(|| {
        format!("failed requesting {url}")
      })?
      .error_for_status()
      .with_context(|| {
        format!(
          "scheduler refused to remove \
           request {request_id}"
        )
      })?
      .json()
      .await
      .context(
        "failed decoding remove response"
      )
  }

  #[instrument(skip(self))]
  async fn fetch_request_run(
    &self,
    request_id: &str,
    run_id: &str
  ) -> anyhow::Result<Option<SingularityTaskId>>
  {
    let url = self.endpoint(&[
      "requests", "request", request_id,
      "run", run_id
    ])?;
    self.get_optional_json(url).await
  }

  #[instrument(skip(self))]
  async fn fetch_request_run_history(
    &self,
    request_id: &str,
    run_id: &str
  ) -> anyhow::Result<Option<TaskIdHistory>>
  {
    let url = self.endpoint(&[
      "history", "request", request_id,
      "run", run_id
    ])?;
    self.get_optional_json(url).await
  }

  #[instrument(skip(self))]
  async fn fetch_task_files(
    &self,
    task_id: &str,
    path: &str
  ) -> anyhow::Result<SandboxDirectory> {
    let mut url = self.endpoint(&[
      "sandbox", task_id, "browse"
    ])?;
    url
      .query_pairs_mut()
      .append_pair("path", path);
    self.get_json(url).await
  }
}
