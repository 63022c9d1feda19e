use std::fmt;

use anyhow::anyhow;
use drover_shared::{
  PendingTask,
  RequestType,
  SingularityTask,
  SingularityTaskId,
  TaskCleanup,
  TaskRequest,
  TaskResources
};
use serde::{
  Deserialize,
  Serialize
};

/// Status category a task list is
/// fetched and displayed under.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
  #[default]
  Active,
  Scheduled,
  Cleaning,
  LbCleanup,
  Decommissioning
}

impl TaskStatus {
  pub const ALL: [TaskStatus; 5] = [
    TaskStatus::Active,
    TaskStatus::Scheduled,
    TaskStatus::Cleaning,
    TaskStatus::LbCleanup,
    TaskStatus::Decommissioning
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | TaskStatus::Active => "active",
      | TaskStatus::Scheduled => {
        "scheduled"
      }
      | TaskStatus::Cleaning => {
        "cleaning"
      }
      | TaskStatus::LbCleanup => {
        "lbcleanup"
      }
      | TaskStatus::Decommissioning => {
        "decommissioning"
      }
    }
  }

  pub fn parse(
    raw: &str
  ) -> anyhow::Result<Self> {
    let lower =
      raw.trim().to_ascii_lowercase();
    Self::ALL
      .into_iter()
      .find(|status| {
        status.as_str() == lower
      })
      .ok_or_else(|| {
        let valid = Self::ALL
          .iter()
          .map(|s| s.as_str())
          .collect::<Vec<_>>()
          .join(", ");
        anyhow!(
          "unknown task status \
           '{raw}' (expected one \
           of: {valid})"
        )
      })
  }

  /// Status whose endpoint backs this
  /// view. Decommissioning tasks are
  /// still active tasks.
  pub fn fetch_status(self) -> Self {
    match self {
      | TaskStatus::Decommissioning => {
        TaskStatus::Active
      }
      | other => other
    }
  }
}

impl fmt::Display for TaskStatus {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A fetched task row, whichever
/// endpoint it came from.
#[derive(
  Debug, Clone, PartialEq, Serialize,
)]
pub struct TaskEntry {
  pub status:       TaskStatus,
  pub task_id:      Option<SingularityTaskId>,
  pub request_type: Option<RequestType>,
  pub pending_task: Option<PendingTask>,
  pub cleanup_type: Option<String>,
  pub resources:    Option<TaskResources>
}

impl TaskEntry {
  pub fn from_active(
    task: SingularityTask,
    status: TaskStatus
  ) -> Self {
    let request_type = task
      .task_request
      .as_ref()
      .map(|req| req.request.request_type);
    Self {
      status,
      task_id: Some(task.task_id),
      request_type,
      pending_task: task
        .task_request
        .map(|req| req.pending_task),
      cleanup_type: None,
      resources: task.resources
    }
  }

  pub fn from_scheduled(
    request: TaskRequest
  ) -> Self {
    Self {
      status:       TaskStatus::Scheduled,
      task_id:      None,
      request_type: Some(
        request.request.request_type
      ),
      pending_task: Some(
        request.pending_task
      ),
      cleanup_type: None,
      resources:    None
    }
  }

  pub fn from_cleanup(
    cleanup: TaskCleanup
  ) -> Self {
    Self {
      status:       TaskStatus::Cleaning,
      task_id:      Some(cleanup.task_id),
      request_type: None,
      pending_task: None,
      cleanup_type: Some(
        cleanup.cleanup_type
      ),
      resources:    None
    }
  }

  pub fn from_lb_cleanup(
    task_id: SingularityTaskId
  ) -> Self {
    Self {
      status:       TaskStatus::LbCleanup,
      task_id:      Some(task_id),
      request_type: None,
      pending_task: None,
      cleanup_type: None,
      resources:    None
    }
  }

  /// Stable row key: the task id, or
  /// the pending task id for rows that
  /// have not launched.
  pub fn key(&self) -> Option<&str> {
    self
      .task_id
      .as_ref()
      .map(|id| id.id.as_str())
      .or_else(|| {
        self.pending_task.as_ref().map(
          |pending| {
            pending
              .pending_task_id
              .id
              .as_str()
          }
        )
      })
  }

  pub fn request_id(
    &self
  ) -> Option<&str> {
    self
      .task_id
      .as_ref()
      .map(|id| id.request_id.as_str())
      .or_else(|| {
        self.pending_task.as_ref().map(
          |pending| {
            pending
              .pending_task_id
              .request_id
              .as_str()
          }
        )
      })
  }

  pub fn deploy_id(
    &self
  ) -> Option<&str> {
    self
      .task_id
      .as_ref()
      .map(|id| id.deploy_id.as_str())
      .or_else(|| {
        self.pending_task.as_ref().map(
          |pending| {
            pending
              .pending_task_id
              .deploy_id
              .as_str()
          }
        )
      })
  }

  pub fn started_at(
    &self
  ) -> Option<i64> {
    self
      .task_id
      .as_ref()
      .map(|id| id.started_at)
  }

  pub fn next_run_at(
    &self
  ) -> Option<i64> {
    self.pending_task.as_ref().map(
      |pending| {
        pending
          .pending_task_id
          .next_run_at
      }
    )
  }

  pub fn host(&self) -> Option<&str> {
    self
      .task_id
      .as_ref()
      .map(|id| id.host.as_str())
  }

  pub fn rack(&self) -> Option<&str> {
    self
      .task_id
      .as_ref()
      .map(|id| id.rack_id.as_str())
  }

  pub fn instance_no(
    &self
  ) -> Option<u32> {
    self
      .task_id
      .as_ref()
      .map(|id| id.instance_no)
      .or_else(|| {
        self.pending_task.as_ref().map(
          |pending| {
            pending
              .pending_task_id
              .instance_no
          }
        )
      })
  }

  /// Text the free-text filter is
  /// matched against.
  pub fn searchable_fields(
    &self
  ) -> Vec<&str> {
    [
      self.key(),
      self.request_id(),
      self.deploy_id(),
      self.host(),
      self.rack()
    ]
    .into_iter()
    .flatten()
    .collect()
  }
}
