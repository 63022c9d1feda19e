use chrono::{
  DateTime,
  Local,
  Utc
};

use crate::model::{
  TaskEntry,
  TaskStatus
};

/// Per-row action a column exposes.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum RowAction {
  Kill,
  RunNow
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Column {
  TaskId,
  ScheduledTaskId,
  StartedAt,
  NextRun,
  Host,
  Rack,
  Cpus,
  Memory,
  PendingType,
  DeployId,
  CleanupType,
  InstanceNumber,
  Json,
  Actions(RowAction)
}

const ACTIVE: &[Column] = &[
  Column::TaskId,
  Column::StartedAt,
  Column::Host,
  Column::Rack,
  Column::Cpus,
  Column::Memory,
  Column::Actions(RowAction::Kill)
];

const SCHEDULED: &[Column] = &[
  Column::ScheduledTaskId,
  Column::NextRun,
  Column::PendingType,
  Column::DeployId,
  Column::Actions(RowAction::RunNow)
];

const CLEANING: &[Column] = &[
  Column::TaskId,
  Column::CleanupType,
  Column::Json
];

const LB_CLEANUP: &[Column] = &[
  Column::TaskId,
  Column::StartedAt,
  Column::Host,
  Column::Rack,
  Column::InstanceNumber,
  Column::Json
];

pub fn columns_for(
  status: TaskStatus
) -> &'static [Column] {
  match status {
    | TaskStatus::Active
    | TaskStatus::Decommissioning => {
      ACTIVE
    }
    | TaskStatus::Scheduled => SCHEDULED,
    | TaskStatus::Cleaning => CLEANING,
    | TaskStatus::LbCleanup => LB_CLEANUP
  }
}

/// Actions offered on each row of the
/// given view.
pub fn row_actions(
  status: TaskStatus
) -> Vec<RowAction> {
  columns_for(status)
    .iter()
    .filter_map(|column| match column {
      | Column::Actions(action) => {
        Some(*action)
      }
      | _ => None
    })
    .collect()
}

impl Column {
  pub fn header(self) -> &'static str {
    match self {
      | Column::TaskId
      | Column::ScheduledTaskId => {
        "Task ID"
      }
      | Column::StartedAt => "Started",
      | Column::NextRun => "Next Run",
      | Column::Host => "Host",
      | Column::Rack => "Rack",
      | Column::Cpus => "CPUs",
      | Column::Memory => "Memory",
      | Column::PendingType => {
        "Pending Type"
      }
      | Column::DeployId => "Deploy ID",
      | Column::CleanupType => {
        "Cleanup Type"
      }
      | Column::InstanceNumber => {
        "Instance"
      }
      | Column::Json => "JSON",
      | Column::Actions(_) => "Actions"
    }
  }

  pub fn cell(
    self,
    task: &TaskEntry
  ) -> String {
    match self {
      | Column::TaskId => task
        .task_id
        .as_ref()
        .map(|id| id.id.clone())
        .unwrap_or_default(),
      | Column::ScheduledTaskId => task
        .key()
        .unwrap_or_default()
        .to_string(),
      | Column::StartedAt => {
        format_millis(task.started_at())
      }
      | Column::NextRun => {
        format_millis(task.next_run_at())
      }
      | Column::Host => task
        .host()
        .unwrap_or_default()
        .to_string(),
      | Column::Rack => task
        .rack()
        .unwrap_or_default()
        .to_string(),
      | Column::Cpus => task
        .resources
        .map(|res| format!("{}", res.cpus))
        .unwrap_or_default(),
      | Column::Memory => task
        .resources
        .map(|res| {
          format!(
            "{:.0} MB",
            res.memory_mb
          )
        })
        .unwrap_or_default(),
      | Column::PendingType => task
        .pending_task
        .as_ref()
        .map(|pending| {
          pending
            .pending_task_id
            .pending_type
            .clone()
        })
        .unwrap_or_default(),
      | Column::DeployId => task
        .deploy_id()
        .unwrap_or_default()
        .to_string(),
      | Column::CleanupType => task
        .cleanup_type
        .clone()
        .unwrap_or_default(),
      | Column::InstanceNumber => task
        .instance_no()
        .map(|no| no.to_string())
        .unwrap_or_default(),
      | Column::Json => "{...}".to_string(),
      | Column::Actions(RowAction::Kill) => {
        "kill".to_string()
      }
      | Column::Actions(
        RowAction::RunNow
      ) => "run".to_string()
    }
  }
}

fn format_millis(
  millis: Option<i64>
) -> String {
  millis
    .and_then(
      DateTime::<Utc>::from_timestamp_millis
    )
    .map(|at| {
      at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
    })
    .unwrap_or_default()
}
