use std::collections::HashSet;

use drover_shared::TaskCleanup;
use tracing::debug;

use crate::filter::FilterState;
use crate::model::{
  TaskEntry,
  TaskStatus
};

/// Cleanup tags that mark a host as
/// draining. The scheduler has shipped
/// both spellings.
pub const DECOMMISSION_CLEANUP_TYPES:
  [&str; 2] =
  ["DECOMISSIONING", "DECOMMISSIONING"];

/// What the task table should show.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskListView {
  Loading,
  Empty,
  Rows(Vec<TaskEntry>)
}

impl TaskListView {
  pub fn from_rows(
    rows: Vec<TaskEntry>
  ) -> Self {
    if rows.is_empty() {
      TaskListView::Empty
    } else {
      TaskListView::Rows(rows)
    }
  }
}

#[tracing::instrument(skip_all, fields(
  status = %filter.task_status,
  tasks = tasks.len(),
  cleanups = cleanups.len()
))]
pub fn derive_list(
  tasks: &[TaskEntry],
  cleanups: &[TaskCleanup],
  filter: &FilterState
) -> Vec<TaskEntry> {
  let mut rows = match filter.task_status
  {
    | TaskStatus::Decommissioning => {
      decommissioning_tasks(
        tasks, cleanups
      )
    }
    | _ => filtered_tasks(tasks, filter)
  };

  sort_rows(
    &mut rows,
    filter.task_status
  );

  debug!(
    rows = rows.len(),
    "derived task list"
  );
  rows
}

/// Tasks running on a host that has a
/// decommission cleanup against it.
pub fn decommissioning_tasks(
  tasks: &[TaskEntry],
  cleanups: &[TaskCleanup]
) -> Vec<TaskEntry> {
  let draining: HashSet<&str> = cleanups
    .iter()
    .filter(|cleanup| {
      is_decommission_cleanup(
        &cleanup.cleanup_type
      )
    })
    .map(|cleanup| {
      cleanup.task_id.host.as_str()
    })
    .collect();

  tasks
    .iter()
    .filter(|task| {
      task
        .host()
        .map(|host| draining.contains(host))
        .unwrap_or(false)
    })
    .cloned()
    .collect()
}

pub fn is_decommission_cleanup(
  cleanup_type: &str
) -> bool {
  DECOMMISSION_CLEANUP_TYPES
    .contains(&cleanup_type)
}

/// Rows without a known request type
/// (cleaning and lbcleanup listings) are
/// not narrowed by the type subset; only
/// an empty subset hides them.
pub fn filtered_tasks(
  tasks: &[TaskEntry],
  filter: &FilterState
) -> Vec<TaskEntry> {
  let needle =
    filter.filter_text.to_lowercase();
  let any_types =
    !filter.request_types.is_empty();

  tasks
    .iter()
    .filter(|task| {
      if task.status != filter.task_status
      {
        return false;
      }

      let type_match =
        match task.request_type {
          | Some(kind) => filter
            .request_types
            .contains(&kind),
          | None => any_types
        };
      if !type_match {
        return false;
      }

      needle.is_empty()
        || task
          .searchable_fields()
          .iter()
          .any(|field| {
            field
              .to_lowercase()
              .contains(&needle)
          })
    })
    .cloned()
    .collect()
}

/// Ascending by the status sort key,
/// missing keys first, then reversed for
/// the views that list newest first.
fn sort_rows(
  rows: &mut [TaskEntry],
  status: TaskStatus
) {
  match status {
    | TaskStatus::Active
    | TaskStatus::Decommissioning => {
      rows.sort_by_key(|task| {
        task.started_at()
      });
      rows.reverse();
    }
    | TaskStatus::Scheduled => {
      rows.sort_by_key(|task| {
        task.next_run_at()
      });
    }
    | TaskStatus::Cleaning
    | TaskStatus::LbCleanup => {}
  }
}
