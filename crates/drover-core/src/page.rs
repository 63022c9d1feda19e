use drover_shared::TaskCleanup;
use tracing::{
  debug,
  info,
  instrument
};

use crate::api::SchedulerApi;
use crate::derive::{
  TaskListView,
  derive_list
};
use crate::filter::{
  FilterState,
  RouteParams
};
use crate::model::{
  TaskEntry,
  TaskStatus
};

/// Receives route changes the page
/// pushes.
pub trait Navigator {
  fn push(&mut self, route: &str);
}

/// Navigator that only records what was
/// pushed.
#[derive(Debug, Clone, Default)]
pub struct RouteHistory {
  routes: Vec<String>
}

impl RouteHistory {
  pub fn routes(&self) -> &[String] {
    &self.routes
  }

  pub fn current(&self) -> Option<&str> {
    self.routes.last().map(String::as_str)
  }
}

impl Navigator for RouteHistory {
  fn push(&mut self, route: &str) {
    debug!(route, "navigate");
    self.routes.push(route.to_string());
  }
}

/// Handle of an issued task fetch. Only
/// the most recently issued one is
/// applied when it completes.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct FetchTicket {
  seq:    u64,
  status: TaskStatus
}

impl FetchTicket {
  pub fn status(&self) -> TaskStatus {
    self.status
  }

  pub fn seq(&self) -> u64 {
    self.seq
  }
}

/// State behind the tasks listing: the
/// filter, the loading flag, and the
/// last applied snapshots.
#[derive(Debug)]
pub struct TasksPage<N> {
  filter:    FilterState,
  loading:   bool,
  tasks:     Vec<TaskEntry>,
  cleanups:  Vec<TaskCleanup>,
  issued:    u64,
  navigator: N
}

impl<N> TasksPage<N>
where
  N: Navigator
{
  pub fn new(
    filter: FilterState,
    navigator: N
  ) -> Self {
    Self {
      filter,
      loading: false,
      tasks: vec![],
      cleanups: vec![],
      issued: 0,
      navigator
    }
  }

  pub fn from_params(
    params: &RouteParams,
    navigator: N
  ) -> anyhow::Result<Self> {
    Ok(Self::new(
      FilterState::from_params(params)?,
      navigator
    ))
  }

  pub fn filter(&self) -> &FilterState {
    &self.filter
  }

  pub fn loading(&self) -> bool {
    self.loading
  }

  pub fn tasks(&self) -> &[TaskEntry] {
    &self.tasks
  }

  pub fn cleanups(
    &self
  ) -> &[TaskCleanup] {
    &self.cleanups
  }

  pub fn navigator(&self) -> &N {
    &self.navigator
  }

  /// Rebuilds the filter from new route
  /// parameters. Nothing carries over
  /// from the previous filter.
  #[instrument(skip(self))]
  pub fn on_route_change(
    &mut self,
    params: &RouteParams
  ) -> anyhow::Result<()> {
    self.filter =
      FilterState::from_params(params)?;
    self.loading = false;
    Ok(())
  }

  pub fn begin_fetch(
    &mut self,
    status: TaskStatus
  ) -> FetchTicket {
    self.issued += 1;
    debug!(
      seq = self.issued,
      %status,
      "issued task fetch"
    );
    FetchTicket {
      seq: self.issued,
      status
    }
  }

  /// Applies a finished fetch when it is
  /// the latest one issued. Returns
  /// whether it was applied; stale
  /// results are dropped, errors
  /// included.
  pub fn complete_fetch(
    &mut self,
    ticket: FetchTicket,
    result: anyhow::Result<Vec<TaskEntry>>
  ) -> anyhow::Result<bool> {
    if ticket.seq != self.issued {
      debug!(
        seq = ticket.seq,
        latest = self.issued,
        "dropping stale task fetch"
      );
      return Ok(false);
    }

    self.loading = false;
    self.tasks = result?;
    Ok(true)
  }

  /// Records a filter change: sets the
  /// loading flag, pushes the new route
  /// and, when the status moved, issues a
  /// fetch for it.
  #[instrument(skip(self), fields(from = %self.filter.task_status))]
  pub fn begin_filter_change(
    &mut self,
    filter: FilterState
  ) -> Option<FetchTicket> {
    let status_changed = self
      .filter
      .task_status
      != filter.task_status;
    self.loading = status_changed;
    self.filter = filter;

    let route = self.filter.route();
    self.navigator.push(&route);

    if !status_changed {
      return None;
    }
    let status = self.filter.task_status;
    Some(self.begin_fetch(status))
  }

  pub async fn change_filter<A>(
    &mut self,
    api: &A,
    filter: FilterState
  ) -> anyhow::Result<()>
  where
    A: SchedulerApi
  {
    let Some(ticket) =
      self.begin_filter_change(filter)
    else {
      return Ok(());
    };

    let result = api
      .fetch_tasks_in_state(ticket.status)
      .await;
    self.complete_fetch(ticket, result)?;
    Ok(())
  }

  /// Fetches the current status's tasks
  /// and the cleanups together.
  #[instrument(skip(self, api), fields(status = %self.filter.task_status))]
  pub async fn refresh<A>(
    &mut self,
    api: &A
  ) -> anyhow::Result<()>
  where
    A: SchedulerApi
  {
    let ticket = self.begin_fetch(
      self.filter.task_status
    );
    let (tasks, cleanups) = tokio::try_join!(
      api.fetch_tasks_in_state(
        ticket.status
      ),
      api.fetch_task_cleanups()
    )?;

    self.cleanups = cleanups;
    let applied =
      self.complete_fetch(ticket, Ok(tasks))?;
    info!(
      applied,
      tasks = self.tasks.len(),
      cleanups = self.cleanups.len(),
      "refreshed tasks"
    );
    Ok(())
  }

  pub fn rows(&self) -> Vec<TaskEntry> {
    derive_list(
      &self.tasks,
      &self.cleanups,
      &self.filter
    )
  }

  /// Loading wins over any data, so a
  /// stale list never shows while a new
  /// status is being fetched.
  pub fn view(&self) -> TaskListView {
    if self.loading {
      return TaskListView::Loading;
    }
    TaskListView::from_rows(self.rows())
  }
}
