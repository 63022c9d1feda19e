use anyhow::anyhow;
use drover_shared::{
  RemoveRequestData,
  SingularityRequest
};
use serde_json::Value;
use tracing::debug;

use crate::api::SchedulerApi;
use crate::dispatch::{
  ActionDispatcher,
  Continuation
};

/// Hidden/visible state of a
/// confirmation, holding whatever the
/// confirmation is about while shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal<T> {
  Hidden,
  Visible(T)
}

impl<T> Default for Modal<T> {
  fn default() -> Self {
    Modal::Hidden
  }
}

impl<T> Modal<T> {
  /// Returns false when already shown;
  /// the first target is kept.
  pub fn show(
    &mut self,
    target: T
  ) -> bool {
    if self.is_visible() {
      return false;
    }
    *self = Modal::Visible(target);
    true
  }

  pub fn cancel(&mut self) {
    *self = Modal::Hidden;
  }

  pub fn is_visible(&self) -> bool {
    matches!(self, Modal::Visible(_))
  }

  pub fn target(&self) -> Option<&T> {
    match self {
      | Modal::Visible(target) => {
        Some(target)
      }
      | Modal::Hidden => None
    }
  }

  /// Hides the modal, handing back its
  /// target.
  pub fn take(&mut self) -> Option<T> {
    match std::mem::replace(
      self,
      Modal::Hidden
    ) {
      | Modal::Visible(target) => {
        Some(target)
      }
      | Modal::Hidden => None
    }
  }
}

pub const REMOVE_QUESTION: &str =
  "Are you sure you want to remove this \
   request?";
pub const REMOVE_NOTICE: &str =
  "If not paused, removing this request \
   will kill all active and scheduled \
   tasks and tasks for it will not run \
   again unless it is reposted to \
   Singularity.";
pub const LOAD_BALANCER_NOTICE: &str =
  "Removing this request will also \
   remove the following settings from \
   the load balancer";

/// Confirmation gathering an optional
/// message before a request removal.
#[derive(Debug, Clone)]
pub struct RemoveModal {
  request_id:         String,
  load_balancer_data: Option<Value>,
  state:              Modal<()>
}

impl RemoveModal {
  pub fn new(
    request_id: impl Into<String>,
    load_balancer_data: Option<Value>
  ) -> Self {
    Self {
      request_id: request_id.into(),
      load_balancer_data,
      state: Modal::Hidden
    }
  }

  pub fn request_id(&self) -> &str {
    &self.request_id
  }

  pub fn show(&mut self) -> bool {
    self.state.show(())
  }

  pub fn cancel(&mut self) {
    debug!(request_id = %self.request_id, "remove cancelled");
    self.state.cancel();
  }

  pub fn is_visible(&self) -> bool {
    self.state.is_visible()
  }

  /// Verbatim dump of the load balancer
  /// settings, only when there are any.
  pub fn load_balancer_warning(
    &self
  ) -> Option<String> {
    let data =
      self.load_balancer_data.as_ref()?;
    if is_empty_value(data) {
      return None;
    }
    serde_json::to_string_pretty(data)
      .ok()
  }

  pub fn prompt_lines(
    &self
  ) -> Vec<String> {
    let mut lines = vec![
      REMOVE_QUESTION.to_string(),
      self.request_id.clone(),
      REMOVE_NOTICE.to_string(),
    ];
    if let Some(dump) =
      self.load_balancer_warning()
    {
      lines.push(
        LOAD_BALANCER_NOTICE.to_string()
      );
      lines.push(dump);
    }
    lines
  }

  /// Dispatches the removal. The modal
  /// hides only once the scheduler has
  /// accepted it.
  pub async fn confirm<A>(
    &mut self,
    dispatcher: &ActionDispatcher<'_, A>,
    message: Option<String>,
    then: Option<
      Continuation<'_, SingularityRequest>
    >
  ) -> anyhow::Result<SingularityRequest>
  where
    A: SchedulerApi
  {
    if !self.is_visible() {
      return Err(anyhow!(
        "remove confirmation for {} is \
         not open",
        self.request_id
      ));
    }

    let data = RemoveRequestData {
      message: message.filter(|text| {
        !text.trim().is_empty()
      })
    };
    let response = dispatcher
      .remove_request(
        &self.request_id,
        data,
        then
      )
      .await?;
    self.state.cancel();
    Ok(response)
  }
}

fn is_empty_value(value: &Value) -> bool {
  match value {
    | Value::Null
    | Value::Bool(_)
    | Value::Number(_) => true,
    | Value::Object(map) => map.is_empty(),
    | Value::Array(items) => {
      items.is_empty()
    }
    | Value::String(text) => {
      text.is_empty()
    }
  }
}
