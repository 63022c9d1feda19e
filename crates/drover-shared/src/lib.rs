use serde::{
  Deserialize,
  Serialize
};

/// Kind of scheduling definition a task
/// belongs to. Declaration order is the
/// fixed order used when a subset is
/// written back into a route.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
  Service,
  Worker,
  Scheduled,
  OnDemand,
  RunOnce
}

impl RequestType {
  pub const ALL: [RequestType; 5] = [
    RequestType::Service,
    RequestType::Worker,
    RequestType::Scheduled,
    RequestType::OnDemand,
    RequestType::RunOnce
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      | RequestType::Service => "SERVICE",
      | RequestType::Worker => "WORKER",
      | RequestType::Scheduled => {
        "SCHEDULED"
      }
      | RequestType::OnDemand => {
        "ON_DEMAND"
      }
      | RequestType::RunOnce => {
        "RUN_ONCE"
      }
    }
  }

  pub fn parse(
    raw: &str
  ) -> Option<Self> {
    let upper =
      raw.trim().to_ascii_uppercase();
    Self::ALL
      .into_iter()
      .find(|kind| kind.as_str() == upper)
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct SingularityTaskId {
  pub id:          String,
  pub request_id:  String,
  #[serde(default)]
  pub deploy_id:   String,
  pub started_at:  i64,
  #[serde(default)]
  pub instance_no: u32,
  #[serde(default)]
  pub host:        String,
  #[serde(default)]
  pub rack_id:     String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct SingularityRequest {
  pub id:           String,
  pub request_type: RequestType,
  #[serde(default)]
  pub instances:    Option<u32>,
  #[serde(default)]
  pub owners:       Vec<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct DeployRef {
  pub id: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct PendingTaskId {
  pub id:           String,
  pub request_id:   String,
  #[serde(default)]
  pub deploy_id:    String,
  pub next_run_at:  i64,
  #[serde(default)]
  pub instance_no:  u32,
  #[serde(default)]
  pub pending_type: String,
  #[serde(default)]
  pub created_at:   i64
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct PendingTask {
  pub pending_task_id: PendingTaskId,
  #[serde(default)]
  pub cmd_line_args_list:
    Option<Vec<String>>,
  #[serde(default)]
  pub run_id:          Option<String>,
  #[serde(default)]
  pub user:            Option<String>,
  #[serde(default)]
  pub message:         Option<String>
}

/// One entry of `/tasks/scheduled`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
  pub request:      SingularityRequest,
  pub deploy:       DeployRef,
  pub pending_task: PendingTask
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskResources {
  pub cpus:      f64,
  pub memory_mb: f64,
  #[serde(default)]
  pub num_ports: u32
}

/// One entry of `/tasks/active`.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct SingularityTask {
  pub task_id:      SingularityTaskId,
  #[serde(default)]
  pub task_request: Option<TaskRequest>,
  #[serde(default)]
  pub resources:    Option<TaskResources>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskCleanup {
  pub task_id:      SingularityTaskId,
  pub cleanup_type: String,
  #[serde(default)]
  pub user:         Option<String>,
  #[serde(default)]
  pub timestamp:    i64,
  #[serde(default)]
  pub message:      Option<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct KillTaskData {
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub message: Option<String>,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub wait_for_replacement_task:
    Option<bool>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct RunNowRequest {
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub message: Option<String>,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub run_id: Option<String>,
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub command_line_args:
    Option<Vec<String>>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequestData {
  #[serde(
    skip_serializing_if = "Option::is_none"
  )]
  pub message: Option<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct PendingRequest {
  pub request_id:   String,
  #[serde(default)]
  pub deploy_id:    String,
  #[serde(default)]
  pub timestamp:    i64,
  #[serde(default)]
  pub pending_type: String,
  #[serde(default)]
  pub run_id:       Option<String>
}

/// Response of a run-now call.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct RequestParent {
  pub request:         SingularityRequest,
  #[serde(default)]
  pub state:           Option<String>,
  #[serde(default)]
  pub pending_request: Option<PendingRequest>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct TaskIdHistory {
  pub task_id:         SingularityTaskId,
  #[serde(default)]
  pub updated_at:      i64,
  #[serde(default)]
  pub last_task_state: Option<String>,
  #[serde(default)]
  pub run_id:          Option<String>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct SandboxFile {
  pub name:  String,
  #[serde(default)]
  pub size:  u64,
  #[serde(default)]
  pub mtime: i64,
  #[serde(default)]
  pub mode:  String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
#[serde(rename_all = "camelCase")]
pub struct SandboxDirectory {
  #[serde(default)]
  pub full_path_to_root:  String,
  #[serde(default)]
  pub current_directory:  String,
  #[serde(default)]
  pub slave_hostname:     String,
  #[serde(default)]
  pub files: Vec<SandboxFile>
}
