#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use anyhow::anyhow;
use drover_core::api::SchedulerApi;
use drover_core::model::{TaskEntry, TaskStatus};
use drover_shared::{
    KillTaskData, PendingRequest, RemoveRequestData, RequestParent, RequestType, RunNowRequest,
    SandboxDirectory, SandboxFile, SingularityRequest, SingularityTaskId, TaskCleanup,
    TaskIdHistory,
};

/// In-memory scheduler recording every call it receives.
#[derive(Default)]
pub struct FakeScheduler {
    pub tasks: HashMap<TaskStatus, Vec<TaskEntry>>,
    pub cleanups: Vec<TaskCleanup>,
    pub fail_fetch: bool,
    pub fail_remove: bool,
    pub launches: RefCell<VecDeque<Option<SingularityTaskId>>>,
    pub sandbox: RefCell<VecDeque<Vec<SandboxFile>>>,
    pub calls: RefCell<Vec<String>>,
    pub sent_runs: RefCell<Vec<RunNowRequest>>,
}

impl FakeScheduler {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl SchedulerApi for FakeScheduler {
    async fn fetch_tasks_in_state(&self, status: TaskStatus) -> anyhow::Result<Vec<TaskEntry>> {
        self.record(format!("fetch {status}"));
        if self.fail_fetch {
            return Err(anyhow!("scheduler unavailable"));
        }
        Ok(self
            .tasks
            .get(&status.fetch_status())
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|mut task| {
                task.status = status;
                task
            })
            .collect())
    }

    async fn fetch_task_cleanups(&self) -> anyhow::Result<Vec<TaskCleanup>> {
        self.record("cleanups".to_string());
        Ok(self.cleanups.clone())
    }

    async fn kill_task(&self, task_id: &str, data: &KillTaskData) -> anyhow::Result<TaskCleanup> {
        self.record(format!("kill {task_id}"));
        Ok(TaskCleanup {
            task_id: task_id_for(task_id, "host-1", 0),
            cleanup_type: "USER_REQUESTED".to_string(),
            user: None,
            timestamp: 0,
            message: data.message.clone(),
        })
    }

    async fn run_request(&self, request_id: &str, data: &RunNowRequest) -> anyhow::Result<RequestParent> {
        self.record(format!("run {request_id}"));
        self.sent_runs.borrow_mut().push(data.clone());
        Ok(RequestParent {
            request: request(request_id),
            state: Some("ACTIVE".to_string()),
            pending_request: Some(PendingRequest {
                request_id: request_id.to_string(),
                deploy_id: "d1".to_string(),
                timestamp: 0,
                pending_type: "ONEOFF".to_string(),
                run_id: data.run_id.clone(),
            }),
        })
    }

    async fn remove_request(
        &self,
        request_id: &str,
        data: &RemoveRequestData,
    ) -> anyhow::Result<SingularityRequest> {
        self.record(format!(
            "remove {request_id} {}",
            data.message.as_deref().unwrap_or("-")
        ));
        if self.fail_remove {
            return Err(anyhow!("request {request_id} is locked"));
        }
        Ok(request(request_id))
    }

    async fn fetch_request_run(
        &self,
        request_id: &str,
        run_id: &str,
    ) -> anyhow::Result<Option<SingularityTaskId>> {
        self.record(format!("run-status {request_id} {run_id}"));
        Ok(self.launches.borrow_mut().pop_front().flatten())
    }

    async fn fetch_request_run_history(
        &self,
        request_id: &str,
        run_id: &str,
    ) -> anyhow::Result<Option<TaskIdHistory>> {
        self.record(format!("run-history {request_id} {run_id}"));
        Ok(None)
    }

    async fn fetch_task_files(&self, task_id: &str, path: &str) -> anyhow::Result<SandboxDirectory> {
        self.record(format!("files {task_id} {path}"));
        Ok(SandboxDirectory {
            current_directory: path.to_string(),
            files: self.sandbox.borrow_mut().pop_front().unwrap_or_default(),
            ..SandboxDirectory::default()
        })
    }
}

pub fn request(id: &str) -> SingularityRequest {
    SingularityRequest {
        id: id.to_string(),
        request_type: RequestType::OnDemand,
        instances: None,
        owners: vec![],
    }
}

pub fn task_id_for(id: &str, host: &str, started_at: i64) -> SingularityTaskId {
    SingularityTaskId {
        id: id.to_string(),
        request_id: format!("req-{id}"),
        deploy_id: "d1".to_string(),
        started_at,
        instance_no: 1,
        host: host.to_string(),
        rack_id: "rack-a".to_string(),
    }
}

pub fn active_task(id: &str, kind: RequestType, host: &str, started_at: i64) -> TaskEntry {
    TaskEntry {
        status: TaskStatus::Active,
        task_id: Some(task_id_for(id, host, started_at)),
        request_type: Some(kind),
        pending_task: None,
        cleanup_type: None,
        resources: None,
    }
}

pub fn cleaning_task(id: &str, cleanup_type: &str) -> TaskEntry {
    TaskEntry {
        status: TaskStatus::Cleaning,
        task_id: Some(task_id_for(id, "host-9", 0)),
        request_type: None,
        pending_task: None,
        cleanup_type: Some(cleanup_type.to_string()),
        resources: None,
    }
}

pub fn cleanup(id: &str, host: &str, cleanup_type: &str) -> TaskCleanup {
    TaskCleanup {
        task_id: task_id_for(id, host, 0),
        cleanup_type: cleanup_type.to_string(),
        user: None,
        timestamp: 0,
        message: None,
    }
}

pub fn sandbox_file(name: &str) -> SandboxFile {
    SandboxFile {
        name: name.to_string(),
        size: 64,
        mtime: 0,
        mode: "-rw-r--r--".to_string(),
    }
}
