mod common;

use anyhow::anyhow;
use common::{FakeScheduler, active_task, cleaning_task, cleanup};
use drover_core::derive::TaskListView;
use drover_core::filter::{FilterState, RouteParams};
use drover_core::model::TaskStatus;
use drover_core::page::{RouteHistory, TasksPage};
use drover_shared::RequestType;

fn scheduler() -> FakeScheduler {
    let mut api = FakeScheduler::default();
    api.tasks.insert(
        TaskStatus::Active,
        vec![
            active_task("web-1", RequestType::Service, "host-1", 100),
            active_task("worker-1", RequestType::Worker, "host-2", 200),
            active_task("web-2", RequestType::Service, "host-2", 300),
        ],
    );
    api.tasks.insert(
        TaskStatus::Cleaning,
        vec![cleaning_task("old-1", "USER_REQUESTED")],
    );
    api.cleanups = vec![cleanup("worker-1", "host-2", "DECOMISSIONING")];
    api
}

fn page_at(route: &str) -> TasksPage<RouteHistory> {
    let params = RouteParams::parse_path(route).expect("route");
    TasksPage::from_params(&params, RouteHistory::default()).expect("page")
}

fn keys(view: &TaskListView) -> Vec<String> {
    match view {
        TaskListView::Rows(rows) => rows
            .iter()
            .filter_map(|row| row.key().map(str::to_string))
            .collect(),
        _ => vec![],
    }
}

#[tokio::test]
async fn refresh_fetches_tasks_and_cleanups() {
    let api = scheduler();
    let mut page = page_at("/tasks/active/all/");

    page.refresh(&api).await.expect("refresh");

    let calls = api.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.contains(&"fetch active".to_string()));
    assert!(calls.contains(&"cleanups".to_string()));
    assert_eq!(page.cleanups().len(), 1);
    assert!(!page.loading());
    assert_eq!(keys(&page.view()), vec!["web-2", "worker-1", "web-1"]);
}

#[tokio::test]
async fn decommissioning_route_lists_draining_hosts() {
    let api = scheduler();
    let mut page = page_at("/tasks/decommissioning/all/");

    page.refresh(&api).await.expect("refresh");

    assert_eq!(api.calls()[0], "fetch decommissioning");
    assert_eq!(keys(&page.view()), vec!["web-2", "worker-1"]);
}

#[tokio::test]
async fn subset_route_filters_request_types_and_text() {
    let api = scheduler();
    let mut page = page_at("/tasks/active/SERVICE/WEB-1");

    page.refresh(&api).await.expect("refresh");

    assert_eq!(keys(&page.view()), vec!["web-1"]);
}

#[test]
fn status_change_loads_until_fetch_completes() {
    let mut page = page_at("/tasks/active/all/");
    let next = FilterState {
        task_status: TaskStatus::Scheduled,
        ..page.filter().clone()
    };

    let ticket = page.begin_filter_change(next).expect("status change fetches");
    assert!(page.loading());
    assert_eq!(page.view(), TaskListView::Loading);
    assert_eq!(ticket.status(), TaskStatus::Scheduled);
    assert_eq!(page.navigator().current(), Some("/tasks/scheduled/all/"));

    let applied = page.complete_fetch(ticket, Ok(vec![])).expect("complete");
    assert!(applied);
    assert!(!page.loading());
    assert_eq!(page.view(), TaskListView::Empty);
}

#[tokio::test]
async fn text_change_does_not_refetch() {
    let api = scheduler();
    let mut page = page_at("/tasks/active/all/");
    page.refresh(&api).await.expect("refresh");

    let mut next = page.filter().clone();
    next.filter_text = "worker".to_string();
    next.request_types.remove(&RequestType::RunOnce);
    page.change_filter(&api, next).await.expect("change filter");

    assert_eq!(api.calls().len(), 2);
    assert!(!page.loading());
    assert_eq!(
        page.navigator().current(),
        Some("/tasks/active/SERVICE,WORKER,SCHEDULED,ON_DEMAND/worker")
    );
    assert_eq!(keys(&page.view()), vec!["worker-1"]);
}

#[tokio::test]
async fn change_filter_fetches_new_status() {
    let api = scheduler();
    let mut page = page_at("/tasks/active/all/");
    page.refresh(&api).await.expect("refresh");

    let next = FilterState {
        task_status: TaskStatus::Cleaning,
        ..page.filter().clone()
    };
    page.change_filter(&api, next).await.expect("change filter");

    assert_eq!(api.calls().last().map(String::as_str), Some("fetch cleaning"));
    assert!(!page.loading());
    assert_eq!(keys(&page.view()), vec!["old-1"]);
}

#[tokio::test]
async fn type_subset_survives_switch_to_cleaning() {
    let api = scheduler();
    let mut page = page_at("/tasks/active/SERVICE/");
    page.refresh(&api).await.expect("refresh");
    assert_eq!(keys(&page.view()), vec!["web-2", "web-1"]);

    let next = FilterState {
        task_status: TaskStatus::Cleaning,
        ..page.filter().clone()
    };
    page.change_filter(&api, next).await.expect("change filter");

    assert_eq!(page.navigator().current(), Some("/tasks/cleaning/SERVICE/"));
    assert_eq!(keys(&page.view()), vec!["old-1"]);
}

#[test]
fn latest_status_change_wins() {
    let mut page = page_at("/tasks/active/all/");
    let to_scheduled = FilterState {
        task_status: TaskStatus::Scheduled,
        ..FilterState::default()
    };
    let to_cleaning = FilterState {
        task_status: TaskStatus::Cleaning,
        ..FilterState::default()
    };

    let first = page.begin_filter_change(to_scheduled).expect("first fetch");
    let second = page.begin_filter_change(to_cleaning).expect("second fetch");
    assert!(second.seq() > first.seq());

    let stale = vec![active_task("stale", RequestType::Service, "h", 1)];
    let applied = page.complete_fetch(first, Ok(stale)).expect("stale completion");
    assert!(!applied);
    assert!(page.loading());
    assert!(page.tasks().is_empty());

    let fresh = vec![cleaning_task("fresh", "BOUNCING")];
    assert!(page.complete_fetch(second, Ok(fresh)).expect("fresh completion"));
    assert!(!page.loading());
    assert_eq!(keys(&page.view()), vec!["fresh"]);
}

#[test]
fn stale_failures_are_ignored_and_latest_failures_surface() {
    let mut page = page_at("/tasks/active/all/");
    let first = page
        .begin_filter_change(FilterState {
            task_status: TaskStatus::LbCleanup,
            ..FilterState::default()
        })
        .expect("first");
    let second = page
        .begin_filter_change(FilterState {
            task_status: TaskStatus::Scheduled,
            ..FilterState::default()
        })
        .expect("second");

    let ignored = page
        .complete_fetch(first, Err(anyhow!("timeout")))
        .expect("stale error dropped");
    assert!(!ignored);
    assert!(page.loading());

    let err = page
        .complete_fetch(second, Err(anyhow!("scheduler unavailable")))
        .expect_err("latest error surfaces");
    assert!(err.to_string().contains("unavailable"));
    assert!(!page.loading());
}

#[tokio::test]
async fn fetch_errors_propagate_from_refresh() {
    let api = FakeScheduler {
        fail_fetch: true,
        ..FakeScheduler::default()
    };
    let mut page = page_at("/tasks/active/all/");

    let err = page.refresh(&api).await.expect_err("fetch fails");
    assert!(err.to_string().contains("scheduler unavailable"));
}

#[test]
fn route_change_rebuilds_filter_and_clears_loading() {
    let mut page = page_at("/tasks/active/all/");
    page.begin_filter_change(FilterState {
        task_status: TaskStatus::Scheduled,
        ..FilterState::default()
    });
    assert!(page.loading());

    let params = RouteParams::parse_path("/tasks/lbcleanup/WORKER/x").expect("route");
    page.on_route_change(&params).expect("route change");

    assert!(!page.loading());
    assert_eq!(page.filter().task_status, TaskStatus::LbCleanup);
    assert_eq!(page.filter().filter_text, "x");
    assert_eq!(page.filter().encoded_request_types(), "WORKER");
}
