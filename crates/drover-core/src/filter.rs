use std::collections::BTreeSet;

use anyhow::anyhow;
use drover_shared::RequestType;
use tracing::trace;

use crate::model::TaskStatus;

/// Route token standing for the full
/// set of request types.
pub const ALL_REQUEST_TYPES: &str =
  "all";

const ROUTE_ROOT: &str = "tasks";

/// Raw navigation parameters, as found
/// in `/tasks/{state}/{types}/{text}`.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct RouteParams {
  pub state:               Option<String>,
  pub requests_sub_filter: Option<String>,
  pub search_filter:       Option<String>
}

impl RouteParams {
  /// Splits a tasks route. Everything
  /// after the third segment is kept as
  /// the search text, slashes included.
  pub fn parse_path(
    path: &str
  ) -> anyhow::Result<Self> {
    let trimmed =
      path.trim().trim_start_matches('/');
    let mut parts =
      trimmed.splitn(4, '/');

    match parts.next() {
      | Some(ROUTE_ROOT) => {}
      | Some("") | None => {
        return Ok(Self::default());
      }
      | Some(other) => {
        return Err(anyhow!(
          "not a tasks route: /{other}"
        ));
      }
    }

    let non_empty = |part: Option<&str>| {
      part
        .filter(|value| !value.is_empty())
        .map(str::to_string)
    };

    Ok(Self {
      state:               non_empty(
        parts.next()
      ),
      requests_sub_filter: non_empty(
        parts.next()
      ),
      search_filter:       non_empty(
        parts.next()
      )
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
  pub task_status:   TaskStatus,
  pub request_types: BTreeSet<RequestType>,
  pub filter_text:   String
}

impl Default for FilterState {
  fn default() -> Self {
    Self {
      task_status:   TaskStatus::Active,
      request_types: full_request_types(),
      filter_text:   String::new()
    }
  }
}

impl FilterState {
  #[tracing::instrument]
  pub fn from_params(
    params: &RouteParams
  ) -> anyhow::Result<Self> {
    let task_status =
      match params.state.as_deref() {
        | Some(raw) => {
          TaskStatus::parse(raw)?
        }
        | None => TaskStatus::Active
      };
    let request_types =
      decode_request_types(
        params
          .requests_sub_filter
          .as_deref()
      )?;
    let filter_text = params
      .search_filter
      .clone()
      .unwrap_or_default();

    trace!(
      status = %task_status,
      types = request_types.len(),
      text = %filter_text,
      "decoded filter state"
    );

    Ok(Self {
      task_status,
      request_types,
      filter_text
    })
  }

  pub fn from_route(
    path: &str
  ) -> anyhow::Result<Self> {
    Self::from_params(
      &RouteParams::parse_path(path)?
    )
  }

  pub fn encoded_request_types(
    &self
  ) -> String {
    encode_request_types(
      &self.request_types
    )
  }

  /// Route that reproduces this state
  /// when decoded.
  pub fn route(&self) -> String {
    format!(
      "/{ROUTE_ROOT}/{}/{}/{}",
      self.task_status,
      self.encoded_request_types(),
      self.filter_text
    )
  }

  /// Request-type toggles only apply to
  /// the active view.
  pub fn displays_request_type_filters(
    &self
  ) -> bool {
    self.task_status
      == TaskStatus::Active
  }
}

pub fn full_request_types()
-> BTreeSet<RequestType> {
  RequestType::ALL.into_iter().collect()
}

pub fn decode_request_types(
  raw: Option<&str>
) -> anyhow::Result<BTreeSet<RequestType>>
{
  let Some(raw) = raw else {
    return Ok(full_request_types());
  };
  if raw.trim() == ALL_REQUEST_TYPES {
    return Ok(full_request_types());
  }

  raw
    .split(',')
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .map(|part| {
      RequestType::parse(part)
        .ok_or_else(|| {
          anyhow!(
            "unknown request type: \
             {part}"
          )
        })
    })
    .collect()
}

pub fn encode_request_types(
  types: &BTreeSet<RequestType>
) -> String {
  if types.len() == RequestType::ALL.len()
  {
    return ALL_REQUEST_TYPES.to_string();
  }

  types
    .iter()
    .map(|kind| kind.as_str())
    .collect::<Vec<_>>()
    .join(",")
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use drover_shared::RequestType;

  use super::{
    FilterState,
    RouteParams,
    decode_request_types,
    encode_request_types,
    full_request_types
  };
  use crate::model::TaskStatus;

  #[test]
  fn empty_route_uses_defaults() {
    let filter =
      FilterState::from_route("/tasks")
        .expect("decode");
    assert_eq!(
      filter,
      FilterState::default()
    );
    assert_eq!(
      filter.route(),
      "/tasks/active/all/"
    );
  }

  #[test]
  fn all_token_round_trips() {
    let decoded =
      decode_request_types(Some("all"))
        .expect("decode all");
    assert_eq!(
      decoded,
      full_request_types()
    );
    assert_eq!(
      encode_request_types(&decoded),
      "all"
    );

    let spelled_out = decode_request_types(
      Some(
        "RUN_ONCE,SERVICE,WORKER,\
         ON_DEMAND,SCHEDULED"
      )
    )
    .expect("decode list");
    assert_eq!(
      encode_request_types(&spelled_out),
      "all"
    );
  }

  #[test]
  fn subset_is_encoded_in_fixed_order() {
    let types: BTreeSet<_> = [
      RequestType::Worker,
      RequestType::Service
    ]
    .into_iter()
    .collect();
    assert_eq!(
      encode_request_types(&types),
      "SERVICE,WORKER"
    );
  }

  #[test]
  fn empty_subset_is_not_all() {
    let filter =
      FilterState::from_route(
        "/tasks/active/,/"
      )
      .expect("decode");
    assert!(
      filter.request_types.is_empty()
    );
    assert_eq!(
      filter.encoded_request_types(),
      ""
    );
  }

  #[test]
  fn search_text_keeps_slashes() {
    let params = RouteParams::parse_path(
      "/tasks/scheduled/WORKER/a/b"
    )
    .expect("parse");
    assert_eq!(
      params.search_filter.as_deref(),
      Some("a/b")
    );

    let filter =
      FilterState::from_params(&params)
        .expect("decode");
    assert_eq!(
      filter.task_status,
      TaskStatus::Scheduled
    );
    assert_eq!(
      filter.route(),
      "/tasks/scheduled/WORKER/a/b"
    );
  }

  #[test]
  fn rejects_unknown_request_type() {
    let err = FilterState::from_route(
      "/tasks/active/SERVICE,DAEMON/"
    )
    .expect_err("unknown type");
    assert!(
      err.to_string().contains("DAEMON")
    );
  }

  #[test]
  fn rejects_foreign_routes() {
    assert!(
      RouteParams::parse_path(
        "/requests/active"
      )
      .is_err()
    );
  }
}
