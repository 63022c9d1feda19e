pub mod api;
pub mod cli;
pub mod columns;
pub mod commands;
pub mod config;
pub mod derive;
pub mod dispatch;
pub mod filter;
pub mod http;
pub mod launcher;
pub mod modal;
pub mod model;
pub mod page;
pub mod render;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting drover"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.droverrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );
  if let Some(api_url) = cli.api {
    cfg.apply_overrides([(
      "api.url".to_string(),
      api_url
    )]);
  }

  let api =
    http::HttpSchedulerApi::from_config(
      &cfg
    )?;
  let mut renderer =
    render::Renderer::new(&cfg);

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_all()
      .build()
      .context(
        "failed to start async runtime"
      )?;

  runtime.block_on(commands::dispatch(
    &api,
    &cfg,
    &mut renderer,
    cli.command
  ))?;

  info!("done");
  Ok(())
}
