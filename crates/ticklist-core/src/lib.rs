pub mod cli;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod render;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use ticklist_shared::Confirm;
use tracing::{
  debug,
  error,
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
    "starting ticklist CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.ticklistrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let store: datastore::DataStore =
    datastore::open_data_dir(&data_dir)
      .inspect_err(|err| {
        error!(error = ?err, "task database unavailable");
      })
      .with_context(|| {
        format!(
          "failed to open task \
           database at {}",
          data_dir.display()
        )
      })?;

  let mut renderer =
    render::Renderer::new(&cfg)?;
  let inv = cli::Invocation::parse(
    &cfg, cli.rest
  )?;

  let auto_confirm = cli.yes
    || cfg.get_bool("confirmation")
      == Some(false);
  let confirm: &dyn Confirm =
    if auto_confirm {
      &commands::AssumeYes
    } else {
      &commands::StdinConfirm
    };

  commands::dispatch(
    &store,
    &mut renderer,
    inv,
    confirm
  )?;

  info!("done");
  Ok(())
}
