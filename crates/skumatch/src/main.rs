mod batch;
mod config;
mod errors;
mod input;
mod trace;

use std::sync::{Arc, atomic::AtomicBool};

use jiff::Timestamp;
use libskumatch::prelude::*;

use crate::{config::Config, errors::AppError};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let config = Config::from_env()?;
  let _guard = trace::init_tracing(&config, std::io::stderr());

  if let Some(addr) = config.metrics_listen_addr {
    trace::build_prometheus(addr)?;
  }

  if let Err(err) = run(config).await {
    tracing::error!(error = %err, "batch failed");

    return Err(err.into());
  }

  Ok(())
}

async fn run(config: Config) -> Result<(), AppError> {
  let catalog = input::read_catalog(&config.catalog_path)?;
  let rows = input::read_rows(&config.rows_path)?;

  tracing::info!(records = catalog.len(), rows = rows.len(), mode = ?config.params.mode, threshold = config.params.threshold, "starting batch");

  let matcher = Matcher::new(catalog, config.params)?;

  let interrupted = Arc::new(AtomicBool::new(false));
  let deadline = match config.deadline {
    Some(deadline) => Some(Timestamp::now().checked_add(deadline).map_err(|err| AppError::ConfigError(format!("invalid batch deadline: {err}")))?),
    None => None,
  };

  tokio::spawn(batch::watch_signals(interrupted.clone()));

  let guard = batch::guard(interrupted, deadline);

  let outcome = tokio::task::spawn_blocking(move || {
    matcher.run_guarded(rows, &guard, |progress| {
      tracing::info!(processed = progress.processed, matched = progress.matched, last = %progress.digest, "batch progress");
    })
  })
  .await
  .map_err(anyhow::Error::from)?;

  input::write_results(std::io::stdout().lock(), &outcome.results).map_err(anyhow::Error::from)?;

  let matched = outcome.results.iter().filter(|result| result.is_matched()).count();

  tracing::info!(processed = outcome.results.len(), matched, complete = outcome.is_complete(), "batch finished");

  match outcome.aborted {
    Some(err) => Err(err.into()),
    None => Ok(()),
  }
}
