use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

use jiff::Timestamp;
use libskumatch::prelude::*;
use tokio::signal;

/// Abort conditions of a batch: an interruption signal, or a wall-clock
/// deadline.
pub fn guard(interrupted: Arc<AtomicBool>, deadline: Option<Timestamp>) -> impl Fn(usize) -> Result<(), SkuMatchError> + Send + 'static {
  move |processed| {
    if interrupted.load(Ordering::Relaxed) {
      return Err(SkuMatchError::Aborted {
        reason: format!("interrupted after {processed} rows"),
      });
    }

    if let Some(deadline) = deadline
      && Timestamp::now() >= deadline
    {
      return Err(SkuMatchError::Aborted {
        reason: format!("deadline of {deadline} exceeded after {processed} rows"),
      });
    }

    Ok(())
  }
}

/// Raise `interrupted` on ^C or SIGTERM.
pub async fn watch_signals(interrupted: Arc<AtomicBool>) {
  let ctrl_c = async {
    signal::ctrl_c().await.expect("failed to install ^C handler");
  };

  let terminate = async {
    signal::unix::signal(signal::unix::SignalKind::terminate())
      .expect("failed to install terminate signal handler")
      .recv()
      .await;
  };

  tokio::select! {
      () = ctrl_c => tracing::warn!("received ^C, stopping after the current row"),
      () = terminate => tracing::warn!("received terminate signal, stopping after the current row"),
  }

  interrupted.store(true, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  };

  use jiff::{SignedDuration, Timestamp};
  use libskumatch::prelude::*;

  #[test]
  fn interruption() {
    let interrupted = Arc::new(AtomicBool::new(false));
    let guard = super::guard(interrupted.clone(), None);

    assert!(guard(0).is_ok());

    interrupted.store(true, Ordering::Relaxed);

    assert!(matches!(guard(1), Err(SkuMatchError::Aborted { reason }) if reason == "interrupted after 1 rows"));
  }

  #[test]
  fn deadline() {
    let past = Timestamp::now().checked_sub(SignedDuration::from_secs(1)).unwrap();
    let future = Timestamp::now().checked_add(SignedDuration::from_secs(3600)).unwrap();

    assert!(super::guard(Arc::new(AtomicBool::new(false)), Some(future))(0).is_ok());
    assert!(super::guard(Arc::new(AtomicBool::new(false)), Some(past))(0).is_err());
  }
}
