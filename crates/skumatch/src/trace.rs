use std::{io::Write, net::SocketAddr};

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Env};

/// Expose the batch metrics on an HTTP listener, for the duration of the run.
pub fn build_prometheus(addr: SocketAddr) -> Result<(), BuildError> {
  PrometheusBuilder::new()
    .with_http_listener(addr)
    .add_global_label("service", "skumatch")
    .set_buckets_for_metric(Matcher::Full("skumatch_scoring_scores".into()), &[0.2, 0.5, 0.7, 0.9])?
    .set_buckets_for_metric(Matcher::Full("skumatch_row_latency_seconds".into()), &[0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05])?
    .install()
}

pub fn init_tracing(config: &Config, writer: impl Write + Send + 'static) -> WorkerGuard {
  let (appender, guard) = tracing_appender::non_blocking(writer);

  let logging_formatter = match config.env {
    Env::Dev => fmt::layer().compact().with_writer(appender).with_ansi(true).boxed(),
    Env::Production => json_subscriber::layer()
      .with_writer(appender)
      .flatten_event(true)
      .flatten_span_list_on_top_level(true)
      .with_current_span(false)
      .with_span_list(false)
      .boxed(),
  };

  let filter = EnvFilter::builder().try_from_env().or_else(|_| EnvFilter::try_new("info")).unwrap_or_default();

  tracing_subscriber::registry().with(filter.and_then(logging_formatter)).init();

  guard
}
