use std::{
  env::{self, VarError},
  fmt::Display,
  fs,
  net::SocketAddr,
  path::PathBuf,
  str::FromStr,
};

use jiff::SignedDuration;
use libskumatch::prelude::*;

use crate::errors::AppError;

const DEFAULT_COLUMN: &str = "name";

#[derive(Clone, Debug)]
pub struct Config {
  pub env: Env,

  // Inputs
  pub catalog_path: PathBuf,
  pub rows_path: PathBuf,

  // Match settings
  pub params: MatchParams,
  pub deadline: Option<SignedDuration>,

  // Observability
  pub metrics_listen_addr: Option<SocketAddr>,
}

impl Config {
  pub fn from_env() -> Result<Config, AppError> {
    let params = match env::var("MATCH_PARAMS_PATH") {
      Ok(path) if !path.is_empty() => read_params(&path)?,
      _ => MatchParams::default(),
    };

    let columns = match env::var("MATCH_COLUMNS") {
      Ok(columns) if !columns.trim().is_empty() => columns.split(',').map(str::trim).filter(|column| !column.is_empty()).map(ToString::to_string).collect(),
      _ if params.columns.is_empty() => vec![DEFAULT_COLUMN.to_string()],
      _ => params.columns.clone(),
    };

    let params = MatchParams {
      mode: parse_env("MATCH_MODE", params.mode)?,
      threshold: parse_env("MATCH_THRESHOLD", params.threshold)?,
      columns,
      brand_column: env::var("BRAND_COLUMN").ok().filter(|column| !column.is_empty()).or(params.brand_column),
      progress_every: parse_env("PROGRESS_EVERY", params.progress_every)?,
      index: IndexParams {
        top_n: parse_env("MATCH_TOP_N", params.index.top_n)?,
        ..params.index
      },
      scoring: params.scoring,
    };

    let config = Config {
      env: Env::from(env::var("ENV").unwrap_or("dev".into())),
      catalog_path: required_path("CATALOG_PATH")?,
      rows_path: required_path("ROWS_PATH")?,
      params,
      deadline: match parse_env::<u64>("BATCH_DEADLINE_SECONDS", 0)? {
        0 => None,
        seconds => Some(SignedDuration::from_secs(i64::try_from(seconds).map_err(|_| AppError::ConfigError("BATCH_DEADLINE_SECONDS is too large".into()))?)),
      },
      metrics_listen_addr: match env::var("METRICS_LISTEN_ADDR") {
        Ok(addr) if !addr.is_empty() => Some(addr.parse().map_err(|err| AppError::ConfigError(format!("could not read METRICS_LISTEN_ADDR: {err}")))?),
        _ => None,
      },
    };

    Ok(config)
  }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Env {
  Dev,
  Production,
}

impl From<String> for Env {
  fn from(value: String) -> Self {
    match value.as_ref() {
      "dev" => Env::Dev,
      "production" => Env::Production,
      _ => Env::Dev,
    }
  }
}

fn required_path(name: &str) -> Result<PathBuf, AppError> {
  match env::var(name) {
    Ok(path) if !path.is_empty() => Ok(PathBuf::from(path)),
    _ => Err(AppError::ConfigError(format!("{name} is required"))),
  }
}

fn read_params(path: &str) -> Result<MatchParams, AppError> {
  let data = fs::read_to_string(path).map_err(|err| AppError::InputError {
    path: path.to_string(),
    reason: err.to_string(),
  })?;

  serde_json::from_str(&data).map_err(|err| AppError::ConfigError(format!("could not read match parameters from {path}: {err}")))
}

pub fn parse_env<T>(name: &str, default: T) -> anyhow::Result<T>
where
  T: FromStr,
  T::Err: Display,
{
  match env::var(name) {
    Ok(value) if value.is_empty() => Ok(default),
    Ok(value) => Ok(value.parse::<T>().map_err(|err| AppError::ConfigError(format!("could not read {name}: {err}")))?),
    Err(err) => match err {
      VarError::NotPresent => Ok(default),
      _ => Err(AppError::ConfigError(format!("could not read {name}: {err}")).into()),
    },
  }
}

#[cfg(test)]
mod tests {
  use std::{env, io::Write};

  use jiff::SignedDuration;
  use libskumatch::prelude::*;

  use super::{Config, Env};

  const VARIABLES: &[&str] = &[
    "ENV",
    "CATALOG_PATH",
    "ROWS_PATH",
    "MATCH_PARAMS_PATH",
    "MATCH_MODE",
    "MATCH_THRESHOLD",
    "MATCH_COLUMNS",
    "BRAND_COLUMN",
    "PROGRESS_EVERY",
    "MATCH_TOP_N",
    "BATCH_DEADLINE_SECONDS",
    "METRICS_LISTEN_ADDR",
  ];

  fn reset() {
    unsafe {
      for variable in VARIABLES {
        env::remove_var(variable);
      }

      env::set_var("CATALOG_PATH", "catalog.json");
      env::set_var("ROWS_PATH", "rows.jsonl");
    }
  }

  #[test]
  #[serial_test::serial]
  fn defaults() {
    reset();

    let config = Config::from_env().unwrap();

    assert_eq!(config.env, Env::Dev);
    assert_eq!(config.catalog_path.to_str(), Some("catalog.json"));
    assert_eq!(config.params.mode, Mode::Heuristic);
    assert_eq!(config.params.threshold, 0.7);
    assert_eq!(config.params.columns, vec!["name".to_string()]);
    assert_eq!(config.params.index.top_n, 100);
    assert_eq!(config.deadline, None);
    assert_eq!(config.metrics_listen_addr, None);
  }

  #[test]
  #[serial_test::serial]
  fn parse_config_from_env() {
    reset();

    unsafe {
      env::set_var("ENV", "production");
      env::set_var("MATCH_MODE", "normalized-exact");
      env::set_var("MATCH_THRESHOLD", "0.8");
      env::set_var("MATCH_COLUMNS", "brand, model ,,spec");
      env::set_var("BRAND_COLUMN", "brand");
      env::set_var("PROGRESS_EVERY", "50");
      env::set_var("MATCH_TOP_N", "20");
      env::set_var("BATCH_DEADLINE_SECONDS", "30");
      env::set_var("METRICS_LISTEN_ADDR", "127.0.0.1:9000");
    }

    let config = Config::from_env().unwrap();

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.params.mode, Mode::Normalized);
    assert_eq!(config.params.threshold, 0.8);
    assert_eq!(config.params.columns, vec!["brand".to_string(), "model".to_string(), "spec".to_string()]);
    assert_eq!(config.params.brand_column.as_deref(), Some("brand"));
    assert_eq!(config.params.progress_every, 50);
    assert_eq!(config.params.index.top_n, 20);
    assert_eq!(config.deadline, Some(SignedDuration::from_secs(30)));
    assert_eq!(config.metrics_listen_addr.map(|addr| addr.port()), Some(9000));
  }

  #[test]
  #[serial_test::serial]
  fn params_file() {
    reset();

    let mut file = tempfile::NamedTempFile::new().unwrap();

    write!(file, r#"{{ "threshold": 0.5, "columns": ["title"], "scoring": {{ "color_mismatch": 0.2 }} }}"#).unwrap();

    unsafe {
      env::set_var("MATCH_PARAMS_PATH", file.path());
      env::set_var("MATCH_THRESHOLD", "0.6");
    }

    let config = Config::from_env().unwrap();

    assert_eq!(config.params.threshold, 0.6);
    assert_eq!(config.params.columns, vec!["title".to_string()]);
    assert_eq!(config.params.scoring.color_mismatch, 0.2);
    assert_eq!(config.params.scoring.year_mismatch, 0.6);
  }

  #[test]
  #[serial_test::serial]
  fn invalid_config() {
    reset();

    unsafe {
      env::set_var("MATCH_MODE", "fuzzy");
    }

    assert!(matches!(Config::from_env(), Err(_)));

    reset();

    unsafe {
      env::remove_var("CATALOG_PATH");
    }

    assert!(matches!(Config::from_env(), Err(_)));
  }

  #[test]
  #[serial_test::serial]
  fn parse_env() {
    unsafe {
      env::set_var("INT", "42");
      env::set_var("BOOL", "true");
    }

    assert_eq!(super::parse_env::<u32>("INT", 0).unwrap(), 42);
    assert_eq!(super::parse_env::<bool>("BOOL", false).unwrap(), true);
    assert_eq!(super::parse_env::<u32>("MISSING", 7).unwrap(), 7);

    assert!(matches!(super::parse_env::<u32>("BOOL", 0), Err(_)));
  }
}
