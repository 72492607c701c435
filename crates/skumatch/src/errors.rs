use libskumatch::prelude::*;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
  #[error("invalid configuration: {0}")]
  ConfigError(String),
  #[error("could not read {path}: {reason}")]
  InputError { path: String, reason: String },
  #[error("batch aborted: {0}")]
  Aborted(String),
  #[error(transparent)]
  OtherError(#[from] anyhow::Error),
}

impl From<SkuMatchError> for AppError {
  fn from(value: SkuMatchError) -> Self {
    match value {
      SkuMatchError::ConfigError(err) => AppError::ConfigError(err),
      SkuMatchError::EmptyCatalog | SkuMatchError::NoMatchColumns | SkuMatchError::InvalidParams(_) => AppError::ConfigError(value.to_string()),
      SkuMatchError::Aborted { reason } => AppError::Aborted(reason),
      SkuMatchError::OtherError(err) => AppError::OtherError(err),
    }
  }
}

#[cfg(test)]
mod tests {
  use libskumatch::prelude::*;

  use super::AppError;

  #[test]
  fn from_library_errors() {
    assert!(matches!(AppError::from(SkuMatchError::EmptyCatalog), AppError::ConfigError(_)));
    assert!(matches!(AppError::from(SkuMatchError::NoMatchColumns), AppError::ConfigError(_)));
    assert!(matches!(AppError::from(SkuMatchError::Aborted { reason: "interrupted".into() }), AppError::Aborted(reason) if reason == "interrupted"));
  }
}
