#[derive(Debug, thiserror::Error)]
pub enum SkuMatchError {
  #[error("invalid configuration: {0}")]
  ConfigError(String),
  #[error("the catalog does not contain any record")]
  EmptyCatalog,
  #[error("at least one match column must be given")]
  NoMatchColumns,
  #[error(transparent)]
  InvalidParams(#[from] validator::ValidationErrors),
  #[error("batch aborted: {reason}")]
  Aborted { reason: String },
  #[error(transparent)]
  OtherError(#[from] anyhow::Error),
}
