use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;
use validator::Validate;

use crate::{error::SkuMatchError, model::AttributeSet};

pub(crate) mod comparers;
pub(crate) mod extractors;
pub(crate) mod model_code;
pub(crate) mod penalties;
pub(crate) mod version;
pub(crate) mod watch;

/// Strategy used to pair a row with a catalog record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
  /// Literal equality of the trimmed texts.
  Exact,
  /// Equality once both sides went through the normalizer.
  Normalized,
  /// Indexed retrieval followed by composite scoring.
  #[default]
  Heuristic,
}

impl FromStr for Mode {
  type Err = SkuMatchError;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value.trim().to_ascii_lowercase().as_str() {
      "exact" => Ok(Mode::Exact),
      "normalized" | "normalized-exact" => Ok(Mode::Normalized),
      "heuristic" => Ok(Mode::Heuristic),
      other => Err(SkuMatchError::ConfigError(format!("unknown match mode: {other}"))),
    }
  }
}

/// A veto signal, taking away from the base score of a candidate.
///
/// Implementations return the magnitude of the penalty, zero when it does not
/// apply.
pub(crate) trait Penalty: Send + Sync {
  fn name(&self) -> &'static str;
  fn penalty(&self, params: &ScoringParams, lhs: &AttributeSet, rhs: &AttributeSet) -> f64;
}

pub(crate) fn run_penalties(params: &ScoringParams, lhs: &AttributeSet, rhs: &AttributeSet, init: f64, penalties: &[&dyn Penalty], results: &mut Vec<(&'static str, f64)>) -> f64 {
  penalties.iter().fold(init, move |score, func| {
    // Scores are floored at zero, nothing can bring a candidate back from there.
    if score <= 0.0 {
      return score;
    }

    let penalty = func.penalty(params, lhs, rhs);

    if penalty > 0.0 {
      results.push((func.name(), penalty));

      tracing::debug!(penalty = func.name(), value = penalty, "applied penalty");
    }

    score - penalty
  })
}

pub(crate) const DEFAULT_THRESHOLD: f64 = 0.7;
pub(crate) const DEFAULT_TOP_N: usize = 100;

#[serde_inline_default]
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct MatchParams {
  #[serde(default)]
  pub mode: Mode,
  #[serde_inline_default(DEFAULT_THRESHOLD)]
  #[validate(range(min = 0.0, max = 1.0, message = "threshold must be between 0 and 1"))]
  pub threshold: f64,
  /// Columns whose values are joined, in order, into the row text.
  #[serde(default)]
  pub columns: Vec<String>,
  /// Column holding the brand of the row, restricting candidates to that brand.
  #[serde(default)]
  pub brand_column: Option<String>,
  #[serde_inline_default(1)]
  #[validate(range(min = 1, message = "progress must be reported at least every row"))]
  pub progress_every: usize,
  #[serde(default)]
  #[validate(nested)]
  pub index: IndexParams,
  #[serde(default)]
  #[validate(nested)]
  pub scoring: ScoringParams,
}

impl Default for MatchParams {
  fn default() -> Self {
    MatchParams {
      mode: Mode::default(),
      threshold: DEFAULT_THRESHOLD,
      columns: Vec::new(),
      brand_column: None,
      progress_every: 1,
      index: IndexParams::default(),
      scoring: ScoringParams::default(),
    }
  }
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct IndexParams {
  /// Number of ranked candidates handed to the scorer.
  #[validate(range(min = 1))]
  pub top_n: usize,
  pub brand_vote: u32,
  pub series_vote: u32,
  pub spec_vote: u32,
}

impl Default for IndexParams {
  fn default() -> Self {
    IndexParams {
      top_n: DEFAULT_TOP_N,
      brand_vote: 3,
      series_vote: 3,
      spec_vote: 1,
    }
  }
}

/// Weights of the base score, penalty magnitudes and early exit thresholds.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct ScoringParams {
  #[validate(range(min = 0.0, max = 1.0))]
  pub string_weight: f64,
  #[validate(range(min = 0.0, max = 1.0))]
  pub keyword_weight: f64,
  pub short_model_mismatch: f64,
  /// Multiplied by the distance to a perfect full model score.
  pub model_partial: f64,
  pub model_mismatch: f64,
  pub series_mismatch: f64,
  pub processor_mismatch: f64,
  pub year_mismatch: f64,
  pub version_mismatch: f64,
  pub version_one_sided: f64,
  pub capacity_mismatch: f64,
  pub capacity_one_sided: f64,
  pub color_mismatch: f64,
  pub product_type_mismatch: f64,
  /// Screen sizes at least this far apart are penalized.
  pub screen_size_tolerance: f64,
  pub screen_size_minor: f64,
  pub screen_size_major: f64,
  #[validate(range(min = 0.0, max = 1.0))]
  pub watch_match_score: f64,
  #[validate(range(min = 0.0, max = 1.0))]
  pub early_exit_score: f64,
  pub early_exit_remaining: usize,
}

impl Default for ScoringParams {
  fn default() -> Self {
    ScoringParams {
      string_weight: 0.6,
      keyword_weight: 0.4,
      short_model_mismatch: 0.7,
      model_partial: 0.7,
      model_mismatch: 0.8,
      series_mismatch: 0.8,
      processor_mismatch: 0.7,
      year_mismatch: 0.6,
      version_mismatch: 0.8,
      version_one_sided: 0.5,
      capacity_mismatch: 0.6,
      capacity_one_sided: 0.4,
      color_mismatch: 0.5,
      product_type_mismatch: 0.5,
      screen_size_tolerance: 0.5,
      screen_size_minor: 0.3,
      screen_size_major: 0.7,
      watch_match_score: 0.95,
      early_exit_score: 0.98,
      early_exit_remaining: 10,
    }
  }
}
