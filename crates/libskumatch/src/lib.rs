mod error;
mod index;
mod matcher;
mod matching;
mod model;
mod normalize;
mod scoring;
mod tables;

/// Build every lookup table, so the first matched row does not pay for it.
pub fn init() {
  let _ = &*crate::tables::brands::BRANDS;
  let _ = &*crate::tables::corrections::CORRECTIONS;
  let _ = &*crate::tables::attributes::ATTRIBUTES;
  let _ = &*crate::tables::versions::VERSIONS;
  let _ = &*crate::tables::wearables::WEARABLES;
  let _ = &*crate::matching::extractors::CURRENT_DECADE;
}

pub mod prelude {
  pub use crate::error::SkuMatchError;
  pub use crate::matcher::{BatchGuard, BatchOutcome, Matcher, Progress};
  pub use crate::matching::{
    IndexParams, MatchParams, Mode, ScoringParams,
    extractors::{
      KeywordKind, extract_attributes, extract_brand, extract_capacity, extract_colors, extract_full_model, extract_processor, extract_product_type, extract_screen_size, extract_short_model,
      extract_year,
    },
    model_code::{model_match_score, should_exclude_candidate},
    version::{extract_version, versions_match},
    watch::{WatchAttributes, WatchField, compare_products, extract_model_code, is_watch_product, normalize_attributes},
  };
  pub use crate::model::{Attr, AttributeSet, Capacity, CatalogRecord, InputRow, MatchResult, MatchStatus, MatchedField, Pairing, ScreenSize};
  pub use crate::normalize::{NormalizedText, normalize};
}
