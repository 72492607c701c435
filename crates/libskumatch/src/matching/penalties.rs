use libskumatch_macros::penalty;

use crate::{
  matching::{
    Penalty, ScoringParams,
    comparers::is_disjoint,
    model_code::model_match_score,
    version::versions_match,
  },
  model::{AttributeSet, Pairing},
};

/// Every penalty, in the order they are applied.
pub(crate) const PENALTIES: &[&dyn Penalty] = &[
  &ShortModelMismatch,
  &FullModelMismatch,
  &SeriesMismatch,
  &ProcessorMismatch,
  &YearMismatch,
  &VersionMismatch,
  &CapacityMismatch,
  &ColorMismatch,
  &ProductTypeMismatch,
  &ScreenSizeGap,
];

#[penalty(ShortModelMismatch, name = "short_model_mismatch")]
fn penalty(&self, params: &ScoringParams, lhs: &AttributeSet, rhs: &AttributeSet) -> f64 {
  match lhs.short_model.compare(&rhs.short_model) {
    Pairing::Both(lhs, rhs) if lhs != rhs => params.short_model_mismatch,
    _ => 0.0,
  }
}

#[penalty(FullModelMismatch, name = "full_model_disambiguation")]
fn penalty(&self, params: &ScoringParams, lhs: &AttributeSet, rhs: &AttributeSet) -> f64 {
  let Pairing::Both(lhs, rhs) = lhs.full_model.compare(&rhs.full_model) else {
    return 0.0;
  };

  match model_match_score(Some(lhs), Some(rhs)) {
    score if score <= 0.0 => params.model_mismatch,
    score if score < 1.0 => params.model_partial * (1.0 - score),
    _ => 0.0,
  }
}

/// Series of a short model: its letters, without the generation number and
/// the variant letter ("mate60e" is a "mate").
fn series(model: &str) -> &str {
  model.trim_end_matches(|c: char| c.is_ascii_alphabetic()).trim_end_matches(|c: char| c.is_ascii_digit())
}

#[penalty(SeriesMismatch, name = "series_mismatch")]
fn penalty(&self, params: &ScoringParams, lhs: &AttributeSet, rhs: &AttributeSet) -> f64 {
  match lhs.short_model.compare(&rhs.short_model) {
    Pairing::Both(lhs, rhs) if series(lhs) != series(rhs) => params.series_mismatch,
    _ => 0.0,
  }
}

#[penalty(ProcessorMismatch, name = "processor_mismatch")]
fn penalty(&self, params: &ScoringParams, lhs: &AttributeSet, rhs: &AttributeSet) -> f64 {
  match lhs.processor.compare(&rhs.processor) {
    Pairing::Both(lhs, rhs) if lhs != rhs => params.processor_mismatch,
    _ => 0.0,
  }
}

#[penalty(YearMismatch, name = "year_mismatch")]
fn penalty(&self, params: &ScoringParams, lhs: &AttributeSet, rhs: &AttributeSet) -> f64 {
  match lhs.year.compare(&rhs.year) {
    Pairing::Both(lhs, rhs) if lhs != rhs => params.year_mismatch,
    _ => 0.0,
  }
}

#[penalty(VersionMismatch, name = "version_mismatch")]
fn penalty(&self, params: &ScoringParams, lhs: &AttributeSet, rhs: &AttributeSet) -> f64 {
  match lhs.version.compare(&rhs.version) {
    Pairing::Both(lhs, rhs) if !versions_match(Some(lhs), Some(rhs)) => params.version_mismatch,
    Pairing::OneSided => params.version_one_sided,
    _ => 0.0,
  }
}

#[penalty(CapacityMismatch, name = "capacity_mismatch")]
fn penalty(&self, params: &ScoringParams, lhs: &AttributeSet, rhs: &AttributeSet) -> f64 {
  match lhs.capacity.compare(&rhs.capacity) {
    Pairing::Both(lhs, rhs) if !lhs.agrees(rhs) => params.capacity_mismatch,
    Pairing::OneSided => params.capacity_one_sided,
    _ => 0.0,
  }
}

#[penalty(ColorMismatch, name = "color_mismatch")]
fn penalty(&self, params: &ScoringParams, lhs: &AttributeSet, rhs: &AttributeSet) -> f64 {
  match lhs.colors.compare(&rhs.colors) {
    Pairing::Both(lhs, rhs) if is_disjoint(lhs, rhs) => params.color_mismatch,
    _ => 0.0,
  }
}

#[penalty(ProductTypeMismatch, name = "product_type_mismatch")]
fn penalty(&self, params: &ScoringParams, lhs: &AttributeSet, rhs: &AttributeSet) -> f64 {
  match lhs.product_type.compare(&rhs.product_type) {
    Pairing::Both(lhs, rhs) if lhs != rhs => params.product_type_mismatch,
    _ => 0.0,
  }
}

#[penalty(ScreenSizeGap, name = "screen_size_gap")]
fn penalty(&self, params: &ScoringParams, lhs: &AttributeSet, rhs: &AttributeSet) -> f64 {
  let Pairing::Both(lhs, rhs) = lhs.screen_size.compare(&rhs.screen_size) else {
    return 0.0;
  };

  match lhs.gap(rhs) {
    Some(gap) if gap < params.screen_size_tolerance => 0.0,
    Some(gap) if gap < 1.0 => params.screen_size_minor,
    Some(_) => params.screen_size_major,
    None => 0.0,
  }
}

#[cfg(test)]
mod tests {
  use float_cmp::approx_eq;

  use super::*;
  use crate::{
    matching::extractors::{CURRENT_DECADE, extract_attributes},
    model::{Attr, Capacity, ScreenSize},
    normalize::normalize,
  };

  fn attributes(text: &str) -> AttributeSet {
    extract_attributes(&normalize(text))
  }

  #[test]
  fn absent_attributes_never_penalize() {
    let params = ScoringParams::default();
    let lhs = AttributeSet::default();
    let rhs = attributes("vivo X200 Pro 2024 骁龙8 黑色 手机 6.7英寸");

    for penalty in [&ShortModelMismatch as &dyn Penalty, &FullModelMismatch, &SeriesMismatch, &ProcessorMismatch, &YearMismatch, &ColorMismatch, &ProductTypeMismatch, &ScreenSizeGap] {
      assert_eq!(penalty.penalty(&params, &lhs, &rhs), 0.0, "{}", penalty.name());
      assert_eq!(penalty.penalty(&params, &rhs, &lhs), 0.0, "{}", penalty.name());
    }
  }

  #[test]
  fn short_model_mismatch() {
    let params = ScoringParams::default();

    assert_eq!(ShortModelMismatch.penalty(&params, &attributes("vivo X200 Pro"), &attributes("vivo X100 Pro")), 0.7);
    assert_eq!(ShortModelMismatch.penalty(&params, &attributes("vivo X200 Pro"), &attributes("vivo X200")), 0.0);
  }

  #[test]
  fn full_model_disambiguation() {
    let params = ScoringParams::default();

    assert_eq!(FullModelMismatch.penalty(&params, &attributes("vivo X200 Pro"), &attributes("vivo X200 Pro mini")), 0.8);
    assert!(approx_eq!(f64, FullModelMismatch.penalty(&params, &attributes("vivo X200 Pro"), &attributes("vivo X200 Ultra")), 0.49, epsilon = 0.0001));
    assert_eq!(FullModelMismatch.penalty(&params, &attributes("vivo X200 Pro"), &attributes("vivo x200pro")), 0.0);
  }

  #[test]
  fn series_mismatch() {
    let params = ScoringParams::default();

    assert_eq!(SeriesMismatch.penalty(&params, &attributes("vivo X200"), &attributes("vivo S20")), 0.8);
    assert_eq!(SeriesMismatch.penalty(&params, &attributes("vivo X200"), &attributes("vivo X100")), 0.0);
    assert_eq!(SeriesMismatch.penalty(&params, &attributes("HUAWEI Mate 60"), &attributes("HUAWEI Mate 60E")), 0.0);
  }

  #[test]
  fn version_mismatch() {
    let params = ScoringParams::default();

    assert_eq!(VersionMismatch.penalty(&params, &attributes("vivo X200 Pro 活力版"), &attributes("vivo X200 Pro 标准版")), 0.8);
    assert_eq!(VersionMismatch.penalty(&params, &attributes("vivo X200 Pro 活力版"), &attributes("vivo X200 Pro")), 0.5);
    assert_eq!(VersionMismatch.penalty(&params, &attributes("iPad WLAN版"), &attributes("iPad WiFi版")), 0.0);
  }

  #[test]
  fn capacity_mismatch() {
    let params = ScoringParams::default();
    let lhs = AttributeSet { capacity: Attr::Present(Capacity { memory: Some(12), storage: 256 }), ..Default::default() };

    assert_eq!(CapacityMismatch.penalty(&params, &lhs, &attributes("vivo X200 12+512")), 0.6);
    assert_eq!(CapacityMismatch.penalty(&params, &lhs, &attributes("vivo X200 256GB")), 0.0);
    assert_eq!(CapacityMismatch.penalty(&params, &lhs, &attributes("vivo X200")), 0.4);
  }

  #[test]
  fn color_and_type_mismatch() {
    let params = ScoringParams::default();

    assert_eq!(ColorMismatch.penalty(&params, &attributes("iPhone 15 黑色"), &attributes("iPhone 15 白色")), 0.5);
    assert_eq!(ColorMismatch.penalty(&params, &attributes("iPhone 15 黑色/白色"), &attributes("iPhone 15 白色")), 0.0);
    assert_eq!(ProductTypeMismatch.penalty(&params, &attributes("iPhone 15 手机壳"), &attributes("iPhone 15 手机")), 0.5);
  }

  #[test]
  fn processor_and_year_mismatch() {
    let params = ScoringParams::default();
    let year = *CURRENT_DECADE + 2;
    let other = year + 1;

    assert_eq!(ProcessorMismatch.penalty(&params, &attributes("ThinkPad i5"), &attributes("ThinkPad i7")), 0.7);
    assert_eq!(YearMismatch.penalty(&params, &attributes(&format!("MateBook {year}")), &attributes(&format!("MateBook {other}"))), 0.6);
  }

  #[test]
  fn screen_size_gap() {
    let params = ScoringParams::default();
    let size = |size| AttributeSet { screen_size: Attr::Present(size), ..Default::default() };

    assert_eq!(ScreenSizeGap.penalty(&params, &size(ScreenSize::Inches(14.0)), &size(ScreenSize::Inches(14.2))), 0.0);
    assert_eq!(ScreenSizeGap.penalty(&params, &size(ScreenSize::Inches(14.0)), &size(ScreenSize::Inches(13.3))), 0.3);
    assert_eq!(ScreenSizeGap.penalty(&params, &size(ScreenSize::Inches(14.0)), &size(ScreenSize::Inches(16.0))), 0.7);
    assert_eq!(ScreenSizeGap.penalty(&params, &size(ScreenSize::Inches(14.0)), &size(ScreenSize::Millimeters(46.0))), 0.0);
  }
}
