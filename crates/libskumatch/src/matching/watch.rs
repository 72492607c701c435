use std::{fmt, sync::LazyLock};

use itertools::Itertools;
use regex::Regex;

use crate::{
  matching::extractors::{extract_colors, extract_millimeters},
  normalize::NormalizedText,
  tables::wearables::WEARABLES,
};

static BRACKETED_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\[(]\s?([a-z]{2}\d{4}[a-z]?)\s?[\])]").expect("could not build model code pattern"));
static BARE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|[^a-z0-9])([a-z]{2}\d{4}[a-z]?)(?:$|[^a-z0-9])").expect("could not build model code pattern"));

/// Share of the compared attributes two watches without a common model code
/// must agree on.
const MIN_AGREEMENT: f64 = 0.8;

/// Sizes closer than this, in millimeters, are the same case size.
const SIZE_TOLERANCE: f64 = 0.5;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WatchAttributes {
  pub model_code: Option<String>,
  pub connectivity: Option<&'static str>,
  pub color: Option<&'static str>,
  pub strap_material: Option<&'static str>,
  pub size: Option<f64>,
}

/// Watch attributes, in the order they are rendered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WatchField {
  ModelCode,
  Connectivity,
  Color,
  StrapMaterial,
  Size,
}

pub fn is_watch_product(text: &NormalizedText) -> bool {
  WEARABLES.keywords.contains(text.lower())
}

/// Wearable model code, such as `WA2456C`, preferably found between brackets.
pub fn extract_model_code(text: &NormalizedText) -> Option<String> {
  BRACKETED_CODE
    .captures(text.lower())
    .or_else(|| BARE_CODE.captures(text.lower()))
    .map(|caps| caps[1].to_ascii_uppercase())
}

pub fn extract_attributes(text: &NormalizedText) -> WatchAttributes {
  WatchAttributes {
    model_code: extract_model_code(text),
    connectivity: WEARABLES.connectivity.find(text.lower()).map(|(_, id)| id.as_str()),
    color: extract_colors(text).and_then(|colors| colors.first().copied()),
    strap_material: WEARABLES.straps.find(text.lower()).map(|(_, id)| id.as_str()),
    size: extract_millimeters(text),
  }
}

impl WatchAttributes {
  pub fn fields(&self) -> Vec<(WatchField, String)> {
    let mut fields = Vec::with_capacity(5);

    if let Some(size) = self.size {
      fields.push((WatchField::Size, format!("{size}mm")));
    }
    if let Some(strap) = self.strap_material {
      fields.push((WatchField::StrapMaterial, strap.to_string()));
    }
    if let Some(color) = self.color {
      fields.push((WatchField::Color, color.to_string()));
    }
    if let Some(connectivity) = self.connectivity {
      fields.push((WatchField::Connectivity, connectivity.to_string()));
    }
    if let Some(code) = &self.model_code {
      fields.push((WatchField::ModelCode, code.clone()));
    }

    fields
  }
}

impl fmt::Display for WatchAttributes {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let rendered = normalize_attributes(self.fields()).into_iter().map(|(_, value)| value).join(" ");

    f.write_str(&rendered)
  }
}

/// Order watch fields as model code, connectivity, color, strap material and
/// size, whatever order they were given in. Only the first value given for a
/// field is kept, absent fields are not padded.
pub fn normalize_attributes<I>(fields: I) -> Vec<(WatchField, String)>
where
  I: IntoIterator<Item = (WatchField, String)>,
{
  fields.into_iter().unique_by(|(field, _)| *field).sorted_by_key(|(field, _)| *field).collect()
}

/// Whether two watches are the same product.
///
/// Model codes decide alone when both sides carry one. Otherwise at least 80%
/// of the attributes present on either side must agree, an attribute present
/// on one side only counting as a disagreement.
pub fn compare_products(lhs: &WatchAttributes, rhs: &WatchAttributes) -> bool {
  if let (Some(lhs), Some(rhs)) = (&lhs.model_code, &rhs.model_code) {
    return lhs == rhs;
  }

  let comparisons = [
    agree(lhs.connectivity, rhs.connectivity, |lhs, rhs| lhs == rhs),
    agree(lhs.color, rhs.color, |lhs, rhs| lhs == rhs),
    agree(lhs.strap_material, rhs.strap_material, |lhs, rhs| lhs == rhs),
    agree(lhs.size, rhs.size, |lhs, rhs| (lhs - rhs).abs() < SIZE_TOLERANCE),
  ];

  let compared = comparisons.iter().flatten().count();

  if compared == 0 {
    return false;
  }

  let agreed = comparisons.iter().flatten().filter(|agreed| **agreed).count();

  agreed as f64 / compared as f64 >= MIN_AGREEMENT
}

fn agree<T, F>(lhs: Option<T>, rhs: Option<T>, eq: F) -> Option<bool>
where
  F: Fn(T, T) -> bool,
{
  match (lhs, rhs) {
    (None, None) => None,
    (Some(lhs), Some(rhs)) => Some(eq(lhs, rhs)),
    _ => Some(false),
  }
}
