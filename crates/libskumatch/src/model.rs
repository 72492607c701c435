use bon::bon;
use serde::{Deserialize, Serialize};

use crate::matching::watch::WatchAttributes;

/// One input row, as a mapping from column name to scalar cell value.
pub type InputRow = serde_json::Map<String, serde_json::Value>;

/// A signal extracted from a product description, which may be missing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Attr<T> {
  Present(T),
  #[default]
  Absent,
}

/// How an attribute is carried by the two sides of a comparison.
#[derive(Debug, PartialEq)]
pub enum Pairing<'a, T> {
  BothAbsent,
  OneSided,
  Both(&'a T, &'a T),
}

impl<T> Attr<T> {
  pub fn is_present(&self) -> bool {
    matches!(self, Attr::Present(_))
  }

  pub fn get(&self) -> Option<&T> {
    match self {
      Attr::Present(value) => Some(value),
      Attr::Absent => None,
    }
  }

  pub fn compare<'a>(&'a self, other: &'a Attr<T>) -> Pairing<'a, T> {
    match (self, other) {
      (Attr::Present(lhs), Attr::Present(rhs)) => Pairing::Both(lhs, rhs),
      (Attr::Absent, Attr::Absent) => Pairing::BothAbsent,
      _ => Pairing::OneSided,
    }
  }
}

impl<T> From<Option<T>> for Attr<T> {
  fn from(value: Option<T>) -> Self {
    match value {
      Some(value) => Attr::Present(value),
      None => Attr::Absent,
    }
  }
}

/// Memory and storage, in gigabytes.
///
/// Memory is only known when the description spells a `N+M` combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capacity {
  pub memory: Option<u32>,
  pub storage: u32,
}

impl Capacity {
  pub fn agrees(&self, other: &Capacity) -> bool {
    if self.storage != other.storage {
      return false;
    }

    match (self.memory, other.memory) {
      (Some(lhs), Some(rhs)) => lhs == rhs,
      _ => true,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScreenSize {
  Inches(f64),
  Millimeters(f64),
}

impl ScreenSize {
  /// Distance between two sizes, only defined when they share a unit.
  pub fn gap(&self, other: &ScreenSize) -> Option<f64> {
    match (self, other) {
      (ScreenSize::Inches(lhs), ScreenSize::Inches(rhs)) | (ScreenSize::Millimeters(lhs), ScreenSize::Millimeters(rhs)) => Some((lhs - rhs).abs()),
      _ => None,
    }
  }
}

/// Structured signals extracted from one normalized description.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeSet {
  pub brand: Attr<&'static str>,
  pub product_type: Attr<&'static str>,
  pub short_model: Attr<String>,
  pub full_model: Attr<String>,
  pub capacity: Attr<Capacity>,
  pub colors: Attr<Vec<&'static str>>,
  pub screen_size: Attr<ScreenSize>,
  pub processor: Attr<&'static str>,
  pub year: Attr<i16>,
  pub version: Attr<String>,
  pub watch: Option<WatchAttributes>,
}

/// One canonical catalog entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogRecord {
  #[serde(default)]
  pub id: String,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub secondary_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub spec: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub brand: Option<String>,
}

#[bon]
impl CatalogRecord {
  #[builder]
  pub fn builder(#[builder(start_fn)] id: &str, #[builder(start_fn)] name: &str, secondary_name: Option<&str>, spec: Option<&str>, brand: Option<&str>) -> CatalogRecord {
    CatalogRecord {
      id: id.to_string(),
      name: name.to_string(),
      secondary_name: secondary_name.map(ToOwned::to_owned),
      spec: spec.map(ToOwned::to_owned),
      brand: brand.map(ToOwned::to_owned),
    }
  }
}

/// Catalog field a row was matched against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedField {
  Name,
  SecondaryName,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
  Matched,
  Unmatched,
}

/// Verdict for one input row.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MatchResult {
  pub row_index: usize,
  pub status: MatchStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub matched_record: Option<CatalogRecord>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub matched_field: Option<MatchedField>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub similarity: Option<f64>,
}

impl MatchResult {
  pub(crate) fn unmatched(row_index: usize) -> MatchResult {
    MatchResult {
      row_index,
      status: MatchStatus::Unmatched,
      matched_record: None,
      matched_field: None,
      similarity: None,
    }
  }

  pub(crate) fn matched(row_index: usize, record: &CatalogRecord, field: MatchedField, similarity: f64) -> MatchResult {
    MatchResult {
      row_index,
      status: MatchStatus::Matched,
      matched_record: Some(record.clone()),
      matched_field: Some(field),
      similarity: Some(similarity),
    }
  }

  pub fn is_matched(&self) -> bool {
    self.status == MatchStatus::Matched
  }
}

/// Space-joined text of the given columns of a row, in column order.
///
/// Missing and null cells are skipped, numbers and booleans are rendered.
pub(crate) fn row_text<S: AsRef<str>>(row: &InputRow, columns: &[S]) -> String {
  let mut text = String::new();

  for column in columns {
    let value = match row.get(column.as_ref()) {
      Some(serde_json::Value::String(value)) => value.trim().to_string(),
      Some(serde_json::Value::Number(value)) => value.to_string(),
      Some(serde_json::Value::Bool(value)) => value.to_string(),
      _ => continue,
    };

    if value.is_empty() {
      continue;
    }

    if !text.is_empty() {
      text.push(' ');
    }

    text.push_str(&value);
  }

  text
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use serde_json_assert::assert_json_eq;

  use super::{Attr, Capacity, CatalogRecord, InputRow, MatchResult, MatchedField, Pairing, ScreenSize};

  #[test]
  fn attribute_pairing() {
    let present = Attr::Present(2024);
    let absent = Attr::<i32>::Absent;

    assert_eq!(present.compare(&Attr::Present(2023)), Pairing::Both(&2024, &2023));
    assert_eq!(present.compare(&absent), Pairing::OneSided);
    assert_eq!(absent.compare(&present), Pairing::OneSided);
    assert_eq!(absent.compare(&Attr::Absent), Pairing::BothAbsent);
    assert_eq!(Attr::from(Some(1)), Attr::Present(1));
    assert_eq!(Attr::<i32>::from(None), Attr::Absent);
  }

  #[test]
  fn capacity_agreement() {
    let full = Capacity { memory: Some(12), storage: 256 };

    assert!(full.agrees(&Capacity { memory: None, storage: 256 }));
    assert!(!full.agrees(&Capacity { memory: Some(8), storage: 256 }));
    assert!(!full.agrees(&Capacity { memory: Some(12), storage: 512 }));
  }

  #[test]
  fn screen_size_gap() {
    assert_eq!(ScreenSize::Inches(14.0).gap(&ScreenSize::Inches(13.6)).map(|gap| (gap * 10.0).round()), Some(4.0));
    assert_eq!(ScreenSize::Inches(14.0).gap(&ScreenSize::Millimeters(46.0)), None);
  }

  #[test]
  fn row_text() {
    let row = json!({ "name": " vivo X200 ", "ram": 12, "5g": true, "note": null, "color": "" });
    let row: InputRow = row.as_object().unwrap().clone();

    assert_eq!(super::row_text(&row, &["name", "note", "ram", "missing", "color", "5g"]), "vivo X200 12 true");
    assert_eq!(super::row_text(&row, &["missing"]), "");
  }

  #[test]
  fn serialize_result() {
    let record = CatalogRecord::builder("sku-1", "vivo X200 Pro").spec("16+512").build();
    let result = MatchResult::matched(3, &record, MatchedField::Name, 0.91);

    assert_json_eq!(
      serde_json::to_value(&result).unwrap(),
      json!({
        "row_index": 3,
        "status": "matched",
        "matched_record": { "id": "sku-1", "name": "vivo X200 Pro", "spec": "16+512" },
        "matched_field": "name",
        "similarity": 0.91
      })
    );

    assert_json_eq!(serde_json::to_value(MatchResult::unmatched(4)).unwrap(), json!({ "row_index": 4, "status": "unmatched" }));
  }
}
