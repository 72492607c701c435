use ahash::{HashMap, HashMapExt, HashSet};
use compact_str::CompactString;
use itertools::Itertools;
use tracing::instrument;

use crate::{
  error::SkuMatchError,
  matching::{
    IndexParams,
    extractors::{KeywordKind, Prepared, extract_keywords},
  },
  model::{AttributeSet, CatalogRecord, MatchedField},
  normalize::normalize,
  tables::brands::BRANDS,
};

/// A catalog record along with its matchable fields, prepared once.
#[derive(Debug)]
pub(crate) struct IndexedRecord {
  pub(crate) record: CatalogRecord,
  pub(crate) fields: Vec<(MatchedField, Prepared)>,
}

/// Inverted index over a catalog snapshot.
///
/// Immutable once built, so it can be shared between concurrent batches.
#[derive(Debug)]
pub(crate) struct CandidateIndex {
  params: IndexParams,
  records: Vec<IndexedRecord>,
  postings: HashMap<CompactString, Vec<usize>>,
  brands: HashMap<&'static str, Vec<usize>>,
  literal: HashMap<String, (usize, MatchedField)>,
  normalized: HashMap<String, (usize, MatchedField)>,
}

impl CandidateIndex {
  #[instrument(name = "build_index", skip_all, fields(records = records.len()))]
  pub(crate) fn build(records: Vec<CatalogRecord>, params: &IndexParams) -> Result<CandidateIndex, SkuMatchError> {
    if records.is_empty() {
      return Err(SkuMatchError::EmptyCatalog);
    }

    let mut index = CandidateIndex {
      params: params.clone(),
      records: Vec::with_capacity(records.len()),
      postings: HashMap::new(),
      brands: HashMap::new(),
      literal: HashMap::new(),
      normalized: HashMap::new(),
    };

    for (id, record) in records.into_iter().enumerate() {
      let spec = record.spec.as_deref();
      let mut fields = vec![(MatchedField::Name, Prepared::with_spec(&record.name, spec))];

      if let Some(secondary) = record.secondary_name.as_deref().filter(|name| !name.trim().is_empty()) {
        fields.push((MatchedField::SecondaryName, Prepared::with_spec(secondary, spec)));
      }

      let mut keywords = fields.iter().flat_map(|(_, field)| field.keywords.keys().cloned()).collect::<HashSet<_>>();

      if let Some(spec) = spec {
        keywords.extend(extract_keywords(&normalize(spec), &AttributeSet::default()).into_keys());
      }

      for keyword in keywords {
        index.postings.entry(keyword).or_default().push(id);
      }

      let brand = record
        .brand
        .as_deref()
        .and_then(|brand| BRANDS.resolve(brand))
        .map(|brand| brand.id.as_str())
        .or_else(|| fields[0].1.attributes.brand.get().copied());

      if let Some(brand) = brand {
        index.brands.entry(brand).or_default().push(id);
      }

      for (field, prepared) in &fields {
        let raw = match field {
          MatchedField::Name => record.name.trim(),
          MatchedField::SecondaryName => record.secondary_name.as_deref().unwrap_or_default().trim(),
        };

        if !raw.is_empty() {
          index.literal.entry(raw.to_string()).or_insert((id, *field));
        }
        if !prepared.text.is_empty() {
          index.normalized.entry(prepared.text.lower().to_string()).or_insert((id, *field));
        }
      }

      index.records.push(IndexedRecord { record, fields });
    }

    tracing::info!(records = index.records.len(), keywords = index.postings.len(), brands = index.brands.len(), "built candidate index");

    Ok(index)
  }

  pub(crate) fn len(&self) -> usize {
    self.records.len()
  }

  pub(crate) fn record(&self, id: usize) -> &IndexedRecord {
    &self.records[id]
  }

  /// Record whose name or secondary name is literally `text`, once trimmed.
  pub(crate) fn lookup_literal(&self, text: &str) -> Option<(usize, MatchedField)> {
    self.literal.get(text.trim()).copied()
  }

  /// Record whose normalized name or secondary name is `lower`.
  pub(crate) fn lookup_normalized(&self, lower: &str) -> Option<(usize, MatchedField)> {
    self.normalized.get(lower).copied()
  }

  /// Ranked candidate record identifiers for a row.
  ///
  /// When `brand` resolves to a known brand, only records of that brand are
  /// candidates, those sharing keywords with the row first. Otherwise every
  /// record sharing at least one keyword with the row is voted for, brand and
  /// series keywords weighing more than the others.
  pub(crate) fn query(&self, row: &Prepared, brand: Option<&str>) -> Vec<usize> {
    let votes = self.votes(row);

    let ranked = match brand.and_then(|brand| BRANDS.resolve(brand)) {
      Some(brand) => {
        let Some(records) = self.brands.get(brand.id.as_str()) else {
          return Vec::new();
        };

        records
          .iter()
          .map(|id| (*id, votes.get(id).copied().unwrap_or_default()))
          .sorted_by(|(lhs_id, lhs), (rhs_id, rhs)| rhs.cmp(lhs).then(lhs_id.cmp(rhs_id)))
          .collect::<Vec<_>>()
      }

      None => votes.into_iter().sorted_by(|(lhs_id, lhs), (rhs_id, rhs)| rhs.cmp(lhs).then(lhs_id.cmp(rhs_id))).collect(),
    };

    tracing::debug!(candidates = ranked.len(), top_n = self.params.top_n, "ranked candidates");

    ranked.into_iter().take(self.params.top_n).map(|(id, _)| id).collect()
  }

  fn votes(&self, row: &Prepared) -> HashMap<usize, u32> {
    let mut votes = HashMap::<usize, u32>::new();

    for (keyword, kind) in &row.keywords {
      let Some(records) = self.postings.get(keyword) else {
        continue;
      };

      let weight = match kind {
        KeywordKind::Brand => self.params.brand_vote,
        KeywordKind::Series => self.params.series_vote,
        KeywordKind::Spec => self.params.spec_vote,
      };

      for id in records {
        *votes.entry(*id).or_default() += weight;
      }
    }

    votes
  }
}
