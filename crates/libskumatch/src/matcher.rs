use std::{borrow::Borrow, time::Instant};

use metrics::{counter, histogram};
use serde::Serialize;
use tracing::instrument;
use validator::Validate;

use crate::{
  error::SkuMatchError,
  index::CandidateIndex,
  matching::{MatchParams, Mode, extractors::Prepared},
  model::{CatalogRecord, InputRow, MatchResult, row_text},
  normalize::normalize,
  scoring::select_best,
};

/// Length, in characters, of the row digest carried by progress reports.
const DIGEST_LENGTH: usize = 40;

/// Progress of a batch, reported every `progress_every` rows and once the
/// batch is over.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Progress {
  pub processed: usize,
  pub matched: usize,
  /// Truncated text of the last processed row.
  pub digest: String,
}

/// Consulted before every row of a guarded batch.
///
/// Returning an error stops the batch, the error being handed back with the
/// results produced so far.
pub trait BatchGuard {
  fn check(&self, processed: usize) -> Result<(), SkuMatchError>;
}

impl<F> BatchGuard for F
where
  F: Fn(usize) -> Result<(), SkuMatchError>,
{
  fn check(&self, processed: usize) -> Result<(), SkuMatchError> {
    self(processed)
  }
}

#[derive(Debug)]
pub struct BatchOutcome {
  /// One result per processed row, in input order.
  pub results: Vec<MatchResult>,
  /// Why the batch stopped before its last row, if it did.
  pub aborted: Option<SkuMatchError>,
}

impl BatchOutcome {
  pub fn is_complete(&self) -> bool {
    self.aborted.is_none()
  }
}

/// Matches input rows against one catalog snapshot.
///
/// The catalog is indexed once, when the matcher is built. A matcher is
/// immutable afterwards and can be shared between threads.
///
/// # Examples
///
/// ```rust
/// # use libskumatch::prelude::*;
/// let catalog = vec![CatalogRecord::builder("1", "vivo X200 Pro 活力版").build()];
/// let params = MatchParams { columns: vec!["name".to_string()], ..Default::default() };
///
/// let matcher = Matcher::new(catalog, params).unwrap();
/// let row = serde_json::json!({ "name": "VIVO X200 Pro 活力版" });
///
/// let result = matcher.match_row(0, row.as_object().unwrap());
///
/// assert_eq!(result.status, MatchStatus::Matched);
/// ```
#[derive(Debug)]
pub struct Matcher {
  params: MatchParams,
  index: CandidateIndex,
}

impl Matcher {
  pub fn new(catalog: Vec<CatalogRecord>, params: MatchParams) -> Result<Matcher, SkuMatchError> {
    if params.columns.iter().all(|column| column.trim().is_empty()) {
      return Err(SkuMatchError::NoMatchColumns);
    }

    params.validate()?;

    crate::init();

    let index = CandidateIndex::build(catalog, &params.index)?;

    Ok(Matcher { params, index })
  }

  pub fn params(&self) -> &MatchParams {
    &self.params
  }

  /// Number of records in the indexed catalog.
  pub fn catalog_len(&self) -> usize {
    self.index.len()
  }

  pub fn match_row(&self, row_index: usize, row: &InputRow) -> MatchResult {
    let text = row_text(row, &self.params.columns);

    self.match_text(row_index, row, &text)
  }

  #[instrument(name = "match_row", skip_all, fields(row = row_index, mode = ?self.params.mode))]
  fn match_text(&self, row_index: usize, row: &InputRow, text: &str) -> MatchResult {
    let then = Instant::now();

    let result = match text.trim().is_empty() {
      true => MatchResult::unmatched(row_index),
      false => match self.params.mode {
        Mode::Exact => self.match_exact(row_index, text),
        Mode::Normalized => self.match_normalized(row_index, text),
        Mode::Heuristic => self.match_heuristic(row_index, row, text),
      },
    };

    histogram!("skumatch_row_latency_seconds").record(then.elapsed().as_secs_f64());

    if result.is_matched() {
      counter!("skumatch_rows_matched").increment(1);
    }

    result
  }

  fn match_exact(&self, row_index: usize, text: &str) -> MatchResult {
    match self.index.lookup_literal(text) {
      Some((id, field)) => MatchResult::matched(row_index, &self.index.record(id).record, field, 1.0),
      None => MatchResult::unmatched(row_index),
    }
  }

  fn match_normalized(&self, row_index: usize, text: &str) -> MatchResult {
    match self.index.lookup_normalized(normalize(text).lower()) {
      Some((id, field)) => MatchResult::matched(row_index, &self.index.record(id).record, field, 1.0),
      None => MatchResult::unmatched(row_index),
    }
  }

  fn match_heuristic(&self, row_index: usize, row: &InputRow, text: &str) -> MatchResult {
    let prepared = Prepared::new(text);

    let brand = self.params.brand_column.as_ref().map(|column| row_text(row, &[column])).filter(|brand| !brand.is_empty());
    let candidates = self.index.query(&prepared, brand.as_deref());

    match select_best(&self.params.scoring, &prepared, &self.index, &candidates) {
      Some(best) if best.score >= self.params.threshold => {
        tracing::debug!(record = best.record, score = best.score, penalties = ?best.penalties, "matched row");

        MatchResult::matched(row_index, &self.index.record(best.record).record, best.field, best.score)
      }

      Some(best) => {
        tracing::debug!(record = best.record, score = best.score, penalties = ?best.penalties, "best candidate is under threshold");

        MatchResult::unmatched(row_index)
      }

      None => MatchResult::unmatched(row_index),
    }
  }

  /// Lazily match rows, in order. Callers can stop between any two rows.
  pub fn iter<I>(&self, rows: I) -> impl Iterator<Item = MatchResult>
  where
    I: IntoIterator,
    I::Item: Borrow<InputRow>,
  {
    rows.into_iter().enumerate().map(move |(row_index, row)| self.match_row(row_index, row.borrow()))
  }

  /// Match every row, in order.
  pub fn run<I, P>(&self, rows: I, progress: P) -> Vec<MatchResult>
  where
    I: IntoIterator,
    I::Item: Borrow<InputRow>,
    P: FnMut(&Progress),
  {
    self.run_guarded(rows, &|_: usize| Ok::<(), SkuMatchError>(()), progress).results
  }

  /// Match rows, in order, consulting `guard` before each one.
  ///
  /// When the guard trips, results already produced are returned along with
  /// the error.
  pub fn run_guarded<I, G, P>(&self, rows: I, guard: &G, mut progress: P) -> BatchOutcome
  where
    I: IntoIterator,
    I::Item: Borrow<InputRow>,
    G: BatchGuard + ?Sized,
    P: FnMut(&Progress),
  {
    let rows = rows.into_iter();
    let mut results = Vec::with_capacity(rows.size_hint().0);
    let mut matched = 0;
    let mut last = String::new();

    for (row_index, row) in rows.enumerate() {
      if let Err(err) = guard.check(row_index) {
        tracing::warn!(processed = results.len(), error = %err, "batch aborted");

        return BatchOutcome { results, aborted: Some(err) };
      }

      let row: &InputRow = row.borrow();
      let text = row_text(row, &self.params.columns);
      let result = self.match_text(row_index, row, &text);

      if result.is_matched() {
        matched += 1;
      }

      results.push(result);
      last = text;

      if results.len() % self.params.progress_every == 0 {
        progress(&Progress {
          processed: results.len(),
          matched,
          digest: digest(&last),
        });
      }
    }

    if results.len() % self.params.progress_every != 0 {
      progress(&Progress {
        processed: results.len(),
        matched,
        digest: digest(&last),
      });
    }

    BatchOutcome { results, aborted: None }
  }
}

fn digest(text: &str) -> String {
  text.chars().take(DIGEST_LENGTH).collect()
}
