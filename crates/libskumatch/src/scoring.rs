use std::ops::ControlFlow;

use metrics::histogram;
use tracing::instrument;

use crate::{
  index::CandidateIndex,
  matching::{
    ScoringParams,
    comparers::{jaccard, string_similarity},
    extractors::Prepared,
    model_code::should_exclude_candidate,
    penalties::PENALTIES,
    run_penalties, watch,
  },
  model::MatchedField,
};

/// Best candidate found for a row so far.
#[derive(Clone, Debug)]
pub(crate) struct MatchCandidate {
  pub(crate) record: usize,
  pub(crate) field: MatchedField,
  pub(crate) score: f64,
  pub(crate) penalties: Vec<(&'static str, f64)>,
}

/// Composite score of a catalog field against a row, between 0.0 and 1.0,
/// along with the penalties that were applied.
#[instrument(name = "score_candidate", level = "debug", skip_all)]
pub(crate) fn score_candidate(params: &ScoringParams, row: &Prepared, candidate: &Prepared) -> (f64, Vec<(&'static str, f64)>) {
  let mut penalties = Vec::new();

  match (&row.attributes.watch, &candidate.attributes.watch) {
    (Some(lhs), Some(rhs)) if watch::compare_products(lhs, rhs) => {
      histogram!("skumatch_scoring_scores").record(params.watch_match_score);

      return (params.watch_match_score, penalties);
    }

    (Some(_), None) | (None, Some(_)) => {
      penalties.push(("watch_one_sided", 1.0));

      return (0.0, penalties);
    }

    _ => {}
  }

  if should_exclude_candidate(row.attributes.full_model.get().map(String::as_str), candidate.attributes.full_model.get().map(String::as_str)) {
    penalties.push(("model_excluded", 1.0));

    return (0.0, penalties);
  }

  let similarity = string_similarity(row.text.lower(), candidate.text.lower());
  let keywords = jaccard(row.keywords.keys(), candidate.keywords.keys());
  let base = params.string_weight * similarity + params.keyword_weight * keywords;

  let score = run_penalties(params, &row.attributes, &candidate.attributes, base, PENALTIES, &mut penalties).clamp(0.0, 1.0);

  tracing::debug!(similarity, keywords, score, "computed score");

  histogram!("skumatch_scoring_scores").record(score);

  (score, penalties)
}

/// Scan ranked candidates, keeping the highest score.
///
/// Ties keep the candidate ranked first. The scan stops early on a
/// candidate scoring at least `early_exit_score` without any penalty, once
/// few enough candidates remain.
#[instrument(name = "select_best", level = "debug", skip_all, fields(candidates = candidates.len()))]
pub(crate) fn select_best(params: &ScoringParams, row: &Prepared, index: &CandidateIndex, candidates: &[usize]) -> Option<MatchCandidate> {
  let total = candidates.len();

  let outcome = candidates
    .iter()
    .enumerate()
    .flat_map(|(position, id)| index.record(*id).fields.iter().map(move |(field, prepared)| (position, *id, *field, prepared)))
    .try_fold(None::<MatchCandidate>, |best, (position, id, field, prepared)| {
      let (score, penalties) = score_candidate(params, row, prepared);
      let remaining = total - position - 1;
      let conclusive = score >= params.early_exit_score && penalties.is_empty() && remaining <= params.early_exit_remaining;

      let best = match best {
        Some(best) if best.score >= score => best,
        _ => MatchCandidate { record: id, field, score, penalties },
      };

      match conclusive {
        true => ControlFlow::Break(Some(best)),
        false => ControlFlow::Continue(Some(best)),
      }
    });

  match outcome {
    ControlFlow::Break(best) | ControlFlow::Continue(best) => best,
  }
}
