use std::{borrow::Borrow, hash::Hash};

use ahash::HashSet;
use strsim::normalized_levenshtein;

#[inline]
pub(crate) fn is_disjoint<S>(lhs: &[S], rhs: &[S]) -> bool
where
  S: Borrow<str>,
{
  let (bigger, smaller) = if lhs.len() > rhs.len() { (lhs, rhs) } else { (rhs, lhs) };

  if bigger.len() > 5 {
    let set = smaller.iter().map(|s| s.borrow()).collect::<HashSet<_>>();

    return bigger.iter().all(|b| !set.contains(b.borrow()));
  }

  for a in lhs {
    for b in rhs {
      if a.borrow() == b.borrow() {
        return false;
      }
    }
  }

  true
}

/// Edit-distance similarity of two lower-cased texts.
///
/// Spacing is not meaningful in product names ("Mate60" and "Mate 60"), so
/// the texts are also compared with whitespace removed, keeping the best of
/// both.
pub(crate) fn string_similarity(lhs: &str, rhs: &str) -> f64 {
  if lhs.is_empty() || rhs.is_empty() {
    return 0.0;
  }
  if lhs == rhs {
    return 1.0;
  }

  let compact = |text: &str| text.chars().filter(|c| !c.is_whitespace()).collect::<String>();

  normalized_levenshtein(lhs, rhs).max(normalized_levenshtein(&compact(lhs), &compact(rhs)))
}

pub(crate) fn jaccard<'s, K, I>(lhs: I, rhs: I) -> f64
where
  K: Eq + Hash + 's,
  I: IntoIterator<Item = &'s K>,
{
  let lhs = lhs.into_iter().collect::<HashSet<_>>();
  let rhs = rhs.into_iter().collect::<HashSet<_>>();

  let union = lhs.union(&rhs).count();

  if union == 0 {
    return 0.0;
  }

  lhs.intersection(&rhs).count() as f64 / union as f64
}
