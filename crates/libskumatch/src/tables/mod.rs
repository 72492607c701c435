use std::ops::Range;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use rust_embed::Embed;
use serde::de::DeserializeOwned;

pub(crate) mod attributes;
pub(crate) mod brands;
pub(crate) mod corrections;
pub(crate) mod versions;
pub(crate) mod wearables;

#[derive(Embed)]
#[folder = "./assets/tables"]
struct Tables;

pub(crate) fn load<T: DeserializeOwned>(name: &str) -> T {
  let file = Tables::get(name).expect("could not read embedded lookup table");

  serde_yaml::from_slice::<T>(&file.data).expect("could not unmarshal embedded lookup table")
}

/// Phrase lookup table over lower-cased patterns.
///
/// Entries are sorted longest-first when the table is built, so ties between
/// patterns never depend on the order they were written in the YAML sources.
/// Matching is leftmost-longest and ASCII case-insensitive.
pub(crate) struct PhraseTable<V> {
  automaton: AhoCorasick,
  values: Vec<V>,
}

impl<V> PhraseTable<V> {
  pub(crate) fn new<I, S>(entries: I) -> PhraseTable<V>
  where
    I: IntoIterator<Item = (S, V)>,
    S: AsRef<str>,
  {
    let mut entries = entries
      .into_iter()
      .map(|(pattern, value)| (pattern.as_ref().trim().to_lowercase(), value))
      .filter(|(pattern, _)| !pattern.is_empty())
      .collect::<Vec<_>>();

    entries.sort_by(|(lhs, _), (rhs, _)| rhs.chars().count().cmp(&lhs.chars().count()));

    let (patterns, values): (Vec<_>, Vec<_>) = entries.into_iter().unzip();

    let automaton = AhoCorasickBuilder::new()
      .match_kind(MatchKind::LeftmostLongest)
      .ascii_case_insensitive(true)
      .build(&patterns)
      .expect("could not build phrase automaton");

    PhraseTable { automaton, values }
  }

  /// Every match, including those glued onto a neighbouring ASCII word.
  pub(crate) fn find_all<'t, 'h>(&'t self, haystack: &'h str) -> impl Iterator<Item = (Range<usize>, &'t V)> {
    self.automaton.find_iter(haystack).map(|mat| (mat.range(), &self.values[mat.pattern().as_usize()]))
  }

  /// Every match that does not glue onto a neighbouring ASCII word.
  pub(crate) fn find_iter<'t, 'h>(&'t self, haystack: &'h str) -> impl Iterator<Item = (Range<usize>, &'t V)> {
    self.find_all(haystack).filter(move |(range, _)| is_bounded(haystack, range.clone()))
  }

  pub(crate) fn find(&self, haystack: &str) -> Option<(Range<usize>, &V)> {
    self.find_iter(haystack).next()
  }

  pub(crate) fn contains(&self, haystack: &str) -> bool {
    self.find(haystack).is_some()
  }

  /// Rewrite matches for which `replacement` returns a value, leaving the
  /// rest of the haystack untouched.
  pub(crate) fn replace<'t, F>(&'t self, haystack: &str, mut replacement: F) -> String
  where
    F: FnMut(&str, Range<usize>, &'t V) -> Option<&'t str>,
  {
    let mut out = String::with_capacity(haystack.len());
    let mut cursor = 0;

    for mat in self.automaton.find_iter(haystack) {
      if let Some(value) = replacement(haystack, mat.range(), &self.values[mat.pattern().as_usize()]) {
        out.push_str(&haystack[cursor..mat.start()]);
        out.push_str(value);

        cursor = mat.end();
      }
    }

    out.push_str(&haystack[cursor..]);
    out
  }
}

/// Whether `range` sits on word boundaries.
///
/// Only ASCII letters and digits glue together: Han text has no spaces
/// between words, so a Han phrase is always considered bounded.
pub(crate) fn is_bounded(haystack: &str, range: Range<usize>) -> bool {
  let matched = &haystack[range.clone()];

  !glued(haystack[..range.start].chars().next_back(), matched.chars().next()) && !glued(matched.chars().next_back(), haystack[range.end..].chars().next())
}

pub(crate) fn glued(lhs: Option<char>, rhs: Option<char>) -> bool {
  matches!((lhs, rhs), (Some(lhs), Some(rhs)) if lhs.is_ascii_alphanumeric() && rhs.is_ascii_alphanumeric())
}

/// Regex alternation over `words`, longest first, with inner spaces made
/// optional.
pub(crate) fn alternation<'w, I>(words: I) -> String
where
  I: IntoIterator<Item = &'w str>,
{
  let mut words = words.into_iter().map(|word| word.trim().to_lowercase()).filter(|word| !word.is_empty()).collect::<Vec<_>>();

  words.sort_by(|lhs, rhs| rhs.chars().count().cmp(&lhs.chars().count()).then_with(|| lhs.cmp(rhs)));
  words.dedup();

  words
    .iter()
    .map(|word| word.split_whitespace().map(regex::escape).collect::<Vec<_>>().join(r"\s?"))
    .collect::<Vec<_>>()
    .join("|")
}
