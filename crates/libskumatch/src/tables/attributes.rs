use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::tables::{self, PhraseTable};

pub(crate) static ATTRIBUTES: LazyLock<AttributeTables> = LazyLock::new(|| AttributeTables::new(tables::load::<AttributesDictionary>("attributes.yml")));

pub(crate) struct AttributeTables {
  /// Known model suffix words, longest first.
  pub(crate) suffixes: Vec<String>,
  /// Glued `model code + suffix words` occurrences, e.g. `X200ProMax`.
  pub(crate) glued_suffixes: Regex,
  /// A single suffix word, used to split the glued run above.
  pub(crate) suffix_word: Regex,
  /// Category keyword tables, most specific category first.
  pub(crate) categories: Vec<(String, PhraseTable<()>)>,
  pub(crate) compound_colors: PhraseTable<String>,
  pub(crate) generic_colors: PhraseTable<String>,
  pub(crate) color_stopwords: PhraseTable<()>,
  pub(crate) processors: PhraseTable<String>,
  /// Family name followed by a screen diagonal, e.g. `matebook 14`.
  pub(crate) notebook_families: Regex,
}

#[derive(Deserialize)]
struct AttributesDictionary {
  suffixes: Vec<String>,
  categories: Vec<Category>,
  colors: Colors,
  processors: Vec<Named>,
  notebook_families: Vec<String>,
}

#[derive(Deserialize)]
struct Category {
  id: String,
  priority: u32,
  keywords: Vec<String>,
}

#[derive(Deserialize)]
struct Colors {
  compound: Vec<Named>,
  generic: Vec<Named>,
  stopwords: Vec<String>,
}

#[derive(Deserialize)]
pub(crate) struct Named {
  pub(crate) id: String,
  pub(crate) forms: Vec<String>,
}

impl AttributeTables {
  fn new(dictionary: AttributesDictionary) -> AttributeTables {
    let mut suffixes = dictionary.suffixes.iter().map(|suffix| suffix.to_lowercase()).collect::<Vec<_>>();

    suffixes.sort_by(|lhs, rhs| rhs.len().cmp(&lhs.len()).then_with(|| lhs.cmp(rhs)));

    let words = tables::alternation(suffixes.iter().map(String::as_str).filter(|suffix| suffix.chars().all(|c| c.is_ascii_alphanumeric())));

    let glued_suffixes = Regex::new(&format!(r"(?i)(?-u:\b)([a-z]{{0,8}}\d{{1,4}})((?:{words})+)(?-u:\b)")).expect("could not build suffix pattern");
    let suffix_word = Regex::new(&format!(r"(?i){words}")).expect("could not build suffix pattern");

    let mut categories = dictionary.categories;

    categories.sort_by_key(|category| category.priority);

    let categories = categories
      .into_iter()
      .map(|category| (category.id, PhraseTable::new(category.keywords.into_iter().map(|keyword| (keyword, ())))))
      .collect();

    let notebook_families = Regex::new(&format!(
      r"(?:^|[^a-z0-9])(?:{})\s?(\d{{2}}(?:\.\d)?)(?:$|[^a-z0-9.])",
      tables::alternation(dictionary.notebook_families.iter().map(String::as_str))
    ))
    .expect("could not build notebook family pattern");

    AttributeTables {
      suffixes,
      glued_suffixes,
      suffix_word,
      categories,
      compound_colors: named_table(dictionary.colors.compound),
      generic_colors: named_table(dictionary.colors.generic),
      color_stopwords: PhraseTable::new(dictionary.colors.stopwords.into_iter().map(|word| (word, ()))),
      processors: named_table(dictionary.processors),
      notebook_families,
    }
  }

  pub(crate) fn is_suffix(&self, word: &str) -> bool {
    self.suffixes.iter().any(|suffix| suffix.eq_ignore_ascii_case(word))
  }
}

/// Build a table mapping every form of every entry to the entry identifier.
pub(crate) fn named_table(entries: Vec<Named>) -> PhraseTable<String> {
  PhraseTable::new(entries.into_iter().flat_map(|entry| {
    let id = entry.id;

    entry.forms.into_iter().map(move |form| (form, id.clone()))
  }))
}

#[cfg(test)]
mod tests {
  use super::ATTRIBUTES;

  #[test]
  fn suffixes_are_sorted() {
    let lengths = ATTRIBUTES.suffixes.iter().map(String::len).collect::<Vec<_>>();

    assert!(lengths.windows(2).all(|pair| pair[0] >= pair[1]));
    assert!(ATTRIBUTES.is_suffix("Turbo"));
    assert!(ATTRIBUTES.is_suffix("+"));
    assert!(!ATTRIBUTES.is_suffix("5g"));
  }

  #[test]
  fn categories_are_ordered_by_priority() {
    let position = |id: &str| ATTRIBUTES.categories.iter().position(|(category, _)| category == id).unwrap();

    assert!(position("case") < position("phone"));
    assert!(position("strap") < position("watch"));
  }
}
