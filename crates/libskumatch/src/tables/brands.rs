use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::tables::{self, PhraseTable};

pub(crate) static BRANDS: LazyLock<BrandTable> = LazyLock::new(|| BrandTable::new(tables::load::<BrandDictionary>("brands.yml").brands));

pub(crate) struct BrandTable {
  pub(crate) brands: Vec<Brand>,
  /// Every alias, canonical form and identifier, pointing to its brand.
  pub(crate) aliases: PhraseTable<usize>,
  /// Canonical forms only, used once aliases were rewritten.
  pub(crate) canonicals: PhraseTable<usize>,
  /// Canonical forms surrounded by spaces, replacing Han aliases so the Latin
  /// canonical form does not glue onto a neighbouring model code.
  pub(crate) spaced: Vec<String>,
  /// One `series + number` pattern per brand, aligned with `brands`.
  series: Vec<Regex>,
  /// Series of every brand, for text carrying no brand at all.
  any_series: Regex,
}

#[derive(Deserialize)]
struct BrandDictionary {
  brands: Vec<Brand>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Brand {
  pub(crate) id: String,
  pub(crate) canonical: String,
  pub(crate) aliases: Vec<String>,
  pub(crate) series: Vec<String>,
}

impl BrandTable {
  fn new(brands: Vec<Brand>) -> BrandTable {
    let aliases = PhraseTable::new(brands.iter().enumerate().flat_map(|(index, brand)| {
      brand
        .aliases
        .iter()
        .chain([&brand.canonical, &brand.id])
        .map(move |alias| (alias.clone(), index))
    }));

    let canonicals = PhraseTable::new(brands.iter().enumerate().map(|(index, brand)| (brand.canonical.clone(), index)));

    let spaced = brands.iter().map(|brand| format!(" {} ", brand.canonical)).collect();

    let series = brands.iter().map(|brand| series_regex(brand.series.iter().map(String::as_str))).collect();
    let any_series = series_regex(brands.iter().flat_map(|brand| brand.series.iter().map(String::as_str)));

    BrandTable {
      brands,
      aliases,
      canonicals,
      spaced,
      series,
      any_series,
    }
  }

  pub(crate) fn get(&self, index: usize) -> &Brand {
    &self.brands[index]
  }

  /// Resolve a free-standing brand value (a dedicated spreadsheet column, or a
  /// catalog brand field) to its brand.
  pub(crate) fn resolve(&self, value: &str) -> Option<&Brand> {
    self.aliases.find(value.trim()).map(|(_, index)| self.get(*index))
  }

  /// Whether `rest`, the text glued right after a brand mention, starts with
  /// something that reads as a model: a digit, one letter and a digit, or one
  /// of the brand's series words.
  pub(crate) fn model_follows(&self, index: usize, rest: &str) -> bool {
    let mut chars = rest.chars();

    match (chars.next(), chars.next()) {
      (Some(first), _) if first.is_ascii_digit() => return true,
      (Some(first), Some(second)) if first.is_ascii_alphabetic() && second.is_ascii_digit() => return true,
      _ => {}
    }

    self.get(index).series.iter().any(|series| {
      let series = series.replace(' ', "");

      rest.get(..series.len()).map(|prefix| prefix.eq_ignore_ascii_case(&series)).unwrap_or_default()
    })
  }

  pub(crate) fn series_of(&self, index: usize) -> &Regex {
    &self.series[index]
  }

  pub(crate) fn any_series(&self) -> &Regex {
    &self.any_series
  }

  pub(crate) fn is_series_word(&self, word: &str) -> bool {
    self.brands.iter().flat_map(|brand| brand.series.iter()).any(|series| series.eq_ignore_ascii_case(word))
  }
}

/// `series`, optionally one space, a 1-4 digit generation, and an optional
/// variant letter, delimited on both sides by anything but ASCII letters or
/// digits. Capture groups: 1 series, 2 number, 3 variant letter.
fn series_regex<'s, I>(series: I) -> Regex
where
  I: IntoIterator<Item = &'s str>,
{
  let pattern = format!(r"(?:^|[^a-z0-9])({})\s?(\d{{1,4}})([a-z])?(?:$|[^a-z0-9])", tables::alternation(series));

  Regex::new(&pattern).expect("could not build series pattern")
}
