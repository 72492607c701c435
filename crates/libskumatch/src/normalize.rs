use std::{fmt, sync::LazyLock};

use itertools::Itertools;
use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

use crate::tables::{
  attributes::ATTRIBUTES,
  brands::BRANDS,
  corrections::CORRECTIONS,
  glued, is_bounded,
};

static EMPTY_BRACKETS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(\s*\)|\[\s*\]").expect("could not build bracket pattern"));

static CAPACITY_COMBINATION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)(?-u:\b)(\d{1,2})\s?(?:gb|g)?\s?\+\s?(\d{1,4})\s?(gb|g|tb|t)?(?-u:\b)").expect("could not build capacity pattern")
});

static CAPACITY_SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(?-u:\b)(\d{1,4})\s?(gb|tb)(?-u:\b)").expect("could not build capacity pattern"));

/// Text produced by [`normalize`], along with its lower-cased form.
///
/// Normalizing the text again is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizedText {
  text: String,
  lower: String,
}

impl NormalizedText {
  pub fn as_str(&self) -> &str {
    &self.text
  }

  pub fn lower(&self) -> &str {
    &self.lower
  }

  pub fn is_empty(&self) -> bool {
    self.text.is_empty()
  }

  pub fn into_string(self) -> String {
    self.text
  }
}

impl fmt::Display for NormalizedText {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.text)
  }
}

/// Clean up and canonicalize a product description.
///
/// Stages run in order, each one consuming the output of the previous one:
/// noise and punctuation, typos, abbreviations, brand aliases, capacities and
/// finally whitespace.
pub fn normalize(input: &str) -> NormalizedText {
  if input.trim().is_empty() {
    return NormalizedText::default();
  }

  let text = strip_noise(input);
  let text = fix_typos(&text);
  let text = expand_abbreviations(&text);
  let text = canonicalize_brands(&text);
  let text = canonicalize_capacities(&text);
  let text = canonicalize_whitespace(&text);

  let lower = text.to_lowercase();

  NormalizedText { text, lower }
}

fn half_width(c: char) -> char {
  match c {
    '【' | '〔' | '「' | '『' | '《' | '〖' => '[',
    '】' | '〕' | '」' | '』' | '》' | '〗' => ']',
    '、' => ',',
    '。' => '.',
    c => c,
  }
}

fn strip_noise(input: &str) -> String {
  let text = input.nfkc().map(half_width).collect::<String>();
  let mut text = CORRECTIONS.noise.replace(&text, |haystack, range, _| is_bounded(haystack, range).then_some(" "));

  // Nested brackets only become empty once their inner pair is gone.
  while EMPTY_BRACKETS.is_match(&text) {
    text = EMPTY_BRACKETS.replace_all(&text, " ").into_owned();
  }

  text
}

fn fix_typos(input: &str) -> String {
  CORRECTIONS.typos.replace(input, |haystack, range, fixed| is_bounded(haystack, range).then_some(fixed.as_str()))
}

fn expand_abbreviations(input: &str) -> String {
  let lower = input.to_lowercase();

  CORRECTIONS.abbreviations.replace(input, |haystack, range, (expanded, expanded_lower)| {
    if !is_bounded(haystack, range) || lower.contains(expanded_lower.as_str()) {
      return None;
    }

    Some(expanded.as_str())
  })
}

fn canonicalize_brands(input: &str) -> String {
  BRANDS.aliases.replace(input, |haystack, range, index| {
    let alias = &haystack[range.clone()];
    let rest = &haystack[range.end..];

    if glued(haystack[..range.start].chars().next_back(), alias.chars().next()) {
      return None;
    }

    if glued(alias.chars().next_back(), rest.chars().next()) && !BRANDS.model_follows(*index, rest) {
      return None;
    }

    match alias.is_ascii() {
      true => Some(BRANDS.get(*index).canonical.as_str()),
      false => Some(BRANDS.spaced[*index].as_str()),
    }
  })
}

fn canonicalize_capacities(input: &str) -> String {
  let text = input.split_whitespace().join(" ");
  let text = CAPACITY_COMBINATION.replace_all(&text, |caps: &Captures| {
    let terabytes = caps.get(3).map(|unit| unit.as_str().to_ascii_lowercase().starts_with('t')).unwrap_or_default();

    match terabytes {
      true => format!("{}+{}T", &caps[1], &caps[2]),
      false => format!("{}+{}", &caps[1], &caps[2]),
    }
  });

  let text = CAPACITY_SINGLE.replace_all(&text, |caps: &Captures| match caps[2].eq_ignore_ascii_case("tb") {
    true => format!("{}T", &caps[1]),
    false => caps[1].to_string(),
  });

  text.into_owned()
}

fn canonicalize_whitespace(input: &str) -> String {
  let text = input.split_whitespace().join(" ");

  let mut spaced = String::with_capacity(text.len() + 8);
  let mut cursor = 0;

  for (range, index) in BRANDS.canonicals.find_all(&text) {
    let brand = &text[range.clone()];
    let rest = &text[range.end..];

    if glued(text[..range.start].chars().next_back(), brand.chars().next()) {
      continue;
    }

    if glued(brand.chars().next_back(), rest.chars().next()) && BRANDS.model_follows(*index, rest) {
      spaced.push_str(&text[cursor..range.end]);
      spaced.push(' ');

      cursor = range.end;
    }
  }

  spaced.push_str(&text[cursor..]);

  let split = ATTRIBUTES.glued_suffixes.replace_all(&spaced, |caps: &Captures| {
    let words = ATTRIBUTES.suffix_word.find_iter(&caps[2]).map(|word| word.as_str()).join(" ");

    format!("{} {}", &caps[1], words)
  });

  split.split_whitespace().join(" ")
}
