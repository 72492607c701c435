use std::sync::LazyLock;

use regex::Regex;

use crate::{normalize::NormalizedText, tables::versions::VERSIONS};

static REVISION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?-u:\b)v(\d)(?-u:\b)").expect("could not build version pattern"));
static GENERATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?-u:\b)(?:gen\s?(\d{1,2})|(\d{1,2})(?:st|nd|rd|th)\s?gen)(?-u:\b)").expect("could not build version pattern"));
static NATIVE_GENERATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"第\s?([一二三四五六七八九十]{1,2}|\d{1,2})\s?代").expect("could not build version pattern"));

/// Shortest text two versions must share for one to be read as a variant of
/// the other.
const MIN_SHARED_CHARS: usize = 2;

/// Version qualifier of a description, lower-cased.
///
/// Known qualifiers are tried longest first, then structural forms:
/// `V<digit>`, `Gen <digit>` and "第N代", the last two rendered as `gen<N>`.
pub fn extract_version(text: &NormalizedText) -> Option<String> {
  let lower = text.lower();

  if let Some(qualifier) = VERSIONS.qualifiers.iter().find(|qualifier| lower.contains(qualifier.as_str())) {
    return Some(qualifier.clone());
  }

  if let Some(caps) = REVISION.captures(lower) {
    return Some(format!("v{}", &caps[1]));
  }

  // Chipset generations ("骁龙8 Gen 3") follow a number, product generations
  // do not.
  let generation = GENERATION.captures_iter(lower).find_map(|caps| {
    let start = caps.get(0)?.start();

    if lower[..start].trim_end().ends_with(|c: char| c.is_ascii_digit()) {
      return None;
    }

    caps.get(1).or_else(|| caps.get(2)).map(|number| number.as_str().to_string())
  });

  if let Some(generation) = generation {
    return Some(format!("gen{generation}"));
  }

  NATIVE_GENERATION.captures(lower).and_then(|caps| native_number(&caps[1])).map(|generation| format!("gen{generation}"))
}

fn native_number(value: &str) -> Option<u32> {
  if let Ok(number) = value.parse::<u32>() {
    return Some(number);
  }

  let digit = |c: char| "一二三四五六七八九".chars().position(|d| d == c).map(|position| position as u32 + 1);
  let chars = value.chars().collect::<Vec<_>>();

  match chars.as_slice() {
    ['十'] => Some(10),
    ['十', unit] => digit(*unit).map(|unit| 10 + unit),
    [single] => digit(*single),
    _ => None,
  }
}

/// Whether two version qualifiers name the same version.
///
/// Absent on both sides is a match, absent on one side never is.
pub fn versions_match(lhs: Option<&str>, rhs: Option<&str>) -> bool {
  let (lhs, rhs) = match (lhs, rhs) {
    (None, None) => return true,
    (Some(lhs), Some(rhs)) => (compact(lhs), compact(rhs)),
    _ => return false,
  };

  if lhs == rhs {
    return true;
  }

  if let (Some(lhs_group), Some(rhs_group)) = (VERSIONS.synonym_group(&lhs), VERSIONS.synonym_group(&rhs)) {
    if lhs_group == rhs_group {
      return true;
    }
  }

  let (shorter, longer) = if lhs.chars().count() <= rhs.chars().count() { (&lhs, &rhs) } else { (&rhs, &lhs) };

  shorter.chars().count() >= MIN_SHARED_CHARS && longer.contains(shorter.as_str())
}

fn compact(version: &str) -> String {
  version.chars().filter(|c| !c.is_whitespace()).flat_map(char::to_lowercase).collect()
}
