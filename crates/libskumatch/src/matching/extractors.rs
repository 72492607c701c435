use std::sync::LazyLock;

use ahash::HashMap;
use compact_str::CompactString;
use itertools::Itertools;
use regex::{Captures, Regex};
use unicode_general_category::{GeneralCategory, get_general_category};

use crate::{
  matching::{version, watch},
  model::{Attr, AttributeSet, Capacity, ScreenSize},
  normalize::{NormalizedText, normalize},
  tables::{attributes::ATTRIBUTES, brands::BRANDS},
};

static CAPACITY_COMBINATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?-u:\b)(\d{1,2})\+(\d{1,4})(t)?(?-u:\b)").expect("could not build capacity pattern"));
static CAPACITY_SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?-u:\b)(\d{1,4})(t|g)?(?-u:\b)").expect("could not build capacity pattern"));

static INCHES: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"(?:^|[^0-9.a-z])(\d{1,3}(?:\.\d{1,2})?)\s?(?:英寸|寸|inches|inch|in(?-u:\b)|")"#).expect("could not build screen size pattern"));
static MILLIMETERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|[^0-9.a-z])(\d{2}(?:\.\d)?)\s?mm(?-u:\b)").expect("could not build screen size pattern"));

static INTEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|[^a-z0-9])(i[3579])(?:$|[^a-z0-9])").expect("could not build processor pattern"));
static APPLE_SILICON: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|[^a-z0-9])(m[1-4])(?:$|[^a-z0-9])").expect("could not build processor pattern"));

/// First year of the current decade, in UTC, taken once per process.
pub(crate) static CURRENT_DECADE: LazyLock<i16> = LazyLock::new(|| {
  let year = jiff::Timestamp::now().to_zoned(jiff::tz::TimeZone::UTC).year();

  year - year.rem_euclid(10)
});

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|[^a-z0-9])((?:19|20)\d{2})(?:$|[^a-z0-9])").expect("could not build year pattern"));

static GENERIC_MODEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:^|[^a-z0-9])([a-z]{1,2})\s?(\d{2,4})([a-z])?(?:$|[^a-z0-9])").expect("could not build model pattern"));

const PROCESSOR_CODES: [&str; 8] = ["i3", "i5", "i7", "i9", "m1", "m2", "m3", "m4"];
const STORAGE_SIZES: [u32; 6] = [16, 32, 64, 128, 256, 512];
const BARE_STORAGE_SIZES: [u32; 4] = [64, 128, 256, 512];

/// Role of a keyword, deciding how much it weighs in candidate retrieval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeywordKind {
  Brand,
  Series,
  Spec,
}

pub(crate) type Keywords = HashMap<CompactString, KeywordKind>;

/// A description, normalized once, with everything the scorer needs from it.
#[derive(Clone, Debug)]
pub(crate) struct Prepared {
  pub(crate) text: NormalizedText,
  pub(crate) attributes: AttributeSet,
  pub(crate) keywords: Keywords,
}

impl Prepared {
  pub(crate) fn new(raw: &str) -> Prepared {
    let text = normalize(raw);
    let attributes = extract_attributes(&text);
    let keywords = extract_keywords(&text, &attributes);

    Prepared { text, attributes, keywords }
  }

  /// Prepare a catalog field. Attributes are also read from the record
  /// specification, which often carries the capacity or the color.
  pub(crate) fn with_spec(raw: &str, spec: Option<&str>) -> Prepared {
    let Some(spec) = spec.filter(|spec| !spec.trim().is_empty()) else {
      return Prepared::new(raw);
    };

    let text = normalize(raw);
    let attributes = extract_attributes(&normalize(&format!("{raw} {spec}")));
    let keywords = extract_keywords(&text, &attributes);

    Prepared { text, attributes, keywords }
  }
}

/// Run every extractor over `text`.
pub fn extract_attributes(text: &NormalizedText) -> AttributeSet {
  let brand = brand_index(text);
  let models = extract_models(text, brand);
  let product_type = extract_product_type(text);

  let (short_model, full_model) = match models {
    Some((short, full)) => (Attr::Present(short), Attr::Present(full)),
    None => (Attr::Absent, Attr::Absent),
  };

  // A `V<digit>` series model ("Magic V3") must not read as a version.
  let version = version::extract_version(text).filter(|version| !short_model.get().is_some_and(|model| model.ends_with(version.as_str())));

  let watch = match product_type {
    Some("watch") | None if watch::is_watch_product(text) => Some(watch::extract_attributes(text)),
    _ => None,
  };

  AttributeSet {
    brand: brand.map(|index| BRANDS.get(index).id.as_str()).into(),
    product_type: product_type.into(),
    short_model,
    full_model,
    capacity: extract_capacity(text).into(),
    colors: extract_colors(text).into(),
    screen_size: extract_screen_size(text).into(),
    processor: extract_processor(text).into(),
    year: extract_year(text).into(),
    version: version.into(),
    watch,
  }
}

fn brand_index(text: &NormalizedText) -> Option<usize> {
  BRANDS.aliases.find(text.lower()).map(|(_, index)| *index)
}

pub fn extract_brand(text: &NormalizedText) -> Option<&'static str> {
  brand_index(text).map(|index| BRANDS.get(index).id.as_str())
}

pub fn extract_product_type(text: &NormalizedText) -> Option<&'static str> {
  ATTRIBUTES.categories.iter().find(|(_, keywords)| keywords.contains(text.lower())).map(|(id, _)| id.as_str())
}

pub fn extract_capacity(text: &NormalizedText) -> Option<Capacity> {
  if let Some(caps) = CAPACITY_COMBINATION.captures(text.lower()) {
    let memory = caps[1].parse::<u32>().ok()?;
    let storage = caps[2].parse::<u32>().ok()?;

    return Some(Capacity {
      memory: Some(memory),
      storage: match caps.get(3) {
        Some(_) => storage * 1024,
        None => storage,
      },
    });
  }

  CAPACITY_SINGLE.captures_iter(text.lower()).find_map(|caps| {
    let size = caps[1].parse::<u32>().ok()?;

    let storage = match caps.get(2).map(|unit| unit.as_str()) {
      Some("t") if (1..=8).contains(&size) => size * 1024,
      Some("g") if STORAGE_SIZES.contains(&size) => size,
      None if BARE_STORAGE_SIZES.contains(&size) => size,
      _ => return None,
    };

    Some(Capacity { memory: None, storage })
  })
}

/// Every color mentioned in the text, compound colors first.
///
/// Compound colors and phrases that merely contain a color character are
/// masked before generic colors are looked up, so "玫瑰金" is never also
/// read as "金".
pub fn extract_colors(text: &NormalizedText) -> Option<Vec<&'static str>> {
  let mut masked = text.lower().to_string();
  let mut colors = Vec::new();

  for (range, color) in ATTRIBUTES.compound_colors.find_iter(text.lower()) {
    colors.push(color.as_str());
    masked.replace_range(range.clone(), &" ".repeat(range.len()));
  }

  for (range, _) in ATTRIBUTES.color_stopwords.find_iter(text.lower()) {
    if masked.is_char_boundary(range.start) && masked.is_char_boundary(range.end) {
      masked.replace_range(range.clone(), &" ".repeat(range.len()));
    }
  }

  colors.extend(ATTRIBUTES.generic_colors.find_iter(&masked).map(|(_, color)| color.as_str()));

  let colors = colors.into_iter().unique().collect::<Vec<_>>();

  match colors.is_empty() {
    true => None,
    false => Some(colors),
  }
}

pub fn extract_screen_size(text: &NormalizedText) -> Option<ScreenSize> {
  let lower = text.lower();

  let inches = INCHES.captures_iter(lower).find_map(|caps| caps[1].parse::<f64>().ok().filter(|size| (3.0..=100.0).contains(size)));

  if let Some(size) = inches {
    return Some(ScreenSize::Inches(size));
  }

  if let Some(size) = extract_millimeters(text) {
    return Some(ScreenSize::Millimeters(size));
  }

  ATTRIBUTES
    .notebook_families
    .captures_iter(lower)
    .find_map(|caps| caps[1].parse::<f64>().ok().filter(|size| (10.0..=18.0).contains(size)))
    .map(ScreenSize::Inches)
}

/// A size in millimeters within the range worn on a wrist.
pub(crate) fn extract_millimeters(text: &NormalizedText) -> Option<f64> {
  MILLIMETERS.captures_iter(text.lower()).find_map(|caps| caps[1].parse::<f64>().ok().filter(|size| (38.0..=50.0).contains(size)))
}

pub fn extract_processor(text: &NormalizedText) -> Option<&'static str> {
  let lower = text.lower();

  for pattern in [&*INTEL, &*APPLE_SILICON] {
    if let Some(caps) = pattern.captures(lower) {
      return PROCESSOR_CODES.into_iter().find(|code| *code == &caps[1]);
    }
  }

  ATTRIBUTES.processors.find(lower).map(|(_, id)| id.as_str())
}

pub fn extract_year(text: &NormalizedText) -> Option<i16> {
  let decade = *CURRENT_DECADE;

  YEAR
    .captures_iter(text.lower())
    .filter_map(|caps| caps[1].parse::<i16>().ok())
    .find(|year| (decade..decade + 10).contains(year))
}

pub fn extract_short_model(text: &NormalizedText) -> Option<String> {
  extract_models(text, brand_index(text)).map(|(short, _)| short)
}

pub fn extract_full_model(text: &NormalizedText) -> Option<String> {
  extract_models(text, brand_index(text)).map(|(_, full)| full)
}

/// Short and full model of a description.
///
/// The short model is a series word and a generation number, compacted
/// ("x200", "iphone15", "mate60"), looked up with the series of the brand of
/// the text, then with the series of every brand, then as any one or two
/// letters followed by digits. The full model appends every known suffix word
/// directly following it ("x200 pro mini").
fn extract_models(text: &NormalizedText, brand: Option<usize>) -> Option<(String, String)> {
  let lower = text.lower();

  let caps = brand
    .and_then(|index| first_model(BRANDS.series_of(index), lower))
    .or_else(|| first_model(BRANDS.any_series(), lower))
    .or_else(|| first_model(&GENERIC_MODEL, lower))?;

  let series = caps[1].chars().filter(|c| !c.is_whitespace()).collect::<String>();
  let short = format!("{series}{}{}", &caps[2], caps.get(3).map(|letter| letter.as_str()).unwrap_or_default());

  let end = caps.get(3).or_else(|| caps.get(2)).map(|mat| mat.end()).unwrap_or_default();
  let suffixes = trailing_suffixes(&lower[end..]);

  let full = match suffixes.is_empty() {
    true => short.clone(),
    false => format!("{short} {}", suffixes.join(" ")),
  };

  Some((short, full))
}

fn first_model<'h>(pattern: &Regex, haystack: &'h str) -> Option<Captures<'h>> {
  pattern.captures_iter(haystack).find(|caps| !is_year(&caps[2]))
}

fn is_year(number: &str) -> bool {
  number.len() == 4 && number.parse::<u16>().map(|year| (1990..=2099).contains(&year)).unwrap_or_default()
}

fn trailing_suffixes(rest: &str) -> Vec<&str> {
  let mut suffixes = Vec::new();

  for token in rest.split(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | ',' | '/')) {
    if token.is_empty() {
      continue;
    }

    let (word, plus) = match token.strip_suffix('+') {
      Some(word) => (word, true),
      None => (token, false),
    };

    if !word.is_empty() {
      if !ATTRIBUTES.is_suffix(word) {
        break;
      }

      suffixes.push(word);
    }

    if plus {
      suffixes.push("+");
    }
  }

  suffixes
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
  Latin,
  Han,
  Separator,
}

fn char_class(c: char) -> CharClass {
  match c {
    c if c.is_ascii_alphanumeric() || c == '+' || c == '.' => CharClass::Latin,
    c if get_general_category(c) == GeneralCategory::OtherLetter => CharClass::Han,
    c if c.is_alphanumeric() => CharClass::Latin,
    _ => CharClass::Separator,
  }
}

/// Split lower-cased text on whitespace, punctuation and script changes.
pub(crate) fn tokenize(lower: &str) -> impl Iterator<Item = &str> {
  lower
    .char_indices()
    .chunk_by(|(_, c)| char_class(*c))
    .into_iter()
    .filter(|(class, _)| *class != CharClass::Separator)
    .filter_map(|(_, mut chars)| {
      let (start, first) = chars.next()?;
      let end = chars.last().map(|(offset, c)| offset + c.len_utf8()).unwrap_or(start + first.len_utf8());

      Some((start, end))
    })
    .collect::<Vec<_>>()
    .into_iter()
    .map(move |(start, end)| lower[start..end].trim_matches(|c| c == '.' || c == '+'))
    .filter(|token| !token.is_empty())
}

/// Keywords of a description, with their role.
///
/// The short model is always part of the keywords, in its compact form, so
/// "Mate 60" and "Mate60" retrieve the same records.
pub(crate) fn extract_keywords(text: &NormalizedText, attributes: &AttributeSet) -> Keywords {
  let mut keywords = Keywords::default();

  for token in tokenize(text.lower()) {
    keywords.entry(CompactString::from(token)).or_insert_with(|| keyword_kind(token));
  }

  if let Attr::Present(short) = &attributes.short_model {
    keywords.insert(CompactString::from(short.as_str()), KeywordKind::Series);
  }

  keywords
}

fn keyword_kind(token: &str) -> KeywordKind {
  if BRANDS.aliases.find(token).is_some_and(|(range, _)| range.len() == token.len()) {
    return KeywordKind::Brand;
  }

  let letters = token.chars().any(|c| c.is_ascii_alphabetic());
  let digits = token.chars().any(|c| c.is_ascii_digit());

  if (letters && digits && !is_measure(token)) || BRANDS.is_series_word(token) {
    return KeywordKind::Series;
  }

  KeywordKind::Spec
}

/// Whether a token is a number followed by a short unit ("5g", "46mm", "1t").
fn is_measure(token: &str) -> bool {
  let unit = token.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == '+');

  unit.len() < token.len() && unit.len() <= 2 && unit.chars().all(|c| c.is_ascii_alphabetic())
}
