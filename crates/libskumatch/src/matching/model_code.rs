use crate::tables::attributes::ATTRIBUTES;

/// Agreement between two full models, from 0.0 to 1.0.
///
///  - 1.0: same model
///  - 0.5: one extends the other with something that is not a variant
///    suffix (a cosmetic or version-only difference)
///  - 0.3: same base model, different variant suffixes
///  - 0.0: one extends the other with a variant suffix ("X200 Pro" and
///    "X200 Pro mini"), or different base models
///
/// Missing or blank on both sides is a match, on one side never is.
pub fn model_match_score(lhs: Option<&str>, rhs: Option<&str>) -> f64 {
  let (lhs, rhs) = match (lhs.map(compact).filter(|m| !m.is_empty()), rhs.map(compact).filter(|m| !m.is_empty())) {
    (None, None) => return 1.0,
    (Some(lhs), Some(rhs)) => (lhs, rhs),
    _ => return 0.0,
  };

  if lhs == rhs {
    return 1.0;
  }

  let (shorter, longer) = if lhs.len() <= rhs.len() { (&lhs, &rhs) } else { (&rhs, &lhs) };

  if let Some(remainder) = longer.strip_prefix(shorter.as_str()) {
    return match contains_suffix(remainder) {
      true => 0.0,
      false => 0.5,
    };
  }

  match strip_suffixes(&lhs) == strip_suffixes(&rhs) {
    true => 0.3,
    false => 0.0,
  }
}

/// Whether a candidate is a distinct, more specific model than the one asked
/// for, i.e. it extends the input model with a variant suffix.
///
/// A candidate more general than the input is never excluded.
pub fn should_exclude_candidate(input: Option<&str>, candidate: Option<&str>) -> bool {
  let (Some(input), Some(candidate)) = (input.map(compact), candidate.map(compact)) else {
    return false;
  };

  if input.is_empty() || candidate.len() <= input.len() {
    return false;
  }

  candidate.strip_prefix(input.as_str()).is_some_and(contains_suffix)
}

/// Model with every known variant suffix removed from its tail.
pub(crate) fn strip_suffixes(model: &str) -> &str {
  let mut base = model;

  'strip: loop {
    for suffix in &ATTRIBUTES.suffixes {
      if base.len() > suffix.len() && base.ends_with(suffix.as_str()) {
        base = &base[..base.len() - suffix.len()];

        continue 'strip;
      }
    }

    return base;
  }
}

fn contains_suffix(remainder: &str) -> bool {
  ATTRIBUTES.suffixes.iter().any(|suffix| remainder.contains(suffix.as_str()))
}

fn compact(model: &str) -> String {
  model.chars().filter(|c| !c.is_whitespace()).flat_map(char::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
  use super::{model_match_score, should_exclude_candidate};

  const MODELS: &[&str] = &["x200", "x200 pro", "x200 pro mini", "iphone15 pro max", "mate60", "mate60e", "z10 turbo", "z10 turbo +", "galaxys24 ultra", "galaxys24"];

  #[test]
  fn tiers() {
    assert_eq!(model_match_score(Some("X200 Pro"), Some("x200pro")), 1.0);
    assert_eq!(model_match_score(Some("mate60"), Some("mate60e")), 0.5);
    assert_eq!(model_match_score(Some("x200 pro"), Some("x200 ultra")), 0.3);
    assert_eq!(model_match_score(Some("x200"), Some("s20")), 0.0);
    assert_eq!(model_match_score(Some("z10 turbo"), Some("z10 turbo +")), 0.0);
  }

  #[test]
  fn absent_models() {
    assert_eq!(model_match_score(None, None), 1.0);
    assert_eq!(model_match_score(Some(" "), Some("")), 1.0);
    assert_eq!(model_match_score(Some("x200"), None), 0.0);
    assert_eq!(model_match_score(Some(""), Some("x200")), 0.0);
    assert!(!should_exclude_candidate(None, Some("x200 pro")));
    assert!(!should_exclude_candidate(Some("x200 pro"), None));
  }

  #[test]
  fn identity_and_symmetry() {
    for lhs in MODELS {
      assert_eq!(model_match_score(Some(lhs), Some(lhs)), 1.0);

      for rhs in MODELS {
        assert_eq!(model_match_score(Some(lhs), Some(rhs)), model_match_score(Some(rhs), Some(lhs)), "{lhs} / {rhs}");
      }
    }
  }

  #[test]
  fn suffix_exclusivity() {
    for model in ["x200 pro", "iphone15", "mate60", "z10 turbo"] {
      for suffix in ["mini", "max", "ultra", "plus", "+"] {
        let extended = format!("{model} {suffix}");

        assert_eq!(model_match_score(Some(model), Some(&extended)), 0.0, "{model} / {extended}");
        assert!(should_exclude_candidate(Some(model), Some(&extended)), "{model} / {extended}");
        assert!(!should_exclude_candidate(Some(&extended), Some(model)), "{extended} / {model}");
      }
    }
  }

  #[test]
  fn x200_pro_is_not_x200_pro_mini() {
    assert_eq!(model_match_score(Some("X200 Pro"), Some("X200 Pro mini")), 0.0);
    assert!(should_exclude_candidate(Some("X200 Pro"), Some("X200 Pro mini")));
    assert!(!should_exclude_candidate(Some("X200 Pro mini"), Some("X200 Pro")));
  }
}
