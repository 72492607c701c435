use std::sync::LazyLock;

use serde::Deserialize;

use crate::tables;

pub(crate) static VERSIONS: LazyLock<VersionTables> = LazyLock::new(|| {
  let dictionary = tables::load::<VersionDictionary>("versions.yml");

  let mut qualifiers = dictionary.qualifiers.into_iter().map(|qualifier| qualifier.trim().to_lowercase()).collect::<Vec<_>>();

  qualifiers.sort_by(|lhs, rhs| rhs.chars().count().cmp(&lhs.chars().count()).then_with(|| lhs.cmp(rhs)));
  qualifiers.dedup();

  VersionTables {
    qualifiers,
    synonyms: dictionary
      .synonyms
      .into_iter()
      .map(|group| group.into_iter().map(|version| version.trim().to_lowercase()).collect())
      .collect(),
  }
});

pub(crate) struct VersionTables {
  /// Lower-cased qualifiers, longest first.
  pub(crate) qualifiers: Vec<String>,
  pub(crate) synonyms: Vec<Vec<String>>,
}

impl VersionTables {
  pub(crate) fn synonym_group(&self, version: &str) -> Option<usize> {
    self.synonyms.iter().position(|group| group.iter().any(|member| member == version))
  }
}

#[derive(Deserialize)]
struct VersionDictionary {
  qualifiers: Vec<String>,
  synonyms: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
  use super::VERSIONS;

  #[test]
  fn qualifiers_are_sorted() {
    let lengths = VERSIONS.qualifiers.iter().map(|qualifier| qualifier.chars().count()).collect::<Vec<_>>();

    assert!(lengths.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_eq!(VERSIONS.qualifiers.first().map(String::as_str), Some("北斗卫星消息版"));
  }

  #[test]
  fn synonym_groups() {
    assert_eq!(VERSIONS.synonym_group("卫星版"), VERSIONS.synonym_group("卫星通信版"));
    assert!(VERSIONS.synonym_group("wifi版").is_some());
    assert!(VERSIONS.synonym_group("活力版").is_none());
  }
}
