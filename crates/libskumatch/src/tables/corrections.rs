use std::{collections::BTreeMap, sync::LazyLock};

use serde::Deserialize;

use crate::tables::{self, PhraseTable};

pub(crate) static CORRECTIONS: LazyLock<Corrections> = LazyLock::new(|| {
  let dictionary = tables::load::<CorrectionsDictionary>("corrections.yml");

  Corrections {
    noise: PhraseTable::new(dictionary.noise.into_iter().map(|marker| (marker, ()))),
    typos: PhraseTable::new(dictionary.typos),
    abbreviations: PhraseTable::new(dictionary.abbreviations.into_iter().map(|(short, expanded)| {
      let lower = expanded.to_lowercase();

      (short, (expanded, lower))
    })),
  }
});

pub(crate) struct Corrections {
  pub(crate) noise: PhraseTable<()>,
  pub(crate) typos: PhraseTable<String>,
  /// Expanded form, and its lower-cased version for presence checks.
  pub(crate) abbreviations: PhraseTable<(String, String)>,
}

#[derive(Deserialize)]
struct CorrectionsDictionary {
  noise: Vec<String>,
  typos: BTreeMap<String, String>,
  abbreviations: BTreeMap<String, String>,
}
