use std::sync::LazyLock;

use serde::Deserialize;

use crate::tables::{
  self, PhraseTable,
  attributes::{Named, named_table},
};

pub(crate) static WEARABLES: LazyLock<WearableTables> = LazyLock::new(|| {
  let dictionary = tables::load::<WearablesDictionary>("wearables.yml");

  WearableTables {
    keywords: PhraseTable::new(dictionary.keywords.into_iter().map(|keyword| (keyword, ()))),
    connectivity: named_table(dictionary.connectivity),
    straps: named_table(dictionary.straps),
  }
});

pub(crate) struct WearableTables {
  pub(crate) keywords: PhraseTable<()>,
  pub(crate) connectivity: PhraseTable<String>,
  pub(crate) straps: PhraseTable<String>,
}

#[derive(Deserialize)]
struct WearablesDictionary {
  keywords: Vec<String>,
  connectivity: Vec<Named>,
  straps: Vec<Named>,
}
