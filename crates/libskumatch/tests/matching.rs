use libskumatch::prelude::*;
use serde_json::json;
use serde_json_assert::assert_json_eq;

fn catalog() -> Vec<CatalogRecord> {
  vec![
    CatalogRecord::builder("vivo-x200-pro", "vivo X200 Pro").spec("12+256 钛色").build(),
    CatalogRecord::builder("vivo-x200-pro-mini", "vivo X200 Pro mini").spec("12+256").build(),
    CatalogRecord::builder("vivo-x200-pro-lite", "vivo X200 Pro 活力版").build(),
    CatalogRecord::builder("iqoo-z10-turbo-plus", "IQOO Z10 Turbo+").brand("iQOO").build(),
    CatalogRecord::builder("iqoo-z10-turbo", "IQOO Z10 Turbo").brand("iQOO").build(),
    CatalogRecord::builder("iphone-15", "Apple iPhone 15 128GB 黑色").secondary_name("苹果 iPhone15 黑色").build(),
    CatalogRecord::builder("watch-gt4", "HUAWEI WATCH GT 4 46mm 曜石黑 WA2456C").build(),
  ]
}

fn rows(names: &[&str]) -> Vec<InputRow> {
  names.iter().map(|name| json!({ "sku": name }).as_object().cloned().unwrap()).collect()
}

fn matched_ids(results: &[MatchResult]) -> Vec<Option<&str>> {
  results.iter().map(|result| result.matched_record.as_ref().map(|record| record.id.as_str())).collect()
}

#[test]
fn heuristic_batch() {
  let params = MatchParams {
    columns: vec!["sku".to_string()],
    ..Default::default()
  };

  let matcher = Matcher::new(catalog(), params).unwrap();

  let results = matcher.run(
    rows(&[
      "VIVO X200 Pro 活力版",
      "IQOOZ10Turbo+",
      "IQOO Z10 Turbo",
      "vivo X200 Pro mini 12+256",
      "三星 Galaxy S24 Ultra",
      "华为手表 GT4 棕色 (WA2456C)",
    ]),
    |_| {},
  );

  assert_eq!(
    matched_ids(&results),
    vec![Some("vivo-x200-pro-lite"), Some("iqoo-z10-turbo-plus"), Some("iqoo-z10-turbo"), Some("vivo-x200-pro-mini"), None, Some("watch-gt4")]
  );

  assert!(results.iter().flat_map(|result| result.similarity).all(|similarity| (0.7..=1.0).contains(&similarity)));
}

#[test]
fn more_specific_models_never_match() {
  let catalog = vec![CatalogRecord::builder("mini", "vivo X200 Pro mini").build()];

  for threshold in [0.02, 0.3, 0.7] {
    let params = MatchParams {
      threshold,
      columns: vec!["sku".to_string()],
      ..Default::default()
    };

    let matcher = Matcher::new(catalog.clone(), params).unwrap();
    let result = matcher.match_row(0, &rows(&["vivo X200 Pro"])[0]);

    assert_eq!(result.status, MatchStatus::Unmatched, "threshold {threshold}");
  }
}

#[test]
fn serialized_results() {
  let params = MatchParams {
    mode: Mode::Normalized,
    columns: vec!["sku".to_string()],
    ..Default::default()
  };

  let matcher = Matcher::new(catalog(), params).unwrap();
  let results = matcher.iter(rows(&["苹果 iPhone15 黑色", "Apple iPhone 16"])).collect::<Vec<_>>();

  assert_json_eq!(
    serde_json::to_value(&results).unwrap(),
    json!([
      {
        "row_index": 0,
        "status": "matched",
        "matched_record": {
          "id": "iphone-15",
          "name": "Apple iPhone 15 128GB 黑色",
          "secondary_name": "苹果 iPhone15 黑色",
        },
        "matched_field": "secondary_name",
        "similarity": 1.0,
      },
      {
        "row_index": 1,
        "status": "unmatched",
      },
    ])
  );
}

#[test]
fn building_blocks() {
  assert_eq!(normalize("IQOOZ10Turbo+").as_str(), "IQOO Z10 Turbo+");
  assert_eq!(normalize(normalize("IQOOZ10Turbo+").as_str()).as_str(), "IQOO Z10 Turbo+");

  assert_eq!(model_match_score(Some("X200 Pro"), Some("X200 Pro mini")), 0.0);
  assert!(should_exclude_candidate(Some("X200 Pro"), Some("X200 Pro mini")));
  assert!(versions_match(None, None));

  let text = normalize("Apple iPhone 15 Pro Max 256GB 黑色");

  assert_eq!(extract_brand(&text), Some("apple"));
  assert_eq!(extract_capacity(&text), Some(Capacity { memory: None, storage: 256 }));
  assert_eq!(extract_colors(&text), Some(vec!["black"]));
}
