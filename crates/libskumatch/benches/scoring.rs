use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use libskumatch::prelude::*;

const CATALOG: &[&str] = &[
  "vivo X200 Pro 12+256 钛色",
  "vivo X200 Pro mini 16+512",
  "vivo X200 Pro 活力版",
  "Apple iPhone 15 Pro Max 256GB 黑色钛金属",
  "HUAWEI Mate 60 Pro 12+512 雅丹黑",
  "HUAWEI WATCH GT 4 46mm 曜石黑 WA2456C",
  "联想 ThinkPad X1 Carbon 2024 i7 14英寸",
  "IQOO Z10 Turbo+ 16+512",
  "Xiaomi 14 Ultra 16+1T 白色",
  "OPPO Find X8 Pro 卫星通信版",
];

fn catalog() -> Vec<CatalogRecord> {
  std::iter::repeat(CATALOG)
    .take(50)
    .flatten()
    .enumerate()
    .map(|(id, name)| CatalogRecord::builder(&id.to_string(), name).build())
    .collect()
}

fn row(name: &str) -> InputRow {
  serde_json::json!({ "name": name }).as_object().cloned().unwrap_or_default()
}

fn normalize_text(c: &mut Criterion) {
  c.bench_function("normalize", |b| b.iter(|| black_box(normalize("【官方正品】IQOOZ10Turbo+ 16g+512g 全网通5G手机"))));
}

fn heuristic(c: &mut Criterion) {
  let params = MatchParams {
    columns: vec!["name".to_string()],
    ..Default::default()
  };

  let matcher = Matcher::new(catalog(), params).unwrap();
  let row = row("vivo x200pro 12GB+256GB 钛色 5G手机");

  c.bench_function("heuristic", |b| b.iter(|| black_box(matcher.match_row(0, &row))));
}

fn normalized(c: &mut Criterion) {
  let params = MatchParams {
    mode: Mode::Normalized,
    columns: vec!["name".to_string()],
    ..Default::default()
  };

  let matcher = Matcher::new(catalog(), params).unwrap();
  let row = row("VIVO X200 PRO 活力版");

  c.bench_function("normalized", |b| b.iter(|| black_box(matcher.match_row(0, &row))));
}

criterion_group!(benches, normalize_text, heuristic, normalized);
criterion_main!(benches);
