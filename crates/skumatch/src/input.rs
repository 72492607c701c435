use std::{
  fs,
  io::{self, BufReader, Write},
  path::Path,
};

use libskumatch::prelude::*;
use serde::de::DeserializeOwned;
use serde_jsonlines::{JsonLinesReader, JsonLinesWriter};

use crate::errors::AppError;

/// Read a JSON array, or one JSON document per line.
pub fn read_documents<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
  let error = |reason: String| AppError::InputError {
    path: path.display().to_string(),
    reason,
  };

  let data = fs::read(path).map_err(|err| error(err.to_string()))?;

  match data.iter().find(|byte| !byte.is_ascii_whitespace()) {
    None => Ok(Vec::new()),
    Some(b'[') => serde_json::from_slice(&data).map_err(|err| error(err.to_string())),
    Some(_) => JsonLinesReader::new(BufReader::new(data.as_slice()))
      .read_all::<T>()
      .collect::<Result<Vec<_>, _>>()
      .map_err(|err| error(err.to_string())),
  }
}

pub fn read_catalog(path: &Path) -> Result<Vec<CatalogRecord>, AppError> {
  let mut records = read_documents::<CatalogRecord>(path)?;

  // Records without an identifier are named after their position.
  for (position, record) in records.iter_mut().enumerate() {
    if record.id.is_empty() {
      record.id = position.to_string();
    }
  }

  Ok(records)
}

pub fn read_rows(path: &Path) -> Result<Vec<InputRow>, AppError> {
  read_documents::<InputRow>(path)
}

pub fn write_results<W: Write>(writer: W, results: &[MatchResult]) -> io::Result<()> {
  let mut writer = JsonLinesWriter::new(writer);

  for result in results {
    writer.write(result)?;
  }

  writer.flush()
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use libskumatch::prelude::*;

  use super::{read_catalog, read_rows, write_results};

  fn file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();

    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  #[test]
  fn json_array() {
    let catalog = file(r#"[{ "id": "a", "name": "vivo X200 Pro", "brand": "vivo" }, { "name": "Xiaomi 14" }]"#);
    let records = read_catalog(catalog.path()).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].brand.as_deref(), Some("vivo"));
    assert_eq!(records[1].id, "1");
  }

  #[test]
  fn json_lines() {
    let rows = file("{\"name\": \"vivo X200 Pro\", \"ram\": 12}\n{\"name\": null}\n");
    let rows = read_rows(rows.path()).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["ram"], 12);
  }

  #[test]
  fn invalid_documents() {
    assert!(read_rows(file("{ not json").path()).is_err());
    assert!(read_rows(std::path::Path::new("/nonexistent/rows.jsonl")).is_err());
    assert!(read_rows(file("  \n").path()).unwrap().is_empty());
  }

  #[test]
  fn results() {
    let mut output = Vec::new();
    let record = CatalogRecord::builder("a", "vivo X200 Pro").build();

    let results = vec![
      serde_json::from_value::<MatchResult>(serde_json::json!({
        "row_index": 0,
        "status": "matched",
        "matched_record": record,
        "matched_field": "name",
        "similarity": 0.9,
      }))
      .unwrap(),
      serde_json::from_value::<MatchResult>(serde_json::json!({ "row_index": 1, "status": "unmatched" })).unwrap(),
    ];

    write_results(&mut output, &results).unwrap();

    let lines = String::from_utf8(output).unwrap();
    let lines = lines.lines().collect::<Vec<_>>();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(r#""matched_field":"name""#));
    assert_eq!(lines[1], r#"{"row_index":1,"status":"unmatched"}"#);
  }
}
