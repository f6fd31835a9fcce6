//! Catalog store: the immutable mapping from row index to movie attributes.
//!
//! The catalog artifact is produced by an external pipeline with no fixed
//! contract, so loading runs an ordered chain of shape detectors over the
//! decoded JSON value:
//!
//! 1. Record rows:   `[{ "movie_id": .., "title": .., "tags": .. }, ...]`
//! 2. Column table:  `{ "movie_id": [..], "title": [..], "tags": [..] }`
//!                   (column values may also be row-keyed objects, as
//!                   pandas `to_json` emits)
//! 3. Wrapped pair:  `[<catalog in shape 1 or 2>, <ignored>]`
//! 4. Positional:    `[[id, title, tags, ..], ...]` with columns assigned
//!                   by position
//!
//! Falling through every detector is a schema error; rows are never
//! silently dropped.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::models::MovieItem;

const REQUIRED_COLUMNS: [&str; 3] = ["movie_id", "title", "tags"];

/// Ordered collection of recommendable movies; the positional index is the
/// row index the similarity matrix is aligned to. Built once at load and
/// shared read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    items: Vec<MovieItem>,
}

impl Catalog {
    /// Coerce a decoded raw payload into a catalog, trying each accepted
    /// shape in priority order.
    pub fn from_value(raw: &Value) -> Result<Catalog> {
        if let Some(items) = try_record_rows(raw)? {
            return Ok(Catalog { items });
        }
        if let Some(items) = try_column_table(raw)? {
            return Ok(Catalog { items });
        }
        if let Some(items) = try_wrapped_pair(raw)? {
            return Ok(Catalog { items });
        }
        if let Some(items) = try_positional_rows(raw)? {
            return Ok(Catalog { items });
        }

        Err(AppError::Schema(
            "catalog payload does not match any accepted shape (record rows, \
             column table, wrapped pair, or positional rows)"
                .to_string(),
        ))
    }

    /// Read and decode a catalog file, then coerce it.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Catalog> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            AppError::Schema(format!("cannot open catalog file {}: {}", path.display(), e))
        })?;
        let raw: Value = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| AppError::Schema(format!("catalog file is not valid JSON: {}", e)))?;

        let catalog = Catalog::from_value(&raw)?;
        info!(rows = catalog.len(), path = %path.display(), "Catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&MovieItem> {
        self.items.get(row)
    }

    pub fn items(&self) -> &[MovieItem] {
        &self.items
    }

    /// Resolve a title to its row index by exact match. First match wins
    /// when the uniqueness assumption is violated.
    pub fn index_of_title(&self, title: &str) -> Option<usize> {
        self.items.iter().position(|item| item.title == title)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.title.as_str())
    }
}

/// Shape 1: array of objects each carrying the three required keys.
fn try_record_rows(raw: &Value) -> Result<Option<Vec<MovieItem>>> {
    let rows = match raw.as_array() {
        Some(rows) => rows,
        None => return Ok(None),
    };
    if !rows.iter().all(|row| {
        row.as_object()
            .map(|obj| REQUIRED_COLUMNS.iter().all(|col| obj.contains_key(*col)))
            .unwrap_or(false)
    }) {
        return Ok(None);
    }

    let mut items = Vec::with_capacity(rows.len());
    let mut extra_warned = false;
    for (i, row) in rows.iter().enumerate() {
        let obj = row.as_object().expect("checked above");
        if !extra_warned && obj.len() > REQUIRED_COLUMNS.len() {
            let extras: Vec<&str> = obj
                .keys()
                .map(String::as_str)
                .filter(|k| !REQUIRED_COLUMNS.contains(k))
                .collect();
            warn!(?extras, "Catalog rows carry unexpected extra columns");
            extra_warned = true;
        }
        items.push(MovieItem {
            movie_id: id_cell(&obj["movie_id"], i)?,
            title: text_cell(&obj["title"], "title", i)?,
            tags: text_cell(&obj["tags"], "tags", i)?,
        });
    }
    Ok(Some(items))
}

/// Shape 2: object mapping column names to equal-length columns. A column
/// is either a plain array or a row-keyed object (pandas orientations).
fn try_column_table(raw: &Value) -> Result<Option<Vec<MovieItem>>> {
    let table = match raw.as_object() {
        Some(table) => table,
        None => return Ok(None),
    };
    if !REQUIRED_COLUMNS.iter().all(|col| table.contains_key(*col)) {
        return Ok(None);
    }

    let extras: Vec<&str> = table
        .keys()
        .map(String::as_str)
        .filter(|k| !REQUIRED_COLUMNS.contains(k))
        .collect();
    if !extras.is_empty() {
        warn!(?extras, "Catalog table carries unexpected extra columns");
    }

    let ids = column_values(&table["movie_id"], "movie_id")?;
    let titles = column_values(&table["title"], "title")?;
    let tags = column_values(&table["tags"], "tags")?;

    if ids.len() != titles.len() || ids.len() != tags.len() {
        return Err(AppError::Schema(format!(
            "catalog column lengths differ: movie_id={}, title={}, tags={}",
            ids.len(),
            titles.len(),
            tags.len()
        )));
    }

    let mut items = Vec::with_capacity(ids.len());
    for (i, ((id, title), tag)) in ids.iter().zip(&titles).zip(&tags).enumerate() {
        items.push(MovieItem {
            movie_id: id_cell(id, i)?,
            title: text_cell(title, "title", i)?,
            tags: text_cell(tag, "tags", i)?,
        });
    }
    Ok(Some(items))
}

/// Shape 3: two-element container whose first element is a catalog in
/// shape 1 or 2. The second element is ignored.
fn try_wrapped_pair(raw: &Value) -> Result<Option<Vec<MovieItem>>> {
    let pair = match raw.as_array() {
        Some(pair) if pair.len() == 2 => pair,
        _ => return Ok(None),
    };
    if let Some(items) = try_record_rows(&pair[0])? {
        return Ok(Some(items));
    }
    if let Some(items) = try_column_table(&pair[0])? {
        return Ok(Some(items));
    }
    Ok(None)
}

/// Shape 4: array of row arrays without column labels; the first three
/// cells are taken as (movie_id, title, tags).
fn try_positional_rows(raw: &Value) -> Result<Option<Vec<MovieItem>>> {
    let rows = match raw.as_array() {
        Some(rows) => rows,
        None => return Ok(None),
    };
    if rows.is_empty() || !rows.iter().all(|row| row.is_array()) {
        return Ok(None);
    }

    let mut items = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let cells = row.as_array().expect("checked above");
        if cells.len() < REQUIRED_COLUMNS.len() {
            return Err(AppError::Schema(format!(
                "catalog row {} has {} cells, need at least {}",
                i,
                cells.len(),
                REQUIRED_COLUMNS.len()
            )));
        }
        items.push(MovieItem {
            movie_id: id_cell(&cells[0], i)?,
            title: text_cell(&cells[1], "title", i)?,
            tags: text_cell(&cells[2], "tags", i)?,
        });
    }
    Ok(Some(items))
}

/// External ids arrive as integers or strings; both normalize to `String`.
fn id_cell(value: &Value, row: usize) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(AppError::Schema(format!(
            "catalog row {}: movie_id must be a string or number, got {}",
            row,
            type_name(other)
        ))),
    }
}

fn text_cell(value: &Value, column: &str, row: usize) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(AppError::Schema(format!(
            "catalog row {}: {} must be a string, got {}",
            row,
            column,
            type_name(other)
        ))),
    }
}

/// Flatten a column into row-ordered values. Row-keyed objects are sorted
/// by their numeric row key so insertion order quirks cannot reorder rows.
fn column_values(column: &Value, name: &str) -> Result<Vec<Value>> {
    match column {
        Value::Array(values) => Ok(values.clone()),
        Value::Object(map) => {
            let mut keyed: Vec<(&String, &Value)> = map.iter().collect();
            keyed.sort_by_key(|(k, _)| k.parse::<u64>().unwrap_or(u64::MAX));
            Ok(keyed.into_iter().map(|(_, v)| v.clone()).collect())
        }
        other => Err(AppError::Schema(format!(
            "catalog column {} must be an array or row-keyed object, got {}",
            name,
            type_name(other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_record_rows() {
        let raw = json!([
            { "movie_id": 10, "title": "Alpha", "tags": "action hero" },
            { "movie_id": "20", "title": "Beta", "tags": "drama" }
        ]);

        let catalog = Catalog::from_value(&raw).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().movie_id, "10");
        assert_eq!(catalog.get(1).unwrap().movie_id, "20");
        assert_eq!(catalog.get(1).unwrap().title, "Beta");
    }

    #[test]
    fn loads_column_table_with_arrays() {
        let raw = json!({
            "movie_id": [1, 2, 3],
            "title": ["Alpha", "Beta", "Gamma"],
            "tags": ["a", "b", "c"]
        });

        let catalog = Catalog::from_value(&raw).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.index_of_title("Gamma"), Some(2));
    }

    #[test]
    fn loads_column_table_with_row_keyed_objects() {
        // pandas to_json(orient="columns") shape; keys sort numerically
        let raw = json!({
            "movie_id": { "0": 1, "1": 2, "10": 11, "2": 3 },
            "title": { "0": "A", "1": "B", "10": "K", "2": "C" },
            "tags": { "0": "x", "1": "y", "10": "z", "2": "w" }
        });

        let catalog = Catalog::from_value(&raw).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get(2).unwrap().title, "C");
        assert_eq!(catalog.get(3).unwrap().title, "K");
    }

    #[test]
    fn loads_wrapped_pair_taking_first_element() {
        let raw = json!([
            [{ "movie_id": 1, "title": "Alpha", "tags": "a" }],
            { "anything": "else" }
        ]);

        let catalog = Catalog::from_value(&raw).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(0).unwrap().title, "Alpha");
    }

    #[test]
    fn loads_positional_rows() {
        let raw = json!([
            [1, "Alpha", "a b c"],
            [2, "Beta", "d e", "ignored extra cell"]
        ]);

        let catalog = Catalog::from_value(&raw).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().movie_id, "1");
        assert_eq!(catalog.get(1).unwrap().tags, "d e");
    }

    #[test]
    fn tolerates_extra_columns() {
        let raw = json!([
            { "movie_id": 1, "title": "Alpha", "tags": "a", "popularity": 9.3 }
        ]);

        let catalog = Catalog::from_value(&raw).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn rejects_rows_missing_title() {
        let raw = json!([
            { "movie_id": 1, "tags": "a" }
        ]);

        let err = Catalog::from_value(&raw).unwrap_err();
        assert!(matches!(err, AppError::Schema(_)), "got {:?}", err);
    }

    #[test]
    fn rejects_column_length_mismatch() {
        let raw = json!({
            "movie_id": [1, 2],
            "title": ["Alpha"],
            "tags": ["a", "b"]
        });

        let err = Catalog::from_value(&raw).unwrap_err();
        assert!(matches!(err, AppError::Schema(_)));
    }

    #[test]
    fn rejects_scalar_payload() {
        let err = Catalog::from_value(&json!(42)).unwrap_err();
        assert!(matches!(err, AppError::Schema(_)));
    }

    #[test]
    fn rejects_positional_row_with_too_few_cells() {
        let raw = json!([[1, "Alpha"]]);

        let err = Catalog::from_value(&raw).unwrap_err();
        assert!(matches!(err, AppError::Schema(_)));
    }

    #[test]
    fn first_title_match_wins_on_duplicates() {
        let raw = json!([
            { "movie_id": 1, "title": "Twin", "tags": "a" },
            { "movie_id": 2, "title": "Twin", "tags": "b" }
        ]);

        let catalog = Catalog::from_value(&raw).unwrap();
        assert_eq!(catalog.index_of_title("Twin"), Some(0));
    }

    #[test]
    fn load_from_path_reads_json_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{ "movie_id": 7, "title": "Filed", "tags": "t" }}]"#
        )
        .unwrap();

        let catalog = Catalog::load_from_path(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(0).unwrap().movie_id, "7");
    }

    #[test]
    fn load_from_path_rejects_missing_file() {
        let err = Catalog::load_from_path("/nonexistent/movie_list.json").unwrap_err();
        assert!(matches!(err, AppError::Schema(_)));
    }
}
