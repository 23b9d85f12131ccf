use csv::ReaderBuilder;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::data::table::{FileType, Table};
use crate::error::LoadError;

/// Synthetic column prepended when a dict-of-objects document is loaded;
/// each top-level key becomes this column's value for its row.
const NAME_COLUMN: &str = "Name";

/// Primitive arrays up to this length are joined into one cell; anything
/// longer (or nested) is kept as its JSON text.
const MAX_INLINE_ARRAY: usize = 10;

/// Load any supported file into a Table, dispatching on the extension
/// (case-insensitive). Unknown extensions are rejected before any parser
/// runs.
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<Table, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_string();
    let file_type = FileType::from_extension(&extension)
        .ok_or(LoadError::UnsupportedFormat { extension })?;

    debug!(target: "loader", "loading {} as {}", path.display(), file_type);
    match file_type {
        FileType::Csv => load_csv(path),
        FileType::Json => load_json(path),
        FileType::Jsonl => load_jsonl(path),
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

fn read_source(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path)
        .map_err(|e| LoadError::Parse(format!("failed to read {}: {}", path.display(), e)))
}

/// Parse a CSV file; the first record is the header row.
pub fn load_csv(path: &Path) -> Result<Table, LoadError> {
    let content = read_source(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Parse(format!("failed to read CSV headers: {}", e)))?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record =
            result.map_err(|e| LoadError::Parse(format!("failed to read CSV record: {}", e)))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(Table::new(file_name_of(path), FileType::Csv, headers, rows)?)
}

/// Parse a JSON file. Accepts an array of objects, an array of arrays, a
/// single object, a dict-of-objects, or an object wrapping a nested array
/// of objects. Nested objects flatten to dot-notation keys; headers are the
/// union of keys in first-appearance order and records missing a key get an
/// empty cell.
pub fn load_json(path: &Path) -> Result<Table, LoadError> {
    let content = read_source(path)?;
    let parsed: JsonValue = serde_json::from_str(&content)
        .map_err(|e| LoadError::Parse(format!("failed to parse JSON: {}", e)))?;

    // Array-of-arrays input gets positional column names.
    if let JsonValue::Array(arr) = &parsed {
        if arr.first().map_or(false, |v| v.is_array()) {
            return table_from_json_arrays(path, arr);
        }
    }

    let records = extract_records(parsed)?;

    // Flatten every record, collecting the header union as keys first appear.
    let mut flattened: Vec<Vec<(String, String)>> = Vec::with_capacity(records.len());
    let mut headers: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for record in &records {
        let mut pairs = Vec::new();
        flatten_value("", record, &mut pairs);
        for (key, _) in &pairs {
            if seen.insert(key.clone()) {
                headers.push(key.clone());
            }
        }
        flattened.push(pairs);
    }

    // The synthetic Name column from dict-of-objects input goes first.
    if let Some(pos) = headers.iter().position(|h| h == NAME_COLUMN) {
        if pos > 0 {
            let name = headers.remove(pos);
            headers.insert(0, name);
        }
    }

    // Align every row to the unified header list; missing keys become "".
    let rows: Vec<Vec<String>> = flattened
        .iter()
        .map(|pairs| {
            let map: HashMap<&str, &str> = pairs
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            headers
                .iter()
                .map(|h| map.get(h.as_str()).copied().unwrap_or("").to_string())
                .collect()
        })
        .collect();

    Ok(Table::new(file_name_of(path), FileType::Json, headers, rows)?)
}

/// Parse a JSONL file (one JSON object per line, blank lines skipped).
/// Headers come from the first line's keys; later lines missing a key get an
/// empty cell and extra keys are dropped.
pub fn load_jsonl(path: &Path) -> Result<Table, LoadError> {
    let content = read_source(path)?;
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return Err(LoadError::Parse("JSONL file is empty".to_string()));
    }

    let first: JsonValue = serde_json::from_str(lines[0])
        .map_err(|e| LoadError::Parse(format!("failed to parse line 1: {}", e)))?;
    let headers: Vec<String> = first
        .as_object()
        .ok_or_else(|| LoadError::Parse("JSONL lines must be objects".to_string()))?
        .keys()
        .cloned()
        .collect();

    let mut rows = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let value: JsonValue = serde_json::from_str(line)
            .map_err(|e| LoadError::Parse(format!("failed to parse line {}: {}", i + 1, e)))?;
        let obj = value
            .as_object()
            .ok_or_else(|| LoadError::Parse(format!("line {} is not an object", i + 1)))?;
        let row: Vec<String> = headers
            .iter()
            .map(|h| obj.get(h).map(scalar_to_string).unwrap_or_default())
            .collect();
        rows.push(row);
    }

    Ok(Table::new(
        file_name_of(path),
        FileType::Jsonl,
        headers,
        rows,
    )?)
}

/// Build a table from a top-level array of arrays. Columns are named
/// positionally from the first row's width; a later row of different length
/// is rejected.
fn table_from_json_arrays(path: &Path, arr: &[JsonValue]) -> Result<Table, LoadError> {
    let width = arr[0].as_array().map(|a| a.len()).unwrap_or(0);
    let headers: Vec<String> = (1..=width).map(|i| format!("column_{}", i)).collect();

    let mut rows = Vec::with_capacity(arr.len());
    for (idx, value) in arr.iter().enumerate() {
        let inner = value
            .as_array()
            .ok_or_else(|| LoadError::Parse(format!("row {} is not an array", idx + 1)))?;
        if inner.len() != width {
            return Err(LoadError::Parse(format!(
                "row {} has {} values, expected {}",
                idx + 1,
                inner.len(),
                width
            )));
        }
        rows.push(inner.iter().map(scalar_to_string).collect());
    }

    Ok(Table::new(file_name_of(path), FileType::Json, headers, rows)?)
}

/// Pull the record array out of an arbitrary JSON document:
/// - an array is used directly (must be non-empty)
/// - a dict whose values are mostly objects becomes one row per key, with
///   the key under the Name column
/// - an object holding arrays of objects contributes its largest such array
/// - any other object is wrapped as a single row
fn extract_records(parsed: JsonValue) -> Result<Vec<JsonValue>, LoadError> {
    match parsed {
        JsonValue::Array(arr) => {
            if arr.is_empty() {
                return Err(LoadError::Parse("JSON array is empty".to_string()));
            }
            Ok(arr)
        }
        JsonValue::Object(map) => {
            let object_values = map.values().filter(|v| v.is_object()).count();
            if object_values > 1 && object_values * 2 >= map.len() {
                let mut rows = Vec::new();
                for (key, value) in &map {
                    if let JsonValue::Object(inner) = value {
                        let mut row = serde_json::Map::new();
                        row.insert(
                            NAME_COLUMN.to_string(),
                            JsonValue::String(key.clone()),
                        );
                        for (k, v) in inner {
                            row.insert(k.clone(), v.clone());
                        }
                        rows.push(JsonValue::Object(row));
                    }
                }
                return Ok(rows);
            }

            let best_key = map
                .iter()
                .filter_map(|(k, v)| match v {
                    JsonValue::Array(arr) if arr.first().map_or(false, |v| v.is_object()) => {
                        Some((k.clone(), arr.len()))
                    }
                    _ => None,
                })
                .max_by_key(|(_, len)| *len)
                .map(|(k, _)| k);

            if let Some(key) = best_key {
                if let Some(JsonValue::Array(arr)) = map.get(&key) {
                    return Ok(arr.clone());
                }
            }

            // No nested array found; the object itself is a single row
            Ok(vec![JsonValue::Object(map)])
        }
        _ => Err(LoadError::Parse(
            "JSON must be an object or an array of objects".to_string(),
        )),
    }
}

/// Flatten a JSON value into dot-notation key/value pairs, e.g.
/// `{"user": {"name": "Alice"}}` -> `("user.name", "Alice")`.
fn flatten_value(prefix: &str, value: &JsonValue, out: &mut Vec<(String, String)>) {
    match value {
        JsonValue::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                flatten_value(&key, v, out);
            }
        }
        JsonValue::Array(arr) => {
            let all_primitive = arr.iter().all(|v| !v.is_object() && !v.is_array());
            if all_primitive && arr.len() <= MAX_INLINE_ARRAY {
                let items: Vec<String> = arr.iter().map(scalar_to_string).collect();
                out.push((prefix.to_string(), items.join(", ")));
            } else {
                out.push((prefix.to_string(), value.to_string()));
            }
        }
        other => out.push((prefix.to_string(), scalar_to_string(other))),
    }
}

/// Stringify a JSON scalar the way a cell stores it: strings unquoted,
/// null empty, everything else as its JSON text.
fn scalar_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
