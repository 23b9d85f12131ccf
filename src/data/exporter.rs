use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::ExportError;

/// Serializes the current view (post-filter, post-sort) back to CSV or JSON
/// text and writes it to a destination path.
pub struct Exporter;

impl Exporter {
    /// CSV text: header row first, `\n` terminator throughout including
    /// after the final row. Cells containing a comma, double-quote or
    /// newline are wrapped in double quotes with inner quotes doubled.
    pub fn csv_text(headers: &[String], rows: &[Vec<String>]) -> String {
        let mut out = String::new();

        let header_cells: Vec<String> = headers
            .iter()
            .map(|h| Self::escape_csv_field(h))
            .collect();
        out.push_str(&header_cells.join(","));
        out.push('\n');

        for row in rows {
            let cells: Vec<String> = row.iter().map(|c| Self::escape_csv_field(c)).collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }

        out
    }

    /// JSON text: an array of objects, one per row, keyed by the headers in
    /// their original order. Values stay the raw string cells so a cell that
    /// looks numeric round-trips as its source token.
    pub fn json_text(
        headers: &[String],
        rows: &[Vec<String>],
        pretty: bool,
    ) -> Result<String, ExportError> {
        let mut array = Vec::with_capacity(rows.len());
        for row in rows {
            let mut obj = serde_json::Map::new();
            for (i, header) in headers.iter().enumerate() {
                if let Some(cell) = row.get(i) {
                    obj.insert(header.clone(), Value::String(cell.clone()));
                }
            }
            array.push(Value::Object(obj));
        }

        let text = if pretty {
            serde_json::to_string_pretty(&array)?
        } else {
            serde_json::to_string(&array)?
        };
        Ok(text)
    }

    /// Write the view as CSV, returning a confirmation message.
    pub fn export_csv(
        path: &Path,
        headers: &[String],
        rows: &[Vec<String>],
    ) -> Result<String, ExportError> {
        let text = Self::csv_text(headers, rows);
        fs::write(path, text).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!(target: "export", "wrote {} rows to {}", rows.len(), path.display());
        Ok(format!("Exported {} rows to {}", rows.len(), path.display()))
    }

    /// Write the view as JSON, returning a confirmation message.
    pub fn export_json(
        path: &Path,
        headers: &[String],
        rows: &[Vec<String>],
        pretty: bool,
    ) -> Result<String, ExportError> {
        let text = Self::json_text(headers, rows, pretty)?;
        fs::write(path, text).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!(target: "export", "wrote {} rows to {}", rows.len(), path.display());
        Ok(format!("Exported {} rows to {}", rows.len(), path.display()))
    }

    fn escape_csv_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_escape_plain_field_untouched() {
        assert_eq!(Exporter::escape_csv_field("plain"), "plain");
        assert_eq!(Exporter::escape_csv_field(""), "");
    }

    #[test]
    fn test_escape_special_fields() {
        assert_eq!(Exporter::escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(Exporter::escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(Exporter::escape_csv_field("line1\nline2"), "\"line1\nline2\"");
    }

    #[test]
    fn test_csv_text_quoting_contract() {
        let text = Exporter::csv_text(
            &headers(&["msg"]),
            &[vec!["He said, \"hi\"\n".to_string()]],
        );
        assert_eq!(text, "msg\n\"He said, \"\"hi\"\"\n\"\n");
    }

    #[test]
    fn test_csv_text_empty_view_keeps_header_row() {
        let text = Exporter::csv_text(&headers(&["a", "b"]), &[]);
        assert_eq!(text, "a,b\n");
    }

    #[test]
    fn test_json_text_shape() {
        let text = Exporter::json_text(
            &headers(&["a", "b"]),
            &[vec!["1".to_string(), "x".to_string()]],
            false,
        )
        .unwrap();
        assert_eq!(text, r#"[{"a":"1","b":"x"}]"#);
    }

    #[test]
    fn test_json_text_preserves_header_order() {
        let text = Exporter::json_text(
            &headers(&["z", "a"]),
            &[vec!["1".to_string(), "2".to_string()]],
            false,
        )
        .unwrap();
        assert_eq!(text, r#"[{"z":"1","a":"2"}]"#);
    }

    #[test]
    fn test_json_text_no_numeric_coercion() {
        let text = Exporter::json_text(
            &headers(&["n"]),
            &[vec!["007".to_string()]],
            false,
        )
        .unwrap();
        // A numeric-looking cell still exports as its source token
        assert_eq!(text, r#"[{"n":"007"}]"#);
    }

    #[test]
    fn test_json_text_empty_view() {
        let text = Exporter::json_text(&headers(&["a"]), &[], false).unwrap();
        assert_eq!(text, "[]");
    }

    #[test]
    fn test_export_io_error() {
        let err = Exporter::export_csv(
            Path::new("/nonexistent-dir/out.csv"),
            &headers(&["a"]),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }

    #[test]
    fn test_export_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let original = "He said, \"hi\"\n".to_string();

        let message = Exporter::export_csv(
            &path,
            &headers(&["msg"]),
            &[vec![original.clone()]],
        )
        .unwrap();
        assert!(message.contains("1 rows"));

        // Re-parsing the written field reproduces the original exactly
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&path)
            .unwrap();
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], original.as_str());
    }
}
