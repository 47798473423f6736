//! Tabular file processing.
//!
//! Decodes an uploaded base64 CSV payload into JSON row objects, first
//! row as header. Quoted fields may contain commas, doubled quotes,
//! and line breaks; CRLF line endings are normalized. Everything runs
//! locally, so this feature is authenticated but not usage-gated.

use base64::{engine::general_purpose, Engine as _};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Parsed upload, ready to serialize into the response body.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub filename: String,
    pub rows: usize,
    pub data: Vec<Map<String, Value>>,
}

/// Decode and parse an uploaded file.
///
/// Only the `.csv` extension is supported; anything else is a 400, as
/// is a payload that does not decode as base64 or UTF-8.
pub fn process(filename: &str, data: &str) -> Result<ProcessedFile, ApiError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if extension != "csv" {
        return Err(ApiError::BadRequest(
            "Unsupported file format. Please upload a CSV file.".to_string(),
        ));
    }

    let bytes = general_purpose::STANDARD
        .decode(strip_data_uri(data))
        .map_err(|_| ApiError::BadRequest("Invalid base64 file data".to_string()))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| ApiError::BadRequest("File is not valid UTF-8 text".to_string()))?;

    let records = parse_csv(&text);
    let mut records = records.into_iter();
    let headers = records.next().unwrap_or_default();

    let data: Vec<Map<String, Value>> = records
        .map(|record| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let field = record.get(i).cloned().unwrap_or_default();
                    (header.clone(), Value::String(field))
                })
                .collect()
        })
        .collect();

    tracing::debug!(filename = %filename, rows = data.len(), "Processed tabular upload");

    Ok(ProcessedFile {
        filename: filename.to_string(),
        rows: data.len(),
        data,
    })
}

/// Accept both raw base64 and `data:` URIs from browser FileReaders.
fn strip_data_uri(data: &str) -> &str {
    if data.starts_with("data:") {
        data.split_once("base64,").map(|(_, b)| b).unwrap_or(data)
    } else {
        data
    }
}

/// Split CSV text into records of fields.
///
/// A quoted field runs to the next unescaped quote; a doubled quote
/// inside it is a literal quote. A trailing empty line is not a record.
fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                record.push(std::mem::take(&mut field));
            }
            '\r' if !in_quotes => {
                // CRLF: let the newline close the record.
                if chars.peek() != Some(&'\n') {
                    field.push('\r');
                }
            }
            '\n' if !in_quotes => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> String {
        general_purpose::STANDARD.encode(text)
    }

    #[test]
    fn csv_rows_become_objects_keyed_by_header() {
        let processed = process("users.csv", &encode("name,age\nAda,36\nGrace,45\n")).unwrap();

        assert_eq!(processed.rows, 2);
        assert_eq!(processed.data[0]["name"], "Ada");
        assert_eq!(processed.data[0]["age"], "36");
        assert_eq!(processed.data[1]["name"], "Grace");
    }

    #[test]
    fn quoted_fields_keep_commas_and_quotes() {
        let csv = "title,notes\n\"Widget, large\",\"said \"\"hi\"\"\"\n";
        let processed = process("items.csv", &encode(csv)).unwrap();

        assert_eq!(processed.data[0]["title"], "Widget, large");
        assert_eq!(processed.data[0]["notes"], "said \"hi\"");
    }

    #[test]
    fn crlf_endings_and_missing_trailing_newline_both_parse() {
        let processed = process("a.csv", &encode("x,y\r\n1,2\r\n3,4")).unwrap();

        assert_eq!(processed.rows, 2);
        assert_eq!(processed.data[1]["y"], "4");
    }

    #[test]
    fn short_records_pad_with_empty_fields() {
        let processed = process("a.csv", &encode("x,y,z\n1,2\n")).unwrap();

        assert_eq!(processed.data[0]["z"], "");
    }

    #[test]
    fn data_uri_payloads_are_accepted() {
        let uri = format!("data:text/csv;base64,{}", encode("a\n1\n"));
        let processed = process("a.csv", &uri).unwrap();

        assert_eq!(processed.rows, 1);
    }

    #[test]
    fn non_csv_extensions_are_rejected() {
        let result = process("report.xlsx", &encode("a,b\n1,2\n"));
        assert!(matches!(result, Err(ApiError::BadRequest(_))));

        assert!(process("noextension", &encode("a\n")).is_err());
    }

    #[test]
    fn malformed_base64_is_a_bad_request() {
        assert!(matches!(
            process("a.csv", "not-base64!!!"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn header_only_files_yield_zero_rows() {
        let processed = process("a.csv", &encode("just,headers\n")).unwrap();
        assert_eq!(processed.rows, 0);
        assert!(processed.data.is_empty());
    }
}
