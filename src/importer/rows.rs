use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::{ColumnMap, ImportError};

pub const VLAN_ID_MIN: i64 = 1;
pub const VLAN_ID_MAX: i64 = 4094;

/// Header and column keys compare after trimming and lowercasing
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Why a single CSV row produced no VLAN
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowError {
    /// The id or name column is absent or empty in this row
    MissingColumn { columns: Vec<String> },
    /// The id column is not an integer in 1..=4094
    InvalidId { value: String, reason: String },
    /// The CSV reader could not tokenize this record
    Malformed { message: String },
    /// The inventory backend failed the existence check or the create
    Backend { message: String },
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::MissingColumn { columns } => {
                write!(f, "missing expected column(s): {}", columns.join(", "))
            }
            RowError::InvalidId { value, reason } => {
                write!(f, "invalid VLAN ID value '{}': {}", value, reason)
            }
            RowError::Malformed { message } => write!(f, "malformed CSV record: {}", message),
            RowError::Backend { message } => write!(f, "inventory error: {}", message),
        }
    }
}

impl std::error::Error for RowError {}

/// A CSV row keyed by normalized header. Entries with an empty key or an
/// empty (after trimming) value are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRow {
    fields: HashMap<String, String>,
}

impl NormalizedRow {
    pub fn from_record(headers: &[String], record: &csv::StringRecord) -> Self {
        let mut fields = HashMap::new();
        for (key, value) in headers.iter().zip(record.iter()) {
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                continue;
            }
            fields.insert(key.clone(), value.to_string());
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// The validated content of one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanFields {
    pub vid: i32,
    pub name: String,
}

impl VlanFields {
    pub fn from_row(row: &NormalizedRow, columns: &ColumnMap) -> Result<Self, RowError> {
        let id_key = normalize_key(&columns.id);
        let name_key = normalize_key(&columns.name);

        let id = row.get(&id_key);
        let name = row.get(&name_key);

        let (id, name) = match (id, name) {
            (Some(id), Some(name)) => (id, name),
            _ => {
                let mut missing = Vec::new();
                if id.is_none() {
                    missing.push(id_key);
                }
                if name.is_none() {
                    missing.push(name_key);
                }
                return Err(RowError::MissingColumn { columns: missing });
            }
        };

        Ok(Self {
            vid: parse_vlan_id(id)?,
            name: name.to_string(),
        })
    }
}

fn parse_vlan_id(value: &str) -> Result<i32, RowError> {
    let parsed: i64 = value.parse().map_err(|_| RowError::InvalidId {
        value: value.to_string(),
        reason: "not an integer".to_string(),
    })?;

    if !(VLAN_ID_MIN..=VLAN_ID_MAX).contains(&parsed) {
        return Err(RowError::InvalidId {
            value: value.to_string(),
            reason: format!("must be between {} and {}", VLAN_ID_MIN, VLAN_ID_MAX),
        });
    }

    // Range-checked above, fits in i32
    Ok(parsed as i32)
}

/// Lazy, single-pass sequence of data rows with 1-based indexes.
///
/// Opening validates the header row against the column map; iteration
/// yields one normalized row per CSV record, or `Malformed` for a record
/// that is not valid UTF-8.
pub struct CsvRows<R: std::io::Read> {
    headers: Vec<String>,
    records: csv::StringRecordsIntoIter<R>,
    index: usize,
}

impl<R: std::io::Read> CsvRows<R> {
    pub fn open(input: R, columns: &ColumnMap) -> Result<Self, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ImportError::Decode {
                location: "CSV header".to_string(),
                message: e.to_string(),
            })?
            .iter()
            .map(normalize_key)
            .collect();

        let missing: Vec<String> = [normalize_key(&columns.id), normalize_key(&columns.name)]
            .into_iter()
            .filter(|key| !headers.contains(key))
            .collect();

        if !missing.is_empty() {
            return Err(ImportError::Schema {
                missing,
                detected: headers,
            });
        }

        Ok(Self {
            headers,
            records: reader.into_records(),
            index: 0,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl<R: std::io::Read> Iterator for CsvRows<R> {
    type Item = (usize, Result<NormalizedRow, RowError>);

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        self.index += 1;
        let row = record
            .map(|r| NormalizedRow::from_record(&self.headers, &r))
            .map_err(|e| RowError::Malformed { message: e.to_string() });
        Some((self.index, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ColumnMap {
        ColumnMap::default()
    }

    fn rows(text: &str) -> Vec<(usize, Result<NormalizedRow, RowError>)> {
        CsvRows::open(text.as_bytes(), &columns()).unwrap().collect()
    }

    #[test]
    fn test_headers_are_normalized() {
        let rows = CsvRows::open(" VLAN_ID , Vlan_Name ,Notes\n".as_bytes(), &columns()).unwrap();
        assert_eq!(rows.headers(), ["vlan_id", "vlan_name", "notes"]);
    }

    #[test]
    fn test_configured_columns_are_normalized() {
        let map = ColumnMap::new(" VLAN_ID", "Name ");
        assert!(CsvRows::open("vlan_id,name\n".as_bytes(), &map).is_ok());
    }

    #[test]
    fn test_schema_error_lists_missing_and_detected() {
        let err = CsvRows::open("vid,name\n1,a\n".as_bytes(), &columns()).err().unwrap();
        match err {
            ImportError::Schema { missing, detected } => {
                assert_eq!(missing, vec!["vlan_id", "vlan_name"]);
                assert_eq!(detected, vec!["vid", "name"]);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_document_is_schema_error() {
        let err = CsvRows::open("".as_bytes(), &columns()).err().unwrap();
        assert!(matches!(err, ImportError::Schema { ref missing, .. } if missing.len() == 2));
    }

    #[test]
    fn test_rows_drop_empty_values() {
        let rows = rows("vlan_id,vlan_name,notes\n 100 ,  Guest  ,\n");
        let (index, row) = &rows[0];
        let row = row.as_ref().unwrap();
        assert_eq!(*index, 1);
        assert_eq!(row.get("vlan_id"), Some("100"));
        assert_eq!(row.get("vlan_name"), Some("Guest"));
        assert_eq!(row.get("notes"), None);
    }

    #[test]
    fn test_short_and_long_records() {
        let rows = rows("vlan_id,vlan_name\n100\n200,Voice,extra\n");
        assert_eq!(rows.len(), 2);
        let short = rows[0].1.as_ref().unwrap();
        assert_eq!(short.get("vlan_name"), None);
        let long = rows[1].1.as_ref().unwrap();
        assert_eq!(long.get("vlan_name"), Some("Voice"));
    }

    #[test]
    fn test_fields_from_row() {
        let rows = rows("vlan_id,vlan_name\n+42,Mgmt\n");
        let fields = VlanFields::from_row(rows[0].1.as_ref().unwrap(), &columns()).unwrap();
        assert_eq!(fields, VlanFields { vid: 42, name: "Mgmt".to_string() });
    }

    #[test]
    fn test_missing_name_column() {
        let rows = rows("vlan_id,vlan_name\n100,   \n");
        let err = VlanFields::from_row(rows[0].1.as_ref().unwrap(), &columns()).unwrap_err();
        assert_eq!(err, RowError::MissingColumn { columns: vec!["vlan_name".to_string()] });
    }

    #[test]
    fn test_invalid_ids() {
        for bad in ["abc", "10.5", "0", "4095", "-3"] {
            let text = format!("vlan_id,vlan_name\n{},X\n", bad);
            let rows = rows(&text);
            let err = VlanFields::from_row(rows[0].1.as_ref().unwrap(), &columns()).unwrap_err();
            assert!(matches!(err, RowError::InvalidId { ref value, .. } if value == bad), "{}", bad);
        }
    }

    #[test]
    fn test_row_error_messages() {
        let err = RowError::InvalidId { value: "abc".to_string(), reason: "not an integer".to_string() };
        assert_eq!(err.to_string(), "invalid VLAN ID value 'abc': not an integer");
        let err = RowError::MissingColumn { columns: vec!["vlan_id".to_string()] };
        assert_eq!(err.to_string(), "missing expected column(s): vlan_id");
    }
}
