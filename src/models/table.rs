//! Flat tabular view over nested JSON records.
//!
//! Nested objects are flattened into dotted column names
//! (`adresseEtablissement.codePostalEtablissement`). Arrays and scalars are
//! leaf values. The column set is the union over all records, in order of
//! first appearance; a row lacking a column holds `None`.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Row/column table built from JSON records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Value>>>,
}

impl Table {
    /// An empty table with no columns and no rows
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten records into a table, one row per record.
    ///
    /// Non-object records land in a single column named `value`.
    pub fn from_records(records: &[Value]) -> Self {
        if records.is_empty() {
            return Self::new();
        }

        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut flattened = Vec::with_capacity(records.len());

        for record in records {
            let mut cells = Vec::new();
            match record {
                Value::Object(map) => flatten_into(map, "", &mut cells),
                other => cells.push(("value".to_string(), other.clone())),
            }
            for (key, _) in &cells {
                if !index.contains_key(key) {
                    index.insert(key.clone(), columns.len());
                    columns.push(key.clone());
                }
            }
            flattened.push(cells);
        }

        let rows = flattened
            .into_iter()
            .map(|cells| {
                let mut row = vec![None; columns.len()];
                for (key, value) in cells {
                    row[index[&key]] = Some(value);
                }
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<Value>>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of a column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<Option<&Value>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_ref()).collect())
    }

    /// One cell; `None` when the row or column does not exist or the cell is missing
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_ref()
    }

    /// Rows as flat JSON objects, missing cells omitted
    pub fn to_json_rows(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .filter_map(|(name, cell)| cell.clone().map(|v| (name.clone(), v)))
                    .collect();
                Value::Object(object)
            })
            .collect()
    }
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, out: &mut Vec<(String, Value)>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(nested) => flatten_into(nested, &path, out),
            leaf => out.push((path, leaf.clone())),
        }
    }
}

/// Render a cell for text output; missing cells and nulls render empty
pub fn cell_text(cell: Option<&Value>) -> String {
    match cell {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
