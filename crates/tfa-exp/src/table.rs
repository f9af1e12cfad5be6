use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tfa_core::errors::{ErrorInfo, TfaError};

fn data_error(code: &str, message: impl Into<String>) -> TfaError {
    TfaError::Data(ErrorInfo::new(code, message))
}

fn default_delimiter() -> char {
    ','
}

fn default_comment() -> Option<char> {
    Some('#')
}

/// On-disk layout of an event file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableFormat {
    /// Fields separated by runs of spaces or tabs.
    #[default]
    Whitespace,
    /// Fields separated by a single delimiter character.
    Delimited {
        /// Field delimiter (ASCII).
        #[serde(default = "default_delimiter")]
        delimiter: char,
        /// Whether the first record holds the column names.
        #[serde(default)]
        has_header: bool,
    },
    /// A JSON object mapping column names to equally long numeric arrays.
    ///
    /// `columns` selects the arrays to read; when empty every key is read.
    JsonColumns,
}

/// Description of one or more event files sharing a column layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Files or glob patterns, relative to the configuration directory.
    pub paths: Vec<PathBuf>,
    /// Field layout.
    #[serde(default)]
    pub format: TableFormat,
    /// Column names; when empty they are read from the file header.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Lines starting with this character are ignored.
    #[serde(default = "default_comment")]
    pub comment: Option<char>,
}

impl TableSpec {
    /// Whitespace separated files with the given column names.
    pub fn whitespace<P: Into<PathBuf>>(paths: Vec<P>, columns: &[&str]) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            format: TableFormat::Whitespace,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            comment: default_comment(),
        }
    }
}

/// Numeric event records with named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EventTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl EventTable {
    /// Builds a table, checking every row against the column count.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, TfaError> {
        if let Some(index) = rows.iter().position(|row| row.len() != columns.len()) {
            return Err(TfaError::Data(
                ErrorInfo::new("row-width", "row width does not match the column count")
                    .with_context("row", index)
                    .with_context("columns", columns.len())
                    .with_context("found", rows[index].len()),
            ));
        }
        Ok(Self { columns, rows })
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Records in file order.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the named column.
    pub fn column_index(&self, name: &str) -> Result<usize, TfaError> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| {
                TfaError::Data(
                    ErrorInfo::new("unknown-column", format!("no column named '{name}'"))
                        .with_context("available", self.columns.join(",")),
                )
            })
    }

    /// Copy of the named column.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, TfaError> {
        let index = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| row[index]).collect())
    }

    /// Records whose `column` value lies in `[lo, hi)`.
    pub fn filter_range(&self, column: &str, lo: f64, hi: f64) -> Result<Self, TfaError> {
        let index = self.column_index(column)?;
        let rows = self
            .rows
            .iter()
            .filter(|row| row[index] >= lo && row[index] < hi)
            .cloned()
            .collect();
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Records at the given positions, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&idx| self.rows[idx].clone()).collect(),
        }
    }

    /// Appends the records of `other`, which must share the column layout.
    pub fn extend(&mut self, other: EventTable) -> Result<(), TfaError> {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return Ok(());
        }
        if self.columns != other.columns {
            return Err(TfaError::Data(
                ErrorInfo::new("column-mismatch", "tables have different column layouts")
                    .with_context("left", self.columns.join(","))
                    .with_context("right", other.columns.join(",")),
            ));
        }
        self.rows.extend(other.rows);
        Ok(())
    }
}

/// Expands the table paths (globs allowed) against `base_dir`; glob matches are sorted.
pub fn resolve_paths(spec: &TableSpec, base_dir: &Path) -> Result<Vec<PathBuf>, TfaError> {
    let mut resolved = Vec::new();
    for path in &spec.paths {
        let full = if path.is_absolute() {
            path.clone()
        } else {
            base_dir.join(path)
        };
        let pattern = full.to_string_lossy().to_string();
        if pattern.contains(['*', '?', '[']) {
            let entries = glob::glob(&pattern)
                .map_err(|err| data_error("glob-pattern", err.to_string()))?;
            let mut matched = Vec::new();
            for entry in entries {
                matched.push(entry.map_err(|err| data_error("glob-entry", err.to_string()))?);
            }
            if matched.is_empty() {
                return Err(TfaError::Data(
                    ErrorInfo::new("no-matching-files", "glob pattern matched no files")
                        .with_context("pattern", pattern),
                ));
            }
            matched.sort();
            resolved.extend(matched);
        } else {
            resolved.push(full);
        }
    }
    if resolved.is_empty() {
        return Err(data_error("no-paths", "table spec lists no files"));
    }
    Ok(resolved)
}

/// Loads and concatenates every file the table lists.
pub fn load_table(spec: &TableSpec, base_dir: &Path) -> Result<EventTable, TfaError> {
    let mut table = EventTable::default();
    for path in resolve_paths(spec, base_dir)? {
        let part = match &spec.format {
            TableFormat::Whitespace => read_whitespace(&path, spec)?,
            TableFormat::Delimited {
                delimiter,
                has_header,
            } => read_delimited(&path, spec, *delimiter, *has_header)?,
            TableFormat::JsonColumns => read_json_columns(&path, spec)?,
        };
        table.extend(part)?;
    }
    Ok(table)
}

fn file_info(code: &str, err: impl ToString, path: &Path) -> ErrorInfo {
    ErrorInfo::new(code, err.to_string()).with_context("file", path.display())
}

fn parse_field(raw: &str, path: &Path, line: u64, column: usize) -> Result<f64, TfaError> {
    raw.trim().parse::<f64>().map_err(|_| {
        TfaError::Data(
            ErrorInfo::new("parse-float", format!("cannot parse '{raw}' as a number"))
                .with_context("file", path.display())
                .with_context("line", line)
                .with_context("column", column),
        )
    })
}

fn width_error(path: &Path, line: u64, expected: usize, found: usize) -> TfaError {
    TfaError::Data(
        ErrorInfo::new("row-width", "record width does not match the column count")
            .with_context("file", path.display())
            .with_context("line", line)
            .with_context("expected", expected)
            .with_context("found", found),
    )
}

fn read_whitespace(path: &Path, spec: &TableSpec) -> Result<EventTable, TfaError> {
    let text = fs::read_to_string(path)
        .map_err(|err| TfaError::Io(file_info("table-read", err, path)))?;
    let mut columns = spec.columns.clone();
    let mut rows = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_no = index as u64 + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || spec.comment.is_some_and(|c| trimmed.starts_with(c)) {
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if columns.is_empty() {
            columns = fields.iter().map(|f| f.to_string()).collect();
            continue;
        }
        if fields.len() != columns.len() {
            return Err(width_error(path, line_no, columns.len(), fields.len()));
        }
        let row = fields
            .iter()
            .enumerate()
            .map(|(col, raw)| parse_field(raw, path, line_no, col))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    EventTable::new(columns, rows)
}

fn read_delimited(
    path: &Path,
    spec: &TableSpec,
    delimiter: char,
    has_header: bool,
) -> Result<EventTable, TfaError> {
    if !delimiter.is_ascii() {
        return Err(TfaError::Config(
            ErrorInfo::new("delimiter", "delimiter must be an ASCII character")
                .with_context("delimiter", delimiter),
        ));
    }
    if spec.columns.is_empty() && !has_header {
        return Err(TfaError::Config(
            ErrorInfo::new("missing-columns", "headerless files need explicit column names")
                .with_context("file", path.display()),
        ));
    }
    let comment = spec.comment.filter(char::is_ascii).map(|c| c as u8);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(has_header)
        .comment(comment)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|err| TfaError::Io(file_info("table-open", err, path)))?;

    let columns = if spec.columns.is_empty() {
        let header = reader
            .headers()
            .map_err(|err| data_error("table-header", err.to_string()))?;
        header.iter().map(|name| name.to_string()).collect()
    } else {
        spec.columns.clone()
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| TfaError::Data(file_info("table-record", err, path)))?;
        let line_no = record.position().map(|pos| pos.line()).unwrap_or(0);
        if record.len() != columns.len() {
            return Err(width_error(path, line_no, columns.len(), record.len()));
        }
        let row = record
            .iter()
            .enumerate()
            .map(|(col, raw)| parse_field(raw, path, line_no, col))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    EventTable::new(columns, rows)
}

fn read_json_columns(path: &Path, spec: &TableSpec) -> Result<EventTable, TfaError> {
    let bytes = fs::read(path).map_err(|err| TfaError::Io(file_info("table-read", err, path)))?;
    let object: BTreeMap<String, Value> = serde_json::from_slice(&bytes)
        .map_err(|err| TfaError::Data(file_info("json-table", err, path)))?;
    let columns: Vec<String> = if spec.columns.is_empty() {
        object.keys().cloned().collect()
    } else {
        spec.columns.clone()
    };

    let available: Vec<&str> = object.keys().map(String::as_str).collect();
    let mut data: Vec<Vec<f64>> = Vec::with_capacity(columns.len());
    for name in &columns {
        let array = object
            .get(name)
            .ok_or_else(|| {
                TfaError::Data(
                    file_info("unknown-column", format!("no array named '{name}'"), path)
                        .with_context("available", available.join(",")),
                )
            })?
            .as_array()
            .ok_or_else(|| {
                TfaError::Data(
                    file_info("json-column", "column is not an array", path)
                        .with_context("column", name),
                )
            })?;
        let values = array
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_f64().ok_or_else(|| {
                    TfaError::Data(
                        file_info("parse-float", format!("'{item}' is not a number"), path)
                            .with_context("column", name)
                            .with_context("index", index),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        data.push(values);
    }

    let len = data.first().map(Vec::len).unwrap_or(0);
    if let Some((name, values)) = columns.iter().zip(&data).find(|(_, v)| v.len() != len) {
        return Err(TfaError::Data(
            file_info("column-length", "JSON columns differ in length", path)
                .with_context("column", name)
                .with_context("expected", len)
                .with_context("found", values.len()),
        ));
    }
    let rows = (0..len)
        .map(|row| data.iter().map(|values| values[row]).collect())
        .collect();
    EventTable::new(columns, rows)
}
