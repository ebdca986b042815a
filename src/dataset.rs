use crate::constants::TIMESTAMP_TEXT_FORMAT;
use crate::error::{EtlError, Result};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::fmt;

/// A single cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    /// Hashable identity used for duplicate detection. Nulls match nulls.
    pub(crate) fn key(&self) -> CellKey<'_> {
        match self {
            Value::Null => CellKey::Null,
            Value::Int(v) => CellKey::Int(*v),
            Value::Float(v) if v.is_nan() => CellKey::Float(f64::NAN.to_bits()),
            // -0.0 == 0.0
            Value::Float(v) if *v == 0.0 => CellKey::Float(0f64.to_bits()),
            Value::Float(v) => CellKey::Float(v.to_bits()),
            Value::Text(s) => CellKey::Text(s),
            Value::Timestamp(ts) => CellKey::Timestamp(*ts),
        }
    }
}

impl fmt::Display for Value {
    /// Text rendering used by the CSV writer; nulls render empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(v) => write!(f, "{}", v),
            // Keep a decimal so the column reads back as floating point
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_TEXT_FORMAT)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum CellKey<'a> {
    Null,
    Int(i64),
    Float(u64),
    Text(&'a str),
    Timestamp(NaiveDateTime),
}

/// What a column holds, judged from its non-null cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Timestamp,
    Text,
    /// No non-null cells at all
    Empty,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    pub fn is_categorical(self) -> bool {
        matches!(self, ColumnKind::Text | ColumnKind::Empty)
    }
}

/// Classify a column.
///
/// - all non-null cells `Int` -> `Integer`
/// - all numeric with at least one `Float` -> `Float`
/// - all `Timestamp` -> `Timestamp`
/// - anything else, including numbers mixed with text -> `Text`
/// - no non-null cells -> `Empty`
pub fn classify(values: &[Value]) -> ColumnKind {
    let mut kind = ColumnKind::Empty;
    for value in values {
        let cell = match value {
            Value::Null => continue,
            Value::Int(_) => ColumnKind::Integer,
            Value::Float(_) => ColumnKind::Float,
            Value::Timestamp(_) => ColumnKind::Timestamp,
            Value::Text(_) => return ColumnKind::Text,
        };
        kind = match (kind, cell) {
            (ColumnKind::Empty, cell) => cell,
            (a, b) if a == b => a,
            (ColumnKind::Integer, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Integer) => {
                ColumnKind::Float
            }
            _ => return ColumnKind::Text,
        };
    }
    kind
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self { name: name.into(), values }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut Vec<Value> {
        &mut self.values
    }

    pub fn kind(&self) -> ColumnKind {
        classify(&self.values)
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered, named, equal-length columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    height: usize,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let height = columns.first().map_or(0, Column::len);
        {
            let mut seen: HashSet<&str> = HashSet::new();
            for column in columns.iter() {
                if column.len() != height {
                    return Err(EtlError::Validation(format!(
                        "column '{}' has {} rows, expected {}",
                        column.name(),
                        column.len(),
                        height
                    )));
                }
                if !seen.insert(column.name()) {
                    return Err(EtlError::Validation(format!(
                        "duplicate column name '{}'",
                        column.name()
                    )));
                }
            }
        }
        Ok(Self { columns, height })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.columns.len())
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.height {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.values[index]).collect())
    }

    /// Append a column, replacing any existing column of the same name in place.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if !self.columns.is_empty() && column.len() != self.height {
            return Err(EtlError::Validation(format!(
                "column '{}' has {} rows, expected {}",
                column.name(),
                column.len(),
                self.height
            )));
        }
        if self.columns.is_empty() {
            self.height = column.len();
        }
        match self.columns.iter_mut().find(|c| c.name() == column.name()) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Rename every column through `f`
    pub fn rename_columns(&mut self, f: impl Fn(&str) -> String) {
        for column in &mut self.columns {
            column.name = f(&column.name);
        }
    }

    /// Keep only the rows whose index passes `keep`
    pub fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.values.retain(|_| *flags.next().unwrap_or(&true));
        }
        self.height = self.columns.first().map_or(0, Column::len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(&[Value::Int(1), Value::Null]), ColumnKind::Integer);
        assert_eq!(classify(&[Value::Int(1), Value::Float(2.5)]), ColumnKind::Float);
        assert_eq!(classify(&[Value::text("a"), Value::Null]), ColumnKind::Text);
        assert_eq!(classify(&[Value::Null, Value::Null]), ColumnKind::Empty);
        assert_eq!(classify(&[]), ColumnKind::Empty);
    }

    #[test]
    fn test_classify_mixed_is_text() {
        assert_eq!(classify(&[Value::Int(1), Value::text("x")]), ColumnKind::Text);
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(classify(&[Value::Timestamp(ts)]), ColumnKind::Timestamp);
        assert_eq!(classify(&[Value::Timestamp(ts), Value::Int(3)]), ColumnKind::Text);
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let err = Dataset::new(vec![
            Column::new("a", vec![Value::Int(1)]),
            Column::new("b", vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, EtlError::Validation(_)));
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let err = Dataset::new(vec![
            Column::new("a", vec![Value::Int(1)]),
            Column::new("a", vec![Value::Int(2)]),
        ])
        .unwrap_err();
        assert!(matches!(err, EtlError::Validation(_)));
    }

    #[test]
    fn test_retain_rows() {
        let mut ds = Dataset::new(vec![
            Column::new("a", vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            Column::new("b", vec![Value::text("x"), Value::text("y"), Value::text("z")]),
        ])
        .unwrap();
        ds.retain_rows(&[true, false, true]);
        assert_eq!(ds.shape(), (2, 2));
        assert_eq!(ds.row(1).unwrap(), vec![&Value::Int(3), &Value::text("z")]);
    }

    #[test]
    fn test_float_display_keeps_decimal() {
        assert_eq!(Value::Float(15.0).to_string(), "15.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "");
    }
}
