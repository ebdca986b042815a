use crate::constants::is_null_marker;
use crate::dataset::{Column, Dataset, Value};
use crate::error::{EtlError, Result};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

/// Parse a CSV file from disk into a dataset
pub fn read_csv_path(path: &Path) -> Result<Dataset> {
    let file = File::open(path)?;
    read_csv(file)
}

/// Parse delimited text. The first record is the header; cells and header
/// names are trimmed, null markers become `Value::Null`, and each column's
/// type is inferred from its non-null cells. Short records are padded with
/// nulls; records longer than the header are rejected.
pub fn read_csv<R: io::Read>(reader: R) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(EtlError::Parse("No columns to parse from file".to_string()));
    }
    let names = dedupe_header(headers.iter());

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for record in rdr.records() {
        let record = record?;
        if record.len() > names.len() {
            let line = record.position().map_or(0, |p| p.line());
            return Err(EtlError::Parse(format!(
                "Expected {} fields in line {}, saw {}",
                names.len(),
                line,
                record.len()
            )));
        }
        for (i, cells) in raw.iter_mut().enumerate() {
            // missing trailing fields read as empty, i.e. null
            cells.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let columns = names
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_values(cells)))
        .collect();
    Dataset::new(columns)
}

/// Repeated header names get `.1`, `.2`, ... suffixes
fn dedupe_header<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for header in headers {
        let mut name = header.to_string();
        let mut n = 0;
        while !seen.insert(name.clone()) {
            n += 1;
            name = format!("{}.{}", header, n);
        }
        names.push(name);
    }
    names
}

fn infer_values(cells: Vec<String>) -> Vec<Value> {
    let present = || cells.iter().filter(|c| !is_null_marker(c));

    if present().all(|c| c.parse::<i64>().is_ok()) {
        return cells
            .iter()
            .map(|c| match c.parse::<i64>() {
                Ok(v) if !is_null_marker(c) => Value::Int(v),
                _ => Value::Null,
            })
            .collect();
    }

    if present().all(|c| c.parse::<f64>().is_ok()) {
        return cells
            .iter()
            .map(|c| match c.parse::<f64>() {
                Ok(v) if !is_null_marker(c) => Value::Float(v),
                _ => Value::Null,
            })
            .collect();
    }

    cells
        .into_iter()
        .map(|c| if is_null_marker(&c) { Value::Null } else { Value::Text(c) })
        .collect()
}

/// Write a dataset as CSV with a header row and no index column
pub fn write_csv<W: io::Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    if dataset.width() > 0 {
        wtr.write_record(dataset.column_names())?;
    }
    for i in 0..dataset.height() {
        let row = dataset.row(i).unwrap_or_default();
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_path(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_csv(dataset, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_trims_and_infers() {
        let ds = read_csv("name,Amount \n Alice,10\nBob,\n,20".as_bytes()).unwrap();
        assert_eq!(ds.column_names(), vec!["name", "Amount"]);
        assert_eq!(
            ds.column("name").unwrap().values(),
            &[Value::text("Alice"), Value::text("Bob"), Value::Null]
        );
        assert_eq!(
            ds.column("Amount").unwrap().values(),
            &[Value::Int(10), Value::Null, Value::Int(20)]
        );
    }

    #[test]
    fn test_float_and_null_markers() {
        let ds = read_csv("price,note\n1.5,NA\n2,n/a\nnull,ok\n".as_bytes()).unwrap();
        assert_eq!(
            ds.column("price").unwrap().values(),
            &[Value::Float(1.5), Value::Float(2.0), Value::Null]
        );
        assert_eq!(
            ds.column("note").unwrap().values(),
            &[Value::Null, Value::Null, Value::text("ok")]
        );
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let ds = read_csv("code\n1\nA2\n".as_bytes()).unwrap();
        assert_eq!(
            ds.column("code").unwrap().values(),
            &[Value::text("1"), Value::text("A2")]
        );
    }

    #[test]
    fn test_duplicate_headers_get_suffix() {
        let ds = read_csv("a,a,b,a\n1,2,3,4\n".as_bytes()).unwrap();
        assert_eq!(ds.column_names(), vec!["a", "a.1", "b", "a.2"]);
    }

    #[test]
    fn test_empty_body_is_parse_error() {
        let err = read_csv("".as_bytes()).unwrap_err();
        assert!(matches!(err, EtlError::Parse(_)));
    }

    #[test]
    fn test_short_rows_are_padded_with_nulls() {
        let ds = read_csv("region,units,amount\nnorth,4,10\nsouth,2\n".as_bytes()).unwrap();
        assert_eq!(ds.shape(), (2, 3));
        assert_eq!(
            ds.column("units").unwrap().values(),
            &[Value::Int(4), Value::Int(2)]
        );
        assert_eq!(
            ds.column("amount").unwrap().values(),
            &[Value::Int(10), Value::Null]
        );
    }

    #[test]
    fn test_long_rows_are_parse_error() {
        let err = read_csv("a,b\n1,2\n3,4,5\n".as_bytes()).unwrap_err();
        match err {
            EtlError::Parse(msg) => assert!(msg.contains("Expected 2 fields in line 3, saw 3"), "{}", msg),
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_write_renders_nulls_empty() {
        let ds = Dataset::new(vec![
            Column::new("id", vec![Value::Int(1), Value::Int(2)]),
            Column::new("score", vec![Value::Float(3.0), Value::Null]),
            Column::new("label", vec![Value::text("a,b"), Value::text("c")]),
        ])
        .unwrap();

        let mut buf = Vec::new();
        write_csv(&ds, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "id,score,label\n1,3.0,\"a,b\"\n2,,c\n");
    }
}
