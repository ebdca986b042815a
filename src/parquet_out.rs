use crate::dataset::{Column, ColumnKind, Dataset, Value};
use crate::error::{EtlError, Result};
use chrono::{DateTime, NaiveDateTime};
use parquet::basic::{Compression, LogicalType, Repetition, Type as PhysicalType, ZstdLevel};
use parquet::data_type::{ByteArray, ByteArrayType, DoubleType, Int64Type};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::writer::SerializedFileWriter;
use parquet::format::{MicroSeconds, TimeUnit};
use parquet::record::Field;
use parquet::schema::types::{Type, TypePtr};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

// One optional primitive per column: Integer -> INT64, Float -> DOUBLE,
// Timestamp -> INT64 TIMESTAMP(MICROS), Text/Empty -> UTF8 BYTE_ARRAY
fn build_schema(dataset: &Dataset) -> Result<TypePtr> {
    let mut fields = Vec::with_capacity(dataset.width());
    for column in dataset.columns() {
        let builder = match column.kind() {
            ColumnKind::Integer => Type::primitive_type_builder(column.name(), PhysicalType::INT64),
            ColumnKind::Float => Type::primitive_type_builder(column.name(), PhysicalType::DOUBLE),
            ColumnKind::Timestamp => Type::primitive_type_builder(column.name(), PhysicalType::INT64)
                .with_logical_type(Some(LogicalType::Timestamp {
                    is_adjusted_to_u_t_c: false,
                    unit: TimeUnit::MICROS(MicroSeconds {}),
                })),
            ColumnKind::Text | ColumnKind::Empty => {
                Type::primitive_type_builder(column.name(), PhysicalType::BYTE_ARRAY)
                    .with_logical_type(Some(LogicalType::String))
            }
        };
        fields.push(Arc::new(builder.with_repetition(Repetition::OPTIONAL).build()?));
    }
    Ok(Arc::new(Type::group_type_builder("schema").with_fields(fields).build()?))
}

fn definition_levels(column: &Column) -> Vec<i16> {
    column.values().iter().map(|v| if v.is_null() { 0 } else { 1 }).collect()
}

/// Write the dataset as a single-row-group Parquet file, no index column
pub fn write_parquet(dataset: &Dataset, path: &Path) -> Result<()> {
    if dataset.width() == 0 {
        return Err(EtlError::Validation("cannot write a dataset with no columns".to_string()));
    }

    let schema = build_schema(dataset)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::default()))
        .build();

    let file = File::create(path)?;
    let mut writer = SerializedFileWriter::new(file, schema, Arc::new(props))?;
    {
        let mut rg = writer.next_row_group()?;
        let mut columns = dataset.columns().iter();
        while let Some(mut col_writer) = rg.next_column()? {
            let column = columns
                .next()
                .ok_or_else(|| EtlError::Validation("schema mismatch while writing parquet".to_string()))?;
            let def_levels = definition_levels(column);

            match column.kind() {
                ColumnKind::Integer => {
                    let vals: Vec<i64> = column
                        .values()
                        .iter()
                        .filter_map(|v| match v {
                            Value::Int(i) => Some(*i),
                            _ => None,
                        })
                        .collect();
                    col_writer.typed::<Int64Type>().write_batch(&vals, Some(&def_levels), None)?;
                }
                ColumnKind::Float => {
                    let vals: Vec<f64> = column.values().iter().filter_map(Value::as_f64).collect();
                    col_writer.typed::<DoubleType>().write_batch(&vals, Some(&def_levels), None)?;
                }
                ColumnKind::Timestamp => {
                    let vals: Vec<i64> = column
                        .values()
                        .iter()
                        .filter_map(|v| match v {
                            Value::Timestamp(ts) => Some(ts.and_utc().timestamp_micros()),
                            _ => None,
                        })
                        .collect();
                    col_writer.typed::<Int64Type>().write_batch(&vals, Some(&def_levels), None)?;
                }
                ColumnKind::Text | ColumnKind::Empty => {
                    let vals: Vec<ByteArray> = column
                        .values()
                        .iter()
                        .filter(|v| !v.is_null())
                        .map(|v| ByteArray::from(v.to_string().as_str()))
                        .collect();
                    col_writer.typed::<ByteArrayType>().write_batch(&vals, Some(&def_levels), None)?;
                }
            }
            col_writer.close()?;
        }
        rg.close()?;
    }
    writer.close()?;
    Ok(())
}

/// Read back a file written by [`write_parquet`]
pub fn read_parquet(path: &Path) -> Result<Dataset> {
    let reader = SerializedFileReader::new(File::open(path)?)?;

    let descr = reader.metadata().file_metadata().schema_descr_ptr();
    let mut columns: Vec<Column> = Vec::with_capacity(descr.num_columns());
    let mut is_timestamp: Vec<bool> = Vec::with_capacity(descr.num_columns());
    for c in descr.columns() {
        columns.push(Column::new(c.name(), Vec::new()));
        is_timestamp.push(matches!(c.logical_type(), Some(LogicalType::Timestamp { .. })));
    }

    for row in reader.get_row_iter(None)? {
        let row = row?;
        for ((column, ts), (_, field)) in columns
            .iter_mut()
            .zip(&is_timestamp)
            .zip(row.get_column_iter())
        {
            column.values_mut().push(field_to_value(field, *ts)?);
        }
    }
    Dataset::new(columns)
}

fn field_to_value(field: &Field, is_timestamp: bool) -> Result<Value> {
    Ok(match field {
        Field::Null => Value::Null,
        // Some readers hand non-UTC timestamps back as plain longs
        Field::Long(us) if is_timestamp => Value::Timestamp(micros_to_naive(*us)?),
        Field::Long(v) => Value::Int(*v),
        Field::Int(v) => Value::Int(i64::from(*v)),
        Field::Double(v) => Value::Float(*v),
        Field::Float(v) => Value::Float(f64::from(*v)),
        Field::Str(s) => Value::Text(s.clone()),
        Field::TimestampMicros(us) => Value::Timestamp(micros_to_naive(*us)?),
        Field::TimestampMillis(ms) => Value::Timestamp(micros_to_naive(ms.saturating_mul(1000))?),
        other => {
            return Err(EtlError::Parse(format!("unsupported parquet field: {}", other)));
        }
    })
}

fn micros_to_naive(us: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_micros(us)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| EtlError::Parse(format!("timestamp out of range: {}", us)))
}
