use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int16Array, Int32Array,
    Int64Array, Int8Array, StringArray, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, SurveyDataset};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a survey table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with column names, one respondent per row
/// * `.json`    – `[{ "Q1": "High-10", "Q2": 7, ... }, ...]`
/// * `.parquet` – strings, integers, floats and booleans load as such; other
///   scalar types (dictionary, date, decimal, ...) load as text or floats
pub fn load_file(path: &Path) -> Result<SurveyDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    info!(
        "Loaded {} responses with {} columns from {}",
        dataset.len(),
        dataset.column_names.len(),
        path.display()
    );
    Ok(dataset)
}

fn check_unique_columns(columns: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for col in columns {
        if !seen.insert(col.as_str()) {
            bail!("Duplicate column name '{col}'");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every other row one respondent.
/// Fields are kept as text (empty → missing) so columns that are not analyzed
/// are written back exactly as read.
fn load_csv(path: &Path) -> Result<SurveyDataset> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    read_csv(reader)
}

#[cfg(test)]
fn parse_csv(text: &str) -> Result<SurveyDataset> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<SurveyDataset> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    check_unique_columns(&headers)?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > headers.len() {
            bail!(
                "CSV row {row_no}: {} fields but only {} columns",
                record.len(),
                headers.len()
            );
        }
        rows.push(record.iter().map(CellValue::from_field).collect());
    }

    Ok(SurveyDataset::new(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Respondent": "r1", "Satisfaction": "High-10", "Recommend": 8 },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen key order; keys absent from a record are
/// missing cells.
fn load_json(path: &Path) -> Result<SurveyDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

/// Parse JSON records already held in memory.
pub fn parse_json(text: &str) -> Result<SurveyDataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map_or(CellValue::Null, json_to_cell))
                .collect()
        })
        .collect();

    Ok(SurveyDataset::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Structured(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with a flat schema. Column order follows the schema.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<SurveyDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    check_unique_columns(&columns)?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let prepared = batch
            .columns()
            .iter()
            .map(prepare_column)
            .collect::<Result<Vec<_>>>()?;
        for row in 0..batch.num_rows() {
            let cells = prepared
                .iter()
                .map(|(col, structured)| extract_cell_value(col, *structured, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            rows.push(cells);
        }
    }

    Ok(SurveyDataset::new(columns, rows))
}

// -- Parquet / Arrow helpers --

fn downcast<'a, T: 'static>(col: &'a ArrayRef) -> Result<&'a T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("column data does not match type {:?}", col.data_type()))
}

/// Bring a batch column to a type [`extract_cell_value`] reads directly.
///
/// Dictionary and view encodings are unpacked, decimals and half floats
/// become `Float64`, other scalars are cast (or formatted) to text. The flag
/// marks nested columns (lists, structs, maps), rendered to text and kept as
/// `Structured`.
fn prepare_column(col: &ArrayRef) -> Result<(ArrayRef, bool)> {
    let prepared = match col.data_type() {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Boolean
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => (col.clone(), false),
        DataType::Dictionary(_, value_type) => {
            let values = cast(col, value_type).context("decoding dictionary column")?;
            return prepare_column(&values);
        }
        DataType::Float16 | DataType::Decimal128(..) | DataType::Decimal256(..) => {
            let floats = cast(col, &DataType::Float64)
                .with_context(|| format!("casting {:?} column to Float64", col.data_type()))?;
            (floats, false)
        }
        DataType::List(_)
        | DataType::LargeList(_)
        | DataType::FixedSizeList(..)
        | DataType::Struct(_)
        | DataType::Map(..)
        | DataType::Union(..) => (format_column(col)?, true),
        _ => match cast(col, &DataType::Utf8) {
            Ok(text) => (text, false),
            Err(_) => (format_column(col)?, false),
        },
    };
    Ok(prepared)
}

/// Render every value of a column with Arrow's display formatting.
fn format_column(col: &ArrayRef) -> Result<ArrayRef> {
    let formatter = ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default())
        .with_context(|| format!("formatting {:?} column", col.data_type()))?;
    let values = (0..col.len())
        .map(|i| {
            if col.is_null(i) {
                Ok(None)
            } else {
                formatter.value(i).try_to_string().map(Some)
            }
        })
        .collect::<Result<StringArray, ArrowError>>()
        .context("formatting column values")?;
    Ok(Arc::new(values))
}

/// Extract a single cell from a prepared Arrow column at a given row.
fn extract_cell_value(col: &ArrayRef, structured: bool, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    if structured {
        let text = downcast::<StringArray>(col)?.value(row).to_string();
        return Ok(CellValue::Structured(text));
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::Text(downcast::<StringArray>(col)?.value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(downcast::<Int8Array>(col)?.value(row) as i64),
        DataType::Int16 => CellValue::Integer(downcast::<Int16Array>(col)?.value(row) as i64),
        DataType::Int32 => CellValue::Integer(downcast::<Int32Array>(col)?.value(row) as i64),
        DataType::Int64 => CellValue::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::UInt8 => CellValue::Integer(downcast::<UInt8Array>(col)?.value(row) as i64),
        DataType::UInt16 => CellValue::Integer(downcast::<UInt16Array>(col)?.value(row) as i64),
        DataType::UInt32 => CellValue::Integer(downcast::<UInt32Array>(col)?.value(row) as i64),
        DataType::UInt64 => {
            let v = downcast::<UInt64Array>(col)?.value(row);
            i64::try_from(v).map_or(CellValue::Float(v as f64), CellValue::Integer)
        }
        DataType::Float32 => CellValue::Float(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Float64 => CellValue::Float(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => CellValue::Bool(downcast::<BooleanArray>(col)?.value(row)),
        other => bail!("unprepared column type {other:?}"),
    };
    Ok(cell)
}
