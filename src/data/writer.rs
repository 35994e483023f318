use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use log::info;
use parquet::arrow::ArrowWriter;
use serde_json::{Map, Value as JsonValue};

use super::model::{CellValue, SurveyDataset};
use crate::analysis::{LabeledMatrix, Summary};

// ---------------------------------------------------------------------------
// Cleaned dataset
// ---------------------------------------------------------------------------

/// Write the dataset, choosing the format from the extension (`.csv`,
/// `.json`, `.parquet`/`.pq`). Missing cells are written as empty / null.
pub fn write_dataset(path: &Path, dataset: &SurveyDataset) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => write_csv(path, dataset),
        "json" => write_json(path, dataset),
        "parquet" | "pq" => write_parquet(path, dataset),
        other => bail!("Unsupported output extension: .{other}"),
    }
    .with_context(|| format!("writing {}", path.display()))?;

    info!("Cleaned data written to {}", path.display());
    Ok(())
}

fn write_csv(path: &Path, dataset: &SurveyDataset) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    write_csv_records(&mut writer, dataset)?;
    writer.flush().context("flushing CSV")?;
    Ok(())
}

#[cfg(test)]
fn dataset_to_csv_string(dataset: &SurveyDataset) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_csv_records(&mut writer, dataset)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("finishing CSV")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

fn write_csv_records<W: Write>(writer: &mut csv::Writer<W>, dataset: &SurveyDataset) -> Result<()> {
    writer.write_record(&dataset.column_names)?;
    for response in &dataset.responses {
        writer.write_record(response.cells.iter().map(|c| c.to_string()))?;
    }
    Ok(())
}

fn write_json(path: &Path, dataset: &SurveyDataset) -> Result<()> {
    let records: Vec<JsonValue> = dataset
        .responses
        .iter()
        .map(|response| {
            let obj: Map<String, JsonValue> = dataset
                .column_names
                .iter()
                .cloned()
                .zip(response.cells.iter().map(cell_to_json))
                .collect();
            JsonValue::Object(obj)
        })
        .collect();

    let file = File::create(path).context("creating JSON file")?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, &records).context("serializing JSON")?;
    out.flush()?;
    Ok(())
}

fn cell_to_json(cell: &CellValue) -> JsonValue {
    serde_json::to_value(cell).unwrap_or(JsonValue::Null)
}

/// Arrow type that can hold every non-missing cell of a column.
fn infer_column_type<'a>(cells: impl Iterator<Item = &'a CellValue>) -> DataType {
    let mut ty: Option<DataType> = None;
    for cell in cells {
        let cell_ty = match cell {
            CellValue::Null => continue,
            CellValue::Float(v) if v.is_nan() => continue,
            CellValue::Integer(_) => DataType::Int64,
            CellValue::Float(_) => DataType::Float64,
            CellValue::Bool(_) => DataType::Boolean,
            CellValue::Text(_) | CellValue::Structured(_) => return DataType::Utf8,
        };
        ty = Some(match (ty, cell_ty) {
            (None, t) => t,
            (Some(a), b) if a == b => a,
            (Some(DataType::Int64), DataType::Float64)
            | (Some(DataType::Float64), DataType::Int64) => DataType::Float64,
            _ => return DataType::Utf8,
        });
    }
    // All-missing columns are written as nullable floats.
    ty.unwrap_or(DataType::Float64)
}

fn column_array(dataset: &SurveyDataset, idx: usize, ty: &DataType) -> ArrayRef {
    let cells = dataset.column(idx);
    match ty {
        DataType::Int64 => Arc::new(Int64Array::from_iter(cells.map(|c| match c {
            CellValue::Integer(i) => Some(*i),
            _ => None,
        }))),
        DataType::Float64 => Arc::new(Float64Array::from_iter(cells.map(CellValue::as_f64))),
        DataType::Boolean => Arc::new(BooleanArray::from_iter(cells.map(|c| match c {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }))),
        _ => Arc::new(StringArray::from_iter(cells.map(|c| {
            if c.is_missing() {
                None
            } else {
                Some(c.to_string())
            }
        }))),
    }
}

fn write_parquet(path: &Path, dataset: &SurveyDataset) -> Result<()> {
    let mut fields = Vec::with_capacity(dataset.column_names.len());
    let mut arrays = Vec::with_capacity(dataset.column_names.len());
    for (idx, name) in dataset.column_names.iter().enumerate() {
        let ty = infer_column_type(dataset.column(idx));
        arrays.push(column_array(dataset, idx, &ty));
        fields.push(Field::new(name, ty, true));
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Matrices and summary
// ---------------------------------------------------------------------------

/// Convert a matrix to an Arrow batch: a leading `column` label column and
/// one nullable Float64 column per matrix column.
pub fn matrix_to_record_batch(matrix: &LabeledMatrix) -> Result<RecordBatch> {
    let mut fields = vec![Field::new("column", DataType::Utf8, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from_iter_values(
        matrix.columns().iter(),
    ))];
    for (j, name) in matrix.columns().iter().enumerate() {
        fields.push(Field::new(name, DataType::Float64, true));
        arrays.push(Arc::new(Float64Array::from_iter(
            (0..matrix.size()).map(|i| matrix.at(i, j)),
        )));
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("building matrix record batch")
}

/// Render a matrix as an ASCII table for the terminal.
pub fn format_matrix(matrix: &LabeledMatrix) -> Result<String> {
    let batch = matrix_to_record_batch(matrix)?;
    Ok(pretty_format_batches(&[batch])
        .context("formatting matrix")?
        .to_string())
}

/// Render per-pair counts (e.g. paired responses behind each coefficient)
/// as an ASCII table with the same layout as [`format_matrix`].
pub fn format_counts(columns: &[String], counts: &[Vec<usize>]) -> Result<String> {
    let mut fields = vec![Field::new("column", DataType::Utf8, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(StringArray::from_iter_values(columns.iter()))];
    for (j, name) in columns.iter().enumerate() {
        fields.push(Field::new(name, DataType::UInt64, true));
        arrays.push(Arc::new(UInt64Array::from_iter(
            counts.iter().map(|row| row.get(j).map(|&n| n as u64)),
        )));
    }
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("building count record batch")?;
    Ok(pretty_format_batches(&[batch])
        .context("formatting counts")?
        .to_string())
}

/// Write a square matrix as CSV; missing entries are empty cells.
pub fn write_matrix_csv(path: &Path, matrix: &LabeledMatrix) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut header = vec!["column".to_string()];
    header.extend(matrix.columns().iter().cloned());
    writer.write_record(&header)?;

    for (i, name) in matrix.columns().iter().enumerate() {
        let mut record = vec![name.clone()];
        record.extend(
            matrix
                .row(i)
                .iter()
                .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!("Matrix written to {}", path.display());
    Ok(())
}

/// Write the rendered summary text.
pub fn write_summary(path: &Path, summary: &Summary) -> Result<()> {
    std::fs::write(path, summary.render())
        .with_context(|| format!("writing summary to {}", path.display()))?;
    info!("Summary written to {}", path.display());
    Ok(())
}
