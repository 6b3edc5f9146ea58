use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::*;
use tracing::{debug, info};

use crate::domain::{DGConfig, DGError};
use crate::grid::{Align, ColumnDescriptor, Derivation, FilterKind, Pin, Record, Value};

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// A display-ready dataset: the records plus the column configuration
/// that goes with them.
pub struct Dataset {
    pub name: String,
    pub records: Vec<Record>,
    pub columns: Vec<ColumnDescriptor>,
}

/// Load a data file, or the built-in demo inventory when no path is
/// given.
pub fn load(path: Option<&Path>, config: &DGConfig) -> Result<Dataset, DGError> {
    match path {
        Some(path) => load_file(path, config),
        None => Ok(demo_dataset(config)),
    }
}

pub fn demo_dataset(config: &DGConfig) -> Dataset {
    Dataset {
        name: "inventory".to_string(),
        records: demo_records(),
        columns: demo_columns(config),
    }
}

pub fn demo_records() -> Vec<Record> {
    vec![
        Record::new(1)
            .with("make", "Tesla")
            .with("model", "Model Y")
            .with("price", 64950_i64)
            .with("electric", true)
            .with("year", 2023_i64)
            .with("category", "SUV")
            .with("rating", 4.8)
            .with("inStock", true),
        Record::new(2)
            .with("make", "Ford")
            .with("model", "F-Series")
            .with("price", 33850_i64)
            .with("electric", false)
            .with("year", 2023_i64)
            .with("category", "Truck")
            .with("rating", 4.2)
            .with("inStock", true),
        Record::new(3)
            .with("make", "Toyota")
            .with("model", "Corolla")
            .with("price", 29600_i64)
            .with("electric", false)
            .with("year", 2023_i64)
            .with("category", "Sedan")
            .with("rating", 4.5)
            .with("inStock", false),
        Record::new(4)
            .with("make", "BMW")
            .with("model", "X5")
            .with("price", 75900_i64)
            .with("electric", false)
            .with("year", 2024_i64)
            .with("category", "SUV")
            .with("rating", 4.7)
            .with("inStock", true),
        Record::new(5)
            .with("make", "Audi")
            .with("model", "e-tron")
            .with("price", 89500_i64)
            .with("electric", true)
            .with("year", 2024_i64)
            .with("category", "SUV")
            .with("rating", 4.6)
            .with("inStock", true),
        Record::new(6)
            .with("make", "Honda")
            .with("model", "Civic")
            .with("price", 31900_i64)
            .with("electric", false)
            .with("year", 2023_i64)
            .with("category", "Sedan")
            .with("rating", 4.3)
            .with("inStock", true),
        Record::new(7)
            .with("make", "Mercedes")
            .with("model", "EQS")
            .with("price", 125000_i64)
            .with("electric", true)
            .with("year", 2024_i64)
            .with("category", "Luxury")
            .with("rating", 4.9)
            .with("inStock", false),
        Record::new(8)
            .with("make", "Hyundai")
            .with("model", "Tucson")
            .with("price", 38900_i64)
            .with("electric", false)
            .with("year", 2023_i64)
            .with("category", "SUV")
            .with("rating", 4.1)
            .with("inStock", true),
    ]
}

pub fn demo_columns(config: &DGConfig) -> Vec<ColumnDescriptor> {
    vec![
        select_column(),
        ColumnDescriptor {
            field: Some("make".into()),
            label: "Manufacturer".into(),
            sortable: true,
            filter: FilterKind::Text,
            pinned: Pin::Left,
            width: 12,
            ..Default::default()
        },
        ColumnDescriptor {
            field: Some("model".into()),
            label: "Model".into(),
            sortable: true,
            filter: FilterKind::Text,
            editable: true,
            width: 12,
            ..Default::default()
        },
        ColumnDescriptor {
            field: Some("category".into()),
            label: "Category".into(),
            sortable: true,
            filter: FilterKind::Text,
            width: 10,
            ..Default::default()
        },
        ColumnDescriptor {
            field: Some("year".into()),
            label: "Year".into(),
            sortable: true,
            filter: FilterKind::Number,
            align: Align::Right,
            width: 6,
            ..Default::default()
        },
        ColumnDescriptor {
            field: Some("price".into()),
            label: format!("Price ({})", config.currency_prefix),
            sortable: true,
            filter: FilterKind::Number,
            derive: Some(Derivation::Currency {
                prefix: config.currency_prefix.clone(),
            }),
            align: Align::Right,
            width: 12,
            ..Default::default()
        },
        ColumnDescriptor {
            field: Some("price".into()),
            id: Some("priceBar".into()),
            label: "Price Progress".into(),
            derive: Some(Derivation::PercentOfCeiling {
                ceiling: config.progress_ceiling,
            }),
            width: 20,
            ..Default::default()
        },
        ColumnDescriptor {
            field: Some("rating".into()),
            label: "Rating".into(),
            sortable: true,
            filter: FilterKind::Number,
            derive: Some(Derivation::Stars),
            width: 12,
            ..Default::default()
        },
        ColumnDescriptor {
            field: Some("electric".into()),
            label: "Power Type".into(),
            sortable: true,
            filter: FilterKind::Text,
            derive: Some(Derivation::Badge {
                on: "⚡ Electric".into(),
                off: "⛽ Gas".into(),
            }),
            width: 12,
            ..Default::default()
        },
        ColumnDescriptor {
            field: Some("inStock".into()),
            label: "In Stock".into(),
            sortable: true,
            filter: FilterKind::Text,
            derive: Some(Derivation::Badge {
                on: "✓ Yes".into(),
                off: "✗ No".into(),
            }),
            width: 9,
            ..Default::default()
        },
    ]
}

fn select_column() -> ColumnDescriptor {
    ColumnDescriptor {
        id: Some("select".into()),
        label: "Sel".into(),
        pinned: Pin::Left,
        align: Align::Center,
        width: 5,
        ..Default::default()
    }
}

fn load_file(path: &Path, config: &DGConfig) -> Result<Dataset, DGError> {
    let file_info = get_file_info(path)?;
    info!(
        "Loading {} ({} bytes) ...",
        file_info.path.display(),
        file_info.file_size
    );

    let frame = match file_info.file_type {
        FileType::CSV => load_csv(&file_info.path)?,
        FileType::PARQUET => load_parquet(&file_info.path)?,
        FileType::ARROW => load_arrow(&file_info.path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;
    let (records, fields) = frame_to_records(&df)?;

    let mut columns = vec![select_column()];
    columns.extend(infer_columns(&fields, &records, config));
    for column in &columns {
        debug!(
            "Column \"{}\": {:?} filter, width {}",
            column.key(),
            column.filter,
            column.width
        );
    }

    info!(
        "Loaded {} records with {} columns in {}ms",
        records.len(),
        fields.len(),
        start_time.elapsed().as_millis()
    );

    let name = file_info
        .path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("???")
        .to_string();

    Ok(Dataset {
        name,
        records,
        columns,
    })
}

/// Turn the collected frame into records. A column named `id` holding
/// unique integers becomes the record identity; otherwise ids are
/// assigned by position, starting at 1. Null cells become absent fields.
fn frame_to_records(df: &DataFrame) -> Result<(Vec<Record>, Vec<String>), DGError> {
    let height = df.height();
    let mut names: Vec<String> = Vec::new();
    let mut values: Vec<Vec<Option<Value>>> = Vec::new();
    for column in df.get_columns() {
        names.push(column.name().to_string());
        values.push(column_values(column)?);
    }

    let (ids, id_column) = extract_ids(&names, &values, height)?;

    let mut records = Vec::with_capacity(height);
    for row in 0..height {
        let mut record = Record::new(ids[row]);
        for (cidx, name) in names.iter().enumerate() {
            if Some(cidx) == id_column {
                continue;
            }
            if let Some(value) = &values[cidx][row] {
                record.set(name, value.clone());
            }
        }
        records.push(record);
    }

    let fields = names
        .into_iter()
        .enumerate()
        .filter(|(cidx, _)| Some(*cidx) != id_column)
        .map(|(_, name)| name)
        .collect();
    Ok((records, fields))
}

fn extract_ids(
    names: &[String],
    values: &[Vec<Option<Value>>],
    height: usize,
) -> Result<(Vec<i64>, Option<usize>), DGError> {
    if let Some(idx) = names.iter().position(|name| name == "id")
        && let Some(ids) = integer_ids(&values[idx])
    {
        let mut seen = HashSet::new();
        for &id in &ids {
            if !seen.insert(id) {
                return Err(DGError::LoadingFailed(format!("duplicate record id {id}")));
            }
        }
        return Ok((ids, Some(idx)));
    }
    Ok(((1..=height as i64).collect(), None))
}

fn integer_ids(column: &[Option<Value>]) -> Option<Vec<i64>> {
    column
        .iter()
        .map(|value| match value {
            Some(Value::Int(id)) => Some(*id),
            _ => None,
        })
        .collect()
}

fn column_values(column: &Column) -> Result<Vec<Option<Value>>, PolarsError> {
    let dtype = column.dtype();
    if matches!(dtype, DataType::Boolean) {
        return Ok(column
            .bool()?
            .into_iter()
            .map(|v| v.map(Value::Bool))
            .collect());
    }
    if is_integer_type(dtype) {
        let cast = column.cast(&DataType::Int64)?;
        return Ok(cast.i64()?.into_iter().map(|v| v.map(Value::Int)).collect());
    }
    if is_float_type(dtype) {
        let cast = column.cast(&DataType::Float64)?;
        return Ok(cast
            .f64()?
            .into_iter()
            .map(|v| v.map(Value::Float))
            .collect());
    }
    let cast = column.cast(&DataType::String)?;
    let series = cast.str()?;
    Ok(series
        .into_iter()
        .map(|v| v.map(|s| Value::Str(s.to_string())))
        .collect())
}

fn is_integer_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn is_float_type(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Derive a plain column configuration from the data: numeric columns get
/// range filters and right alignment, text columns get substring filters
/// and inline editing. Widths follow the widest value, capped by config.
fn infer_columns(fields: &[String], records: &[Record], config: &DGConfig) -> Vec<ColumnDescriptor> {
    fields
        .iter()
        .map(|field| {
            let mut numeric = false;
            let mut text = false;
            let mut other = false;
            let mut max_width = field.chars().count();
            for record in records {
                if let Some(value) = record.get(field) {
                    max_width = max_width.max(value.to_string().chars().count());
                    match value {
                        Value::Int(_) | Value::Float(_) => numeric = true,
                        Value::Str(_) => text = true,
                        Value::Bool(_) => other = true,
                    }
                }
            }
            let numeric_only = numeric && !text && !other;
            ColumnDescriptor {
                field: Some(field.clone()),
                label: field.clone(),
                sortable: true,
                filter: if numeric_only {
                    FilterKind::Number
                } else {
                    FilterKind::Text
                },
                editable: text,
                align: if numeric_only { Align::Right } else { Align::Left },
                width: (max_width + 1).min(config.max_column_width),
                ..Default::default()
            }
        })
        .collect()
}

fn detect_file_type(path: &Path) -> Result<FileType, DGError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(DGError::UnknownFileType),
    }
}

fn get_file_info(path: &Path) -> Result<FileInfo, DGError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DGError::FileNotFound,
        ErrorKind::PermissionDenied => DGError::PermissionDenied,
        _ => DGError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(DGError::LoadingFailed("Not a file!".into()));
    }

    Ok(FileInfo {
        path: path.to_path_buf(),
        file_size: metadata.len(),
        file_type: detect_file_type(path)?,
    })
}

fn load_csv(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.as_path().into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(
        PlPath::Local(path.as_path().into()),
        ScanArgsParquet::default(),
    )
}

fn load_arrow(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.as_path().into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn demo_dataset_matches_the_advertised_shape() {
        let dataset = demo_dataset(&DGConfig::default());
        assert_eq!(dataset.records.len(), 8);
        assert_eq!(dataset.columns.len(), 10);

        let tesla = &dataset.records[0];
        assert_eq!(tesla.id(), 1);
        assert_eq!(tesla.get("make"), Some(&Value::Str("Tesla".into())));
        assert_eq!(tesla.get("price"), Some(&Value::Int(64950)));
        assert_eq!(tesla.get("rating"), Some(&Value::Float(4.8)));
        assert_eq!(tesla.get("electric"), Some(&Value::Bool(true)));

        // Two columns share the price field under distinct keys.
        let keys: Vec<&str> = dataset.columns.iter().map(ColumnDescriptor::key).collect();
        assert!(keys.contains(&"price"));
        assert!(keys.contains(&"priceBar"));
    }

    #[test]
    fn csv_files_load_with_typed_fields() {
        let config = DGConfig::default();
        let path = fixture("testdata_01.csv");
        let dataset = load(Some(&path), &config).unwrap();

        assert_eq!(dataset.name, "testdata_01.csv");
        assert_eq!(dataset.records.len(), 3);

        let first = &dataset.records[0];
        assert_eq!(first.id(), 1);
        assert_eq!(first.get("name"), Some(&Value::Str("widget".into())));
        assert_eq!(first.get("qty"), Some(&Value::Int(3)));
        assert_eq!(first.get("price"), Some(&Value::Float(9.5)));
        assert_eq!(first.get("active"), Some(&Value::Bool(true)));
        // The id column becomes record identity, not a field.
        assert_eq!(first.get("id"), None);

        // Selection marker plus the four data columns.
        assert_eq!(dataset.columns.len(), 5);
        let qty = dataset.columns.iter().find(|c| c.key() == "qty").unwrap();
        assert_eq!(qty.filter, FilterKind::Number);
        assert_eq!(qty.align, Align::Right);
        assert!(!qty.editable);
        let name = dataset.columns.iter().find(|c| c.key() == "name").unwrap();
        assert_eq!(name.filter, FilterKind::Text);
        assert!(name.editable);
    }

    #[test]
    fn missing_files_and_foreign_extensions_are_rejected() {
        let config = DGConfig::default();
        assert!(matches!(
            load(Some(Path::new("/no/such/file.csv")), &config),
            Err(DGError::FileNotFound)
        ));
        assert!(matches!(
            load(Some(&fixture("notes.txt")), &config),
            Err(DGError::UnknownFileType)
        ));
    }

    #[test]
    fn positional_ids_are_synthesized_when_the_id_column_is_unusable() {
        let names = vec!["id".to_string(), "v".to_string()];
        let values = vec![
            vec![Some(Value::Str("a".into())), Some(Value::Str("b".into()))],
            vec![Some(Value::Int(1)), Some(Value::Int(2))],
        ];
        let (ids, consumed) = extract_ids(&names, &values, 2).unwrap();
        assert_eq!(ids, vec![1, 2]);
        // The textual id column stays visible as an ordinary field.
        assert_eq!(consumed, None);
    }

    #[test]
    fn duplicate_ids_fail_the_load() {
        let names = vec!["id".to_string()];
        let values = vec![vec![Some(Value::Int(7)), Some(Value::Int(7))]];
        assert!(matches!(
            extract_ids(&names, &values, 2),
            Err(DGError::LoadingFailed(_))
        ));
    }
}
