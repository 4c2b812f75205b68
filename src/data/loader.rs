use std::io::{BufRead, BufReader};
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{DataError, Result};
use super::model::{OrderRecord, OrderStatus, OrderTable};
use super::region::region_name;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const ORDER_ID: &str = "order_id";
pub const CUSTOMER_UNIQUE_ID: &str = "customer_unique_id";
pub const CUSTOMER_STATE: &str = "customer_state";
pub const ORDER_DATE: &str = "order_date";
pub const ORDER_STATUS: &str = "order_status";
pub const PRICE: &str = "price";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    ORDER_ID,
    CUSTOMER_UNIQUE_ID,
    CUSTOMER_STATE,
    ORDER_DATE,
    ORDER_STATUS,
    PRICE,
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an order dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` / `.txt` – delimited text with a header row
/// * `.json`    – `[{ "order_id": "...", "customer_state": "SP", ... }, ...]`
/// * `.parquet` – flat columns named as in [`REQUIRED_COLUMNS`]
pub fn load_file(path: &Path) -> Result<OrderTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "tsv" | "txt" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataError::UnsupportedExtension(other.to_string())),
    };

    log::info!(
        "Loaded {} orders across {} regions from {}",
        table.len(),
        table.regions.len(),
        path.display()
    );
    if let Some(first) = table.records.first() {
        log::debug!("First order: {first}");
    }
    if table.is_empty() {
        log::warn!("{} contains no orders", path.display());
    }
    let undefined = table.undefined_region_rows();
    if undefined > 0 {
        log::warn!("{undefined} orders carry an unknown region code");
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Row normalisation shared by every format
// ---------------------------------------------------------------------------

/// One source row before normalisation. `row` is 1-based and counts data
/// rows only.
struct RawOrder<'a> {
    row: usize,
    order_id: &'a str,
    customer_unique_id: &'a str,
    customer_state: &'a str,
    order_date: &'a str,
    order_status: &'a str,
}

impl RawOrder<'_> {
    fn into_record(self, price: f64) -> Result<OrderRecord> {
        let order_date =
            parse_order_date(self.order_date).ok_or_else(|| DataError::InvalidDate {
                row: self.row,
                value: self.order_date.to_string(),
            })?;
        Ok(OrderRecord {
            order_id: self.order_id.to_string(),
            customer_unique_id: self.customer_unique_id.to_string(),
            region: region_name(self.customer_state),
            order_date,
            order_status: OrderStatus::parse(self.order_status),
            price,
        })
    }
}

/// Parse an order timestamp. Date-only values land on midnight.
pub fn parse_order_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn parse_price(s: &str, row: usize) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| DataError::InvalidPrice {
            row,
            value: s.to_string(),
        })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Pick the field delimiter from the header line: tab, then semicolon when
/// no comma is present, then comma.
fn sniff_delimiter(header: &str) -> u8 {
    if header.contains('\t') {
        b'\t'
    } else if header.contains(';') && !header.contains(',') {
        b';'
    } else {
        b','
    }
}

/// CSV layout: header row with column names, one order per line. Columns
/// beyond [`REQUIRED_COLUMNS`] are ignored.
fn load_csv(path: &Path) -> Result<OrderTable> {
    let io_err = |source: std::io::Error| DataError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut header = String::new();
    BufReader::new(std::fs::File::open(path).map_err(io_err)?)
        .read_line(&mut header)
        .map_err(io_err)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(&header))
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut idx = [0usize; 6];
    for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or(DataError::MissingColumn(name))?;
    }
    let [id_i, cust_i, state_i, date_i, status_i, price_i] = idx;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let field = |j: usize| record.get(j).unwrap_or("");

        let price = parse_price(field(price_i), row)?;
        let raw = RawOrder {
            row,
            order_id: field(id_i),
            customer_unique_id: field(cust_i),
            customer_state: field(state_i),
            order_date: field(date_i),
            order_status: field(status_i),
        };
        records.push(raw.into_record(price)?);
    }

    Ok(OrderTable::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "order_id": "e481f51c",
///     "customer_unique_id": "7c396fd4",
///     "customer_state": "SP",
///     "order_date": "2017-10-02 10:56:33",
///     "order_status": "delivered",
///     "price": 29.99
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<OrderTable> {
    let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let rows = root.as_array().ok_or(DataError::JsonShape)?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, rec) in rows.iter().enumerate() {
        let row = i + 1;
        let mut texts: [String; 5] = Default::default();
        for (slot, name) in texts.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = json_text(rec.get(name).ok_or(DataError::MissingColumn(name))?);
        }
        let price = match rec.get(PRICE).ok_or(DataError::MissingColumn(PRICE))? {
            JsonValue::Number(n) => n.as_f64().ok_or_else(|| DataError::InvalidPrice {
                row,
                value: n.to_string(),
            })?,
            other => parse_price(&json_text(other), row)?,
        };
        let [order_id, customer_unique_id, customer_state, order_date, order_status] = &texts;
        let raw = RawOrder {
            row,
            order_id,
            customer_unique_id,
            customer_state,
            order_date,
            order_status,
        };
        records.push(raw.into_record(price)?);
    }

    Ok(OrderTable::from_records(records))
}

/// Null cells read as empty text so they fall through the same
/// normalisation as an empty CSV field.
fn text_at(col: &ArrayRef, row: usize) -> &str {
    let arr = col.as_string::<i32>();
    if arr.is_null(row) { "" } else { arr.value(row) }
}

fn json_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of orders.
///
/// Text columns may be any type Arrow can cast to Utf8 (so integer ids and
/// `Timestamp` order dates work). `price` must cast to Float64.
fn load_parquet(path: &Path) -> Result<OrderTable> {
    let file = std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        let column = |name: &'static str, to: &DataType| -> Result<ArrayRef> {
            let i = schema
                .index_of(name)
                .map_err(|_| DataError::MissingColumn(name))?;
            Ok(cast(batch.column(i), to)?)
        };

        let mut texts = Vec::with_capacity(5);
        for &name in &REQUIRED_COLUMNS[..5] {
            texts.push(column(name, &DataType::Utf8)?);
        }
        let prices = column(PRICE, &DataType::Float64)?;
        let prices = prices.as_primitive::<Float64Type>();

        for i in 0..batch.num_rows() {
            let row = row_offset + i + 1;
            let price = match prices.is_valid(i).then(|| prices.value(i)) {
                Some(p) if p.is_finite() => p,
                other => {
                    return Err(DataError::InvalidPrice {
                        row,
                        value: other.map_or_else(|| "null".to_string(), |p| p.to_string()),
                    })
                }
            };
            let raw = RawOrder {
                row,
                order_id: text_at(&texts[0], i),
                customer_unique_id: text_at(&texts[1], i),
                customer_state: text_at(&texts[2], i),
                order_date: text_at(&texts[3], i),
                order_status: text_at(&texts[4], i),
            };
            records.push(raw.into_record(price)?);
        }
        row_offset += batch.num_rows();
    }

    Ok(OrderTable::from_records(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).expect("create fixture");
        f.write_all(contents.as_bytes()).expect("write fixture");
        path
    }

    const HEADER: &str = "order_id,customer_unique_id,customer_state,order_date,order_status,price";

    #[test]
    fn csv_rows_are_normalised() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(
            &dir,
            "orders.csv",
            &format!(
                "{HEADER},extra\n\
                 o1,c1,SP,2024-01-05 10:00:00,delivered,10.5,x\n\
                 o2,c2,XX,2024-01-20,canceled,20,y\n"
            ),
        );

        let table = load_file(&path).expect("load");
        assert_eq!(table.len(), 2);
        let first = &table.records[0];
        assert_eq!(first.region, Some("São Paulo"));
        assert_eq!(first.order_status, OrderStatus::Delivered);
        assert_eq!(first.price, 10.5);
        assert_eq!(first.order_date.to_string(), "2024-01-05 10:00:00");

        let second = &table.records[1];
        assert_eq!(second.region, None);
        assert_eq!(second.order_status, OrderStatus::Other("canceled".into()));
        assert_eq!(second.order_date.to_string(), "2024-01-20 00:00:00");
        assert_eq!(table.regions.len(), 2);
    }

    #[test]
    fn semicolon_and_tab_delimiters_are_detected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let semi = write_file(
            &dir,
            "orders_semi.csv",
            &format!("{}\no1;c1;RJ;2024-02-01;shipped;5\n", HEADER.replace(',', ";")),
        );
        let tab = write_file(
            &dir,
            "orders.tsv",
            &format!("{}\no1\tc1\tRJ\t2024-02-01\tshipped\t5\n", HEADER.replace(',', "\t")),
        );
        for path in [semi, tab] {
            let table = load_file(&path).expect("load");
            assert_eq!(table.records[0].region, Some("Rio de Janeiro"));
        }
    }

    #[test]
    fn unparseable_date_aborts_the_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(
            &dir,
            "orders.csv",
            &format!("{HEADER}\no1,c1,SP,2024-01-05,delivered,1\no2,c1,SP,not-a-date,delivered,1\n"),
        );
        match load_file(&path) {
            Err(DataError::InvalidDate { row, value }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "not-a-date");
            }
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(
            &dir,
            "orders.csv",
            "order_id,customer_unique_id,customer_state,order_date,price\no1,c1,SP,2024-01-05,1\n",
        );
        assert!(matches!(
            load_file(&path),
            Err(DataError::MissingColumn("order_status"))
        ));
    }

    #[test]
    fn missing_file_and_bad_extension_fail() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            load_file(&dir.path().join("absent.csv")),
            Err(DataError::Io { .. })
        ));
        let path = write_file(&dir, "orders.xlsx", "");
        assert!(matches!(
            load_file(&path),
            Err(DataError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn invalid_price_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(
            &dir,
            "orders.csv",
            &format!("{HEADER}\no1,c1,SP,2024-01-05,delivered,abc\n"),
        );
        assert!(matches!(
            load_file(&path),
            Err(DataError::InvalidPrice { row: 1, .. })
        ));
    }

    #[test]
    fn json_records_are_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(
            &dir,
            "orders.json",
            r#"[
                {"order_id": 1, "customer_unique_id": "c1", "customer_state": "MG",
                 "order_date": "2024-03-01T08:30:00", "order_status": "approved", "price": 12.5},
                {"order_id": "o2", "customer_unique_id": "c2", "customer_state": "ba",
                 "order_date": "2024-03-02", "order_status": "processing", "price": "7"}
            ]"#,
        );
        let table = load_file(&path).expect("load");
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].order_id, "1");
        assert_eq!(table.records[0].region, Some("Minas Gerais"));
        assert_eq!(table.records[1].region, Some("Bahia"));
        assert_eq!(table.records[1].price, 7.0);
    }

    fn write_parquet(dir: &tempfile::TempDir, states: Vec<Option<&str>>, prices: Vec<f64>) -> std::path::PathBuf {
        use std::sync::Arc;

        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new(ORDER_ID, DataType::Int64, false),
            Field::new(CUSTOMER_UNIQUE_ID, DataType::Utf8, false),
            Field::new(CUSTOMER_STATE, DataType::Utf8, true),
            Field::new(ORDER_DATE, DataType::Utf8, false),
            Field::new(ORDER_STATUS, DataType::Utf8, false),
            Field::new(PRICE, DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1, 2])),
                Arc::new(StringArray::from(vec!["c1", "c2"])),
                Arc::new(StringArray::from(states)),
                Arc::new(StringArray::from(vec!["2024-01-05", "2024-01-06 12:00:00"])),
                Arc::new(StringArray::from(vec!["delivered", "shipped"])),
                Arc::new(Float64Array::from(prices)),
            ],
        )
        .expect("batch");

        let path = dir.path().join("orders.parquet");
        let file = std::fs::File::create(&path).expect("create");
        let mut writer = ArrowWriter::try_new(file, schema, None).expect("writer");
        writer.write(&batch).expect("write");
        writer.close().expect("close");
        path
    }

    #[test]
    fn parquet_columns_are_cast() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_parquet(&dir, vec![Some("SP"), None], vec![10.0, 20.0]);

        let table = load_file(&path).expect("load");
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].order_id, "1");
        assert_eq!(table.records[0].region, Some("São Paulo"));
        assert_eq!(table.records[1].region, None);
        assert_eq!(table.records[1].price, 20.0);
    }

    #[test]
    fn parquet_non_finite_price_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_parquet(&dir, vec![Some("SP"), Some("RJ")], vec![10.0, f64::NAN]);
        assert!(matches!(
            load_file(&path),
            Err(DataError::InvalidPrice { row: 2, .. })
        ));

        let path = write_parquet(&dir, vec![Some("SP"), Some("RJ")], vec![f64::INFINITY, 1.0]);
        assert!(matches!(
            load_file(&path),
            Err(DataError::InvalidPrice { row: 1, .. })
        ));
    }

    #[test]
    fn date_formats() {
        assert!(parse_order_date("2017-10-02 10:56:33").is_some());
        assert!(parse_order_date("2017-10-02 10:56:33.123").is_some());
        assert!(parse_order_date("2017-10-02T10:56:33Z").is_some());
        assert!(parse_order_date("2017-10-02 10:56").is_some());
        assert!(parse_order_date("02/10/2017").is_none());
        assert!(parse_order_date("  ").is_none());
    }
}
