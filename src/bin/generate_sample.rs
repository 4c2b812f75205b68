use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const OUTPUT_DIR: &str = "dashboard";
const N_CUSTOMERS: usize = 400;

/// Region codes with rough relative order volume; `XX` is deliberately not
/// a real state so the dashboard shows an undefined region.
const STATES: &[(&str, u32)] = &[
    ("SP", 40), ("RJ", 13), ("MG", 12), ("RS", 6), ("PR", 5), ("SC", 4),
    ("BA", 4), ("DF", 2), ("ES", 2), ("GO", 2), ("PE", 2), ("CE", 1),
    ("PA", 1), ("MT", 1), ("MA", 1), ("MS", 1), ("PB", 1), ("PI", 1),
    ("RN", 1), ("AL", 1), ("SE", 1), ("TO", 1), ("RO", 1), ("AM", 1),
    ("AC", 1), ("AP", 1), ("RR", 1), ("XX", 1),
];

const STATUSES: &[(&str, u32)] = &[
    ("delivered", 90),
    ("shipped", 4),
    ("canceled", 2),
    ("processing", 1),
    ("invoiced", 1),
    ("approved", 1),
    ("unavailable", 1),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n.max(1)
    }

    /// Pick from `(item, weight)` pairs.
    fn weighted<'a>(&mut self, items: &[(&'a str, u32)]) -> &'a str {
        let total: u64 = items.iter().map(|(_, w)| u64::from(*w)).sum();
        let mut roll = self.below(total);
        for (item, w) in items {
            let w = u64::from(*w);
            if roll < w {
                return *item;
            }
            roll -= w;
        }
        items[items.len() - 1].0
    }
}

#[derive(Debug, Serialize)]
struct OrderRow {
    order_id: String,
    customer_unique_id: String,
    customer_state: String,
    order_date: String,
    order_status: String,
    price: f64,
}

fn generate(rng: &mut SimpleRng) -> Vec<OrderRow> {
    let epoch = NaiveDate::from_ymd_opt(2017, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN);

    let mut rows = Vec::new();
    for c in 0..N_CUSTOMERS {
        let customer = format!("{:016x}", rng.next_u64());
        let state = rng.weighted(STATES);
        let first = epoch + Duration::minutes(rng.below(600 * 24 * 60) as i64);

        // Most customers order once; a few come back over days to months.
        let n_orders = match rng.below(100) {
            0..=79 => 1,
            80..=94 => 2,
            _ => 3 + rng.below(3) as usize,
        };
        let mut date = first;
        for o in 0..n_orders {
            if o > 0 {
                let gap_days = [3, 10, 25, 60, 150, 300, 500][rng.below(7) as usize];
                date += Duration::days(1 + rng.below(gap_days) as i64);
            }
            rows.push(OrderRow {
                order_id: format!("{c:04}-{o}-{:08x}", rng.next_u64() as u32),
                customer_unique_id: customer.clone(),
                customer_state: state.to_string(),
                order_date: date.format("%Y-%m-%d %H:%M:%S").to_string(),
                order_status: rng.weighted(STATUSES).to_string(),
                price: ((10.0 + rng.next_f64() * 290.0) * 100.0).round() / 100.0,
            });
        }
    }
    rows
}

fn write_csv(rows: &[OrderRow], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[OrderRow], path: &str) -> Result<RecordBatch> {
    let text = |f: fn(&OrderRow) -> &str| {
        StringArray::from(rows.iter().map(f).collect::<Vec<_>>())
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("order_id", DataType::Utf8, false),
        Field::new("customer_unique_id", DataType::Utf8, false),
        Field::new("customer_state", DataType::Utf8, false),
        Field::new("order_date", DataType::Utf8, false),
        Field::new("order_status", DataType::Utf8, false),
        Field::new("price", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text(|r| r.order_id.as_str())),
            Arc::new(text(|r| r.customer_unique_id.as_str())),
            Arc::new(text(|r| r.customer_state.as_str())),
            Arc::new(text(|r| r.order_date.as_str())),
            Arc::new(text(|r| r.order_status.as_str())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.price).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(batch)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    std::fs::create_dir_all(OUTPUT_DIR).with_context(|| format!("creating {OUTPUT_DIR}/"))?;
    let csv_path = format!("{OUTPUT_DIR}/ecommerce_final.csv");
    let parquet_path = format!("{OUTPUT_DIR}/ecommerce_final.parquet");

    write_csv(&rows, &csv_path)?;
    let batch = write_parquet(&rows, &parquet_path)?;

    println!("{}", pretty_format_batches(&[batch.slice(0, batch.num_rows().min(5))])?);
    println!(
        "Wrote {} orders from {N_CUSTOMERS} customers to {csv_path} and {parquet_path}",
        rows.len()
    );
    Ok(())
}
