use anyhow::{Context, Result};

use data_sweeper::data::export::{ExportFormat, export_table};
use data_sweeper::data::model::{CellValue, Table};

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

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// Messy order data: gaps, duplicated rows, an all-empty row and a constant column.
fn sample_table(rng: &mut SimpleRng) -> Result<Table> {
    let regions = ["North", "South", "East", "West"];
    let products = ["Widget", "Gadget", "Doohickey"];

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for order_id in 1..=40i64 {
        let quantity = if rng.chance(0.15) {
            CellValue::Missing
        } else {
            CellValue::Integer(1 + (rng.next_u64() % 20) as i64)
        };
        let price = if rng.chance(0.1) {
            CellValue::Missing
        } else {
            CellValue::Float((rng.next_f64() * 9000.0).round() / 100.0 + 5.0)
        };
        let row = vec![
            CellValue::Integer(order_id),
            CellValue::Text(rng.pick(&regions).to_string()),
            CellValue::Text(rng.pick(&products).to_string()),
            quantity,
            price,
            CellValue::Integer(1),
        ];
        if rng.chance(0.2) {
            rows.push(row.clone());
        }
        rows.push(row);
        if order_id == 20 {
            rows.push(vec![CellValue::Missing; 6]);
        }
    }

    Table::from_rows(
        &["order_id", "region", "product", "quantity", "unit_price", "batch"],
        rows,
    )
    .context("assembling sample table")
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let table = sample_table(&mut rng)?;

    for format in ExportFormat::ALL {
        let artifact = export_table(&table, format, "sample_data")?;
        let output_path = format!("sample_data.{}", format.extension());
        std::fs::write(&output_path, artifact.bytes())
            .with_context(|| format!("writing {output_path}"))?;
        println!(
            "Wrote {} rows × {} columns to {output_path}",
            table.n_rows(),
            table.n_cols()
        );
    }
    Ok(())
}
