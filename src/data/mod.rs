/// Data layer: table model, loading, cleaning, charting and export.
///
/// Architecture:
/// ```text
///  upload (.csv / .xlsx bytes)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Table      (batch: one call per file)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  named columns of CellValue, equal lengths
///   └──────────┘
///     │      │
///     │      ▼
///     │   ┌──────────┐
///     │   │ cleaning  │  dedupe / fill / drop empty / normalize, in place
///     │   └──────────┘
///     ▼
///   ┌──────────┐      ┌──────────┐
///   │  chart    │      │  export   │  Table → CSV / XLSX bytes + file name
///   └──────────┘      └──────────┘
/// ```

pub mod batch;
pub mod chart;
pub mod cleaning;
pub mod error;
pub mod export;
pub mod loader;
pub mod model;
pub mod xlsx;
